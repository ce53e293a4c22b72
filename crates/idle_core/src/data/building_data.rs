//! Building data structures for data-driven building definitions.

use serde::{Deserialize, Serialize};

use super::amounts::AmountTable;
use crate::buildings::{BuildingBlueprint, BuildingId};
use crate::error::{EconomyError, Result};
use crate::resources::ResourceKind;

/// Data-driven building definition.
///
/// # Example RON
///
/// ```ron
/// BuildingData(
///     id: "basicFabricator",
///     name: "Basic Fabricator",
///     cost: (material: 40.0),
///     production: (material: 0.5),
///     upkeep: (energy: 0.5),
///     max_instances: Some(10),
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingData {
    /// Unique string identifier for this building type.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Flavor text.
    #[serde(default)]
    pub description: String,

    /// Construction cost.
    pub cost: AmountTable,

    /// Output per second.
    #[serde(default)]
    pub production: AmountTable,

    /// Upkeep per second. Energy only.
    #[serde(default)]
    pub upkeep: AmountTable,

    /// Cap on constructed instances.
    #[serde(default)]
    pub max_instances: Option<u32>,

    /// Constructible from the start, without a technology.
    #[serde(default)]
    pub unlocked: bool,
}

impl BuildingData {
    /// Runtime blueprint for this building.
    ///
    /// `unlocked_by` is filled in by the catalog from technology effects.
    pub fn to_blueprint(&self) -> Result<BuildingBlueprint> {
        let upkeep = self.upkeep.to_amounts(&self.id)?;
        if let Some((kind, _)) = upkeep.non_zero().find(|(k, _)| *k != ResourceKind::Energy) {
            return Err(EconomyError::InvalidCatalog(format!(
                "{}: upkeep must be Energy only, found {kind}",
                self.id
            )));
        }

        Ok(BuildingBlueprint {
            id: BuildingId(self.id.clone()),
            name: self.name.clone(),
            description: self.description.clone(),
            cost: self.cost.to_amounts(&self.id)?,
            production: self.production.to_amounts(&self.id)?,
            upkeep,
            max_instances: self.max_instances,
            unlocked_by: Vec::new(),
            unlocked: self.unlocked,
        })
    }
}
