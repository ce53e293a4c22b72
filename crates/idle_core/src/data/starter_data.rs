//! Starting specialist definitions.

use serde::{Deserialize, Serialize};

use super::amounts::AmountTable;
use crate::error::Result;
use crate::resources::ResourceKind;
use crate::team::{Specialist, StarterId};

/// Data-driven starting specialist.
///
/// # Example RON
///
/// ```ron
/// StarterData(
///     id: "alpha_01",
///     name: "Unit Alpha-01",
///     per_second: (energy: 3.0, material: 1.0, credits: 1.0, research_data: 1.0),
///     specialization: Some(Energy),
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarterData {
    /// Unique string identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Yield per second.
    pub per_second: AmountTable,

    /// Resource this specialist is best at.
    #[serde(default)]
    pub specialization: Option<ResourceKind>,
}

impl StarterData {
    /// Runtime specialist.
    pub fn to_specialist(&self) -> Result<Specialist> {
        Ok(Specialist {
            id: StarterId(self.id.clone()),
            name: self.name.clone(),
            per_second: self.per_second.to_amounts(&self.id)?,
            specialization: self.specialization,
        })
    }
}
