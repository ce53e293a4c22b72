//! Research project definitions.

use serde::{Deserialize, Serialize};

use super::amounts::AmountTable;
use super::tech_data::{default_tier, UnlockEffectData};
use crate::error::{EconomyError, Result};
use crate::math::from_decimal;
use crate::unlocks::{NodeId, UnlockNode};

/// Data-driven research project definition.
///
/// # Example RON
///
/// ```ron
/// ResearchData(
///     id: "novelMaterialAnalysis",
///     name: "Novel Material Analysis",
///     cost: (research_data: 150.0, energy: 25.0),
///     duration: 20.0,
///     effects: [ProductionBonus(resource: Material, percent: 10)],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchData {
    /// Unique string identifier for this project.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Flavor text.
    #[serde(default)]
    pub description: String,

    /// Cost, paid when research starts.
    pub cost: AmountTable,

    /// Seconds of research needed.
    pub duration: f64,

    /// Technology or project IDs that must be unlocked first.
    #[serde(default)]
    pub prerequisites: Vec<String>,

    /// Effects applied on completion.
    #[serde(default)]
    pub effects: Vec<UnlockEffectData>,

    /// Display tier.
    #[serde(default = "default_tier")]
    pub tier: u8,
}

impl ResearchData {
    /// Runtime unlock node for this project.
    pub fn to_node(&self) -> Result<UnlockNode> {
        if self.duration < 0.0 {
            return Err(EconomyError::InvalidCatalog(format!(
                "{}: negative research duration {}",
                self.id, self.duration
            )));
        }
        let duration = from_decimal(self.duration).ok_or_else(|| {
            EconomyError::InvalidCatalog(format!(
                "{}: research duration {} out of range",
                self.id, self.duration
            ))
        })?;

        Ok(UnlockNode {
            id: NodeId(self.id.clone()),
            name: self.name.clone(),
            description: self.description.clone(),
            cost: self.cost.to_amounts(&self.id)?,
            prerequisites: self.prerequisites.iter().map(|p| NodeId(p.clone())).collect(),
            effects: self.effects.iter().map(UnlockEffectData::to_effect).collect(),
            tier: self.tier,
            duration,
            unlocked: false,
        })
    }
}
