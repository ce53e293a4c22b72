//! Technology definitions and their unlock effects.

use serde::{Deserialize, Serialize};

use super::amounts::AmountTable;
use crate::buildings::BuildingId;
use crate::error::Result;
use crate::math::Fixed;
use crate::resources::ResourceKind;
use crate::unlocks::{NodeId, UnlockEffect, UnlockNode};

/// Effect of unlocking a technology or completing research.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnlockEffectData {
    /// Make a building blueprint constructible.
    UnlockBuilding {
        /// Blueprint id.
        building: String,
    },

    /// Allow paid recruitment.
    AuthorizeRecruitment,

    /// Permanent building production bonus for one resource.
    ProductionBonus {
        /// Resource affected.
        resource: ResourceKind,
        /// Percentage bonus (e.g. 10 for +10%).
        percent: i32,
    },
}

impl UnlockEffectData {
    /// Runtime form of this effect.
    #[must_use]
    pub fn to_effect(&self) -> UnlockEffect {
        match self {
            Self::UnlockBuilding { building } => {
                UnlockEffect::UnlockBuilding(BuildingId(building.clone()))
            }
            Self::AuthorizeRecruitment => UnlockEffect::AuthorizeRecruitment,
            Self::ProductionBonus { resource, percent } => UnlockEffect::ProductionBonus {
                resource: *resource,
                percent: *percent,
            },
        }
    }

    /// Blueprint this effect unlocks, if any.
    #[must_use]
    pub fn unlocked_building(&self) -> Option<&str> {
        match self {
            Self::UnlockBuilding { building } => Some(building),
            _ => None,
        }
    }
}

/// Data-driven technology definition.
///
/// # Example RON
///
/// ```ron
/// TechData(
///     id: "improvedSolarPanels",
///     name: "Improved Solar Panels",
///     description: "More efficient photovoltaic cells.",
///     cost: (research_data: 50.0, energy: 200.0),
///     prerequisites: ["basicEnergySystems"],
///     effects: [UnlockBuilding(building: "advancedSolarArray")],
///     tier: 2,
///     branch: Some("energy"),
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechData {
    /// Unique string identifier for this technology.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Flavor text.
    #[serde(default)]
    pub description: String,

    /// Cost to unlock.
    pub cost: AmountTable,

    /// Technology IDs that must be unlocked first.
    #[serde(default)]
    pub prerequisites: Vec<String>,

    /// Effects applied on unlock.
    #[serde(default)]
    pub effects: Vec<UnlockEffectData>,

    /// Tech tier this technology belongs to.
    #[serde(default = "default_tier")]
    pub tier: u8,

    /// Branch name for UI grouping.
    #[serde(default)]
    pub branch: Option<String>,
}

/// Default tier for technologies without explicit tier.
pub(crate) const fn default_tier() -> u8 {
    1
}

impl TechData {
    /// Check if this technology has a specific prerequisite.
    #[must_use]
    pub fn requires(&self, tech_id: &str) -> bool {
        self.prerequisites.iter().any(|t| t == tech_id)
    }

    /// Runtime unlock node for this technology.
    pub fn to_node(&self) -> Result<UnlockNode> {
        Ok(UnlockNode {
            id: NodeId(self.id.clone()),
            name: self.name.clone(),
            description: self.description.clone(),
            cost: self.cost.to_amounts(&self.id)?,
            prerequisites: self.prerequisites.iter().map(|p| NodeId(p.clone())).collect(),
            effects: self.effects.iter().map(UnlockEffectData::to_effect).collect(),
            tier: self.tier,
            duration: Fixed::ZERO,
            unlocked: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tech_ron() {
        let tech: TechData = ron::from_str(
            r#"TechData(
                id: "quantumFinance",
                name: "Quantum Finance",
                cost: (research_data: 400.0, credits: 1000.0),
                prerequisites: ["basicEconomicModels", "automatedManufacturing"],
                effects: [UnlockBuilding(building: "quantumFinancialProcessor")],
                tier: 2,
            )"#,
        )
        .unwrap();

        assert!(tech.requires("automatedManufacturing"));
        assert_eq!(tech.branch, None);

        let node = tech.to_node().unwrap();
        assert_eq!(node.cost[ResourceKind::Credits], Fixed::from_num(1000));
        assert_eq!(
            node.effects,
            vec![UnlockEffect::UnlockBuilding("quantumFinancialProcessor".into())]
        );
    }

    #[test]
    fn test_tier_defaults_to_one() {
        let tech: TechData =
            ron::from_str(r#"TechData(id: "t", name: "T", cost: (research_data: 1.0))"#).unwrap();
        assert_eq!(tech.tier, 1);
        assert!(tech.effects.is_empty());
    }
}
