//! Credit action definitions.

use serde::{Deserialize, Serialize};

use super::amounts::AmountTable;
use crate::actions::{ActionEffect, ActionId, CreditAction};
use crate::error::{EconomyError, Result};
use crate::math::{from_decimal, Fixed};
use crate::resources::ResourceKind;

/// What an action does, as written in data files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ActionEffectData {
    /// Add resources on activation.
    GrantResources {
        /// Amounts granted.
        amounts: AmountTable,
    },
    /// Multiply all building production.
    BoostBuildingProduction {
        /// Production multiplier.
        multiplier: f64,
    },
    /// Multiply building upkeep.
    ScaleUpkeep {
        /// Upkeep factor.
        factor: f64,
    },
    /// Multiply generation of one resource.
    BoostResourceGeneration {
        /// Resource affected.
        resource: ResourceKind,
        /// Generation multiplier.
        multiplier: f64,
    },
    /// Multiply research speed.
    AccelerateResearch {
        /// Research speed multiplier.
        multiplier: f64,
    },
}

impl ActionEffectData {
    /// Runtime form of this effect.
    pub fn to_effect(&self, context: &str) -> Result<ActionEffect> {
        Ok(match self {
            Self::GrantResources { amounts } => {
                ActionEffect::GrantResources(amounts.to_amounts(context)?)
            }
            Self::BoostBuildingProduction { multiplier } => ActionEffect::BoostBuildingProduction {
                multiplier: factor(*multiplier, context)?,
            },
            Self::ScaleUpkeep { factor: f } => ActionEffect::ScaleUpkeep {
                factor: factor(*f, context)?,
            },
            Self::BoostResourceGeneration {
                resource,
                multiplier,
            } => ActionEffect::BoostResourceGeneration {
                resource: *resource,
                multiplier: factor(*multiplier, context)?,
            },
            Self::AccelerateResearch { multiplier } => ActionEffect::AccelerateResearch {
                multiplier: factor(*multiplier, context)?,
            },
        })
    }
}

fn factor(value: f64, context: &str) -> Result<Fixed> {
    if value < 0.0 {
        return Err(EconomyError::InvalidCatalog(format!(
            "{context}: negative multiplier {value}"
        )));
    }
    from_decimal(value).ok_or_else(|| {
        EconomyError::InvalidCatalog(format!("{context}: multiplier {value} out of range"))
    })
}

/// Data-driven credit action definition.
///
/// # Example RON
///
/// ```ron
/// ActionData(
///     id: "systemCalibration",
///     name: "System Calibration",
///     cost: (credits: 250.0),
///     duration: 45.0,
///     effects: [ScaleUpkeep(factor: 0.8)],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    /// Unique string identifier for this action.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Flavor text.
    #[serde(default)]
    pub description: String,

    /// Activation cost.
    pub cost: AmountTable,

    /// Seconds active; zero for instant actions.
    #[serde(default)]
    pub duration: f64,

    /// What activation does.
    pub effects: Vec<ActionEffectData>,
}

impl ActionData {
    /// Runtime action.
    ///
    /// Modifier effects need a positive duration; instant actions may
    /// only grant resources.
    pub fn to_action(&self) -> Result<CreditAction> {
        if self.duration < 0.0 {
            return Err(EconomyError::InvalidCatalog(format!(
                "{}: negative duration {}",
                self.id, self.duration
            )));
        }
        let duration = from_decimal(self.duration).ok_or_else(|| {
            EconomyError::InvalidCatalog(format!("{}: duration out of range", self.id))
        })?;
        let effects = self
            .effects
            .iter()
            .map(|e| e.to_effect(&self.id))
            .collect::<Result<Vec<_>>>()?;
        if duration == Fixed::ZERO && effects.iter().any(ActionEffect::is_modifier) {
            return Err(EconomyError::InvalidCatalog(format!(
                "{}: modifier effects need a positive duration",
                self.id
            )));
        }

        Ok(CreditAction {
            id: ActionId(self.id.clone()),
            name: self.name.clone(),
            description: self.description.clone(),
            cost: self.cost.to_amounts(&self.id)?,
            duration,
            effects,
            active: false,
            time_remaining: Fixed::ZERO,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timed_action() {
        let action: ActionData = ron::from_str(
            r#"ActionData(
                id: "researchSprint",
                name: "Research Sprint",
                cost: (credits: 300.0),
                duration: 60.0,
                effects: [
                    BoostResourceGeneration(resource: ResearchData, multiplier: 2.0),
                    AccelerateResearch(multiplier: 2.0),
                ],
            )"#,
        )
        .unwrap();

        let runtime = action.to_action().unwrap();
        assert!(runtime.is_timed());
        assert_eq!(runtime.effects.len(), 2);
    }

    #[test]
    fn test_instant_modifier_rejected() {
        let action: ActionData = ron::from_str(
            r#"ActionData(
                id: "broken",
                name: "Broken",
                cost: (credits: 1.0),
                effects: [ScaleUpkeep(factor: 0.5)],
            )"#,
        )
        .unwrap();
        assert!(action.to_action().is_err());
    }
}
