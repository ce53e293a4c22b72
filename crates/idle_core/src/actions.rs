//! Credit actions: instant grants and timed modifiers.
//!
//! An action with zero duration grants its resources synchronously on
//! activation and has no lifecycle. A timed action stays active for its
//! duration; while active its modifiers are folded into every tick.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, Result};
use crate::math::Fixed;
use crate::resources::{ResourceAmounts, ResourceKind, ResourceLedger};

/// Unique identifier for a credit action.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActionId(pub String);

impl ActionId {
    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for ActionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// What an action does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionEffect {
    /// Add resources to the ledger on activation.
    GrantResources(ResourceAmounts),
    /// Multiply all building production while active.
    BoostBuildingProduction {
        /// Production multiplier.
        multiplier: Fixed,
    },
    /// Multiply building upkeep while active.
    ScaleUpkeep {
        /// Upkeep factor (below one is a reduction).
        factor: Fixed,
    },
    /// Multiply generation of one resource from buildings and team.
    BoostResourceGeneration {
        /// Resource affected.
        resource: ResourceKind,
        /// Generation multiplier.
        multiplier: Fixed,
    },
    /// Multiply the rate at which research progresses.
    AccelerateResearch {
        /// Research speed multiplier.
        multiplier: Fixed,
    },
}

impl ActionEffect {
    /// Whether the effect only makes sense on a timed action.
    #[must_use]
    pub const fn is_modifier(&self) -> bool {
        !matches!(self, Self::GrantResources(_))
    }
}

/// Pipeline multipliers from every active timed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Applied to every building's production.
    pub building_production: Fixed,
    /// Applied to building upkeep.
    pub upkeep: Fixed,
    /// Per-resource multiplier on building and team generation.
    pub generation: ResourceAmounts,
    /// Applied to research progress.
    pub research_speed: Fixed,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            building_production: Fixed::ONE,
            upkeep: Fixed::ONE,
            generation: ResourceAmounts::ONE,
            research_speed: Fixed::ONE,
        }
    }
}

impl Modifiers {
    /// Fold one effect in. Modifiers of the same class multiply.
    pub fn apply(&mut self, effect: &ActionEffect) {
        match effect {
            ActionEffect::GrantResources(_) => {}
            ActionEffect::BoostBuildingProduction { multiplier } => {
                self.building_production = self.building_production.saturating_mul(*multiplier);
            }
            ActionEffect::ScaleUpkeep { factor } => {
                self.upkeep = self.upkeep.saturating_mul(*factor);
            }
            ActionEffect::BoostResourceGeneration {
                resource,
                multiplier,
            } => {
                self.generation[*resource] = self.generation[*resource].saturating_mul(*multiplier);
            }
            ActionEffect::AccelerateResearch { multiplier } => {
                self.research_speed = self.research_speed.saturating_mul(*multiplier);
            }
        }
    }
}

/// A purchasable credit action and its timer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CreditAction {
    /// Action id.
    pub id: ActionId,
    /// Display name.
    pub name: String,
    /// Flavor text.
    pub description: String,
    /// Activation cost.
    pub cost: ResourceAmounts,
    /// Seconds active; zero for instant actions.
    pub duration: Fixed,
    /// What activation does.
    pub effects: Vec<ActionEffect>,
    /// Whether a timed action is running.
    pub active: bool,
    /// Seconds left while active.
    pub time_remaining: Fixed,
}

impl CreditAction {
    /// Whether the action has an active/expiry lifecycle.
    #[must_use]
    pub fn is_timed(&self) -> bool {
        self.duration > Fixed::ZERO
    }

    /// Resources granted on activation.
    #[must_use]
    pub fn grants(&self) -> ResourceAmounts {
        self.effects
            .iter()
            .fold(ResourceAmounts::ZERO, |acc, effect| match effect {
                ActionEffect::GrantResources(amounts) => acc.plus(amounts),
                _ => acc,
            })
    }
}

/// Outcome of a successful activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// The action.
    pub action: ActionId,
    /// Resources added to the ledger.
    pub granted: ResourceAmounts,
    /// Seconds the action will stay active; zero for instant actions.
    pub duration: Fixed,
}

/// Every credit action keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ActionBook {
    actions: BTreeMap<ActionId, CreditAction>,
}

impl ActionBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action. Duplicate ids are rejected.
    pub fn insert(&mut self, action: CreditAction) -> Result<()> {
        if self.actions.contains_key(action.id.as_str()) {
            return Err(EconomyError::InvalidCatalog(format!(
                "duplicate action id: {}",
                action.id
            )));
        }
        self.actions.insert(action.id.clone(), action);
        Ok(())
    }

    /// Look up an action.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CreditAction> {
        self.actions.get(id)
    }

    /// All actions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &CreditAction> {
        self.actions.values()
    }

    /// Ids of running timed actions.
    #[must_use]
    pub fn active_ids(&self) -> Vec<ActionId> {
        self.actions
            .values()
            .filter(|a| a.active)
            .map(|a| a.id.clone())
            .collect()
    }

    /// Seconds left on an action; zero when inactive, `None` if unknown.
    #[must_use]
    pub fn time_remaining(&self, id: &str) -> Option<Fixed> {
        self.get(id)
            .map(|a| if a.active { a.time_remaining } else { Fixed::ZERO })
    }

    /// Check whether `id` could be activated now.
    pub fn check_activate(&self, id: &str, ledger: &ResourceLedger) -> Result<&CreditAction> {
        let action = self
            .get(id)
            .ok_or_else(|| EconomyError::not_found("action", id))?;
        if action.is_timed() && action.active {
            return Err(EconomyError::AlreadyActive(id.to_string()));
        }
        ledger.check_affordable(&action.cost)?;
        Ok(action)
    }

    /// Boolean form of [`check_activate`](Self::check_activate).
    #[must_use]
    pub fn can_activate(&self, id: &str, ledger: &ResourceLedger) -> bool {
        self.check_activate(id, ledger).is_ok()
    }

    /// Pay for and trigger an action.
    ///
    /// Instant grants land in the ledger before this returns. Timed
    /// actions start their countdown.
    pub fn activate(&mut self, id: &str, ledger: &mut ResourceLedger) -> Result<Activation> {
        let cost = self.check_activate(id, ledger)?.cost;
        ledger.spend_all(&cost)?;

        let action = self
            .actions
            .get_mut(id)
            .ok_or_else(|| EconomyError::not_found("action", id))?;
        let granted = action.grants();
        ledger.add_all(&granted);
        if action.is_timed() {
            action.active = true;
            action.time_remaining = action.duration;
        }
        Ok(Activation {
            action: action.id.clone(),
            granted,
            duration: action.duration,
        })
    }

    /// Count every running timer down by `seconds`.
    ///
    /// Returns the actions that expired, each exactly once.
    pub fn advance(&mut self, seconds: Fixed) -> Vec<ActionId> {
        let mut expired = Vec::new();
        for action in self.actions.values_mut().filter(|a| a.active) {
            action.time_remaining = action.time_remaining.saturating_sub(seconds);
            if action.time_remaining <= Fixed::ZERO {
                action.time_remaining = Fixed::ZERO;
                action.active = false;
                expired.push(action.id.clone());
            }
        }
        expired
    }

    /// Combined modifiers of all running actions.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        let mut modifiers = Modifiers::default();
        for action in self.actions.values().filter(|a| a.active) {
            for effect in &action.effects {
                modifiers.apply(effect);
            }
        }
        modifiers
    }
}
