//! Scripted player strategies for headless playtesting.
//!
//! A strategy picks a starter and then works through an ordered plan of
//! intents, one step at a time. Steps that cannot succeed yet are retried
//! on later ticks; see [`crate::runner`].

use serde::{Deserialize, Serialize};

use idle_core::data::Catalog;

use crate::error::{HeadlessError, Result};

/// Strategy shipped with the crate.
const BALANCED_STRATEGY: &str = include_str!("../strategies/balanced.ron");

/// One player intent in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStep {
    /// Unlock a technology.
    Unlock(String),
    /// Start a research project.
    Research(String),
    /// Construct a building.
    Build(String),
    /// Hire a generic operative.
    RecruitGeneric,
    /// Hire a named starter as a paid recruit.
    RecruitSpecialist(String),
    /// Trigger a credit action.
    Activate(String),
    /// Click this many times in one tick.
    Click(u32),
}

impl std::fmt::Display for PlanStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlock(id) => write!(f, "unlock {id}"),
            Self::Research(id) => write!(f, "research {id}"),
            Self::Build(id) => write!(f, "build {id}"),
            Self::RecruitGeneric => write!(f, "recruit operative"),
            Self::RecruitSpecialist(id) => write!(f, "recruit {id}"),
            Self::Activate(id) => write!(f, "activate {id}"),
            Self::Click(n) => write!(f, "click x{n}"),
        }
    }
}

/// A complete scripted strategy.
///
/// # Example RON
///
/// ```ron
/// Strategy(
///     name: "Energy first",
///     starter: "alpha_01",
///     clicks_per_tick: 2,
///     plan: [
///         Unlock("basicEnergySystems"),
///         Build("basicSolarArray"),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    /// Strategy name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Starter taken on the first tick.
    pub starter: String,
    /// Manual clicks every tick, on top of plan steps.
    #[serde(default)]
    pub clicks_per_tick: u32,
    /// Ticks to keep retrying a blocked step before skipping it.
    #[serde(default = "default_patience")]
    pub patience_ticks: u64,
    /// Ordered intents.
    pub plan: Vec<PlanStep>,
}

fn default_patience() -> u64 {
    600
}

impl Strategy {
    /// Load from a RON string. `source_name` labels parse errors.
    pub fn from_ron_str(source: &str, source_name: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| HeadlessError::Parse {
            path: source_name.to_string(),
            message: e.to_string(),
        })
    }

    /// The built-in balanced opening.
    pub fn balanced() -> Result<Self> {
        Self::from_ron_str(BALANCED_STRATEGY, "balanced strategy")
    }

    /// Check every id in the plan against `catalog`.
    ///
    /// Returns a list of problems; empty means the strategy is playable.
    #[must_use]
    pub fn validate(&self, catalog: &Catalog) -> Vec<String> {
        let mut errors = Vec::new();
        let has_starter = |id: &str| catalog.starters.iter().any(|s| s.id == id);

        if !has_starter(&self.starter) {
            errors.push(format!("Unknown starter '{}'", self.starter));
        }

        for (index, step) in self.plan.iter().enumerate() {
            let known = match step {
                PlanStep::Unlock(id) => catalog.get_technology(id).is_some(),
                PlanStep::Research(id) => catalog.get_research(id).is_some(),
                PlanStep::Build(id) => catalog.get_building(id).is_some(),
                PlanStep::RecruitSpecialist(id) => has_starter(id),
                PlanStep::Activate(id) => catalog.actions.iter().any(|a| a.id == *id),
                PlanStep::RecruitGeneric | PlanStep::Click(_) => true,
            };
            if !known {
                errors.push(format!("Step {index} ({step}) names unknown content"));
            }
        }

        errors
    }
}
