//! # Idle Core
//!
//! Deterministic economy engine for an incremental clicker game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO beyond the embedded catalog
//! - No randomness or wall clock
//! - No floating-point math in the simulation (uses fixed-point)
//!
//! This separation enables:
//! - Headless balance runs
//! - Offline progress by replaying ticks
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`resources`] - Resource kinds, amounts and the ledger
//! - [`unlocks`] - Prerequisite graphs shared by technologies and research
//! - [`research`] - The single timed research slot
//! - [`buildings`] - Blueprints and constructed instances
//! - [`team`] - Starters, recruits and passive generation
//! - [`actions`] - Credit actions and their timed modifiers
//! - [`pipeline`] - Per-tick flow and energy-deficit settlement
//! - [`simulation`] - The game-state aggregate and tick order
//! - [`clock`] - Wall-time to tick conversion for hosts
//! - [`config`] - Tunable economy parameters
//! - [`data`] - RON content definitions
//! - [`math`] - Fixed-point helpers

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actions;
pub mod buildings;
pub mod clock;
pub mod config;
pub mod data;
pub mod error;
pub mod math;
pub mod pipeline;
pub mod research;
pub mod resources;
pub mod simulation;
pub mod team;
pub mod unlocks;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actions::{ActionBook, ActionEffect, ActionId, Activation, Modifiers};
    pub use crate::buildings::{BuildingBlueprint, BuildingId, Buildings, InstanceId};
    pub use crate::clock::TickClock;
    pub use crate::config::{EconomyConfig, EconomyRules};
    pub use crate::data::Catalog;
    pub use crate::error::{EconomyError, Result};
    pub use crate::math::Fixed;
    pub use crate::pipeline::{ResourceFlow, Settlement};
    pub use crate::research::ResearchProgress;
    pub use crate::resources::{ResourceAmounts, ResourceKind, ResourceLedger};
    pub use crate::simulation::{Simulation, TickReport};
    pub use crate::team::{MemberId, RecruitSpec, Team, TeamRules};
    pub use crate::unlocks::{NodeId, UnlockEffect, UnlockGraph};
}
