//! Headless economy runner for balance testing and CI verification.
//!
//! This crate is the host side of the economy: it owns the wall-time
//! loop, reads content and configuration from disk, and plays scripted
//! strategies through the core's command API. It enables:
//!
//! - **Balance testing**: How far does a given opening get in ten minutes?
//! - **Content validation**: Catch broken catalogs before they ship
//! - **Determinism checks**: Same strategy, same state hash
//!
//! # Example
//!
//! ```bash
//! # Play the built-in strategy for ten simulated minutes
//! cargo run -p idle_headless -- run --seconds 600
//!
//! # Validate modded content
//! cargo run -p idle_headless -- validate --catalog mods/catalog.ron
//! ```

pub mod error;
pub mod loader;
pub mod report;
pub mod runner;
pub mod strategy;

pub use error::{HeadlessError, Result};
pub use report::RunSummary;
pub use runner::{HeadlessRunner, RunConfig};
pub use strategy::{PlanStep, Strategy};
