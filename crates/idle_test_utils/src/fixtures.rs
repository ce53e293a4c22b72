//! Test fixtures and helpers.
//!
//! Pre-built game states for consistent testing. All of them start from
//! the built-in catalog and default config.

use fixed::types::I32F32;
use idle_core::resources::ResourceKind;
use idle_core::simulation::Simulation;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// A fresh simulation with an empty roster and ledger.
///
/// # Panics
///
/// Panics if the built-in catalog fails to load.
#[must_use]
pub fn builtin_sim() -> Simulation {
    Simulation::builtin().expect("built-in catalog is valid")
}

/// A fresh simulation with `starter` already on the roster.
///
/// # Panics
///
/// Panics if `starter` is not a built-in starter.
#[must_use]
pub fn starter_sim(starter: &str) -> Simulation {
    let mut sim = builtin_sim();
    sim.choose_starter(starter).expect("known starter");
    sim
}

/// A simulation holding `amount` of every resource and no team.
#[must_use]
pub fn funded_sim(amount: i32) -> Simulation {
    let mut sim = builtin_sim();
    for kind in ResourceKind::ALL {
        sim.add_resource(kind, fixed(amount));
    }
    sim
}

/// A simulation running `arrays` basic solar arrays and nothing else.
///
/// The ledger is left empty after construction.
///
/// # Panics
///
/// Panics if `arrays` exceeds the solar array cap.
#[must_use]
pub fn solar_economy(arrays: u32) -> Simulation {
    let mut sim = builtin_sim();
    sim.add_resource(ResourceKind::ResearchData, fixed(10));
    sim.unlock("basicEnergySystems")
        .expect("tier 1 technology unlocks");
    for _ in 0..arrays {
        sim.add_resource(ResourceKind::Material, fixed(25));
        sim.build("basicSolarArray").expect("solar array under cap");
    }
    sim
}

/// A mid-game state: every tier 1 technology, recruitment authorized,
/// a mix of buildings and a second operative.
///
/// # Panics
///
/// Panics if the built-in catalog changes shape.
#[must_use]
pub fn developed_economy() -> Simulation {
    let mut sim = starter_sim("beta_01");
    for kind in ResourceKind::ALL {
        sim.add_resource(kind, fixed(2_000));
    }
    for tech in [
        "basicEnergySystems",
        "basicMaterialProcessing",
        "basicEconomicModels",
        "methodicalExperimentation",
        "unlockTeamSlot2",
    ] {
        sim.unlock(tech).expect("tier 1 technology unlocks");
    }
    for building in [
        "basicSolarArray",
        "basicSolarArray",
        "basicSolarArray",
        "basicFabricator",
        "creditExchangeTerminal",
        "basicScienceLab",
    ] {
        sim.build(building).expect("affordable building");
    }
    sim.recruit(&idle_core::team::RecruitSpec::Generic)
        .expect("recruitment authorized");
    sim
}
