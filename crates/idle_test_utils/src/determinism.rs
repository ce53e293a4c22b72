//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the economy produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Offline progress and balance runs replay thousands of ticks, so the
//! simulation must be fully deterministic. Sources of non-determinism
//! include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`idle_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Every catalog in the core is a `BTreeMap`.
//!
//! - **Wall clock**: The core never reads time; hosts feed ticks.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use idle_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic,
            "Economy is non-deterministic!\n\
             Runs: {}\n\
             Ticks: {}\n\
             Unique hashes: {} (expected 1)\n\
             All hashes: {:?}",
            self.hashes.len(),
            self.ticks,
            self.unique_hashes().len(),
            self.hashes
        );
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Creates the initial state
/// * `step` - Advances the state by one tick
/// * `hash` - Computes the state hash
///
/// # Example
///
/// ```
/// use idle_test_utils::determinism::verify_determinism;
/// use idle_test_utils::fixtures::solar_economy;
///
/// let result = verify_determinism(
///     3,
///     100,
///     || solar_economy(2),
///     |sim| { sim.tick(); },
///     |sim| sim.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..ticks {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a [`Simulation`] twice from `setup_fn` and compare final hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim| {
            sim.tick();
        },
        Simulation::state_hash,
    )
    .is_deterministic
}

/// Run `num_sims` simulations on scoped threads and compare final hashes.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        sim.tick();
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two runs tick-by-tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(tick)` otherwise.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        sim1.tick();
        sim2.tick();

        if sim1.state_hash() != sim2.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for economy testing.
pub mod strategies {
    use idle_core::math::Fixed;
    use idle_core::resources::ResourceKind;
    use idle_core::simulation::Simulation;
    use idle_core::team::RecruitSpec;
    use proptest::prelude::*;

    /// Technologies in the built-in catalog.
    pub const TECHNOLOGIES: &[&str] = &[
        "basicEnergySystems",
        "basicMaterialProcessing",
        "basicEconomicModels",
        "methodicalExperimentation",
        "unlockTeamSlot2",
        "improvedSolarPanels",
        "automatedManufacturing",
    ];

    /// Buildings reachable through [`TECHNOLOGIES`].
    pub const BUILDINGS: &[&str] = &[
        "basicSolarArray",
        "basicFabricator",
        "creditExchangeTerminal",
        "basicScienceLab",
        "advancedSolarArray",
        "automatedFabricator",
    ];

    /// Research projects in the built-in catalog.
    pub const RESEARCH: &[&str] = &["basicAutomationProtocols", "novelMaterialAnalysis"];

    /// Credit actions in the built-in catalog.
    pub const ACTIONS: &[&str] = &[
        "overchargeProduction",
        "emergencyEnergy",
        "emergencyMaterial",
        "researchSprint",
        "systemCalibration",
    ];

    /// One player intent or the passage of time.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Intent {
        /// Manual click.
        Click,
        /// Unlock a technology.
        Unlock(&'static str),
        /// Start a research project.
        Research(&'static str),
        /// Construct a building.
        Build(&'static str),
        /// Hire a generic operative.
        Recruit,
        /// Trigger a credit action.
        Activate(&'static str),
        /// Run this many ticks.
        Wait(u8),
    }

    impl Intent {
        /// Apply to `sim`; returns whether a command succeeded.
        ///
        /// Failed commands are expected and leave the state untouched.
        pub fn apply(&self, sim: &mut Simulation) -> bool {
            match self {
                Self::Click => {
                    sim.manual_click();
                    true
                }
                Self::Unlock(id) => sim.unlock(id).is_ok(),
                Self::Research(id) => sim.start_research(id).is_ok(),
                Self::Build(id) => sim.build(id).is_ok(),
                Self::Recruit => sim.recruit(&RecruitSpec::Generic).is_ok(),
                Self::Activate(id) => sim.activate_action(id).is_ok(),
                Self::Wait(ticks) => {
                    for _ in 0..*ticks {
                        sim.tick();
                    }
                    true
                }
            }
        }
    }

    /// Generate any resource kind.
    pub fn arb_resource_kind() -> impl Strategy<Value = ResourceKind> {
        prop::sample::select(ResourceKind::ALL.to_vec())
    }

    /// Generate an amount between 0 and 1000 with 1/100 resolution.
    pub fn arb_amount() -> impl Strategy<Value = Fixed> {
        (0i32..100_000).prop_map(|n| Fixed::from_num(n) / 100)
    }

    /// Generate a player intent.
    pub fn arb_intent() -> impl Strategy<Value = Intent> {
        prop_oneof![
            Just(Intent::Click),
            prop::sample::select(TECHNOLOGIES).prop_map(Intent::Unlock),
            prop::sample::select(RESEARCH).prop_map(Intent::Research),
            prop::sample::select(BUILDINGS).prop_map(Intent::Build),
            Just(Intent::Recruit),
            prop::sample::select(ACTIONS).prop_map(Intent::Activate),
            (1u8..30).prop_map(Intent::Wait),
        ]
    }

    /// Generate a sequence of intents.
    pub fn arb_intent_sequence(max_len: usize) -> impl Strategy<Value = Vec<Intent>> {
        proptest::collection::vec(arb_intent(), 0..max_len)
    }
}
