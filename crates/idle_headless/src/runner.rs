//! Strategy runner: the host loop around a [`Simulation`].
//!
//! The runner feeds simulated frame time into a [`TickClock`] and runs
//! whatever ticks it releases. Before each tick it clicks, then tries the
//! next plan step. A step that fails for a transient reason (not enough
//! resources yet, slot busy) is retried on later ticks until the
//! strategy's patience runs out; any other failure skips the step.

use tracing::{debug, info, warn};

use idle_core::clock::TickClock;
use idle_core::error::EconomyError;
use idle_core::simulation::Simulation;
use idle_core::team::RecruitSpec;

use crate::error::Result;
use crate::report::{RunSummary, StepRecord, TickSample};
use crate::strategy::{PlanStep, Strategy};

/// Host loop parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Simulated wall time to run, in seconds.
    pub seconds: u64,
    /// Wall time fed to the clock per frame, in milliseconds.
    pub frame_ms: u64,
    /// Keep a ledger sample for every tick.
    pub record_history: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seconds: 600,
            frame_ms: 250,
            record_history: false,
        }
    }
}

/// Plays one strategy against one simulation.
#[derive(Debug)]
pub struct HeadlessRunner {
    sim: Simulation,
    clock: TickClock,
    strategy: Strategy,
    config: RunConfig,
    next_step: usize,
    blocked_since: Option<u64>,
    completed: Vec<StepRecord>,
    skipped: Vec<StepRecord>,
    history: Vec<TickSample>,
}

impl HeadlessRunner {
    /// Prepare a run. The strategy's starter is chosen immediately.
    pub fn new(mut sim: Simulation, strategy: Strategy, config: RunConfig) -> Result<Self> {
        sim.choose_starter(&strategy.starter)?;
        let clock = TickClock::from_rules(sim.rules());
        Ok(Self {
            sim,
            clock,
            strategy,
            config,
            next_step: 0,
            blocked_since: None,
            completed: Vec::new(),
            skipped: Vec::new(),
            history: Vec::new(),
        })
    }

    /// The simulation being driven.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Run for the configured time and summarize.
    pub fn run(mut self) -> RunSummary {
        info!(
            strategy = %self.strategy.name,
            seconds = self.config.seconds,
            steps = self.strategy.plan.len(),
            "Starting headless run"
        );

        let total_ms = self.config.seconds.saturating_mul(1_000);
        let frame_ms = self.config.frame_ms.max(1);
        let mut elapsed_ms = 0;
        while elapsed_ms < total_ms {
            let frame = frame_ms.min(total_ms - elapsed_ms);
            elapsed_ms += frame;
            for _ in 0..self.clock.advance(frame) {
                self.step();
            }
        }

        info!(
            ticks = self.sim.get_tick(),
            completed = self.completed.len(),
            skipped = self.skipped.len(),
            "Headless run finished"
        );

        RunSummary::from_simulation(
            &self.sim,
            &self.strategy.name,
            self.completed,
            self.skipped,
            self.history,
        )
    }

    /// One tick: clicks, one plan attempt, then the simulation tick.
    pub fn step(&mut self) {
        for _ in 0..self.strategy.clicks_per_tick {
            self.sim.manual_click();
        }
        self.attempt_plan_step();

        let report = self.sim.tick();
        if let Some(project) = &report.completed_research {
            info!(tick = report.tick, project = %project, "Research completed");
        }
        if self.config.record_history {
            self.history.push(TickSample::capture(&self.sim, &report));
        }
    }

    fn attempt_plan_step(&mut self) {
        let Some(step) = self.strategy.plan.get(self.next_step).cloned() else {
            return;
        };
        let tick = self.sim.get_tick();

        match execute(&mut self.sim, &step) {
            Ok(()) => {
                debug!(tick, step = %step, "Plan step completed");
                self.completed.push(StepRecord {
                    index: self.next_step,
                    step: step.to_string(),
                    tick,
                    reason: None,
                });
                self.advance_plan();
            }
            Err(err) if err.is_transient() && !self.out_of_patience(tick) => {
                self.blocked_since.get_or_insert(tick);
            }
            Err(err) => {
                warn!(tick, step = %step, error = %err, "Plan step skipped");
                self.skipped.push(StepRecord {
                    index: self.next_step,
                    step: step.to_string(),
                    tick,
                    reason: Some(err.to_string()),
                });
                self.advance_plan();
            }
        }
    }

    fn out_of_patience(&self, tick: u64) -> bool {
        self.blocked_since
            .is_some_and(|since| tick.saturating_sub(since) >= self.strategy.patience_ticks)
    }

    fn advance_plan(&mut self) {
        self.next_step += 1;
        self.blocked_since = None;
    }
}

/// Issue one plan step as a simulation command.
fn execute(sim: &mut Simulation, step: &PlanStep) -> std::result::Result<(), EconomyError> {
    match step {
        PlanStep::Unlock(id) => sim.unlock(id).map(|_| ()),
        PlanStep::Research(id) => sim.start_research(id),
        PlanStep::Build(id) => sim.build(id).map(|_| ()),
        PlanStep::RecruitGeneric => sim.recruit(&RecruitSpec::Generic).map(|_| ()),
        PlanStep::RecruitSpecialist(id) => sim
            .recruit(&RecruitSpec::Specialist(id.as_str().into()))
            .map(|_| ()),
        PlanStep::Activate(id) => sim.activate_action(id).map(|_| ()),
        PlanStep::Click(n) => {
            for _ in 0..*n {
                sim.manual_click();
            }
            Ok(())
        }
    }
}
