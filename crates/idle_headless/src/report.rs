//! Run summaries for humans and machines.
//!
//! Everything here is derived from the simulation's public queries after
//! a run. Fixed-point values are converted to `f64` for output only.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use idle_core::math::to_decimal;
use idle_core::resources::ResourceAmounts;
use idle_core::simulation::{Simulation, TickReport};

use crate::error::Result;

/// A plan step that completed or was given up on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Position in the plan.
    pub index: usize,
    /// Human-readable step.
    pub step: String,
    /// Tick at which the step resolved.
    pub tick: u64,
    /// Why the step was skipped, if it was.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reason: Option<String>,
}

/// Ledger snapshot after one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSample {
    /// Tick number.
    pub tick: u64,
    /// Building efficiency during the tick.
    pub efficiency: f64,
    /// Balances after the tick.
    pub ledger: BTreeMap<String, f64>,
}

impl TickSample {
    /// Sample the simulation right after `report`.
    #[must_use]
    pub fn capture(sim: &Simulation, report: &TickReport) -> Self {
        Self {
            tick: report.tick,
            efficiency: to_decimal(report.efficiency),
            ledger: amounts_map(sim.ledger().amounts()),
        }
    }
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    /// Display name.
    pub name: String,
    /// Specialty, if any.
    pub specialization: Option<String>,
}

/// Final state of a headless run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Strategy that was played.
    pub strategy: String,
    /// Ticks simulated.
    pub ticks: u64,
    /// Deterministic hash of the final state.
    pub state_hash: u64,
    /// Final balances.
    pub ledger: BTreeMap<String, f64>,
    /// Net change per second at the final modifiers.
    pub net_per_second: BTreeMap<String, f64>,
    /// Constructed buildings by blueprint.
    pub buildings: BTreeMap<String, u32>,
    /// Final roster.
    pub roster: Vec<MemberSummary>,
    /// Unlocked technologies.
    pub technologies: Vec<String>,
    /// Completed research projects.
    pub research: Vec<String>,
    /// Plan steps that succeeded.
    pub completed_steps: Vec<StepRecord>,
    /// Plan steps that were skipped.
    pub skipped_steps: Vec<StepRecord>,
    /// Per-tick samples, when recorded.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub history: Vec<TickSample>,
}

impl RunSummary {
    /// Summarize the final state of `sim`.
    #[must_use]
    pub fn from_simulation(
        sim: &Simulation,
        strategy: &str,
        completed_steps: Vec<StepRecord>,
        skipped_steps: Vec<StepRecord>,
        history: Vec<TickSample>,
    ) -> Self {
        let buildings = sim
            .buildings()
            .blueprints()
            .map(|b| (b.id.to_string(), sim.building_count(b.id.as_str())))
            .filter(|(_, count)| *count > 0)
            .collect();

        let roster = sim
            .team()
            .members()
            .iter()
            .map(|m| MemberSummary {
                name: m.name.clone(),
                specialization: m.specialization.map(|k| k.name().to_string()),
            })
            .collect();

        Self {
            strategy: strategy.to_string(),
            ticks: sim.get_tick(),
            state_hash: sim.state_hash(),
            ledger: amounts_map(sim.ledger().amounts()),
            net_per_second: amounts_map(&sim.resource_flow().net()),
            buildings,
            roster,
            technologies: sim
                .technologies()
                .iter()
                .filter(|n| n.unlocked)
                .map(|n| n.id.to_string())
                .collect(),
            research: sim
                .research()
                .projects()
                .iter()
                .filter(|n| n.unlocked)
                .map(|n| n.id.to_string())
                .collect(),
            completed_steps,
            skipped_steps,
            history,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text report for the terminal.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Strategy: {} ({} ticks)", self.strategy, self.ticks);
        let _ = writeln!(out, "State hash: {:016x}", self.state_hash);

        let _ = writeln!(out, "\nResources:");
        for (name, amount) in &self.ledger {
            let rate = self.net_per_second.get(name).copied().unwrap_or_default();
            let _ = writeln!(out, "  {name:<14} {amount:>12.2}  ({rate:+.2}/s)");
        }

        let _ = writeln!(out, "\nBuildings:");
        for (id, count) in &self.buildings {
            let _ = writeln!(out, "  {id:<28} x{count}");
        }

        let _ = writeln!(out, "\nTeam:");
        for member in &self.roster {
            let specialty = member.specialization.as_deref().unwrap_or("generalist");
            let _ = writeln!(out, "  {} [{specialty}]", member.name);
        }

        let _ = writeln!(
            out,
            "\nPlan: {} completed, {} skipped",
            self.completed_steps.len(),
            self.skipped_steps.len()
        );
        for skipped in &self.skipped_steps {
            let reason = skipped.reason.as_deref().unwrap_or("unknown");
            let _ = writeln!(
                out,
                "  skipped #{} {} at tick {}: {reason}",
                skipped.index, skipped.step, skipped.tick
            );
        }
        out
    }
}

/// Balances keyed by display name.
fn amounts_map(amounts: &ResourceAmounts) -> BTreeMap<String, f64> {
    amounts
        .iter()
        .map(|(kind, amount)| (kind.name().to_string(), to_decimal(amount)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use idle_test_utils::fixtures::{developed_economy, solar_economy};

    #[test]
    fn test_summary_lists_only_built_blueprints() {
        let sim = solar_economy(2);
        let summary = RunSummary::from_simulation(&sim, "test", vec![], vec![], vec![]);

        assert_eq!(summary.buildings.len(), 1);
        assert_eq!(summary.buildings["basicSolarArray"], 2);
        assert_eq!(summary.technologies, vec!["basicEnergySystems"]);
        assert!(summary.roster.is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let sim = developed_economy();
        let summary = RunSummary::from_simulation(&sim, "developed", vec![], vec![], vec![]);

        let json = summary.to_json().unwrap();
        let parsed: RunSummary = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.state_hash, summary.state_hash);
        assert_eq!(parsed.buildings, summary.buildings);
        assert_eq!(parsed.roster, summary.roster);
        assert!(!json.contains("history"));
    }

    #[test]
    fn test_text_report_mentions_skips() {
        let sim = solar_economy(1);
        let skipped = vec![StepRecord {
            index: 3,
            step: "build fusionReactor".to_string(),
            tick: 40,
            reason: Some("locked".to_string()),
        }];
        let summary = RunSummary::from_simulation(&sim, "test", vec![], skipped, vec![]);

        let text = summary.render_text();
        assert!(text.contains("skipped #3 build fusionReactor at tick 40: locked"));
        assert!(text.contains("Research Data"));
    }
}
