//! The game-state aggregate and the tick pipeline.
//!
//! [`Simulation`] owns every piece of economy state: the ledger, both
//! unlock graphs, buildings, the team and credit actions. Player intents
//! are synchronous commands returning typed results; time advances only
//! through [`Simulation::tick`].
//!
//! # Determinism
//!
//! - No floating-point math (uses fixed-point via [`Fixed`])
//! - No randomness and no wall clock
//! - Ordered collections everywhere, so iteration order is stable
//! - Same commands and ticks always produce the same state hash
//!
//! # Example
//!
//! ```
//! use idle_core::prelude::*;
//!
//! let mut sim = Simulation::builtin().unwrap();
//! sim.choose_starter("delta_01").unwrap();
//!
//! // Research data trickles in from the starter
//! while !sim.can_unlock("basicEnergySystems") {
//!     sim.tick();
//! }
//! sim.unlock("basicEnergySystems").unwrap();
//! assert!(sim.technologies().is_unlocked("basicEnergySystems"));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::{debug, trace, warn};

use crate::actions::{ActionBook, ActionId, Activation, CreditAction};
use crate::buildings::{BuildingBlueprint, Buildings, InstanceId};
use crate::config::{EconomyConfig, EconomyRules};
use crate::data::{Catalog, CatalogParts};
use crate::error::Result;
use crate::math::Fixed;
use crate::pipeline::{settle, ResourceFlow};
use crate::research::{ResearchLab, ResearchProgress};
use crate::resources::{ResourceAmounts, ResourceKind, ResourceLedger};
use crate::team::{MemberId, RecruitSpec, Team};
use crate::unlocks::{NodeId, UnlockEffect, UnlockGraph, UnlockNode};

/// What happened during one tick.
///
/// The host uses this to decide what to re-render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number after this tick ran.
    pub tick: u64,
    /// Fraction of non-energy building output delivered.
    pub efficiency: Fixed,
    /// Energy upkeep actually paid.
    pub upkeep_paid: Fixed,
    /// Per-resource change before the passive multiplier.
    pub net_change: ResourceAmounts,
    /// Timed actions that ran out this tick.
    pub expired_actions: Vec<ActionId>,
    /// Research project that finished this tick.
    pub completed_research: Option<NodeId>,
}

/// The economy game state.
///
/// # Tick Order
///
/// Each tick runs these stages in order; later stages read ledger state
/// written by earlier ones:
/// 1. **Flow** - team generation, building output and upkeep at the
///    current modifiers
/// 2. **Settle** - energy-deficit throttle, upkeep and income committed
/// 3. **Multiplier** - compound every positive balance
/// 4. **Actions** - count down timed actions and expire them
/// 5. **Research** - advance the active project and apply completion
#[derive(Debug, Clone)]
pub struct Simulation {
    rules: EconomyRules,
    tick: u64,
    ledger: ResourceLedger,
    technologies: UnlockGraph,
    research: ResearchLab,
    buildings: Buildings,
    team: Team,
    actions: ActionBook,
    /// Summed permanent production bonus percentages per resource.
    production_bonus: ResourceAmounts,
}

impl Simulation {
    /// Create a simulation from a config and a catalog.
    ///
    /// Both are validated; the ledger starts empty.
    pub fn new(config: &EconomyConfig, catalog: &Catalog) -> Result<Self> {
        let rules = config.rules()?;
        let parts = catalog.build()?;
        Ok(Self::from_parts(rules, parts))
    }

    /// Default config with the built-in catalog.
    pub fn builtin() -> Result<Self> {
        Self::new(&EconomyConfig::default(), &Catalog::builtin()?)
    }

    /// Assemble a simulation from already-built parts.
    #[must_use]
    pub fn from_parts(rules: EconomyRules, parts: CatalogParts) -> Self {
        Self {
            rules,
            tick: 0,
            ledger: ResourceLedger::new(),
            technologies: parts.technologies,
            research: ResearchLab::new(parts.research),
            buildings: parts.buildings,
            team: Team::new(rules.team, parts.starters),
            actions: parts.actions,
            production_bonus: ResourceAmounts::ZERO,
        }
    }

    // ------------------------------------------------------------------
    // State access
    // ------------------------------------------------------------------

    /// Get the current tick number.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.tick
    }

    /// The validated economy parameters.
    #[must_use]
    pub const fn rules(&self) -> &EconomyRules {
        &self.rules
    }

    /// The resource ledger.
    #[must_use]
    pub const fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// The technology tree.
    #[must_use]
    pub const fn technologies(&self) -> &UnlockGraph {
        &self.technologies
    }

    /// Research projects and the active slot.
    #[must_use]
    pub const fn research(&self) -> &ResearchLab {
        &self.research
    }

    /// Blueprints and constructed buildings.
    #[must_use]
    pub const fn buildings(&self) -> &Buildings {
        &self.buildings
    }

    /// The operative roster.
    #[must_use]
    pub const fn team(&self) -> &Team {
        &self.team
    }

    /// Credit actions and their timers.
    #[must_use]
    pub const fn actions(&self) -> &ActionBook {
        &self.actions
    }

    /// Summed permanent production bonus percentages.
    #[must_use]
    pub const fn production_bonus(&self) -> &ResourceAmounts {
        &self.production_bonus
    }

    // ------------------------------------------------------------------
    // Ledger primitives
    // ------------------------------------------------------------------

    /// Current amount of a resource.
    #[must_use]
    pub const fn get_resource(&self, kind: ResourceKind) -> Fixed {
        self.ledger.get(kind)
    }

    /// Add to a resource, clamped at zero.
    pub fn add_resource(&mut self, kind: ResourceKind, amount: Fixed) {
        self.ledger.add(kind, amount);
    }

    /// Spend a resource if available.
    pub fn spend_resource(&mut self, kind: ResourceKind, amount: Fixed) -> bool {
        self.ledger.spend(kind, amount)
    }

    /// A manual click: grants the click bonus of every resource.
    pub fn manual_click(&mut self) -> ResourceAmounts {
        let granted = ResourceAmounts::splat(self.rules.click_bonus);
        self.ledger.add_all(&granted);
        trace!(tick = self.tick, "Manual click");
        granted
    }

    // ------------------------------------------------------------------
    // Technology tree
    // ------------------------------------------------------------------

    /// Check whether a technology could be unlocked now.
    pub fn check_unlock(&self, id: &str) -> Result<&UnlockNode> {
        self.technologies
            .check_unlock(id, &self.ledger, &self.technologies)
    }

    /// Whether a technology could be unlocked now.
    #[must_use]
    pub fn can_unlock(&self, id: &str) -> bool {
        self.check_unlock(id).is_ok()
    }

    /// Unlock a technology and apply its effects.
    pub fn unlock(&mut self, id: &str) -> Result<Vec<UnlockEffect>> {
        let effects = self.technologies.unlock(id, &mut self.ledger)?;
        debug!(tick = self.tick, id, effects = effects.len(), "Technology unlocked");
        self.apply_unlock_effects(id, &effects);
        Ok(effects)
    }

    /// Technologies unlockable right now, by tier then id.
    #[must_use]
    pub fn available_technologies(&self) -> Vec<NodeId> {
        self.technologies.available(&self.ledger)
    }

    // ------------------------------------------------------------------
    // Research
    // ------------------------------------------------------------------

    /// Check whether a research project could start now.
    pub fn check_start_research(&self, id: &str) -> Result<()> {
        self.research
            .check_start(id, &self.ledger, &self.technologies)
    }

    /// Whether a research project could start now.
    #[must_use]
    pub fn can_start_research(&self, id: &str) -> bool {
        self.check_start_research(id).is_ok()
    }

    /// Pay for a research project and start it.
    pub fn start_research(&mut self, id: &str) -> Result<()> {
        self.research
            .start(id, &mut self.ledger, &self.technologies)?;
        debug!(tick = self.tick, id, "Research started");
        Ok(())
    }

    /// Progress of the active research project.
    #[must_use]
    pub fn research_progress(&self) -> Option<ResearchProgress> {
        self.research.progress()
    }

    // ------------------------------------------------------------------
    // Team
    // ------------------------------------------------------------------

    /// Take the free starting operative.
    pub fn choose_starter(&mut self, id: &str) -> Result<MemberId> {
        let member = self.team.choose_starter(id)?;
        debug!(tick = self.tick, id, "Starter chosen");
        Ok(member)
    }

    /// Check whether a paid recruit could be hired now.
    pub fn check_recruit(&self, spec: &RecruitSpec) -> Result<()> {
        self.team.check_recruit(spec, &self.ledger)
    }

    /// Whether a paid recruit could be hired now.
    #[must_use]
    pub fn can_recruit(&self, spec: &RecruitSpec) -> bool {
        self.check_recruit(spec).is_ok()
    }

    /// Hire a paid recruit.
    pub fn recruit(&mut self, spec: &RecruitSpec) -> Result<MemberId> {
        let cost = self.team.next_recruit_cost();
        let member = self.team.recruit(spec, &mut self.ledger)?;
        debug!(
            tick = self.tick,
            member = member.0,
            cost = %cost,
            next_cost = %self.team.next_recruit_cost(),
            "Operative recruited"
        );
        Ok(member)
    }

    /// Credits needed for the next paid recruit.
    #[must_use]
    pub const fn next_recruit_cost(&self) -> Fixed {
        self.team.next_recruit_cost()
    }

    // ------------------------------------------------------------------
    // Buildings
    // ------------------------------------------------------------------

    /// Check whether a building could be constructed now.
    pub fn check_build(&self, id: &str) -> Result<&BuildingBlueprint> {
        self.buildings.check_build(id, &self.ledger)
    }

    /// Whether a building could be constructed now.
    #[must_use]
    pub fn can_build(&self, id: &str) -> bool {
        self.check_build(id).is_ok()
    }

    /// Construct a building.
    pub fn build(&mut self, id: &str) -> Result<InstanceId> {
        let instance = self.buildings.build(id, &mut self.ledger)?;
        debug!(
            tick = self.tick,
            id,
            instance = instance.0,
            count = self.buildings.count(id),
            "Building constructed"
        );
        Ok(instance)
    }

    /// Bring a building online or take it offline.
    pub fn set_operational(&mut self, instance: InstanceId, operational: bool) -> Result<()> {
        self.buildings.set_operational(instance, operational)
    }

    /// Number of constructed instances of a blueprint.
    #[must_use]
    pub fn building_count(&self, id: &str) -> u32 {
        self.buildings.count(id)
    }

    // ------------------------------------------------------------------
    // Credit actions
    // ------------------------------------------------------------------

    /// Check whether a credit action could be activated now.
    pub fn check_activate(&self, id: &str) -> Result<&CreditAction> {
        self.actions.check_activate(id, &self.ledger)
    }

    /// Whether a credit action could be activated now.
    #[must_use]
    pub fn can_activate(&self, id: &str) -> bool {
        self.check_activate(id).is_ok()
    }

    /// Pay for and trigger a credit action.
    pub fn activate_action(&mut self, id: &str) -> Result<Activation> {
        let activation = self.actions.activate(id, &mut self.ledger)?;
        debug!(
            tick = self.tick,
            id,
            duration = %activation.duration,
            "Credit action activated"
        );
        Ok(activation)
    }

    /// Seconds left on a credit action; `None` if unknown.
    #[must_use]
    pub fn action_time_remaining(&self, id: &str) -> Option<Fixed> {
        self.actions.time_remaining(id)
    }

    // ------------------------------------------------------------------
    // Tick pipeline
    // ------------------------------------------------------------------

    /// Per-second rates at the current modifiers.
    #[must_use]
    pub fn resource_flow(&self) -> ResourceFlow {
        ResourceFlow::compute(
            &self.team.total_passive_generation(),
            self.buildings.production_total(),
            self.buildings.upkeep_total(),
            &self.actions.modifiers(),
            &self.production_bonus,
        )
    }

    /// Advance the simulation by one configured tick.
    pub fn tick(&mut self) -> TickReport {
        self.process_tick(self.rules.tick_seconds)
    }

    /// Advance the simulation by `seconds` of simulated time.
    ///
    /// Modifiers are read once at the start, so an action expiring this
    /// tick still applies to every stage of it. Negative `seconds` count
    /// as zero: time never runs backwards.
    pub fn process_tick(&mut self, seconds: Fixed) -> TickReport {
        let seconds = seconds.max(Fixed::ZERO);
        let modifiers = self.actions.modifiers();

        // 1-2. Flow and settlement
        let flow = self.resource_flow();
        let settlement = settle(&mut self.ledger, &flow, seconds);
        if settlement.throttled() {
            warn!(
                tick = self.tick,
                efficiency = %settlement.efficiency,
                required = %settlement.upkeep_required,
                paid = %settlement.upkeep_paid,
                "Energy deficit throttled production"
            );
        }
        trace!(
            tick = self.tick,
            efficiency = %settlement.efficiency,
            net = ?settlement.net,
            "Settled tick"
        );

        // 3. Passive multiplier
        self.ledger.apply_multiplier(self.rules.passive_multiplier);

        // 4. Timed actions
        let expired_actions = self.actions.advance(seconds);
        for id in &expired_actions {
            debug!(tick = self.tick, id = %id, "Credit action expired");
        }

        // 5. Research
        let research_seconds = seconds.saturating_mul(modifiers.research_speed);
        let completed_research = self.research.advance(research_seconds).map(|done| {
            debug!(tick = self.tick, id = %done.project, "Research completed");
            self.apply_unlock_effects(done.project.as_str(), &done.effects);
            done.project
        });

        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        TickReport {
            tick: self.tick,
            efficiency: settlement.efficiency,
            upkeep_paid: settlement.upkeep_paid,
            net_change: settlement.net,
            expired_actions,
            completed_research,
        }
    }

    /// Interpret unlock effects against the game state.
    fn apply_unlock_effects(&mut self, source: &str, effects: &[UnlockEffect]) {
        for effect in effects {
            match effect {
                UnlockEffect::UnlockBuilding(building) => {
                    match self.buildings.unlock_blueprint(building.as_str()) {
                        Ok(true) => debug!(source, building = %building, "Blueprint unlocked"),
                        Ok(false) => {}
                        Err(err) => warn!(source, error = %err, "Unlock effect skipped"),
                    }
                }
                UnlockEffect::AuthorizeRecruitment => {
                    self.team.authorize();
                    debug!(source, "Recruitment authorized");
                }
                UnlockEffect::ProductionBonus { resource, percent } => {
                    let bonus = &mut self.production_bonus[*resource];
                    *bonus = bonus.saturating_add(Fixed::from_num(*percent));
                    debug!(source, resource = %resource, percent, "Production bonus applied");
                }
            }
        }
    }

    /// Calculate a hash of the whole economy state.
    ///
    /// Two simulations with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.ledger.hash(&mut hasher);
        self.technologies.hash(&mut hasher);
        self.research.hash(&mut hasher);
        self.buildings.hash(&mut hasher);
        self.team.hash(&mut hasher);
        self.actions.hash(&mut hasher);
        self.production_bonus.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EconomyError;

    fn sim() -> Simulation {
        Simulation::builtin().unwrap()
    }

    fn fx(n: f64) -> Fixed {
        Fixed::from_num(n)
    }

    #[test]
    fn test_manual_click_grants_every_resource() {
        let mut sim = sim();
        sim.manual_click();
        for kind in ResourceKind::ALL {
            assert_eq!(sim.get_resource(kind), fx(0.1));
        }
    }

    #[test]
    fn test_unlock_effect_makes_blueprint_buildable() {
        let mut sim = sim();
        sim.add_resource(ResourceKind::ResearchData, fx(10.0));
        sim.add_resource(ResourceKind::Material, fx(25.0));
        assert!(matches!(
            sim.check_build("basicSolarArray"),
            Err(EconomyError::PrerequisitesUnmet { .. })
        ));

        sim.unlock("basicEnergySystems").unwrap();

        assert!(sim.can_build("basicSolarArray"));
        assert_eq!(sim.get_resource(ResourceKind::ResearchData), Fixed::ZERO);
    }

    #[test]
    fn test_authorize_recruitment_effect() {
        let mut sim = sim();
        sim.choose_starter("gamma_01").unwrap();
        sim.add_resource(ResourceKind::ResearchData, fx(200.0));
        sim.add_resource(ResourceKind::Credits, fx(500.0));
        assert_eq!(
            sim.recruit(&RecruitSpec::Generic),
            Err(EconomyError::RecruitmentLocked)
        );

        sim.unlock("basicEnergySystems").unwrap();
        sim.unlock("basicMaterialProcessing").unwrap();
        sim.unlock("unlockTeamSlot2").unwrap();

        sim.recruit(&RecruitSpec::Generic).unwrap();
        assert_eq!(sim.team().len(), 2);
        assert_eq!(sim.next_recruit_cost(), fx(175.0));
    }

    #[test]
    fn test_research_completion_applies_bonus() {
        let mut sim = sim();
        sim.add_resource(ResourceKind::ResearchData, fx(150.0));
        sim.add_resource(ResourceKind::Energy, fx(25.0));
        sim.start_research("novelMaterialAnalysis").unwrap();

        let mut completed = None;
        for _ in 0..20 {
            let report = sim.tick();
            if report.completed_research.is_some() {
                completed = Some(report);
            }
        }

        let report = completed.unwrap();
        assert_eq!(report.tick, 20);
        assert_eq!(
            report.completed_research,
            Some(NodeId::from("novelMaterialAnalysis"))
        );
        assert_eq!(sim.production_bonus()[ResourceKind::Material], fx(15.0));
        assert!(sim.research_progress().is_none());
    }

    #[test]
    fn test_research_sprint_halves_research_time() {
        let mut sim = sim();
        sim.add_resource(ResourceKind::ResearchData, fx(150.0));
        sim.add_resource(ResourceKind::Energy, fx(25.0));
        sim.add_resource(ResourceKind::Credits, fx(300.0));
        sim.activate_action("researchSprint").unwrap();
        sim.start_research("novelMaterialAnalysis").unwrap();

        let ticks = (1..=20)
            .find(|_| sim.tick().completed_research.is_some())
            .unwrap();

        assert_eq!(ticks, 10);
    }

    #[test]
    fn test_expired_action_reported_once() {
        let mut sim = sim();
        sim.add_resource(ResourceKind::Credits, fx(200.0));
        sim.activate_action("overchargeProduction").unwrap();

        let expiries: Vec<u64> = (0..40)
            .map(|_| sim.tick())
            .filter(|r| !r.expired_actions.is_empty())
            .map(|r| r.tick)
            .collect();

        assert_eq!(expiries, vec![30]);
        assert_eq!(sim.action_time_remaining("overchargeProduction"), Some(Fixed::ZERO));
    }

    #[test]
    fn test_negative_tick_does_not_rewind_timers() {
        let mut sim = sim();
        sim.add_resource(ResourceKind::Credits, fx(200.0));
        sim.add_resource(ResourceKind::ResearchData, fx(150.0));
        sim.add_resource(ResourceKind::Energy, fx(25.0));
        sim.activate_action("overchargeProduction").unwrap();
        sim.start_research("novelMaterialAnalysis").unwrap();
        sim.process_tick(fx(5.0));

        let report = sim.process_tick(fx(-10.0));

        assert_eq!(report.tick, 2);
        assert_eq!(sim.action_time_remaining("overchargeProduction"), Some(fx(25.0)));
        let progress = sim.research_progress().unwrap();
        assert_eq!(progress.elapsed, fx(5.0));
    }

    #[test]
    fn test_state_hash_tracks_changes() {
        let a = sim();
        let mut b = sim();
        assert_eq!(a.state_hash(), b.state_hash());

        b.manual_click();
        assert_ne!(a.state_hash(), b.state_hash());
    }
}
