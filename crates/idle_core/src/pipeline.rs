//! Per-tick production, upkeep and energy-deficit throttling.
//!
//! [`ResourceFlow`] is the per-second picture of the economy at the
//! current modifiers. [`settle`] commits one tick of that flow to the
//! ledger. When the tick's available energy cannot cover building
//! upkeep, every non-energy building output is scaled down by the
//! fraction that could be funded. Energy output and team generation are
//! never throttled.

use crate::actions::Modifiers;
use crate::math::{percent_of, unit_ratio, Fixed};
use crate::resources::{ResourceAmounts, ResourceKind, ResourceLedger};

/// Per-second rates after modifiers, before throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResourceFlow {
    /// Passive team generation.
    pub team: ResourceAmounts,
    /// Building production.
    pub building_production: ResourceAmounts,
    /// Building upkeep (Energy only).
    pub upkeep: ResourceAmounts,
}

impl ResourceFlow {
    /// Fold modifiers and permanent bonuses into raw rates.
    ///
    /// `bonus_percent` holds the summed permanent production bonus per
    /// resource, applied to building output only.
    #[must_use]
    pub fn compute(
        team: &ResourceAmounts,
        building_production: &ResourceAmounts,
        building_upkeep: &ResourceAmounts,
        modifiers: &Modifiers,
        bonus_percent: &ResourceAmounts,
    ) -> Self {
        let mut production = building_production.scaled(modifiers.building_production);
        for kind in ResourceKind::ALL {
            let base = production[kind];
            production[kind] = base.saturating_add(percent_bonus(base, bonus_percent[kind]));
        }

        Self {
            team: team.times(&modifiers.generation),
            building_production: production.times(&modifiers.generation),
            upkeep: building_upkeep.scaled(modifiers.upkeep),
        }
    }

    /// Gross per-second income, team plus buildings.
    #[must_use]
    pub fn income(&self) -> ResourceAmounts {
        self.team.plus(&self.building_production)
    }

    /// Per-second net change with upkeep fully funded.
    #[must_use]
    pub fn net(&self) -> ResourceAmounts {
        self.income().minus(&self.upkeep)
    }
}

fn percent_bonus(value: Fixed, percent: Fixed) -> Fixed {
    // Bonuses are whole percentages
    percent_of(value, percent.to_num::<i32>())
}

/// What one tick did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Settlement {
    /// Fraction of non-energy building output delivered, in `[0, 1]`.
    pub efficiency: Fixed,
    /// Energy upkeep owed this tick.
    pub upkeep_required: Fixed,
    /// Energy upkeep actually paid.
    pub upkeep_paid: Fixed,
    /// Change in every balance, before the passive multiplier.
    pub net: ResourceAmounts,
}

impl Settlement {
    /// Whether upkeep could not be fully funded.
    #[must_use]
    pub fn throttled(&self) -> bool {
        self.efficiency < Fixed::ONE
    }
}

/// Commit `seconds` of `flow` to the ledger.
///
/// Available energy is the current balance plus this tick's energy
/// income. If that falls short of the upkeep owed, non-energy building
/// output is scaled by `available / required` and all available energy is
/// consumed, leaving Energy at exactly zero. Income is credited before
/// upkeep is paid, so positive energy income this tick can cover upkeep
/// that the opening balance alone could not.
pub fn settle(ledger: &mut ResourceLedger, flow: &ResourceFlow, seconds: Fixed) -> Settlement {
    let before = *ledger.amounts();
    let energy = ResourceKind::Energy;

    let required = flow.upkeep[energy].saturating_mul(seconds);
    let energy_income = flow.income()[energy].saturating_mul(seconds);
    let available = ledger.get(energy).saturating_add(energy_income);
    let efficiency = if required > Fixed::ZERO && available < required {
        unit_ratio(available, required)
    } else {
        Fixed::ONE
    };

    for kind in ResourceKind::ALL {
        let building = if kind == energy {
            flow.building_production[kind]
        } else {
            flow.building_production[kind].saturating_mul(efficiency)
        };
        let gained = building
            .saturating_add(flow.team[kind])
            .saturating_mul(seconds);
        ledger.add(kind, gained);
    }

    let paid = ledger.get(energy).min(required.max(Fixed::ZERO));
    // Cannot fail: `paid` never exceeds the balance
    ledger.spend(energy, paid);

    Settlement {
        efficiency,
        upkeep_required: required,
        upkeep_paid: paid,
        net: ledger.amounts().minus(&before),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fx(n: f64) -> Fixed {
        Fixed::from_num(n)
    }

    fn flow(production: &[(ResourceKind, f64)], upkeep: f64) -> ResourceFlow {
        let pairs: Vec<(ResourceKind, Fixed)> =
            production.iter().map(|&(k, v)| (k, fx(v))).collect();
        ResourceFlow {
            team: ResourceAmounts::ZERO,
            building_production: ResourceAmounts::from_pairs(&pairs),
            upkeep: ResourceAmounts::single(ResourceKind::Energy, fx(upkeep)),
        }
    }

    #[test]
    fn test_deficit_scales_non_energy_output() {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Energy, fx(5.0));
        let flow = flow(&[(ResourceKind::Material, 2.0)], 10.0);

        let settlement = settle(&mut ledger, &flow, Fixed::ONE);

        assert_eq!(settlement.efficiency, fx(0.5));
        assert!(settlement.throttled());
        assert_eq!(ledger.get(ResourceKind::Material), fx(1.0));
        assert_eq!(ledger.get(ResourceKind::Energy), Fixed::ZERO);
        assert_eq!(settlement.upkeep_paid, fx(5.0));
    }

    #[test]
    fn test_surplus_charges_full_upkeep() {
        let mut ledger = ResourceLedger::new();
        let flow = flow(&[(ResourceKind::Energy, 1.0)], 0.1);

        let settlement = settle(&mut ledger, &flow, Fixed::ONE);

        assert_eq!(settlement.efficiency, Fixed::ONE);
        assert_eq!(ledger.get(ResourceKind::Energy), Fixed::ONE - fx(0.1));
        assert_eq!(settlement.net[ResourceKind::Energy], Fixed::ONE - fx(0.1));
    }

    #[test]
    fn test_energy_output_not_self_throttled() {
        let mut ledger = ResourceLedger::new();
        let flow = flow(
            &[(ResourceKind::Energy, 2.0), (ResourceKind::Credits, 4.0)],
            8.0,
        );

        let settlement = settle(&mut ledger, &flow, Fixed::ONE);

        // 2 energy available against 8 owed
        assert_eq!(settlement.efficiency, fx(0.25));
        assert_eq!(ledger.get(ResourceKind::Credits), fx(1.0));
        assert_eq!(ledger.get(ResourceKind::Energy), Fixed::ZERO);
    }

    #[test]
    fn test_team_generation_never_throttled() {
        let mut ledger = ResourceLedger::new();
        let mut flow = flow(&[], 10.0);
        flow.team = ResourceAmounts::single(ResourceKind::Material, fx(3.0));

        let settlement = settle(&mut ledger, &flow, Fixed::ONE);

        assert_eq!(settlement.efficiency, Fixed::ZERO);
        assert_eq!(ledger.get(ResourceKind::Material), fx(3.0));
    }

    #[test]
    fn test_compute_folds_modifiers_and_bonus() {
        let production = ResourceAmounts::from_pairs(&[
            (ResourceKind::Material, fx(2.0)),
            (ResourceKind::ResearchData, fx(1.0)),
        ]);
        let upkeep = ResourceAmounts::single(ResourceKind::Energy, fx(1.0));
        let mut modifiers = Modifiers::default();
        modifiers.building_production = fx(1.25);
        modifiers.upkeep = fx(0.5);
        modifiers.generation[ResourceKind::ResearchData] = fx(2.0);
        let bonus = ResourceAmounts::single(ResourceKind::Material, fx(10.0));
        let team = ResourceAmounts::single(ResourceKind::ResearchData, fx(1.0));

        let flow = ResourceFlow::compute(&team, &production, &upkeep, &modifiers, &bonus);

        // 2 * 1.25 = 2.5, plus 10%
        assert_eq!(flow.building_production[ResourceKind::Material], fx(2.75));
        assert_eq!(flow.building_production[ResourceKind::ResearchData], fx(2.5));
        assert_eq!(flow.team[ResourceKind::ResearchData], fx(2.0));
        assert_eq!(flow.upkeep[ResourceKind::Energy], fx(0.5));
    }
}
