//! Economy tunables.
//!
//! [`EconomyConfig`] is the serde-facing form with decimal literals. It
//! is validated and converted once into [`EconomyRules`], which the
//! simulation uses for every tick.

use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, Result};
use crate::math::{from_decimal, Fixed};
use crate::team::TeamRules;

/// Upper bound on the per-tick passive multiplier.
///
/// Anything larger compounds fast enough to drown out building output.
pub const MAX_PASSIVE_MULTIPLIER: f64 = 1.001;

/// Allowed range for the recruit cost escalation factor.
pub const RECRUIT_ESCALATION_RANGE: (f64, f64) = (1.75, 1.8);

/// Slack allowed when checking `tick_seconds` lands on a whole millisecond.
const TICK_MILLIS_TOLERANCE: f64 = 1e-6;

/// Tunable economy parameters.
///
/// # Example RON
///
/// ```ron
/// EconomyConfig(
///     tick_seconds: 1.0,
///     passive_multiplier: 1.0005,
///     max_catch_up_ticks: 5,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Simulated seconds per tick, in whole milliseconds.
    pub tick_seconds: f64,
    /// Compounding rate applied to positive balances every tick.
    pub passive_multiplier: f64,
    /// Amount of every resource granted per manual click.
    pub click_bonus: f64,
    /// Multiplier on a team member's yield in their specialization.
    pub specialization_bonus: f64,
    /// Maximum roster size.
    pub max_team_size: u32,
    /// Credits cost of the first paid recruit.
    pub first_paid_recruit_cost: u32,
    /// Factor applied to the recruit cost after each paid recruit.
    pub recruit_cost_escalation: f64,
    /// Most ticks released at once after a stall.
    pub max_catch_up_ticks: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 1.0,
            passive_multiplier: 1.0005,
            click_bonus: 0.1,
            specialization_bonus: 1.5,
            max_team_size: 7,
            first_paid_recruit_cost: 100,
            recruit_cost_escalation: 1.75,
            max_catch_up_ticks: 5,
        }
    }
}

impl EconomyConfig {
    /// Parse a config from RON. Missing fields take their defaults.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).map_err(|e| EconomyError::DataParse {
            source_name: "config".to_string(),
            message: e.to_string(),
        })
    }

    /// Check every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        if !(self.tick_seconds.is_finite() && self.tick_seconds > 0.0) {
            return Err(invalid(format!(
                "tick_seconds must be positive, got {}",
                self.tick_seconds
            )));
        }
        let millis = self.tick_seconds * 1000.0;
        if millis < 1.0 || (millis - millis.round()).abs() > TICK_MILLIS_TOLERANCE {
            return Err(invalid(format!(
                "tick_seconds must be a whole number of milliseconds, got {}",
                self.tick_seconds
            )));
        }
        if !(1.0..=MAX_PASSIVE_MULTIPLIER).contains(&self.passive_multiplier) {
            return Err(invalid(format!(
                "passive_multiplier must be in [1, {MAX_PASSIVE_MULTIPLIER}], got {}",
                self.passive_multiplier
            )));
        }
        if !(self.click_bonus.is_finite() && self.click_bonus >= 0.0) {
            return Err(invalid("click_bonus must be non-negative".to_string()));
        }
        if !(self.specialization_bonus.is_finite() && self.specialization_bonus >= 1.0) {
            return Err(invalid("specialization_bonus must be at least 1".to_string()));
        }
        if self.max_team_size == 0 {
            return Err(invalid("max_team_size must be at least 1".to_string()));
        }
        if Fixed::checked_from_num(self.first_paid_recruit_cost).is_none() {
            return Err(invalid(format!(
                "first_paid_recruit_cost out of range: {}",
                self.first_paid_recruit_cost
            )));
        }
        let (low, high) = RECRUIT_ESCALATION_RANGE;
        if !(low..=high).contains(&self.recruit_cost_escalation) {
            return Err(invalid(format!(
                "recruit_cost_escalation must be in [{low}, {high}], got {}",
                self.recruit_cost_escalation
            )));
        }
        if self.max_catch_up_ticks == 0 {
            return Err(invalid("max_catch_up_ticks must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Validate and convert to fixed-point rules.
    pub fn rules(&self) -> Result<EconomyRules> {
        self.validate()?;
        Ok(EconomyRules {
            tick_seconds: fixed(self.tick_seconds, "tick_seconds")?,
            passive_multiplier: fixed(self.passive_multiplier, "passive_multiplier")?,
            click_bonus: fixed(self.click_bonus, "click_bonus")?,
            team: TeamRules {
                max_size: self.max_team_size,
                first_paid_cost: Fixed::checked_from_num(self.first_paid_recruit_cost)
                    .ok_or_else(|| invalid("first_paid_recruit_cost out of range".to_string()))?,
                escalation: fixed(self.recruit_cost_escalation, "recruit_cost_escalation")?,
                specialization_bonus: fixed(self.specialization_bonus, "specialization_bonus")?,
            },
            max_catch_up_ticks: self.max_catch_up_ticks,
        })
    }
}

/// Validated, fixed-point economy parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EconomyRules {
    /// Simulated seconds per tick.
    pub tick_seconds: Fixed,
    /// Compounding rate for positive balances.
    pub passive_multiplier: Fixed,
    /// Per-click grant of every resource.
    pub click_bonus: Fixed,
    /// Roster limits and pricing.
    pub team: TeamRules,
    /// Catch-up cap for the host loop.
    pub max_catch_up_ticks: u32,
}

impl EconomyRules {
    /// Tick length in milliseconds.
    ///
    /// Validation only admits whole-millisecond ticks, so the host clock
    /// releases ticks at exactly the rate the simulation assumes.
    #[must_use]
    pub fn tick_millis(&self) -> u64 {
        let millis = self.tick_seconds.saturating_mul(Fixed::from_num(1000)).round();
        millis.to_num::<u64>().max(1)
    }
}

fn invalid(message: String) -> EconomyError {
    EconomyError::InvalidConfig(message)
}

fn fixed(value: f64, field: &str) -> Result<Fixed> {
    from_decimal(value).ok_or_else(|| invalid(format!("{field} out of range: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let rules = EconomyConfig::default().rules().unwrap();
        assert_eq!(rules.tick_seconds, Fixed::ONE);
        assert_eq!(rules.tick_millis(), 1000);
        assert_eq!(rules.team.max_size, 7);
        assert_eq!(rules.team.first_paid_cost, Fixed::from_num(100));
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = EconomyConfig::from_ron_str("(tick_seconds: 0.5, max_team_size: 4)").unwrap();
        assert_eq!(config.tick_seconds, 0.5);
        assert_eq!(config.max_team_size, 4);
        assert_eq!(config.passive_multiplier, 1.0005);
        assert_eq!(config.rules().unwrap().tick_millis(), 500);
    }

    #[test]
    fn test_runaway_multiplier_rejected() {
        let config = EconomyConfig {
            passive_multiplier: 1.01,
            ..EconomyConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EconomyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let bad = [
            EconomyConfig {
                tick_seconds: 0.0,
                ..EconomyConfig::default()
            },
            EconomyConfig {
                recruit_cost_escalation: 2.0,
                ..EconomyConfig::default()
            },
            EconomyConfig {
                max_team_size: 0,
                ..EconomyConfig::default()
            },
            EconomyConfig {
                max_catch_up_ticks: 0,
                ..EconomyConfig::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn test_oversized_recruit_cost_rejected() {
        let config = EconomyConfig {
            first_paid_recruit_cost: 3_000_000_000,
            ..EconomyConfig::default()
        };
        assert!(matches!(
            config.rules(),
            Err(EconomyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_sub_millisecond_ticks_rejected() {
        for tick_seconds in [0.0004, 0.0015, 1.0001] {
            let config = EconomyConfig {
                tick_seconds,
                ..EconomyConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(EconomyError::InvalidConfig(_))),
                "{tick_seconds} should be rejected"
            );
        }

        let config = EconomyConfig {
            tick_seconds: 0.25,
            ..EconomyConfig::default()
        };
        assert_eq!(config.rules().unwrap().tick_millis(), 250);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = EconomyConfig::from_ron_str("(tick_seconds: \"fast\")").unwrap_err();
        assert!(matches!(err, EconomyError::DataParse { .. }));
    }
}
