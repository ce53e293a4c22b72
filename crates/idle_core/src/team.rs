//! The operative roster and its passive generation.
//!
//! The first operative is a free choice from a curated set of
//! specialists. Every later recruit costs Credits, requires recruitment
//! to be authorized by the technology tree, and raises the price of the
//! next one by a fixed escalation factor.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, Result};
use crate::math::Fixed;
use crate::resources::{ResourceAmounts, ResourceKind, ResourceLedger};

/// Roster-unique member id, assigned sequentially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(pub u32);

/// Id of a curated starting specialist.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StarterId(pub String);

impl StarterId {
    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StarterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StarterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for StarterId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A curated specialist offered as the free first recruit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Specialist {
    /// Specialist id.
    pub id: StarterId,
    /// Display name.
    pub name: String,
    /// Per-second yield for every resource kind.
    pub per_second: ResourceAmounts,
    /// Resource this specialist is best at.
    pub specialization: Option<ResourceKind>,
}

/// Who to hire on a paid recruitment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecruitSpec {
    /// An unspecialized operative yielding 1/s of everything.
    Generic,
    /// One of the curated specialists not yet on the roster.
    Specialist(StarterId),
}

/// A recruited operative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamMember {
    /// Member id.
    pub id: MemberId,
    /// Display name.
    pub name: String,
    /// Per-second yield for every resource kind.
    pub per_second: ResourceAmounts,
    /// Yield in this kind gets the specialization bonus.
    pub specialization: Option<ResourceKind>,
    /// Set when the member came from the curated set.
    pub starter: Option<StarterId>,
}

/// Roster limits and pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeamRules {
    /// Maximum roster size.
    pub max_size: u32,
    /// Credits cost of the first paid recruit.
    pub first_paid_cost: Fixed,
    /// Factor applied to the cost after each paid recruit.
    pub escalation: Fixed,
    /// Multiplier on a member's yield in their specialization.
    pub specialization_bonus: Fixed,
}

impl Default for TeamRules {
    fn default() -> Self {
        Self {
            max_size: 7,
            first_paid_cost: Fixed::from_num(100),
            escalation: Fixed::from_num(1.75),
            specialization_bonus: Fixed::from_num(1.5),
        }
    }
}

/// The operative roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Team {
    rules: TeamRules,
    starters: BTreeMap<StarterId, Specialist>,
    members: Vec<TeamMember>,
    next_member_id: u32,
    next_recruit_cost: Fixed,
    recruitment_authorized: bool,
}

impl Team {
    /// Create an empty roster offering `starters` as the curated set.
    #[must_use]
    pub fn new(rules: TeamRules, starters: impl IntoIterator<Item = Specialist>) -> Self {
        Self {
            rules,
            starters: starters.into_iter().map(|s| (s.id.clone(), s)).collect(),
            members: Vec::new(),
            next_member_id: 0,
            next_recruit_cost: rules.first_paid_cost,
            recruitment_authorized: false,
        }
    }

    /// Current members in recruitment order.
    #[must_use]
    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    /// The curated specialists.
    pub fn starters(&self) -> impl Iterator<Item = &Specialist> {
        self.starters.values()
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no one has been recruited yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Credits needed for the next paid recruit.
    #[must_use]
    pub const fn next_recruit_cost(&self) -> Fixed {
        self.next_recruit_cost
    }

    /// Whether paid recruitment has been authorized.
    #[must_use]
    pub const fn recruitment_authorized(&self) -> bool {
        self.recruitment_authorized
    }

    /// Lift the recruitment gate. Idempotent.
    pub fn authorize(&mut self) {
        self.recruitment_authorized = true;
    }

    /// Whether a curated specialist is already on the roster.
    #[must_use]
    pub fn has_starter(&self, id: &str) -> bool {
        self.members
            .iter()
            .any(|m| m.starter.as_ref().is_some_and(|s| s.as_str() == id))
    }

    /// Take the free first operative from the curated set.
    pub fn choose_starter(&mut self, id: &str) -> Result<MemberId> {
        if !self.members.is_empty() {
            return Err(EconomyError::StarterAlreadyChosen);
        }
        let specialist = self
            .starters
            .get(id)
            .cloned()
            .ok_or_else(|| EconomyError::not_found("starter", id))?;
        Ok(self.push_specialist(specialist))
    }

    /// Check whether a paid recruit could be hired now.
    pub fn check_recruit(&self, spec: &RecruitSpec, ledger: &ResourceLedger) -> Result<()> {
        if self.members.is_empty() {
            return Err(EconomyError::StarterRequired);
        }
        if self.members.len() >= self.rules.max_size as usize {
            return Err(EconomyError::CapacityReached {
                what: "team".to_string(),
                limit: self.rules.max_size,
            });
        }
        if !self.recruitment_authorized {
            return Err(EconomyError::RecruitmentLocked);
        }
        if let RecruitSpec::Specialist(id) = spec {
            if !self.starters.contains_key(id.as_str()) {
                return Err(EconomyError::not_found("starter", id.as_str()));
            }
            if self.has_starter(id.as_str()) {
                return Err(EconomyError::AlreadyRecruited(id.0.clone()));
            }
        }
        ledger.check_affordable(&self.recruit_cost())
    }

    /// Boolean form of [`check_recruit`](Self::check_recruit).
    #[must_use]
    pub fn can_recruit(&self, spec: &RecruitSpec, ledger: &ResourceLedger) -> bool {
        self.check_recruit(spec, ledger).is_ok()
    }

    /// Hire a paid recruit and escalate the price of the next one.
    pub fn recruit(&mut self, spec: &RecruitSpec, ledger: &mut ResourceLedger) -> Result<MemberId> {
        self.check_recruit(spec, ledger)?;
        ledger.spend_all(&self.recruit_cost())?;

        let id = match spec {
            RecruitSpec::Generic => {
                let id = MemberId(self.next_member_id);
                self.next_member_id += 1;
                self.members.push(TeamMember {
                    id,
                    name: format!("Operative Unit {}", self.members.len() + 1),
                    per_second: ResourceAmounts::splat(Fixed::ONE),
                    specialization: None,
                    starter: None,
                });
                id
            }
            RecruitSpec::Specialist(starter) => {
                let specialist = self
                    .starters
                    .get(starter.as_str())
                    .cloned()
                    .ok_or_else(|| EconomyError::not_found("starter", starter.as_str()))?;
                self.push_specialist(specialist)
            }
        };
        self.next_recruit_cost = self
            .next_recruit_cost
            .saturating_mul(self.rules.escalation)
            .floor();
        Ok(id)
    }

    /// Per-second yield of the whole roster.
    ///
    /// Each member contributes its stat in every kind, multiplied by the
    /// specialization bonus in its specialty.
    #[must_use]
    pub fn total_passive_generation(&self) -> ResourceAmounts {
        let mut total = ResourceAmounts::ZERO;
        for member in &self.members {
            for (kind, stat) in member.per_second.iter() {
                let factor = if member.specialization == Some(kind) {
                    self.rules.specialization_bonus
                } else {
                    Fixed::ONE
                };
                total[kind] = total[kind].saturating_add(stat.saturating_mul(factor));
            }
        }
        total
    }

    fn recruit_cost(&self) -> ResourceAmounts {
        ResourceAmounts::single(ResourceKind::Credits, self.next_recruit_cost)
    }

    fn push_specialist(&mut self, specialist: Specialist) -> MemberId {
        let id = MemberId(self.next_member_id);
        self.next_member_id += 1;
        self.members.push(TeamMember {
            id,
            name: specialist.name,
            per_second: specialist.per_second,
            specialization: specialist.specialization,
            starter: Some(specialist.id),
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specialist(id: &str, kind: ResourceKind) -> Specialist {
        let mut per_second = ResourceAmounts::splat(Fixed::ONE);
        per_second[kind] = Fixed::from_num(3);
        Specialist {
            id: id.into(),
            name: id.to_uppercase(),
            per_second,
            specialization: Some(kind),
        }
    }

    fn team() -> Team {
        Team::new(
            TeamRules::default(),
            [
                specialist("alpha_01", ResourceKind::Energy),
                specialist("beta_01", ResourceKind::Material),
            ],
        )
    }

    fn credits(amount: u32) -> ResourceLedger {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Credits, Fixed::from_num(amount));
        ledger
    }

    #[test]
    fn test_starter_is_free_and_exclusive() {
        let mut team = team();
        team.choose_starter("alpha_01").unwrap();

        assert_eq!(team.len(), 1);
        assert_eq!(
            team.choose_starter("beta_01"),
            Err(EconomyError::StarterAlreadyChosen)
        );
    }

    #[test]
    fn test_recruit_gates() {
        let mut team = team();
        let mut ledger = credits(1000);

        assert_eq!(
            team.recruit(&RecruitSpec::Generic, &mut ledger),
            Err(EconomyError::StarterRequired)
        );
        team.choose_starter("alpha_01").unwrap();
        assert_eq!(
            team.recruit(&RecruitSpec::Generic, &mut ledger),
            Err(EconomyError::RecruitmentLocked)
        );
        team.authorize();
        assert_eq!(
            team.recruit(&RecruitSpec::Specialist("alpha_01".into()), &mut ledger),
            Err(EconomyError::AlreadyRecruited("alpha_01".into()))
        );
        assert!(team
            .recruit(&RecruitSpec::Specialist("beta_01".into()), &mut ledger)
            .is_ok());
    }

    #[test]
    fn test_cost_escalation() {
        let mut team = team();
        let mut ledger = credits(10_000);
        team.choose_starter("alpha_01").unwrap();
        team.authorize();
        assert_eq!(team.next_recruit_cost(), Fixed::from_num(100));

        team.recruit(&RecruitSpec::Generic, &mut ledger).unwrap();
        assert_eq!(team.next_recruit_cost(), Fixed::from_num(175));

        team.recruit(&RecruitSpec::Generic, &mut ledger).unwrap();
        assert_eq!(team.next_recruit_cost(), Fixed::from_num(306));
        assert_eq!(
            ledger.get(ResourceKind::Credits),
            Fixed::from_num(10_000 - 100 - 175)
        );
    }

    #[test]
    fn test_unaffordable_recruit_leaves_state() {
        let mut team = team();
        let mut ledger = credits(99);
        team.choose_starter("alpha_01").unwrap();
        team.authorize();

        let err = team.recruit(&RecruitSpec::Generic, &mut ledger).unwrap_err();

        assert!(matches!(err, EconomyError::InsufficientResources { .. }));
        assert_eq!(team.len(), 1);
        assert_eq!(team.next_recruit_cost(), Fixed::from_num(100));
        assert_eq!(ledger.get(ResourceKind::Credits), Fixed::from_num(99));
    }

    #[test]
    fn test_roster_cap() {
        let rules = TeamRules {
            max_size: 2,
            ..TeamRules::default()
        };
        let mut team = Team::new(rules, [specialist("alpha_01", ResourceKind::Energy)]);
        let mut ledger = credits(10_000);
        team.choose_starter("alpha_01").unwrap();
        team.authorize();
        team.recruit(&RecruitSpec::Generic, &mut ledger).unwrap();

        assert_eq!(
            team.recruit(&RecruitSpec::Generic, &mut ledger),
            Err(EconomyError::CapacityReached {
                what: "team".into(),
                limit: 2,
            })
        );
    }

    #[test]
    fn test_passive_generation_applies_specialization() {
        let mut team = team();
        let mut ledger = credits(1000);
        team.choose_starter("alpha_01").unwrap();
        team.authorize();
        team.recruit(&RecruitSpec::Generic, &mut ledger).unwrap();

        let total = team.total_passive_generation();

        // 3 * 1.5 from the specialist plus 1 from the generic operative
        assert_eq!(total[ResourceKind::Energy], Fixed::from_num(5.5));
        assert_eq!(total[ResourceKind::Material], Fixed::from_num(2));
    }
}
