//! Resource kinds, amount tables and the resource ledger.
//!
//! The ledger is the authoritative store of every resource amount. It
//! never goes negative: additions clamp at zero and spends that cannot be
//! covered fail without mutating anything.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EconomyError, Result};
use crate::math::Fixed;

/// The closed set of resources in the economy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Powers buildings; the only resource charged as upkeep.
    Energy,
    /// Fabricated goods used for construction.
    Material,
    /// Currency for recruitment and credit actions.
    Credits,
    /// Spent on technologies and research projects.
    ResearchData,
}

impl ResourceKind {
    /// Number of resource kinds.
    pub const COUNT: usize = 4;

    /// All resource kinds in canonical order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Energy,
        Self::Material,
        Self::Credits,
        Self::ResearchData,
    ];

    /// Position of this kind in [`ResourceKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Energy => 0,
            Self::Material => 1,
            Self::Credits => 2,
            Self::ResearchData => 3,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Energy => "Energy",
            Self::Material => "Material",
            Self::Credits => "Credits",
            Self::ResearchData => "Research Data",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = EconomyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "energy" => Ok(Self::Energy),
            "material" | "manufacturing" => Ok(Self::Material),
            "credits" | "coin" => Ok(Self::Credits),
            "researchdata" | "research_data" | "research data" | "science" => {
                Ok(Self::ResearchData)
            }
            _ => Err(EconomyError::not_found("resource", s)),
        }
    }
}

/// One fixed-point amount per resource kind.
///
/// Used for ledger balances, costs, production rates and per-kind
/// multipliers alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResourceAmounts([Fixed; ResourceKind::COUNT]);

impl ResourceAmounts {
    /// All amounts zero.
    pub const ZERO: Self = Self([Fixed::ZERO; ResourceKind::COUNT]);

    /// All amounts one; the identity for per-kind multipliers.
    pub const ONE: Self = Self([Fixed::ONE; ResourceKind::COUNT]);

    /// Build a table from `(kind, amount)` pairs; unspecified kinds are zero.
    ///
    /// Repeated kinds accumulate.
    #[must_use]
    pub fn from_pairs(pairs: &[(ResourceKind, Fixed)]) -> Self {
        let mut amounts = Self::ZERO;
        for &(kind, amount) in pairs {
            amounts[kind] = amounts[kind].saturating_add(amount);
        }
        amounts
    }

    /// A table with a single non-zero entry.
    #[must_use]
    pub fn single(kind: ResourceKind, amount: Fixed) -> Self {
        let mut amounts = Self::ZERO;
        amounts[kind] = amount;
        amounts
    }

    /// The same amount for every kind.
    #[must_use]
    pub const fn splat(amount: Fixed) -> Self {
        Self([amount; ResourceKind::COUNT])
    }

    /// Amount for one kind.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> Fixed {
        self.0[kind.index()]
    }

    /// Iterate `(kind, amount)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, Fixed)> + '_ {
        ResourceKind::ALL.iter().map(move |&kind| (kind, self.get(kind)))
    }

    /// Iterate only the non-zero entries.
    pub fn non_zero(&self) -> impl Iterator<Item = (ResourceKind, Fixed)> + '_ {
        self.iter().filter(|(_, amount)| *amount != Fixed::ZERO)
    }

    /// Whether every entry is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|amount| *amount == Fixed::ZERO)
    }

    /// Whether any entry is negative.
    #[must_use]
    pub fn has_negative(&self) -> bool {
        self.0.iter().any(|amount| *amount < Fixed::ZERO)
    }

    /// Element-wise saturating sum.
    #[must_use]
    pub fn plus(&self, other: &Self) -> Self {
        self.zip_with(other, Fixed::saturating_add)
    }

    /// Element-wise saturating difference.
    #[must_use]
    pub fn minus(&self, other: &Self) -> Self {
        self.zip_with(other, Fixed::saturating_sub)
    }

    /// Element-wise saturating product.
    #[must_use]
    pub fn times(&self, other: &Self) -> Self {
        self.zip_with(other, Fixed::saturating_mul)
    }

    /// Multiply every entry by the same factor.
    #[must_use]
    pub fn scaled(&self, factor: Fixed) -> Self {
        Self(self.0.map(|amount| amount.saturating_mul(factor)))
    }

    fn zip_with(&self, other: &Self, op: impl Fn(Fixed, Fixed) -> Fixed) -> Self {
        let mut out = Self::ZERO;
        for kind in ResourceKind::ALL {
            out[kind] = op(self.get(kind), other.get(kind));
        }
        out
    }
}

impl Index<ResourceKind> for ResourceAmounts {
    type Output = Fixed;

    fn index(&self, kind: ResourceKind) -> &Fixed {
        &self.0[kind.index()]
    }
}

impl IndexMut<ResourceKind> for ResourceAmounts {
    fn index_mut(&mut self, kind: ResourceKind) -> &mut Fixed {
        &mut self.0[kind.index()]
    }
}

impl Serialize for ResourceAmounts {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.map(Fixed::to_bits).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResourceAmounts {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = <[i64; ResourceKind::COUNT]>::deserialize(deserializer)?;
        Ok(Self(bits.map(Fixed::from_bits)))
    }
}

/// Authoritative store of current resource amounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ResourceLedger {
    amounts: ResourceAmounts,
}

impl ResourceLedger {
    /// Create an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            amounts: ResourceAmounts::ZERO,
        }
    }

    /// Create a ledger with starting balances; negative entries clamp to zero.
    #[must_use]
    pub fn with_amounts(amounts: ResourceAmounts) -> Self {
        let mut ledger = Self::new();
        for (kind, amount) in amounts.iter() {
            ledger.add(kind, amount);
        }
        ledger
    }

    /// Current amount of a resource.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> Fixed {
        self.amounts.get(kind)
    }

    /// Current amount of a resource by name.
    ///
    /// Unknown names read as zero rather than failing.
    #[must_use]
    pub fn get_named(&self, name: &str) -> Fixed {
        name.parse::<ResourceKind>()
            .map_or(Fixed::ZERO, |kind| self.get(kind))
    }

    /// All balances.
    #[must_use]
    pub const fn amounts(&self) -> &ResourceAmounts {
        &self.amounts
    }

    /// Add to a resource; the result is clamped at zero.
    pub fn add(&mut self, kind: ResourceKind, amount: Fixed) {
        let updated = self.amounts[kind].saturating_add(amount);
        self.amounts[kind] = updated.max(Fixed::ZERO);
    }

    /// Add every entry of a table.
    pub fn add_all(&mut self, amounts: &ResourceAmounts) {
        for (kind, amount) in amounts.non_zero() {
            self.add(kind, amount);
        }
    }

    /// Spend a resource if available.
    ///
    /// Returns true if the transaction succeeded. Negative amounts are
    /// rejected.
    pub fn spend(&mut self, kind: ResourceKind, amount: Fixed) -> bool {
        if amount < Fixed::ZERO || self.amounts[kind] < amount {
            return false;
        }
        self.amounts[kind] -= amount;
        true
    }

    /// Check whether every entry of `cost` is covered simultaneously.
    #[must_use]
    pub fn can_afford(&self, cost: &ResourceAmounts) -> bool {
        self.check_affordable(cost).is_ok()
    }

    /// Like [`can_afford`](Self::can_afford) but reports the first shortfall.
    pub fn check_affordable(&self, cost: &ResourceAmounts) -> Result<()> {
        for (kind, required) in cost.non_zero() {
            let available = self.get(kind);
            if available < required {
                return Err(EconomyError::InsufficientResources {
                    resource: kind,
                    required,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Deduct a multi-resource cost as one all-or-nothing transaction.
    ///
    /// Affordability of every entry is verified before anything is
    /// deducted, so a failure leaves the ledger untouched.
    pub fn spend_all(&mut self, cost: &ResourceAmounts) -> Result<()> {
        if cost.has_negative() {
            return Err(EconomyError::InvalidCatalog(
                "cost entries must be non-negative".to_string(),
            ));
        }
        self.check_affordable(cost)?;
        self.amounts = self.amounts.minus(cost);
        Ok(())
    }

    /// Compound every positive balance by `rate`.
    ///
    /// Zero balances stay zero.
    pub fn apply_multiplier(&mut self, rate: Fixed) {
        for kind in ResourceKind::ALL {
            let amount = self.amounts[kind];
            if amount > Fixed::ZERO {
                self.amounts[kind] = amount.saturating_mul(rate).max(Fixed::ZERO);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fx(n: f64) -> Fixed {
        Fixed::from_num(n)
    }

    #[test]
    fn test_add_clamps_at_zero() {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Energy, fx(3.0));
        ledger.add(ResourceKind::Energy, fx(-10.0));
        assert_eq!(ledger.get(ResourceKind::Energy), Fixed::ZERO);
    }

    #[test]
    fn test_spend_succeeds_when_covered() {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Material, fx(25.0));

        assert!(ledger.spend(ResourceKind::Material, fx(25.0)));
        assert_eq!(ledger.get(ResourceKind::Material), Fixed::ZERO);
    }

    #[test]
    fn test_spend_fails_without_mutation() {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Credits, fx(99.0));

        assert!(!ledger.spend(ResourceKind::Credits, fx(100.0)));
        assert_eq!(ledger.get(ResourceKind::Credits), fx(99.0));

        assert!(!ledger.spend(ResourceKind::Credits, fx(-1.0)));
        assert_eq!(ledger.get(ResourceKind::Credits), fx(99.0));
    }

    #[test]
    fn test_spend_all_is_atomic() {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::ResearchData, fx(600.0));
        ledger.add(ResourceKind::Energy, fx(999.0));
        ledger.add(ResourceKind::Material, fx(300.0));

        let cost = ResourceAmounts::from_pairs(&[
            (ResourceKind::ResearchData, fx(600.0)),
            (ResourceKind::Energy, fx(1000.0)),
            (ResourceKind::Material, fx(300.0)),
        ]);

        let err = ledger.spend_all(&cost).unwrap_err();
        assert_eq!(
            err,
            EconomyError::InsufficientResources {
                resource: ResourceKind::Energy,
                required: fx(1000.0),
                available: fx(999.0),
            }
        );
        // Nothing was deducted, not even the entries that were affordable
        assert_eq!(ledger.get(ResourceKind::ResearchData), fx(600.0));
        assert_eq!(ledger.get(ResourceKind::Material), fx(300.0));

        ledger.add(ResourceKind::Energy, fx(1.0));
        ledger.spend_all(&cost).unwrap();
        assert!(ledger.amounts().is_zero());
    }

    #[test]
    fn test_multiplier_skips_zero_balances() {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Energy, fx(100.0));

        ledger.apply_multiplier(fx(1.5));

        assert_eq!(ledger.get(ResourceKind::Energy), fx(150.0));
        assert_eq!(ledger.get(ResourceKind::Material), Fixed::ZERO);
    }

    #[test]
    fn test_get_named_unknown_is_zero() {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::ResearchData, fx(4.0));

        assert_eq!(ledger.get_named("science"), fx(4.0));
        assert_eq!(ledger.get_named("ResearchData"), fx(4.0));
        assert_eq!(ledger.get_named("unobtainium"), Fixed::ZERO);
    }

    #[test]
    fn test_amounts_arithmetic() {
        let a = ResourceAmounts::from_pairs(&[
            (ResourceKind::Energy, fx(1.0)),
            (ResourceKind::Credits, fx(2.0)),
        ]);
        let b = ResourceAmounts::single(ResourceKind::Energy, fx(0.5));

        assert_eq!(a.plus(&b)[ResourceKind::Energy], fx(1.5));
        assert_eq!(a.minus(&b)[ResourceKind::Energy], fx(0.5));
        assert_eq!(a.scaled(fx(2.0))[ResourceKind::Credits], fx(4.0));
        assert_eq!(a.times(&ResourceAmounts::ONE), a);
        assert_eq!(a.non_zero().count(), 2);
    }

    #[test]
    fn test_ledger_serializes_exact_bits() {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Energy, Fixed::from_num(1) / Fixed::from_num(3));
        ledger.add(ResourceKind::Credits, fx(0.1));

        let text = ron::to_string(&ledger).unwrap();
        let restored: ResourceLedger = ron::from_str(&text).unwrap();

        assert_eq!(restored, ledger);
        assert_eq!(
            restored.get(ResourceKind::Energy).to_bits(),
            ledger.get(ResourceKind::Energy).to_bits()
        );
    }
}
