//! Per-resource amount tables as written in data files.

use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, Result};
use crate::math::from_decimal;
use crate::resources::{ResourceAmounts, ResourceKind};

/// Decimal amount per resource kind. Omitted kinds are zero.
///
/// # Example RON
///
/// ```ron
/// (material: 75.0, credits: 50.0)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountTable {
    /// Energy.
    pub energy: f64,
    /// Material.
    pub material: f64,
    /// Credits.
    pub credits: f64,
    /// Research data.
    pub research_data: f64,
}

impl AmountTable {
    /// Amount for one kind.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Energy => self.energy,
            ResourceKind::Material => self.material,
            ResourceKind::Credits => self.credits,
            ResourceKind::ResearchData => self.research_data,
        }
    }

    /// Convert to fixed-point, rejecting negative or non-finite entries.
    ///
    /// `context` names the owning entry in error messages.
    pub fn to_amounts(&self, context: &str) -> Result<ResourceAmounts> {
        let mut amounts = ResourceAmounts::ZERO;
        for kind in ResourceKind::ALL {
            let value = self.get(kind);
            if value < 0.0 {
                return Err(EconomyError::InvalidCatalog(format!(
                    "{context}: negative {kind} amount {value}"
                )));
            }
            amounts[kind] = from_decimal(value).ok_or_else(|| {
                EconomyError::InvalidCatalog(format!("{context}: {kind} amount {value} out of range"))
            })?;
        }
        Ok(amounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;

    #[test]
    fn test_to_amounts() {
        let table = AmountTable {
            material: 75.0,
            credits: 50.0,
            ..AmountTable::default()
        };
        let amounts = table.to_amounts("advancedSolarArray").unwrap();
        assert_eq!(amounts[ResourceKind::Material], Fixed::from_num(75));
        assert_eq!(amounts[ResourceKind::Energy], Fixed::ZERO);
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        let negative = AmountTable {
            energy: -1.0,
            ..AmountTable::default()
        };
        assert!(negative.to_amounts("x").is_err());

        let nan = AmountTable {
            credits: f64::NAN,
            ..AmountTable::default()
        };
        assert!(nan.to_amounts("x").is_err());
    }
}
