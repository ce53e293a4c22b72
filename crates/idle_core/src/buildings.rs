//! Building blueprints, constructed instances and aggregate rates.
//!
//! Blueprints are static catalog entries gated by the technology tree.
//! Each construction snapshots the blueprint's rates into a new
//! [`BuildingInstance`]; the aggregate production and upkeep totals are
//! recomputed from operational instances after every change.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EconomyError, Result};
use crate::resources::{ResourceAmounts, ResourceLedger};
use crate::unlocks::NodeId;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a building blueprint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuildingId(pub String);

impl BuildingId {
    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BuildingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for BuildingId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a constructed building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

// ============================================================================
// Blueprints and instances
// ============================================================================

/// Static description of a constructible building.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildingBlueprint {
    /// Blueprint id.
    pub id: BuildingId,
    /// Display name.
    pub name: String,
    /// Flavor text.
    pub description: String,
    /// Construction cost.
    pub cost: ResourceAmounts,
    /// Per-second output.
    pub production: ResourceAmounts,
    /// Per-second upkeep (Energy only).
    pub upkeep: ResourceAmounts,
    /// Cap on instances of this blueprint.
    pub max_instances: Option<u32>,
    /// Technologies whose effects unlock this blueprint.
    pub unlocked_by: Vec<NodeId>,
    /// Whether the blueprint can be built.
    pub unlocked: bool,
}

/// A constructed building.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildingInstance {
    /// Instance id, unique for the lifetime of the game.
    pub id: InstanceId,
    /// Blueprint this was built from.
    pub blueprint: BuildingId,
    /// Production copied from the blueprint at construction time.
    pub production: ResourceAmounts,
    /// Upkeep copied from the blueprint at construction time.
    pub upkeep: ResourceAmounts,
    /// Offline instances contribute nothing.
    pub operational: bool,
}

// ============================================================================
// Building registry
// ============================================================================

/// All blueprints and every constructed instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Buildings {
    blueprints: BTreeMap<BuildingId, BuildingBlueprint>,
    instances: Vec<BuildingInstance>,
    next_instance: u32,
    production_total: ResourceAmounts,
    upkeep_total: ResourceAmounts,
}

impl Buildings {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blueprint. Duplicate ids are rejected.
    pub fn insert_blueprint(&mut self, blueprint: BuildingBlueprint) -> Result<()> {
        if self.blueprints.contains_key(blueprint.id.as_str()) {
            return Err(EconomyError::InvalidCatalog(format!(
                "duplicate building id: {}",
                blueprint.id
            )));
        }
        self.blueprints.insert(blueprint.id.clone(), blueprint);
        Ok(())
    }

    /// Look up a blueprint.
    #[must_use]
    pub fn blueprint(&self, id: &str) -> Option<&BuildingBlueprint> {
        self.blueprints.get(id)
    }

    /// All blueprints in id order.
    pub fn blueprints(&self) -> impl Iterator<Item = &BuildingBlueprint> {
        self.blueprints.values()
    }

    /// All constructed instances in construction order.
    #[must_use]
    pub fn instances(&self) -> &[BuildingInstance] {
        &self.instances
    }

    /// Mark a blueprint constructible.
    ///
    /// Returns `true` if it was previously locked.
    pub fn unlock_blueprint(&mut self, id: &str) -> Result<bool> {
        let blueprint = self
            .blueprints
            .get_mut(id)
            .ok_or_else(|| EconomyError::not_found("building", id))?;
        let newly = !blueprint.unlocked;
        blueprint.unlocked = true;
        Ok(newly)
    }

    /// Number of instances of a blueprint, operational or not.
    #[must_use]
    pub fn count(&self, id: &str) -> u32 {
        let count = self
            .instances
            .iter()
            .filter(|i| i.blueprint.as_str() == id)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Check whether `id` could be built now.
    pub fn check_build(&self, id: &str, ledger: &ResourceLedger) -> Result<&BuildingBlueprint> {
        let blueprint = self
            .blueprint(id)
            .ok_or_else(|| EconomyError::not_found("building", id))?;
        if !blueprint.unlocked {
            return Err(EconomyError::PrerequisitesUnmet {
                id: id.to_string(),
                missing: blueprint.unlocked_by.iter().map(|n| n.0.clone()).collect(),
            });
        }
        if let Some(limit) = blueprint.max_instances {
            if self.count(id) >= limit {
                return Err(EconomyError::CapacityReached {
                    what: id.to_string(),
                    limit,
                });
            }
        }
        ledger.check_affordable(&blueprint.cost)?;
        Ok(blueprint)
    }

    /// Boolean form of [`check_build`](Self::check_build).
    #[must_use]
    pub fn can_build(&self, id: &str, ledger: &ResourceLedger) -> bool {
        self.check_build(id, ledger).is_ok()
    }

    /// Pay for and construct a new operational instance.
    pub fn build(&mut self, id: &str, ledger: &mut ResourceLedger) -> Result<InstanceId> {
        let blueprint = self.check_build(id, ledger)?;
        let cost = blueprint.cost;
        let instance = BuildingInstance {
            id: InstanceId(self.next_instance),
            blueprint: blueprint.id.clone(),
            production: blueprint.production,
            upkeep: blueprint.upkeep,
            operational: true,
        };
        ledger.spend_all(&cost)?;

        let instance_id = instance.id;
        self.next_instance += 1;
        self.instances.push(instance);
        self.recompute_totals();
        Ok(instance_id)
    }

    /// Bring an instance online or take it offline.
    pub fn set_operational(&mut self, id: InstanceId, operational: bool) -> Result<()> {
        let instance = self
            .instances
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| EconomyError::not_found("building instance", id.0.to_string()))?;
        instance.operational = operational;
        self.recompute_totals();
        Ok(())
    }

    /// Summed per-second production of operational instances.
    #[must_use]
    pub const fn production_total(&self) -> &ResourceAmounts {
        &self.production_total
    }

    /// Summed per-second upkeep of operational instances.
    #[must_use]
    pub const fn upkeep_total(&self) -> &ResourceAmounts {
        &self.upkeep_total
    }

    fn recompute_totals(&mut self) {
        let (production, upkeep) = self
            .instances
            .iter()
            .filter(|i| i.operational)
            .fold(
                (ResourceAmounts::ZERO, ResourceAmounts::ZERO),
                |(p, u), i| (p.plus(&i.production), u.plus(&i.upkeep)),
            );
        self.production_total = production;
        self.upkeep_total = upkeep;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fixed;
    use crate::resources::ResourceKind;

    fn solar() -> BuildingBlueprint {
        BuildingBlueprint {
            id: "basicSolarArray".into(),
            name: "Basic Solar Array".into(),
            description: String::new(),
            cost: ResourceAmounts::single(ResourceKind::Material, Fixed::from_num(25)),
            production: ResourceAmounts::single(ResourceKind::Energy, Fixed::from_num(1)),
            upkeep: ResourceAmounts::single(ResourceKind::Energy, Fixed::from_num(0.1)),
            max_instances: Some(2),
            unlocked_by: vec![NodeId::from("basicEnergySystems")],
            unlocked: false,
        }
    }

    fn registry() -> Buildings {
        let mut buildings = Buildings::new();
        buildings.insert_blueprint(solar()).unwrap();
        buildings
    }

    fn rich() -> ResourceLedger {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::Material, Fixed::from_num(1000));
        ledger
    }

    #[test]
    fn test_locked_blueprint_reports_unlocking_tech() {
        let buildings = registry();
        assert_eq!(
            buildings.check_build("basicSolarArray", &rich()).unwrap_err(),
            EconomyError::PrerequisitesUnmet {
                id: "basicSolarArray".into(),
                missing: vec!["basicEnergySystems".into()],
            }
        );
    }

    #[test]
    fn test_build_spends_and_updates_totals() {
        let mut buildings = registry();
        let mut ledger = rich();
        buildings.unlock_blueprint("basicSolarArray").unwrap();

        let id = buildings.build("basicSolarArray", &mut ledger).unwrap();

        assert_eq!(id, InstanceId(0));
        assert_eq!(ledger.get(ResourceKind::Material), Fixed::from_num(975));
        assert_eq!(
            buildings.production_total()[ResourceKind::Energy],
            Fixed::from_num(1)
        );
        assert_eq!(
            buildings.upkeep_total()[ResourceKind::Energy],
            Fixed::from_num(0.1)
        );
    }

    #[test]
    fn test_cap_is_enforced() {
        let mut buildings = registry();
        let mut ledger = rich();
        buildings.unlock_blueprint("basicSolarArray").unwrap();
        buildings.build("basicSolarArray", &mut ledger).unwrap();
        buildings.build("basicSolarArray", &mut ledger).unwrap();

        let err = buildings.build("basicSolarArray", &mut ledger).unwrap_err();

        assert_eq!(
            err,
            EconomyError::CapacityReached {
                what: "basicSolarArray".into(),
                limit: 2,
            }
        );
        assert_eq!(buildings.count("basicSolarArray"), 2);
        assert_eq!(ledger.get(ResourceKind::Material), Fixed::from_num(950));
    }

    #[test]
    fn test_offline_instances_contribute_nothing() {
        let mut buildings = registry();
        let mut ledger = rich();
        buildings.unlock_blueprint("basicSolarArray").unwrap();
        let id = buildings.build("basicSolarArray", &mut ledger).unwrap();

        buildings.set_operational(id, false).unwrap();

        assert!(buildings.production_total().is_zero());
        assert!(buildings.upkeep_total().is_zero());
        assert_eq!(buildings.count("basicSolarArray"), 1);
    }

    #[test]
    fn test_unknown_blueprint() {
        let mut buildings = registry();
        assert!(matches!(
            buildings.unlock_blueprint("moonBase"),
            Err(EconomyError::NotFound { .. })
        ));
    }
}
