//! Prerequisite-gated unlock graphs.
//!
//! One [`UnlockGraph`] holds the technology tree, another the research
//! projects. Nodes move `Locked -> Unlocked` exactly once, and the
//! transition hands back the node's effects for the simulation to apply.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingId;
use crate::error::{EconomyError, Result};
use crate::math::Fixed;
use crate::resources::{ResourceAmounts, ResourceKind, ResourceLedger};

/// Unique identifier for a technology or research project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Effect fired once when a node unlocks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnlockEffect {
    /// Make a building blueprint constructible.
    UnlockBuilding(BuildingId),
    /// Lift the gate on paid recruitment.
    AuthorizeRecruitment,
    /// Permanent bonus to building production of one resource.
    ProductionBonus {
        /// Resource whose building output is boosted.
        resource: ResourceKind,
        /// Percentage bonus (e.g. 10 for +10%). Bonuses stack additively.
        percent: i32,
    },
}

/// A one-time purchasable node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnlockNode {
    /// Node id.
    pub id: NodeId,
    /// Display name.
    pub name: String,
    /// Flavor text.
    pub description: String,
    /// Cost, paid in full as one transaction.
    pub cost: ResourceAmounts,
    /// Nodes that must all be unlocked first.
    pub prerequisites: Vec<NodeId>,
    /// Effects applied on unlock.
    pub effects: Vec<UnlockEffect>,
    /// Display tier; lower tiers sort first.
    pub tier: u8,
    /// Seconds of research before completion; zero for instant nodes.
    pub duration: Fixed,
    /// Terminal once true.
    pub unlocked: bool,
}

/// Anything that can answer "is this node unlocked?".
///
/// Research prerequisites may point into the technology tree, so checks
/// take a source rather than assuming the node's own graph.
pub trait PrerequisiteSource {
    /// Whether `id` is unlocked in this source.
    fn is_unlocked(&self, id: &str) -> bool;

    /// Whether `id` names a node in this source at all.
    fn contains(&self, id: &str) -> bool;
}

impl<A, B> PrerequisiteSource for (&A, &B)
where
    A: PrerequisiteSource + ?Sized,
    B: PrerequisiteSource + ?Sized,
{
    fn is_unlocked(&self, id: &str) -> bool {
        self.0.is_unlocked(id) || self.1.is_unlocked(id)
    }

    fn contains(&self, id: &str) -> bool {
        self.0.contains(id) || self.1.contains(id)
    }
}

/// A set of unlock nodes keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UnlockGraph {
    nodes: BTreeMap<NodeId, UnlockNode>,
}

impl UnlockGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Duplicate ids are rejected.
    pub fn insert(&mut self, node: UnlockNode) -> Result<()> {
        if self.nodes.contains_key(node.id.as_str()) {
            return Err(EconomyError::InvalidCatalog(format!(
                "duplicate node id: {}",
                node.id
            )));
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Look up a node.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&UnlockNode> {
        self.nodes.get(id)
    }

    /// All nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &UnlockNode> {
        self.nodes.values()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` exists and is unlocked.
    #[must_use]
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.get(id).is_some_and(|n| n.unlocked)
    }

    /// Number of unlocked nodes.
    #[must_use]
    pub fn unlocked_count(&self) -> usize {
        self.nodes.values().filter(|n| n.unlocked).count()
    }

    /// Prerequisites of `node` that are still locked in `prereqs`.
    #[must_use]
    pub fn missing_prerequisites(
        node: &UnlockNode,
        prereqs: &(impl PrerequisiteSource + ?Sized),
    ) -> Vec<String> {
        node.prerequisites
            .iter()
            .filter(|p| !prereqs.is_unlocked(p.as_str()))
            .map(|p| p.0.clone())
            .collect()
    }

    /// Check whether `id` could be unlocked right now, without mutating.
    ///
    /// Failures are reported in a fixed order: not found, already
    /// unlocked, prerequisites unmet, insufficient resources.
    pub fn check_unlock(
        &self,
        id: &str,
        ledger: &ResourceLedger,
        prereqs: &(impl PrerequisiteSource + ?Sized),
    ) -> Result<&UnlockNode> {
        let node = self
            .get(id)
            .ok_or_else(|| EconomyError::not_found("node", id))?;
        if node.unlocked {
            return Err(EconomyError::AlreadyUnlocked(id.to_string()));
        }
        let missing = Self::missing_prerequisites(node, prereqs);
        if !missing.is_empty() {
            return Err(EconomyError::PrerequisitesUnmet {
                id: id.to_string(),
                missing,
            });
        }
        ledger.check_affordable(&node.cost)?;
        Ok(node)
    }

    /// Boolean form of [`check_unlock`](Self::check_unlock) against this graph.
    #[must_use]
    pub fn can_unlock(&self, id: &str, ledger: &ResourceLedger) -> bool {
        self.check_unlock(id, ledger, self).is_ok()
    }

    /// Pay for and unlock `id`, returning its effects.
    ///
    /// Prerequisites are resolved against this graph. On failure nothing
    /// is mutated.
    pub fn unlock(&mut self, id: &str, ledger: &mut ResourceLedger) -> Result<Vec<UnlockEffect>> {
        let cost = self.check_unlock(id, ledger, &*self)?.cost;
        ledger.spend_all(&cost)?;
        self.mark_unlocked(id)
    }

    /// Flip `id` to unlocked without paying, returning its effects.
    ///
    /// Used when research completes; the cost was paid at start.
    pub fn mark_unlocked(&mut self, id: &str) -> Result<Vec<UnlockEffect>> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| EconomyError::not_found("node", id))?;
        if node.unlocked {
            return Err(EconomyError::AlreadyUnlocked(id.to_string()));
        }
        node.unlocked = true;
        Ok(node.effects.clone())
    }

    /// Ids unlockable right now, ordered by tier then id.
    #[must_use]
    pub fn available(&self, ledger: &ResourceLedger) -> Vec<NodeId> {
        let mut ready: Vec<&UnlockNode> = self
            .nodes
            .values()
            .filter(|n| self.check_unlock(n.id.as_str(), ledger, self).is_ok())
            .collect();
        ready.sort_by(|a, b| a.tier.cmp(&b.tier).then_with(|| a.id.cmp(&b.id)));
        ready.into_iter().map(|n| n.id.clone()).collect()
    }

    /// Topological order of this graph's nodes (Kahn's algorithm).
    ///
    /// Prerequisites outside this graph must exist in `external`; they are
    /// treated as already resolved. Unknown references and cycles are
    /// catalog errors.
    pub fn resolution_order(&self, external: Option<&UnlockGraph>) -> Result<Vec<NodeId>> {
        let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for node in self.nodes.values() {
            let mut internal = BTreeSet::new();
            for prereq in &node.prerequisites {
                if self.nodes.contains_key(prereq.as_str()) {
                    internal.insert(prereq.as_str());
                } else if !external.is_some_and(|g| g.get(prereq.as_str()).is_some()) {
                    return Err(EconomyError::InvalidCatalog(format!(
                        "{} requires unknown node {}",
                        node.id, prereq
                    )));
                }
            }
            in_degree.insert(node.id.as_str(), internal.len());
            for prereq in internal {
                dependents.entry(prereq).or_default().push(node.id.as_str());
            }
        }

        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(id) = queue.pop_front() {
            order.push(NodeId(id.to_string()));
            for dependent in dependents.get(id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*dependent);
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            let stuck: Vec<&str> = in_degree
                .iter()
                .filter(|(_, degree)| **degree > 0)
                .map(|(id, _)| *id)
                .collect();
            return Err(EconomyError::InvalidCatalog(format!(
                "prerequisite cycle among: {}",
                stuck.join(", ")
            )));
        }
        Ok(order)
    }
}

impl PrerequisiteSource for UnlockGraph {
    fn is_unlocked(&self, id: &str) -> bool {
        self.get(id).is_some_and(|n| n.unlocked)
    }

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, cost: f64, prereqs: &[&str]) -> UnlockNode {
        UnlockNode {
            id: id.into(),
            name: id.to_string(),
            description: String::new(),
            cost: ResourceAmounts::single(ResourceKind::ResearchData, Fixed::from_num(cost)),
            prerequisites: prereqs.iter().map(|p| NodeId::from(*p)).collect(),
            effects: vec![UnlockEffect::UnlockBuilding(BuildingId::from(id))],
            tier: 1,
            duration: Fixed::ZERO,
            unlocked: false,
        }
    }

    fn ledger_with(science: f64) -> ResourceLedger {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceKind::ResearchData, Fixed::from_num(science));
        ledger
    }

    fn chain() -> UnlockGraph {
        let mut graph = UnlockGraph::new();
        graph.insert(node("a", 10.0, &[])).unwrap();
        graph.insert(node("b", 20.0, &["a"])).unwrap();
        graph.insert(node("c", 5.0, &["a", "b"])).unwrap();
        graph
    }

    #[test]
    fn test_unlock_pays_and_returns_effects() {
        let mut graph = chain();
        let mut ledger = ledger_with(15.0);

        let effects = graph.unlock("a", &mut ledger).unwrap();

        assert_eq!(effects, vec![UnlockEffect::UnlockBuilding("a".into())]);
        assert!(graph.is_unlocked("a"));
        assert_eq!(ledger.get(ResourceKind::ResearchData), Fixed::from_num(5));
    }

    #[test]
    fn test_second_unlock_is_rejected_without_mutation() {
        let mut graph = chain();
        let mut ledger = ledger_with(100.0);
        graph.unlock("a", &mut ledger).unwrap();
        let before = ledger.clone();

        let err = graph.unlock("a", &mut ledger).unwrap_err();

        assert_eq!(err, EconomyError::AlreadyUnlocked("a".into()));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_failure_reason_order() {
        let graph = chain();
        let poor = ledger_with(0.0);

        assert!(matches!(
            graph.check_unlock("zzz", &poor, &graph),
            Err(EconomyError::NotFound { .. })
        ));
        // Locked prerequisites are reported before the shortfall
        assert_eq!(
            graph.check_unlock("c", &poor, &graph).unwrap_err(),
            EconomyError::PrerequisitesUnmet {
                id: "c".into(),
                missing: vec!["a".into(), "b".into()],
            }
        );
        assert!(matches!(
            graph.check_unlock("a", &poor, &graph),
            Err(EconomyError::InsufficientResources { .. })
        ));
    }

    #[test]
    fn test_available_respects_prerequisites() {
        let mut graph = chain();
        let mut ledger = ledger_with(100.0);
        assert_eq!(graph.available(&ledger), vec![NodeId::from("a")]);

        graph.unlock("a", &mut ledger).unwrap();
        assert_eq!(graph.available(&ledger), vec![NodeId::from("b")]);
    }

    #[test]
    fn test_resolution_order_is_topological() {
        let order = chain().resolution_order(None).unwrap();
        let ids: Vec<&str> = order.iter().map(NodeId::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_resolution_detects_cycles_and_unknowns() {
        let mut graph = UnlockGraph::new();
        graph.insert(node("x", 1.0, &["y"])).unwrap();
        graph.insert(node("y", 1.0, &["x"])).unwrap();
        assert!(matches!(
            graph.resolution_order(None),
            Err(EconomyError::InvalidCatalog(_))
        ));

        let mut dangling = UnlockGraph::new();
        dangling.insert(node("r", 1.0, &["a"])).unwrap();
        assert!(dangling.resolution_order(None).is_err());
        assert!(dangling.resolution_order(Some(&chain())).is_ok());
    }

    #[test]
    fn test_cross_graph_prerequisites() {
        let mut techs = chain();
        let mut projects = UnlockGraph::new();
        projects.insert(node("r", 1.0, &["a"])).unwrap();
        let mut ledger = ledger_with(50.0);

        let locked = projects.check_unlock("r", &ledger, &(&techs, &projects));
        assert!(matches!(locked, Err(EconomyError::PrerequisitesUnmet { .. })));

        techs.unlock("a", &mut ledger).unwrap();
        assert!(projects
            .check_unlock("r", &ledger, &(&techs, &projects))
            .is_ok());
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut graph = chain();
        assert!(graph.insert(node("a", 1.0, &[])).is_err());
    }
}
