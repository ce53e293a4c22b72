//! Time-gated research projects.
//!
//! Research projects are unlock nodes that pass through an in-progress
//! state. The cost is paid when a project starts and the node unlocks
//! once accumulated progress reaches its duration. There is exactly one
//! research slot: `active` is either empty or one project.

use tracing::warn;

use crate::error::{EconomyError, Result};
use crate::math::Fixed;
use crate::resources::ResourceLedger;
use crate::unlocks::{NodeId, UnlockEffect, UnlockGraph};

/// The project occupying the research slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActiveResearch {
    /// Project being researched.
    pub project: NodeId,
    /// Seconds of progress accumulated so far.
    pub progress: Fixed,
    /// Seconds needed to complete.
    pub duration: Fixed,
}

impl ActiveResearch {
    /// Check if the project is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress >= self.duration
    }

    /// Get progress as a percentage (0-100).
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.duration <= Fixed::ZERO {
            100
        } else {
            let ratio = self.progress.saturating_div(self.duration).min(Fixed::ONE);
            (ratio * Fixed::from_num(100)).to_num::<u32>()
        }
    }
}

/// Snapshot of the research slot for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchProgress {
    /// Project being researched.
    pub project: NodeId,
    /// Seconds elapsed.
    pub elapsed: Fixed,
    /// Seconds needed.
    pub duration: Fixed,
    /// Completion percentage (0-100).
    pub percentage: u32,
}

/// A project that finished during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedResearch {
    /// The project.
    pub project: NodeId,
    /// Effects to apply now that it is unlocked.
    pub effects: Vec<UnlockEffect>,
}

/// Research projects plus the single in-flight slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResearchLab {
    projects: UnlockGraph,
    active: Option<ActiveResearch>,
}

impl ResearchLab {
    /// Create a lab over a graph of projects.
    #[must_use]
    pub fn new(projects: UnlockGraph) -> Self {
        Self {
            projects,
            active: None,
        }
    }

    /// The project graph.
    #[must_use]
    pub const fn projects(&self) -> &UnlockGraph {
        &self.projects
    }

    /// The in-flight project, if any.
    #[must_use]
    pub const fn active(&self) -> Option<&ActiveResearch> {
        self.active.as_ref()
    }

    /// Check whether `id` could start now.
    ///
    /// Prerequisites may name technologies or other projects.
    pub fn check_start(
        &self,
        id: &str,
        ledger: &ResourceLedger,
        technologies: &UnlockGraph,
    ) -> Result<()> {
        let node = self
            .projects
            .get(id)
            .ok_or_else(|| EconomyError::not_found("research project", id))?;
        if node.unlocked {
            return Err(EconomyError::AlreadyUnlocked(id.to_string()));
        }
        if let Some(active) = &self.active {
            return Err(EconomyError::ResearchInProgress {
                active: active.project.0.clone(),
            });
        }
        self.projects
            .check_unlock(id, ledger, &(technologies, &self.projects))
            .map(|_| ())
    }

    /// Pay for `id` and occupy the research slot with it.
    pub fn start(
        &mut self,
        id: &str,
        ledger: &mut ResourceLedger,
        technologies: &UnlockGraph,
    ) -> Result<()> {
        self.check_start(id, ledger, technologies)?;
        let node = self
            .projects
            .get(id)
            .ok_or_else(|| EconomyError::not_found("research project", id))?;
        ledger.spend_all(&node.cost)?;
        self.active = Some(ActiveResearch {
            project: node.id.clone(),
            progress: Fixed::ZERO,
            duration: node.duration,
        });
        Ok(())
    }

    /// Accumulate `seconds` of progress on the active project.
    ///
    /// On completion the project unlocks, the slot frees, and its effects
    /// are returned.
    pub fn advance(&mut self, seconds: Fixed) -> Option<CompletedResearch> {
        let active = self.active.as_mut()?;
        active.progress = active.progress.saturating_add(seconds);
        if !active.is_complete() {
            return None;
        }

        let project = active.project.clone();
        self.active = None;
        match self.projects.mark_unlocked(project.as_str()) {
            Ok(effects) => Some(CompletedResearch { project, effects }),
            Err(err) => {
                warn!(project = %project, error = %err, "Research completed on an invalid project");
                None
            }
        }
    }

    /// Progress of the active project.
    #[must_use]
    pub fn progress(&self) -> Option<ResearchProgress> {
        self.active.as_ref().map(|a| ResearchProgress {
            project: a.project.clone(),
            elapsed: a.progress.min(a.duration),
            duration: a.duration,
            percentage: a.percentage(),
        })
    }
}
