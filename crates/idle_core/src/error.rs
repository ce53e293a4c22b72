//! Error types for the economy simulation.
//!
//! Every player-facing operation reports failure as an [`EconomyError`]
//! value. None of them are fatal: the presentation layer turns them into
//! messages and the game carries on.

use thiserror::Error;

use crate::math::Fixed;
use crate::resources::ResourceKind;

/// Result type alias using [`EconomyError`].
pub type Result<T> = std::result::Result<T, EconomyError>;

/// Top-level error type for all economy errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomyError {
    /// An id did not match any catalog entry.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What kind of entry was looked up (e.g. "technology").
        kind: &'static str,
        /// The id that was requested.
        id: String,
    },

    /// The node has already been unlocked.
    #[error("Already unlocked: {0}")]
    AlreadyUnlocked(String),

    /// The timed action is still running.
    #[error("Action already active: {0}")]
    AlreadyActive(String),

    /// The single research slot is occupied.
    #[error("Research project already active: {active}")]
    ResearchInProgress {
        /// The project currently occupying the slot.
        active: String,
    },

    /// One or more prerequisites are not unlocked yet.
    #[error("Prerequisites not met for {id}: missing {missing:?}")]
    PrerequisitesUnmet {
        /// The node or blueprint that was requested.
        id: String,
        /// Prerequisites that are still locked.
        missing: Vec<String>,
    },

    /// Insufficient resources.
    #[error("Insufficient resources: need {required} {resource}, have {available}")]
    InsufficientResources {
        /// Resource type.
        resource: ResourceKind,
        /// Amount required.
        required: Fixed,
        /// Amount available.
        available: Fixed,
    },

    /// A team or building cap has been reached.
    #[error("Capacity reached for {what}: limit {limit}")]
    CapacityReached {
        /// What is capped (e.g. "team", or a blueprint id).
        what: String,
        /// The cap.
        limit: u32,
    },

    /// Paid recruitment has not been authorized by the technology tree.
    #[error("Recruitment is locked until command structure is expanded")]
    RecruitmentLocked,

    /// The free starting operative has already been chosen.
    #[error("Starting operative already chosen")]
    StarterAlreadyChosen,

    /// Paid recruitment requires the free starting operative first.
    #[error("Choose a starting operative before recruiting")]
    StarterRequired,

    /// This specialist is already on the roster.
    #[error("Specialist already recruited: {0}")]
    AlreadyRecruited(String),

    /// Catalog content failed validation.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data file parsing error.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParse {
        /// Name of the document that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },
}

impl EconomyError {
    /// Shorthand for [`EconomyError::NotFound`].
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Whether retrying the same operation later could succeed.
    ///
    /// Resource shortages and an occupied research slot clear up as the
    /// economy runs; everything else needs a different request.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::InsufficientResources { .. }
                | Self::ResearchInProgress { .. }
                | Self::AlreadyActive(_)
                | Self::PrerequisitesUnmet { .. }
                | Self::RecruitmentLocked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_resources_message() {
        let err = EconomyError::InsufficientResources {
            resource: ResourceKind::Credits,
            required: Fixed::from_num(175),
            available: Fixed::from_num(40),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient resources: need 175 Credits, have 40"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(EconomyError::RecruitmentLocked.is_transient());
        assert!(!EconomyError::AlreadyUnlocked("fusionPower".into()).is_transient());
        assert!(!EconomyError::not_found("building", "moonBase").is_transient());
    }
}
