//! Error types.
//!
//! [`EngineError`] separates the two severities a transition can fail
//! with: a rule rejecting the event (recoverable, carries the response)
//! and an engine invariant breaking (fatal for that transition). Ignored
//! events are never errors.
//!
//! [`BuildError`] reports configuration mistakes found while building an
//! engine.

use crate::condition::ConditionResponse;
use crate::core::{ArtifactId, ArtifactKind, Event};

/// Errors returned while handling events.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A rule applied to the event and rejected it.
    #[error("event rejected: {response}")]
    Rejected {
        event: Event,
        response: ConditionResponse,
    },

    /// The game has already ended.
    #[error("game has ended")]
    GameEnded,

    /// A mutator's precondition did not hold.
    #[error("engine invariant violated: {0}")]
    Invariant(String),
}

impl EngineError {
    /// Create an invariant violation.
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }

    /// Check if this is a recoverable rule rejection.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::GameEnded)
    }

    /// The rejecting response, for `Rejected`.
    #[must_use]
    pub fn response(&self) -> Option<&ConditionResponse> {
        match self {
            Self::Rejected { response, .. } => Some(response),
            _ => None,
        }
    }
}

/// Errors found while building an engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// An ID used in the configuration was never declared.
    #[error("unknown artifact {0}")]
    UnknownArtifact(ArtifactId),

    /// An artifact was used where another kind was required.
    #[error("{artifact} is a {actual:?}, expected {expected:?}")]
    WrongKind {
        artifact: ArtifactId,
        expected: ArtifactKind,
        actual: ArtifactKind,
    },

    /// Two artifacts of the same kind share a name.
    #[error("duplicate {kind:?} named {name:?}")]
    DuplicateName { kind: ArtifactKind, name: String },

    /// A relation leads from a tile back to itself.
    #[error("relation from {0} to itself")]
    SelfLoop(ArtifactId),

    /// A relation has zero distance.
    #[error("relation {from} -> {to} has zero distance")]
    ZeroDistance { from: ArtifactId, to: ArtifactId },

    /// The phase tree contains no rules.
    #[error("no rules declared")]
    EmptyPlan,

    /// Two phases share an ID.
    #[error("duplicate phase id {0}")]
    DuplicatePhase(crate::core::PhaseId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::RejectionReason;

    #[test]
    fn test_rejection_is_recoverable() {
        let error = EngineError::Rejected {
            event: Event::pass(ArtifactId(1)),
            response: ConditionResponse::invalid(RejectionReason::NotOwner, "not your turn"),
        };
        assert!(error.is_rejection());
        assert_eq!(error.response().map(|r| r.rejection_reason()), Some(RejectionReason::NotOwner));
        assert_eq!(error.to_string(), "event rejected: not owner: not your turn");
    }

    #[test]
    fn test_invariant_is_fatal() {
        let error = EngineError::invariant("piece not on tile");
        assert!(!error.is_rejection());
        assert!(error.response().is_none());
    }

    #[test]
    fn test_build_error_messages() {
        let error = BuildError::WrongKind {
            artifact: ArtifactId(4),
            expected: ArtifactKind::Tile,
            actual: ArtifactKind::Piece,
        };
        assert_eq!(error.to_string(), "Artifact(4) is a Piece, expected Tile");
    }
}
