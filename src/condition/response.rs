//! Tri-state condition verdicts.

use serde::{Deserialize, Serialize};

/// Outcome of evaluating one condition.
///
/// `Ignore` and `Invalid` are different answers: `Ignore` means the
/// condition has nothing to say about this event, `Invalid` means it
/// applies and rejects it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Valid,
    Invalid,
    Ignore,
}

/// Structured category of a rejection.
///
/// Conditions return one of these directly; nothing parses explanation
/// text to recover it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// Acting on an artifact the player doesn't own, or out of turn.
    NotOwner,
    /// Something stands between source and destination.
    PathObstructed,
    /// Destination holds a piece that can't be displaced.
    DestinationOccupied,
    /// The move doesn't match any of the piece's patterns.
    InvalidPattern,
    /// No rule of the current phase handles this event.
    WrongPhase,
    /// Dice, money or another resource is missing.
    InsufficientResources,
    /// The game is already over.
    GameEnded,
    /// Any other rule rejected the event.
    RuleViolation,
}

impl RejectionReason {
    /// Stable identifier for localization tables.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::NotOwner => "not_owner",
            Self::PathObstructed => "path_obstructed",
            Self::DestinationOccupied => "destination_occupied",
            Self::InvalidPattern => "invalid_pattern",
            Self::WrongPhase => "wrong_phase",
            Self::InsufficientResources => "insufficient_resources",
            Self::GameEnded => "game_ended",
            Self::RuleViolation => "rule_violation",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NotOwner => "not owner",
            Self::PathObstructed => "path obstructed",
            Self::DestinationOccupied => "destination occupied",
            Self::InvalidPattern => "invalid movement pattern",
            Self::WrongPhase => "wrong phase",
            Self::InsufficientResources => "insufficient resources",
            Self::GameEnded => "game ended",
            Self::RuleViolation => "rule violation",
        })
    }
}

/// Verdict of one evaluation, with diagnostics for rejections.
///
/// ## Failing children
///
/// A rejected OR carries every rejecting alternative in `failing`. The
/// list is flat because composite expressions are flattened when built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionResponse {
    pub verdict: Verdict,
    pub reason: Option<RejectionReason>,
    /// Human-readable explanation. Empty for `Valid` and `Ignore`.
    pub message: String,
    pub failing: Vec<ConditionResponse>,
}

impl ConditionResponse {
    fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            reason: None,
            message: String::new(),
            failing: Vec::new(),
        }
    }

    /// The condition applies and accepts.
    #[must_use]
    pub fn valid() -> Self {
        Self::new(Verdict::Valid)
    }

    /// The condition does not apply.
    #[must_use]
    pub fn ignore() -> Self {
        Self::new(Verdict::Ignore)
    }

    /// The condition applies and rejects.
    pub fn invalid(reason: RejectionReason, message: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Invalid,
            reason: Some(reason),
            message: message.into(),
            failing: Vec::new(),
        }
    }

    /// Valid if `ok`, otherwise rejected with `reason`.
    pub fn check(ok: bool, reason: RejectionReason, message: impl FnOnce() -> String) -> Self {
        if ok {
            Self::valid()
        } else {
            Self::invalid(reason, message())
        }
    }

    /// Attach failing child responses.
    #[must_use]
    pub fn with_failing(mut self, failing: Vec<ConditionResponse>) -> Self {
        self.failing = failing;
        self
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.verdict == Verdict::Valid
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.verdict == Verdict::Invalid
    }

    #[must_use]
    pub fn is_ignore(&self) -> bool {
        self.verdict == Verdict::Ignore
    }

    /// Reason for a rejection: the response's own reason, else the first
    /// failing child's, else `RuleViolation`.
    #[must_use]
    pub fn rejection_reason(&self) -> RejectionReason {
        self.reason
            .or_else(|| self.failing.first().map(Self::rejection_reason))
            .unwrap_or(RejectionReason::RuleViolation)
    }
}

impl std::fmt::Display for ConditionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.verdict {
            Verdict::Valid => f.write_str("valid"),
            Verdict::Ignore => f.write_str("not applicable"),
            Verdict::Invalid if self.message.is_empty() => write!(f, "{}", self.rejection_reason()),
            Verdict::Invalid => write!(f, "{}: {}", self.rejection_reason(), self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert!(ConditionResponse::valid().is_valid());
        assert!(ConditionResponse::ignore().is_ignore());

        let rejected = ConditionResponse::invalid(RejectionReason::PathObstructed, "blocked at e5");
        assert!(rejected.is_invalid());
        assert_eq!(rejected.rejection_reason(), RejectionReason::PathObstructed);
        assert_eq!(rejected.to_string(), "path obstructed: blocked at e5");
    }

    #[test]
    fn test_reason_falls_back_to_children() {
        let child = ConditionResponse::invalid(RejectionReason::NotOwner, "");
        let parent = ConditionResponse {
            verdict: Verdict::Invalid,
            reason: None,
            message: String::new(),
            failing: Vec::new(),
        }
        .with_failing(vec![child]);

        assert_eq!(parent.rejection_reason(), RejectionReason::NotOwner);
    }

    #[test]
    fn test_reason_defaults_to_rule_violation() {
        let bare = ConditionResponse {
            verdict: Verdict::Invalid,
            reason: None,
            message: String::new(),
            failing: Vec::new(),
        };
        assert_eq!(bare.rejection_reason(), RejectionReason::RuleViolation);
    }

    #[test]
    fn test_check() {
        let held = ConditionResponse::check(true, RejectionReason::GameEnded, || unreachable!());
        assert!(held.is_valid());
        let rejected =
            ConditionResponse::check(false, RejectionReason::GameEnded, || "over".into());
        assert_eq!(rejected.reason, Some(RejectionReason::GameEnded));
    }

    #[test]
    fn test_reason_keys_are_distinct() {
        let reasons = [
            RejectionReason::NotOwner,
            RejectionReason::PathObstructed,
            RejectionReason::DestinationOccupied,
            RejectionReason::InvalidPattern,
            RejectionReason::WrongPhase,
            RejectionReason::InsufficientResources,
            RejectionReason::GameEnded,
            RejectionReason::RuleViolation,
        ];
        let mut keys: Vec<_> = reasons.iter().map(|r| r.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), reasons.len());
    }
}
