//! Engine configuration types.
//!
//! - `PhaseId`: opaque phase identifier, assigned by the builder
//! - `EngineConfig`: switches for the decision plan's fast paths and
//!   build-time checks
//!
//! Configuration is a plain value passed to `EngineBuilder::with_config`.
//! Two engines built with different configs in the same process never
//! observe each other's settings.

use serde::{Deserialize, Serialize};

/// Phase identifier. Games define what phases exist.
///
/// The engine doesn't interpret phase IDs beyond ordering diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PhaseId(pub u16);

impl PhaseId {
    /// Create a new phase ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for PhaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Phase({})", self.0)
    }
}

/// Engine-wide switches.
///
/// All fast paths are semantically transparent: turning one off changes
/// how much work a decision costs, never which decision is made.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Skip plan entries whose event-kind filter excludes the event before
    /// running their condition.
    pub event_kind_filter: bool,

    /// Skip evaluating phase gates that compiled to "always valid".
    pub skip_trivial_gates: bool,

    /// Record `PlanStats` counters.
    pub collect_stats: bool,

    /// Reject self-loop and zero-distance tile relations at build time.
    pub validate_topology: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_kind_filter: true,
            skip_trivial_gates: true,
            collect_stats: true,
            validate_topology: true,
        }
    }
}

impl EngineConfig {
    /// Configuration with every fast path disabled.
    ///
    /// Useful for checking that fast paths don't change outcomes.
    #[must_use]
    pub fn exhaustive() -> Self {
        Self {
            event_kind_filter: false,
            skip_trivial_gates: false,
            ..Self::default()
        }
    }

    /// Enable or disable statistics collection.
    #[must_use]
    pub fn with_stats(mut self, enabled: bool) -> Self {
        self.collect_stats = enabled;
        self
    }

    /// Enable or disable topology validation.
    #[must_use]
    pub fn with_topology_validation(mut self, enabled: bool) -> Self {
        self.validate_topology = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_fast_paths() {
        let config = EngineConfig::default();
        assert!(config.event_kind_filter);
        assert!(config.skip_trivial_gates);
        assert!(config.collect_stats);
    }

    #[test]
    fn test_exhaustive_disables_fast_paths() {
        let config = EngineConfig::exhaustive();
        assert!(!config.event_kind_filter);
        assert!(!config.skip_trivial_gates);
        assert!(config.validate_topology);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"collect_stats": false}"#).unwrap();
        assert!(!config.collect_stats);
        assert!(config.event_kind_filter);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(format!("{}", PhaseId::new(3)), "Phase(3)");
    }
}
