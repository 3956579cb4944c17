//! Rules: a condition paired with the mutator it guards.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::condition::{Condition, ConditionExpr};
use crate::core::EventKind;
use crate::mutator::Mutator;

/// A condition and the transition applied when it is `Valid`.
///
/// ## Event-kind filter
///
/// A rule may declare the event kinds it handles. For any other kind the
/// rule answers `Ignore` without the event reaching its condition (when
/// `EngineConfig::event_kind_filter` is on) or regardless of what the
/// condition says (when it is off). Either way the outcome is the same.
#[derive(Clone, Debug)]
pub struct Rule {
    name: String,
    condition: ConditionExpr,
    mutator: Arc<dyn Mutator>,
    event_kinds: Option<SmallVec<[EventKind; 2]>>,
}

impl Rule {
    /// Create a rule.
    pub fn new(
        name: impl Into<String>,
        condition: ConditionExpr,
        mutator: impl Mutator + 'static,
    ) -> Self {
        Self::shared(name, condition, Arc::new(mutator))
    }

    /// Create a rule around an already shared mutator.
    pub fn shared(
        name: impl Into<String>,
        condition: ConditionExpr,
        mutator: Arc<dyn Mutator>,
    ) -> Self {
        Self {
            name: name.into(),
            condition,
            mutator,
            event_kinds: None,
        }
    }

    /// Create a rule whose condition is a single leaf.
    pub fn when(
        name: impl Into<String>,
        condition: impl Condition + 'static,
        mutator: impl Mutator + 'static,
    ) -> Self {
        Self::new(name, ConditionExpr::condition(condition), mutator)
    }

    /// Restrict the rule to one event kind (builder pattern).
    #[must_use]
    pub fn with_event_kind(mut self, kind: EventKind) -> Self {
        let kinds = self.event_kinds.get_or_insert_with(SmallVec::new);
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
        self
    }

    /// Restrict the rule to several event kinds (builder pattern).
    #[must_use]
    pub fn with_event_kinds(self, kinds: impl IntoIterator<Item = EventKind>) -> Self {
        kinds.into_iter().fold(self, Self::with_event_kind)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn condition(&self) -> &ConditionExpr {
        &self.condition
    }

    #[must_use]
    pub fn mutator(&self) -> &Arc<dyn Mutator> {
        &self.mutator
    }

    /// Declared event kinds, `None` for every kind.
    #[must_use]
    pub fn event_kinds(&self) -> Option<&[EventKind]> {
        self.event_kinds.as_deref()
    }

    /// Check whether the rule's filter admits `kind`.
    #[must_use]
    pub fn handles(&self, kind: EventKind) -> bool {
        self.event_kinds.as_ref().map_or(true, |kinds| kinds.contains(&kind))
    }
}
