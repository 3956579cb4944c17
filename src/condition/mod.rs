//! Condition algebra.
//!
//! Conditions answer "does this rule apply to this event, and if so does
//! it accept it?" with a tri-state [`Verdict`]. Game modules implement
//! [`Condition`] (event-scoped) and [`StateCondition`] (phase gates) and
//! combine them with AND/OR/NOT through [`Expr`].
//!
//! ## Example
//!
//! ```
//! use rust_tabletop::condition::{builtin, ConditionExpr};
//! use rust_tabletop::core::EventKind;
//!
//! let rule = ConditionExpr::condition(builtin::EventIs(EventKind::MOVE))
//!     .and(ConditionExpr::condition(builtin::IsActivePlayer))
//!     .and(ConditionExpr::condition(builtin::PieceOwnedByPlayer));
//!
//! // One flat AND, not a nested tree.
//! assert_eq!(rule.leaf_count(), 3);
//! ```

pub mod builtin;
mod expr;
mod response;

use std::sync::Arc;

pub use expr::{CompiledExpr, Expr};
pub use response::{ConditionResponse, RejectionReason, Verdict};

use crate::core::Event;
use crate::engine::Engine;
use crate::state::GameState;

/// Event-scoped condition.
pub trait Condition: Send + Sync {
    fn evaluate(&self, engine: &Engine, state: &GameState, event: &Event) -> ConditionResponse;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Condition over a state alone. Used as phase gates.
pub trait StateCondition: Send + Sync {
    fn evaluate(&self, state: &GameState) -> ConditionResponse;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl std::fmt::Debug for dyn Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Debug for dyn StateCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Expression over event-scoped conditions.
pub type ConditionExpr = Expr<Arc<dyn Condition>>;

/// Expression over state conditions.
pub type GateExpr = Expr<Arc<dyn StateCondition>>;

impl Expr<Arc<dyn Condition>> {
    /// Leaf wrapping `condition`.
    pub fn condition(condition: impl Condition + 'static) -> Self {
        Self::Leaf(Arc::new(condition))
    }

    /// Evaluate by walking the tree.
    pub fn evaluate(&self, engine: &Engine, state: &GameState, event: &Event) -> ConditionResponse {
        self.evaluate_with(&mut |c: &Arc<dyn Condition>| c.evaluate(engine, state, event))
    }
}

impl Expr<Arc<dyn StateCondition>> {
    /// Leaf wrapping `gate`.
    pub fn gate(gate: impl StateCondition + 'static) -> Self {
        Self::Leaf(Arc::new(gate))
    }

    /// Evaluate by walking the tree.
    pub fn evaluate(&self, state: &GameState) -> ConditionResponse {
        self.evaluate_with(&mut |g: &Arc<dyn StateCondition>| g.evaluate(state))
    }
}

impl CompiledExpr<Arc<dyn Condition>> {
    pub fn evaluate(&self, engine: &Engine, state: &GameState, event: &Event) -> ConditionResponse {
        self.evaluate_with(&mut |c: &Arc<dyn Condition>| c.evaluate(engine, state, event))
    }
}

impl CompiledExpr<Arc<dyn StateCondition>> {
    pub fn evaluate(&self, state: &GameState) -> ConditionResponse {
        self.evaluate_with(&mut |g: &Arc<dyn StateCondition>| g.evaluate(state))
    }
}
