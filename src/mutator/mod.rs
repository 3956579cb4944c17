//! State mutators.
//!
//! A mutator turns `(state, event)` into the next state. It must be a pure
//! function of its inputs: no side effects, no ambient randomness (dice
//! read and write the RNG state stored in `GameState`). When a
//! precondition it relies on is false, such as the piece not standing
//! where the event says, it returns `EngineError::Invariant` rather than
//! guessing.

pub mod builtin;

use std::sync::Arc;

use crate::core::Event;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::state::GameState;

/// Pure state transition.
pub trait Mutator: Send + Sync {
    fn mutate(
        &self,
        engine: &Engine,
        state: &GameState,
        event: &Event,
    ) -> Result<GameState, EngineError>;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl std::fmt::Debug for dyn Mutator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Mutators applied strictly in order, each seeing the previous one's
/// output.
#[derive(Clone, Debug, Default)]
pub struct MutatorChain {
    steps: Vec<Arc<dyn Mutator>>,
}

impl MutatorChain {
    /// Create an empty chain (the identity transition).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step (builder pattern).
    #[must_use]
    pub fn then(mut self, step: impl Mutator + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    /// Append an already shared step.
    pub fn push(&mut self, step: Arc<dyn Mutator>) {
        self.steps.push(step);
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the chain has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Mutator for MutatorChain {
    fn mutate(
        &self,
        engine: &Engine,
        state: &GameState,
        event: &Event,
    ) -> Result<GameState, EngineError> {
        let mut current = state.clone();
        for step in &self.steps {
            current = step.mutate(engine, &current, event)?;
        }
        Ok(current)
    }

    fn name(&self) -> &str {
        "MutatorChain"
    }
}
