//! Generation token shared between the orchestrator and its collaborators.
//!
//! Each submission (and each mode switch) bumps the counter. Timer ticks,
//! typewriter prefixes, and late dispatch results carry the token they were
//! started with and are silently discarded once the live value has moved on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonically increasing supersession counter.
///
/// Cloning yields another view of the same counter. Only the orchestrator
/// bumps it; everything else just compares a captured token against the
/// live value.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter(Arc<AtomicU64>);

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently live token.
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Advance to a fresh generation and return its token.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether a captured token still identifies the live generation.
    pub fn is_current(&self, token: u64) -> bool {
        self.current() == token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_invalidates_older_tokens() {
        let counter = GenerationCounter::new();
        let first = counter.bump();
        assert!(counter.is_current(first));

        let second = counter.bump();
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
        assert_eq!(second, first + 1);
    }

    #[test]
    fn clones_share_the_same_counter() {
        let counter = GenerationCounter::new();
        let view = counter.clone();

        let token = counter.bump();
        assert!(view.is_current(token));
    }
}
