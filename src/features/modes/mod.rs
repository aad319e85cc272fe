//! # Feature: Modes
//!
//! Static catalog of selectable query modes, each binding a label to the
//! remote endpoint it dispatches to, plus the currently active selection.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A named configuration selecting which remote endpoint a query is sent to.
///
/// Modes are defined at startup and never change; the registry owns the set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub id: String,
    pub label: String,
    pub endpoint_url: String,
}

impl Mode {
    pub fn new(id: &str, label: &str, endpoint_url: &str) -> Self {
        Mode {
            id: id.to_string(),
            label: label.to_string(),
            endpoint_url: endpoint_url.to_string(),
        }
    }
}

/// Returned by [`ModeRegistry::set_active`] for an out-of-range index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mode index {index} is out of range (registry has {count} modes)")]
pub struct InvalidModeIndex {
    pub index: usize,
    pub count: usize,
}

/// Owns the ordered mode catalog and the active selection.
#[derive(Debug, Clone)]
pub struct ModeRegistry {
    modes: Vec<Mode>,
    active: usize,
}

impl ModeRegistry {
    /// Build a registry from a startup catalog. The first mode is active.
    ///
    /// Panics if `modes` is empty; a gateway without endpoints is a
    /// configuration bug, not a runtime condition.
    pub fn new(modes: Vec<Mode>) -> Self {
        assert!(!modes.is_empty(), "mode catalog must not be empty");
        ModeRegistry { modes, active: 0 }
    }

    pub fn list(&self) -> &[Mode] {
        &self.modes
    }

    pub fn active(&self) -> &Mode {
        &self.modes[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn set_active(&mut self, index: usize) -> Result<(), InvalidModeIndex> {
        if index >= self.modes.len() {
            return Err(InvalidModeIndex {
                index,
                count: self.modes.len(),
            });
        }
        self.active = index;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> ModeRegistry {
        ModeRegistry::new(vec![
            Mode::new("search", "Search", "https://example.test/search"),
            Mode::new("deep", "Deep Search", "https://example.test/deep"),
            Mode::new("chat", "AI Chat", "https://example.test/chat"),
        ])
    }

    #[test]
    fn first_mode_is_active_by_default() {
        let registry = sample_registry();
        assert_eq!(registry.active().id, "search");
        assert_eq!(registry.active_index(), 0);
    }

    #[test]
    fn list_preserves_catalog_order() {
        let registry = sample_registry();
        let ids: Vec<&str> = registry.list().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["search", "deep", "chat"]);
    }

    #[test]
    fn set_active_switches_selection() {
        let mut registry = sample_registry();
        registry.set_active(2).unwrap();
        assert_eq!(registry.active().id, "chat");
    }

    #[test]
    fn set_active_rejects_out_of_range_index() {
        let mut registry = sample_registry();
        let err = registry.set_active(3).unwrap_err();
        assert_eq!(err, InvalidModeIndex { index: 3, count: 3 });
        // Selection unchanged after a rejected switch
        assert_eq!(registry.active_index(), 0);
    }
}
