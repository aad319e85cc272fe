//! # Feature: Query Orchestrator
//!
//! The state machine composing modes, timer, dispatch, and typewriter into
//! one canonical submission cycle. The orchestrator is the sole component a
//! front end talks to: it owns the orchestration state exclusively and
//! publishes a snapshot to every subscriber after each transition.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod engine;
pub mod state;

pub use engine::QueryOrchestrator;
pub use state::{OrchestrationState, OrchestratorError};
