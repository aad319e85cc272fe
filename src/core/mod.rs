//! # Core Module
//!
//! Core domain types and configuration for the liora gateway.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial creation with config and generation modules

pub mod config;
pub mod generation;

// Re-export commonly used items
pub use config::Config;
pub use generation::GenerationCounter;
