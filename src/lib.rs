// Core layer - shared types and configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// Re-export core config
pub use crate::core::{Config, GenerationCounter};

// Re-export feature items
pub use crate::features::{
    // Dispatch
    DispatchError, ErrorKind, HttpDispatcher, Query, QueryDispatcher, RequestOutcome,
    // Image generation
    GeneratedImage, ImageGenerator, ImageRequest,
    // Modes
    InvalidModeIndex, Mode, ModeRegistry,
    // Orchestrator
    OrchestrationState, OrchestratorError, QueryOrchestrator,
    // Timer
    ElapsedTimer, TimerError, TimerHandle,
    // Typewriter
    Playback, TypewriterRenderer,
};
