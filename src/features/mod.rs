//! # Features Module
//!
//! All feature modules of the liora gateway.

pub mod dispatch;
pub mod image_gen;
pub mod modes;
pub mod orchestrator;
pub mod timer;
pub mod typewriter;

// Dispatch
pub use dispatch::{
    DispatchError, ErrorKind, HttpDispatcher, Query, QueryDispatcher, RequestOutcome,
};
// Image generation
pub use image_gen::{GeneratedImage, ImageGenerator, ImageRequest};
// Modes
pub use modes::{InvalidModeIndex, Mode, ModeRegistry};
// Orchestrator
pub use orchestrator::{OrchestrationState, OrchestratorError, QueryOrchestrator};
// Timer
pub use timer::{ElapsedTimer, TimerError, TimerHandle};
// Typewriter
pub use typewriter::{Playback, TypewriterRenderer};
