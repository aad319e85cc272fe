//! # Feature: Image Generation
//!
//! FLUX-powered image creation via a Together.ai-style b64_json API.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true

pub mod generator;

pub use generator::{GeneratedImage, ImageGenerator, ImageRequest};
