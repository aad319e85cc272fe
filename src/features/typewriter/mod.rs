//! # Feature: Typewriter Renderer
//!
//! Turns a final text string into an ordered sequence of growing prefixes,
//! one character per step, paced by a per-character delay. Playback checks
//! the live generation token before every emission and halts silently once
//! a newer generation has started, so two renders can never interleave
//! writes to the same display.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use tokio::time::{sleep, Duration};

use crate::core::generation::GenerationCounter;

/// How a playback run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// The full-length prefix was emitted.
    Completed,
    /// A newer generation took over; emission stopped early.
    Superseded,
}

#[derive(Debug, Clone)]
pub struct TypewriterRenderer {
    generation: GenerationCounter,
}

impl TypewriterRenderer {
    pub fn new(generation: GenerationCounter) -> Self {
        TypewriterRenderer { generation }
    }

    /// Emit the prefixes of `text` (0 through N characters, inclusive) to
    /// `on_prefix`, sleeping `ms_per_char` between emissions.
    ///
    /// `on_prefix` receives the revealed character count and the prefix
    /// slice. A pace of 0 collapses playback to a single emission of the
    /// full text. Playback is not restartable; a new call is a fresh
    /// sequence under its own token.
    pub async fn play<F>(
        &self,
        text: &str,
        ms_per_char: u64,
        token: u64,
        mut on_prefix: F,
    ) -> Playback
    where
        F: FnMut(usize, &str),
    {
        if ms_per_char == 0 {
            if !self.generation.is_current(token) {
                return Playback::Superseded;
            }
            on_prefix(text.chars().count(), text);
            return Playback::Completed;
        }

        // Byte offset where each prefix ends: one entry per prefix length,
        // 0 chars through all of them.
        let mut ends: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        ends.push(text.len());

        for (revealed, &end) in ends.iter().enumerate() {
            if !self.generation.is_current(token) {
                return Playback::Superseded;
            }
            on_prefix(revealed, &text[..end]);
            if revealed + 1 < ends.len() {
                sleep(Duration::from_millis(ms_per_char)).await;
            }
        }

        Playback::Completed
    }
}
