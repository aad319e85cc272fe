//! # Feature: Request Dispatch
//!
//! One outbound call per invocation against the active mode's endpoint,
//! normalized into a typed [`RequestOutcome`]. No retries and no timeout
//! beyond what the transport provides natively.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;

use crate::features::modes::Mode;

/// One user submission, validated to be non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
}

impl Query {
    /// Trim the raw input; `None` if nothing is left.
    pub fn new(raw: &str) -> Option<Query> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Query {
                text: trimmed.to_string(),
            })
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Classification of a failed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network/connection failure; no response was received.
    Transport,
    /// The endpoint answered, but not with a usable success.
    Api,
}

/// A dispatch failure, resolved locally - never an uncaught fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DispatchError {
    pub kind: ErrorKind,
    pub message: String,
}

impl DispatchError {
    pub fn transport(message: impl Into<String>) -> Self {
        DispatchError {
            kind: ErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        DispatchError {
            kind: ErrorKind::Api,
            message: message.into(),
        }
    }

    /// The form shown to the user, e.g. `Error: HTTP 500 - server error`.
    pub fn user_message(&self) -> String {
        format!("Error: {}", self.message)
    }
}

/// The typed result of one dispatch attempt. Exactly one is produced per
/// dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Success {
        /// Display text: the payload's `text` field, or the whole payload
        /// pretty-printed when that field is absent.
        text: String,
        raw_payload: Value,
        duration_seconds: f64,
    },
    Failure(DispatchError),
}

/// Wire body for the text-query endpoints.
#[derive(Serialize)]
struct QuestionBody<'a> {
    question: &'a str,
}

/// Seam between the orchestrator and the network, so tests can inject a
/// deterministic stand-in.
#[async_trait]
pub trait QueryDispatcher: Send + Sync {
    async fn dispatch(&self, mode: &Mode, query: &Query) -> RequestOutcome;
}

/// Production dispatcher backed by reqwest.
#[derive(Debug, Clone, Default)]
pub struct HttpDispatcher {
    client: reqwest::Client,
}

impl HttpDispatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueryDispatcher for HttpDispatcher {
    async fn dispatch(&self, mode: &Mode, query: &Query) -> RequestOutcome {
        debug!("POST {} (mode {})", mode.endpoint_url, mode.id);
        let started = Instant::now();

        let response = match self
            .client
            .post(&mode.endpoint_url)
            .json(&QuestionBody {
                question: query.text(),
            })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return RequestOutcome::Failure(DispatchError::transport(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return RequestOutcome::Failure(DispatchError::api(format!(
                "HTTP {} - {body}",
                status.as_u16()
            )));
        }

        let payload: Value = match response.json().await {
            Ok(payload) => payload,
            Err(e) => return RequestOutcome::Failure(DispatchError::transport(e.to_string())),
        };

        RequestOutcome::Success {
            text: display_text(&payload),
            raw_payload: payload,
            duration_seconds: started.elapsed().as_secs_f64(),
        }
    }
}

/// Pick the display text out of a success payload. A missing `text` field is
/// a fallback to the formatted payload, not a decode failure.
fn display_text(payload: &Value) -> String {
    match payload.get("text").and_then(Value::as_str) {
        Some(text) => text.to_string(),
        None => serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_trims_surrounding_whitespace() {
        let query = Query::new("  capital of France \n").unwrap();
        assert_eq!(query.text(), "capital of France");
    }

    #[test]
    fn query_rejects_empty_and_whitespace_only_input() {
        assert!(Query::new("").is_none());
        assert!(Query::new("   \t\n").is_none());
    }

    #[test]
    fn display_text_prefers_the_text_field() {
        let payload = json!({"text": "Paris", "sources": ["wiki"]});
        assert_eq!(display_text(&payload), "Paris");
    }

    #[test]
    fn display_text_falls_back_to_formatted_payload() {
        let payload = json!({"answer": 42});
        let rendered = display_text(&payload);
        assert!(rendered.contains("\"answer\": 42"));
    }

    #[test]
    fn display_text_ignores_non_string_text_field() {
        let payload = json!({"text": 7});
        assert!(display_text(&payload).contains("\"text\": 7"));
    }

    #[test]
    fn user_message_prefixes_the_verbatim_error() {
        let err = DispatchError::api("HTTP 500 - server error");
        assert_eq!(err.user_message(), "Error: HTTP 500 - server error");
    }
}
