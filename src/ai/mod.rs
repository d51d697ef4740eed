//! AI collaborator: prompt construction, response parsing, and the
//! insight/content state that sits beside the ledger.
//!
//! The text backend is abstracted behind [`InsightProvider`]; nothing in
//! this module mutates ledger state.

pub mod model;
pub mod parse;
pub mod prompt;
pub mod service;
pub mod state;

use thiserror::Error;

pub use model::{
    AiInsight, ContentDraft, ContentKind, ContentStatus, GeneratedContent, Impact, InsightDraft,
    InsightKind,
};
pub use prompt::{AiRequest, BlogStyle, Completion, SummaryPeriod};
pub use service::{AiService, InsightProvider};
pub use state::{AiSettings, AiSettingsPatch, AiState, InsightFrequency};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("AI not enabled or API key missing")]
    NotConfigured,
    #[error("No response from AI")]
    EmptyResponse,
    #[error("{0}")]
    Backend(String),
}
