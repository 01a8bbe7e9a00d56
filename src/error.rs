//! Error types for the consultas-load crate.
use thiserror::Error;

/// Errors that can stop a run before or while it is being set up.
///
/// Failures of individual requests are never surfaced through this type;
/// they are folded into the run statistics instead.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid header value for {name}: {reason}")]
    Header { name: String, reason: String },

    #[error("Invalid payload template: {0}")]
    TemplateSyntax(#[from] handlebars::TemplateError),

    #[error("Failed to render payload template: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("Payload is not valid JSON: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Histogram error: {0}")]
    Histogram(#[from] histogram::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to obtain any response from the target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    /// Status code when the failure carried one, 0 otherwise.
    pub status: u16,
    pub message: String,
    /// Underlying cause, `-` when there is none.
    pub source_desc: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            message: message.into(),
            source_desc: "-".to_string(),
        }
    }
}
