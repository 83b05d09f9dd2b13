use crate::context;
use crate::logger::Logger;
use std::fmt::Display;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogctxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LogctxError>;

/// An error whose message carries the accumulated context of the logger
/// it was built from.
///
/// The message is fully rendered at construction time, so the error stays
/// meaningful even after the logger that produced it is gone.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ContextError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ContextError {
    /// Build an error whose message is the logger's rendered context
    /// followed by `message`.
    pub fn new(logger: &Logger, message: impl Display) -> Self {
        Self {
            message: format!("{}{}", context::context_string(logger), message),
            source: None,
        }
    }

    /// Like [`ContextError::new`], but wraps `source`: its message is
    /// appended after a `: ` separator and it stays reachable through
    /// [`std::error::Error::source`] for cause-chain traversal.
    pub fn wrap(
        logger: &Logger,
        message: impl Display,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let source = source.into();
        Self {
            message: format!(
                "{}{}: {}",
                context::context_string(logger),
                message,
                source
            ),
            source: Some(source),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
