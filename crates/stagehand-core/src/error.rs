//! Unified error handling for Stagehand Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors. Errors gain context (action name, step index, path, command) while
//! they unwind through the executor chain, and render as one message chain.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Stagehand Core operations.
#[derive(Debug, Error, Clone)]
pub enum StagehandError {
    /// Errors from the domain layer (malformed input, templating).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (I/O, processes, network).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// An error wrapped with the identity of the stage that produced it.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<StagehandError>,
    },

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl StagehandError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Context { source, .. } => source.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Stagehand".into(),
                "Please report this issue with the failing action file attached".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Template => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Context { source, .. } => source.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// The innermost error, with every context layer stripped.
    pub fn root_cause(&self) -> &StagehandError {
        match self {
            Self::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type StagehandResult<T> = Result<T, StagehandError>;

/// Extension trait for adding stage context to errors.
pub trait Context<T> {
    /// Wrap an error with a fixed context message.
    fn context(self, msg: impl Into<String>) -> StagehandResult<T>;

    /// Wrap an error with a lazily built context message.
    fn with_context<F, S>(self, f: F) -> StagehandResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: Into<StagehandError>,
{
    fn context(self, msg: impl Into<String>) -> StagehandResult<T> {
        self.map_err(|e| StagehandError::Context {
            context: msg.into(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<F, S>(self, f: F) -> StagehandResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| StagehandError::Context {
            context: f().into(),
            source: Box::new(e.into()),
        })
    }
}
