//! Application layer errors.
//!
//! These errors represent failures of side effects (disk, network,
//! processes) and of orchestration, not malformed input. Input errors are
//! `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while running or wiring executors.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Filesystem operation failed.
    #[error("failed to {operation} {path}: {reason}")]
    Filesystem {
        path: PathBuf,
        operation: &'static str,
        reason: String,
    },

    /// Glob pattern could not be compiled or expanded.
    #[error("glob '{pattern}': {reason}")]
    Glob { pattern: String, reason: String },

    /// Transport-level HTTP failure.
    #[error("get {url}: {reason}")]
    Http { url: String, reason: String },

    /// Server answered with a non-2xx status.
    #[error("get {url}: unexpected status {status}")]
    HttpStatus { url: String, status: u16 },

    /// A process could not be started.
    #[error("start command [dir: {dir}] {command}: {reason}")]
    CommandLaunch {
        command: String,
        dir: PathBuf,
        reason: String,
    },

    /// A process exited unsuccessfully.
    #[error("execute command [dir: {dir}] {command}: {status}\n{output}")]
    CommandFailed {
        command: String,
        dir: PathBuf,
        status: String,
        output: String,
    },

    /// Preload was requested but no preprocessor registry was configured.
    #[error("preload requested but no preprocessor registry is configured")]
    PreloadNotConfigured,

    /// `get` was called more times than there are preloaded files.
    #[error("no preloaded files left")]
    PreloadExhausted,

    /// A shared lock was poisoned by a panicking thread.
    #[error("{resource} lock poisoned")]
    LockPoisoned { resource: &'static str },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Filesystem { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::Glob { .. } => vec!["Check the wildcard pattern in the rm action".into()],
            Self::Http { url, .. } => vec![
                format!("Could not reach {}", url),
                "Check your network connection and settings.http.base_url".into(),
            ],
            Self::HttpStatus { url, status } => vec![
                format!("{} answered {}", url, status),
                "Check the URL and any required headers".into(),
            ],
            Self::CommandLaunch { command, .. } => vec![
                format!("Could not start: {}", command),
                "Ensure the command is installed and in your PATH".into(),
            ],
            Self::CommandFailed { .. } => vec![
                "Check the command output above for details".into(),
            ],
            Self::PreloadNotConfigured => vec![
                "Build the chain through stagehand_adapters::pipeline::build_chain".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpStatus { status: 404, .. } => ErrorCategory::NotFound,
            Self::Glob { .. } => ErrorCategory::Validation,
            Self::PreloadNotConfigured => ErrorCategory::Configuration,
            _ => ErrorCategory::Internal,
        }
    }
}
