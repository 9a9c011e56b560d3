// ============================================================================
// domain/error.rs - construction and templating errors
// ============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel through shared preload state)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Construction errors
    // ========================================================================
    #[error("command is empty [dir: {dir}]")]
    EmptyCommand { dir: PathBuf },

    #[error("file path is empty")]
    EmptyFilePath,

    #[error("file '{path}' declares no content source (one of data, get, local)")]
    MissingFileSource { path: PathBuf },

    #[error("file '{path}' declares more than one content source: {}", .sources.join(", "))]
    ConflictingFileSources {
        path: PathBuf,
        sources: Vec<&'static str>,
    },

    #[error("invalid skip pattern '{pattern}': {reason}")]
    InvalidSkipPattern { pattern: String, reason: String },

    #[error("unrecognized template option '{option}'")]
    InvalidTemplateOption { option: String },

    // ========================================================================
    // Templating errors
    // ========================================================================
    #[error("template {template}: {reason}")]
    TemplateSyntax { template: String, reason: String },

    #[error("template {template}: map has no entry for key \"{key}\"")]
    MissingTemplateKey { template: String, key: String },

    #[error("template {template}: {reason}")]
    TemplateExecution { template: String, reason: String },

    /// A rendered tree path that would leave the tree root.
    #[error("path '{rendered}' rendered from '{template}' {reason}")]
    UnsafeRenderedPath {
        template: String,
        rendered: String,
        reason: &'static str,
    },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EmptyCommand { .. } => vec![
                "Remove the empty command or give it an executable".into(),
            ],
            Self::MissingFileSource { path } | Self::ConflictingFileSources { path, .. } => vec![
                format!("Declare exactly one source for '{}'", path.display()),
                "Use `data` for inline content, `get` for a URL, `local` to copy a file".into(),
            ],
            Self::InvalidSkipPattern { .. } => vec![
                "Skip patterns are regular expressions, check the syntax".into(),
            ],
            Self::InvalidTemplateOption { .. } => vec![
                "Supported: missingkey=default, missingkey=invalid, missingkey=zero, missingkey=error"
                    .into(),
            ],
            Self::MissingTemplateKey { key, .. } => vec![
                format!("Define '{}' under [vars] or pass --var {}=...", key, key),
                "Or relax the policy with --missing-key default".into(),
            ],
            Self::UnsafeRenderedPath { .. } => vec![
                "Rendered tree paths must stay relative to the tree root".into(),
                "Define every variable used in file and directory names".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateSyntax { .. }
            | Self::MissingTemplateKey { .. }
            | Self::TemplateExecution { .. }
            | Self::UnsafeRenderedPath { .. } => ErrorCategory::Template,
            _ => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Template,
    Internal,
}
