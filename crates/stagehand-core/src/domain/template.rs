//! Template engine options.

use std::fmt;

use super::DomainError;

/// What happens when a template references a variable that is not defined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingKey {
    /// Render nothing.
    #[default]
    Default,
    /// Render the literal marker `<no value>`.
    Invalid,
    /// Render the zero value of an untyped variable (nothing).
    Zero,
    /// Fail the template.
    Error,
}

impl MissingKey {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "default" => Some(Self::Default),
            "invalid" => Some(Self::Invalid),
            "zero" => Some(Self::Zero),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for MissingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Invalid => write!(f, "invalid"),
            Self::Zero => write!(f, "zero"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Options recognised by the template engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateOptions {
    pub missing_key: MissingKey,
}

impl TemplateOptions {
    /// Parse option strings of the form `missingkey=<policy>`.
    ///
    /// Later options override earlier ones.
    pub fn parse<S: AsRef<str>>(options: &[S]) -> Result<Self, DomainError> {
        let mut parsed = Self::default();
        for option in options {
            let option = option.as_ref();
            let policy = option
                .strip_prefix("missingkey=")
                .and_then(MissingKey::parse)
                .ok_or_else(|| DomainError::InvalidTemplateOption {
                    option: option.to_owned(),
                })?;
            parsed.missing_key = policy;
        }
        Ok(parsed)
    }
}
