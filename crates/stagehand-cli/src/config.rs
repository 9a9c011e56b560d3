//! Tool configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the library crates never see it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `STAGEHAND_*` environment variables, `__` between nested keys
//!    (`STAGEHAND_RUN__PRELOAD=true`)
//! 3. The `--config` file, or the user config file when none is given
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Defaults for `stagehand run`.
    pub run: RunConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub dry_run: bool,
    pub preload: bool,
    /// `default`, `invalid`, `zero` or `error`.
    pub missing_key: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            preload: false,
            missing_key: "default".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
}

impl AppConfig {
    /// Load configuration, layering file and environment over the defaults.
    ///
    /// An explicit `config_file` must exist; the user config file is optional.
    pub fn load(config_file: Option<&PathBuf>) -> CliResult<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        Self::load_from(&path, required, true)
    }

    fn load_from(path: &Path, required: bool, with_env: bool) -> CliResult<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("run.dry_run", defaults.run.dry_run)
            .and_then(|b| b.set_default("run.preload", defaults.run.preload))
            .and_then(|b| b.set_default("run.missing_key", defaults.run.missing_key.clone()))
            .and_then(|b| b.set_default("output.no_color", defaults.output.no_color))
            .map_err(|e| config_error("invalid default", e))?
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(required),
            );
        if with_env {
            builder = builder.add_source(
                Environment::with_prefix("STAGEHAND")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        builder
            .build()
            .and_then(|c| c.try_deserialize::<AppConfig>())
            .map_err(|e| config_error(&format!("cannot load {}", path.display()), e))
    }

    /// Path to the user configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.stagehand.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "stagehand", "stagehand")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".stagehand.toml"))
    }
}

fn config_error(message: &str, source: config::ConfigError) -> CliError {
    CliError::ConfigError {
        message: format!("{message}: {source}"),
        source: Some(Box::new(source)),
    }
}
