//! Application context that holds resolved configuration
//!
//! The context is built following the precedence order:
//! 1. Default values
//! 2. Config file values
//! 3. Environment variables
//! 4. CLI flags
//!
//! Once built, the context is passed as read-only throughout the application.

use crate::format::{ColorChoice, OutputFormat};
use libbupkis::auth::CredentialStore;
use libbupkis::{ClientConfig, Config};
use std::env;
use std::path::PathBuf;

/// Verbosity level for user-facing progress messages and log filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Default: results and errors only
    Normal,
    /// `-v`
    Verbose,
    /// `-vv`
    VeryVerbose,
    /// `-vvv` and beyond
    Trace,
}

impl VerbosityLevel {
    /// Maps the number of `-v` flags to a level
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::VeryVerbose,
            _ => Self::Trace,
        }
    }

    /// Default `tracing` filter directive for this level
    pub fn tracing_filter(&self) -> &'static str {
        match self {
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::VeryVerbose => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Values given on the command line. `None`/`false` leaves the lower
/// precedence value in place.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub color: Option<ColorChoice>,
    pub format: Option<OutputFormat>,
    pub timeout: Option<u64>,
    pub concurrency: Option<usize>,
    pub plain_http: bool,
    pub strict: bool,
}

/// Application context with resolved configuration and runtime state
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Resolved configuration
    pub config: Config,
    /// Verbosity requested on the command line
    pub verbosity: VerbosityLevel,
}

impl AppContext {
    /// Build context with precedence: defaults > config file > env vars > CLI flags
    pub fn build(overrides: CliOverrides, verbosity: VerbosityLevel) -> Result<Self, String> {
        let mut config = Config::load(overrides.config_path.as_deref())
            .map_err(|e| format!("Failed to load configuration: {}", e))?;

        apply_env(&mut config, |key| env::var(key).ok())?;
        apply_overrides(&mut config, &overrides);

        Ok(Self::from_config(config, verbosity))
    }

    /// Wraps an already resolved configuration
    pub fn from_config(config: Config, verbosity: VerbosityLevel) -> Self {
        Self { config, verbosity }
    }

    /// Registry client settings derived from the resolved configuration
    pub fn client_config(&self) -> ClientConfig {
        self.config.to_client_config()
    }

    /// Opens the configured credential store
    pub fn credential_store(&self) -> Result<Box<dyn CredentialStore>, String> {
        self.config
            .open_credential_store()
            .map_err(|e| e.to_string())
    }

    /// Output format to use when a command doesn't override it
    pub fn output_format(&self) -> OutputFormat {
        self.config.output.format
    }
}

/// Applies `BUPKIS_TIMEOUT` and `BUPKIS_COLOR`
pub(crate) fn apply_env<F>(config: &mut Config, lookup: F) -> Result<(), String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(timeout) = lookup("BUPKIS_TIMEOUT") {
        config.network.timeout = timeout
            .trim()
            .parse()
            .map_err(|_| format!("Invalid BUPKIS_TIMEOUT value '{}'", timeout))?;
    }
    if let Some(color) = lookup("BUPKIS_COLOR") {
        config.output.color = ColorChoice::from(color.as_str());
    }
    Ok(())
}

pub(crate) fn apply_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(color) = overrides.color {
        config.output.color = color;
    }
    if let Some(format) = overrides.format {
        config.output.format = format;
    }
    if let Some(timeout) = overrides.timeout {
        config.network.timeout = timeout;
    }
    if let Some(concurrency) = overrides.concurrency {
        config.network.concurrency = concurrency;
    }
    if overrides.plain_http {
        config.network.plain_http = true;
    }
    if overrides.strict {
        config.policy.continue_on_repository_error = false;
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
