//! Application configuration.
//!
//! Configuration is read from YAML with the `config` crate. Every field has
//! a default, so an empty or partial file is valid.

use crate::aggregate::RepositoryFailurePolicy;
use crate::auth::{CredentialStore, DockerConfigStore, FileCredentialStore};
use crate::client::ClientConfig;
use crate::error::{BupkisError, Result};
use config::{Config as ConfigRs, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};


/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub policy: Policy,
    #[serde(default)]
    pub credentials: Credentials,
}

impl Config {
    /// Parses a `Config` from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let builder = ConfigRs::builder()
            .add_source(ConfigRs::try_from(&Config::default())?)
            .add_source(File::from_str(s, FileFormat::Yaml));

        Self::from_builder(builder, None)
    }

    /// Loads a `Config`.
    ///
    /// An explicit `path` must exist. Without one, the file at
    /// [`Config::default_path`] is used when present and defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error carrying the file path if the explicit file
    /// is missing or either file cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let builder = ConfigRs::builder().add_source(ConfigRs::try_from(&Config::default())?);

        match path {
            Some(p) => {
                if !p.is_file() {
                    return Err(BupkisError::config(
                        "Configuration file not found".to_string(),
                        Some(p.display().to_string()),
                    ));
                }
                Self::from_builder(
                    builder.add_source(File::from(p).format(FileFormat::Yaml).required(true)),
                    Some(p),
                )
            }
            None => {
                let default_path = Self::default_path();
                Self::from_builder(
                    builder.add_source(
                        File::from(default_path.as_path())
                            .format(FileFormat::Yaml)
                            .required(false),
                    ),
                    Some(default_path.as_path()),
                )
            }
        }
    }

    /// Returns `<config_dir>/bupkis/config.yaml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bupkis")
            .join("config.yaml")
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: Option<&Path>,
    ) -> Result<Self> {
        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| {
                BupkisError::config_with_source(
                    "Failed to deserialize configuration".to_string(),
                    path.map(|p| p.display().to_string()),
                    e,
                )
            })
    }

    /// Derives the registry client configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::Config;
    ///
    /// let config = Config::from_yaml_str("network:\n  timeout: 5\n").unwrap();
    /// assert_eq!(config.to_client_config().timeout_seconds, 5);
    /// ```
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_timeout(self.network.timeout)
            .with_max_idle_per_host(self.network.max_idle_per_host)
            .with_concurrency(self.network.concurrency)
            .with_plain_http(self.network.plain_http)
            .with_failure_policy(self.policy.repository_failure_policy())
    }

    /// Opens the configured credential store.
    pub fn open_credential_store(&self) -> Result<Box<dyn CredentialStore>> {
        self.credentials.open()
    }
}

/// Output formatting settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Output {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub color: ColorChoice,
}

/// Enum for output formats.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,

    Json,

    Yaml,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "yaml" | "yml" => OutputFormat::Yaml,
            _ => OutputFormat::Pretty,
        }
    }
}

/// Enum for color output choices.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    #[default]
    Auto,

    Always,

    Never,
}

impl From<&str> for ColorChoice {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        }
    }
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Network {
    /// Per-request timeout in seconds
    #[serde(default = "default_network_timeout")]
    pub timeout: u64,

    #[serde(default = "default_max_idle_per_host")]
    pub max_idle_per_host: usize,

    /// Worker threads for repository and tag fan-out
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default)]
    pub plain_http: bool,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            timeout: default_network_timeout(),
            max_idle_per_host: default_max_idle_per_host(),
            concurrency: default_concurrency(),
            plain_http: false,
        }
    }
}

fn default_network_timeout() -> u64 {
    30
}

fn default_max_idle_per_host() -> usize {
    10
}

fn default_concurrency() -> usize {
    4
}

/// Partial-failure settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Policy {
    /// Skip a repository that cannot be enumerated instead of failing the
    /// whole registry
    #[serde(default = "default_continue_on_repository_error")]
    pub continue_on_repository_error: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            continue_on_repository_error: default_continue_on_repository_error(),
        }
    }
}

impl Policy {
    pub fn repository_failure_policy(&self) -> RepositoryFailurePolicy {
        RepositoryFailurePolicy::from_continue_flag(self.continue_on_repository_error)
    }
}

fn default_continue_on_repository_error() -> bool {
    true
}

/// Which credential store backs logins.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStoreKind {
    /// bupkis' own TOML file
    #[default]
    File,

    /// The Docker CLI `config.json`
    Docker,
}

/// Credential store settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Credentials {
    #[serde(default)]
    pub store: CredentialStoreKind,

    /// Overrides the store's default location
    #[serde(default)]
    pub path: Option<String>,
}

impl Credentials {
    /// Returns the path of the configured store.
    pub fn resolved_path(&self) -> PathBuf {
        match (&self.path, self.store) {
            (Some(path), _) => PathBuf::from(path),
            (None, CredentialStoreKind::File) => FileCredentialStore::default_path(),
            (None, CredentialStoreKind::Docker) => DockerConfigStore::default_path(),
        }
    }

    /// Opens the configured store.
    ///
    /// # Errors
    ///
    /// Returns a `CredentialLookup` error if an existing store file cannot
    /// be read or parsed.
    pub fn open(&self) -> Result<Box<dyn CredentialStore>> {
        let path = self.resolved_path();
        tracing::debug!(store = ?self.store, path = %path.display(), "opening credential store");

        Ok(match self.store {
            CredentialStoreKind::File => Box::new(FileCredentialStore::new(path)?),
            CredentialStoreKind::Docker => Box::new(DockerConfigStore::new(path)?),
        })
    }
}
