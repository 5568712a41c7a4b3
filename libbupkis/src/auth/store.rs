//! Credential storage abstraction for registry authentication.
//!
//! This module provides a trait-based abstraction for storing and retrieving
//! registry credentials, with three implementations:
//!
//! - [`FileCredentialStore`]: a TOML file owned by bupkis (0600 permissions)
//! - [`DockerConfigStore`]: the Docker CLI `config.json`, so registries a user
//!   already logged into with `docker login` are picked up
//! - [`MemoryCredentialStore`]: an in-memory map for embedding and tests

use crate::auth::Credential;
use crate::error::{BupkisError, Result};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Trait for storing and retrieving registry credentials.
///
/// Lookups distinguish "no credential stored" (`Ok(None)`) from "the store
/// could not be read" (`Err(BupkisError::CredentialLookup)`). Only the latter
/// is fatal for registry client construction.
pub trait CredentialStore: Send + Sync {
    /// Retrieve the credential stored for a hostname.
    ///
    /// # Errors
    ///
    /// Returns a `CredentialLookup` error if the backing store cannot be read.
    fn credential_for(&self, hostname: &str) -> Result<Option<Credential>>;

    /// Retrieve every stored credential, keyed by hostname.
    fn all_credentials(&self) -> Result<BTreeMap<String, Credential>>;

    /// Store (or replace) the credential for `credential.hostname`.
    fn store(&mut self, credential: &Credential) -> Result<()>;

    /// Remove the credential stored for a hostname.
    ///
    /// Removing a hostname that has no credential is not an error.
    fn remove(&mut self, hostname: &str) -> Result<()>;

    /// List all hostnames with stored credentials.
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.all_credentials()?.into_keys().collect())
    }
}

/// Writes `contents` to `path`, creating parent directories and restricting
/// the file to its owner on Unix.
fn write_private(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| {
            BupkisError::config_with_source(
                "Failed to create credentials directory",
                parent.to_str(),
                e,
            )
        })?;
    }

    fs::write(path, contents).map_err(|e| {
        BupkisError::config_with_source("Failed to write credentials file", path.to_str(), e)
    })?;

    // Set file permissions to 0600 (user read/write only) on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, permissions).map_err(|e| {
            BupkisError::config_with_source(
                "Failed to set credentials file permissions",
                path.to_str(),
                e,
            )
        })?;
    }

    Ok(())
}

/// Stored credential representation for serialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct StoredCredential {
    /// Username for Basic authentication
    username: String,
    /// Password for Basic authentication (base64 encoded)
    password: String,
}

/// File-based credential store implementation.
///
/// Stores credentials in a TOML file with restricted permissions (0600), one
/// table per hostname. Passwords are base64 encoded for basic obfuscation.
///
/// # Examples
///
/// ```no_run
/// use libbupkis::auth::{Credential, CredentialStore, FileCredentialStore};
/// use std::path::PathBuf;
///
/// # fn example() -> libbupkis::error::Result<()> {
/// let path = PathBuf::from("/home/user/.config/bupkis/credentials.toml");
/// let mut store = FileCredentialStore::new(path)?;
///
/// store.store(&Credential::new("registry.example.com", "username", "password"))?;
/// assert!(store.credential_for("registry.example.com")?.is_some());
///
/// store.remove("registry.example.com")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileCredentialStore {
    /// Path to the credentials file
    path: PathBuf,
    /// In-memory copy of the file contents
    credentials: BTreeMap<String, StoredCredential>,
}

impl FileCredentialStore {
    /// Opens a file-based credential store.
    ///
    /// If the file exists it is loaded; otherwise the store starts empty and
    /// the file is created on the first write.
    ///
    /// # Errors
    ///
    /// Returns a `CredentialLookup` error if the file exists but cannot be
    /// read or parsed.
    pub fn new(path: PathBuf) -> Result<Self> {
        let credentials = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, credentials })
    }

    /// Returns the default location: `<config_dir>/bupkis/credentials.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("bupkis"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("credentials.toml")
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> Result<BTreeMap<String, StoredCredential>> {
        let contents = fs::read_to_string(path).map_err(|e| {
            BupkisError::credential_lookup_with_source(
                format!("Failed to read credentials file {}", path.display()),
                None,
                e,
            )
        })?;

        toml::from_str(&contents).map_err(|e| {
            BupkisError::credential_lookup_with_source(
                format!("Failed to parse credentials file {}", path.display()),
                None,
                e,
            )
        })
    }

    fn save_to_file(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.credentials).map_err(|e| {
            BupkisError::config_with_source("Failed to serialize credentials", self.path.to_str(), e)
        })?;
        write_private(&self.path, &contents)
    }

    fn decode_credential(hostname: &str, stored: &StoredCredential) -> Result<Credential> {
        let decoded = general_purpose::STANDARD
            .decode(&stored.password)
            .map_err(|e| {
                BupkisError::credential_lookup_with_source(
                    "Failed to decode stored password",
                    Some(hostname),
                    e,
                )
            })?;

        let secret = String::from_utf8(decoded).map_err(|e| {
            BupkisError::credential_lookup_with_source(
                "Stored password is not valid UTF-8",
                Some(hostname),
                e,
            )
        })?;

        Ok(Credential::new(hostname, stored.username.clone(), secret))
    }
}

impl CredentialStore for FileCredentialStore {
    fn credential_for(&self, hostname: &str) -> Result<Option<Credential>> {
        self.credentials
            .get(hostname)
            .map(|stored| Self::decode_credential(hostname, stored))
            .transpose()
    }

    fn all_credentials(&self) -> Result<BTreeMap<String, Credential>> {
        self.credentials
            .iter()
            .map(|(hostname, stored)| {
                Ok((hostname.clone(), Self::decode_credential(hostname, stored)?))
            })
            .collect()
    }

    fn store(&mut self, credential: &Credential) -> Result<()> {
        if credential.hostname.is_empty() {
            return Err(BupkisError::protocol(
                "Cannot store a credential without a hostname",
            ));
        }
        let stored = StoredCredential {
            username: credential.username.clone(),
            password: general_purpose::STANDARD.encode(&credential.secret),
        };
        self.credentials.insert(credential.hostname.clone(), stored);
        self.save_to_file()
    }

    fn remove(&mut self, hostname: &str) -> Result<()> {
        if self.credentials.remove(hostname).is_some() {
            self.save_to_file()?;
        }
        Ok(())
    }
}

/// One entry of the `auths` map in a Docker CLI config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DockerAuthEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    identitytoken: Option<String>,
}

/// Credential store backed by the Docker CLI `config.json`.
///
/// Only inline `auths` entries are understood; credential helpers
/// (`credsStore`, `credHelpers`) are left untouched and their hosts resolve
/// as unauthenticated. Top-level keys other than `auths` are preserved when
/// the file is rewritten.
#[derive(Debug)]
pub struct DockerConfigStore {
    path: PathBuf,
    /// Whole document, kept so unrelated settings survive a rewrite
    document: serde_json::Map<String, serde_json::Value>,
}

impl DockerConfigStore {
    /// Opens the Docker config file at `path`.
    ///
    /// A missing file is treated as an empty configuration.
    pub fn new(path: PathBuf) -> Result<Self> {
        let document = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| {
                BupkisError::credential_lookup_with_source(
                    format!("Failed to read Docker config {}", path.display()),
                    None,
                    e,
                )
            })?;
            serde_json::from_str(&contents).map_err(|e| {
                BupkisError::credential_lookup_with_source(
                    format!("Failed to parse Docker config {}", path.display()),
                    None,
                    e,
                )
            })?
        } else {
            serde_json::Map::new()
        };

        Ok(Self { path, document })
    }

    /// Returns `$DOCKER_CONFIG/config.json`, falling back to
    /// `~/.docker/config.json`.
    pub fn default_path() -> PathBuf {
        if let Ok(dir) = std::env::var("DOCKER_CONFIG") {
            return PathBuf::from(dir).join("config.json");
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".docker")
            .join("config.json")
    }

    /// Reduces an `auths` key such as `https://index.docker.io/v1/` to the
    /// bare `host[:port]` form.
    pub fn normalize_key(key: &str) -> &str {
        let key = key
            .strip_prefix("https://")
            .or_else(|| key.strip_prefix("http://"))
            .unwrap_or(key);
        key.split('/').next().unwrap_or(key)
    }

    fn entries(&self) -> Result<BTreeMap<String, DockerAuthEntry>> {
        let Some(auths) = self.document.get("auths") else {
            return Ok(BTreeMap::new());
        };

        let raw: BTreeMap<String, DockerAuthEntry> = serde_json::from_value(auths.clone())
            .map_err(|e| {
                BupkisError::credential_lookup_with_source(
                    "Docker config has a malformed \"auths\" section",
                    None,
                    e,
                )
            })?;

        Ok(raw
            .into_iter()
            .map(|(key, entry)| (Self::normalize_key(&key).to_string(), entry))
            .collect())
    }

    fn decode_entry(hostname: &str, entry: &DockerAuthEntry) -> Result<Credential> {
        let (username, mut secret) = match entry.auth.as_deref().filter(|a| !a.is_empty()) {
            Some(auth) => {
                let decoded = general_purpose::STANDARD.decode(auth).map_err(|e| {
                    BupkisError::credential_lookup_with_source(
                        "Failed to decode Docker auth entry",
                        Some(hostname),
                        e,
                    )
                })?;
                let decoded = String::from_utf8(decoded).map_err(|e| {
                    BupkisError::credential_lookup_with_source(
                        "Docker auth entry is not valid UTF-8",
                        Some(hostname),
                        e,
                    )
                })?;
                let (user, pass) = decoded.split_once(':').ok_or_else(|| {
                    BupkisError::credential_lookup(
                        "Docker auth entry is not in user:password form",
                        Some(hostname),
                    )
                })?;
                (user.to_string(), pass.to_string())
            }
            None => (
                entry.username.clone().unwrap_or_default(),
                entry.password.clone().unwrap_or_default(),
            ),
        };

        if let Some(token) = entry.identitytoken.as_deref().filter(|t| !t.is_empty()) {
            secret = token.to_string();
        }

        Ok(Credential::new(hostname, username, secret))
    }

    fn save_to_file(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.document).map_err(|e| {
            BupkisError::config_with_source("Failed to serialize Docker config", self.path.to_str(), e)
        })?;
        write_private(&self.path, &contents)
    }

    fn auths_mut(&mut self) -> Result<&mut serde_json::Map<String, serde_json::Value>> {
        let auths = self
            .document
            .entry("auths")
            .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
        auths.as_object_mut().ok_or_else(|| {
            BupkisError::credential_lookup("Docker config \"auths\" is not an object", None)
        })
    }
}

impl CredentialStore for DockerConfigStore {
    fn credential_for(&self, hostname: &str) -> Result<Option<Credential>> {
        self.entries()?
            .get(hostname)
            .map(|entry| Self::decode_entry(hostname, entry))
            .transpose()
    }

    fn all_credentials(&self) -> Result<BTreeMap<String, Credential>> {
        self.entries()?
            .iter()
            .map(|(hostname, entry)| Ok((hostname.clone(), Self::decode_entry(hostname, entry)?)))
            .collect()
    }

    fn store(&mut self, credential: &Credential) -> Result<()> {
        if credential.hostname.is_empty() {
            return Err(BupkisError::protocol(
                "Cannot store a credential without a hostname",
            ));
        }
        let pair = format!("{}:{}", credential.username, credential.secret);
        let entry = DockerAuthEntry {
            auth: Some(general_purpose::STANDARD.encode(pair)),
            ..DockerAuthEntry::default()
        };
        let value = serde_json::to_value(entry).map_err(|e| {
            BupkisError::config_with_source("Failed to serialize Docker auth entry", None, e)
        })?;

        let hostname = credential.hostname.clone();
        let auths = self.auths_mut()?;
        auths.retain(|key, _| Self::normalize_key(key) != hostname);
        auths.insert(hostname, value);
        self.save_to_file()
    }

    fn remove(&mut self, hostname: &str) -> Result<()> {
        let auths = self.auths_mut()?;
        let before = auths.len();
        auths.retain(|key, _| Self::normalize_key(key) != hostname);
        if auths.len() != before {
            self.save_to_file()?;
        }
        Ok(())
    }
}

/// In-memory credential store.
///
/// # Examples
///
/// ```
/// use libbupkis::auth::{Credential, CredentialStore, MemoryCredentialStore};
///
/// let store = MemoryCredentialStore::new()
///     .with(Credential::new("registry.example.com", "user", "pass"));
/// assert_eq!(store.list().unwrap(), vec!["registry.example.com".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    credentials: BTreeMap<String, Credential>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a credential, returning the store for chaining.
    pub fn with(mut self, credential: Credential) -> Self {
        self.credentials
            .insert(credential.hostname.clone(), credential);
        self
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn credential_for(&self, hostname: &str) -> Result<Option<Credential>> {
        Ok(self.credentials.get(hostname).cloned())
    }

    fn all_credentials(&self) -> Result<BTreeMap<String, Credential>> {
        Ok(self.credentials.clone())
    }

    fn store(&mut self, credential: &Credential) -> Result<()> {
        self.credentials
            .insert(credential.hostname.clone(), credential.clone());
        Ok(())
    }

    fn remove(&mut self, hostname: &str) -> Result<()> {
        self.credentials.remove(hostname);
        Ok(())
    }
}
