//! Error types for bupkis.
//!
//! Every fallible operation in the library returns [`BupkisError`]. The
//! variants follow the failure classes of the registry client: credential
//! store problems, non-success registry responses, undecodable payloads,
//! transport failures and configuration problems.

use thiserror::Error;


/// Main error type for bupkis operations
#[derive(Error, Debug)]
pub enum BupkisError {
    /// The credential store could not be read or parsed
    #[error("Credential lookup failed: {message}")]
    CredentialLookup {
        message: String,
        hostname: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The registry answered with a status code of 400 or above
    #[error("Registry returned HTTP {status_code} for {url}: {}", String::from_utf8_lossy(.body).trim())]
    Registry {
        status_code: u16,
        body: Vec<u8>,
        url: String,
    },

    /// A payload or user-supplied string could not be decoded
    #[error("Protocol error: {message}")]
    Protocol {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network-related errors (connection, timeout, DNS)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid config file, missing settings)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for bupkis operations
pub type Result<T> = std::result::Result<T, BupkisError>;

impl BupkisError {
    /// Creates a new credential lookup error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::error::BupkisError;
    ///
    /// let err = BupkisError::credential_lookup("store unreadable", Some("registry.example.com"));
    /// assert!(matches!(err, BupkisError::CredentialLookup { .. }));
    /// ```
    pub fn credential_lookup<S: Into<String>>(message: S, hostname: Option<&str>) -> Self {
        Self::CredentialLookup {
            message: message.into(),
            hostname: hostname.map(str::to_string),
            source: None,
        }
    }

    /// Creates a new credential lookup error with a source error.
    pub fn credential_lookup_with_source<S, E>(message: S, hostname: Option<&str>, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::CredentialLookup {
            message: message.into(),
            hostname: hostname.map(str::to_string),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new registry error from a classified response.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::error::BupkisError;
    ///
    /// let err = BupkisError::registry(404, b"unknown".to_vec(), "https://r.example.com/v2/_catalog");
    /// assert_eq!(err.status_code(), Some(404));
    /// ```
    pub fn registry<S: Into<String>>(status_code: u16, body: Vec<u8>, url: S) -> Self {
        Self::Registry {
            status_code,
            body,
            url: url.into(),
        }
    }

    /// Creates a new protocol error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::error::BupkisError;
    ///
    /// let err = BupkisError::protocol("manifest has no history entries");
    /// assert!(matches!(err, BupkisError::Protocol { .. }));
    /// ```
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Self::Protocol {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new protocol error with a source error.
    pub fn protocol_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Protocol {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new network error with a source error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::error::BupkisError;
    /// use std::io;
    ///
    /// let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
    /// let err = BupkisError::network_with_source("failed to connect", io_err);
    /// assert!(matches!(err, BupkisError::Network { .. }));
    /// ```
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S, path: Option<S>) -> Self {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    pub fn config_with_source<S, E>(message: S, path: Option<S>, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if this error represents a non-success registry response.
    pub fn is_registry_error(&self) -> bool {
        matches!(self, Self::Registry { .. })
    }

    /// Returns the HTTP status code carried by a registry error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Registry { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Returns the response body carried by a registry error.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::Registry { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for BupkisError {
    fn from(err: config::ConfigError) -> Self {
        BupkisError::config_with_source("Failed to build configuration", None, err)
    }
}
