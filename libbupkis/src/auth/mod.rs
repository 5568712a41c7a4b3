//! Registry credentials.
//!
//! A [`Credential`] is the username/secret pair a user stored for one
//! registry hostname. Credential stores (see [`store`]) resolve hostnames to
//! credentials; the registry client copies them into its per-host transports
//! at construction time.

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

mod store;
pub use store::{CredentialStore, DockerConfigStore, FileCredentialStore, MemoryCredentialStore};



/// Credential bound to a single registry hostname.
///
/// A credential whose username and secret are both empty means
/// "unauthenticated": requests carrying it are sent without an
/// `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Credential {
    /// Registry hostname (optionally with port) this credential belongs to
    pub hostname: String,
    /// Username for Basic authentication
    pub username: String,
    /// Password or identity token
    pub secret: String,
}

impl Credential {
    /// Creates a credential for the given hostname.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::auth::Credential;
    ///
    /// let cred = Credential::new("registry.example.com", "user", "pass");
    /// assert!(!cred.is_empty());
    /// ```
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            username: username.into(),
            secret: secret.into(),
        }
    }

    /// Creates an unauthenticated credential for the given hostname.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::auth::Credential;
    ///
    /// let cred = Credential::anonymous("registry.example.com");
    /// assert!(cred.is_empty());
    /// ```
    pub fn anonymous(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Self::default()
        }
    }

    /// Returns true if neither a username nor a secret is set.
    pub fn is_empty(&self) -> bool {
        self.username.is_empty() && self.secret.is_empty()
    }

    /// Returns the Basic `Authorization` header value, or `None` for an
    /// empty credential.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::auth::Credential;
    ///
    /// let cred = Credential::new("r.example.com", "user", "pass");
    /// assert_eq!(cred.to_header_value().as_deref(), Some("Basic dXNlcjpwYXNz"));
    /// ```
    pub fn to_header_value(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let pair = format!("{}:{}", self.username, self.secret);
        Some(format!("Basic {}", general_purpose::STANDARD.encode(pair)))
    }
}
