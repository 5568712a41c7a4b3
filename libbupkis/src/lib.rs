//! bupkis - Docker Registry v2 image lister
//!
//! libbupkis enumerates the images stored on one or more Docker Registry v2
//! endpoints and returns one flat list of [`ImageRecord`]s, each tagged with
//! the registry it came from and the image creation time.
//!
//! # Quick Start
//!
//! ```no_run
//! use libbupkis::{Config, RegistryClient};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None)?;
//!     let store = config.open_credential_store()?;
//!
//!     // One transport per registry with stored credentials
//!     let client = RegistryClient::new(None, store.as_ref(), config.to_client_config())?;
//!
//!     for image in client.get_repos()? {
//!         println!("{}\t{}", image.display_name(), image.created_at);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # How enumeration works
//!
//! For every registry the client walks `GET /v2/_catalog`, then
//! `GET /v2/<name>/tags/list` for each repository, then the schema1
//! manifest of each tag. The creation time comes from the first manifest
//! history entry.
//!
//! Credentials are scoped: a registry's credential is only ever sent to that
//! exact `host[:port]`.
//!
//! A repository that fails is skipped by default (see
//! [`RepositoryFailurePolicy`]); a registry that fails fails the whole call.
//!
//! # Main Types
//!
//! - [`RegistryClient`]: per-hostname transports and the registry calls
//! - [`ImageRecord`]: one tagged image
//! - [`ImageName`]: parsed `hostname/repository[:tag]`
//! - [`Config`]: YAML configuration
//! - [`BupkisError`]: error type for all operations

pub mod aggregate;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod manifest;
pub mod model;
pub mod reference;
pub mod transport;

pub use aggregate::{ImageAggregator, RepositoryFailurePolicy};
pub use auth::{Credential, CredentialStore};
pub use client::{ClientConfig, RegistryClient};
pub use config::Config;
pub use error::{BupkisError, Result};
pub use model::ImageRecord;
pub use reference::ImageName;

/// Returns the library version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
