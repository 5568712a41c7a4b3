//! Multi-registry client.
//!
//! [`RegistryClient`] owns one [`AuthenticatedTransport`] per registry
//! hostname it knows about and implements the three read-only Registry v2
//! calls this crate needs:
//!
//! - `GET /v2/_catalog`
//! - `GET /v2/<name>/tags/list`
//! - `GET /v2/<name>/manifests/<reference>`
//!
//! The hostname → transport map is built once at construction and never
//! mutated afterwards, so a client can be shared freely between the worker
//! threads of an enumeration.

use crate::aggregate::{ImageAggregator, RepositoryFailurePolicy};
use crate::auth::{Credential, CredentialStore};
use crate::error::{BupkisError, Result};
use crate::manifest::{SCHEMA1_ACCEPT, Schema1Manifest};
use crate::model::{CatalogResponse, ImageRecord, TagList};
use crate::transport::AuthenticatedTransport;
use chrono::{DateTime, Utc};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, LINK};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;


/// Configuration for the registry client.
///
/// Use the builder methods to customize:
///
/// # Examples
///
/// ```
/// use libbupkis::client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with_timeout(60)
///     .with_concurrency(8);
/// assert_eq!(config.timeout_seconds, 60);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Per-request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Maximum idle connections per host (default: 10)
    pub max_idle_per_host: usize,
    /// Worker threads used for per-repository and per-tag fan-out (default: 4)
    pub concurrency: usize,
    /// Talk `http://` instead of `https://` (default: false)
    pub plain_http: bool,
    /// What to do when a single repository cannot be enumerated
    pub repository_failure_policy: RepositoryFailurePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_idle_per_host: 10,
            concurrency: 4,
            plain_http: false,
            repository_failure_policy: RepositoryFailurePolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::client::ClientConfig;
    ///
    /// let config = ClientConfig::new();
    /// assert_eq!(config.timeout_seconds, 30);
    /// assert_eq!(config.max_idle_per_host, 10);
    /// assert!(!config.plain_http);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the maximum idle connections per host.
    pub fn with_max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }

    /// Sets the number of worker threads used for fan-out.
    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers;
        self
    }

    /// Switches between `http://` and `https://`.
    pub fn with_plain_http(mut self, plain_http: bool) -> Self {
        self.plain_http = plain_http;
        self
    }

    /// Sets the repository-level failure policy.
    pub fn with_failure_policy(mut self, policy: RepositoryFailurePolicy) -> Self {
        self.repository_failure_policy = policy;
        self
    }

    fn scheme(&self) -> &'static str {
        if self.plain_http { "http" } else { "https" }
    }

    fn build_http_client(&self) -> Result<HttpClient> {
        HttpClient::builder()
            .timeout(Duration::from_secs(self.timeout_seconds))
            .pool_max_idle_per_host(self.max_idle_per_host)
            .user_agent(concat!("bupkis/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BupkisError::network_with_source("Failed to create HTTP client", e))
    }
}

/// Client for one or more Registry v2 endpoints.
#[derive(Debug)]
pub struct RegistryClient {
    transports: BTreeMap<String, AuthenticatedTransport>,
    config: ClientConfig,
}

impl RegistryClient {
    /// Builds a client from a credential store.
    ///
    /// - With a hostname, only that registry is configured. A hostname with no
    ///   stored credential is accessed anonymously.
    /// - Without a hostname (or with an empty one), one transport is built for
    ///   every hostname in the store.
    ///
    /// # Errors
    ///
    /// Returns a `CredentialLookup` error if the store cannot be read.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::auth::{Credential, MemoryCredentialStore};
    /// use libbupkis::client::{ClientConfig, RegistryClient};
    ///
    /// let store = MemoryCredentialStore::new()
    ///     .with(Credential::new("a.example.com", "u", "p"))
    ///     .with(Credential::new("b.example.com", "u", "p"));
    ///
    /// let all = RegistryClient::new(None, &store, ClientConfig::new()).unwrap();
    /// assert_eq!(all.hostnames().collect::<Vec<_>>(), vec!["a.example.com", "b.example.com"]);
    ///
    /// let one = RegistryClient::new(Some("c.example.com"), &store, ClientConfig::new()).unwrap();
    /// assert_eq!(one.hostnames().collect::<Vec<_>>(), vec!["c.example.com"]);
    /// ```
    pub fn new(
        hostname: Option<&str>,
        store: &dyn CredentialStore,
        config: ClientConfig,
    ) -> Result<Self> {
        let credentials = match hostname.filter(|h| !h.is_empty()) {
            Some(hostname) => {
                let mut credential = store
                    .credential_for(hostname)?
                    .unwrap_or_else(|| Credential::anonymous(hostname));
                credential.hostname = hostname.to_string();
                vec![credential]
            }
            None => store
                .all_credentials()?
                .into_iter()
                .map(|(hostname, mut credential)| {
                    credential.hostname = hostname;
                    credential
                })
                .collect(),
        };

        Self::from_credentials(credentials, config)
    }

    /// Builds a client with one transport per credential.
    ///
    /// A later credential for the same hostname replaces an earlier one.
    pub fn from_credentials(
        credentials: impl IntoIterator<Item = Credential>,
        config: ClientConfig,
    ) -> Result<Self> {
        let http_client = config.build_http_client()?;

        let transports = credentials
            .into_iter()
            .map(|credential| {
                tracing::debug!(
                    hostname = %credential.hostname,
                    anonymous = credential.is_empty(),
                    "configured registry transport"
                );
                (
                    credential.hostname.clone(),
                    AuthenticatedTransport::new(http_client.clone(), credential),
                )
            })
            .collect();

        Ok(Self { transports, config })
    }

    /// Returns the configured hostnames in sorted order.
    pub fn hostnames(&self) -> impl Iterator<Item = &str> {
        self.transports.keys().map(String::as_str)
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the transport bound to `hostname`.
    ///
    /// # Errors
    ///
    /// Returns a `Protocol` error if the client has no transport for it.
    pub fn transport(&self, hostname: &str) -> Result<&AuthenticatedTransport> {
        self.transports.get(hostname).ok_or_else(|| {
            BupkisError::protocol(format!("No transport configured for {}", hostname))
        })
    }

    /// Returns the base URL (`scheme://hostname`) for a registry.
    pub fn base_url(&self, hostname: &str) -> String {
        format!("{}://{}", self.config.scheme(), hostname)
    }

    /// Issues a GET through the hostname's transport and reads the whole body.
    fn fetch(
        &self,
        hostname: &str,
        url: &str,
        accept: Option<&str>,
    ) -> Result<(HeaderMap, Vec<u8>)> {
        let transport = self.transport(hostname)?;
        let response = transport.get(url, accept)?;
        let headers = response.headers().clone();
        let body = response.bytes().map_err(|e| {
            BupkisError::network_with_source(format!("Failed to read response from {}", url), e)
        })?;
        Ok((headers, body.to_vec()))
    }

    fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T> {
        serde_json::from_slice(body)
            .map_err(|e| BupkisError::protocol_with_source(format!("Failed to decode {}", what), e))
    }

    /// Fetches every page of a paginated listing, following `Link` headers.
    ///
    /// Stops at a `next` link pointing to a page already fetched.
    fn fetch_paginated<T: DeserializeOwned>(
        &self,
        hostname: &str,
        first_url: String,
        what: &str,
    ) -> Result<Vec<T>> {
        let mut pages = Vec::new();
        let mut seen = HashSet::new();
        let mut url = first_url;

        loop {
            let (headers, body) = self.fetch(hostname, &url, None)?;
            pages.push(Self::decode(&body, what)?);
            seen.insert(url);

            let next = match Self::extract_next_link(&headers) {
                Some(next) if next.starts_with("http://") || next.starts_with("https://") => next,
                Some(path) => format!("{}{}", self.base_url(hostname), path),
                None => break,
            };
            if seen.contains(&next) {
                tracing::warn!(hostname, url = %next, "pagination link repeats a fetched page, stopping");
                break;
            }
            url = next;
        }

        Ok(pages)
    }

    /// Checks that the registry answers `GET /v2/` with a success status.
    ///
    /// Used to verify credentials before they are stored.
    pub fn check(&self, hostname: &str) -> Result<()> {
        let url = format!("{}/v2/", self.base_url(hostname));
        self.fetch(hostname, &url, None).map(|_| ())
    }

    /// Lists repository names from `GET /v2/_catalog`.
    ///
    /// # Errors
    ///
    /// - `Registry` if the registry answers with a status of 400 or above
    /// - `Protocol` if the body is not a catalog document
    pub fn list_repositories(&self, hostname: &str) -> Result<Vec<String>> {
        self.list_repositories_paginated(hostname, None)
    }

    /// Lists repository names, asking the registry for pages of at most
    /// `page_size` entries. All pages are fetched either way.
    pub fn list_repositories_paginated(
        &self,
        hostname: &str,
        page_size: Option<usize>,
    ) -> Result<Vec<String>> {
        let mut url = format!("{}/v2/_catalog", self.base_url(hostname));
        if let Some(n) = page_size {
            url.push_str(&format!("?n={}", n));
        }
        let pages: Vec<CatalogResponse> = self.fetch_paginated(hostname, url, "catalog response")?;
        Ok(pages
            .into_iter()
            .flat_map(|page| page.repositories)
            .collect())
    }

    /// Lists tags from `GET /v2/<repository>/tags/list`.
    ///
    /// The returned name is the one reported by the registry.
    pub fn list_tags(&self, hostname: &str, repository: &str) -> Result<TagList> {
        let url = format!("{}/v2/{}/tags/list", self.base_url(hostname), repository);
        let pages: Vec<TagList> = self.fetch_paginated(hostname, url, "tags response")?;

        let mut pages = pages.into_iter();
        let mut tag_list = pages.next().ok_or_else(|| {
            BupkisError::protocol(format!("Empty tags response for {}", repository))
        })?;
        for page in pages {
            tag_list.tags.extend(page.tags);
        }
        if tag_list.name.is_empty() {
            tag_list.name = repository.to_string();
        }

        Ok(tag_list)
    }

    /// Fetches and decodes the schema1 manifest for `repository:tag`.
    pub fn fetch_manifest(
        &self,
        hostname: &str,
        repository: &str,
        tag: &str,
    ) -> Result<Schema1Manifest> {
        let url = format!(
            "{}/v2/{}/manifests/{}",
            self.base_url(hostname),
            repository,
            tag
        );
        let (_, body) = self.fetch(hostname, &url, Some(SCHEMA1_ACCEPT))?;
        Schema1Manifest::from_bytes(&body)
    }

    /// Returns the creation time recorded in the first history entry of
    /// the `repository:tag` manifest.
    pub fn fetch_manifest_creation_time(
        &self,
        hostname: &str,
        repository: &str,
        tag: &str,
    ) -> Result<DateTime<Utc>> {
        self.fetch_manifest(hostname, repository, tag)?
            .creation_time()
    }

    /// Fetches a single image record.
    pub fn fetch_image_data(
        &self,
        hostname: &str,
        repository: &str,
        tag: &str,
    ) -> Result<ImageRecord> {
        let created_at = self.fetch_manifest_creation_time(hostname, repository, tag)?;
        Ok(ImageRecord::new(hostname, repository, tag, created_at))
    }

    /// Returns an aggregator using this client's configuration.
    pub fn aggregator(&self) -> ImageAggregator<'_> {
        ImageAggregator::new(self)
    }

    /// Lists one record per tag of `repository`.
    ///
    /// A failure fetching any tag fails the whole call.
    pub fn get_image_data_list(&self, hostname: &str, repository: &str) -> Result<Vec<ImageRecord>> {
        self.aggregator().get_image_data_list(hostname, repository)
    }

    /// Lists every image on every configured registry.
    ///
    /// A failure on any hostname fails the whole call.
    pub fn get_repos(&self) -> Result<Vec<ImageRecord>> {
        self.aggregator().get_repos()
    }

    /// Lists every image on one registry, applying the configured
    /// [`RepositoryFailurePolicy`] to repositories that cannot be enumerated.
    pub fn get_repos_by_hostname(&self, hostname: &str) -> Result<Vec<ImageRecord>> {
        self.aggregator().get_repos_by_hostname(hostname)
    }

    /// Extracts the next page URL from the Link header.
    ///
    /// The Distribution API uses the Link header for pagination:
    /// `Link: </v2/_catalog?n=100&last=repo99>; rel="next"`
    fn extract_next_link(headers: &HeaderMap) -> Option<String> {
        let link_str = headers.get(LINK)?.to_str().ok()?;

        for link_part in link_str.split(',') {
            let link_part = link_part.trim();

            if link_part.contains("rel=\"next\"") || link_part.contains("rel='next'") {
                if let Some(start) = link_part.find('<')
                    && let Some(end) = link_part.find('>')
                    && start < end
                {
                    return Some(link_part[start + 1..end].to_string());
                }
            }
        }

        None
    }
}
