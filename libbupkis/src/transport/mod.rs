//! Credential-scoped HTTP transport.
//!
//! An [`AuthenticatedTransport`] is bound to exactly one registry hostname.
//! It attaches that hostname's Basic credential to outgoing requests only
//! when the request targets the bound hostname, and it converts every
//! response with a status of 400 or above into [`BupkisError::Registry`], so
//! callers never see an error response object.

use crate::auth::Credential;
use crate::error::{BupkisError, Result};
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use url::Url;


/// Returns the `host[:port]` authority of a URL, omitting the port when it
/// is the scheme default.
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// HTTP transport bound to a single registry hostname.
///
/// The underlying [`reqwest::blocking::Client`] may be shared between
/// transports (it is reference counted); the credential never is.
#[derive(Debug, Clone)]
pub struct AuthenticatedTransport {
    http_client: HttpClient,
    bound_hostname: String,
    credential: Credential,
}

impl AuthenticatedTransport {
    /// Creates a transport bound to `credential.hostname`.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::auth::Credential;
    /// use libbupkis::transport::AuthenticatedTransport;
    ///
    /// let http = reqwest::blocking::Client::new();
    /// let transport = AuthenticatedTransport::new(
    ///     http,
    ///     Credential::new("registry.example.com", "user", "pass"),
    /// );
    /// assert_eq!(transport.bound_hostname(), "registry.example.com");
    /// ```
    pub fn new(http_client: HttpClient, credential: Credential) -> Self {
        Self {
            http_client,
            bound_hostname: credential.hostname.clone(),
            credential,
        }
    }

    /// Returns the hostname this transport is bound to.
    pub fn bound_hostname(&self) -> &str {
        &self.bound_hostname
    }

    /// Returns true if the bound credential is empty (anonymous access).
    pub fn is_anonymous(&self) -> bool {
        self.credential.is_empty()
    }

    /// Decides whether a request to `url` carries the bound credential.
    ///
    /// Requires an exact (ASCII case-insensitive) match between the URL's
    /// authority and the bound hostname, and a non-empty credential. Both
    /// sides are normalized under the request's scheme, so a bound
    /// `registry.example.com:443` matches `https://registry.example.com/`.
    /// `evil-registry.example.com` never matches `registry.example.com`.
    pub fn authorizes(&self, url: &Url) -> bool {
        if self.credential.is_empty() {
            return false;
        }
        let Some(bound) = self.bound_authority(url.scheme()) else {
            return false;
        };
        authority(url).is_some_and(|target| target.eq_ignore_ascii_case(&bound))
    }

    /// Normalized `host[:port]` of the bound hostname under `scheme`.
    fn bound_authority(&self, scheme: &str) -> Option<String> {
        let bound = Url::parse(&format!("{}://{}/", scheme, self.bound_hostname)).ok()?;
        authority(&bound)
    }

    /// Issues a GET request and classifies the response.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute request URL
    /// * `accept` - Optional `Accept` header value
    ///
    /// # Errors
    ///
    /// - `Protocol` if `url` is not a valid absolute URL
    /// - `Network` if the request cannot be sent or times out
    /// - `Registry` if the status code is 400 or above; the body has been
    ///   fully read and the connection released
    pub fn get(&self, url: &str, accept: Option<&str>) -> Result<Response> {
        let parsed = Url::parse(url)
            .map_err(|e| BupkisError::protocol_with_source(format!("Invalid URL {}", url), e))?;

        let mut request = self.http_client.get(parsed.clone());
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }

        let authenticated = self.authorizes(&parsed);
        if authenticated && let Some(header) = self.credential.to_header_value() {
            request = request.header(AUTHORIZATION, header);
        }

        tracing::debug!(url = %parsed, authenticated, "sending registry request");

        let response = request
            .send()
            .map_err(|e| Self::translate_reqwest_error(e, url))?;

        Self::check_response_status(response)
    }

    /// Translates a reqwest error into a `Network` error.
    fn translate_reqwest_error(error: reqwest::Error, url: &str) -> BupkisError {
        if error.is_timeout() {
            BupkisError::network_with_source(format!("Request to {} timed out", url), error)
        } else if error.is_connect() {
            BupkisError::network_with_source(format!("Failed to connect to {}", url), error)
        } else if error.is_request() {
            BupkisError::network_with_source(format!("Failed to send request to {}", url), error)
        } else {
            BupkisError::network_with_source(
                format!("Network error communicating with {}", url),
                error,
            )
        }
    }

    /// Passes through statuses below 400; drains the body of anything else
    /// into a `Registry` error.
    fn check_response_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.as_u16() < 400 {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.bytes().map_err(|e| {
            BupkisError::network_with_source(
                format!(
                    "Failed to read error response body (status={}) from {}",
                    status.as_u16(),
                    url
                ),
                e,
            )
        })?;

        tracing::debug!(status = status.as_u16(), %url, "registry returned error status");

        Err(BupkisError::registry(status.as_u16(), body.to_vec(), url))
    }
}
