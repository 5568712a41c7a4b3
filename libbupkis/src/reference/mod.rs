//! Image name parsing.
//!
//! Users name images as `[hostname/]repository[:tag]`. The first
//! `/`-delimited segment is always taken as the hostname; no attempt is
//! made to validate it or to fall back to a default registry. An absent
//! tag means "every tag of the repository".

use crate::error::{BupkisError, Result};
use std::fmt;
use std::str::FromStr;

#[cfg(test)]
mod tests;

/// A parsed `hostname/repository[:tag]` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageName {
    /// Registry hostname, possibly with a port
    pub hostname: String,
    /// Repository path below the hostname
    pub repository: String,
    /// Tag, empty when the reference names the whole repository
    pub tag: String,
}

impl ImageName {
    /// Parses an image reference.
    ///
    /// Only the final path segment is searched for a `:tag` suffix, so a
    /// port in the hostname is never mistaken for a tag.
    ///
    /// # Errors
    ///
    /// Returns a `Protocol` error for empty input, for input without a
    /// repository segment, and for an empty repository or tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use libbupkis::reference::ImageName;
    ///
    /// let name = ImageName::parse("registry.example.com/ns/app:v1.2").unwrap();
    /// assert_eq!(name.hostname, "registry.example.com");
    /// assert_eq!(name.repository, "ns/app");
    /// assert_eq!(name.tag, "v1.2");
    ///
    /// let name = ImageName::parse("localhost:5000/app").unwrap();
    /// assert_eq!(name.hostname, "localhost:5000");
    /// assert!(!name.has_tag());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(malformed(input, "empty reference"));
        }

        let (hostname, path) = input
            .split_once('/')
            .ok_or_else(|| malformed(input, "missing repository"))?;
        if hostname.is_empty() {
            return Err(malformed(input, "missing hostname"));
        }

        let (repository, tag) = match path.rsplit_once('/') {
            Some((prefix, last)) => {
                let (last, tag) = split_tag(last);
                (format!("{}/{}", prefix, last), tag)
            }
            None => {
                let (last, tag) = split_tag(path);
                (last.to_string(), tag)
            }
        };

        if repository.is_empty() || repository.split('/').any(str::is_empty) {
            return Err(malformed(input, "empty repository segment"));
        }
        if tag.is_some_and(str::is_empty) {
            return Err(malformed(input, "empty tag"));
        }

        Ok(Self {
            hostname: hostname.to_string(),
            repository,
            tag: tag.unwrap_or_default().to_string(),
        })
    }

    /// Returns true if the reference names a single tag.
    pub fn has_tag(&self) -> bool {
        !self.tag.is_empty()
    }
}

fn split_tag(segment: &str) -> (&str, Option<&str>) {
    match segment.rsplit_once(':') {
        Some((name, tag)) => (name, Some(tag)),
        None => (segment, None),
    }
}

fn malformed(input: &str, reason: &str) -> BupkisError {
    BupkisError::protocol(format!("malformed image reference '{}': {}", input, reason))
}

impl FromStr for ImageName {
    type Err = BupkisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.hostname, self.repository)?;
        if self.has_tag() {
            write!(f, ":{}", self.tag)?;
        }
        Ok(())
    }
}
