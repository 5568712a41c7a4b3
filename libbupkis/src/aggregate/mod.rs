//! Image enumeration across repositories and registries.
//!
//! The aggregator walks registry → repository → tag → manifest and flattens
//! the tree into [`ImageRecord`]s tagged with their originating hostname.
//! Fan-out over repositories and tags runs on a bounded rayon pool; result
//! order always follows input order.
//!
//! Failure handling depends on the level:
//!
//! | level      | on error                                              |
//! |------------|-------------------------------------------------------|
//! | hostname   | abort the whole enumeration                           |
//! | repository | governed by [`RepositoryFailurePolicy`] (skip by default) |
//! | tag        | abort the repository                                  |

use crate::client::RegistryClient;
use crate::error::{BupkisError, Result};
use crate::model::ImageRecord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

/// What to do when one repository of a registry cannot be enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositoryFailurePolicy {
    /// Log the failure, drop the repository and continue with the next one
    #[default]
    SkipRepository,
    /// Fail the whole registry listing with the first repository error
    Abort,
}

impl RepositoryFailurePolicy {
    /// Maps a "continue on repository error" flag to a policy.
    pub fn from_continue_flag(continue_on_error: bool) -> Self {
        if continue_on_error {
            Self::SkipRepository
        } else {
            Self::Abort
        }
    }
}

/// Walks repositories and tags of the registries known to a client.
pub struct ImageAggregator<'a> {
    client: &'a RegistryClient,
    policy: RepositoryFailurePolicy,
    concurrency: usize,
}

impl<'a> ImageAggregator<'a> {
    /// Creates an aggregator using the client's configured policy and
    /// concurrency.
    pub fn new(client: &'a RegistryClient) -> Self {
        Self {
            client,
            policy: client.config().repository_failure_policy,
            concurrency: client.config().concurrency,
        }
    }

    /// Overrides the repository failure policy.
    pub fn with_policy(mut self, policy: RepositoryFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overrides the number of worker threads.
    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers;
        self
    }

    fn pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.concurrency.max(1))
            .thread_name(|i| format!("bupkis-worker-{}", i))
            .build()
            .map_err(|e| BupkisError::config_with_source("Failed to create worker pool", None, e))
    }

    /// Lists one record per tag of `repository`; any failing tag fails the
    /// call.
    pub fn get_image_data_list(&self, hostname: &str, repository: &str) -> Result<Vec<ImageRecord>> {
        self.pool()?
            .install(|| self.image_data_list(hostname, repository))
    }

    /// Lists every image on one registry.
    ///
    /// Catalog failures are returned. Per-repository failures are handled by
    /// the policy: skipped (and logged) or returned in catalog order.
    pub fn get_repos_by_hostname(&self, hostname: &str) -> Result<Vec<ImageRecord>> {
        let pool = self.pool()?;
        pool.install(|| self.repos_by_hostname(hostname))
    }

    /// Lists every image on every registry known to the client, in hostname
    /// order. The first failing hostname fails the whole call.
    pub fn get_repos(&self) -> Result<Vec<ImageRecord>> {
        let pool = self.pool()?;
        pool.install(|| {
            let mut records = Vec::new();
            for hostname in self.client.hostnames() {
                records.extend(self.repos_by_hostname(hostname)?);
            }
            Ok(records)
        })
    }

    fn image_data_list(&self, hostname: &str, repository: &str) -> Result<Vec<ImageRecord>> {
        let tag_list = self.client.list_tags(hostname, repository)?;
        let name = tag_list.name.as_str();

        let results: Vec<Result<ImageRecord>> = tag_list
            .tags
            .par_iter()
            .map(|tag| self.client.fetch_image_data(hostname, name, tag))
            .collect();

        results.into_iter().collect()
    }

    fn repos_by_hostname(&self, hostname: &str) -> Result<Vec<ImageRecord>> {
        let repositories = self.client.list_repositories(hostname)?;
        tracing::debug!(hostname, count = repositories.len(), "listed repositories");

        let outcomes: Vec<(&String, Result<Vec<ImageRecord>>)> = repositories
            .par_iter()
            .map(|repository| (repository, self.image_data_list(hostname, repository)))
            .collect();

        let mut records = Vec::new();
        for (repository, outcome) in outcomes {
            match outcome {
                Ok(images) => records.extend(images),
                Err(err) => match self.policy {
                    RepositoryFailurePolicy::SkipRepository => {
                        tracing::warn!(
                            hostname,
                            repository = %repository,
                            error = %err,
                            "skipping repository"
                        );
                    }
                    RepositoryFailurePolicy::Abort => return Err(err),
                },
            }
        }

        Ok(records)
    }
}
