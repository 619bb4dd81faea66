//! Hosting platform services
//!
//! Provides the interface the propagation engine uses to talk to the
//! upstream repository.

mod factory;
mod github;

pub use factory::create_platform_service;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::PullRequest;
use async_trait::async_trait;

/// Platform service trait for branch and PR operations
///
/// This trait abstracts the hosting API so the propagation engine can be
/// driven against a mock in tests.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// List the names of all branches in the repository
    async fn list_branches(&self) -> Result<Vec<String>>;

    /// Fetch PR metadata
    ///
    /// Fails with [`crate::error::Error::PrNotFound`] for unknown numbers.
    async fn get_pull_request(&self, number: u64) -> Result<PullRequest>;

    /// Fetch the unified diff of a PR against its base branch
    async fn get_pull_request_diff(&self, number: u64) -> Result<String>;

    /// Create a new PR with explicit body and draft options.
    ///
    /// `head` may be qualified as `owner:branch` for cross-repository PRs.
    /// Fails with [`crate::error::Error::PrAlreadyExists`] when an open PR
    /// already covers the same head and base.
    async fn create_pr_with_options(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest>;
}
