//! Run configuration
//!
//! [`PropagationConfig`] is the context object for one invocation. It is
//! built once from CLI flags and environment and handed to each collaborator.

use crate::error::{Error, Result};
use crate::types::{ConflictPolicy, PlatformConfig, PullRequestRef};
use std::fmt;

/// Default upstream owner
pub const DEFAULT_UPSTREAM_OWNER: &str = "canonical";

/// Default repository name for upstream and fork
pub const DEFAULT_REPO_NAME: &str = "juju-sdk-tutorial-k8s";

/// Suffix appended to a chapter branch to name the pushed work branch
pub const WORK_BRANCH_SUFFIX: &str = "-update";

/// An `owner/repo` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSpec {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoSpec {
    /// Create a repo spec
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Identity used for propagation commits
///
/// Passed via `-c` flags so commits work without any git config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    /// Committer/author name (`user.name`)
    pub name: String,
    /// Committer/author email (`user.email`)
    pub email: String,
    /// GPG signing key; commits are signed with `-S` when set
    pub signing_key: Option<String>,
}

/// Everything one propagation run needs to know
#[derive(Debug, Clone)]
pub struct PropagationConfig {
    /// Repository the PR lives in and PRs are opened against
    pub upstream: RepoSpec,
    /// Repository work branches are pushed to
    pub fork: RepoSpec,
    /// PR to propagate
    pub pr_number: u64,
    /// Conflict handling
    pub policy: ConflictPolicy,
    /// Keep the staging directory after the run
    pub keep_tmp: bool,
    /// Plan only, touch nothing
    pub dry_run: bool,
    /// Clone URL override for the fork
    pub clone_url: Option<String>,
    /// Commit identity override
    pub identity: Option<CommitIdentity>,
    /// GitHub Enterprise host (None for github.com)
    pub host: Option<String>,
}

impl PropagationConfig {
    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<()> {
        for (label, spec) in [("upstream", &self.upstream), ("fork", &self.fork)] {
            if spec.owner.trim().is_empty() || spec.repo.trim().is_empty() {
                return Err(Error::Config(format!(
                    "{label} repository must be given as owner and name, got '{spec}'"
                )));
            }
        }

        if self.pr_number == 0 {
            return Err(Error::Config(
                "pull request number must be positive".to_string(),
            ));
        }

        if let Some(identity) = &self.identity {
            if identity.name.trim().is_empty() || identity.email.trim().is_empty() {
                return Err(Error::Config(
                    "commit identity needs both a name and an email".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// The PR being propagated
    pub fn pull_request(&self) -> PullRequestRef {
        PullRequestRef {
            owner: self.upstream.owner.clone(),
            repo: self.upstream.repo.clone(),
            number: self.pr_number,
        }
    }

    /// Platform configuration for the upstream repository
    pub fn upstream_platform(&self) -> PlatformConfig {
        PlatformConfig {
            owner: self.upstream.owner.clone(),
            repo: self.upstream.repo.clone(),
            host: self.host.clone(),
        }
    }

    /// URL the fork is cloned from
    ///
    /// Defaults to SSH, matching how contributors push to their forks.
    pub fn fork_clone_url(&self) -> String {
        self.clone_url.clone().unwrap_or_else(|| {
            let host = self.host.as_deref().unwrap_or("github.com");
            format!("git@{host}:{}.git", self.fork)
        })
    }
}

/// Name of the branch pushed to the fork for a chapter
pub fn work_branch_name(chapter: &str) -> String {
    format!("{chapter}{WORK_BRANCH_SUFFIX}")
}
