//! Pull request publishing
//!
//! Opens a PR from a work branch in the fork back to the upstream chapter.

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::Publication;
use std::fmt::Write;
use tracing::warn;

/// First line of the body of a PR that carries conflict markers
pub const CONFLICT_BANNER: &str = "**Conflicts! Need human intervention!**";

/// Opens PRs on the upstream repository for branches pushed to the fork
pub struct PrPublisher<'a> {
    platform: &'a dyn PlatformService,
    fork_owner: String,
}

impl<'a> PrPublisher<'a> {
    /// Create a publisher for work branches pushed to `fork_owner`'s fork
    pub fn new(platform: &'a dyn PlatformService, fork_owner: impl Into<String>) -> Self {
        Self {
            platform,
            fork_owner: fork_owner.into(),
        }
    }

    /// Open a PR from `from_branch` in the fork into `to_branch` upstream
    ///
    /// An already-open PR for the same branches is not an error: it is
    /// logged and reported as [`Publication::AlreadyExists`].
    pub async fn open_pr(
        &self,
        from_branch: &str,
        to_branch: &str,
        title: &str,
        body: &str,
        draft: bool,
    ) -> Result<Publication> {
        let head = format!("{}:{from_branch}", self.fork_owner);

        match self
            .platform
            .create_pr_with_options(&head, to_branch, title, Some(body), draft)
            .await
        {
            Ok(pr) => Ok(Publication::Opened(pr)),
            Err(Error::PrAlreadyExists { head, base }) => {
                warn!("A pull request from {head} into {base} is already open, skipping");
                Ok(Publication::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }
}

/// Title of the PR opened for a chapter
pub fn pr_title(pr_number: u64, chapter: &str, conflicted: bool) -> String {
    let title = format!("chore: merging diff from PR #{pr_number} into branch {chapter}");
    if conflicted {
        format!("{title} CONFLICTS!")
    } else {
        title
    }
}

/// Body of the PR opened for a chapter
///
/// `conflicts` lists the conflicting paths when the diff did not apply
/// cleanly.
pub fn pr_body(pr_number: u64, chapter: &str, conflicts: Option<&[String]>) -> String {
    let body = format!("Automated change: merging diff from PR #{pr_number} into branch {chapter}");

    let Some(paths) = conflicts else {
        return body;
    };

    let mut out = format!("{CONFLICT_BANNER}\n\n{body}");
    if !paths.is_empty() {
        out.push_str("\n\nConflicting files:\n");
        for path in paths {
            let _ = writeln!(out, "- `{path}`");
        }
    }
    out
}

/// Commit message for the propagated change
pub fn commit_message(pr_number: u64) -> String {
    format!("chore: merging diff from PR #{pr_number}")
}
