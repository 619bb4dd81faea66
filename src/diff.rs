//! Diff extraction
//!
//! Fetches the change set of a pull request from the hosting platform.

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{DiffBlob, PullRequestRef};
use tracing::{debug, info};

/// Fetch the diff of a PR together with its base branch
///
/// Makes one metadata call and one diff call. A PR with no changed lines is
/// rejected with [`Error::NoDiff`]. Remote failures are not retried.
pub async fn fetch_diff(platform: &dyn PlatformService, pr: &PullRequestRef) -> Result<DiffBlob> {
    info!("Getting diff from PR {pr}");

    let metadata = platform.get_pull_request(pr.number).await?;
    let patch = platform.get_pull_request_diff(pr.number).await?;

    let diff = DiffBlob::new(patch, metadata.base_ref);
    if diff.is_empty() {
        return Err(Error::NoDiff(pr.number));
    }

    debug!(
        base = %diff.base_branch,
        files = diff.files().len(),
        hunks = diff.hunk_count(),
        lines = diff.changed_lines(),
        "fetched diff"
    );

    Ok(diff)
}
