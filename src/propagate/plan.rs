//! Phase 1: Propagation planning
//!
//! Resolves everything a run needs before anything is cloned or pushed, so
//! input errors surface with no side effects.

use crate::chain::{downstream_of, order};
use crate::diff::fetch_diff;
use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{BranchChain, Chapter, ConflictPolicy, DiffBlob, PullRequestRef};
use tracing::info;

/// Propagation plan
#[derive(Debug, Clone)]
pub struct PropagationPlan {
    /// PR being propagated
    pub pull_request: PullRequestRef,
    /// Its diff and base branch
    pub diff: DiffBlob,
    /// All chapters of the upstream repository
    pub chain: BranchChain,
    /// Chapters after the PR's base, in order
    pub targets: Vec<Chapter>,
    /// Conflict handling for the run
    pub policy: ConflictPolicy,
}

impl PropagationPlan {
    /// The chapter the PR was made against
    pub fn base_chapter(&self) -> &str {
        &self.diff.base_branch
    }
}

/// Create a propagation plan
///
/// This determines:
/// - The PR's diff and base branch
/// - The chapter order of the upstream branches
/// - Which chapters come after the base
pub async fn create_propagation_plan(
    platform: &dyn PlatformService,
    pull_request: &PullRequestRef,
    policy: ConflictPolicy,
) -> Result<PropagationPlan> {
    let diff = fetch_diff(platform, pull_request).await?;

    let branches = platform.list_branches().await?;
    let chain = order(&branches)?;
    let targets = downstream_of(&chain, &diff.base_branch)?;

    info!(
        "PR {pull_request} targets {}, {} chapter(s) downstream",
        diff.base_branch,
        targets.len()
    );

    Ok(PropagationPlan {
        pull_request: pull_request.clone(),
        diff,
        chain,
        targets,
        policy,
    })
}
