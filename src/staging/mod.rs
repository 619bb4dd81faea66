//! Local working-copy staging
//!
//! The propagation engine mutates chapter branches only through the
//! [`StagingAdapter`] trait. [`GitStaging`] implements it by shelling out to
//! `git` inside a throwaway clone of the fork.

mod area;
mod git;

pub use area::StagingArea;
pub use git::GitStaging;

use crate::error::Result;
use crate::types::DiffBlob;

/// A chapter branch checked out for propagation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopy {
    /// Chapter branch the work branch was created from
    pub chapter: String,
    /// Local branch that gets committed and pushed
    pub work_branch: String,
}

/// Result of applying a diff to a working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Diff applied without conflicts
    Clean,
    /// Diff did not apply cleanly
    Conflicted(Vec<String>),
}

/// Synchronous working-copy operations used by the propagation engine
///
/// Calls block until the underlying tool finishes. A [`WorkingCopy`]
/// returned by [`stage`](Self::stage) must be handed back through
/// [`release`](Self::release) whatever happens in between.
pub trait StagingAdapter {
    /// Whether the fork has a branch for `chapter`
    fn has_branch(&mut self, chapter: &str) -> Result<bool>;

    /// Create or reset the work branch for `chapter` from the fork's copy
    fn stage(&mut self, chapter: &str) -> Result<WorkingCopy>;

    /// Apply the diff to the checked-out work branch
    fn apply_diff(&mut self, copy: &WorkingCopy, diff: &DiffBlob) -> Result<ApplyOutcome>;

    /// Whether the working tree differs from the chapter branch
    fn has_changes(&mut self, copy: &WorkingCopy) -> Result<bool>;

    /// Commit everything in the working tree and push the work branch
    ///
    /// Fails with [`crate::error::Error::PushRejected`] if the remote refuses.
    fn commit_and_push(&mut self, copy: &WorkingCopy, message: &str) -> Result<()>;

    /// Discard local state and detach from the work branch
    fn release(&mut self, copy: WorkingCopy) -> Result<()>;
}
