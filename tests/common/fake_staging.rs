//! In-memory staging adapter for engine tests
//!
//! Apply outcomes are scripted per chapter; every call is logged.

#![allow(dead_code)]

use chapter_propagate::config::work_branch_name;
use chapter_propagate::error::{Error, Result};
use chapter_propagate::staging::{ApplyOutcome, StagingAdapter, WorkingCopy};
use chapter_propagate::types::DiffBlob;
use std::collections::{HashMap, HashSet};

/// One call made against the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingCall {
    Stage(String),
    Apply(String),
    CommitAndPush { branch: String, message: String },
    Release(String),
}

/// Staging adapter that never touches disk or network
#[derive(Debug, Default)]
pub struct FakeStaging {
    outcomes: HashMap<String, ApplyOutcome>,
    unchanged: HashSet<String>,
    missing: HashSet<String>,
    reject_push: HashSet<String>,
    staged: HashSet<String>,
    calls: Vec<StagingCall>,
}

impl FakeStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make applying the diff to `chapter` conflict on `paths`
    pub fn conflict_on(mut self, chapter: &str, paths: &[&str]) -> Self {
        self.outcomes.insert(
            chapter.to_string(),
            ApplyOutcome::Conflicted(paths.iter().map(ToString::to_string).collect()),
        );
        self
    }

    /// Make `chapter` apply cleanly but leave the tree unchanged
    pub fn unchanged_on(mut self, chapter: &str) -> Self {
        self.unchanged.insert(chapter.to_string());
        self
    }

    /// Make the fork lack the branch for `chapter`
    pub fn missing_branch(mut self, chapter: &str) -> Self {
        self.missing.insert(chapter.to_string());
        self
    }

    /// Make pushing `chapter` fail with `PushRejected`
    pub fn reject_push_on(mut self, chapter: &str) -> Self {
        self.reject_push.insert(chapter.to_string());
        self
    }

    /// Clear a scripted conflict, as if it had been fixed upstream
    pub fn resolve(&mut self, chapter: &str) {
        self.outcomes.remove(chapter);
    }

    pub fn calls(&self) -> &[StagingCall] {
        &self.calls
    }

    /// Chapters that were staged, in order
    pub fn staged_chapters(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                StagingCall::Stage(ch) => Some(ch.clone()),
                _ => None,
            })
            .collect()
    }

    /// Work branches that were pushed, in order
    pub fn pushed_branches(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                StagingCall::CommitAndPush { branch, .. } => Some(branch.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether a working copy is still checked out
    pub fn has_outstanding_copies(&self) -> bool {
        !self.staged.is_empty()
    }
}

impl StagingAdapter for FakeStaging {
    fn has_branch(&mut self, chapter: &str) -> Result<bool> {
        Ok(!self.missing.contains(chapter))
    }

    fn stage(&mut self, chapter: &str) -> Result<WorkingCopy> {
        self.calls.push(StagingCall::Stage(chapter.to_string()));

        if self.missing.contains(chapter) {
            return Err(Error::BranchNotFound(format!("origin/{chapter}")));
        }

        self.staged.insert(chapter.to_string());
        Ok(WorkingCopy {
            chapter: chapter.to_string(),
            work_branch: work_branch_name(chapter),
        })
    }

    fn apply_diff(&mut self, copy: &WorkingCopy, _diff: &DiffBlob) -> Result<ApplyOutcome> {
        self.calls.push(StagingCall::Apply(copy.chapter.clone()));
        Ok(self
            .outcomes
            .get(&copy.chapter)
            .cloned()
            .unwrap_or(ApplyOutcome::Clean))
    }

    fn has_changes(&mut self, copy: &WorkingCopy) -> Result<bool> {
        Ok(!self.unchanged.contains(&copy.chapter))
    }

    fn commit_and_push(&mut self, copy: &WorkingCopy, message: &str) -> Result<()> {
        self.calls.push(StagingCall::CommitAndPush {
            branch: copy.work_branch.clone(),
            message: message.to_string(),
        });

        if self.reject_push.contains(&copy.chapter) {
            return Err(Error::PushRejected {
                branch: copy.work_branch.clone(),
                details: "! [remote rejected] (protected branch hook declined)".to_string(),
            });
        }
        Ok(())
    }

    fn release(&mut self, copy: WorkingCopy) -> Result<()> {
        self.calls.push(StagingCall::Release(copy.chapter.clone()));
        self.staged.remove(&copy.chapter);
        Ok(())
    }
}
