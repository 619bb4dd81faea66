//! Core types for chapter-propagate

use serde::{Deserialize, Serialize};
use std::fmt;

/// A pull request on the upstream repository, as given on the command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// PR number
    pub number: u64,
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Unified diff of a pull request plus the branch it was made against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffBlob {
    /// Raw patch text, as served by the hosting API
    pub patch: String,
    /// Base branch of the pull request
    pub base_branch: String,
}

impl DiffBlob {
    /// Create a diff blob
    pub fn new(patch: impl Into<String>, base_branch: impl Into<String>) -> Self {
        Self {
            patch: patch.into(),
            base_branch: base_branch.into(),
        }
    }

    /// Number of added or removed lines
    ///
    /// Only lines inside `@@` hunks count, using the hunk header lengths to
    /// tell where a hunk ends and the next file header begins.
    pub fn changed_lines(&self) -> usize {
        let mut count = 0;
        let (mut old, mut new) = (0usize, 0usize);

        for line in self.patch.lines() {
            if line.starts_with("diff --git ") {
                (old, new) = (0, 0);
                continue;
            }
            if line.starts_with("@@") {
                (old, new) = hunk_lengths(line).unwrap_or((0, 0));
                continue;
            }
            if old == 0 && new == 0 {
                continue;
            }

            match line.as_bytes().first() {
                Some(b'+') => {
                    new = new.saturating_sub(1);
                    count += 1;
                }
                Some(b'-') => {
                    old = old.saturating_sub(1);
                    count += 1;
                }
                Some(b'\\') => {}
                _ => {
                    old = old.saturating_sub(1);
                    new = new.saturating_sub(1);
                }
            }
        }

        count
    }

    /// Whether the diff changes nothing
    pub fn is_empty(&self) -> bool {
        self.changed_lines() == 0
    }

    /// Paths touched by the diff, in patch order
    pub fn files(&self) -> Vec<&str> {
        self.patch
            .lines()
            .filter_map(|line| line.strip_prefix("diff --git "))
            .filter_map(|rest| rest.rsplit_once(" b/").map(|(_, path)| path))
            .collect()
    }

    /// Number of `@@` hunk headers
    pub fn hunk_count(&self) -> usize {
        self.patch
            .lines()
            .filter(|line| line.starts_with("@@"))
            .count()
    }
}

/// Old and new line counts from a `@@ -a,b +c,d @@` header
fn hunk_lengths(header: &str) -> Option<(usize, usize)> {
    let ranges = header.strip_prefix("@@ ")?.split(" @@").next()?;
    let (old, new) = ranges.split_once(' ')?;
    Some((
        range_len(old.strip_prefix('-')?)?,
        range_len(new.strip_prefix('+')?)?,
    ))
}

fn range_len(range: &str) -> Option<usize> {
    match range.split_once(',') {
        Some((_, len)) => len.parse().ok(),
        None => Some(1),
    }
}

/// A chapter branch with its parsed position
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter index parsed from the branch name
    pub index: u32,
    /// Full branch name
    pub name: String,
}

/// Chapter branches in ascending chapter order
///
/// Indices are strictly increasing; construct through
/// [`crate::chain::order`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchChain {
    pub(crate) chapters: Vec<Chapter>,
}

impl BranchChain {
    /// Chapters from first to last
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Branch names from first to last
    pub fn names(&self) -> Vec<&str> {
        self.chapters.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of chapters
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Whether the chain has no chapters
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// What to do when the diff does not apply cleanly to a chapter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Stop at the first conflicting chapter
    #[default]
    Strict,
    /// Commit conflict markers, open a draft PR, keep going
    Permissive,
}

/// Lifecycle of a single chapter step
///
/// `Pending -> Applying -> {Applied, Conflicted} -> {Published, Skipped}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    /// Not started
    Pending,
    /// Diff is being applied
    Applying,
    /// Diff applied cleanly
    Applied,
    /// Diff applied with conflicts
    Conflicted,
    /// Pushed and PR requested
    Published,
    /// Nothing was pushed for this chapter
    Skipped,
}

impl StepState {
    /// Whether `next` is a legal successor of this state
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Applying | Self::Skipped)
                | (Self::Applying, Self::Applied | Self::Conflicted)
                | (Self::Applied | Self::Conflicted, Self::Published | Self::Skipped)
        )
    }

    /// Whether the step is finished
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Published | Self::Skipped)
    }
}

/// Content outcome of a chapter step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// Diff applied cleanly
    Applied,
    /// Diff conflicted
    Conflicted,
    /// Chapter was not touched (dry run)
    Skipped,
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::Conflicted => write!(f, "conflicted"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Whether a PR was opened for a chapter step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "pull_request")]
pub enum Publication {
    /// A new PR was opened
    Opened(PullRequest),
    /// The platform reported an open PR for the same branches
    AlreadyExists,
    /// No PR was requested
    NotPublished,
}

/// Record of one chapter processed during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationStep {
    /// Chapter branch name
    pub branch: String,
    /// Chapter index
    pub chapter_index: u32,
    /// Content outcome
    pub outcome: StepOutcome,
    /// Terminal lifecycle state
    pub state: StepState,
    /// PR opened for this chapter, if any
    pub publication: Publication,
    /// Paths reported as conflicting
    pub conflicting_paths: Vec<String>,
}

/// Final status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationStatus {
    /// Every downstream chapter was processed
    Completed,
    /// Stopped at a conflicting chapter under the strict policy
    HaltedOnConflict,
}

/// Result of one propagation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationResult {
    /// Steps in chapter order
    pub steps: Vec<PropagationStep>,
    /// Final status
    pub status: PropagationStatus,
    /// Downstream chapters never reached
    pub not_attempted: Vec<String>,
}

impl PropagationResult {
    /// PRs opened during the run
    pub fn opened_prs(&self) -> Vec<&PullRequest> {
        self.steps
            .iter()
            .filter_map(|s| match &s.publication {
                Publication::Opened(pr) => Some(pr),
                _ => None,
            })
            .collect()
    }

    /// The chapter that halted the run, if any
    pub fn halted_at(&self) -> Option<&PropagationStep> {
        match self.status {
            PropagationStatus::HaltedOnConflict => self.steps.last(),
            PropagationStatus::Completed => None,
        }
    }
}

/// A pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR title
    pub title: String,
    /// Whether the PR is a draft
    pub is_draft: bool,
}

/// Repository the platform service talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}
