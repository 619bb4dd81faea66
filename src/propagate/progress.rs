//! Progress callback trait for interface-agnostic updates
//!
//! This trait allows different interfaces (CLI, tests) to follow a
//! propagation run as it happens.

use crate::error::Error;
use crate::types::{Chapter, PropagationStep, PullRequest};
use async_trait::async_trait;
use std::fmt;

/// Propagation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fetching the PR diff and ordering chapter branches
    Planning,
    /// Cloning the fork
    Cloning,
    /// Applying the diff chapter by chapter
    Propagating,
    /// Run finished
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planning => write!(f, "Planning"),
            Self::Cloning => write!(f, "Cloning fork"),
            Self::Propagating => write!(f, "Propagating"),
            Self::Complete => write!(f, "Done"),
        }
    }
}

/// Progress callback trait
///
/// Implement this trait to receive progress updates during propagation.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called before a chapter is staged (`position` is 1-based)
    async fn on_step_started(&self, chapter: &Chapter, position: usize, total: usize);

    /// Called once a chapter step is recorded
    async fn on_step_finished(&self, step: &PropagationStep);

    /// Called when a PR is created
    async fn on_pr_created(&self, chapter: &str, pr: &PullRequest);

    /// Called when a chapter step fails, before the run aborts
    async fn on_error(&self, error: &Error);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_step_started(&self, _chapter: &Chapter, _position: usize, _total: usize) {}
    async fn on_step_finished(&self, _step: &PropagationStep) {}
    async fn on_pr_created(&self, _chapter: &str, _pr: &PullRequest) {}
    async fn on_error(&self, _error: &Error) {}
    async fn on_message(&self, _message: &str) {}
}
