//! Phase 2: Propagation execution
//!
//! Walks the downstream chapters in ascending order. Each chapter is
//! staged, patched, and either published or recorded as conflicted. The
//! working copy is released after every chapter, whatever the outcome.

use crate::config::work_branch_name;
use crate::error::{Error, Result};
use crate::propagate::publish::{commit_message, pr_body, pr_title};
use crate::propagate::{Phase, PrPublisher, ProgressCallback, PropagationPlan};
use crate::staging::{ApplyOutcome, StagingAdapter, WorkingCopy};
use crate::types::{
    Chapter, ConflictPolicy, Publication, PropagationResult, PropagationStatus, PropagationStep,
    StepOutcome, StepState,
};
use tracing::{debug, info, warn};

/// Tracks one chapter through its lifecycle
struct StepTracker<'a> {
    branch: &'a str,
    state: StepState,
}

impl<'a> StepTracker<'a> {
    const fn new(branch: &'a str) -> Self {
        Self {
            branch,
            state: StepState::Pending,
        }
    }

    fn advance(&mut self, next: StepState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal step transition {:?} -> {next:?}",
            self.state
        );
        debug!(branch = self.branch, from = ?self.state, to = ?next, "step transition");
        self.state = next;
    }

    fn finish(
        self,
        chapter: &Chapter,
        outcome: StepOutcome,
        publication: Publication,
        conflicting_paths: Vec<String>,
    ) -> PropagationStep {
        debug_assert!(self.state.is_terminal());
        PropagationStep {
            branch: chapter.name.clone(),
            chapter_index: chapter.index,
            outcome,
            state: self.state,
            publication,
            conflicting_paths,
        }
    }
}

/// Execute a propagation plan
///
/// Under [`ConflictPolicy::Strict`] the run stops at the first conflicting
/// chapter and later chapters are listed as not attempted. Under
/// [`ConflictPolicy::Permissive`] conflicting chapters are published as
/// draft PRs with conflict markers and the run continues.
///
/// Every target must exist in the staging copy of the fork before the first
/// chapter is staged; a missing one fails with [`Error::BranchNotFound`]
/// and nothing is pushed.
///
/// Any other staging or platform error aborts the run after being reported
/// through [`ProgressCallback::on_error`]; chapters pushed before the
/// failure stay pushed.
pub async fn execute_propagation(
    plan: &PropagationPlan,
    staging: &mut dyn StagingAdapter,
    publisher: &PrPublisher<'_>,
    progress: &dyn ProgressCallback,
) -> Result<PropagationResult> {
    progress.on_phase(Phase::Propagating).await;

    let total = plan.targets.len();
    if total == 0 {
        progress
            .on_message(&format!(
                "{} is the last chapter, nothing to propagate",
                plan.base_chapter()
            ))
            .await;
    }

    if let Err(e) = check_targets_exist(plan, staging) {
        progress.on_error(&e).await;
        return Err(e);
    }

    let mut steps = Vec::with_capacity(total);

    for (idx, chapter) in plan.targets.iter().enumerate() {
        info!("=== Working on branch {} ===", chapter.name);
        progress.on_step_started(chapter, idx + 1, total).await;

        let copy = match staging.stage(&chapter.name) {
            Ok(copy) => copy,
            Err(e) => {
                progress.on_error(&e).await;
                return Err(e);
            }
        };

        let step = propagate_chapter(plan, chapter, &copy, staging, publisher, progress).await;
        let released = staging.release(copy);
        let step = match step.and_then(|step| released.map(|()| step)) {
            Ok(step) => step,
            Err(e) => {
                progress.on_error(&e).await;
                return Err(e);
            }
        };

        progress.on_step_finished(&step).await;

        let halt = step.outcome == StepOutcome::Conflicted && plan.policy == ConflictPolicy::Strict;
        steps.push(step);

        if halt {
            warn!(
                "Conflict merging diff into branch {}, aborting this PR and following PRs",
                chapter.name
            );
            let not_attempted = plan.targets[idx + 1..]
                .iter()
                .map(|c| c.name.clone())
                .collect();

            progress.on_phase(Phase::Complete).await;
            return Ok(PropagationResult {
                steps,
                status: PropagationStatus::HaltedOnConflict,
                not_attempted,
            });
        }
    }

    progress.on_phase(Phase::Complete).await;

    Ok(PropagationResult {
        steps,
        status: PropagationStatus::Completed,
        not_attempted: Vec::new(),
    })
}

fn check_targets_exist(plan: &PropagationPlan, staging: &mut dyn StagingAdapter) -> Result<()> {
    for chapter in &plan.targets {
        if !staging.has_branch(&chapter.name)? {
            return Err(Error::BranchNotFound(chapter.name.clone()));
        }
    }
    Ok(())
}

/// Apply the diff to one staged chapter and publish it if appropriate
async fn propagate_chapter(
    plan: &PropagationPlan,
    chapter: &Chapter,
    copy: &WorkingCopy,
    staging: &mut dyn StagingAdapter,
    publisher: &PrPublisher<'_>,
    progress: &dyn ProgressCallback,
) -> Result<PropagationStep> {
    let mut tracker = StepTracker::new(&chapter.name);
    tracker.advance(StepState::Applying);

    match staging.apply_diff(copy, &plan.diff)? {
        ApplyOutcome::Clean => {
            tracker.advance(StepState::Applied);

            if !staging.has_changes(copy)? {
                info!("Diff leaves {} unchanged, nothing to publish", chapter.name);
                tracker.advance(StepState::Skipped);
                return Ok(tracker.finish(
                    chapter,
                    StepOutcome::Applied,
                    Publication::NotPublished,
                    Vec::new(),
                ));
            }

            let publication =
                publish(plan, chapter, copy, staging, publisher, progress, None).await?;
            tracker.advance(StepState::Published);
            Ok(tracker.finish(chapter, StepOutcome::Applied, publication, Vec::new()))
        }
        ApplyOutcome::Conflicted(paths) => {
            tracker.advance(StepState::Conflicted);

            match plan.policy {
                ConflictPolicy::Strict => {
                    tracker.advance(StepState::Skipped);
                    Ok(tracker.finish(
                        chapter,
                        StepOutcome::Conflicted,
                        Publication::NotPublished,
                        paths,
                    ))
                }
                ConflictPolicy::Permissive => {
                    warn!(
                        "Conflicts in {}, publishing with conflict markers",
                        chapter.name
                    );
                    let conflicts = Some(paths.as_slice());
                    let publication =
                        publish(plan, chapter, copy, staging, publisher, progress, conflicts)
                            .await?;
                    tracker.advance(StepState::Published);
                    Ok(tracker.finish(chapter, StepOutcome::Conflicted, publication, paths))
                }
            }
        }
    }
}

/// Commit, push and open the PR for a chapter
async fn publish(
    plan: &PropagationPlan,
    chapter: &Chapter,
    copy: &WorkingCopy,
    staging: &mut dyn StagingAdapter,
    publisher: &PrPublisher<'_>,
    progress: &dyn ProgressCallback,
    conflicts: Option<&[String]>,
) -> Result<Publication> {
    let number = plan.pull_request.number;
    let conflicted = conflicts.is_some();

    staging.commit_and_push(copy, &commit_message(number))?;

    let title = pr_title(number, &chapter.name, conflicted);
    let body = pr_body(number, &chapter.name, conflicts);
    let publication = publisher
        .open_pr(&copy.work_branch, &chapter.name, &title, &body, conflicted)
        .await?;

    match &publication {
        Publication::Opened(pr) => {
            info!("PR {} created: {}", pr.number, pr.html_url);
            progress.on_pr_created(&chapter.name, pr).await;
        }
        Publication::AlreadyExists => {
            progress
                .on_message(&format!(
                    "A pull request for {} is already open",
                    copy.work_branch
                ))
                .await;
        }
        Publication::NotPublished => {}
    }

    Ok(publication)
}

/// Report what a run would do without touching anything
///
/// Every downstream chapter is returned as a skipped step.
pub async fn dry_run_result(
    plan: &PropagationPlan,
    progress: &dyn ProgressCallback,
) -> PropagationResult {
    progress.on_message("Dry run - no changes will be made").await;

    if plan.targets.is_empty() {
        progress
            .on_message(&format!(
                "{} is the last chapter, nothing to propagate",
                plan.base_chapter()
            ))
            .await;
    } else {
        progress
            .on_message(&format!(
                "Would apply PR #{} ({} file(s), {} changed line(s)) to:",
                plan.pull_request.number,
                plan.diff.files().len(),
                plan.diff.changed_lines()
            ))
            .await;
    }

    let steps = plan
        .targets
        .iter()
        .map(|chapter| PropagationStep {
            branch: chapter.name.clone(),
            chapter_index: chapter.index,
            outcome: StepOutcome::Skipped,
            state: StepState::Skipped,
            publication: Publication::NotPublished,
            conflicting_paths: Vec::new(),
        })
        .collect::<Vec<_>>();

    for step in &steps {
        progress
            .on_message(&format!(
                "  - {} -> PR from {}",
                step.branch,
                work_branch_name(&step.branch)
            ))
            .await;
    }

    PropagationResult {
        steps,
        status: PropagationStatus::Completed,
        not_attempted: Vec::new(),
    }
}
