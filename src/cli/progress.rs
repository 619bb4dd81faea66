//! CLI progress callback with styled output and a per-chapter spinner

use crate::cli::style::{check, cross, dash, hyperlink_url, spinner_style, Stream, Stylize};
use anstream::{eprintln, println};
use async_trait::async_trait;
use chapter_propagate::error::Error;
use chapter_propagate::propagate::{Phase, ProgressCallback};
use chapter_propagate::types::{Chapter, PropagationStep, PullRequest, StepOutcome, StepState};
use indicatif::ProgressBar;
use std::sync::Mutex;
use std::time::Duration;

/// Chapter currently being worked on
struct ActiveStep {
    chapter: String,
    spinner: ProgressBar,
}

/// Progress callback that prints to the terminal
pub struct CliProgress {
    active: Mutex<Option<ActiveStep>>,
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl CliProgress {
    /// Create a progress printer with no chapter in flight
    pub const fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }

    fn take_active(&self) -> Option<ActiveStep> {
        self.active.lock().ok().and_then(|mut guard| guard.take())
    }

    /// Print a line without tearing the spinner
    fn print_line(&self, line: &str) {
        let guard = self.active.lock().ok();
        match guard.as_deref().and_then(Option::as_ref) {
            Some(active) => active.spinner.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        match phase {
            Phase::Complete => {}
            _ => self.print_line(&format!("{}...", phase.to_string().emphasis())),
        }
    }

    async fn on_step_started(&self, chapter: &Chapter, position: usize, total: usize) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(format!(
            "[{position}/{total}] Applying diff to {}",
            chapter.name.accent()
        ));
        spinner.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut guard) = self.active.lock() {
            *guard = Some(ActiveStep {
                chapter: chapter.name.clone(),
                spinner,
            });
        }
    }

    async fn on_step_finished(&self, step: &PropagationStep) {
        if let Some(active) = self.take_active() {
            active.spinner.finish_and_clear();
        }

        let branch = step.branch.accent();
        match (step.outcome, step.state) {
            (StepOutcome::Applied, StepState::Published) => {
                println!("  {} Applied to {branch}", check());
            }
            (StepOutcome::Applied, _) => {
                println!("  {} {branch} {}", dash(), "unchanged, nothing to publish".muted());
            }
            (StepOutcome::Conflicted, StepState::Published) => {
                println!(
                    "  {} Conflicts in {branch}, {}",
                    cross(),
                    "published as draft".warn().for_stdout()
                );
            }
            (StepOutcome::Conflicted, _) => {
                println!("  {} Conflicts in {branch}", cross());
            }
            (StepOutcome::Skipped, _) => {
                println!("  {} {branch} {}", dash(), "skipped".muted());
            }
        }

        for path in &step.conflicting_paths {
            println!("      {}", path.muted());
        }
    }

    async fn on_pr_created(&self, chapter: &str, pr: &PullRequest) {
        let pr_num = format!("#{}", pr.number);
        let kind = if pr.is_draft { "draft PR" } else { "PR" };
        self.print_line(&format!(
            "    Opened {kind} {} into {}",
            pr_num.accent(),
            chapter.emphasis()
        ));
        self.print_line(&format!("    {}", hyperlink_url(Stream::Stdout, &pr.html_url)));
    }

    async fn on_error(&self, err: &Error) {
        match self.take_active() {
            Some(active) => {
                active.spinner.finish_and_clear();
                eprintln!(
                    "  {} {} failed: {}",
                    cross().for_stderr(),
                    active.chapter.accent().for_stderr(),
                    err.to_string().error()
                );
            }
            None => eprintln!("{}: {}", "error".error(), err),
        }
    }

    async fn on_message(&self, message: &str) {
        self.print_line(message);
    }
}
