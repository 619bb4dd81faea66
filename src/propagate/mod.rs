//! Propagation engine
//!
//! Carries a pull request's diff across the chapters that follow its base:
//! 1. Planning - fetch the diff and work out the downstream chapters
//! 2. Execution - apply, commit, push and open a PR per chapter, in order

mod execute;
mod plan;
mod progress;
mod publish;

pub use execute::{dry_run_result, execute_propagation};
pub use plan::{create_propagation_plan, PropagationPlan};
pub use progress::{NoopProgress, Phase, ProgressCallback};
pub use publish::{commit_message, pr_body, pr_title, PrPublisher, CONFLICT_BANNER};
