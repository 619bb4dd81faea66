//! Propagate command - carry a PR's diff across downstream chapters

use crate::cli::progress::CliProgress;
use crate::cli::style::{bullet, check, cross, dash, hyperlink_url, Stream, Stylize};
use anstream::{eprintln, println};
use chapter_propagate::auth::get_github_auth;
use chapter_propagate::config::PropagationConfig;
use chapter_propagate::error::{Error, Result};
use chapter_propagate::platform::create_platform_service;
use chapter_propagate::propagate::{
    create_propagation_plan, dry_run_result, execute_propagation, NoopProgress, Phase,
    PrPublisher, ProgressCallback, PropagationPlan,
};
use chapter_propagate::staging::{GitStaging, StagingArea};
use chapter_propagate::types::{
    PropagationResult, PropagationStatus, PropagationStep, Publication, StepOutcome, StepState,
};
use tracing::debug;

/// Run the propagate command
///
/// With `json` set, progress output is suppressed and the result is printed
/// to stdout as JSON.
pub async fn run_propagate(config: &PropagationConfig, json: bool) -> Result<PropagationStatus> {
    config.validate()?;

    let auth = get_github_auth()?;
    debug!(?auth, "resolved credentials");
    let platform = create_platform_service(&config.upstream_platform(), &auth)?;

    let cli_progress = CliProgress::new();
    let progress: &dyn ProgressCallback = if json { &NoopProgress } else { &cli_progress };

    progress.on_phase(Phase::Planning).await;
    let plan =
        create_propagation_plan(platform.as_ref(), &config.pull_request(), config.policy).await?;

    if !json {
        print_plan(&plan);
    }

    let result = if config.dry_run {
        dry_run_result(&plan, progress).await
    } else if plan.targets.is_empty() {
        nothing_to_propagate(&plan, progress).await
    } else {
        progress.on_phase(Phase::Cloning).await;
        let area = StagingArea::create(config.keep_tmp)?;
        let mut staging =
            GitStaging::clone_fork(&config.fork_clone_url(), area, config.identity.clone())?;
        let publisher = PrPublisher::new(platform.as_ref(), config.fork.owner.clone());

        let result = execute_propagation(&plan, &mut staging, &publisher, progress).await;
        if staging.area().is_kept() {
            progress
                .on_message(&format!(
                    "Kept working directory {}",
                    staging.area().root().display()
                ))
                .await;
        }
        result?
    };

    if json {
        let out = serde_json::to_string_pretty(&result)
            .map_err(|e| Error::Internal(format!("failed to serialize result: {e}")))?;
        println!("{out}");
    } else {
        print_summary(&plan, &result, config.dry_run);
    }

    Ok(result.status)
}

/// Result for a PR made against the last chapter, reached without cloning
async fn nothing_to_propagate(
    plan: &PropagationPlan,
    progress: &dyn ProgressCallback,
) -> PropagationResult {
    progress
        .on_message(&format!(
            "{} is the last chapter, nothing to propagate",
            plan.base_chapter()
        ))
        .await;

    PropagationResult {
        steps: Vec::new(),
        status: PropagationStatus::Completed,
        not_attempted: Vec::new(),
    }
}

fn print_plan(plan: &PropagationPlan) {
    let count = plan.targets.len();
    println!(
        "PR {} targets {}, {} downstream chapter{}",
        format!("#{}", plan.pull_request.number).accent(),
        plan.base_chapter().emphasis(),
        count.accent(),
        if count == 1 { "" } else { "s" }
    );
    for chapter in &plan.targets {
        println!("  {} {}", bullet(), chapter.name);
    }
    println!();
}

fn print_summary(plan: &PropagationPlan, result: &PropagationResult, dry_run: bool) {
    if dry_run || result.steps.is_empty() {
        return;
    }

    println!();
    println!("{}", "Summary".emphasis());
    for step in &result.steps {
        println!("  {}", summary_line(step));
    }
    for branch in &result.not_attempted {
        println!("  {} {} {}", bullet(), branch, "not attempted".muted());
    }

    let opened = result.opened_prs().len();
    match result.halted_at() {
        Some(step) => {
            eprintln!();
            eprintln!(
                "{} Conflict in {}: resolve it upstream and re-run for PR #{}",
                "halted".warn(),
                step.branch.accent().for_stderr(),
                plan.pull_request.number
            );
        }
        None => {
            println!();
            println!(
                "{} {} PR #{} to {} chapter{}, opened {} PR{}",
                check(),
                "Propagated".success(),
                plan.pull_request.number,
                result.steps.len(),
                if result.steps.len() == 1 { "" } else { "s" },
                opened,
                if opened == 1 { "" } else { "s" }
            );
        }
    }
}

fn summary_line(step: &PropagationStep) -> String {
    let marker = match (step.outcome, step.state) {
        (StepOutcome::Applied, StepState::Published) => check().to_string(),
        (StepOutcome::Conflicted, _) => cross().to_string(),
        _ => dash().to_string(),
    };

    let detail = match &step.publication {
        Publication::Opened(pr) => format!(
            "PR #{} {}",
            pr.number,
            hyperlink_url(Stream::Stdout, &pr.html_url)
        ),
        Publication::AlreadyExists => "PR already open".to_string(),
        Publication::NotPublished => "not published".to_string(),
    };

    format!(
        "{marker} {} {} {}",
        step.branch.accent(),
        step.outcome,
        detail.muted()
    )
}
