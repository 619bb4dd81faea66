//! chapter-propagate - carry a PR's diff across tutorial chapter branches
//!
//! CLI binary that applies the diff of one upstream pull request to every
//! chapter branch after its base and opens a PR per chapter.

use anyhow::{Context, Result};
use chapter_propagate::config::{
    CommitIdentity, PropagationConfig, RepoSpec, DEFAULT_REPO_NAME, DEFAULT_UPSTREAM_OWNER,
};
use chapter_propagate::error::{Error, ErrorKind};
use chapter_propagate::types::{ConflictPolicy, PropagationStatus};
use clap::Parser;
use std::ffi::OsString;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::style::Stylize;

/// Exit code for infrastructure failures (git, network, auth transport)
const EXIT_FAILURE: u8 = 1;
/// Exit code for a run halted on a conflict
const EXIT_HALTED: u8 = 3;
/// Exit code for bad input (unknown PR, empty diff, branch naming problems)
const EXIT_INPUT: u8 = 4;

/// Multi-character short flags, rewritten to their long forms before parsing
const SHORT_ALIASES: [(&str, &str); 2] = [
    ("-ur", "--upstream-repo-name"),
    ("-fr", "--fork-repo-name"),
];

#[derive(Parser, Debug)]
#[command(name = "chapter-propagate")]
#[command(about = "Propagate a pull request's diff across tutorial chapter branches")]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Owner of the upstream repository
    #[arg(short = 'u', long, default_value = DEFAULT_UPSTREAM_OWNER)]
    upstream_owner: String,

    /// Owner of the fork that work branches are pushed to
    #[arg(short = 'f', long)]
    fork_owner: String,

    /// Name of the upstream repository (also -ur)
    #[arg(long, default_value = DEFAULT_REPO_NAME)]
    upstream_repo_name: String,

    /// Name of the fork repository (also -fr)
    #[arg(long, default_value = DEFAULT_REPO_NAME)]
    fork_repo_name: String,

    /// Number of the upstream pull request to propagate
    #[arg(short = 'p', long)]
    pull_request_number: u64,

    /// Publish conflicting chapters as draft PRs instead of stopping
    #[arg(short = 'i', long)]
    ignore_conflicts: bool,

    /// Keep the temporary working directory and diff file
    #[arg(long)]
    keep_tmp: bool,

    /// Show what would be done without cloning or pushing
    #[arg(long)]
    dry_run: bool,

    /// URL to clone the fork from (defaults to SSH)
    #[arg(long)]
    clone_url: Option<String>,

    /// Author name for propagation commits
    #[arg(long, requires = "git_user_email")]
    git_user_name: Option<String>,

    /// Author email for propagation commits
    #[arg(long, requires = "git_user_name")]
    git_user_email: Option<String>,

    /// GPG key to sign propagation commits with
    #[arg(long, requires = "git_user_name")]
    git_signing_key: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn to_config(&self) -> PropagationConfig {
        let identity = match (&self.git_user_name, &self.git_user_email) {
            (Some(name), Some(email)) => Some(CommitIdentity {
                name: name.clone(),
                email: email.clone(),
                signing_key: self.git_signing_key.clone(),
            }),
            _ => None,
        };

        let policy = if self.ignore_conflicts {
            ConflictPolicy::Permissive
        } else {
            ConflictPolicy::Strict
        };

        PropagationConfig {
            upstream: RepoSpec::new(&self.upstream_owner, &self.upstream_repo_name),
            fork: RepoSpec::new(&self.fork_owner, &self.fork_repo_name),
            pr_number: self.pull_request_number,
            policy,
            keep_tmp: self.keep_tmp,
            dry_run: self.dry_run,
            clone_url: self.clone_url.clone(),
            identity,
            host: std::env::var("GH_HOST").ok().filter(|h| !h.trim().is_empty()),
        }
    }
}

/// Rewrite `-ur`/`-fr` (optionally `-ur=value`) to their long forms
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut seen_separator = false;

    args.into_iter()
        .map(|arg| {
            if seen_separator {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                seen_separator = true;
                return arg;
            }

            for (short, long) in SHORT_ALIASES {
                if text == short {
                    return OsString::from(long);
                }
                if let Some(value) = text.strip_prefix(short).and_then(|r| r.strip_prefix('=')) {
                    return OsString::from(format!("{long}={value}"));
                }
            }
            arg
        })
        .collect()
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli) -> Result<PropagationStatus> {
    let config = cli.to_config();
    let status = cli::run_propagate(&config, cli.json)
        .await
        .with_context(|| format!("failed to propagate PR #{}", config.pr_number))?;
    Ok(status)
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<Error>().map(Error::kind) {
        Some(ErrorKind::Input) => EXIT_INPUT,
        Some(ErrorKind::Infrastructure) | None => EXIT_FAILURE,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    init_logging(cli.verbose);

    match run(&cli).await {
        Ok(PropagationStatus::Completed) => ExitCode::SUCCESS,
        Ok(PropagationStatus::HaltedOnConflict) => ExitCode::from(EXIT_HALTED),
        Err(err) => {
            anstream::eprintln!("{}: {err:#}", "error".error());
            ExitCode::from(exit_code_for(&err))
        }
    }
}
