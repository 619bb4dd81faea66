//! Git-backed staging adapter
//!
//! Works in a clone of the fork inside a [`StagingArea`]. Each chapter is
//! staged as `<chapter>-update` from `origin/<chapter>`, the diff is applied
//! with `git apply --3way`, and the result is force-pushed back to the fork.

use crate::config::{CommitIdentity, work_branch_name};
use crate::error::{Error, Result};
use crate::staging::{ApplyOutcome, StagingAdapter, StagingArea, WorkingCopy};
use crate::types::DiffBlob;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info};

/// Remote name of the fork inside the clone
const REMOTE: &str = "origin";

/// Stderr fragments `git apply` prints when hunks do not fit the target
const CONTENT_FAILURE_MARKERS: [&str; 5] = [
    "with conflicts",
    "patch failed",
    "patch does not apply",
    "does not exist in index",
    "already exists in working directory",
];

/// Staging adapter that shells out to `git`
#[derive(Debug)]
pub struct GitStaging {
    area: StagingArea,
    identity: Option<CommitIdentity>,
}

impl GitStaging {
    /// Clone the fork into the staging area
    ///
    /// Uses a shallow clone that still fetches every branch, so each chapter
    /// is available as `origin/<chapter>`.
    pub fn clone_fork(
        clone_url: &str,
        area: StagingArea,
        identity: Option<CommitIdentity>,
    ) -> Result<Self> {
        info!("Cloning {clone_url} into {}", area.repo_dir().display());

        let repo_dir = area.repo_dir();
        run_git(
            area.root(),
            [
                OsStr::new("clone"),
                OsStr::new("--quiet"),
                OsStr::new("--depth=1"),
                OsStr::new("--no-single-branch"),
                OsStr::new(clone_url),
                repo_dir.as_os_str(),
            ],
        )?;

        Ok(Self { area, identity })
    }

    /// The staging area this adapter works in
    pub const fn area(&self) -> &StagingArea {
        &self.area
    }

    fn repo_dir(&self) -> PathBuf {
        self.area.repo_dir()
    }

    fn ref_exists(&self, reference: &str) -> Result<bool> {
        let output = git_command(&self.repo_dir())
            .args(["rev-parse", "--verify", "--quiet", reference])
            .output()?;
        Ok(output.status.success())
    }

    /// Files left unmerged by a three-way apply
    fn unmerged_paths(&self) -> Result<Vec<String>> {
        let output = run_git_stdout(
            &self.repo_dir(),
            ["diff", "--name-only", "--diff-filter=U"],
        )?;
        Ok(output.lines().map(ToString::to_string).collect())
    }

    /// Create a git command configured for commit operations
    fn commit_command(&self) -> Command {
        let mut cmd = git_command(&self.repo_dir());

        if let Some(identity) = &self.identity {
            cmd.arg("-c").arg(format!("user.name={}", identity.name));
            cmd.arg("-c").arg(format!("user.email={}", identity.email));
            match &identity.signing_key {
                Some(key) => {
                    cmd.arg("-c").arg(format!("user.signingkey={key}"));
                }
                None => {
                    cmd.args(["-c", "commit.gpgsign=false"]);
                }
            }
        }

        cmd
    }

    fn signs_commits(&self) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|i| i.signing_key.is_some())
    }
}

impl StagingAdapter for GitStaging {
    fn has_branch(&mut self, chapter: &str) -> Result<bool> {
        self.ref_exists(&format!("refs/remotes/{REMOTE}/{chapter}"))
    }

    fn stage(&mut self, chapter: &str) -> Result<WorkingCopy> {
        let upstream = format!("{REMOTE}/{chapter}");
        if !self.has_branch(chapter)? {
            return Err(Error::BranchNotFound(upstream));
        }

        let work_branch = work_branch_name(chapter);
        info!("Creating branch {work_branch} from {upstream}");
        run_git(
            &self.repo_dir(),
            ["checkout", "--quiet", "-B", &work_branch, &upstream],
        )?;

        Ok(WorkingCopy {
            chapter: chapter.to_string(),
            work_branch,
        })
    }

    fn apply_diff(&mut self, copy: &WorkingCopy, diff: &DiffBlob) -> Result<ApplyOutcome> {
        if diff.patch.trim().is_empty() {
            debug!(branch = %copy.work_branch, "empty patch, nothing to apply");
            return Ok(ApplyOutcome::Clean);
        }

        info!("Applying patch to {}", copy.work_branch);
        let diff_path = self.area.diff_path();
        std::fs::write(&diff_path, &diff.patch)?;

        let output = git_command(&self.repo_dir())
            .args(["apply", "--3way", "--whitespace=nowarn"])
            .arg(&diff_path)
            .output()?;

        if output.status.success() {
            return Ok(ApplyOutcome::Clean);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let mut paths = self.unmerged_paths()?;

        if paths.is_empty() && !is_content_failure(&stderr) {
            return Err(Error::Git {
                command: format!("git apply --3way {}", diff_path.display()),
                stderr,
            });
        }

        if paths.is_empty() {
            paths = failed_paths(&stderr);
        }

        debug!(branch = %copy.work_branch, ?paths, "patch applied with conflicts");
        Ok(ApplyOutcome::Conflicted(paths))
    }

    fn has_changes(&mut self, _copy: &WorkingCopy) -> Result<bool> {
        let status = run_git_stdout(&self.repo_dir(), ["status", "--porcelain"])?;
        Ok(!status.is_empty())
    }

    fn commit_and_push(&mut self, copy: &WorkingCopy, message: &str) -> Result<()> {
        info!("Pushing changes to {}", copy.work_branch);
        let repo_dir = self.repo_dir();

        run_git(&repo_dir, ["add", "--all"])?;

        let mut commit = self.commit_command();
        commit.args(["commit", "--quiet", "--no-verify", "--allow-empty", "-m", message]);
        if self.signs_commits() {
            commit.arg("-S");
        }
        check_output(&commit.output()?, "git commit")?;

        let refspec = format!("{0}:refs/heads/{0}", copy.work_branch);
        let output = git_command(&repo_dir)
            .args(["push", "--force", "--quiet", REMOTE, &refspec])
            .output()?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if stderr.contains("rejected") || stderr.contains("non-fast-forward") {
            return Err(Error::PushRejected {
                branch: copy.work_branch.clone(),
                details: stderr,
            });
        }

        Err(Error::Git {
            command: format!("git push --force {REMOTE} {refspec}"),
            stderr,
        })
    }

    fn release(&mut self, copy: WorkingCopy) -> Result<()> {
        debug!(branch = %copy.work_branch, "releasing working copy");
        let repo_dir = self.repo_dir();
        run_git(&repo_dir, ["reset", "--hard", "--quiet"])?;
        run_git(&repo_dir, ["clean", "-fdq"])?;
        run_git(&repo_dir, ["checkout", "--quiet", "--detach"])?;
        Ok(())
    }
}

/// Create a non-interactive git command
fn git_command(workdir: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.current_dir(workdir);

    // Never block on credential prompts
    cmd.env("GIT_TERMINAL_PROMPT", "0");

    cmd
}

/// Run a git command, failing on non-zero exit
fn run_git<I, S>(workdir: &Path, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let output = git_command(workdir).args(&args).output()?;

    let command = format!(
        "git {}",
        args.iter()
            .map(|a| a.as_ref().to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );
    check_output(&output, &command)?;
    Ok(output)
}

/// Run a git command and return trimmed stdout
fn run_git_stdout<I, S>(workdir: &Path, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = run_git(workdir, args)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn check_output(output: &Output, command: &str) -> Result<()> {
    if output.status.success() {
        Ok(())
    } else {
        Err(Error::Git {
            command: command.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

fn is_content_failure(stderr: &str) -> bool {
    CONTENT_FAILURE_MARKERS.iter().any(|m| stderr.contains(m))
}

/// Paths named in `git apply` failure output
fn failed_paths(stderr: &str) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();

    for line in stderr.lines() {
        let path = if let Some(rest) = line.strip_prefix("error: patch failed: ") {
            rest.rsplit_once(':').map_or(rest, |(path, _)| path)
        } else if let Some(rest) = line.strip_prefix("error: ") {
            match rest.split_once(": ") {
                Some((path, reason))
                    if reason.starts_with("does not") || reason.starts_with("already exists") =>
                {
                    path
                }
                _ => continue,
            }
        } else {
            continue;
        };

        if !paths.iter().any(|p| p == path) {
            paths.push(path.to_string());
        }
    }

    paths
}
