//! Ephemeral staging directory

use crate::error::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

/// Temporary directory holding the fork clone and the diff file
///
/// Removed when dropped unless created with `keep = true`.
#[derive(Debug)]
pub struct StagingArea {
    root: PathBuf,
    /// Owns the directory while it should be cleaned up
    guard: Option<TempDir>,
}

impl StagingArea {
    /// Create a fresh staging directory under the system temp dir
    pub fn create(keep: bool) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("chapter-propagate-")
            .tempdir()?;

        if keep {
            let root = dir.keep();
            info!("Keeping staging directory {}", root.display());
            Ok(Self { root, guard: None })
        } else {
            Ok(Self {
                root: dir.path().to_path_buf(),
                guard: Some(dir),
            })
        }
    }

    /// Root of the staging directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the fork is cloned
    pub fn repo_dir(&self) -> PathBuf {
        self.root.join("repo")
    }

    /// Where the diff is written for `git apply`
    pub fn diff_path(&self) -> PathBuf {
        self.root.join("diff.patch")
    }

    /// Whether the directory survives the run
    pub const fn is_kept(&self) -> bool {
        self.guard.is_none()
    }
}
