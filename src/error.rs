//! Error types for chapter-propagate

use thiserror::Error;

/// Broad class of an error, used to pick the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input: unknown PR, empty diff, branch naming problems, config
    Input,
    /// Remote API, git or filesystem failure
    Infrastructure,
}

/// Errors that can occur while propagating a pull request
#[derive(Debug, Error)]
pub enum Error {
    /// Branch name has no chapter token
    #[error("branch '{0}' does not follow the chapter naming convention")]
    MalformedBranchName(String),

    /// No branch matched the chapter naming convention
    #[error("no chapter branches found")]
    EmptyChain,

    /// Two branches carry the same chapter index
    #[error("branches '{first}' and '{second}' share chapter index {index}")]
    DuplicateChapter {
        /// Shared chapter index
        index: u32,
        /// First branch with this index
        first: String,
        /// Second branch with this index
        second: String,
    },

    /// Branch not present in the chapter chain or the fork
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// Pull request does not exist upstream
    #[error("pull request #{0} not found")]
    PrNotFound(u64),

    /// Pull request has no changed lines
    #[error("pull request #{0} has no changes to propagate")]
    NoDiff(u64),

    /// Network, auth or API failure talking to the hosting platform
    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// A pull request for this head/base pair is already open
    #[error("a pull request from {head} into {base} already exists")]
    PrAlreadyExists {
        /// Head reference (`owner:branch`)
        head: String,
        /// Base branch
        base: String,
    },

    /// Remote refused the push
    #[error("push to '{branch}' rejected: {details}")]
    PushRejected {
        /// Branch being pushed
        branch: String,
        /// Git output explaining the rejection
        details: String,
    },

    /// Git command failed
    #[error("git command failed: {command}\n{stderr}")]
    Git {
        /// Command line that was run
        command: String,
        /// Captured stderr
        stderr: String,
    },

    /// No usable credential in the environment
    ///
    /// Classified as input: the run never reached the remote.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The remote refused the credential
    #[error("credentials rejected by remote: {0}")]
    AuthRejected(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Classify the error for reporting and exit codes
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedBranchName(_)
            | Self::EmptyChain
            | Self::DuplicateChapter { .. }
            | Self::BranchNotFound(_)
            | Self::PrNotFound(_)
            | Self::NoDiff(_)
            | Self::Auth(_)
            | Self::Config(_) => ErrorKind::Input,
            Self::RemoteUnavailable(_)
            | Self::AuthRejected(_)
            | Self::PrAlreadyExists { .. }
            | Self::PushRejected { .. }
            | Self::Git { .. }
            | Self::Io(_)
            | Self::Internal(_) => ErrorKind::Infrastructure,
        }
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 401 => {
                Self::AuthRejected(source.message)
            }
            octocrab::Error::GitHub { source, .. } => Self::RemoteUnavailable(format!(
                "GitHub API returned {}: {}",
                source.status_code, source.message
            )),
            other => Self::RemoteUnavailable(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::RemoteUnavailable(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
