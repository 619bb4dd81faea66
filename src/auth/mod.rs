//! Authentication for GitHub
//!
//! Tokens come from the environment only.

mod github;

pub use github::{get_github_auth, github_auth_from, GitHubAuthConfig};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from environment variable
    EnvVar(&'static str),
}
