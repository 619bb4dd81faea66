//! GitHub authentication

use crate::auth::AuthSource;
use crate::error::{Error, Result};
use std::env;

/// Environment variables checked for a token, in priority order
const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// GitHub authentication configuration
#[derive(Clone)]
pub struct GitHubAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token was obtained from
    pub source: AuthSource,
}

impl std::fmt::Debug for GitHubAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAuthConfig")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Get GitHub authentication from the process environment
///
/// Priority:
/// 1. `GITHUB_TOKEN` environment variable
/// 2. `GH_TOKEN` environment variable
///
/// The token needs `repo` scope to push and open pull requests.
pub fn get_github_auth() -> Result<GitHubAuthConfig> {
    github_auth_from(|name| env::var(name).ok())
}

/// Get GitHub authentication from an arbitrary variable lookup
pub fn github_auth_from<F>(lookup: F) -> Result<GitHubAuthConfig>
where
    F: Fn(&str) -> Option<String>,
{
    for var in TOKEN_VARS {
        if let Some(token) = lookup(var).map(|t| t.trim().to_string()) {
            if !token.is_empty() {
                return Ok(GitHubAuthConfig {
                    token,
                    source: AuthSource::EnvVar(var),
                });
            }
        }
    }

    Err(Error::Auth(
        "No GitHub token found. Set GITHUB_TOKEN to a token with repo scope".to_string(),
    ))
}
