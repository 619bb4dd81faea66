//! Platform service factory
//!
//! Creates the platform service for a run configuration.

use crate::auth::GitHubAuthConfig;
use crate::error::Result;
use crate::platform::{GitHubService, PlatformService};
use crate::types::PlatformConfig;

/// Create a platform service from configuration
pub fn create_platform_service(
    config: &PlatformConfig,
    auth: &GitHubAuthConfig,
) -> Result<Box<dyn PlatformService>> {
    Ok(Box::new(GitHubService::new(
        &auth.token,
        config.owner.clone(),
        config.repo.clone(),
        config.host.clone(),
    )?))
}
