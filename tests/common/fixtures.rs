//! Test data factories for chapter-propagate types
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use super::mock_platform::MockPlatformService;
use chapter_propagate::types::{PlatformConfig, PullRequest, PullRequestRef};

pub const UPSTREAM_OWNER: &str = "canonical";
pub const REPO: &str = "juju-sdk-tutorial-k8s";
pub const FORK_OWNER: &str = "alice";

/// A patch touching one file, two changed lines
pub const SAMPLE_PATCH: &str = "\
diff --git a/src/charm.py b/src/charm.py
index 1111111..2222222 100644
--- a/src/charm.py
+++ b/src/charm.py
@@ -1,3 +1,3 @@
 import ops
-PORT = 8000
+PORT = 8080
 
";

/// Create the upstream platform config
pub fn upstream_config() -> PlatformConfig {
    PlatformConfig {
        owner: UPSTREAM_OWNER.to_string(),
        repo: REPO.to_string(),
        host: None,
    }
}

/// Create a reference to an upstream PR
pub fn pr_ref(number: u64) -> PullRequestRef {
    PullRequestRef {
        owner: UPSTREAM_OWNER.to_string(),
        repo: REPO.to_string(),
        number,
    }
}

/// Create a pull request with default values
pub fn make_pr(number: u64, head: &str, base: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/{UPSTREAM_OWNER}/{REPO}/pull/{number}"),
        base_ref: base.to_string(),
        head_ref: head.to_string(),
        title: format!("Fix port in {base}"),
        is_draft: false,
    }
}

/// Mock with the given branches and one PR against `base`
pub fn mock_with_pr(
    branches: &[&str],
    pr_number: u64,
    base: &str,
    patch: &str,
) -> MockPlatformService {
    let mock = MockPlatformService::with_config(upstream_config());
    mock.set_branches(branches);
    mock.add_pull_request(make_pr(pr_number, "fix-port", base), patch);
    mock
}

/// The four-chapter chain used by most engine scenarios
pub fn four_chapters() -> Vec<&'static str> {
    vec!["01_ch1", "02_ch2", "03_ch3", "04_ch4"]
}
