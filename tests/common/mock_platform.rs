//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use chapter_propagate::error::{Error, Result};
use chapter_propagate::platform::PlatformService;
use chapter_propagate::types::{PlatformConfig, PullRequest};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Call record for `create_pr_with_options`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: Option<String>,
    pub draft: bool,
}

/// Simple mock platform service for testing
///
/// Features:
/// - Configurable branches and PRs (metadata plus diff)
/// - Auto-incrementing numbers for created PRs
/// - Call tracking for verification
/// - Open head/base pairs to trigger `PrAlreadyExists`
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    next_pr_number: AtomicU64,
    branches: Mutex<Vec<String>>,
    pull_requests: Mutex<HashMap<u64, (PullRequest, String)>>,
    open_pairs: Mutex<HashSet<(String, String)>>,
    // Call tracking
    get_pr_calls: AtomicUsize,
    get_diff_calls: AtomicUsize,
    list_branches_calls: AtomicUsize,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    // Error injection
    error_on_list_branches: Mutex<Option<String>>,
    error_on_create_pr: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_pr_number: AtomicU64::new(100),
            branches: Mutex::new(Vec::new()),
            pull_requests: Mutex::new(HashMap::new()),
            open_pairs: Mutex::new(HashSet::new()),
            get_pr_calls: AtomicUsize::new(0),
            get_diff_calls: AtomicUsize::new(0),
            list_branches_calls: AtomicUsize::new(0),
            create_pr_calls: Mutex::new(Vec::new()),
            error_on_list_branches: Mutex::new(None),
            error_on_create_pr: Mutex::new(None),
        }
    }

    // === Setup methods ===

    /// Set the branches returned by `list_branches`
    pub fn set_branches(&self, branches: &[&str]) {
        *self.branches.lock().unwrap() = branches.iter().map(ToString::to_string).collect();
    }

    /// Register a PR with its diff
    pub fn add_pull_request(&self, pr: PullRequest, diff: &str) {
        self.pull_requests
            .lock()
            .unwrap()
            .insert(pr.number, (pr, diff.to_string()));
    }

    /// Mark a head/base pair as already having an open PR
    pub fn add_open_pr(&self, head: &str, base: &str) {
        self.open_pairs
            .lock()
            .unwrap()
            .insert((head.to_string(), base.to_string()));
    }

    // === Error injection methods ===

    /// Make `list_branches` return an error
    pub fn fail_list_branches(&self, msg: &str) {
        *self.error_on_list_branches.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr_with_options` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification methods ===

    /// Get all PR creation calls
    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Number of `get_pull_request` calls
    pub fn get_pr_call_count(&self) -> usize {
        self.get_pr_calls.load(Ordering::SeqCst)
    }

    /// Number of `get_pull_request_diff` calls
    pub fn get_diff_call_count(&self) -> usize {
        self.get_diff_calls.load(Ordering::SeqCst)
    }

    /// Number of `list_branches` calls
    pub fn list_branches_call_count(&self) -> usize {
        self.list_branches_calls.load(Ordering::SeqCst)
    }

    /// Assert that a PR was requested from `head` into `base`
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pr({head}, {base}) but got: {calls:?}"
        );
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn list_branches(&self) -> Result<Vec<String>> {
        self.list_branches_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(msg) = self.error_on_list_branches.lock().unwrap().as_ref() {
            return Err(Error::RemoteUnavailable(msg.clone()));
        }

        Ok(self.branches.lock().unwrap().clone())
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        self.get_pr_calls.fetch_add(1, Ordering::SeqCst);

        self.pull_requests
            .lock()
            .unwrap()
            .get(&number)
            .map(|(pr, _)| pr.clone())
            .ok_or(Error::PrNotFound(number))
    }

    async fn get_pull_request_diff(&self, number: u64) -> Result<String> {
        self.get_diff_calls.fetch_add(1, Ordering::SeqCst);

        self.pull_requests
            .lock()
            .unwrap()
            .get(&number)
            .map(|(_, diff)| diff.clone())
            .ok_or(Error::PrNotFound(number))
    }

    async fn create_pr_with_options(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.map(ToString::to_string),
            draft,
        });

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::RemoteUnavailable(msg.clone()));
        }

        let pair = (head.to_string(), base.to_string());
        if !self.open_pairs.lock().unwrap().insert(pair) {
            return Err(Error::PrAlreadyExists {
                head: head.to_string(),
                base: base.to_string(),
            });
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        Ok(PullRequest {
            number,
            html_url: format!(
                "https://github.com/{}/{}/pull/{number}",
                self.config.owner, self.config.repo
            ),
            base_ref: base.to_string(),
            head_ref: head.to_string(),
            title: title.to_string(),
            is_draft: draft,
        })
    }
}
