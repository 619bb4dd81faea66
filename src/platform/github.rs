//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{PlatformConfig, PullRequest};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::{Client, StatusCode};
use tracing::debug;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.diff";
const API_VERSION: &str = "2022-11-28";

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests (diff download)
    token: String,
    /// HTTP client for raw requests (diff download)
    http_client: Client,
    /// REST API root, without trailing slash
    api_base: String,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// `host` selects a GitHub Enterprise instance (`https://<host>/api/v3`).
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let api_base = host
            .as_ref()
            .map_or_else(|| DEFAULT_API_BASE.to_string(), |h| format!("https://{h}/api/v3"));
        Self::with_api_base(token, owner, repo, host, &api_base)
    }

    /// Create a GitHub service against an explicit REST API root
    pub fn with_api_base(
        token: &str,
        owner: String,
        repo: String,
        host: Option<String>,
        api_base: &str,
    ) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base.as_str())
            .map_err(|e| Error::RemoteUnavailable(format!("invalid API base URL: {e}")))?
            .build()
            .map_err(|e| Error::RemoteUnavailable(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent(concat!("chapter-propagate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::RemoteUnavailable(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: PlatformConfig { owner, repo, host },
            token: token.to_string(),
            http_client,
            api_base,
        })
    }
}

/// HTTP status carried by an octocrab API error
fn status_of(err: &octocrab::Error) -> Option<u16> {
    match err {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

/// Whether a create-PR failure means an open PR already exists
fn is_already_exists(err: &octocrab::Error) -> bool {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            source.status_code.as_u16() == 422
                && (source.message.contains("already exists")
                    || source
                        .errors
                        .iter()
                        .flatten()
                        .any(|e| e.to_string().contains("already exists")))
        }
        _ => false,
    }
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        is_draft: pr.draft.unwrap_or(false),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn list_branches(&self) -> Result<Vec<String>> {
        debug!(owner = %self.config.owner, repo = %self.config.repo, "listing branches");
        let first_page = self
            .client
            .repos(&self.config.owner, &self.config.repo)
            .list_branches()
            .per_page(100u8)
            .send()
            .await?;

        let branches = self.client.all_pages(first_page).await?;
        debug!(count = branches.len(), "listed branches");
        Ok(branches.into_iter().map(|b| b.name).collect())
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        debug!(number, "fetching PR");
        match self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(number)
            .await
        {
            Ok(pr) => {
                let result = pr_from_octocrab(&pr);
                debug!(number, base = %result.base_ref, "fetched PR");
                Ok(result)
            }
            Err(e) if status_of(&e) == Some(404) => Err(Error::PrNotFound(number)),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_pull_request_diff(&self, number: u64) -> Result<String> {
        debug!(number, "fetching PR diff");
        let url = format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_base, self.config.owner, self.config.repo, number
        );

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", DIFF_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| Error::RemoteUnavailable(format!("Failed to fetch PR diff: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::PrNotFound(number));
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::AuthRejected(format!(
                "fetching diff for PR #{number} returned {status}"
            )));
        }
        if !status.is_success() {
            return Err(Error::RemoteUnavailable(format!(
                "fetching diff for PR #{number} returned {status}"
            )));
        }

        let diff = response.text().await?;
        debug!(number, bytes = diff.len(), "fetched PR diff");
        Ok(diff)
    }

    async fn create_pr_with_options(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest> {
        debug!(head, base, draft, "creating PR");
        let pulls = self.client.pulls(&self.config.owner, &self.config.repo);
        let mut builder = pulls.create(title, head, base).draft(draft);

        if let Some(body_text) = body {
            builder = builder.body(body_text);
        }

        match builder.send().await {
            Ok(pr) => {
                let result = pr_from_octocrab(&pr);
                debug!(pr_number = result.number, "created PR");
                Ok(result)
            }
            Err(e) if is_already_exists(&e) => Err(Error::PrAlreadyExists {
                head: head.to_string(),
                base: base.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}
