//! GitHub API interaction module
//!
//! Lists every release of a repository and opens the byte stream of a
//! single release asset. No filtering happens here.

use crate::error::{FetchError, RemoteTarget};
use crate::types::{GitHubAsset, GitHubRelease, Repository};
use reqwest::header::{ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use reqwest::{Client, Response};

const RELEASES_PER_PAGE: u32 = 100;
const USER_AGENT_VALUE: &str = concat!("ghasset/", env!("CARGO_PKG_VERSION"));

pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(|e| FetchError::RemoteUnavailable {
                url: api_url.to_string(),
                reason: format!("could not build HTTP client: {}", e),
            })?;

        Ok(GitHubClient {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Build the URL of one page of the release listing
    pub fn releases_url(&self, repo: &Repository, page: u32) -> String {
        format!(
            "{}/repos/{}/{}/releases?per_page={}&page={}",
            self.api_url, repo.owner, repo.name, RELEASES_PER_PAGE, page
        )
    }

    /// Fetch the complete release list, following pagination.
    ///
    /// A repository without any release is reported as `NoReleases`.
    pub async fn list_releases(&self, repo: &Repository) -> Result<Vec<GitHubRelease>, FetchError> {
        let mut releases = Vec::new();
        let mut page = 1;

        loop {
            let url = self.releases_url(repo, page);
            tracing::debug!("Fetching releases page {} from: {}", page, url);

            let response = self
                .send(&url, "application/vnd.github+json", RemoteTarget::Repository)
                .await?;

            let has_next = response
                .headers()
                .get(LINK)
                .and_then(|link| link.to_str().ok())
                .is_some_and(|link| link.contains(r#"rel="next""#));

            let batch: Vec<GitHubRelease> =
                response
                    .json()
                    .await
                    .map_err(|e| FetchError::RemoteUnavailable {
                        url: url.clone(),
                        reason: format!("could not parse releases: {}", e),
                    })?;

            tracing::trace!("Page {} returned {} release(s)", page, batch.len());
            let exhausted = batch.is_empty();
            releases.extend(batch);

            if !has_next || exhausted {
                break;
            }
            page += 1;
        }

        if releases.is_empty() {
            return Err(FetchError::NoReleases {
                repo: repo.to_string(),
            });
        }

        tracing::debug!("Found {} release(s) in {}", releases.len(), repo);
        Ok(releases)
    }

    /// Request the raw bytes of `asset`. The body is left unread for the
    /// caller to stream.
    pub async fn asset_response(&self, asset: &GitHubAsset) -> Result<Response, FetchError> {
        tracing::debug!("Requesting asset {} from: {}", asset.name, asset.url);
        self.send(&asset.url, "application/octet-stream", RemoteTarget::Asset)
            .await
    }

    async fn send(&self, url: &str, accept: &str, target: RemoteTarget) -> Result<Response, FetchError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, accept)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .send()
            .await
            .map_err(|e| FetchError::RemoteUnavailable {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} answered {}", url, status);
            return Err(FetchError::from_status(target, url, status));
        }

        Ok(response)
    }
}
