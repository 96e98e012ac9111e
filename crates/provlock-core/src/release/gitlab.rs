//! GitLab release lookup.

use super::{strip_version_prefix, LatestRelease, ReleaseError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Public GitLab API.
pub const DEFAULT_GITLAB_BASE_URL: &str = "https://gitlab.com/api/v4/";

/// Settings for talking to a GitLab instance.
#[derive(Debug, Clone, Default)]
pub struct GitLabConfig {
    /// API base URL, with a trailing slash. `None` means the public instance.
    pub base_url: Option<String>,

    /// Personal access token.
    pub token: Option<String>,
}

/// A published GitLab release. Only the fields used here are decoded.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GitLabReleaseInfo {
    /// Tag the release was cut from. Always present, unlike the release name.
    pub tag_name: String,
}

/// The subset of the GitLab API used for release lookup.
#[async_trait]
pub trait GitLabApi: Send + Sync {
    /// The most recent release of `owner/project`, if any.
    async fn latest_release(
        &self,
        owner: &str,
        project: &str,
    ) -> Result<Option<GitLabReleaseInfo>, ReleaseError>;
}

/// GitLab API client over HTTP.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    base_url: Url,
    token: String,
    http: Client,
}

impl GitLabClient {
    /// Create a client from `config`.
    ///
    /// # Errors
    /// Returns an error if no token is configured, the base URL is invalid,
    /// or the HTTP client cannot be created.
    pub fn new(config: &GitLabConfig) -> Result<Self, ReleaseError> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or(ReleaseError::MissingToken)?;

        let raw = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_GITLAB_BASE_URL);
        // Joining relative paths drops the last segment unless it ends in '/'.
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        let base_url = Url::parse(&normalized).map_err(|e| ReleaseError::InvalidBaseUrl {
            url: raw.to_string(),
            detail: e.to_string(),
        })?;

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("provlock/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReleaseError::Transport {
                source_id: base_url.to_string(),
                detail: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            base_url,
            token,
            http,
        })
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl GitLabApi for GitLabClient {
    async fn latest_release(
        &self,
        owner: &str,
        project: &str,
    ) -> Result<Option<GitLabReleaseInfo>, ReleaseError> {
        let source_id = format!("{owner}/{project}");
        let transport = |detail: String| ReleaseError::Transport {
            source_id: source_id.clone(),
            detail,
        };

        // The project id is the full path as a single encoded segment.
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| transport("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["projects", source_id.as_str(), "releases"]);

        let response = self
            .http
            .get(url.as_str())
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ReleaseError::Status {
                status: response.status().as_u16(),
                source_id: source_id.clone(),
            });
        }

        let releases: Vec<GitLabReleaseInfo> = response
            .json()
            .await
            .map_err(|e| transport(format!("invalid JSON: {e}")))?;

        Ok(releases.into_iter().next())
    }
}

/// Latest-version lookup backed by GitLab releases.
pub struct GitLabRelease {
    api: Arc<dyn GitLabApi>,
    owner: String,
    project: String,
}

impl std::fmt::Debug for GitLabRelease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitLabRelease")
            .field("owner", &self.owner)
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}

impl GitLabRelease {
    /// Create a lookup for `source` (`owner/project`) using an HTTP client.
    ///
    /// # Errors
    /// Returns an error if the source is malformed or the client cannot be built.
    pub fn new(source: &str, config: &GitLabConfig) -> Result<Self, ReleaseError> {
        let (owner, project) = parse_source(source)?;
        let api = GitLabClient::new(config)?;
        Ok(Self {
            api: Arc::new(api),
            owner,
            project,
        })
    }

    /// Create a lookup for `source` using an existing API implementation.
    ///
    /// # Errors
    /// Returns an error if the source is malformed.
    pub fn with_api(source: &str, api: Arc<dyn GitLabApi>) -> Result<Self, ReleaseError> {
        let (owner, project) = parse_source(source)?;
        Ok(Self {
            api,
            owner,
            project,
        })
    }
}

#[async_trait]
impl LatestRelease for GitLabRelease {
    async fn latest(&self) -> Result<String, ReleaseError> {
        let release = self
            .api
            .latest_release(&self.owner, &self.project)
            .await?
            .ok_or_else(|| ReleaseError::NoReleases(format!("{}/{}", self.owner, self.project)))?;

        Ok(strip_version_prefix(&release.tag_name).to_string())
    }
}

/// Split `owner/project` at the first `/`. The project part may name a
/// subgroup path such as `sub/project`.
fn parse_source(source: &str) -> Result<(String, String), ReleaseError> {
    match source.split_once('/') {
        Some((owner, project)) if !owner.is_empty() && !project.is_empty() => {
            Ok((owner.to_string(), project.to_string()))
        }
        _ => Err(ReleaseError::InvalidSource(source.to_string())),
    }
}
