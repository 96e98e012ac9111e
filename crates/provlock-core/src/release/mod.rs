//! Latest-release lookup for version pinning.
//!
//! The core consumes only the version string a release resolver returns;
//! the tag prefix (e.g. `v1.2.3`) is stripped here.

pub mod gitlab;

use async_trait::async_trait;
use thiserror::Error;

pub use gitlab::{GitLabApi, GitLabClient, GitLabConfig, GitLabRelease, DEFAULT_GITLAB_BASE_URL};

/// Errors from a release resolver.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("failed to get personal access token (env: GITLAB_TOKEN)")]
    MissingToken,

    #[error("failed to parse source '{0}': expected 'owner/project'")]
    InvalidSource(String),

    #[error("invalid base URL '{url}': {detail}")]
    InvalidBaseUrl { url: String, detail: String },

    #[error("no releases found for {0}")]
    NoReleases(String),

    #[error("release API returned status {status} for {source_id}")]
    Status { status: u16, source_id: String },

    #[error("failed to get the releases from {source_id}: {detail}")]
    Transport { source_id: String, detail: String },
}

/// Something that can name the latest published version of a project.
#[async_trait]
pub trait LatestRelease: Send + Sync {
    /// The latest version, with any tag prefix stripped.
    async fn latest(&self) -> Result<String, ReleaseError>;
}

/// Strip a leading non-numeric tag prefix such as `v` from a release tag.
///
/// Tags without any digit are returned unchanged.
#[must_use]
pub fn strip_version_prefix(tag: &str) -> &str {
    match tag.find(|c: char| c.is_ascii_digit()) {
        Some(idx) => &tag[idx..],
        None => tag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_version_prefix() {
        assert_eq!(strip_version_prefix("v1.2.3"), "1.2.3");
        assert_eq!(strip_version_prefix("1.2.3"), "1.2.3");
        assert_eq!(strip_version_prefix("release-2.0.0"), "2.0.0");
        assert_eq!(strip_version_prefix("v1.0.0-rc.1"), "1.0.0-rc.1");
        assert_eq!(strip_version_prefix("nightly"), "nightly");
        assert_eq!(strip_version_prefix(""), "");
    }
}
