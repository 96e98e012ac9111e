//! The downloader collaborator.

use super::error::DownloadError;
use super::request::DownloadRequest;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Digests fetched for one `(version, platform)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadResponse {
    /// `h1:` digest of the unpacked package for the requested platform.
    pub h1_digest: Option<String>,
    /// `zh:` digests of every archive published for the version, keyed by platform.
    pub zh_digests: BTreeMap<String, String>,
}

/// Fetches provider packages and their published checksums.
///
/// Errors are terminal for the platform they were returned for; callers do
/// not retry.
#[async_trait]
pub trait ProviderDownloader: Send + Sync {
    async fn download(&self, req: &DownloadRequest) -> Result<DownloadResponse, DownloadError>;
}
