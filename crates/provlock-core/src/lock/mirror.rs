//! Downloader backed by an unpacked provider mirror.
//!
//! Layout:
//! ```text
//! <root>/<host>/<namespace>/<type>/<version>/
//!   terraform-provider-<type>_<version>_SHA256SUMS
//!   <os>_<arch>/          (unpacked provider package)
//! ```

use super::downloader::{DownloadResponse, ProviderDownloader};
use super::error::DownloadError;
use super::request::DownloadRequest;
use async_trait::async_trait;
use provlock_util::hash::hash1_dir;
use provlock_util::shasums::{parse_shasums, shasums_filename};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Reads package digests from a filesystem mirror.
#[derive(Debug, Clone)]
pub struct MirrorDownloader {
    root: PathBuf,
    host: String,
}

impl MirrorDownloader {
    /// Create a downloader for the mirror at `root`, serving providers of `host`.
    pub fn new(root: impl Into<PathBuf>, host: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            host: host.into(),
        }
    }

    /// Directory holding every platform of one provider version.
    #[must_use]
    pub fn version_dir(&self, req: &DownloadRequest) -> PathBuf {
        self.root
            .join(&self.host)
            .join(&req.namespace)
            .join(&req.provider_type)
            .join(&req.version)
    }
}

#[async_trait]
impl ProviderDownloader for MirrorDownloader {
    async fn download(&self, req: &DownloadRequest) -> Result<DownloadResponse, DownloadError> {
        let version_dir = self.version_dir(req);
        let req = req.clone();

        tokio::task::spawn_blocking(move || read_version(&version_dir, &req))
            .await
            .map_err(|e| DownloadError::Other(format!("mirror read task failed: {e}")))?
    }
}

fn read_version(
    version_dir: &Path,
    req: &DownloadRequest,
) -> Result<DownloadResponse, DownloadError> {
    let package_dir = version_dir.join(req.platform());
    if !package_dir.is_dir() {
        return Err(DownloadError::NotFound {
            what: format!("package directory {}", package_dir.display()),
        });
    }

    trace!(path = %package_dir.display(), "hashing unpacked package");
    let h1 = hash1_dir(&package_dir).map_err(|source| DownloadError::Io {
        path: package_dir.clone(),
        source,
    })?;

    let manifest = version_dir.join(shasums_filename(&req.provider_type, &req.version));
    let content = match std::fs::read_to_string(&manifest) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DownloadError::NotFound {
                what: format!("checksum manifest {}", manifest.display()),
            });
        }
        Err(source) => {
            return Err(DownloadError::Io {
                path: manifest,
                source,
            })
        }
    };

    let zh_digests = parse_shasums(&content, &req.provider_type, &req.version).map_err(|e| {
        DownloadError::InvalidManifest {
            path: manifest.clone(),
            detail: e.to_string(),
        }
    })?;

    Ok(DownloadResponse {
        h1_digest: Some(h1),
        zh_digests,
    })
}
