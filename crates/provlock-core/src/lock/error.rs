//! Lock resolution error types.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Lock resolution error codes.
pub mod codes {
    pub const LOCK_ADDRESS_INVALID: &str = "LOCK_ADDRESS_INVALID";
    pub const LOCK_PLATFORM_INVALID: &str = "LOCK_PLATFORM_INVALID";
    pub const LOCK_VERSION_INVALID: &str = "LOCK_VERSION_INVALID";
    pub const LOCK_PLATFORM_DUPLICATE: &str = "LOCK_PLATFORM_DUPLICATE";
    pub const LOCK_DIGEST_MISSING: &str = "LOCK_DIGEST_MISSING";
    pub const LOCK_DIGEST_SET_MISMATCH: &str = "LOCK_DIGEST_SET_MISMATCH";
    pub const LOCK_DOWNLOAD_FAILED: &str = "LOCK_DOWNLOAD_FAILED";
    pub const LOCK_CANCELLED: &str = "LOCK_CANCELLED";
}

/// Error returned while resolving a provider version.
///
/// Cloneable so that every caller coalesced onto one in-flight resolution
/// receives the same outcome.
#[derive(Debug, Clone, Error)]
pub enum LockError {
    /// The provider address could not be parsed.
    #[error("invalid provider address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The platform token is not a known `os_arch` pair.
    #[error("invalid platform '{platform}': {reason}")]
    InvalidPlatform { platform: String, reason: String },

    /// The version string is empty.
    #[error("invalid version for '{address}': version must not be empty")]
    InvalidVersion { address: String },

    /// The same platform was requested twice.
    #[error("duplicate platform '{platform}' requested for {address} {version}")]
    DuplicatePlatform {
        address: String,
        version: String,
        platform: String,
    },

    /// The downloader returned no digest for the requested platform.
    #[error("missing {kind} digest for {address} {version} on {platform}")]
    MissingDigest {
        address: String,
        version: String,
        platform: String,
        kind: &'static str,
    },

    /// Two platforms of the same version reported different shared digest sets.
    #[error(
        "shared digest set for {address} {version} changed while resolving {platform}"
    )]
    DigestSetMismatch {
        address: String,
        version: String,
        platform: String,
    },

    /// The downloader failed.
    #[error("failed to download {address} {version} for {platform}: {source}")]
    Download {
        address: String,
        version: String,
        platform: String,
        #[source]
        source: Arc<DownloadError>,
    },

    /// The resolution was cancelled before it completed.
    #[error("resolution of {address} {version} was cancelled")]
    Cancelled { address: String, version: String },
}

impl LockError {
    /// Get the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAddress { .. } => codes::LOCK_ADDRESS_INVALID,
            Self::InvalidPlatform { .. } => codes::LOCK_PLATFORM_INVALID,
            Self::InvalidVersion { .. } => codes::LOCK_VERSION_INVALID,
            Self::DuplicatePlatform { .. } => codes::LOCK_PLATFORM_DUPLICATE,
            Self::MissingDigest { .. } => codes::LOCK_DIGEST_MISSING,
            Self::DigestSetMismatch { .. } => codes::LOCK_DIGEST_SET_MISMATCH,
            Self::Download { .. } => codes::LOCK_DOWNLOAD_FAILED,
            Self::Cancelled { .. } => codes::LOCK_CANCELLED,
        }
    }

    pub(crate) fn invalid_address(address: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_platform(platform: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPlatform {
            platform: platform.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn cancelled(address: &str, version: &str) -> Self {
        Self::Cancelled {
            address: address.to_string(),
            version: version.to_string(),
        }
    }
}

/// Error reported by a [`ProviderDownloader`](super::ProviderDownloader).
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The requested provider package does not exist in the source.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// Reading from the source failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The checksum manifest could not be parsed.
    #[error("invalid checksum manifest {path}: {detail}")]
    InvalidManifest { path: PathBuf, detail: String },

    /// Any other downloader failure.
    #[error("{0}")]
    Other(String),
}
