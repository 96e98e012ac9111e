//! Download request construction.

use super::address::ProviderAddress;
use super::error::LockError;
use super::platform::Platform;

/// Everything a downloader needs to fetch one provider package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub namespace: String,
    pub provider_type: String,
    pub version: String,
    pub os: String,
    pub arch: String,
}

impl DownloadRequest {
    /// Build a request for one `(version, platform)` pair.
    ///
    /// # Errors
    /// Returns `InvalidAddress`, `InvalidVersion` or `InvalidPlatform`.
    pub fn build(address: &str, version: &str, platform: &str) -> Result<Self, LockError> {
        let addr = ProviderAddress::parse(address)?;

        if version.is_empty() {
            return Err(LockError::InvalidVersion {
                address: address.to_string(),
            });
        }

        let platform = Platform::parse(platform)?;

        Ok(Self {
            namespace: addr.namespace,
            provider_type: addr.provider_type,
            version: version.to_string(),
            os: platform.os.as_str().to_string(),
            arch: platform.arch.as_str().to_string(),
        })
    }

    /// The `os_arch` token this request targets.
    #[must_use]
    pub fn platform(&self) -> String {
        format!("{}_{}", self.os, self.arch)
    }
}
