//! Provider checksum resolution.
//!
//! Provides:
//! - Parsing provider addresses and `os_arch` platform tokens
//! - Building download requests for one version and platform
//! - Reshaping downloader responses into per-version checksum records
//! - Caching resolved versions with per-version request coalescing
//! - A downloader backed by an unpacked filesystem mirror

pub mod address;
pub mod downloader;
pub mod error;
pub mod index;
pub mod mirror;
pub mod platform;
pub mod provider_version;
pub mod request;

pub use address::{ProviderAddress, LEGACY_NAMESPACE, UNKNOWN_NAMESPACE};
pub use downloader::{DownloadResponse, ProviderDownloader};
pub use error::{codes as lock_codes, DownloadError, LockError};
pub use index::{LockIndex, ProviderIndex};
pub use mirror::MirrorDownloader;
pub use platform::{Arch, Os, Platform};
pub use provider_version::{build_version_record, ProviderVersion};
pub use request::DownloadRequest;
