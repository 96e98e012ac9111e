#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod error;
pub mod lock;
pub mod release;
pub mod version;

pub use config::Config;
pub use error::Error;
pub use lock::{
    LockError, LockIndex, MirrorDownloader, ProviderDownloader, ProviderIndex, ProviderVersion,
};
pub use release::{strip_version_prefix, GitLabConfig, GitLabRelease, LatestRelease, ReleaseError};
pub use version::VERSION;
