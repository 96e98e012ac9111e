//! Version index: resolves provider versions once per process and caches them.
//!
//! Concurrent resolutions of the same version are coalesced onto a single
//! in-flight download sequence; the other callers wait for its outcome.
//! Resolutions of different versions never wait on each other.

use super::address::ProviderAddress;
use super::downloader::ProviderDownloader;
use super::error::LockError;
use super::provider_version::{build_version_record, ProviderVersion};
use super::request::DownloadRequest;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Outcome published to coalesced waiters. `None` until the leader finishes.
type Outcome = Option<Result<ProviderVersion, LockError>>;

enum Slot {
    Ready(ProviderVersion),
    InFlight(watch::Receiver<Outcome>),
}

enum Claim {
    Hit(ProviderVersion),
    Wait(watch::Receiver<Outcome>),
    Lead(watch::Sender<Outcome>),
}

/// Cache of resolved versions for one provider address.
///
/// A version is resolved against the platform set of its first successful
/// resolution; later calls return that record whatever platforms they ask for.
pub struct ProviderIndex {
    address: String,
    downloader: Arc<dyn ProviderDownloader>,
    versions: Mutex<HashMap<String, Slot>>,
}

impl std::fmt::Debug for ProviderIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderIndex")
            .field("address", &self.address)
            .field("cached", &self.cached_versions().len())
            .finish_non_exhaustive()
    }
}

impl ProviderIndex {
    /// Create an empty index for `address`.
    pub fn new(address: impl Into<String>, downloader: Arc<dyn ProviderDownloader>) -> Self {
        Self {
            address: address.into(),
            downloader,
            versions: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The cached record for `version`, if a resolution has completed.
    #[must_use]
    pub fn get(&self, version: &str) -> Option<ProviderVersion> {
        match self.lock_versions().get(version) {
            Some(Slot::Ready(pv)) => Some(pv.clone()),
            _ => None,
        }
    }

    /// Versions with a completed resolution, sorted.
    #[must_use]
    pub fn cached_versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self
            .lock_versions()
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Ready(_)))
            .map(|(v, _)| v.clone())
            .collect();
        versions.sort();
        versions
    }

    /// Resolve `version` across `platforms`, downloading only on a cache miss.
    ///
    /// Request validation (address, version, every platform, duplicates)
    /// happens before the cache is consulted. On a miss the platforms are
    /// downloaded in order and folded into one record, which is cached only
    /// if every platform succeeded.
    ///
    /// # Errors
    /// Returns the first error encountered. Cancellation of `cancel`, or of a
    /// concurrent caller leading the same version, yields `Cancelled`.
    pub async fn resolve(
        &self,
        version: &str,
        platforms: &[String],
        cancel: &CancellationToken,
    ) -> Result<ProviderVersion, LockError> {
        let requests = self.prepare(version, platforms)?;

        match self.claim(version) {
            Claim::Hit(pv) => {
                debug!(address = %self.address, version, "provider version cache hit");
                Ok(pv)
            }
            Claim::Wait(rx) => {
                debug!(address = %self.address, version, "waiting for in-flight resolution");
                self.wait(version, rx, cancel).await
            }
            Claim::Lead(tx) => {
                debug!(address = %self.address, version, "provider version cache miss");
                let guard = InFlight {
                    index: self,
                    version,
                    tx: Some(tx),
                };
                let outcome = tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(LockError::cancelled(&self.address, version)),
                    res = self.fetch(version, &requests) => res,
                };
                guard.complete(&outcome);
                outcome
            }
        }
    }

    /// Look up `version`, marking it in flight on a miss.
    fn claim(&self, version: &str) -> Claim {
        let mut versions = self.lock_versions();
        match versions.get(version) {
            Some(Slot::Ready(pv)) => Claim::Hit(pv.clone()),
            Some(Slot::InFlight(rx)) => Claim::Wait(rx.clone()),
            None => {
                let (tx, rx) = watch::channel(None);
                versions.insert(version.to_string(), Slot::InFlight(rx));
                Claim::Lead(tx)
            }
        }
    }

    fn prepare(
        &self,
        version: &str,
        platforms: &[String],
    ) -> Result<Vec<DownloadRequest>, LockError> {
        if platforms.is_empty() {
            ProviderAddress::parse(&self.address)?;
            if version.is_empty() {
                return Err(LockError::InvalidVersion {
                    address: self.address.clone(),
                });
            }
            return Err(LockError::invalid_platform("", "no platforms requested"));
        }

        let mut seen = HashSet::new();
        let mut requests = Vec::with_capacity(platforms.len());
        for platform in platforms {
            let req = DownloadRequest::build(&self.address, version, platform)?;
            if !seen.insert(platform.as_str()) {
                return Err(LockError::DuplicatePlatform {
                    address: self.address.clone(),
                    version: version.to_string(),
                    platform: platform.clone(),
                });
            }
            requests.push(req);
        }
        Ok(requests)
    }

    async fn fetch(
        &self,
        version: &str,
        requests: &[DownloadRequest],
    ) -> Result<ProviderVersion, LockError> {
        let mut aggregate = ProviderVersion::empty(&self.address, version);

        for req in requests {
            let platform = req.platform();
            debug!(address = %self.address, version, %platform, "downloading provider package");

            let response = self
                .downloader
                .download(req)
                .await
                .map_err(|e| LockError::Download {
                    address: self.address.clone(),
                    version: version.to_string(),
                    platform: platform.clone(),
                    source: Arc::new(e),
                })?;

            let record = build_version_record(&self.address, version, &platform, response)?;
            aggregate.merge(record)?;
        }

        Ok(aggregate)
    }

    async fn wait(
        &self,
        version: &str,
        mut rx: watch::Receiver<Outcome>,
        cancel: &CancellationToken,
    ) -> Result<ProviderVersion, LockError> {
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(LockError::cancelled(&self.address, version)),
            res = async { rx.wait_for(Option::is_some).await.map(|outcome| (*outcome).clone()) } => res,
        };

        match outcome {
            Ok(Some(result)) => result,
            // The leader vanished without publishing an outcome.
            _ => Err(LockError::cancelled(&self.address, version)),
        }
    }

    fn lock_versions(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.versions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Ownership of an in-flight slot.
///
/// Completing it caches a success or clears a failure; dropping it
/// uncompleted (the leading future was dropped) clears the slot and tells
/// waiters the resolution was cancelled.
struct InFlight<'a> {
    index: &'a ProviderIndex,
    version: &'a str,
    tx: Option<watch::Sender<Outcome>>,
}

impl InFlight<'_> {
    fn complete(mut self, outcome: &Result<ProviderVersion, LockError>) {
        {
            let mut versions = self.index.lock_versions();
            match outcome {
                Ok(pv) => {
                    versions.insert(self.version.to_string(), Slot::Ready(pv.clone()));
                }
                Err(err) => {
                    versions.remove(self.version);
                    warn!(
                        address = %self.index.address,
                        version = self.version,
                        code = err.code(),
                        "discarding partial provider version"
                    );
                }
            }
        }

        if let Some(tx) = self.tx.take() {
            tx.send_replace(Some(outcome.clone()));
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let Some(tx) = self.tx.take() else {
            return;
        };

        self.index.lock_versions().remove(self.version);
        warn!(
            address = %self.index.address,
            version = self.version,
            "in-flight resolution dropped"
        );
        tx.send_replace(Some(Err(LockError::cancelled(
            &self.index.address,
            self.version,
        ))));
    }
}

/// Provider indexes for every address resolved during a run.
pub struct LockIndex {
    downloader: Arc<dyn ProviderDownloader>,
    providers: Mutex<HashMap<String, Arc<ProviderIndex>>>,
}

impl std::fmt::Debug for LockIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockIndex")
            .field("providers", &self.addresses())
            .finish_non_exhaustive()
    }
}

impl LockIndex {
    /// Create an empty index that downloads through `downloader`.
    pub fn new(downloader: Arc<dyn ProviderDownloader>) -> Self {
        Self {
            downloader,
            providers: Mutex::new(HashMap::new()),
        }
    }

    /// The index for `address`, created on first use.
    ///
    /// Indexes are keyed by `namespace/type`, so an address with and without
    /// its host segment share one index.
    ///
    /// # Errors
    /// Returns `InvalidAddress` without creating an index.
    pub fn provider(&self, address: &str) -> Result<Arc<ProviderIndex>, LockError> {
        let key = ProviderAddress::parse(address)?.to_string();

        let mut providers = self
            .providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let index = providers.entry(key).or_insert_with_key(|key| {
            Arc::new(ProviderIndex::new(key.as_str(), Arc::clone(&self.downloader)))
        });
        Ok(Arc::clone(index))
    }

    /// Normalized addresses with an index, sorted.
    #[must_use]
    pub fn addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self
            .providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        addresses.sort();
        addresses
    }

    /// Resolve `version` of the provider at `address`.
    ///
    /// # Errors
    /// See [`ProviderIndex::resolve`].
    pub async fn resolve(
        &self,
        address: &str,
        version: &str,
        platforms: &[String],
        cancel: &CancellationToken,
    ) -> Result<ProviderVersion, LockError> {
        let index = self.provider(address)?;
        index.resolve(version, platforms, cancel).await
    }
}
