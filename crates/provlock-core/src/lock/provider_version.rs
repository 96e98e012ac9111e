//! Per-version checksum records.

use super::downloader::DownloadResponse;
use super::error::LockError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Checksums of one provider version across the platforms resolved for it.
///
/// `platforms` and the keys of `h1_hashes` always name the same set.
/// `zh_hashes` is the upstream shared digest set, copied verbatim, and may
/// cover platforms that were never requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderVersion {
    address: String,
    version: String,
    platforms: Vec<String>,
    h1_hashes: BTreeMap<String, String>,
    zh_hashes: BTreeMap<String, String>,
}

impl ProviderVersion {
    /// An aggregate with no platforms yet.
    pub(crate) fn empty(address: &str, version: &str) -> Self {
        Self {
            address: address.to_string(),
            version: version.to_string(),
            platforms: Vec::new(),
            h1_hashes: BTreeMap::new(),
            zh_hashes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Platforms in the order they were requested.
    #[must_use]
    pub fn platforms(&self) -> &[String] {
        &self.platforms
    }

    #[must_use]
    pub fn h1_hashes(&self) -> &BTreeMap<String, String> {
        &self.h1_hashes
    }

    #[must_use]
    pub fn zh_hashes(&self) -> &BTreeMap<String, String> {
        &self.zh_hashes
    }

    /// Fold a single-platform record into this aggregate.
    ///
    /// The first merged record supplies the shared digest set; every later
    /// one must carry an identical set.
    pub(crate) fn merge(&mut self, mut record: ProviderVersion) -> Result<(), LockError> {
        let first = record.platforms.first().cloned().unwrap_or_default();

        if let Some(dup) = record
            .platforms
            .iter()
            .find(|p| self.h1_hashes.contains_key(*p))
        {
            return Err(LockError::DuplicatePlatform {
                address: self.address.clone(),
                version: self.version.clone(),
                platform: dup.clone(),
            });
        }

        if self.platforms.is_empty() {
            self.zh_hashes = std::mem::take(&mut record.zh_hashes);
        } else if self.zh_hashes != record.zh_hashes {
            return Err(LockError::DigestSetMismatch {
                address: self.address.clone(),
                version: self.version.clone(),
                platform: first,
            });
        }

        self.platforms.append(&mut record.platforms);
        self.h1_hashes.append(&mut record.h1_hashes);
        Ok(())
    }
}

/// Build a record scoped to one platform from a downloader response.
///
/// # Errors
/// Returns `MissingDigest` if the response has no `h1` digest, or its shared
/// digest set has no entry for `platform`.
pub fn build_version_record(
    address: &str,
    version: &str,
    platform: &str,
    response: DownloadResponse,
) -> Result<ProviderVersion, LockError> {
    let missing = |kind| LockError::MissingDigest {
        address: address.to_string(),
        version: version.to_string(),
        platform: platform.to_string(),
        kind,
    };

    let h1 = response
        .h1_digest
        .filter(|d| !d.is_empty())
        .ok_or_else(|| missing("h1"))?;

    if !response.zh_digests.contains_key(platform) {
        return Err(missing("zh"));
    }

    Ok(ProviderVersion {
        address: address.to_string(),
        version: version.to_string(),
        platforms: vec![platform.to_string()],
        h1_hashes: BTreeMap::from([(platform.to_string(), h1)]),
        zh_hashes: response.zh_digests,
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_build_version_record() {
        let got =
            build_version_record(ADDRESS, VERSION, "darwin_arm64", response("darwin_arm64"))
                .unwrap();

        assert_eq!(got.address(), ADDRESS);
        assert_eq!(got.version(), VERSION);
        assert_eq!(got.platforms(), ["darwin_arm64"]);
        assert_eq!(
            got.h1_hashes(),
            &BTreeMap::from([("darwin_arm64".to_string(), h1("darwin_arm64").to_string())])
        );
        // The shared set is kept whole, including platforms never requested.
        assert_eq!(got.zh_hashes(), &zh_set());
        assert!(got.zh_hashes().contains_key("windows_amd64"));
    }

    #[test]
    fn test_build_version_record_missing_h1() {
        let res = DownloadResponse {
            h1_digest: None,
            zh_digests: zh_set(),
        };
        let err = build_version_record(ADDRESS, VERSION, "darwin_arm64", res).unwrap_err();
        assert!(matches!(err, LockError::MissingDigest { kind: "h1", .. }));
    }

    #[test]
    fn test_build_version_record_missing_zh_for_platform() {
        let res = DownloadResponse {
            h1_digest: Some(h1("linux_amd64").to_string()),
            zh_digests: BTreeMap::new(),
        };
        let err = build_version_record(ADDRESS, VERSION, "linux_amd64", res).unwrap_err();
        assert!(matches!(err, LockError::MissingDigest { kind: "zh", .. }));
    }

    #[test]
    fn test_merge_keeps_order_and_h1() {
        let mut agg = ProviderVersion::empty(ADDRESS, VERSION);
        for platform in ["linux_amd64", "darwin_arm64"] {
            let record =
                build_version_record(ADDRESS, VERSION, platform, response(platform)).unwrap();
            agg.merge(record).unwrap();
        }

        assert_eq!(agg.platforms(), ["linux_amd64", "darwin_arm64"]);
        assert_eq!(agg.h1_hashes().len(), 2);
        assert_eq!(agg.zh_hashes(), &zh_set());
    }

    #[test]
    fn test_merge_digest_set_mismatch() {
        let mut agg = ProviderVersion::empty(ADDRESS, VERSION);
        agg.merge(
            build_version_record(ADDRESS, VERSION, "darwin_arm64", response("darwin_arm64"))
                .unwrap(),
        )
        .unwrap();

        let mut changed = response("linux_amd64");
        changed
            .zh_digests
            .insert("linux_arm64".to_string(), "zh:00".to_string());
        let record = build_version_record(ADDRESS, VERSION, "linux_amd64", changed).unwrap();

        let err = agg.merge(record).unwrap_err();
        assert!(matches!(err, LockError::DigestSetMismatch { .. }));
        assert_eq!(agg.platforms(), ["darwin_arm64"]);
    }

    #[test]
    fn test_serialize() {
        let record =
            build_version_record(ADDRESS, VERSION, "darwin_arm64", response("darwin_arm64"))
                .unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["version"], VERSION);
        assert_eq!(json["platforms"][0], "darwin_arm64");
        assert_eq!(json["h1_hashes"]["darwin_arm64"], h1("darwin_arm64"));
    }
}
