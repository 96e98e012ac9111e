//! `SHA256SUMS` manifest parsing.
//!
//! A release publishes one manifest covering every packaged platform:
//!
//! ```text
//! 5622a0fd...  terraform-provider-dummy_3.2.1_darwin_arm64.zip
//! fc5bbdd0...  terraform-provider-dummy_3.2.1_darwin_amd64.zip
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// Prefix of a packaged-archive digest.
pub const ZH_PREFIX: &str = "zh:";

/// A malformed manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShasumsError {
    /// 1-based line number.
    pub line: usize,
    /// What was wrong with it.
    pub reason: String,
}

impl fmt::Display for ShasumsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

impl std::error::Error for ShasumsError {}

/// Manifest file name for a provider release.
#[must_use]
pub fn shasums_filename(provider_type: &str, version: &str) -> String {
    format!("terraform-provider-{provider_type}_{version}_SHA256SUMS")
}

/// Parse a manifest into a `platform -> "zh:<hex>"` map.
///
/// Only lines naming a package archive of the given provider and version
/// contribute; other files listed in the manifest are skipped.
///
/// # Errors
/// Returns an error for lines that are not `<64 hex chars><two spaces><file>`.
pub fn parse_shasums(
    content: &str,
    provider_type: &str,
    version: &str,
) -> Result<BTreeMap<String, String>, ShasumsError> {
    let prefix = format!("terraform-provider-{provider_type}_{version}_");
    let mut digests = BTreeMap::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim_end();
        if line.is_empty() {
            continue;
        }

        let Some((hex, file)) = line.split_once("  ") else {
            return Err(ShasumsError {
                line: idx + 1,
                reason: format!("expected '<sha256>  <file>', got {line:?}"),
            });
        };

        if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ShasumsError {
                line: idx + 1,
                reason: format!("invalid sha256 {hex:?}"),
            });
        }

        let platform = file
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".zip"));
        if let Some(platform) = platform {
            digests.insert(
                platform.to_string(),
                format!("{ZH_PREFIX}{}", hex.to_ascii_lowercase()),
            );
        }
    }

    Ok(digests)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DARWIN_ARM64: &str = "5622a0fd03420ed1fa83a1a6e90b65fbe34bc74c251b3b47048f14217e93b086";
    const WINDOWS_AMD64: &str = "8b75ff41191a7fe6c5d9129ed19a01eacde5a3797b48b738eefa21f5330c081e";

    #[test]
    fn test_parse_shasums() {
        let content = format!(
            "{DARWIN_ARM64}  terraform-provider-dummy_3.2.1_darwin_arm64.zip\n\
             {WINDOWS_AMD64}  terraform-provider-dummy_3.2.1_windows_amd64.zip\n\
             {WINDOWS_AMD64}  terraform-provider-dummy_3.2.1_manifest.json\n"
        );

        let digests = parse_shasums(&content, "dummy", "3.2.1").unwrap();
        assert_eq!(digests.len(), 2);
        assert_eq!(digests["darwin_arm64"], format!("zh:{DARWIN_ARM64}"));
        assert_eq!(digests["windows_amd64"], format!("zh:{WINDOWS_AMD64}"));
    }

    #[test]
    fn test_parse_shasums_skips_other_versions() {
        let content = format!("{DARWIN_ARM64}  terraform-provider-dummy_3.2.0_darwin_arm64.zip\n");
        let digests = parse_shasums(&content, "dummy", "3.2.1").unwrap();
        assert!(digests.is_empty());
    }

    #[test]
    fn test_parse_shasums_malformed_line() {
        let err = parse_shasums("not a manifest line\n", "dummy", "3.2.1").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_parse_shasums_bad_hex() {
        let err = parse_shasums(
            "xyz  terraform-provider-dummy_3.2.1_linux_amd64.zip\n",
            "dummy",
            "3.2.1",
        )
        .unwrap_err();
        assert!(err.reason.contains("invalid sha256"));
    }

    #[test]
    fn test_shasums_filename() {
        assert_eq!(
            shasums_filename("dummy", "3.2.1"),
            "terraform-provider-dummy_3.2.1_SHA256SUMS"
        );
    }
}
