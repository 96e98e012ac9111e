//! Provider address parsing.
//!
//! Accepts `namespace/type` and `host/namespace/type`; the host segment is
//! discarded.

use super::error::LockError;
use std::fmt;

/// Namespace of providers installed before namespaces existed.
pub const LEGACY_NAMESPACE: &str = "-";

/// Namespace placeholder for a provider whose namespace was never resolved.
pub const UNKNOWN_NAMESPACE: &str = "?";

/// A provider address reduced to the parts the registry protocol needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderAddress {
    pub namespace: String,
    pub provider_type: String,
}

impl ProviderAddress {
    /// Parse a provider address.
    ///
    /// # Errors
    /// Returns `InvalidAddress` when the address has fewer than two or more
    /// than three segments, any segment is empty, or the namespace is a
    /// legacy/unknown placeholder.
    pub fn parse(address: &str) -> Result<Self, LockError> {
        let segments: Vec<&str> = address.split('/').collect();

        let (namespace, provider_type) = match segments.as_slice() {
            [namespace, provider_type] | [_, namespace, provider_type] => {
                (*namespace, *provider_type)
            }
            [_] => {
                return Err(LockError::invalid_address(
                    address,
                    "expected 'namespace/type' or 'host/namespace/type'",
                ))
            }
            _ => {
                return Err(LockError::invalid_address(
                    address,
                    format!("too many segments ({})", segments.len()),
                ))
            }
        };

        if segments.iter().any(|s| s.is_empty()) {
            return Err(LockError::invalid_address(address, "empty segment"));
        }

        if namespace == LEGACY_NAMESPACE {
            return Err(LockError::invalid_address(
                address,
                "legacy provider namespace is not supported",
            ));
        }

        if namespace == UNKNOWN_NAMESPACE {
            return Err(LockError::invalid_address(
                address,
                "unknown provider namespace",
            ));
        }

        Ok(Self {
            namespace: namespace.to_string(),
            provider_type: provider_type.to_string(),
        })
    }
}

impl fmt::Display for ProviderAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.provider_type)
    }
}
