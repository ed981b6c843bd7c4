//! Authority resolution.

use token_acquisition_sdk::{Authority, ConfigurationProvider, TokenAcquisitionError};
use tracing::debug;

use crate::logging::{Diagnostics, pii};

/// Resolves the authority for a request.
///
/// An absent or blank `explicit` authority falls back to the configured
/// default. The configuration's multi-cloud flag is then applied to
/// directory authorities, whichever branch produced them.
///
/// # Errors
///
/// - `InvalidAuthority` if `explicit` is malformed
/// - `Configuration` if the configured default authority is malformed
pub fn resolve_authority(
    explicit: Option<&str>,
    config: &dyn ConfigurationProvider,
    diagnostics: Diagnostics,
) -> Result<Authority, TokenAcquisitionError> {
    let base = match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Authority::parse(raw)?,
        None => Authority::parse(config.default_authority()).map_err(|e| {
            TokenAcquisitionError::configuration(format!("default authority is unusable: {e}"))
        })?,
    };

    let authority = apply_multiple_clouds(base, config.multiple_clouds_supported());
    pii!(diagnostics, authority = %authority, "Using authority");
    Ok(authority)
}

fn apply_multiple_clouds(authority: Authority, supported: bool) -> Authority {
    match authority {
        Authority::Directory(aad) => {
            Authority::Directory(aad.with_multiple_clouds_supported(supported))
        }
        other @ (Authority::B2C(_) | Authority::Adfs(_)) => {
            if supported {
                debug!(kind = %other.kind(), "multiple clouds flag ignored for this authority kind");
            }
            other
        }
    }
}
