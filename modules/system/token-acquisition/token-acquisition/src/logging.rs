//! Tracing setup.
//!
//! Records are split into two channels:
//! - the standard channel, using module targets (`token_acquisition::...`)
//! - the sensitive channel, target [`PII_TARGET`], carrying authority URIs
//!   and login hints
//!
//! The sensitive channel is emitted only when `log_pii` is enabled and can
//! be switched off independently with an `EnvFilter` directive.

use token_acquisition_sdk::TokenAcquisitionError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Target of sensitive diagnostic records.
pub const PII_TARGET: &str = "token_acquisition::pii";

/// Builds the filter: `RUST_LOG` if set, otherwise `cfg.level`. The PII
/// target is forced off unless `cfg.log_pii` is set.
///
/// # Errors
///
/// Returns `Configuration` if `cfg.level` is not a valid directive.
pub fn env_filter(cfg: &LoggingConfig) -> Result<EnvFilter, TokenAcquisitionError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cfg.level).map_err(|e| {
            TokenAcquisitionError::configuration(format!(
                "invalid log level '{}': {e}",
                cfg.level
            ))
        })?,
    };

    if cfg.log_pii {
        return Ok(filter);
    }
    let directive = format!("{PII_TARGET}=off")
        .parse()
        .map_err(|e| TokenAcquisitionError::configuration(format!("invalid directive: {e}")))?;
    Ok(filter.add_directive(directive))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns `Configuration` if the filter is invalid or a global subscriber
/// is already installed.
pub fn init(cfg: &LoggingConfig) -> Result<(), TokenAcquisitionError> {
    let registry = tracing_subscriber::registry().with(env_filter(cfg)?);
    let installed = if cfg.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    installed.map_err(|e| TokenAcquisitionError::configuration(e.to_string()))
}

/// Source-side switch for the sensitive channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics {
    log_pii: bool,
}

impl Diagnostics {
    #[must_use]
    pub fn new(log_pii: bool) -> Self {
        Self { log_pii }
    }

    #[must_use]
    pub fn log_pii(self) -> bool {
        self.log_pii
    }
}

/// Emits a debug record on the sensitive channel when PII logging is on.
macro_rules! pii {
    ($diagnostics:expr, $($arg:tt)+) => {
        if $diagnostics.log_pii() {
            ::tracing::debug!(target: $crate::logging::PII_TARGET, $($arg)+);
        }
    };
}

pub(crate) use pii;
