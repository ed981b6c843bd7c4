//! Error types for the token acquisition module.

use thiserror::Error;

/// Errors that can occur when acquiring a token.
///
/// Resolution-time variants (`InvalidAuthority`, `Configuration`,
/// `AccountResolution`) are returned directly by the acquire calls.
/// All other variants only ever reach the caller through
/// [`AcquisitionResult::Failed`](crate::AcquisitionResult::Failed).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenAcquisitionError {
    /// The authority URL is malformed or matches no known provider.
    #[error("invalid authority '{authority}': {reason}")]
    InvalidAuthority { authority: String, reason: String },

    /// A required application-level setting is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The account supplied with the request could not be resolved.
    #[error("account resolution failed for '{home_account_id}': {reason}")]
    AccountResolution {
        home_account_id: String,
        reason: String,
    },

    /// The operation parameters cannot be used for an acquisition run.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The user abandoned the interactive flow.
    #[error("user cancelled the operation")]
    UserCancelled,

    /// Transient transport failure talking to the identity provider.
    #[error("network error: {0}")]
    Network(String),

    /// The identity provider refused the authorization or token request.
    #[error("provider denied the request: {error}")]
    ProviderDenied {
        error: String,
        description: Option<String>,
    },

    /// No usable refresh token; the caller has to fall back to an interactive run.
    #[error("interaction required: {0}")]
    InteractionRequired(String),

    /// A completion gate was signalled more than once.
    #[error("completion was already signalled")]
    DoubleSignal,

    /// An internal invariant was broken.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TokenAcquisitionError {
    pub fn invalid_authority(authority: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAuthority {
            authority: authority.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Whether retrying the same request later may succeed.
    ///
    /// Only transport failures qualify; cancellation and provider denials are final.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
