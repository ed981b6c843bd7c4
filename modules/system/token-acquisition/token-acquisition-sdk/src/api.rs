//! Public API trait for token acquisition.
//!
//! Consumers hold a `dyn TokenAcquisitionClient`; the module provides the
//! in-process implementation.

use std::sync::Arc;

use crate::error::TokenAcquisitionError;
use crate::interaction::InteractionHandler;
use crate::models::{AcquisitionResult, RunHandle};
use crate::request::{AcquireTokenRequest, SilentTokenRequest};

/// Completion sink for one acquisition run.
pub type CompletionCallback = Box<dyn FnOnce(AcquisitionResult) + Send + 'static>;

/// Public API trait for token acquisition.
///
/// ```ignore
/// let run = client.acquire_silent(
///     SilentTokenRequest::new(account, vec!["user.read".to_owned()]),
///     Box::new(|result| tracing::info!(kind = ?result.kind(), "done")),
/// )?;
/// ```
///
/// Both methods return without waiting for the run to finish. When they
/// return `Ok`, `on_complete` is invoked exactly once; when they return
/// `Err`, it is never invoked.
pub trait TokenAcquisitionClient: Send + Sync {
    /// Starts an interactive acquisition.
    ///
    /// # Errors
    ///
    /// - `InvalidAuthority` if the request names a malformed authority
    /// - `Configuration` if client id or redirect uri are not configured
    /// - `AccountResolution` if the request's account is unknown
    fn acquire_interactive(
        &self,
        request: AcquireTokenRequest,
        handler: Arc<dyn InteractionHandler>,
        on_complete: CompletionCallback,
    ) -> Result<RunHandle, TokenAcquisitionError>;

    /// Starts a silent acquisition.
    ///
    /// # Errors
    ///
    /// Same resolution errors as [`acquire_interactive`](Self::acquire_interactive).
    fn acquire_silent(
        &self,
        request: SilentTokenRequest,
        on_complete: CompletionCallback,
    ) -> Result<RunHandle, TokenAcquisitionError>;
}
