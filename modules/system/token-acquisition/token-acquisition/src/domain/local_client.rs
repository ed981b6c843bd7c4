//! Local (in-process) client for token acquisition.

use std::sync::Arc;

use token_acquisition_sdk::{
    AcquireTokenRequest, CompletionCallback, InteractionHandler, RunHandle, SilentTokenRequest,
    TokenAcquisitionClient, TokenAcquisitionError,
};

use super::Service;

/// Local client wrapping the service.
///
/// Handed out by the module during `init()`.
pub struct TokenAcquisitionLocalClient {
    svc: Arc<Service>,
}

impl TokenAcquisitionLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_error(op: &str, e: TokenAcquisitionError) -> TokenAcquisitionError {
    tracing::error!(operation = op, error = ?e, "token_acquisition call failed");
    e
}

impl TokenAcquisitionClient for TokenAcquisitionLocalClient {
    fn acquire_interactive(
        &self,
        request: AcquireTokenRequest,
        handler: Arc<dyn InteractionHandler>,
        on_complete: CompletionCallback,
    ) -> Result<RunHandle, TokenAcquisitionError> {
        self.svc
            .acquire_interactive(&request, handler, on_complete)
            .map_err(|e| log_error("acquire_interactive", e))
    }

    fn acquire_silent(
        &self,
        request: SilentTokenRequest,
        on_complete: CompletionCallback,
    ) -> Result<RunHandle, TokenAcquisitionError> {
        self.svc
            .acquire_silent(&request, on_complete)
            .map_err(|e| log_error("acquire_silent", e))
    }
}
