//! Token acquisition service.
//!
//! Resolves requests into [`OperationParameters`](token_acquisition_sdk::OperationParameters)
//! and hands them to the orchestrator.

use std::sync::Arc;

use token_acquisition_sdk::{
    AccountResolver, AcquireTokenRequest, CompletionCallback, InteractionHandler, RunHandle,
    SilentTokenRequest, TokenAcquisitionError,
};
use tokio::runtime::Handle;
use tracing::info;

use super::orchestrator::{Collaborators, Orchestrator};
use super::parameters::{build_interactive, build_silent};
use crate::config::TokenAcquisitionConfig;
use crate::logging::Diagnostics;

pub struct Service {
    config: TokenAcquisitionConfig,
    accounts: Arc<dyn AccountResolver>,
    orchestrator: Orchestrator,
    diagnostics: Diagnostics,
}

impl Service {
    /// Creates the service. Runs are spawned on `runtime`.
    #[must_use]
    pub fn new(
        config: TokenAcquisitionConfig,
        collaborators: Collaborators,
        runtime: Handle,
    ) -> Self {
        let diagnostics = Diagnostics::new(config.logging.log_pii);
        let orchestrator = Orchestrator::new(
            collaborators.cache,
            collaborators.exchange,
            runtime,
            config.expiry_buffer(),
            diagnostics,
        );
        Self {
            config,
            accounts: collaborators.accounts,
            orchestrator,
            diagnostics,
        }
    }

    #[must_use]
    pub fn config(&self) -> &TokenAcquisitionConfig {
        &self.config
    }

    /// Builds parameters and starts an interactive run.
    ///
    /// # Errors
    ///
    /// Resolution errors from the parameter builder; `on_complete` is not
    /// invoked in that case.
    #[tracing::instrument(skip_all, fields(scopes = request.scopes.len()))]
    pub fn acquire_interactive(
        &self,
        request: &AcquireTokenRequest,
        handler: Arc<dyn InteractionHandler>,
        on_complete: CompletionCallback,
    ) -> Result<RunHandle, TokenAcquisitionError> {
        let params = build_interactive(
            request,
            &self.config,
            self.accounts.as_ref(),
            self.diagnostics,
        )?;
        info!(authority_kind = %params.authority().kind(), "Starting interactive acquisition");
        Ok(self
            .orchestrator
            .acquire_interactive(params, handler, on_complete))
    }

    /// Builds parameters and starts a silent run.
    ///
    /// # Errors
    ///
    /// Resolution errors from the parameter builder; `on_complete` is not
    /// invoked in that case.
    #[tracing::instrument(skip_all, fields(scopes = request.scopes.len(), force_refresh = request.force_refresh))]
    pub fn acquire_silent(
        &self,
        request: &SilentTokenRequest,
        on_complete: CompletionCallback,
    ) -> Result<RunHandle, TokenAcquisitionError> {
        let params = build_silent(
            request,
            &self.config,
            self.accounts.as_ref(),
            self.diagnostics,
        )?;
        info!(authority_kind = %params.authority().kind(), "Starting silent acquisition");
        Ok(self.orchestrator.acquire_silent(params, on_complete))
    }
}
