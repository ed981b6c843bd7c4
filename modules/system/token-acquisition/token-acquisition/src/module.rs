//! Token acquisition module.

use std::sync::{Arc, OnceLock};

use token_acquisition_sdk::{Authority, TokenAcquisitionClient};
use tokio::runtime::Handle;
use tracing::info;

use crate::config::TokenAcquisitionConfig;
use crate::domain::{Collaborators, Service, TokenAcquisitionLocalClient};

/// Token acquisition module.
///
/// This module:
/// 1. Validates the configured default authority
/// 2. Wires the collaborators into the service
/// 3. Hands out the in-process [`TokenAcquisitionClient`]
///
/// The module is initialized once; runs execute on the supplied runtime
/// handle.
#[derive(Default)]
pub struct TokenAcquisitionModule {
    service: OnceLock<Arc<Service>>,
}

impl TokenAcquisitionModule {
    /// Initializes the module and returns the client.
    ///
    /// # Errors
    ///
    /// Fails if the default authority is malformed or the module was
    /// already initialized.
    #[tracing::instrument(skip_all, fields(client_id))]
    pub fn init(
        &self,
        cfg: TokenAcquisitionConfig,
        collaborators: Collaborators,
        runtime: Handle,
    ) -> anyhow::Result<Arc<dyn TokenAcquisitionClient>> {
        if let Some(client_id) = cfg.client_id.as_deref() {
            tracing::Span::current().record("client_id", client_id);
        }
        let authority = Authority::parse(&cfg.default_authority)
            .map_err(|e| anyhow::anyhow!("invalid default authority: {e}"))?;
        info!(
            authority_kind = %authority.kind(),
            multiple_clouds_supported = cfg.multiple_clouds_supported,
            "Initializing token_acquisition"
        );

        let svc = Arc::new(Service::new(cfg, collaborators, runtime));
        self.service
            .set(Arc::clone(&svc))
            .map_err(|_| anyhow::anyhow!("Service already initialized"))?;

        Ok(Arc::new(TokenAcquisitionLocalClient::new(svc)))
    }

    /// The service, once initialized.
    #[must_use]
    pub fn service(&self) -> Option<&Arc<Service>> {
        self.service.get()
    }
}
