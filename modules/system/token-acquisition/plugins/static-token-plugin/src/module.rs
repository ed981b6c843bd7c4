//! Static token plugin module.

use std::sync::{Arc, OnceLock};

use tracing::info;

use crate::config::{ExchangeMode, StaticTokenPluginConfig};
use crate::domain::Service;

/// Static token plugin module.
///
/// The returned service implements every collaborator role and can be
/// wired in one go with `Collaborators::from_shared`.
#[derive(Default)]
pub struct StaticTokenPlugin {
    service: OnceLock<Arc<Service>>,
}

impl StaticTokenPlugin {
    /// Initializes the plugin from configuration.
    ///
    /// # Errors
    ///
    /// Fails if the plugin was already initialized.
    pub fn init(&self, cfg: &StaticTokenPluginConfig) -> anyhow::Result<Arc<Service>> {
        info!("Initializing static_token_plugin");
        if cfg.mode != ExchangeMode::Issue {
            tracing::warn!(
                mode = ?cfg.mode,
                "Static token plugin will not issue tokens in this mode"
            );
        }
        info!(
            mode = ?cfg.mode,
            account_count = cfg.accounts.len(),
            code_count = cfg.codes.len(),
            "Loaded plugin configuration"
        );

        let service = Arc::new(Service::from_config(cfg));
        self.service
            .set(Arc::clone(&service))
            .map_err(|_| anyhow::anyhow!("Service already initialized"))?;

        Ok(service)
    }

    #[must_use]
    pub fn service(&self) -> Option<&Arc<Service>> {
        self.service.get()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails() {
        let plugin = StaticTokenPlugin::default();
        let cfg = StaticTokenPluginConfig::default();

        assert!(plugin.init(&cfg).is_ok());
        assert!(plugin.service().is_some());
        assert!(plugin.init(&cfg).is_err());
    }
}
