//! Configuration for the token acquisition module.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use serde::Deserialize;
use token_acquisition_sdk::{AuthorizationAgent, ConfigurationProvider, TokenAcquisitionError};

/// Environment variable prefix; nested keys are separated by `__`,
/// e.g. `TOKEN_ACQUISITION__LOGGING__LOG_PII=true`.
pub const ENV_PREFIX: &str = "TOKEN_ACQUISITION__";

const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com/common";

/// Application-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenAcquisitionConfig {
    /// Authority used when a request does not name one.
    pub default_authority: String,

    /// Application (client) identifier registered with the provider.
    pub client_id: Option<String>,

    /// Redirect URI registered with the provider.
    pub redirect_uri: Option<String>,

    /// Authorization agent; the platform default is used when unset.
    pub authorization_agent: Option<AuthorizationAgent>,

    /// Allow directory authorities to span national clouds.
    pub multiple_clouds_supported: bool,

    /// Cached access tokens expiring within this many seconds are refreshed.
    pub expiry_buffer_secs: u64,

    pub logging: LoggingConfig,
}

impl Default for TokenAcquisitionConfig {
    fn default() -> Self {
        Self {
            default_authority: DEFAULT_AUTHORITY.to_owned(),
            client_id: None,
            redirect_uri: None,
            authorization_agent: None,
            multiple_clouds_supported: false,
            expiry_buffer_secs: 300,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,

    /// Emit records carrying authority URIs and login hints.
    pub log_pii: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
            log_pii: false,
        }
    }
}

impl TokenAcquisitionConfig {
    /// Loads configuration from an optional YAML file, overridden by
    /// `TOKEN_ACQUISITION__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the file or environment holds values that
    /// do not deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self, TokenAcquisitionError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| TokenAcquisitionError::configuration(e.to_string()))
    }

    /// Expiry buffer as a `time` duration.
    #[must_use]
    pub fn expiry_buffer(&self) -> time::Duration {
        time::Duration::seconds(i64::try_from(self.expiry_buffer_secs).unwrap_or(i64::MAX))
    }
}

impl ConfigurationProvider for TokenAcquisitionConfig {
    fn default_authority(&self) -> &str {
        &self.default_authority
    }

    fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    fn authorization_agent(&self) -> Option<AuthorizationAgent> {
        self.authorization_agent
    }

    fn multiple_clouds_supported(&self) -> bool {
        self.multiple_clouds_supported
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let cfg = TokenAcquisitionConfig::load(None).map_err(|e| e.to_string())?;

            assert_eq!(cfg.default_authority, DEFAULT_AUTHORITY);
            assert!(cfg.client_id.is_none());
            assert_eq!(cfg.expiry_buffer_secs, 300);
            assert!(!cfg.logging.log_pii);
            Ok(())
        });
    }

    #[test]
    fn loads_yaml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "token-acquisition.yaml",
                r"
default_authority: https://login.microsoftonline.com/contoso.com
client_id: 4b0db8c2-9f26-4417-8bde-3f0e3656f8e0
redirect_uri: msauth://com.contoso.app/callback
authorization_agent: browser
multiple_clouds_supported: true
logging:
  level: debug
  log_pii: true
",
            )?;

            let cfg = TokenAcquisitionConfig::load(Some(Path::new("token-acquisition.yaml")))
                .map_err(|e| e.to_string())?;

            assert_eq!(
                cfg.default_authority,
                "https://login.microsoftonline.com/contoso.com"
            );
            assert_eq!(
                cfg.client_id.as_deref(),
                Some("4b0db8c2-9f26-4417-8bde-3f0e3656f8e0")
            );
            assert_eq!(cfg.authorization_agent, Some(AuthorizationAgent::Browser));
            assert!(cfg.multiple_clouds_supported);
            assert_eq!(cfg.logging.level, "debug");
            assert!(cfg.logging.log_pii);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("cfg.yaml", "client_id: from-file\n")?;
            jail.set_env("TOKEN_ACQUISITION__CLIENT_ID", "from-env");
            jail.set_env("TOKEN_ACQUISITION__LOGGING__JSON", "true");

            let cfg = TokenAcquisitionConfig::load(Some(Path::new("cfg.yaml")))
                .map_err(|e| e.to_string())?;

            assert_eq!(cfg.client_id.as_deref(), Some("from-env"));
            assert!(cfg.logging.json);
            Ok(())
        });
    }

    #[test]
    fn unknown_fields_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("cfg.yaml", "token_cache: memory\n")?;

            let err = TokenAcquisitionConfig::load(Some(Path::new("cfg.yaml"))).unwrap_err();
            assert!(matches!(err, TokenAcquisitionError::Configuration(_)));
            Ok(())
        });
    }

    #[test]
    fn expiry_buffer_saturates() {
        let cfg = TokenAcquisitionConfig {
            expiry_buffer_secs: u64::MAX,
            ..TokenAcquisitionConfig::default()
        };
        assert_eq!(cfg.expiry_buffer(), time::Duration::seconds(i64::MAX));
    }
}
