//! Configuration for the static token plugin.

use serde::Deserialize;
use token_acquisition_sdk::Account;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticTokenPluginConfig {
    /// Exchange behavior.
    pub mode: ExchangeMode,

    /// Known accounts, served by the account resolver.
    pub accounts: Vec<Account>,

    /// Authorization codes accepted by the exchange.
    pub codes: Vec<CodeMapping>,

    /// Lifetime of issued access tokens.
    pub token_lifetime_secs: u64,

    /// Issue a refresh token alongside every access token.
    pub issue_refresh_tokens: bool,
}

impl Default for StaticTokenPluginConfig {
    fn default() -> Self {
        Self {
            mode: ExchangeMode::Issue,
            accounts: Vec::new(),
            codes: Vec::new(),
            token_lifetime_secs: 3600,
            issue_refresh_tokens: true,
        }
    }
}

/// Exchange behavior.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeMode {
    /// Redeem known codes and refresh tokens.
    #[default]
    Issue,
    /// Reject every redemption with `invalid_grant`.
    Deny,
    /// Fail every redemption as unreachable.
    Offline,
}

/// Maps an authorization code to the account it signs in.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodeMapping {
    pub code: String,
    pub home_account_id: String,
}
