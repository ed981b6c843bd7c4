//! Collaborator traits consumed by the orchestrator.
//!
//! Plugins implement these to provide configuration, account lookup,
//! token caching and the network exchange with the identity provider.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use crate::authority::Authority;
use crate::error::TokenAcquisitionError;
use crate::models::{Account, AuthorizationAgent, Token};

/// Application-level settings.
pub trait ConfigurationProvider: Send + Sync {
    /// Authority URL used when a request does not name one.
    fn default_authority(&self) -> &str;

    fn client_id(&self) -> Option<&str>;

    fn redirect_uri(&self) -> Option<&str>;

    fn authorization_agent(&self) -> Option<AuthorizationAgent>;

    /// Applied to directory authorities only.
    fn multiple_clouds_supported(&self) -> bool;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountLookupError {
    #[error("no account with home account id '{home_account_id}'")]
    NotFound { home_account_id: String },

    #[error("account store unavailable: {0}")]
    Unavailable(String),
}

/// Looks up previously signed-in accounts.
pub trait AccountResolver: Send + Sync {
    /// Finds the account for `home_account_id`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no such account is known
    /// - `Unavailable` if the backing store cannot be read
    fn lookup(
        &self,
        client_id: &str,
        environment: Option<&str>,
        home_account_id: &str,
    ) -> Result<Account, AccountLookupError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("token cache unavailable: {0}")]
pub struct CacheError(pub String);

/// Token cache. Implementations serialize concurrent access for the same
/// account and authority.
#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Returns a cached token covering all `scopes`, expired or not.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cache cannot be read.
    async fn get_cached(
        &self,
        account: &Account,
        authority: &Authority,
        scopes: &[String],
    ) -> Result<Option<Token>, CacheError>;

    /// Returns the most recent refresh token for the account and authority,
    /// whatever scopes it was issued with.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cache cannot be read.
    async fn get_refresh_token(
        &self,
        account: &Account,
        authority: &Authority,
    ) -> Result<Option<SecretString>, CacheError>;

    /// Stores `token` for the account and authority.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the cache cannot be written.
    async fn store(
        &self,
        account: &Account,
        authority: &Authority,
        token: &Token,
    ) -> Result<(), CacheError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExchangeError {
    /// The provider could not be reached or answered garbage.
    #[error("network failure: {0}")]
    Network(String),

    /// The provider answered with an OAuth error.
    #[error("provider denied the request: {error}")]
    Denied {
        error: String,
        description: Option<String>,
    },
}

impl From<ExchangeError> for TokenAcquisitionError {
    fn from(e: ExchangeError) -> Self {
        match e {
            ExchangeError::Network(msg) => Self::Network(msg),
            ExchangeError::Denied { error, description } => {
                Self::ProviderDenied { error, description }
            }
        }
    }
}

/// Authorization-code redemption request.
#[derive(Debug, Clone)]
pub struct CodeExchangeRequest {
    pub authority: Authority,
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub code: SecretString,
}

/// Refresh-token redemption request.
#[derive(Debug, Clone)]
pub struct RefreshRequest {
    pub authority: Authority,
    pub client_id: String,
    pub account: Account,
    pub scopes: Vec<String>,
    pub refresh_token: SecretString,
}

/// Network exchange with the identity provider.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Redeems an authorization code.
    ///
    /// # Errors
    ///
    /// - `Network` on transport failure
    /// - `Denied` if the provider rejects the code
    async fn exchange_code(&self, request: &CodeExchangeRequest) -> Result<Token, ExchangeError>;

    /// Redeems a refresh token.
    ///
    /// # Errors
    ///
    /// - `Network` on transport failure
    /// - `Denied` if the provider rejects the refresh token
    async fn refresh(&self, request: &RefreshRequest) -> Result<Token, ExchangeError>;
}
