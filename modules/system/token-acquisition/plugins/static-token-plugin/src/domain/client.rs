//! Collaborator implementations for the static token plugin.
//!
//! Implements `AccountResolver`, `TokenCache` and `TokenExchange` using the
//! domain service.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use token_acquisition_sdk::{
    Account, AccountLookupError, AccountResolver, Authority, CacheError, CodeExchangeRequest,
    ExchangeError, RefreshRequest, Token, TokenCache, TokenExchange,
};

use super::service::Service;

impl AccountResolver for Service {
    fn lookup(
        &self,
        _client_id: &str,
        environment: Option<&str>,
        home_account_id: &str,
    ) -> Result<Account, AccountLookupError> {
        self.account(home_account_id)
            .filter(|a| environment.is_none_or(|env| a.environment == env))
            .cloned()
            .ok_or_else(|| AccountLookupError::NotFound {
                home_account_id: home_account_id.to_owned(),
            })
    }
}

#[async_trait]
impl TokenCache for Service {
    async fn get_cached(
        &self,
        account: &Account,
        authority: &Authority,
        scopes: &[String],
    ) -> Result<Option<Token>, CacheError> {
        Ok(self.cached(&account.home_account_id, authority.as_str(), scopes))
    }

    async fn get_refresh_token(
        &self,
        account: &Account,
        authority: &Authority,
    ) -> Result<Option<SecretString>, CacheError> {
        Ok(self.refresh_token_for(&account.home_account_id, authority.as_str()))
    }

    async fn store(
        &self,
        account: &Account,
        authority: &Authority,
        token: &Token,
    ) -> Result<(), CacheError> {
        self.insert(&account.home_account_id, authority.as_str(), token);
        Ok(())
    }
}

#[async_trait]
impl TokenExchange for Service {
    async fn exchange_code(&self, request: &CodeExchangeRequest) -> Result<Token, ExchangeError> {
        self.redeem_code(request.code.expose_secret(), &request.scopes)
    }

    async fn refresh(&self, request: &RefreshRequest) -> Result<Token, ExchangeError> {
        self.redeem_refresh(request.refresh_token.expose_secret(), &request.scopes)
    }
}
