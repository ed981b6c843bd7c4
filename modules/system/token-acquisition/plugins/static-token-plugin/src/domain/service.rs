//! Service implementation for the static token plugin.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use time::OffsetDateTime;
use token_acquisition_sdk::{Account, ExchangeError, Token};
use uuid::Uuid;

use crate::config::{ExchangeMode, StaticTokenPluginConfig};

type CacheKey = (String, String);

/// In-memory accounts, token cache and exchange.
///
/// Cache entries are keyed by home account id and canonical authority URI.
/// A stored token replaces any entry with the same scope set; concurrent
/// writers are serialized by the lock and the last one wins.
pub struct Service {
    mode: ExchangeMode,
    token_lifetime: time::Duration,
    issue_refresh_tokens: bool,
    accounts: HashMap<String, Account>,
    codes: HashMap<String, String>,
    cache: RwLock<HashMap<CacheKey, Vec<Token>>>,
    refresh_tokens: RwLock<HashMap<String, String>>,
    latest_refresh: RwLock<HashMap<CacheKey, SecretString>>,
    exchanges: AtomicUsize,
}

impl Service {
    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticTokenPluginConfig) -> Self {
        let accounts = cfg
            .accounts
            .iter()
            .map(|a| (a.home_account_id.clone(), a.clone()))
            .collect();
        let codes = cfg
            .codes
            .iter()
            .map(|m| (m.code.clone(), m.home_account_id.clone()))
            .collect();

        Self {
            mode: cfg.mode,
            token_lifetime: time::Duration::seconds(
                i64::try_from(cfg.token_lifetime_secs).unwrap_or(i64::MAX),
            ),
            issue_refresh_tokens: cfg.issue_refresh_tokens,
            accounts,
            codes,
            cache: RwLock::new(HashMap::new()),
            refresh_tokens: RwLock::new(HashMap::new()),
            latest_refresh: RwLock::new(HashMap::new()),
            exchanges: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn account(&self, home_account_id: &str) -> Option<&Account> {
        self.accounts.get(home_account_id)
    }

    /// Returns a cached token whose granted scopes cover `scopes`.
    #[must_use]
    pub fn cached(&self, home_account_id: &str, authority: &str, scopes: &[String]) -> Option<Token> {
        let cache = self.cache.read();
        cache
            .get(&key(home_account_id, authority))?
            .iter()
            .find(|token| scopes.iter().all(|s| token.scopes.contains(s)))
            .cloned()
    }

    /// Most recent refresh token stored for the account and authority.
    #[must_use]
    pub fn refresh_token_for(&self, home_account_id: &str, authority: &str) -> Option<SecretString> {
        self.latest_refresh
            .read()
            .get(&key(home_account_id, authority))
            .cloned()
    }

    /// Caches `token` and remembers its refresh token.
    pub fn insert(&self, home_account_id: &str, authority: &str, token: &Token) {
        if let Some(refresh_token) = &token.refresh_token {
            self.refresh_tokens.write().insert(
                refresh_token.expose_secret().to_owned(),
                home_account_id.to_owned(),
            );
            self.latest_refresh
                .write()
                .insert(key(home_account_id, authority), refresh_token.clone());
        }

        let mut cache = self.cache.write();
        let entries = cache.entry(key(home_account_id, authority)).or_default();
        entries.retain(|t| !same_scopes(&t.scopes, &token.scopes));
        entries.push(token.clone());
    }

    /// Redeems a configured authorization code.
    ///
    /// # Errors
    ///
    /// - `Denied` for unknown codes or in `deny` mode
    /// - `Network` in `offline` mode
    pub fn redeem_code(&self, code: &str, scopes: &[String]) -> Result<Token, ExchangeError> {
        self.check_mode()?;
        let account = self
            .codes
            .get(code)
            .and_then(|home_account_id| self.accounts.get(home_account_id))
            .ok_or_else(|| invalid_grant("unknown authorization code"))?;
        Ok(self.issue(account, scopes))
    }

    /// Redeems a refresh token previously issued by this service. The old
    /// refresh token is retired.
    ///
    /// # Errors
    ///
    /// - `Denied` for unknown refresh tokens or in `deny` mode
    /// - `Network` in `offline` mode
    pub fn redeem_refresh(
        &self,
        refresh_token: &str,
        scopes: &[String],
    ) -> Result<Token, ExchangeError> {
        self.check_mode()?;
        let home_account_id = self
            .refresh_tokens
            .write()
            .remove(refresh_token)
            .ok_or_else(|| invalid_grant("unknown refresh token"))?;
        let account = self
            .accounts
            .get(&home_account_id)
            .ok_or_else(|| invalid_grant("refresh token account no longer exists"))?;
        Ok(self.issue(account, scopes))
    }

    /// Number of successful redemptions so far.
    #[must_use]
    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    fn check_mode(&self) -> Result<(), ExchangeError> {
        match self.mode {
            ExchangeMode::Issue => Ok(()),
            ExchangeMode::Deny => Err(invalid_grant("redemption disabled")),
            ExchangeMode::Offline => Err(ExchangeError::Network(
                "identity provider unreachable".to_owned(),
            )),
        }
    }

    fn issue(&self, account: &Account, scopes: &[String]) -> Token {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(scopes = scopes.len(), "Issuing static token");
        Token {
            access_token: SecretString::from(format!("at-{}", Uuid::new_v4())),
            refresh_token: self
                .issue_refresh_tokens
                .then(|| SecretString::from(format!("rt-{}", Uuid::new_v4()))),
            expires_on: OffsetDateTime::now_utc().saturating_add(self.token_lifetime),
            scopes: scopes.to_vec(),
            account: Some(account.clone()),
        }
    }
}

fn key(home_account_id: &str, authority: &str) -> CacheKey {
    (home_account_id.to_owned(), authority.to_owned())
}

fn same_scopes(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().all(|s| b.contains(s))
}

fn invalid_grant(description: &str) -> ExchangeError {
    ExchangeError::Denied {
        error: "invalid_grant".to_owned(),
        description: Some(description.to_owned()),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::CodeMapping;

    const AUTHORITY: &str = "https://login.microsoftonline.com/common";

    fn config() -> StaticTokenPluginConfig {
        StaticTokenPluginConfig {
            accounts: vec![Account {
                id: "h1".to_owned(),
                username: "a@b.com".to_owned(),
                home_account_id: "h1".to_owned(),
                ..Account::default()
            }],
            codes: vec![CodeMapping {
                code: "code-a".to_owned(),
                home_account_id: "h1".to_owned(),
            }],
            ..StaticTokenPluginConfig::default()
        }
    }

    fn scopes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn known_code_issues_token_for_account() {
        let service = Service::from_config(&config());

        let token = service.redeem_code("code-a", &scopes(&["scope.read"])).unwrap();

        assert_eq!(token.account.unwrap().username, "a@b.com");
        assert!(token.refresh_token.is_some());
        assert!(token.expires_on > OffsetDateTime::now_utc());
        assert_eq!(service.exchange_count(), 1);
    }

    #[test]
    fn unknown_code_is_denied() {
        let service = Service::from_config(&config());

        match service.redeem_code("nope", &scopes(&["scope.read"])) {
            Err(ExchangeError::Denied { error, .. }) => assert_eq!(error, "invalid_grant"),
            other => panic!("Expected Denied, got: {other:?}"),
        }
        assert_eq!(service.exchange_count(), 0);
    }

    #[test]
    fn modes_override_redemption() {
        let deny = Service::from_config(&StaticTokenPluginConfig {
            mode: ExchangeMode::Deny,
            ..config()
        });
        let offline = Service::from_config(&StaticTokenPluginConfig {
            mode: ExchangeMode::Offline,
            ..config()
        });

        assert!(matches!(
            deny.redeem_code("code-a", &scopes(&["s"])),
            Err(ExchangeError::Denied { .. })
        ));
        assert!(matches!(
            offline.redeem_code("code-a", &scopes(&["s"])),
            Err(ExchangeError::Network(_))
        ));
    }

    #[test]
    fn stored_refresh_token_is_redeemed_once() {
        let service = Service::from_config(&config());
        let token = service.redeem_code("code-a", &scopes(&["s"])).unwrap();
        service.insert("h1", AUTHORITY, &token);
        let refresh_token = token.refresh_token.unwrap();

        let refreshed = service
            .redeem_refresh(refresh_token.expose_secret(), &scopes(&["s"]))
            .unwrap();
        assert!(refreshed.account.is_some());
        assert!(matches!(
            service.redeem_refresh(refresh_token.expose_secret(), &scopes(&["s"])),
            Err(ExchangeError::Denied { .. })
        ));
    }

    #[test]
    fn cache_matches_scope_superset_per_authority() {
        let service = Service::from_config(&config());
        let token = service
            .redeem_code("code-a", &scopes(&["scope.read", "scope.write"]))
            .unwrap();
        service.insert("h1", AUTHORITY, &token);

        assert!(service.cached("h1", AUTHORITY, &scopes(&["scope.read"])).is_some());
        assert!(service.cached("h1", AUTHORITY, &scopes(&["scope.admin"])).is_none());
        assert!(
            service
                .cached("h1", "https://login.microsoftonline.com/other", &scopes(&["scope.read"]))
                .is_none()
        );
        assert!(service.cached("h2", AUTHORITY, &scopes(&["scope.read"])).is_none());
    }

    #[test]
    fn refresh_token_is_found_regardless_of_scopes() {
        let service = Service::from_config(&config());
        let first = service.redeem_code("code-a", &scopes(&["scope.read"])).unwrap();
        service.insert("h1", AUTHORITY, &first);
        let second = service.redeem_code("code-a", &scopes(&["scope.write"])).unwrap();
        service.insert("h1", AUTHORITY, &second);

        let latest = service.refresh_token_for("h1", AUTHORITY).unwrap();
        assert_eq!(
            latest.expose_secret(),
            second.refresh_token.unwrap().expose_secret()
        );
        assert!(service.cached("h1", AUTHORITY, &scopes(&["scope.admin"])).is_none());
        assert!(
            service
                .refresh_token_for("h1", "https://login.microsoftonline.com/other")
                .is_none()
        );
        assert!(service.refresh_token_for("h2", AUTHORITY).is_none());
    }

    #[test]
    fn store_replaces_same_scope_set() {
        let service = Service::from_config(&StaticTokenPluginConfig {
            issue_refresh_tokens: false,
            ..config()
        });
        let first = service.redeem_code("code-a", &scopes(&["a", "b"])).unwrap();
        let second = service.redeem_code("code-a", &scopes(&["b", "a"])).unwrap();
        service.insert("h1", AUTHORITY, &first);
        service.insert("h1", AUTHORITY, &second);

        let cached = service.cached("h1", AUTHORITY, &scopes(&["a"])).unwrap();
        assert_eq!(
            cached.access_token.expose_secret(),
            second.access_token.expose_secret()
        );
        assert!(cached.refresh_token.is_none());
    }
}
