//! Canonical, immutable operation descriptor.

use crate::authority::Authority;
use crate::models::{Account, AuthorizationAgent, UiBehavior};
use crate::request::HostSurface;

/// The identity used to pre-fill the flow.
///
/// Exactly one of account or login hint is the identity hint. When an
/// account is present its username is the login hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityHint {
    /// Account resolved through the account resolver.
    Account(Account),
    LoginHint(Option<String>),
}

impl IdentityHint {
    #[must_use]
    pub fn login_hint(&self) -> Option<&str> {
        match self {
            Self::Account(account) => Some(&account.username),
            Self::LoginHint(hint) => hint.as_deref(),
        }
    }

    #[must_use]
    pub fn account(&self) -> Option<&Account> {
        match self {
            Self::Account(account) => Some(account),
            Self::LoginHint(_) => None,
        }
    }
}

/// Flow-specific part of the descriptor.
#[derive(Debug, Clone)]
pub enum Flow {
    Interactive { host_surface: HostSurface },
    Silent { force_refresh: bool },
}

/// All fields of [`OperationParameters`], required up front.
#[derive(Debug, Clone)]
pub struct OperationParametersParts {
    pub authority: Authority,
    pub scopes: Vec<String>,
    pub client_id: String,
    pub redirect_uri: String,
    pub identity: IdentityHint,
    pub ui_behavior: UiBehavior,
    pub authorization_agent: AuthorizationAgent,
    pub extra_query_parameters: Vec<(String, String)>,
    pub extra_scopes_to_consent: Vec<String>,
    pub flow: Flow,
}

/// Fully-resolved request descriptor consumed read-only by the orchestrator.
#[derive(Debug, Clone)]
pub struct OperationParameters {
    parts: OperationParametersParts,
}

impl From<OperationParametersParts> for OperationParameters {
    fn from(parts: OperationParametersParts) -> Self {
        Self { parts }
    }
}

impl OperationParameters {
    #[must_use]
    pub fn authority(&self) -> &Authority {
        &self.parts.authority
    }

    /// Requested scopes, in request order.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.parts.scopes
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.parts.client_id
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.parts.redirect_uri
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityHint {
        &self.parts.identity
    }

    #[must_use]
    pub fn login_hint(&self) -> Option<&str> {
        self.parts.identity.login_hint()
    }

    #[must_use]
    pub fn account(&self) -> Option<&Account> {
        self.parts.identity.account()
    }

    #[must_use]
    pub fn ui_behavior(&self) -> UiBehavior {
        self.parts.ui_behavior
    }

    #[must_use]
    pub fn authorization_agent(&self) -> AuthorizationAgent {
        self.parts.authorization_agent
    }

    #[must_use]
    pub fn extra_query_parameters(&self) -> &[(String, String)] {
        &self.parts.extra_query_parameters
    }

    #[must_use]
    pub fn extra_scopes_to_consent(&self) -> &[String] {
        &self.parts.extra_scopes_to_consent
    }

    #[must_use]
    pub fn flow(&self) -> &Flow {
        &self.parts.flow
    }

    #[must_use]
    pub fn is_interactive(&self) -> bool {
        matches!(self.parts.flow, Flow::Interactive { .. })
    }

    /// Host surface, present for interactive requests only.
    #[must_use]
    pub fn host_surface(&self) -> Option<&HostSurface> {
        match &self.parts.flow {
            Flow::Interactive { host_surface } => Some(host_surface),
            Flow::Silent { .. } => None,
        }
    }

    /// Always `false` for interactive requests.
    #[must_use]
    pub fn force_refresh(&self) -> bool {
        match self.parts.flow {
            Flow::Silent { force_refresh } => force_refresh,
            Flow::Interactive { .. } => false,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn parts(identity: IdentityHint) -> OperationParametersParts {
        OperationParametersParts {
            authority: Authority::parse("https://login.microsoftonline.com/common").unwrap(),
            scopes: vec!["scope.read".to_owned()],
            client_id: "client".to_owned(),
            redirect_uri: "msauth://cb".to_owned(),
            identity,
            ui_behavior: UiBehavior::default(),
            authorization_agent: AuthorizationAgent::default(),
            extra_query_parameters: Vec::new(),
            extra_scopes_to_consent: Vec::new(),
            flow: Flow::Silent {
                force_refresh: false,
            },
        }
    }

    #[test]
    fn account_identity_hints_its_username() {
        let account = Account {
            username: "a@b.com".to_owned(),
            home_account_id: "h1".to_owned(),
            ..Account::default()
        };

        let params = OperationParameters::from(parts(IdentityHint::Account(account.clone())));

        assert_eq!(params.login_hint(), Some("a@b.com"));
        assert_eq!(params.account(), Some(&account));
    }

    #[test]
    fn login_hint_identity_has_no_account() {
        let hinted = OperationParameters::from(parts(IdentityHint::LoginHint(Some(
            "user@contoso.com".to_owned(),
        ))));
        let anonymous = OperationParameters::from(parts(IdentityHint::LoginHint(None)));

        assert_eq!(hinted.login_hint(), Some("user@contoso.com"));
        assert!(hinted.account().is_none());
        assert_eq!(anonymous.login_hint(), None);
    }
}
