//! Caller-facing request types.
//!
//! These are the loosely-specified inputs; the builder in the
//! `token_acquisition` crate turns them into [`OperationParameters`](crate::OperationParameters).

use tokio_util::sync::CancellationToken;

use crate::models::{Account, UiBehavior};

/// Reference to the caller-owned UI context an interactive run is bound to.
///
/// Clones share the same teardown state. Tearing the surface down cancels
/// any interactive run that is waiting on user interaction.
#[derive(Debug, Clone)]
pub struct HostSurface {
    id: String,
    teardown: CancellationToken,
}

impl HostSurface {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            teardown: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Marks the surface as gone.
    pub fn tear_down(&self) {
        self.teardown.cancel();
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.teardown.is_cancelled()
    }

    /// Resolves once [`tear_down`](Self::tear_down) has been called on any clone.
    pub async fn torn_down(&self) {
        self.teardown.cancelled().await;
    }
}

/// Interactive "acquire a token" request.
#[derive(Debug, Clone)]
pub struct AcquireTokenRequest {
    /// Explicit authority URL; absent or empty means the configured default.
    pub authority: Option<String>,
    pub scopes: Vec<String>,
    /// Previously signed-in account; takes precedence over `login_hint`.
    pub account: Option<Account>,
    pub login_hint: Option<String>,
    pub ui_behavior: Option<UiBehavior>,
    pub extra_query_parameters: Option<Vec<(String, String)>>,
    pub extra_scopes_to_consent: Option<Vec<String>>,
    pub host_surface: HostSurface,
}

impl AcquireTokenRequest {
    #[must_use]
    pub fn new(scopes: Vec<String>, host_surface: HostSurface) -> Self {
        Self {
            authority: None,
            scopes,
            account: None,
            login_hint: None,
            ui_behavior: None,
            extra_query_parameters: None,
            extra_scopes_to_consent: None,
            host_surface,
        }
    }

    #[must_use]
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    #[must_use]
    pub fn with_account(mut self, account: Account) -> Self {
        self.account = Some(account);
        self
    }

    #[must_use]
    pub fn with_login_hint(mut self, login_hint: impl Into<String>) -> Self {
        self.login_hint = Some(login_hint.into());
        self
    }

    #[must_use]
    pub fn with_ui_behavior(mut self, ui_behavior: UiBehavior) -> Self {
        self.ui_behavior = Some(ui_behavior);
        self
    }

    #[must_use]
    pub fn with_extra_query_parameters(mut self, params: Vec<(String, String)>) -> Self {
        self.extra_query_parameters = Some(params);
        self
    }

    #[must_use]
    pub fn with_extra_scopes_to_consent(mut self, scopes: Vec<String>) -> Self {
        self.extra_scopes_to_consent = Some(scopes);
        self
    }
}

/// Silent "acquire a token" request.
#[derive(Debug, Clone)]
pub struct SilentTokenRequest {
    pub account: Account,
    /// Explicit authority URL; absent or empty means the configured default.
    pub authority: Option<String>,
    pub scopes: Vec<String>,
    /// Skip the cached access token and go to the network.
    pub force_refresh: bool,
}

impl SilentTokenRequest {
    #[must_use]
    pub fn new(account: Account, scopes: Vec<String>) -> Self {
        Self {
            account,
            authority: None,
            scopes,
            force_refresh: false,
        }
    }

    #[must_use]
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    #[must_use]
    pub fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }
}
