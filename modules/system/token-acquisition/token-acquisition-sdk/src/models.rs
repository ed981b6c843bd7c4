//! Domain models for the token acquisition module.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::TokenAcquisitionError;

/// A previously-authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    /// Stable local identifier.
    pub id: String,
    /// Display username, used as login hint.
    pub username: String,
    /// Home-identity identifier (`<object id>.<tenant id>`).
    pub home_account_id: String,
    /// Cloud host the account was authenticated against.
    pub environment: String,
    /// Tenant the account was last seen in.
    pub tenant_id: Option<String>,
    /// Authority URI the account was authenticated against.
    pub authority: Option<String>,
}

/// Policy controlling forced re-authentication / account picker display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiBehavior {
    /// Show the account picker (default).
    #[default]
    SelectAccount,
    /// Require credentials even if a session exists.
    ForceLogin,
    /// Show the consent page.
    Consent,
}

impl UiBehavior {
    /// Value of the `prompt` query parameter for this behavior.
    #[must_use]
    pub fn prompt(self) -> &'static str {
        match self {
            Self::SelectAccount => "select_account",
            Self::ForceLogin => "login",
            Self::Consent => "consent",
        }
    }
}

/// Mechanism used to render interactive UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationAgent {
    /// Let the platform decide.
    #[default]
    Default,
    /// System browser.
    Browser,
    /// Embedded web view.
    Webview,
}

/// Token returned by the exchange collaborator or held by the cache.
#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub expires_on: OffsetDateTime,
    /// Scopes granted by the provider.
    pub scopes: Vec<String>,
    /// Account derived from the provider response, if any.
    pub account: Option<Account>,
}

impl Token {
    /// Returns `true` if the token expires within `buffer` of `now`.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime, buffer: time::Duration) -> bool {
        now.checked_add(buffer)
            .is_none_or(|deadline| self.expires_on <= deadline)
    }
}

/// Successful outcome of an acquisition run.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    pub access_token: SecretString,
    pub account: Account,
    pub expires_on: OffsetDateTime,
    pub scopes: Vec<String>,
    /// Canonical URI of the authority that issued the token.
    pub authority: String,
    /// `true` if no network call was needed.
    pub from_cache: bool,
}

/// Terminal outcome of one acquisition run. Produced exactly once per run.
#[derive(Debug, Clone)]
pub enum AcquisitionResult {
    Success(AuthenticationResult),
    Cancelled,
    Failed(TokenAcquisitionError),
}

impl AcquisitionResult {
    #[must_use]
    pub fn kind(&self) -> CompletionKind {
        match self {
            Self::Success(_) => CompletionKind::Success,
            Self::Cancelled => CompletionKind::Cancelled,
            Self::Failed(_) => CompletionKind::Failed,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Flattens the outcome into a `Result`.
    ///
    /// # Errors
    ///
    /// `Cancelled` becomes [`TokenAcquisitionError::UserCancelled`]; `Failed`
    /// yields its error.
    pub fn into_result(self) -> Result<AuthenticationResult, TokenAcquisitionError> {
        match self {
            Self::Success(result) => Ok(result),
            Self::Cancelled => Err(TokenAcquisitionError::UserCancelled),
            Self::Failed(e) => Err(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    Success,
    Cancelled,
    Failed,
}

/// Lifecycle of a single acquisition run.
///
/// ```text
/// Created -> Dispatched -> (AwaitingInteraction | AwaitingNetwork) -> Completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    Created,
    Dispatched,
    AwaitingInteraction,
    AwaitingNetwork,
    Completed(CompletionKind),
}

impl RunState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Caller-side view of an accepted run.
///
/// Dropping the handle has no effect on the run; the completion callback is
/// still invoked.
#[derive(Debug, Clone)]
pub struct RunHandle {
    id: Uuid,
    state: watch::Receiver<RunState>,
}

impl RunHandle {
    #[must_use]
    pub fn new(id: Uuid, state: watch::Receiver<RunState>) -> Self {
        Self { id, state }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Latest observed state.
    #[must_use]
    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Waits until the run reaches `target` or any terminal state, and
    /// returns the state that satisfied the wait.
    pub async fn reached(&mut self, target: RunState) -> RunState {
        let reached = self
            .state
            .wait_for(|s| *s == target || s.is_terminal())
            .await
            .map(|s| *s);
        // Sender gone: the last published value is final.
        reached.unwrap_or_else(|_| *self.state.borrow())
    }

    /// Waits until the run is terminal.
    pub async fn completed(&mut self) -> RunState {
        self.reached(RunState::Completed(CompletionKind::Success))
            .await
    }
}
