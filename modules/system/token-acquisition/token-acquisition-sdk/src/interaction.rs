//! Interaction handler contract.
//!
//! The orchestrator invokes the caller's [`InteractionHandler`] at most once
//! per interactive run. The handler presents UI on its own schedule and
//! reports back through the single-use [`InteractionReply`].

use secrecy::SecretString;
use tokio::sync::oneshot;
use url::Url;
use uuid::Uuid;

use crate::models::{AuthorizationAgent, UiBehavior};

/// Everything the handler needs to render the authorization UI.
#[derive(Debug, Clone)]
pub struct InteractionContext {
    pub run_id: Uuid,
    /// Authorization request URL, including prompt, login hint and extra query parameters.
    pub authorization_url: Url,
    pub redirect_uri: String,
    pub login_hint: Option<String>,
    pub ui_behavior: UiBehavior,
    pub authorization_agent: AuthorizationAgent,
    pub scopes: Vec<String>,
    pub extra_scopes_to_consent: Vec<String>,
}

/// What the user interaction produced.
#[derive(Debug)]
pub enum InteractionOutcome {
    /// The provider redirected back with an authorization code.
    AuthorizationCode(SecretString),
    /// The user closed or abandoned the UI.
    Cancelled,
    /// The provider redirected back with an error.
    Denied {
        error: String,
        description: Option<String>,
    },
}

/// Single-use channel back to the waiting run.
///
/// Dropping the reply without completing it counts as cancellation.
#[derive(Debug)]
pub struct InteractionReply {
    sender: oneshot::Sender<InteractionOutcome>,
}

impl InteractionReply {
    /// Creates a reply and the receiver the run waits on.
    #[must_use]
    pub fn channel() -> (Self, oneshot::Receiver<InteractionOutcome>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    /// Reports the outcome. Returns `false` if the run is no longer waiting
    /// (for example because the host surface was torn down).
    pub fn complete(self, outcome: InteractionOutcome) -> bool {
        self.sender.send(outcome).is_ok()
    }

    pub fn authorization_code(self, code: impl Into<SecretString>) -> bool {
        self.complete(InteractionOutcome::AuthorizationCode(code.into()))
    }

    pub fn cancel(self) -> bool {
        self.complete(InteractionOutcome::Cancelled)
    }

    pub fn deny(self, error: impl Into<String>, description: Option<String>) -> bool {
        self.complete(InteractionOutcome::Denied {
            error: error.into(),
            description,
        })
    }
}

/// Caller-supplied capability that presents authentication UI.
///
/// `handle` must not block; it should hand the work to the UI layer and
/// complete `reply` once the user is done.
pub trait InteractionHandler: Send + Sync {
    fn handle(&self, context: InteractionContext, reply: InteractionReply);
}

impl<F> InteractionHandler for F
where
    F: Fn(InteractionContext, InteractionReply) + Send + Sync,
{
    fn handle(&self, context: InteractionContext, reply: InteractionReply) {
        self(context, reply);
    }
}
