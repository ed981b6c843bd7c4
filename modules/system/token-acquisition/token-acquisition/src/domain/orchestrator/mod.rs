//! Acquisition orchestrator.
//!
//! Drives one [`OperationParameters`] through a run:
//!
//! ```text
//! Created -> Dispatched -> (AwaitingInteraction | AwaitingNetwork) -> Completed
//! ```
//!
//! Each run is a task spawned on the caller's runtime handle. The completion
//! callback is invoked exactly once per accepted run.

mod interactive;
mod run;
mod silent;


use std::sync::Arc;

use token_acquisition_sdk::{
    Account, AccountResolver, AcquisitionResult, AuthenticationResult, Authority,
    CompletionCallback, InteractionHandler, OperationParameters, RunHandle, RunState, Token,
    TokenAcquisitionError, TokenCache, TokenExchange,
};
use tokio::runtime::Handle;

use self::run::Run;
use crate::logging::Diagnostics;

/// External collaborators used while building parameters and running flows.
#[derive(Clone)]
pub struct Collaborators {
    pub accounts: Arc<dyn AccountResolver>,
    pub cache: Arc<dyn TokenCache>,
    pub exchange: Arc<dyn TokenExchange>,
}

impl Collaborators {
    /// Uses one object for every collaborator role.
    #[must_use]
    pub fn from_shared<T>(shared: Arc<T>) -> Self
    where
        T: AccountResolver + TokenCache + TokenExchange + 'static,
    {
        Self {
            accounts: shared.clone(),
            cache: shared.clone(),
            exchange: shared,
        }
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    cache: Arc<dyn TokenCache>,
    exchange: Arc<dyn TokenExchange>,
    runtime: Handle,
    expiry_buffer: time::Duration,
    diagnostics: Diagnostics,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        cache: Arc<dyn TokenCache>,
        exchange: Arc<dyn TokenExchange>,
        runtime: Handle,
        expiry_buffer: time::Duration,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            cache,
            exchange,
            runtime,
            expiry_buffer,
            diagnostics,
        }
    }

    /// Starts an interactive run. `params` must carry the interactive flow.
    ///
    /// Invalid parameters complete the run immediately with
    /// `Failed(InvalidRequest)`; the callback then runs on the caller's
    /// thread before this returns.
    pub fn acquire_interactive(
        &self,
        params: OperationParameters,
        handler: Arc<dyn InteractionHandler>,
        on_complete: CompletionCallback,
    ) -> RunHandle {
        let (run, handle) = Run::start(on_complete);
        if let Err(e) = validate(&params, true) {
            tracing::warn!(run_id = %run.id(), error = %e, "Rejected interactive run");
            run.complete(AcquisitionResult::Failed(e));
            return handle;
        }

        run.advance(RunState::Dispatched);
        let this = self.clone();
        self.runtime.spawn(async move {
            this.run_interactive(run, params, handler).await;
        });
        handle
    }

    /// Starts a silent run. `params` must carry the silent flow and a
    /// resolved account.
    pub fn acquire_silent(
        &self,
        params: OperationParameters,
        on_complete: CompletionCallback,
    ) -> RunHandle {
        let (run, handle) = Run::start(on_complete);
        if let Err(e) = validate(&params, false) {
            tracing::warn!(run_id = %run.id(), error = %e, "Rejected silent run");
            run.complete(AcquisitionResult::Failed(e));
            return handle;
        }

        run.advance(RunState::Dispatched);
        let this = self.clone();
        self.runtime.spawn(async move {
            this.run_silent(run, params).await;
        });
        handle
    }

    /// Cache lookup where any read error counts as a miss.
    async fn cached_token(
        &self,
        run: &Run,
        account: &Account,
        authority: &Authority,
        scopes: &[String],
    ) -> Option<Token> {
        match self.cache.get_cached(account, authority, scopes).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(run_id = %run.id(), error = %e, "Token cache read failed, treating as miss");
                None
            }
        }
    }

    fn is_usable(&self, token: &Token) -> bool {
        !token.is_expired(time::OffsetDateTime::now_utc(), self.expiry_buffer)
    }

    /// Stores a freshly issued token and turns it into a success result.
    async fn finish_with_token(
        &self,
        run: &Run,
        params: &OperationParameters,
        token: Token,
    ) -> AcquisitionResult {
        let Some(account) = token.account.clone().or_else(|| params.account().cloned()) else {
            return AcquisitionResult::Failed(TokenAcquisitionError::Internal(
                "token response carries no account".to_owned(),
            ));
        };

        if let Err(e) = self.cache.store(&account, params.authority(), &token).await {
            tracing::warn!(run_id = %run.id(), error = %e, "Token cache write failed");
        }

        success(params, account, token, false)
    }
}

fn success(
    params: &OperationParameters,
    account: Account,
    token: Token,
    from_cache: bool,
) -> AcquisitionResult {
    AcquisitionResult::Success(AuthenticationResult {
        access_token: token.access_token,
        account,
        expires_on: token.expires_on,
        scopes: token.scopes,
        authority: params.authority().as_str().to_owned(),
        from_cache,
    })
}

fn validate(params: &OperationParameters, interactive: bool) -> Result<(), TokenAcquisitionError> {
    if params.scopes().is_empty() {
        return Err(TokenAcquisitionError::invalid_request("scopes must not be empty"));
    }
    if params.scopes().iter().any(|s| s.trim().is_empty()) {
        return Err(TokenAcquisitionError::invalid_request("scopes must not contain blank entries"));
    }
    if params.is_interactive() != interactive {
        return Err(TokenAcquisitionError::invalid_request(
            "parameters were built for a different flow",
        ));
    }
    if !interactive && params.account().is_none() {
        return Err(TokenAcquisitionError::invalid_request("silent acquisition requires an account"));
    }
    Ok(())
}
