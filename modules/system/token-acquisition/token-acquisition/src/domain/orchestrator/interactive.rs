use std::sync::Arc;

use token_acquisition_sdk::{
    AcquisitionResult, CodeExchangeRequest, InteractionContext, InteractionHandler,
    InteractionOutcome, InteractionReply, OperationParameters, RunState, TokenAcquisitionError,
    UiBehavior,
};
use url::Url;

use super::run::Run;
use super::{Orchestrator, success};
use crate::logging::pii;

/// Scopes always requested alongside the caller's.
const RESERVED_SCOPES: [&str; 3] = ["openid", "profile", "offline_access"];

impl Orchestrator {
    #[tracing::instrument(name = "interactive_run", skip_all, fields(run_id = %run.id()))]
    pub(super) async fn run_interactive(
        &self,
        run: Run,
        params: OperationParameters,
        handler: Arc<dyn InteractionHandler>,
    ) {
        let result = self.interactive(&run, &params, handler.as_ref()).await;
        run.complete(result);
    }

    async fn interactive(
        &self,
        run: &Run,
        params: &OperationParameters,
        handler: &dyn InteractionHandler,
    ) -> AcquisitionResult {
        if let Some(result) = self.cached_session(run, params).await {
            return result;
        }

        let Some(surface) = params.host_surface() else {
            return AcquisitionResult::Failed(TokenAcquisitionError::Internal(
                "interactive run without host surface".to_owned(),
            ));
        };
        if surface.is_torn_down() {
            tracing::info!(surface = surface.id(), "Host surface already torn down");
            return AcquisitionResult::Cancelled;
        }

        let authorization_url = authorization_url(params);
        pii!(self.diagnostics, url = %authorization_url, "Starting user interaction");
        let context = InteractionContext {
            run_id: run.id(),
            authorization_url,
            redirect_uri: params.redirect_uri().to_owned(),
            login_hint: params.login_hint().map(str::to_owned),
            ui_behavior: params.ui_behavior(),
            authorization_agent: params.authorization_agent(),
            scopes: params.scopes().to_vec(),
            extra_scopes_to_consent: params.extra_scopes_to_consent().to_vec(),
        };

        let (reply, replied) = InteractionReply::channel();
        run.advance(RunState::AwaitingInteraction);
        handler.handle(context, reply);

        let outcome = tokio::select! {
            biased;
            () = surface.torn_down() => {
                tracing::info!(surface = surface.id(), "Host surface torn down during interaction");
                return AcquisitionResult::Cancelled;
            }
            outcome = replied => outcome,
        };

        let code = match outcome {
            Ok(InteractionOutcome::AuthorizationCode(code)) => code,
            Ok(InteractionOutcome::Cancelled) => {
                tracing::info!("User cancelled interaction");
                return AcquisitionResult::Cancelled;
            }
            Err(_) => {
                tracing::info!("Interaction reply dropped without an outcome");
                return AcquisitionResult::Cancelled;
            }
            Ok(InteractionOutcome::Denied { error, description }) => {
                tracing::warn!(error = %error, "Authorization denied by provider");
                return AcquisitionResult::Failed(TokenAcquisitionError::ProviderDenied {
                    error,
                    description,
                });
            }
        };

        run.advance(RunState::AwaitingNetwork);
        let request = CodeExchangeRequest {
            authority: params.authority().clone(),
            client_id: params.client_id().to_owned(),
            redirect_uri: params.redirect_uri().to_owned(),
            scopes: params.scopes().to_vec(),
            code,
        };
        match self.exchange.exchange_code(&request).await {
            Ok(token) => self.finish_with_token(run, params, token).await,
            Err(e) => {
                tracing::warn!(error = %e, "Authorization code exchange failed");
                AcquisitionResult::Failed(e.into())
            }
        }
    }

    /// Serves a still-valid cached token for a known account when no UI is
    /// needed: account picker behavior and no extra consent.
    async fn cached_session(
        &self,
        run: &Run,
        params: &OperationParameters,
    ) -> Option<AcquisitionResult> {
        let account = params.account()?;
        if params.ui_behavior() != UiBehavior::SelectAccount
            || !params.extra_scopes_to_consent().is_empty()
        {
            return None;
        }

        let token = self
            .cached_token(run, account, params.authority(), params.scopes())
            .await?;
        if !self.is_usable(&token) {
            return None;
        }

        tracing::debug!("Serving interactive request from cache");
        let account = token.account.clone().unwrap_or_else(|| account.clone());
        Some(success(params, account, token, true))
    }
}

/// Builds the authorization request URL for the interaction handler.
pub(super) fn authorization_url(params: &OperationParameters) -> Url {
    let mut scopes: Vec<&str> = Vec::new();
    let requested = params
        .scopes()
        .iter()
        .chain(params.extra_scopes_to_consent())
        .map(String::as_str)
        .chain(RESERVED_SCOPES);
    for scope in requested {
        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }

    let mut url = params.authority().authorization_endpoint();
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("client_id", params.client_id())
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", params.redirect_uri())
            .append_pair("scope", &scopes.join(" "))
            .append_pair("prompt", params.ui_behavior().prompt());
        if let Some(hint) = params.login_hint() {
            query.append_pair("login_hint", hint);
        }
        for (key, value) in params.extra_query_parameters() {
            query.append_pair(key, value);
        }
    }
    url
}
