use token_acquisition_sdk::{
    AcquisitionResult, OperationParameters, RefreshRequest, RunState, TokenAcquisitionError,
};

use super::run::Run;
use super::{Orchestrator, success};

impl Orchestrator {
    #[tracing::instrument(name = "silent_run", skip_all, fields(run_id = %run.id()))]
    pub(super) async fn run_silent(&self, run: Run, params: OperationParameters) {
        let result = self.silent(&run, &params).await;
        run.complete(result);
    }

    async fn silent(&self, run: &Run, params: &OperationParameters) -> AcquisitionResult {
        let Some(account) = params.account() else {
            return AcquisitionResult::Failed(TokenAcquisitionError::invalid_request(
                "silent acquisition requires an account",
            ));
        };

        run.advance(RunState::AwaitingNetwork);
        let cached = self
            .cached_token(run, account, params.authority(), params.scopes())
            .await;

        let refresh_token = match cached {
            Some(token) if !params.force_refresh() && self.is_usable(&token) => {
                tracing::debug!("Serving silent request from cache");
                let account = token.account.clone().unwrap_or_else(|| account.clone());
                return success(params, account, token, true);
            }
            Some(token) => token.refresh_token,
            None => None,
        };
        // Cached tokens are matched by scope; the refresh token is not.
        let refresh_token = match refresh_token {
            Some(refresh_token) => Some(refresh_token),
            None => match self.cache.get_refresh_token(account, params.authority()).await {
                Ok(refresh_token) => refresh_token,
                Err(e) => {
                    tracing::warn!(error = %e, "Refresh token lookup failed, treating as miss");
                    None
                }
            },
        };
        let Some(refresh_token) = refresh_token else {
            tracing::info!("No refresh token available, interaction required");
            return AcquisitionResult::Failed(TokenAcquisitionError::InteractionRequired(
                "no cached refresh token for account".to_owned(),
            ));
        };

        let request = RefreshRequest {
            authority: params.authority().clone(),
            client_id: params.client_id().to_owned(),
            account: account.clone(),
            scopes: params.scopes().to_vec(),
            refresh_token,
        };
        match self.exchange.refresh(&request).await {
            Ok(token) => self.finish_with_token(run, params, token).await,
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed");
                AcquisitionResult::Failed(e.into())
            }
        }
    }
}
