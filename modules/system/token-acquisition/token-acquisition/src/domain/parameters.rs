//! Operation parameter builder.
//!
//! A single total function per flow turns a caller request into an
//! immutable [`OperationParameters`]. Either every field resolves or the
//! build fails before any collaborator besides the account resolver is
//! touched.

use token_acquisition_sdk::{
    Account, AccountResolver, AcquireTokenRequest, AuthorizationAgent, ConfigurationProvider,
    Flow, IdentityHint, OperationParameters, OperationParametersParts, SilentTokenRequest,
    TokenAcquisitionError, UiBehavior,
};

use super::authority::resolve_authority;
use crate::logging::{Diagnostics, pii};

/// Builds parameters for an interactive request.
///
/// # Errors
///
/// - `InvalidAuthority` if the request names a malformed authority
/// - `Configuration` if client id, redirect uri or default authority are unusable
/// - `AccountResolution` if the request's account cannot be looked up
pub fn build_interactive(
    request: &AcquireTokenRequest,
    config: &dyn ConfigurationProvider,
    accounts: &dyn AccountResolver,
    diagnostics: Diagnostics,
) -> Result<OperationParameters, TokenAcquisitionError> {
    build(
        RequestView {
            authority: request.authority.as_deref(),
            scopes: &request.scopes,
            account: request.account.as_ref(),
            login_hint: request.login_hint.as_deref(),
            ui_behavior: request.ui_behavior,
            extra_query_parameters: request.extra_query_parameters.as_deref(),
            extra_scopes_to_consent: request.extra_scopes_to_consent.as_deref(),
            flow: Flow::Interactive {
                host_surface: request.host_surface.clone(),
            },
        },
        config,
        accounts,
        diagnostics,
    )
}

/// Builds parameters for a silent request.
///
/// # Errors
///
/// Same as [`build_interactive`].
pub fn build_silent(
    request: &SilentTokenRequest,
    config: &dyn ConfigurationProvider,
    accounts: &dyn AccountResolver,
    diagnostics: Diagnostics,
) -> Result<OperationParameters, TokenAcquisitionError> {
    build(
        RequestView {
            authority: request.authority.as_deref(),
            scopes: &request.scopes,
            account: Some(&request.account),
            login_hint: None,
            ui_behavior: None,
            extra_query_parameters: None,
            extra_scopes_to_consent: None,
            flow: Flow::Silent {
                force_refresh: request.force_refresh,
            },
        },
        config,
        accounts,
        diagnostics,
    )
}

struct RequestView<'a> {
    authority: Option<&'a str>,
    scopes: &'a [String],
    account: Option<&'a Account>,
    login_hint: Option<&'a str>,
    ui_behavior: Option<UiBehavior>,
    extra_query_parameters: Option<&'a [(String, String)]>,
    extra_scopes_to_consent: Option<&'a [String]>,
    flow: Flow,
}

fn build(
    request: RequestView<'_>,
    config: &dyn ConfigurationProvider,
    accounts: &dyn AccountResolver,
    diagnostics: Diagnostics,
) -> Result<OperationParameters, TokenAcquisitionError> {
    let authority = resolve_authority(request.authority, config, diagnostics)?;

    let client_id = required(config.client_id(), "client id")?;
    let redirect_uri = required(config.redirect_uri(), "redirect uri")?;

    let identity = match request.account {
        Some(account) => IdentityHint::Account(resolve_account(accounts, &client_id, account)?),
        None => IdentityHint::LoginHint(request.login_hint.map(str::to_owned)),
    };
    pii!(diagnostics, login_hint = ?identity.login_hint(), "Using login hint");

    Ok(OperationParameters::from(OperationParametersParts {
        authority,
        scopes: request.scopes.to_vec(),
        client_id,
        redirect_uri,
        identity,
        ui_behavior: request.ui_behavior.unwrap_or_default(),
        authorization_agent: config
            .authorization_agent()
            .unwrap_or(AuthorizationAgent::Default),
        extra_query_parameters: request
            .extra_query_parameters
            .map(<[_]>::to_vec)
            .unwrap_or_default(),
        extra_scopes_to_consent: request
            .extra_scopes_to_consent
            .map(<[_]>::to_vec)
            .unwrap_or_default(),
        flow: request.flow,
    }))
}

fn required(value: Option<&str>, what: &str) -> Result<String, TokenAcquisitionError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| TokenAcquisitionError::configuration(format!("{what} is not configured")))
}

fn resolve_account(
    accounts: &dyn AccountResolver,
    client_id: &str,
    account: &Account,
) -> Result<Account, TokenAcquisitionError> {
    accounts
        .lookup(client_id, None, &account.home_account_id)
        .map_err(|e| TokenAcquisitionError::AccountResolution {
            home_account_id: account.home_account_id.clone(),
            reason: e.to_string(),
        })
}
