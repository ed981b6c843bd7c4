#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end acquisition through the module, the static plugin and the
//! completion gate.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use parking_lot::Mutex;
use static_token_plugin::StaticTokenPlugin;
use static_token_plugin::config::{CodeMapping, ExchangeMode, StaticTokenPluginConfig};
use static_token_plugin::domain::Service as PluginService;
use token_acquisition::{
    Collaborators, CompletionSignal, GateOutcome, TokenAcquisitionConfig, TokenAcquisitionModule,
    completion_gate,
};
use token_acquisition_sdk::{
    Account, AcquireTokenRequest, AcquisitionResult, AuthenticationResult, CompletionCallback,
    HostSurface, InteractionContext, InteractionHandler, InteractionReply, SilentTokenRequest,
    TokenAcquisitionClient, TokenAcquisitionError, UiBehavior,
};
use tokio::runtime::Runtime;

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    runtime: Runtime,
    plugin: Arc<PluginService>,
    client: Arc<dyn TokenAcquisitionClient>,
}

fn account() -> Account {
    Account {
        id: "h1".to_owned(),
        username: "a@b.com".to_owned(),
        home_account_id: "h1".to_owned(),
        environment: "login.microsoftonline.com".to_owned(),
        ..Account::default()
    }
}

fn harness(mode: ExchangeMode) -> Harness {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();

    let plugin = StaticTokenPlugin::default()
        .init(&StaticTokenPluginConfig {
            mode,
            accounts: vec![account()],
            codes: vec![CodeMapping {
                code: "code-a".to_owned(),
                home_account_id: "h1".to_owned(),
            }],
            ..StaticTokenPluginConfig::default()
        })
        .unwrap();

    let config = TokenAcquisitionConfig {
        client_id: Some("4b0db8c2-9f26-4417-8bde-3f0e3656f8e0".to_owned()),
        redirect_uri: Some("msauth://com.contoso.app/callback".to_owned()),
        ..TokenAcquisitionConfig::default()
    };
    let client = TokenAcquisitionModule::default()
        .init(
            config,
            Collaborators::from_shared(Arc::clone(&plugin)),
            runtime.handle().clone(),
        )
        .unwrap();

    Harness {
        runtime,
        plugin,
        client,
    }
}

/// Forwards to the gate and counts deliveries.
fn counted(signal: &CompletionSignal<AcquisitionResult>) -> (CompletionCallback, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let forward = signal.completion_callback();
    let callback: CompletionCallback = Box::new(move |result| {
        seen.fetch_add(1, Ordering::SeqCst);
        forward(result);
    });
    (callback, count)
}

fn code_handler(calls: &Arc<AtomicUsize>) -> Arc<dyn InteractionHandler> {
    let calls = Arc::clone(calls);
    Arc::new(move |_context: InteractionContext, reply: InteractionReply| {
        calls.fetch_add(1, Ordering::SeqCst);
        reply.authorization_code("code-a".to_owned());
    })
}

fn interactive(
    harness: &Harness,
    request: AcquireTokenRequest,
    handler: Arc<dyn InteractionHandler>,
) -> AcquisitionResult {
    let (signal, gate) = completion_gate();
    let (callback, count) = counted(&signal);
    harness
        .client
        .acquire_interactive(request, handler, callback)
        .unwrap();

    let GateOutcome::Signalled(result) = gate.wait_timeout(WAIT) else {
        panic!("interactive run did not complete");
    };
    assert_eq!(count.load(Ordering::SeqCst), 1);
    result
}

fn silent(harness: &Harness, request: SilentTokenRequest) -> AcquisitionResult {
    let (signal, gate) = completion_gate();
    let (callback, count) = counted(&signal);
    harness.client.acquire_silent(request, callback).unwrap();

    let GateOutcome::Signalled(result) = gate.wait_timeout(WAIT) else {
        panic!("silent run did not complete");
    };
    assert_eq!(count.load(Ordering::SeqCst), 1);
    result
}

fn success(result: AcquisitionResult) -> AuthenticationResult {
    match result {
        AcquisitionResult::Success(result) => result,
        other => panic!("Expected success, got: {other:?}"),
    }
}

fn scopes() -> Vec<String> {
    vec!["scope.read".to_owned()]
}

#[test]
fn sign_in_then_silent_renewal() {
    let harness = harness(ExchangeMode::Issue);
    let calls = Arc::new(AtomicUsize::new(0));

    let signed_in = success(interactive(
        &harness,
        AcquireTokenRequest::new(scopes(), HostSurface::new("main"))
            .with_login_hint("a@b.com"),
        code_handler(&calls),
    ));
    assert!(!signed_in.from_cache);
    assert_eq!(signed_in.account, account());
    assert_eq!(signed_in.authority, "https://login.microsoftonline.com/common");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let cached = success(silent(&harness, SilentTokenRequest::new(account(), scopes())));
    assert!(cached.from_cache);

    let refreshed = success(silent(
        &harness,
        SilentTokenRequest::new(account(), scopes()).with_force_refresh(true),
    ));
    assert!(!refreshed.from_cache);
    assert_eq!(harness.plugin.exchange_count(), 2);
}

#[test]
fn silent_for_new_scope_renews_with_stored_refresh_token() {
    let harness = harness(ExchangeMode::Issue);
    let calls = Arc::new(AtomicUsize::new(0));
    success(interactive(
        &harness,
        AcquireTokenRequest::new(scopes(), HostSurface::new("main")),
        code_handler(&calls),
    ));

    let write = success(silent(
        &harness,
        SilentTokenRequest::new(account(), vec!["scope.write".to_owned()]),
    ));
    assert!(!write.from_cache);
    assert_eq!(write.scopes, ["scope.write"]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.plugin.exchange_count(), 2);

    let read = success(silent(&harness, SilentTokenRequest::new(account(), scopes())));
    assert!(read.from_cache);
}

#[test]
fn interactive_with_cached_session_does_not_prompt() {
    let harness = harness(ExchangeMode::Issue);
    let calls = Arc::new(AtomicUsize::new(0));
    interactive(
        &harness,
        AcquireTokenRequest::new(scopes(), HostSurface::new("main")),
        code_handler(&calls),
    );

    let again = success(interactive(
        &harness,
        AcquireTokenRequest::new(scopes(), HostSurface::new("main")).with_account(account()),
        code_handler(&calls),
    ));
    assert!(again.from_cache);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let forced = success(interactive(
        &harness,
        AcquireTokenRequest::new(scopes(), HostSurface::new("main"))
            .with_account(account())
            .with_ui_behavior(UiBehavior::ForceLogin),
        code_handler(&calls),
    ));
    assert!(!forced.from_cache);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn silent_without_session_requires_interaction() {
    let harness = harness(ExchangeMode::Issue);

    let result = silent(&harness, SilentTokenRequest::new(account(), scopes()));
    assert!(matches!(
        result,
        AcquisitionResult::Failed(TokenAcquisitionError::InteractionRequired(_))
    ));
}

#[test]
fn offline_provider_fails_with_retryable_error() {
    let harness = harness(ExchangeMode::Offline);
    let calls = Arc::new(AtomicUsize::new(0));

    let result = interactive(
        &harness,
        AcquireTokenRequest::new(scopes(), HostSurface::new("main")),
        code_handler(&calls),
    );
    match result.into_result() {
        Err(e) => assert!(e.is_retryable()),
        Ok(r) => panic!("Expected failure, got: {r:?}"),
    }
}

#[test]
fn teardown_cancels_pending_interaction() {
    let harness = harness(ExchangeMode::Issue);
    let surface = HostSurface::new("main");
    let parked = Arc::new(Mutex::new(None::<InteractionReply>));
    let calls = Arc::new(AtomicUsize::new(0));
    let (shown_tx, shown_rx) = mpsc::channel();

    let handler: Arc<dyn InteractionHandler> = {
        let parked = Arc::clone(&parked);
        let calls = Arc::clone(&calls);
        let shown_tx = Mutex::new(shown_tx);
        Arc::new(move |_context: InteractionContext, reply: InteractionReply| {
            calls.fetch_add(1, Ordering::SeqCst);
            *parked.lock() = Some(reply);
            shown_tx.lock().send(()).unwrap();
        })
    };

    let (signal, gate) = completion_gate();
    let (callback, count) = counted(&signal);
    harness
        .client
        .acquire_interactive(
            AcquireTokenRequest::new(scopes(), surface.clone()),
            handler,
            callback,
        )
        .unwrap();

    shown_rx.recv_timeout(WAIT).unwrap();
    surface.tear_down();

    let GateOutcome::Signalled(result) = gate.wait_timeout(WAIT) else {
        panic!("run did not complete after teardown");
    };
    assert!(matches!(result, AcquisitionResult::Cancelled));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let reply = parked.lock().take().unwrap();
    assert!(!reply.authorization_code("late".to_owned()));
    assert_eq!(harness.plugin.exchange_count(), 0);
}

#[test]
fn user_cancellation_maps_to_user_cancelled() {
    let harness = harness(ExchangeMode::Issue);
    let handler: Arc<dyn InteractionHandler> =
        Arc::new(|_context: InteractionContext, reply: InteractionReply| {
            reply.cancel();
        });

    let result = interactive(
        &harness,
        AcquireTokenRequest::new(scopes(), HostSurface::new("main")),
        handler,
    );
    assert_eq!(
        result.into_result().unwrap_err(),
        TokenAcquisitionError::UserCancelled
    );
}

#[test]
fn resolution_errors_are_returned_without_callback() {
    let harness = harness(ExchangeMode::Issue);
    let calls = Arc::new(AtomicUsize::new(0));
    let stranger = Account {
        home_account_id: "nobody".to_owned(),
        ..account()
    };

    let (signal, _gate) = completion_gate();
    let (callback, count) = counted(&signal);
    let err = harness
        .client
        .acquire_interactive(
            AcquireTokenRequest::new(scopes(), HostSurface::new("main")).with_account(stranger),
            code_handler(&calls),
            callback,
        )
        .unwrap_err();
    assert!(matches!(err, TokenAcquisitionError::AccountResolution { .. }));

    let (callback, _) = counted(&signal);
    let err = harness
        .client
        .acquire_silent(
            SilentTokenRequest::new(account(), scopes()).with_authority("http://insecure.example/x"),
            callback,
        )
        .unwrap_err();
    assert!(matches!(err, TokenAcquisitionError::InvalidAuthority { .. }));

    harness.runtime.block_on(tokio::task::yield_now());
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(!signal.is_signalled());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn module_initializes_once() {
    let harness = harness(ExchangeMode::Issue);
    let module = TokenAcquisitionModule::default();
    let collaborators = Collaborators::from_shared(Arc::clone(&harness.plugin));
    let config = TokenAcquisitionConfig::default();

    assert!(
        module
            .init(config.clone(), collaborators.clone(), harness.runtime.handle().clone())
            .is_ok()
    );
    assert!(module.service().is_some());
    assert!(
        module
            .init(config, collaborators, harness.runtime.handle().clone())
            .is_err()
    );
}

#[test]
fn malformed_default_authority_fails_init() {
    let harness = harness(ExchangeMode::Issue);
    let config = TokenAcquisitionConfig {
        default_authority: "https://login.microsoftonline.com/a/b/c".to_owned(),
        ..TokenAcquisitionConfig::default()
    };

    let result = TokenAcquisitionModule::default().init(
        config,
        Collaborators::from_shared(Arc::clone(&harness.plugin)),
        harness.runtime.handle().clone(),
    );
    assert!(result.is_err());
}
