//! Token Acquisition SDK
//!
//! This crate provides the public API for the `token_acquisition` module:
//!
//! - [`TokenAcquisitionClient`] - Public API trait for consumers
//! - [`AccountResolver`], [`TokenCache`], [`TokenExchange`] - Collaborator traits for plugins
//! - [`InteractionHandler`] - Caller-supplied capability that presents UI
//! - [`Authority`], [`OperationParameters`], [`AcquisitionResult`] - Domain models
//! - [`TokenAcquisitionError`] - Error taxonomy
//!
//! ## Usage
//!
//! ```ignore
//! use token_acquisition_sdk::{AcquireTokenRequest, HostSurface, TokenAcquisitionClient};
//!
//! let surface = HostSurface::new("main-window");
//! let request = AcquireTokenRequest::new(vec!["user.read".to_owned()], surface)
//!     .with_login_hint("user@contoso.com");
//!
//! let run = client.acquire_interactive(request, handler, Box::new(|result| {
//!     // invoked exactly once
//! }))?;
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod authority;
pub mod error;
pub mod interaction;
pub mod models;
pub mod parameters;
pub mod plugin_api;
pub mod request;

// Re-export main types at crate root
pub use api::{CompletionCallback, TokenAcquisitionClient};
pub use authority::{AdfsAuthority, Authority, AuthorityKind, B2CAuthority, DirectoryAuthority};
pub use error::TokenAcquisitionError;
pub use interaction::{
    InteractionContext, InteractionHandler, InteractionOutcome, InteractionReply,
};
pub use models::{
    AcquisitionResult, Account, AuthenticationResult, AuthorizationAgent, CompletionKind,
    RunHandle, RunState, Token, UiBehavior,
};
pub use parameters::{Flow, IdentityHint, OperationParameters, OperationParametersParts};
pub use plugin_api::{
    AccountLookupError, AccountResolver, CacheError, CodeExchangeRequest, ConfigurationProvider,
    ExchangeError, RefreshRequest, TokenCache, TokenExchange,
};
pub use request::{AcquireTokenRequest, HostSurface, SilentTokenRequest};
