//! Token Acquisition Module
//!
//! Turns loosely-specified "acquire a token" requests into fully-resolved
//! [`OperationParameters`](token_acquisition_sdk::OperationParameters) and
//! drives them through the interactive or silent acquisition flow.
//!
//! Provides the `TokenAcquisitionClient` implementation
//! ([`TokenAcquisitionLocalClient`](domain::TokenAcquisitionLocalClient))
//! and the [`CompletionGate`](domain::gate::CompletionGate) adapter for
//! synchronous callers.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod logging;
pub mod module;

pub use config::{LoggingConfig, TokenAcquisitionConfig};
pub use domain::gate::{CompletionGate, CompletionSignal, GateOutcome, completion_gate};
pub use domain::{Collaborators, Service, TokenAcquisitionLocalClient};
pub use module::TokenAcquisitionModule;
