//! Domain layer for the static token plugin.

pub mod client;
pub mod service;

pub use service::Service;
