//! Domain layer for token acquisition.

pub mod authority;
pub mod gate;
pub mod local_client;
pub mod orchestrator;
pub mod parameters;
pub mod service;

pub use local_client::TokenAcquisitionLocalClient;
pub use orchestrator::{Collaborators, Orchestrator};
pub use service::Service;
