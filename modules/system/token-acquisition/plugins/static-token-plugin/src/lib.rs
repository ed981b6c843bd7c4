#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Static Token Acquisition Plugin
//!
//! In-memory implementations of the token acquisition collaborators for
//! development and testing:
//!
//! - **`AccountResolver`**: accounts listed in configuration
//! - **`TokenCache`**: process-local map keyed by home account id and authority
//! - **`TokenExchange`**: redeems configured authorization codes and issued
//!   refresh tokens without any network traffic
//!
//! ## Modes
//!
//! - **`issue`** (default): codes and refresh tokens are redeemed for fresh tokens.
//! - **`deny`**: every redemption is rejected with `invalid_grant`.
//! - **`offline`**: every redemption fails as a network error.
//!
//! ## Configuration
//!
//! ```yaml
//! modules:
//!   static_token_plugin:
//!     config:
//!       mode: issue
//!       token_lifetime_secs: 3600
//!       issue_refresh_tokens: true
//!       accounts:
//!         - id: "h1"
//!           username: "a@b.com"
//!           home_account_id: "h1"
//!           environment: "login.microsoftonline.com"
//!       codes:
//!         - code: "code-a"
//!           home_account_id: "h1"
//! ```

pub mod config;
pub mod domain;
pub mod module;

pub use module::StaticTokenPlugin;
