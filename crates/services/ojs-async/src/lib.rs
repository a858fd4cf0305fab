//! Async Open Journal Systems (OJS) client.
//!
//! Two surfaces are covered:
//! - the REST API (`/api/v1/...`), authenticated with a bearer API token, used for
//!   submissions, submission files and publications;
//! - the web grid handlers (`/$$$call$$$/...`), which need a logged-in browser
//!   session and are the only way to create galleys.
//!
//! The web session is an explicit [`WebSession`] handle returned by
//! [`Client::login`]; nothing about being logged in is stored on the client.

/// HTTP client implementation
pub mod client;
/// Configuration types for the client
pub mod config;
/// Error types
pub mod error;
/// HTML form scraping used by the web session
pub mod form;
/// API resource implementations
pub mod resources;
/// Logged-in web session and galley creation
pub mod session;
/// Request and response types
pub mod types;

pub use crate::client::Client;
pub use crate::config::OjsConfig;
pub use crate::error::{ApiErrorObject, OjsError};
pub use crate::session::WebSession;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::types::*;
    pub use crate::{Client, OjsConfig, OjsError, WebSession};
}
