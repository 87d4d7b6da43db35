//! Ingress gateway for the Toothtap game server.
//!
//! Terminates client transports (`WebSocket` game channel plus a REST
//! fallback), authenticates credentials, enforces per-connection
//! message rate limits, and forwards validated events to the session
//! layer. Everything past this crate trusts its inputs.
//!
//! # Modules
//!
//! - [`auth`] -- credential verification seam
//! - [`config`] -- YAML configuration loading
//! - [`error`] -- HTTP-facing error taxonomy
//! - [`handlers`] -- REST endpoint handlers
//! - [`protocol`] -- session outcome to wire message translation
//! - [`rate_limit`] -- per-connection token buckets
//! - [`router`] -- route assembly and middleware
//! - [`server`] -- listener lifecycle
//! - [`state`] -- shared application state
//! - [`ws`] -- the `WebSocket` game channel

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod rate_limit;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

pub use auth::{AuthError, AuthProvider, DevTokenAuth};
pub use config::{ConfigError, GatewayConfig};
pub use error::GatewayError;
pub use router::build_router;
pub use server::{start_server, ServerError};
pub use state::AppState;
