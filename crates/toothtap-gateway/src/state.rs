//! Shared application state for the gateway.

use std::sync::Arc;

use toothtap_session::SessionRegistry;

use crate::auth::AuthProvider;
use crate::config::LimitsConfig;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. Most
/// of the gateway is stateless: per-player state lives behind the
/// registry, per-connection state (rate buckets, broadcast receivers)
/// lives in the socket tasks.
#[derive(Clone)]
pub struct AppState {
    /// Live session actors keyed by player.
    pub registry: Arc<SessionRegistry>,
    /// Credential verifier.
    pub auth: Arc<dyn AuthProvider>,
    /// Per-connection message rate limits.
    pub limits: LimitsConfig,
}

impl AppState {
    /// Assemble the application state.
    #[must_use]
    pub fn new(
        registry: Arc<SessionRegistry>,
        auth: Arc<dyn AuthProvider>,
        limits: LimitsConfig,
    ) -> Self {
        Self { registry, auth, limits }
    }
}
