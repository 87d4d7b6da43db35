//! Axum router construction for the gateway.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled so the browser client can reach the
//! API cross-origin during development.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the gateway.
///
/// The router includes:
/// - `GET /ws/game` -- the `WebSocket` game channel
/// - `GET /api/health` -- liveness probe
/// - `GET /api/game/state` -- authoritative snapshot
/// - `POST /api/game/tap` -- tap batch fallback
/// - `POST /api/game/purchase` -- purchase fallback
/// - `POST /api/game/boost/activate` -- bonus activation
///
/// CORS allows any origin for development. In production this should
/// be restricted to the game's own origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket
        .route("/ws/game", get(ws::ws_game))
        // REST API
        .route("/api/health", get(handlers::health))
        .route("/api/game/state", get(handlers::get_state))
        .route("/api/game/tap", post(handlers::post_tap))
        .route("/api/game/purchase", post(handlers::post_purchase))
        .route("/api/game/boost/activate", post(handlers::post_boost))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
