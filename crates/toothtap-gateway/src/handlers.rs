//! REST endpoint handlers.
//!
//! The REST surface is the fallback for clients without a live socket:
//! each request authenticates, attaches to the player's session actor,
//! performs one operation, and detaches. Responses reuse the same
//! [`ServerMessage`] shapes the socket pushes, so client code has one
//! decoder.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/health` | Liveness probe |
//! | `GET`  | `/api/game/state` | Authoritative snapshot |
//! | `POST` | `/api/game/tap` | Apply a tap batch |
//! | `POST` | `/api/game/purchase` | Buy an upgrade |
//! | `POST` | `/api/game/boost/activate` | Activate a tap bonus |

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use toothtap_types::{
    ConnectionId, PlayerId, PurchaseEvent, RequestId, ServerMessage, SessionId, TapEvent,
    UpgradeId,
};
use toothtap_types::{BoostPayload, PurchasePayload};

use crate::error::GatewayError;
use crate::state::AppState;

/// Tap batch request on the REST surface.
///
/// Unlike the socket payload this carries an explicit `session_id`:
/// a REST client has no server-assigned connection-session, so it
/// mints one and keeps its sequence numbers scoped to it.
#[derive(Debug, Clone, Copy, serde::Deserialize, Validate)]
pub struct TapRequest {
    /// The client's session scope for `session_seq`.
    pub session_id: Uuid,
    /// Strictly increasing sequence number within `session_id`.
    pub session_seq: u64,
    /// Number of taps in the batch.
    #[validate(range(min = 1, max = 10_000))]
    pub count: u32,
    /// Client send time, informational only.
    pub sent_at: Option<DateTime<Utc>>,
}

/// `GET /api/health` -- liveness probe.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let active = state.registry.active_players().await;
    Json(serde_json::json!({
        "status": "ok",
        "active_players": active,
    }))
}

/// `GET /api/game/state` -- current authoritative snapshot, with idle
/// catch-up applied if the player was inactive.
pub async fn get_state(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ServerMessage>, GatewayError> {
    let player_id = authenticate(&state, &headers).await?;
    let handle = state.registry.attach(player_id).await?;
    let result = handle.snapshot(player_id).await;
    handle.detach().await;
    let snapshot = result?;
    Ok(Json(ServerMessage::State { state: snapshot }))
}

/// `POST /api/game/tap` -- apply (or reject) one tap batch.
pub async fn post_tap(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<TapRequest>,
) -> Result<Json<ServerMessage>, GatewayError> {
    let player_id = authenticate(&state, &headers).await?;
    request
        .validate()
        .map_err(|e| GatewayError::Validation(e.to_string()))?;

    let event = TapEvent {
        player_id,
        session_id: SessionId::from(request.session_id),
        client_sequence: request.session_seq,
        client_timestamp: request.sent_at,
        count: request.count,
    };

    let handle = state.registry.attach(player_id).await?;
    let result = handle.tap_batch(event, ConnectionId::new()).await;
    handle.detach().await;
    let (outcome, snapshot) = result?;
    Ok(Json(crate::protocol::click_result(&outcome, snapshot)))
}

/// `POST /api/game/purchase` -- buy an upgrade, at most once per
/// `request_id`.
pub async fn post_purchase(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<PurchasePayload>,
) -> Result<Json<ServerMessage>, GatewayError> {
    let player_id = authenticate(&state, &headers).await?;
    request
        .validate()
        .map_err(|e| GatewayError::Validation(e.to_string()))?;

    let upgrade_id = UpgradeId::from(request.upgrade_id.as_str());
    let event = PurchaseEvent {
        player_id,
        upgrade_id: upgrade_id.clone(),
        request_id: RequestId::from(request.request_id),
    };

    let handle = state.registry.attach(player_id).await?;
    let result = handle.purchase(event, ConnectionId::new()).await;
    handle.detach().await;
    let (outcome, snapshot) = result?;
    Ok(Json(crate::protocol::purchase_result(upgrade_id, &outcome, snapshot)))
}

/// `POST /api/game/boost/activate` -- start a temporary tap bonus.
pub async fn post_boost(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<BoostPayload>,
) -> Result<Json<ServerMessage>, GatewayError> {
    let player_id = authenticate(&state, &headers).await?;
    request
        .validate()
        .map_err(|e| GatewayError::Validation(e.to_string()))?;

    let handle = state.registry.attach(player_id).await?;
    let result = handle
        .activate_bonus(
            player_id,
            request.multiplier,
            request.duration_seconds,
            ConnectionId::new(),
        )
        .await;
    handle.detach().await;
    let snapshot = result?;
    Ok(Json(ServerMessage::State { state: snapshot }))
}

/// Resolve the `Authorization: Bearer <token>` header to a player.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<PlayerId, GatewayError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| GatewayError::Unauthorized(String::from("missing bearer token")))?;

    state
        .auth
        .verify(token)
        .await
        .map_err(|e| GatewayError::Unauthorized(e.to_string()))
}
