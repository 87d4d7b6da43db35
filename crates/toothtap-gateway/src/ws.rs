//! `WebSocket` game channel.
//!
//! Clients connect to `GET /ws/game?token=...` and exchange the
//! [`ClientMessage`] / [`ServerMessage`] vocabulary as JSON text
//! frames. Each socket gets its own [`ConnectionId`] and a fresh
//! [`SessionId`] scoping its tap sequence numbers, attaches to the
//! player's session actor, and subscribes to the actor's broadcast
//! channel so mutations made through the player's other connections
//! are pushed here too.
//!
//! If a client falls behind on broadcasts, lagged messages are skipped
//! and the client resumes from the next authoritative snapshot.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use tracing::{debug, warn};
use validator::Validate;

use toothtap_session::{SessionError, SessionHandle};
use toothtap_types::{
    ClientMessage, ConnectionId, PlayerId, PurchaseEvent, RequestId, ServerMessage, SessionId,
    TapEvent, UpgradeId, WireErrorReason,
};

use crate::error::GatewayError;
use crate::protocol;
use crate::rate_limit::TokenBucket;
use crate::state::AppState;

/// Query parameters for the `WebSocket` upgrade request.
///
/// Browsers cannot set headers on a `WebSocket` handshake, so the
/// credential rides in the query string.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Bearer credential.
    pub token: String,
}

/// Upgrade an HTTP request to the game channel.
///
/// # Route
///
/// `GET /ws/game?token=<credential>`
pub async fn ws_game(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    // Authenticate before upgrading so a bad credential is an HTTP 401,
    // not a socket that opens and immediately closes.
    let player_id = match state.auth.verify(&query.token).await {
        Ok(id) => id,
        Err(e) => return GatewayError::Unauthorized(e.to_string()).into_response(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, player_id))
}

/// Drive one socket: attach, stream, detach.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, player_id: PlayerId) {
    let connection_id = ConnectionId::new();
    let session_id = SessionId::new();
    debug!(player = %player_id, connection = %connection_id, "game socket connected");

    let handle = match state.registry.attach(player_id).await {
        Ok(handle) => handle,
        Err(e) => {
            warn!(player = %player_id, %e, "session attach refused");
            let reason = GatewayError::Session(e).reason();
            let _ = send(&mut socket, &error_message(reason, "session unavailable")).await;
            return;
        }
    };

    let mut updates = handle.subscribe();
    let mut bucket = TokenBucket::new(state.limits, Utc::now());

    // The first frame is always the authoritative snapshot, including
    // any idle earnings the attach just credited.
    match handle.snapshot(player_id).await {
        Ok(snapshot) => {
            if !send(&mut socket, &ServerMessage::State { state: snapshot }).await {
                handle.detach().await;
                return;
            }
        }
        Err(e) => {
            warn!(player = %player_id, %e, "initial snapshot failed");
            handle.detach().await;
            return;
        }
    }

    loop {
        tokio::select! {
            // Updates caused by the player's other connections.
            update = updates.recv() => {
                match update {
                    Ok(broadcast) => {
                        if broadcast.origin == connection_id {
                            continue;
                        }
                        if !send(&mut socket, &broadcast.message).await {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        debug!(player = %player_id, skipped = n, "socket lagged on broadcasts");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!(player = %player_id, "actor broadcast channel closed");
                        break;
                    }
                }
            }
            // Frames from the client.
            frame = socket.recv() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if !bucket.try_consume(Utc::now()) {
                            let msg = error_message(WireErrorReason::RateLimited, "message rate exceeded");
                            if !send(&mut socket, &msg).await {
                                break;
                            }
                            continue;
                        }
                        match dispatch(&handle, &text, player_id, connection_id, session_id).await {
                            Ok(reply) => {
                                if !send(&mut socket, &reply).await {
                                    break;
                                }
                            }
                            Err(DispatchError::Fatal(e)) => {
                                warn!(player = %player_id, %e, "session command failed");
                                let msg = error_message(WireErrorReason::Internal, "session unavailable");
                                let _ = send(&mut socket, &msg).await;
                                break;
                            }
                            Err(DispatchError::Rejected(reply)) => {
                                if !send(&mut socket, &reply).await {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(player = %player_id, connection = %connection_id, "game socket disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(player = %player_id, "socket error: {e}");
                        break;
                    }
                    _ => {
                        // Binary and pong frames are ignored.
                    }
                }
            }
        }
    }

    handle.detach().await;
}

/// A client frame that could not be served.
enum DispatchError {
    /// The frame was refused; reply and keep the socket open.
    Rejected(ServerMessage),
    /// The session is gone; report and close.
    Fatal(SessionError),
}

impl From<SessionError> for DispatchError {
    fn from(e: SessionError) -> Self {
        Self::Fatal(e)
    }
}

/// Parse and execute one client frame, producing the direct reply.
async fn dispatch(
    handle: &SessionHandle,
    text: &str,
    player_id: PlayerId,
    connection_id: ConnectionId,
    session_id: SessionId,
) -> Result<ServerMessage, DispatchError> {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            return Err(DispatchError::Rejected(error_message(
                WireErrorReason::Validation,
                &format!("unparseable message: {e}"),
            )));
        }
    };

    match message {
        ClientMessage::Tap(payload) => {
            if let Err(e) = payload.validate() {
                return Err(DispatchError::Rejected(error_message(
                    WireErrorReason::Validation,
                    &e.to_string(),
                )));
            }
            let event = TapEvent {
                player_id,
                session_id,
                client_sequence: payload.session_seq,
                client_timestamp: payload.sent_at,
                count: payload.count,
            };
            let (outcome, snapshot) = handle.tap_batch(event, connection_id).await?;
            Ok(protocol::click_result(&outcome, snapshot))
        }
        ClientMessage::Purchase(payload) => {
            if let Err(e) = payload.validate() {
                return Err(DispatchError::Rejected(error_message(
                    WireErrorReason::Validation,
                    &e.to_string(),
                )));
            }
            let upgrade_id = UpgradeId::from(payload.upgrade_id.as_str());
            let event = PurchaseEvent {
                player_id,
                upgrade_id: upgrade_id.clone(),
                request_id: RequestId::from(payload.request_id),
            };
            let (outcome, snapshot) = handle.purchase(event, connection_id).await?;
            Ok(protocol::purchase_result(upgrade_id, &outcome, snapshot))
        }
        ClientMessage::Boost(payload) => {
            if let Err(e) = payload.validate() {
                return Err(DispatchError::Rejected(error_message(
                    WireErrorReason::Validation,
                    &e.to_string(),
                )));
            }
            let snapshot = handle
                .activate_bonus(player_id, payload.multiplier, payload.duration_seconds, connection_id)
                .await?;
            Ok(ServerMessage::State { state: snapshot })
        }
        ClientMessage::State => {
            let snapshot = handle.snapshot(player_id).await?;
            Ok(ServerMessage::State { state: snapshot })
        }
    }
}

/// Serialize and send one server message. Returns `false` when the
/// socket is gone.
async fn send(socket: &mut WebSocket, message: &ServerMessage) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(j) => j,
        Err(e) => {
            warn!("failed to serialize server message: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

fn error_message(reason: WireErrorReason, detail: &str) -> ServerMessage {
    ServerMessage::Error { reason, detail: detail.to_owned() }
}
