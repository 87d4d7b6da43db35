//! Validated gameplay events handed from the ingress gateway to the
//! session state machine.
//!
//! Events carry their idempotence keys: tap batches are keyed by a
//! strictly increasing sequence number scoped to one connection-session,
//! purchases by a client-generated request UUID. The event ledger uses
//! these keys to guarantee exactly-once application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{PlayerId, RequestId, SessionId, UpgradeId};

/// A batch of taps accumulated client-side and flushed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapEvent {
    /// The player reporting the taps.
    pub player_id: PlayerId,
    /// The connection-session the sequence number is scoped to.
    pub session_id: SessionId,
    /// Strictly increasing per session; the idempotence key.
    pub client_sequence: u64,
    /// Client-reported send time. Informational only -- the server is
    /// the sole timekeeper for rate and regeneration math.
    pub client_timestamp: Option<DateTime<Utc>>,
    /// Number of taps in the batch.
    pub count: u32,
}

/// A request to purchase one upgrade.
///
/// Purchases must execute at most once even under retry, so the
/// client-generated `request_id` is the idempotence key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseEvent {
    /// The purchasing player.
    pub player_id: PlayerId,
    /// The catalog upgrade being bought.
    pub upgrade_id: UpgradeId,
    /// Client-generated UUID; replays with the same ID return the
    /// original outcome without re-executing.
    pub request_id: RequestId,
}
