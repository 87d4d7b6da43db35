//! Wire messages exchanged with the client over the game channel.
//!
//! Message names mirror the socket events the original client listens
//! for (`game:state`, `game:click:result`, `game:energy:update`,
//! `game:error`). Both the `WebSocket` channel and the REST fallback
//! speak these shapes; `ts-rs` exports them for the front-end.
//!
//! Inbound payloads carry `validator` constraints so the gateway can
//! reject malformed shapes before any game state is touched.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

use crate::economy::EconomySnapshot;
use crate::ids::UpgradeId;

/// Upper bound on taps per batch accepted at the wire level.
///
/// One client flush interval at the sustained ceiling is far below
/// this; anything larger is a malformed or forged payload.
pub const MAX_TAPS_PER_BATCH: u32 = 10_000;

/// Messages the client may send on the game channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ClientMessage {
    /// A batch of taps.
    Tap(TapPayload),
    /// A purchase request.
    Purchase(PurchasePayload),
    /// Activate a temporary tap bonus.
    Boost(BoostPayload),
    /// Ask for a fresh authoritative snapshot.
    State,
}

/// Payload of a `tap` message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TapPayload {
    /// Strictly increasing sequence number within this connection.
    pub session_seq: u64,
    /// Number of taps in the batch.
    #[validate(range(min = 1, max = 10_000))]
    pub count: u32,
    /// Client send time, informational only.
    pub sent_at: Option<DateTime<Utc>>,
}

/// Payload of a `purchase` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PurchasePayload {
    /// Catalog slug of the upgrade to buy.
    #[validate(length(min = 1, max = 64))]
    pub upgrade_id: String,
    /// Client-generated idempotence key.
    pub request_id: Uuid,
}

/// Payload of a `boost` message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BoostPayload {
    /// Per-click multiplier to apply.
    #[validate(range(min = 2, max = 10))]
    pub multiplier: u32,
    /// How long the bonus lasts, in seconds.
    #[validate(range(min = 1, max = 86_400))]
    pub duration_seconds: u32,
}

/// Why a tap batch was not (fully) applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TapRejection {
    /// The batch's sequence number was already applied.
    Duplicate,
    /// The batch's sequence number fell below the replay window.
    OutOfOrder,
    /// The batch implies a tap rate above the sustained ceiling.
    RateLimited,
}

/// Outcome of a purchase request, as reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PurchaseStatus {
    /// The upgrade was bought and derived stats recomputed.
    Purchased,
    /// The player cannot afford the upgrade. No mutation occurred.
    InsufficientFunds,
    /// A prerequisite or unlock gate is not satisfied. No mutation.
    Locked,
    /// The upgrade is already owned.
    AlreadyOwned,
    /// The upgrade slug is not in the catalog.
    UnknownUpgrade,
}

/// Machine-readable reason on a `game:error` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum WireErrorReason {
    /// The message failed shape validation.
    Validation,
    /// The connection exceeded its message rate limit.
    RateLimited,
    /// The credential was rejected.
    Unauthorized,
    /// The player's persisted state is unreadable; the session refuses
    /// to guess and will not start.
    CorruptState,
    /// An internal server failure.
    Internal,
}

/// Messages pushed from the server to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type")]
#[ts(export, export_to = "bindings/")]
pub enum ServerMessage {
    /// Full authoritative snapshot.
    #[serde(rename = "game:state")]
    State {
        /// The snapshot as of the server clock.
        state: EconomySnapshot,
    },
    /// Result of a tap batch.
    #[serde(rename = "game:click:result")]
    ClickResult {
        /// Taps actually applied (may be fewer than reported).
        applied: u32,
        /// Taps dropped at the energy ceiling.
        dropped: u32,
        /// Coins credited by this batch.
        #[ts(as = "String")]
        coins_delta: Decimal,
        /// Why the batch was rejected or trimmed, if it was.
        rejected: Option<TapRejection>,
        /// Authoritative snapshot after application.
        state: EconomySnapshot,
    },
    /// Lightweight energy refresh.
    #[serde(rename = "game:energy:update")]
    EnergyUpdate {
        /// Current energy.
        #[ts(as = "String")]
        energy_current: Decimal,
        /// Energy ceiling.
        #[ts(as = "String")]
        energy_max: Decimal,
    },
    /// Result of a purchase request.
    #[serde(rename = "game:purchase:result")]
    PurchaseResult {
        /// The upgrade the request named.
        upgrade_id: UpgradeId,
        /// What happened.
        status: PurchaseStatus,
        /// Authoritative snapshot after the attempt.
        state: EconomySnapshot,
    },
    /// An error outside the domain-outcome vocabulary.
    #[serde(rename = "game:error")]
    Error {
        /// Machine-readable reason.
        reason: WireErrorReason,
        /// Human-readable detail.
        detail: String,
    },
}
