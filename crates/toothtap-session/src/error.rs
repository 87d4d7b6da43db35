//! Error types for the session layer.
//!
//! Domain rejections (insufficient funds, duplicate events, rate
//! ceilings) are *outcomes*, not errors -- they travel through
//! [`TapOutcome`](crate::session::TapOutcome) and
//! [`PurchaseOutcome`](crate::session::PurchaseOutcome). This enum
//! covers genuine faults only.

use toothtap_economy::EconomyError;
use toothtap_types::PlayerId;

use crate::store::StoreError;

/// Faults that can occur while operating a player session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The player's persisted record is unreadable. The session refuses
    /// to guess: it will not start, and the player's economy is never
    /// silently reset. Requires administrative recovery.
    #[error("corrupt state for player {player_id}: {detail}")]
    CorruptState {
        /// The affected player.
        player_id: PlayerId,
        /// What failed to decode.
        detail: String,
    },

    /// The durable store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A pure economy derivation faulted (arithmetic overflow).
    #[error("economy error: {0}")]
    Economy(#[from] EconomyError),

    /// The session actor is gone and could not be respawned.
    #[error("session mailbox closed for player {player_id}")]
    MailboxClosed {
        /// The affected player.
        player_id: PlayerId,
    },
}
