//! Shared type definitions for the Toothtap game server.
//!
//! This crate is the single source of truth for the types used across
//! the Toothtap workspace. Client-visible types flow downstream to
//! `TypeScript` via `ts-rs` for the game front-end.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifier wrappers
//! - [`economy`] -- The authoritative [`PlayerEconomy`] record and its
//!   client projection
//! - [`events`] -- Validated gameplay events (tap batches, purchases)
//! - [`wire`] -- JSON messages exchanged on the game channel

pub mod economy;
pub mod events;
pub mod ids;
pub mod wire;

// Re-export all public types at crate root for convenience.
pub use economy::{
    ActiveBonus, EconomySnapshot, PlayerEconomy, SEED_COINS, SEED_ENERGY_MAX,
    SEED_EXPERIENCE_REQUIRED,
};
pub use events::{PurchaseEvent, TapEvent};
pub use ids::{ConnectionId, PlayerId, RequestId, SessionId, UpgradeId};
pub use wire::{
    BoostPayload, ClientMessage, PurchasePayload, PurchaseStatus, ServerMessage, TapPayload,
    TapRejection, WireErrorReason, MAX_TAPS_PER_BATCH,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the client-visible types.

    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings for every #[ts(export)] type to the
        // `bindings/` directory relative to the crate root when this
        // test runs.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::PlayerId::export_all();
        let _ = crate::ids::SessionId::export_all();
        let _ = crate::ids::ConnectionId::export_all();
        let _ = crate::ids::RequestId::export_all();
        let _ = crate::ids::UpgradeId::export_all();

        // Economy projection
        let _ = crate::economy::ActiveBonus::export_all();
        let _ = crate::economy::EconomySnapshot::export_all();

        // Wire messages
        let _ = crate::wire::ClientMessage::export_all();
        let _ = crate::wire::TapPayload::export_all();
        let _ = crate::wire::PurchasePayload::export_all();
        let _ = crate::wire::BoostPayload::export_all();
        let _ = crate::wire::TapRejection::export_all();
        let _ = crate::wire::PurchaseStatus::export_all();
        let _ = crate::wire::WireErrorReason::export_all();
        let _ = crate::wire::ServerMessage::export_all();
    }
}
