//! Translation between session outcomes and wire messages.
//!
//! Both the REST surface and the `WebSocket` channel report results in
//! the same [`ServerMessage`] shapes, so mis-sequenced or rate-rejected
//! batches look identical to the client regardless of transport.

use rust_decimal::Decimal;

use toothtap_economy::PurchaseRejection;
use toothtap_session::{PurchaseOutcome, TapOutcome};
use toothtap_types::{
    EconomySnapshot, PurchaseStatus, ServerMessage, TapRejection, UpgradeId,
};

/// Build the `game:click:result` message for a tap batch outcome.
#[must_use]
pub fn click_result(outcome: &TapOutcome, state: EconomySnapshot) -> ServerMessage {
    match outcome {
        TapOutcome::Applied(applied) => ServerMessage::ClickResult {
            applied: applied.applied,
            dropped: applied.dropped,
            coins_delta: applied.coins_delta,
            rejected: None,
            state,
        },
        TapOutcome::Duplicate => rejected_click(TapRejection::Duplicate, state),
        TapOutcome::OutOfOrder => rejected_click(TapRejection::OutOfOrder, state),
        TapOutcome::RateLimited { .. } => rejected_click(TapRejection::RateLimited, state),
    }
}

fn rejected_click(rejection: TapRejection, state: EconomySnapshot) -> ServerMessage {
    ServerMessage::ClickResult {
        applied: 0,
        dropped: 0,
        coins_delta: Decimal::ZERO,
        rejected: Some(rejection),
        state,
    }
}

/// Build the `game:purchase:result` message for a purchase outcome.
#[must_use]
pub fn purchase_result(
    upgrade_id: UpgradeId,
    outcome: &PurchaseOutcome,
    state: EconomySnapshot,
) -> ServerMessage {
    ServerMessage::PurchaseResult { upgrade_id, status: purchase_status(outcome), state }
}

/// Collapse the rejection detail into the client-facing status.
#[must_use]
pub const fn purchase_status(outcome: &PurchaseOutcome) -> PurchaseStatus {
    match outcome {
        PurchaseOutcome::Purchased => PurchaseStatus::Purchased,
        PurchaseOutcome::Rejected(rejection) => match rejection {
            PurchaseRejection::InsufficientFunds { .. } => PurchaseStatus::InsufficientFunds,
            PurchaseRejection::LockedPrerequisite { .. } | PurchaseRejection::LockedGate { .. } => {
                PurchaseStatus::Locked
            }
            PurchaseRejection::AlreadyOwned => PurchaseStatus::AlreadyOwned,
            PurchaseRejection::UnknownUpgrade => PurchaseStatus::UnknownUpgrade,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toothtap_session::TapApplied;

    #[test]
    fn rate_limited_batches_surface_as_rejections() {
        let outcome = TapOutcome::RateLimited { max_taps_per_second: 10 };
        let msg = click_result(&outcome, test_snapshot());
        assert!(matches!(
            msg,
            ServerMessage::ClickResult { applied: 0, rejected: Some(TapRejection::RateLimited), .. }
        ));
    }

    #[test]
    fn applied_batches_carry_their_deltas() {
        let outcome = TapOutcome::Applied(TapApplied {
            applied: 7,
            dropped: 3,
            coins_delta: Decimal::from(7_u32),
            levels_gained: 0,
        });
        let msg = click_result(&outcome, test_snapshot());
        assert!(matches!(
            msg,
            ServerMessage::ClickResult { applied: 7, dropped: 3, rejected: None, .. }
        ));
    }

    #[test]
    fn both_lock_rejections_collapse_to_locked() {
        let gated = PurchaseOutcome::Rejected(PurchaseRejection::LockedGate { required_tier: 2 });
        let chained = PurchaseOutcome::Rejected(PurchaseRejection::LockedPrerequisite {
            required: UpgradeId::from("polish-1"),
        });
        assert_eq!(purchase_status(&gated), PurchaseStatus::Locked);
        assert_eq!(purchase_status(&chained), PurchaseStatus::Locked);
    }

    fn test_snapshot() -> EconomySnapshot {
        let economy = toothtap_types::PlayerEconomy::seed(
            toothtap_types::PlayerId::new(),
            chrono::Utc::now(),
        );
        EconomySnapshot::of(&economy, chrono::Utc::now())
    }
}
