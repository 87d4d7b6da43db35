//! The per-player session state machine.
//!
//! [`PlayerSession`] owns one player's [`PlayerEconomy`] and is the
//! only code path that mutates it (single-writer discipline; the actor
//! in [`crate::actor`] serializes access). Every operation takes `now`
//! explicitly, so derived quantities -- regeneration, idle earnings,
//! bonus expiry -- come out the same no matter when the server happens
//! to recompute them.
//!
//! A session exists only while the player is `Active` (at least one
//! live connection). Construction via [`PlayerSession::activate`]
//! performs the `Idle -> Active` catch-up; dropping the actor after the
//! last connection closes is the `Active -> Idle` transition, with the
//! economy persisted and all further computation deferred until the
//! next activation.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info};

use toothtap_economy::{
    apply_experience, apply_purchase, idle_earnings, regenerate_energy, Catalog, PurchaseRejection,
};
use toothtap_types::{
    ActiveBonus, EconomySnapshot, PlayerEconomy, PurchaseEvent, TapEvent,
};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::ledger::{EventLedger, TapAdmission};

/// Milliseconds per hour, for passive-income accrual.
const MS_PER_HOUR: i64 = 3_600_000;

/// Tap-allowance bookkeeping resolution. One tap is a thousand
/// millitaps, so a taps-per-second rate times elapsed milliseconds
/// refills in integer arithmetic without drift.
const MILLITAPS: u64 = 1_000;

/// A quiet session banks at most this many seconds of the sustained
/// rate as tap credit.
const ALLOWANCE_ACCRUAL_CAP_SECS: u64 = 3_600;

/// What a catch-up computation credited on `Idle -> Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchUpReport {
    /// Offline span considered, already capped, in milliseconds.
    pub idle_ms: i64,
    /// Coins credited from passive income.
    pub idle_coins: Decimal,
    /// Energy regained over the offline span.
    pub energy_regained: Decimal,
}

/// Result of an applied (possibly trimmed) tap batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapApplied {
    /// Taps applied.
    pub applied: u32,
    /// Taps dropped at the energy ceiling.
    pub dropped: u32,
    /// Coins credited (`applied * effective_coins_per_click`).
    pub coins_delta: Decimal,
    /// Levels gained from the experience fed by this batch.
    pub levels_gained: u32,
}

/// Outcome of a tap batch. Never a fault: duplicates and rate
/// violations are typed results the gateway reports on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// The batch was applied (possibly trimmed to the energy budget).
    Applied(TapApplied),
    /// The sequence number was already applied; state unchanged.
    Duplicate,
    /// The sequence number fell below the ledger's replay window; state
    /// unchanged.
    OutOfOrder,
    /// The batch implies a tap rate above the sustained ceiling; state
    /// unchanged and the sequence number remains replayable.
    RateLimited {
        /// The ceiling that was exceeded, taps per second.
        max_taps_per_second: u32,
    },
}

/// Outcome of a purchase request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// The upgrade was bought; derived stats recomputed.
    Purchased,
    /// The purchase was refused; no mutation.
    Rejected(PurchaseRejection),
}

/// One player's authoritative session.
#[derive(Debug)]
pub struct PlayerSession {
    economy: PlayerEconomy,
    ledger: EventLedger,
    config: SessionConfig,
    /// Remaining tap credit in millitaps; refilled at the sustained
    /// rate, drained by accepted batches. Bucket state carries across
    /// batches, so splitting taps into many small batches buys nothing.
    tap_allowance: u64,
    /// When the allowance was last refilled.
    allowance_refilled_at: DateTime<Utc>,
    /// High-water mark of lazy advancement (regen + passive accrual).
    advanced_to: DateTime<Utc>,
}

impl PlayerSession {
    /// Activate a session from a persisted economy (or `None` for a
    /// first-ever connection, which seeds defaults), performing the
    /// `Idle -> Active` catch-up: capped idle earnings, energy
    /// regeneration over the offline span, `last_seen_at` advanced.
    pub fn activate(
        loaded: Option<PlayerEconomy>,
        player_id: toothtap_types::PlayerId,
        catalog: &Catalog,
        config: SessionConfig,
        now: DateTime<Utc>,
    ) -> Result<(Self, CatchUpReport), SessionError> {
        let mut economy = loaded.unwrap_or_else(|| {
            info!(player = %player_id, "seeding fresh economy");
            PlayerEconomy::seed(player_id, now)
        });

        // Derived stats are never trusted from storage; recompute from
        // the owned set against the current catalog.
        toothtap_economy::recompute_derived(&mut economy, catalog);
        economy.clear_expired_bonus(now);

        let offline_ms = now
            .signed_duration_since(economy.last_seen_at)
            .num_milliseconds()
            .max(0);
        let capped_ms = offline_ms.min(config.max_idle_ms);

        let idle_coins = idle_earnings(economy.coins_per_hour, offline_ms, config.max_idle_ms);
        economy.coins = economy.coins.checked_add(idle_coins).unwrap_or(Decimal::MAX);

        let elapsed_seconds = Decimal::from(offline_ms)
            .checked_div(Decimal::from(1_000_i64))
            .unwrap_or(Decimal::ZERO);
        let energy_regained = regenerate_energy(&mut economy, now, elapsed_seconds);

        economy.last_seen_at = now;

        let report = CatchUpReport { idle_ms: capped_ms, idle_coins, energy_regained };
        debug!(
            player = %economy.player_id,
            idle_ms = report.idle_ms,
            idle_coins = %report.idle_coins,
            energy_regained = %report.energy_regained,
            "session activated"
        );

        let ledger = EventLedger::new(&config);
        Ok((
            Self {
                economy,
                ledger,
                config,
                tap_allowance: u64::from(config.tap_burst_allowance).saturating_mul(MILLITAPS),
                allowance_refilled_at: now,
                advanced_to: now,
            },
            report,
        ))
    }

    /// The authoritative record (read-only; mutation goes through the
    /// typed operations).
    pub const fn economy(&self) -> &PlayerEconomy {
        &self.economy
    }

    /// Advance the economy to `now`: expire the bonus, regenerate
    /// energy, accrue passive income for the elapsed active span.
    ///
    /// Every operation calls this first, which is what makes
    /// [`snapshot`](Self::snapshot) always current rather than cached.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        let elapsed_ms = now.signed_duration_since(self.advanced_to).num_milliseconds();
        if elapsed_ms <= 0 {
            return;
        }

        self.economy.clear_expired_bonus(now);

        let elapsed_seconds = Decimal::from(elapsed_ms)
            .checked_div(Decimal::from(1_000_i64))
            .unwrap_or(Decimal::ZERO);
        regenerate_energy(&mut self.economy, now, elapsed_seconds);

        // Passive income while connected is uncapped; the idle ceiling
        // applies only to offline spans.
        let earned = self
            .economy
            .coins_per_hour
            .checked_mul(Decimal::from(elapsed_ms))
            .and_then(|c| c.checked_div(Decimal::from(MS_PER_HOUR)))
            .unwrap_or(Decimal::ZERO);
        self.economy.coins = self.economy.coins.checked_add(earned).unwrap_or(Decimal::MAX);

        self.advanced_to = now;
        self.economy.last_seen_at = now;
    }

    /// Apply a tap batch.
    ///
    /// Admission (ledger), then the sustained-rate ceiling, then the
    /// energy budget: only whole taps the player can pay for are
    /// applied; the remainder is dropped, not queued. The sequence is
    /// committed to the ledger only when the batch is actually consumed.
    pub fn handle_tap_batch(
        &mut self,
        event: &TapEvent,
        now: DateTime<Utc>,
    ) -> Result<TapOutcome, SessionError> {
        self.advance(now);

        match self.ledger.check_tap(event.session_id, event.client_sequence) {
            TapAdmission::DuplicateIgnored => return Ok(TapOutcome::Duplicate),
            TapAdmission::OutOfOrderRejected => return Ok(TapOutcome::OutOfOrder),
            TapAdmission::Accepted => {}
        }

        if !self.within_rate_ceiling(event.count, now) {
            debug!(
                player = %self.economy.player_id,
                count = event.count,
                "tap batch over the sustained rate ceiling, rejected"
            );
            return Ok(TapOutcome::RateLimited {
                max_taps_per_second: self.config.max_taps_per_second,
            });
        }

        let cost_per_tap = self.economy.effective_coins_per_click(now);
        let affordable = self
            .economy
            .energy_current
            .checked_div(cost_per_tap)
            .and_then(|d| d.floor().to_u32())
            .unwrap_or(0);
        let applied = event.count.min(affordable);
        let dropped = event.count.saturating_sub(applied);

        let coins_delta = cost_per_tap
            .checked_mul(Decimal::from(applied))
            .unwrap_or(Decimal::ZERO);

        let mut levels_gained = 0;
        if applied > 0 {
            self.economy.coins =
                self.economy.coins.checked_add(coins_delta).unwrap_or(Decimal::MAX);
            self.economy.energy_current = self
                .economy
                .energy_current
                .checked_sub(coins_delta)
                .unwrap_or(Decimal::ZERO)
                .max(Decimal::ZERO);
            levels_gained = apply_experience(&mut self.economy, coins_delta)?;
        }

        // The batch is consumed even when fully dropped at zero energy;
        // replaying it must not grant a second chance at the same taps.
        self.ledger.commit_tap(event.session_id, event.client_sequence, now);

        Ok(TapOutcome::Applied(TapApplied { applied, dropped, coins_delta, levels_gained }))
    }

    /// Execute a purchase with at-most-once semantics.
    ///
    /// Returns the outcome and whether it was replayed from the ledger
    /// (`true` means no evaluation happened on this call).
    pub fn handle_purchase(
        &mut self,
        catalog: &Catalog,
        event: &PurchaseEvent,
        now: DateTime<Utc>,
    ) -> (PurchaseOutcome, bool) {
        self.advance(now);

        if let Some(original) = self.ledger.purchase_outcome(event.request_id) {
            return (original, true);
        }

        let outcome = match catalog.get(&event.upgrade_id) {
            None => PurchaseOutcome::Rejected(PurchaseRejection::UnknownUpgrade),
            Some(def) => match apply_purchase(&mut self.economy, catalog, def) {
                Ok(()) => {
                    info!(
                        player = %self.economy.player_id,
                        upgrade = %event.upgrade_id,
                        cost = %def.cost,
                        "upgrade purchased"
                    );
                    PurchaseOutcome::Purchased
                }
                Err(rejection) => PurchaseOutcome::Rejected(rejection),
            },
        };

        self.ledger.record_purchase(event.request_id, outcome.clone(), now);
        (outcome, false)
    }

    /// Set a temporary tap-bonus multiplier. Expiry is evaluated lazily
    /// by [`advance`](Self::advance); there is no background sweep.
    pub fn activate_bonus(&mut self, multiplier: u32, duration_seconds: u32, now: DateTime<Utc>) {
        self.advance(now);
        let expires_at = now
            .checked_add_signed(TimeDelta::seconds(i64::from(duration_seconds)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.economy.active_bonus =
            Some(ActiveBonus { multiplier: Decimal::from(multiplier), expires_at });
        info!(
            player = %self.economy.player_id,
            multiplier,
            duration_seconds,
            "tap bonus activated"
        );
    }

    /// The full authoritative state as of `now`, never stale.
    pub fn snapshot(&mut self, now: DateTime<Utc>) -> EconomySnapshot {
        self.advance(now);
        EconomySnapshot::of(&self.economy, now)
    }

    /// Whether a batch of `count` taps fits the sustained ceiling.
    ///
    /// Token bucket over millitaps: refill at `max_taps_per_second`
    /// against wall time, drain on admission. The initial credit is the
    /// burst allowance; banked credit is capped so a long-quiet session
    /// cannot stockpile unbounded taps.
    fn within_rate_ceiling(&mut self, count: u32, now: DateTime<Utc>) -> bool {
        let elapsed_ms = now
            .signed_duration_since(self.allowance_refilled_at)
            .num_milliseconds()
            .max(0)
            .unsigned_abs();
        // taps/s times elapsed_ms is already in millitaps.
        let refill = u64::from(self.config.max_taps_per_second).saturating_mul(elapsed_ms);
        let ceiling = u64::from(self.config.max_taps_per_second)
            .saturating_mul(ALLOWANCE_ACCRUAL_CAP_SECS)
            .saturating_add(u64::from(self.config.tap_burst_allowance))
            .saturating_mul(MILLITAPS);
        self.tap_allowance = self.tap_allowance.saturating_add(refill).min(ceiling);
        self.allowance_refilled_at = now;

        let needed = u64::from(count).saturating_mul(MILLITAPS);
        if needed <= self.tap_allowance {
            self.tap_allowance = self.tap_allowance.saturating_sub(needed);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use toothtap_types::{PlayerId, RequestId, SessionId, UpgradeId};

    fn catalog() -> Catalog {
        Catalog::standard()
    }

    fn active_session(now: DateTime<Utc>) -> PlayerSession {
        let (session, _) = PlayerSession::activate(
            None,
            PlayerId::new(),
            &catalog(),
            SessionConfig::default(),
            now,
        )
        .unwrap();
        session
    }

    fn tap(session_id: SessionId, seq: u64, count: u32, player: toothtap_types::PlayerId) -> TapEvent {
        TapEvent {
            player_id: player,
            session_id,
            client_sequence: seq,
            client_timestamp: None,
            count,
        }
    }

    fn later(now: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
        now.checked_add_signed(TimeDelta::seconds(secs)).unwrap_or(now)
    }

    #[test]
    fn taps_credit_coins_and_debit_energy() {
        let now = Utc::now();
        let mut session = active_session(now);
        let player = session.economy().player_id;
        let sid = SessionId::new();

        let outcome = session.handle_tap_batch(&tap(sid, 1, 10, player), now).ok();
        assert_eq!(
            outcome,
            Some(TapOutcome::Applied(TapApplied {
                applied: 10,
                dropped: 0,
                coins_delta: Decimal::from(10_u32),
                levels_gained: 0,
            }))
        );
        // Seed coins 1 + 10 credited.
        assert_eq!(session.economy().coins, Decimal::from(11_u32));
        assert_eq!(session.economy().energy_current, Decimal::from(9_990_u32));
    }

    #[test]
    fn replaying_a_sequence_changes_nothing() {
        let now = Utc::now();
        let mut session = active_session(now);
        let player = session.economy().player_id;
        let sid = SessionId::new();

        let first = session.handle_tap_batch(&tap(sid, 3, 5, player), now).ok();
        assert!(matches!(first, Some(TapOutcome::Applied(_))));
        let coins_after = session.economy().coins;
        let energy_after = session.economy().energy_current;

        let replay = session.handle_tap_batch(&tap(sid, 3, 5, player), now).ok();
        assert_eq!(replay, Some(TapOutcome::Duplicate));
        assert_eq!(session.economy().coins, coins_after);
        assert_eq!(session.economy().energy_current, energy_after);
    }

    #[test]
    fn batches_commute_across_sessions() {
        // The same multiset of batches applied in two different orders
        // lands on identical coins/experience/level.
        let now = Utc::now();
        let a = SessionId::new();
        let b = SessionId::new();

        let mut forward = active_session(now);
        let player_f = forward.economy().player_id;
        for (sid, seq, count) in [(a, 1, 8), (a, 2, 4), (b, 1, 6)] {
            let _ = forward.handle_tap_batch(&tap(sid, seq, count, player_f), now);
        }

        let mut reversed = active_session(now);
        let player_r = reversed.economy().player_id;
        for (sid, seq, count) in [(b, 1, 6), (a, 2, 4), (a, 1, 8)] {
            let _ = reversed.handle_tap_batch(&tap(sid, seq, count, player_r), now);
        }

        assert_eq!(forward.economy().coins, reversed.economy().coins);
        assert_eq!(forward.economy().level, reversed.economy().level);
        assert_eq!(
            forward.economy().experience_current,
            reversed.economy().experience_current
        );
    }

    #[test]
    fn partial_application_stops_at_whole_taps() {
        let now = Utc::now();
        let mut session = active_session(now);
        let player = session.economy().player_id;

        // Energy 8 with per-click 5: only one whole tap is payable.
        {
            let economy = &mut session.economy;
            economy.energy_current = Decimal::from(8_u32);
            economy.base_coins_per_click = Decimal::from(5_u32);
            economy.coins = Decimal::ZERO;
        }

        let outcome = session.handle_tap_batch(&tap(SessionId::new(), 1, 3, player), now).ok();
        assert_eq!(
            outcome,
            Some(TapOutcome::Applied(TapApplied {
                applied: 1,
                dropped: 2,
                coins_delta: Decimal::from(5_u32),
                levels_gained: 0,
            }))
        );
        assert_eq!(session.economy().coins, Decimal::from(5_u32));
        assert_eq!(session.economy().energy_current, Decimal::from(3_u32));
    }

    #[test]
    fn implausible_tap_rate_is_rejected_and_replayable() {
        let now = Utc::now();
        let mut session = active_session(now);
        let player = session.economy().player_id;
        let sid = SessionId::new();

        // Default ceiling: 10/s sustained + 30 burst. 200 taps in the
        // first instant is far over it.
        let outcome = session.handle_tap_batch(&tap(sid, 1, 200, player), now).ok();
        assert_eq!(outcome, Some(TapOutcome::RateLimited { max_taps_per_second: 10 }));
        assert_eq!(session.economy().coins, Decimal::ONE);

        // 20 seconds later the same sequence number is plausible.
        let outcome = session.handle_tap_batch(&tap(sid, 1, 200, player), later(now, 20)).ok();
        assert!(matches!(outcome, Some(TapOutcome::Applied(_))));
    }

    #[test]
    fn taps_feed_experience_and_level_ups() {
        let now = Utc::now();
        let mut session = active_session(now);
        let player = session.economy().player_id;
        let sid = SessionId::new();
        session.economy.base_coins_per_click = Decimal::from(5_u32);
        session.economy.coins_per_hour = Decimal::ZERO;

        // 30 taps at 5 each = 150 experience: level 2 (requires 100)
        // with 50 carried toward the 150-point requirement.
        let first = session.handle_tap_batch(&tap(sid, 1, 30, player), now).ok();
        assert!(matches!(
            first,
            Some(TapOutcome::Applied(TapApplied { levels_gained: 1, .. }))
        ));

        // 10 more taps a little later add 50 experience, no level-up.
        let second = session.handle_tap_batch(&tap(sid, 2, 10, player), later(now, 10)).ok();
        assert!(matches!(
            second,
            Some(TapOutcome::Applied(TapApplied { levels_gained: 0, .. }))
        ));
        assert_eq!(session.economy().level, 2);
        assert_eq!(session.economy().experience_current, Decimal::from(100_u32));
        assert_eq!(session.economy().experience_required, Decimal::from(150_u32));
    }

    #[test]
    fn splitting_batches_does_not_evade_the_rate_ceiling() {
        let now = Utc::now();
        let mut session = active_session(now);
        let player = session.economy().player_id;
        let sid = SessionId::new();

        // 31-tap batches every 100 ms imply ~310 taps/s. Over ten
        // seconds the admitted total must stay near rate * elapsed
        // plus the one-time burst, not anywhere near 3100.
        let admitted: u32 = (0..100_u32)
            .map(|i| {
                let at = now
                    .checked_add_signed(TimeDelta::milliseconds(
                        i64::from(i).saturating_mul(100),
                    ))
                    .unwrap_or(now);
                let event = tap(sid, u64::from(i).saturating_add(1), 31, player);
                match session.handle_tap_batch(&event, at) {
                    Ok(TapOutcome::Applied(applied)) => applied.applied,
                    _ => 0,
                }
            })
            .sum();

        assert!(admitted >= 31, "admitted {admitted}, the burst alone fits one batch");
        assert!(admitted <= 130, "admitted {admitted}, ceiling is 10/s plus 30 burst");
    }

    #[test]
    fn purchase_is_debited_exactly_once_under_retry() {
        let now = Utc::now();
        let mut session = active_session(now);
        session.economy.coins = Decimal::from(1_000_000_u32);
        let player = session.economy().player_id;

        let event = PurchaseEvent {
            player_id: player,
            upgrade_id: UpgradeId::from("auto-1"),
            request_id: RequestId::new(),
        };

        let (first, replayed_first) = session.handle_purchase(&catalog(), &event, now);
        assert_eq!(first, PurchaseOutcome::Purchased);
        assert!(!replayed_first);
        let coins_after = session.economy().coins;

        let (second, replayed_second) = session.handle_purchase(&catalog(), &event, now);
        assert_eq!(second, PurchaseOutcome::Purchased);
        assert!(replayed_second);
        assert_eq!(session.economy().coins, coins_after);
        assert_eq!(session.economy().owned_upgrades.len(), 1);
    }

    #[test]
    fn rejected_purchase_leaves_state_untouched() {
        let now = Utc::now();
        let mut session = active_session(now);
        session.economy.coins = Decimal::from(10_000_000_u32);
        let player = session.economy().player_id;

        let event = PurchaseEvent {
            player_id: player,
            upgrade_id: UpgradeId::from("polish-2"),
            request_id: RequestId::new(),
        };
        let (outcome, _) = session.handle_purchase(&catalog(), &event, now);
        assert_eq!(
            outcome,
            PurchaseOutcome::Rejected(PurchaseRejection::LockedPrerequisite {
                required: UpgradeId::from("polish-1")
            })
        );
        assert_eq!(session.economy().coins, Decimal::from(10_000_000_u32));
        assert!(session.economy().owned_upgrades.is_empty());
    }

    #[test]
    fn bonus_applies_then_lapses() {
        let now = Utc::now();
        let mut session = active_session(now);
        let player = session.economy().player_id;
        session.activate_bonus(2, 60, now);

        let outcome = session.handle_tap_batch(&tap(SessionId::new(), 1, 5, player), now).ok();
        assert!(matches!(
            outcome,
            Some(TapOutcome::Applied(TapApplied { coins_delta, .. }))
                if coins_delta == Decimal::from(10_u32)
        ));

        // After expiry the snapshot shows the base value again.
        let snapshot = session.snapshot(later(now, 120));
        assert!(snapshot.active_bonus.is_none());
        assert_eq!(snapshot.coins_per_click, Decimal::ONE);
    }

    #[test]
    fn activation_credits_capped_idle_earnings() {
        let now = Utc::now();
        let mut offline = PlayerEconomy::seed(PlayerId::new(), now);
        offline.coins = Decimal::ZERO;
        offline.coins_per_hour = Decimal::from(1_000_u32);
        offline.owned_upgrades.insert(UpgradeId::from("auto-1"));
        // Went offline 10 hours ago; the 5-hour cap must bind.
        offline.last_seen_at = now
            .checked_sub_signed(TimeDelta::hours(10))
            .unwrap_or(now);

        let (session, report) = PlayerSession::activate(
            Some(offline),
            PlayerId::new(),
            &catalog(),
            SessionConfig::default(),
            now,
        )
        .unwrap();

        assert_eq!(report.idle_coins, Decimal::from(5_000_u32));
        assert_eq!(session.economy().coins, Decimal::from(5_000_u32));
        assert_eq!(session.economy().last_seen_at, now);
    }

    #[test]
    fn snapshot_reflects_regeneration_without_a_mutation() {
        let now = Utc::now();
        let mut session = active_session(now);
        let player = session.economy().player_id;

        // Spend some energy, then ask for a snapshot 30 seconds later:
        // regen at 1/s (per-click 1) must be visible.
        let _ = session.handle_tap_batch(&tap(SessionId::new(), 1, 30, player), now);
        assert_eq!(session.economy().energy_current, Decimal::from(9_970_u32));

        let snapshot = session.snapshot(later(now, 30));
        assert_eq!(snapshot.energy_current, Decimal::from(10_000_u32));
    }

    #[test]
    fn passive_income_accrues_while_active() {
        let now = Utc::now();
        let mut session = active_session(now);
        session.economy.coins = Decimal::ZERO;
        session.economy.coins_per_hour = Decimal::from(3_600_u32);

        // One coin per second at 3600/h.
        let snapshot = session.snapshot(later(now, 90));
        assert_eq!(snapshot.coins, Decimal::from(90_u32));
    }
}
