//! The idempotent event ledger.
//!
//! Guarantees each event is applied exactly once per player, even under
//! network retries or duplicate delivery. Tap batches are tracked per
//! connection-session by the set of applied sequence numbers inside a
//! sliding window below the highest one seen, so a late-delivered batch
//! with a fresh sequence number still applies (coins and energy are
//! commutative; order across batches must not change the result).
//! Purchases are tracked by a bounded memory of client request IDs
//! mapped to their original outcomes. Both sides evict on count and age
//! so a long-lived session never grows without bound.
//!
//! The ledger is bookkeeping only: [`EventLedger::check_tap`] does not
//! mutate, and the session commits a sequence only after the batch has
//! actually been applied, so a rate-rejected batch stays replayable.

use std::collections::{BTreeSet, HashMap, VecDeque};

use chrono::{DateTime, TimeDelta, Utc};
use toothtap_types::{RequestId, SessionId};

use crate::config::SessionConfig;
use crate::session::PurchaseOutcome;

/// Admission verdict for a tap batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapAdmission {
    /// The sequence number is new; the batch may be applied. Gaps and
    /// late deliveries inside the replay window both land here.
    Accepted,
    /// The sequence number was already applied; the batch is a
    /// redelivery. Not user-visible as a failure.
    DuplicateIgnored,
    /// The sequence number fell out of the replay window; too stale to
    /// deduplicate, so it is never applied.
    OutOfOrderRejected,
}

#[derive(Debug, Clone)]
struct SessionSequences {
    /// Applied sequence numbers at or above the window floor.
    applied: BTreeSet<u64>,
    /// Highest sequence applied; the window floor hangs off this.
    highest: u64,
    touched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct RememberedPurchase {
    outcome: PurchaseOutcome,
    recorded_at: DateTime<Utc>,
}

/// Per-player idempotence bookkeeping.
#[derive(Debug)]
pub struct EventLedger {
    sessions: HashMap<SessionId, SessionSequences>,
    purchases: HashMap<RequestId, RememberedPurchase>,
    purchase_order: VecDeque<RequestId>,
    sequence_window: u64,
    max_sessions: usize,
    session_ttl: TimeDelta,
    max_requests: usize,
    request_ttl: TimeDelta,
}

impl EventLedger {
    /// Create a ledger with the given eviction horizons.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: HashMap::new(),
            purchases: HashMap::new(),
            purchase_order: VecDeque::new(),
            sequence_window: config.ledger_sequence_window,
            max_sessions: config.ledger_max_sessions,
            session_ttl: TimeDelta::seconds(config.ledger_session_ttl_secs),
            max_requests: config.ledger_max_requests,
            request_ttl: TimeDelta::seconds(config.ledger_request_ttl_secs),
        }
    }

    /// Judge a tap batch without committing anything.
    pub fn check_tap(&self, session_id: SessionId, sequence: u64) -> TapAdmission {
        match self.sessions.get(&session_id) {
            None => TapAdmission::Accepted,
            Some(record) if record.applied.contains(&sequence) => TapAdmission::DuplicateIgnored,
            Some(record) if sequence < record.highest.saturating_sub(self.sequence_window) => {
                TapAdmission::OutOfOrderRejected
            }
            Some(_) => TapAdmission::Accepted,
        }
    }

    /// Record that a tap batch was applied, remembering its sequence
    /// number, sliding the replay window, and evicting stale
    /// bookkeeping.
    pub fn commit_tap(&mut self, session_id: SessionId, sequence: u64, now: DateTime<Utc>) {
        let record = self.sessions.entry(session_id).or_insert_with(|| SessionSequences {
            applied: BTreeSet::new(),
            highest: sequence,
            touched_at: now,
        });
        record.applied.insert(sequence);
        record.highest = record.highest.max(sequence);
        record.touched_at = now;
        // Forget applied sequences below the window floor; check_tap
        // rejects that range outright, so they can never re-apply.
        let floor = record.highest.saturating_sub(self.sequence_window);
        record.applied = record.applied.split_off(&floor);
        self.evict_sessions(now);
    }

    /// The original outcome of a previously executed purchase, if the
    /// request ID has been seen inside the eviction horizon.
    pub fn purchase_outcome(&self, request_id: RequestId) -> Option<PurchaseOutcome> {
        self.purchases.get(&request_id).map(|p| p.outcome.clone())
    }

    /// Remember a purchase outcome under its request ID.
    pub fn record_purchase(
        &mut self,
        request_id: RequestId,
        outcome: PurchaseOutcome,
        now: DateTime<Utc>,
    ) {
        if self.purchases.insert(request_id, RememberedPurchase { outcome, recorded_at: now }).is_none()
        {
            self.purchase_order.push_back(request_id);
        }
        self.evict_purchases(now);
    }

    /// Number of live session sequence records (for observability and tests).
    pub fn tracked_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Number of remembered purchase requests.
    pub fn tracked_purchases(&self) -> usize {
        self.purchases.len()
    }

    fn evict_sessions(&mut self, now: DateTime<Utc>) {
        let ttl = self.session_ttl;
        self.sessions.retain(|_, mark| now.signed_duration_since(mark.touched_at) <= ttl);

        while self.sessions.len() > self.max_sessions {
            // Drop the least recently touched record.
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|(_, mark)| mark.touched_at)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    self.sessions.remove(&id);
                }
                None => break,
            }
        }
    }

    fn evict_purchases(&mut self, now: DateTime<Utc>) {
        while self.purchase_order.len() > self.max_requests {
            match self.purchase_order.pop_front() {
                Some(evicted) => {
                    self.purchases.remove(&evicted);
                }
                None => break,
            }
        }

        let ttl = self.request_ttl;
        while let Some(front) = self.purchase_order.front().copied() {
            let expired = self
                .purchases
                .get(&front)
                .is_none_or(|p| now.signed_duration_since(p.recorded_at) > ttl);
            if expired {
                self.purchase_order.pop_front();
                self.purchases.remove(&front);
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> EventLedger {
        EventLedger::new(&SessionConfig::default())
    }

    #[test]
    fn fresh_sequence_is_accepted_and_gaps_are_tolerated() {
        let mut ledger = ledger();
        let session = SessionId::new();
        let now = Utc::now();

        assert_eq!(ledger.check_tap(session, 1), TapAdmission::Accepted);
        ledger.commit_tap(session, 1, now);
        // A gap (2 was lost) is fine; 5 is still new.
        assert_eq!(ledger.check_tap(session, 5), TapAdmission::Accepted);
    }

    #[test]
    fn replayed_sequence_is_duplicate_and_stale_is_out_of_order() {
        let config = SessionConfig { ledger_sequence_window: 64, ..SessionConfig::default() };
        let mut ledger = EventLedger::new(&config);
        let session = SessionId::new();
        let now = Utc::now();

        ledger.commit_tap(session, 100, now);
        assert_eq!(ledger.check_tap(session, 100), TapAdmission::DuplicateIgnored);
        assert_eq!(ledger.check_tap(session, 101), TapAdmission::Accepted);
        // Below the 64-wide replay window there is no dedupe memory, so
        // the sequence is refused rather than risked twice.
        assert_eq!(ledger.check_tap(session, 5), TapAdmission::OutOfOrderRejected);
    }

    #[test]
    fn late_sequences_inside_the_window_apply_exactly_once() {
        let mut ledger = ledger();
        let session = SessionId::new();
        let now = Utc::now();

        // Sequence 2 arrives first; 1 is late but unique, so it is
        // still admitted, and only once.
        ledger.commit_tap(session, 2, now);
        assert_eq!(ledger.check_tap(session, 1), TapAdmission::Accepted);
        ledger.commit_tap(session, 1, now);
        assert_eq!(ledger.check_tap(session, 1), TapAdmission::DuplicateIgnored);
        assert_eq!(ledger.check_tap(session, 2), TapAdmission::DuplicateIgnored);
    }

    #[test]
    fn window_memory_is_bounded() {
        let config = SessionConfig { ledger_sequence_window: 8, ..SessionConfig::default() };
        let mut ledger = EventLedger::new(&config);
        let session = SessionId::new();
        let now = Utc::now();

        for seq in 1..=100_u64 {
            ledger.commit_tap(session, seq, now);
        }
        // Only the window below the highest sequence is remembered.
        assert_eq!(ledger.check_tap(session, 100), TapAdmission::DuplicateIgnored);
        assert_eq!(ledger.check_tap(session, 92), TapAdmission::DuplicateIgnored);
        assert_eq!(ledger.check_tap(session, 91), TapAdmission::OutOfOrderRejected);
    }

    #[test]
    fn sequences_are_scoped_per_session() {
        let mut ledger = ledger();
        let a = SessionId::new();
        let b = SessionId::new();
        let now = Utc::now();

        ledger.commit_tap(a, 10, now);
        assert_eq!(ledger.check_tap(b, 1), TapAdmission::Accepted);
    }

    #[test]
    fn uncommitted_check_does_not_commit_the_sequence() {
        let mut ledger = ledger();
        let session = SessionId::new();

        assert_eq!(ledger.check_tap(session, 2), TapAdmission::Accepted);
        // Not committed (e.g. the batch hit the rate ceiling); the same
        // sequence must remain replayable.
        assert_eq!(ledger.check_tap(session, 2), TapAdmission::Accepted);
        ledger.commit_tap(session, 2, Utc::now());
        assert_eq!(ledger.check_tap(session, 2), TapAdmission::DuplicateIgnored);
    }

    #[test]
    fn purchase_replay_returns_original_outcome() {
        let mut ledger = ledger();
        let request = RequestId::new();
        let now = Utc::now();

        assert_eq!(ledger.purchase_outcome(request), None);
        ledger.record_purchase(request, PurchaseOutcome::Purchased, now);
        assert_eq!(ledger.purchase_outcome(request), Some(PurchaseOutcome::Purchased));
    }

    #[test]
    fn purchase_memory_is_bounded_by_count() {
        let config = SessionConfig { ledger_max_requests: 4, ..SessionConfig::default() };
        let mut ledger = EventLedger::new(&config);
        let now = Utc::now();

        let first = RequestId::new();
        ledger.record_purchase(first, PurchaseOutcome::Purchased, now);
        for _ in 0..10 {
            ledger.record_purchase(RequestId::new(), PurchaseOutcome::Purchased, now);
        }

        assert!(ledger.tracked_purchases() <= 4);
        assert_eq!(ledger.purchase_outcome(first), None);
    }

    #[test]
    fn session_records_are_bounded_by_count() {
        let config = SessionConfig { ledger_max_sessions: 3, ..SessionConfig::default() };
        let mut ledger = EventLedger::new(&config);
        let now = Utc::now();

        for _ in 0..12 {
            ledger.commit_tap(SessionId::new(), 1, now);
        }
        assert!(ledger.tracked_sessions() <= 3);
    }
}
