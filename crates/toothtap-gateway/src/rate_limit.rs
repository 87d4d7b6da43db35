//! Per-connection message rate limiting.
//!
//! A token bucket in integer millitokens (no floats anywhere near the
//! hot path). One bucket per live connection, checked before the
//! message payload is even parsed, so a flooding client costs one
//! branch per frame.

use chrono::{DateTime, Utc};

use crate::config::LimitsConfig;

/// Millitokens per token.
const SCALE: u64 = 1_000;

/// Integer token bucket refilled by wall-clock elapsed time.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    /// Bucket ceiling in millitokens (sustained rate + burst).
    capacity: u64,
    /// Current fill in millitokens.
    tokens: u64,
    /// Refill rate in millitokens per second.
    refill_per_second: u64,
    last_refill: DateTime<Utc>,
}

impl TokenBucket {
    /// Build a bucket from the configured limits, starting full.
    #[must_use]
    pub fn new(limits: LimitsConfig, now: DateTime<Utc>) -> Self {
        let capacity = u64::from(limits.messages_per_second)
            .saturating_add(u64::from(limits.message_burst))
            .saturating_mul(SCALE);
        Self {
            capacity,
            tokens: capacity,
            refill_per_second: u64::from(limits.messages_per_second).saturating_mul(SCALE),
            last_refill: now,
        }
    }

    /// Try to spend one token. Returns `false` when the connection is
    /// over its rate and the message should be refused.
    pub fn try_consume(&mut self, now: DateTime<Utc>) -> bool {
        self.refill(now);
        if self.tokens >= SCALE {
            self.tokens = self.tokens.saturating_sub(SCALE);
            true
        } else {
            false
        }
    }

    fn refill(&mut self, now: DateTime<Utc>) {
        let elapsed_ms = now
            .signed_duration_since(self.last_refill)
            .num_milliseconds()
            .max(0)
            .unsigned_abs();
        if elapsed_ms == 0 {
            return;
        }
        let refill = self
            .refill_per_second
            .saturating_mul(elapsed_ms)
            .checked_div(1_000)
            .unwrap_or(0);
        self.tokens = self.tokens.saturating_add(refill).min(self.capacity);
        self.last_refill = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn limits(per_second: u32, burst: u32) -> LimitsConfig {
        LimitsConfig { messages_per_second: per_second, message_burst: burst }
    }

    #[test]
    fn burst_is_allowed_then_cut_off() {
        let now = Utc::now();
        let mut bucket = TokenBucket::new(limits(10, 5), now);
        for _ in 0..15 {
            assert!(bucket.try_consume(now));
        }
        assert!(!bucket.try_consume(now));
    }

    #[test]
    fn tokens_refill_with_elapsed_time() {
        let now = Utc::now();
        let mut bucket = TokenBucket::new(limits(10, 0), now);
        for _ in 0..10 {
            assert!(bucket.try_consume(now));
        }
        assert!(!bucket.try_consume(now));

        let half_second = now
            .checked_add_signed(TimeDelta::milliseconds(500))
            .unwrap_or(now);
        // 10/s for half a second refills 5 tokens.
        for _ in 0..5 {
            assert!(bucket.try_consume(half_second));
        }
        assert!(!bucket.try_consume(half_second));
    }

    #[test]
    fn refill_never_exceeds_capacity() {
        let now = Utc::now();
        let mut bucket = TokenBucket::new(limits(10, 5), now);
        let much_later = now.checked_add_signed(TimeDelta::hours(1)).unwrap_or(now);
        let granted =
            std::iter::from_fn(|| bucket.try_consume(much_later).then_some(())).count();
        assert_eq!(granted, 15);
    }
}
