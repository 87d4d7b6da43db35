//! Idle (offline) earnings.
//!
//! Passive income accrues while no connection is active, but only up to
//! a configured ceiling (default 5 hours) so a player who disappears
//! for a week does not return to an unbounded payout. The server clock
//! is the only timekeeper; client-reported "last online" values are
//! never consulted.

use rust_decimal::Decimal;

/// Default ceiling on the idle-earnings window, in milliseconds (5 hours).
pub const DEFAULT_MAX_IDLE_MS: i64 = 5 * 60 * 60 * 1000;

/// Milliseconds per hour, the divisor of the earnings formula.
const MS_PER_HOUR: i64 = 3_600_000;

/// Coins earned over an offline span.
///
/// `coins_per_hour * min(elapsed_ms, max_elapsed_ms) / 3_600_000`,
/// computed multiply-first so exact `Decimal` division keeps results
/// like the 5-hour cap on 1000/h yielding exactly 5000.
pub fn idle_earnings(coins_per_hour: Decimal, elapsed_ms: i64, max_elapsed_ms: i64) -> Decimal {
    let capped_ms = elapsed_ms.min(max_elapsed_ms).max(0);
    if capped_ms == 0 || coins_per_hour <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    coins_per_hour
        .checked_mul(Decimal::from(capped_ms))
        .and_then(|earned| earned.checked_div(Decimal::from(MS_PER_HOUR)))
        .unwrap_or(Decimal::MAX)
}
