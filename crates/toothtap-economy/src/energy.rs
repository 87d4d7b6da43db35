//! Energy regeneration.
//!
//! Energy refills at `min(effective_coins_per_click, 5)` per second,
//! clamped to `energy_max`. Tying the rate to the tap value (capped at
//! 5/s) keeps high-tap-value builds from being punished too hard by
//! their own energy pool, exactly as the original client's one-second
//! regen timer did.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use toothtap_types::PlayerEconomy;

/// Ceiling on the per-second regeneration rate.
pub const REGEN_RATE_CAP: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// The per-second regeneration rate for a given effective tap value.
pub fn regen_rate(effective_coins_per_click: Decimal) -> Decimal {
    effective_coins_per_click.min(REGEN_RATE_CAP)
}

/// Regenerate energy for `elapsed_seconds` of wall time as of `now`.
///
/// Returns the energy actually gained after clamping to `energy_max`.
/// Negative elapsed spans are treated as zero (the server clock is
/// monotone for a session, but the caller may race a catch-up).
pub fn regenerate_energy(
    economy: &mut PlayerEconomy,
    now: DateTime<Utc>,
    elapsed_seconds: Decimal,
) -> Decimal {
    if elapsed_seconds <= Decimal::ZERO || economy.energy_current >= economy.energy_max {
        return Decimal::ZERO;
    }

    let rate = regen_rate(economy.effective_coins_per_click(now));
    let gain = rate.checked_mul(elapsed_seconds).unwrap_or(Decimal::MAX);
    let refilled = economy
        .energy_current
        .checked_add(gain)
        .unwrap_or(Decimal::MAX)
        .min(economy.energy_max);

    let gained = refilled.checked_sub(economy.energy_current).unwrap_or(Decimal::ZERO);
    economy.energy_current = refilled;
    gained
}

#[cfg(test)]
mod tests {
    use super::*;
    use toothtap_types::{ActiveBonus, PlayerId};

    fn fresh(now: DateTime<Utc>) -> PlayerEconomy {
        PlayerEconomy::seed(PlayerId::new(), now)
    }

    #[test]
    fn rate_is_tap_value_capped_at_five() {
        assert_eq!(regen_rate(Decimal::from(2_u32)), Decimal::from(2_u32));
        assert_eq!(regen_rate(Decimal::from(5_u32)), Decimal::from(5_u32));
        assert_eq!(regen_rate(Decimal::from(40_u32)), Decimal::from(5_u32));
    }

    #[test]
    fn regeneration_clamps_to_max() {
        let now = Utc::now();
        let mut economy = fresh(now);
        economy.energy_current = Decimal::from(9_995_u32);
        let gained = regenerate_energy(&mut economy, now, Decimal::from(60_u32));
        assert_eq!(gained, Decimal::from(5_u32));
        assert_eq!(economy.energy_current, economy.energy_max);
    }

    #[test]
    fn regeneration_uses_bonus_adjusted_rate_up_to_cap() {
        let now = Utc::now();
        let mut economy = fresh(now);
        economy.base_coins_per_click = Decimal::from(2_u32);
        economy.active_bonus = Some(ActiveBonus {
            multiplier: Decimal::from(2_u32),
            expires_at: now.checked_add_signed(chrono::TimeDelta::hours(1)).unwrap_or(now),
        });
        economy.energy_current = Decimal::ZERO;

        // Effective per-click is 4, below the cap, so 10 s regenerates 40.
        let gained = regenerate_energy(&mut economy, now, Decimal::from(10_u32));
        assert_eq!(gained, Decimal::from(40_u32));
    }

    #[test]
    fn zero_or_negative_elapsed_is_a_no_op() {
        let now = Utc::now();
        let mut economy = fresh(now);
        economy.energy_current = Decimal::from(10_u32);
        assert_eq!(regenerate_energy(&mut economy, now, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(
            regenerate_energy(&mut economy, now, Decimal::from(-5_i32)),
            Decimal::ZERO
        );
        assert_eq!(economy.energy_current, Decimal::from(10_u32));
    }
}
