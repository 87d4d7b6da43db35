//! Level curve and experience application.
//!
//! The requirement to advance from level `n` to `n + 1` is
//! `floor(100 * 1.5^(n-1))`, computed with exact [`Decimal`]
//! multiplication (one floor at the end, no per-step rounding) and
//! saturating at [`Decimal::MAX`] far beyond any reachable level.
//!
//! Experience is applied with an iterative carry loop so a single huge
//! grant (e.g. a long login-streak reward) levels up as many times as
//! it should without recursion.

use rust_decimal::Decimal;
use toothtap_types::PlayerEconomy;

use crate::error::EconomyError;

/// Experience required to advance from `level` to `level + 1`.
///
/// Strictly increasing in `level`. Saturates at [`Decimal::MAX`] once
/// the exact product no longer fits, which keeps
/// [`apply_experience`] terminating for any finite grant.
pub fn experience_required_for_level(level: u32) -> Decimal {
    let growth = Decimal::new(15, 1); // 1.5
    let mut requirement = Decimal::from(100_u32);
    for _ in 1..level {
        match requirement.checked_mul(growth) {
            Some(next) => requirement = next,
            None => return Decimal::MAX,
        }
    }
    requirement.floor()
}

/// Add `gained` experience, carrying overflow across level-ups.
///
/// Returns the number of levels gained. On return the invariant
/// `experience_current < experience_required` holds.
///
/// # Errors
///
/// Returns [`EconomyError::NegativeAmount`] for a negative grant and
/// [`EconomyError::ArithmeticOverflow`] if the accumulator overflows.
pub fn apply_experience(
    economy: &mut PlayerEconomy,
    gained: Decimal,
) -> Result<u32, EconomyError> {
    if gained < Decimal::ZERO {
        return Err(EconomyError::NegativeAmount {
            context: String::from("apply_experience"),
            amount: gained,
        });
    }

    economy.experience_current = economy
        .experience_current
        .checked_add(gained)
        .ok_or_else(|| EconomyError::ArithmeticOverflow {
            context: String::from("experience accumulation"),
        })?;

    let mut levels_gained: u32 = 0;
    while economy.experience_current >= economy.experience_required {
        economy.experience_current = economy
            .experience_current
            .checked_sub(economy.experience_required)
            .ok_or_else(|| EconomyError::ArithmeticOverflow {
                context: String::from("experience carry"),
            })?;
        economy.level = economy.level.checked_add(1).ok_or_else(|| {
            EconomyError::ArithmeticOverflow {
                context: String::from("level increment"),
            }
        })?;
        economy.experience_required = experience_required_for_level(economy.level);
        levels_gained = levels_gained.saturating_add(1);
    }

    Ok(levels_gained)
}
