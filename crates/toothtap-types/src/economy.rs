//! The authoritative per-player economy record and its client projection.
//!
//! [`PlayerEconomy`] is owned exclusively by that player's session state
//! machine; everything else sees it through [`EconomySnapshot`], the
//! JSON shape pushed to clients. All money-like quantities are
//! [`Decimal`] -- floats never touch the economy.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{PlayerId, UpgradeId};

/// Starting coin balance for a freshly created player.
pub const SEED_COINS: Decimal = Decimal::ONE;

/// Starting and default maximum energy pool.
pub const SEED_ENERGY_MAX: u32 = 10_000;

/// Experience required to go from level 1 to level 2.
pub const SEED_EXPERIENCE_REQUIRED: u32 = 100;

/// A temporary multiplier applied to the per-click coin value.
///
/// Absent or expired means no bonus. Expiry is evaluated lazily against
/// the server clock; the client never decides when a bonus ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveBonus {
    /// The per-click multiplier (e.g. 2 for a x2 tap bonus).
    #[ts(as = "String")]
    pub multiplier: Decimal,
    /// Server timestamp after which the bonus no longer applies.
    pub expires_at: DateTime<Utc>,
}

impl ActiveBonus {
    /// Whether the bonus still applies at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// The single source of truth for one player's economy.
///
/// Created on first authenticated connection (seeded from the durable
/// store or from [`PlayerEconomy::seed`]), mutated only by the session
/// state machine, persisted write-through on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEconomy {
    /// The player this record belongs to.
    pub player_id: PlayerId,
    /// Coin balance. Non-negative.
    pub coins: Decimal,
    /// Current level, starting at 1.
    pub level: u32,
    /// Experience accumulated toward the next level.
    /// Invariant: `experience_current < experience_required` except
    /// transiently inside a level-up computation.
    pub experience_current: Decimal,
    /// Experience required to reach the next level.
    pub experience_required: Decimal,
    /// Current energy. `0 <= energy_current <= energy_max`.
    pub energy_current: Decimal,
    /// Energy ceiling.
    pub energy_max: Decimal,
    /// Coins earned per tap before any bonus multiplier. Derived from
    /// the owned upgrade set, never stored incrementally.
    pub base_coins_per_click: Decimal,
    /// Passive income per hour, derived from owned upgrades.
    pub coins_per_hour: Decimal,
    /// Upgrades this player owns.
    pub owned_upgrades: BTreeSet<UpgradeId>,
    /// Temporary tap multiplier, if one is active.
    pub active_bonus: Option<ActiveBonus>,
    /// Character progression tier; consumed by catalog unlock gates.
    pub character_tier: u8,
    /// Last time the server computed regeneration or idle earnings
    /// against this record. Monotonically non-decreasing.
    pub last_seen_at: DateTime<Utc>,
}

impl PlayerEconomy {
    /// Seed a brand-new economy for a player first seen at `now`.
    ///
    /// Values match the original client's starting state: 1 coin,
    /// level 1, 0/100 experience, a full 10 000 energy pool, and a
    /// per-click value of 1.
    pub fn seed(player_id: PlayerId, now: DateTime<Utc>) -> Self {
        Self {
            player_id,
            coins: SEED_COINS,
            level: 1,
            experience_current: Decimal::ZERO,
            experience_required: Decimal::from(SEED_EXPERIENCE_REQUIRED),
            energy_current: Decimal::from(SEED_ENERGY_MAX),
            energy_max: Decimal::from(SEED_ENERGY_MAX),
            base_coins_per_click: Decimal::ONE,
            coins_per_hour: Decimal::ZERO,
            owned_upgrades: BTreeSet::new(),
            active_bonus: None,
            character_tier: 1,
            last_seen_at: now,
        }
    }

    /// The per-tap coin value with the bonus multiplier applied, if an
    /// unexpired bonus is present at `now`.
    pub fn effective_coins_per_click(&self, now: DateTime<Utc>) -> Decimal {
        match self.active_bonus {
            Some(bonus) if bonus.is_active(now) => self
                .base_coins_per_click
                .checked_mul(bonus.multiplier)
                .unwrap_or(Decimal::MAX),
            _ => self.base_coins_per_click,
        }
    }

    /// Drop the active bonus if it has expired as of `now`.
    ///
    /// Returns `true` if a bonus was cleared.
    pub fn clear_expired_bonus(&mut self, now: DateTime<Utc>) -> bool {
        match self.active_bonus {
            Some(bonus) if !bonus.is_active(now) => {
                self.active_bonus = None;
                true
            }
            _ => false,
        }
    }
}

/// Client-facing projection of [`PlayerEconomy`].
///
/// This is the payload of the `game:state` wire message; the session
/// computes it after every mutation so clients always render
/// authoritative values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EconomySnapshot {
    /// Coin balance.
    #[ts(as = "String")]
    pub coins: Decimal,
    /// Current level.
    pub level: u32,
    /// Experience toward the next level.
    #[ts(as = "String")]
    pub experience_current: Decimal,
    /// Experience required for the next level.
    #[ts(as = "String")]
    pub experience_required: Decimal,
    /// Current energy.
    #[ts(as = "String")]
    pub energy_current: Decimal,
    /// Energy ceiling.
    #[ts(as = "String")]
    pub energy_max: Decimal,
    /// Per-tap value with any bonus applied.
    #[ts(as = "String")]
    pub coins_per_click: Decimal,
    /// Per-tap value before bonuses.
    #[ts(as = "String")]
    pub base_coins_per_click: Decimal,
    /// Passive income per hour.
    #[ts(as = "String")]
    pub coins_per_hour: Decimal,
    /// Owned upgrade slugs.
    pub owned_upgrades: Vec<UpgradeId>,
    /// The active tap bonus, if any.
    pub active_bonus: Option<ActiveBonus>,
    /// Character progression tier.
    pub character_tier: u8,
}

impl EconomySnapshot {
    /// Project the authoritative record into the client shape as of `now`.
    pub fn of(economy: &PlayerEconomy, now: DateTime<Utc>) -> Self {
        let active_bonus = economy.active_bonus.filter(|b| b.is_active(now));
        Self {
            coins: economy.coins,
            level: economy.level,
            experience_current: economy.experience_current,
            experience_required: economy.experience_required,
            energy_current: economy.energy_current,
            energy_max: economy.energy_max,
            coins_per_click: economy.effective_coins_per_click(now),
            base_coins_per_click: economy.base_coins_per_click,
            coins_per_hour: economy.coins_per_hour,
            owned_upgrades: economy.owned_upgrades.iter().cloned().collect(),
            active_bonus,
            character_tier: economy.character_tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn seed_matches_original_client_defaults() {
        let now = Utc::now();
        let economy = PlayerEconomy::seed(PlayerId::new(), now);
        assert_eq!(economy.coins, Decimal::ONE);
        assert_eq!(economy.level, 1);
        assert_eq!(economy.experience_required, Decimal::from(100_u32));
        assert_eq!(economy.energy_current, Decimal::from(10_000_u32));
        assert_eq!(economy.energy_current, economy.energy_max);
        assert_eq!(economy.base_coins_per_click, Decimal::ONE);
        assert_eq!(economy.coins_per_hour, Decimal::ZERO);
        assert!(economy.owned_upgrades.is_empty());
    }

    #[test]
    fn effective_per_click_applies_unexpired_bonus_only() {
        let now = Utc::now();
        let mut economy = PlayerEconomy::seed(PlayerId::new(), now);
        economy.base_coins_per_click = Decimal::from(3_u32);
        economy.active_bonus = Some(ActiveBonus {
            multiplier: Decimal::from(2_u32),
            expires_at: now.checked_add_signed(TimeDelta::seconds(60)).unwrap_or(now),
        });

        assert_eq!(economy.effective_coins_per_click(now), Decimal::from(6_u32));

        let later = now.checked_add_signed(TimeDelta::seconds(120)).unwrap_or(now);
        assert_eq!(economy.effective_coins_per_click(later), Decimal::from(3_u32));
    }

    #[test]
    fn clear_expired_bonus_is_lazy() {
        let now = Utc::now();
        let mut economy = PlayerEconomy::seed(PlayerId::new(), now);
        economy.active_bonus = Some(ActiveBonus {
            multiplier: Decimal::from(2_u32),
            expires_at: now,
        });

        assert!(economy.clear_expired_bonus(now));
        assert!(economy.active_bonus.is_none());
        assert!(!economy.clear_expired_bonus(now));
    }

    #[test]
    fn snapshot_hides_expired_bonus() {
        let now = Utc::now();
        let mut economy = PlayerEconomy::seed(PlayerId::new(), now);
        economy.active_bonus = Some(ActiveBonus {
            multiplier: Decimal::from(2_u32),
            expires_at: now,
        });

        let snapshot = EconomySnapshot::of(&economy, now);
        assert!(snapshot.active_bonus.is_none());
        assert_eq!(snapshot.coins_per_click, economy.base_coins_per_click);
    }
}
