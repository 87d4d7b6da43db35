//! Purchase application and the sequential-unlock predicate.
//!
//! The unlock predicate is re-evaluated from current state on every
//! attempt -- never cached -- and derived stats are recomputed from the
//! full owned set after every purchase, never incrementally, so a
//! double-application bug cannot drift the per-click or per-hour
//! values.

use rust_decimal::Decimal;
use toothtap_types::{PlayerEconomy, UpgradeId};
use tracing::debug;

use crate::catalog::{Catalog, UnlockGate, UpgradeDef};

/// Why a purchase attempt was refused. No mutation occurred.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PurchaseRejection {
    /// The player's balance is below the cost.
    #[error("insufficient funds: cost {cost}, balance {balance}")]
    InsufficientFunds {
        /// The upgrade cost.
        cost: Decimal,
        /// The player's balance at evaluation time.
        balance: Decimal,
    },

    /// The prerequisite upgrade is not owned.
    #[error("locked: requires {required}")]
    LockedPrerequisite {
        /// The upgrade that must be owned first.
        required: UpgradeId,
    },

    /// An unlock gate is unsatisfied.
    #[error("locked: requires character tier {required_tier}")]
    LockedGate {
        /// The character tier the gate demands.
        required_tier: u8,
    },

    /// The upgrade is already owned; upgrades are purchasable once.
    #[error("already owned")]
    AlreadyOwned,

    /// The requested slug is not in the catalog.
    #[error("unknown upgrade")]
    UnknownUpgrade,
}

/// Whether a balance covers a cost.
pub fn can_afford(balance: Decimal, cost: Decimal) -> bool {
    balance >= cost
}

/// The sequential-unlock predicate.
///
/// An upgrade is purchasable iff it is not already owned, its
/// prerequisite (if any) is owned, and its unlock gate (if any) is
/// satisfied by the player's current state. Affordability is checked
/// separately so callers can distinguish "locked" from "too poor".
pub fn purchasable(economy: &PlayerEconomy, upgrade: &UpgradeDef) -> Result<(), PurchaseRejection> {
    if economy.owned_upgrades.contains(&upgrade.id) {
        return Err(PurchaseRejection::AlreadyOwned);
    }
    if let Some(required) = &upgrade.prerequisite
        && !economy.owned_upgrades.contains(required)
    {
        return Err(PurchaseRejection::LockedPrerequisite { required: required.clone() });
    }
    if let Some(UnlockGate::CharacterTier(required_tier)) = upgrade.unlock_gate
        && economy.character_tier < required_tier
    {
        return Err(PurchaseRejection::LockedGate { required_tier });
    }
    Ok(())
}

/// Apply a purchase: deduct the cost, add the upgrade, recompute
/// derived stats from the full owned set.
///
/// # Errors
///
/// Returns a [`PurchaseRejection`] without mutating `economy` if the
/// unlock predicate fails or the player cannot afford the upgrade.
pub fn apply_purchase(
    economy: &mut PlayerEconomy,
    catalog: &Catalog,
    upgrade: &UpgradeDef,
) -> Result<(), PurchaseRejection> {
    purchasable(economy, upgrade)?;
    if !can_afford(economy.coins, upgrade.cost) {
        return Err(PurchaseRejection::InsufficientFunds {
            cost: upgrade.cost,
            balance: economy.coins,
        });
    }

    economy.coins = economy.coins.checked_sub(upgrade.cost).unwrap_or(Decimal::ZERO);
    economy.owned_upgrades.insert(upgrade.id.clone());
    recompute_derived(economy, catalog);
    Ok(())
}

/// Recompute `base_coins_per_click` and `coins_per_hour` from the full
/// owned set.
///
/// Owned slugs missing from the catalog are skipped with a debug log;
/// they can appear when the catalog shrinks between deployments and
/// must not poison the rest of the derivation.
pub fn recompute_derived(economy: &mut PlayerEconomy, catalog: &Catalog) {
    let mut per_click = Decimal::ONE;
    let mut per_hour = Decimal::ZERO;
    let mut multiplier = Decimal::ONE;

    for owned in &economy.owned_upgrades {
        let Some(def) = catalog.get(owned) else {
            debug!(upgrade = %owned, "owned upgrade missing from catalog, skipping");
            continue;
        };
        per_click = per_click.checked_add(def.click_bonus).unwrap_or(Decimal::MAX);
        per_hour = per_hour.checked_add(def.hourly_bonus).unwrap_or(Decimal::MAX);
        if let Some(global) = def.hourly_multiplier {
            multiplier = multiplier.checked_mul(global).unwrap_or(Decimal::MAX);
        }
    }

    economy.base_coins_per_click = per_click;
    economy.coins_per_hour = per_hour.checked_mul(multiplier).unwrap_or(Decimal::MAX);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use toothtap_types::PlayerId;

    fn rich_player() -> PlayerEconomy {
        let mut economy = PlayerEconomy::seed(PlayerId::new(), Utc::now());
        economy.coins = Decimal::from(100_000_000_u64);
        economy
    }

    fn def(catalog: &Catalog, slug: &str) -> UpgradeDef {
        catalog.get(&UpgradeId::from(slug)).cloned().unwrap_or_else(|| UpgradeDef {
            id: UpgradeId::from(slug),
            name: String::from(slug),
            cost: Decimal::ZERO,
            click_bonus: Decimal::ZERO,
            hourly_bonus: Decimal::ZERO,
            hourly_multiplier: None,
            prerequisite: None,
            unlock_gate: None,
        })
    }

    #[test]
    fn unowned_prerequisite_rejects_without_mutation() {
        let catalog = Catalog::standard();
        let mut economy = rich_player();
        let coins_before = economy.coins;

        let result = apply_purchase(&mut economy, &catalog, &def(&catalog, "polish-2"));
        assert_eq!(
            result,
            Err(PurchaseRejection::LockedPrerequisite {
                required: UpgradeId::from("polish-1")
            })
        );
        assert_eq!(economy.coins, coins_before);
        assert!(economy.owned_upgrades.is_empty());
    }

    #[test]
    fn insufficient_funds_rejects_without_mutation() {
        let catalog = Catalog::standard();
        let mut economy = PlayerEconomy::seed(PlayerId::new(), Utc::now());

        let result = apply_purchase(&mut economy, &catalog, &def(&catalog, "polish-1"));
        assert!(matches!(result, Err(PurchaseRejection::InsufficientFunds { .. })));
        assert_eq!(economy.coins, Decimal::ONE);
    }

    #[test]
    fn purchase_deducts_and_recomputes_from_full_set() {
        let catalog = Catalog::standard();
        let mut economy = rich_player();

        assert!(apply_purchase(&mut economy, &catalog, &def(&catalog, "polish-1")).is_ok());
        assert_eq!(economy.base_coins_per_click, Decimal::from(3_u32)); // 1 + 2
        assert!(apply_purchase(&mut economy, &catalog, &def(&catalog, "polish-2")).is_ok());
        assert_eq!(economy.base_coins_per_click, Decimal::from(6_u32)); // 1 + 2 + 3
        assert_eq!(
            economy.coins,
            Decimal::from(100_000_000_u64 - 72_000 - 144_000)
        );
    }

    #[test]
    fn repurchase_is_rejected() {
        let catalog = Catalog::standard();
        let mut economy = rich_player();
        assert!(apply_purchase(&mut economy, &catalog, &def(&catalog, "auto-1")).is_ok());
        let result = apply_purchase(&mut economy, &catalog, &def(&catalog, "auto-1"));
        assert_eq!(result, Err(PurchaseRejection::AlreadyOwned));
    }

    #[test]
    fn character_gate_blocks_until_tier_reached() {
        let catalog = Catalog::standard();
        let mut economy = rich_player();
        for slug in ["auto-1", "auto-2", "auto-3"] {
            assert!(apply_purchase(&mut economy, &catalog, &def(&catalog, slug)).is_ok());
        }

        let result = apply_purchase(&mut economy, &catalog, &def(&catalog, "auto-4"));
        assert_eq!(result, Err(PurchaseRejection::LockedGate { required_tier: 3 }));

        economy.character_tier = 3;
        assert!(apply_purchase(&mut economy, &catalog, &def(&catalog, "auto-4")).is_ok());
        assert_eq!(economy.coins_per_hour, Decimal::from(1_000 + 1_500 + 2_500 + 4_000));
    }

    #[test]
    fn assistant_multiplies_summed_hourly_income() {
        let catalog = Catalog::standard();
        let mut economy = rich_player();
        economy.character_tier = 3;
        for slug in ["auto-1", "auto-2", "auto-3", "auto-4", "auto-5"] {
            assert!(apply_purchase(&mut economy, &catalog, &def(&catalog, slug)).is_ok());
        }
        assert_eq!(economy.coins_per_hour, Decimal::from(15_000_u32));

        assert!(apply_purchase(&mut economy, &catalog, &def(&catalog, "assistant")).is_ok());
        // 15000 * 1.5 = 22500, recomputed from the full set.
        assert_eq!(economy.coins_per_hour, Decimal::from(22_500_u32));
        assert_eq!(economy.base_coins_per_click, Decimal::from(26_u32)); // 1 + 25
    }
}
