//! The upgrade catalog.
//!
//! Static configuration describing every purchasable upgrade: cost,
//! per-click and per-hour bonuses, the sequential-purchase
//! prerequisite, and any extra unlock gate. The catalog is read-only at
//! runtime and assumed to change rarely relative to gameplay; sessions
//! hold it behind an `Arc` and re-evaluate unlock predicates against it
//! on every purchase attempt.
//!
//! [`Catalog::standard`] transcribes the original game's tables: seven
//! sequential "polish" click upgrades (the seventh, the assistant, adds
//! a global x1.5 passive-income multiplier and is gated on the top
//! auto-clicker tier) and five sequential "auto" passive-income tiers.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use toothtap_types::UpgradeId;

/// An extra condition beyond the prerequisite chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockGate {
    /// Requires the player's character progression to have reached the
    /// given tier.
    CharacterTier(u8),
}

/// One purchasable upgrade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDef {
    /// Stable slug identifying the upgrade.
    pub id: UpgradeId,
    /// Display name.
    pub name: String,
    /// Purchase cost in coins.
    pub cost: Decimal,
    /// Added to the base per-click value while owned.
    pub click_bonus: Decimal,
    /// Added to the hourly passive income while owned.
    pub hourly_bonus: Decimal,
    /// Global multiplier applied to the summed hourly income while
    /// owned (the assistant's x1.5), if any.
    pub hourly_multiplier: Option<Decimal>,
    /// Upgrade that must be owned first, if any.
    pub prerequisite: Option<UpgradeId>,
    /// Extra unlock condition, if any.
    pub unlock_gate: Option<UnlockGate>,
}

/// Read-only collection of upgrade definitions keyed by slug.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    upgrades: BTreeMap<UpgradeId, UpgradeDef>,
}

impl Catalog {
    /// Build a catalog from an arbitrary set of definitions.
    pub fn from_defs(defs: impl IntoIterator<Item = UpgradeDef>) -> Self {
        Self {
            upgrades: defs.into_iter().map(|def| (def.id.clone(), def)).collect(),
        }
    }

    /// Look up an upgrade by slug.
    pub fn get(&self, id: &UpgradeId) -> Option<&UpgradeDef> {
        self.upgrades.get(id)
    }

    /// Iterate over all definitions in slug order.
    pub fn iter(&self) -> impl Iterator<Item = &UpgradeDef> {
        self.upgrades.values()
    }

    /// Number of upgrades in the catalog.
    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }

    /// The original game's upgrade tables.
    pub fn standard() -> Self {
        let mut defs = Vec::new();

        // Seven click upgrades. Each requires the previous; the fifth
        // additionally requires character tier 2; the seventh (the
        // assistant) requires the top auto-clicker tier instead of the
        // click chain and multiplies all hourly income by 1.5.
        let polish: [(u32, i64, i64); 6] = [
            (1, 72_000, 2),
            (2, 144_000, 3),
            (3, 288_000, 4),
            (4, 432_000, 5),
            (5, 864_000, 10),
            (6, 1_568_000, 20),
        ];
        for (tier, cost, click_bonus) in polish {
            let prerequisite =
                (tier > 1).then(|| UpgradeId::new(format!("polish-{}", tier.saturating_sub(1))));
            let unlock_gate = (tier == 5).then_some(UnlockGate::CharacterTier(2));
            defs.push(UpgradeDef {
                id: UpgradeId::new(format!("polish-{tier}")),
                name: format!("Polish kit {tier}"),
                cost: Decimal::from(cost),
                click_bonus: Decimal::from(click_bonus),
                hourly_bonus: Decimal::ZERO,
                hourly_multiplier: None,
                prerequisite,
                unlock_gate,
            });
        }
        defs.push(UpgradeDef {
            id: UpgradeId::new("assistant"),
            name: String::from("Assistant"),
            cost: Decimal::from(2_216_000_u32),
            click_bonus: Decimal::from(25_u32),
            hourly_bonus: Decimal::ZERO,
            hourly_multiplier: Some(Decimal::new(15, 1)),
            prerequisite: Some(UpgradeId::new("auto-5")),
            unlock_gate: None,
        });

        // Five auto-clicker tiers. Each requires the previous; tier 4
        // additionally requires character tier 3.
        let auto: [(u32, i64, i64); 5] = [
            (1, 10_000, 1_000),
            (2, 96_000, 1_500),
            (3, 252_000, 2_500),
            (4, 660_000, 4_000),
            (5, 1_536_000, 6_000),
        ];
        for (tier, cost, hourly_bonus) in auto {
            let prerequisite =
                (tier > 1).then(|| UpgradeId::new(format!("auto-{}", tier.saturating_sub(1))));
            let unlock_gate = (tier == 4).then_some(UnlockGate::CharacterTier(3));
            defs.push(UpgradeDef {
                id: UpgradeId::new(format!("auto-{tier}")),
                name: format!("Auto-clicker {tier}"),
                cost: Decimal::from(cost),
                click_bonus: Decimal::ZERO,
                hourly_bonus: Decimal::from(hourly_bonus),
                hourly_multiplier: None,
                prerequisite,
                unlock_gate,
            });
        }

        Self::from_defs(defs)
    }
}
