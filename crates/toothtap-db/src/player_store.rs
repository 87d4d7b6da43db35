//! Player economy persistence on the `player_economy` table.
//!
//! One row per player. Writes are full-row upserts because the session
//! actor is the single writer for a player; there is never a concurrent
//! writer to merge with. The upgrade set and bonus are stored as JSONB,
//! and a row that fails to decode is reported as corrupt rather than
//! silently reset, so the gateway can refuse the session instead of
//! wiping progress.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use toothtap_session::store::{DurableStore, StoreError};
use toothtap_types::{ActiveBonus, PlayerEconomy, PlayerId, UpgradeId};

use crate::postgres::PostgresPool;

/// [`DurableStore`] backed by the `player_economy` table.
#[derive(Clone)]
pub struct PgPlayerStore {
    pool: PgPool,
}

impl PgPlayerStore {
    /// Create a store over an established pool.
    #[must_use]
    pub fn new(pool: &PostgresPool) -> Self {
        Self { pool: pool.pool().clone() }
    }
}

#[async_trait]
impl DurableStore for PgPlayerStore {
    async fn load(&self, player_id: PlayerId) -> Result<Option<PlayerEconomy>, StoreError> {
        let row = sqlx::query_as::<_, PlayerEconomyRow>(
            r"SELECT player_id, coins, level, experience_current, experience_required,
                     energy_current, energy_max, base_coins_per_click, coins_per_hour,
                     owned_upgrades, active_bonus, character_tier, last_seen_at
              FROM player_economy
              WHERE player_id = $1",
        )
        .bind(player_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(PlayerEconomyRow::decode).transpose()
    }

    async fn save(&self, economy: &PlayerEconomy) -> Result<(), StoreError> {
        let owned_upgrades = serde_json::to_value(&economy.owned_upgrades)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let active_bonus = economy
            .active_bonus
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        sqlx::query(
            r"INSERT INTO player_economy
              (player_id, coins, level, experience_current, experience_required,
               energy_current, energy_max, base_coins_per_click, coins_per_hour,
               owned_upgrades, active_bonus, character_tier, last_seen_at, updated_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW())
              ON CONFLICT (player_id) DO UPDATE SET
                coins = EXCLUDED.coins,
                level = EXCLUDED.level,
                experience_current = EXCLUDED.experience_current,
                experience_required = EXCLUDED.experience_required,
                energy_current = EXCLUDED.energy_current,
                energy_max = EXCLUDED.energy_max,
                base_coins_per_click = EXCLUDED.base_coins_per_click,
                coins_per_hour = EXCLUDED.coins_per_hour,
                owned_upgrades = EXCLUDED.owned_upgrades,
                active_bonus = EXCLUDED.active_bonus,
                character_tier = EXCLUDED.character_tier,
                last_seen_at = EXCLUDED.last_seen_at,
                updated_at = NOW()",
        )
        .bind(economy.player_id.into_inner())
        .bind(economy.coins)
        .bind(i64::from(economy.level))
        .bind(economy.experience_current)
        .bind(economy.experience_required)
        .bind(economy.energy_current)
        .bind(economy.energy_max)
        .bind(economy.base_coins_per_click)
        .bind(economy.coins_per_hour)
        .bind(owned_upgrades)
        .bind(active_bonus)
        .bind(i16::from(economy.character_tier))
        .bind(economy.last_seen_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::debug!(player = %economy.player_id, "player economy persisted");
        Ok(())
    }
}

/// A row from the `player_economy` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PlayerEconomyRow {
    player_id: Uuid,
    coins: Decimal,
    level: i64,
    experience_current: Decimal,
    experience_required: Decimal,
    energy_current: Decimal,
    energy_max: Decimal,
    base_coins_per_click: Decimal,
    coins_per_hour: Decimal,
    owned_upgrades: serde_json::Value,
    active_bonus: Option<serde_json::Value>,
    character_tier: i16,
    last_seen_at: DateTime<Utc>,
}

impl PlayerEconomyRow {
    /// Decode the row into the in-memory record. Any field that cannot
    /// be represented means the row was written by something other than
    /// this store and is treated as corrupt.
    fn decode(self) -> Result<PlayerEconomy, StoreError> {
        let player_id = PlayerId::from(self.player_id);
        let corrupt = |detail: String| StoreError::Corrupt { player_id, detail };

        let level = u32::try_from(self.level)
            .map_err(|_| corrupt(format!("level out of range: {}", self.level)))?;
        let character_tier = u8::try_from(self.character_tier)
            .map_err(|_| corrupt(format!("character tier out of range: {}", self.character_tier)))?;
        let owned_upgrades: std::collections::BTreeSet<UpgradeId> =
            serde_json::from_value(self.owned_upgrades)
                .map_err(|e| corrupt(format!("undecodable upgrade set: {e}")))?;
        let active_bonus: Option<ActiveBonus> = self
            .active_bonus
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| corrupt(format!("undecodable active bonus: {e}")))?;

        Ok(PlayerEconomy {
            player_id,
            coins: self.coins,
            level,
            experience_current: self.experience_current,
            experience_required: self.experience_required,
            energy_current: self.energy_current,
            energy_max: self.energy_max,
            base_coins_per_click: self.base_coins_per_click,
            coins_per_hour: self.coins_per_hour,
            owned_upgrades,
            active_bonus,
            character_tier,
            last_seen_at: self.last_seen_at,
        })
    }
}
