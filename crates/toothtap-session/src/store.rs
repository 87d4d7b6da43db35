//! The durable store seam.
//!
//! The store is the only resource shared across session actors. Writes
//! for a given player are serialized by the single-writer discipline of
//! the actor, so implementations need per-record atomicity only --
//! never cross-player transactions.
//!
//! The `PostgreSQL` implementation lives in `toothtap-db`;
//! [`MemoryStore`] backs tests and development without infrastructure.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use toothtap_types::{PlayerEconomy, PlayerId};

/// Errors surfaced by a durable store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The record exists but cannot be decoded. Surfaced to the session
    /// as `CorruptState`; never silently defaulted.
    #[error("corrupt record for player {player_id}: {detail}")]
    Corrupt {
        /// The affected player.
        player_id: PlayerId,
        /// What failed to decode.
        detail: String,
    },

    /// The backend failed (connection, query, serialization).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Persistence contract for player economies.
///
/// `load` distinguishes "no record" (`Ok(None)`, seed a fresh economy)
/// from "unreadable record" (`Err(Corrupt)`, refuse the session).
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Load a player's economy, if one has been persisted.
    async fn load(&self, player_id: PlayerId) -> Result<Option<PlayerEconomy>, StoreError>;

    /// Persist a player's economy. Upserts; per-record atomic.
    async fn save(&self, economy: &PlayerEconomy) -> Result<(), StoreError>;
}

/// In-memory [`DurableStore`] for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<PlayerId, PlayerEconomy>>,
    corrupted: RwLock<HashSet<PlayerId>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a player's record as unreadable so the corrupt-state path
    /// can be exercised in tests.
    pub async fn poison(&self, player_id: PlayerId) {
        self.corrupted.write().await.insert(player_id);
    }

    /// Number of persisted records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn load(&self, player_id: PlayerId) -> Result<Option<PlayerEconomy>, StoreError> {
        if self.corrupted.read().await.contains(&player_id) {
            return Err(StoreError::Corrupt {
                player_id,
                detail: String::from("record poisoned"),
            });
        }
        Ok(self.records.read().await.get(&player_id).cloned())
    }

    async fn save(&self, economy: &PlayerEconomy) -> Result<(), StoreError> {
        self.records.write().await.insert(economy.player_id, economy.clone());
        Ok(())
    }
}
