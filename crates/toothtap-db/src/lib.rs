//! `PostgreSQL` data layer for the game server.
//!
//! Player economies live in a single `player_economy` table, written
//! through by each player's session actor and read once on activation.
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool, configuration, migrations
//! - [`player_store`] -- the [`toothtap_session::DurableStore`] implementation
//! - [`error`] -- shared error types

pub mod error;
pub mod player_store;
pub mod postgres;

pub use error::DbError;
pub use player_store::PgPlayerStore;
pub use postgres::{PostgresConfig, PostgresPool};
