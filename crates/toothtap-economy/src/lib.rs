//! Pure economy derivations for the Toothtap game server.
//!
//! Everything in this crate is side-effect free: no I/O, no clocks, no
//! shared mutable state. The session state machine owns the
//! [`PlayerEconomy`](toothtap_types::PlayerEconomy) record and calls
//! into these functions at mutation time; nothing here recomputes
//! ambiently.
//!
//! # Modules
//!
//! - [`level`] -- experience curve and level-up carry
//! - [`energy`] -- energy regeneration
//! - [`idle`] -- capped offline earnings
//! - [`catalog`] -- the static upgrade catalog
//! - [`purchase`] -- affordability, sequential unlocks, purchase
//!   application and derived-stat recomputation

pub mod catalog;
pub mod energy;
pub mod error;
pub mod idle;
pub mod level;
pub mod purchase;

pub use catalog::{Catalog, UnlockGate, UpgradeDef};
pub use energy::{regen_rate, regenerate_energy, REGEN_RATE_CAP};
pub use error::EconomyError;
pub use idle::{idle_earnings, DEFAULT_MAX_IDLE_MS};
pub use level::{apply_experience, experience_required_for_level};
pub use purchase::{apply_purchase, can_afford, purchasable, recompute_derived, PurchaseRejection};
