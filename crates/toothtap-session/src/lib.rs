//! Authoritative per-player session management.
//!
//! This crate owns the `Idle`/`Active` lifecycle: the event ledger
//! that makes tap batches and purchases idempotent, the lazily-advanced
//! economy state machine, and the actor/registry layer that gives each
//! active player a single-writer task backed by a durable store.

pub mod actor;
pub mod config;
pub mod error;
pub mod ledger;
pub mod session;
pub mod store;

pub use actor::{SessionBroadcast, SessionCommand, SessionHandle, SessionRegistry};
pub use config::SessionConfig;
pub use error::SessionError;
pub use ledger::{EventLedger, TapAdmission};
pub use session::{CatchUpReport, PlayerSession, PurchaseOutcome, TapApplied, TapOutcome};
pub use store::{DurableStore, MemoryStore, StoreError};
