//! Type-safe identifier wrappers.
//!
//! Every identity in the game server is a distinct newtype to prevent
//! accidental mixing at compile time. Server-assigned IDs use UUID v7
//! (time-ordered) for efficient database indexing; client-generated
//! idempotence keys arrive as UUID v4 and are wrapped on ingestion.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a player, as yielded by the auth provider.
    PlayerId
}

define_id! {
    /// Client-generated idempotence key for a purchase request.
    RequestId
}

define_id! {
    /// Identifier for one connection-session. Tap batch sequence numbers
    /// are strictly increasing within a single session.
    SessionId
}

define_id! {
    /// Server-assigned identifier for a live transport connection.
    /// Used by the broadcast dispatcher to skip the originator.
    ConnectionId
}

/// Identifier of an upgrade in the catalog.
///
/// Upgrades are named by stable string slugs (e.g. `polish-3`, `auto-1`)
/// rather than UUIDs because the catalog is static configuration and the
/// slugs appear verbatim in client requests.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UpgradeId(pub String);

impl UpgradeId {
    /// Build an upgrade ID from any string-like value.
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// The slug as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for UpgradeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UpgradeId {
    fn from(slug: &str) -> Self {
        Self(slug.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let player = PlayerId::new();
        let session = SessionId::new();
        // Different types -- the compiler enforces no mixing.
        assert_ne!(player.into_inner(), Uuid::nil());
        assert_ne!(session.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = PlayerId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<PlayerId, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert!(restored.is_ok());
    }

    #[test]
    fn upgrade_id_display_matches_slug() {
        let id = UpgradeId::from("polish-3");
        assert_eq!(id.to_string(), "polish-3");
        assert_eq!(id.as_str(), "polish-3");
    }
}
