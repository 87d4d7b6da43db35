//! Credential verification at the ingress boundary.
//!
//! Every request surface (REST and `WebSocket`) resolves its credential
//! to a [`PlayerId`] through an [`AuthProvider`] before anything else
//! happens. The trait keeps the gateway agnostic of the identity
//! backend; the shipped [`DevTokenAuth`] accepts `player:<uuid>` tokens
//! and exists for development and tests.

use async_trait::async_trait;
use uuid::Uuid;

use toothtap_types::PlayerId;

/// Why a credential was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The credential does not have the expected shape.
    #[error("malformed credential")]
    Malformed,

    /// The credential is well-formed but not recognized.
    #[error("unknown credential")]
    Unknown,
}

/// Resolves an opaque bearer credential to a player identity.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Verify a credential and return the player it belongs to.
    async fn verify(&self, credential: &str) -> Result<PlayerId, AuthError>;
}

/// Development auth: the token IS the identity, `player:<uuid>`.
///
/// Offers no security whatsoever and must never be configured in a
/// deployment that matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct DevTokenAuth;

#[async_trait]
impl AuthProvider for DevTokenAuth {
    async fn verify(&self, credential: &str) -> Result<PlayerId, AuthError> {
        let raw = credential.strip_prefix("player:").ok_or(AuthError::Malformed)?;
        let uuid = Uuid::parse_str(raw).map_err(|_| AuthError::Malformed)?;
        Ok(PlayerId::from(uuid))
    }
}
