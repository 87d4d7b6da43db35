//! Error types for the gateway API layer.
//!
//! [`GatewayError`] unifies all failure modes into a single enum that
//! converts into an HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Note
//! that rejected taps and refused purchases are NOT errors: they are
//! domain outcomes reported in `200` responses. This enum covers the
//! faults around the domain.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use toothtap_session::SessionError;
use toothtap_types::WireErrorReason;

/// Errors that can occur in the gateway layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The credential is missing or was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The request payload failed shape validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The connection exceeded its message rate limit.
    #[error("rate limited")]
    RateLimited,

    /// A session operation failed.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// The machine-readable reason reported on the wire.
    #[must_use]
    pub const fn reason(&self) -> WireErrorReason {
        match self {
            Self::Unauthorized(_) => WireErrorReason::Unauthorized,
            Self::Validation(_) => WireErrorReason::Validation,
            Self::RateLimited => WireErrorReason::RateLimited,
            Self::Session(SessionError::CorruptState { .. }) => WireErrorReason::CorruptState,
            Self::Session(_) | Self::Internal(_) => WireErrorReason::Internal,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Session(SessionError::CorruptState { .. }) => StatusCode::CONFLICT,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "reason": self.reason(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
