//! Error types for the economy model.

use rust_decimal::Decimal;

/// Errors that can occur inside the pure economy derivations.
///
/// These are faults, not domain rejections: a rejected purchase is
/// expressed through [`PurchaseRejection`](crate::purchase::PurchaseRejection),
/// never through this enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EconomyError {
    /// A checked arithmetic operation overflowed.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Where the overflow happened.
        context: String,
    },

    /// A quantity that must be non-negative was negative.
    #[error("negative amount in {context}: {amount}")]
    NegativeAmount {
        /// Where the amount was used.
        context: String,
        /// The offending value.
        amount: Decimal,
    },
}
