use thiserror::Error;

/// Errors raised while parsing shared primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("amount overflow: {input:?}")]
    AmountOverflow { input: String },
}
