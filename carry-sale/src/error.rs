use std::fmt;

use carry_token::LedgerError;
use carry_types::{Address, Amount, Grade, Timestamp};
use thiserror::Error;

/// Who an operation requires the caller to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    OwnerOrWallet,
    Beneficiary,
    OwnerOrBeneficiary,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Owner => "owner",
            Role::OwnerOrWallet => "owner or wallet",
            Role::Beneficiary => "beneficiary",
            Role::OwnerOrBeneficiary => "owner or beneficiary",
        };
        f.write_str(s)
    }
}

/// Coarse grouping of [`SaleError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller lacks the required role.
    Authorization,
    /// The request breaks a sale rule (caps, phases, whitelist, amounts).
    PolicyViolation,
    /// The request is not valid in the sale's current state.
    StateViolation,
    /// Invalid construction input or persisted state.
    Configuration,
    /// The token or value ledger rejected a transfer.
    Ledger,
}

/// Errors returned by crowdsale operations. Every error leaves the sale unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaleError {
    #[error("unauthorized: caller must be the {0}")]
    Unauthorized(Role),

    #[error("sale is paused")]
    Paused,

    #[error("sale is already paused")]
    AlreadyPaused,

    #[error("sale is not paused")]
    NotPaused,

    #[error("address {0:?} is not whitelisted")]
    NotWhitelisted(Address),

    #[error("invalid grade {grade}: must be in 1..{grade_count}")]
    InvalidGrade { grade: Grade, grade_count: usize },

    #[error("invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("sale phase is closed for grade {grade} at {timestamp}")]
    PhaseClosed { grade: Grade, timestamp: Timestamp },

    #[error("gas price {gas_price} exceeds ceiling {max}")]
    GasPriceTooHigh { gas_price: Amount, max: Amount },

    #[error("individual cap exceeded: {contribution} + {amount} > {cap}")]
    ExceedsIndividualCap {
        contribution: Amount,
        amount: Amount,
        cap: Amount,
    },

    #[error("purchase of {amount} is below the minimum {min}")]
    BelowMinimum { amount: Amount, min: Amount },

    #[error("aggregate cap exceeded: {raised} + {amount} > {cap}")]
    ExceedsAggregateCap {
        raised: Amount,
        amount: Amount,
        cap: Amount,
    },

    #[error("invalid ratio {numerator}/{denominator}")]
    InvalidRatio { numerator: u64, denominator: u64 },

    #[error("invalid range {from}..{to}")]
    InvalidRange { from: usize, to: usize },

    #[error("operation not supported in {mode} delivery mode")]
    UnsupportedDelivery { mode: &'static str },

    #[error("tokens are locked until {delivery_due}")]
    WithdrawalLocked { delivery_due: Timestamp },

    #[error("no pending tokens")]
    NoPendingTokens,

    #[error("attached value {actual} does not match refund amount {expected}")]
    ValueMismatch { expected: Amount, actual: Amount },

    #[error("refund amount must be positive")]
    ZeroRefund,

    #[error("refund of {requested} exceeds contribution {contribution}")]
    InsufficientContribution {
        contribution: Amount,
        requested: Amount,
    },

    #[error("refund needs {required} pending tokens, only {pending} pending")]
    InsufficientPendingTokens { pending: Amount, required: Amount },

    #[error("no refund deposit")]
    NoRefundDeposit,

    #[error("invalid sale config: {reason}")]
    InvalidConfig { reason: String },

    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    #[error("invariant violated: {reason}")]
    InvariantViolated { reason: String },

    #[error("arithmetic overflow")]
    Overflow,

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl SaleError {
    /// The category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SaleError::Unauthorized(_) => ErrorCategory::Authorization,

            SaleError::NotWhitelisted(_)
            | SaleError::InvalidGrade { .. }
            | SaleError::InvalidAddress { .. }
            | SaleError::PhaseClosed { .. }
            | SaleError::GasPriceTooHigh { .. }
            | SaleError::ExceedsIndividualCap { .. }
            | SaleError::BelowMinimum { .. }
            | SaleError::ExceedsAggregateCap { .. }
            | SaleError::InvalidRatio { .. }
            | SaleError::InvalidRange { .. }
            | SaleError::ValueMismatch { .. }
            | SaleError::ZeroRefund
            | SaleError::InsufficientContribution { .. }
            | SaleError::InsufficientPendingTokens { .. } => ErrorCategory::PolicyViolation,

            SaleError::Paused
            | SaleError::AlreadyPaused
            | SaleError::NotPaused
            | SaleError::UnsupportedDelivery { .. }
            | SaleError::WithdrawalLocked { .. }
            | SaleError::NoPendingTokens
            | SaleError::NoRefundDeposit
            | SaleError::InvariantViolated { .. } => ErrorCategory::StateViolation,

            SaleError::InvalidConfig { .. } | SaleError::InvalidSnapshot { .. } => {
                ErrorCategory::Configuration
            }

            SaleError::Overflow | SaleError::Ledger(_) => ErrorCategory::Ledger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_display() {
        let err = SaleError::Unauthorized(Role::OwnerOrWallet);
        assert_eq!(err.to_string(), "unauthorized: caller must be the owner or wallet");
        assert_eq!(err.category(), ErrorCategory::Authorization);
    }

    #[test]
    fn test_policy_categories() {
        assert_eq!(
            SaleError::BelowMinimum { amount: 1, min: 2 }.category(),
            ErrorCategory::PolicyViolation
        );
        assert_eq!(
            SaleError::NotWhitelisted([1u8; 20]).category(),
            ErrorCategory::PolicyViolation
        );
        assert_eq!(
            SaleError::InvalidRatio {
                numerator: 2,
                denominator: 1
            }
            .category(),
            ErrorCategory::PolicyViolation
        );
    }

    #[test]
    fn test_state_categories() {
        assert_eq!(SaleError::Paused.category(), ErrorCategory::StateViolation);
        assert_eq!(
            SaleError::NoRefundDeposit.category(),
            ErrorCategory::StateViolation
        );
    }

    #[test]
    fn test_ledger_error_conversion() {
        let err: SaleError = LedgerError::InvalidAmount.into();
        assert_eq!(err.category(), ErrorCategory::Ledger);
        assert!(err.to_string().starts_with("ledger error"));
    }

    #[test]
    fn test_config_category() {
        let err = SaleError::InvalidConfig {
            reason: "rate must be positive".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.to_string(), "invalid sale config: rate must be positive");
    }
}
