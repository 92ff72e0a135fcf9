use carry_types::{Address, Amount};
use thiserror::Error;

/// Errors raised by the token and base-currency ledgers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("supply cap exceeded: {supply} + {amount} > {cap}")]
    CapExceeded {
        supply: Amount,
        amount: Amount,
        cap: Amount,
    },

    #[error("insufficient balance: have {available}, need {required}")]
    InsufficientBalance { available: Amount, required: Amount },

    #[error("invalid amount: amount must be positive")]
    InvalidAmount,

    #[error("invalid recipient: {0:?}")]
    InvalidRecipient(Address),

    #[error("balance overflow")]
    BalanceOverflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_exceeded_display() {
        let err = LedgerError::CapExceeded {
            supply: 10,
            amount: 5,
            cap: 12,
        };
        assert_eq!(err.to_string(), "supply cap exceeded: 10 + 5 > 12");
    }

    #[test]
    fn test_insufficient_balance_display() {
        let err = LedgerError::InsufficientBalance {
            available: 1,
            required: 2,
        };
        assert!(err.to_string().contains("have 1, need 2"));
    }
}
