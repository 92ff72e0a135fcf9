use carry_types::{Address, Amount};

use crate::error::LedgerError;

/// The sale token as seen by the sale engine.
///
/// Implementations must be all-or-nothing: a failed call leaves every
/// balance and the total supply untouched.
pub trait TokenLedger {
    /// Create `amount` new tokens for `to`. Fails with
    /// [`LedgerError::CapExceeded`] if the total supply would pass the cap.
    fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), LedgerError>;

    /// Move `amount` tokens from `from` to `to`.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError>;

    fn balance_of(&self, addr: &Address) -> Amount;

    fn total_supply(&self) -> Amount;
}

/// Value-transfer primitive for the sale currency.
pub trait ValueLedger {
    /// Move `amount` wei from `from` to `to`.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError>;

    fn balance_of(&self, addr: &Address) -> Amount;
}
