use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use carry_types::{Address, Amount};

use crate::error::LedgerError;
use crate::ledger::ValueLedger;

/// In-memory balances of the sale currency.
///
/// Stands in for the execution environment's native value transfer.
/// Accounts are funded with [`NativeLedger::credit`].
#[derive(Debug, Clone, Default, BorshSerialize, BorshDeserialize)]
pub struct NativeLedger {
    balances: BTreeMap<Address, Amount>,
}

impl NativeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `addr` out of thin air.
    pub fn credit(&mut self, addr: &Address, amount: Amount) -> Result<(), LedgerError> {
        let balance = self.balances.entry(*addr).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;
        Ok(())
    }

    /// Sum of all balances.
    pub fn total(&self) -> Amount {
        self.balances.values().sum()
    }
}

impl ValueLedger for NativeLedger {
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                available: from_balance,
                required: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let new_to = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;

        self.balances.insert(*from, from_balance - amount);
        self.balances.insert(*to, new_to);
        Ok(())
    }

    fn balance_of(&self, addr: &Address) -> Amount {
        self.balances.get(addr).copied().unwrap_or(0)
    }
}
