//! The CRE token: fixed-cap, mintable, transferable.
//!
//! The cap is set at construction and never raised. The sale mints into it
//! on purchase (immediate delivery) or once up front into the sale's own
//! balance (deferred delivery).

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use carry_types::constants::{CRE_DECIMALS, TOTAL_CAP};
use carry_types::primitives::ZERO_ADDRESS;
use carry_types::{Address, Amount};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ledger::TokenLedger;

/// Token metadata returned by [`CarryToken::info`].
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub cap: Amount,
    pub total_supply: Amount,
}

/// In-memory CRE ledger.
#[derive(Debug, Clone, BorshSerialize, BorshDeserialize)]
pub struct CarryToken {
    name: String,
    symbol: String,
    decimals: u8,
    cap: Amount,
    total_supply: Amount,
    balances: BTreeMap<Address, Amount>,
}

impl Default for CarryToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CarryToken {
    /// The production token: "Carry Token" / "CRE", 18 decimals, 10 billion cap.
    pub fn new() -> Self {
        Self::with_cap(TOTAL_CAP)
    }

    /// A CRE token with a custom cap. Used to exercise cap exhaustion.
    pub fn with_cap(cap: Amount) -> Self {
        Self {
            name: "Carry Token".to_string(),
            symbol: "CRE".to_string(),
            decimals: CRE_DECIMALS as u8,
            cap,
            total_supply: 0,
            balances: BTreeMap::new(),
        }
    }

    pub fn cap(&self) -> Amount {
        self.cap
    }

    /// Tokens that can still be minted before the cap is reached.
    pub fn mintable(&self) -> Amount {
        self.cap - self.total_supply
    }

    pub fn info(&self) -> TokenInfo {
        TokenInfo {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            cap: self.cap,
            total_supply: self.total_supply,
        }
    }

    /// Number of accounts with a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.values().filter(|b| **b > 0).count()
    }
}

impl TokenLedger for CarryToken {
    fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if *to == ZERO_ADDRESS {
            return Err(LedgerError::InvalidRecipient(*to));
        }
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .filter(|s| *s <= self.cap)
            .ok_or(LedgerError::CapExceeded {
                supply: self.total_supply,
                amount,
                cap: self.cap,
            })?;
        let balance = self.balances.get(to).copied().unwrap_or(0);
        let new_balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;

        self.balances.insert(*to, new_balance);
        self.total_supply = new_supply;
        tracing::debug!(amount, supply = new_supply, "minted CRE");
        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if *to == ZERO_ADDRESS {
            return Err(LedgerError::InvalidRecipient(*to));
        }
        let from_balance = self.balances.get(from).copied().unwrap_or(0);
        if from_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                available: from_balance,
                required: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let to_balance = self.balances.get(to).copied().unwrap_or(0);
        let new_to = to_balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;

        self.balances.insert(*from, from_balance - amount);
        self.balances.insert(*to, new_to);
        Ok(())
    }

    fn balance_of(&self, addr: &Address) -> Amount {
        self.balances.get(addr).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }
}
