//! Per-address sale records.

use std::collections::{BTreeMap, BTreeSet};

use borsh::{BorshDeserialize, BorshSerialize};
use carry_types::primitives::NOT_WHITELISTED;
use carry_types::{Address, Amount, Grade};
use serde::{Deserialize, Serialize};

/// Everything the sale tracks about one address.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Participant {
    /// Whitelist grade; `0` means not whitelisted.
    pub grade: Grade,
    /// Wei contributed, net of refunds.
    pub contribution: Amount,
    /// Tokens bought but not yet delivered.
    pub pending_tokens: Amount,
    /// Wei deposited for this address and not yet claimed.
    pub refunded_deposit: Amount,
}

impl Participant {
    pub fn is_whitelisted(&self) -> bool {
        self.grade != NOT_WHITELISTED
    }
}

/// Participant records plus the order in which addresses first purchased.
///
/// Records are created on first touch and never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Participants {
    records: BTreeMap<Address, Participant>,
    purchasers: Vec<Address>,
    purchased: BTreeSet<Address>,
}

impl Participants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts. Callers validate consistency.
    pub(crate) fn from_parts(records: BTreeMap<Address, Participant>, purchasers: Vec<Address>) -> Self {
        let purchased = purchasers.iter().copied().collect();
        Participants {
            records,
            purchasers,
            purchased,
        }
    }

    /// The record for `addr`, or an all-zero record if it was never touched.
    pub fn get(&self, addr: &Address) -> Participant {
        self.records.get(addr).copied().unwrap_or_default()
    }

    pub fn contains(&self, addr: &Address) -> bool {
        self.records.contains_key(addr)
    }

    pub(crate) fn entry(&mut self, addr: &Address) -> &mut Participant {
        self.records.entry(*addr).or_default()
    }

    /// Store `record` for `addr` and append `addr` to the purchase order if
    /// this is its first purchase.
    pub(crate) fn commit_purchase(&mut self, addr: &Address, record: Participant) {
        if self.purchased.insert(*addr) {
            self.purchasers.push(*addr);
        }
        self.records.insert(*addr, record);
    }

    pub(crate) fn set(&mut self, addr: &Address, record: Participant) {
        self.records.insert(*addr, record);
    }

    /// Addresses in the order of their first purchase.
    pub fn purchasers(&self) -> &[Address] {
        &self.purchasers
    }

    pub fn purchaser_count(&self) -> usize {
        self.purchasers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Participant)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all contributions. `None` on overflow.
    pub fn total_contribution(&self) -> Option<Amount> {
        self.records
            .values()
            .try_fold(0u128, |acc, p| acc.checked_add(p.contribution))
    }

    /// Sum of all pending token balances. `None` on overflow.
    pub fn total_pending_tokens(&self) -> Option<Amount> {
        self.records
            .values()
            .try_fold(0u128, |acc, p| acc.checked_add(p.pending_tokens))
    }

    /// Sum of all unclaimed refund deposits. `None` on overflow.
    pub fn total_refund_deposits(&self) -> Option<Amount> {
        self.records
            .values()
            .try_fold(0u128, |acc, p| acc.checked_add(p.refunded_deposit))
    }
}
