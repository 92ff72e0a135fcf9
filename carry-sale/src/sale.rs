//! The crowdsale state machine.
//!
//! Operations are split across modules by concern:
//!
//! - [`whitelist`](crate::whitelist): grade registry
//! - [`accounting`](crate::accounting): `contribute`
//! - [`delivery`](crate::delivery): ratio delivery and scheduled withdrawal
//! - [`refund`](crate::refund): refund deposits and claims
//!
//! This module holds the state, construction, ownership and pause
//! forwarding, queries and the invariant check.

use carry_token::{TokenLedger, ValueLedger};
use carry_types::{Address, Amount, Grade, Timestamp};

use crate::config::{DeliveryMode, SaleConfig};
use crate::context::Context;
use crate::error::SaleError;
use crate::event::Response;
use crate::ownable::Ownable;
use crate::participant::{Participant, Participants};
use crate::pausable::Pausable;
use crate::schedule::{Phase, PhaseSchedule};

/// A token sale backed by a token ledger `T` and a value ledger `V`.
///
/// Every operation is all-or-nothing: on error, neither the sale nor either
/// ledger has changed.
#[derive(Debug, Clone)]
pub struct Crowdsale<T: TokenLedger, V: ValueLedger> {
    pub(crate) config: SaleConfig,
    pub(crate) schedule: PhaseSchedule,
    pub(crate) ownable: Ownable,
    pub(crate) pausable: Pausable,
    pub(crate) withdrawable: bool,
    pub(crate) wei_raised: Amount,
    pub(crate) participants: Participants,
    pub(crate) token: T,
    pub(crate) funds: V,
}

impl<T: TokenLedger, V: ValueLedger> Crowdsale<T, V> {
    /// Deploy a sale owned by the caller.
    pub fn new(ctx: &Context, config: SaleConfig, token: T, funds: V) -> Result<Self, SaleError> {
        config.validate()?;
        let schedule = config.phase_schedule()?;
        tracing::info!(
            owner = %carry_types::addr::short_addr(&ctx.sender()),
            rate = config.rate,
            cap = %carry_types::units::format_ether(config.cap),
            delivery = config.delivery.name(),
            grades = schedule.grade_count() - 1,
            "crowdsale created"
        );
        Ok(Crowdsale {
            config,
            schedule,
            ownable: Ownable::new(ctx.sender()),
            pausable: Pausable::new(),
            withdrawable: false,
            wei_raised: 0,
            participants: Participants::new(),
            token,
            funds,
        })
    }

    // ── Ownership & pause ──────────────────────────────────────────────

    pub fn owner(&self) -> Address {
        self.ownable.owner()
    }

    pub fn transfer_ownership(&mut self, ctx: &Context, new_owner: &Address) -> Result<Response, SaleError> {
        self.ownable.transfer_ownership(ctx, new_owner)
    }

    pub fn is_paused(&self) -> bool {
        self.pausable.is_paused()
    }

    /// Stop accepting contributions (owner-only).
    pub fn pause(&mut self, ctx: &Context) -> Result<Response, SaleError> {
        self.pausable.pause(ctx, &self.ownable)
    }

    /// Resume accepting contributions (owner-only).
    pub fn unpause(&mut self, ctx: &Context) -> Result<Response, SaleError> {
        self.pausable.unpause(ctx, &self.ownable)
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn config(&self) -> &SaleConfig {
        &self.config
    }

    pub fn schedule(&self) -> &PhaseSchedule {
        &self.schedule
    }

    /// The sale's own account.
    pub fn address(&self) -> Address {
        self.config.address
    }

    pub fn wallet(&self) -> Address {
        self.config.wallet
    }

    pub fn rate(&self) -> u64 {
        self.config.rate
    }

    pub fn cap(&self) -> Amount {
        self.config.cap
    }

    pub fn delivery(&self) -> DeliveryMode {
        self.config.delivery
    }

    pub fn wei_raised(&self) -> Amount {
        self.wei_raised
    }

    /// Wei still accepted before the aggregate cap is reached.
    pub fn remaining_cap(&self) -> Amount {
        self.config.cap.saturating_sub(self.wei_raised)
    }

    pub fn cap_reached(&self) -> bool {
        self.wei_raised >= self.config.cap
    }

    /// Whether purchasers may withdraw their tokens in scheduled delivery,
    /// ignoring the due date.
    pub fn is_withdrawable(&self) -> bool {
        self.withdrawable
    }

    pub fn participant(&self, addr: &Address) -> Participant {
        self.participants.get(addr)
    }

    pub fn participants(&self) -> &Participants {
        &self.participants
    }

    pub fn contribution_of(&self, addr: &Address) -> Amount {
        self.participants.get(addr).contribution
    }

    pub fn pending_tokens_of(&self, addr: &Address) -> Amount {
        self.participants.get(addr).pending_tokens
    }

    pub fn refunded_deposit_of(&self, addr: &Address) -> Amount {
        self.participants.get(addr).refunded_deposit
    }

    /// Addresses in the order of their first purchase.
    pub fn purchasers(&self) -> &[Address] {
        self.participants.purchasers()
    }

    pub fn individual_cap_at(&self, t: Timestamp) -> Amount {
        self.schedule.individual_cap_at(t)
    }

    pub fn current_phase(&self, t: Timestamp) -> Phase {
        self.schedule.current_phase(t)
    }

    pub fn is_open(&self, grade: Grade, t: Timestamp) -> bool {
        self.schedule.is_open(grade, t)
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    /// Mutable access to the token ledger, e.g. to fund a deferred sale.
    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    pub fn funds(&self) -> &V {
        &self.funds
    }

    /// Mutable access to the value ledger, e.g. to credit contributors.
    pub fn funds_mut(&mut self) -> &mut V {
        &mut self.funds
    }

    /// Consume the sale, returning its ledgers.
    pub fn into_ledgers(self) -> (T, V) {
        (self.token, self.funds)
    }

    // ── Invariants ─────────────────────────────────────────────────────

    /// Check the bookkeeping invariants against the ledgers.
    ///
    /// - `wei_raised` equals the sum of contributions and is within the cap
    /// - the sale holds at least the wei owed as refund deposits
    /// - in deferred delivery, the sale holds at least the pending tokens
    pub fn verify_invariants(&self) -> Result<(), SaleError> {
        let violated = |reason: String| Err(SaleError::InvariantViolated { reason });

        let total = self.participants.total_contribution().ok_or(SaleError::Overflow)?;
        if total != self.wei_raised {
            return violated(format!(
                "wei raised {} != sum of contributions {}",
                self.wei_raised, total
            ));
        }
        if self.wei_raised > self.config.cap {
            return violated(format!(
                "wei raised {} exceeds cap {}",
                self.wei_raised, self.config.cap
            ));
        }

        let deposits = self.participants.total_refund_deposits().ok_or(SaleError::Overflow)?;
        let held = self.funds.balance_of(&self.config.address);
        if held < deposits {
            return violated(format!("sale holds {} wei, owes {} in refunds", held, deposits));
        }

        if self.config.delivery.is_deferred() {
            let pending = self.participants.total_pending_tokens().ok_or(SaleError::Overflow)?;
            let tokens = self.token.balance_of(&self.config.address);
            if tokens < pending {
                return violated(format!("sale holds {} tokens, owes {}", tokens, pending));
            }
        }

        let known = self
            .participants
            .purchasers()
            .iter()
            .all(|addr| self.participants.contains(addr));
        if !known {
            return violated("purchaser without a participant record".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use carry_token::{CarryToken, NativeLedger};

    #[test]
    fn test_new_sets_owner() {
        let sale = deploy(flat_config(DeliveryMode::Immediate));
        assert_eq!(sale.owner(), ALICE);
        assert!(!sale.is_paused());
        assert!(!sale.is_withdrawable());
        assert_eq!(sale.wei_raised(), 0);
        assert!(sale.purchasers().is_empty());
        sale.verify_invariants().unwrap();
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = flat_config(DeliveryMode::Immediate);
        config.rate = 0;
        let result = Crowdsale::new(
            &Context::new(ALICE),
            config,
            CarryToken::new(),
            NativeLedger::new(),
        );
        assert!(matches!(result, Err(SaleError::InvalidConfig { .. })));
    }

    #[test]
    fn test_pause_forwarding() {
        let mut sale = deploy(flat_config(DeliveryMode::Immediate));
        sale.pause(&Context::new(ALICE)).unwrap();
        assert!(sale.is_paused());
        sale.unpause(&Context::new(ALICE)).unwrap();
        assert!(!sale.is_paused());
    }

    #[test]
    fn test_ownership_forwarding() {
        let mut sale = deploy(flat_config(DeliveryMode::Immediate));
        sale.transfer_ownership(&Context::new(ALICE), &BOB).unwrap();
        assert_eq!(sale.owner(), BOB);
        assert!(sale.pause(&Context::new(ALICE)).is_err());
        assert!(sale.pause(&Context::new(BOB)).is_ok());
    }

    #[test]
    fn test_remaining_cap() {
        let sale = deploy(flat_config(DeliveryMode::Immediate));
        assert_eq!(sale.remaining_cap(), sale.cap());
        assert!(!sale.cap_reached());
    }
}
