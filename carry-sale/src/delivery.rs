//! Delivery engine for deferred sales.
//!
//! In [`DeliveryMode::Gradual`] the owner releases a fraction of every
//! purchaser's pending tokens at a time, optionally over a slice of the
//! purchase order so that large sales can be delivered in batches. In
//! [`DeliveryMode::Scheduled`] each purchaser withdraws their own pending
//! tokens once the owner unlocks withdrawal or the due date passes.

use carry_token::{TokenLedger, ValueLedger};
use carry_types::addr::short_addr;
use carry_types::{Address, Amount};

use crate::config::DeliveryMode;
use crate::context::Context;
use crate::ensure;
use crate::error::SaleError;
use crate::event::{Response, SaleEvent};
use crate::math::{mul_div, safe_add};
use crate::sale::Crowdsale;

impl<T: TokenLedger, V: ValueLedger> Crowdsale<T, V> {
    fn require_delivery(&self, wanted: fn(&DeliveryMode) -> bool) -> Result<(), SaleError> {
        ensure!(
            wanted(&self.config.delivery),
            SaleError::UnsupportedDelivery {
                mode: self.config.delivery.name(),
            }
        );
        Ok(())
    }

    /// Deliver `numerator / denominator` of every purchaser's pending tokens
    /// (owner-only, gradual delivery).
    pub fn deliver_tokens_in_ratio(
        &mut self,
        ctx: &Context,
        numerator: u64,
        denominator: u64,
    ) -> Result<Response, SaleError> {
        let count = self.participants.purchaser_count();
        self.deliver_tokens_in_ratio_from_to(ctx, numerator, denominator, 0, count)
    }

    /// Deliver `numerator / denominator` of the pending tokens of purchasers
    /// `from..to` in purchase order (owner-only, gradual delivery).
    ///
    /// Each share is truncated. `to` is clamped to the number of purchasers;
    /// purchasers whose share rounds to zero are skipped.
    pub fn deliver_tokens_in_ratio_from_to(
        &mut self,
        ctx: &Context,
        numerator: u64,
        denominator: u64,
        from: usize,
        to: usize,
    ) -> Result<Response, SaleError> {
        self.ownable.require_owner(ctx)?;
        self.require_delivery(|m| matches!(m, DeliveryMode::Gradual))?;
        ensure!(
            denominator != 0 && numerator <= denominator,
            SaleError::InvalidRatio {
                numerator,
                denominator,
            }
        );
        ensure!(from <= to, SaleError::InvalidRange { from, to });

        let end = to.min(self.participants.purchaser_count());
        let start = from.min(end);
        let mut plan: Vec<(Address, Amount)> = Vec::new();
        let mut total: Amount = 0;
        for addr in &self.participants.purchasers()[start..end] {
            let pending = self.participants.get(addr).pending_tokens;
            let share = mul_div(pending, numerator, denominator)?;
            if share > 0 {
                total = safe_add(total, share)?;
                plan.push((*addr, share));
            }
        }

        let sale = self.config.address;
        let available = self.token.balance_of(&sale);
        ensure!(
            available >= total,
            SaleError::Ledger(carry_token::LedgerError::InsufficientBalance {
                available,
                required: total,
            })
        );

        for (i, (beneficiary, share)) in plan.iter().enumerate() {
            if let Err(e) = self.token.transfer(&sale, beneficiary, *share) {
                self.undo_deliveries(&plan[..i]);
                return Err(e.into());
            }
        }

        let mut resp = Response::with_action("deliver_tokens_in_ratio");
        for (beneficiary, share) in &plan {
            self.participants.entry(beneficiary).pending_tokens -= *share;
            resp = resp.add_event(SaleEvent::TokenDelivered {
                beneficiary: *beneficiary,
                token_amount: *share,
            });
        }
        tracing::info!(
            numerator,
            denominator,
            from = start,
            to = end,
            delivered = plan.len(),
            total,
            "delivered tokens in ratio"
        );
        Ok(resp)
    }

    fn undo_deliveries(&mut self, done: &[(Address, Amount)]) {
        let sale = self.config.address;
        for (beneficiary, share) in done.iter().rev() {
            if let Err(e) = self.token.transfer(beneficiary, &sale, *share) {
                tracing::error!(
                    beneficiary = %short_addr(beneficiary),
                    share,
                    error = %e,
                    "failed to roll back token delivery"
                );
            }
        }
    }

    /// Unlock or relock self-withdrawal before the due date (owner-only,
    /// scheduled delivery).
    pub fn set_withdrawable(&mut self, ctx: &Context, withdrawable: bool) -> Result<Response, SaleError> {
        self.ownable.require_owner(ctx)?;
        self.require_delivery(|m| matches!(m, DeliveryMode::Scheduled { .. }))?;
        self.withdrawable = withdrawable;
        tracing::info!(withdrawable, "withdrawable changed");
        Ok(Response::with_action("set_withdrawable")
            .add_event(SaleEvent::WithdrawableChanged { withdrawable }))
    }

    /// Whether scheduled withdrawal is allowed at the context's time.
    pub fn can_withdraw(&self, ctx: &Context) -> bool {
        match self.config.delivery {
            DeliveryMode::Scheduled { delivery_due } => {
                self.withdrawable || ctx.timestamp() >= delivery_due
            }
            _ => false,
        }
    }

    /// Withdraw all of the caller's pending tokens (scheduled delivery).
    pub fn withdraw_tokens(&mut self, ctx: &Context) -> Result<Response, SaleError> {
        let DeliveryMode::Scheduled { delivery_due } = self.config.delivery else {
            return Err(SaleError::UnsupportedDelivery {
                mode: self.config.delivery.name(),
            });
        };
        ensure!(
            self.can_withdraw(ctx),
            SaleError::WithdrawalLocked { delivery_due }
        );

        let beneficiary = ctx.sender();
        let pending = self.participants.get(&beneficiary).pending_tokens;
        ensure!(pending > 0, SaleError::NoPendingTokens);

        self.token.transfer(&self.config.address, &beneficiary, pending)?;
        self.participants.entry(&beneficiary).pending_tokens = 0;

        tracing::info!(
            beneficiary = %short_addr(&beneficiary),
            token_amount = pending,
            "tokens withdrawn"
        );
        Ok(Response::with_action("withdraw_tokens").add_event(SaleEvent::TokenDelivered {
            beneficiary,
            token_amount: pending,
        }))
    }
}
