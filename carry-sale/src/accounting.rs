//! Contribution accounting: admission checks and purchase bookkeeping.

use carry_token::{TokenLedger, ValueLedger};
use carry_types::addr::short_addr;
use carry_types::constants::MAX_GAS_PRICE;
use carry_types::units::format_ether;
use carry_types::Amount;

use crate::context::Context;
use crate::ensure;
use crate::error::SaleError;
use crate::event::{Response, SaleEvent};
use crate::math::{safe_add, safe_mul};
use crate::participant::Participant;
use crate::sale::Crowdsale;

impl<T: TokenLedger, V: ValueLedger> Crowdsale<T, V> {
    /// Buy tokens with the wei attached to `ctx`.
    ///
    /// Checks, in order: pause, whitelist, phase, gas price, individual cap,
    /// minimum purchase, aggregate cap. On success the wei goes to the wallet
    /// and the tokens are either minted to the purchaser or recorded as
    /// pending, depending on the delivery mode.
    pub fn contribute(&mut self, ctx: &Context) -> Result<Response, SaleError> {
        let purchaser = ctx.sender();
        let amount = ctx.value();
        let now = ctx.timestamp();
        let record = self.participants.get(&purchaser);

        if let Err(e) = self.check_contribution(ctx, &record) {
            tracing::debug!(
                purchaser = %short_addr(&purchaser),
                value = %format_ether(amount),
                error = %e,
                "contribution rejected"
            );
            return Err(e);
        }

        let token_amount = safe_mul(amount, self.config.rate as Amount)?;
        let wei_raised = safe_add(self.wei_raised, amount)?;
        let mut updated = Participant {
            contribution: safe_add(record.contribution, amount)?,
            ..record
        };
        let deferred = self.config.delivery.is_deferred();
        if deferred {
            updated.pending_tokens = safe_add(record.pending_tokens, token_amount)?;
        }

        self.funds.transfer(&purchaser, &self.config.wallet, amount)?;
        if !deferred {
            if let Err(e) = self.token.mint(&purchaser, token_amount) {
                self.undo_forward(&purchaser, amount);
                return Err(e.into());
            }
        }

        self.participants.commit_purchase(&purchaser, updated);
        self.wei_raised = wei_raised;

        tracing::info!(
            purchaser = %short_addr(&purchaser),
            value = %format_ether(amount),
            token_amount,
            raised = %format_ether(wei_raised),
            at = now,
            "token purchase"
        );
        Ok(Response::with_action("contribute").add_event(SaleEvent::TokenPurchase {
            purchaser,
            value: amount,
            token_amount,
        }))
    }

    fn check_contribution(&self, ctx: &Context, record: &Participant) -> Result<(), SaleError> {
        let purchaser = ctx.sender();
        let amount = ctx.value();
        let now = ctx.timestamp();

        self.pausable.require_not_paused()?;
        ensure!(record.is_whitelisted(), SaleError::NotWhitelisted(purchaser));
        ensure!(
            self.schedule.is_open(record.grade, now),
            SaleError::PhaseClosed {
                grade: record.grade,
                timestamp: now,
            }
        );
        ensure!(
            ctx.gas_price() <= MAX_GAS_PRICE,
            SaleError::GasPriceTooHigh {
                gas_price: ctx.gas_price(),
                max: MAX_GAS_PRICE,
            }
        );

        let individual_cap = self.schedule.individual_cap_at(now);
        let within_individual = record
            .contribution
            .checked_add(amount)
            .is_some_and(|total| total <= individual_cap);
        ensure!(
            within_individual,
            SaleError::ExceedsIndividualCap {
                contribution: record.contribution,
                amount,
                cap: individual_cap,
            }
        );

        let min = self.config.individual_min_purchase;
        ensure!(
            amount > 0 && amount >= min,
            SaleError::BelowMinimum { amount, min }
        );

        let within_aggregate = self
            .wei_raised
            .checked_add(amount)
            .is_some_and(|total| total <= self.config.cap);
        ensure!(
            within_aggregate,
            SaleError::ExceedsAggregateCap {
                raised: self.wei_raised,
                amount,
                cap: self.config.cap,
            }
        );
        Ok(())
    }

    /// Send forwarded wei back from the wallet after a failed mint.
    fn undo_forward(&mut self, purchaser: &carry_types::Address, amount: Amount) {
        if let Err(e) = self.funds.transfer(&self.config.wallet, purchaser, amount) {
            tracing::error!(
                purchaser = %short_addr(purchaser),
                amount,
                error = %e,
                "failed to return forwarded funds"
            );
        }
    }
}
