//! Refund protocol.
//!
//! A refund is two steps. The owner or the wallet deposits wei back into
//! the sale for a beneficiary, which reduces the beneficiary's contribution
//! and pending tokens right away. The beneficiary then claims the deposit,
//! to itself or to another receiver.
//!
//! Refunds need deferred delivery: tokens minted on purchase cannot be taken
//! back, so an immediate-delivery sale rejects deposits.

use carry_token::{TokenLedger, ValueLedger};
use carry_types::addr::short_addr;
use carry_types::primitives::ZERO_ADDRESS;
use carry_types::units::format_ether;
use carry_types::{Address, Amount};

use crate::context::Context;
use crate::error::{Role, SaleError};
use crate::event::{Response, SaleEvent};
use crate::math::{safe_add, safe_mul, safe_sub};
use crate::participant::Participant;
use crate::sale::Crowdsale;
use crate::{ensure, ensure_ne};

impl<T: TokenLedger, V: ValueLedger> Crowdsale<T, V> {
    /// Deposit `value` wei as a refund for `beneficiary` (owner or wallet).
    ///
    /// The call must carry exactly `value` wei. Deposits accumulate until
    /// claimed.
    pub fn deposit_refund(
        &mut self,
        ctx: &Context,
        beneficiary: &Address,
        value: Amount,
    ) -> Result<Response, SaleError> {
        let caller = ctx.sender();
        ensure!(
            self.ownable.is_owner(&caller) || caller == self.config.wallet,
            SaleError::Unauthorized(Role::OwnerOrWallet)
        );
        ensure!(
            self.config.delivery.is_deferred(),
            SaleError::UnsupportedDelivery {
                mode: self.config.delivery.name(),
            }
        );
        ensure!(value > 0, SaleError::ZeroRefund);
        ensure!(
            ctx.value() == value,
            SaleError::ValueMismatch {
                expected: value,
                actual: ctx.value(),
            }
        );

        let record = self.participants.get(beneficiary);
        ensure!(
            value <= record.contribution,
            SaleError::InsufficientContribution {
                contribution: record.contribution,
                requested: value,
            }
        );

        let token_amount = safe_mul(value, self.config.rate as Amount)?;
        ensure!(
            token_amount <= record.pending_tokens,
            SaleError::InsufficientPendingTokens {
                pending: record.pending_tokens,
                required: token_amount,
            }
        );
        let updated = Participant {
            contribution: record.contribution - value,
            pending_tokens: record.pending_tokens - token_amount,
            refunded_deposit: safe_add(record.refunded_deposit, value)?,
            ..record
        };
        let wei_raised = safe_sub(self.wei_raised, value)?;

        self.funds.transfer(&caller, &self.config.address, value)?;
        self.participants.set(beneficiary, updated);
        self.wei_raised = wei_raised;

        tracing::info!(
            beneficiary = %short_addr(beneficiary),
            wei_amount = %format_ether(value),
            token_amount,
            "refund deposited"
        );
        Ok(Response::with_action("deposit_refund").add_event(SaleEvent::RefundDeposited {
            beneficiary: *beneficiary,
            token_amount,
            wei_amount: value,
        }))
    }

    /// Pay the deposit of `beneficiary` to `beneficiary` (beneficiary or owner).
    pub fn receive_refund(&mut self, ctx: &Context, beneficiary: &Address) -> Result<Response, SaleError> {
        let caller = ctx.sender();
        ensure!(
            caller == *beneficiary || self.ownable.is_owner(&caller),
            SaleError::Unauthorized(Role::OwnerOrBeneficiary)
        );
        self.pay_refund(beneficiary, beneficiary, "receive_refund")
    }

    /// Pay the deposit of `beneficiary` to `receiver` (beneficiary only).
    ///
    /// `receiver` may be neither the zero address nor the sale itself.
    pub fn receive_refund_to(
        &mut self,
        ctx: &Context,
        beneficiary: &Address,
        receiver: &Address,
    ) -> Result<Response, SaleError> {
        ensure!(
            ctx.sender() == *beneficiary,
            SaleError::Unauthorized(Role::Beneficiary)
        );
        ensure_ne!(
            *receiver,
            ZERO_ADDRESS,
            SaleError::InvalidAddress {
                reason: "refund receiver cannot be the zero address".to_string(),
            }
        );
        ensure_ne!(
            *receiver,
            self.config.address,
            SaleError::InvalidAddress {
                reason: "refund receiver cannot be the sale".to_string(),
            }
        );
        self.pay_refund(beneficiary, receiver, "receive_refund_to")
    }

    fn pay_refund(
        &mut self,
        beneficiary: &Address,
        receiver: &Address,
        action: &str,
    ) -> Result<Response, SaleError> {
        let deposit = self.participants.get(beneficiary).refunded_deposit;
        ensure!(deposit > 0, SaleError::NoRefundDeposit);

        self.participants.entry(beneficiary).refunded_deposit = 0;
        if let Err(e) = self.funds.transfer(&self.config.address, receiver, deposit) {
            self.participants.entry(beneficiary).refunded_deposit = deposit;
            return Err(e.into());
        }

        tracing::info!(
            beneficiary = %short_addr(beneficiary),
            receiver = %short_addr(receiver),
            wei_amount = %format_ether(deposit),
            "refunded"
        );
        Ok(Response::with_action(action).add_event(SaleEvent::Refunded {
            beneficiary: *beneficiary,
            receiver: *receiver,
            wei_amount: deposit,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeliveryMode;
    use crate::testing::*;
    use carry_types::constants::{ETHER, FINNEY};

    fn with_purchase(mode: DeliveryMode) -> TestSale {
        let mut sale = deploy(flat_config(mode));
        sale.add_many_to_whitelist(&Context::new(ALICE), &[BOB, CHARLIE], 1)
            .unwrap();
        sale.contribute(&buy(BOB, 500 * FINNEY)).unwrap();
        sale
    }

    fn refund_ctx(sender: Address, value: Amount) -> Context {
        Context::new(sender).with_value(value)
    }

    #[test]
    fn test_deposit_refund_gradual() {
        let mut sale = with_purchase(DeliveryMode::Gradual);
        let resp = sale
            .deposit_refund(&refund_ctx(ALICE, 300 * FINNEY), &BOB, 300 * FINNEY)
            .unwrap();
        assert_eq!(
            resp.events(),
            &[SaleEvent::RefundDeposited {
                beneficiary: BOB,
                token_amount: 300 * FINNEY * PRESALE_RATE as Amount,
                wei_amount: 300 * FINNEY,
            }]
        );
        assert_eq!(sale.contribution_of(&BOB), 200 * FINNEY);
        assert_eq!(sale.wei_raised(), 200 * FINNEY);
        assert_eq!(
            sale.pending_tokens_of(&BOB),
            200 * FINNEY * PRESALE_RATE as Amount
        );
        assert_eq!(sale.refunded_deposit_of(&BOB), 300 * FINNEY);
        assert_eq!(sale.funds().balance_of(&SALE), 300 * FINNEY);
        sale.verify_invariants().unwrap();
    }

    #[test]
    fn test_refund_exceeding_contribution() {
        let mut sale = with_purchase(DeliveryMode::Gradual);
        sale.deposit_refund(&refund_ctx(ALICE, 300 * FINNEY), &BOB, 300 * FINNEY)
            .unwrap();
        let err = sale
            .deposit_refund(&refund_ctx(ALICE, 201 * FINNEY), &BOB, 201 * FINNEY)
            .unwrap_err();
        assert_eq!(
            err,
            SaleError::InsufficientContribution {
                contribution: 200 * FINNEY,
                requested: 201 * FINNEY
            }
        );
        sale.deposit_refund(&refund_ctx(ALICE, 200 * FINNEY), &BOB, 200 * FINNEY)
            .unwrap();
        assert_eq!(sale.contribution_of(&BOB), 0);
        assert_eq!(sale.refunded_deposit_of(&BOB), 500 * FINNEY);
    }

    #[test]
    fn test_deposit_refund_by_wallet() {
        let mut sale = with_purchase(DeliveryMode::Scheduled {
            delivery_due: PUBLIC_DELIVERY_DUE,
        });
        sale.deposit_refund(&refund_ctx(WALLET, 100 * FINNEY), &BOB, 100 * FINNEY)
            .unwrap();
        assert_eq!(sale.refunded_deposit_of(&BOB), 100 * FINNEY);
        assert_eq!(
            sale.pending_tokens_of(&BOB),
            400 * FINNEY * PRESALE_RATE as Amount
        );
        sale.verify_invariants().unwrap();
    }

    #[test]
    fn test_no_refund_with_immediate_delivery() {
        let mut sale = with_purchase(DeliveryMode::Immediate);
        let err = sale
            .deposit_refund(&refund_ctx(ALICE, 500 * FINNEY), &BOB, 500 * FINNEY)
            .unwrap_err();
        assert_eq!(err, SaleError::UnsupportedDelivery { mode: "immediate" });
        assert_eq!(sale.contribution_of(&BOB), 500 * FINNEY);
        assert_eq!(sale.wei_raised(), 500 * FINNEY);
        assert_eq!(sale.funds().balance_of(&SALE), 0);

        // the spent cap stays spent, so minted tokens never exceed it
        sale.contribute(&buy(BOB, 49_500 * FINNEY)).unwrap();
        assert!(matches!(
            sale.contribute(&buy(BOB, 500 * FINNEY)),
            Err(SaleError::ExceedsIndividualCap { .. })
        ));
        assert_eq!(
            sale.token().balance_of(&BOB),
            50 * ETHER * PRESALE_RATE as Amount
        );
    }

    #[test]
    fn test_deposit_refund_unauthorized() {
        let mut sale = with_purchase(DeliveryMode::Gradual);
        let err = sale
            .deposit_refund(&refund_ctx(BOB, 100 * FINNEY), &BOB, 100 * FINNEY)
            .unwrap_err();
        assert_eq!(err, SaleError::Unauthorized(Role::OwnerOrWallet));
    }

    #[test]
    fn test_deposit_refund_value_mismatch() {
        let mut sale = with_purchase(DeliveryMode::Gradual);
        let err = sale
            .deposit_refund(&refund_ctx(ALICE, 99 * FINNEY), &BOB, 100 * FINNEY)
            .unwrap_err();
        assert_eq!(
            err,
            SaleError::ValueMismatch {
                expected: 100 * FINNEY,
                actual: 99 * FINNEY
            }
        );
        assert_eq!(
            sale.deposit_refund(&refund_ctx(ALICE, 0), &BOB, 0)
                .unwrap_err(),
            SaleError::ZeroRefund
        );
    }

    #[test]
    fn test_deposit_refund_needs_pending_tokens() {
        let mut sale = with_purchase(DeliveryMode::Gradual);
        sale.deliver_tokens_in_ratio(&Context::new(ALICE), 1, 1)
            .unwrap();
        let err = sale
            .deposit_refund(&refund_ctx(ALICE, 100 * FINNEY), &BOB, 100 * FINNEY)
            .unwrap_err();
        assert!(matches!(err, SaleError::InsufficientPendingTokens { .. }));
        assert_eq!(sale.contribution_of(&BOB), 500 * FINNEY);
    }

    #[test]
    fn test_receive_refund() {
        let mut sale = with_purchase(DeliveryMode::Gradual);
        sale.deposit_refund(&refund_ctx(ALICE, 300 * FINNEY), &BOB, 300 * FINNEY)
            .unwrap();
        let before = sale.funds().balance_of(&BOB);
        let resp = sale.receive_refund(&Context::new(BOB), &BOB).unwrap();
        assert_eq!(
            resp.events(),
            &[SaleEvent::Refunded {
                beneficiary: BOB,
                receiver: BOB,
                wei_amount: 300 * FINNEY,
            }]
        );
        assert_eq!(sale.funds().balance_of(&BOB), before + 300 * FINNEY);
        assert_eq!(sale.refunded_deposit_of(&BOB), 0);
        assert_eq!(
            sale.receive_refund(&Context::new(BOB), &BOB).unwrap_err(),
            SaleError::NoRefundDeposit
        );
    }

    #[test]
    fn test_owner_can_trigger_refund() {
        let mut sale = with_purchase(DeliveryMode::Gradual);
        sale.deposit_refund(&refund_ctx(ALICE, 300 * FINNEY), &BOB, 300 * FINNEY)
            .unwrap();
        let before = sale.funds().balance_of(&BOB);
        sale.receive_refund(&Context::new(ALICE), &BOB).unwrap();
        assert_eq!(sale.funds().balance_of(&BOB), before + 300 * FINNEY);

        sale.deposit_refund(&refund_ctx(ALICE, 100 * FINNEY), &BOB, 100 * FINNEY)
            .unwrap();
        assert_eq!(
            sale.receive_refund(&Context::new(CHARLIE), &BOB).unwrap_err(),
            SaleError::Unauthorized(Role::OwnerOrBeneficiary)
        );
    }

    #[test]
    fn test_receive_refund_to_other_address() {
        let mut sale = with_purchase(DeliveryMode::Gradual);
        sale.deposit_refund(&refund_ctx(ALICE, 300 * FINNEY), &BOB, 300 * FINNEY)
            .unwrap();
        assert_eq!(
            sale.receive_refund_to(&Context::new(ALICE), &BOB, &ALICE)
                .unwrap_err(),
            SaleError::Unauthorized(Role::Beneficiary)
        );
        let before = sale.funds().balance_of(&DAVE);
        sale.receive_refund_to(&Context::new(BOB), &BOB, &DAVE)
            .unwrap();
        assert_eq!(sale.funds().balance_of(&DAVE), before + 300 * FINNEY);
        assert_eq!(sale.refunded_deposit_of(&BOB), 0);
        sale.verify_invariants().unwrap();
    }

    #[test]
    fn test_refund_receiver_must_be_outside_the_sale() {
        let mut sale = with_purchase(DeliveryMode::Gradual);
        sale.deposit_refund(&refund_ctx(ALICE, ETHER / 2), &BOB, ETHER / 2)
            .unwrap();

        for receiver in [SALE, ZERO_ADDRESS] {
            let err = sale
                .receive_refund_to(&Context::new(BOB), &BOB, &receiver)
                .unwrap_err();
            assert!(matches!(err, SaleError::InvalidAddress { .. }));
        }
        assert_eq!(sale.refunded_deposit_of(&BOB), ETHER / 2);
        assert_eq!(sale.funds().balance_of(&SALE), ETHER / 2);

        sale.receive_refund_to(&Context::new(BOB), &BOB, &CHARLIE)
            .unwrap();
        assert_eq!(sale.funds().balance_of(&SALE), 0);
        sale.verify_invariants().unwrap();
    }

    #[test]
    fn test_deposits_accumulate() {
        let mut sale = with_purchase(DeliveryMode::Gradual);
        sale.deposit_refund(&refund_ctx(ALICE, 100 * FINNEY), &BOB, 100 * FINNEY)
            .unwrap();
        sale.deposit_refund(&refund_ctx(WALLET, 150 * FINNEY), &BOB, 150 * FINNEY)
            .unwrap();
        assert_eq!(sale.refunded_deposit_of(&BOB), 250 * FINNEY);
        let resp = sale.receive_refund(&Context::new(BOB), &BOB).unwrap();
        assert_eq!(resp.events()[0].attribute("wei_amount").unwrap(), (250 * FINNEY).to_string());
    }
}
