//! Borsh-encoded snapshots of the mutable sale state.
//!
//! A snapshot holds everything a sale accumulates after construction. The
//! config and the ledgers are supplied again on restore.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use carry_token::{TokenLedger, ValueLedger};
use carry_types::{Address, Amount};

use crate::config::SaleConfig;
use crate::error::SaleError;
use crate::ownable::Ownable;
use crate::participant::{Participant, Participants};
use crate::pausable::Pausable;
use crate::sale::Crowdsale;

/// Snapshot format version.
pub const SNAPSHOT_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SaleSnapshot {
    pub version: u8,
    pub owner: Address,
    pub paused: bool,
    pub withdrawable: bool,
    pub wei_raised: Amount,
    pub participants: Vec<(Address, Participant)>,
    /// Addresses in the order of their first purchase.
    pub purchasers: Vec<Address>,
}

impl SaleSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SaleError> {
        borsh::to_vec(self).map_err(|e| SaleError::InvalidSnapshot {
            reason: format!("serialize: {e}"),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SaleError> {
        let snapshot = SaleSnapshot::try_from_slice(bytes).map_err(|e| SaleError::InvalidSnapshot {
            reason: format!("deserialize: {e}"),
        })?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SaleError::InvalidSnapshot {
                reason: format!(
                    "unsupported version {} (expected {})",
                    snapshot.version, SNAPSHOT_VERSION
                ),
            });
        }
        Ok(snapshot)
    }
}

impl<T: TokenLedger, V: ValueLedger> Crowdsale<T, V> {
    /// Capture the mutable sale state.
    pub fn snapshot(&self) -> SaleSnapshot {
        SaleSnapshot {
            version: SNAPSHOT_VERSION,
            owner: self.ownable.owner(),
            paused: self.pausable.is_paused(),
            withdrawable: self.withdrawable,
            wei_raised: self.wei_raised,
            participants: self.participants.iter().map(|(a, p)| (*a, *p)).collect(),
            purchasers: self.participants.purchasers().to_vec(),
        }
    }

    /// Rebuild a sale from `config`, a snapshot taken from a sale with the
    /// same config, and the ledgers it ran against.
    ///
    /// The restored state must pass [`Crowdsale::verify_invariants`].
    pub fn from_snapshot(
        config: SaleConfig,
        snapshot: SaleSnapshot,
        token: T,
        funds: V,
    ) -> Result<Self, SaleError> {
        config.validate()?;
        let schedule = config.phase_schedule()?;

        let invalid = |reason: String| SaleError::InvalidSnapshot { reason };
        let records: BTreeMap<Address, Participant> = snapshot.participants.into_iter().collect();
        let mut seen = std::collections::BTreeSet::new();
        for addr in &snapshot.purchasers {
            if !seen.insert(*addr) {
                return Err(invalid(format!(
                    "duplicate purchaser {}",
                    carry_types::addr::addr_to_hex(addr)
                )));
            }
        }
        if let Some((addr, p)) = records
            .iter()
            .find(|(_, p)| p.grade != 0 && !schedule.is_valid_grade(p.grade))
        {
            return Err(invalid(format!(
                "grade {} of {} is not valid for this config",
                p.grade,
                carry_types::addr::addr_to_hex(addr)
            )));
        }

        let sale = Crowdsale {
            config,
            schedule,
            ownable: Ownable::new(snapshot.owner),
            pausable: Pausable::restore(snapshot.paused),
            withdrawable: snapshot.withdrawable,
            wei_raised: snapshot.wei_raised,
            participants: Participants::from_parts(records, snapshot.purchasers),
            token,
            funds,
        };
        sale.verify_invariants().map_err(|e| match e {
            SaleError::InvariantViolated { reason } => invalid(reason),
            other => other,
        })?;
        tracing::info!(
            participants = sale.participants.len(),
            purchasers = sale.participants.purchaser_count(),
            "crowdsale restored from snapshot"
        );
        Ok(sale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeliveryMode;
    use crate::context::Context;
    use crate::testing::*;
    use carry_types::constants::{ETHER, FINNEY};

    fn busy_sale() -> TestSale {
        let mut sale = deploy(presale_config());
        let owner = Context::new(ALICE);
        sale.add_many_to_whitelist(&owner, &[BOB, CHARLIE, DAVE], 1)
            .unwrap();
        sale.contribute(&buy(CHARLIE, 2 * ETHER)).unwrap();
        sale.contribute(&buy(BOB, ETHER)).unwrap();
        sale.deposit_refund(&owner.with_value(100 * FINNEY), &BOB, 100 * FINNEY)
            .unwrap();
        sale.pause(&owner).unwrap();
        sale
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let sale = busy_sale();
        let bytes = sale.snapshot().to_bytes().unwrap();
        let snapshot = SaleSnapshot::from_bytes(&bytes).unwrap();
        assert_eq!(snapshot, sale.snapshot());

        let config = sale.config().clone();
        let (token, funds) = sale.clone().into_ledgers();
        let restored = Crowdsale::from_snapshot(config, snapshot, token, funds).unwrap();

        assert_eq!(restored.owner(), ALICE);
        assert!(restored.is_paused());
        assert_eq!(restored.wei_raised(), sale.wei_raised());
        assert_eq!(restored.purchasers(), &[CHARLIE, BOB]);
        assert_eq!(restored.participant(&BOB), sale.participant(&BOB));
        assert_eq!(restored.grade_of(&DAVE), 1);
    }

    #[test]
    fn test_restored_sale_keeps_working() {
        let sale = busy_sale();
        let snapshot = sale.snapshot();
        let config = sale.config().clone();
        let (token, funds) = sale.into_ledgers();
        let mut restored = Crowdsale::from_snapshot(config, snapshot, token, funds).unwrap();

        restored.unpause(&Context::new(ALICE)).unwrap();
        restored.contribute(&buy(DAVE, ETHER)).unwrap();
        assert_eq!(restored.purchasers(), &[CHARLIE, BOB, DAVE]);
        restored.receive_refund(&Context::new(BOB), &BOB).unwrap();
        restored.verify_invariants().unwrap();
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(matches!(
            SaleSnapshot::from_bytes(&[1, 2, 3]),
            Err(SaleError::InvalidSnapshot { .. })
        ));
    }

    #[test]
    fn test_from_bytes_rejects_unknown_version() {
        let mut snapshot = busy_sale().snapshot();
        snapshot.version = 9;
        let bytes = borsh::to_vec(&snapshot).unwrap();
        assert!(matches!(
            SaleSnapshot::from_bytes(&bytes),
            Err(SaleError::InvalidSnapshot { .. })
        ));
    }

    #[test]
    fn test_inconsistent_snapshot_rejected() {
        let sale = busy_sale();
        let mut snapshot = sale.snapshot();
        snapshot.wei_raised += 1;
        let config = sale.config().clone();
        let (token, funds) = sale.into_ledgers();
        let result = Crowdsale::from_snapshot(config, snapshot, token, funds);
        assert!(matches!(result, Err(SaleError::InvalidSnapshot { .. })));
    }

    #[test]
    fn test_snapshot_with_foreign_grade_rejected() {
        let mut sale = deploy(public_sale_config());
        sale.add_to_whitelist(&Context::new(ALICE), &BOB, 3).unwrap();
        let snapshot = sale.snapshot();
        let (token, funds) = sale.into_ledgers();
        let result = Crowdsale::from_snapshot(flat_config(DeliveryMode::Scheduled {
            delivery_due: PUBLIC_DELIVERY_DUE,
        }), snapshot, token, funds);
        assert!(matches!(result, Err(SaleError::InvalidSnapshot { .. })));
    }
}
