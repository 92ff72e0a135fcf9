//! Whitelist registry: which addresses may contribute, and in which grade.

use carry_token::{TokenLedger, ValueLedger};
use carry_types::addr::short_addr;
use carry_types::primitives::{NOT_WHITELISTED, ZERO_ADDRESS};
use carry_types::{Address, Grade};

use crate::context::Context;
use crate::error::SaleError;
use crate::event::{Response, SaleEvent};
use crate::sale::Crowdsale;
use crate::{ensure, ensure_ne};

impl<T: TokenLedger, V: ValueLedger> Crowdsale<T, V> {
    fn check_grade(&self, grade: Grade) -> Result<(), SaleError> {
        ensure!(
            self.schedule.is_valid_grade(grade),
            SaleError::InvalidGrade {
                grade,
                grade_count: self.schedule.grade_count(),
            }
        );
        Ok(())
    }

    fn check_whitelist_address(addr: &Address) -> Result<(), SaleError> {
        ensure_ne!(
            *addr,
            ZERO_ADDRESS,
            SaleError::InvalidAddress {
                reason: "cannot whitelist the zero address".to_string(),
            }
        );
        Ok(())
    }

    /// Set the grade of `addr` (owner-only). Overwrites any previous grade.
    pub fn add_to_whitelist(
        &mut self,
        ctx: &Context,
        addr: &Address,
        grade: Grade,
    ) -> Result<Response, SaleError> {
        self.add_many_to_whitelist(ctx, std::slice::from_ref(addr), grade)
            .map(|resp| Response::with_action("add_to_whitelist").merge(resp))
    }

    /// Set the grade of every address in `addrs` (owner-only).
    ///
    /// All addresses are checked before any is changed.
    pub fn add_many_to_whitelist(
        &mut self,
        ctx: &Context,
        addrs: &[Address],
        grade: Grade,
    ) -> Result<Response, SaleError> {
        self.ownable.require_owner(ctx)?;
        self.check_grade(grade)?;
        for addr in addrs {
            Self::check_whitelist_address(addr)?;
        }

        let mut resp = Response::with_action("add_many_to_whitelist");
        for addr in addrs {
            self.participants.entry(addr).grade = grade;
            resp = resp.add_event(SaleEvent::WhitelistedAddressAdded {
                address: *addr,
                grade,
            });
        }
        tracing::info!(count = addrs.len(), grade, "whitelisted addresses");
        Ok(resp)
    }

    /// Reset the grade of `addr` to "not whitelisted" (owner-only).
    pub fn remove_from_whitelist(&mut self, ctx: &Context, addr: &Address) -> Result<Response, SaleError> {
        self.remove_many_from_whitelist(ctx, std::slice::from_ref(addr))
            .map(|resp| Response::with_action("remove_from_whitelist").merge(resp))
    }

    /// Reset the grade of every address in `addrs` (owner-only).
    pub fn remove_many_from_whitelist(
        &mut self,
        ctx: &Context,
        addrs: &[Address],
    ) -> Result<Response, SaleError> {
        self.ownable.require_owner(ctx)?;

        let mut resp = Response::with_action("remove_many_from_whitelist");
        for addr in addrs {
            if self.participants.contains(addr) {
                self.participants.entry(addr).grade = NOT_WHITELISTED;
            }
            tracing::debug!(address = %short_addr(addr), "removed from whitelist");
            resp = resp.add_event(SaleEvent::WhitelistedAddressRemoved { address: *addr });
        }
        Ok(resp)
    }

    /// The grade of `addr`; `0` if not whitelisted.
    pub fn grade_of(&self, addr: &Address) -> Grade {
        self.participants.get(addr).grade
    }

    pub fn is_whitelisted(&self, addr: &Address) -> bool {
        self.grade_of(addr) != NOT_WHITELISTED
    }
}
