//! Single-owner access control.

use carry_types::primitives::ZERO_ADDRESS;
use carry_types::Address;

use crate::context::Context;
use crate::ensure_ne;
use crate::error::{Role, SaleError};
use crate::event::{Response, SaleEvent};

/// Holds the sale owner. The deployer becomes the first owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Ownable { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_owner(&self, addr: &Address) -> bool {
        self.owner == *addr
    }

    /// Assert that the caller is the owner.
    pub fn require_owner(&self, ctx: &Context) -> Result<(), SaleError> {
        if ctx.sender() != self.owner {
            return Err(SaleError::Unauthorized(Role::Owner));
        }
        Ok(())
    }

    /// Hand ownership to `new_owner` (owner-only).
    pub fn transfer_ownership(
        &mut self,
        ctx: &Context,
        new_owner: &Address,
    ) -> Result<Response, SaleError> {
        self.require_owner(ctx)?;
        ensure_ne!(
            *new_owner,
            ZERO_ADDRESS,
            SaleError::InvalidAddress {
                reason: "new owner cannot be zero address".to_string(),
            }
        );
        let previous_owner = self.owner;
        self.owner = *new_owner;
        tracing::info!(
            previous = %carry_types::addr::short_addr(&previous_owner),
            new = %carry_types::addr::short_addr(new_owner),
            "ownership transferred"
        );
        Ok(
            Response::with_action("transfer_ownership").add_event(SaleEvent::OwnershipTransferred {
                previous_owner,
                new_owner: *new_owner,
            }),
        )
    }
}
