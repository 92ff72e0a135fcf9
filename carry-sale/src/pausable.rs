//! Emergency pause/unpause.
//!
//! Only the owner can flip the switch. While paused, contributions are
//! rejected; every other operation keeps working.

use crate::context::Context;
use crate::ensure;
use crate::error::SaleError;
use crate::event::{Response, SaleEvent};
use crate::ownable::Ownable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pausable {
    paused: bool,
}

impl Pausable {
    /// Starts unpaused.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn restore(paused: bool) -> Self {
        Pausable { paused }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn require_not_paused(&self) -> Result<(), SaleError> {
        ensure!(!self.paused, SaleError::Paused);
        Ok(())
    }

    /// Pause the sale (owner-only).
    pub fn pause(&mut self, ctx: &Context, ownable: &Ownable) -> Result<Response, SaleError> {
        ownable.require_owner(ctx)?;
        ensure!(!self.paused, SaleError::AlreadyPaused);
        self.paused = true;
        tracing::info!("sale paused");
        Ok(Response::with_action("pause").add_event(SaleEvent::Paused))
    }

    /// Unpause the sale (owner-only).
    pub fn unpause(&mut self, ctx: &Context, ownable: &Ownable) -> Result<Response, SaleError> {
        ownable.require_owner(ctx)?;
        ensure!(self.paused, SaleError::NotPaused);
        self.paused = false;
        tracing::info!("sale unpaused");
        Ok(Response::with_action("unpause").add_event(SaleEvent::Unpaused))
    }
}
