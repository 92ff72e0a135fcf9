//! Ledger collaborators for the Carry token sale.
//!
//! - [`CarryToken`]: the fixed-cap, mintable CRE token.
//! - [`NativeLedger`]: balances of the sale currency (wei). The sale forwards
//!   funds and pays refunds through it.
//!
//! The sale engine only depends on the [`TokenLedger`] and [`ValueLedger`]
//! traits, so either side can be swapped for a different backend.

pub mod error;
pub mod ledger;
pub mod native;
pub mod token;

pub use error::LedgerError;
pub use ledger::{TokenLedger, ValueLedger};
pub use native::NativeLedger;
pub use token::{CarryToken, TokenInfo};
