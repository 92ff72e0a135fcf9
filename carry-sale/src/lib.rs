//! Crowdsale engine for the Carry token (CRE).
//!
//! Contributors exchange wei for CRE under a whitelist-gated, time-phased
//! sale with per-address and aggregate caps, a gas-price ceiling, an
//! emergency pause, deferred token delivery and a two-step refund protocol.
//!
//! ```ignore
//! use carry_sale::prelude::*;
//!
//! let config = SaleConfig::load("config/presale.toml")?;
//! let mut sale = Crowdsale::new(&Context::new(owner), config, CarryToken::new(), ledger)?;
//! sale.add_to_whitelist(&Context::new(owner), &alice, 1)?;
//! sale.contribute(&Context::now(alice).with_value(parse_amount("1 ether")?))?;
//! ```

pub mod guard;

pub mod accounting;
pub mod config;
pub mod context;
pub mod delivery;
pub mod error;
pub mod event;
pub mod handle;
pub mod math;
pub mod ownable;
pub mod participant;
pub mod pausable;
pub mod refund;
pub mod sale;
pub mod schedule;
pub mod snapshot;
pub mod testing;
pub mod whitelist;

pub use config::{DeliveryMode, SaleConfig};
pub use context::Context;
pub use error::{ErrorCategory, Role, SaleError};
pub use event::{Response, SaleEvent};
pub use handle::SaleHandle;
pub use participant::Participant;
pub use sale::Crowdsale;
pub use schedule::{CapEntry, CapSchedule, Phase, PhaseSchedule};
pub use snapshot::SaleSnapshot;

/// Common imports for working with a sale.
pub mod prelude {
    pub use crate::{
        CapEntry, Context, Crowdsale, DeliveryMode, ErrorCategory, Phase, Response, Role,
        SaleConfig, SaleError, SaleEvent, SaleHandle,
    };
    pub use carry_token::{CarryToken, NativeLedger, TokenLedger, ValueLedger};
    pub use carry_types::constants::{ETHER, FINNEY, GWEI, WEI};
    pub use carry_types::units::{format_ether, parse_amount};
    pub use carry_types::{Address, Amount, Grade, Timestamp};
}
