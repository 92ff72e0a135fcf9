//! Call context for sale operations.

use std::time::{SystemTime, UNIX_EPOCH};

use carry_types::primitives::GasPrice;
use carry_types::{Address, Amount, Timestamp};

/// Who is calling, what they attached, and when.
///
/// Sale operations never read the clock themselves; the caller supplies the
/// timestamp, either explicitly with [`Context::at`] or from the system clock
/// with [`Context::now`].
///
/// ```ignore
/// let ctx = Context::new(ALICE).with_value(5 * ETHER).with_gas_price(20 * GWEI).at(1_535_284_800);
/// sale.contribute(&ctx)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    sender: Address,
    value: Amount,
    gas_price: GasPrice,
    timestamp: Timestamp,
}

impl Context {
    /// A context for `sender` with no value, zero gas price, at time 0.
    pub fn new(sender: Address) -> Self {
        Context {
            sender,
            value: 0,
            gas_price: 0,
            timestamp: 0,
        }
    }

    /// A context for `sender` stamped with the current system time.
    pub fn now(sender: Address) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::new(sender).at(timestamp)
    }

    /// Attach `value` wei to the call.
    pub fn with_value(mut self, value: Amount) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas_price(mut self, gas_price: GasPrice) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Set the call timestamp.
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Address of the caller.
    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Wei attached to the call.
    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn gas_price(&self) -> GasPrice {
        self.gas_price
    }

    /// Unix seconds.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}
