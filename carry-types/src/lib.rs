pub mod addr;
pub mod constants;
pub mod error;
pub mod primitives;
pub mod units;

pub use error::TypesError;
pub use primitives::{Address, Amount, Grade, Timestamp};
