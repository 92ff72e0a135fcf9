use crate::primitives::{Amount, GasPrice};

// ─── Currency Units ──────────────────────────────────────────────────────────

/// Smallest unit of the sale currency.
pub const WEI: Amount = 1;

/// 10^9 wei.
pub const GWEI: Amount = 1_000_000_000;

/// 10^15 wei.
pub const FINNEY: Amount = 1_000_000_000_000_000;

/// 10^18 wei.
pub const ETHER: Amount = 1_000_000_000_000_000_000;

// ─── Token Parameters ────────────────────────────────────────────────────────

/// Number of decimal places for the CRE token.
pub const CRE_DECIMALS: u32 = 18;

/// One full CRE token in base units (10^18).
pub const ONE_CRE: Amount = 1_000_000_000_000_000_000;

/// Hard cap on the CRE supply: 10 billion CRE.
pub const TOTAL_CAP: Amount = 10_000_000_000 * ONE_CRE;

// ─── Sale Parameters ─────────────────────────────────────────────────────────

/// Contributions paying more than this gas price are rejected.
pub const MAX_GAS_PRICE: GasPrice = 40 * GWEI;
