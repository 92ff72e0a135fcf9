//! Address formatting and parsing.

use crate::error::TypesError;
use crate::primitives::Address;

/// Convert an address to a hex string with `0x` prefix.
pub fn addr_to_hex(addr: &Address) -> String {
    format!("0x{}", hex::encode(addr))
}

/// Parse a hex string (with or without `0x` prefix) into an address.
pub fn hex_to_addr(s: &str) -> Result<Address, TypesError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.len() != 40 {
        return Err(TypesError::InvalidAddress {
            input: s.to_string(),
            reason: format!("expected 40 hex chars, got {}", digits.len()),
        });
    }
    let bytes = hex::decode(digits).map_err(|e| TypesError::InvalidAddress {
        input: s.to_string(),
        reason: e.to_string(),
    })?;
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&bytes);
    Ok(addr)
}

/// Short form used in log lines: `0x0102…1314`.
pub fn short_addr(addr: &Address) -> String {
    format!(
        "0x{}…{}",
        hex::encode(&addr[..2]),
        hex::encode(&addr[18..])
    )
}
