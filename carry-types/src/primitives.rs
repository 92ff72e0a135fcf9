/// 20-byte account address.
pub type Address = [u8; 20];

/// Amount in base units: wei for the sale currency, 10^-18 CRE for the token.
pub type Amount = u128;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Whitelist admission tier. `0` means "not whitelisted".
pub type Grade = u8;

/// Gas price in wei per gas unit.
pub type GasPrice = u128;

/// The zero address `[0u8; 20]`.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Grade reserved for "not whitelisted"; never accepted as an explicit input.
pub const NOT_WHITELISTED: Grade = 0;

/// Serde helper for [`Address`] fields, encoded as `0x`-prefixed hex strings.
pub mod serde_address {
    use serde::{self, Deserialize, Deserializer, Serializer};

    use crate::addr::{addr_to_hex, hex_to_addr};
    use crate::primitives::Address;

    pub fn serialize<S>(value: &Address, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&addr_to_hex(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex_to_addr(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde helper for [`Amount`] fields.
///
/// TOML integers stop at `i64`, so amounts are written as strings with an
/// optional unit suffix (`"99 finney"`, `"50 ether"`). Plain integers are
/// still accepted when they fit.
pub mod serde_amount {
    use serde::{self, Deserialize, Deserializer, Serializer};

    use crate::primitives::Amount;
    use crate::units::parse_amount;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Int(u64),
        Text(String),
    }

    pub fn serialize<S>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawAmount::deserialize(deserializer)? {
            RawAmount::Int(v) => Ok(v as Amount),
            RawAmount::Text(s) => parse_amount(&s).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::constants::{ETHER, FINNEY};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "serde_address")]
        wallet: Address,
        #[serde(with = "serde_amount")]
        cap: Amount,
    }

    #[test]
    fn test_serde_helpers_toml_roundtrip() {
        let sample = Sample {
            wallet: [0xab; 20],
            cap: 5_000_410 * FINNEY,
        };
        let encoded = toml::to_string(&sample).unwrap();
        assert!(encoded.contains("0xabab"));
        let decoded: Sample = toml::from_str(&encoded).unwrap();
        assert_eq!(decoded, sample);
    }

    #[test]
    fn test_serde_amount_accepts_units_and_integers() {
        let with_unit: Sample = toml::from_str(
            "wallet = \"0x0101010101010101010101010101010101010101\"\ncap = \"50 ether\"\n",
        )
        .unwrap();
        assert_eq!(with_unit.cap, 50 * ETHER);

        let plain: Sample = toml::from_str(
            "wallet = \"0x0101010101010101010101010101010101010101\"\ncap = 12345\n",
        )
        .unwrap();
        assert_eq!(plain.cap, 12_345);
        assert_eq!(plain.wallet, [1u8; 20]);
    }

    #[test]
    fn test_serde_address_rejects_short_hex() {
        let result: Result<Sample, _> = toml::from_str("wallet = \"0x0102\"\ncap = 1\n");
        assert!(result.is_err());
    }
}
