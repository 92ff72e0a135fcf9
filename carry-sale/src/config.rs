//! Sale configuration.
//!
//! A [`SaleConfig`] fixes every parameter of a sale at construction. It is
//! loaded from TOML (see `config/` for the presale and the public sale) and
//! validated before a [`Crowdsale`](crate::sale::Crowdsale) is built from it.

use std::path::Path;

use carry_types::primitives::{serde_address, serde_amount, ZERO_ADDRESS};
use carry_types::{Address, Amount, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::SaleError;
use crate::schedule::{CapEntry, CapSchedule, PhaseSchedule};

/// How purchased tokens reach contributors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Tokens are minted to the purchaser on purchase.
    #[default]
    Immediate,
    /// Tokens are held by the sale and released by the owner in ratios.
    Gradual,
    /// Tokens are held by the sale until the owner sets the sale
    /// withdrawable or `delivery_due` passes; then purchasers withdraw.
    Scheduled { delivery_due: Timestamp },
}

impl DeliveryMode {
    pub fn name(&self) -> &'static str {
        match self {
            DeliveryMode::Immediate => "immediate",
            DeliveryMode::Gradual => "gradual",
            DeliveryMode::Scheduled { .. } => "scheduled",
        }
    }

    /// Whether purchased tokens are recorded as pending instead of minted.
    pub fn is_deferred(&self) -> bool {
        !matches!(self, DeliveryMode::Immediate)
    }
}

/// Sale parameters. Fixed once the sale is constructed.
///
/// In TOML, amounts are strings with an optional unit and addresses are
/// `0x`-prefixed hex:
///
/// ```toml
/// address = "0x5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a"
/// wallet = "0x8d5f5f9a2621be9d32896cf0172515fb211e26be"
/// rate = 74750
/// cap = "5000410 finney"
/// individual_min_purchase = "99 finney"
///
/// [[individual_caps]]
/// starts_at = 0
/// cap = "50 ether"
///
/// [delivery]
/// mode = "gradual"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleConfig {
    /// The sale's own account. Holds undelivered tokens and refund deposits.
    #[serde(with = "serde_address")]
    pub address: Address,
    /// Receives contributed funds.
    #[serde(with = "serde_address")]
    pub wallet: Address,
    /// Token base units per wei.
    pub rate: u64,
    /// Ceiling on total wei raised.
    #[serde(with = "serde_amount")]
    pub cap: Amount,
    /// Smallest accepted contribution.
    #[serde(with = "serde_amount")]
    pub individual_min_purchase: Amount,
    /// Opening time of each grade; empty for a flat sale.
    #[serde(default)]
    pub whitelist_grades: Vec<Timestamp>,
    pub individual_caps: Vec<CapEntry>,
    #[serde(default)]
    pub delivery: DeliveryMode,
}

impl SaleConfig {
    /// Check every construction rule.
    pub fn validate(&self) -> Result<(), SaleError> {
        self.phase_schedule()?;

        let invalid = |reason: &str| {
            Err(SaleError::InvalidConfig {
                reason: reason.to_string(),
            })
        };
        if self.address == ZERO_ADDRESS {
            return invalid("sale address cannot be zero");
        }
        if self.wallet == ZERO_ADDRESS {
            return invalid("wallet cannot be zero");
        }
        if self.wallet == self.address {
            return invalid("wallet must differ from the sale address");
        }
        if self.rate == 0 {
            return invalid("rate must be positive");
        }
        if self.cap == 0 {
            return invalid("cap must be positive");
        }
        if self.individual_min_purchase > self.cap {
            return invalid("individual minimum purchase exceeds cap");
        }
        if self.cap.checked_mul(self.rate as Amount).is_none() {
            return invalid("cap * rate overflows");
        }
        Ok(())
    }

    /// Build the phase schedule described by this config.
    pub fn phase_schedule(&self) -> Result<PhaseSchedule, SaleError> {
        let caps = CapSchedule::new(self.individual_caps.clone())?;
        PhaseSchedule::new(self.whitelist_grades.clone(), caps)
    }

    /// Tokens the sale must hold to cover a fully subscribed deferred sale.
    pub fn token_supply_needed(&self) -> Amount {
        self.cap.saturating_mul(self.rate as Amount)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, SaleError> {
        let config: SaleConfig = toml::from_str(contents).map_err(|e| SaleError::InvalidConfig {
            reason: format!("failed to parse config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SaleError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| SaleError::InvalidConfig {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            SaleError::InvalidConfig { reason } => SaleError::InvalidConfig {
                reason: format!("{}: {}", path.display(), reason),
            },
            other => other,
        })
    }

    pub fn to_toml_string(&self) -> Result<String, SaleError> {
        toml::to_string_pretty(self).map_err(|e| SaleError::InvalidConfig {
            reason: format!("failed to serialize config: {}", e),
        })
    }

    /// Write this config as TOML to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SaleError> {
        let path = path.as_ref();
        let contents = self.to_toml_string()?;
        std::fs::write(path, contents).map_err(|e| SaleError::InvalidConfig {
            reason: format!("failed to write config file '{}': {}", path.display(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carry_types::constants::{ETHER, FINNEY};

    const SALE: Address = [0x5a; 20];
    const WALLET: Address = [0xfa; 20];

    fn flat() -> SaleConfig {
        SaleConfig {
            address: SALE,
            wallet: WALLET,
            rate: 74_750,
            cap: 5_000_410 * FINNEY,
            individual_min_purchase: 99 * FINNEY,
            whitelist_grades: vec![],
            individual_caps: vec![CapEntry::new(0, 50 * ETHER)],
            delivery: DeliveryMode::Gradual,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(flat().validate().is_ok());
        assert_eq!(flat().token_supply_needed(), 5_000_410 * FINNEY * 74_750);
    }

    #[test]
    fn test_wallet_must_differ_from_sale() {
        let mut config = flat();
        config.wallet = SALE;
        assert!(matches!(
            config.validate(),
            Err(SaleError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_zero_rate_and_cap_rejected() {
        let mut config = flat();
        config.rate = 0;
        assert!(config.validate().is_err());

        let mut config = flat();
        config.cap = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_min_purchase_above_cap_rejected() {
        let mut config = flat();
        config.individual_min_purchase = config.cap + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_schedules_rejected() {
        let mut config = flat();
        config.individual_caps.clear();
        assert!(config.validate().is_err());

        let mut config = flat();
        config.whitelist_grades = vec![5, 10];
        assert!(config.validate().is_err());

        let mut config = flat();
        config.whitelist_grades = vec![0, 200, 100];
        assert!(matches!(
            config.validate(),
            Err(SaleError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
address = "0x5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a"
wallet = "0x8D5F5f9a2621bE9d32896CF0172515Fb211E26bE"
rate = 65000
cap = "5000410 finney"
individual_min_purchase = "99 finney"
whitelist_grades = [0, 1535313600, 1535367600, 1535454000]

[[individual_caps]]
starts_at = 1535281200
cap = "5 ether"

[[individual_caps]]
starts_at = 1535454000
cap = "10 ether"

[[individual_caps]]
starts_at = 1536490800
cap = "0"

[delivery]
mode = "scheduled"
delivery_due = 1546268400
"#;
        let config = SaleConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.rate, 65_000);
        assert_eq!(config.cap, 5_000_410 * FINNEY);
        assert_eq!(config.individual_caps.len(), 3);
        assert_eq!(config.individual_caps[1].cap, 10 * ETHER);
        assert_eq!(
            config.delivery,
            DeliveryMode::Scheduled {
                delivery_due: 1_546_268_400
            }
        );
        assert_eq!(config.phase_schedule().unwrap().grade_count(), 4);
    }

    #[test]
    fn test_delivery_defaults_to_immediate() {
        let toml_str = r#"
address = "0x5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a"
wallet = "0xfafafafafafafafafafafafafafafafafafafafa"
rate = 1
cap = "10 ether"
individual_min_purchase = "1 wei"
individual_caps = [{ starts_at = 0, cap = "1 ether" }]
"#;
        let config = SaleConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.delivery, DeliveryMode::Immediate);
        assert!(config.whitelist_grades.is_empty());
    }

    #[test]
    fn test_invalid_toml_reports_reason() {
        let err = SaleConfig::from_toml_str("rate = \"fast\"").unwrap_err();
        match err {
            SaleError::InvalidConfig { reason } => assert!(reason.contains("failed to parse")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("presale.toml");
        let config = flat();
        config.save(&path).unwrap();

        let loaded = SaleConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = SaleConfig::load("/nonexistent/path/sale.toml");
        assert!(matches!(result, Err(SaleError::InvalidConfig { .. })));
    }
}
