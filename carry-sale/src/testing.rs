//! Test harness for sales.
//!
//! Provides actor constants, ready-made configs modelled on the presale and
//! the public sale, and [`deploy`] to stand up a funded in-memory sale.
//!
//! ```ignore
//! use carry_sale::testing::*;
//!
//! #[test]
//! fn test_something() {
//!     let mut sale = deploy(presale_config());
//!     sale.add_to_whitelist(&Context::new(ALICE), &BOB, 1).unwrap();
//!     let resp = sale.contribute(&buy(BOB, ETHER)).unwrap();
//!     assert_event(&resp, "TokenPurchase");
//! }
//! ```

use carry_token::{CarryToken, NativeLedger, TokenLedger};
use carry_types::constants::{ETHER, FINNEY, GWEI};
use carry_types::{Address, Amount, Timestamp};

use crate::config::{DeliveryMode, SaleConfig};
use crate::context::Context;
use crate::error::{ErrorCategory, SaleError};
use crate::event::Response;
use crate::sale::Crowdsale;
use crate::schedule::CapEntry;

// ═══════════════════════════════════════════════════════════════════════════
// Actors
// ═══════════════════════════════════════════════════════════════════════════

/// Deploys every test sale and so owns it.
pub const ALICE: Address = [1u8; 20];
pub const BOB: Address = [2u8; 20];
pub const CHARLIE: Address = [3u8; 20];
pub const DAVE: Address = [4u8; 20];
/// The sale's own account.
pub const SALE: Address = [0x5a; 20];
/// Receives contributed funds.
pub const WALLET: Address = [0xfa; 20];

/// Wei credited to each of ALICE, BOB, CHARLIE and DAVE by [`deploy`].
pub const INITIAL_FUNDS: Amount = 1_000 * ETHER;

/// Gas price used by [`buy`].
pub const DEFAULT_GAS_PRICE: Amount = 20 * GWEI;

// ═══════════════════════════════════════════════════════════════════════════
// Sale parameters
// ═══════════════════════════════════════════════════════════════════════════

/// 1 ETH = 74,750 CRE.
pub const PRESALE_RATE: u64 = 74_750;
/// 1 ETH = 65,000 CRE.
pub const PUBLIC_RATE: u64 = 65_000;
/// 5000.41 ETH.
pub const SALE_CAP: Amount = 5_000_410 * FINNEY;
/// 99 finney rather than 100, so contributions a whisker short still count.
pub const MIN_PURCHASE: Amount = 99 * FINNEY;

/// 2018-08-26T20:00:00+09:00, opening of the public sale's first phase.
pub const PUBLIC_START: Timestamp = 1_535_281_200;
/// 2018-08-28T20:00:00+09:00, individual cap rises to 10 ether.
pub const PUBLIC_PHASE_2: Timestamp = 1_535_454_000;
/// 2018-09-09T20:00:00+09:00, the sale closes.
pub const PUBLIC_END: Timestamp = 1_536_490_800;
/// Grade opening times of the public sale, index = grade.
pub const PUBLIC_GRADES: [Timestamp; 4] = [0, 1_535_313_600, 1_535_367_600, 1_535_454_000];
/// 2019-01-01T00:00:00+09:00, tokens become withdrawable.
pub const PUBLIC_DELIVERY_DUE: Timestamp = 1_546_268_400;

pub type TestSale = Crowdsale<CarryToken, NativeLedger>;

/// Flat presale parameters (one grade, 50 ether individual cap from time 0)
/// with the given delivery mode.
pub fn flat_config(delivery: DeliveryMode) -> SaleConfig {
    SaleConfig {
        address: SALE,
        wallet: WALLET,
        rate: PRESALE_RATE,
        cap: SALE_CAP,
        individual_min_purchase: MIN_PURCHASE,
        whitelist_grades: Vec::new(),
        individual_caps: vec![CapEntry::new(0, 50 * ETHER)],
        delivery,
    }
}

/// The presale: flat whitelist, gradual delivery.
pub fn presale_config() -> SaleConfig {
    flat_config(DeliveryMode::Gradual)
}

/// The public sale: three grades, two phases, scheduled delivery.
pub fn public_sale_config() -> SaleConfig {
    SaleConfig {
        address: SALE,
        wallet: WALLET,
        rate: PUBLIC_RATE,
        cap: SALE_CAP,
        individual_min_purchase: MIN_PURCHASE,
        whitelist_grades: PUBLIC_GRADES.to_vec(),
        individual_caps: vec![
            CapEntry::new(PUBLIC_START, 5 * ETHER),
            CapEntry::new(PUBLIC_PHASE_2, 10 * ETHER),
            CapEntry::new(PUBLIC_END, 0),
        ],
        delivery: DeliveryMode::Scheduled {
            delivery_due: PUBLIC_DELIVERY_DUE,
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Deployment
// ═══════════════════════════════════════════════════════════════════════════

fn funded_ledger() -> NativeLedger {
    let mut funds = NativeLedger::new();
    for actor in [ALICE, BOB, CHARLIE, DAVE] {
        funds
            .credit(&actor, INITIAL_FUNDS)
            .expect("crediting test funds");
    }
    funds
}

/// Deploy `config` as ALICE with funded actors. Deferred sales get the full
/// `cap * rate` token supply minted to the sale account.
pub fn deploy(config: SaleConfig) -> TestSale {
    deploy_with_token(config, CarryToken::new())
}

/// Like [`deploy`] with a caller-supplied token ledger.
pub fn deploy_with_token(config: SaleConfig, mut token: CarryToken) -> TestSale {
    if config.delivery.is_deferred() {
        token
            .mint(&config.address, config.token_supply_needed())
            .expect("funding the sale");
    }
    Crowdsale::new(&Context::new(ALICE), config, token, funded_ledger()).expect("deploying the sale")
}

/// Like [`deploy`] but without minting tokens to the sale account.
pub fn deploy_unfunded(config: SaleConfig) -> TestSale {
    Crowdsale::new(&Context::new(ALICE), config, CarryToken::new(), funded_ledger())
        .expect("deploying the sale")
}

// ═══════════════════════════════════════════════════════════════════════════
// Contexts
// ═══════════════════════════════════════════════════════════════════════════

/// A contribution of `value` wei from `sender` at time 0 and a normal gas price.
pub fn buy(sender: Address, value: Amount) -> Context {
    Context::new(sender)
        .with_value(value)
        .with_gas_price(DEFAULT_GAS_PRICE)
}

/// A contribution of `value` wei from `sender` at `timestamp`.
pub fn buy_at(sender: Address, value: Amount, timestamp: Timestamp) -> Context {
    buy(sender, value).at(timestamp)
}

// ═══════════════════════════════════════════════════════════════════════════
// Assertion helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Assert that the response contains an event with the given name.
pub fn assert_event(response: &Response, name: &str) {
    if response.events().iter().any(|e| e.name() == name) {
        return;
    }
    panic!(
        "expected event '{}', found: [{}]",
        name,
        response
            .events()
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
}

/// Assert that the response contains an event with the given attribute value.
pub fn assert_event_attribute(response: &Response, name: &str, key: &str, value: &str) {
    let found = response
        .events()
        .iter()
        .filter(|e| e.name() == name)
        .any(|e| e.attribute(key).as_deref() == Some(value));
    assert!(
        found,
        "expected event '{}' with attribute {}={}, found events: [{}]",
        name,
        key,
        value,
        response
            .events()
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
}

/// Assert that a result failed with an error of the given category.
pub fn assert_err_category<R: std::fmt::Debug>(result: &Result<R, SaleError>, category: ErrorCategory) {
    match result {
        Err(e) => assert_eq!(e.category(), category, "unexpected category for {e}"),
        Ok(v) => panic!("expected {category:?} error, got Ok({v:?})"),
    }
}
