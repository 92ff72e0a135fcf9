//! Sale events and the response type returned by every mutating operation.

use borsh::{BorshDeserialize, BorshSerialize};
use carry_types::addr::addr_to_hex;
use carry_types::{Address, Amount, Grade};

/// Event emitted by a successful sale operation.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum SaleEvent {
    TokenPurchase {
        purchaser: Address,
        value: Amount,
        token_amount: Amount,
    },
    TokenDelivered {
        beneficiary: Address,
        token_amount: Amount,
    },
    RefundDeposited {
        beneficiary: Address,
        token_amount: Amount,
        wei_amount: Amount,
    },
    Refunded {
        beneficiary: Address,
        receiver: Address,
        wei_amount: Amount,
    },
    WhitelistedAddressAdded {
        address: Address,
        grade: Grade,
    },
    WhitelistedAddressRemoved {
        address: Address,
    },
    Paused,
    Unpaused,
    WithdrawableChanged {
        withdrawable: bool,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
}

impl SaleEvent {
    /// Event type name.
    pub fn name(&self) -> &'static str {
        match self {
            SaleEvent::TokenPurchase { .. } => "TokenPurchase",
            SaleEvent::TokenDelivered { .. } => "TokenDelivered",
            SaleEvent::RefundDeposited { .. } => "RefundDeposited",
            SaleEvent::Refunded { .. } => "Refunded",
            SaleEvent::WhitelistedAddressAdded { .. } => "WhitelistedAddressAdded",
            SaleEvent::WhitelistedAddressRemoved { .. } => "WhitelistedAddressRemoved",
            SaleEvent::Paused => "Paused",
            SaleEvent::Unpaused => "Unpaused",
            SaleEvent::WithdrawableChanged { .. } => "WithdrawableChanged",
            SaleEvent::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }

    /// Key-value attributes, with addresses rendered as hex and amounts in decimal.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            SaleEvent::TokenPurchase {
                purchaser,
                value,
                token_amount,
            } => vec![
                ("purchaser", addr_to_hex(purchaser)),
                ("value", value.to_string()),
                ("token_amount", token_amount.to_string()),
            ],
            SaleEvent::TokenDelivered {
                beneficiary,
                token_amount,
            } => vec![
                ("beneficiary", addr_to_hex(beneficiary)),
                ("token_amount", token_amount.to_string()),
            ],
            SaleEvent::RefundDeposited {
                beneficiary,
                token_amount,
                wei_amount,
            } => vec![
                ("beneficiary", addr_to_hex(beneficiary)),
                ("token_amount", token_amount.to_string()),
                ("wei_amount", wei_amount.to_string()),
            ],
            SaleEvent::Refunded {
                beneficiary,
                receiver,
                wei_amount,
            } => vec![
                ("beneficiary", addr_to_hex(beneficiary)),
                ("receiver", addr_to_hex(receiver)),
                ("wei_amount", wei_amount.to_string()),
            ],
            SaleEvent::WhitelistedAddressAdded { address, grade } => vec![
                ("address", addr_to_hex(address)),
                ("grade", grade.to_string()),
            ],
            SaleEvent::WhitelistedAddressRemoved { address } => {
                vec![("address", addr_to_hex(address))]
            }
            SaleEvent::Paused | SaleEvent::Unpaused => Vec::new(),
            SaleEvent::WithdrawableChanged { withdrawable } => {
                vec![("withdrawable", withdrawable.to_string())]
            }
            SaleEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            } => vec![
                ("previous_owner", addr_to_hex(previous_owner)),
                ("new_owner", addr_to_hex(new_owner)),
            ],
        }
    }

    /// Look up a single attribute by key.
    pub fn attribute(&self, key: &str) -> Option<String> {
        self.attributes()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }
}

/// Result of a successful mutating operation: the action name plus the
/// events it emitted, in order.
///
/// ```ignore
/// Ok(Response::with_action("contribute").add_event(SaleEvent::TokenPurchase { .. }))
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    action: String,
    events: Vec<SaleEvent>,
}

impl Response {
    /// Create an empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a response with the action name pre-set.
    pub fn with_action(action: impl Into<String>) -> Self {
        Response {
            action: action.into(),
            events: Vec::new(),
        }
    }

    pub fn add_event(mut self, event: SaleEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Append the other response's events. Keeps this response's action
    /// unless it is empty.
    pub fn merge(mut self, other: Response) -> Self {
        if self.action.is_empty() {
            self.action = other.action;
        }
        self.events.extend(other.events);
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn events(&self) -> &[SaleEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SaleEvent> {
        self.events
    }
}
