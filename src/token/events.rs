//! Ledger notifications
//!
//! Every successful balance movement yields a [`TransferEvent`] and every
//! allowance write yields an [`ApprovalEvent`].

use crate::token::address::Address;
use crate::token::amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transfer event (emitted when tokens move, including the initial mint)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    #[serde(with = "amount::as_string")]
    pub value: u128,
    pub timestamp: DateTime<Utc>,
}

impl TransferEvent {
    pub fn new(from: Address, to: Address, value: u128) -> Self {
        Self {
            from,
            to,
            value,
            timestamp: Utc::now(),
        }
    }

    /// Whether this is the construction-time mint
    pub fn is_mint(&self) -> bool {
        self.from.is_zero()
    }
}

/// Approval event (emitted when an allowance is set)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApprovalEvent {
    pub owner: Address,
    pub spender: Address,
    #[serde(with = "amount::as_string")]
    pub value: u128,
    pub timestamp: DateTime<Utc>,
}

impl ApprovalEvent {
    pub fn new(owner: Address, spender: Address, value: u128) -> Self {
        Self {
            owner,
            spender,
            value,
            timestamp: Utc::now(),
        }
    }
}

/// Any notification emitted by the ledger
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum LedgerEvent {
    Transfer(TransferEvent),
    Approval(ApprovalEvent),
}

impl From<TransferEvent> for LedgerEvent {
    fn from(event: TransferEvent) -> Self {
        LedgerEvent::Transfer(event)
    }
}

impl From<ApprovalEvent> for LedgerEvent {
    fn from(event: ApprovalEvent) -> Self {
        LedgerEvent::Approval(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event: LedgerEvent = TransferEvent::new(
            Address::from_label("bob"),
            Address::from_label("alice"),
            100_000_000_000_000_000_000,
        )
        .into();

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Transfer\""));
        assert!(json.contains("\"value\":\"100000000000000000000\""));

        let back: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_mint_detection() {
        let mint = TransferEvent::new(Address::ZERO, Address::from_label("deployer"), 1);
        assert!(mint.is_mint());

        let transfer = TransferEvent::new(Address::from_label("a"), Address::from_label("b"), 1);
        assert!(!transfer.is_mint());
    }
}
