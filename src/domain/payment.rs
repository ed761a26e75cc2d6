use super::account::{AccountId, Amount};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// One immutable side of a committed transfer.
///
/// The counterparty is the destination on an outgoing entry and the source on an
/// incoming one.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PaymentEntry {
    pub account: AccountId,
    pub direction: Direction,
    pub counterparty: AccountId,
    pub amount: Amount,
}

impl PaymentEntry {
    pub fn outgoing(from: &AccountId, to: &AccountId, amount: Amount) -> Self {
        Self {
            account: from.clone(),
            direction: Direction::Outgoing,
            counterparty: to.clone(),
            amount,
        }
    }

    pub fn incoming(to: &AccountId, from: &AccountId, amount: Amount) -> Self {
        Self {
            account: to.clone(),
            direction: Direction::Incoming,
            counterparty: from.clone(),
            amount,
        }
    }

    /// Builds the mirrored debit/credit pair for a transfer, outgoing first.
    pub fn pair(from: &AccountId, to: &AccountId, amount: Amount) -> [Self; 2] {
        [
            Self::outgoing(from, to, amount),
            Self::incoming(to, from, amount),
        ]
    }
}

/// A requested move of money, as decoded by a transport.
///
/// The amount is kept raw so the engine can report `InvalidAmount` in its own
/// validation order.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct TransferRequest {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: rust_decimal::Decimal,
}
