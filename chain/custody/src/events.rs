//! Contract events
//!
//! Events are immutable records emitted by successful custody operations.
//! A rejected operation never emits an event.

use ledger_types::ids::{Address, Identity};
use serde::{Deserialize, Serialize};

/// Custody record created at a derived address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInitialized {
    pub address: Address,
    pub owner: Identity,
    pub name: String,
    pub target_amount: u64,
    /// Reserve moved from the owner into the record for storage
    pub reserve: u64,
}

/// Funds deposited into a record by any party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceived {
    pub address: Address,
    pub depositor: Identity,
    pub amount: u64,
    /// Accumulated total after the deposit
    pub amount_accumulated: u64,
}

/// Funds released from a record to its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalExecuted {
    pub address: Address,
    pub owner: Identity,
    pub amount: u64,
    /// Accumulated total after the withdrawal
    pub amount_accumulated: u64,
}

/// Record drained and deallocated by its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordClosed {
    pub address: Address,
    pub owner: Identity,
    /// Everything the record held, reserve included
    pub refunded: u64,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    RecordInitialized(RecordInitialized),
    DepositReceived(DepositReceived),
    WithdrawalExecuted(WithdrawalExecuted),
    RecordClosed(RecordClosed),
}

impl ContractEvent {
    /// Address of the record the event concerns.
    pub fn address(&self) -> &Address {
        match self {
            ContractEvent::RecordInitialized(e) => &e.address,
            ContractEvent::DepositReceived(e) => &e.address,
            ContractEvent::WithdrawalExecuted(e) => &e.address,
            ContractEvent::RecordClosed(e) => &e.address,
        }
    }
}
