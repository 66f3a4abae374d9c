//! Contract-specific error types
//!
//! Error taxonomy for record initialization, deposits, withdrawals,
//! closing, decoding of persisted records, and engine configuration.

use thiserror::Error;

/// Errors surfaced by custody operations.
///
/// Every variant is returned before any state is touched; a failed call
/// leaves ledger balances, records and the event log unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CustodyError {
    #[error("Record already initialized at {address}")]
    AlreadyInitialized { address: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Insufficient funds in {address}: required {required}, available {available}")]
    InsufficientFunds {
        address: String,
        required: u64,
        available: u64,
    },

    #[error("Insufficient record balance: requested {requested}, accumulated {accumulated}")]
    InsufficientBalance { requested: u64, accumulated: u64 },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,

    #[error("Arithmetic underflow in balance calculation")]
    Underflow,

    #[error("Unauthorized: caller is not the record owner")]
    Unauthorized,

    #[error("Record not found: {address}")]
    NotFound { address: String },

    #[error("Deposit would exceed target: target {target}, attempted {attempted}")]
    TargetExceeded { target: u64, attempted: u64 },

    #[error("Custody reserve violated: holding {held}, required {required}")]
    ReserveViolation { held: u64, required: u64 },

    #[error("No valid bump seed for namespace {namespace}")]
    AddressDerivation { namespace: String },

    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Errors decoding the fixed-size persisted record layout
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Invalid data length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Discriminator mismatch")]
    DiscriminatorMismatch,

    #[error("Record data belongs to a closed record")]
    Closed,

    #[error("Field {field} length {len} exceeds capacity {capacity}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        capacity: usize,
    },

    #[error("Field {field} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },

    #[error("Invalid option tag {0}")]
    InvalidOptionTag(u8),
}

/// Errors loading or validating engine configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {reason}")]
    Invalid { reason: String },
}
