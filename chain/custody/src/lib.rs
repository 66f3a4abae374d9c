//! Contract Logic for Owner-Gated Fund Custody
//!
//! This crate implements a custody ledger: named records at deterministically
//! derived addresses, open deposits, owner-only withdrawals, and a running
//! net total that never exceeds the funds the record actually holds.
//!
//! # Modules
//! - `address`: Deterministic record addresses from (namespace, owner)
//! - `record`: Custody record state and its fixed-size persisted layout
//! - `ledger`: Single-asset balances for wallets and record addresses
//! - `config`: Engine configuration and storage reserve schedule
//! - `security`: Owner gate, amount policy, metadata bounds
//! - `events`: Contract events emitted by successful operations
//! - `errors`: Contract-specific error types
//! - `engine`: Initialize, deposit, withdraw, close, fetch
//!
//! # Version
//! v0.1.0

pub mod address;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod record;
pub mod security;

pub use engine::CustodyEngine;
pub use errors::CustodyError;
pub use record::CustodyRecord;

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
