//! Error types for key handling
//!
//! Error taxonomy using thiserror

use thiserror::Error;

/// Errors raised while parsing or building a 32-byte key
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeyError {
    #[error("Invalid base58 key: {0}")]
    InvalidBase58(String),

    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
