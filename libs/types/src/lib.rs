//! Types library for the custody ledger
//!
//! Key types shared between the custody contract crate and its hosts.
//!
//! # Modules
//! - `ids`: Party identities and storage addresses (32-byte keys)
//! - `errors`: Key parsing errors

// Public modules
pub mod ids;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::errors::*;
}
