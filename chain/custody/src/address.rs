//! Address Deriver — deterministic custody record locations
//!
//! A record lives at an address hashed from `(namespace, owner)` under the
//! program id. Candidate digests are tried with a bump byte counting down from
//! 255; the first digest that does not decode as an Ed25519 point wins, so no
//! keypair can ever sign for a custody address.

use ed25519_dalek::VerifyingKey;
use ledger_types::ids::{Address, Identity};
use sha2::{Digest, Sha256};

use crate::errors::CustodyError;

/// Namespace for donation campaigns (records carrying a description)
pub const CAMPAIGN_SEED: &str = "campaign";

/// Namespace for plain deposit records
pub const DEPOSIT_STATE_SEED: &str = "deposit-state";

/// Longest namespace tag accepted as a seed
pub const MAX_SEED_LEN: usize = 32;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Whether `bytes` decode as a point on the Ed25519 curve.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    VerifyingKey::from_bytes(bytes).is_ok()
}

/// Hash `seeds` and `bump` into a candidate address.
///
/// Returns `None` when the digest lands on the curve and must be skipped.
pub fn create_address(seeds: &[&[u8]], bump: u8, program_id: &Address) -> Option<Address> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);
    let digest: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&digest) {
        None
    } else {
        Some(Address::from_bytes(digest))
    }
}

/// Derive the record address and canonical bump for `(namespace, owner)`.
pub fn derive_address(
    namespace: &str,
    owner: &Identity,
    program_id: &Address,
) -> Result<(Address, u8), CustodyError> {
    validate_namespace(namespace)?;

    let seeds: [&[u8]; 2] = [namespace.as_bytes(), owner.as_bytes()];
    (0..=u8::MAX)
        .rev()
        .find_map(|bump| create_address(&seeds, bump, program_id).map(|addr| (addr, bump)))
        .ok_or_else(|| CustodyError::AddressDerivation {
            namespace: namespace.to_string(),
        })
}

/// Check a namespace tag is usable as a seed.
pub fn validate_namespace(namespace: &str) -> Result<(), CustodyError> {
    if namespace.is_empty() {
        return Err(CustodyError::InvalidInput {
            reason: "namespace must not be empty".to_string(),
        });
    }
    if namespace.len() > MAX_SEED_LEN {
        return Err(CustodyError::InvalidInput {
            reason: format!(
                "namespace is {} bytes, maximum is {}",
                namespace.len(),
                MAX_SEED_LEN
            ),
        });
    }
    Ok(())
}
