//! Shared security checks for custody operations
//!
//! Owner gating, amount policy, and metadata bounds. Every check is a pure
//! function of its arguments; the engine runs them before touching state.

use ledger_types::ids::Identity;

use crate::config::EngineConfig;
use crate::errors::CustodyError;
use crate::record::CustodyRecord;

/// Reject callers other than the record's owner.
pub fn require_owner(record: &CustodyRecord, caller: &Identity) -> Result<(), CustodyError> {
    if record.owner != *caller {
        return Err(CustodyError::Unauthorized);
    }
    Ok(())
}

/// Reject zero amounts when the policy forbids them.
pub fn require_amount(amount: u64, reject_zero: bool) -> Result<(), CustodyError> {
    if reject_zero && amount == 0 {
        return Err(CustodyError::InvalidAmount);
    }
    Ok(())
}

/// Validate a record's name and optional description against the configured bounds.
pub fn validate_metadata(
    config: &EngineConfig,
    name: &str,
    description: Option<&str>,
) -> Result<(), CustodyError> {
    if name.trim().is_empty() {
        return Err(CustodyError::InvalidInput {
            reason: "name must not be blank".to_string(),
        });
    }
    if name.len() > config.max_name_len {
        return Err(CustodyError::InvalidInput {
            reason: format!(
                "name is {} bytes, maximum is {}",
                name.len(),
                config.max_name_len
            ),
        });
    }
    if let Some(description) = description {
        if description.len() > config.max_description_len {
            return Err(CustodyError::InvalidInput {
                reason: format!(
                    "description is {} bytes, maximum is {}",
                    description.len(),
                    config.max_description_len
                ),
            });
        }
    }
    Ok(())
}
