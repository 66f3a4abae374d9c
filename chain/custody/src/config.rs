//! Engine configuration and the storage reserve schedule

use ledger_types::ids::Address;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::address::{validate_namespace, CAMPAIGN_SEED};
use crate::errors::{ConfigError, CustodyError};
use crate::record::{MAX_DESCRIPTION_LEN, MAX_NAME_LEN};

/// Minimum balance a record address must keep for its storage.
///
/// `minimum_balance = (account_overhead + data_len) * lamports_per_byte_year * exemption_threshold`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReserveSchedule {
    /// Storage price per byte per year
    pub lamports_per_byte_year: u64,
    /// Years of storage prepaid to be exempt from collection
    pub exemption_threshold: u64,
    /// Bytes charged per account on top of its data
    pub account_overhead: u64,
}

impl Default for ReserveSchedule {
    fn default() -> Self {
        Self {
            lamports_per_byte_year: 3_480,
            exemption_threshold: 2,
            account_overhead: 128,
        }
    }
}

impl ReserveSchedule {
    /// Reserve required for an account holding `data_len` bytes.
    pub fn minimum_balance(&self, data_len: usize) -> Result<u64, CustodyError> {
        self.account_overhead
            .checked_add(data_len as u64)
            .and_then(|bytes| bytes.checked_mul(self.lamports_per_byte_year))
            .and_then(|per_year| per_year.checked_mul(self.exemption_threshold))
            .ok_or(CustodyError::Overflow)
    }
}

/// Custody engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Program id scoping every derived address
    pub program_id: Address,
    /// Namespace tag records are derived under
    pub namespace: String,
    /// Longest accepted name in bytes
    pub max_name_len: usize,
    /// Longest accepted description in bytes
    pub max_description_len: usize,
    /// Reject zero-amount deposits and withdrawals
    pub reject_zero_amounts: bool,
    /// Reject deposits that push the accumulated total past the target
    pub enforce_target_cap: bool,
    /// Storage reserve schedule
    pub reserve: ReserveSchedule,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program_id: default_program_id(),
            namespace: CAMPAIGN_SEED.to_string(),
            max_name_len: MAX_NAME_LEN,
            max_description_len: MAX_DESCRIPTION_LEN,
            reject_zero_amounts: true,
            enforce_target_cap: false,
            reserve: ReserveSchedule::default(),
        }
    }
}

impl EngineConfig {
    /// Default config under a different namespace.
    pub fn for_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check bounds against the fixed record layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_namespace(&self.namespace).map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })?;

        if self.max_name_len == 0 || self.max_name_len > MAX_NAME_LEN {
            return Err(ConfigError::Invalid {
                reason: format!("max_name_len must be within 1..={}", MAX_NAME_LEN),
            });
        }
        if self.max_description_len > MAX_DESCRIPTION_LEN {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "max_description_len must not exceed {}",
                    MAX_DESCRIPTION_LEN
                ),
            });
        }
        Ok(())
    }
}

/// Program id used when none is configured.
pub fn default_program_id() -> Address {
    Address::from_bytes(Sha256::digest(b"custody-ledger-program").into())
}
