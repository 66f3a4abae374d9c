//! Custody Record — persisted state and its fixed-size layout
//!
//! Layout (little-endian, 366 bytes):
//!
//! | Offset | Size        | Field                                   |
//! |--------|-------------|-----------------------------------------|
//! | 0      | 8           | discriminator                           |
//! | 8      | 32          | owner                                   |
//! | 40     | 4 + 100     | name (u32 length, zero padded)          |
//! | 144    | 1 + 4 + 200 | description (option tag, length, bytes) |
//! | 349    | 8           | target_amount                           |
//! | 357    | 8           | amount_accumulated                      |
//! | 365    | 1           | bump                                    |

use ledger_types::ids::{Identity, KEY_LEN};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{CustodyError, LayoutError};

/// Capacity of the name field in bytes
pub const MAX_NAME_LEN: usize = 100;

/// Capacity of the description field in bytes
pub const MAX_DESCRIPTION_LEN: usize = 200;

pub const DISCRIMINATOR_LEN: usize = 8;

/// Marker written over the discriminator when a record is closed
pub const CLOSED_DISCRIMINATOR: [u8; DISCRIMINATOR_LEN] = [0xFF; DISCRIMINATOR_LEN];

const LEN_PREFIX: usize = 4;
const OWNER_OFFSET: usize = DISCRIMINATOR_LEN;
const NAME_OFFSET: usize = OWNER_OFFSET + KEY_LEN;
const DESCRIPTION_OFFSET: usize = NAME_OFFSET + LEN_PREFIX + MAX_NAME_LEN;
const TARGET_OFFSET: usize = DESCRIPTION_OFFSET + 1 + LEN_PREFIX + MAX_DESCRIPTION_LEN;
const ACCUMULATED_OFFSET: usize = TARGET_OFFSET + 8;
const BUMP_OFFSET: usize = ACCUMULATED_OFFSET + 8;

/// Total persisted size of a record
pub const RECORD_LEN: usize = BUMP_OFFSET + 1;

/// A named, owned custody record.
///
/// `amount_accumulated` is the net amount currently in custody: deposits add
/// to it, withdrawals subtract from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyRecord {
    pub owner: Identity,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: u64,
    pub amount_accumulated: u64,
    pub bump: u8,
}

impl CustodyRecord {
    /// Create a fresh record with nothing accumulated.
    pub fn new(
        owner: Identity,
        name: impl Into<String>,
        description: Option<String>,
        target_amount: u64,
        bump: u8,
    ) -> Self {
        Self {
            owner,
            name: name.into(),
            description,
            target_amount,
            amount_accumulated: 0,
            bump,
        }
    }

    /// First eight bytes of `SHA-256("account:CustodyRecord")`.
    pub fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
        let digest = Sha256::digest(b"account:CustodyRecord");
        let mut out = [0u8; DISCRIMINATOR_LEN];
        out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
        out
    }

    /// Accumulated total after crediting `amount`.
    pub fn checked_credit(&self, amount: u64) -> Result<u64, CustodyError> {
        self.amount_accumulated
            .checked_add(amount)
            .ok_or(CustodyError::Overflow)
    }

    /// Accumulated total after debiting `amount`.
    pub fn checked_debit(&self, amount: u64) -> Result<u64, CustodyError> {
        self.amount_accumulated
            .checked_sub(amount)
            .ok_or(CustodyError::Underflow)
    }

    /// Serialize into the fixed-size layout.
    pub fn encode(&self) -> Result<[u8; RECORD_LEN], LayoutError> {
        let mut data = [0u8; RECORD_LEN];
        data[..DISCRIMINATOR_LEN].copy_from_slice(&Self::discriminator());
        data[OWNER_OFFSET..NAME_OFFSET].copy_from_slice(self.owner.as_bytes());
        put_str(&mut data[NAME_OFFSET..], &self.name, MAX_NAME_LEN, "name")?;

        if let Some(description) = &self.description {
            data[DESCRIPTION_OFFSET] = 1;
            put_str(
                &mut data[DESCRIPTION_OFFSET + 1..],
                description,
                MAX_DESCRIPTION_LEN,
                "description",
            )?;
        }

        data[TARGET_OFFSET..ACCUMULATED_OFFSET].copy_from_slice(&self.target_amount.to_le_bytes());
        data[ACCUMULATED_OFFSET..BUMP_OFFSET]
            .copy_from_slice(&self.amount_accumulated.to_le_bytes());
        data[BUMP_OFFSET] = self.bump;
        Ok(data)
    }

    /// Deserialize from the fixed-size layout.
    pub fn decode(data: &[u8]) -> Result<Self, LayoutError> {
        if data.len() != RECORD_LEN {
            return Err(LayoutError::InvalidLength {
                expected: RECORD_LEN,
                actual: data.len(),
            });
        }

        let discriminator = &data[..DISCRIMINATOR_LEN];
        if discriminator == CLOSED_DISCRIMINATOR {
            return Err(LayoutError::Closed);
        }
        if discriminator != Self::discriminator() {
            return Err(LayoutError::DiscriminatorMismatch);
        }

        let mut owner = [0u8; KEY_LEN];
        owner.copy_from_slice(&data[OWNER_OFFSET..NAME_OFFSET]);

        let name = get_str(&data[NAME_OFFSET..], MAX_NAME_LEN, "name")?;
        let description = match data[DESCRIPTION_OFFSET] {
            0 => None,
            1 => Some(get_str(
                &data[DESCRIPTION_OFFSET + 1..],
                MAX_DESCRIPTION_LEN,
                "description",
            )?),
            tag => return Err(LayoutError::InvalidOptionTag(tag)),
        };

        Ok(Self {
            owner: Identity::from_bytes(owner),
            name,
            description,
            target_amount: read_u64(data, TARGET_OFFSET),
            amount_accumulated: read_u64(data, ACCUMULATED_OFFSET),
            bump: data[BUMP_OFFSET],
        })
    }

    /// Zeroed data carrying only the closed marker.
    pub fn closed_data() -> [u8; RECORD_LEN] {
        let mut data = [0u8; RECORD_LEN];
        data[..DISCRIMINATOR_LEN].copy_from_slice(&CLOSED_DISCRIMINATOR);
        data
    }
}

fn put_str(
    buf: &mut [u8],
    value: &str,
    capacity: usize,
    field: &'static str,
) -> Result<(), LayoutError> {
    let bytes = value.as_bytes();
    if bytes.len() > capacity {
        return Err(LayoutError::FieldTooLong {
            field,
            len: bytes.len(),
            capacity,
        });
    }
    buf[..LEN_PREFIX].copy_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf[LEN_PREFIX..LEN_PREFIX + bytes.len()].copy_from_slice(bytes);
    Ok(())
}

fn get_str(buf: &[u8], capacity: usize, field: &'static str) -> Result<String, LayoutError> {
    let mut prefix = [0u8; LEN_PREFIX];
    prefix.copy_from_slice(&buf[..LEN_PREFIX]);
    let len = u32::from_le_bytes(prefix) as usize;
    if len > capacity {
        return Err(LayoutError::FieldTooLong {
            field,
            len,
            capacity,
        });
    }
    String::from_utf8(buf[LEN_PREFIX..LEN_PREFIX + len].to_vec())
        .map_err(|_| LayoutError::InvalidUtf8 { field })
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CustodyRecord {
        let mut record = CustodyRecord::new(
            Identity::from_bytes([5u8; 32]),
            "test campaign",
            Some("test description".to_string()),
            5_000_000_000,
            254,
        );
        record.amount_accumulated = 330_000_000;
        record
    }

    #[test]
    fn test_record_len_matches_layout() {
        assert_eq!(RECORD_LEN, 366);
    }

    #[test]
    fn test_new_record_starts_at_zero() {
        let record = CustodyRecord::new(Identity::new_unique(), "n", None, 10, 255);
        assert_eq!(record.amount_accumulated, 0);
    }

    #[test]
    fn test_encode_decode_preserves_fields() {
        let record = sample();
        let data = record.encode().unwrap();
        assert_eq!(CustodyRecord::decode(&data).unwrap(), record);
    }

    #[test]
    fn test_absent_description_encodes_tag_zero() {
        let mut record = sample();
        record.description = None;
        let data = record.encode().unwrap();
        assert_eq!(data[DESCRIPTION_OFFSET], 0);
        assert_eq!(CustodyRecord::decode(&data).unwrap().description, None);
    }

    #[test]
    fn test_amounts_are_little_endian() {
        let data = sample().encode().unwrap();
        assert_eq!(
            &data[ACCUMULATED_OFFSET..BUMP_OFFSET],
            &330_000_000u64.to_le_bytes()
        );
        assert_eq!(data[BUMP_OFFSET], 254);
    }

    #[test]
    fn test_encode_rejects_oversized_name() {
        let mut record = sample();
        record.name = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            record.encode(),
            Err(LayoutError::FieldTooLong {
                field: "name",
                len: MAX_NAME_LEN + 1,
                capacity: MAX_NAME_LEN,
            })
        );
    }

    #[test]
    fn test_decode_wrong_length() {
        let result = CustodyRecord::decode(&[0u8; 10]);
        assert_eq!(
            result,
            Err(LayoutError::InvalidLength {
                expected: RECORD_LEN,
                actual: 10
            })
        );
    }

    #[test]
    fn test_decode_uninitialized_data() {
        let result = CustodyRecord::decode(&[0u8; RECORD_LEN]);
        assert_eq!(result, Err(LayoutError::DiscriminatorMismatch));
    }

    #[test]
    fn test_decode_closed_data() {
        let result = CustodyRecord::decode(&CustodyRecord::closed_data());
        assert_eq!(result, Err(LayoutError::Closed));
    }

    #[test]
    fn test_decode_invalid_option_tag() {
        let mut data = sample().encode().unwrap();
        data[DESCRIPTION_OFFSET] = 7;
        assert_eq!(
            CustodyRecord::decode(&data),
            Err(LayoutError::InvalidOptionTag(7))
        );
    }

    #[test]
    fn test_decode_corrupt_length_prefix() {
        let mut data = sample().encode().unwrap();
        data[NAME_OFFSET..NAME_OFFSET + 4].copy_from_slice(&500u32.to_le_bytes());
        assert!(matches!(
            CustodyRecord::decode(&data),
            Err(LayoutError::FieldTooLong { field: "name", .. })
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut data = sample().encode().unwrap();
        data[NAME_OFFSET + 4] = 0xC3;
        data[NAME_OFFSET + 5] = 0x28;
        assert_eq!(
            CustodyRecord::decode(&data),
            Err(LayoutError::InvalidUtf8 { field: "name" })
        );
    }

    #[test]
    fn test_checked_credit_overflow() {
        let mut record = sample();
        record.amount_accumulated = u64::MAX;
        assert_eq!(record.checked_credit(1), Err(CustodyError::Overflow));
        assert_eq!(record.checked_credit(0), Ok(u64::MAX));
    }

    #[test]
    fn test_checked_debit_underflow() {
        let record = sample();
        assert_eq!(
            record.checked_debit(330_000_001),
            Err(CustodyError::Underflow)
        );
        assert_eq!(record.checked_debit(330_000_000), Ok(0));
    }
}
