//! Fund Ledger — single-asset balances per address
//!
//! Models the platform's native value transfer: party wallets and custody
//! record addresses each hold an unsigned balance in the smallest unit.
//! Transfers are prepared (fully validated) first and committed second, so a
//! caller can validate a transfer together with a record update and apply
//! both or neither.

use ledger_types::ids::Address;
use std::collections::BTreeMap;

use crate::errors::CustodyError;

/// A validated transfer, ready to be committed.
///
/// Holds the post-transfer balances of both sides, computed with checked
/// arithmetic against the balances observed at preparation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a prepared transfer does nothing until committed"]
pub struct PreparedTransfer {
    pub from: Address,
    pub to: Address,
    pub amount: u64,
    from_after: u64,
    to_after: u64,
}

impl PreparedTransfer {
    /// Destination balance once committed
    pub fn to_after(&self) -> u64 {
        self.to_after
    }
}

/// Balance book for every address in the ledger.
///
/// `BTreeMap` keeps iteration order deterministic.
#[derive(Debug, Clone, Default)]
pub struct FundLedger {
    balances: BTreeMap<Address, u64>,
}

impl FundLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance held at `address` (zero when never funded).
    pub fn balance(&self, address: &Address) -> u64 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// Add externally sourced funds to `address`.
    pub fn credit(&mut self, address: Address, amount: u64) -> Result<u64, CustodyError> {
        let current = self.balance(&address);
        let updated = current.checked_add(amount).ok_or(CustodyError::Overflow)?;
        self.balances.insert(address, updated);
        Ok(updated)
    }

    /// Validate moving `amount` from `from` to `to` without applying it.
    pub fn prepare_transfer(
        &self,
        from: Address,
        to: Address,
        amount: u64,
    ) -> Result<PreparedTransfer, CustodyError> {
        let available = self.balance(&from);
        let from_after =
            available
                .checked_sub(amount)
                .ok_or_else(|| CustodyError::InsufficientFunds {
                    address: from.to_string(),
                    required: amount,
                    available,
                })?;

        if from == to {
            return Ok(PreparedTransfer {
                from,
                to,
                amount,
                from_after: available,
                to_after: available,
            });
        }

        let to_after = self
            .balance(&to)
            .checked_add(amount)
            .ok_or(CustodyError::Overflow)?;

        Ok(PreparedTransfer {
            from,
            to,
            amount,
            from_after,
            to_after,
        })
    }

    /// Apply a previously prepared transfer.
    pub fn commit(&mut self, transfer: PreparedTransfer) {
        self.balances.insert(transfer.from, transfer.from_after);
        self.balances.insert(transfer.to, transfer.to_after);
    }

    /// Sum of all balances, for conservation checks.
    pub fn total(&self) -> u128 {
        self.balances.values().map(|b| *b as u128).sum()
    }
}
