//! Custody Engine — record initialization, deposits, withdrawals, closing
//!
//! Every operation follows the same shape:
//! 1. Load and decode the record at the given address
//! 2. Run every check (owner gate, amount policy, arithmetic, backing)
//! 3. Prepare the ledger transfer and encode the updated record
//! 4. Commit transfer, record bytes and event together
//!
//! Nothing is written before step 4, so a rejected call leaves no trace.

use ledger_types::ids::{Address, Identity};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::address;
use crate::config::EngineConfig;
use crate::errors::{ConfigError, CustodyError, LayoutError};
use crate::events::{
    ContractEvent, DepositReceived, RecordClosed, RecordInitialized, WithdrawalExecuted,
};
use crate::ledger::FundLedger;
use crate::record::{CustodyRecord, RECORD_LEN};
use crate::security;

/// Custody engine owning the fund ledger and all record storage.
///
/// Records are stored as their encoded bytes keyed by derived address, the
/// way a ledger platform stores account data. A closed record keeps its slot
/// with the closed marker, so its address can never be initialized again.
#[derive(Debug)]
pub struct CustodyEngine {
    config: EngineConfig,
    /// Balances of wallets and record addresses
    ledger: FundLedger,
    /// Record data by address
    accounts: BTreeMap<Address, Vec<u8>>,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
}

impl CustodyEngine {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::build(EngineConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        info!(
            program_id = %config.program_id,
            namespace = %config.namespace,
            reject_zero_amounts = config.reject_zero_amounts,
            enforce_target_cap = config.enforce_target_cap,
            "CustodyEngine initialized"
        );
        Self {
            config,
            ledger: FundLedger::new(),
            accounts: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ───────────────────────── Addresses ─────────────────────────

    /// Derive the address and bump for `(namespace, owner)` under this program.
    pub fn derive_address(
        &self,
        namespace: &str,
        owner: &Identity,
    ) -> Result<(Address, u8), CustodyError> {
        address::derive_address(namespace, owner, &self.config.program_id)
    }

    /// Address of `owner`'s record in the configured namespace.
    pub fn record_address(&self, owner: &Identity) -> Result<Address, CustodyError> {
        self.derive_address(&self.config.namespace, owner)
            .map(|(addr, _)| addr)
    }

    // ───────────────────────── Funds ─────────────────────────

    /// Reserve a record address must hold for its storage.
    pub fn minimum_reserve(&self) -> Result<u64, CustodyError> {
        self.config.reserve.minimum_balance(RECORD_LEN)
    }

    /// Credit `address` with funds sourced outside the engine.
    ///
    /// Crediting a record address raises what it holds but never its
    /// accumulated total.
    pub fn fund(&mut self, address: Address, amount: u64) -> Result<u64, CustodyError> {
        self.ledger.credit(address, amount)
    }

    /// Funds actually held at `address`.
    pub fn held_balance(&self, address: &Address) -> u64 {
        self.ledger.balance(address)
    }

    pub fn ledger(&self) -> &FundLedger {
        &self.ledger
    }

    // ───────────────────────── Initialize ─────────────────────────

    /// Create `owner`'s record in the configured namespace.
    ///
    /// The owner pays the storage reserve, which moves into the record.
    pub fn initialize(
        &mut self,
        name: &str,
        description: Option<&str>,
        target_amount: u64,
        owner: &Identity,
    ) -> Result<Address, CustodyError> {
        security::validate_metadata(&self.config, name, description)?;

        let (record_address, bump) = self.derive_address(&self.config.namespace, owner)?;
        if self.accounts.contains_key(&record_address) {
            return Err(CustodyError::AlreadyInitialized {
                address: record_address.to_string(),
            });
        }

        self.require_wallet_payer(owner)?;

        let reserve = self.minimum_reserve()?;
        let record = CustodyRecord::new(
            *owner,
            name,
            description.map(str::to_string),
            target_amount,
            bump,
        );
        let data = record.encode()?;
        let transfer = self
            .ledger
            .prepare_transfer(owner.wallet(), record_address, reserve)?;

        self.ledger.commit(transfer);
        self.accounts.insert(record_address, data.to_vec());
        self.events
            .push(ContractEvent::RecordInitialized(RecordInitialized {
                address: record_address,
                owner: *owner,
                name: record.name.clone(),
                target_amount,
                reserve,
            }));

        info!(
            address = %record_address,
            owner = %owner,
            target_amount,
            reserve,
            "Custody record initialized"
        );
        Ok(record_address)
    }

    // ───────────────────────── Deposit ─────────────────────────

    /// Move `amount` from `depositor` into the record. Open to any party.
    pub fn deposit(
        &mut self,
        record_address: &Address,
        amount: u64,
        depositor: &Identity,
    ) -> Result<(), CustodyError> {
        let mut record = self.load(record_address)?;
        security::require_amount(amount, self.config.reject_zero_amounts)?;
        self.require_wallet_payer(depositor)?;

        let new_total = record.checked_credit(amount)?;
        if self.config.enforce_target_cap && new_total > record.target_amount {
            return Err(CustodyError::TargetExceeded {
                target: record.target_amount,
                attempted: new_total,
            });
        }

        let transfer = self
            .ledger
            .prepare_transfer(depositor.wallet(), *record_address, amount)?;
        self.ensure_backed(transfer.to_after(), new_total)?;

        record.amount_accumulated = new_total;
        let data = record.encode()?;

        self.ledger.commit(transfer);
        self.accounts.insert(*record_address, data.to_vec());
        self.events.push(ContractEvent::DepositReceived(DepositReceived {
            address: *record_address,
            depositor: *depositor,
            amount,
            amount_accumulated: new_total,
        }));

        debug!(
            address = %record_address,
            depositor = %depositor,
            amount,
            amount_accumulated = new_total,
            "Deposit received"
        );
        Ok(())
    }

    // ───────────────────────── Withdraw ─────────────────────────

    /// Release `amount` from the record to its owner. Owner-only.
    ///
    /// The owner check runs before any amount or balance check, so other
    /// callers only ever see `Unauthorized`.
    pub fn withdraw(
        &mut self,
        record_address: &Address,
        amount: u64,
        caller: &Identity,
    ) -> Result<(), CustodyError> {
        let mut record = self.load(record_address)?;
        if let Err(err) = security::require_owner(&record, caller) {
            warn!(address = %record_address, caller = %caller, "Withdrawal by non-owner rejected");
            return Err(err);
        }
        security::require_amount(amount, self.config.reject_zero_amounts)?;

        if amount > record.amount_accumulated {
            return Err(CustodyError::InsufficientBalance {
                requested: amount,
                accumulated: record.amount_accumulated,
            });
        }
        let new_total = record.checked_debit(amount)?;

        let held = self.ledger.balance(record_address);
        let held_after = held
            .checked_sub(amount)
            .ok_or(CustodyError::ReserveViolation {
                held,
                required: amount,
            })?;
        self.ensure_backed(held_after, new_total)?;

        let transfer = self
            .ledger
            .prepare_transfer(*record_address, caller.wallet(), amount)?;

        record.amount_accumulated = new_total;
        let data = record.encode()?;

        self.ledger.commit(transfer);
        self.accounts.insert(*record_address, data.to_vec());
        self.events
            .push(ContractEvent::WithdrawalExecuted(WithdrawalExecuted {
                address: *record_address,
                owner: *caller,
                amount,
                amount_accumulated: new_total,
            }));

        debug!(
            address = %record_address,
            amount,
            amount_accumulated = new_total,
            "Withdrawal executed"
        );
        Ok(())
    }

    // ───────────────────────── Close ─────────────────────────

    /// Drain everything the record holds to its owner and deallocate it.
    ///
    /// Returns the amount refunded. The address stays consumed.
    pub fn close(&mut self, record_address: &Address, caller: &Identity) -> Result<u64, CustodyError> {
        let record = self.load(record_address)?;
        if let Err(err) = security::require_owner(&record, caller) {
            warn!(address = %record_address, caller = %caller, "Close by non-owner rejected");
            return Err(err);
        }

        let held = self.ledger.balance(record_address);
        let transfer = self
            .ledger
            .prepare_transfer(*record_address, caller.wallet(), held)?;

        self.ledger.commit(transfer);
        self.accounts
            .insert(*record_address, CustodyRecord::closed_data().to_vec());
        self.events.push(ContractEvent::RecordClosed(RecordClosed {
            address: *record_address,
            owner: *caller,
            refunded: held,
        }));

        info!(address = %record_address, refunded = held, "Custody record closed");
        Ok(held)
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Read the record at `record_address`.
    pub fn fetch(&self, record_address: &Address) -> Result<CustodyRecord, CustodyError> {
        self.load(record_address)
    }

    /// Whether an address has ever held a record (closed ones included).
    pub fn is_allocated(&self, record_address: &Address) -> bool {
        self.accounts.contains_key(record_address)
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Internal ─────────────────────────

    /// Reject a payer whose wallet is a record address.
    ///
    /// A record's held funds back its own total and leave only through
    /// `withdraw` or `close`.
    fn require_wallet_payer(&self, payer: &Identity) -> Result<(), CustodyError> {
        if self.accounts.contains_key(&payer.wallet()) {
            warn!(payer = %payer, "Payment from a custody record address rejected");
            return Err(CustodyError::Unauthorized);
        }
        Ok(())
    }

    fn load(&self, record_address: &Address) -> Result<CustodyRecord, CustodyError> {
        let not_found = || CustodyError::NotFound {
            address: record_address.to_string(),
        };
        let data = self.accounts.get(record_address).ok_or_else(not_found)?;
        match CustodyRecord::decode(data) {
            Ok(record) => Ok(record),
            Err(LayoutError::Closed) => Err(not_found()),
            Err(err) => Err(err.into()),
        }
    }

    /// Held funds must cover the reserve plus the accumulated total.
    fn ensure_backed(&self, held: u64, accumulated: u64) -> Result<(), CustodyError> {
        let required = self
            .minimum_reserve()?
            .checked_add(accumulated)
            .ok_or(CustodyError::Overflow)?;
        if held < required {
            return Err(CustodyError::ReserveViolation { held, required });
        }
        Ok(())
    }
}

impl Default for CustodyEngine {
    fn default() -> Self {
        Self::new()
    }
}
