//! Record registry: create/read/list plus the command execution pipeline.
//!
//! The registry orchestrates the full lifecycle of one operation:
//!
//! ```text
//! Command
//!   ↓
//! 1. Load the record snapshot (+ its store version)
//!   ↓
//! 2. Handle the command (pure decision logic, produces events)
//!   ↓
//! 3. Apply the events to the in-memory record
//!   ↓
//! 4. Persist the new snapshot (atomic conditional write)
//! ```
//!
//! A rejected command returns at step 2 - nothing is written, so the stored
//! record stays byte-identical to its pre-call state. No events means no
//! write either.

use chrono::{DateTime, Utc};
use thiserror::Error;

use ebol_core::{Aggregate, BlNumber, Command as _, DomainError, Event as _, ExpectedVersion};
use ebol_lading::{BillCommand, BillOfLading, BillParticulars, IssueBill};

use crate::kv_store::{KeyValueStore, StoreError};
use crate::payload;

/// Registry operation error.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Deterministic business rejection; nothing was written.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backing store failed.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    /// A stored record could not be (de)serialized.
    #[error("record codec failure: {0}")]
    Codec(String),
}

/// Registry over an injected key-value store.
///
/// Owns key uniqueness on creation and the decoding of positional creation
/// payloads; every mutation goes through [`BillRegistry::execute`].
#[derive(Debug)]
pub struct BillRegistry<S> {
    store: S,
}

impl<S> BillRegistry<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S> BillRegistry<S>
where
    S: KeyValueStore,
{
    /// Create a record from its named particulars.
    ///
    /// Fails with `DuplicateKey` when a record already exists under the
    /// number. The conditional write backstops the existence check, so a
    /// racing creation also surfaces as a duplicate.
    pub fn create(
        &self,
        bl_number: BlNumber,
        particulars: BillParticulars,
        occurred_at: DateTime<Utc>,
    ) -> Result<BillOfLading, RegistryError> {
        if self.store.get(bl_number.as_str())?.is_some() {
            return Err(DomainError::duplicate_key(bl_number.as_str()).into());
        }

        let mut bill = BillOfLading::empty(bl_number.clone());
        let events = bill.handle(&BillCommand::IssueBill(IssueBill {
            bl_number: bl_number.clone(),
            particulars,
            occurred_at,
        }))?;
        for event in &events {
            tracing::debug!(event_type = event.event_type(), bl_number = %bl_number, "applying event");
            bill.apply(event);
        }

        let bytes = encode_record(&bill)?;
        match self
            .store
            .put(bl_number.as_str(), bytes, ExpectedVersion::Exact(0))
        {
            Ok(_) => {}
            Err(StoreError::Concurrency(_)) => {
                return Err(DomainError::duplicate_key(bl_number.as_str()).into());
            }
            Err(other) => return Err(other.into()),
        }

        tracing::info!(bl_number = %bl_number, "bill of lading created");
        Ok(bill)
    }

    /// Create a record from the positionally encoded creation payload.
    pub fn create_from_payload(
        &self,
        raw: &str,
        occurred_at: DateTime<Utc>,
    ) -> Result<BillOfLading, RegistryError> {
        let (bl_number, particulars) = payload::decode(raw)?;
        self.create(bl_number, particulars, occurred_at)
    }

    /// Read one record. Fails with `NotFound` when absent.
    pub fn get(&self, bl_number: &BlNumber) -> Result<BillOfLading, RegistryError> {
        self.load(bl_number).map(|(bill, _)| bill)
    }

    /// All records, in the store's native key ordering.
    pub fn list(&self) -> Result<Vec<BillOfLading>, RegistryError> {
        self.store
            .scan("", "")?
            .into_iter()
            .map(|(key, value)| decode_record(&key, &value.bytes))
            .collect()
    }

    /// Run one mutating command through the load → handle → apply → persist
    /// pipeline.
    pub fn execute(&self, command: BillCommand) -> Result<BillOfLading, RegistryError> {
        let bl_number = command.target().clone();
        let (mut bill, version) = self.load(&bl_number)?;

        // Decide (pure). A rejection returns here, before any write.
        let events = bill.handle(&command)?;
        if events.is_empty() {
            return Ok(bill);
        }

        for event in &events {
            tracing::debug!(event_type = event.event_type(), bl_number = %bl_number, "applying event");
            bill.apply(event);
        }

        let bytes = encode_record(&bill)?;
        self.store
            .put(bl_number.as_str(), bytes, ExpectedVersion::Exact(version))?;

        Ok(bill)
    }

    fn load(&self, bl_number: &BlNumber) -> Result<(BillOfLading, u64), RegistryError> {
        match self.store.get(bl_number.as_str())? {
            None => Err(DomainError::not_found(bl_number.as_str()).into()),
            Some(value) => {
                let bill = decode_record(bl_number.as_str(), &value.bytes)?;
                Ok((bill, value.version))
            }
        }
    }
}

fn encode_record(bill: &BillOfLading) -> Result<Vec<u8>, RegistryError> {
    serde_json::to_vec(bill).map_err(|e| {
        RegistryError::Codec(format!("record '{}': {e}", bill.bl_number()))
    })
}

fn decode_record(key: &str, bytes: &[u8]) -> Result<BillOfLading, RegistryError> {
    serde_json::from_slice(bytes)
        .map_err(|e| RegistryError::Codec(format!("record '{key}': {e}")))
}
