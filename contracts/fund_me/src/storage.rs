//! # Storage
//!
//! The ledger keeps two kinds of records in an address-keyed store:
//!
//! | Key                | Type              | Written by                         |
//! |--------------------|-------------------|------------------------------------|
//! | project address    | `Project`         | `init_project` (create), `donate`  |
//! | receipt address    | `DonationReceipt` | `donate` (create only)             |
//!
//! There is no index, counter or manifest. A record is found by deriving its
//! address.
//!
//! ## Atomicity
//!
//! Stores provide two write primitives and nothing else:
//!
//! - [`RecordStore::insert_project`] creates a project only if its address is
//!   free. Two racing creates at one address yield one success and one
//!   [`Error::AlreadyExists`].
//! - [`RecordStore::apply_donation`] runs a donation transition under the
//!   project's exclusive update. The mutated project and the new receipt are
//!   written together, or neither is written.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::address::Address;
use crate::error::{Error, Result};
use crate::types::{DonationReceipt, Project};

/// Donation state transition handed to [`RecordStore::apply_donation`].
///
/// Receives the current project (to mutate in place) and whether the receipt
/// address is already occupied. Returns the receipt to insert.
pub type DonationTransition =
    Box<dyn FnOnce(&mut Project, bool) -> Result<DonationReceipt> + Send>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn load_project(&self, address: &Address) -> Result<Option<Project>>;

    async fn load_receipt(&self, address: &Address) -> Result<Option<DonationReceipt>>;

    /// Create `project` at `address`, failing with [`Error::AlreadyExists`]
    /// if the address is taken.
    async fn insert_project(&self, address: &Address, project: &Project) -> Result<()>;

    /// Load the project at `project_address`, apply `transition` and, if it
    /// succeeds, persist the mutated project and insert the receipt at
    /// `receipt_address` in one atomic unit.
    ///
    /// Fails with [`Error::NotFound`] if there is no project, and with
    /// [`Error::DuplicateDonation`] if the receipt address is occupied even
    /// when the transition ignores the flag. Returns the updated project and
    /// the inserted receipt.
    async fn apply_donation(
        &self,
        project_address: &Address,
        receipt_address: &Address,
        transition: DonationTransition,
    ) -> Result<(Project, DonationReceipt)>;
}

// ── In-memory store ──────────────────────────────────────────────────

#[derive(Default)]
struct Records {
    projects: HashMap<Address, Project>,
    receipts: HashMap<Address, DonationReceipt>,
}

/// Process-local [`RecordStore`]. A single lock covers both maps, so every
/// write primitive is serialised.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Records>> {
        self.records
            .lock()
            .map_err(|_| Error::Store("memory store lock poisoned".to_string()))
    }

    /// Number of stored projects.
    pub fn project_count(&self) -> Result<usize> {
        Ok(self.lock()?.projects.len())
    }

    /// Number of stored receipts.
    pub fn receipt_count(&self) -> Result<usize> {
        Ok(self.lock()?.receipts.len())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load_project(&self, address: &Address) -> Result<Option<Project>> {
        Ok(self.lock()?.projects.get(address).cloned())
    }

    async fn load_receipt(&self, address: &Address) -> Result<Option<DonationReceipt>> {
        Ok(self.lock()?.receipts.get(address).cloned())
    }

    async fn insert_project(&self, address: &Address, project: &Project) -> Result<()> {
        let mut records = self.lock()?;
        if records.projects.contains_key(address) {
            return Err(Error::AlreadyExists(*address));
        }
        records.projects.insert(*address, project.clone());
        debug!("memory store: project inserted at {address}");
        Ok(())
    }

    async fn apply_donation(
        &self,
        project_address: &Address,
        receipt_address: &Address,
        transition: DonationTransition,
    ) -> Result<(Project, DonationReceipt)> {
        let mut records = self.lock()?;

        let mut project = records
            .projects
            .get(project_address)
            .cloned()
            .ok_or(Error::NotFound(*project_address))?;
        let occupied = records.receipts.contains_key(receipt_address);

        let receipt = transition(&mut project, occupied)?;
        if occupied {
            return Err(Error::DuplicateDonation(*receipt_address));
        }

        records.projects.insert(*project_address, project.clone());
        records.receipts.insert(*receipt_address, receipt.clone());
        debug!("memory store: receipt inserted at {receipt_address}");
        Ok((project, receipt))
    }
}
