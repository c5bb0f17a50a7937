//! # Fund Me Ledger
//!
//! Crowdfunding ledger: owners register fundraising projects with a target
//! and a deadline, anyone donates while a project is open, and every accepted
//! donation leaves an immutable receipt at its own derived address.
//!
//! | Phase        | Entry Point(s)                                   |
//! |--------------|--------------------------------------------------|
//! | Registration | [`FundMe::init_project`]                         |
//! | Funding      | [`FundMe::donate`]                               |
//! | Queries      | [`FundMe::get_project`], [`FundMe::get_receipt`] |
//! | Addressing   | [`FundMe::project_address`], [`FundMe::receipt_address`] |
//!
//! ## Architecture
//!
//! Record locations are computed in [`address`]. Shape checks live in
//! [`types`]. Persistence and the atomic write primitives are delegated to a
//! [`RecordStore`]; [`MemoryStore`] is the in-process implementation. Time is
//! read through a [`Clock`] so the deadline check can be driven in tests.

pub mod address;
pub mod clock;
mod donation;
pub mod error;
mod registry;
pub mod storage;
pub mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_init_project;

pub use address::{Address, ParseAddressError, DEFAULT_PROGRAM_ID};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Field, Result, ValidationError};
pub use storage::{DonationTransition, MemoryStore, RecordStore};
pub use types::{DonationReceipt, Project, ProjectMetadata, ProjectStatus};

/// The ledger: a program id to derive addresses under, a record store and a clock.
///
/// All operations take `&self`; share one instance between tasks behind an
/// `Arc`. Concurrency guarantees come from the store's write primitives.
pub struct FundMe<S, C = SystemClock> {
    program_id: Address,
    store: S,
    clock: C,
}

impl<S: RecordStore, C: Clock> FundMe<S, C> {
    pub fn new(program_id: Address, store: S, clock: C) -> Self {
        Self {
            program_id,
            store,
            clock,
        }
    }

    pub fn program_id(&self) -> &Address {
        &self.program_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Address and bump of `owner`'s project `project_id`.
    pub fn project_address(&self, owner: &Address, project_id: &str) -> Result<(Address, u8)> {
        address::find_project_address(owner, project_id, &self.program_id)
    }

    /// Address and bump of the receipt `user` gets for donating to `project` at `timestamp`.
    pub fn receipt_address(
        &self,
        user: &Address,
        project: &Address,
        timestamp: i64,
    ) -> Result<(Address, u8)> {
        address::find_receipt_address(user, project, timestamp, &self.program_id)
    }
}

impl<S: RecordStore> FundMe<S, SystemClock> {
    /// Ledger on the system clock under [`DEFAULT_PROGRAM_ID`].
    pub fn with_store(store: S) -> Self {
        Self::new(DEFAULT_PROGRAM_ID, store, SystemClock)
    }
}
