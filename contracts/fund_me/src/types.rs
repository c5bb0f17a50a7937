//! # Types
//!
//! Records kept by the ledger and the input validation shared by the
//! registry and the donation ledger.
//!
//! ## Design decisions
//!
//! ### Status is computed, not stored
//!
//! A project has no status field. [`ProjectStatus`] is evaluated from the
//! immutable `end_time` and the current clock at the moment a transition
//! runs:
//!
//! ```text
//! Open (now <= end_time) ──► Closed (now > end_time)
//! ```
//!
//! `Closed` is terminal; there is no close or reopen operation.
//!
//! ### Receipts are self-contained
//!
//! Each [`DonationReceipt`] carries its own amount. Nothing aggregates a
//! donor's total per project, and receipts cannot be enumerated per project;
//! they are fetched by address.

use serde::{Deserialize, Serialize};

use crate::address::{create_program_address, Address, PROJECT_SEED, RECEIPT_SEED};
use crate::error::{Error, Field, Result, ValidationError};

/// Longest `project_id`, in bytes.
pub const MAX_PROJECT_ID_LEN: usize = 32;
/// Longest `metadata.title`, in bytes.
pub const MAX_TITLE_LEN: usize = 100;
/// Longest `metadata.description`, in bytes.
pub const MAX_DESCRIPTION_LEN: usize = 500;
/// Longest `metadata.image_url`, in bytes.
pub const MAX_IMAGE_URL_LEN: usize = 200;

/// Whether a project accepts donations at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// `now <= end_time`; donations accepted.
    Open,
    /// `now > end_time`; donations rejected.
    Closed,
}

/// Descriptive fields of a project. Immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub title: String,
    pub description: String,
    pub image_url: String,
}

/// A fundraising campaign, stored at `derive("project", owner, project_id)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Creator of the project.
    pub owner: Address,
    /// Owner-chosen identifier, unique per owner.
    pub project_id: String,
    pub metadata: ProjectMetadata,
    /// Funding goal, in the smallest currency unit.
    pub target_amount: u64,
    /// Sum of all accepted donations. Only ever increases.
    pub current_amount: u64,
    /// Unix seconds after which donations are rejected.
    pub end_time: i64,
    /// Bump the address was derived with.
    pub bump: u8,
}

impl Project {
    pub fn status(&self, now: i64) -> ProjectStatus {
        if now <= self.end_time {
            ProjectStatus::Open
        } else {
            ProjectStatus::Closed
        }
    }

    pub fn is_open(&self, now: i64) -> bool {
        self.status(now) == ProjectStatus::Open
    }

    /// Re-derive this project's address from its stored seeds and bump.
    pub fn address(&self, program_id: &Address) -> Result<Address> {
        create_program_address(
            &[
                PROJECT_SEED,
                self.owner.as_ref(),
                self.project_id.as_bytes(),
                &[self.bump],
            ],
            program_id,
        )
    }
}

/// Immutable record of one accepted donation, stored at
/// `derive("receipt", user, project, timestamp)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationReceipt {
    /// Donor.
    pub user: Address,
    /// Address of the project donated to.
    pub project: Address,
    pub amount: u64,
    /// Caller-chosen timestamp the receipt address was derived from.
    pub timestamp: i64,
    /// Reserved for a refund flow; always `false` when issued.
    pub refunded: bool,
    pub bump: u8,
}

impl DonationReceipt {
    /// Re-derive this receipt's address from its stored seeds and bump.
    pub fn address(&self, program_id: &Address) -> Result<Address> {
        create_program_address(
            &[
                RECEIPT_SEED,
                self.user.as_ref(),
                self.project.as_ref(),
                &self.timestamp.to_le_bytes(),
                &[self.bump],
            ],
            program_id,
        )
    }
}

// ── Validation ───────────────────────────────────────────────────────

fn check_len(field: Field, value: &str, limit: usize) -> std::result::Result<(), ValidationError> {
    if value.len() > limit {
        return Err(ValidationError::TooLong {
            field,
            limit,
            len: value.len(),
        });
    }
    Ok(())
}

/// Validate the inputs of `init_project`. Fields are checked in declaration
/// order and the first violation is reported.
pub fn validate_project(
    project_id: &str,
    metadata: &ProjectMetadata,
    target_amount: u64,
) -> Result<()> {
    check_len(Field::ProjectId, project_id, MAX_PROJECT_ID_LEN)?;
    check_len(Field::Title, &metadata.title, MAX_TITLE_LEN)?;
    check_len(Field::Description, &metadata.description, MAX_DESCRIPTION_LEN)?;
    check_len(Field::ImageUrl, &metadata.image_url, MAX_IMAGE_URL_LEN)?;
    if target_amount == 0 {
        return Err(Error::Validation(ValidationError::NotPositive {
            field: Field::TargetAmount,
        }));
    }
    Ok(())
}

/// Validate the amount and timestamp of a donation.
pub fn validate_donation(amount: u64, timestamp: i64) -> Result<()> {
    if amount == 0 {
        return Err(ValidationError::NotPositive {
            field: Field::Amount,
        }
        .into());
    }
    if timestamp <= 0 {
        return Err(ValidationError::NotPositive {
            field: Field::Timestamp,
        }
        .into());
    }
    Ok(())
}
