//! Ledger error types.

use std::fmt;

use thiserror::Error;

use crate::address::Address;

/// Caller-supplied input a [`ValidationError`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    ProjectId,
    Title,
    Description,
    ImageUrl,
    TargetAmount,
    Amount,
    Timestamp,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectId => "project_id",
            Self::Title => "title",
            Self::Description => "description",
            Self::ImageUrl => "image_url",
            Self::TargetAmount => "target_amount",
            Self::Amount => "amount",
            Self::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape violation detected before any state is touched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is {len} bytes, limit is {limit}")]
    TooLong {
        field: Field,
        limit: usize,
        len: usize,
    },

    #[error("{field} must be greater than zero")]
    NotPositive { field: Field },
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            Self::TooLong { field, .. } | Self::NotPositive { field } => *field,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("a record already exists at {0}")]
    AlreadyExists(Address),

    #[error("no record found at {0}")]
    NotFound(Address),

    #[error("project fundraising period has ended (end_time {end_time}, now {now})")]
    ProjectExpired { end_time: i64, now: i64 },

    #[error("a donation receipt already exists at {0}")]
    DuplicateDonation(Address),

    #[error("arithmetic overflow while updating the project total")]
    ArithmeticOverflow,

    #[error("stored bump does not re-derive project address {0}")]
    AddressMismatch(Address),

    #[error("seeds do not produce a valid program address")]
    InvalidSeeds,

    #[error("record store failure: {0}")]
    Store(String),
}

impl Error {
    /// Stable machine-readable identifier, used in API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::AlreadyExists(_) => "already_exists",
            Self::NotFound(_) => "not_found",
            Self::ProjectExpired { .. } => "project_expired",
            Self::DuplicateDonation(_) => "duplicate_donation",
            Self::ArithmeticOverflow => "arithmetic_overflow",
            Self::AddressMismatch(_) => "address_mismatch",
            Self::InvalidSeeds => "invalid_seeds",
            Self::Store(_) => "store_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
