//! # Addresses
//!
//! Every record in the ledger lives at an address derived from the inputs
//! that identify it. Nothing hands out sequence numbers:
//!
//! | Record            | Seeds                                                    |
//! |-------------------|----------------------------------------------------------|
//! | `Project`         | `"project"`, owner, project_id bytes                     |
//! | `DonationReceipt` | `"receipt"`, user, project address, timestamp (i64, LE)  |
//!
//! Derivation follows the program-derived-address scheme, so a client that
//! knows the program id can compute the same address before submitting:
//!
//! ```text
//! candidate = sha256(seed_1 || .. || seed_n || bump || program_id || "ProgramDerivedAddress")
//! ```
//!
//! Bumps are tried from 255 downwards and the first candidate that is *not*
//! a valid ed25519 point wins. The winning bump is stored on the record so
//! its address can be re-derived with a single hash later.

use std::fmt;
use std::str::FromStr;

use curve25519_dalek::edwards::CompressedEdwardsY;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::error::{Error, Result};

/// Length in bytes of an address or identity.
pub const ADDRESS_BYTES: usize = 32;

/// Longest accepted single seed.
pub const MAX_SEED_LEN: usize = 32;

/// Most seeds accepted in one derivation, bump included.
pub const MAX_SEEDS: usize = 16;

/// Seed prefix of project records.
pub const PROJECT_SEED: &[u8] = b"project";

/// Seed prefix of donation receipts.
pub const RECEIPT_SEED: &[u8] = b"receipt";

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Program id the ledger derives under unless configured otherwise
/// (`5AacFLpus95hMDvRxUnYuoMrh7dryys2qysiRpiALbxD`).
pub const DEFAULT_PROGRAM_ID: Address = Address::new([
    61, 226, 249, 176, 99, 182, 113, 163, 49, 234, 244, 33, 182, 10, 186, 245, 140, 17, 41, 193,
    208, 44, 100, 128, 17, 241, 39, 235, 77, 215, 87, 50,
]);

/// A 32-byte identity or record location, displayed in base58.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_BYTES]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; ADDRESS_BYTES] {
        self.0
    }

    /// `true` if the bytes decode to a point on the ed25519 curve, i.e. the
    /// address could have a private key behind it.
    pub fn is_on_curve(&self) -> bool {
        CompressedEdwardsY(self.0).decompress().is_some()
    }
}

impl From<[u8; ADDRESS_BYTES]> for Address {
    fn from(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseAddressError {
    #[error("invalid base58: {0}")]
    Base58(String),

    #[error("expected {ADDRESS_BYTES} bytes, decoded {0}")]
    WrongLength(usize),
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| ParseAddressError::Base58(e.to_string()))?;
        let bytes: [u8; ADDRESS_BYTES] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| ParseAddressError::WrongLength(b.len()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ── Derivation ───────────────────────────────────────────────────────

/// Hash `seeds` under `program_id` into an address.
///
/// Fails with [`Error::InvalidSeeds`] when there are too many seeds, a seed
/// is longer than [`MAX_SEED_LEN`], or the digest lands on the curve.
pub fn create_program_address(seeds: &[&[u8]], program_id: &Address) -> Result<Address> {
    if seeds.len() > MAX_SEEDS || seeds.iter().any(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(Error::InvalidSeeds);
    }

    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);

    let candidate = Address(hasher.finalize().into());
    if candidate.is_on_curve() {
        return Err(Error::InvalidSeeds);
    }
    Ok(candidate)
}

/// Search bumps 255..=0 and return the first off-curve address with its bump.
pub fn find_program_address(seeds: &[&[u8]], program_id: &Address) -> Result<(Address, u8)> {
    if seeds.len() >= MAX_SEEDS {
        return Err(Error::InvalidSeeds);
    }

    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut seeds_with_bump = seeds.to_vec();
        seeds_with_bump.push(&bump_seed);
        match create_program_address(&seeds_with_bump, program_id) {
            Ok(address) => return Ok((address, bump)),
            Err(Error::InvalidSeeds) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(Error::InvalidSeeds)
}

/// Address and bump of the project `project_id` created by `owner`.
pub fn find_project_address(
    owner: &Address,
    project_id: &str,
    program_id: &Address,
) -> Result<(Address, u8)> {
    find_program_address(
        &[PROJECT_SEED, owner.as_ref(), project_id.as_bytes()],
        program_id,
    )
}

/// Address and bump of the receipt for `user` donating to `project` at `timestamp`.
pub fn find_receipt_address(
    user: &Address,
    project: &Address,
    timestamp: i64,
    program_id: &Address,
) -> Result<(Address, u8)> {
    find_program_address(
        &[
            RECEIPT_SEED,
            user.as_ref(),
            project.as_ref(),
            &timestamp.to_le_bytes(),
        ],
        program_id,
    )
}
