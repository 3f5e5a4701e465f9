//! Atom model: an immutable content block addressed by its SHA-256 digest.
//!
//! # Invariants
//! - `AtomHash` is always 64 lowercase hex characters.
//! - The hash doubles as the content file name under the atoms directory.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Read};
use uuid::Uuid;

/// Catalog-internal atom identifier.
pub type AtomId = Uuid;

static HASH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-f]{64}$").expect("valid sha256 hex regex"));

/// Rejected hash text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidHashError {
    pub value: String,
}

impl Display for InvalidHashError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` is not a lowercase hex sha256 digest", self.value)
    }
}

impl Error for InvalidHashError {}

/// Lowercase hex SHA-256 digest of an atom's content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AtomHash(String);

impl AtomHash {
    /// Validates `value` as a digest string.
    pub fn parse(value: impl Into<String>) -> Result<Self, InvalidHashError> {
        let value = value.into();
        if HASH_PATTERN.is_match(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidHashError { value })
        }
    }

    /// Digest of an in-memory buffer.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    /// Streams `reader` to the end through SHA-256.
    pub fn of_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let mut hasher = Sha256::new();
        io::copy(reader, &mut hasher)?;
        Ok(Self(hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AtomHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AtomHash {
    type Error = InvalidHashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<AtomHash> for String {
    fn from(value: AtomHash) -> Self {
        value.0
    }
}

/// Catalog record for one stored content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Atom {
    pub id: AtomId,
    pub hash: AtomHash,
}

impl Atom {
    /// Creates a record with a freshly generated catalog ID.
    pub fn new(hash: AtomHash) -> Self {
        Self {
            id: Uuid::new_v4(),
            hash,
        }
    }
}
