//! Trait definitions for the hash primitives.

use super::SignerStatsSnapshot;
use crate::error::HashError;
use serde::{Deserialize, Serialize};

/// The pair of hash primitives the pipeline is built on.
///
/// Both functions must be deterministic: the same input always yields the
/// same output string.
pub trait DataSigner: Send + Sync {
    /// Cryptographic digest of `data`.
    ///
    /// Not safe for concurrent invocation. Callers must serialize calls
    /// to this method.
    fn digest(&self, data: &str) -> Result<String, HashError>;

    /// Non-cryptographic checksum of `data`. Safe to call from any
    /// number of threads at once.
    fn checksum(&self, data: &str) -> Result<String, HashError>;

    /// Call statistics, if the backend keeps any
    fn stats(&self) -> Option<SignerStatsSnapshot> {
        None
    }
}

/// Available checksum algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChecksumAlgorithm {
    /// CRC-32 (IEEE), rendered as a decimal number
    #[default]
    Crc32,
    /// XXH3 64-bit, rendered as a decimal number
    Xxh3,
}

impl ChecksumAlgorithm {
    /// Get a human-readable description of the algorithm
    pub fn description(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Crc32 => "CRC-32 (IEEE) - the classic signer checksum",
            ChecksumAlgorithm::Xxh3 => "XXH3-64 - much faster, wider output",
        }
    }

    /// Checksum `bytes`, rendered as decimal
    pub fn compute(&self, bytes: &[u8]) -> String {
        match self {
            ChecksumAlgorithm::Crc32 => crc32fast::hash(bytes).to_string(),
            ChecksumAlgorithm::Xxh3 => xxhash_rust::xxh3::xxh3_64(bytes).to_string(),
        }
    }
}

impl std::fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecksumAlgorithm::Crc32 => write!(f, "crc32"),
            ChecksumAlgorithm::Xxh3 => write!(f, "xxh3"),
        }
    }
}
