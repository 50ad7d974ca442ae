//! # Hasher Module
//!
//! The hash primitives the pipeline stages are built on.
//!
//! ## Primitives
//! - **Digest** - MD5, lowercase hex. Not safe for concurrent calls.
//! - **Checksum** - CRC-32 (default) or XXH3-64, decimal. Safe everywhere.
//!
//! ## Example
//! ```rust,ignore
//! use signer_pipeline::core::hasher::{ChecksumAlgorithm, SignerConfig};
//!
//! let signer = SignerConfig::new()
//!     .checksum(ChecksumAlgorithm::Crc32)
//!     .checksum_latency(Duration::from_millis(100))
//!     .build();
//!
//! let digest = signer.digest("0")?;
//! ```

#[cfg(test)]
pub(crate) mod mock;
mod standard;
mod stats;
mod traits;

pub use standard::StandardSigner;
pub use stats::{SignerStats, SignerStatsSnapshot};
pub use traits::{ChecksumAlgorithm, DataSigner};

use std::time::Duration;

/// Configuration builder for [`StandardSigner`]
#[derive(Debug, Clone, Default)]
pub struct SignerConfig {
    algorithm: ChecksumAlgorithm,
    checksum_latency: Duration,
    digest_latency: Duration,
}

impl SignerConfig {
    /// Create a new signer configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the checksum algorithm
    pub fn checksum(mut self, algorithm: ChecksumAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Add an artificial delay to every checksum call
    ///
    /// Useful for seeing the fan-out at work: with a 1s checksum a
    /// sequential run takes seconds per item, a parallel one about 2s total.
    pub fn checksum_latency(mut self, latency: Duration) -> Self {
        self.checksum_latency = latency;
        self
    }

    /// Add an artificial delay to every digest call
    pub fn digest_latency(mut self, latency: Duration) -> Self {
        self.digest_latency = latency;
        self
    }

    /// Build the signer
    pub fn build(self) -> StandardSigner {
        StandardSigner::new(self.algorithm, self.checksum_latency, self.digest_latency)
    }
}
