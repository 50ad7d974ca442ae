//! MD5 + CRC-32 signer with optional simulated latency.
//!
//! The digest side refuses overlapping calls instead of silently computing
//! them: an entry while another digest is in flight fails with
//! [`HashError::Overheat`]. The pipeline serializes digest calls, so a run
//! that trips this has a locking bug.

use super::{ChecksumAlgorithm, DataSigner, SignerStats, SignerStatsSnapshot};
use crate::error::HashError;
use md5::{Digest, Md5};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Production signer: lowercase-hex MD5 digest, decimal checksum
#[derive(Debug)]
pub struct StandardSigner {
    algorithm: ChecksumAlgorithm,
    checksum_latency: Duration,
    digest_latency: Duration,
    digest_busy: AtomicBool,
    stats: SignerStats,
}

impl StandardSigner {
    pub fn new(
        algorithm: ChecksumAlgorithm,
        checksum_latency: Duration,
        digest_latency: Duration,
    ) -> Self {
        Self {
            algorithm,
            checksum_latency,
            digest_latency,
            digest_busy: AtomicBool::new(false),
            stats: SignerStats::default(),
        }
    }

    /// The checksum algorithm in use
    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    /// Live call counters
    pub fn live_stats(&self) -> &SignerStats {
        &self.stats
    }
}

impl Default for StandardSigner {
    fn default() -> Self {
        Self::new(ChecksumAlgorithm::Crc32, Duration::ZERO, Duration::ZERO)
    }
}

/// Clears the busy flag when the digest call returns
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DataSigner for StandardSigner {
    fn digest(&self, data: &str) -> Result<String, HashError> {
        if self.digest_busy.swap(true, Ordering::AcqRel) {
            self.stats.record_overheat();
            warn!(data, "Overlapping digest call rejected");
            return Err(HashError::Overheat);
        }
        let _busy = BusyGuard(&self.digest_busy);

        let hex = format!("{:x}", Md5::digest(data.as_bytes()));
        if !self.digest_latency.is_zero() {
            thread::sleep(self.digest_latency);
        }

        self.stats.record_digest();
        Ok(hex)
    }

    fn checksum(&self, data: &str) -> Result<String, HashError> {
        let value = self.algorithm.compute(data.as_bytes());
        if !self.checksum_latency.is_zero() {
            thread::sleep(self.checksum_latency);
        }

        self.stats.record_checksum();
        Ok(value)
    }

    fn stats(&self) -> Option<SignerStatsSnapshot> {
        Some(self.stats.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn digest_is_lowercase_hex_md5() {
        let signer = StandardSigner::default();
        assert_eq!(
            signer.digest("0").unwrap(),
            "cfcd208495d565ef66e7dff9f98764da"
        );
        assert_eq!(
            signer.digest("hello").unwrap(),
            "5d41402abc4b2a76b9719d911017c592"
        );
    }

    #[test]
    fn checksum_uses_configured_algorithm() {
        let crc = StandardSigner::default();
        let xxh = StandardSigner::new(ChecksumAlgorithm::Xxh3, Duration::ZERO, Duration::ZERO);

        assert_eq!(crc.checksum("0").unwrap(), "4108050209");
        assert_eq!(xxh.checksum("0").unwrap(), ChecksumAlgorithm::Xxh3.compute(b"0"));
    }

    #[test]
    fn stats_count_calls() {
        let signer = StandardSigner::default();
        signer.digest("a").unwrap();
        signer.checksum("a").unwrap();
        signer.checksum("b").unwrap();

        let stats = signer.stats().unwrap();
        assert_eq!(stats.digest_calls, 1);
        assert_eq!(stats.checksum_calls, 2);
        assert_eq!(stats.overheats, 0);
    }

    #[test]
    fn overlapping_digest_calls_overheat() {
        let signer = Arc::new(StandardSigner::new(
            ChecksumAlgorithm::Crc32,
            Duration::ZERO,
            Duration::from_millis(200),
        ));

        let background = Arc::clone(&signer);
        let handle = thread::spawn(move || background.digest("slow"));

        // Give the background call time to enter the digest
        thread::sleep(Duration::from_millis(50));
        let result = signer.digest("fast");

        assert_eq!(result, Err(HashError::Overheat));
        assert!(handle.join().unwrap().is_ok());
        assert_eq!(signer.stats().unwrap().overheats, 1);
    }

    #[test]
    fn busy_flag_clears_after_each_call() {
        let signer = StandardSigner::default();
        for _ in 0..3 {
            assert!(signer.digest("again").is_ok());
        }
        assert_eq!(signer.stats().unwrap().overheats, 0);
    }
}
