//! Call counters for the hash primitives.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters updated by a signer from many threads
#[derive(Debug, Default)]
pub struct SignerStats {
    /// Completed digest calls
    pub digest_calls: AtomicU64,

    /// Completed checksum calls
    pub checksum_calls: AtomicU64,

    /// Digest calls rejected because another call was in progress
    pub overheats: AtomicU64,
}

impl SignerStats {
    pub(crate) fn record_digest(&self) {
        self.digest_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_checksum(&self) {
        self.checksum_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_overheat(&self) {
        self.overheats.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> SignerStatsSnapshot {
        SignerStatsSnapshot {
            digest_calls: self.digest_calls.load(Ordering::Relaxed),
            checksum_calls: self.checksum_calls.load(Ordering::Relaxed),
            overheats: self.overheats.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of [`SignerStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerStatsSnapshot {
    pub digest_calls: u64,
    pub checksum_calls: u64,
    pub overheats: u64,
}

impl SignerStatsSnapshot {
    /// Counters accumulated since an earlier snapshot of the same signer
    pub fn since(&self, earlier: &SignerStatsSnapshot) -> SignerStatsSnapshot {
        SignerStatsSnapshot {
            digest_calls: self.digest_calls.saturating_sub(earlier.digest_calls),
            checksum_calls: self.checksum_calls.saturating_sub(earlier.checksum_calls),
            overheats: self.overheats.saturating_sub(earlier.overheats),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_recorded_calls() {
        let stats = SignerStats::default();
        stats.record_digest();
        stats.record_checksum();
        stats.record_checksum();
        stats.record_overheat();

        assert_eq!(
            stats.snapshot(),
            SignerStatsSnapshot {
                digest_calls: 1,
                checksum_calls: 2,
                overheats: 1,
            }
        );
    }

    #[test]
    fn since_subtracts_earlier_counts() {
        let stats = SignerStats::default();
        stats.record_digest();
        stats.record_checksum();
        let before = stats.snapshot();

        stats.record_digest();
        stats.record_checksum();
        stats.record_checksum();

        assert_eq!(
            stats.snapshot().since(&before),
            SignerStatsSnapshot {
                digest_calls: 1,
                checksum_calls: 2,
                overheats: 0,
            }
        );
    }
}
