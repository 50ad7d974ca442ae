//! Deterministic signer for unit tests.
//!
//! `checksum(s) = "c(" + s + ")"`, `digest(s) = "d(" + s + ")"`.

use super::DataSigner;
use crate::error::HashError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

type DelayFn = Box<dyn Fn(&str) -> Duration + Send + Sync>;

#[derive(Default)]
pub(crate) struct MockSigner {
    checksum_delay: Option<DelayFn>,
    digest_delay: Duration,
    fail_on: Option<String>,
    panic_on_digest: Option<String>,
    active_digests: AtomicUsize,
    max_active_digests: AtomicUsize,
    digest_intervals: Mutex<Vec<(Instant, Instant)>>,
}

impl MockSigner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Delay each checksum by an amount derived from its input
    pub(crate) fn checksum_delay<F>(mut self, delay: F) -> Self
    where
        F: Fn(&str) -> Duration + Send + Sync + 'static,
    {
        self.checksum_delay = Some(Box::new(delay));
        self
    }

    pub(crate) fn digest_delay(mut self, delay: Duration) -> Self {
        self.digest_delay = delay;
        self
    }

    /// Fail any checksum whose input equals `data`
    pub(crate) fn fail_on(mut self, data: &str) -> Self {
        self.fail_on = Some(data.to_string());
        self
    }

    /// Panic inside any digest whose input equals `data`
    pub(crate) fn panic_on_digest(mut self, data: &str) -> Self {
        self.panic_on_digest = Some(data.to_string());
        self
    }

    pub(crate) fn max_active_digests(&self) -> usize {
        self.max_active_digests.load(Ordering::SeqCst)
    }

    pub(crate) fn digest_intervals(&self) -> Vec<(Instant, Instant)> {
        self.digest_intervals.lock().unwrap().clone()
    }
}

impl DataSigner for MockSigner {
    fn digest(&self, data: &str) -> Result<String, HashError> {
        if self.panic_on_digest.as_deref() == Some(data) {
            panic!("digest of {data}");
        }
        let start = Instant::now();
        let active = self.active_digests.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_digests.fetch_max(active, Ordering::SeqCst);

        if !self.digest_delay.is_zero() {
            thread::sleep(self.digest_delay);
        }

        self.active_digests.fetch_sub(1, Ordering::SeqCst);
        let end = Instant::now();
        self.digest_intervals.lock().unwrap().push((start, end));
        Ok(format!("d({data})"))
    }

    fn checksum(&self, data: &str) -> Result<String, HashError> {
        if self.fail_on.as_deref() == Some(data) {
            return Err(HashError::ComputationFailed(format!("checksum of {data}")));
        }
        if let Some(delay) = &self.checksum_delay {
            thread::sleep(delay(data));
        }
        Ok(format!("c({data})"))
    }
}
