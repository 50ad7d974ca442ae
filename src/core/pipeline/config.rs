//! Pipeline configuration.

use crate::error::ConfigError;

/// Default capacity of the queues between stages
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Maximum reasonable worker count
pub const MAX_WORKERS: usize = 1024;

/// Configuration for a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Capacity of every queue between two stages.
    ///
    /// Any value >= 1 is deadlock-free: consumers drain continuously, a
    /// full queue only makes producers wait.
    pub queue_capacity: usize,
    /// Threads in the per-item worker pool (`None` = one per CPU)
    pub workers: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            workers: None,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inter-stage queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the worker pool size
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Check the configuration before any thread is spawned
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidQueueCapacity {
                value: self.queue_capacity,
            });
        }

        if let Some(workers) = self.workers {
            if workers == 0 || workers > MAX_WORKERS {
                return Err(ConfigError::InvalidWorkers {
                    value: workers,
                    max: MAX_WORKERS,
                });
            }
        }

        Ok(())
    }
}
