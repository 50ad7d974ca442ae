//! # Error Module
//!
//! Typed errors for the signer pipeline.
//!
//! ## Design Principles
//! - **Never abort the process** on a failing item - return errors instead
//! - **Report once** - a run surfaces the first failure, not one error per item
//! - **Include context** - stage names, offending items, file paths

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum SignerError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

/// Errors raised by the pipeline executor and its stages
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Pipeline has no stages")]
    NoStages,

    #[error("Pipeline run was cancelled")]
    Cancelled,

    #[error("Stage '{stage}' received an item it cannot process: {item}")]
    InvalidItem { stage: String, item: String },

    #[error("Stage '{stage}' panicked")]
    StagePanicked { stage: String },

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(String),

    #[error("Failed to spawn thread for '{stage}': {reason}")]
    SpawnFailed { stage: String, reason: String },
}

/// Errors raised by the hash primitives
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("Digest called concurrently (overheat); calls must be serialized")]
    Overheat,

    #[error("Digest lock was poisoned by a panicking task")]
    LockPoisoned,

    #[error("Hash computation failed: {0}")]
    ComputationFailed(String),
}

/// Invalid pipeline or signer configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid queue capacity: {value} (must be at least 1)")]
    InvalidQueueCapacity { value: usize },

    #[error("Invalid worker count: {value} (must be 1-{max})")]
    InvalidWorkers { value: usize, max: usize },
}

/// Errors while writing a signature report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report: {0}")]
    Write(#[source] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, SignerError>;
