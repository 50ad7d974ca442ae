//! # Core Module
//!
//! The signing engine, independent of any front end.
//!
//! ## Modules
//! - `hasher` - Digest and checksum primitives
//! - `pipeline` - Generic staged executor with fan-out and cancellation
//! - `stages` - The SingleHash, MultiHash and CombineResults stages
//! - `signer` - The three stages assembled into one pipeline
//! - `reporter` - JSON reports of finished runs

pub mod hasher;
pub mod pipeline;
pub mod reporter;
pub mod signer;
pub mod stages;

// Re-export commonly used types
pub use hasher::{ChecksumAlgorithm, DataSigner, SignerConfig, StandardSigner};
pub use pipeline::{CancellationToken, Pipeline, PipelineConfig, Stage};
pub use reporter::SignatureReport;
pub use signer::{SignatureResult, SignerPipeline};
pub use stages::Datum;
