//! # Signer Pipeline
//!
//! A staged concurrent pipeline that turns a sequence of items into one
//! deterministic combined signature.
//!
//! ## How a Signature is Built
//! - **SingleHash** - `crc32(x) ~ crc32(md5(x))`, with md5 calls serialized
//! - **MultiHash** - `crc32(0 + s) ... crc32(5 + s)`, concatenated in order
//! - **CombineResults** - every result sorted and joined with `_`
//!
//! ## Architecture
//! - `core` - Hash primitives, the generic executor and the signer stages
//! - `events` - Event-driven progress reporting
//! - `error` - Typed error hierarchy
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, SignerError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. Filtering is
/// controlled with `RUST_LOG`. Calling it twice leaves the first
/// subscriber in place.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
