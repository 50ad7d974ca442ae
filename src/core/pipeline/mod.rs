//! # Pipeline Module
//!
//! A generic staged executor.
//!
//! ## Execution Model
//! 1. **Feed** - a feeder thread pushes the seed items into the first queue
//! 2. **Stages** - one worker thread per stage, connected by bounded queues
//! 3. **Fan-out** - stages hand per-item work to a rayon pool owned by the run
//! 4. **Drain** - the caller collects whatever the last stage produces
//!
//! A stage's output queue closes when the stage returns, which is what
//! lets the next stage's input loop terminate.
//!
//! ## Failures
//! The first error (or panic) cancels the run through a shared
//! [`CancellationToken`] and is the one returned to the caller.

mod cancel;
mod config;
mod executor;
mod stage;

pub use cancel::CancellationToken;
pub use config::{PipelineConfig, DEFAULT_QUEUE_CAPACITY, MAX_WORKERS};
pub use executor::{Pipeline, PipelineBuilder};
pub use stage::{stage_fn, Stage, StageContext, StageFn, StageInput, StageOutput};
