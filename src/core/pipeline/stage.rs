//! The stage contract and the plumbing handed to each stage worker.

use super::CancellationToken;
use crate::error::{PipelineError, Result, SignerError};
use crossbeam_channel::{Receiver, Sender};
use rayon::ThreadPool;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, trace, warn};

/// One step of a pipeline.
///
/// A stage consumes `input` until it is exhausted (or the run is
/// cancelled) and writes results to `output`. Returning from `run` drops
/// `output`, which closes the queue to the next stage. Anything `run`
/// spawns must finish before it returns.
pub trait Stage<T>: Send + Sync {
    /// Name used in logs, events and errors
    fn name(&self) -> &str;

    fn run(&self, input: StageInput<T>, output: StageOutput<T>, ctx: &StageContext) -> Result<()>;
}

/// Receiving end of a stage's input queue.
///
/// Iteration ends when the upstream stage has closed its output and the
/// queue is drained, or as soon as the run is cancelled.
pub struct StageInput<T> {
    receiver: Receiver<T>,
    token: CancellationToken,
}

impl<T> StageInput<T> {
    pub(crate) fn new(receiver: Receiver<T>, token: CancellationToken) -> Self {
        Self { receiver, token }
    }
}

impl<T> Iterator for StageInput<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.token.is_cancelled() {
            return None;
        }
        let item = self.receiver.recv().ok()?;
        // Items that arrive after cancellation are dropped
        (!self.token.is_cancelled()).then_some(item)
    }
}

/// Sending end of a stage's output queue
pub struct StageOutput<T> {
    sender: Sender<T>,
    sent: Arc<AtomicUsize>,
}

impl<T> StageOutput<T> {
    pub(crate) fn new(sender: Sender<T>) -> Self {
        Self {
            sender,
            sent: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Deliver an item downstream, blocking while the queue is full.
    ///
    /// Returns `false` if the downstream stage has already gone away.
    pub fn send(&self, item: T) -> bool {
        if self.sender.send(item).is_ok() {
            self.sent.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    pub(crate) fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.sent)
    }
}

/// Holds the first failure of a run; later ones are logged and dropped
#[derive(Debug, Default)]
pub(crate) struct FirstFailure {
    slot: Mutex<Option<SignerError>>,
}

impl FirstFailure {
    pub(crate) fn record(&self, stage: &str, error: SignerError, token: &CancellationToken) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            debug!(stage, error = %error, "Discarding failure after the first");
            return;
        }
        warn!(stage, error = %error, "Stage failed, cancelling run");
        *slot = Some(error);
        token.cancel();
    }

    pub(crate) fn take(&self) -> Option<SignerError> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

/// Everything a stage worker shares with the rest of its run
pub struct StageContext {
    stage: String,
    token: CancellationToken,
    failure: Arc<FirstFailure>,
    pool: Arc<ThreadPool>,
}

impl StageContext {
    pub(crate) fn new(
        stage: &str,
        token: CancellationToken,
        failure: Arc<FirstFailure>,
        pool: Arc<ThreadPool>,
    ) -> Self {
        Self {
            stage: stage.to_string(),
            token,
            failure,
            pool,
        }
    }

    /// Name of the stage this context belongs to
    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Record a failure for this run and cancel it.
    ///
    /// Only the first failure of a run is kept and returned to the caller.
    pub fn fail(&self, error: impl Into<SignerError>) {
        self.failure.record(&self.stage, error.into(), &self.token);
    }

    /// Run `task` on every input item in parallel and send each result
    /// downstream in completion order.
    ///
    /// Returns once the input is exhausted and every spawned task has
    /// finished. A task error or panic fails the run; tasks that start
    /// after cancellation are skipped.
    pub fn fan_out<T, F>(&self, input: StageInput<T>, output: &StageOutput<T>, task: F)
    where
        T: Send,
        F: Fn(T) -> Result<T> + Sync,
    {
        let task = &task;
        self.pool.in_place_scope(|scope| {
            for item in input {
                scope.spawn(move |_| {
                    if self.is_cancelled() {
                        return;
                    }
                    match panic::catch_unwind(AssertUnwindSafe(|| task(item))) {
                        Ok(Ok(result)) => {
                            if !output.send(result) {
                                trace!(stage = %self.stage, "Downstream closed, result dropped");
                            }
                        }
                        Ok(Err(error)) => self.fail(error),
                        Err(_) => self.fail(PipelineError::StagePanicked {
                            stage: self.stage.clone(),
                        }),
                    }
                });
            }
        });
    }
}

/// A stage built from a closure
pub struct StageFn<F> {
    name: String,
    run: F,
}

/// Wrap a closure as a named [`Stage`]
pub fn stage_fn<T, F>(name: impl Into<String>, run: F) -> StageFn<F>
where
    F: Fn(StageInput<T>, StageOutput<T>, &StageContext) -> Result<()> + Send + Sync,
{
    StageFn {
        name: name.into(),
        run,
    }
}

impl<T, F> Stage<T> for StageFn<F>
where
    F: Fn(StageInput<T>, StageOutput<T>, &StageContext) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, input: StageInput<T>, output: StageOutput<T>, ctx: &StageContext) -> Result<()> {
        (self.run)(input, output, ctx)
    }
}
