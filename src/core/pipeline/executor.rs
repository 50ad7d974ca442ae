//! Pipeline execution implementation.

use super::stage::FirstFailure;
use super::{CancellationToken, PipelineConfig, Stage, StageContext, StageInput, StageOutput};
use crate::error::{PipelineError, Result};
use crate::events::{null_sender, Event, EventSender, PipelineEvent, PipelineSummary};
use crossbeam_channel::bounded;
use rayon::ThreadPoolBuilder;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

/// Builder for pipeline configuration
pub struct PipelineBuilder<T> {
    stages: Vec<Box<dyn Stage<T>>>,
    config: PipelineConfig,
    token: Option<CancellationToken>,
}

impl<T: Send + 'static> PipelineBuilder<T> {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            config: PipelineConfig::default(),
            token: None,
        }
    }

    /// Append a stage
    pub fn stage<S: Stage<T> + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Set the whole configuration
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the inter-stage queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the worker pool size
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = Some(workers);
        self
    }

    /// Let the caller cancel runs of this pipeline
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<Pipeline<T>> {
        let mut pipeline = Pipeline::new(self.stages, self.config)?;
        if let Some(token) = self.token {
            pipeline.token = token;
        }
        Ok(pipeline)
    }
}

impl<T: Send + 'static> Default for PipelineBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// An ordered, non-empty list of stages connected by bounded queues
pub struct Pipeline<T> {
    stages: Vec<Box<dyn Stage<T>>>,
    config: PipelineConfig,
    token: CancellationToken,
}

impl<T: Send + 'static> Pipeline<T> {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder<T> {
        PipelineBuilder::new()
    }

    /// Create a pipeline from a prepared stage list.
    ///
    /// Fails before anything is spawned if the list is empty or the
    /// configuration is invalid.
    pub fn new(stages: Vec<Box<dyn Stage<T>>>, config: PipelineConfig) -> Result<Self> {
        if stages.is_empty() {
            return Err(PipelineError::NoStages.into());
        }
        config.validate()?;

        Ok(Self {
            stages,
            config,
            token: CancellationToken::new(),
        })
    }

    /// Names of the stages, in order
    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|stage| stage.name().to_string()).collect()
    }

    /// Validated configuration used by every run
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Token that cancels every run of this pipeline
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Run the pipeline without events
    pub fn execute(&self, seed: impl IntoIterator<Item = T>) -> Result<Vec<T>> {
        self.execute_with_events(seed, &null_sender())
    }

    /// Feed `seed` into the first stage and block until every stage has
    /// finished. Returns everything the last stage produced.
    pub fn execute_with_events(
        &self,
        seed: impl IntoIterator<Item = T>,
        events: &EventSender,
    ) -> Result<Vec<T>> {
        let start_time = Instant::now();
        let seed: Vec<T> = seed.into_iter().collect();
        let stage_names = self.stage_names();

        info!(stages = ?stage_names, items = seed.len(), "Pipeline starting");
        events.send(Event::Pipeline(PipelineEvent::Started {
            stages: stage_names.clone(),
        }));

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.workers.unwrap_or(0))
            .thread_name(|index| format!("signer-worker-{index}"))
            .build()
            .map_err(|e| PipelineError::ThreadPool(e.to_string()))?;
        let pool = Arc::new(pool);

        // Cancelling a run must not cancel the caller's token
        let token = self.token.child_token();
        let failure = Arc::new(FirstFailure::default());
        let capacity = self.config.queue_capacity;
        let items_in = AtomicUsize::new(0);

        let outputs = thread::scope(|scope| {
            let (seed_tx, mut upstream) = bounded::<T>(capacity);

            let feeder_token = token.clone();
            let items_in = &items_in;
            let feeder = thread::Builder::new()
                .name("pipeline-feeder".to_string())
                .spawn_scoped(scope, move || {
                    for item in seed {
                        if feeder_token.is_cancelled() || seed_tx.send(item).is_err() {
                            break;
                        }
                        items_in.fetch_add(1, Ordering::Relaxed);
                    }
                });
            if let Err(e) = &feeder {
                failure.record(
                    "feeder",
                    PipelineError::SpawnFailed {
                        stage: "feeder".to_string(),
                        reason: e.to_string(),
                    }
                    .into(),
                    &token,
                );
            }

            let mut workers = Vec::with_capacity(self.stages.len());
            for (index, stage) in self.stages.iter().enumerate() {
                let name = stage.name().to_string();
                let (tx, rx) = bounded::<T>(capacity);
                let input = StageInput::new(std::mem::replace(&mut upstream, rx), token.clone());
                let output = StageOutput::new(tx);
                let ctx = StageContext::new(&name, token.clone(), Arc::clone(&failure), Arc::clone(&pool));
                let events = events.clone();

                let spawned = thread::Builder::new()
                    .name(format!("stage-{index}-{name}"))
                    .spawn_scoped(scope, move || {
                        debug!(stage = ctx.stage(), "Stage started");
                        events.send(Event::Pipeline(PipelineEvent::StageStarted {
                            stage: ctx.stage().to_string(),
                        }));

                        let sent = output.counter();
                        if let Err(error) = stage.run(input, output, &ctx) {
                            ctx.fail(error);
                        }

                        let items_out = sent.load(Ordering::Relaxed);
                        debug!(stage = ctx.stage(), items_out, "Stage finished");
                        events.send(Event::Pipeline(PipelineEvent::StageCompleted {
                            stage: ctx.stage().to_string(),
                            items_out,
                        }));
                    });

                match spawned {
                    Ok(handle) => workers.push((name, handle)),
                    Err(e) => failure.record(
                        &name,
                        PipelineError::SpawnFailed {
                            stage: name.clone(),
                            reason: e.to_string(),
                        }
                        .into(),
                        &token,
                    ),
                }
            }

            // The caller drains the last queue while the stages run
            let outputs: Vec<T> = upstream.iter().collect();

            if let Ok(feeder) = feeder {
                // The feeder only sends, it has nothing to report
                let _ = feeder.join();
            }
            for (name, handle) in workers {
                if handle.join().is_err() {
                    failure.record(
                        &name,
                        PipelineError::StagePanicked {
                            stage: name.clone(),
                        }
                        .into(),
                        &token,
                    );
                }
            }

            outputs
        });

        let duration_ms = start_time.elapsed().as_millis() as u64;

        if let Some(error) = failure.take() {
            events.send(Event::Pipeline(PipelineEvent::Error {
                message: error.to_string(),
            }));
            return Err(error);
        }

        if token.is_cancelled() {
            info!(duration_ms, "Pipeline cancelled");
            events.send(Event::Pipeline(PipelineEvent::Cancelled));
            return Err(PipelineError::Cancelled.into());
        }

        let summary = PipelineSummary {
            stages: stage_names.len(),
            items_in: items_in.load(Ordering::Relaxed),
            items_out: outputs.len(),
            duration_ms,
        };
        info!(
            items_in = summary.items_in,
            items_out = summary.items_out,
            duration_ms,
            "Pipeline completed"
        );
        events.send(Event::Pipeline(PipelineEvent::Completed { summary }));

        Ok(outputs)
    }
}
