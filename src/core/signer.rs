//! The assembled signer: SingleHash → MultiHash → CombineResults.

use crate::core::hasher::{DataSigner, SignerStatsSnapshot, StandardSigner};
use crate::core::pipeline::{CancellationToken, Pipeline, PipelineConfig};
use crate::core::stages::{CombineResults, Datum, MultiHash, SingleHash, COMBINE_SEPARATOR};
use crate::error::Result;
use crate::events::{null_sender, EventSender};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Result of signing a batch of items
#[derive(Debug, Clone)]
pub struct SignatureResult {
    /// The combined signature
    pub signature: String,
    /// Number of input items
    pub item_count: usize,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Primitive calls made during this run, if the signer counts them
    pub stats: Option<SignerStatsSnapshot>,
}

impl SignatureResult {
    /// The per-item results, in sorted order
    pub fn parts(&self) -> Vec<&str> {
        if self.signature.is_empty() {
            Vec::new()
        } else {
            self.signature.split(COMBINE_SEPARATOR).collect()
        }
    }
}

/// Builder for [`SignerPipeline`]
#[derive(Default)]
pub struct SignerPipelineBuilder {
    signer: Option<Arc<dyn DataSigner>>,
    config: PipelineConfig,
    token: Option<CancellationToken>,
}

impl SignerPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hash primitives (defaults to [`StandardSigner`])
    pub fn signer(mut self, signer: Arc<dyn DataSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Set the pipeline configuration
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Let the caller cancel signing runs
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Build the signer pipeline
    pub fn build(self) -> Result<SignerPipeline> {
        let signer = self
            .signer
            .unwrap_or_else(|| Arc::new(StandardSigner::default()));

        let mut builder = Pipeline::builder()
            .stage(SingleHash::new(Arc::clone(&signer)))
            .stage(MultiHash::new(Arc::clone(&signer)))
            .stage(CombineResults::new())
            .config(self.config);
        if let Some(token) = self.token {
            builder = builder.cancellation_token(token);
        }

        Ok(SignerPipeline {
            pipeline: builder.build()?,
            signer,
        })
    }
}

/// Computes the combined signature of a sequence of items
pub struct SignerPipeline {
    pipeline: Pipeline<Datum>,
    signer: Arc<dyn DataSigner>,
}

impl SignerPipeline {
    /// Create a new builder
    pub fn builder() -> SignerPipelineBuilder {
        SignerPipelineBuilder::new()
    }

    pub fn pipeline(&self) -> &Pipeline<Datum> {
        &self.pipeline
    }

    /// Sign without events
    pub fn run<I, D>(&self, items: I) -> Result<SignatureResult>
    where
        I: IntoIterator<Item = D>,
        D: Into<Datum>,
    {
        self.run_with_events(items, &null_sender())
    }

    /// Sign with event reporting
    pub fn run_with_events<I, D>(&self, items: I, events: &EventSender) -> Result<SignatureResult>
    where
        I: IntoIterator<Item = D>,
        D: Into<Datum>,
    {
        let start_time = Instant::now();
        let items: Vec<Datum> = items.into_iter().map(Into::into).collect();
        let item_count = items.len();
        let stats_before = self.signer.stats();

        let outputs = self.pipeline.execute_with_events(items, events)?;
        // CombineResults emits exactly one string on a completed run
        let signature = outputs
            .into_iter()
            .next()
            .map(|datum| datum.to_string())
            .unwrap_or_default();

        let stats = match (self.signer.stats(), stats_before) {
            (Some(after), Some(before)) => Some(after.since(&before)),
            (after, _) => after,
        };

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(item_count, duration_ms, "Signature computed");

        Ok(SignatureResult {
            signature,
            item_count,
            duration_ms,
            stats,
        })
    }
}
