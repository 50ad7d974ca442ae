//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};

/// All events emitted by a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started { stages: Vec<String> },
    /// A stage worker began consuming its input
    StageStarted { stage: String },
    /// A stage worker finished and closed its output
    StageCompleted { stage: String, items_out: usize },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline was cancelled
    Cancelled,
    /// Pipeline encountered a fatal error
    Error { message: String },
}

impl PipelineEvent {
    /// Per-stage progress, as opposed to events that open or close a run
    pub fn is_progress(&self) -> bool {
        matches!(
            self,
            PipelineEvent::StageStarted { .. } | PipelineEvent::StageCompleted { .. }
        )
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Number of stages in the pipeline
    pub stages: usize,
    /// Seed items fed into the first stage
    pub items_in: usize,
    /// Items produced by the last stage
    pub items_out: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}
