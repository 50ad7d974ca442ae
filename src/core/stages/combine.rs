//! Final signer stage: sort all results and join them.

use super::Datum;
use crate::core::pipeline::{Stage, StageContext, StageInput, StageOutput};
use crate::error::Result;
use tracing::debug;

/// Separator between the sorted per-item results
pub const COMBINE_SEPARATOR: &str = "_";

/// Collects every incoming string, sorts them byte-wise ascending and
/// emits a single `_`-joined string. Empty input produces `""`.
#[derive(Debug, Default)]
pub struct CombineResults;

impl CombineResults {
    pub const NAME: &'static str = "CombineResults";

    pub fn new() -> Self {
        Self
    }

    /// Sort and join a finished set of results
    pub fn combine(mut parts: Vec<String>) -> String {
        parts.sort_unstable();
        parts.join(COMBINE_SEPARATOR)
    }
}

impl Stage<Datum> for CombineResults {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(
        &self,
        input: StageInput<Datum>,
        output: StageOutput<Datum>,
        ctx: &StageContext,
    ) -> Result<()> {
        let mut parts = Vec::new();
        for item in input {
            parts.push(item.into_text(Self::NAME)?);
        }

        if ctx.is_cancelled() {
            return Ok(());
        }

        debug!(parts = parts.len(), "Combining results");
        output.send(Datum::Text(Self::combine(parts)));
        Ok(())
    }
}
