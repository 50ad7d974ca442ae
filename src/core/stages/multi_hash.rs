//! Second signer stage: six indexed checksums per item.

use super::Datum;
use crate::core::hasher::DataSigner;
use crate::core::pipeline::{Stage, StageContext, StageInput, StageOutput};
use crate::error::Result;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::trace;

/// Number of indexed checksums concatenated per item
pub const MULTI_HASH_ROUNDS: usize = 6;

/// For each item, concatenates `checksum(i + data)` for `i` in `0..6`.
///
/// The six checksums run in parallel; the result is always concatenated
/// in index order, whatever order they finish in.
pub struct MultiHash {
    signer: Arc<dyn DataSigner>,
}

impl MultiHash {
    pub const NAME: &'static str = "MultiHash";

    pub fn new(signer: Arc<dyn DataSigner>) -> Self {
        Self { signer }
    }

    /// Hash a single value
    pub fn hash(&self, data: &str) -> Result<String> {
        // Indexed collect keeps the parts in round order
        let parts = (0..MULTI_HASH_ROUNDS)
            .into_par_iter()
            .map(|round| self.signer.checksum(&format!("{round}{data}")))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let result = parts.concat();
        trace!(data, result = %result, "MultiHash");
        Ok(result)
    }
}

impl Stage<Datum> for MultiHash {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(
        &self,
        input: StageInput<Datum>,
        output: StageOutput<Datum>,
        ctx: &StageContext,
    ) -> Result<()> {
        ctx.fan_out(input, &output, |item| {
            let data = item.into_text(Self::NAME)?;
            self.hash(&data).map(Datum::Text)
        });
        Ok(())
    }
}
