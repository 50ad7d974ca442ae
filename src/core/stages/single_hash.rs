//! First signer stage: `checksum(data) ~ checksum(digest(data))`.

use super::Datum;
use crate::core::hasher::DataSigner;
use crate::core::pipeline::{Stage, StageContext, StageInput, StageOutput};
use crate::error::{HashError, Result};
use std::sync::{Arc, Mutex};
use tracing::trace;

/// Hashes each item in its own task.
///
/// The plain checksum runs concurrently with the digest branch. Digest
/// calls from all tasks go through one lock owned by the stage, held for
/// the digest call only.
pub struct SingleHash {
    signer: Arc<dyn DataSigner>,
    digest_lock: Mutex<()>,
}

impl SingleHash {
    pub const NAME: &'static str = "SingleHash";

    pub fn new(signer: Arc<dyn DataSigner>) -> Self {
        Self {
            signer,
            digest_lock: Mutex::new(()),
        }
    }

    /// Hash a single value
    pub fn hash(&self, data: &str) -> Result<String> {
        let (plain, digested) = rayon::join(
            || self.signer.checksum(data),
            || -> std::result::Result<String, HashError> {
                let digest = {
                    let _guard = self.digest_lock.lock().map_err(|_| HashError::LockPoisoned)?;
                    self.signer.digest(data)?
                };
                self.signer.checksum(&digest)
            },
        );

        let result = format!("{}~{}", plain?, digested?);
        trace!(data, result = %result, "SingleHash");
        Ok(result)
    }
}

impl Stage<Datum> for SingleHash {
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
            self.hash(&item.to_string()).map(Datum::Text)
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::mock::MockSigner;
    use crate::core::hasher::StandardSigner;
    use crate::core::pipeline::Pipeline;
    use crate::error::{PipelineError, SignerError};
    use std::panic::{self, AssertUnwindSafe};
    use std::time::Duration;

    #[test]
    fn composite_uses_tilde_separator() {
        let stage = SingleHash::new(Arc::new(MockSigner::new()));
        assert_eq!(stage.hash("0").unwrap(), "c(0)~c(d(0))");
    }

    #[test]
    fn real_primitives_match_known_vector() {
        let stage = SingleHash::new(Arc::new(StandardSigner::default()));
        assert_eq!(stage.hash("0").unwrap(), "4108050209~502633748");
    }

    #[test]
    fn repeated_runs_are_identical() {
        let signer = Arc::new(MockSigner::new());
        let first = SingleHash::new(signer.clone()).hash("17").unwrap();
        let second = SingleHash::new(signer).hash("17").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn numbers_are_hashed_by_decimal_form() {
        let pipeline = Pipeline::builder()
            .stage(SingleHash::new(Arc::new(MockSigner::new())))
            .build()
            .unwrap();

        let mut outputs = pipeline
            .execute(vec![Datum::Number(3), Datum::from("x")])
            .unwrap();
        outputs.sort_by_key(|d| d.to_string());

        assert_eq!(
            outputs,
            vec![
                Datum::from("c(3)~c(d(3))"),
                Datum::from("c(x)~c(d(x))"),
            ]
        );
    }

    #[test]
    fn digest_calls_never_overlap() {
        let signer = Arc::new(MockSigner::new().digest_delay(Duration::from_millis(2)));
        let pipeline = Pipeline::builder()
            .stage(SingleHash::new(signer.clone()))
            .workers(16)
            .build()
            .unwrap();

        let outputs = pipeline.execute((0..64).map(Datum::Number)).unwrap();
        assert_eq!(outputs.len(), 64);
        assert_eq!(signer.max_active_digests(), 1);

        let mut intervals = signer.digest_intervals();
        intervals.sort_by_key(|(start, _)| *start);
        for pair in intervals.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "digest intervals overlap");
        }
    }

    #[test]
    fn standard_signer_never_overheats_in_pipeline() {
        let signer = Arc::new(StandardSigner::default());
        let pipeline = Pipeline::builder()
            .stage(SingleHash::new(signer.clone()))
            .workers(8)
            .build()
            .unwrap();

        pipeline.execute((0..200).map(Datum::Number)).unwrap();

        let stats = signer.live_stats().snapshot();
        assert_eq!(stats.overheats, 0);
        assert_eq!(stats.digest_calls, 200);
        assert_eq!(stats.checksum_calls, 400);
    }

    #[test]
    fn checksum_failure_fails_the_run() {
        let signer = Arc::new(MockSigner::new().fail_on("5"));
        let pipeline = Pipeline::builder()
            .stage(SingleHash::new(signer))
            .build()
            .unwrap();

        let result = pipeline.execute((0..10).map(Datum::Number));
        assert!(matches!(
            result,
            Err(SignerError::Hash(HashError::ComputationFailed(_)))
        ));
    }

    #[test]
    fn digest_panic_poisons_the_lock() {
        let stage = SingleHash::new(Arc::new(MockSigner::new().panic_on_digest("3")));

        let panicked = panic::catch_unwind(AssertUnwindSafe(|| stage.hash("3")));
        assert!(panicked.is_err());

        assert!(matches!(
            stage.hash("1"),
            Err(SignerError::Hash(HashError::LockPoisoned))
        ));
    }

    #[test]
    fn digest_panic_ends_the_run_with_an_error() {
        let pipeline = Pipeline::builder()
            .stage(SingleHash::new(Arc::new(
                MockSigner::new().panic_on_digest("3"),
            )))
            .workers(4)
            .build()
            .unwrap();

        // Whichever task notices first wins: the panicking one or a later
        // one finding the lock poisoned
        let result = pipeline.execute((0..20).map(Datum::Number));
        assert!(
            matches!(
                result,
                Err(SignerError::Pipeline(PipelineError::StagePanicked { .. }))
                    | Err(SignerError::Hash(HashError::LockPoisoned))
            ),
            "unexpected result: {result:?}"
        );
    }
}
