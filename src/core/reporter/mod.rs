//! # Reporter Module
//!
//! Serializable record of a signing run, for scripting and archiving.
//!
//! ## Example
//! ```rust,ignore
//! let result = pipeline.run(items.clone())?;
//! let report = SignatureReport::new(&items, &result);
//! write_json(&report, Path::new("signature.json"))?;
//! ```

use crate::core::hasher::SignerStatsSnapshot;
use crate::core::signer::SignatureResult;
use crate::core::stages::Datum;
use crate::error::ReportError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use uuid::Uuid;

/// A finished signing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureReport {
    /// Unique id of this run
    pub run_id: Uuid,
    /// When the report was generated
    pub generated_at: DateTime<Utc>,
    /// Input items, rendered as strings
    pub inputs: Vec<String>,
    /// The combined signature
    pub signature: String,
    /// Number of `_`-separated parts in the signature
    pub parts: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Primitive call counters, when available
    pub stats: Option<SignerStatsSnapshot>,
}

impl SignatureReport {
    pub fn new(inputs: &[Datum], result: &SignatureResult) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            inputs: inputs.iter().map(|d| d.to_string()).collect(),
            signature: result.signature.clone(),
            parts: result.parts().len(),
            duration_ms: result.duration_ms,
            stats: result.stats,
        }
    }
}

/// Write a report as pretty-printed JSON
pub fn export_json<W: Write>(report: &SignatureReport, mut writer: W) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut writer, report).map_err(|e| {
        if e.is_io() {
            ReportError::Write(e.into())
        } else {
            ReportError::Serialization(e.to_string())
        }
    })?;
    writeln!(writer).map_err(ReportError::Write)
}

/// Write a report as JSON to `path`, replacing any existing file
pub fn write_json(report: &SignatureReport, path: &Path) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    export_json(report, &mut writer).map_err(|error| match error {
        ReportError::Write(source) => ReportError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    writer.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_result() -> SignatureResult {
        SignatureResult {
            signature: "a_b".to_string(),
            item_count: 2,
            duration_ms: 12,
            stats: Some(SignerStatsSnapshot {
                digest_calls: 2,
                checksum_calls: 16,
                overheats: 0,
            }),
        }
    }

    #[test]
    fn report_counts_parts() {
        let inputs = vec![Datum::Number(0), Datum::from("x")];
        let report = SignatureReport::new(&inputs, &sample_result());

        assert_eq!(report.inputs, vec!["0", "x"]);
        assert_eq!(report.parts, 2);
    }

    #[test]
    fn export_produces_parseable_json() {
        let report = SignatureReport::new(&[Datum::Number(1)], &sample_result());
        let mut buffer = Vec::new();
        export_json(&report, &mut buffer).unwrap();

        let parsed: SignatureReport = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed.run_id, report.run_id);
        assert_eq!(parsed.signature, "a_b");
        assert_eq!(parsed.stats.unwrap().checksum_calls, 16);
    }

    #[test]
    fn write_json_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("signature.json");
        let report = SignatureReport::new(&[], &sample_result());

        write_json(&report, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"signature\": \"a_b\""));
    }

    #[test]
    fn write_json_reports_bad_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("signature.json");
        let report = SignatureReport::new(&[], &sample_result());

        match write_json(&report, &path) {
            Err(ReportError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    /// Writer whose storage is always full
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writer_failure_is_an_io_error() {
        let report = SignatureReport::new(&[], &sample_result());

        match export_json(&report, FullDisk) {
            Err(ReportError::Write(source)) => {
                assert_eq!(source.kind(), std::io::ErrorKind::WriteZero)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
