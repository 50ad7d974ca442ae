//! # CLI Module
//!
//! Command-line interface for the signer pipeline.
//!
//! ## Usage
//! ```bash
//! # Sign a list of items
//! signer run 0 1 1 2 3 5 8
//!
//! # Sign 0..100 with simulated slow primitives
//! signer run --count 100 --checksum-latency-ms 1000 --digest-latency-ms 10 --workers 512
//!
//! # JSON output, plus a report file
//! signer run 0 1 2 --output json --report signature.json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use signer_pipeline::core::hasher::{ChecksumAlgorithm, SignerConfig};
use signer_pipeline::core::pipeline::{PipelineConfig, DEFAULT_QUEUE_CAPACITY};
use signer_pipeline::core::reporter::{write_json, SignatureReport};
use signer_pipeline::core::signer::{SignatureResult, SignerPipeline};
use signer_pipeline::core::stages::Datum;
use signer_pipeline::error::{ReportError, Result};
use signer_pipeline::events::{Event, EventChannel, PipelineEvent};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Undelivered events the spinner may lag behind by
const EVENT_BUFFER: usize = 64;

/// Signer - concurrent composite hashing
#[derive(Parser, Debug)]
#[command(name = "signer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the combined signature of a list of items
    Run {
        /// Items to sign, hashed exactly as typed
        #[arg(required_unless_present = "count")]
        items: Vec<String>,

        /// Sign the integers 0..COUNT instead of explicit items
        #[arg(long, conflicts_with = "items")]
        count: Option<u32>,

        /// Worker pool size (default: one per CPU)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Capacity of the queues between stages
        #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
        queue_capacity: usize,

        /// Checksum algorithm
        #[arg(short, long, default_value = "crc32")]
        checksum: Checksum,

        /// Artificial delay per checksum call, in milliseconds
        #[arg(long, default_value_t = 0)]
        checksum_latency_ms: u64,

        /// Artificial delay per digest call, in milliseconds
        #[arg(long, default_value_t = 0)]
        digest_latency_ms: u64,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Also write a JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Checksum {
    Crc32,
    Xxh3,
}

impl From<Checksum> for ChecksumAlgorithm {
    fn from(checksum: Checksum) -> Self {
        match checksum {
            Checksum::Crc32 => ChecksumAlgorithm::Crc32,
            Checksum::Xxh3 => ChecksumAlgorithm::Xxh3,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// The signature only
    Minimal,
}

/// Options for one `run` invocation
struct RunOptions {
    items: Vec<Datum>,
    pipeline: PipelineConfig,
    signer: SignerConfig,
    output: OutputFormat,
    report: Option<PathBuf>,
    verbose: bool,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            items,
            count,
            workers,
            queue_capacity,
            checksum,
            checksum_latency_ms,
            digest_latency_ms,
            output,
            report,
            verbose,
        } => {
            let items = match count {
                Some(count) => (0..i64::from(count)).map(Datum::Number).collect(),
                None => items.iter().map(|raw| Datum::parse(raw)).collect(),
            };

            let mut pipeline = PipelineConfig::new().queue_capacity(queue_capacity);
            if let Some(workers) = workers {
                pipeline = pipeline.workers(workers);
            }

            let signer = SignerConfig::new()
                .checksum(checksum.into())
                .checksum_latency(Duration::from_millis(checksum_latency_ms))
                .digest_latency(Duration::from_millis(digest_latency_ms));

            run_signer(RunOptions {
                items,
                pipeline,
                signer,
                output,
                report,
                verbose,
            })
        }
    }
}

fn run_signer(options: RunOptions) -> Result<()> {
    let term = Term::stderr();

    if matches!(options.output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Signer").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let signer = options.signer.build();
    let algorithm = signer.algorithm();
    let pipeline = SignerPipeline::builder()
        .signer(Arc::new(signer))
        .config(options.pipeline)
        .build()?;

    if options.verbose && matches!(options.output, OutputFormat::Pretty) {
        let config = pipeline.pipeline().config();
        let workers = config
            .workers
            .map_or_else(|| "one per CPU".to_string(), |n| n.to_string());
        term.write_line(&format!(
            "  {} {}",
            style("Stages:").dim(),
            pipeline.pipeline().stage_names().join(" → ")
        ))
        .ok();
        term.write_line(&format!("  {} {}", style("Checksum:").dim(), algorithm.description()))
            .ok();
        term.write_line(&format!(
            "  {} {} workers, queue capacity {}",
            style("Pool:").dim(),
            workers,
            config.queue_capacity
        ))
        .ok();
        term.write_line("").ok();
    }

    // Hashing never waits on the spinner; stage progress may be skipped
    let (sender, receiver) = EventChannel::bounded(EVENT_BUFFER);

    let progress = if matches!(options.output, OutputFormat::Pretty) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = options.verbose;

    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress_clone.as_ref() else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::StageStarted { stage }) => {
                    if verbose {
                        pb.println(format!("  {} {}", style("→").dim(), stage));
                    }
                }
                Event::Pipeline(PipelineEvent::StageCompleted { stage, items_out }) => {
                    pb.set_message(format!("{stage} done ({items_out} items)"));
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Cancelled)
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                Event::Pipeline(PipelineEvent::Started { .. }) => {
                    pb.set_message("Hashing");
                }
            }
        }
    });

    let result = pipeline.run_with_events(options.items.clone(), &sender);

    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    let result = result?;

    let report = SignatureReport::new(&options.items, &result);
    if let Some(path) = &options.report {
        write_json(&report, path)?;
    }

    match options.output {
        OutputFormat::Pretty => print_pretty_results(&term, &result, options.verbose),
        OutputFormat::Json => print_json_results(&report)?,
        OutputFormat::Minimal => println!("{}", result.signature),
    }

    Ok(())
}

fn print_pretty_results(term: &Term, result: &SignatureResult, verbose: bool) {
    term.write_line(&format!("{} Signature computed", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} items signed in {:.2}s",
        style(result.item_count).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();

    if let Some(stats) = &result.stats {
        term.write_line(&format!(
            "  {} digest calls, {} checksum calls",
            style(stats.digest_calls).cyan(),
            style(stats.checksum_calls).cyan()
        ))
        .ok();
        if stats.overheats > 0 {
            term.write_line(&format!(
                "  {} overlapping digest calls",
                style(stats.overheats).red()
            ))
            .ok();
        }
    }

    term.write_line("").ok();

    if verbose {
        for (i, part) in result.parts().iter().enumerate() {
            term.write_line(&format!("  {} {}", style(format!("{:>3}.", i + 1)).dim(), part))
                .ok();
        }
        term.write_line("").ok();
    }

    // The signature goes to stdout so it can be piped
    println!("{}", result.signature);
}

fn print_json_results(report: &SignatureReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| ReportError::Serialization(e.to_string()))?;
    println!("{json}");
    Ok(())
}
