//! Core library for the docsum summary tool
//!
//! A run streams every input file through its own worker, collects the
//! per-run partial aggregates, sorts them by document number and writes one
//! combined row per key.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod config_file;
pub mod decompression;
pub mod error;
pub mod filter;
pub mod merge;
pub mod output;
pub mod parallel;
pub mod platform;
pub mod record;
pub mod sort;
pub mod stats;

use std::io::Write;

pub use aggregate::{Aggregate, RunningAggregator, ValueStats};
pub use config::{MergeStrategy, OutputTarget, RunConfig, ValueProfile};
pub use error::{DecodeError, PipelineError};
pub use filter::{Filter, Party};
pub use stats::{FileStats, ProcessingStats};

use output::{combine_and_write, open_output, SummaryWriter};
use parallel::{ParallelConfig, ParallelProcessor};
use record::LineParser;

/// What a successful run reports back
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: ProcessingStats,
    /// Per-file counters in input order
    pub files: Vec<FileStats>,
}

/// Run the whole pipeline and write the summary to the configured target.
///
/// The output is only created once every input has been read successfully,
/// so a failed run leaves no output file behind.
pub fn run(config: &RunConfig) -> Result<RunReport, PipelineError> {
    let (sorted, mut report) = collect(config)?;

    let output = open_output(&config.output.target).map_err(|source| {
        PipelineError::CreateOutput {
            target: config.output.target.to_string(),
            source,
        }
    })?;
    write_summary(config, sorted, output, &mut report)?;
    Ok(report)
}

/// Run the pipeline and write the summary into `writer`
pub fn summarize_into<W: Write>(config: &RunConfig, writer: W) -> Result<RunReport, PipelineError> {
    let (sorted, mut report) = collect(config)?;
    write_summary(config, sorted, writer, &mut report)?;
    Ok(report)
}

fn collect(config: &RunConfig) -> Result<(Vec<Aggregate>, RunReport), PipelineError> {
    let parser = LineParser::from_config(config);
    let processor = ParallelProcessor::new(ParallelConfig::from_config(config));
    let outcome = processor.process(&config.input.files, &parser, config.processing.verbose)?;

    let report = RunReport {
        stats: outcome.stats,
        files: outcome.files,
    };
    Ok((outcome.collected.into_sorted(), report))
}

fn write_summary<W: Write>(
    config: &RunConfig,
    sorted: Vec<Aggregate>,
    writer: W,
    report: &mut RunReport,
) -> Result<(), PipelineError> {
    let mut summary = SummaryWriter::new(writer, config.output.separator, config.input.values);
    summary.write_header()?;
    report.stats.keys_written = combine_and_write(sorted, &mut summary)?;
    summary.flush()
}
