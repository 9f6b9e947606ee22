//! File worker thread
//!
//! Each worker streams one file line by line through its own [`LineParser`]
//! and [`RunningAggregator`]. A partial is sent to the collector whenever
//! the key changes and once more at end of file, so a worker holds at most
//! one aggregate at a time.

use crossbeam_channel::Sender;
use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::aggregate::{Aggregate, RunningAggregator};
use crate::config::format_warning_message;
use crate::decompression::open_input;
use crate::error::PipelineError;
use crate::record::{trim_line_end, Fields, LineParser};
use crate::stats::{FileStats, ProcessingStats};

use super::types::{FileJob, Permits};

pub(crate) struct WorkerContext {
    pub parser: LineParser,
    pub partials: Sender<Aggregate>,
    pub abort: Arc<AtomicBool>,
    pub verbose: u8,
}

/// Worker thread: waits for a permit when the run is capped, then
/// processes its file. A failure raises the shared abort flag.
pub(crate) fn worker_thread(
    job: FileJob,
    ctx: WorkerContext,
    permits: Option<Permits>,
) -> Result<(usize, FileStats), PipelineError> {
    let _permit = permits.as_ref().and_then(Permits::acquire);
    if ctx.abort.load(Ordering::Relaxed) {
        return Err(PipelineError::Aborted);
    }

    match process_file(&job.path, &ctx) {
        Ok(stats) => Ok((
            job.index,
            FileStats {
                path: job.path,
                stats,
            },
        )),
        Err(err) => {
            ctx.abort.store(true, Ordering::Relaxed);
            Err(err)
        }
    }
}

/// Stream one file into partials
pub(crate) fn process_file(path: &Path, ctx: &WorkerContext) -> Result<ProcessingStats, PipelineError> {
    let start = Instant::now();
    let mut reader = open_input(path).map_err(|source| PipelineError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut stats = ProcessingStats {
        files_processed: 1,
        ..ProcessingStats::default()
    };
    let mut running = RunningAggregator::new();
    let mut fields = Fields::new();
    let mut buf: Vec<u8> = Vec::with_capacity(512);

    // Line 1 is the header
    let mut line_number: u64 = 1;
    read_line(&mut reader, &mut buf, path, line_number)?;

    loop {
        if ctx.abort.load(Ordering::Relaxed) {
            return Err(PipelineError::Aborted);
        }

        buf.clear();
        if read_line(&mut reader, &mut buf, path, line_number)? == 0 {
            break;
        }
        line_number += 1;
        stats.lines_read += 1;

        if trim_line_end(&buf).trim_ascii().is_empty() {
            stats.blank_lines += 1;
            continue;
        }

        let parsed = ctx
            .parser
            .parse(&mut buf, &mut fields)
            .map_err(|source| PipelineError::Decode {
                path: path.to_path_buf(),
                line: line_number,
                source,
            })?;

        if !parsed.complete {
            stats.malformed_lines += 1;
            if ctx.verbose >= 2 {
                eprintln!(
                    "{}",
                    format_warning_message(&format!(
                        "{}:{}: line has only {} fields, missing values default to 0",
                        path.display(),
                        line_number,
                        fields.columns_seen()
                    ))
                );
            }
        }
        if parsed.key_defaulted {
            stats.unparsable_keys += 1;
            if ctx.verbose >= 2 {
                eprintln!(
                    "{}",
                    format_warning_message(&format!(
                        "{}:{}: unparsable document number, grouped under 0",
                        path.display(),
                        line_number
                    ))
                );
            }
        }

        if !parsed.accepted {
            stats.records_filtered += 1;
            continue;
        }

        stats.records_aggregated += 1;
        if let Some(partial) = running.push(&parsed.record) {
            emit(ctx, partial, &mut stats)?;
        }
    }

    if let Some(partial) = running.finish() {
        emit(ctx, partial, &mut stats)?;
    }

    stats.processing_time = start.elapsed();
    Ok(stats)
}

fn read_line<R: BufRead>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    path: &Path,
    line: u64,
) -> Result<usize, PipelineError> {
    reader
        .read_until(b'\n', buf)
        .map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            line,
            source,
        })
}

/// Hand a partial to the collector. A closed channel means the run is over.
fn emit(ctx: &WorkerContext, partial: Aggregate, stats: &mut ProcessingStats) -> Result<(), PipelineError> {
    ctx.partials
        .send(partial)
        .map_err(|_| PipelineError::Aborted)?;
    stats.partials_emitted += 1;
    Ok(())
}
