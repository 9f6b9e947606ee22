//! Main parallel processor orchestration
//!
//! Starts one worker thread per input file and funnels their partials into
//! a single collector thread over a rendezvous channel. With a worker cap,
//! workers take a permit before opening their file.

use crossbeam_channel::bounded;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crate::error::PipelineError;
use crate::record::LineParser;
use crate::stats::{FileStats, ProcessingStats};

use super::collector::collector_thread;
use super::types::{CollectionOutcome, FileJob, ParallelConfig, Permits};
use super::worker::{worker_thread, WorkerContext};

const COLLECTOR_THREAD_NAME: &str = "docsum-collector";

/// Parallel processor for summary runs
pub struct ParallelProcessor {
    config: ParallelConfig,
}

impl ParallelProcessor {
    pub fn new(config: ParallelConfig) -> Self {
        Self { config }
    }

    /// Run every file through a worker and collect the partials.
    ///
    /// Any worker failure aborts the others; the first real error is
    /// returned and nothing is collected.
    pub fn process(
        &self,
        files: &[PathBuf],
        parser: &LineParser,
        verbose: u8,
    ) -> Result<CollectionOutcome, PipelineError> {
        let start = Instant::now();

        // Rendezvous: a worker blocks until the collector takes its partial
        let (partial_sender, partial_receiver) = bounded(0);
        let abort = Arc::new(AtomicBool::new(false));

        let strategy = self.config.merge;
        let collector_handle = thread::Builder::new()
            .name(COLLECTOR_THREAD_NAME.to_string())
            .spawn(move || collector_thread(partial_receiver, strategy))
            .map_err(|source| PipelineError::Spawn {
                name: COLLECTOR_THREAD_NAME.to_string(),
                source,
            })?;

        let permits = self.config.permit_count(files.len()).map(Permits::new);
        let mut failure = FirstFailure::default();
        let mut worker_handles = Vec::with_capacity(files.len());

        for (index, path) in files.iter().enumerate() {
            let name = format!("docsum-worker-{}", index);
            let job = FileJob {
                index,
                path: path.clone(),
            };
            let ctx = WorkerContext {
                parser: parser.clone(),
                partials: partial_sender.clone(),
                abort: Arc::clone(&abort),
                verbose,
            };
            let worker_permits = permits.clone();

            match thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_thread(job, ctx, worker_permits))
            {
                Ok(handle) => worker_handles.push((name, handle)),
                Err(source) => {
                    abort.store(true, Ordering::Relaxed);
                    failure.record(PipelineError::Spawn { name, source });
                    break;
                }
            }
        }

        // Drop our sender so the channel disconnects with the last worker
        drop(partial_sender);

        let mut reports: Vec<(usize, FileStats)> = Vec::with_capacity(files.len());
        for (name, handle) in worker_handles {
            match handle.join() {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(err)) => failure.record(err),
                Err(_) => {
                    abort.store(true, Ordering::Relaxed);
                    failure.record(PipelineError::WorkerPanicked { name });
                }
            }
        }

        let collected = collector_handle
            .join()
            .map_err(|_| PipelineError::WorkerPanicked {
                name: COLLECTOR_THREAD_NAME.to_string(),
            })?;

        if let Some(err) = failure.into_error() {
            return Err(err);
        }

        reports.sort_by_key(|(index, _)| *index);
        let files: Vec<FileStats> = reports.into_iter().map(|(_, report)| report).collect();

        let mut stats = ProcessingStats::new();
        for report in &files {
            stats.merge(&report.stats);
        }
        stats.processing_time = start.elapsed();

        Ok(CollectionOutcome {
            collected,
            files,
            stats,
        })
    }
}

/// Keeps the first error that is not a mere consequence of another abort
#[derive(Default)]
struct FirstFailure {
    error: Option<PipelineError>,
}

impl FirstFailure {
    fn record(&mut self, err: PipelineError) {
        match &self.error {
            None => self.error = Some(err),
            Some(existing) if existing.is_aborted() && !err.is_aborted() => self.error = Some(err),
            Some(_) => {}
        }
    }

    fn into_error(self) -> Option<PipelineError> {
        self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InputConfig, MergeStrategy};
    use crate::filter::Filter;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "FUND;SEQ;ISSUE;DUE;SELLER;SELLER_ID;SPONSOR;SPONSOR_ID;FUTURE;NOMINAL;PRESENT;ACQUISITION;A;B;C;D;DOC\n";

    fn write_file(dir: &TempDir, name: &str, rows: &[(&str, &str)]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        for (present, doc) in rows {
            writeln!(
                file,
                "FUND;1;2024-01-01;2024-06-01;ACME;1;BANK;2;0;1.00;{};1.00;x;x;x;x;{}",
                present, doc
            )
            .unwrap();
        }
        path
    }

    fn parser() -> LineParser {
        LineParser::new(&InputConfig::default(), Filter::None)
    }

    fn processor(max_workers: Option<usize>, merge: MergeStrategy) -> ParallelProcessor {
        ParallelProcessor::new(ParallelConfig { max_workers, merge })
    }

    #[test]
    fn test_partials_from_all_files() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.csv", &[("100", "123"), ("50", "123"), ("1", "7")]);
        let b = write_file(&dir, "b.csv", &[("75", "123"), ("75", "123")]);

        let outcome = processor(None, MergeStrategy::Sort)
            .process(&[a.clone(), b.clone()], &parser(), 0)
            .unwrap();

        assert_eq!(outcome.stats.files_processed, 2);
        assert_eq!(outcome.stats.lines_read, 5);
        assert_eq!(outcome.stats.partials_emitted, 3);
        assert_eq!(outcome.files[0].path, a);
        assert_eq!(outcome.files[1].path, b);

        let sorted = outcome.collected.into_sorted();
        let keys: Vec<i32> = sorted.iter().map(|p| p.key).collect();
        assert_eq!(keys, vec![7, 123, 123]);
    }

    #[test]
    fn test_capped_workers_process_every_file() {
        let dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = (0..6)
            .map(|i| write_file(&dir, &format!("f{}.csv", i), &[("1", "1")]))
            .collect();

        let outcome = processor(Some(2), MergeStrategy::Map)
            .process(&files, &parser(), 0)
            .unwrap();

        assert_eq!(outcome.files.len(), 6);
        let sorted = outcome.collected.into_sorted();
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].count, 6);
    }

    #[test]
    fn test_missing_file_fails_the_run() {
        let dir = TempDir::new().unwrap();
        let good = write_file(&dir, "good.csv", &[("1", "1")]);
        let missing = dir.path().join("missing.csv");

        let err = processor(None, MergeStrategy::Sort)
            .process(&[good, missing.clone()], &parser(), 0)
            .unwrap_err();

        match err {
            PipelineError::Open { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_failure_prefers_real_errors() {
        let mut failure = FirstFailure::default();
        failure.record(PipelineError::Aborted);
        failure.record(PipelineError::WorkerPanicked {
            name: "w".to_string(),
        });
        failure.record(PipelineError::Aborted);
        assert!(matches!(
            failure.into_error(),
            Some(PipelineError::WorkerPanicked { .. })
        ));
    }
}
