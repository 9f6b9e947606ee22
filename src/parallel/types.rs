//! Type definitions for parallel processing

use crossbeam_channel::{bounded, Receiver, Sender};
use std::path::PathBuf;

use crate::config::{MergeStrategy, RunConfig};
use crate::stats::{FileStats, ProcessingStats};

use super::collector::Collected;

/// Configuration for parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    /// Cap on concurrently processing workers; `None` lets every file's
    /// worker run at once
    pub max_workers: Option<usize>,
    pub merge: MergeStrategy,
}

impl ParallelConfig {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            max_workers: config.effective_threads(),
            merge: config.performance.merge,
        }
    }

    /// Permits needed to honour the cap, `None` when it does not bind
    pub fn permit_count(&self, files: usize) -> Option<usize> {
        match self.max_workers {
            Some(cap) if cap < files => Some(cap.max(1)),
            _ => None,
        }
    }
}

/// Counting semaphore over a bounded channel preloaded with tokens
#[derive(Clone)]
pub(crate) struct Permits {
    give: Sender<()>,
    take: Receiver<()>,
}

impl Permits {
    pub fn new(count: usize) -> Self {
        let (give, take) = bounded(count);
        for _ in 0..count {
            if give.try_send(()).is_err() {
                break;
            }
        }
        Self { give, take }
    }

    /// Block until a token is free. The token returns when the guard drops.
    pub fn acquire(&self) -> Option<PermitGuard> {
        self.take.recv().ok().map(|()| PermitGuard {
            give: self.give.clone(),
        })
    }
}

pub(crate) struct PermitGuard {
    give: Sender<()>,
}

impl Drop for PermitGuard {
    fn drop(&mut self) {
        let _ = self.give.try_send(());
    }
}

/// One queued input file. `index` keeps reports in argument order.
#[derive(Debug, Clone)]
pub(crate) struct FileJob {
    pub index: usize,
    pub path: PathBuf,
}

/// Everything the workers and the collector produced
#[derive(Debug)]
pub struct CollectionOutcome {
    pub collected: Collected,
    /// Per-file counters in input order
    pub files: Vec<FileStats>,
    pub stats: ProcessingStats,
}
