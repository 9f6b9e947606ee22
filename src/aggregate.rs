//! Per-key running statistics
//!
//! [`Aggregate`] is both the partial (one contiguous run in one file) and the
//! final (all partials of a key) shape. Folding is associative and
//! commutative, so partials may be merged in any order.

use crate::record::Record;

/// Sum, min and max of one numeric column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueStats {
    pub sum: f64,
    pub min: f32,
    pub max: f32,
}

impl ValueStats {
    pub fn new(value: f32) -> Self {
        Self {
            sum: f64::from(value),
            min: value,
            max: value,
        }
    }

    pub fn add(&mut self, value: f32) {
        self.sum += f64::from(value);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn merge(&mut self, other: &ValueStats) {
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

/// Statistics for one document number
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub key: i32,
    /// Number of folded records, always at least 1
    pub count: u64,
    pub values: Vec<ValueStats>,
}

impl Aggregate {
    pub fn from_record(record: &Record) -> Self {
        Self {
            key: record.key,
            count: 1,
            values: record.values().iter().copied().map(ValueStats::new).collect(),
        }
    }

    /// Fold one more record of the same key
    pub fn add_record(&mut self, record: &Record) {
        debug_assert_eq!(self.key, record.key);
        for (stats, &value) in self.values.iter_mut().zip(record.values()) {
            stats.add(value);
        }
        self.count += 1;
    }

    /// Fold another aggregate of the same key
    pub fn merge(&mut self, other: &Aggregate) {
        debug_assert_eq!(self.key, other.key);
        debug_assert_eq!(self.values.len(), other.values.len());
        for (stats, theirs) in self.values.iter_mut().zip(&other.values) {
            stats.merge(theirs);
        }
        self.count += other.count;
    }

    pub fn average(&self, column: usize) -> f64 {
        self.values[column].sum / self.count as f64
    }
}

/// In-flight aggregate of one worker.
///
/// Relies on rows of a key being adjacent in the file: a key change closes
/// the current run. A key that reappears later simply starts another run,
/// and the collector merges the runs.
#[derive(Debug, Default)]
pub struct RunningAggregator {
    current: Option<Aggregate>,
}

impl RunningAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an accepted record. Returns the previous run when the key changed.
    pub fn push(&mut self, record: &Record) -> Option<Aggregate> {
        if let Some(current) = self.current.as_mut() {
            if current.key == record.key {
                current.add_record(record);
                return None;
            }
        }
        self.current.replace(Aggregate::from_record(record))
    }

    /// Key of the run in progress
    pub fn current_key(&self) -> Option<i32> {
        self.current.as_ref().map(|a| a.key)
    }

    /// Close the last run at end of input
    pub fn finish(self) -> Option<Aggregate> {
        self.current
    }
}
