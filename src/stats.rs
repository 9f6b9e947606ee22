use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::time::Duration;

/// Statistics collected during a summary run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingStats {
    pub files_processed: usize,
    /// Data lines read, header excluded
    pub lines_read: u64,
    pub blank_lines: u64,
    /// Lines that ended before the last required column
    pub malformed_lines: u64,
    /// Lines whose document number could not be parsed and fell back to 0
    pub unparsable_keys: u64,
    pub records_filtered: u64,
    pub records_aggregated: u64,
    pub partials_emitted: u64,
    pub keys_written: usize,
    #[serde(rename = "processing_time_ms", serialize_with = "as_millis")]
    pub processing_time: Duration,
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a worker's counters into the run totals
    pub fn merge(&mut self, other: &ProcessingStats) {
        self.files_processed += other.files_processed;
        self.lines_read += other.lines_read;
        self.blank_lines += other.blank_lines;
        self.malformed_lines += other.malformed_lines;
        self.unparsable_keys += other.unparsable_keys;
        self.records_filtered += other.records_filtered;
        self.records_aggregated += other.records_aggregated;
        self.partials_emitted += other.partials_emitted;
        self.keys_written += other.keys_written;
    }

    pub fn format_stats(&self) -> String {
        let mut output = format!(
            "Lines processed: {} total, {} aggregated, {} filtered",
            self.lines_read, self.records_aggregated, self.records_filtered
        );

        if self.files_processed > 0 {
            output.push_str(&format!(", {} files", self.files_processed));
        }

        if self.blank_lines > 0 {
            output.push_str(&format!(", {} blank", self.blank_lines));
        }

        if self.malformed_lines > 0 {
            output.push_str(&format!(", {} malformed", self.malformed_lines));
        }

        if self.unparsable_keys > 0 {
            output.push_str(&format!(", {} unparsable keys", self.unparsable_keys));
        }

        output.push_str(&format!(
            "; Partials: {} emitted, {} keys written",
            self.partials_emitted, self.keys_written
        ));

        let processing_time_ms = self.processing_time.as_millis();
        output.push_str(&format!(" in {}ms", processing_time_ms));

        if processing_time_ms > 0 && self.lines_read > 0 {
            let lines_per_sec = (self.lines_read as f64 * 1000.0) / processing_time_ms as f64;
            output.push_str(&format!(" ({:.0} lines/s)", lines_per_sec));
        }

        output
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Per-file counters reported by one worker
#[derive(Debug, Clone, PartialEq)]
pub struct FileStats {
    pub path: PathBuf,
    pub stats: ProcessingStats,
}

impl FileStats {
    pub fn format_line(&self) -> String {
        format!(
            "{}: {} lines, {} records, {} partials",
            self.path.display(),
            self.stats.lines_read,
            self.stats.records_aggregated,
            self.stats.partials_emitted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_adds_counters() {
        let mut total = ProcessingStats {
            files_processed: 1,
            lines_read: 10,
            records_aggregated: 8,
            records_filtered: 2,
            partials_emitted: 3,
            ..Default::default()
        };
        let other = ProcessingStats {
            files_processed: 1,
            lines_read: 5,
            malformed_lines: 1,
            records_aggregated: 5,
            partials_emitted: 2,
            ..Default::default()
        };
        total.merge(&other);

        assert_eq!(total.files_processed, 2);
        assert_eq!(total.lines_read, 15);
        assert_eq!(total.malformed_lines, 1);
        assert_eq!(total.records_aggregated, 13);
        assert_eq!(total.partials_emitted, 5);
    }

    #[test]
    fn test_format_stats() {
        let stats = ProcessingStats {
            files_processed: 2,
            lines_read: 4,
            records_aggregated: 3,
            records_filtered: 1,
            malformed_lines: 1,
            partials_emitted: 2,
            keys_written: 1,
            ..Default::default()
        };
        let text = stats.format_stats();
        assert!(text.starts_with("Lines processed: 4 total, 3 aggregated, 1 filtered, 2 files"));
        assert!(text.contains("1 malformed"));
        assert!(!text.contains("unparsable"));
        assert!(text.contains("Partials: 2 emitted, 1 keys written"));
    }

    #[test]
    fn test_json_stats() {
        let stats = ProcessingStats {
            lines_read: 7,
            processing_time: Duration::from_millis(1500),
            ..Default::default()
        };
        let value: serde_json::Value = serde_json::from_str(&stats.to_json().unwrap()).unwrap();
        assert_eq!(value["lines_read"], 7);
        assert_eq!(value["processing_time_ms"], 1500);
        assert!(value.get("processing_time").is_none());
    }
}
