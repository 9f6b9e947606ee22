use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;

use crate::filter::Filter;

/// Main configuration struct for a summary run
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
    pub performance: PerformanceConfig,
}

/// Input configuration
#[derive(Debug, Clone)]
pub struct InputConfig {
    pub files: Vec<PathBuf>,
    pub separator: u8,
    pub layout: ColumnLayout,
    pub values: ValueProfile,
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub target: OutputTarget,
    pub separator: u8,
}

/// Processing configuration
#[derive(Debug, Clone, Default)]
pub struct ProcessingConfig {
    pub filter: Filter,
    pub verbose: u8,
    pub stats: Option<StatsFormat>,
}

/// Performance configuration
#[derive(Debug, Clone, Default)]
pub struct PerformanceConfig {
    /// Upper bound on concurrently running file workers. `None` runs one
    /// worker per input file, `Some(0)` uses the number of CPUs.
    pub threads: Option<usize>,
    pub merge: MergeStrategy,
}

impl RunConfig {
    /// Configuration with default settings for the given input files
    pub fn for_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            input: InputConfig {
                files: files.into_iter().map(Into::into).collect(),
                ..InputConfig::default()
            },
            ..Self::default()
        }
    }

    /// Get effective worker cap, if any
    pub fn effective_threads(&self) -> Option<usize> {
        match self.performance.threads {
            Some(0) => Some(num_cpus::get().max(1)),
            other => other,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            separator: b';',
            layout: ColumnLayout::default(),
            values: ValueProfile::Stock,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            target: OutputTarget::File(PathBuf::from(DEFAULT_OUTPUT_PATH)),
            separator: b';',
        }
    }
}

pub const DEFAULT_OUTPUT_PATH: &str = "output.csv";

/// Where the summary is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(PathBuf::from(arg))
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => write!(f, "<stdout>"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Which numeric columns are aggregated
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValueProfile {
    /// Nominal, present and acquisition value
    #[default]
    Stock,
    /// Future value only
    Future,
}

/// Most numeric columns any profile tracks
pub const MAX_VALUE_COLUMNS: usize = 3;

impl ValueProfile {
    pub fn columns(self) -> &'static [Column] {
        match self {
            ValueProfile::Stock => &[
                Column::NominalValue,
                Column::PresentValue,
                Column::AcquisitionValue,
            ],
            ValueProfile::Future => &[Column::FutureValue],
        }
    }
}

/// How the collector stores partial aggregates
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Append partials to a list, then sort and coalesce
    #[default]
    Sort,
    /// Fold partials into a key map as they arrive
    Map,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatsFormat {
    #[default]
    Text,
    Json,
}

/// Logical input columns read by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    DocumentNumber,
    SellerName,
    SellerGovernmentId,
    SponsorName,
    SponsorGovernmentId,
    NominalValue,
    PresentValue,
    AcquisitionValue,
    FutureValue,
}

impl Column {
    pub const COUNT: usize = 9;

    pub const ALL: [Column; Column::COUNT] = [
        Column::DocumentNumber,
        Column::SellerName,
        Column::SellerGovernmentId,
        Column::SponsorName,
        Column::SponsorGovernmentId,
        Column::NominalValue,
        Column::PresentValue,
        Column::AcquisitionValue,
        Column::FutureValue,
    ];

    /// Name used in `--column` and the `[columns]` config section
    pub fn name(self) -> &'static str {
        match self {
            Column::DocumentNumber => "document_number",
            Column::SellerName => "seller_name",
            Column::SellerGovernmentId => "seller_government_id",
            Column::SponsorName => "sponsor_name",
            Column::SponsorGovernmentId => "sponsor_government_id",
            Column::NominalValue => "nominal_value",
            Column::PresentValue => "present_value",
            Column::AcquisitionValue => "acquisition_value",
            Column::FutureValue => "future_value",
        }
    }

    /// Upper-case label used in the summary header
    pub fn label(self) -> &'static str {
        match self {
            Column::DocumentNumber => "DOCUMENT_NUMBER",
            Column::SellerName => "SELLER_NAME",
            Column::SellerGovernmentId => "SELLER_GOVERNMENT_ID",
            Column::SponsorName => "SPONSOR_NAME",
            Column::SponsorGovernmentId => "SPONSOR_GOVERNMENT_ID",
            Column::NominalValue => "NOMINAL_VALUE",
            Column::PresentValue => "PRESENT_VALUE",
            Column::AcquisitionValue => "ACQUISITION_VALUE",
            Column::FutureValue => "FUTURE_VALUE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase().replace('-', "_");
        Column::ALL.into_iter().find(|c| c.name() == name)
    }

    pub(crate) fn slot(self) -> usize {
        self as usize
    }
}

/// Positional index (0-based) of every logical column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    indices: [usize; Column::COUNT],
}

impl Default for ColumnLayout {
    fn default() -> Self {
        let mut layout = Self {
            indices: [0; Column::COUNT],
        };
        layout.set(Column::DocumentNumber, 16);
        layout.set(Column::SellerName, 4);
        layout.set(Column::SellerGovernmentId, 5);
        layout.set(Column::SponsorName, 6);
        layout.set(Column::SponsorGovernmentId, 7);
        layout.set(Column::FutureValue, 8);
        layout.set(Column::NominalValue, 9);
        layout.set(Column::PresentValue, 10);
        layout.set(Column::AcquisitionValue, 11);
        layout
    }
}

impl ColumnLayout {
    pub fn index(&self, column: Column) -> usize {
        self.indices[column.slot()]
    }

    pub fn set(&mut self, column: Column, index: usize) {
        self.indices[column.slot()] = index;
    }

    /// Apply one `name=index` override
    pub fn apply_override(&mut self, entry: &str) -> Result<(), String> {
        let (name, index) = entry
            .split_once('=')
            .ok_or_else(|| format!("Invalid column override '{}': expected NAME=INDEX", entry))?;
        self.apply(name, index)
    }

    /// Apply an override given as separate name and index strings
    pub fn apply(&mut self, name: &str, index: &str) -> Result<(), String> {
        let column = Column::from_name(name).ok_or_else(|| {
            let known: Vec<&str> = Column::ALL.iter().map(|c| c.name()).collect();
            format!(
                "Unknown column '{}'. Known columns: {}",
                name.trim(),
                known.join(", ")
            )
        })?;
        let index: usize = index
            .trim()
            .parse()
            .map_err(|_| format!("Invalid index '{}' for column '{}'", index.trim(), column.name()))?;
        self.set(column, index);
        Ok(())
    }
}

/// Parse a single-byte separator argument
pub fn parse_separator(arg: &str) -> Result<u8, String> {
    match arg {
        "\\t" | "tab" => Ok(b'\t'),
        _ => {
            let bytes = arg.as_bytes();
            if bytes.len() == 1 && bytes[0] != b'\n' && bytes[0] != b'\r' {
                Ok(bytes[0])
            } else {
                Err(format!(
                    "Separator must be a single ASCII character, got '{}'",
                    arg
                ))
            }
        }
    }
}

pub fn format_error_message(message: &str) -> String {
    format!("docsum: Error: {}", message)
}

pub fn format_warning_message(message: &str) -> String {
    format!("docsum: Warning: {}", message)
}
