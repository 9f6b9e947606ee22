// Command-line interface definitions and conversion into a RunConfig

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::config::{
    parse_separator, ColumnLayout, InputConfig, MergeStrategy, OutputConfig, OutputTarget,
    PerformanceConfig, ProcessingConfig, RunConfig, StatsFormat, ValueProfile,
    DEFAULT_OUTPUT_PATH,
};
use crate::config_file::ConfigFile;
use crate::filter::{Filter, Party};
use crate::record::GovernmentId;

#[derive(Parser, Debug)]
#[command(name = "docsum")]
#[command(about = "Per-document summaries of large delimited receivable stock files")]
#[command(
    long_about = "Per-document summaries of large delimited receivable stock files\n\nEvery input file is read by its own worker thread. Rows are grouped by document\nnumber and one line per document is written with the record count and the\nsum, average, maximum and minimum of each value column.\n\nCOMMON EXAMPLES:\n  docsum stocks/*.csv\n  docsum -o summary.csv --seller-id 11.222.333/0001-81 stocks/*.csv.gz\n  docsum --values future --threads 4 --stats stocks/*.csv"
)]
#[command(version)]
#[command(args_override_self = true)]
#[command(group(
    ArgGroup::new("filter")
        .args(["seller", "sponsor", "seller_id", "sponsor_id", "seller_contains", "sponsor_contains"])
        .multiple(false)
))]
pub struct Cli {
    /// Input files (plain, gzip or zstd)
    #[arg(required_unless_present = "show_config")]
    pub files: Vec<PathBuf>,

    /// Field separator of the input files
    #[arg(
        short = 's',
        long = "separator",
        default_value = ";",
        value_parser = parse_separator,
        help_heading = "Input Options"
    )]
    pub separator: u8,

    /// Value columns to aggregate
    #[arg(long = "values", value_enum, default_value = "stock", help_heading = "Input Options")]
    pub values: ValueProfile,

    /// Override a column position, e.g. --column document_number=17 (repeatable)
    #[arg(long = "column", value_name = "NAME=INDEX", help_heading = "Input Options")]
    pub columns: Vec<String>,

    /// Keep only rows whose seller name equals NAME (repeatable)
    #[arg(long = "seller", value_name = "NAME", help_heading = "Filter Options")]
    pub seller: Vec<String>,

    /// Keep only rows whose sponsor name equals NAME (repeatable)
    #[arg(long = "sponsor", value_name = "NAME", help_heading = "Filter Options")]
    pub sponsor: Vec<String>,

    /// Keep only rows whose seller government id matches (punctuation ignored)
    #[arg(long = "seller-id", value_name = "ID", help_heading = "Filter Options")]
    pub seller_id: Option<String>,

    /// Keep only rows whose sponsor government id matches (punctuation ignored)
    #[arg(long = "sponsor-id", value_name = "ID", help_heading = "Filter Options")]
    pub sponsor_id: Option<String>,

    /// Keep only rows whose seller name contains TEXT, ignoring ASCII case
    #[arg(long = "seller-contains", value_name = "TEXT", help_heading = "Filter Options")]
    pub seller_contains: Option<String>,

    /// Keep only rows whose sponsor name contains TEXT, ignoring ASCII case
    #[arg(long = "sponsor-contains", value_name = "TEXT", help_heading = "Filter Options")]
    pub sponsor_contains: Option<String>,

    /// Output file, "-" for stdout
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT_PATH, help_heading = "Output Options")]
    pub output: String,

    /// Field separator of the summary
    #[arg(
        long = "output-separator",
        default_value = ";",
        value_parser = parse_separator,
        help_heading = "Output Options"
    )]
    pub output_separator: u8,

    /// How partial aggregates are combined
    #[arg(long = "merge", value_enum, default_value = "sort", help_heading = "Performance Options")]
    pub merge: MergeStrategy,

    /// Maximum number of files processed at once (0 = number of CPUs, default: all)
    #[arg(long = "threads", value_name = "N", help_heading = "Performance Options")]
    pub threads: Option<usize>,

    /// Print processing statistics to stderr
    #[arg(long = "stats", help_heading = "Display Options")]
    pub stats: bool,

    /// Format of --stats output
    #[arg(long = "stats-format", value_enum, default_value = "text", help_heading = "Display Options")]
    pub stats_format: StatsFormat,

    /// Per-file summaries (-v) and per-line warnings (-vv) on stderr
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Display Options")]
    pub verbose: u8,

    /// Use a specific config file instead of the discovered ones
    #[arg(long = "config-file", value_name = "PATH", help_heading = "Configuration Options")]
    pub config_file: Option<String>,

    /// Do not read any config file
    #[arg(long = "ignore-config", help_heading = "Configuration Options")]
    pub ignore_config: bool,

    /// Show active configuration and search locations, then exit
    #[arg(long = "show-config", help_heading = "Configuration Options")]
    pub show_config: bool,

    /// Expand an alias from the config file (repeatable)
    #[arg(short = 'a', long = "alias", value_name = "NAME", help_heading = "Configuration Options")]
    pub alias: Vec<String>,
}

impl Cli {
    /// Selected filter. clap guarantees at most one filter flag is set.
    pub fn filter(&self) -> Result<Filter, String> {
        if !self.seller.is_empty() {
            return Ok(Filter::name_in(Party::Seller, &self.seller));
        }
        if !self.sponsor.is_empty() {
            return Ok(Filter::name_in(Party::Sponsor, &self.sponsor));
        }
        if let Some(id) = &self.seller_id {
            return government_id_filter(Party::Seller, "--seller-id", id);
        }
        if let Some(id) = &self.sponsor_id {
            return government_id_filter(Party::Sponsor, "--sponsor-id", id);
        }
        if let Some(text) = &self.seller_contains {
            return Ok(Filter::name_contains(Party::Seller, text));
        }
        if let Some(text) = &self.sponsor_contains {
            return Ok(Filter::name_contains(Party::Sponsor, text));
        }
        Ok(Filter::None)
    }

    /// Column layout: defaults, then `[columns]` from the config file, then `--column`
    pub fn layout(&self, config_file: &ConfigFile) -> Result<ColumnLayout, String> {
        let mut layout = ColumnLayout::default();
        config_file.apply_columns(&mut layout)?;
        for entry in &self.columns {
            layout.apply_override(entry)?;
        }
        Ok(layout)
    }

    pub fn into_config(self, config_file: &ConfigFile) -> Result<RunConfig, String> {
        let filter = self.filter()?;
        let layout = self.layout(config_file)?;

        Ok(RunConfig {
            input: InputConfig {
                files: self.files,
                separator: self.separator,
                layout,
                values: self.values,
            },
            output: OutputConfig {
                target: OutputTarget::from_arg(&self.output),
                separator: self.output_separator,
            },
            processing: ProcessingConfig {
                filter,
                verbose: self.verbose,
                stats: self.stats.then_some(self.stats_format),
            },
            performance: PerformanceConfig {
                threads: self.threads,
                merge: self.merge,
            },
        })
    }
}

fn government_id_filter(party: Party, flag: &str, raw: &str) -> Result<Filter, String> {
    if GovernmentId::normalize(raw.as_bytes()).is_empty() {
        return Err(format!("{} '{}' contains no digits", flag, raw));
    }
    Ok(Filter::government_id(party, raw))
}
