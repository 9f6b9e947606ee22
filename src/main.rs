use anyhow::Result;
use clap::Parser;

use docsum::cli::Cli;
use docsum::config::{format_error_message, format_warning_message, StatsFormat};
use docsum::config_file::ConfigFile;
use docsum::platform::{is_broken_pipe, output_error_hint, ExitCode, SafeStderr};
use docsum::{run, PipelineError, RunConfig, RunReport};

fn main() -> Result<()> {
    let mut stderr = SafeStderr::new();

    let (cli, config_file) = process_args_with_config(&mut stderr);

    if cli.show_config {
        ConfigFile::show_config(cli.config_file.as_deref());
        ExitCode::Success.exit();
    }

    if cli.ignore_config && !cli.alias.is_empty() {
        stderr.writeln(&format_error_message(
            "--alias needs a config file and cannot be combined with --ignore-config",
        ));
        ExitCode::InvalidUsage.exit();
    }

    let config = match cli.into_config(&config_file) {
        Ok(config) => config,
        Err(e) => {
            stderr.writeln(&format_error_message(&e));
            ExitCode::InvalidUsage.exit();
        }
    };

    match run(&config) {
        Ok(report) => {
            print_report(&config, &report, &mut stderr)?;
            ExitCode::Success.exit();
        }
        Err(err) => {
            report_failure(&config, &err, &mut stderr);
            ExitCode::GeneralError.exit();
        }
    }
}

/// Expand config file defaults and aliases, then parse
fn process_args_with_config(stderr: &mut SafeStderr) -> (Cli, ConfigFile) {
    let raw_args: Vec<String> = std::env::args().collect();

    let ignore_config = raw_args.iter().any(|arg| arg == "--ignore-config");
    let config_file_path = extract_config_file_arg(&raw_args);

    let (processed_args, config_file) = if ignore_config {
        (raw_args, ConfigFile::default())
    } else {
        let loaded = ConfigFile::load_with_custom_path(config_file_path.as_deref())
            .and_then(|config_file| {
                let processed = config_file.process_args(raw_args)?;
                Ok((processed, config_file))
            });
        match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                stderr.writeln(&format!("docsum: Config error: {:#}", e));
                ExitCode::GeneralError.exit();
            }
        }
    };

    // clap prints its own usage errors and exits with code 2
    (Cli::parse_from(processed_args), config_file)
}

fn extract_config_file_arg(args: &[String]) -> Option<String> {
    args.iter().enumerate().find_map(|(i, arg)| {
        if arg == "--config-file" {
            args.get(i + 1).cloned()
        } else {
            arg.strip_prefix("--config-file=").map(str::to_string)
        }
    })
}

fn print_report(config: &RunConfig, report: &RunReport, stderr: &mut SafeStderr) -> Result<()> {
    if config.processing.verbose >= 1 {
        for file in &report.files {
            stderr.writeln(&format!("docsum: {}", file.format_line()));
        }
        stderr.writeln(&format!(
            "docsum: wrote {} documents to {}",
            report.stats.keys_written, config.output.target
        ));
    }

    if report.stats.malformed_lines > 0 && config.processing.verbose == 0 && config.processing.stats.is_none() {
        stderr.writeln(&format_warning_message(&format!(
            "{} truncated lines were aggregated with missing values as 0 (use -vv for details)",
            report.stats.malformed_lines
        )));
    }

    match config.processing.stats {
        Some(StatsFormat::Text) => stderr.writeln(&format!("docsum: {}", report.stats.format_stats())),
        Some(StatsFormat::Json) => stderr.writeln(&report.stats.to_json()?),
        None => {}
    }
    Ok(())
}

fn report_failure(config: &RunConfig, err: &PipelineError, stderr: &mut SafeStderr) {
    match err {
        PipelineError::Output(e) => {
            if let csv::ErrorKind::Io(io_err) = e.kind() {
                // Reader of `-o -` went away; nothing left to report to
                if is_broken_pipe(io_err) {
                    return;
                }
            }
            stderr.writeln(&format_error_message(&err.to_string()));
        }
        PipelineError::CreateOutput { source, .. } => {
            stderr.writeln(&format_error_message(&err.to_string()));
            if let docsum::OutputTarget::File(path) = &config.output.target {
                if let Some(hint) = output_error_hint(path, source) {
                    stderr.writeln(hint);
                }
            }
        }
        _ => stderr.writeln(&format_error_message(&err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_config_file_arg() {
        assert_eq!(
            extract_config_file_arg(&args(&["docsum", "--config-file", "my.ini", "a.csv"])),
            Some("my.ini".to_string())
        );
        assert_eq!(
            extract_config_file_arg(&args(&["docsum", "--config-file=other.ini"])),
            Some("other.ini".to_string())
        );
        assert_eq!(extract_config_file_arg(&args(&["docsum", "a.csv"])), None);
        assert_eq!(extract_config_file_arg(&args(&["docsum", "--config-file"])), None);
    }
}
