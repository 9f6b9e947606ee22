use std::io::{self, Write};
use std::path::Path;
use std::process;

/// Standard Unix exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }
}

/// Safe wrapper for writing to stderr
pub struct SafeStderr {
    stderr: io::Stderr,
}

impl Default for SafeStderr {
    fn default() -> Self {
        Self::new()
    }
}

impl SafeStderr {
    pub fn new() -> Self {
        Self {
            stderr: io::stderr(),
        }
    }

    /// Write a line to stderr. If even that fails there is nobody left to tell.
    pub fn writeln(&mut self, data: &str) {
        if writeln!(self.stderr, "{}", data).is_err() {
            ExitCode::GeneralError.exit();
        }
    }
}

/// Broken pipe detection for `-o -` piped into a closed reader
pub fn is_broken_pipe(e: &io::Error) -> bool {
    #[cfg(windows)]
    {
        e.kind() == io::ErrorKind::BrokenPipe
            || e.raw_os_error() == Some(232) // ERROR_NO_DATA
            || e.raw_os_error() == Some(109) // ERROR_BROKEN_PIPE
    }
    #[cfg(not(windows))]
    {
        e.kind() == io::ErrorKind::BrokenPipe
    }
}

/// Suggestion line for an output file that could not be created
pub fn output_error_hint(path: &Path, error: &io::Error) -> Option<&'static str> {
    match error.kind() {
        io::ErrorKind::PermissionDenied => {
            if path.parent().is_some_and(|p| !p.as_os_str().is_empty() && !p.exists()) {
                Some("Suggestion: Parent directory does not exist, create it first")
            } else {
                Some("Suggestion: Check file permissions or choose a writable location")
            }
        }
        io::ErrorKind::NotFound => Some("Suggestion: Parent directory does not exist, create it first"),
        _ if path.is_dir() => Some("Suggestion: Path points to a directory, specify a filename instead"),
        _ => None,
    }
}
