// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const HEADER: &str = "FUND;SEQUENCE;ISSUE_DATE;DUE_DATE;SELLER_NAME;SELLER_ID;SPONSOR_NAME;SPONSOR_ID;FUTURE_VALUE;NOMINAL_VALUE;PRESENT_VALUE;ACQUISITION_VALUE;STATUS;TYPE;RATE;TERM;DOCUMENT_NUMBER";

/// One input row in the default 17-column layout
#[derive(Debug, Clone)]
pub struct StockRow {
    pub seller_name: String,
    pub seller_id: String,
    pub sponsor_name: String,
    pub sponsor_id: String,
    pub future: String,
    pub nominal: String,
    pub present: String,
    pub acquisition: String,
    pub document: String,
}

impl StockRow {
    pub fn new(document: &str, present: &str) -> Self {
        Self {
            seller_name: "ACME LTDA".to_string(),
            seller_id: "11.222.333/0001-81".to_string(),
            sponsor_name: "BANCO XYZ SA".to_string(),
            sponsor_id: "33.000.167/0001-01".to_string(),
            future: "0.00".to_string(),
            nominal: "10.00".to_string(),
            present: present.to_string(),
            acquisition: "9.00".to_string(),
            document: document.to_string(),
        }
    }

    pub fn seller(mut self, name: &str, id: &str) -> Self {
        self.seller_name = name.to_string();
        self.seller_id = id.to_string();
        self
    }

    pub fn future(mut self, value: &str) -> Self {
        self.future = value.to_string();
        self
    }

    pub fn line(&self) -> String {
        format!(
            "FIDC;1;2024-01-02;2024-07-01;{};{};{};{};{};{};{};{};OPEN;DM;1.5;180;{}",
            self.seller_name,
            self.seller_id,
            self.sponsor_name,
            self.sponsor_id,
            self.future,
            self.nominal,
            self.present,
            self.acquisition,
            self.document
        )
    }
}

/// Header plus one line per entry of `lines`
pub fn file_content(lines: &[String]) -> String {
    let mut content = String::from(HEADER);
    content.push('\n');
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    content
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).expect("Failed to create input file");
    file.write_all(content.as_bytes())
        .expect("Failed to write input file");
    path
}

pub fn write_rows(dir: &Path, name: &str, rows: &[StockRow]) -> PathBuf {
    let lines: Vec<String> = rows.iter().map(StockRow::line).collect();
    write_file(dir, name, &file_content(&lines))
}

/// Run the docsum binary with config files ignored. Returns stdout, stderr
/// and the exit code.
pub fn run_docsum(args: &[&str]) -> (String, String, i32) {
    run_docsum_in(None, args)
}

pub fn run_docsum_in(cwd: Option<&Path>, args: &[&str]) -> (String, String, i32) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docsum"));
    if !args.contains(&"--config-file") {
        cmd.arg("--ignore-config");
    }
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute docsum");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Summary rows without the header
pub fn data_rows(output: &str) -> Vec<String> {
    output.lines().skip(1).map(str::to_string).collect()
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}
