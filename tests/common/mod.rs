#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tempfile::{TempDir, tempdir};
use wwc_report::config::PipelineConfig;

pub const SAMPLE_FILE: &str = "wwc_players_sample.csv";
pub const SAMPLE_TEAM_COUNT: usize = 4;

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Pipeline configuration reading the sample fixture and writing into
    /// this workspace.
    pub fn sample_config(&self) -> PipelineConfig {
        PipelineConfig {
            input: fixture_path(SAMPLE_FILE),
            output_dir: self.path().to_path_buf(),
            expected_team_count: Some(SAMPLE_TEAM_COUNT),
            ..PipelineConfig::default()
        }
    }
}

/// Reads a report back as (header, rows).
pub fn read_report(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .unwrap_or_else(|err| panic!("open report {path:?}: {err}"));
    let headers: Vec<String> = reader
        .headers()
        .expect("headers")
        .iter()
        .map(str::to_string)
        .collect();
    let rows: Vec<Vec<String>> = reader
        .records()
        .map(|record| {
            record
                .expect("record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect();
    (headers, rows)
}

/// Values of one named column, in row order.
pub fn column(path: &Path, name: &str) -> Vec<String> {
    let (headers, rows) = read_report(path);
    let idx = headers
        .iter()
        .position(|header| header == name)
        .unwrap_or_else(|| panic!("column '{name}' missing from {path:?}"));
    rows.into_iter().map(|row| row[idx].clone()).collect()
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
