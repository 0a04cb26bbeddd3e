//! Pipeline configuration.
//!
//! Defaults reproduce the fixed file names and featured teams of the report
//! set. A YAML file can override any field, and `run` flags override the file.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    cli::{RunArgs, parse_delimiter},
    io_utils::{self, LineEnding, ReadOptions, WriteOptions},
};

pub const DEFAULT_INPUT: &str = "data-2023-fifa_wwc-players.csv";
pub const DEFAULT_TEAM_COUNT: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub delimiter: Option<String>,
    pub input_encoding: Option<String>,
    pub output_encoding: Option<String>,
    pub line_ending: LineEnding,
    /// Number of distinct squads the dataset must contain; `None` skips the check.
    pub expected_team_count: Option<usize>,
    pub featured_teams: Vec<FeaturedTeam>,
    pub outputs: ReportFiles,
}

/// A squad whose full roster is written to its own report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeaturedTeam {
    pub name: String,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportFiles {
    pub players: PathBuf,
    pub multi_position: PathBuf,
    pub team_top_scorers: PathBuf,
    pub player_efficiency: PathBuf,
    pub team_efficiency: PathBuf,
    pub team_ratings: PathBuf,
}

impl Default for ReportFiles {
    fn default() -> Self {
        Self {
            players: PathBuf::from("stu-players.csv"),
            multi_position: PathBuf::from("stu-players-multi_position.csv"),
            team_top_scorers: PathBuf::from("stu-team-top_scorers.csv"),
            player_efficiency: PathBuf::from("stu-players-shooting_efficiency.csv"),
            team_efficiency: PathBuf::from("stu-team-shooting_efficiency.csv"),
            team_ratings: PathBuf::from("stu-team-shooting_efficiency_ratings.csv"),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from("."),
            delimiter: None,
            input_encoding: None,
            output_encoding: None,
            line_ending: LineEnding::default(),
            expected_team_count: Some(DEFAULT_TEAM_COUNT),
            featured_teams: vec![
                FeaturedTeam {
                    name: "China PR".to_string(),
                    output: PathBuf::from("stu-team-china.csv"),
                },
                FeaturedTeam {
                    name: "Morocco".to_string(),
                    output: PathBuf::from("stu-team-morocco.csv"),
                },
            ],
            outputs: ReportFiles::default(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).with_context(|| format!("Parsing config YAML {path:?}"))
    }

    /// Builds the effective configuration for a `run` invocation: the config
    /// file (or defaults) with any explicit flags layered on top.
    pub fn from_args(args: &RunArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(input) = &args.input {
            config.input = input.clone();
        }
        if let Some(dir) = &args.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(delimiter) = args.delimiter {
            config.delimiter = Some((delimiter as char).to_string());
        }
        if let Some(encoding) = &args.input_encoding {
            config.input_encoding = Some(encoding.clone());
        }
        if let Some(encoding) = &args.output_encoding {
            config.output_encoding = Some(encoding.clone());
        }
        Ok(config)
    }

    fn delimiter_byte(&self) -> Result<Option<u8>> {
        self.delimiter
            .as_deref()
            .map(|value| parse_delimiter(value).map_err(anyhow::Error::msg))
            .transpose()
            .context("Resolving configured delimiter")
    }

    pub fn read_options(&self) -> Result<ReadOptions> {
        Ok(ReadOptions {
            delimiter: io_utils::resolve_input_delimiter(&self.input, self.delimiter_byte()?),
            encoding: io_utils::resolve_encoding(self.input_encoding.as_deref())?,
        })
    }

    /// Output shares the input delimiter; encoding and line ending are separate.
    pub fn write_options(&self) -> Result<WriteOptions> {
        Ok(WriteOptions {
            delimiter: self.read_options()?.delimiter,
            encoding: io_utils::resolve_encoding(self.output_encoding.as_deref())?,
            line_ending: self.line_ending,
        })
    }

    pub fn output_path(&self, file: &Path) -> PathBuf {
        self.output_dir.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_name_every_report() {
        let config = PipelineConfig::default();
        assert_eq!(config.expected_team_count, Some(32));
        assert_eq!(config.featured_teams.len(), 2);
        assert_eq!(config.featured_teams[0].name, "China PR");
        assert_eq!(
            config.output_path(&config.outputs.players),
            PathBuf::from("./stu-players.csv")
        );
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let yaml = "input: players.tsv\nexpected_team_count: null\nline_ending: lf\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).expect("parse yaml");
        assert_eq!(config.input, PathBuf::from("players.tsv"));
        assert_eq!(config.expected_team_count, None);
        assert_eq!(config.line_ending, LineEnding::Lf);
        assert_eq!(config.outputs, ReportFiles::default());
        assert_eq!(config.read_options().unwrap().delimiter, b'\t');
    }

    #[test]
    fn bundled_sample_matches_defaults() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("config")
            .join("pipeline.yaml");
        let config = PipelineConfig::load(&path).expect("load sample config");
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let yaml = "inputs: players.csv\n";
        assert!(serde_yaml::from_str::<PipelineConfig>(yaml).is_err());
    }

    #[test]
    fn named_delimiters_resolve() {
        let config = PipelineConfig {
            delimiter: Some("semicolon".to_string()),
            ..PipelineConfig::default()
        };
        assert_eq!(config.write_options().unwrap().delimiter, b';');
    }
}
