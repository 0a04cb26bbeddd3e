//! The report pipeline: one pass from the raw player table to the ranked
//! team-efficiency report.
//!
//! Stages run strictly in order and each one consumes the records produced
//! by the stage before it. Any failure aborts the run; report files already
//! written are left in place.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::{
    cli::RunArgs,
    config::PipelineConfig,
    error::PipelineError,
    io_utils::{self, ReadOptions, WriteOptions},
    records::{
        ColumnMap, Player, PlayerEfficiency, RAW_COLUMN_COUNT, RatedTeam, RawPlayer, Record,
        TeamSummary,
    },
    select::{
        distinct_team_names, multi_position, player_shooting_numbers, sum_shooting_numbers,
        team_of, top_scorers,
    },
};

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSummary {
    pub players: usize,
    /// Distinct squad names, sorted.
    pub teams: Vec<String>,
    /// Names of the tournament-wide top scorer(s).
    pub top_scorers: Vec<String>,
    /// Every report written, in the order it was written.
    pub reports: Vec<PathBuf>,
}

pub fn execute(args: &RunArgs) -> Result<()> {
    let config = PipelineConfig::from_args(args)?;
    let summary = run_pipeline(&config)?;
    info!(
        "Wrote {} report(s) for {} player(s) across {} team(s) to {:?}",
        summary.reports.len(),
        summary.players,
        summary.teams.len(),
        config.output_dir
    );
    Ok(())
}

pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineSummary> {
    let read_options = config.read_options()?;
    let mut reports = ReportWriter::new(config, config.write_options()?);
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Creating output directory {:?}", config.output_dir))?;

    info!(
        "Loading players from '{}' with delimiter '{}'",
        config.input.display(),
        crate::printable_delimiter(read_options.delimiter)
    );
    let raw = load_raw_players(&config.input, &read_options)?;
    let players = raw.into_iter().map(Player::from).collect::<Vec<_>>();
    reports.write(&config.outputs.players, &players)?;

    let multi = multi_position(&players);
    reports.write(&config.outputs.multi_position, multi)?;

    for featured in &config.featured_teams {
        let roster = team_of(&players, &featured.name);
        if roster.is_empty() {
            warn!("No players found for featured team '{}'", featured.name);
        }
        reports.write(&featured.output, roster)?;
    }

    let countries = sorted_team_names(&players, config.expected_team_count)?;
    debug!("Teams: {:?}", countries);

    let leaders = top_scorers(&players);
    let leader_names = leaders
        .iter()
        .map(|player| player.name.clone())
        .collect::<Vec<_>>();
    match leaders.first() {
        Some(leader) => info!(
            "Top scorer(s) with {} goal(s): {}",
            leader.shooting.goals,
            leader_names.join(", ")
        ),
        None => info!("No player scored a goal"),
    }

    let team_leaders = team_top_scorers(&players, &countries);
    reports.write(&config.outputs.team_top_scorers, team_leaders)?;

    if let Some(first) = players.first() {
        let numbers = player_shooting_numbers(first);
        info!(
            "First player '{}': goals = {}, shots = {}, shots_on_target = {}",
            first.name, numbers.goals, numbers.shots, numbers.shots_on_target
        );
    }

    let player_count = players.len();
    let enriched = players
        .into_iter()
        .map(PlayerEfficiency::from)
        .collect::<Vec<_>>();
    reports.write(&config.outputs.player_efficiency, &enriched)?;

    let teams = team_summaries(&enriched, &countries)?;
    reports.write(&config.outputs.team_efficiency, &teams)?;

    let ratings = rank_teams(teams);
    reports.write(&config.outputs.team_ratings, &ratings)?;

    Ok(PipelineSummary {
        players: player_count,
        teams: countries,
        top_scorers: leader_names,
        reports: reports.into_written(),
    })
}

/// Loads the input table, keeps its first ten columns, and resolves each row
/// into a [`RawPlayer`] by header name.
pub fn load_raw_players(path: &Path, options: &ReadOptions) -> Result<Vec<RawPlayer>> {
    let mut table = io_utils::read_table(path, options)?;
    table.truncate_columns(RAW_COLUMN_COUNT);
    let columns = ColumnMap::resolve(&table.headers)
        .with_context(|| format!("Resolving player columns in {path:?}"))?;
    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            RawPlayer::from_row(&columns, row, idx + 2)
                .with_context(|| format!("Loading players from {path:?}"))
        })
        .collect()
}

/// Distinct squad names in ascending order. When `expected` is set the count
/// must match it exactly.
pub fn sorted_team_names(players: &[Player], expected: Option<usize>) -> Result<Vec<String>> {
    let mut countries = distinct_team_names(players);
    countries.sort();
    if let Some(expected) = expected
        && countries.len() != expected
    {
        return Err(PipelineError::UnexpectedTeamCount {
            expected,
            found: countries.len(),
        }
        .into());
    }
    Ok(countries)
}

/// Top scorer(s) of every team, grouped in `countries` order.
pub fn team_top_scorers<'a>(players: &'a [Player], countries: &[String]) -> Vec<&'a Player> {
    let mut leaders = Vec::new();
    for country in countries {
        let team = team_of(players, country);
        leaders.extend(top_scorers(team.iter().copied()));
    }
    leaders
}

/// Shooting totals and team-level conversion rates, one row per country.
pub fn team_summaries(
    players: &[PlayerEfficiency],
    countries: &[String],
) -> Result<Vec<TeamSummary>, PipelineError> {
    countries
        .iter()
        .map(|country| {
            let team = team_of(players, country);
            let totals = sum_shooting_numbers(team).ok_or_else(|| PipelineError::TotalOverflow {
                country: country.clone(),
            })?;
            Ok(TeamSummary::new(country.as_str(), totals))
        })
        .collect()
}

/// Assigns each team its efficiency tier and orders the result by
/// shots-on-target conversion rate (highest first), then country name.
pub fn rank_teams(teams: Vec<TeamSummary>) -> Vec<RatedTeam> {
    let mut rated = teams.into_iter().map(RatedTeam::from).collect::<Vec<_>>();
    rated.sort_by(|a, b| {
        b.summary
            .shots_on_target_conv_rate
            .total_cmp(&a.summary.shots_on_target_conv_rate)
            .then_with(|| a.summary.country.cmp(&b.summary.country))
    });
    rated
}

/// Writes records under the configured output directory and remembers each
/// path written.
struct ReportWriter<'a> {
    config: &'a PipelineConfig,
    options: WriteOptions,
    written: Vec<PathBuf>,
}

impl<'a> ReportWriter<'a> {
    fn new(config: &'a PipelineConfig, options: WriteOptions) -> Self {
        Self {
            config,
            options,
            written: Vec::new(),
        }
    }

    fn write<'r, T, I>(&mut self, file: &Path, records: I) -> Result<usize>
    where
        T: Record + 'r,
        I: IntoIterator<Item = &'r T>,
    {
        let path = self.config.output_path(file);
        let headers = T::headers();
        let rows = records.into_iter().map(|record| record.to_row());
        let count = io_utils::write_table(&path, Some(headers.as_slice()), rows, &self.options)
            .with_context(|| format!("Writing report {path:?}"))?;
        info!("Wrote {count} row(s) to {path:?}");
        self.written.push(path);
        Ok(count)
    }

    fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}
