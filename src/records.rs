//! Fixed-schema records for each stage of the report pipeline.
//!
//! The raw input is resolved into [`RawPlayer`] values through a [`ColumnMap`]
//! built once from the header row. Every later shape carries its own header
//! constant, so a header written next to a record can never drift from the
//! record's field order:
//!
//! - [`Player`]: position reformatted, squad split into code and name
//! - [`PlayerEfficiency`]: a player plus per-player conversion rates
//! - [`TeamSummary`]: shooting totals and conversion rates for one country
//! - [`RatedTeam`]: a team summary plus its [`EfficiencyTier`]

use std::fmt;

use crate::{
    error::PipelineError,
    normalize::{
        DEFAULT_RATE_PRECISION, conversion_rate, format_rate, reformat_position, split_squad,
    },
};

/// Number of leading input columns the pipeline keeps.
pub const RAW_COLUMN_COUNT: usize = 10;

pub const RAW_PLAYER_HEADERS: [&str; RAW_COLUMN_COUNT] = [
    "Rk", "Player", "Pos", "Squad", "Age", "Born", "90s", "Gls", "Sh", "SoT",
];

pub const PLAYER_HEADERS: [&str; 11] = [
    "Rk",
    "Player",
    "Pos",
    "Country_Code",
    "Squad",
    "Age",
    "Born",
    "90s",
    "Gls",
    "Sh",
    "SoT",
];

pub const PLAYER_RATE_HEADERS: [&str; 2] = ["shots_conv_rate", "shots_on_target_conv_rate"];

pub const TEAM_HEADERS: [&str; 6] = [
    "country",
    "goals",
    "shots",
    "shots_on_target",
    "shots_conv_rate",
    "shots_on_target_conv_rate",
];

pub const RATING_HEADER: &str = "efficiency_rating";

/// Rounding precision for per-player rates. Team rates use
/// [`DEFAULT_RATE_PRECISION`].
pub const PLAYER_RATE_PRECISION: u32 = 3;

/// A record that knows its own header and how to render itself as a CSV row.
pub trait Record {
    fn headers() -> Vec<String>;
    fn to_row(&self) -> Vec<String>;
}

/// Header positions for the raw player columns, resolved by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    rank: usize,
    player: usize,
    position: usize,
    squad: usize,
    age: usize,
    born: usize,
    nineties: usize,
    goals: usize,
    shots: usize,
    shots_on_target: usize,
}

impl ColumnMap {
    pub fn resolve(headers: &[String]) -> Result<Self, PipelineError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            rank: find("Rk")?,
            player: find("Player")?,
            position: find("Pos")?,
            squad: find("Squad")?,
            age: find("Age")?,
            born: find("Born")?,
            nineties: find("90s")?,
            goals: find("Gls")?,
            shots: find("Sh")?,
            shots_on_target: find("SoT")?,
        })
    }
}

/// Goals, shots, and shots on target, in that order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShootingNumbers {
    pub goals: i64,
    pub shots: i64,
    pub shots_on_target: i64,
}

impl ShootingNumbers {
    /// Field-wise sum, or `None` if any total leaves the `i64` range.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        Some(Self {
            goals: self.goals.checked_add(other.goals)?,
            shots: self.shots.checked_add(other.shots)?,
            shots_on_target: self.shots_on_target.checked_add(other.shots_on_target)?,
        })
    }
}

/// The `Gls`, `Sh` and `SoT` cells exactly as they appeared in the input.
/// Reports echo this text; arithmetic uses the parsed [`ShootingNumbers`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShootingText {
    pub goals: String,
    pub shots: String,
    pub shots_on_target: String,
}

/// One input row exactly as the dataset describes the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPlayer {
    pub rank: String,
    pub name: String,
    pub position: String,
    pub squad: String,
    pub age: String,
    pub born: String,
    pub nineties: String,
    pub shooting_text: ShootingText,
    pub shooting: ShootingNumbers,
}

impl RawPlayer {
    /// Builds a player from a decoded row. `line` is the 1-based source line,
    /// used only for error messages.
    pub fn from_row(
        columns: &ColumnMap,
        row: &[String],
        line: usize,
    ) -> Result<Self, PipelineError> {
        let text = |position: usize, column: &str| {
            row.get(position)
                .cloned()
                .ok_or_else(|| PipelineError::ShortRow {
                    line,
                    column: column.to_string(),
                    position: position + 1,
                    found: row.len(),
                })
        };
        let integer = |value: &str, column: &str| -> Result<i64, PipelineError> {
            value
                .trim()
                .parse::<i64>()
                .map_err(|_| PipelineError::InvalidInteger {
                    line,
                    column: column.to_string(),
                    value: value.to_string(),
                })
        };
        let rank = text(columns.rank, "Rk")?;
        let name = text(columns.player, "Player")?;
        let position = text(columns.position, "Pos")?;
        let squad = text(columns.squad, "Squad")?;
        let age = text(columns.age, "Age")?;
        let born = text(columns.born, "Born")?;
        let nineties = text(columns.nineties, "90s")?;
        let shooting_text = ShootingText {
            goals: text(columns.goals, "Gls")?,
            shots: text(columns.shots, "Sh")?,
            shots_on_target: text(columns.shots_on_target, "SoT")?,
        };
        let shooting = ShootingNumbers {
            goals: integer(&shooting_text.goals, "Gls")?,
            shots: integer(&shooting_text.shots, "Sh")?,
            shots_on_target: integer(&shooting_text.shots_on_target, "SoT")?,
        };
        Ok(Self {
            rank,
            name,
            position,
            squad,
            age,
            born,
            nineties,
            shooting_text,
            shooting,
        })
    }
}

/// A player after position reformatting and the squad split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub rank: String,
    pub name: String,
    pub position: String,
    pub country_code: String,
    pub squad: String,
    pub age: String,
    pub born: String,
    pub nineties: String,
    pub shooting_text: ShootingText,
    pub shooting: ShootingNumbers,
}

impl Player {
    pub fn positions(&self) -> impl Iterator<Item = &str> {
        self.position.split('|')
    }
}

impl From<RawPlayer> for Player {
    fn from(raw: RawPlayer) -> Self {
        let (country_code, squad) = split_squad(&raw.squad);
        Self {
            rank: raw.rank,
            name: raw.name,
            position: reformat_position(&raw.position),
            country_code,
            squad,
            age: raw.age,
            born: raw.born,
            nineties: raw.nineties,
            shooting_text: raw.shooting_text,
            shooting: raw.shooting,
        }
    }
}

impl AsRef<Player> for Player {
    fn as_ref(&self) -> &Player {
        self
    }
}

impl Record for Player {
    fn headers() -> Vec<String> {
        PLAYER_HEADERS.iter().map(|h| h.to_string()).collect()
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.rank.clone(),
            self.name.clone(),
            self.position.clone(),
            self.country_code.clone(),
            self.squad.clone(),
            self.age.clone(),
            self.born.clone(),
            self.nineties.clone(),
            self.shooting_text.goals.clone(),
            self.shooting_text.shots.clone(),
            self.shooting_text.shots_on_target.clone(),
        ]
    }
}

/// A player with shots and shots-on-target conversion rates appended.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEfficiency {
    pub player: Player,
    pub shots_conv_rate: f64,
    pub shots_on_target_conv_rate: f64,
}

impl From<Player> for PlayerEfficiency {
    fn from(player: Player) -> Self {
        let ShootingNumbers {
            goals,
            shots,
            shots_on_target,
        } = player.shooting;
        Self {
            shots_conv_rate: conversion_rate(goals, shots, PLAYER_RATE_PRECISION),
            shots_on_target_conv_rate: conversion_rate(
                goals,
                shots_on_target,
                PLAYER_RATE_PRECISION,
            ),
            player,
        }
    }
}

impl AsRef<Player> for PlayerEfficiency {
    fn as_ref(&self) -> &Player {
        &self.player
    }
}

impl Record for PlayerEfficiency {
    fn headers() -> Vec<String> {
        let mut headers = Player::headers();
        headers.extend(PLAYER_RATE_HEADERS.iter().map(|h| h.to_string()));
        headers
    }

    fn to_row(&self) -> Vec<String> {
        let mut row = self.player.to_row();
        row.push(format_rate(self.shots_conv_rate));
        row.push(format_rate(self.shots_on_target_conv_rate));
        row
    }
}

/// Shooting totals and team-level conversion rates for one country.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSummary {
    pub country: String,
    pub shooting: ShootingNumbers,
    pub shots_conv_rate: f64,
    pub shots_on_target_conv_rate: f64,
}

impl TeamSummary {
    pub fn new(country: impl Into<String>, shooting: ShootingNumbers) -> Self {
        Self {
            country: country.into(),
            shots_conv_rate: conversion_rate(
                shooting.goals,
                shooting.shots,
                DEFAULT_RATE_PRECISION,
            ),
            shots_on_target_conv_rate: conversion_rate(
                shooting.goals,
                shooting.shots_on_target,
                DEFAULT_RATE_PRECISION,
            ),
            shooting,
        }
    }
}

impl Record for TeamSummary {
    fn headers() -> Vec<String> {
        TEAM_HEADERS.iter().map(|h| h.to_string()).collect()
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.country.clone(),
            self.shooting.goals.to_string(),
            self.shooting.shots.to_string(),
            self.shooting.shots_on_target.to_string(),
            format_rate(self.shots_conv_rate),
            format_rate(self.shots_on_target_conv_rate),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EfficiencyTier {
    Top,
    UpperMiddle,
    LowerMiddle,
    Bottom,
}

impl EfficiencyTier {
    /// Buckets a shots-on-target conversion rate.
    pub fn classify(rate: f64) -> Self {
        if rate >= 0.4 {
            EfficiencyTier::Top
        } else if rate >= 0.3 {
            EfficiencyTier::UpperMiddle
        } else if rate >= 0.2 {
            EfficiencyTier::LowerMiddle
        } else {
            EfficiencyTier::Bottom
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EfficiencyTier::Top => "Top Tier",
            EfficiencyTier::UpperMiddle => "Upper Middle Tier",
            EfficiencyTier::LowerMiddle => "Lower Middle Tier",
            EfficiencyTier::Bottom => "Bottom Tier",
        }
    }
}

impl fmt::Display for EfficiencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatedTeam {
    pub summary: TeamSummary,
    pub tier: EfficiencyTier,
}

impl From<TeamSummary> for RatedTeam {
    fn from(summary: TeamSummary) -> Self {
        Self {
            tier: EfficiencyTier::classify(summary.shots_on_target_conv_rate),
            summary,
        }
    }
}

impl Record for RatedTeam {
    fn headers() -> Vec<String> {
        let mut headers = TeamSummary::headers();
        headers.push(RATING_HEADER.to_string());
        headers
    }

    fn to_row(&self) -> Vec<String> {
        let mut row = self.summary.to_row();
        row.push(self.tier.to_string());
        row
    }
}
