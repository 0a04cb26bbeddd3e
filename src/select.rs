//! Whole-table selections and aggregations over player records.
//!
//! Everything here accepts any record that exposes a [`Player`], so the same
//! functions serve both the reshaped roster and the efficiency-enriched one.

use itertools::Itertools;

use crate::records::{Player, ShootingNumbers};

/// Players listed under more than one position.
pub fn multi_position<T: AsRef<Player>>(players: &[T]) -> Vec<&T> {
    players
        .iter()
        .filter(|player| player.as_ref().positions().count() > 1)
        .collect()
}

/// Members of the squad called `name`, compared case-insensitively.
pub fn team_of<'a, T: AsRef<Player>>(players: &'a [T], name: &str) -> Vec<&'a T> {
    let wanted = name.to_lowercase();
    players
        .iter()
        .filter(|player| player.as_ref().squad.to_lowercase() == wanted)
        .collect()
}

/// Squad names in the order they first appear.
pub fn distinct_team_names<T: AsRef<Player>>(players: &[T]) -> Vec<String> {
    players
        .iter()
        .map(|player| player.as_ref().squad.as_str())
        .unique()
        .map(str::to_string)
        .collect()
}

/// Every player tied on the highest goal tally. Players without a goal never
/// qualify, so a goalless input yields an empty list.
pub fn top_scorers<'a, T, I>(players: I) -> Vec<&'a T>
where
    T: AsRef<Player> + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut leaders = Vec::new();
    let mut most_goals = 0;
    for player in players {
        let goals = player.as_ref().shooting.goals;
        if goals <= 0 {
            continue;
        }
        if goals > most_goals {
            most_goals = goals;
            leaders.clear();
            leaders.push(player);
        } else if goals == most_goals {
            leaders.push(player);
        }
    }
    leaders
}

/// Goals, shots, and shots on target for a single player.
pub fn player_shooting_numbers<T: AsRef<Player>>(player: &T) -> ShootingNumbers {
    player.as_ref().shooting
}

/// Shooting numbers summed across `players`, or `None` when a total
/// overflows.
pub fn sum_shooting_numbers<'a, T, I>(players: I) -> Option<ShootingNumbers>
where
    T: AsRef<Player> + 'a,
    I: IntoIterator<Item = &'a T>,
{
    players
        .into_iter()
        .try_fold(ShootingNumbers::default(), |totals, player| {
            totals.checked_add(player_shooting_numbers(player))
        })
}
