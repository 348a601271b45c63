use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::openings::OpeningIndex;
use super::timecontrol::{Speed, speed_for};
use super::types::{Game, Termination};

/// Separates alternative account names in a subject identity,
/// e.g. `magnus||DrNykterstein`.
pub const IDENTITY_SEPARATOR: &str = "||";

/// The set of player names that identify the subject of an analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectNames(HashSet<String>);

impl SubjectNames {
    pub fn parse(identity: &str) -> Self {
        Self(
            identity
                .split(IDENTITY_SEPARATOR)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Black,
}

/// Running mean of opponent ratings for one speed bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingAverage {
    pub average: f64,
    pub samples: u64,
}

impl RatingAverage {
    pub fn push(&mut self, rating: u32) {
        let n = self.samples as f64;
        self.average = (self.average * n + f64::from(rating)) / (n + 1.0);
        self.samples += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningTally {
    pub eco_code: String,
    pub full_name: String,
    pub count: u64,
}

/// Statistics for one shard of games. Every field has a single merge rule,
/// see [`crate::chess::reduce::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialResult {
    pub count: u64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    pub rating_by_speed: BTreeMap<Speed, RatingAverage>,
    pub opening_tally: Vec<OpeningTally>,
}

impl PartialResult {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Compute shard statistics for `subject` over `games`.
pub fn analyze(games: &[Game], subject: &SubjectNames, openings: &OpeningIndex) -> PartialResult {
    let mut result = PartialResult {
        count: games.len() as u64,
        ..PartialResult::default()
    };

    for game in games {
        tally_opening(game, openings, &mut result.opening_tally);

        let Some(color) = subject_color(game, subject) else {
            continue;
        };
        match (game.termination(), color) {
            (Termination::Unknown, _) => continue,
            (Termination::Draw, _) => result.draws += 1,
            (Termination::WhiteWin, Color::White) | (Termination::BlackWin, Color::Black) => {
                result.wins += 1
            }
            (Termination::WhiteWin, Color::Black) | (Termination::BlackWin, Color::White) => {
                result.losses += 1
            }
        }

        let header = game.header();
        let opponent_elo = match color {
            Color::White => header.black_elo,
            Color::Black => header.white_elo,
        };
        let Some(rating) = opponent_elo else {
            continue;
        };
        let Some(speed) = speed_for(header.time_control.as_ref()) else {
            log::debug!(
                "skipping rating {rating}: unusable time control '{}'",
                header
                    .time_control
                    .as_ref()
                    .map_or("", |tc| tc.raw.as_str())
            );
            continue;
        };
        result.rating_by_speed.entry(speed).or_default().push(rating);
    }

    result
}

fn subject_color(game: &Game, subject: &SubjectNames) -> Option<Color> {
    let header = game.header();
    let plays = |name: &Option<String>| name.as_deref().is_some_and(|n| subject.contains(n));

    if plays(&header.white) {
        Some(Color::White)
    } else if plays(&header.black) {
        Some(Color::Black)
    } else {
        None
    }
}

fn tally_opening(game: &Game, openings: &OpeningIndex, tally: &mut Vec<OpeningTally>) {
    let Some(eco) = game.header().eco.as_deref() else {
        return;
    };
    if game.moves().len() < 2 {
        return;
    }

    let move_text = game.move_text();
    match openings.resolve(&move_text, Some(eco)) {
        Some(found) => tally.push(OpeningTally {
            eco_code: found.eco_code.to_string(),
            full_name: found.full_name.to_string(),
            count: 1,
        }),
        None => log::warn!("no opening found for ECO '{eco}' with moves '{move_text}'"),
    }
}
