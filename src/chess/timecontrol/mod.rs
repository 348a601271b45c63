use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod strict;

pub const BULLET_TIME_LIMIT: u32 = 3 * 60;
pub const BLITZ_TIME_LIMIT: u32 = 10 * 60;
pub const RAPID_TIME_LIMIT: u32 = 60 * 60;

/// Duration assumed for games that declare no `TimeControl` tag at all.
pub const DEFAULT_DURATION_SECONDS: u32 = RAPID_TIME_LIMIT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub moves: Option<u32>,
    pub base_seconds: u32,
    pub increment_seconds: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Unknown,
    Unlimited,
    Sandclock,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTimeControl {
    pub raw: String,
    pub periods: Vec<Period>,
    pub mode: Mode,
}

impl ParsedTimeControl {
    pub fn unknown(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            periods: Vec::new(),
            mode: Mode::Unknown,
        }
    }

    /// Base duration of the first period, or `None` when the control carries
    /// no usable duration (`?`, `-`, unparseable).
    pub fn duration_seconds(&self) -> Option<u32> {
        match self.mode {
            Mode::Normal | Mode::Sandclock => self.periods.first().map(|p| p.base_seconds),
            Mode::Unknown | Mode::Unlimited => None,
        }
    }

    pub fn speed(&self) -> Option<Speed> {
        self.duration_seconds().map(Speed::from_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeControlError {
    #[error("empty input")]
    Empty,
    #[error("unrecognized time control '{0}'")]
    Unrecognized(String),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Speed {
    Bullet,
    Blitz,
    Rapid,
    Classical,
}

impl Speed {
    pub fn from_seconds(seconds: u32) -> Self {
        match seconds {
            s if s < BULLET_TIME_LIMIT => Self::Bullet,
            s if s < BLITZ_TIME_LIMIT => Self::Blitz,
            s if s < RAPID_TIME_LIMIT => Self::Rapid,
            _ => Self::Classical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullet => "bullet",
            Self::Blitz => "blitz",
            Self::Rapid => "rapid",
            Self::Classical => "classical",
        }
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_u32(s: &str) -> Option<u32> {
    s.parse().ok()
}

pub fn parse_timecontrol(raw: &str) -> Result<ParsedTimeControl, TimeControlError> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(TimeControlError::Empty);
    }

    strict::try_strict_parse(input)
        .map(|mut parsed| {
            parsed.raw = raw.to_string();
            parsed
        })
        .ok_or_else(|| TimeControlError::Unrecognized(input.to_string()))
}

/// Speed bucket for a game's declared control. A missing tag counts as a
/// full classical game; a present but unusable one yields `None`.
pub fn speed_for(time_control: Option<&ParsedTimeControl>) -> Option<Speed> {
    match time_control {
        None => Some(Speed::from_seconds(DEFAULT_DURATION_SECONDS)),
        Some(parsed) => parsed.speed(),
    }
}
