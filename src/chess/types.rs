use super::error::ErrorAccumulator;
use super::timecontrol::{ParsedTimeControl, parse_timecontrol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Termination {
    WhiteWin,
    BlackWin,
    Draw,
    #[default]
    Unknown,
}

impl Termination {
    pub fn from_marker(marker: &str) -> Self {
        match marker {
            "1-0" => Self::WhiteWin,
            "0-1" => Self::BlackWin,
            "1/2-1/2" => Self::Draw,
            _ => Self::Unknown,
        }
    }

    pub fn is_resolved(self) -> bool {
        self != Self::Unknown
    }
}

/// Header tag pairs in file order. Names are unique; the first value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagPairs(Vec<(String, String)>);

impl TagPairs {
    /// Returns `false` when `name` was already present (the new value is dropped).
    pub fn insert(&mut self, name: String, value: String) -> bool {
        if self.get(&name).is_some() {
            return false;
        }
        self.0.push((name, value));
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Typed view of the tags the analysis reads. PGN placeholders (`?`, `-`,
/// empty) are resolved to `None` here so nothing downstream checks sentinels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameHeader {
    pub white: Option<String>,
    pub black: Option<String>,
    pub white_elo: Option<u32>,
    pub black_elo: Option<u32>,
    pub eco: Option<String>,
    /// `None` only when the tag is missing; unusable values parse to
    /// `Mode::Unknown`.
    pub time_control: Option<ParsedTimeControl>,
    /// Conversion diagnostics, `None` when every field converted cleanly.
    pub conversion_error: Option<String>,
}

impl GameHeader {
    pub(crate) fn from_tags(tags: &TagPairs) -> Self {
        let mut parse_error = ErrorAccumulator::default();

        let white_elo = parse_rating_field(tags.get("WhiteElo"), "WhiteElo", &mut parse_error);
        let black_elo = parse_rating_field(tags.get("BlackElo"), "BlackElo", &mut parse_error);
        let time_control = tags.get("TimeControl").map(|raw| {
            parse_timecontrol(raw).unwrap_or_else(|e| {
                parse_error.push(&format!("Conversion error: TimeControl='{raw}' ({e})"));
                ParsedTimeControl::unknown(raw)
            })
        });

        Self {
            white: known_text(tags.get("White")),
            black: known_text(tags.get("Black")),
            white_elo,
            black_elo,
            eco: known_text(tags.get("ECO")),
            time_control,
            conversion_error: parse_error.take(),
        }
    }
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value == "?" || value == "-"
}

fn known_text(raw: Option<&str>) -> Option<String> {
    let s = raw?.trim();
    (!is_placeholder(s)).then(|| s.to_string())
}

fn parse_rating_field(
    raw: Option<&str>,
    label: &str,
    parse_error: &mut ErrorAccumulator,
) -> Option<u32> {
    let s = raw?.trim();
    if is_placeholder(s) {
        return None;
    }
    match s.parse::<u32>() {
        Ok(v) => Some(v),
        Err(_) => {
            parse_error.push(&format!("Conversion error: {label}='{s}'"));
            None
        }
    }
}

/// A parsed game. Built by the parser and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    tags: TagPairs,
    moves: Vec<String>,
    termination: Termination,
    header: GameHeader,
}

impl Game {
    pub(crate) fn new(tags: TagPairs, moves: Vec<String>, termination: Termination) -> Self {
        let header = GameHeader::from_tags(&tags);
        Self {
            tags,
            moves,
            termination,
            header,
        }
    }

    pub fn tags(&self) -> &TagPairs {
        &self.tags
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    pub fn termination(&self) -> Termination {
        self.termination
    }

    pub fn header(&self) -> &GameHeader {
        &self.header
    }

    /// Moves joined with single spaces, the form opening prefixes are written in.
    pub fn move_text(&self) -> String {
        self.moves.join(" ")
    }
}
