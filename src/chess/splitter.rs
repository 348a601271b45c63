use std::sync::LazyLock;

use regex::Regex;

/// Every game opens with an `[Event ` tag at the start of a line.
static GAME_BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\[Event\b").expect("valid game boundary regex"));

/// Text made only of whitespace, `{}` comments and `;`/`%` line comments.
static COMMENTARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A(?:\s+|\{[^}]*\}|;[^\n]*|%[^\n]*)*\z").expect("valid commentary regex")
});

/// Cut a multi-game blob into per-game segments without looking at movetext.
///
/// Each segment starts at a game boundary and runs up to the next one, so
/// segments are independently lexable. Text before the first boundary is
/// kept as its own segment when it may hold a game; whitespace and comments
/// there are attached to the first game instead. Commentary with no game
/// after it is dropped.
pub fn split(raw: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = GAME_BOUNDARY_RE.find_iter(raw).map(|m| m.start()).collect();

    let first = starts.first().copied().unwrap_or(raw.len());
    if COMMENTARY_RE.is_match(&raw[..first]) {
        if let Some(start) = starts.first_mut() {
            *start = 0;
        }
    } else {
        starts.insert(0, 0);
    }

    starts.push(raw.len());
    starts.windows(2).map(|w| &raw[w[0]..w[1]]).collect()
}

/// Group consecutive game segments into shards of at most `games_per_shard`
/// games each.
pub fn shards(raw: &str, games_per_shard: usize) -> Vec<String> {
    split(raw)
        .chunks(games_per_shard.max(1))
        .map(|chunk| chunk.concat())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::parser::parse_games;

    const THREE_GAMES: &str = r#"[Event "Rated Blitz game"]
[White "alice"]
[Black "bob"]

1. e4 e5 2. Nf3 1-0

[Event "Rated Blitz game"]
[White "bob"]
[Black "alice"]

1. d4 { [%clk 0:03:00] } 1... d5 0-1

[Event "Casual"]
[EventDate "?"]
[White "carol"]
[Black "alice"]

1. c4 *
"#;

    #[test]
    fn test_split_returns_one_segment_per_game() {
        let segments = split(THREE_GAMES);
        assert_eq!(segments.len(), 3);
        for segment in &segments {
            assert!(segment.starts_with("[Event "));
        }
    }

    #[test]
    fn test_segments_reassemble_input() {
        assert_eq!(split(THREE_GAMES).concat(), THREE_GAMES);
    }

    #[test]
    fn test_segments_parse_like_the_whole_blob() {
        let whole = parse_games(THREE_GAMES).unwrap();
        let mut pieces = Vec::new();
        for segment in split(THREE_GAMES) {
            let games = parse_games(segment).unwrap();
            assert_eq!(games.len(), 1);
            pieces.extend(games);
        }
        assert_eq!(pieces, whole);
    }

    #[test]
    fn test_event_date_is_not_a_boundary() {
        let segments = split(THREE_GAMES);
        assert!(segments[2].contains("[EventDate"));
    }

    #[test]
    fn test_preamble_is_kept() {
        let raw = "[White \"x\"]\n1. e4 1-0\n[Event \"b\"]\n1. d4 0-1\n";
        let segments = split(raw);
        assert_eq!(segments.len(), 2);
        assert!(segments[0].starts_with("[White"));
    }

    #[test]
    fn test_comment_preamble_joins_first_game() {
        let raw = format!("; exported by tool\n{{ batch 7 }}\n\n{THREE_GAMES}");
        let segments = split(&raw);
        assert_eq!(segments.len(), 3);
        assert!(segments[0].starts_with("; exported by tool"));
        assert_eq!(segments.concat(), raw);
        for segment in &segments {
            assert_eq!(parse_games(segment).unwrap().len(), 1);
        }
    }

    #[test]
    fn test_comment_between_games_stays_in_one_segment() {
        let raw = "[Event \"a\"]\n[White \"alice\"]\n\n1. e4 e5 1-0\n{ annotated by coach }\n\n\
                   [Event \"b\"]\n[White \"alice\"]\n\n1. d4 d5 0-1\n";
        let segments = split(raw);
        assert_eq!(segments.len(), 2);
        for segment in &segments {
            assert_eq!(parse_games(segment).unwrap().len(), 1);
        }
    }

    #[test]
    fn test_blank_input() {
        assert!(split("").is_empty());
        assert!(split("\n  \n").is_empty());
        assert!(split("{ no games }\n; none\n").is_empty());
    }

    #[test]
    fn test_shards_group_games() {
        let shards = shards(THREE_GAMES, 2);
        assert_eq!(shards.len(), 2);
        assert_eq!(parse_games(&shards[0]).unwrap().len(), 2);
        assert_eq!(parse_games(&shards[1]).unwrap().len(), 1);
        assert_eq!(shards.concat(), THREE_GAMES);
    }

    #[test]
    fn test_zero_shard_size_means_one_game_per_shard() {
        assert_eq!(shards(THREE_GAMES, 0).len(), 3);
    }
}
