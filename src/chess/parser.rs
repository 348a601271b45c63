use std::mem;

use super::error::PgnError;
use super::lexer::{Token, TokenKind, lex};
use super::types::{Game, TagPairs, Termination};

/// Lex and parse `text` in one step.
pub fn parse_games(text: &str) -> Result<Vec<Game>, PgnError> {
    let tokens = lex(text)?;
    Ok(parse(&tokens))
}

/// Build games from a token stream. Never fails: an empty stream yields no
/// games and a game without a termination marker ends as `Unknown`.
pub fn parse(tokens: &[Token]) -> Vec<Game> {
    let mut builder = GameBuilder::default();
    let mut games = Vec::new();
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        match token.kind {
            TokenKind::LeftBracket => {
                // A header after movetext starts the next game.
                if builder.in_movetext {
                    games.push(builder.finish(Termination::Unknown));
                }
                match (iter.next(), iter.next(), iter.next()) {
                    (Some(name), Some(value), Some(close))
                        if name.kind == TokenKind::Symbol
                            && value.kind == TokenKind::String
                            && close.kind == TokenKind::RightBracket =>
                    {
                        builder.tag(&name.text, &value.text);
                    }
                    _ => {
                        log::debug!(
                            "dropping incomplete tag pair at byte {}",
                            token.position
                        );
                    }
                }
            }
            TokenKind::Move => builder.san(&token.text),
            TokenKind::Termination => {
                if builder.is_open() {
                    games.push(builder.finish(Termination::from_marker(&token.text)));
                } else {
                    log::debug!(
                        "ignoring '{}' outside a game at byte {}",
                        token.text,
                        token.position
                    );
                }
            }
            TokenKind::Symbol => {
                builder.movetext();
                log::debug!(
                    "skipping unrecognized movetext symbol '{}' at byte {}",
                    token.text,
                    token.position
                );
            }
            TokenKind::MoveNumber { .. } | TokenKind::Comment | TokenKind::Nag => {
                builder.movetext();
            }
            TokenKind::String | TokenKind::RightBracket => {
                log::debug!("skipping stray '{}' at byte {}", token.text, token.position);
            }
        }
    }

    if builder.is_open() {
        games.push(builder.finish(Termination::Unknown));
    }
    games
}

#[derive(Default)]
struct GameBuilder {
    tags: TagPairs,
    moves: Vec<String>,
    in_movetext: bool,
}

impl GameBuilder {
    fn tag(&mut self, name: &str, value: &str) {
        if !self.tags.insert(name.to_string(), value.to_string()) {
            log::debug!("ignoring duplicate tag '{name}'");
        }
    }

    fn san(&mut self, san: &str) {
        self.in_movetext = true;
        self.moves.push(san.to_string());
    }

    /// Annotations only count as movetext once a game has tags or moves.
    fn movetext(&mut self) {
        if self.is_open() {
            self.in_movetext = true;
        }
    }

    fn is_open(&self) -> bool {
        !self.tags.is_empty() || !self.moves.is_empty()
    }

    fn finish(&mut self, termination: Termination) -> Game {
        self.in_movetext = false;
        Game::new(
            mem::take(&mut self.tags),
            mem::take(&mut self.moves),
            termination,
        )
    }
}
