use std::sync::LazyLock;

use regex::Regex;
use shakmaty::san::SanPlus;

use super::error::PgnError;

static TAG_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[[ \t]*([A-Za-z0-9_][A-Za-z0-9_+#=:\-]*)[ \t]*"((?:[^"\\\r\n]|\\.)*)"[ \t]*\]"#)
        .expect("valid tag pair regex")
});

const TERMINATION_MARKERS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LeftBracket,
    RightBracket,
    String,
    Symbol,
    /// `12.` (white to move) or `12...` (black to move, `continuation`).
    /// `number` is the full-move number as written.
    MoveNumber {
        number: u32,
        continuation: bool,
    },
    Move,
    Comment,
    Nag,
    Termination,
}

/// A lexed unit of PGN text. `position` is the byte offset in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }
}

/// Tokenize PGN text: tag pairs, movetext and termination markers, for any
/// number of concatenated games.
pub fn lex(text: &str) -> Result<Vec<Token>, PgnError> {
    Lexer::new(text).run()
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            tokens: Vec::with_capacity(src.len() / 4),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, PgnError> {
        while let Some(byte) = self.peek() {
            match byte {
                b if b.is_ascii_whitespace() => self.pos += 1,
                b'[' => self.tag_pair()?,
                b'{' => self.brace_comment(),
                b';' => self.line_comment(),
                b'(' => self.variation(),
                b'%' if self.at_line_start() => self.skip_line(),
                b'$' => self.numeric_nag(),
                b'*' => {
                    self.tokens
                        .push(Token::new(TokenKind::Termination, "*", self.pos));
                    self.pos += 1;
                }
                b')' | b']' | b'}' => {
                    let src = self.src;
                    let text = &src[self.pos..self.pos + 1];
                    self.tokens.push(Token::new(TokenKind::Symbol, text, self.pos));
                    self.pos += 1;
                }
                _ => self.word(),
            }
        }
        Ok(self.tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.src.as_bytes()[self.pos - 1] == b'\n'
    }

    fn find_from(&self, from: usize, needle: u8) -> Option<usize> {
        self.src.as_bytes()[from..]
            .iter()
            .position(|&b| b == needle)
            .map(|offset| from + offset)
    }

    fn tag_pair(&mut self) -> Result<(), PgnError> {
        let src = self.src;
        let start = self.pos;
        let malformed = PgnError::MalformedTagPair { position: start };
        let caps = TAG_PAIR_RE
            .captures(&src[start..])
            .ok_or_else(|| malformed.clone())?;
        let (Some(whole), Some(name), Some(value)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            return Err(malformed);
        };

        self.tokens
            .push(Token::new(TokenKind::LeftBracket, "[", start));
        self.tokens.push(Token::new(
            TokenKind::Symbol,
            name.as_str(),
            start + name.start(),
        ));
        // The string token starts at its opening quote.
        self.tokens.push(Token::new(
            TokenKind::String,
            unescape(value.as_str()),
            start + value.start() - 1,
        ));
        let end = start + whole.end();
        self.tokens
            .push(Token::new(TokenKind::RightBracket, "]", end - 1));
        self.pos = end;
        Ok(())
    }

    fn brace_comment(&mut self) {
        let src = self.src;
        let start = self.pos;
        let (body_end, next) = match self.find_from(start + 1, b'}') {
            Some(close) => (close, close + 1),
            None => (self.src.len(), self.src.len()),
        };
        let body = src[start + 1..body_end].trim();
        self.tokens
            .push(Token::new(TokenKind::Comment, body, start));
        self.pos = next;
    }

    fn line_comment(&mut self) {
        let src = self.src;
        let start = self.pos;
        let end = self.find_from(start, b'\n').unwrap_or(src.len());
        let body = src[start + 1..end].trim();
        self.tokens
            .push(Token::new(TokenKind::Comment, body, start));
        self.pos = end;
    }

    fn skip_line(&mut self) {
        self.pos = self.find_from(self.pos, b'\n').unwrap_or(self.src.len());
    }

    /// Variations are not followed; the whole balanced group becomes one
    /// comment so it never feeds moves into the mainline.
    fn variation(&mut self) {
        let src = self.src;
        let start = self.pos;
        let bytes = src.as_bytes();
        let mut depth = 0usize;
        let mut i = start;
        while i < bytes.len() {
            match bytes[i] {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        i += 1;
                        break;
                    }
                }
                b'{' => {
                    i = self.find_from(i, b'}').unwrap_or(bytes.len() - 1);
                }
                _ => {}
            }
            i += 1;
        }
        let end = i.min(bytes.len());
        let inner_end = if depth == 0 { end - 1 } else { end };
        let body = src[start + 1..inner_end].trim();
        self.tokens
            .push(Token::new(TokenKind::Comment, body, start));
        self.pos = end;
    }

    fn numeric_nag(&mut self) {
        let src = self.src;
        let start = self.pos;
        let digits = src.as_bytes()[start + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        let end = start + 1 + digits;
        let kind = if digits == 0 {
            TokenKind::Symbol
        } else {
            TokenKind::Nag
        };
        self.tokens
            .push(Token::new(kind, &src[start..end], start));
        self.pos = end;
    }

    fn word(&mut self) {
        let src = self.src;
        let start = self.pos;
        let bytes = src.as_bytes();
        let mut end = start;
        while end < bytes.len() && !bytes[end].is_ascii_whitespace() && !is_delimiter(bytes[end])
        {
            end += 1;
        }
        self.pos = end;

        let word = &src[start..end];
        if TERMINATION_MARKERS.contains(&word) {
            self.tokens
                .push(Token::new(TokenKind::Termination, word, start));
            return;
        }

        if let Some((number, prefix_len, continuation)) = split_move_number(word) {
            self.tokens.push(Token::new(
                TokenKind::MoveNumber {
                    number,
                    continuation,
                },
                &word[..prefix_len],
                start,
            ));
            let rest = &word[prefix_len..];
            if !rest.is_empty() {
                self.move_or_symbol(rest, start + prefix_len);
            }
            return;
        }

        self.move_or_symbol(word, start);
    }

    /// Splits suffix glyphs (`!`, `?!`, ...) off a move before checking SAN syntax.
    fn move_or_symbol(&mut self, word: &str, start: usize) {
        let san_len = word.trim_end_matches(['!', '?']).len();
        let (san, glyph) = word.split_at(san_len);

        if !san.is_empty() {
            let kind = if san.parse::<SanPlus>().is_ok() {
                TokenKind::Move
            } else {
                TokenKind::Symbol
            };
            self.tokens.push(Token::new(kind, san, start));
        }

        if !glyph.is_empty() {
            self.tokens
                .push(Token::new(TokenKind::Nag, glyph, start + san_len));
        }
    }
}

fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'[' | b']' | b'{' | b'}' | b'(' | b')' | b';' | b'$'
    )
}

/// `12.` / `12...` / `12` at the start of a word. Returns the number, the
/// byte length of the number-and-dots prefix and whether it had several dots.
fn split_move_number(word: &str) -> Option<(u32, usize, bool)> {
    let digits = word.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let dots = word[digits..].bytes().take_while(|&b| b == b'.').count();
    let prefix_len = digits + dots;
    if dots == 0 && prefix_len != word.len() {
        return None;
    }

    let number = word[..digits].parse().ok()?;
    Some((number, prefix_len, dots > 1))
}

fn unescape(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAGS_ONLY: &str = include_str!("../../tests/fixtures/tags_only.pgn");
    const WITH_MOVES: &str = include_str!("../../tests/fixtures/with_moves.pgn");
    const CLOCK_ANNOTATED: &str = include_str!("../../tests/fixtures/clock_annotated.pgn");
    const MALFORMED_ROUND: &str = include_str!("../../tests/fixtures/malformed_round.pgn");

    fn count(tokens: &[Token], pred: impl Fn(&TokenKind) -> bool) -> usize {
        tokens.iter().filter(|t| pred(&t.kind)).count()
    }

    fn is_move_number(kind: &TokenKind) -> bool {
        matches!(kind, TokenKind::MoveNumber { .. })
    }

    #[test]
    fn test_lex_tags_only() {
        let tokens = lex(TAGS_ONLY).unwrap();
        assert_eq!(tokens.len(), 48);
        assert_eq!(count(&tokens, |k| *k == TokenKind::LeftBracket), 12);
        assert_eq!(count(&tokens, is_move_number), 0);
    }

    #[test]
    fn test_lex_with_moves() {
        let tokens = lex(WITH_MOVES).unwrap();
        assert_eq!(count(&tokens, is_move_number), 23);
        assert_eq!(count(&tokens, |k| *k == TokenKind::Move), 46);
        assert!(count(&tokens, |k| *k == TokenKind::Termination) >= 1);
        assert_eq!(tokens.len(), 48 + 23 + 46 + 1);
    }

    #[test]
    fn test_lex_clock_annotated_moves() {
        let tokens = lex(CLOCK_ANNOTATED).unwrap();
        assert_eq!(count(&tokens, is_move_number), 37);
        assert_eq!(
            count(&tokens, |k| matches!(
                k,
                TokenKind::MoveNumber {
                    continuation: true,
                    ..
                }
            )),
            18
        );
        assert_eq!(count(&tokens, |k| *k == TokenKind::Move), 38);
        assert_eq!(count(&tokens, |k| *k == TokenKind::Comment), 37);
        assert_eq!(count(&tokens, |k| *k == TokenKind::Symbol), 21);
    }

    #[test]
    fn test_lex_malformed_tag_pair() {
        let err = lex(MALFORMED_ROUND).unwrap_err();
        assert!(matches!(err, PgnError::MalformedTagPair { .. }));
        assert_eq!(err.to_string(), "TagPair Not correctly structured");
    }

    #[test]
    fn test_lex_unquoted_value_is_malformed() {
        assert!(lex("[Round 9]\n").is_err());
        assert!(lex("[Round \"9\"\n").is_err());
    }

    #[test]
    fn test_tag_pair_tokens_and_positions() {
        let tokens = lex(r#"[White "Garry Kasparov"]"#).unwrap();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::LeftBracket,
                TokenKind::Symbol,
                TokenKind::String,
                TokenKind::RightBracket
            ]
        );
        assert_eq!(tokens[1].text, "White");
        assert_eq!(tokens[1].position, 1);
        assert_eq!(tokens[2].text, "Garry Kasparov");
        assert_eq!(tokens[2].position, 7);
        assert_eq!(tokens[3].position, 23);
    }

    #[test]
    fn test_tag_value_escapes() {
        let tokens = lex(r#"[Event "The \"Immortal\" \\ Game"]"#).unwrap();
        assert_eq!(tokens[2].text, r#"The "Immortal" \ Game"#);
    }

    #[test]
    fn test_move_number_forms() {
        let tokens = lex("1.e4 1... c5 2. Nf3").unwrap();
        assert_eq!(
            tokens[0].kind,
            TokenKind::MoveNumber {
                number: 1,
                continuation: false
            }
        );
        assert_eq!(tokens[0].text, "1.");
        assert_eq!(tokens[1].kind, TokenKind::Move);
        assert_eq!(tokens[1].text, "e4");
        assert_eq!(tokens[1].position, 2);
        assert_eq!(
            tokens[2].kind,
            TokenKind::MoveNumber {
                number: 1,
                continuation: true
            }
        );
        assert_eq!(tokens[2].text, "1...");
    }

    #[test]
    fn test_clock_comment_is_single_token() {
        let tokens = lex("1. e4 {[%clk 0:00:59.2] [%eval 0.3]} e5").unwrap();
        let comments: Vec<&Token> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Comment)
            .collect();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].text, "[%clk 0:00:59.2] [%eval 0.3]");
        assert_eq!(count(&tokens, |k| *k == TokenKind::Move), 2);
        assert_eq!(count(&tokens, |k| *k == TokenKind::LeftBracket), 0);
    }

    #[test]
    fn test_suffix_glyphs_split_from_moves() {
        let tokens = lex("1. e4!? e5?? 2. Qh5$1").unwrap();
        let moves: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Move)
            .map(|t| t.text.as_str())
            .collect();
        let nags: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Nag)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(moves, vec!["e4", "e5", "Qh5"]);
        assert_eq!(nags, vec!["!?", "??", "$1"]);
    }

    #[test]
    fn test_termination_markers() {
        for marker in ["1-0", "0-1", "1/2-1/2", "*"] {
            let tokens = lex(&format!("1. e4 {marker}")).unwrap();
            let last = tokens.last().unwrap();
            assert_eq!(last.kind, TokenKind::Termination);
            assert_eq!(last.text, marker);
        }
    }

    #[test]
    fn test_castling_is_a_move_not_a_termination() {
        let tokens = lex("9.O-O O-O-O+").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Move);
        assert_eq!(tokens[1].text, "O-O");
        assert_eq!(tokens[2].kind, TokenKind::Move);
        assert_eq!(tokens[2].text, "O-O-O+");
    }

    #[test]
    fn test_variation_collapses_into_comment() {
        let tokens = lex("1. e4 (1. d4 d5 (1... Nf6)) e5").unwrap();
        let moves: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Move)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(moves, vec!["e4", "e5"]);
        assert_eq!(count(&tokens, |k| *k == TokenKind::Comment), 1);
    }

    #[test]
    fn test_line_comment_and_escape_line() {
        let tokens = lex("% skipped entirely\n1. e4 ; rest of line\ne5").unwrap();
        assert_eq!(count(&tokens, |k| *k == TokenKind::Comment), 1);
        assert_eq!(count(&tokens, |k| *k == TokenKind::Move), 2);
    }

    #[test]
    fn test_unterminated_comment_runs_to_end() {
        let tokens = lex("1. e4 { never closed e5").unwrap();
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Comment);
        assert_eq!(count(&tokens, |k| *k == TokenKind::Move), 1);
    }

    #[test]
    fn test_unknown_word_is_symbol() {
        let tokens = lex("1. e4 blunder").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Symbol);
        assert_eq!(tokens[2].text, "blunder");
    }

    #[test]
    fn test_concatenated_games_lex_back_to_back() {
        let text = "[Event \"a\"]\n1. e4 1-0\n[Event \"b\"]\n1. d4 0-1\n";
        let tokens = lex(text).unwrap();
        assert_eq!(count(&tokens, |k| *k == TokenKind::LeftBracket), 2);
        assert_eq!(count(&tokens, |k| *k == TokenKind::Termination), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(lex("").unwrap().is_empty());
        assert!(lex("  \n\t ").unwrap().is_empty());
    }
}
