use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use zstd::stream::read::Decoder as ZstdDecoder;

pub type PgnInput = Box<dyn Read + Send>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompressionMode {
    #[default]
    Plain,
    Zstd,
}

impl CompressionMode {
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let normalized = raw.trim();
        if normalized.eq_ignore_ascii_case("zstd") {
            Ok(Self::Zstd)
        } else {
            Err(InputError::InvalidCompression(normalized.to_string()))
        }
    }
}

impl FromStr for CompressionMode {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid compression value '{0}'. Supported values: 'zstd' or omitted.")]
    InvalidCompression(String),

    #[error("Invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("No files match '{0}'")]
    NoMatches(String),

    #[error("Failed to open file '{}': {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to initialize zstd decoder for '{}': {source}", .path.display())]
    Decoder { path: PathBuf, source: io::Error },

    #[error("Failed to read '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
}

/// A literal path, or every readable match when `pattern` contains `*` or `?`.
pub fn expand_paths(pattern: &str) -> Result<Vec<PathBuf>, InputError> {
    if !(pattern.contains('*') || pattern.contains('?')) {
        return Ok(vec![PathBuf::from(pattern)]);
    }

    let mut paths: Vec<PathBuf> = glob::glob(pattern)
        .map_err(|source| InputError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .collect();
    if paths.is_empty() {
        return Err(InputError::NoMatches(pattern.to_string()));
    }
    paths.sort();
    Ok(paths)
}

pub fn open_input(path: &Path, compression: CompressionMode) -> Result<PgnInput, InputError> {
    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    match compression {
        CompressionMode::Plain => Ok(Box::new(file)),
        CompressionMode::Zstd => ZstdDecoder::new(file)
            .map(|decoder| Box::new(decoder) as PgnInput)
            .map_err(|source| InputError::Decoder {
                path: path.to_path_buf(),
                source,
            }),
    }
}

/// Whole decoded contents of `path`. Invalid UTF-8 is replaced, not rejected.
pub fn read_source(path: &Path, compression: CompressionMode) -> Result<String, InputError> {
    let mut input = open_input(path, compression)?;
    let mut bytes = Vec::new();
    input
        .read_to_end(&mut bytes)
        .map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

/// Read every path. A single unreadable path is an error; among several,
/// unreadable ones are logged and skipped.
pub fn read_sources(
    paths: &[PathBuf],
    compression: CompressionMode,
) -> Result<Vec<(PathBuf, String)>, InputError> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        match read_source(path, compression) {
            Ok(text) => sources.push((path.clone(), text)),
            Err(e) if paths.len() == 1 => return Err(e),
            Err(e) => log::warn!("{e}"),
        }
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("chess-stats-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_compression_mode_zstd_case_insensitive() {
        assert_eq!(CompressionMode::parse("zstd").unwrap(), CompressionMode::Zstd);
        assert_eq!("ZsTd".parse::<CompressionMode>().unwrap(), CompressionMode::Zstd);
    }

    #[test]
    fn test_parse_compression_mode_rejects_empty_value() {
        let err = CompressionMode::parse("   ").unwrap_err().to_string();
        assert_eq!(
            err,
            "Invalid compression value ''. Supported values: 'zstd' or omitted."
        );
    }

    #[test]
    fn test_parse_compression_mode_rejects_unsupported_value() {
        let err = CompressionMode::parse("gzip").unwrap_err().to_string();
        assert!(err.contains("Invalid compression value 'gzip'"));
    }

    #[test]
    fn test_literal_path_is_not_globbed() {
        let paths = expand_paths("games/missing.pgn").unwrap();
        assert_eq!(paths, vec![PathBuf::from("games/missing.pgn")]);
    }

    #[test]
    fn test_glob_expansion_is_sorted() {
        let dir = scratch_dir("glob");
        fs::write(dir.join("b.pgn"), "").unwrap();
        fs::write(dir.join("a.pgn"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        let pattern = format!("{}/*.pgn", dir.display());
        let paths = expand_paths(&pattern).unwrap();
        assert_eq!(paths, vec![dir.join("a.pgn"), dir.join("b.pgn")]);

        let none = format!("{}/*.zst", dir.display());
        assert!(matches!(expand_paths(&none), Err(InputError::NoMatches(_))));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_read_zstd_source() {
        let dir = scratch_dir("zstd");
        let path = dir.join("games.pgn.zst");
        let pgn = "[Event \"z\"]\n\n1. e4 e5 1-0\n";
        fs::write(&path, zstd::stream::encode_all(pgn.as_bytes(), 3).unwrap()).unwrap();

        assert_eq!(read_source(&path, CompressionMode::Zstd).unwrap(), pgn);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_single_missing_file_is_an_error() {
        let paths = vec![PathBuf::from("/nonexistent/chess-stats/a.pgn")];
        let err = read_sources(&paths, CompressionMode::Plain).unwrap_err();
        assert!(matches!(err, InputError::Open { .. }));
        assert!(err.to_string().starts_with("Failed to open file '/nonexistent/chess-stats/a.pgn'"));
    }

    #[test]
    fn test_missing_file_among_several_is_skipped() {
        let dir = scratch_dir("skip");
        let good = dir.join("good.pgn");
        fs::write(&good, "[Event \"g\"]\n*\n").unwrap();
        let paths = vec![dir.join("missing.pgn"), good.clone()];

        let sources = read_sources(&paths, CompressionMode::Plain).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].0, good);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = scratch_dir("latin1");
        let path = dir.join("latin1.pgn");
        fs::write(&path, b"[White \"Ren\xe9\"]\n*\n").unwrap();

        let text = read_source(&path, CompressionMode::Plain).unwrap();
        assert!(text.starts_with("[White \"Ren\u{FFFD}\"]"));
        fs::remove_dir_all(dir).unwrap();
    }
}
