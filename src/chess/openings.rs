use std::collections::HashMap;
use std::io::BufRead;

use super::error::DatasetError;
use super::lexer::{TokenKind, lex};

/// One known opening. `move_prefix` is space-separated SAN without move
/// numbers, e.g. `e4 e5 Nf3 Nc6 Bb5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningRecord {
    pub eco_code: String,
    pub full_name: String,
    pub move_prefix: String,
}

impl OpeningRecord {
    pub fn new(
        eco_code: impl Into<String>,
        full_name: impl Into<String>,
        move_prefix: impl Into<String>,
    ) -> Self {
        Self {
            eco_code: eco_code.into(),
            full_name: full_name.into(),
            move_prefix: move_prefix.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningMatch<'a> {
    pub eco_code: &'a str,
    pub full_name: &'a str,
}

/// Read-only opening table, bucketed by the first two moves.
///
/// Within a bucket records are ordered longest prefix first, so the most
/// specific opening is found before its more generic parents. Built once and
/// shared by reference; it is never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct OpeningIndex {
    buckets: HashMap<String, Vec<OpeningRecord>>,
    eco_names: HashMap<String, String>,
    len: usize,
}

impl OpeningIndex {
    pub fn new(records: impl IntoIterator<Item = OpeningRecord>) -> Self {
        let mut records: Vec<OpeningRecord> = records.into_iter().collect();

        let mut eco_names = HashMap::new();
        for record in &records {
            eco_names
                .entry(record.eco_code.clone())
                .or_insert_with(|| record.full_name.clone());
        }

        records.sort_by(|a, b| b.move_prefix.len().cmp(&a.move_prefix.len()));

        let len = records.len();
        let mut buckets: HashMap<String, Vec<OpeningRecord>> = HashMap::new();
        for record in records {
            buckets
                .entry(bucket_key(&record.move_prefix))
                .or_default()
                .push(record);
        }

        Self {
            buckets,
            eco_names,
            len,
        }
    }

    pub fn from_tsv(reader: impl BufRead) -> Result<Self, DatasetError> {
        Ok(Self::new(load_openings_tsv(reader)?))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Longest literal prefix match of `move_text` in its bucket, falling back
    /// to the first name recorded for `eco_hint`.
    pub fn resolve(&self, move_text: &str, eco_hint: Option<&str>) -> Option<OpeningMatch<'_>> {
        let by_prefix = self.buckets.get(&bucket_key(move_text)).and_then(|bucket| {
            bucket
                .iter()
                .find(|record| move_text.starts_with(record.move_prefix.as_str()))
        });
        if let Some(record) = by_prefix {
            return Some(OpeningMatch {
                eco_code: &record.eco_code,
                full_name: &record.full_name,
            });
        }

        let (eco_code, full_name) = self.eco_names.get_key_value(eco_hint?)?;
        Some(OpeningMatch {
            eco_code,
            full_name,
        })
    }
}

/// First two moves of `move_text`, or all of it when shorter.
pub fn bucket_key(move_text: &str) -> String {
    move_text
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Load the lichess `eco<TAB>name<TAB>pgn` dataset. The first line holds
/// column titles. Move numbers in the `pgn` column are dropped so prefixes
/// compare directly against a game's move text.
pub fn load_openings_tsv(reader: impl BufRead) -> Result<Vec<OpeningRecord>, DatasetError> {
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if idx == 0 || line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 1;

        let columns: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
        let [eco_code, full_name, pgn] = columns[..] else {
            return Err(DatasetError::MalformedRow {
                line: line_no,
                found: columns.len(),
            });
        };

        let tokens = lex(pgn).map_err(|source| DatasetError::MalformedMoves {
            line: line_no,
            source,
        })?;
        let move_prefix = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Move)
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        records.push(OpeningRecord::new(eco_code, full_name, move_prefix));
    }

    Ok(records)
}
