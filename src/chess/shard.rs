use serde::Serialize;

use super::analysis::{PartialResult, SubjectNames, analyze};
use super::error::{ErrorAccumulator, PgnError};
use super::openings::OpeningIndex;
use super::parser::parse_games;
use super::reduce::{FinalResult, reduce};
use super::splitter::shards;

/// Games per shard when the caller does not choose.
pub const DEFAULT_GAMES_PER_SHARD: usize = 200;

/// Lex, parse and analyze one shard of PGN text.
pub fn analyze_shard(
    text: &str,
    subject: &SubjectNames,
    openings: &OpeningIndex,
) -> Result<PartialResult, PgnError> {
    let games = parse_games(text)?;
    Ok(analyze(&games, subject, openings))
}

/// Like [`analyze_shard`], but a shard that fails to lex contributes nothing.
pub fn analyze_shard_or_empty(
    text: &str,
    subject: &SubjectNames,
    openings: &OpeningIndex,
) -> PartialResult {
    analyze_shard(text, subject, openings).unwrap_or_else(|e| {
        log::warn!("discarding shard: {e} at byte {}", e.position());
        PartialResult::default()
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    pub result: FinalResult,
    pub shards: usize,
    pub failed_shards: usize,
    /// `"; "`-joined diagnostics of the failed shards.
    pub errors: Option<String>,
}

/// Collects partials from any number of inputs before a single reduction.
#[derive(Debug, Default)]
pub struct ShardBatch {
    partials: Vec<PartialResult>,
    failed_shards: usize,
    errors: ErrorAccumulator,
}

impl ShardBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `raw` into shards and analyze each one. `label` names the input
    /// in diagnostics.
    pub fn run(
        &mut self,
        raw: &str,
        subject: &SubjectNames,
        openings: &OpeningIndex,
        games_per_shard: usize,
        label: &str,
    ) {
        for (idx, shard) in shards(raw, games_per_shard).iter().enumerate() {
            match analyze_shard(shard, subject, openings) {
                Ok(partial) => self.partials.push(partial),
                Err(e) => {
                    log::warn!("{label}: discarding shard {idx}: {e} at byte {}", e.position());
                    self.errors
                        .push(&format!("{label} shard {idx}: {e} at byte {}", e.position()));
                    self.failed_shards += 1;
                    self.partials.push(PartialResult::default());
                }
            }
        }
    }

    pub fn finish(mut self) -> AggregateReport {
        AggregateReport {
            result: reduce(&self.partials),
            shards: self.partials.len(),
            failed_shards: self.failed_shards,
            errors: self.errors.take(),
        }
    }
}

/// Split, analyze and reduce one PGN blob.
pub fn aggregate(
    raw: &str,
    subject: &SubjectNames,
    openings: &OpeningIndex,
    games_per_shard: usize,
) -> AggregateReport {
    let mut batch = ShardBatch::new();
    batch.run(raw, subject, openings, games_per_shard, "input");
    batch.finish()
}
