use thiserror::Error;

/// Fatal lexing failures. Only the shard being lexed is affected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PgnError {
    #[error("TagPair Not correctly structured")]
    MalformedTagPair { position: usize },
}

impl PgnError {
    /// Byte offset of the offending token.
    pub fn position(&self) -> usize {
        match self {
            Self::MalformedTagPair { position } => *position,
        }
    }
}

/// Failures while loading a reference opening dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("opening dataset line {line}: expected 3 tab-separated columns, found {found}")]
    MalformedRow { line: usize, found: usize },

    #[error("opening dataset line {line}: {source}")]
    MalformedMoves { line: usize, source: PgnError },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Soft diagnostics for one game header or one shard batch: unparseable
/// header fields and discarded shards. Messages read in the order they were
/// recorded, joined with `"; "`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorAccumulator(Option<String>);

impl ErrorAccumulator {
    pub fn push(&mut self, msg: &str) {
        if let Some(existing) = &mut self.0 {
            existing.push_str("; ");
            existing.push_str(msg);
        } else {
            self.0 = Some(msg.to_string());
        }
    }

    /// The joined message, leaving the accumulator empty.
    pub fn take(&mut self) -> Option<String> {
        self.0.take()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}
