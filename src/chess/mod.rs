pub mod analysis;
pub mod error;
pub mod input;
pub mod lexer;
pub mod openings;
pub mod parser;
pub mod reduce;
pub mod shard;
pub mod splitter;
pub mod timecontrol;
pub mod types;

pub use analysis::{OpeningTally, PartialResult, RatingAverage, SubjectNames, analyze};
pub use error::{DatasetError, PgnError};
pub use openings::{OpeningIndex, OpeningRecord, load_openings_tsv};
pub use parser::{parse, parse_games};
pub use reduce::{FinalResult, OpeningSummary, Reducer, merge, reduce};
pub use shard::{AggregateReport, ShardBatch, aggregate, analyze_shard, analyze_shard_or_empty};
pub use splitter::{shards, split};
pub use timecontrol::Speed;
pub use types::{Game, GameHeader, Termination};
