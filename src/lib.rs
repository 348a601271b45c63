//! Player statistics over PGN game collections: results, opponent strength
//! per speed, and the most played openings.

pub mod chess;

pub use chess::{
    AggregateReport, FinalResult, Game, OpeningIndex, PartialResult, SubjectNames, aggregate,
    analyze, parse_games, reduce, split,
};
