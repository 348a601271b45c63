use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::analysis::{OpeningTally, PartialResult, RatingAverage};
use super::timecontrol::Speed;

/// Number of openings kept in the final ranking.
pub const TOP_OPENINGS: usize = 5;

/// Rating bucket carried as `(avg * n, n)` while folding so partials of any
/// size combine exactly.
#[derive(Debug, Clone, Copy, Default)]
struct WeightedRating {
    weighted_sum: f64,
    samples: u64,
}

impl WeightedRating {
    fn add(&mut self, rating: &RatingAverage) {
        self.weighted_sum += rating.average * rating.samples as f64;
        self.samples += rating.samples;
    }

    fn average(self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.weighted_sum / self.samples as f64
        }
    }
}

/// One opening name with every ECO code it was reached under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningSummary {
    pub full_name: String,
    pub total: u64,
    pub eco_codes: SmallVec<[String; 2]>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub count: u64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    pub rating_by_speed: BTreeMap<Speed, f64>,
    pub top_openings: Vec<OpeningSummary>,
}

/// Order-insensitive fold over [`PartialResult`]s.
#[derive(Debug, Default)]
pub struct Reducer {
    count: u64,
    wins: u64,
    losses: u64,
    draws: u64,
    ratings: BTreeMap<Speed, WeightedRating>,
    tally: Vec<OpeningTally>,
}

impl Reducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, partial: &PartialResult) {
        self.count += partial.count;
        self.wins += partial.wins;
        self.losses += partial.losses;
        self.draws += partial.draws;
        for (speed, rating) in &partial.rating_by_speed {
            self.ratings.entry(*speed).or_default().add(rating);
        }
        self.tally.extend(partial.opening_tally.iter().cloned());
    }

    /// Back to the mergeable shape, so the result can be folded again.
    pub fn into_partial(self) -> PartialResult {
        PartialResult {
            count: self.count,
            wins: self.wins,
            losses: self.losses,
            draws: self.draws,
            rating_by_speed: self
                .ratings
                .into_iter()
                .map(|(speed, weighted)| {
                    let rating = RatingAverage {
                        average: weighted.average(),
                        samples: weighted.samples,
                    };
                    (speed, rating)
                })
                .collect(),
            opening_tally: self.tally,
        }
    }

    pub fn finish(self) -> FinalResult {
        FinalResult {
            count: self.count,
            wins: self.wins,
            losses: self.losses,
            draws: self.draws,
            rating_by_speed: self
                .ratings
                .into_iter()
                .map(|(speed, weighted)| (speed, weighted.average()))
                .collect(),
            top_openings: rank_openings(group_openings(&self.tally)),
        }
    }
}

pub fn merge<'a>(partials: impl IntoIterator<Item = &'a PartialResult>) -> PartialResult {
    let mut reducer = Reducer::new();
    for partial in partials {
        reducer.absorb(partial);
    }
    reducer.into_partial()
}

pub fn reduce<'a>(partials: impl IntoIterator<Item = &'a PartialResult>) -> FinalResult {
    let mut reducer = Reducer::new();
    for partial in partials {
        reducer.absorb(partial);
    }
    reducer.finish()
}

/// Sum tallies per opening name. Groups and their ECO codes keep first-seen
/// order.
pub fn group_openings(tally: &[OpeningTally]) -> Vec<OpeningSummary> {
    let mut groups: Vec<OpeningSummary> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for entry in tally {
        let slot = *slots.entry(entry.full_name.as_str()).or_insert_with(|| {
            groups.push(OpeningSummary {
                full_name: entry.full_name.clone(),
                total: 0,
                eco_codes: SmallVec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.total += entry.count;
        if !group.eco_codes.contains(&entry.eco_code) {
            group.eco_codes.push(entry.eco_code.clone());
        }
    }

    groups
}

/// Most played first; ties keep their grouping order.
pub fn rank_openings(mut groups: Vec<OpeningSummary>) -> Vec<OpeningSummary> {
    groups.sort_by(|a, b| b.total.cmp(&a.total));
    groups.truncate(TOP_OPENINGS);
    groups
}
