//! Partitioning of games into fixed-length rating periods

use crate::utils::start_of_day;
use chrono::{DateTime, Duration, Utc};

/// Games bucketed into consecutive half-open periods `[start, start + length)`.
///
/// The first period starts at midnight of the earliest end time. Every period
/// up to the one holding the latest game is present, empty or not.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingPeriods {
    anchor: DateTime<Utc>,
    length: Duration,
    /// Game indices per period, in input order
    buckets: Vec<Vec<usize>>,
}

impl RatingPeriods {
    /// Partition games by their end time
    ///
    /// `length` must be positive; callers validate it through the Glicko-2
    /// configuration.
    pub fn partition(end_times: &[DateTime<Utc>], length: Duration) -> Self {
        let Some(earliest) = end_times.iter().min().copied() else {
            return Self {
                anchor: DateTime::<Utc>::default(),
                length,
                buckets: Vec::new(),
            };
        };

        let anchor = start_of_day(earliest);
        let length_ms = length.num_milliseconds().max(1);

        let mut buckets: Vec<Vec<usize>> = Vec::new();
        for (index, end_time) in end_times.iter().enumerate() {
            let offset = (*end_time - anchor).num_milliseconds();
            let period = offset.div_euclid(length_ms) as usize;
            if buckets.len() <= period {
                buckets.resize_with(period + 1, Vec::new);
            }
            buckets[period].push(index);
        }

        Self {
            anchor,
            length,
            buckets,
        }
    }

    pub fn anchor(&self) -> DateTime<Utc> {
        self.anchor
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Start of the given period
    pub fn period_start(&self, period: usize) -> DateTime<Utc> {
        self.anchor + self.length * period as i32
    }

    /// Iterate `(period_start, game_indices)` in chronological order
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, &[usize])> + '_ {
        self.buckets
            .iter()
            .enumerate()
            .map(|(period, games)| (self.period_start(period), games.as_slice()))
    }
}
