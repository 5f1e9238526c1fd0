//! Common types used throughout the rating engine

use crate::rating::registry::RatingSystemKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a ladder account
pub type ProfileId = String;

/// A finished 1v1 game. `side_a` is the winner, `side_b` the loser.
///
/// The sides are opaque participant references; a `player_lookup` function
/// turns them into player keys when ratings are computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game<S> {
    #[serde(alias = "winner")]
    pub side_a: S,
    #[serde(alias = "loser")]
    pub side_b: S,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl<S> Game<S> {
    pub fn new(
        winner: S,
        loser: S,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            side_a: winner,
            side_b: loser,
            start_time,
            end_time,
        }
    }

    pub fn winner(&self) -> &S {
        &self.side_a
    }

    pub fn loser(&self) -> &S {
        &self.side_b
    }

    /// Check that the game does not end before it starts
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.end_time < self.start_time {
            return Err(crate::error::LadderError::InvalidGame {
                reason: format!(
                    "end time {} is before start time {}",
                    self.end_time, self.start_time
                ),
            }
            .into());
        }
        Ok(())
    }
}

/// Ladder account a participant reference resolves to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    pub profile_id: ProfileId,
    pub name: String,
}

/// Win/loss record and current rating of one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub profile_id: ProfileId,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    /// Display value before the player's most recent game
    pub previous_rating: i64,
    pub rating: i64,
}

/// Ratings around a single ladder game, as display values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Position of the game in the rated (time-ordered) sequence
    pub index: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub winner_id: ProfileId,
    pub loser_id: ProfileId,
    pub winner_rating_before: i64,
    pub loser_rating_before: i64,
    pub winner_rating_after: i64,
    pub loser_rating_after: i64,
}

/// Result of one ladder rebuild
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LadderSnapshot {
    pub system: RatingSystemKind,
    /// Sorted by rating, best first
    pub standings: Vec<PlayerStanding>,
    pub outcomes: Vec<OutcomeRecord>,
    /// Games dropped because a participant has no account
    pub skipped_games: usize,
}
