//! Rating system trait shared by every algorithm
//!
//! This module defines the interface the ladder uses to compute ratings, and
//! the default fold strategy for systems that update after every game.

use crate::error::Result;
use crate::types::Game;
use crate::utils::display_round;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// A rating value that can be shown to players as an integer
pub trait DisplayRating {
    /// Scalar skill estimate on the system's own scale
    fn value(&self) -> f64;

    /// Integer surfaced to end users
    fn display_value(&self) -> i64 {
        display_round(self.value())
    }
}

/// Trait implemented by every rating algorithm
pub trait RatingSystem {
    /// Immutable rating value produced by this system
    type Rating: Clone + Debug + DisplayRating;

    /// Rating given to a player who has not played yet
    fn default_rating(&self) -> Self::Rating;

    /// Update a pair of ratings after a single isolated 1v1 game
    ///
    /// # Arguments
    /// * `winner` - Rating of the winner before the game
    /// * `loser` - Rating of the loser before the game
    ///
    /// # Returns
    /// The new `(winner, loser)` ratings
    fn record_result(
        &self,
        winner: &Self::Rating,
        loser: &Self::Rating,
    ) -> (Self::Rating, Self::Rating);

    /// Compute the ratings of both sides after each game of a time-ordered
    /// series.
    ///
    /// The returned vector has one `(side_a, side_b)` entry per game, in the
    /// same order as `games`. Any `player_lookup` failure aborts the whole
    /// computation.
    ///
    /// The default implementation folds `record_result` over the games while
    /// tracking the latest rating of every player.
    fn compute_ratings_from_series_of_games<S, K, F>(
        &self,
        games: &[Game<S>],
        player_lookup: F,
    ) -> Result<Vec<(Self::Rating, Self::Rating)>>
    where
        K: Eq + Hash + Clone,
        F: Fn(&S) -> Result<K>,
    {
        let mut latest: HashMap<K, Self::Rating> = HashMap::new();
        let mut game_ratings = Vec::with_capacity(games.len());

        for game in games {
            let p0 = player_lookup(&game.side_a)?;
            let p1 = player_lookup(&game.side_b)?;

            let r0 = latest
                .get(&p0)
                .cloned()
                .unwrap_or_else(|| self.default_rating());
            let r1 = latest
                .get(&p1)
                .cloned()
                .unwrap_or_else(|| self.default_rating());

            let (r0_new, r1_new) = self.record_result(&r0, &r1);
            latest.insert(p0, r0_new.clone());
            latest.insert(p1, r1_new.clone());
            game_ratings.push((r0_new, r1_new));
        }

        debug!(
            "Folded {} games over {} players",
            games.len(),
            latest.len()
        );

        Ok(game_ratings)
    }
}
