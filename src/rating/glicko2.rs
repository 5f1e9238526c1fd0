//! Glicko-2 rating system implementation
//!
//! Ratings are revised officially once per rating period, following
//! <https://www.glicko.net/glicko/glicko2.pdf>. Because the ladder shows a new
//! rating after every game, the batch computation also replays each player's
//! games one by one inside the period to produce per-game ratings.

use crate::error::{LadderError, Result};
use crate::rating::period::RatingPeriods;
use crate::rating::system::{DisplayRating, RatingSystem};
use crate::types::Game;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;
use std::hash::Hash;
use tracing::{debug, info, trace};

/// Conversion factor between the Glicko and the Glicko-2 scale
pub const GLICKO2_SCALE: f64 = 173.7178;

/// Rating mapped to `mu = 0` on the Glicko-2 scale
pub const CENTER_RATING: f64 = 1500.0;

/// Upper bound of the rating deviation
pub const MAX_DEVIATION: f64 = 350.0;

/// Glicko-2 rating on the display scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glicko2Rating {
    /// Skill estimate `r`
    pub rating: f64,
    /// Rating deviation `RD`, always in `(0, 350]`
    pub deviation: f64,
    /// Volatility `sigma`, always positive
    pub volatility: f64,
}

impl Glicko2Rating {
    pub fn new(rating: f64, deviation: f64, volatility: f64) -> Self {
        Self {
            rating,
            deviation,
            volatility,
        }
    }

    /// Rating on the Glicko-2 scale
    pub fn mu(&self) -> f64 {
        (self.rating - CENTER_RATING) / GLICKO2_SCALE
    }

    /// Deviation on the Glicko-2 scale
    pub fn phi(&self) -> f64 {
        self.deviation / GLICKO2_SCALE
    }

    fn from_glicko2_scale(mu: f64, phi: f64, volatility: f64) -> Self {
        Self {
            rating: GLICKO2_SCALE * mu + CENTER_RATING,
            deviation: clamp_deviation(GLICKO2_SCALE * phi),
            volatility,
        }
    }
}

impl DisplayRating for Glicko2Rating {
    fn value(&self) -> f64 {
        self.rating
    }
}

fn clamp_deviation(deviation: f64) -> f64 {
    deviation.clamp(f64::MIN_POSITIVE, MAX_DEVIATION)
}

/// Glicko-2 configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glicko2Config {
    /// System constant constraining volatility changes
    pub tau: f64,
    /// Bracket width at which the volatility search stops
    pub convergence_tolerance: f64,
    /// Length of a rating period in hours
    pub rating_period_hours: u32,
    /// Rating for new players
    pub initial_rating: f64,
    /// Deviation for new players, kept below 350 so a couple of games cannot
    /// produce extreme ratings
    pub initial_deviation: f64,
    /// Volatility for new players, above the usual 0.06 since new players
    /// fluctuate more
    pub initial_volatility: f64,
}

impl Default for Glicko2Config {
    fn default() -> Self {
        Self {
            tau: 0.8,
            convergence_tolerance: 1e-6,
            rating_period_hours: 72,
            initial_rating: CENTER_RATING,
            initial_deviation: 100.0,
            initial_volatility: 0.1,
        }
    }
}

impl Glicko2Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.tau <= 0.0 || !self.tau.is_finite() {
            return Err(LadderError::ConfigurationError {
                message: "Glicko-2 tau must be positive".to_string(),
            }
            .into());
        }

        if self.convergence_tolerance <= 0.0 || !self.convergence_tolerance.is_finite() {
            return Err(LadderError::ConfigurationError {
                message: "Glicko-2 convergence tolerance must be positive".to_string(),
            }
            .into());
        }

        if self.rating_period_hours == 0 {
            return Err(LadderError::ConfigurationError {
                message: "Glicko-2 rating period must be at least one hour".to_string(),
            }
            .into());
        }

        if !(self.initial_deviation > 0.0 && self.initial_deviation <= MAX_DEVIATION) {
            return Err(LadderError::ConfigurationError {
                message: format!("Glicko-2 initial deviation must be in (0, {MAX_DEVIATION}]"),
            }
            .into());
        }

        if self.initial_volatility <= 0.0 || !self.initial_volatility.is_finite() {
            return Err(LadderError::ConfigurationError {
                message: "Glicko-2 initial volatility must be positive".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Get the rating period as Duration
    pub fn rating_period(&self) -> Duration {
        Duration::hours(i64::from(self.rating_period_hours))
    }
}

fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi * phi / (PI * PI)).sqrt()
}

fn expected(mu: f64, opponent_mu: f64, opponent_phi: f64) -> f64 {
    1.0 / (1.0 + (-g(opponent_phi) * (mu - opponent_mu)).exp())
}

/// Glicko-2 rating system
#[derive(Debug, Clone, Default)]
pub struct Glicko2 {
    config: Glicko2Config,
}

impl Glicko2 {
    pub fn new(config: Glicko2Config) -> Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn config(&self) -> &Glicko2Config {
        &self.config
    }

    /// Rate a player over one rating period.
    ///
    /// `results` holds each opponent's rating at the start of the period
    /// together with the score (1.0 for a win, 0.0 for a loss). Without any
    /// result only the deviation grows.
    pub fn compute_new_rating(
        &self,
        rating: &Glicko2Rating,
        results: &[(Glicko2Rating, f64)],
    ) -> Glicko2Rating {
        let phi = rating.phi();

        if results.is_empty() {
            let deviation = GLICKO2_SCALE * phi.hypot(rating.volatility);
            return Glicko2Rating {
                rating: rating.rating,
                deviation: deviation.min(MAX_DEVIATION),
                volatility: rating.volatility,
            };
        }

        let mu = rating.mu();

        // Estimated variance and improvement
        let mut v_inv = 0.0;
        let mut delta_sum = 0.0;
        for (opponent, score) in results {
            let g_j = g(opponent.phi());
            let e_j = expected(mu, opponent.mu(), opponent.phi());
            v_inv += g_j * g_j * e_j * (1.0 - e_j);
            delta_sum += g_j * (score - e_j);
        }
        let v = 1.0 / v_inv;
        let delta = v * delta_sum;

        let volatility = self.solve_volatility(phi, rating.volatility, v, delta);

        let phi_star = phi.hypot(volatility);
        let new_phi = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();
        let new_mu = mu + new_phi * new_phi * delta / v;

        Glicko2Rating::from_glicko2_scale(new_mu, new_phi, volatility)
    }

    /// Rate a player after a single game against one opponent
    pub fn rate_1vs1(
        &self,
        player: &Glicko2Rating,
        opponent: &Glicko2Rating,
        score: f64,
    ) -> Glicko2Rating {
        self.compute_new_rating(player, &[(*opponent, score)])
    }

    /// Illinois variant of regula falsi on `x = ln(sigma^2)`
    fn solve_volatility(&self, phi: f64, sigma: f64, v: f64, delta: f64) -> f64 {
        let tau = self.config.tau;
        let eps = self.config.convergence_tolerance;
        let phi2 = phi * phi;
        let delta2 = delta * delta;
        let a = (sigma * sigma).ln();

        let f = |x: f64| {
            let ex = x.exp();
            let denom = phi2 + v + ex;
            ex * (delta2 - phi2 - v - ex) / (2.0 * denom * denom) - (x - a) / (tau * tau)
        };

        let mut big_a = a;
        let mut big_b = if delta2 > phi2 + v {
            (delta2 - phi2 - v).ln()
        } else {
            let mut k = 1.0;
            while f(a - k * tau) < 0.0 {
                k += 1.0;
            }
            a - k * tau
        };

        let mut f_a = f(big_a);
        let mut f_b = f(big_b);
        let mut iterations = 0u32;
        while (big_b - big_a).abs() > eps {
            let big_c = big_a + (big_a - big_b) * f_a / (f_b - f_a);
            let f_c = f(big_c);
            if f_c * f_b <= 0.0 {
                big_a = big_b;
                f_a = f_b;
            } else {
                f_a /= 2.0;
            }
            big_b = big_c;
            f_b = f_c;
            iterations += 1;
        }

        trace!("Volatility search converged after {} iterations", iterations);
        (big_a / 2.0).exp()
    }

    /// Official end-of-period rating of one player
    fn official_rating(
        &self,
        rating: &Glicko2Rating,
        results: &[(Glicko2Rating, f64)],
    ) -> Glicko2Rating {
        self.compute_new_rating(rating, results)
    }

    /// Per-game ratings inside a period, replaying the games one at a time
    /// from the rating the player had at the start of the period
    fn replay_games(
        &self,
        rating: &Glicko2Rating,
        results: &[(Glicko2Rating, f64)],
    ) -> Vec<Glicko2Rating> {
        let mut current = *rating;
        results
            .iter()
            .map(|(opponent, score)| {
                current = self.rate_1vs1(&current, opponent, *score);
                current
            })
            .collect()
    }
}

/// Which side of a game `player` is on: `(slot, opponent, score)`
fn attribute<'a, K: Eq>(
    sides: &'a (K, K),
    player: &K,
    game_index: usize,
) -> Result<(usize, &'a K, f64)> {
    if sides.0 == *player {
        Ok((0, &sides.1, 1.0))
    } else if sides.1 == *player {
        Ok((1, &sides.0, 0.0))
    } else {
        Err(LadderError::AttributionFailed {
            game_index,
            reason: "player is on neither side".to_string(),
        }
        .into())
    }
}

impl RatingSystem for Glicko2 {
    type Rating = Glicko2Rating;

    fn default_rating(&self) -> Glicko2Rating {
        Glicko2Rating {
            rating: self.config.initial_rating,
            deviation: self.config.initial_deviation,
            volatility: self.config.initial_volatility,
        }
    }

    /// Two independent single-opponent updates. True Glicko-2 would rate both
    /// players simultaneously within a period; this pairwise form keeps the
    /// shared interface.
    fn record_result(
        &self,
        winner: &Glicko2Rating,
        loser: &Glicko2Rating,
    ) -> (Glicko2Rating, Glicko2Rating) {
        (
            self.rate_1vs1(winner, loser, 1.0),
            self.rate_1vs1(loser, winner, 0.0),
        )
    }

    fn compute_ratings_from_series_of_games<S, K, F>(
        &self,
        games: &[Game<S>],
        player_lookup: F,
    ) -> Result<Vec<(Glicko2Rating, Glicko2Rating)>>
    where
        K: Eq + Hash + Clone,
        F: Fn(&S) -> Result<K>,
    {
        let mut sides: Vec<(K, K)> = Vec::with_capacity(games.len());
        for (game_index, game) in games.iter().enumerate() {
            let a = player_lookup(&game.side_a)?;
            let b = player_lookup(&game.side_b)?;
            if a == b {
                return Err(LadderError::AttributionFailed {
                    game_index,
                    reason: "the same player is on both sides".to_string(),
                }
                .into());
            }
            sides.push((a, b));
        }

        let end_times: Vec<_> = games.iter().map(|game| game.end_time).collect();
        let periods = RatingPeriods::partition(&end_times, self.config.rating_period());

        let default = self.default_rating();
        // Official ratings at the end of the previous period
        let mut previous: HashMap<K, Glicko2Rating> = HashMap::new();
        let mut registered: Vec<K> = Vec::new();
        let mut seen: HashSet<K> = HashSet::new();
        let mut per_game: Vec<[Option<Glicko2Rating>; 2]> = vec![[None, None]; games.len()];

        for (period_start, game_indices) in periods.iter() {
            let mut games_by_player: HashMap<&K, Vec<usize>> = HashMap::new();
            for &game_index in game_indices {
                let (a, b) = &sides[game_index];
                for player in [a, b] {
                    if seen.insert(player.clone()) {
                        registered.push(player.clone());
                    }
                    games_by_player.entry(player).or_default().push(game_index);
                }
            }

            let mut current: HashMap<K, Glicko2Rating> = HashMap::with_capacity(registered.len());
            for player in &registered {
                let rating = previous.get(player).copied().unwrap_or(default);
                let played = games_by_player
                    .get(player)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);

                let mut results = Vec::with_capacity(played.len());
                let mut slots = Vec::with_capacity(played.len());
                for &game_index in played {
                    let (slot, opponent, score) =
                        attribute(&sides[game_index], player, game_index)?;
                    let opponent_rating = previous.get(opponent).copied().unwrap_or(default);
                    results.push((opponent_rating, score));
                    slots.push((game_index, slot));
                }

                let mut official = self.official_rating(&rating, &results);
                let replayed = self.replay_games(&rating, &results);

                for (&(game_index, slot), game_rating) in slots.iter().zip(&replayed) {
                    let entry = &mut per_game[game_index][slot];
                    if entry.is_some() {
                        return Err(LadderError::AttributionFailed {
                            game_index,
                            reason: "player rated twice for the same game".to_string(),
                        }
                        .into());
                    }
                    *entry = Some(*game_rating);
                }

                // Per-game reconstruction only moves `r`; deviation and
                // volatility stay at their once-per-period values.
                if let Some(last) = replayed.last() {
                    official.rating = last.rating;
                }

                current.insert(player.clone(), official);
            }

            debug!(
                "Rating period starting {}: {} games, {} registered players",
                period_start,
                game_indices.len(),
                registered.len()
            );
            previous = current;
        }

        info!(
            "Computed Glicko-2 ratings for {} games over {} rating periods",
            games.len(),
            periods.len()
        );

        per_game
            .into_iter()
            .enumerate()
            .map(|(game_index, [a, b])| match (a, b) {
                (Some(a), Some(b)) => Ok((a, b)),
                _ => Err(LadderError::AttributionFailed {
                    game_index,
                    reason: "game was not rated for both sides".to_string(),
                }
                .into()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 2, day, hour, 0, 0).unwrap()
    }

    fn game(winner: &'static str, loser: &'static str, end: DateTime<Utc>) -> Game<&'static str> {
        Game::new(winner, loser, end - Duration::minutes(20), end)
    }

    fn lookup(side: &&'static str) -> Result<String> {
        Ok(side.to_string())
    }

    #[test]
    fn test_reference_example() {
        let system = Glicko2::new(Glicko2Config {
            tau: 0.5,
            convergence_tolerance: 1e-6,
            ..Glicko2Config::default()
        })
        .unwrap();

        let me = Glicko2Rating::new(1500.0, 200.0, 0.06);
        let results = vec![
            (Glicko2Rating::new(1400.0, 30.0, 0.06), 1.0),
            (Glicko2Rating::new(1550.0, 100.0, 0.06), 0.0),
            (Glicko2Rating::new(1700.0, 300.0, 0.06), 0.0),
        ];

        let new_rating = system.compute_new_rating(&me, &results);

        assert!((new_rating.rating - 1464.06).abs() < 0.01);
        assert!((new_rating.deviation - 151.52).abs() < 0.01);
        assert!((new_rating.volatility - 0.05999).abs() < 0.00001);
    }

    #[test]
    fn test_empty_period_increases_deviation() {
        let system = Glicko2::default();
        let me = Glicko2Rating::new(1500.0, 345.0, 1.0);

        let new_rating = system.compute_new_rating(&me, &[]);

        assert_eq!(new_rating.deviation, 350.0);
        assert_eq!(new_rating.rating, me.rating);
        assert_eq!(new_rating.volatility, me.volatility);
    }

    #[test]
    fn test_empty_period_below_cap() {
        let system = Glicko2::default();
        let me = Glicko2Rating::new(1620.0, 100.0, 0.06);

        let new_rating = system.compute_new_rating(&me, &[]);

        let expected = GLICKO2_SCALE * (me.phi().powi(2) + 0.06f64.powi(2)).sqrt();
        assert!((new_rating.deviation - expected).abs() < 1e-9);
        assert!(new_rating.deviation > me.deviation);
    }

    #[test]
    fn test_default_rating() {
        let system = Glicko2::default();
        let rating = system.default_rating();
        assert_eq!(rating, Glicko2Rating::new(1500.0, 100.0, 0.1));
        assert_eq!(
            system.default_rating().display_value(),
            system.default_rating().display_value()
        );
    }

    #[test]
    fn test_record_result_is_two_independent_updates() {
        let system = Glicko2::default();
        let w = Glicko2Rating::new(1550.0, 80.0, 0.07);
        let l = Glicko2Rating::new(1480.0, 120.0, 0.09);

        let (new_w, new_l) = system.record_result(&w, &l);

        assert_eq!(new_w, system.rate_1vs1(&w, &l, 1.0));
        assert_eq!(new_l, system.rate_1vs1(&l, &w, 0.0));
        assert!(new_w.rating > w.rating);
        assert!(new_l.rating < l.rating);
    }

    #[test]
    fn test_config_validation() {
        assert!(Glicko2Config::default().validate().is_ok());

        let mut config = Glicko2Config::default();
        config.tau = 0.0;
        assert!(config.validate().is_err());

        config = Glicko2Config::default();
        config.rating_period_hours = 0;
        assert!(config.validate().is_err());

        config = Glicko2Config::default();
        config.initial_deviation = 400.0;
        assert!(config.validate().is_err());

        config = Glicko2Config::default();
        config.convergence_tolerance = -1.0;
        assert!(Glicko2::new(config).is_err());
    }

    #[test]
    fn test_single_game_in_single_period() {
        let system = Glicko2::default();
        let games = vec![game("alice", "bob", at(1, 12))];

        let ratings = system
            .compute_ratings_from_series_of_games(&games, lookup)
            .unwrap();

        let default = system.default_rating();
        let (expected_a, expected_b) = system.record_result(&default, &default);
        assert_eq!(ratings, vec![(expected_a, expected_b)]);
    }

    #[test]
    fn test_intra_period_replay() {
        let system = Glicko2::default();
        let games = vec![
            game("alice", "bob", at(1, 10)),
            game("alice", "carol", at(1, 11)),
            game("bob", "alice", at(2, 9)),
        ];

        let ratings = system
            .compute_ratings_from_series_of_games(&games, lookup)
            .unwrap();

        // All games share one period, so every opponent is rated at the default
        let d = system.default_rating();
        let a1 = system.rate_1vs1(&d, &d, 1.0);
        let a2 = system.rate_1vs1(&a1, &d, 1.0);
        let a3 = system.rate_1vs1(&a2, &d, 0.0);
        let b1 = system.rate_1vs1(&d, &d, 0.0);
        let b2 = system.rate_1vs1(&b1, &d, 1.0);

        assert_eq!(ratings[0], (a1, b1));
        assert_eq!(ratings[1].0, a2);
        assert_eq!(ratings[1].1, system.rate_1vs1(&d, &d, 0.0));
        assert_eq!(ratings[2], (b2, a3));
    }

    #[test]
    fn test_next_period_starts_from_official_rating() {
        let system = Glicko2::default();
        let games = vec![
            game("alice", "bob", at(1, 10)),
            game("alice", "bob", at(1, 11)),
            game("alice", "bob", at(5, 10)),
        ];

        let ratings = system
            .compute_ratings_from_series_of_games(&games, lookup)
            .unwrap();

        let d = system.default_rating();
        let mut alice = system.compute_new_rating(&d, &[(d, 1.0), (d, 1.0)]);
        alice.rating = ratings[1].0.rating;
        let mut bob = system.compute_new_rating(&d, &[(d, 0.0), (d, 0.0)]);
        bob.rating = ratings[1].1.rating;

        assert_eq!(ratings[2].0, system.rate_1vs1(&alice, &bob, 1.0));
        assert_eq!(ratings[2].1, system.rate_1vs1(&bob, &alice, 0.0));
    }

    #[test]
    fn test_self_play_is_rejected() {
        let system = Glicko2::default();
        let games = vec![game("alice", "alice", at(1, 10))];

        let err = system
            .compute_ratings_from_series_of_games(&games, lookup)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LadderError>(),
            Some(LadderError::AttributionFailed { game_index: 0, .. })
        ));
    }

    #[test]
    fn test_lookup_failure_aborts_batch() {
        let system = Glicko2::default();
        let games = vec![game("alice", "bob", at(1, 10))];

        let result = system.compute_ratings_from_series_of_games(&games, |side| {
            Err::<String, _>(
                LadderError::PlayerLookupFailed {
                    participant: side.to_string(),
                }
                .into(),
            )
        });

        assert!(result.is_err());
    }

    #[test]
    fn test_batch_is_deterministic() {
        let system = Glicko2::default();
        let games = vec![
            game("alice", "bob", at(1, 10)),
            game("carol", "dave", at(2, 10)),
            game("bob", "carol", at(4, 10)),
            game("dave", "alice", at(9, 10)),
            game("alice", "carol", at(20, 10)),
        ];

        let first = system
            .compute_ratings_from_series_of_games(&games, lookup)
            .unwrap();
        let second = system
            .compute_ratings_from_series_of_games(&games, lookup)
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_output_follows_input_order() {
        let system = Glicko2::default();
        let t = at(3, 15);
        let games = vec![
            game("alice", "bob", at(1, 10)),
            game("carol", "dave", t),
            game("erin", "frank", t),
        ];
        let permuted = vec![games[0].clone(), games[2].clone(), games[1].clone()];

        let ratings = system
            .compute_ratings_from_series_of_games(&games, lookup)
            .unwrap();
        let permuted_ratings = system
            .compute_ratings_from_series_of_games(&permuted, lookup)
            .unwrap();

        assert_eq!(ratings[0], permuted_ratings[0]);
        assert_eq!(ratings[1], permuted_ratings[2]);
        assert_eq!(ratings[2], permuted_ratings[1]);
    }

    #[test]
    fn test_sitting_out_a_period_grows_deviation() {
        let system = Glicko2::default();
        let games = vec![
            game("alice", "bob", at(1, 10)),
            game("carol", "dave", at(4, 10)),
            game("alice", "carol", at(7, 10)),
        ];

        let ratings = system
            .compute_ratings_from_series_of_games(&games, lookup)
            .unwrap();

        let d = system.default_rating();
        let mut after_first = system.compute_new_rating(&d, &[(d, 1.0)]);
        after_first.rating = ratings[0].0.rating;
        let idle = system.compute_new_rating(&after_first, &[]);
        assert!(idle.deviation > after_first.deviation);

        // Alice starts the third period from her idle-period rating; Carol is
        // one period old, so her previous rating comes from the second period
        let mut carol = system.compute_new_rating(&d, &[(d, 1.0)]);
        carol.rating = ratings[1].0.rating;
        assert_eq!(ratings[2].0, system.rate_1vs1(&idle, &carol, 1.0));
    }

    proptest! {
        #[test]
        fn prop_update_keeps_invariants(
            rating in 800.0f64..2500.0,
            deviation in 30.0f64..350.0,
            volatility in 0.03f64..0.2,
            opponents in prop::collection::vec(
                (800.0f64..2500.0, 30.0f64..350.0, 0.03f64..0.2, prop::bool::ANY),
                0..6,
            ),
        ) {
            let system = Glicko2::default();
            let me = Glicko2Rating::new(rating, deviation, volatility);
            let results: Vec<_> = opponents
                .iter()
                .map(|&(r, rd, sigma, won)| {
                    (Glicko2Rating::new(r, rd, sigma), if won { 1.0 } else { 0.0 })
                })
                .collect();

            let new_rating = system.compute_new_rating(&me, &results);

            prop_assert!(new_rating.deviation > 0.0);
            prop_assert!(new_rating.deviation <= MAX_DEVIATION);
            prop_assert!(new_rating.volatility > 0.0);
            prop_assert!(new_rating.rating.is_finite());
        }
    }
}
