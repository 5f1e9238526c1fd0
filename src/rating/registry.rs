//! Closed set of rating systems selectable by configuration
//!
//! The ladder picks one system at construction time. `LadderRatingSystem`
//! dispatches to it and wraps its ratings in the tagged `Rating` enum.

use crate::config::RatingConfig;
use crate::error::{LadderError, Result};
use crate::rating::elo::{Elo, EloRating};
use crate::rating::glicko2::{Glicko2, Glicko2Rating};
use crate::rating::system::{DisplayRating, RatingSystem};
use crate::rating::trueskill::{TrueSkill, TrueSkillRating};
use crate::types::Game;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::str::FromStr;
use tracing::info;

/// Available rating systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingSystemKind {
    Elo,
    Glicko2,
    #[default]
    TrueSkill,
}

impl RatingSystemKind {
    pub const ALL: [RatingSystemKind; 3] = [
        RatingSystemKind::Elo,
        RatingSystemKind::Glicko2,
        RatingSystemKind::TrueSkill,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RatingSystemKind::Elo => "elo",
            RatingSystemKind::Glicko2 => "glicko2",
            RatingSystemKind::TrueSkill => "trueskill",
        }
    }
}

impl std::fmt::Display for RatingSystemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RatingSystemKind {
    type Err = LadderError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "elo" => Ok(RatingSystemKind::Elo),
            "glicko" | "glicko2" => Ok(RatingSystemKind::Glicko2),
            "trueskill" => Ok(RatingSystemKind::TrueSkill),
            _ => Err(LadderError::ConfigurationError {
                message: format!("Unknown rating system: {}", s),
            }),
        }
    }
}

/// Rating produced by any of the ladder's rating systems
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "system", rename_all = "lowercase")]
pub enum Rating {
    Elo(EloRating),
    Glicko2(Glicko2Rating),
    TrueSkill(TrueSkillRating),
}

impl Rating {
    pub fn kind(&self) -> RatingSystemKind {
        match self {
            Rating::Elo(_) => RatingSystemKind::Elo,
            Rating::Glicko2(_) => RatingSystemKind::Glicko2,
            Rating::TrueSkill(_) => RatingSystemKind::TrueSkill,
        }
    }
}

impl DisplayRating for Rating {
    fn value(&self) -> f64 {
        match self {
            Rating::Elo(r) => r.value(),
            Rating::Glicko2(r) => r.value(),
            Rating::TrueSkill(r) => r.value(),
        }
    }

    fn display_value(&self) -> i64 {
        match self {
            Rating::Elo(r) => r.display_value(),
            Rating::Glicko2(r) => r.display_value(),
            Rating::TrueSkill(r) => r.display_value(),
        }
    }
}

/// The rating system chosen for a ladder
#[derive(Debug, Clone)]
pub enum LadderRatingSystem {
    Elo(Elo),
    Glicko2(Glicko2),
    TrueSkill(TrueSkill),
}

fn mismatch(expected: RatingSystemKind, found: &Rating) -> anyhow::Error {
    LadderError::RatingSystemMismatch {
        expected: expected.name(),
        found: found.kind().name(),
    }
    .into()
}

fn wrap<R, F>(pairs: Vec<(R, R)>, variant: F) -> Vec<(Rating, Rating)>
where
    F: Fn(R) -> Rating,
{
    pairs
        .into_iter()
        .map(|(a, b)| (variant(a), variant(b)))
        .collect()
}

impl LadderRatingSystem {
    /// Build the system selected in the configuration
    pub fn from_config(config: &RatingConfig) -> Result<Self> {
        config.validate()?;

        let system = match config.system {
            RatingSystemKind::Elo => LadderRatingSystem::Elo(Elo::new(config.elo.clone())?),
            RatingSystemKind::Glicko2 => {
                LadderRatingSystem::Glicko2(Glicko2::new(config.glicko2.clone())?)
            }
            RatingSystemKind::TrueSkill => {
                LadderRatingSystem::TrueSkill(TrueSkill::new(config.trueskill.clone())?)
            }
        };

        info!("Using {} rating system", system.kind());
        Ok(system)
    }

    pub fn kind(&self) -> RatingSystemKind {
        match self {
            LadderRatingSystem::Elo(_) => RatingSystemKind::Elo,
            LadderRatingSystem::Glicko2(_) => RatingSystemKind::Glicko2,
            LadderRatingSystem::TrueSkill(_) => RatingSystemKind::TrueSkill,
        }
    }

    pub fn default_rating(&self) -> Rating {
        match self {
            LadderRatingSystem::Elo(s) => Rating::Elo(s.default_rating()),
            LadderRatingSystem::Glicko2(s) => Rating::Glicko2(s.default_rating()),
            LadderRatingSystem::TrueSkill(s) => Rating::TrueSkill(s.default_rating()),
        }
    }

    /// Update a `(winner, loser)` pair; both ratings must come from this system
    pub fn record_result(&self, winner: &Rating, loser: &Rating) -> Result<(Rating, Rating)> {
        match (self, winner, loser) {
            (LadderRatingSystem::Elo(s), Rating::Elo(w), Rating::Elo(l)) => {
                let (w, l) = s.record_result(w, l);
                Ok((Rating::Elo(w), Rating::Elo(l)))
            }
            (LadderRatingSystem::Glicko2(s), Rating::Glicko2(w), Rating::Glicko2(l)) => {
                let (w, l) = s.record_result(w, l);
                Ok((Rating::Glicko2(w), Rating::Glicko2(l)))
            }
            (LadderRatingSystem::TrueSkill(s), Rating::TrueSkill(w), Rating::TrueSkill(l)) => {
                let (w, l) = s.record_result(w, l);
                Ok((Rating::TrueSkill(w), Rating::TrueSkill(l)))
            }
            (system, winner, loser) => {
                let offending = if winner.kind() != system.kind() {
                    winner
                } else {
                    loser
                };
                Err(mismatch(system.kind(), offending))
            }
        }
    }

    /// Per-game `(side_a, side_b)` ratings for a time-ordered series
    pub fn compute_ratings_from_series_of_games<S, K, F>(
        &self,
        games: &[Game<S>],
        player_lookup: F,
    ) -> Result<Vec<(Rating, Rating)>>
    where
        K: Eq + Hash + Clone,
        F: Fn(&S) -> Result<K>,
    {
        let ratings = match self {
            LadderRatingSystem::Elo(s) => wrap(
                s.compute_ratings_from_series_of_games(games, player_lookup)?,
                Rating::Elo,
            ),
            LadderRatingSystem::Glicko2(s) => wrap(
                s.compute_ratings_from_series_of_games(games, player_lookup)?,
                Rating::Glicko2,
            ),
            LadderRatingSystem::TrueSkill(s) => wrap(
                s.compute_ratings_from_series_of_games(games, player_lookup)?,
                Rating::TrueSkill,
            ),
        };

        Ok(ratings)
    }
}
