//! Elo rating system implementation
//!
//! Pairwise update on a single scalar, built on the Elo algorithm from the
//! skillratings crate.

use crate::rating::system::{DisplayRating, RatingSystem};
use serde::{Deserialize, Serialize};
use skillratings::elo::{elo, EloConfig};
use skillratings::Outcomes;

/// Rating given to players without any game
pub const DEFAULT_ELO: f64 = 1000.0;

/// K-factor used by the ladder
pub const K_FACTOR: f64 = 32.0;

/// Elo rating value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloRating {
    pub value: f64,
}

impl DisplayRating for EloRating {
    fn value(&self) -> f64 {
        self.value
    }
}

impl From<skillratings::elo::EloRating> for EloRating {
    fn from(rating: skillratings::elo::EloRating) -> Self {
        Self {
            value: rating.rating,
        }
    }
}

impl From<EloRating> for skillratings::elo::EloRating {
    fn from(rating: EloRating) -> Self {
        Self {
            rating: rating.value,
        }
    }
}

/// Elo configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EloSettings {
    /// Maximum rating change per game
    pub k: f64,
    /// Rating for new players
    pub initial_rating: f64,
}

impl Default for EloSettings {
    fn default() -> Self {
        Self {
            k: K_FACTOR,
            initial_rating: DEFAULT_ELO,
        }
    }
}

impl EloSettings {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.k <= 0.0 || !self.k.is_finite() {
            return Err(crate::error::LadderError::ConfigurationError {
                message: "Elo k-factor must be positive".to_string(),
            }
            .into());
        }

        if !self.initial_rating.is_finite() {
            return Err(crate::error::LadderError::ConfigurationError {
                message: "Elo initial rating must be finite".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Probability that `a` beats `b`
pub fn expected_score(a: &EloRating, b: &EloRating) -> f64 {
    1.0 / (1.0 + 10f64.powf((b.value - a.value) / 400.0))
}

/// Elo rating system
#[derive(Debug, Clone, Default)]
pub struct Elo {
    settings: EloSettings,
}

impl Elo {
    pub fn new(settings: EloSettings) -> crate::error::Result<Self> {
        settings.validate()?;

        Ok(Self { settings })
    }

    pub fn settings(&self) -> &EloSettings {
        &self.settings
    }
}

impl RatingSystem for Elo {
    type Rating = EloRating;

    fn default_rating(&self) -> EloRating {
        EloRating {
            value: self.settings.initial_rating,
        }
    }

    fn record_result(&self, winner: &EloRating, loser: &EloRating) -> (EloRating, EloRating) {
        let config = EloConfig { k: self.settings.k };
        let (new_winner, new_loser) = elo(
            &(*winner).into(),
            &(*loser).into(),
            &Outcomes::WIN,
            &config,
        );

        (new_winner.into(), new_loser.into())
    }
}
