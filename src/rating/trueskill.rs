//! TrueSkill rating system implementation
//!
//! This module adapts the TrueSkill algorithm from the skillratings crate to
//! the ladder's 1v1 interface. The ladder has no draws, so the draw
//! probability defaults to zero.

use crate::rating::system::{DisplayRating, RatingSystem};
use serde::{Deserialize, Serialize};
use skillratings::trueskill::{trueskill, TrueSkillConfig};
use skillratings::Outcomes;

/// TrueSkill rating, wrapping the library's `(mu, sigma)` rating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrueSkillRating {
    pub internal: skillratings::trueskill::TrueSkillRating,
}

impl TrueSkillRating {
    /// Conservative skill estimate `mu - 3 * sigma`
    pub fn exposed(&self) -> f64 {
        self.internal.rating - 3.0 * self.internal.uncertainty
    }
}

impl Default for TrueSkillRating {
    fn default() -> Self {
        Self {
            internal: skillratings::trueskill::TrueSkillRating::new(),
        }
    }
}

impl DisplayRating for TrueSkillRating {
    fn value(&self) -> f64 {
        self.exposed()
    }

    fn display_value(&self) -> i64 {
        crate::utils::display_round(self.exposed() * 100.0)
    }
}

impl From<skillratings::trueskill::TrueSkillRating> for TrueSkillRating {
    fn from(internal: skillratings::trueskill::TrueSkillRating) -> Self {
        Self { internal }
    }
}

/// TrueSkill configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrueSkillSettings {
    /// Probability of a draw; the ladder records none
    pub draw_probability: f64,
    /// Skill class width
    pub beta: f64,
    /// Additive dynamics applied to sigma before each update
    pub default_dynamics: f64,
}

impl Default for TrueSkillSettings {
    fn default() -> Self {
        let library = TrueSkillConfig::new();
        Self {
            draw_probability: 0.0,
            beta: library.beta,
            default_dynamics: library.default_dynamics,
        }
    }
}

impl TrueSkillSettings {
    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(0.0..1.0).contains(&self.draw_probability) {
            return Err(crate::error::LadderError::ConfigurationError {
                message: "TrueSkill draw probability must be in [0, 1)".to_string(),
            }
            .into());
        }

        if self.beta <= 0.0 || !self.beta.is_finite() {
            return Err(crate::error::LadderError::ConfigurationError {
                message: "TrueSkill beta must be positive".to_string(),
            }
            .into());
        }

        if self.default_dynamics < 0.0 || !self.default_dynamics.is_finite() {
            return Err(crate::error::LadderError::ConfigurationError {
                message: "TrueSkill dynamics must be non-negative".to_string(),
            }
            .into());
        }

        Ok(())
    }

    fn library_config(&self) -> TrueSkillConfig {
        TrueSkillConfig {
            draw_probability: self.draw_probability,
            beta: self.beta,
            default_dynamics: self.default_dynamics,
        }
    }
}

/// TrueSkill rating system
#[derive(Debug, Clone)]
pub struct TrueSkill {
    settings: TrueSkillSettings,
    config: TrueSkillConfig,
}

impl TrueSkill {
    pub fn new(settings: TrueSkillSettings) -> crate::error::Result<Self> {
        settings.validate()?;
        let config = settings.library_config();

        Ok(Self { settings, config })
    }

    pub fn settings(&self) -> &TrueSkillSettings {
        &self.settings
    }
}

impl Default for TrueSkill {
    fn default() -> Self {
        let settings = TrueSkillSettings::default();
        let config = settings.library_config();
        Self { settings, config }
    }
}

impl RatingSystem for TrueSkill {
    type Rating = TrueSkillRating;

    fn default_rating(&self) -> TrueSkillRating {
        TrueSkillRating::default()
    }

    fn record_result(
        &self,
        winner: &TrueSkillRating,
        loser: &TrueSkillRating,
    ) -> (TrueSkillRating, TrueSkillRating) {
        let (new_winner, new_loser) = trueskill(
            &winner.internal,
            &loser.internal,
            &Outcomes::WIN,
            &self.config,
        );

        (new_winner.into(), new_loser.into())
    }
}
