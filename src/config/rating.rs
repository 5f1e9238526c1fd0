//! Rating system configuration

use crate::rating::elo::EloSettings;
use crate::rating::glicko2::Glicko2Config;
use crate::rating::registry::RatingSystemKind;
use crate::rating::trueskill::TrueSkillSettings;
use serde::{Deserialize, Serialize};

/// Selected rating system and the parameters of every system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub system: RatingSystemKind,
    pub elo: EloSettings,
    pub glicko2: Glicko2Config,
    pub trueskill: TrueSkillSettings,
}

impl RatingConfig {
    /// Validate the parameters of all systems, not only the selected one
    pub fn validate(&self) -> crate::error::Result<()> {
        self.elo.validate()?;
        self.glicko2.validate()?;
        self.trueskill.validate()?;
        Ok(())
    }
}
