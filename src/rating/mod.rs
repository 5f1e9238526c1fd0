//! Rating systems for 1v1 ladder games
//!
//! This module provides the shared rating interface, the Elo, Glicko-2 and
//! TrueSkill implementations, and the registry that selects one of them from
//! configuration.

pub mod elo;
pub mod glicko2;
pub mod period;
pub mod registry;
pub mod system;
pub mod trueskill;

// Re-export commonly used types
pub use elo::{Elo, EloRating, EloSettings};
pub use glicko2::{Glicko2, Glicko2Config, Glicko2Rating};
pub use registry::{LadderRatingSystem, Rating, RatingSystemKind};
pub use system::{DisplayRating, RatingSystem};
pub use trueskill::{TrueSkill, TrueSkillRating, TrueSkillSettings};
