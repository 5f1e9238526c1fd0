//! Ladder Ratings - Skill rating engine for a 1v1 competitive ladder
//!
//! This crate computes player ratings from a chronological series of game
//! results, with interchangeable Elo, Glicko-2 and TrueSkill rating systems
//! behind one interface.

pub mod config;
pub mod error;
pub mod ladder;
pub mod rating;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LadderError, Result};
pub use types::*;

// Re-export key components
pub use ladder::{AccountDirectory, InMemoryRatingStore, Ladder, RatingStore};
pub use rating::{DisplayRating, LadderRatingSystem, Rating, RatingSystem, RatingSystemKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
