//! Error types for the rating engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the crate.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific rating scenarios
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    #[error("Player lookup failed for participant: {participant}")]
    PlayerLookupFailed { participant: String },

    #[error("Game {game_index} cannot be attributed to player: {reason}")]
    AttributionFailed { game_index: usize, reason: String },

    #[error("Rating system mismatch: expected {expected} rating, got {found}")]
    RatingSystemMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid game: {reason}")]
    InvalidGame { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },
}
