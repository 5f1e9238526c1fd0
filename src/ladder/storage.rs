//! Rating storage interface and implementations
//!
//! A ladder rebuild produces a complete snapshot that replaces the previous one
//! in a single write. Readers only ever see whole snapshots.

use crate::error::{LadderError, Result};
use crate::types::{LadderSnapshot, PlayerStanding, ProfileId};
use std::sync::RwLock;

/// Trait for rating storage operations
#[cfg_attr(test, mockall::automock)]
pub trait RatingStore: Send + Sync {
    /// Replace the stored ladder with a freshly computed snapshot
    fn replace_snapshot(&self, snapshot: LadderSnapshot) -> Result<()>;

    /// Get the current snapshot, if a rebuild has been stored
    fn snapshot(&self) -> Result<Option<LadderSnapshot>>;

    /// Get a single player's standing
    fn standing(&self, profile_id: &ProfileId) -> Result<Option<PlayerStanding>>;

    /// Get the best `limit` standings
    fn top_standings(&self, limit: usize) -> Result<Vec<PlayerStanding>>;
}

/// In-memory rating storage implementation
#[derive(Debug, Default)]
pub struct InMemoryRatingStore {
    snapshot: RwLock<Option<LadderSnapshot>>,
}

impl InMemoryRatingStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn read_error() -> LadderError {
        LadderError::StorageError {
            message: "Failed to acquire snapshot read lock".to_string(),
        }
    }
}

impl RatingStore for InMemoryRatingStore {
    fn replace_snapshot(&self, snapshot: LadderSnapshot) -> Result<()> {
        let mut current = self
            .snapshot
            .write()
            .map_err(|_| LadderError::StorageError {
                message: "Failed to acquire snapshot write lock".to_string(),
            })?;

        *current = Some(snapshot);
        Ok(())
    }

    fn snapshot(&self) -> Result<Option<LadderSnapshot>> {
        let current = self.snapshot.read().map_err(|_| Self::read_error())?;

        Ok(current.clone())
    }

    fn standing(&self, profile_id: &ProfileId) -> Result<Option<PlayerStanding>> {
        let current = self.snapshot.read().map_err(|_| Self::read_error())?;

        Ok(current.as_ref().and_then(|snapshot| {
            snapshot
                .standings
                .iter()
                .find(|standing| standing.profile_id == *profile_id)
                .cloned()
        }))
    }

    fn top_standings(&self, limit: usize) -> Result<Vec<PlayerStanding>> {
        let current = self.snapshot.read().map_err(|_| Self::read_error())?;

        Ok(current
            .as_ref()
            .map(|snapshot| snapshot.standings.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
