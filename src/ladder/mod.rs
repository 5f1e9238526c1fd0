//! Ladder rebuild
//!
//! Resolves game participants to accounts, runs the configured rating system
//! over the whole history and stores the resulting standings and per-game
//! outcomes as one snapshot.

pub mod storage;

pub use storage::{InMemoryRatingStore, RatingStore};

use crate::error::{LadderError, Result};
use crate::rating::registry::LadderRatingSystem;
use crate::rating::system::DisplayRating;
use crate::types::{Account, Game, LadderSnapshot, OutcomeRecord, PlayerStanding, ProfileId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Maps participant references (e.g. replay fingerprints) to accounts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountDirectory {
    accounts: HashMap<String, Account>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory where every participant is its own account
    pub fn from_participants<'a, I>(participants: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let accounts = participants
            .into_iter()
            .map(|participant| {
                (
                    participant.clone(),
                    Account {
                        profile_id: participant.clone(),
                        name: participant.clone(),
                    },
                )
            })
            .collect();

        Self { accounts }
    }

    pub fn insert(&mut self, participant: impl Into<String>, account: Account) {
        self.accounts.insert(participant.into(), account);
    }

    pub fn get(&self, participant: &str) -> Option<&Account> {
        self.accounts.get(participant)
    }

    /// Resolve a participant, failing if it has no account
    pub fn resolve(&self, participant: &str) -> Result<&Account> {
        self.get(participant).ok_or_else(|| {
            LadderError::PlayerLookupFailed {
                participant: participant.to_string(),
            }
            .into()
        })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Rebuilds a ladder from its full game history
pub struct Ladder {
    system: LadderRatingSystem,
    store: Arc<dyn RatingStore>,
}

impl Ladder {
    pub fn new(system: LadderRatingSystem, store: Arc<dyn RatingStore>) -> Self {
        Self { system, store }
    }

    pub fn system(&self) -> &LadderRatingSystem {
        &self.system
    }

    pub fn store(&self) -> &Arc<dyn RatingStore> {
        &self.store
    }

    /// Recompute every rating from scratch and store the snapshot.
    ///
    /// Games are rated in `end_time` order; games with an unknown participant
    /// are skipped. Nothing is stored if the computation fails.
    pub fn rebuild(
        &self,
        games: &[Game<String>],
        accounts: &AccountDirectory,
    ) -> Result<LadderSnapshot> {
        let mut rated: Vec<&Game<String>> = Vec::with_capacity(games.len());
        for game in games {
            let unknown: Vec<&String> = [&game.side_a, &game.side_b]
                .into_iter()
                .filter(|participant| accounts.get(participant).is_none())
                .collect();

            if unknown.is_empty() {
                game.validate()?;
                rated.push(game);
            } else {
                warn!(
                    "Skipping game ending {}: no account for {:?}",
                    game.end_time, unknown
                );
            }
        }
        let skipped_games = games.len() - rated.len();

        // Stable, so games sharing an end time keep their submission order
        rated.sort_by_key(|game| game.end_time);
        let rated: Vec<Game<String>> = rated.into_iter().cloned().collect();

        let ratings = self
            .system
            .compute_ratings_from_series_of_games(&rated, |participant| {
                accounts
                    .resolve(participant)
                    .map(|account| account.profile_id.clone())
            })?;

        let default_display = self.system.default_rating().display_value();
        let mut standings: HashMap<ProfileId, PlayerStanding> = HashMap::new();
        let mut outcomes = Vec::with_capacity(rated.len());

        for (index, (game, (winner_rating, loser_rating))) in
            rated.iter().zip(ratings.iter()).enumerate()
        {
            let winner = accounts.resolve(&game.side_a)?;
            let loser = accounts.resolve(&game.side_b)?;

            let winner_before =
                Self::record_game(&mut standings, winner, winner_rating, default_display, true);
            let loser_before =
                Self::record_game(&mut standings, loser, loser_rating, default_display, false);

            outcomes.push(OutcomeRecord {
                index,
                start_time: game.start_time,
                end_time: game.end_time,
                winner_id: winner.profile_id.clone(),
                loser_id: loser.profile_id.clone(),
                winner_rating_before: winner_before,
                loser_rating_before: loser_before,
                winner_rating_after: winner_rating.display_value(),
                loser_rating_after: loser_rating.display_value(),
            });
        }

        let mut standings: Vec<PlayerStanding> = standings.into_values().collect();
        standings.sort_by(|a, b| {
            b.rating
                .cmp(&a.rating)
                .then_with(|| a.profile_id.cmp(&b.profile_id))
        });

        let snapshot = LadderSnapshot {
            system: self.system.kind(),
            standings,
            outcomes,
            skipped_games,
        };

        self.store.replace_snapshot(snapshot.clone())?;

        info!(
            "Ladder rebuilt with {} rating: {} games rated, {} skipped, {} players",
            snapshot.system,
            snapshot.outcomes.len(),
            snapshot.skipped_games,
            snapshot.standings.len()
        );

        Ok(snapshot)
    }

    /// Apply one game to a player's standing; returns the display value the
    /// player had before the game
    fn record_game(
        standings: &mut HashMap<ProfileId, PlayerStanding>,
        account: &Account,
        rating: &impl DisplayRating,
        default_display: i64,
        won: bool,
    ) -> i64 {
        let standing = standings
            .entry(account.profile_id.clone())
            .or_insert_with(|| PlayerStanding {
                profile_id: account.profile_id.clone(),
                name: account.name.clone(),
                wins: 0,
                losses: 0,
                previous_rating: default_display,
                rating: default_display,
            });

        let before = standing.rating;
        standing.previous_rating = before;
        standing.rating = rating.display_value();
        if won {
            standing.wins += 1;
        } else {
            standing.losses += 1;
        }
        before
    }
}
