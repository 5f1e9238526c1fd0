//! Test fixtures shared by the integration tests

use chrono::{DateTime, Duration, TimeZone, Utc};
use ladder_ratings::{Account, AccountDirectory, Game};

/// Timestamp in the fixture season
pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 10, day, hour, 0, 0).unwrap()
}

/// A game between two replay fingerprints, lasting twenty minutes
pub fn game(winner: &str, loser: &str, end: DateTime<Utc>) -> Game<String> {
    Game::new(
        winner.to_string(),
        loser.to_string(),
        end - Duration::minutes(20),
        end,
    )
}

/// Accounts of the fixture season, keyed by fingerprint
pub fn accounts() -> AccountDirectory {
    let mut accounts = AccountDirectory::new();
    for (fingerprint, profile_id, name) in [
        ("fp-1", "1", "Anvil"),
        ("fp-2", "2", "Blitz"),
        ("fp-3", "3", "Cobalt"),
        ("fp-4", "4", "Dune"),
    ] {
        accounts.insert(
            fingerprint,
            Account {
                profile_id: profile_id.to_string(),
                name: name.to_string(),
            },
        );
    }
    accounts
}

/// Two weeks of games, sorted by end time. Anvil is strongest, Dune weakest.
pub fn season() -> Vec<Game<String>> {
    vec![
        game("fp-1", "fp-2", at(1, 18)),
        game("fp-3", "fp-4", at(1, 19)),
        game("fp-1", "fp-3", at(2, 20)),
        game("fp-2", "fp-4", at(3, 21)),
        game("fp-1", "fp-4", at(5, 18)),
        game("fp-2", "fp-3", at(6, 18)),
        game("fp-3", "fp-2", at(6, 19)),
        game("fp-1", "fp-2", at(9, 20)),
        game("fp-3", "fp-4", at(12, 17)),
        game("fp-2", "fp-1", at(14, 22)),
        game("fp-1", "fp-3", at(14, 23)),
    ]
}
