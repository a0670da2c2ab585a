//! Standings and winners
//!
//! The final result of a game is the set of players sharing the highest
//! score; ties are allowed and announced together.

use itertools::Itertools;
use serde::Serialize;

use crate::{TruncatedVec, constants::session::MAX_PLAYER_COUNT, players::PlayerRegistry};

/// Players sharing the top score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Winners {
    /// Names of the winners in join order
    pub names: Vec<String>,
    /// The winning score
    pub points: u64,
}

impl Winners {
    /// Chat line announcing the result
    pub fn announcement(&self) -> String {
        match self.names.as_slice() {
            [single] => format!("Game over! {single} wins with {} points!", self.points),
            names => format!(
                "Game over! {} tie for the win with {} points!",
                names.join(" and "),
                self.points
            ),
        }
    }
}

/// Connected players' names and scores, highest first
pub fn standings(players: &PlayerRegistry) -> TruncatedVec<(String, u64)> {
    let ranked = players.by_score();
    let count = ranked.len();
    TruncatedVec::new(
        ranked.into_iter().map(|p| (p.name.clone(), p.score)),
        MAX_PLAYER_COUNT,
        count,
    )
}

/// The connected players with the highest score
///
/// Returns `None` when nobody is connected.
pub fn winners(players: &PlayerRegistry) -> Option<Winners> {
    let top = players.iter().max_set_by_key(|p| p.score);
    let points = top.first()?.score;
    Some(Winners {
        names: top.into_iter().map(|p| p.name.clone()).collect_vec(),
        points,
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::players::Id;
    use pretty_assertions::assert_eq;

    fn registry(scores: &[(&str, u64)]) -> PlayerRegistry {
        let mut players = PlayerRegistry::default();
        for (name, score) in scores {
            let id = Id::new();
            players.insert(id, (*name).to_owned(), false);
            players.award(id, *score);
        }
        players
    }

    #[test]
    fn test_single_winner() {
        let players = registry(&[("Ada", 120), ("Bob", 80)]);
        let winners = winners(&players).unwrap();
        assert_eq!(
            winners,
            Winners {
                names: vec!["Ada".to_owned()],
                points: 120,
            }
        );
        assert_eq!(winners.announcement(), "Game over! Ada wins with 120 points!");
    }

    #[test]
    fn test_tie() {
        let players = registry(&[("Ada", 90), ("Bob", 90), ("Cy", 10)]);
        let winners = winners(&players).unwrap();
        assert_eq!(winners.names, vec!["Ada".to_owned(), "Bob".to_owned()]);
        assert_eq!(
            winners.announcement(),
            "Game over! Ada and Bob tie for the win with 90 points!"
        );
    }

    #[test]
    fn test_everyone_at_zero_ties() {
        let players = registry(&[("Ada", 0), ("Bob", 0)]);
        assert_eq!(winners(&players).unwrap().names.len(), 2);
    }

    #[test]
    fn test_no_players() {
        assert_eq!(winners(&PlayerRegistry::default()), None);
    }

    #[test]
    fn test_standings_sorted() {
        let players = registry(&[("Ada", 10), ("Bob", 30), ("Cy", 20)]);
        let standings = standings(&players);
        assert_eq!(standings.exact_count(), 3);
        assert_eq!(
            standings.items(),
            &[
                ("Bob".to_owned(), 30),
                ("Cy".to_owned(), 20),
                ("Ada".to_owned(), 10),
            ]
        );
    }
}
