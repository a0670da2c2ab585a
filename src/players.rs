//! Player registry
//!
//! This module tracks everyone taking part in a session: the players
//! currently connected, the join order used for leadership hand-over, and
//! the records of players who left and may still reconnect. It also owns
//! the helpers that deliver messages to players through their tunnels.

use std::{collections::HashMap, fmt::Display, str::FromStr};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;

use crate::{SyncMessage, UpdateMessage, names, session::Tunnel};

/// A unique identifier for a client, stable across reconnects
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Reasons a join request is turned away
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The session is at capacity
    #[error("maximum number of players reached")]
    MaximumPlayers,
    /// The game already started and the session does not admit late joiners
    #[error("game has already started")]
    AlreadyStarted,
    /// The client is already registered, or left and should reconnect instead
    #[error("player already joined")]
    AlreadyJoined,
    /// The game is over
    #[error("session is closed")]
    Closed,
    /// The request disagrees with the session's public flag
    #[error("session visibility does not match")]
    VisibilityMismatch,
    /// The display name was rejected
    #[error(transparent)]
    Name(#[from] names::Error),
}

/// A participant's public record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Client identifier
    pub id: Id,
    /// Display name, unique within the session
    pub name: String,
    /// Whether this player may change settings and start the game
    pub leader: bool,
    /// Total points, never decreases
    pub score: u64,
    /// Whether the player guessed the current word
    pub guessed: bool,
    /// Whether the player already drew in the current round
    pub drawn_this_round: bool,
}

impl Player {
    fn new(id: Id, name: String, leader: bool) -> Self {
        Self {
            id,
            name,
            leader,
            score: 0,
            guessed: false,
            drawn_this_round: false,
        }
    }
}

/// Outcome of a player leaving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// Name of the player who left
    pub name: String,
    /// Player who inherited leadership, if the leaver was the leader
    pub new_leader: Option<Id>,
}

/// All players of a session
///
/// Connected players live in `players`. A player who leaves is moved to
/// `departed` with score and flags intact until they reconnect or are
/// forgotten.
#[derive(Debug, Default, Clone)]
pub struct PlayerRegistry {
    players: HashMap<Id, Player>,
    /// Connected players in the order they (re)joined
    joined: Vec<Id>,
    departed: HashMap<Id, Player>,
}

impl PlayerRegistry {
    /// Number of connected players
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether no player is connected
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Seats in use, counting departed players who may still reconnect
    pub fn seats(&self) -> usize {
        self.players.len() + self.departed.len()
    }

    /// Whether `id` is a connected player
    pub fn contains(&self, id: Id) -> bool {
        self.players.contains_key(&id)
    }

    /// Whether `id` left and may still reconnect
    pub fn is_departed(&self, id: Id) -> bool {
        self.departed.contains_key(&id)
    }

    /// A connected player's record
    pub fn get(&self, id: Id) -> Option<&Player> {
        self.players.get(&id)
    }

    /// A connected player's name
    pub fn name(&self, id: Id) -> Option<&str> {
        self.players.get(&id).map(|p| p.name.as_str())
    }

    /// Connected players in join order
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.joined.iter().filter_map(|id| self.players.get(id))
    }

    /// Connected player ids in join order
    pub fn ids(&self) -> Vec<Id> {
        self.joined.clone()
    }

    /// The current leader, if any
    pub fn leader(&self) -> Option<Id> {
        self.iter().find(|p| p.leader).map(|p| p.id)
    }

    /// Whether a connected or departed player already uses `name`
    ///
    /// The comparison ignores case so that two players cannot be told
    /// apart only by capitalisation.
    pub fn name_taken(&self, name: &str) -> bool {
        self.players
            .values()
            .chain(self.departed.values())
            .any(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Registers a new connected player
    pub fn insert(&mut self, id: Id, name: String, leader: bool) -> &Player {
        self.joined.retain(|j| *j != id);
        self.joined.push(id);
        self.players
            .entry(id)
            .insert_entry(Player::new(id, name, leader))
            .into_mut()
    }

    /// Disconnects a player, keeping their record for a later reconnect
    ///
    /// Leadership passes to the earliest-joined remaining player.
    pub fn remove(&mut self, id: Id) -> Option<Departure> {
        let mut player = self.players.remove(&id)?;
        self.joined.retain(|j| *j != id);

        let new_leader = if player.leader {
            player.leader = false;
            let heir = self.joined.first().copied();
            if let Some(heir) = heir.and_then(|h| self.players.get_mut(&h)) {
                heir.leader = true;
            }
            heir
        } else {
            None
        };

        let name = player.name.clone();
        self.departed.insert(id, player);
        Some(Departure { name, new_leader })
    }

    /// Reattaches a departed player
    ///
    /// Score and flags are restored unchanged. The player becomes leader
    /// again only when `lead_if_vacant` is set and nobody leads.
    pub fn restore(&mut self, id: Id, lead_if_vacant: bool) -> Option<&Player> {
        let mut player = self.departed.remove(&id)?;
        player.leader = lead_if_vacant && self.leader().is_none();
        self.joined.push(id);
        Some(self.players.entry(id).insert_entry(player).into_mut())
    }

    /// Drops a departed player's record for good
    pub fn forget(&mut self, id: Id) -> Option<Player> {
        self.departed.remove(&id)
    }

    /// Adds points to a connected player
    pub fn award(&mut self, id: Id, points: u64) {
        if let Some(player) = self.players.get_mut(&id) {
            player.score += points;
        }
    }

    /// Marks a connected player as having guessed the current word
    pub fn mark_guessed(&mut self, id: Id) {
        if let Some(player) = self.players.get_mut(&id) {
            player.guessed = true;
        }
    }

    /// Marks a player, connected or departed, as having drawn this round
    pub fn mark_drawn(&mut self, id: Id) {
        if let Some(player) = self
            .players
            .get_mut(&id)
            .or_else(|| self.departed.get_mut(&id))
        {
            player.drawn_this_round = true;
        }
    }

    /// Clears every guessed flag
    pub fn reset_guessed(&mut self) {
        for player in self.players.values_mut().chain(self.departed.values_mut()) {
            player.guessed = false;
        }
    }

    /// Clears every per-round flag
    pub fn reset_round(&mut self) {
        for player in self.players.values_mut().chain(self.departed.values_mut()) {
            player.guessed = false;
            player.drawn_this_round = false;
        }
    }

    /// Whether every connected player except `drawer` has guessed
    ///
    /// Returns false when there is nobody but the drawer.
    pub fn all_guessed_except(&self, drawer: Id) -> bool {
        let mut guessers = self.players.values().filter(|p| p.id != drawer).peekable();
        guessers.peek().is_some() && guessers.all(|p| p.guessed)
    }

    /// Whether `id` may read post-guess chat
    pub fn is_privileged(&self, id: Id, drawer: Option<Id>) -> bool {
        drawer == Some(id) || self.players.get(&id).is_some_and(|p| p.guessed)
    }

    /// Sends a state synchronization message to a specific player
    pub fn send_state<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        message: &SyncMessage,
        id: Id,
        tunnel_finder: F,
    ) {
        let Some(session) = tunnel_finder(id) else {
            return;
        };

        session.send_state(message);
    }

    /// Sends personalized messages to every connected player
    ///
    /// The sender is called once per player and may return `None` to skip
    /// that player.
    pub fn announce_with<S, T: Tunnel, F: Fn(Id) -> Option<T>>(&self, sender: S, tunnel_finder: F)
    where
        S: Fn(&Player) -> Option<UpdateMessage>,
    {
        for player in self.iter() {
            let Some(message) = sender(player) else {
                continue;
            };
            let Some(session) = tunnel_finder(player.id) else {
                continue;
            };

            session.send_message(&message);
        }
    }

    /// Broadcasts an update message to every connected player
    pub fn announce<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &self,
        message: &UpdateMessage,
        tunnel_finder: F,
    ) {
        self.announce_with(|_| Some(message.to_owned()), tunnel_finder);
    }

    /// Closes the tunnel of every connected player
    pub fn close_sessions<T: Tunnel, F: Fn(Id) -> Option<T>>(&self, tunnel_finder: F) {
        for id in &self.joined {
            if let Some(session) = tunnel_finder(*id) {
                session.close();
            }
        }
    }

    /// Connected players sorted by score, highest first, ties in join order
    pub fn by_score(&self) -> Vec<&Player> {
        self.iter()
            .sorted_by(|a, b| b.score.cmp(&a.score))
            .collect_vec()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry(names: &[&str]) -> (PlayerRegistry, Vec<Id>) {
        let mut players = PlayerRegistry::default();
        let ids = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let id = Id::new();
                players.insert(id, (*name).to_owned(), i == 0);
                id
            })
            .collect_vec();
        (players, ids)
    }

    #[test]
    fn test_id_round_trips_through_string() {
        let id = Id::new();
        assert_eq!(id.to_string().parse::<Id>().unwrap(), id);
        assert!("not-a-uuid".parse::<Id>().is_err());
    }

    #[test]
    fn test_insert_keeps_join_order() {
        let (players, ids) = registry(&["a", "b", "c"]);
        assert_eq!(players.len(), 3);
        assert_eq!(players.ids(), ids);
        assert_eq!(players.leader(), Some(ids[0]));
        assert_eq!(players.name(ids[1]), Some("b"));
    }

    #[test]
    fn test_name_taken_ignores_case() {
        let (mut players, ids) = registry(&["Ada"]);
        assert!(players.name_taken("ada"));
        assert!(players.name_taken("ADA"));
        assert!(!players.name_taken("Bob"));

        players.remove(ids[0]);
        // departed players keep their name reserved
        assert!(players.name_taken("Ada"));
        players.forget(ids[0]);
        assert!(!players.name_taken("Ada"));
    }

    #[test]
    fn test_leader_leaves_earliest_joined_inherits() {
        let (mut players, ids) = registry(&["a", "b", "c"]);
        let departure = players.remove(ids[0]).unwrap();

        assert_eq!(
            departure,
            Departure {
                name: "a".to_owned(),
                new_leader: Some(ids[1]),
            }
        );
        assert_eq!(players.leader(), Some(ids[1]));
        assert!(players.is_departed(ids[0]));
        assert!(!players.contains(ids[0]));
    }

    #[test]
    fn test_non_leader_leaves() {
        let (mut players, ids) = registry(&["a", "b"]);
        let departure = players.remove(ids[1]).unwrap();
        assert_eq!(departure.new_leader, None);
        assert_eq!(players.leader(), Some(ids[0]));
        assert!(players.remove(ids[1]).is_none());
    }

    #[test]
    fn test_restore_keeps_score_and_flags() {
        let (mut players, ids) = registry(&["a", "b"]);
        players.award(ids[1], 70);
        players.mark_guessed(ids[1]);
        players.remove(ids[1]);

        let restored = players.restore(ids[1], true).unwrap().clone();
        assert_eq!(restored.score, 70);
        assert!(restored.guessed);
        // leadership is not vacant
        assert!(!restored.leader);
        assert_eq!(players.ids(), vec![ids[0], ids[1]]);
    }

    #[test]
    fn test_restore_takes_vacant_leadership() {
        let (mut players, ids) = registry(&["a"]);
        players.remove(ids[0]);
        assert_eq!(players.leader(), None);

        let restored = players.restore(ids[0], true).unwrap();
        assert!(restored.leader);
        assert!(players.restore(ids[0], true).is_none());
    }

    #[test]
    fn test_seats_count_departed() {
        let (mut players, ids) = registry(&["a", "b"]);
        players.remove(ids[1]);
        assert_eq!(players.len(), 1);
        assert_eq!(players.seats(), 2);
        players.forget(ids[1]);
        assert_eq!(players.seats(), 1);
    }

    #[test]
    fn test_all_guessed_except() {
        let (mut players, ids) = registry(&["drawer", "b", "c"]);
        assert!(!players.all_guessed_except(ids[0]));

        players.mark_guessed(ids[1]);
        assert!(!players.all_guessed_except(ids[0]));

        players.mark_guessed(ids[2]);
        assert!(players.all_guessed_except(ids[0]));

        players.reset_guessed();
        assert!(!players.all_guessed_except(ids[0]));
    }

    #[test]
    fn test_all_guessed_needs_a_guesser() {
        let (players, ids) = registry(&["drawer"]);
        assert!(!players.all_guessed_except(ids[0]));
    }

    #[test]
    fn test_mark_drawn_reaches_departed() {
        let (mut players, ids) = registry(&["a", "b"]);
        players.remove(ids[1]);
        players.mark_drawn(ids[1]);
        let restored = players.restore(ids[1], false).unwrap();
        assert!(restored.drawn_this_round);

        players.reset_round();
        assert!(players.iter().all(|p| !p.drawn_this_round && !p.guessed));
    }

    #[test]
    fn test_by_score_ties_in_join_order() {
        let (mut players, ids) = registry(&["a", "b", "c"]);
        players.award(ids[1], 10);
        players.award(ids[2], 10);

        let order = players.by_score().iter().map(|p| p.id).collect_vec();
        assert_eq!(order, vec![ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn test_privileged_viewers() {
        let (mut players, ids) = registry(&["drawer", "b", "c"]);
        players.mark_guessed(ids[1]);
        assert!(players.is_privileged(ids[0], Some(ids[0])));
        assert!(players.is_privileged(ids[1], Some(ids[0])));
        assert!(!players.is_privileged(ids[2], Some(ids[0])));
    }

    #[test]
    fn test_join_error_display() {
        assert_eq!(
            Error::MaximumPlayers.to_string(),
            "maximum number of players reached"
        );
        assert_eq!(
            Error::Name(names::Error::Used).to_string(),
            "name already in-use"
        );
    }
}
