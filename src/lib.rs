//! # Pixeldraw Game Library
//!
//! This library provides the authoritative session engine for a real-time
//! draw-and-guess party game. One player draws a secret word on a shared
//! pixel grid while everyone else guesses in chat. The engine decides who
//! draws, which word is drawn, how long each turn lasts and how points are
//! awarded, and pushes every change to connected clients.
//!
//! Transport and timers are supplied by the host through the
//! [`session::Tunnel`] and [`session::Clock`] traits.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![warn(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]
use derive_where::derive_where;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub mod constants;

pub mod board;
pub mod chat;
pub mod game;
pub mod leaderboard;
pub mod names;
pub mod players;
pub mod room;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod turn;
pub mod words;

#[cfg(test)]
mod testing;

use session::TimerId;

/// Messages sent to synchronize a client's full view of the session
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum SyncMessage {
    /// Session snapshots
    Game(game::SyncMessage),
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Messages sent to update specific aspects of the session
///
/// Update messages carry incremental changes that clients apply to their
/// local copy, such as a chat line, a clock tick or painted cells.
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum UpdateMessage {
    /// Players, chat, turn and clock updates
    Game(game::UpdateMessage),
    /// Drawing board updates
    Board(board::UpdateMessage),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Alarm messages for timed events
///
/// Every alarm carries the handle it was scheduled under so that an alarm
/// belonging to an earlier turn is recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// The drawing clock ticks down by one second
    Tick(TimerId),
    /// The intermission is over and the drawing clock starts
    StartClock(TimerId),
    /// The drawing clock ran out
    TurnExpired(TimerId),
    /// The result pause is over and the next turn begins
    AdvanceTurn(TimerId),
    /// The results were shown long enough and the session closes
    CloseSession(TimerId),
}

impl AlarmMessage {
    /// The handle this alarm was scheduled under
    pub fn timer(&self) -> TimerId {
        match self {
            Self::Tick(timer)
            | Self::StartClock(timer)
            | Self::TurnExpired(timer)
            | Self::AdvanceTurn(timer)
            | Self::CloseSession(timer) => *timer,
        }
    }
}

/// A truncated vector that maintains the exact count while limiting displayed items
///
/// This structure is useful for displaying a limited number of items while
/// still showing the total count.
#[derive(Debug, Clone, Serialize)]
#[derive_where(Default)]
pub struct TruncatedVec<T> {
    /// The exact total count of items
    exact_count: usize,
    /// The truncated list of items (up to the limit)
    items: Vec<T>,
}

impl<T: Clone> TruncatedVec<T> {
    /// Creates a new truncated vector from an iterator
    ///
    /// # Arguments
    ///
    /// * `list` - An iterator over items to include
    /// * `limit` - Maximum number of items to include in the truncated vector
    /// * `exact_count` - The exact total count of items (may be larger than limit)
    pub fn new<I: Iterator<Item = T>>(list: I, limit: usize, exact_count: usize) -> Self {
        let items = list.take(limit).collect_vec();
        Self { exact_count, items }
    }

    /// Returns the exact count of items
    pub fn exact_count(&self) -> usize {
        self.exact_count
    }

    /// Returns the truncated items
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_vec_new() {
        let data = vec![1, 2, 3, 4, 5];
        let truncated = TruncatedVec::new(data.into_iter(), 3, 5);

        assert_eq!(truncated.exact_count(), 5);
        assert_eq!(truncated.items(), &[1, 2, 3]);
    }

    #[test]
    fn test_alarm_timer() {
        let timer = TimerId::new(9);
        for alarm in [
            AlarmMessage::Tick(timer),
            AlarmMessage::StartClock(timer),
            AlarmMessage::TurnExpired(timer),
            AlarmMessage::AdvanceTurn(timer),
            AlarmMessage::CloseSession(timer),
        ] {
            assert_eq!(alarm.timer(), timer);
        }
    }

    #[test]
    fn test_update_message_to_message() {
        let update_msg = UpdateMessage::Board(board::UpdateMessage::Cleared);
        assert_eq!(update_msg.to_message(), r#"{"Board":"board_cleared"}"#);

        let time_up = UpdateMessage::Game(game::UpdateMessage::TimeUp);
        assert_eq!(time_up.to_message(), r#"{"Game":"time_up"}"#);
    }
}
