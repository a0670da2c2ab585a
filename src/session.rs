//! External collaborators of the session engine
//!
//! The engine never talks to sockets or timers directly. Outbound
//! delivery goes through a [`Tunnel`] per connected client and every
//! delayed or repeating callback goes through a [`Clock`]. Both are
//! implemented by the hosting transport layer.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use web_time::Duration;

use super::{AlarmMessage, SyncMessage, UpdateMessage};

/// Trait for sending messages through a communication tunnel
///
/// This trait abstracts the communication mechanism used to send messages
/// to connected clients. Implementations might use WebSockets, Server-Sent
/// Events, or other real-time communication protocols.
pub trait Tunnel {
    /// Sends an update message to the client
    ///
    /// Update messages carry incremental changes (a stroke, a chat line,
    /// a clock tick) that the client applies to its local copy.
    fn send_message(&self, message: &UpdateMessage);

    /// Sends a state synchronization message to the client
    ///
    /// Sync messages carry a full snapshot, typically when the client
    /// joins, reconnects or the game starts.
    fn send_state(&self, state: &SyncMessage);

    /// Closes the communication tunnel
    fn close(self);
}

/// Handle of a scheduled callback
///
/// Handles are issued by the session itself and travel inside every
/// [`AlarmMessage`], so the clock can cancel a callback by handle and the
/// session can tell a live alarm from a stale one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

impl TimerId {
    /// Wraps a raw handle value
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Timer facility supplied by the host
///
/// When a callback fires, the host hands the alarm back to
/// [`crate::game::Game::receive_alarm`] on the session's serialized
/// event stream.
pub trait Clock {
    /// Delivers `alarm` once after `delay`
    fn after(&mut self, alarm: AlarmMessage, delay: Duration);

    /// Delivers `alarm` every `interval` until cancelled
    fn every(&mut self, alarm: AlarmMessage, interval: Duration);

    /// Cancels the callback carrying `timer`; unknown handles are ignored
    fn cancel(&mut self, timer: TimerId);
}
