//! Test doubles for the transport and timer collaborators

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use web_time::Duration;

use crate::{
    AlarmMessage, SyncMessage, UpdateMessage,
    players::Id,
    session::{Clock, TimerId, Tunnel},
};

/// Marker recorded when a tunnel is closed
pub const CLOSED: &str = "<closed>";

/// Tunnel that records every delivery as JSON
#[derive(Debug, Clone, Default)]
pub struct MockTunnel {
    log: Arc<Mutex<Vec<String>>>,
}

impl Tunnel for MockTunnel {
    fn send_message(&self, message: &UpdateMessage) {
        self.log.lock().unwrap().push(message.to_message());
    }

    fn send_state(&self, state: &SyncMessage) {
        self.log.lock().unwrap().push(state.to_message());
    }

    fn close(self) {
        self.log.lock().unwrap().push(CLOSED.to_owned());
    }
}

/// Connected clients keyed by id
#[derive(Debug, Default)]
pub struct Network {
    tunnels: HashMap<Id, MockTunnel>,
}

impl Network {
    /// Opens a tunnel for `id`
    pub fn connect(&mut self, id: Id) {
        self.tunnels.entry(id).or_default();
    }

    /// Drops the tunnel of `id`
    pub fn disconnect(&mut self, id: Id) {
        self.tunnels.remove(&id);
    }

    /// Tunnel lookup handed to the game
    pub fn finder(&self) -> impl Fn(Id) -> Option<MockTunnel> + '_ {
        move |id| self.tunnels.get(&id).cloned()
    }

    /// Everything delivered to `id` so far
    pub fn log(&self, id: Id) -> Vec<String> {
        self.tunnels
            .get(&id)
            .map(|t| t.log.lock().unwrap().clone())
            .unwrap_or_default()
    }

    /// Number of deliveries to `id` containing `needle`
    pub fn count(&self, id: Id, needle: &str) -> usize {
        self.log(id).iter().filter(|m| m.contains(needle)).count()
    }

    /// Whether anything delivered to `id` contains `needle`
    pub fn received(&self, id: Id, needle: &str) -> bool {
        self.count(id, needle) > 0
    }

    /// Forgets every recorded delivery
    pub fn clear(&self) {
        for tunnel in self.tunnels.values() {
            tunnel.log.lock().unwrap().clear();
        }
    }
}

/// A callback registered with the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub alarm: AlarmMessage,
    pub delay: Duration,
    pub repeating: bool,
}

/// Clock that records callbacks so tests can fire them by hand
#[derive(Debug, Default)]
pub struct MockClock {
    scheduled: Vec<Scheduled>,
    cancelled: HashSet<TimerId>,
}

impl Clock for MockClock {
    fn after(&mut self, alarm: AlarmMessage, delay: Duration) {
        self.scheduled.push(Scheduled {
            alarm,
            delay,
            repeating: false,
        });
    }

    fn every(&mut self, alarm: AlarmMessage, interval: Duration) {
        self.scheduled.push(Scheduled {
            alarm,
            delay: interval,
            repeating: true,
        });
    }

    fn cancel(&mut self, timer: TimerId) {
        self.cancelled.insert(timer);
    }
}

impl MockClock {
    /// Callbacks that were neither cancelled nor fired
    pub fn pending<P: Fn(&AlarmMessage) -> bool>(&self, predicate: P) -> Vec<Scheduled> {
        self.scheduled
            .iter()
            .filter(|s| !self.cancelled.contains(&s.alarm.timer()) && predicate(&s.alarm))
            .copied()
            .collect()
    }

    /// Takes the oldest pending callback matching `predicate`
    ///
    /// One-shot callbacks are consumed; repeating ones stay scheduled.
    pub fn take<P: Fn(&AlarmMessage) -> bool>(&mut self, predicate: P) -> Option<AlarmMessage> {
        let position = self.scheduled.iter().position(|s| {
            !self.cancelled.contains(&s.alarm.timer()) && predicate(&s.alarm)
        })?;
        let scheduled = self.scheduled[position];
        if !scheduled.repeating {
            self.scheduled.remove(position);
        }
        Some(scheduled.alarm)
    }

    /// Whether `timer` was cancelled
    pub fn is_cancelled(&self, timer: TimerId) -> bool {
        self.cancelled.contains(&timer)
    }
}

pub fn is_tick(alarm: &AlarmMessage) -> bool {
    matches!(alarm, AlarmMessage::Tick(_))
}

pub fn is_start_clock(alarm: &AlarmMessage) -> bool {
    matches!(alarm, AlarmMessage::StartClock(_))
}

pub fn is_turn_expired(alarm: &AlarmMessage) -> bool {
    matches!(alarm, AlarmMessage::TurnExpired(_))
}

pub fn is_advance_turn(alarm: &AlarmMessage) -> bool {
    matches!(alarm, AlarmMessage::AdvanceTurn(_))
}

pub fn is_close_session(alarm: &AlarmMessage) -> bool {
    matches!(alarm, AlarmMessage::CloseSession(_))
}
