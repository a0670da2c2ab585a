//! Turn order and per-turn context
//!
//! [`TurnScheduler`] owns the fixed drawing order captured at game start
//! and walks it so that every player draws once per round. [`Turn`] holds
//! what is only meaningful while one drawer is drawing: the secret word,
//! the guessing gate, and the timers that belong to the turn.

use serde::Serialize;

use crate::{
    board::Color,
    players::{Id, PlayerRegistry},
    session::TimerId,
};

/// Progress of a single turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Nothing visible has been drawn yet; guesses are not evaluated
    AwaitingFirstStroke,
    /// The drawer painted at least one cell; guesses are evaluated
    Drawing,
    /// Time ran out, everyone guessed, or the drawer left
    Resolved,
}

/// Context of the turn in progress
#[derive(Debug, Clone)]
pub struct Turn {
    drawer: Id,
    word: String,
    phase: TurnPhase,
    first_guesser: Option<Id>,
    /// Non-erase strokes applied this turn
    strokes: usize,
    /// Pending timers owned by this turn
    timers: Vec<TimerId>,
}

impl Turn {
    /// Starts a turn for `drawer` with the secret `word`
    pub fn new(drawer: Id, word: String) -> Self {
        Self {
            drawer,
            word,
            phase: TurnPhase::AwaitingFirstStroke,
            first_guesser: None,
            strokes: 0,
            timers: Vec::new(),
        }
    }

    /// The player drawing this turn
    pub fn drawer(&self) -> Id {
        self.drawer
    }

    /// The secret word
    pub fn word(&self) -> &str {
        &self.word
    }

    /// Current phase
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// First player who guessed the word this turn
    pub fn first_guesser(&self) -> Option<Id> {
        self.first_guesser
    }

    /// Number of non-erase strokes applied this turn
    pub fn strokes(&self) -> usize {
        self.strokes
    }

    /// Whether the turn is over
    pub fn is_resolved(&self) -> bool {
        self.phase == TurnPhase::Resolved
    }

    /// Records a stroke the board accepted
    ///
    /// The first non-erase stroke opens guessing.
    pub fn record_stroke(&mut self, color: &Color) {
        if self.is_resolved() || color.is_empty() {
            return;
        }
        self.strokes += 1;
        self.phase = TurnPhase::Drawing;
    }

    /// Forgets every stroke after the board was cleared
    pub fn reset_strokes(&mut self) {
        if self.is_resolved() {
            return;
        }
        self.strokes = 0;
        self.phase = TurnPhase::AwaitingFirstStroke;
    }

    /// Whether guesses are evaluated right now
    pub fn accepts_guesses(&self) -> bool {
        self.phase == TurnPhase::Drawing
    }

    /// Whether `guess` is the secret word, ignoring case and surrounding space
    pub fn matches(&self, guess: &str) -> bool {
        guess.trim().to_lowercase() == self.word.to_lowercase()
    }

    /// Records a correct guess and returns whether it was the first one
    pub fn record_correct_guess(&mut self, guesser: Id) -> bool {
        if self.first_guesser.is_some() {
            return false;
        }
        self.first_guesser = Some(guesser);
        true
    }

    /// Ends the turn and hands back every pending timer for cancellation
    pub fn resolve(&mut self) -> Vec<TimerId> {
        self.phase = TurnPhase::Resolved;
        std::mem::take(&mut self.timers)
    }

    /// Takes ownership of a scheduled timer
    pub fn track(&mut self, timer: TimerId) {
        self.timers.push(timer);
    }

    /// Whether `timer` belongs to this turn
    pub fn tracks(&self, timer: TimerId) -> bool {
        self.timers.contains(&timer)
    }

    /// Drops a one-shot timer that fired; returns whether it was tracked
    pub fn release(&mut self, timer: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| *t != timer);
        self.timers.len() != before
    }

    /// Consumes the turn, returning the timers still pending
    pub fn into_timers(self) -> Vec<TimerId> {
        self.timers
    }
}

/// Fixed drawing order and the position of the current drawer
#[derive(Debug, Clone, Default)]
pub struct TurnScheduler {
    order: Vec<Id>,
    index: usize,
    /// Position of the current round's first drawer
    round_start: usize,
}

impl TurnScheduler {
    /// Captures the drawing order
    pub fn new(order: Vec<Id>) -> Self {
        Self {
            order,
            index: 0,
            round_start: 0,
        }
    }

    /// The captured order, including players who left since
    pub fn order(&self) -> &[Id] {
        &self.order
    }

    /// Picks a uniformly random first drawer
    pub fn start(&mut self, rng: &mut fastrand::Rng) -> Option<Id> {
        if self.order.is_empty() {
            return None;
        }
        self.index = rng.usize(..self.order.len());
        self.round_start = self.index;
        self.current()
    }

    /// The player at the current position
    pub fn current(&self) -> Option<Id> {
        self.order.get(self.index).copied()
    }

    /// Moves to the next connected player who has not drawn this round
    ///
    /// The scan starts after the current position and wraps around.
    /// Players who left are skipped in place. Returns `None` once every
    /// connected player has drawn.
    pub fn next_undrawn(&mut self, players: &PlayerRegistry) -> Option<Id> {
        let len = self.order.len();
        let next = (1..=len)
            .map(|step| (self.index + step) % len)
            .find(|&i| {
                players
                    .get(self.order[i])
                    .is_some_and(|p| !p.drawn_this_round)
            })?;
        self.index = next;
        self.current()
    }

    /// Starts a new round with the first connected player after the
    /// previous round's first drawer
    ///
    /// Players who left are skipped in place. Returns `None` when nobody in
    /// the order is connected.
    pub fn rotate(&mut self, players: &PlayerRegistry) -> Option<Id> {
        let len = self.order.len();
        let next = (1..=len)
            .map(|step| (self.round_start + step) % len)
            .find(|&i| players.contains(self.order[i]))?;
        self.index = next;
        self.round_start = next;
        self.current()
    }

    /// Appends players missing from the order, such as late joiners
    pub fn admit<I: IntoIterator<Item = Id>>(&mut self, ids: I) {
        for id in ids {
            if !self.order.contains(&id) {
                self.order.push(id);
            }
        }
    }
}
