//! Core game logic and state management
//!
//! This module contains the session state machine. A [`Game`] owns every
//! piece of session state (players, board, chat, settings and the turn in
//! progress) and is the only thing that mutates it. Client requests and
//! timer alarms are fed to it one at a time by the host; requests that are
//! not allowed in the current state are dropped without an error.

use std::fmt::Debug;

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tracing::{debug, info, warn};
use web_time::Duration;

use super::{
    AlarmMessage, TruncatedVec,
    board::{self, Color, DrawingBoard, Stroke},
    chat::{self, ChatKind, ChatLog, ChatMessage},
    constants::{
        session::{MAX_PLAYER_COUNT, MIN_PLAYERS_TO_START},
        timing,
    },
    leaderboard::{self, Winners},
    names::{self, NameStyle},
    players::{self, Id, Player, PlayerRegistry},
    room::RoomCode,
    scoring,
    session::{Clock, TimerId, Tunnel},
    settings::{self, Settings},
    turn::{Turn, TurnPhase, TurnScheduler},
    words::WordBank,
};

/// Externally visible phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Players are gathering and the leader may change settings
    Lobby,
    /// Turns are being played, or the final results are on screen
    Active,
    /// The session is over and every client was disconnected
    Ended,
}

/// Options fixed when the session is created
#[derive(Debug, Clone, Deserialize, Serialize, Default, Validate)]
pub struct Options {
    /// Public sessions have no leader and start once two players joined
    #[garde(skip)]
    pub public: bool,
    /// Style of the names given to players who leave theirs blank
    #[garde(dive)]
    pub random_names: NameStyle,
    /// Settings the session opens with; the only way to configure a public
    /// session, which has no leader to change them
    #[serde(default)]
    #[garde(dive)]
    pub settings: Settings,
}

/// Requests a connected player can send
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub enum IncomingMessage {
    /// A chat line, evaluated as a guess when appropriate
    Chat(String),
    /// Leader asks to start the game
    Start,
    /// Drawer paints one cell
    Draw(Stroke),
    /// Drawer paints several cells at once
    DrawBatch(Vec<Stroke>),
    /// Drawer wipes the board
    ClearBoard,
    /// Leader changes one setting
    SetSetting {
        /// camelCase name of the setting
        key: String,
        /// New value
        value: serde_json::Value,
    },
}

/// Update messages sent to players about session changes
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// Current players in join order
    Players(TruncatedVec<Player>),
    /// A new chat line
    Chat(ChatMessage),
    /// A new turn began
    Turn {
        /// Current round, starting at 1
        round: u32,
        /// Rounds in the game
        rounds: u32,
        /// Player drawing this turn
        drawer: Id,
        /// The secret word, only present for the drawer
        word: Option<String>,
        /// Number of characters in the word
        word_length: usize,
        /// Seconds on the clock
        time_remaining: u64,
    },
    /// Seconds left in the turn
    Time(u64),
    /// The clock ran out
    #[serde(rename = "time_up")]
    TimeUp,
    /// The leader changed a setting
    Settings(Settings),
    /// Final results
    GameOver {
        /// Players sharing the top score
        winners: Option<Winners>,
        /// Every connected player's score, highest first
        standings: TruncatedVec<(String, u64)>,
    },
}

/// Sync messages sent to players to replace their view of the session
#[derive(Debug, Serialize, Clone)]
pub enum SyncMessage {
    /// Full session state as seen by one player
    Snapshot(Snapshot),
}

/// Session state as seen by one player
///
/// The word is only included for the drawer, and post-guess chat only for
/// the drawer and players who guessed.
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub struct Snapshot {
    /// Room code
    pub code: RoomCode,
    /// Whether the session is public
    pub public: bool,
    /// Session phase
    pub phase: Phase,
    /// Current settings
    pub settings: Settings,
    /// Connected players in join order
    pub players: TruncatedVec<Player>,
    /// Board cells in row-major order
    pub board: Vec<Color>,
    /// Chat lines visible to this player
    pub chat: Vec<ChatMessage>,
    /// Current round
    pub round: u32,
    /// Seconds on the clock
    pub time_remaining: u64,
    /// Player drawing this turn
    pub drawer: Option<Id>,
    /// The secret word, only present for the drawer
    pub word: Option<String>,
    /// Number of characters in the word
    pub word_length: Option<usize>,
    /// Progress of the turn in progress
    pub turn_phase: Option<TurnPhase>,
}

/// The session state machine
pub struct Game {
    code: RoomCode,
    options: Options,
    settings: Settings,
    players: PlayerRegistry,
    board: DrawingBoard,
    chat: ChatLog,
    phase: Phase,
    round: u32,
    time_remaining: u64,
    scheduler: TurnScheduler,
    /// Turn in progress; `None` in the lobby, after the last turn, or while
    /// stalled with nobody connected
    turn: Option<Turn>,
    words: WordBank,
    rng: fastrand::Rng,
    next_timer: u64,
    /// Pending close alarm once the game is over
    closing: Option<TimerId>,
}

impl Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("code", &self.code)
            .field("phase", &self.phase)
            .field("round", &self.round)
            .finish_non_exhaustive()
    }
}

// Convenience methods
impl Game {
    fn allocate_timer(&mut self) -> TimerId {
        self.next_timer += 1;
        TimerId::new(self.next_timer)
    }

    fn schedule<C: Clock>(
        &mut self,
        clock: &mut C,
        alarm: fn(TimerId) -> AlarmMessage,
        delay: Duration,
    ) -> TimerId {
        let timer = self.allocate_timer();
        clock.after(alarm(timer), delay);
        timer
    }

    fn schedule_repeating<C: Clock>(
        &mut self,
        clock: &mut C,
        alarm: fn(TimerId) -> AlarmMessage,
        interval: Duration,
    ) -> TimerId {
        let timer = self.allocate_timer();
        clock.every(alarm(timer), interval);
        timer
    }

    fn cancel_all<C: Clock>(clock: &mut C, timers: Vec<TimerId>) {
        for timer in timers {
            clock.cancel(timer);
        }
    }

    fn round_length_secs(&self) -> u64 {
        self.settings.round_length().as_secs()
    }

    fn player_list(&self) -> TruncatedVec<Player> {
        TruncatedVec::new(
            self.players.iter().cloned(),
            MAX_PLAYER_COUNT,
            self.players.len(),
        )
    }

    /// Appends a chat line and delivers it to everyone allowed to read it
    fn post<T: Tunnel, F: Fn(Id) -> Option<T>>(&mut self, message: ChatMessage, tunnel_finder: &F) {
        let drawer = self.drawer();
        let update: crate::UpdateMessage = UpdateMessage::Chat(message.clone()).into();
        self.players.announce_with(
            |player| {
                message
                    .visible_to(self.players.is_privileged(player.id, drawer))
                    .then(|| update.clone())
            },
            tunnel_finder,
        );
        self.chat.push(message);
    }

    fn notice<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        kind: ChatKind,
        text: String,
        tunnel_finder: &F,
    ) {
        self.post(ChatMessage::system(kind, text), tunnel_finder);
    }

    fn announce_players<T: Tunnel, F: Fn(Id) -> Option<T>>(&self, tunnel_finder: &F) {
        self.players
            .announce(&UpdateMessage::Players(self.player_list()).into(), tunnel_finder);
    }

    fn announce_turn<T: Tunnel, F: Fn(Id) -> Option<T>>(&self, tunnel_finder: &F) {
        let Some(turn) = &self.turn else {
            return;
        };
        self.players.announce_with(
            |player| {
                Some(
                    UpdateMessage::Turn {
                        round: self.round,
                        rounds: self.settings.rounds(),
                        drawer: turn.drawer(),
                        word: (player.id == turn.drawer()).then(|| turn.word().to_owned()),
                        word_length: turn.word().chars().count(),
                        time_remaining: self.time_remaining,
                    }
                    .into(),
                )
            },
            tunnel_finder,
        );
    }

    fn sync_all<T: Tunnel, F: Fn(Id) -> Option<T>>(&self, tunnel_finder: &F) {
        for id in self.players.ids() {
            self.players
                .send_state(&self.state_message(id), id, tunnel_finder);
        }
    }

    fn assign_name(&self, requested: &str) -> Result<String, players::Error> {
        if requested.trim().is_empty() {
            return Ok(self
                .options
                .random_names
                .unique_name(|candidate| self.players.name_taken(candidate)));
        }
        let name = names::clean_name(requested)?;
        if self.players.name_taken(name) {
            return Err(names::Error::Used.into());
        }
        Ok(name.to_owned())
    }
}

impl Game {
    /// Creates a session in the lobby phase
    pub fn new(options: Options) -> Self {
        Self::with_rng(options, fastrand::Rng::new())
    }

    /// Creates a session whose random choices are reproducible
    pub fn with_seed(options: Options, seed: u64) -> Self {
        Self::with_rng(options, fastrand::Rng::with_seed(seed))
    }

    fn with_rng(options: Options, mut rng: fastrand::Rng) -> Self {
        let settings = options.settings.clone();
        let code = RoomCode::random(&mut rng);
        info!(room = %code, public = options.public, "session created");
        Self {
            code,
            options,
            board: DrawingBoard::new(settings.grid_size()),
            settings,
            players: PlayerRegistry::default(),
            chat: ChatLog::default(),
            phase: Phase::Lobby,
            round: 0,
            time_remaining: 0,
            scheduler: TurnScheduler::default(),
            turn: None,
            words: WordBank::default(),
            rng,
            next_timer: 0,
            closing: None,
        }
    }

    /// Room code
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Session options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Registered players
    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    /// The drawing board
    pub fn board(&self) -> &DrawingBoard {
        &self.board
    }

    /// The chat log
    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    /// Session phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current round, 0 before the game starts
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Seconds left on the clock
    pub fn time_remaining(&self) -> u64 {
        self.time_remaining
    }

    /// Turn in progress
    pub fn turn(&self) -> Option<&Turn> {
        self.turn.as_ref()
    }

    /// Player currently drawing, if they are connected
    pub fn drawer(&self) -> Option<Id> {
        self.turn
            .as_ref()
            .map(Turn::drawer)
            .filter(|id| self.players.contains(*id))
    }

    /// Connection limit the transport layer should enforce
    pub fn capacity(&self) -> usize {
        self.settings.max_players().min(MAX_PLAYER_COUNT)
    }

    /// Adds a player to the session
    ///
    /// The first player of a private session becomes its leader. A public
    /// session starts on its own once enough players are present; players
    /// joining a public game in progress draw from the next round on. A
    /// blank name is replaced by a generated one.
    ///
    /// # Errors
    ///
    /// * `Error::Closed` - the game is over
    /// * `Error::AlreadyJoined` - the id is registered or awaiting reconnection
    /// * `Error::VisibilityMismatch` - `public` differs from the session's flag
    /// * `Error::AlreadyStarted` - a private game is in progress
    /// * `Error::MaximumPlayers` - the session is full
    /// * `Error::Name` - the name is too long or already used
    pub fn join<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        id: Id,
        name: &str,
        public: bool,
        clock: &mut C,
        tunnel_finder: F,
    ) -> Result<(), players::Error> {
        if self.phase == Phase::Ended || self.closing.is_some() {
            return Err(players::Error::Closed);
        }
        if self.players.contains(id) || self.players.is_departed(id) {
            return Err(players::Error::AlreadyJoined);
        }
        if public != self.options.public {
            return Err(players::Error::VisibilityMismatch);
        }
        if self.phase == Phase::Active && !self.options.public {
            return Err(players::Error::AlreadyStarted);
        }
        if self.players.seats() >= self.capacity() {
            return Err(players::Error::MaximumPlayers);
        }

        let name = self.assign_name(name)?;
        let leader = !self.options.public && self.players.leader().is_none();
        self.players.insert(id, name.clone(), leader);
        info!(room = %self.code, player = %id, %name, leader, "player joined");

        self.notice(
            ChatKind::Info,
            format!("{name} joined the game!"),
            &tunnel_finder,
        );
        self.announce_players(&tunnel_finder);
        self.players
            .send_state(&self.state_message(id), id, &tunnel_finder);

        if self.options.public
            && self.phase == Phase::Lobby
            && self.players.len() >= MIN_PLAYERS_TO_START
        {
            self.begin_game(clock, &tunnel_finder);
        }
        Ok(())
    }

    /// Handles a player disconnecting
    ///
    /// The record is kept so the player can [`reconnect`](Self::reconnect)
    /// until [`forget`](Self::forget) is called. A drawer who leaves ends
    /// their turn at once.
    pub fn leave<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        id: Id,
        clock: &mut C,
        tunnel_finder: F,
    ) {
        let Some(departure) = self.players.remove(id) else {
            debug!(room = %self.code, player = %id, "leave from unknown player ignored");
            return;
        };
        info!(
            room = %self.code,
            player = %id,
            name = %departure.name,
            new_leader = ?departure.new_leader,
            "player left"
        );
        self.notice(
            ChatKind::Info,
            format!("{} left the game!", departure.name),
            &tunnel_finder,
        );
        self.announce_players(&tunnel_finder);

        if self.phase != Phase::Active || self.closing.is_some() {
            return;
        }
        if self.players.is_empty() {
            self.stall(clock);
            return;
        }

        let Some((drawer, word, resolved, guessed)) = self.turn.as_ref().map(|turn| {
            (
                turn.drawer(),
                turn.word().to_owned(),
                turn.is_resolved(),
                turn.first_guesser().is_some(),
            )
        }) else {
            return;
        };
        if resolved {
            return;
        }

        if drawer == id {
            self.notice(
                ChatKind::Warning,
                format!("{} left while drawing! The word was {word}.", departure.name),
                &tunnel_finder,
            );
            self.advance_turn(clock, &tunnel_finder);
        } else if guessed && self.players.all_guessed_except(drawer) {
            self.finish_all_guessed(clock, &tunnel_finder);
        }
    }

    /// Reattaches a player who left, with score and flags intact
    ///
    /// A game stalled because everyone left resumes with the returning
    /// player.
    pub fn reconnect<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        id: Id,
        clock: &mut C,
        tunnel_finder: F,
    ) {
        if self.phase == Phase::Ended {
            return;
        }
        let Some(name) = self
            .players
            .restore(id, !self.options.public)
            .map(|player| player.name.clone())
        else {
            debug!(room = %self.code, player = %id, "reconnect without departed record ignored");
            return;
        };
        info!(room = %self.code, player = %id, %name, "player reconnected");

        self.notice(
            ChatKind::Info,
            format!("{name} reconnected!"),
            &tunnel_finder,
        );
        self.announce_players(&tunnel_finder);
        self.players
            .send_state(&self.state_message(id), id, &tunnel_finder);

        if self.phase == Phase::Active && self.turn.is_none() && self.closing.is_none() {
            info!(room = %self.code, "resuming stalled game");
            self.advance_turn(clock, &tunnel_finder);
        }
    }

    /// Drops a departed player for good
    ///
    /// Hosts call this once [`timing::RECONNECT_GRACE`] passed without a
    /// reconnect; the seat is then free again.
    pub fn forget(&mut self, id: Id) {
        if self.players.forget(id).is_some() {
            info!(room = %self.code, player = %id, "player forgotten");
        }
    }

    /// Starts the game on the leader's request
    ///
    /// Ignored unless the session is a lobby, `id` leads it and at least two
    /// players are present.
    pub fn start<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        id: Id,
        clock: &mut C,
        tunnel_finder: F,
    ) {
        if self.phase != Phase::Lobby
            || self.players.leader() != Some(id)
            || self.players.len() < MIN_PLAYERS_TO_START
        {
            debug!(room = %self.code, player = %id, "start request ignored");
            return;
        }
        self.begin_game(clock, &tunnel_finder);
    }

    /// Handles a chat line, scoring it when it is a correct guess
    ///
    /// Players who already guessed chat in a separate channel only other
    /// guessers and the drawer can read. A line naming the word that
    /// cannot score (from the drawer, or before anything is drawn) is
    /// withheld so the word does not leak.
    pub fn submit_chat<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        id: Id,
        text: &str,
        clock: &mut C,
        tunnel_finder: F,
    ) {
        let Some(text) = chat::clean_text(text) else {
            return;
        };
        let Some((name, guessed)) = self
            .players
            .get(id)
            .map(|player| (player.name.clone(), player.guessed))
        else {
            return;
        };

        if guessed {
            self.post(
                ChatMessage::user(id, &name, text, ChatKind::Guessed),
                &tunnel_finder,
            );
            return;
        }

        let live_turn = self
            .turn
            .as_ref()
            .filter(|turn| self.phase == Phase::Active && !turn.is_resolved());
        if let Some(turn) = live_turn.filter(|turn| turn.matches(text)) {
            if turn.drawer() != id && turn.accepts_guesses() {
                self.accept_guess(id, &name, clock, &tunnel_finder);
            } else {
                debug!(room = %self.code, player = %id, "guess withheld");
            }
            return;
        }

        self.post(
            ChatMessage::user(id, &name, text, ChatKind::User),
            &tunnel_finder,
        );
    }

    /// Paints cells for the drawer
    ///
    /// Strokes with an out-of-range index or an invalid color are skipped.
    pub fn draw<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        id: Id,
        strokes: Vec<Stroke>,
        tunnel_finder: F,
    ) {
        let Some(turn) = self.turn.as_mut() else {
            return;
        };
        if turn.drawer() != id || turn.is_resolved() {
            debug!(room = %self.code, player = %id, "stroke from non-drawer ignored");
            return;
        }

        let applied = strokes
            .into_iter()
            .filter(|stroke| self.board.paint(stroke))
            .collect_vec();
        for stroke in &applied {
            turn.record_stroke(&stroke.color);
        }
        if applied.is_empty() {
            return;
        }
        self.players.announce(
            &board::UpdateMessage::Strokes(applied).into(),
            &tunnel_finder,
        );
    }

    /// Wipes the board for the drawer
    ///
    /// Guessing is closed again until the next visible stroke.
    pub fn clear_board<T: Tunnel, F: Fn(Id) -> Option<T>>(&mut self, id: Id, tunnel_finder: F) {
        let Some(turn) = self.turn.as_mut() else {
            return;
        };
        if turn.drawer() != id || turn.is_resolved() {
            debug!(room = %self.code, player = %id, "clear from non-drawer ignored");
            return;
        }
        turn.reset_strokes();
        self.board.clear();
        self.players
            .announce(&board::UpdateMessage::Cleared.into(), &tunnel_finder);
    }

    /// Changes one setting for the leader of a private lobby
    pub fn update_setting<T: Tunnel, F: Fn(Id) -> Option<T>>(
        &mut self,
        id: Id,
        key: &str,
        value: serde_json::Value,
        tunnel_finder: F,
    ) {
        if self.options.public
            || self.phase != Phase::Lobby
            || self.players.leader() != Some(id)
        {
            debug!(room = %self.code, player = %id, key, "setting change not allowed");
            return;
        }
        if let Err(error) = self.apply_setting(key, value) {
            debug!(room = %self.code, key, %error, "setting change rejected");
            return;
        }
        info!(room = %self.code, key, "setting changed");
        self.players.announce(
            &UpdateMessage::Settings(self.settings.clone()).into(),
            &tunnel_finder,
        );
    }

    fn apply_setting(&mut self, key: &str, value: serde_json::Value) -> Result<(), settings::Error> {
        let candidate = self.settings.updated(key, value)?;
        if candidate.max_players() < self.players.seats() {
            return Err(settings::Error::CapacityBelowPlayers {
                capacity: candidate.max_players(),
                present: self.players.seats(),
            });
        }
        if candidate.grid_size() != self.settings.grid_size() {
            self.board = DrawingBoard::new(candidate.grid_size());
        }
        self.settings = candidate;
        Ok(())
    }

    /// Dispatches a request from a connected player
    pub fn receive_message<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        id: Id,
        message: IncomingMessage,
        clock: &mut C,
        tunnel_finder: F,
    ) {
        if !self.players.contains(id) {
            debug!(room = %self.code, player = %id, "message from unknown player ignored");
            return;
        }

        match message {
            IncomingMessage::Chat(text) => self.submit_chat(id, &text, clock, &tunnel_finder),
            IncomingMessage::Start => self.start(id, clock, &tunnel_finder),
            IncomingMessage::Draw(stroke) => self.draw(id, vec![stroke], &tunnel_finder),
            IncomingMessage::DrawBatch(strokes) => self.draw(id, strokes, &tunnel_finder),
            IncomingMessage::ClearBoard => self.clear_board(id, &tunnel_finder),
            IncomingMessage::SetSetting { key, value } => {
                self.update_setting(id, &key, value, &tunnel_finder);
            }
        }
    }

    /// Handles a timer the session scheduled earlier
    ///
    /// Alarms whose handle no longer belongs to the turn in progress are
    /// dropped, so a callback that outlived its turn has no effect.
    pub fn receive_alarm<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        alarm: AlarmMessage,
        clock: &mut C,
        tunnel_finder: F,
    ) {
        let timer = alarm.timer();
        if let AlarmMessage::CloseSession(_) = alarm {
            if self.closing == Some(timer) {
                self.close(&tunnel_finder);
            } else {
                debug!(room = %self.code, %timer, "stale close alarm dropped");
            }
            return;
        }

        let live = match self.turn.as_mut() {
            Some(turn) if matches!(alarm, AlarmMessage::Tick(_)) => turn.tracks(timer),
            Some(turn) => turn.release(timer),
            None => false,
        };
        if !live {
            debug!(room = %self.code, ?alarm, "stale alarm dropped");
            return;
        }

        match alarm {
            AlarmMessage::Tick(_) => self.tick(&tunnel_finder),
            AlarmMessage::StartClock(_) => self.start_clock(clock, &tunnel_finder),
            AlarmMessage::TurnExpired(_) => self.expire_turn(clock, &tunnel_finder),
            AlarmMessage::AdvanceTurn(_) => self.advance_turn(clock, &tunnel_finder),
            AlarmMessage::CloseSession(_) => {}
        }
    }

    /// Session state as seen by `viewer`
    pub fn snapshot(&self, viewer: Id) -> Snapshot {
        let drawer = self.drawer();
        let privileged = self.players.is_privileged(viewer, drawer);
        Snapshot {
            code: self.code.clone(),
            public: self.options.public,
            phase: self.phase,
            settings: self.settings.clone(),
            players: self.player_list(),
            board: self.board.cells().to_vec(),
            chat: self
                .chat
                .iter()
                .filter(|message| message.visible_to(privileged))
                .cloned()
                .collect_vec(),
            round: self.round,
            time_remaining: self.time_remaining,
            drawer,
            word: self
                .turn
                .as_ref()
                .filter(|turn| turn.drawer() == viewer)
                .map(|turn| turn.word().to_owned()),
            word_length: self.turn.as_ref().map(|turn| turn.word().chars().count()),
            turn_phase: self.turn.as_ref().map(Turn::phase),
        }
    }

    /// Returns the message necessary to synchronize a player's view
    pub fn state_message(&self, viewer: Id) -> super::SyncMessage {
        SyncMessage::Snapshot(self.snapshot(viewer)).into()
    }
}

// Turn flow
impl Game {
    fn begin_game<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        clock: &mut C,
        tunnel_finder: &F,
    ) {
        self.phase = Phase::Active;
        self.chat.clear();
        self.players.reset_round();
        self.round = 1;
        self.scheduler = TurnScheduler::new(self.players.ids());
        info!(
            room = %self.code,
            players = self.players.len(),
            rounds = self.settings.rounds(),
            "game started"
        );

        let Some(drawer) = self.scheduler.start(&mut self.rng) else {
            self.stall(clock);
            return;
        };
        self.notice(
            ChatKind::Info,
            format!("Starting round {}", self.round),
            tunnel_finder,
        );
        self.begin_turn(drawer, Duration::ZERO, clock, tunnel_finder);
        self.sync_all(tunnel_finder);
    }

    /// Sets up a turn; the clock starts after `intermission`
    fn begin_turn<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        drawer: Id,
        intermission: Duration,
        clock: &mut C,
        tunnel_finder: &F,
    ) {
        self.board.clear();
        self.players.reset_guessed();
        self.time_remaining = self.round_length_secs();

        let mut turn = Turn::new(drawer, self.words.pick(&mut self.rng));
        turn.track(self.schedule(clock, AlarmMessage::StartClock, intermission));
        self.turn = Some(turn);

        let name = self.players.name(drawer).unwrap_or_default().to_owned();
        info!(room = %self.code, round = self.round, drawer = %drawer, "turn started");

        self.players
            .announce(&board::UpdateMessage::Cleared.into(), tunnel_finder);
        self.notice(ChatKind::Info, format!("{name} is drawing!"), tunnel_finder);
        self.announce_turn(tunnel_finder);
        self.announce_players(tunnel_finder);
    }

    fn start_clock<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        clock: &mut C,
        tunnel_finder: &F,
    ) {
        self.time_remaining = self.round_length_secs();
        let tick = self.schedule_repeating(clock, AlarmMessage::Tick, timing::TICK);
        let expiry = self.schedule(
            clock,
            AlarmMessage::TurnExpired,
            self.settings.round_length() + timing::TICK,
        );
        if let Some(turn) = self.turn.as_mut() {
            turn.track(tick);
            turn.track(expiry);
        }
        debug!(room = %self.code, seconds = self.time_remaining, "clock started");
        self.players.announce(
            &UpdateMessage::Time(self.time_remaining).into(),
            tunnel_finder,
        );
    }

    fn tick<T: Tunnel, F: Fn(Id) -> Option<T>>(&mut self, tunnel_finder: &F) {
        self.time_remaining = self.time_remaining.saturating_sub(1);
        self.players.announce(
            &UpdateMessage::Time(self.time_remaining).into(),
            tunnel_finder,
        );
    }

    fn expire_turn<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        clock: &mut C,
        tunnel_finder: &F,
    ) {
        let Some(turn) = self.turn.as_mut() else {
            return;
        };
        if turn.is_resolved() {
            return;
        }
        let word = turn.word().to_owned();
        Self::cancel_all(clock, turn.resolve());
        self.time_remaining = 0;
        info!(room = %self.code, round = self.round, "turn expired");

        self.players
            .announce(&UpdateMessage::TimeUp.into(), tunnel_finder);
        self.notice(
            ChatKind::Info,
            format!("Time's up! The word was {word}."),
            tunnel_finder,
        );
        self.schedule_advance(timing::TIME_UP_DELAY, clock);
    }

    fn accept_guess<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        id: Id,
        name: &str,
        clock: &mut C,
        tunnel_finder: &F,
    ) {
        let Some(turn) = self.turn.as_mut() else {
            return;
        };
        let first = turn.record_correct_guess(id);
        let drawer = turn.drawer();
        let award = scoring::score_for_guess(self.time_remaining, self.round_length_secs(), first);

        self.players.mark_guessed(id);
        self.players.award(id, award.guesser);
        self.players.award(drawer, award.drawer);
        info!(
            room = %self.code,
            player = %id,
            points = award.guesser,
            drawer_points = award.drawer,
            first,
            "correct guess"
        );

        self.notice(
            ChatKind::Success,
            format!(
                "{name} guessed the word correctly! (+{} points)",
                award.guesser
            ),
            tunnel_finder,
        );
        self.announce_players(tunnel_finder);

        if self.players.all_guessed_except(drawer) {
            self.finish_all_guessed(clock, tunnel_finder);
        }
    }

    fn finish_all_guessed<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        clock: &mut C,
        tunnel_finder: &F,
    ) {
        let Some(turn) = self.turn.as_mut() else {
            return;
        };
        if turn.is_resolved() {
            return;
        }
        let drawer = turn.drawer();
        Self::cancel_all(clock, turn.resolve());
        info!(room = %self.code, round = self.round, "everyone guessed");

        self.notice(
            ChatKind::Info,
            "Everyone guessed the word! Moving to next turn...".to_owned(),
            tunnel_finder,
        );
        if let Some(name) = self.players.name(drawer).map(str::to_owned) {
            let bonus = scoring::perfect_round_bonus();
            self.players.award(drawer, bonus);
            self.notice(
                ChatKind::Info,
                format!("{name} gets a bonus for a perfect drawing! (+{bonus} points)"),
                tunnel_finder,
            );
            self.announce_players(tunnel_finder);
        }
        self.schedule_advance(timing::ALL_GUESSED_DELAY, clock);
    }

    fn schedule_advance<C: Clock>(&mut self, delay: Duration, clock: &mut C) {
        let timer = self.schedule(clock, AlarmMessage::AdvanceTurn, delay);
        if let Some(turn) = self.turn.as_mut() {
            turn.track(timer);
        }
    }

    /// Hands the board to the next player who has not drawn this round
    fn advance_turn<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        clock: &mut C,
        tunnel_finder: &F,
    ) {
        if let Some(turn) = self.turn.take() {
            self.players.mark_drawn(turn.drawer());
            Self::cancel_all(clock, turn.into_timers());
        }
        self.players.reset_guessed();
        self.board.clear();

        if self.phase != Phase::Active || self.closing.is_some() {
            return;
        }
        if self.players.is_empty() {
            self.stall(clock);
            return;
        }

        match self.scheduler.next_undrawn(&self.players) {
            Some(drawer) => {
                self.begin_turn(drawer, timing::TURN_INTERMISSION, clock, tunnel_finder);
            }
            None => self.advance_round(clock, tunnel_finder),
        }
    }

    fn advance_round<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        clock: &mut C,
        tunnel_finder: &F,
    ) {
        if self.round >= self.settings.rounds() {
            self.end_game(clock, tunnel_finder);
            return;
        }

        self.round += 1;
        self.players.reset_round();
        self.scheduler.admit(self.players.ids());
        let Some(drawer) = self.scheduler.rotate(&self.players) else {
            self.stall(clock);
            return;
        };
        info!(room = %self.code, round = self.round, "round started");

        self.notice(
            ChatKind::Info,
            format!("Starting round {}", self.round),
            tunnel_finder,
        );
        self.begin_turn(drawer, timing::ROUND_INTERMISSION, clock, tunnel_finder);
    }

    /// Stops turn flow until a player reconnects
    fn stall<C: Clock>(&mut self, clock: &mut C) {
        if let Some(turn) = self.turn.take() {
            Self::cancel_all(clock, turn.into_timers());
        }
        self.board.clear();
        warn!(room = %self.code, round = self.round, "no eligible drawer, game stalled");
    }

    fn end_game<T: Tunnel, F: Fn(Id) -> Option<T>, C: Clock>(
        &mut self,
        clock: &mut C,
        tunnel_finder: &F,
    ) {
        let winners = leaderboard::winners(&self.players);
        info!(room = %self.code, winners = ?winners, "game over");

        if let Some(winners) = &winners {
            self.notice(ChatKind::Success, winners.announcement(), tunnel_finder);
        }
        self.notice(
            ChatKind::Info,
            "Room will close soon, thanks for playing!".to_owned(),
            tunnel_finder,
        );
        self.players.announce(
            &UpdateMessage::GameOver {
                winners,
                standings: leaderboard::standings(&self.players),
            }
            .into(),
            tunnel_finder,
        );
        self.closing = Some(self.schedule(clock, AlarmMessage::CloseSession, timing::CLOSE_DELAY));
    }

    fn close<T: Tunnel, F: Fn(Id) -> Option<T>>(&mut self, tunnel_finder: &F) {
        self.closing = None;
        self.phase = Phase::Ended;
        info!(room = %self.code, "session closed");
        self.sync_all(tunnel_finder);
        self.players.close_sessions(tunnel_finder);
    }
}
