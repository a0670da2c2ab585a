//! Configuration constants for the drawing game
//!
//! This module contains the limits, defaults and pacing delays used
//! throughout the session engine so that every component agrees on the
//! same boundaries.

/// Session-wide limits
pub mod session {
    /// Hard ceiling on the number of players a single session can hold
    pub const MAX_PLAYER_COUNT: usize = 50;
    /// Players required before a game can start
    pub const MIN_PLAYERS_TO_START: usize = 2;
}

/// Bounds and defaults for [`crate::settings::Settings`]
pub mod settings {
    /// Minimum number of rounds in a game
    pub const MIN_ROUNDS: u32 = 1;
    /// Maximum number of rounds in a game
    pub const MAX_ROUNDS: u32 = 20;
    /// Minimum turn length in seconds
    pub const MIN_ROUND_LENGTH: u64 = 1;
    /// Maximum turn length in seconds
    pub const MAX_ROUND_LENGTH: u64 = 600;
    /// Smallest allowed player capacity
    pub const MIN_PLAYERS: usize = 2;
    /// Largest side of the square drawing grid
    pub const MAX_GRID_SIZE: usize = 128;

    /// Rounds played when the leader does not change it
    pub const DEFAULT_ROUNDS: u32 = 3;
    /// Default turn length in seconds
    pub const DEFAULT_ROUND_LENGTH: u64 = 60;
    /// Default player capacity
    pub const DEFAULT_MAX_PLAYERS: usize = 10;
    /// Default side of the drawing grid
    pub const DEFAULT_GRID_SIZE: usize = 32;
}

/// Pacing delays driven through the [`crate::session::Clock`]
pub mod timing {
    use web_time::Duration;

    /// Interval of the turn countdown
    pub const TICK: Duration = Duration::from_secs(1);
    /// Pause between two turns of the same round before the clock starts
    pub const TURN_INTERMISSION: Duration = Duration::from_secs(1);
    /// Pause at the start of a new round before the clock starts
    pub const ROUND_INTERMISSION: Duration = Duration::from_secs(5);
    /// Time given to read the result after the clock ran out
    pub const TIME_UP_DELAY: Duration = Duration::from_secs(5);
    /// Time given to read the result after everyone guessed
    pub const ALL_GUESSED_DELAY: Duration = Duration::from_secs(3);
    /// How long the final results stay up before the session closes
    pub const CLOSE_DELAY: Duration = Duration::from_secs(5 * 60);
    /// Reconnection window honoured by the connection lifecycle
    pub const RECONNECT_GRACE: Duration = Duration::from_secs(60);
}

/// Point values used by [`crate::scoring`]
pub mod scoring {
    /// Points for a guess made the instant the turn started
    pub const GUESS_POINTS: u64 = 100;
    /// Extra points for the first correct guess of a turn
    pub const FIRST_GUESS_BONUS: u64 = 50;
    /// Flat points for the drawer when the first correct guess lands
    pub const DRAWER_BASE_POINTS: u64 = 30;
    /// Time-scaled points for the drawer when the first correct guess lands
    pub const DRAWER_SPEED_POINTS: u64 = 30;
    /// Drawer bonus when every other player guessed in time
    pub const PERFECT_ROUND_BONUS: u64 = 50;
}

/// Chat limits
pub mod chat {
    /// Maximum length of a chat message in characters
    pub const MAX_MESSAGE_LENGTH: usize = 200;
}

/// Drawing board limits
pub mod board {
    /// Maximum length of a color value
    pub const MAX_COLOR_LENGTH: usize = 32;
}

/// Display name limits
pub mod names {
    /// Maximum length of a display name in bytes
    pub const MAX_LENGTH: usize = 30;
}
