//! Per-game configuration
//!
//! Settings are chosen by the leader of a private lobby before the game
//! starts and are frozen for the rest of the session. Every change goes
//! through serde and garde so that a single malformed value can never
//! leave the session with an out-of-range configuration.

use std::time::Duration;

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{self, settings::*};

/// Validation result type for duration validation
type ValidationResult = garde::Result;

/// Validates that a duration falls within specified bounds.
///
/// This is a custom validation function for use with the `garde` crate.
/// It checks if the duration in seconds is within the inclusive range
/// defined by `MIN_SECONDS` and `MAX_SECONDS`.
///
/// # Errors
///
/// Returns a `garde::Error` if the duration is outside the specified bounds.
pub fn validate_duration<const MIN_SECONDS: u64, const MAX_SECONDS: u64>(
    val: &Duration,
    _ctx: &(),
) -> ValidationResult {
    if (MIN_SECONDS..=MAX_SECONDS).contains(&val.as_secs()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "outside of bounds [{MIN_SECONDS},{MAX_SECONDS}]",
        )))
    }
}

/// Rule set of the game
///
/// Only one mode exists today; the label is kept so clients can display it
/// and so new modes do not change the settings shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Classic draw-and-guess rules
    #[default]
    Normal,
}

/// Configuration of a single game
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Number of rounds played before the game ends
    #[garde(range(min = MIN_ROUNDS, max = MAX_ROUNDS))]
    rounds: u32,
    /// Length of a single drawing turn
    #[garde(custom(validate_duration::<MIN_ROUND_LENGTH, MAX_ROUND_LENGTH>))]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    round_length: Duration,
    /// Maximum number of players admitted to the session
    #[garde(range(min = MIN_PLAYERS, max = constants::session::MAX_PLAYER_COUNT))]
    max_players: usize,
    /// Side of the square drawing grid
    #[garde(range(min = 1, max = MAX_GRID_SIZE))]
    grid_size: usize,
    /// Rule set label
    #[garde(skip)]
    game_mode: GameMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            round_length: Duration::from_secs(DEFAULT_ROUND_LENGTH),
            max_players: DEFAULT_MAX_PLAYERS,
            grid_size: DEFAULT_GRID_SIZE,
            game_mode: GameMode::default(),
        }
    }
}

/// Errors produced when a setting change is rejected
#[derive(Error, Debug)]
pub enum Error {
    /// The key does not name a setting
    #[error("unknown setting `{0}`")]
    UnknownKey(String),
    /// The value does not have the shape the setting expects
    #[error("malformed setting value: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The value is outside the allowed range
    #[error("invalid setting value: {0}")]
    Invalid(#[from] garde::Report),
    /// The new capacity would not fit the players already present
    #[error("capacity of {capacity} is below the {present} players present")]
    CapacityBelowPlayers {
        /// Requested capacity
        capacity: usize,
        /// Players currently registered
        present: usize,
    },
}

impl Settings {
    /// Number of rounds in the game
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Length of a drawing turn
    pub fn round_length(&self) -> Duration {
        self.round_length
    }

    /// Maximum number of players
    pub fn max_players(&self) -> usize {
        self.max_players
    }

    /// Side of the drawing grid
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Rule set label
    pub fn game_mode(&self) -> GameMode {
        self.game_mode
    }

    /// Returns a copy of these settings with `key` set to `value`
    ///
    /// Keys use the camelCase wire names (`rounds`, `roundLength`,
    /// `maxPlayers`, `gridSize`, `gameMode`). The candidate is validated as a
    /// whole before it is returned.
    ///
    /// # Errors
    ///
    /// * `Error::UnknownKey` - `key` is not a setting
    /// * `Error::Malformed` - `value` cannot be read as that setting
    /// * `Error::Invalid` - the resulting settings fail validation
    pub fn updated(&self, key: &str, value: serde_json::Value) -> Result<Self, Error> {
        let mut raw = serde_json::to_value(self)?;
        let Some(slot) = raw.get_mut(key) else {
            return Err(Error::UnknownKey(key.to_owned()));
        };
        *slot = value;

        let candidate: Self = serde_json::from_value(raw)?;
        candidate.validate()?;
        Ok(candidate)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.rounds(), 3);
        assert_eq!(settings.round_length(), Duration::from_secs(60));
        assert_eq!(settings.max_players(), 10);
        assert_eq!(settings.grid_size(), 32);
        assert_eq!(settings.game_mode(), GameMode::Normal);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_serializes_camel_case_seconds() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "rounds": 3,
                "roundLength": 60,
                "maxPlayers": 10,
                "gridSize": 32,
                "gameMode": "Normal",
            })
        );
    }

    #[test]
    fn test_updated_each_key() {
        let settings = Settings::default()
            .updated("rounds", json!(5))
            .and_then(|s| s.updated("roundLength", json!(90)))
            .and_then(|s| s.updated("maxPlayers", json!(4)))
            .and_then(|s| s.updated("gridSize", json!(16)))
            .and_then(|s| s.updated("gameMode", json!("Normal")))
            .unwrap();

        assert_eq!(settings.rounds(), 5);
        assert_eq!(settings.round_length(), Duration::from_secs(90));
        assert_eq!(settings.max_players(), 4);
        assert_eq!(settings.grid_size(), 16);
    }

    #[test]
    fn test_updated_unknown_key() {
        let result = Settings::default().updated("turbo", json!(true));
        assert!(matches!(result, Err(Error::UnknownKey(key)) if key == "turbo"));
    }

    #[test]
    fn test_updated_wrong_type() {
        let settings = Settings::default();
        assert!(matches!(
            settings.updated("rounds", json!("many")),
            Err(Error::Malformed(_))
        ));
        assert!(matches!(
            settings.updated("gameMode", json!("Speed")),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_updated_out_of_range() {
        let settings = Settings::default();
        for (key, value) in [
            ("rounds", json!(0)),
            ("roundLength", json!(0)),
            ("maxPlayers", json!(1)),
            ("gridSize", json!(0)),
        ] {
            assert!(matches!(
                settings.updated(key, value),
                Err(Error::Invalid(_))
            ));
        }
    }

    #[test]
    fn test_validate_duration_bounds() {
        assert!(validate_duration::<1, 10>(&Duration::from_secs(1), &()).is_ok());
        assert!(validate_duration::<1, 10>(&Duration::from_secs(10), &()).is_ok());
        assert!(validate_duration::<1, 10>(&Duration::from_secs(0), &()).is_err());
        assert!(validate_duration::<1, 10>(&Duration::from_secs(11), &()).is_err());
    }
}
