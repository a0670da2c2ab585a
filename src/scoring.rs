//! Point calculation
//!
//! Scoring is a pure function of the time left on the clock, the turn
//! length and whether the guess was the first of its turn.

use crate::constants::scoring::*;

/// Points produced by one correct guess
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessAward {
    /// Points for the player who guessed
    pub guesser: u64,
    /// Points for the drawer, non-zero only for the first correct guess
    pub drawer: u64,
}

/// Scales `scale` by the fraction of the turn still remaining, rounding up
///
/// `time_remaining` is clamped to `round_length`.
pub fn speed_points(time_remaining: u64, round_length: u64, scale: u64) -> u64 {
    if round_length == 0 {
        return scale;
    }
    (time_remaining.min(round_length) * scale).div_ceil(round_length)
}

/// Scores a correct guess
///
/// The guesser earns up to 100 points depending on how much time is left,
/// never less than 1. The first correct guess of a turn adds a bonus for
/// the guesser and earns the drawer a flat amount plus a time-scaled
/// amount.
pub fn score_for_guess(time_remaining: u64, round_length: u64, first: bool) -> GuessAward {
    let base = speed_points(time_remaining, round_length, GUESS_POINTS).max(1);
    if first {
        GuessAward {
            guesser: base + FIRST_GUESS_BONUS,
            drawer: DRAWER_BASE_POINTS
                + speed_points(time_remaining, round_length, DRAWER_SPEED_POINTS),
        }
    } else {
        GuessAward {
            guesser: base,
            drawer: 0,
        }
    }
}

/// Drawer bonus when every other player guessed before time ran out
pub fn perfect_round_bonus() -> u64 {
    PERFECT_ROUND_BONUS
}
