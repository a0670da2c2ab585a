//! Room codes
//!
//! A room code is a short identifier players can read aloud. Characters
//! that are easy to confuse (`0`/`O`, `1`/`I`) are left out of the
//! alphabet.

use std::{fmt::Display, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// Characters a room code is drawn from
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Number of characters in a room code
const LENGTH: usize = 6;

/// Short human-readable identifier of a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct RoomCode(String);

/// Errors produced when parsing a room code
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The code does not have exactly six characters
    #[error("room code must be {LENGTH} characters")]
    Length,
    /// The code contains a character outside the alphabet
    #[error("room code contains invalid character `{0}`")]
    Character(char),
}

impl RoomCode {
    /// Generates a random code
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self(
            (0..LENGTH)
                .map(|_| char::from(ALPHABET[rng.usize(..ALPHABET.len())]))
                .collect(),
        )
    }
}

impl Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RoomCode {
    type Err = Error;

    /// Parses a code, accepting lowercase input
    ///
    /// # Errors
    ///
    /// Returns an error if the code has the wrong length or contains a
    /// character outside the alphabet.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        if code.chars().count() != LENGTH {
            return Err(Error::Length);
        }
        if let Some(bad) = code
            .chars()
            .find(|c| !c.is_ascii() || !ALPHABET.contains(&(*c as u8)))
        {
            return Err(Error::Character(bad));
        }
        Ok(Self(code))
    }
}
