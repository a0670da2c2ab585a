//! Player name validation and generation
//!
//! Names are trimmed and length-checked here; uniqueness within a session
//! is checked against the player registry. Players who leave their name
//! blank receive a generated one.

use heck::ToTitleCase;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::names::MAX_LENGTH;

/// Attempts at drawing a fresh generated name before falling back to a suffix
const GENERATION_ATTEMPTS: usize = 16;

/// Defines the style of automatically generated player names
#[derive(Debug, Clone, Copy, Deserialize, Serialize, garde::Validate)]
pub enum NameStyle {
    /// Roman-style names (praenomen + nomen, optionally + cognomen)
    Roman(#[garde(range(min = 2, max = 3))] usize),
    /// Pet-style names (adjective + animal combinations)
    Petname(#[garde(range(min = 2, max = 3))] usize),
}

impl Default for NameStyle {
    /// Default name style is Petname with 2 words
    fn default() -> Self {
        Self::Petname(2)
    }
}

impl NameStyle {
    /// Generates a random name according to this style
    pub fn get_name(&self) -> String {
        match self {
            Self::Roman(count) => romanname::romanname(romanname::NameConfig {
                praenomen: *count > 2,
            }),
            Self::Petname(count) => petname::petname(*count as u8, " ").unwrap_or_default(),
        }
        .to_title_case()
    }

    /// Generates a name for which `taken` returns false
    ///
    /// After a few collisions a numeric suffix is appended so the loop
    /// always terminates.
    pub fn unique_name<P: Fn(&str) -> bool>(&self, taken: P) -> String {
        let mut name = self.get_name();
        for _ in 0..GENERATION_ATTEMPTS {
            if !name.is_empty() && !taken(&name) {
                return name;
            }
            name = self.get_name();
        }
        (2..)
            .map(|n| format!("{name} {n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or(name)
    }
}

/// Errors that can occur during name validation
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested name is already in use by another player
    #[error("name already in-use")]
    Used,
    /// The name is empty or contains only whitespace
    #[error("name cannot be empty")]
    Empty,
    /// The name exceeds the maximum allowed length
    #[error("name is too long")]
    TooLong,
}

/// Trims a requested display name and checks its length
///
/// # Errors
///
/// * `Error::Empty` - nothing is left after trimming whitespace
/// * `Error::TooLong` - the trimmed name exceeds the maximum length
pub fn clean_name(name: &str) -> Result<&str, Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Empty);
    }
    if name.len() > MAX_LENGTH {
        return Err(Error::TooLong);
    }
    Ok(name)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use garde::Validate;

    #[test]
    fn test_clean_name_trims() {
        assert_eq!(clean_name("  Ada  "), Ok("Ada"));
    }

    #[test]
    fn test_clean_name_empty() {
        assert_eq!(clean_name(""), Err(Error::Empty));
        assert_eq!(clean_name(" \t\n"), Err(Error::Empty));
    }

    #[test]
    fn test_clean_name_length() {
        assert_eq!(clean_name(&"a".repeat(MAX_LENGTH)).map(str::len), Ok(MAX_LENGTH));
        assert_eq!(clean_name(&"a".repeat(MAX_LENGTH + 1)), Err(Error::TooLong));
        // surrounding whitespace does not count toward the limit
        let padded = format!("  {}  ", "a".repeat(MAX_LENGTH));
        assert!(clean_name(&padded).is_ok());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(Error::Used.to_string(), "name already in-use");
        assert_eq!(Error::Empty.to_string(), "name cannot be empty");
        assert_eq!(Error::TooLong.to_string(), "name is too long");
    }

    #[test]
    fn test_name_style_validation() {
        assert!(NameStyle::Petname(2).validate().is_ok());
        assert!(NameStyle::Roman(3).validate().is_ok());
        assert!(NameStyle::Petname(1).validate().is_err());
        assert!(NameStyle::Roman(4).validate().is_err());
    }

    #[test]
    fn test_petname_word_count() {
        let name = NameStyle::Petname(3).get_name();
        assert_eq!(name.matches(' ').count(), 2);
        assert!(name.chars().next().unwrap().is_uppercase());
    }

    #[test]
    fn test_roman_name_generated() {
        let name = NameStyle::Roman(2).get_name();
        assert!(!name.is_empty());
        assert!(name.chars().next().unwrap().is_uppercase());
    }

    #[test]
    fn test_unique_name_avoids_taken() {
        let style = NameStyle::Petname(2);
        let first = style.get_name();
        let name = style.unique_name(|candidate| candidate == first);
        assert_ne!(name, first);
        assert!(!name.is_empty());
    }

    #[test]
    fn test_unique_name_falls_back_to_suffix() {
        let style = NameStyle::Petname(2);
        let name = style.unique_name(|candidate| !candidate.ends_with(" 2"));
        assert!(name.ends_with(" 2"));
    }
}
