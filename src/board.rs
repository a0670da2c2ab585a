//! The shared drawing surface
//!
//! A board is a square grid of colored cells stored row by row. Its length
//! is decided when it is created and only the colors change afterwards.

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::constants::board::MAX_COLOR_LENGTH;

/// Color values that mean "nothing painted here"
pub const ERASE_COLORS: [&str; 2] = ["transparent", "bg-transparent"];

/// Color every cell holds after a reset
const EMPTY_COLOR: &str = "bg-transparent";

/// Color of a single cell, as sent by the drawing client
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate, derive_more::Display,
)]
#[serde(transparent)]
#[garde(transparent)]
pub struct Color(#[garde(length(max = MAX_COLOR_LENGTH))] String);

impl Color {
    /// Wraps a client-provided color value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The sentinel an erased cell holds
    pub fn empty() -> Self {
        Self(EMPTY_COLOR.to_owned())
    }

    /// Whether this color erases rather than paints
    pub fn is_empty(&self) -> bool {
        ERASE_COLORS.contains(&self.0.as_str())
    }

    /// The raw color value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::empty()
    }
}

/// A request to paint one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Stroke {
    /// Row-major cell index
    #[garde(skip)]
    pub index: usize,
    /// Color to paint
    #[garde(dive)]
    pub color: Color,
}

impl Stroke {
    /// Creates a stroke painting `index` with `color`
    pub fn new(index: usize, color: impl Into<String>) -> Self {
        Self {
            index,
            color: Color::new(color),
        }
    }

    /// Whether this stroke leaves visible paint
    pub fn is_paint(&self) -> bool {
        !self.color.is_empty()
    }
}

/// Fixed-size grid of colored cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawingBoard {
    cells: Vec<Color>,
}

impl DrawingBoard {
    /// Creates an all-empty board with `grid_size * grid_size` cells
    pub fn new(grid_size: usize) -> Self {
        Self {
            cells: vec![Color::empty(); grid_size * grid_size],
        }
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the board has no cells at all
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether every cell holds an erase color
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Color::is_empty)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[Color] {
        &self.cells
    }

    /// Paints a cell
    ///
    /// Returns `false` without touching the board when the index is out of
    /// range or the color fails validation.
    pub fn paint(&mut self, stroke: &Stroke) -> bool {
        if stroke.validate().is_err() {
            return false;
        }
        let Some(cell) = self.cells.get_mut(stroke.index) else {
            return false;
        };
        cell.clone_from(&stroke.color);
        true
    }

    /// Resets every cell to the empty color
    pub fn clear(&mut self) {
        self.cells.fill(Color::empty());
    }
}

/// Board events broadcast to every client
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// Cells painted by the drawer, in the order they were applied
    Strokes(Vec<Stroke>),
    /// Every cell was reset; clients should redraw from scratch
    #[serde(rename = "board_cleared")]
    Cleared,
}
