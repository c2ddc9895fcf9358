//! Position assignment for the one-hop graph.
//!
//! The main node sits at the center. Upstream nodes form a row above it,
//! downstream nodes a row below, each row centered horizontally on the main
//! node: for `n` nodes the i-th (0-indexed) lands at
//! `x = center_x + (i - (n - 1) / 2) * spacing`.

use serde::{Deserialize, Serialize};

/// Default horizontal center of the main node
pub const DEFAULT_CENTER_X: f64 = 400.0;

/// Default vertical center of the main node
pub const DEFAULT_CENTER_Y: f64 = 300.0;

/// Default horizontal distance between neighbors in a row
pub const DEFAULT_SPACING: f64 = 250.0;

/// Default vertical distance between the main node and each row
pub const DEFAULT_ROW_OFFSET: f64 = 200.0;

/// A point in layout space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate, growing downward
    pub y: f64,
}

impl Position {
    /// Create a new position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Layout constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LayoutConfig {
    /// Horizontal center of the main node
    pub center_x: f64,
    /// Vertical center of the main node
    pub center_y: f64,
    /// Horizontal distance between neighbors in a row
    pub spacing: f64,
    /// Vertical distance between the main node and each row
    pub row_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            center_x: DEFAULT_CENTER_X,
            center_y: DEFAULT_CENTER_Y,
            spacing: DEFAULT_SPACING,
            row_offset: DEFAULT_ROW_OFFSET,
        }
    }
}

impl LayoutConfig {
    /// Position of the main node
    pub fn center(&self) -> Position {
        Position::new(self.center_x, self.center_y)
    }

    /// Positions for a row of `count` upstream nodes
    pub fn upstream_row(&self, count: usize) -> impl Iterator<Item = Position> + '_ {
        self.row(count, self.center_y - self.row_offset)
    }

    /// Positions for a row of `count` downstream nodes
    pub fn downstream_row(&self, count: usize) -> impl Iterator<Item = Position> + '_ {
        self.row(count, self.center_y + self.row_offset)
    }

    #[allow(clippy::cast_precision_loss)]
    fn row(&self, count: usize, y: f64) -> impl Iterator<Item = Position> + '_ {
        let middle = count.saturating_sub(1) as f64 / 2.0;
        (0..count).map(move |i| Position::new(self.center_x + (i as f64 - middle) * self.spacing, y))
    }
}
