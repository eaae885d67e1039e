use thiserror::Error;
use towerline_core::TileCoord;

/// Errors raised by grid construction, grid mutation and route searches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// A coordinate lies outside the grid.
    #[error("tile ({}, {}) lies outside the {columns}x{rows} grid", tile.x(), tile.y())]
    OutOfBounds {
        /// Offending coordinate.
        tile: TileCoord,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
    /// The grid would not contain a single tile.
    #[error("grid dimensions {columns}x{rows} must both be non-zero")]
    EmptyGrid {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
    },
    /// Tile costs must not be negative.
    #[error("tile ({}, {}) cannot take negative cost {cost}", tile.x(), tile.y())]
    NegativeCost {
        /// Tile whose cost was being set.
        tile: TileCoord,
        /// Rejected cost.
        cost: i32,
    },
}
