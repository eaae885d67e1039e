use towerline_core::TileCoord;

use crate::PathError;

/// Reserved tile cost marking an impassable tile.
pub const WALL_COST: i32 = 32_767;

/// Dense matrix of tile costs describing the map topology.
///
/// Costs double as tile heights: moving between tiles of different cost pays
/// the absolute difference on top of the step length. Every mutation that
/// changes a tile bumps [`Grid::revision`], which lets route caches detect
/// that their contents were computed against an older topology.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    costs: Vec<i32>,
    revision: u64,
}

impl Grid {
    /// Creates a grid of the provided dimensions with every tile at cost zero.
    pub fn new(columns: u32, rows: u32) -> Result<Self, PathError> {
        if columns == 0 || rows == 0 {
            return Err(PathError::EmptyGrid { columns, rows });
        }

        let len = usize::try_from(u64::from(columns) * u64::from(rows))
            .map_err(|_| PathError::EmptyGrid { columns, rows })?;
        Ok(Self {
            columns,
            rows,
            costs: vec![0; len],
            revision: 0,
        })
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Counter bumped on every topology-changing mutation.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub fn contains(&self, tile: TileCoord) -> bool {
        self.index(tile).is_some()
    }

    /// Returns an error describing `tile` when it lies outside the grid.
    pub fn check_bounds(&self, tile: TileCoord) -> Result<(), PathError> {
        if self.contains(tile) {
            Ok(())
        } else {
            Err(PathError::OutOfBounds {
                tile,
                columns: self.columns,
                rows: self.rows,
            })
        }
    }

    /// Cost of the tile, or `None` when it lies outside the grid.
    #[must_use]
    pub fn cost(&self, tile: TileCoord) -> Option<i32> {
        self.index(tile)
            .and_then(|index| self.costs.get(index).copied())
    }

    /// Reports whether the tile is inside the grid and marked as a wall.
    #[must_use]
    pub fn is_wall(&self, tile: TileCoord) -> bool {
        self.cost(tile) == Some(WALL_COST)
    }

    /// Reports whether the tile is inside the grid and can be traversed.
    #[must_use]
    pub fn is_walkable(&self, tile: TileCoord) -> bool {
        matches!(self.cost(tile), Some(cost) if cost != WALL_COST)
    }

    /// Sets the cost of a tile. [`WALL_COST`] turns the tile into a wall.
    pub fn set_cost(&mut self, tile: TileCoord, cost: i32) -> Result<(), PathError> {
        if cost < 0 {
            return Err(PathError::NegativeCost { tile, cost });
        }

        let index = self.index(tile).ok_or(PathError::OutOfBounds {
            tile,
            columns: self.columns,
            rows: self.rows,
        })?;
        if let Some(slot) = self.costs.get_mut(index) {
            if *slot != cost {
                *slot = cost;
                self.revision = self.revision.wrapping_add(1);
            }
        }
        Ok(())
    }

    /// Marks the tile as impassable.
    pub fn set_wall(&mut self, tile: TileCoord) -> Result<(), PathError> {
        self.set_cost(tile, WALL_COST)
    }

    /// Resets the tile to cost zero.
    pub fn clear_tile(&mut self, tile: TileCoord) -> Result<(), PathError> {
        self.set_cost(tile, 0)
    }

    /// Iterates over every coordinate in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        let columns = i32::try_from(self.columns).unwrap_or(i32::MAX);
        let rows = i32::try_from(self.rows).unwrap_or(i32::MAX);
        (0..rows).flat_map(move |y| (0..columns).map(move |x| TileCoord::new(x, y)))
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        let x = u32::try_from(tile.x()).ok()?;
        let y = u32::try_from(tile.y()).ok()?;
        if x >= self.columns || y >= self.rows {
            return None;
        }

        let row = usize::try_from(y).ok()?;
        let column = usize::try_from(x).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}
