//! Map geometry: border walls, the entry and exit lanes and pixel extents.

use glam::Vec2;
use towerline_core::TileCoord;
use towerline_pathfinding::tile_center;

use crate::{WorldConfig, WorldError};

/// Static geometry of the map derived from a validated [`WorldConfig`].
///
/// The map is framed by walls on every edge. The left and right columns are
/// open across the lane rows: monsters enter through the left opening and
/// leave through the exit tile in the middle of the right one.
#[derive(Clone, Debug, PartialEq)]
pub struct MapLayout {
    columns: u32,
    rows: u32,
    tile_size: f32,
    lane_top: u32,
    lane_rows: u32,
}

impl MapLayout {
    pub(crate) fn new(config: &WorldConfig) -> Result<Self, WorldError> {
        let columns = config.columns();
        let rows = config.rows();
        let tile_size = config.tile_size();
        let lane_top = config.lane_top();
        let lane_rows = config.lane_rows();

        if columns < 2 || rows < 3 {
            return Err(WorldError::InvalidConfiguration(format!(
                "a {columns}x{rows} map cannot hold a border and a lane"
            )));
        }
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(WorldError::InvalidConfiguration(format!(
                "tile size must be positive, got {tile_size}"
            )));
        }
        if lane_rows == 0 {
            return Err(WorldError::InvalidConfiguration(
                "the lane needs at least one row".to_owned(),
            ));
        }
        if lane_top == 0 || lane_top.saturating_add(lane_rows) > rows - 1 {
            return Err(WorldError::InvalidConfiguration(format!(
                "lane rows {lane_top}..{} must lie strictly between the border rows of a {rows}-row map",
                lane_top.saturating_add(lane_rows)
            )));
        }

        Ok(Self {
            columns,
            rows,
            tile_size,
            lane_top,
            lane_rows,
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

    /// Side length of a tile in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Pixel extent of the whole map.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(
            self.columns as f32 * self.tile_size,
            self.rows as f32 * self.tile_size,
        )
    }

    /// Top edge and height of the lane band in pixels.
    #[must_use]
    pub fn lane_band(&self) -> (f32, f32) {
        (
            self.lane_top as f32 * self.tile_size,
            self.lane_rows as f32 * self.tile_size,
        )
    }

    /// Tiles of the left opening monsters enter through.
    pub fn entry_tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.lane().map(|row| TileCoord::new(0, row))
    }

    /// Tile every route ends in.
    #[must_use]
    pub fn exit(&self) -> TileCoord {
        let row = self.lane_top + self.lane_rows / 2;
        TileCoord::new(self.columns as i32 - 1, row as i32)
    }

    /// Pixel-space point monsters walk to.
    #[must_use]
    pub fn destination(&self) -> Vec2 {
        tile_center(self.exit(), self.tile_size)
    }

    /// Reports whether a tile belongs to the border frame.
    #[must_use]
    pub fn is_border(&self, tile: TileCoord) -> bool {
        let last_column = self.columns as i32 - 1;
        let last_row = self.rows as i32 - 1;
        if tile.x() < 0 || tile.y() < 0 || tile.x() > last_column || tile.y() > last_row {
            return false;
        }
        if tile.y() == 0 || tile.y() == last_row {
            return true;
        }
        let side = tile.x() == 0 || tile.x() == last_column;
        side && !self.in_lane(tile.y())
    }

    /// Border wall tiles in row-major order.
    pub fn border_tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.rows as i32)
            .flat_map(move |y| (0..self.columns as i32).map(move |x| TileCoord::new(x, y)))
            .filter(move |tile| self.is_border(*tile))
    }

    /// Tiles a placement must never wall up because monsters enter or leave
    /// through them.
    #[must_use]
    pub fn is_lane_opening(&self, tile: TileCoord) -> bool {
        let last_column = self.columns as i32 - 1;
        (tile.x() == 0 || tile.x() == last_column) && self.in_lane(tile.y())
    }

    /// Clamps a tile into the map bounds.
    #[must_use]
    pub fn clamp_tile(&self, tile: TileCoord) -> TileCoord {
        TileCoord::new(
            tile.x().clamp(0, self.columns as i32 - 1),
            tile.y().clamp(0, self.rows as i32 - 1),
        )
    }

    fn lane(&self) -> impl Iterator<Item = i32> {
        let top = self.lane_top as i32;
        top..top + self.lane_rows as i32
    }

    fn in_lane(&self, row: i32) -> bool {
        self.lane().any(|lane_row| lane_row == row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_map_has_lane_openings_on_both_sides() {
        let layout = MapLayout::new(&WorldConfig::default()).expect("layout");

        assert_eq!(layout.size(), Vec2::new(800.0, 600.0));
        assert_eq!(layout.exit(), TileCoord::new(39, 17));
        assert_eq!(layout.destination(), Vec2::new(790.0, 350.0));
        assert_eq!(layout.lane_band(), (300.0, 100.0));

        let entries: Vec<TileCoord> = layout.entry_tiles().collect();
        assert_eq!(entries.first(), Some(&TileCoord::new(0, 15)));
        assert_eq!(entries.last(), Some(&TileCoord::new(0, 19)));

        assert!(layout.is_border(TileCoord::new(0, 14)));
        assert!(!layout.is_border(TileCoord::new(0, 15)));
        assert!(!layout.is_border(TileCoord::new(39, 19)));
        assert!(layout.is_border(TileCoord::new(39, 20)));
        assert!(layout.is_lane_opening(TileCoord::new(39, 17)));
        assert!(!layout.is_lane_opening(TileCoord::new(20, 17)));
        assert_eq!(layout.border_tiles().count(), 2 * 40 + 2 * 28 - 10);
    }

    #[test]
    fn lane_touching_the_border_rows_is_rejected() {
        let top = WorldConfig::default().with_lane(0, 5);
        assert!(matches!(
            MapLayout::new(&top),
            Err(WorldError::InvalidConfiguration(_))
        ));

        let bottom = WorldConfig::default().with_lane(26, 4);
        assert!(matches!(
            MapLayout::new(&bottom),
            Err(WorldError::InvalidConfiguration(_))
        ));

        let snug = WorldConfig::default().with_lane(25, 4);
        assert!(MapLayout::new(&snug).is_ok());
    }

    #[test]
    fn degenerate_tile_sizes_are_rejected() {
        let config = WorldConfig::default().with_grid(40, 30, 0.0);
        assert!(MapLayout::new(&config).is_err());
        let config = WorldConfig::default().with_grid(40, 30, f32::NAN);
        assert!(MapLayout::new(&config).is_err());
    }

    #[test]
    fn clamping_keeps_tiles_inside_the_map() {
        let layout = MapLayout::new(&WorldConfig::default()).expect("layout");
        assert_eq!(layout.clamp_tile(TileCoord::new(40, -3)), TileCoord::new(39, 0));
        assert_eq!(layout.clamp_tile(TileCoord::new(5, 5)), TileCoord::new(5, 5));
    }
}
