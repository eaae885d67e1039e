use std::collections::VecDeque;

use glam::Vec2;
use towerline_core::TileCoord;

use crate::Route;

/// Centre of a tile in pixel space.
#[must_use]
pub fn tile_center(tile: TileCoord, tile_size: f32) -> Vec2 {
    Vec2::new(
        (tile.x() as f32 + 0.5) * tile_size,
        (tile.y() as f32 + 0.5) * tile_size,
    )
}

/// Tile containing a pixel-space position.
#[must_use]
pub fn tile_at(position: Vec2, tile_size: f32) -> TileCoord {
    let x = (position.x / tile_size).floor();
    let y = (position.y / tile_size).floor();
    TileCoord::new(x as i32, y as i32)
}

/// Pixel-space route owned by a single moving piece.
///
/// Waypoints are the centres of every tile after the origin, terminated by the
/// exact destination point. Pieces consume waypoints from the front as they
/// reach them. An empty path means no route exists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    waypoints: VecDeque<Vec2>,
    tiles: Vec<TileCoord>,
    cost: f64,
}

impl Path {
    /// Path without any waypoints.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Converts a tile route into pixel waypoints ending at `destination`.
    #[must_use]
    pub fn from_route(route: &Route, tile_size: f32, destination: Vec2) -> Self {
        if route.is_empty() {
            return Self::empty();
        }

        let tiles: Vec<TileCoord> = route.tiles().collect();
        let mut waypoints: VecDeque<Vec2> = tiles
            .iter()
            .skip(1)
            .map(|tile| tile_center(*tile, tile_size))
            .collect();
        if waypoints.back() != Some(&destination) {
            waypoints.push_back(destination);
        }

        Self {
            waypoints,
            tiles,
            cost: route.cost(),
        }
    }

    /// Next waypoint to walk toward.
    #[must_use]
    pub fn next_waypoint(&self) -> Option<Vec2> {
        self.waypoints.front().copied()
    }

    /// Consumes the next waypoint.
    pub fn pop_waypoint(&mut self) -> Option<Vec2> {
        self.waypoints.pop_front()
    }

    /// Remaining waypoints in walking order.
    pub fn waypoints(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.waypoints.iter().copied()
    }

    /// Number of waypoints not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether every waypoint was consumed, or none existed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Tile sequence of the underlying route, origin first.
    #[must_use]
    pub fn tiles(&self) -> &[TileCoord] {
        &self.tiles
    }

    /// Total edge cost of the underlying route.
    #[must_use]
    pub const fn cost(&self) -> f64 {
        self.cost
    }
}
