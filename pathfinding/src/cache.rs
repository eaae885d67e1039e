use std::collections::HashMap;

use glam::Vec2;
use towerline_core::TileCoord;
use tracing::debug;

use crate::{AStar, Grid, GridGraph, IndexedNodeCollection, Path, PathError};

/// Memoised routes from origin tiles to a fixed exit.
///
/// Entries are keyed by origin tile only, so every cache serves exactly one
/// destination. The cache empties itself when the grid it is queried with has
/// a different revision than the one its entries were computed against, and
/// [`PathCache::invalidate`] clears it explicitly. Unreachable origins are
/// cached as empty paths.
#[derive(Clone, Debug)]
pub struct PathCache {
    exit: TileCoord,
    destination: Vec2,
    tile_size: f32,
    ignore_corners: bool,
    routes: HashMap<TileCoord, Path>,
    revision: Option<u64>,
    hits: u64,
    misses: u64,
}

impl PathCache {
    /// Creates an empty cache for routes ending at `destination` inside `exit`.
    ///
    /// Routes are orthogonal only; see [`PathCache::with_corner_cutting`].
    #[must_use]
    pub fn new(exit: TileCoord, destination: Vec2, tile_size: f32) -> Self {
        Self {
            exit,
            destination,
            tile_size,
            ignore_corners: true,
            routes: HashMap::new(),
            revision: None,
            hits: 0,
            misses: 0,
        }
    }

    /// Allows or forbids diagonal steps for routes computed by this cache.
    #[must_use]
    pub fn with_corner_cutting(mut self, allowed: bool) -> Self {
        self.ignore_corners = !allowed;
        self
    }

    /// Returns an owned copy of the route from `origin` to the exit.
    pub fn get_or_compute(&mut self, grid: &Grid, origin: TileCoord) -> Result<Path, PathError> {
        if self.revision != Some(grid.revision()) {
            if !self.routes.is_empty() {
                debug!(
                    cached = self.routes.len(),
                    revision = grid.revision(),
                    "path_cache_stale"
                );
            }
            self.routes.clear();
            self.revision = Some(grid.revision());
        }

        if let Some(path) = self.routes.get(&origin) {
            self.hits = self.hits.saturating_add(1);
            return Ok(path.clone());
        }

        self.misses = self.misses.saturating_add(1);
        let mut search = AStar::new(GridGraph::<IndexedNodeCollection>::new(grid));
        let route = search.search(origin, Some(self.exit), self.ignore_corners)?;
        let path = Path::from_route(&route, self.tile_size, self.destination);
        debug!(
            origin_x = origin.x(),
            origin_y = origin.y(),
            waypoints = path.remaining(),
            cost = path.cost(),
            "path_cache_miss"
        );
        let _ = self.routes.insert(origin, path.clone());
        Ok(path)
    }

    /// Drops every cached route.
    pub fn invalidate(&mut self) {
        self.routes.clear();
        self.revision = None;
    }

    /// Exit tile every cached route ends in.
    #[must_use]
    pub const fn exit(&self) -> TileCoord {
        self.exit
    }

    /// Exact pixel-space destination every route ends at.
    #[must_use]
    pub const fn destination(&self) -> Vec2 {
        self.destination
    }

    /// Number of cached origins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Reports whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Lookups answered from the cache.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that required a search.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile_center;

    fn corridor_cache(grid: &Grid) -> PathCache {
        let exit = TileCoord::new(grid.columns() as i32 - 1, 0);
        PathCache::new(exit, tile_center(exit, 10.0), 10.0)
    }

    #[test]
    fn second_lookup_is_a_hit_with_identical_route() {
        let grid = Grid::new(6, 3).expect("grid");
        let mut cache = corridor_cache(&grid);
        let first = cache.get_or_compute(&grid, TileCoord::new(0, 2)).expect("route");
        let second = cache.get_or_compute(&grid, TileCoord::new(0, 2)).expect("route");
        assert_eq!(first, second);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn returned_paths_do_not_alias_the_cache() {
        let grid = Grid::new(6, 1).expect("grid");
        let mut cache = corridor_cache(&grid);
        let mut first = cache.get_or_compute(&grid, TileCoord::new(0, 0)).expect("route");
        let untouched = first.remaining();
        while first.pop_waypoint().is_some() {}
        let second = cache.get_or_compute(&grid, TileCoord::new(0, 0)).expect("route");
        assert!(first.is_exhausted());
        assert_eq!(second.remaining(), untouched);
    }

    #[test]
    fn grid_mutation_discards_stale_routes() {
        let mut grid = Grid::new(5, 2).expect("grid");
        let mut cache = corridor_cache(&grid);
        let before = cache.get_or_compute(&grid, TileCoord::new(0, 0)).expect("route");
        assert_eq!(before.cost(), 4.0);

        grid.set_wall(TileCoord::new(2, 0)).expect("wall");
        let after = cache.get_or_compute(&grid, TileCoord::new(0, 0)).expect("route");
        assert!(after.cost() > before.cost());
        assert!(!after.tiles().contains(&TileCoord::new(2, 0)));
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn unreachable_origins_are_cached_as_empty() {
        let mut grid = Grid::new(3, 1).expect("grid");
        grid.set_wall(TileCoord::new(1, 0)).expect("wall");
        let mut cache = corridor_cache(&grid);
        assert!(cache
            .get_or_compute(&grid, TileCoord::new(0, 0))
            .expect("route")
            .is_exhausted());
        assert!(cache
            .get_or_compute(&grid, TileCoord::new(0, 0))
            .expect("route")
            .is_exhausted());
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn invalidate_clears_everything() {
        let grid = Grid::new(4, 1).expect("grid");
        let mut cache = corridor_cache(&grid);
        let _ = cache.get_or_compute(&grid, TileCoord::new(0, 0)).expect("route");
        cache.invalidate();
        assert!(cache.is_empty());
        let _ = cache.get_or_compute(&grid, TileCoord::new(0, 0)).expect("route");
        assert_eq!(cache.misses(), 2);
    }

    #[test]
    fn out_of_bounds_origin_is_reported() {
        let grid = Grid::new(4, 1).expect("grid");
        let mut cache = corridor_cache(&grid);
        assert!(cache.get_or_compute(&grid, TileCoord::new(9, 9)).is_err());
        assert_eq!(cache.exit(), TileCoord::new(3, 0));
        assert_eq!(cache.destination(), Vec2::new(35.0, 5.0));
    }
}
