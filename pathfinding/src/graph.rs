use std::marker::PhantomData;

use towerline_core::TileCoord;

use crate::{Grid, IndexedNodeCollection, NodeCollection, PathError, WALL_COST};

/// Step length between orthogonal neighbours.
pub const ORTHOGONAL_STEP: f64 = 1.0;
/// Step length between diagonal neighbours.
pub const DIAGONAL_STEP: f64 = std::f64::consts::SQRT_2;

const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
const DIAGONAL: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

/// Walkable neighbour produced by successor generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Successor {
    /// Neighbouring tile.
    pub tile: TileCoord,
    /// Tentative cost from the search root through the expanded tile.
    pub g: f64,
}

/// Graph abstraction consumed by [`crate::AStar`].
pub trait PathGraph {
    /// Strategy used for the open and closed sets.
    type Collection: NodeCollection;

    /// Pushes every walkable neighbour of `tile` into `out`.
    ///
    /// `g` is the accumulated cost of `tile`; each successor carries
    /// `g + edge_cost`. With `ignore_corners` only the four orthogonal
    /// neighbours are considered.
    fn successors(&self, tile: TileCoord, g: f64, ignore_corners: bool, out: &mut Vec<Successor>);

    /// Rejects coordinates outside the graph.
    fn test_bounds(&self, tile: TileCoord) -> Result<(), PathError>;

    /// Creates an empty node collection.
    fn create_collection(&self) -> Self::Collection;
}

/// [`PathGraph`] over a borrowed [`Grid`], generic over the collection strategy.
#[derive(Debug)]
pub struct GridGraph<'g, C = IndexedNodeCollection> {
    grid: &'g Grid,
    strategy: PhantomData<fn() -> C>,
}

impl<'g, C> GridGraph<'g, C> {
    /// Adapts the grid for searching.
    #[must_use]
    pub const fn new(grid: &'g Grid) -> Self {
        Self {
            grid,
            strategy: PhantomData,
        }
    }

    /// Grid the graph reads from.
    #[must_use]
    pub const fn grid(&self) -> &'g Grid {
        self.grid
    }

    fn push_neighbour(
        &self,
        from_cost: i32,
        neighbour: TileCoord,
        step: f64,
        g: f64,
        out: &mut Vec<Successor>,
    ) {
        let Some(cost) = self.grid.cost(neighbour) else {
            return;
        };
        if cost == WALL_COST {
            return;
        }

        let climb = f64::from(cost.abs_diff(from_cost));
        out.push(Successor {
            tile: neighbour,
            g: g + climb + step,
        });
    }
}

impl<C: NodeCollection + Default> PathGraph for GridGraph<'_, C> {
    type Collection = C;

    fn successors(&self, tile: TileCoord, g: f64, ignore_corners: bool, out: &mut Vec<Successor>) {
        let Some(from_cost) = self.grid.cost(tile) else {
            return;
        };

        for (dx, dy) in ORTHOGONAL {
            self.push_neighbour(from_cost, tile.offset(dx, dy), ORTHOGONAL_STEP, g, out);
        }

        if ignore_corners {
            return;
        }

        for (dx, dy) in DIAGONAL {
            self.push_neighbour(from_cost, tile.offset(dx, dy), DIAGONAL_STEP, g, out);
        }
    }

    fn test_bounds(&self, tile: TileCoord) -> Result<(), PathError> {
        self.grid.check_bounds(tile)
    }

    fn create_collection(&self) -> C {
        C::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LinearNodeCollection;

    fn successor_tiles(graph: &GridGraph<'_>, tile: TileCoord, ignore_corners: bool) -> Vec<Successor> {
        let mut out = Vec::new();
        graph.successors(tile, 0.0, ignore_corners, &mut out);
        out
    }

    #[test]
    fn orthogonal_mode_yields_four_neighbours() {
        let grid = Grid::new(3, 3).expect("grid");
        let graph: GridGraph<'_> = GridGraph::new(&grid);
        let successors = successor_tiles(&graph, TileCoord::new(1, 1), true);
        assert_eq!(successors.len(), 4);
        assert!(successors.iter().all(|successor| successor.g == ORTHOGONAL_STEP));
    }

    #[test]
    fn diagonal_mode_yields_eight_neighbours() {
        let grid = Grid::new(3, 3).expect("grid");
        let graph: GridGraph<'_> = GridGraph::new(&grid);
        let successors = successor_tiles(&graph, TileCoord::new(1, 1), false);
        assert_eq!(successors.len(), 8);
        let diagonal = successors
            .iter()
            .find(|successor| successor.tile == TileCoord::new(2, 2))
            .expect("diagonal neighbour");
        assert_eq!(diagonal.g, DIAGONAL_STEP);
    }

    #[test]
    fn corners_and_walls_are_excluded() {
        let mut grid = Grid::new(3, 3).expect("grid");
        grid.set_wall(TileCoord::new(1, 0)).expect("wall");
        let graph: GridGraph<'_> = GridGraph::new(&grid);
        let successors = successor_tiles(&graph, TileCoord::new(0, 0), false);
        let tiles: Vec<TileCoord> = successors.iter().map(|successor| successor.tile).collect();
        assert_eq!(tiles, vec![TileCoord::new(0, 1), TileCoord::new(1, 1)]);
    }

    #[test]
    fn height_difference_adds_to_edge_cost() {
        let mut grid = Grid::new(2, 1).expect("grid");
        grid.set_cost(TileCoord::new(1, 0), 3).expect("height");
        let graph: GridGraph<'_> = GridGraph::new(&grid);
        let mut out = Vec::new();
        graph.successors(TileCoord::new(0, 0), 2.0, true, &mut out);
        assert_eq!(
            out,
            vec![Successor {
                tile: TileCoord::new(1, 0),
                g: 6.0
            }]
        );
    }

    #[test]
    fn bounds_test_rejects_outside_tiles() {
        let grid = Grid::new(2, 2).expect("grid");
        let graph: GridGraph<'_, LinearNodeCollection> = GridGraph::new(&grid);
        assert!(graph.test_bounds(TileCoord::new(1, 1)).is_ok());
        assert!(graph.test_bounds(TileCoord::new(2, 1)).is_err());
        assert!(graph.create_collection().is_empty());
    }
}
