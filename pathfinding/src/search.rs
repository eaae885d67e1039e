use towerline_core::TileCoord;

use crate::{Node, NodeArena, NodeCollection, NodeEntry, NodeHandle, PathError, PathGraph, Successor};

/// Tile of a reconstructed route with its accumulated cost.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteNode {
    tile: TileCoord,
    g: f64,
}

impl RouteNode {
    /// Creates a route node.
    #[must_use]
    pub const fn new(tile: TileCoord, g: f64) -> Self {
        Self { tile, g }
    }

    /// Tile visited by the route.
    #[must_use]
    pub const fn tile(&self) -> TileCoord {
        self.tile
    }

    /// Cost accumulated from the start up to this tile.
    #[must_use]
    pub const fn g(&self) -> f64 {
        self.g
    }
}

/// Ordered route from the start tile to the goal tile, both inclusive.
///
/// An empty route means the goal is unreachable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Route {
    nodes: Vec<RouteNode>,
}

impl Route {
    /// Wraps an ordered list of route nodes.
    #[must_use]
    pub fn from_nodes(nodes: Vec<RouteNode>) -> Self {
        Self { nodes }
    }

    /// Nodes from start to goal.
    #[must_use]
    pub fn nodes(&self) -> &[RouteNode] {
        &self.nodes
    }

    /// Tiles from start to goal.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.nodes.iter().map(RouteNode::tile)
    }

    /// Number of nodes, start and goal included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Reports whether the route is empty, i.e. the goal was unreachable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total edge cost of the route.
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.nodes.last().map_or(0.0, RouteNode::g)
    }
}

/// A* search over a [`PathGraph`].
///
/// The search keeps its open and closed sets and its node arena between
/// calls so repeated searches reuse their allocations.
pub struct AStar<G: PathGraph> {
    graph: G,
    open: G::Collection,
    closed: G::Collection,
    arena: NodeArena,
    successors: Vec<Successor>,
}

impl<G: PathGraph> AStar<G> {
    /// Creates a search over the provided graph.
    #[must_use]
    pub fn new(graph: G) -> Self {
        let open = graph.create_collection();
        let closed = graph.create_collection();
        Self {
            graph,
            open,
            closed,
            arena: NodeArena::new(),
            successors: Vec::new(),
        }
    }

    /// Graph being searched.
    #[must_use]
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Finds the cheapest route from `start` to `goal`.
    ///
    /// Returns an empty route when the goal cannot be reached. Without a goal
    /// the search degenerates to an exhaustive Dijkstra expansion and always
    /// returns an empty route; use [`AStar::reachable`] to read its result.
    pub fn search(
        &mut self,
        start: TileCoord,
        goal: Option<TileCoord>,
        ignore_corners: bool,
    ) -> Result<Route, PathError> {
        self.graph.test_bounds(start)?;
        if let Some(goal) = goal {
            self.graph.test_bounds(goal)?;
        }

        Ok(match self.run(start, goal, ignore_corners) {
            Some(handle) => self.reconstruct(handle),
            None => Route::default(),
        })
    }

    /// Every tile reachable from `start`, sorted by coordinate.
    pub fn reachable(&mut self, start: TileCoord, ignore_corners: bool) -> Result<Vec<TileCoord>, PathError> {
        self.graph.test_bounds(start)?;
        let _ = self.run(start, None, ignore_corners);
        let mut tiles = self.closed.tiles();
        tiles.sort_unstable();
        Ok(tiles)
    }

    fn run(&mut self, start: TileCoord, goal: Option<TileCoord>, ignore_corners: bool) -> Option<NodeHandle> {
        self.open.clear();
        self.closed.clear();
        self.arena.reset();

        let h = heuristic(start, goal);
        let root = self.arena.alloc(Node::new(start, 0.0, h, None));
        self.open.insert(NodeEntry::new(root, start, 0.0, h));

        while let Some(current) = self.open.pop_min_f() {
            if Some(current.tile()) == goal {
                return Some(current.handle());
            }
            self.closed.insert(current);

            let mut successors = std::mem::take(&mut self.successors);
            successors.clear();
            self.graph
                .successors(current.tile(), current.g(), ignore_corners, &mut successors);

            for successor in successors.iter().copied() {
                self.relax(current.handle(), successor, goal);
            }
            self.successors = successors;
        }

        None
    }

    fn relax(&mut self, parent: NodeHandle, successor: Successor, goal: Option<TileCoord>) {
        let known = self
            .open
            .find(successor.tile)
            .or_else(|| self.closed.find(successor.tile));
        if let Some(known) = known {
            if known.g() <= successor.g {
                return;
            }
            let _ = self.open.remove(successor.tile);
            let _ = self.closed.remove(successor.tile);
        }

        let h = heuristic(successor.tile, goal);
        let handle = self
            .arena
            .alloc(Node::new(successor.tile, successor.g, h, Some(parent)));
        self.open
            .insert(NodeEntry::new(handle, successor.tile, successor.g, successor.g + h));
    }

    fn reconstruct(&self, goal: NodeHandle) -> Route {
        let mut nodes = Vec::new();
        let mut cursor = Some(goal);
        while let Some(handle) = cursor {
            let Some(node) = self.arena.get(handle) else {
                break;
            };
            nodes.push(RouteNode::new(node.tile(), node.g()));
            cursor = node.parent();
        }
        nodes.reverse();
        Route::from_nodes(nodes)
    }
}

/// Euclidean distance to the goal; zero when searching without a goal.
fn heuristic(tile: TileCoord, goal: Option<TileCoord>) -> f64 {
    let Some(goal) = goal else {
        return 0.0;
    };
    let dx = f64::from(tile.x()) - f64::from(goal.x());
    let dy = f64::from(tile.y()) - f64::from(goal.y());
    dx.hypot(dy)
}
