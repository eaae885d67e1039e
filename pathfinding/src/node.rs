use towerline_core::TileCoord;

/// Generation-checked reference to a node stored in a [`NodeArena`].
///
/// Handles stay valid only for the arena generation that issued them; a
/// handle kept across [`NodeArena::reset`] resolves to `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index: u32,
    generation: u32,
}

impl NodeHandle {
    /// Position of the node inside the arena.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Arena generation that issued the handle.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Search-time record of a tile, its costs and its predecessor.
///
/// Equality only looks at the tile: a cheaper node for the same tile is the
/// same logical position and replaces the costlier one.
#[derive(Clone, Copy, Debug)]
pub struct Node {
    tile: TileCoord,
    g: f64,
    h: f64,
    parent: Option<NodeHandle>,
}

impl Node {
    /// Creates a node reached from `parent` with accumulated cost `g`.
    #[must_use]
    pub const fn new(tile: TileCoord, g: f64, h: f64, parent: Option<NodeHandle>) -> Self {
        Self { tile, g, h, parent }
    }

    /// Tile the node stands for.
    #[must_use]
    pub const fn tile(&self) -> TileCoord {
        self.tile
    }

    /// Accumulated cost from the search root.
    #[must_use]
    pub const fn g(&self) -> f64 {
        self.g
    }

    /// Heuristic estimate of the remaining cost.
    #[must_use]
    pub const fn h(&self) -> f64 {
        self.h
    }

    /// Total estimated cost through this node.
    #[must_use]
    pub fn f(&self) -> f64 {
        self.g + self.h
    }

    /// Predecessor on the best known route; `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.tile == other.tile
    }
}

impl Eq for Node {}

/// Per-search storage for nodes.
///
/// Nodes are only ever appended during a search and discarded wholesale by
/// [`NodeArena::reset`], so predecessor handles can never dangle or form a
/// cycle.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    generation: u32,
}

impl NodeArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards every node and invalidates all outstanding handles.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Stores a node and returns its handle.
    pub fn alloc(&mut self, node: Node) -> NodeHandle {
        let index = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        self.nodes.push(node);
        NodeHandle {
            index,
            generation: self.generation,
        }
    }

    /// Resolves a handle issued by the current generation.
    #[must_use]
    pub fn get(&self, handle: NodeHandle) -> Option<&Node> {
        if handle.generation != self.generation {
            return None;
        }
        let index = usize::try_from(handle.index).ok()?;
        self.nodes.get(index)
    }

    /// Number of nodes allocated in the current generation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Reports whether the current generation holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_compare_by_tile_only() {
        let tile = TileCoord::new(2, 3);
        let cheap = Node::new(tile, 1.0, 4.0, None);
        let costly = Node::new(tile, 9.0, 4.0, None);
        assert_eq!(cheap, costly);
        assert_ne!(cheap, Node::new(TileCoord::new(3, 3), 1.0, 4.0, None));
    }

    #[test]
    fn handles_from_previous_generations_do_not_resolve() {
        let mut arena = NodeArena::new();
        let handle = arena.alloc(Node::new(TileCoord::new(0, 0), 0.0, 0.0, None));
        assert_eq!(arena.get(handle).map(Node::tile), Some(TileCoord::new(0, 0)));

        arena.reset();
        assert!(arena.is_empty());
        assert!(arena.get(handle).is_none());

        let fresh = arena.alloc(Node::new(TileCoord::new(5, 5), 0.0, 0.0, None));
        assert_eq!(fresh.index(), handle.index());
        assert_ne!(fresh.generation(), handle.generation());
        assert!(arena.get(handle).is_none());
    }

    #[test]
    fn f_is_the_sum_of_costs() {
        let node = Node::new(TileCoord::new(0, 0), 1.5, 2.25, None);
        assert!((node.f() - 3.75).abs() < f64::EPSILON);
        assert_eq!(node.h(), 2.25);
    }
}
