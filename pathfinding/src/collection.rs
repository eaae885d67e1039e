use std::{cmp::Ordering, collections::HashMap};

use towerline_core::TileCoord;

use crate::NodeHandle;

/// Snapshot of a node as held by the open and closed sets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeEntry {
    handle: NodeHandle,
    tile: TileCoord,
    g: f64,
    f: f64,
}

impl NodeEntry {
    /// Creates an entry for the node behind `handle`.
    #[must_use]
    pub const fn new(handle: NodeHandle, tile: TileCoord, g: f64, f: f64) -> Self {
        Self { handle, tile, g, f }
    }

    /// Arena handle of the node.
    #[must_use]
    pub const fn handle(&self) -> NodeHandle {
        self.handle
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

    /// Total estimated cost through the node.
    #[must_use]
    pub const fn f(&self) -> f64 {
        self.f
    }

    /// Orders entries by `f`, falling back to the tile so extraction is
    /// reproducible regardless of container iteration order.
    fn precedes(&self, other: &Self) -> bool {
        match self.f.total_cmp(&other.f) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.tile < other.tile,
        }
    }
}

/// Replaceable storage strategy for the A* open and closed sets.
///
/// A collection holds at most one entry per tile.
pub trait NodeCollection {
    /// Removes every entry.
    fn clear(&mut self);

    /// Stores an entry, replacing any entry for the same tile.
    fn insert(&mut self, entry: NodeEntry);

    /// Removes and returns the entry with the smallest `f`.
    fn pop_min_f(&mut self) -> Option<NodeEntry>;

    /// Returns the entry held for `tile`.
    fn find(&self, tile: TileCoord) -> Option<NodeEntry>;

    /// Removes and returns the entry held for `tile`.
    fn remove(&mut self, tile: TileCoord) -> Option<NodeEntry>;

    /// Number of entries held.
    fn len(&self) -> usize;

    /// Tiles of every entry held, in unspecified order.
    fn tiles(&self) -> Vec<TileCoord>;

    /// Reports whether an entry is held for `tile`.
    fn contains(&self, tile: TileCoord) -> bool {
        self.find(tile).is_some()
    }

    /// Reports whether the collection holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Vector-backed collection with linear membership and extraction.
#[derive(Clone, Debug, Default)]
pub struct LinearNodeCollection {
    entries: Vec<NodeEntry>,
}

impl LinearNodeCollection {
    fn position(&self, tile: TileCoord) -> Option<usize> {
        self.entries.iter().position(|entry| entry.tile == tile)
    }
}

impl NodeCollection for LinearNodeCollection {
    fn clear(&mut self) {
        self.entries.clear();
    }

    fn insert(&mut self, entry: NodeEntry) {
        match self.position(entry.tile) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
    }

    fn pop_min_f(&mut self) -> Option<NodeEntry> {
        let mut best: Option<usize> = None;
        for (index, entry) in self.entries.iter().enumerate() {
            let better = match best {
                None => true,
                Some(current) => entry.precedes(&self.entries[current]),
            };
            if better {
                best = Some(index);
            }
        }
        best.map(|index| self.entries.swap_remove(index))
    }

    fn find(&self, tile: TileCoord) -> Option<NodeEntry> {
        self.entries.iter().find(|entry| entry.tile == tile).copied()
    }

    fn remove(&mut self, tile: TileCoord) -> Option<NodeEntry> {
        self.position(tile)
            .map(|index| self.entries.swap_remove(index))
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn tiles(&self) -> Vec<TileCoord> {
        self.entries.iter().map(NodeEntry::tile).collect()
    }
}

/// Hash-indexed collection with constant-time membership and removal.
///
/// Extraction still scans every entry, so it shares the asymptotic cost of
/// [`LinearNodeCollection::pop_min_f`] while avoiding the linear finds that
/// dominate relaxation on large maps.
#[derive(Clone, Debug, Default)]
pub struct IndexedNodeCollection {
    entries: HashMap<TileCoord, NodeEntry>,
}

impl NodeCollection for IndexedNodeCollection {
    fn clear(&mut self) {
        self.entries.clear();
    }

    fn insert(&mut self, entry: NodeEntry) {
        let _ = self.entries.insert(entry.tile, entry);
    }

    fn pop_min_f(&mut self) -> Option<NodeEntry> {
        let mut best: Option<NodeEntry> = None;
        for entry in self.entries.values() {
            if best.map_or(true, |current| entry.precedes(&current)) {
                best = Some(*entry);
            }
        }
        let tile = best?.tile;
        self.entries.remove(&tile)
    }

    fn find(&self, tile: TileCoord) -> Option<NodeEntry> {
        self.entries.get(&tile).copied()
    }

    fn remove(&mut self, tile: TileCoord) -> Option<NodeEntry> {
        self.entries.remove(&tile)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn tiles(&self) -> Vec<TileCoord> {
        self.entries.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Node, NodeArena};

    fn entry(arena: &mut NodeArena, x: i32, y: i32, g: f64, f: f64) -> NodeEntry {
        let tile = TileCoord::new(x, y);
        let handle = arena.alloc(Node::new(tile, g, f - g, None));
        NodeEntry::new(handle, tile, g, f)
    }

    fn extracts_in_f_order<C: NodeCollection + Default>() {
        let mut arena = NodeArena::new();
        let mut collection = C::default();
        collection.insert(entry(&mut arena, 0, 0, 0.0, 5.0));
        collection.insert(entry(&mut arena, 1, 0, 1.0, 2.0));
        collection.insert(entry(&mut arena, 2, 0, 2.0, 9.0));
        assert_eq!(collection.len(), 3);

        let order: Vec<TileCoord> = std::iter::from_fn(|| collection.pop_min_f())
            .map(|entry| entry.tile())
            .collect();
        assert_eq!(
            order,
            vec![
                TileCoord::new(1, 0),
                TileCoord::new(0, 0),
                TileCoord::new(2, 0)
            ]
        );
        assert!(collection.is_empty());
    }

    fn replaces_entries_for_the_same_tile<C: NodeCollection + Default>() {
        let mut arena = NodeArena::new();
        let mut collection = C::default();
        collection.insert(entry(&mut arena, 3, 3, 7.0, 8.0));
        collection.insert(entry(&mut arena, 3, 3, 2.0, 3.0));
        assert_eq!(collection.len(), 1);
        assert_eq!(
            collection.find(TileCoord::new(3, 3)).map(|entry| entry.g()),
            Some(2.0)
        );
    }

    fn removes_by_tile<C: NodeCollection + Default>() {
        let mut arena = NodeArena::new();
        let mut collection = C::default();
        collection.insert(entry(&mut arena, 0, 1, 1.0, 1.0));
        collection.insert(entry(&mut arena, 4, 4, 1.0, 1.0));
        assert!(collection.contains(TileCoord::new(4, 4)));
        assert!(collection.remove(TileCoord::new(4, 4)).is_some());
        assert!(!collection.contains(TileCoord::new(4, 4)));
        assert!(collection.remove(TileCoord::new(4, 4)).is_none());
        assert_eq!(collection.tiles(), vec![TileCoord::new(0, 1)]);
        collection.clear();
        assert!(collection.is_empty());
    }

    fn breaks_f_ties_by_tile<C: NodeCollection + Default>() {
        let mut arena = NodeArena::new();
        let mut collection = C::default();
        collection.insert(entry(&mut arena, 5, 0, 1.0, 4.0));
        collection.insert(entry(&mut arena, 1, 2, 3.0, 4.0));
        collection.insert(entry(&mut arena, 2, 0, 2.0, 4.0));
        assert_eq!(
            collection.pop_min_f().map(|entry| entry.tile()),
            Some(TileCoord::new(1, 2))
        );
    }

    #[test]
    fn linear_collection_extracts_in_f_order() {
        extracts_in_f_order::<LinearNodeCollection>();
    }

    #[test]
    fn indexed_collection_extracts_in_f_order() {
        extracts_in_f_order::<IndexedNodeCollection>();
    }

    #[test]
    fn linear_collection_replaces_entries_for_the_same_tile() {
        replaces_entries_for_the_same_tile::<LinearNodeCollection>();
    }

    #[test]
    fn indexed_collection_replaces_entries_for_the_same_tile() {
        replaces_entries_for_the_same_tile::<IndexedNodeCollection>();
    }

    #[test]
    fn linear_collection_removes_by_tile() {
        removes_by_tile::<LinearNodeCollection>();
    }

    #[test]
    fn indexed_collection_removes_by_tile() {
        removes_by_tile::<IndexedNodeCollection>();
    }

    #[test]
    fn both_collections_break_ties_identically() {
        breaks_f_ties_by_tile::<LinearNodeCollection>();
        breaks_f_ties_by_tile::<IndexedNodeCollection>();
    }
}
