#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid-based route finding for Towerline.
//!
//! The crate is layered leaves first: a [`Grid`] of tile costs, a
//! [`PathGraph`] adapter that generates successors, replaceable
//! [`NodeCollection`] strategies for the open and closed sets, the [`AStar`]
//! search over an arena of nodes, and the [`PathCache`] that memoises routes
//! from spawn tiles to the map exit.

mod cache;
mod collection;
mod error;
mod graph;
mod grid;
mod node;
mod path;
mod search;

pub use cache::PathCache;
pub use collection::{IndexedNodeCollection, LinearNodeCollection, NodeCollection, NodeEntry};
pub use error::PathError;
pub use graph::{GridGraph, PathGraph, Successor, DIAGONAL_STEP, ORTHOGONAL_STEP};
pub use grid::{Grid, WALL_COST};
pub use node::{Node, NodeArena, NodeHandle};
pub use path::{tile_at, tile_center, Path};
pub use search::{AStar, Route, RouteNode};
