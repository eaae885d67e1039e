#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Towerline adapters.
//!
//! Adapters snapshot the world into a [`Scene`] after every logic update and
//! hand it to a [`Presenter`]. Pieces only carry [`ImageHandle`]s; the
//! [`AssetCatalog`] resolves names to handles.

mod assets;

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::time::Duration;
use thiserror::Error;
use towerline_core::{
    EntityId, Event, ImageHandle, PlacementError, SaleError, TileCoord, TowerKind, UpgradeError,
};

pub use assets::AssetCatalog;

/// Describes the tile grid and its entry lane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single tile in pixels.
    pub tile_length: f32,
    /// First row of the entry and exit lanes.
    pub lane_top: u32,
    /// Number of rows spanned by the lanes.
    pub lane_rows: u32,
}

impl TileGridPresentation {
    /// Creates a grid descriptor, rejecting tiles without a positive size.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_length: f32,
        lane_top: u32,
        lane_rows: u32,
    ) -> Result<Self, RenderingError> {
        if !(tile_length.is_finite() && tile_length > 0.0) {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }
        Ok(Self {
            columns,
            rows,
            tile_length,
            lane_top,
            lane_rows,
        })
    }
}

/// Draw order bucket of a sprite; lower layers are drawn first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Border walls.
    Walls,
    /// Shooting and support towers.
    Towers,
    /// Walking monsters.
    Monsters,
    /// Projectiles in flight.
    Projectiles,
}

/// Single image placed in the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    /// Piece the sprite belongs to.
    pub id: EntityId,
    /// Draw order bucket.
    pub layer: Layer,
    /// Centre of the sprite in pixels.
    pub position: Vec2,
    /// Unit direction the sprite should be rotated towards, if any.
    pub facing: Option<Vec2>,
    /// Image to draw.
    pub image: ImageHandle,
}

/// Health indicator drawn above a monster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthBar {
    /// Monster the bar belongs to.
    pub monster: EntityId,
    /// Centre of the monster in pixels.
    pub position: Vec2,
    /// Remaining health as a fraction of the maximum, within `0.0..=1.0`.
    pub fraction: f32,
}

impl HealthBar {
    /// Creates a bar from raw health values.
    #[must_use]
    pub fn new(monster: EntityId, position: Vec2, health: i64, max_health: u32) -> Self {
        let fraction = if max_health == 0 {
            0.0
        } else {
            (health as f32 / max_health as f32).clamp(0.0, 1.0)
        };
        Self {
            monster,
            position,
            fraction,
        }
    }
}

/// Line from a tower to the monster it is currently tracking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTargetLine {
    /// Tower that holds the target.
    pub tower: EntityId,
    /// Monster being tracked.
    pub target: EntityId,
    /// Tower centre in pixels.
    pub from: Vec2,
    /// Monster centre in pixels.
    pub to: Vec2,
}

/// Player state shown next to the map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hud {
    /// Gold available for building.
    pub gold: u32,
    /// Lives left before the game ends.
    pub lives: u32,
    /// Level of the active wave, if one started.
    pub wave_level: Option<u32>,
    /// Indicates whether the active wave spawns bosses.
    pub boss_wave: bool,
    /// Logic ticks processed so far.
    pub tick: u64,
    /// Indicates whether the game ended.
    pub game_over: bool,
}

/// Statistics panel of the selected tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionPanel {
    /// Selected tower.
    pub tower: EntityId,
    /// Current tier.
    pub kind: TowerKind,
    /// Tile the tower occupies.
    pub tile: TileCoord,
    /// Effective range in pixels.
    pub range: f32,
    /// Effective damage per hit.
    pub damage: u32,
    /// Effective cooldown between shots.
    pub fire_rate: Duration,
    /// Tier reached by the next upgrade, if any.
    pub upgrade: Option<TowerKind>,
}

/// Feedback surfaced to adapters about the most recent rejected tower action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TowerInteractionFeedback {
    /// Reports that a placement request was rejected by the world.
    PlacementRejected {
        /// Kind of tower requested for placement.
        kind: TowerKind,
        /// Tile provided in the placement request.
        tile: TileCoord,
        /// Reason the placement failed.
        reason: PlacementError,
    },
    /// Reports that a sale request was rejected by the world.
    SaleRejected {
        /// Identifier of the tower targeted for sale.
        tower: EntityId,
        /// Reason the sale failed.
        reason: SaleError,
    },
    /// Reports that an upgrade request was rejected by the world.
    UpgradeRejected {
        /// Identifier of the tower targeted for the upgrade.
        tower: EntityId,
        /// Reason the upgrade failed.
        reason: UpgradeError,
    },
}

impl TowerInteractionFeedback {
    /// Last rejection reported in `events`, if any.
    #[must_use]
    pub fn latest(events: &[Event]) -> Option<Self> {
        events.iter().rev().find_map(|event| match *event {
            Event::TowerPlacementRejected { kind, tile, reason } => {
                Some(Self::PlacementRejected { kind, tile, reason })
            }
            Event::TowerSaleRejected { tower, reason } => Some(Self::SaleRejected { tower, reason }),
            Event::TowerUpgradeRejected { tower, reason } => {
                Some(Self::UpgradeRejected { tower, reason })
            }
            _ => None,
        })
    }
}

/// Scene description combining the tile grid, its inhabitants and the HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile grid that composes the play area.
    pub tile_grid: TileGridPresentation,
    /// Images to draw, ordered by layer and then by piece identifier.
    pub sprites: Vec<Sprite>,
    /// Health bars of live monsters.
    pub health_bars: Vec<HealthBar>,
    /// Targeting lines of towers tracking a monster.
    pub tower_targets: Vec<TowerTargetLine>,
    /// Player state.
    pub hud: Hud,
    /// Statistics of the selected tower.
    pub selection: Option<SelectionPanel>,
    /// Feedback about the last rejected tower action.
    pub tower_feedback: Option<TowerInteractionFeedback>,
}

impl Scene {
    /// Creates an empty scene over the provided grid.
    #[must_use]
    pub fn new(tile_grid: TileGridPresentation, hud: Hud) -> Self {
        Self {
            tile_grid,
            sprites: Vec::new(),
            health_bars: Vec::new(),
            tower_targets: Vec::new(),
            hud,
            selection: None,
            tower_feedback: None,
        }
    }

    /// Adds a sprite keeping the draw order.
    pub fn push_sprite(&mut self, sprite: Sprite) {
        let key = (sprite.layer, sprite.id);
        let index = self
            .sprites
            .partition_point(|held| (held.layer, held.id) <= key);
        self.sprites.insert(index, sprite);
    }

    /// Number of sprites on a layer.
    #[must_use]
    pub fn count(&self, layer: Layer) -> usize {
        self.sprites.iter().filter(|sprite| sprite.layer == layer).count()
    }
}

/// Consumer of finished scenes, one per rendered frame.
pub trait Presenter {
    /// Presents a frame built from the post-tick world state.
    fn present_frame(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum RenderingError {
    /// Tiles must have a positive, finite side length.
    #[error("tile_length must be positive and finite (received {tile_length})")]
    InvalidTileLength {
        /// Provided length that failed validation.
        tile_length: f32,
    },
}
