#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Towerline simulation.
//!
//! The world owns the tile grid, the shared path cache, the live piece
//! population and the player's purse. It is mutated exclusively through
//! [`apply`] with a [`Command`] and reports what happened as [`Event`]
//! values; read access goes through the [`query`] module.

mod actions;
mod effects;
mod layout;
mod pieces;
mod player;
mod population;
mod templates;
mod tick;
mod vision;

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use towerline_core::{AssetProvider, Command, EntityId, Event};
use towerline_pathfinding::{tile_center, Grid, PathCache, PathError};
use tracing::info;

pub use layout::MapLayout;
pub use pieces::{BehaviorError, MonsterView, PieceKind, PieceView, TowerView};
pub use player::Player;
pub use templates::{MonsterTemplate, TowerTemplate, MISC_IMAGES, MONSTER_ANIMATIONS, TOWER_IMAGES};
pub use vision::{Sight, VisionCone};

use pieces::{EntityIds, Piece, Wall};
use population::Population;
use templates::TemplateBook;

const DEFAULT_COLUMNS: u32 = 40;
const DEFAULT_ROWS: u32 = 30;
const DEFAULT_TILE_SIZE: f32 = 20.0;
const DEFAULT_LANE_TOP: u32 = 15;
const DEFAULT_LANE_ROWS: u32 = 5;
const DEFAULT_GOLD: u32 = 200;
const DEFAULT_LIVES: u32 = 20;

/// Errors raised while building a world.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The configuration describes a map that cannot be played.
    #[error("invalid world configuration: {0}")]
    InvalidConfiguration(String),
    /// The tile grid rejected the configured dimensions or a border tile.
    #[error(transparent)]
    Grid(#[from] PathError),
}

/// Parameters the world is built from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig {
    columns: u32,
    rows: u32,
    tile_size: f32,
    lane_top: u32,
    lane_rows: u32,
    gold: u32,
    lives: u32,
    corner_cutting: bool,
}

impl WorldConfig {
    /// Default 40 x 30 map of 20 pixel tiles with a five row lane.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            tile_size: DEFAULT_TILE_SIZE,
            lane_top: DEFAULT_LANE_TOP,
            lane_rows: DEFAULT_LANE_ROWS,
            gold: DEFAULT_GOLD,
            lives: DEFAULT_LIVES,
            corner_cutting: false,
        }
    }

    /// Overrides the map dimensions.
    #[must_use]
    pub const fn with_grid(mut self, columns: u32, rows: u32, tile_size: f32) -> Self {
        self.columns = columns;
        self.rows = rows;
        self.tile_size = tile_size;
        self
    }

    /// Overrides the first row and the height of the entry and exit lanes.
    #[must_use]
    pub const fn with_lane(mut self, top: u32, rows: u32) -> Self {
        self.lane_top = top;
        self.lane_rows = rows;
        self
    }

    /// Overrides the starting gold and lives.
    #[must_use]
    pub const fn with_purse(mut self, gold: u32, lives: u32) -> Self {
        self.gold = gold;
        self.lives = lives;
        self
    }

    /// Lets monster routes take diagonal steps.
    #[must_use]
    pub const fn with_corner_cutting(mut self, allowed: bool) -> Self {
        self.corner_cutting = allowed;
        self
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

    /// First lane row.
    #[must_use]
    pub const fn lane_top(&self) -> u32 {
        self.lane_top
    }

    /// Number of lane rows.
    #[must_use]
    pub const fn lane_rows(&self) -> u32 {
        self.lane_rows
    }

    /// Starting gold.
    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    /// Starting lives.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Whether routes may step diagonally.
    #[must_use]
    pub const fn corner_cutting(&self) -> bool {
        self.corner_cutting
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Wave currently announced to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveInfo {
    /// Difficulty level of the wave.
    pub level: u32,
    /// Indicates whether the wave spawns bosses.
    pub boss: bool,
}

/// Represents the authoritative Towerline world state.
pub struct World {
    config: WorldConfig,
    layout: MapLayout,
    grid: Grid,
    paths: PathCache,
    population: Population,
    player: Player,
    assets: Arc<dyn AssetProvider>,
    templates: TemplateBook,
    ids: EntityIds,
    selected: Option<EntityId>,
    wave: Option<WaveInfo>,
    now: Duration,
    tick_index: u64,
    game_over: bool,
}

impl World {
    /// Builds the map described by `config`, framing it with wall pieces.
    pub fn new(config: WorldConfig, assets: Arc<dyn AssetProvider>) -> Result<Self, WorldError> {
        let layout = MapLayout::new(&config)?;
        let mut grid = Grid::new(layout.columns(), layout.rows())?;
        let paths = PathCache::new(layout.exit(), layout.destination(), layout.tile_size())
            .with_corner_cutting(config.corner_cutting());
        let templates = TemplateBook::new(assets.as_ref());

        let mut ids = EntityIds::default();
        let mut population = Population::default();
        for tile in layout.border_tiles() {
            grid.set_wall(tile)?;
            let position = tile_center(tile, layout.tile_size());
            population.insert(Piece::Wall(Wall::new(
                ids.allocate(),
                tile,
                position,
                templates.wall_image(),
            )));
        }

        info!(
            columns = layout.columns(),
            rows = layout.rows(),
            walls = population.len(),
            gold = config.gold(),
            lives = config.lives(),
            "world_created"
        );

        Ok(Self {
            config,
            layout,
            grid,
            paths,
            population,
            player: Player::new(config.gold(), config.lives()),
            assets,
            templates,
            ids,
            selected: None,
            wave: None,
            now: Duration::ZERO,
            tick_index: 0,
            game_over: false,
        })
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::AnnounceWave { level, boss } => {
            world.wave = Some(WaveInfo { level, boss });
            info!(level, boss, "wave_started");
            out_events.push(Event::WaveStarted { level, boss });
        }
        Command::SpawnMonster {
            kind,
            level,
            boss,
            position,
        } => world.spawn_monster(kind, level, boss, position, out_events),
        Command::PlaceTower { kind, tile } => world.place_tower(kind, tile, out_events),
        Command::SelectTower { tile } => world.select_tower(tile, out_events),
        Command::SellTower { tower } => world.sell_tower(tower, out_events),
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
    }
}

/// Query functions that provide read-only views into the world state.
pub mod query {
    use std::time::Duration;

    use towerline_core::{Economy, EntityId, TileCoord};
    use towerline_pathfinding::{Grid, PathCache};

    use super::{MapLayout, MonsterView, PieceView, Player, TowerView, WaveInfo, World, WorldConfig};
    use crate::pieces::{Behavior, Piece};

    /// Configuration the world was built from.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Static map geometry.
    #[must_use]
    pub fn layout(world: &World) -> &MapLayout {
        &world.layout
    }

    /// Tile costs including walls and towers.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Shared route cache, exposed for its statistics.
    #[must_use]
    pub fn path_cache(world: &World) -> &PathCache {
        &world.paths
    }

    /// The player's purse.
    #[must_use]
    pub fn player(world: &World) -> &Player {
        &world.player
    }

    /// Simulated time elapsed since the world was created.
    #[must_use]
    pub fn now(world: &World) -> Duration {
        world.now
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Wave most recently announced.
    #[must_use]
    pub fn wave(world: &World) -> Option<WaveInfo> {
        world.wave
    }

    /// Reports whether the player ran out of lives.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.player.is_game_over()
    }

    /// Tower currently selected by the player.
    #[must_use]
    pub fn selected(world: &World) -> Option<EntityId> {
        world.selected
    }

    /// Live tower standing on a tile.
    #[must_use]
    pub fn tower_at(world: &World, tile: TileCoord) -> Option<EntityId> {
        world.population.tower_at(tile)
    }

    /// Snapshot of every piece in identifier order.
    #[must_use]
    pub fn pieces(world: &World) -> Vec<PieceView> {
        world.population.iter().map(Piece::view).collect()
    }

    /// Snapshot of every monster in identifier order.
    #[must_use]
    pub fn monsters(world: &World) -> Vec<MonsterView> {
        world
            .population
            .iter()
            .filter_map(Piece::as_monster)
            .map(|monster| monster.view())
            .collect()
    }

    /// Number of monsters still walking.
    #[must_use]
    pub fn live_monster_count(world: &World) -> usize {
        world
            .population
            .iter()
            .filter(|piece| piece.is_alive())
            .filter(|piece| piece.as_monster().is_some())
            .count()
    }

    /// Snapshot of every shooting and support tower in identifier order.
    #[must_use]
    pub fn towers(world: &World) -> Vec<TowerView> {
        world
            .population
            .iter()
            .filter_map(|piece| match piece {
                Piece::Tower(tower) => Some(tower.view()),
                Piece::Buff(buff) => Some(buff.view()),
                _ => None,
            })
            .collect()
    }

    /// Pieces the viewer currently sees, nearest first; empty when the viewer
    /// does not exist or does not look around.
    #[must_use]
    pub fn vision(world: &World, viewer: EntityId) -> Vec<EntityId> {
        let Some(sight) = world.population.get(viewer).and_then(Behavior::vision) else {
            return Vec::new();
        };
        world
            .population
            .visible(&sight)
            .into_iter()
            .filter(|id| *id != viewer)
            .collect()
    }
}
