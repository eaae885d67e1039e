//! Closed set of pieces living on the map and the per-tick behaviour they
//! share.

mod monster;
mod projectile;
mod tower;

use std::time::Duration;

use glam::Vec2;
use thiserror::Error;
use towerline_core::{
    AssetProvider, Economy, EntityId, Event, ImageHandle, ModifierKind, MonsterKind, TileCoord,
    TowerKind, TowerModifier,
};

use crate::{population::Population, templates::TemplateBook, vision::Sight};

pub(crate) use monster::{Monster, Settlement};
pub(crate) use projectile::{Payload, Projectile};
pub(crate) use tower::{BuffTower, Tower};

/// Failure raised by a single piece while it acts.
///
/// Faults are contained: the world logs them, reports
/// [`Event::EntityFaulted`] and removes the piece while the rest of the tick
/// carries on.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BehaviorError {
    /// Movement produced a position that is not a finite number.
    #[error("{piece} left the plane at {position}")]
    NonFinitePosition {
        /// Kind of piece that moved.
        piece: &'static str,
        /// Offending position.
        position: Vec2,
    },
    /// A homing projectile was aimed at something that is not a monster.
    #[error("target {target:?} is not a monster")]
    TargetNotMonster {
        /// Identifier the projectile homes in on.
        target: EntityId,
    },
}

/// Hands out entity identifiers in strictly increasing order.
#[derive(Debug, Default)]
pub(crate) struct EntityIds {
    next: u32,
}

impl EntityIds {
    pub(crate) fn allocate(&mut self) -> EntityId {
        let id = EntityId::new(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Everything a piece may read or touch while it acts.
///
/// The acting piece is taken out of the population for the duration of its
/// turn, so `population` never contains it.
pub(crate) struct TickContext<'a> {
    pub(crate) now: Duration,
    pub(crate) tick: u64,
    pub(crate) bounds: Vec2,
    pub(crate) population: &'a mut Population,
    pub(crate) economy: &'a mut dyn Economy,
    pub(crate) assets: &'a dyn AssetProvider,
    pub(crate) templates: &'a TemplateBook,
    pub(crate) ids: &'a mut EntityIds,
    pub(crate) spawned: &'a mut Vec<Piece>,
    pub(crate) events: &'a mut Vec<Event>,
}

/// Capability shared by every piece.
pub(crate) trait Behavior {
    /// Performs the piece's work for one tick.
    fn advance(&mut self, ctx: &mut TickContext<'_>) -> Result<(), BehaviorError>;

    /// Dead pieces skip their turn and are removed by the reap pass.
    fn is_alive(&self) -> bool;

    /// Area the piece is looking at, if it looks at all.
    fn vision(&self) -> Option<Sight>;
}

pub(crate) fn ensure_finite(piece: &'static str, position: Vec2) -> Result<(), BehaviorError> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(BehaviorError::NonFinitePosition { piece, position })
    }
}

/// Static wall segment of the border frame.
#[derive(Clone, Debug)]
pub(crate) struct Wall {
    id: EntityId,
    tile: TileCoord,
    position: Vec2,
    image: ImageHandle,
}

impl Wall {
    pub(crate) const fn new(id: EntityId, tile: TileCoord, position: Vec2, image: ImageHandle) -> Self {
        Self {
            id,
            tile,
            position,
            image,
        }
    }
}

impl Behavior for Wall {
    fn advance(&mut self, _ctx: &mut TickContext<'_>) -> Result<(), BehaviorError> {
        Ok(())
    }

    fn is_alive(&self) -> bool {
        true
    }

    fn vision(&self) -> Option<Sight> {
        None
    }
}

/// Coarse category of a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    /// Walker heading for the exit.
    Monster(MonsterKind),
    /// Shooting tower.
    Tower(TowerKind),
    /// Support tower.
    BuffTower(TowerKind),
    /// Homing shot.
    Projectile,
    /// Border wall.
    Wall,
}

/// Render-facing snapshot of any piece.
#[derive(Clone, Debug, PartialEq)]
pub struct PieceView {
    /// Identifier of the piece.
    pub id: EntityId,
    /// Category of the piece.
    pub kind: PieceKind,
    /// Pixel-space position.
    pub position: Vec2,
    /// Unit facing, for pieces that have one.
    pub facing: Option<Vec2>,
    /// Image to draw.
    pub image: ImageHandle,
    /// Tile the piece occupies, for stationary pieces.
    pub tile: Option<TileCoord>,
    /// Health and maximum health, for monsters.
    pub health: Option<(i64, u32)>,
    /// Liveness at the moment of the snapshot.
    pub alive: bool,
}

/// Detailed snapshot of a monster.
#[derive(Clone, Debug, PartialEq)]
pub struct MonsterView {
    /// Identifier of the monster.
    pub id: EntityId,
    /// Template of the monster.
    pub kind: MonsterKind,
    /// Pixel-space position.
    pub position: Vec2,
    /// Unit facing.
    pub facing: Vec2,
    /// Current speed in pixels per tick.
    pub speed: f32,
    /// Unaffected speed in pixels per tick.
    pub max_speed: f32,
    /// Remaining health; zero or less once killed.
    pub health: i64,
    /// Health at spawn.
    pub max_health: u32,
    /// Gold paid out when killed.
    pub reward: u32,
    /// Waypoints left before the exit.
    pub waypoints_left: usize,
    /// No route to the exit exists from the monster's tile.
    pub stranded: bool,
    /// Number of status effects currently attached.
    pub effects: usize,
    /// Liveness at the moment of the snapshot.
    pub alive: bool,
}

/// Detailed snapshot of a shooting or support tower.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerView {
    /// Identifier of the tower.
    pub id: EntityId,
    /// Current tier.
    pub kind: TowerKind,
    /// Occupied tile.
    pub tile: TileCoord,
    /// Effective range in pixels.
    pub range: f32,
    /// Effective damage per hit.
    pub damage: u32,
    /// Effective cooldown between shots.
    pub fire_rate: Duration,
    /// Monster currently tracked.
    pub target: Option<EntityId>,
    /// Modifiers granted by neighbouring support towers.
    pub modifiers: Vec<TowerModifier>,
    /// Modifier the tower grants, for support towers.
    pub grants: Option<ModifierKind>,
}

/// Any piece of the live population.
#[derive(Clone, Debug)]
pub(crate) enum Piece {
    Monster(Monster),
    Tower(Tower),
    Buff(BuffTower),
    Projectile(Projectile),
    Wall(Wall),
}

impl Piece {
    pub(crate) fn id(&self) -> EntityId {
        match self {
            Self::Monster(monster) => monster.id(),
            Self::Tower(tower) => tower.id(),
            Self::Buff(buff) => buff.id(),
            Self::Projectile(projectile) => projectile.id(),
            Self::Wall(wall) => wall.id,
        }
    }

    pub(crate) fn position(&self) -> Vec2 {
        match self {
            Self::Monster(monster) => monster.position(),
            Self::Tower(tower) => tower.position(),
            Self::Buff(buff) => buff.position(),
            Self::Projectile(projectile) => projectile.position(),
            Self::Wall(wall) => wall.position,
        }
    }

    /// Marks the piece for removal by the next reap pass.
    pub(crate) fn mark_dead(&mut self) {
        match self {
            Self::Monster(monster) => monster.mark_dead(),
            Self::Tower(tower) => tower.mark_dead(),
            Self::Buff(buff) => buff.mark_dead(),
            Self::Projectile(projectile) => projectile.mark_dead(),
            Self::Wall(_) => {}
        }
    }

    /// Tile and tier of shooting and support towers.
    pub(crate) fn tower_info(&self) -> Option<(TileCoord, TowerKind)> {
        match self {
            Self::Tower(tower) => Some((tower.tile(), tower.kind())),
            Self::Buff(buff) => Some((buff.tile(), buff.kind())),
            _ => None,
        }
    }

    pub(crate) fn as_monster(&self) -> Option<&Monster> {
        match self {
            Self::Monster(monster) => Some(monster),
            _ => None,
        }
    }

    pub(crate) fn as_monster_mut(&mut self) -> Option<&mut Monster> {
        match self {
            Self::Monster(monster) => Some(monster),
            _ => None,
        }
    }

    pub(crate) fn as_tower_mut(&mut self) -> Option<&mut Tower> {
        match self {
            Self::Tower(tower) => Some(tower),
            _ => None,
        }
    }

    pub(crate) fn view(&self) -> PieceView {
        let alive = self.is_alive();
        match self {
            Self::Monster(monster) => PieceView {
                id: monster.id(),
                kind: PieceKind::Monster(monster.kind()),
                position: monster.position(),
                facing: Some(monster.facing()),
                image: monster.image(),
                tile: None,
                health: Some((monster.health(), monster.max_health())),
                alive,
            },
            Self::Tower(tower) => PieceView {
                id: tower.id(),
                kind: PieceKind::Tower(tower.kind()),
                position: tower.position(),
                facing: None,
                image: tower.image(),
                tile: Some(tower.tile()),
                health: None,
                alive,
            },
            Self::Buff(buff) => PieceView {
                id: buff.id(),
                kind: PieceKind::BuffTower(buff.kind()),
                position: buff.position(),
                facing: None,
                image: buff.image(),
                tile: Some(buff.tile()),
                health: None,
                alive,
            },
            Self::Projectile(projectile) => PieceView {
                id: projectile.id(),
                kind: PieceKind::Projectile,
                position: projectile.position(),
                facing: Some(projectile.facing()),
                image: projectile.image(),
                tile: None,
                health: None,
                alive,
            },
            Self::Wall(wall) => PieceView {
                id: wall.id,
                kind: PieceKind::Wall,
                position: wall.position,
                facing: None,
                image: wall.image,
                tile: Some(wall.tile),
                health: None,
                alive,
            },
        }
    }
}

impl Behavior for Piece {
    fn advance(&mut self, ctx: &mut TickContext<'_>) -> Result<(), BehaviorError> {
        match self {
            Self::Monster(monster) => monster.advance(ctx),
            Self::Tower(tower) => tower.advance(ctx),
            Self::Buff(buff) => buff.advance(ctx),
            Self::Projectile(projectile) => projectile.advance(ctx),
            Self::Wall(wall) => wall.advance(ctx),
        }
    }

    fn is_alive(&self) -> bool {
        match self {
            Self::Monster(monster) => monster.is_alive(),
            Self::Tower(tower) => tower.is_alive(),
            Self::Buff(buff) => buff.is_alive(),
            Self::Projectile(projectile) => projectile.is_alive(),
            Self::Wall(wall) => wall.is_alive(),
        }
    }

    fn vision(&self) -> Option<Sight> {
        match self {
            Self::Monster(monster) => monster.vision(),
            Self::Tower(tower) => tower.vision(),
            Self::Buff(buff) => buff.vision(),
            Self::Projectile(projectile) => projectile.vision(),
            Self::Wall(wall) => wall.vision(),
        }
    }
}
