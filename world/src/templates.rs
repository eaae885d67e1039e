//! Data-driven tower and monster records plus the factories that turn them
//! into pieces.

use std::{collections::HashMap, time::Duration};

use glam::Vec2;
use towerline_core::{
    AssetProvider, EffectKind, EntityId, ImageHandle, ModifierKind, MonsterKind, StatusEffect,
    TileCoord, TowerKind,
};
use towerline_pathfinding::Path;

use crate::pieces::{BuffTower, Monster, Piece, Tower};

/// Asset list holding tower images.
pub const TOWER_IMAGES: &str = "towers";
/// Asset list holding monster walk cycles, one animation per monster kind.
pub const MONSTER_ANIMATIONS: [(MonsterKind, &str); 3] = [
    (MonsterKind::Basic, "monster_basic"),
    (MonsterKind::Fast, "monster_fast"),
    (MonsterKind::Immune, "monster_immune"),
];
/// Asset list holding projectile and wall images.
pub const MISC_IMAGES: &str = "misc";

/// Immutable description of a tower tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTemplate {
    /// Tier described by the record.
    pub kind: TowerKind,
    /// Reach in pixels.
    pub range: f32,
    /// Cooldown between two shots; zero for support towers.
    pub fire_rate: Duration,
    /// Damage dealt per hit.
    pub damage: u32,
    /// Purchase price, also refunded on sale.
    pub value: u32,
    /// Splash radius in pixels; zero for single-target shots.
    pub splash: f32,
    /// Effect attached to every hit.
    pub effect: Option<StatusEffect>,
    /// Modifier granted to neighbours, present only on support towers.
    pub modifier: Option<ModifierKind>,
    /// Tier reached by upgrading.
    pub next: Option<TowerKind>,
    /// Item name inside [`TOWER_IMAGES`].
    pub image: &'static str,
}

impl TowerTemplate {
    /// Record describing the provided tier.
    #[must_use]
    pub const fn of(kind: TowerKind) -> Self {
        match kind {
            TowerKind::Basic => shooter(kind, 80.0, 1000, 70, 10, 0.0, None, Some(TowerKind::Basic2), "basic"),
            TowerKind::Basic2 => shooter(kind, 160.0, 900, 90, 60, 0.0, None, Some(TowerKind::Basic3), "basic2"),
            TowerKind::Basic3 => shooter(kind, 220.0, 800, 110, 150, 0.0, None, None, "basic3"),
            TowerKind::Fire => shooter(kind, 100.0, 1000, 80, 30, 20.0, None, Some(TowerKind::Fire2), "fire"),
            TowerKind::Fire2 => shooter(kind, 110.0, 900, 120, 120, 20.0, None, Some(TowerKind::Fire3), "fire2"),
            TowerKind::Fire3 => shooter(kind, 120.0, 860, 140, 210, 20.0, None, None, "fire3"),
            TowerKind::Ice => shooter(kind, 60.0, 1000, 0, 30, 25.0, Some(slow(5, 20)), Some(TowerKind::Ice2), "ice"),
            TowerKind::Ice2 => shooter(kind, 90.0, 800, 0, 90, 30.0, Some(slow(10, 30)), Some(TowerKind::Ice3), "ice2"),
            TowerKind::Ice3 => shooter(kind, 100.0, 700, 0, 160, 30.0, Some(slow(15, 35)), None, "ice3"),
            TowerKind::DamageBoost => support(kind, ModifierKind::Damage, "damage_boost"),
            TowerKind::FireRateBoost => support(kind, ModifierKind::FireRate, "fire_rate_boost"),
            TowerKind::RangeBoost => support(kind, ModifierKind::Range, "range_boost"),
        }
    }
}

#[allow(clippy::too_many_arguments)]
const fn shooter(
    kind: TowerKind,
    range: f32,
    fire_rate_ms: u64,
    damage: u32,
    value: u32,
    splash: f32,
    effect: Option<StatusEffect>,
    next: Option<TowerKind>,
    image: &'static str,
) -> TowerTemplate {
    TowerTemplate {
        kind,
        range,
        fire_rate: Duration::from_millis(fire_rate_ms),
        damage,
        value,
        splash,
        effect,
        modifier: None,
        next,
        image,
    }
}

const fn support(kind: TowerKind, modifier: ModifierKind, image: &'static str) -> TowerTemplate {
    TowerTemplate {
        kind,
        range: 40.0,
        fire_rate: Duration::ZERO,
        damage: 0,
        value: 50,
        splash: 0.0,
        effect: None,
        modifier: Some(modifier),
        next: None,
        image,
    }
}

const fn slow(seconds: u64, percent: u32) -> StatusEffect {
    StatusEffect::new(EffectKind::Slow, Duration::from_secs(seconds), percent)
}

/// Immutable description of a monster kind before level scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterTemplate {
    /// Kind described by the record.
    pub kind: MonsterKind,
    /// Health at level zero.
    pub max_health: u32,
    /// Movement in pixels per tick.
    pub speed: f32,
    /// Monsters of this kind ignore every status effect.
    pub immune: bool,
}

impl MonsterTemplate {
    /// Record describing the provided kind.
    #[must_use]
    pub const fn of(kind: MonsterKind) -> Self {
        match kind {
            MonsterKind::Basic => Self {
                kind,
                max_health: 1000,
                speed: 1.1,
                immune: false,
            },
            MonsterKind::Fast => Self {
                kind,
                max_health: 800,
                speed: 3.0,
                immune: false,
            },
            MonsterKind::Immune => Self {
                kind,
                max_health: 800,
                speed: 1.2,
                immune: true,
            },
        }
    }

    /// Health after scaling for the provided level.
    #[must_use]
    pub fn scaled_health(&self, level: u32, boss: bool) -> u32 {
        let steps = u64::from(level) + if boss { 20 } else { 0 };
        let base = u64::from(self.max_health);
        u32::try_from(base + base * steps / 5).unwrap_or(u32::MAX)
    }

    /// Gold paid out when a monster of the provided level is killed.
    #[must_use]
    pub fn reward(level: u32, boss: bool) -> u32 {
        let per_level = if boss { 1.4 } else { 0.6 };
        let reward = (3.0 + f64::from(level) * per_level).floor();
        if reward >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            reward as u32
        }
    }
}

/// Where and by whom a piece is being created.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Site {
    pub(crate) id: EntityId,
    pub(crate) tile: TileCoord,
    pub(crate) position: Vec2,
    pub(crate) image: ImageHandle,
}

type TowerFactory = fn(&TowerTemplate, Site) -> Piece;

fn build_shooter(template: &TowerTemplate, site: Site) -> Piece {
    Piece::Tower(Tower::new(site, template))
}

fn build_support(template: &TowerTemplate, site: Site) -> Piece {
    match template.modifier {
        Some(modifier) => Piece::Buff(BuffTower::new(site, template, modifier)),
        None => build_shooter(template, site),
    }
}

const TOWER_FACTORIES: [(bool, TowerFactory); 2] = [(false, build_shooter), (true, build_support)];

/// Monster creation parameters once the level and route are known.
#[derive(Clone, Debug)]
pub(crate) struct MonsterSpec {
    pub(crate) level: u32,
    pub(crate) boss: bool,
    pub(crate) path: Path,
    pub(crate) stranded: bool,
    pub(crate) born: u64,
}

type MonsterFactory = fn(&MonsterTemplate, Site, MonsterSpec) -> Piece;

fn build_walker(template: &MonsterTemplate, site: Site, spec: MonsterSpec) -> Piece {
    Piece::Monster(Monster::new(site, template, spec))
}

const MONSTER_FACTORIES: [(MonsterKind, MonsterFactory); 3] = [
    (MonsterKind::Basic, build_walker),
    (MonsterKind::Fast, build_walker),
    (MonsterKind::Immune, build_walker),
];

/// Templates paired with the image handles resolved for them at startup.
#[derive(Clone, Debug)]
pub(crate) struct TemplateBook {
    tower_images: HashMap<TowerKind, ImageHandle>,
    projectile_image: ImageHandle,
    wall_image: ImageHandle,
}

impl TemplateBook {
    pub(crate) fn new(assets: &dyn AssetProvider) -> Self {
        let tower_images = TowerKind::ALL
            .iter()
            .map(|kind| (*kind, assets.image(TOWER_IMAGES, TowerTemplate::of(*kind).image)))
            .collect();
        Self {
            tower_images,
            projectile_image: assets.image(MISC_IMAGES, "projectile"),
            wall_image: assets.image(MISC_IMAGES, "wall"),
        }
    }

    pub(crate) fn tower_image(&self, kind: TowerKind) -> ImageHandle {
        self.tower_images
            .get(&kind)
            .copied()
            .unwrap_or(ImageHandle::PLACEHOLDER)
    }

    pub(crate) const fn projectile_image(&self) -> ImageHandle {
        self.projectile_image
    }

    pub(crate) const fn wall_image(&self) -> ImageHandle {
        self.wall_image
    }

    pub(crate) fn build_tower(&self, kind: TowerKind, id: EntityId, tile: TileCoord, position: Vec2) -> Piece {
        let template = TowerTemplate::of(kind);
        let site = Site {
            id,
            tile,
            position,
            image: self.tower_image(kind),
        };
        let factory = TOWER_FACTORIES
            .iter()
            .find(|(buff, _)| *buff == kind.is_buff())
            .map_or(build_shooter as TowerFactory, |(_, factory)| *factory);
        factory(&template, site)
    }

    pub(crate) fn build_monster(&self, kind: MonsterKind, site: Site, spec: MonsterSpec) -> Piece {
        let template = MonsterTemplate::of(kind);
        let factory = MONSTER_FACTORIES
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map_or(build_walker as MonsterFactory, |(_, factory)| *factory);
        factory(&template, site, spec)
    }
}

/// Animation list of a monster kind.
pub(crate) fn monster_animation(kind: MonsterKind) -> &'static str {
    MONSTER_ANIMATIONS
        .iter()
        .find(|(candidate, _)| *candidate == kind)
        .map_or("monster_basic", |(_, list)| list)
}
