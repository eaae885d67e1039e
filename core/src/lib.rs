#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Towerline engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters capture player [`Intent`]
//! values, systems translate intents and timers into [`Command`] values, the
//! world executes those commands via its `apply` entry point and broadcasts
//! [`Event`] values describing what happened. Services the simulation consumes
//! from the outside (the player's purse and the image catalog) are expressed
//! as the [`Economy`] and [`AssetProvider`] traits so they can be passed in
//! explicitly and mocked in tests.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Location of a single map tile expressed as column (`x`) and row (`y`).
///
/// Coordinates are signed so that requests outside the map can be expressed
/// and rejected with a bounds error instead of wrapping around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    x: i32,
    y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the coordinate shifted by the provided column and row deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Reports whether `other` touches this tile orthogonally or diagonally.
    #[must_use]
    pub fn is_adjacent(self, other: TileCoord, diagonal: bool) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        match (dx, dy) {
            (1, 0) | (0, 1) => true,
            (1, 1) => diagonal,
            _ => false,
        }
    }
}

/// Unique identifier assigned to every piece living in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Opaque handle to an image or animation frame owned by an asset provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageHandle(u32);

impl ImageHandle {
    /// Handle returned when a provider has no image for the requested name.
    pub const PLACEHOLDER: Self = Self(0);

    /// Creates a new image handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Tower templates that can be constructed or upgraded into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Entry-level single target tower.
    Basic,
    /// Second tier of the basic tower.
    Basic2,
    /// Final tier of the basic tower.
    Basic3,
    /// Entry-level splash damage tower.
    Fire,
    /// Second tier of the fire tower.
    Fire2,
    /// Final tier of the fire tower.
    Fire3,
    /// Entry-level slowing tower.
    Ice,
    /// Second tier of the ice tower.
    Ice2,
    /// Final tier of the ice tower.
    Ice3,
    /// Support tower raising the damage of nearby towers.
    DamageBoost,
    /// Support tower shortening the cooldown of nearby towers.
    FireRateBoost,
    /// Support tower extending the range of nearby towers.
    RangeBoost,
}

impl TowerKind {
    /// Every tower template in declaration order.
    pub const ALL: [TowerKind; 12] = [
        Self::Basic,
        Self::Basic2,
        Self::Basic3,
        Self::Fire,
        Self::Fire2,
        Self::Fire3,
        Self::Ice,
        Self::Ice2,
        Self::Ice3,
        Self::DamageBoost,
        Self::FireRateBoost,
        Self::RangeBoost,
    ];

    /// Reports whether the template builds a support tower instead of a shooter.
    #[must_use]
    pub const fn is_buff(self) -> bool {
        matches!(
            self,
            Self::DamageBoost | Self::FireRateBoost | Self::RangeBoost
        )
    }
}

/// Monster templates spawned by waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MonsterKind {
    /// Sturdy, slow walker.
    Basic,
    /// Fragile runner.
    Fast,
    /// Walker that ignores status effects.
    Immune,
}

/// Stat-altering effects that projectiles may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Reduces movement speed by the effect intensity in percent.
    Slow,
}

/// Timed status effect delivered by a projectile on impact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusEffect {
    kind: EffectKind,
    duration: Duration,
    intensity: u32,
}

impl StatusEffect {
    /// Creates a new status effect description.
    #[must_use]
    pub const fn new(kind: EffectKind, duration: Duration, intensity: u32) -> Self {
        Self {
            kind,
            duration,
            intensity,
        }
    }

    /// Identifier of the effect; a monster carries at most one per kind.
    #[must_use]
    pub const fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Simulated time the effect stays active after its first application.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Strength of the effect expressed in percent.
    #[must_use]
    pub const fn intensity(&self) -> u32 {
        self.intensity
    }
}

/// Tower stats a support tower can improve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Raises damage to 110 percent.
    Damage,
    /// Shortens the cooldown to 90 percent.
    FireRate,
    /// Raises the range to 110 percent.
    Range,
}

impl ModifierKind {
    /// Percentage the affected stat is scaled to.
    #[must_use]
    pub const fn percent(self) -> u32 {
        match self {
            Self::Damage | Self::Range => 110,
            Self::FireRate => 90,
        }
    }
}

/// Modifier granted by a support tower to a neighbouring tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TowerModifier {
    source: EntityId,
    kind: ModifierKind,
}

impl TowerModifier {
    /// Creates a modifier granted by the provided support tower.
    #[must_use]
    pub const fn new(source: EntityId, kind: ModifierKind) -> Self {
        Self { source, kind }
    }

    /// Support tower that grants the modifier; also identifies the modifier.
    #[must_use]
    pub const fn source(&self) -> EntityId {
        self.source
    }

    /// Stat affected by the modifier.
    #[must_use]
    pub const fn kind(&self) -> ModifierKind {
        self.kind
    }
}

/// Discrete player requests delivered by the input layer.
///
/// Intents are captured on the input thread and queued; the logic thread
/// drains the queue at the start of each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Intent {
    /// Build a tower of the provided kind on a tile.
    PlaceTower {
        /// Template of the requested tower.
        kind: TowerKind,
        /// Tile the tower should occupy.
        tile: TileCoord,
    },
    /// Select the tower standing on a tile, or clear the selection.
    SelectTower {
        /// Tile under the cursor.
        tile: TileCoord,
    },
    /// Sell the currently selected tower.
    SellSelected,
    /// Upgrade the currently selected tower to its next tier.
    UpgradeSelected,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Runs the AI and reap passes and advances the simulated clock.
    Tick {
        /// Duration of simulated time covered by the tick.
        dt: Duration,
    },
    /// Records that a new wave became active.
    AnnounceWave {
        /// Difficulty level of the wave.
        level: u32,
        /// Indicates whether the wave spawns bosses.
        boss: bool,
    },
    /// Creates a monster and requests its route to the exit.
    SpawnMonster {
        /// Template of the monster.
        kind: MonsterKind,
        /// Difficulty level used to scale health and reward.
        level: u32,
        /// Indicates whether the monster receives boss scaling.
        boss: bool,
        /// Spawn position in pixel space.
        position: Vec2,
    },
    /// Builds a tower on a tile after validating the placement.
    PlaceTower {
        /// Template of the requested tower.
        kind: TowerKind,
        /// Tile the tower should occupy.
        tile: TileCoord,
    },
    /// Selects the tower on a tile, clearing the selection if there is none.
    SelectTower {
        /// Tile under the cursor.
        tile: TileCoord,
    },
    /// Sells a tower for its template value.
    SellTower {
        /// Tower to sell.
        tower: EntityId,
    },
    /// Upgrades a tower to the next template tier.
    UpgradeTower {
        /// Tower to upgrade.
        tower: EntityId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulated clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a new wave became active.
    WaveStarted {
        /// Difficulty level of the wave.
        level: u32,
        /// Indicates whether the wave spawns bosses.
        boss: bool,
    },
    /// Confirms that a monster entered the map.
    MonsterSpawned {
        /// Identifier assigned to the monster.
        monster: EntityId,
        /// Template the monster was created from.
        kind: MonsterKind,
        /// Spawn position in pixel space.
        position: Vec2,
    },
    /// Reports that no route to the exit exists from the monster's tile.
    MonsterStranded {
        /// Identifier of the stranded monster.
        monster: EntityId,
    },
    /// Confirms that a monster was killed and removed.
    MonsterKilled {
        /// Identifier of the monster.
        monster: EntityId,
        /// Gold credited to the player.
        reward: u32,
    },
    /// Confirms that a monster reached the exit and was removed.
    MonsterLeaked {
        /// Identifier of the monster.
        monster: EntityId,
        /// Lives the player has left.
        lives_left: u32,
    },
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Identifier of the projectile.
        projectile: EntityId,
        /// Tower that fired.
        tower: EntityId,
        /// Monster the projectile homes in on.
        target: EntityId,
    },
    /// Confirms that a tower was built.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: EntityId,
        /// Template the tower was built from.
        kind: TowerKind,
        /// Tile the tower occupies.
        tile: TileCoord,
    },
    /// Reports that a placement request was rejected.
    TowerPlacementRejected {
        /// Template of the requested tower.
        kind: TowerKind,
        /// Tile provided in the request.
        tile: TileCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Announces the newly selected tower.
    TowerSelected {
        /// Identifier of the selected tower.
        tower: EntityId,
    },
    /// Announces that no tower is selected anymore.
    SelectionCleared,
    /// Confirms that a tower was sold.
    TowerSold {
        /// Identifier of the sold tower.
        tower: EntityId,
        /// Tile the tower occupied.
        tile: TileCoord,
        /// Gold refunded to the player.
        refund: u32,
    },
    /// Reports that a sale request was rejected.
    TowerSaleRejected {
        /// Identifier provided in the request.
        tower: EntityId,
        /// Specific reason the sale failed.
        reason: SaleError,
    },
    /// Confirms that a tower moved to its next tier.
    TowerUpgraded {
        /// Identifier of the tower.
        tower: EntityId,
        /// Template the tower now uses.
        kind: TowerKind,
    },
    /// Reports that an upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier provided in the request.
        tower: EntityId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Reports that a piece failed during its behaviour and was removed.
    EntityFaulted {
        /// Identifier of the faulty piece.
        entity: EntityId,
        /// Human readable description of the fault.
        reason: String,
    },
    /// Announces that the player ran out of lives.
    GameOver,
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The tile lies outside the map.
    OutOfBounds,
    /// The tile already holds a wall or a tower.
    Occupied,
    /// The player cannot afford the tower.
    InsufficientGold {
        /// Price of the tower.
        required: u32,
        /// Gold the player holds.
        available: u32,
    },
    /// The tower would cut at least one entry lane off from the exit.
    BlocksPath,
}

/// Reasons a tower sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleError {
    /// No live tower with the provided identifier exists.
    MissingTower,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No live tower with the provided identifier exists.
    MissingTower,
    /// The tower already uses the final tier of its line.
    FinalTier,
    /// The player cannot afford the next tier.
    InsufficientGold {
        /// Price of the next tier.
        required: u32,
        /// Gold the player holds.
        available: u32,
    },
}

/// Player purse and life counter read and written by the simulation.
pub trait Economy {
    /// Gold currently held by the player.
    fn gold(&self) -> u32;

    /// Withdraws gold, returning `false` without change when funds are short.
    fn spend_gold(&mut self, amount: u32) -> bool;

    /// Credits gold to the player.
    fn add_gold(&mut self, amount: u32);

    /// Lives the player has left.
    fn lives(&self) -> u32;

    /// Removes a single life.
    fn spend_life(&mut self);

    /// Reports whether the game reached its terminal state.
    fn is_game_over(&self) -> bool {
        self.lives() == 0
    }
}

/// Source of opaque image handles for pieces.
pub trait AssetProvider {
    /// Looks up a still image by list and item name.
    fn image(&self, list: &str, item: &str) -> ImageHandle;

    /// Looks up the frame of an animation after `elapsed_ticks` ticks.
    fn animation_frame(&self, list: &str, elapsed_ticks: u64) -> ImageHandle;
}

#[cfg(test)]
mod tests {
    use super::{Intent, PlacementError, TileCoord, TowerKind, UpgradeError};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn adjacency_respects_connectivity() {
        let origin = TileCoord::new(3, 3);
        assert!(origin.is_adjacent(TileCoord::new(3, 4), false));
        assert!(!origin.is_adjacent(TileCoord::new(4, 4), false));
        assert!(origin.is_adjacent(TileCoord::new(4, 4), true));
        assert!(!origin.is_adjacent(origin, true));
        assert!(!origin.is_adjacent(TileCoord::new(5, 3), true));
    }

    #[test]
    fn offset_moves_in_both_axes() {
        assert_eq!(TileCoord::new(0, 0).offset(-1, 2), TileCoord::new(-1, 2));
    }

    #[test]
    fn only_boost_templates_are_buffs() {
        let buffs: Vec<TowerKind> = TowerKind::ALL
            .into_iter()
            .filter(|kind| kind.is_buff())
            .collect();
        assert_eq!(
            buffs,
            vec![
                TowerKind::DamageBoost,
                TowerKind::FireRateBoost,
                TowerKind::RangeBoost
            ]
        );
    }

    #[test]
    fn tile_coord_round_trips_through_bincode() {
        assert_round_trip(&TileCoord::new(-4, 17));
    }

    #[test]
    fn rejection_reasons_round_trip_through_bincode() {
        assert_round_trip(&PlacementError::InsufficientGold {
            required: 60,
            available: 12,
        });
        assert_round_trip(&UpgradeError::FinalTier);
    }

    #[test]
    fn intents_parse_from_tagged_toml_tables() {
        let intent: Intent = toml::from_str(
            r#"
            action = "place_tower"
            kind = "Fire"
            tile = { x = 7, y = 12 }
            "#,
        )
        .expect("parse intent");
        assert_eq!(
            intent,
            Intent::PlaceTower {
                kind: TowerKind::Fire,
                tile: TileCoord::new(7, 12),
            }
        );

        let intent: Intent = toml::from_str(r#"action = "sell_selected""#).expect("parse intent");
        assert_eq!(intent, Intent::SellSelected);
    }
}
