//! Commands that change the map or the player's towers.

use glam::Vec2;
use towerline_core::{
    EntityId, Economy, Event, MonsterKind, PlacementError, SaleError, TileCoord, TowerKind, UpgradeError,
};
use towerline_pathfinding::{tile_at, tile_center, AStar, GridGraph, IndexedNodeCollection, Path};
use tracing::{debug, info, warn};

use crate::{
    pieces::{Behavior, Piece},
    templates::{monster_animation, MonsterSpec, Site, TowerTemplate},
    World,
};

impl World {
    pub(crate) fn spawn_monster(
        &mut self,
        kind: MonsterKind,
        level: u32,
        boss: bool,
        position: Vec2,
        out_events: &mut Vec<Event>,
    ) {
        let origin = self
            .layout
            .clamp_tile(tile_at(position, self.layout.tile_size()));
        let path = match self.paths.get_or_compute(&self.grid, origin) {
            Ok(path) => path,
            Err(error) => {
                warn!(%error, x = origin.x(), y = origin.y(), "monster_route_failed");
                Path::empty()
            }
        };
        let stranded = path.is_exhausted();

        let id = self.ids.allocate();
        let site = Site {
            id,
            tile: origin,
            position,
            image: self.assets.animation_frame(monster_animation(kind), 0),
        };
        let spec = MonsterSpec {
            level,
            boss,
            path,
            stranded,
            born: self.tick_index,
        };
        self.population.insert(self.templates.build_monster(kind, site, spec));

        debug!(monster = id.get(), ?kind, level, boss, x = position.x, y = position.y, "monster_spawned");
        out_events.push(Event::MonsterSpawned {
            monster: id,
            kind,
            position,
        });
        if stranded {
            warn!(monster = id.get(), "monster_stranded");
            out_events.push(Event::MonsterStranded { monster: id });
        }
    }

    pub(crate) fn place_tower(&mut self, kind: TowerKind, tile: TileCoord, out_events: &mut Vec<Event>) {
        let price = match self.check_placement(kind, tile) {
            Ok(price) => price,
            Err(reason) => {
                warn!(?kind, x = tile.x(), y = tile.y(), ?reason, "tower_placement_rejected");
                out_events.push(Event::TowerPlacementRejected { kind, tile, reason });
                return;
            }
        };
        if let Err(error) = self.grid.set_wall(tile) {
            warn!(%error, ?kind, "tower_placement_rejected");
            out_events.push(Event::TowerPlacementRejected {
                kind,
                tile,
                reason: PlacementError::OutOfBounds,
            });
            return;
        }

        self.paths.invalidate();
        self.reroute_monsters(out_events);
        let _ = self.player.spend_gold(price);

        let id = self.ids.allocate();
        let position = tile_center(tile, self.layout.tile_size());
        self.population
            .insert(self.templates.build_tower(kind, id, tile, position));

        info!(tower = id.get(), ?kind, x = tile.x(), y = tile.y(), gold = self.player.gold(), "tower_placed");
        out_events.push(Event::TowerPlaced {
            tower: id,
            kind,
            tile,
        });
    }

    pub(crate) fn select_tower(&mut self, tile: TileCoord, out_events: &mut Vec<Event>) {
        self.selected = self.population.tower_at(tile);
        out_events.push(match self.selected {
            Some(tower) => Event::TowerSelected { tower },
            None => Event::SelectionCleared,
        });
    }

    pub(crate) fn sell_tower(&mut self, tower: EntityId, out_events: &mut Vec<Event>) {
        let Some((tile, kind)) = self
            .population
            .get(tower)
            .filter(|piece| piece.is_alive())
            .and_then(Piece::tower_info)
        else {
            debug!(tower = tower.get(), "tower_sale_rejected");
            out_events.push(Event::TowerSaleRejected {
                tower,
                reason: SaleError::MissingTower,
            });
            return;
        };

        if let Some(piece) = self.population.get_mut(tower) {
            piece.mark_dead();
        }
        if kind.is_buff() {
            for neighbour in self.population.towers_mut() {
                let _ = neighbour.revoke_modifiers(tower);
            }
        }
        if let Err(error) = self.grid.clear_tile(tile) {
            warn!(%error, tower = tower.get(), "tower_tile_not_cleared");
        }
        self.paths.invalidate();
        self.reroute_monsters(out_events);

        let refund = TowerTemplate::of(kind).value;
        self.player.add_gold(refund);
        if self.selected == Some(tower) {
            self.selected = None;
            out_events.push(Event::SelectionCleared);
        }

        info!(tower = tower.get(), ?kind, refund, gold = self.player.gold(), "tower_sold");
        out_events.push(Event::TowerSold { tower, tile, refund });
    }

    pub(crate) fn upgrade_tower(&mut self, tower: EntityId, out_events: &mut Vec<Event>) {
        match self.try_upgrade(tower) {
            Ok(kind) => {
                info!(tower = tower.get(), ?kind, gold = self.player.gold(), "tower_upgraded");
                out_events.push(Event::TowerUpgraded { tower, kind });
            }
            Err(reason) => {
                debug!(tower = tower.get(), ?reason, "tower_upgrade_rejected");
                out_events.push(Event::TowerUpgradeRejected { tower, reason });
            }
        }
    }

    fn try_upgrade(&mut self, tower: EntityId) -> Result<TowerKind, UpgradeError> {
        let (_, kind) = self
            .population
            .get(tower)
            .filter(|piece| piece.is_alive())
            .and_then(Piece::tower_info)
            .ok_or(UpgradeError::MissingTower)?;
        let next = TowerTemplate::of(kind).next.ok_or(UpgradeError::FinalTier)?;
        let template = TowerTemplate::of(next);
        let image = self.templates.tower_image(next);

        let available = self.player.gold();
        let shooter = self
            .population
            .get_mut(tower)
            .and_then(Piece::as_tower_mut)
            .ok_or(UpgradeError::FinalTier)?;
        if !self.player.spend_gold(template.value) {
            return Err(UpgradeError::InsufficientGold {
                required: template.value,
                available,
            });
        }
        shooter.upgrade(&template, image);
        Ok(next)
    }

    fn check_placement(&self, kind: TowerKind, tile: TileCoord) -> Result<u32, PlacementError> {
        if !self.grid.contains(tile) {
            return Err(PlacementError::OutOfBounds);
        }
        if !self.grid.is_walkable(tile) || self.population.tower_at(tile).is_some() {
            return Err(PlacementError::Occupied);
        }
        let price = TowerTemplate::of(kind).value;
        let available = self.player.gold();
        if available < price {
            return Err(PlacementError::InsufficientGold {
                required: price,
                available,
            });
        }
        if self.layout.is_lane_opening(tile) || !self.lanes_stay_open(tile) {
            return Err(PlacementError::BlocksPath);
        }
        Ok(price)
    }

    /// Checks on a copy of the grid that every entry tile still reaches the
    /// exit once `tile` is walled.
    fn lanes_stay_open(&self, tile: TileCoord) -> bool {
        let mut candidate = self.grid.clone();
        if candidate.set_wall(tile).is_err() {
            return false;
        }
        let ignore_corners = !self.config.corner_cutting();
        let exit = self.layout.exit();
        let mut search = AStar::new(GridGraph::<IndexedNodeCollection>::new(&candidate));
        self.layout.entry_tiles().all(|entry| {
            search
                .search(entry, Some(exit), ignore_corners)
                .is_ok_and(|route| !route.is_empty())
        })
    }

    /// Gives every live monster a fresh route from the tile it stands on.
    fn reroute_monsters(&mut self, out_events: &mut Vec<Event>) {
        let tile_size = self.layout.tile_size();
        for monster in self.population.monsters_mut() {
            let origin = self.layout.clamp_tile(tile_at(monster.position(), tile_size));
            let path = match self.paths.get_or_compute(&self.grid, origin) {
                Ok(path) => path,
                Err(error) => {
                    warn!(%error, monster = monster.id().get(), "monster_route_failed");
                    Path::empty()
                }
            };
            if monster.reroute(path) {
                warn!(monster = monster.id().get(), "monster_stranded");
                out_events.push(Event::MonsterStranded {
                    monster: monster.id(),
                });
            }
        }
    }
}
