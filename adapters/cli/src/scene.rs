//! Snapshot of the world in rendering terms.

use std::collections::HashMap;

use anyhow::Result;
use glam::Vec2;
use towerline_core::{EntityId, Economy, Event};
use towerline_rendering::{
    HealthBar, Hud, Layer, Scene, SelectionPanel, Sprite, TileGridPresentation, TowerInteractionFeedback,
    TowerTargetLine,
};
use towerline_world::{query, PieceKind, TowerTemplate, World};

const fn layer(kind: PieceKind) -> Layer {
    match kind {
        PieceKind::Wall => Layer::Walls,
        PieceKind::Tower(_) | PieceKind::BuffTower(_) => Layer::Towers,
        PieceKind::Monster(_) => Layer::Monsters,
        PieceKind::Projectile => Layer::Projectiles,
    }
}

/// Builds the scene presented after a logic update.
pub(crate) fn capture(world: &World, events: &[Event]) -> Result<Scene> {
    let config = query::config(world);
    let tile_grid = TileGridPresentation::new(
        config.columns(),
        config.rows(),
        config.tile_size(),
        config.lane_top(),
        config.lane_rows(),
    )?;
    let player = query::player(world);
    let wave = query::wave(world);
    let hud = Hud {
        gold: player.gold(),
        lives: player.lives(),
        wave_level: wave.map(|wave| wave.level),
        boss_wave: wave.is_some_and(|wave| wave.boss),
        tick: query::tick_index(world),
        game_over: query::is_game_over(world),
    };

    let mut scene = Scene::new(tile_grid, hud);
    let mut positions: HashMap<EntityId, Vec2> = HashMap::new();
    for piece in query::pieces(world).into_iter().filter(|piece| piece.alive) {
        let _ = positions.insert(piece.id, piece.position);
        scene.push_sprite(Sprite {
            id: piece.id,
            layer: layer(piece.kind),
            position: piece.position,
            facing: piece.facing,
            image: piece.image,
        });
        if let Some((health, max_health)) = piece.health {
            scene
                .health_bars
                .push(HealthBar::new(piece.id, piece.position, health, max_health));
        }
    }

    let selected = query::selected(world);
    for tower in query::towers(world) {
        if let Some(target) = tower.target {
            if let (Some(from), Some(to)) = (positions.get(&tower.id), positions.get(&target)) {
                scene.tower_targets.push(TowerTargetLine {
                    tower: tower.id,
                    target,
                    from: *from,
                    to: *to,
                });
            }
        }
        if selected == Some(tower.id) {
            scene.selection = Some(SelectionPanel {
                tower: tower.id,
                kind: tower.kind,
                tile: tower.tile,
                range: tower.range,
                damage: tower.damage,
                fire_rate: tower.fire_rate,
                upgrade: TowerTemplate::of(tower.kind).next,
            });
        }
    }

    scene.tower_feedback = TowerInteractionFeedback::latest(events);
    Ok(scene)
}
