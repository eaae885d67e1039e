use std::{sync::Arc, time::Duration};

use towerline_core::{AssetProvider, Economy, Event, ImageHandle, Intent, TileCoord, TowerKind};
use towerline_simulation::Simulation;
use towerline_system_builder::{intent_channel, IntentSender};
use towerline_system_spawning::{campaign, Config};
use towerline_world::{query, World, WorldConfig};

const TICK: Duration = Duration::from_micros(12_500);

struct NoAssets;

impl AssetProvider for NoAssets {
    fn image(&self, _list: &str, _item: &str) -> ImageHandle {
        ImageHandle::PLACEHOLDER
    }

    fn animation_frame(&self, _list: &str, _elapsed_ticks: u64) -> ImageHandle {
        ImageHandle::PLACEHOLDER
    }
}

fn simulation(config: WorldConfig, seed: u64) -> (Simulation, IntentSender) {
    let world = World::new(config, Arc::new(NoAssets)).expect("world");
    let (sender, queue) = intent_channel();
    let spawning = towerline_system_spawning::Spawning::new(campaign(), Config::new(seed));
    (Simulation::new(world, spawning, queue, TICK), sender)
}

fn scripted_run(seed: u64, steps: usize) -> Vec<Event> {
    let (mut simulation, sender) = simulation(WorldConfig::default(), seed);
    let script = [
        (0, Intent::PlaceTower {
            kind: TowerKind::Basic,
            tile: TileCoord::new(5, 14),
        }),
        (10, Intent::PlaceTower {
            kind: TowerKind::Ice,
            tile: TileCoord::new(8, 20),
        }),
        (20, Intent::PlaceTower {
            kind: TowerKind::DamageBoost,
            tile: TileCoord::new(6, 13),
        }),
        (1_700, Intent::SelectTower {
            tile: TileCoord::new(5, 14),
        }),
        (1_701, Intent::UpgradeSelected),
    ];

    let mut events = Vec::new();
    for step in 0..steps {
        for (_, intent) in script.iter().filter(|(at, _)| *at == step) {
            sender.send(*intent).expect("send");
        }
        events.extend_from_slice(simulation.step());
    }
    events
}

fn spawn_positions(events: &[Event]) -> Vec<(f32, f32)> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::MonsterSpawned { position, .. } => Some((position.x, position.y)),
            _ => None,
        })
        .collect()
}

#[test]
fn identical_seeds_and_scripts_replay_identically() {
    let first = scripted_run(42, 2_600);
    let second = scripted_run(42, 2_600);

    assert_eq!(first, second);
    assert!(first.iter().any(|event| matches!(event, Event::ProjectileFired { .. })));
    assert!(first.iter().any(|event| matches!(event, Event::TowerUpgraded { .. })));
    assert_eq!(spawn_positions(&first).len(), 5);
}

#[test]
fn seeds_change_only_the_lane_offsets() {
    let first = spawn_positions(&scripted_run(1, 2_000));
    let second = spawn_positions(&scripted_run(2, 2_000));

    assert_eq!(first.len(), second.len());
    assert!(!first.is_empty());
    assert_ne!(first, second);
}

#[test]
fn running_out_of_lives_freezes_the_simulation() {
    let (mut simulation, _sender) = simulation(WorldConfig::default().with_purse(0, 1), 9);

    let mut steps = 0;
    while !simulation.is_game_over() && steps < 5_000 {
        let _ = simulation.step();
        steps += 1;
    }

    assert!(simulation.is_game_over());
    assert_eq!(query::player(simulation.world()).lives(), 0);
    assert!(simulation.last_events().contains(&Event::GameOver));

    let frozen_at = query::tick_index(simulation.world());
    assert!(simulation.step().is_empty());
    assert_eq!(query::tick_index(simulation.world()), frozen_at);
}
