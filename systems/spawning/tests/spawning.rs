use std::{sync::Arc, time::Duration};

use towerline_core::{AssetProvider, Command, Event, ImageHandle, MonsterKind};
use towerline_system_spawning::{campaign, Config, Spawning, WaveDirective, WaveSchedule};
use towerline_world::{self as world, query, World, WorldConfig};

struct NoAssets;

impl AssetProvider for NoAssets {
    fn image(&self, _list: &str, _item: &str) -> ImageHandle {
        ImageHandle::PLACEHOLDER
    }

    fn animation_frame(&self, _list: &str, _elapsed_ticks: u64) -> ImageHandle {
        ImageHandle::PLACEHOLDER
    }
}

fn step(world: &mut World, spawning: &mut Spawning, dt: Duration, events: &mut Vec<Event>) {
    let mut commands = Vec::new();
    spawning.handle(query::now(world), query::layout(world).lane_band(), &mut commands);
    for command in commands {
        world::apply(world, command, events);
    }
    world::apply(world, Command::Tick { dt }, events);
}

#[test]
fn campaign_opening_gives_twenty_seconds_to_build() {
    let mut world = World::new(WorldConfig::default(), Arc::new(NoAssets)).expect("world");
    let mut spawning = Spawning::new(campaign(), Config::new(0x5eed));
    let mut events = Vec::new();
    let dt = Duration::from_millis(12_500) / 1_000;

    for _ in 0..1_599 {
        step(&mut world, &mut spawning, dt, &mut events);
    }
    assert_eq!(query::wave(&world).map(|wave| wave.level), Some(0));
    assert_eq!(query::live_monster_count(&world), 0);

    for _ in 0..3 {
        step(&mut world, &mut spawning, dt, &mut events);
    }
    let wave = query::wave(&world).expect("wave");
    assert_eq!(wave.level, 1);
    assert!(!wave.boss);

    let started: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            Event::WaveStarted { level, .. } => Some(*level),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec![0, 1]);
    assert_eq!(query::live_monster_count(&world), 1);
}

#[test]
fn spawned_monsters_enter_on_the_left_edge_of_the_lane() {
    let mut world = World::new(WorldConfig::default(), Arc::new(NoAssets)).expect("world");
    let schedule = WaveSchedule::new(vec![WaveDirective {
        monster: MonsterKind::Fast,
        count: 10,
        batch_size: 5,
        spawn_interval: Duration::from_millis(100),
        boss: false,
        level: 2,
    }])
    .expect("schedule");
    let mut spawning = Spawning::new(schedule, Config::new(11));
    let mut events = Vec::new();

    for _ in 0..12 {
        step(&mut world, &mut spawning, Duration::from_millis(10), &mut events);
    }

    let (top, height) = query::layout(&world).lane_band();
    let positions: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::MonsterSpawned { kind, position, .. } => {
                assert_eq!(*kind, MonsterKind::Fast);
                Some(*position)
            }
            _ => None,
        })
        .collect();
    assert_eq!(positions.len(), 10);
    assert!(positions
        .iter()
        .all(|position| position.x == 0.0 && position.y >= top && position.y < top + height));
    assert!(spawning.is_exhausted());
    assert!(!events.iter().any(|event| matches!(event, Event::MonsterStranded { .. })));
}
