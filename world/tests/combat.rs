use std::{sync::Arc, time::Duration};

use approx::assert_relative_eq;
use glam::Vec2;
use towerline_core::{AssetProvider, Command, Economy, Event, ImageHandle, MonsterKind, TileCoord, TowerKind};
use towerline_world::{apply, query, PieceKind, World, WorldConfig};

struct NoAssets;

impl AssetProvider for NoAssets {
    fn image(&self, _list: &str, _item: &str) -> ImageHandle {
        ImageHandle::PLACEHOLDER
    }

    fn animation_frame(&self, _list: &str, _elapsed_ticks: u64) -> ImageHandle {
        ImageHandle::PLACEHOLDER
    }
}

fn world(config: WorldConfig) -> World {
    World::new(config, Arc::new(NoAssets)).expect("world")
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, command, &mut events);
    events
}

fn place(world: &mut World, kind: TowerKind, x: i32, y: i32) {
    let events = run(
        world,
        Command::PlaceTower {
            kind,
            tile: TileCoord::new(x, y),
        },
    );
    assert!(matches!(events.last(), Some(Event::TowerPlaced { .. })), "{events:?}");
}

fn spawn(world: &mut World, kind: MonsterKind, position: Vec2) {
    let _ = run(
        world,
        Command::SpawnMonster {
            kind,
            level: 0,
            boss: false,
            position,
        },
    );
}

fn count(events: &[Event], predicate: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|event| predicate(event)).count()
}

#[test]
fn tower_kills_a_monster_and_pays_once() {
    let mut world = world(WorldConfig::default());
    place(&mut world, TowerKind::Basic, 3, 14);
    spawn(&mut world, MonsterKind::Basic, Vec2::new(0.0, 310.0));
    let gold_before = query::player(&world).gold();

    let mut events = Vec::new();
    for _ in 0..400 {
        events.extend(run(&mut world, Command::Tick { dt: Duration::from_secs(1) }));
        if query::live_monster_count(&world) == 0 {
            break;
        }
    }
    for _ in 0..20 {
        events.extend(run(&mut world, Command::Tick { dt: Duration::from_secs(1) }));
    }

    assert_eq!(count(&events, |event| matches!(event, Event::MonsterKilled { reward: 3, .. })), 1);
    assert_eq!(count(&events, |event| matches!(event, Event::MonsterLeaked { .. })), 0);
    assert!(count(&events, |event| matches!(event, Event::ProjectileFired { .. })) >= 15);
    assert_eq!(query::player(&world).gold(), gold_before + 3);
    assert_eq!(query::player(&world).lives(), 20);

    let leftovers = query::pieces(&world)
        .into_iter()
        .filter(|piece| matches!(piece.kind, PieceKind::Projectile | PieceKind::Monster(_)))
        .count();
    assert_eq!(leftovers, 0, "shots at a removed target fizzle out");
}

#[test]
fn leaking_monsters_spend_lives_and_end_the_game_once() {
    let mut world = world(WorldConfig::default().with_purse(0, 2));
    spawn(&mut world, MonsterKind::Fast, Vec2::new(770.0, 350.0));
    spawn(&mut world, MonsterKind::Fast, Vec2::new(765.0, 330.0));

    let mut events = Vec::new();
    for _ in 0..60 {
        events.extend(run(&mut world, Command::Tick { dt: Duration::from_millis(12) }));
    }

    assert_eq!(count(&events, |event| matches!(event, Event::MonsterLeaked { .. })), 2);
    assert_eq!(count(&events, |event| matches!(event, Event::GameOver)), 1);
    assert!(query::is_game_over(&world));
    assert_eq!(query::player(&world).lives(), 0);
    assert_eq!(query::player(&world).gold(), 0, "leaks pay nothing");
}

#[test]
fn ice_slows_until_the_effect_expires() {
    let mut world = world(WorldConfig::default());
    place(&mut world, TowerKind::Ice, 3, 14);
    let tower = query::tower_at(&world, TileCoord::new(3, 14)).expect("tower");
    spawn(&mut world, MonsterKind::Basic, Vec2::new(0.0, 310.0));
    let tick = Command::Tick {
        dt: Duration::from_millis(100),
    };

    let mut slowed = false;
    for _ in 0..100 {
        let _ = run(&mut world, tick.clone());
        let monster = &query::monsters(&world)[0];
        if monster.speed < monster.max_speed {
            slowed = true;
            break;
        }
    }
    assert!(slowed, "the ice tower should have hit");
    let _ = run(&mut world, Command::SellTower { tower });

    let monster = &query::monsters(&world)[0];
    assert_relative_eq!(monster.speed, 1.1 * 0.8, epsilon = 1e-5);
    assert_eq!(monster.health, 1000, "ice deals no damage");

    for _ in 0..30 {
        let _ = run(&mut world, tick.clone());
    }
    assert!(query::monsters(&world)[0].speed < 1.0);

    for _ in 0..30 {
        let _ = run(&mut world, tick.clone());
    }
    let monster = &query::monsters(&world)[0];
    assert_relative_eq!(monster.speed, monster.max_speed);
    assert_eq!(monster.effects, 0);
}

#[test]
fn monster_vision_is_a_forward_cone() {
    let mut world = world(WorldConfig::default().with_purse(1_000, 20));
    place(&mut world, TowerKind::Basic, 2, 15);
    place(&mut world, TowerKind::Basic, 1, 13);
    let ahead = query::tower_at(&world, TileCoord::new(2, 15)).expect("ahead");
    let aside = query::tower_at(&world, TileCoord::new(1, 13)).expect("aside");
    spawn(&mut world, MonsterKind::Basic, Vec2::new(5.0, 310.0));
    let monster = query::monsters(&world)[0].clone();

    assert_eq!(monster.facing, Vec2::X);
    let seen = query::vision(&world, monster.id);
    assert!(seen.contains(&ahead));
    assert!(!seen.contains(&aside));
    assert!(!seen.contains(&monster.id));
}

#[test]
fn selection_follows_the_clicked_tile() {
    let mut world = world(WorldConfig::default());
    place(&mut world, TowerKind::Fire, 8, 8);
    let tower = query::tower_at(&world, TileCoord::new(8, 8)).expect("tower");

    let events = run(&mut world, Command::SelectTower { tile: TileCoord::new(8, 8) });
    assert_eq!(events, vec![Event::TowerSelected { tower }]);
    assert_eq!(query::selected(&world), Some(tower));

    let events = run(&mut world, Command::SelectTower { tile: TileCoord::new(9, 8) });
    assert_eq!(events, vec![Event::SelectionCleared]);
    assert_eq!(query::selected(&world), None);
}

#[test]
fn splash_shots_strike_everything_inside_the_blast() {
    let mut world = world(WorldConfig::default());
    place(&mut world, TowerKind::Fire, 3, 14);
    spawn(&mut world, MonsterKind::Basic, Vec2::new(0.0, 305.0));
    spawn(&mut world, MonsterKind::Basic, Vec2::new(0.0, 305.0));
    spawn(&mut world, MonsterKind::Basic, Vec2::new(0.0, 395.0));
    let gold_before = query::player(&world).gold();
    let tick = Command::Tick {
        dt: Duration::from_secs(1),
    };

    for _ in 0..100 {
        let _ = run(&mut world, tick.clone());
        if query::monsters(&world).iter().any(|monster| monster.health < 1000) {
            break;
        }
    }
    let monsters = query::monsters(&world);
    assert_eq!(monsters.len(), 3);
    assert_eq!(monsters[0].health, 920);
    assert_eq!(monsters[1].health, 920, "the neighbour shares the blast");
    assert_eq!(monsters[2].health, 1000, "out of the blast radius");
    let outsider = monsters[2].id;

    let mut events = Vec::new();
    for _ in 0..100 {
        events.extend(run(&mut world, tick.clone()));
        if query::live_monster_count(&world) == 1 {
            break;
        }
    }

    assert_eq!(count(&events, |event| matches!(event, Event::MonsterKilled { .. })), 2);
    assert_eq!(query::player(&world).gold(), gold_before + 6);
    let survivor = &query::monsters(&world)[0];
    assert_eq!(survivor.id, outsider);
}

#[test]
fn very_high_levels_spawn_with_saturated_stats() {
    let mut world = world(WorldConfig::default());
    for (level, boss) in [(5_000_000, false), (u32::MAX, true)] {
        let _ = run(
            &mut world,
            Command::SpawnMonster {
                kind: MonsterKind::Basic,
                level,
                boss,
                position: Vec2::new(0.0, 310.0),
            },
        );
    }

    let monsters = query::monsters(&world);
    assert_eq!(monsters.len(), 2);
    assert_eq!(monsters[0].max_health, 1_000_001_000);
    assert_eq!(monsters[0].reward, 3_000_003);
    assert_eq!(monsters[1].max_health, u32::MAX);
    assert_eq!(monsters[1].reward, u32::MAX);
}
