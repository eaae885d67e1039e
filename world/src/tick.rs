//! The per-tick AI and reap passes.

use std::time::Duration;

use towerline_core::{Economy, Event};
use tracing::{debug, info, warn};

use crate::{
    pieces::{Behavior, Piece, Settlement, TickContext},
    World,
};

impl World {
    /// Lets every live piece act once in identifier order, then removes the
    /// dead and advances the simulated clock by `dt`.
    pub(crate) fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let mut spawned = Vec::new();
        let bounds = self.layout.size();

        for index in 0..self.population.len() {
            let Some(mut piece) = self.population.take(index) else {
                continue;
            };
            if piece.is_alive() {
                let mut ctx = TickContext {
                    now: self.now,
                    tick: self.tick_index,
                    bounds,
                    population: &mut self.population,
                    economy: &mut self.player,
                    assets: self.assets.as_ref(),
                    templates: &self.templates,
                    ids: &mut self.ids,
                    spawned: &mut spawned,
                    events: &mut *out_events,
                };
                if let Err(error) = piece.advance(&mut ctx) {
                    warn!(entity = piece.id().get(), %error, "entity_faulted");
                    out_events.push(Event::EntityFaulted {
                        entity: piece.id(),
                        reason: error.to_string(),
                    });
                    piece.mark_dead();
                }
            }
            self.population.restore(index, piece);
        }

        self.population.extend(spawned);
        self.reap(out_events);

        self.now = self.now.saturating_add(dt);
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });
    }

    fn reap(&mut self, out_events: &mut Vec<Event>) {
        for piece in self.population.reap() {
            let id = piece.id();
            match piece {
                Piece::Monster(monster) => match monster.settlement() {
                    Some(Settlement::Killed { reward }) => {
                        debug!(monster = id.get(), reward, gold = self.player.gold(), "monster_killed");
                        out_events.push(Event::MonsterKilled {
                            monster: id,
                            reward,
                        });
                    }
                    Some(Settlement::Leaked) => {
                        let lives_left = self.player.lives();
                        info!(monster = id.get(), lives_left, "monster_leaked");
                        out_events.push(Event::MonsterLeaked {
                            monster: id,
                            lives_left,
                        });
                    }
                    None => {}
                },
                Piece::Tower(_) | Piece::Buff(_) if self.selected == Some(id) => {
                    self.selected = None;
                    out_events.push(Event::SelectionCleared);
                }
                _ => {}
            }
        }

        if self.player.is_game_over() && !self.game_over {
            self.game_over = true;
            info!(tick = self.tick_index, "game_over");
            out_events.push(Event::GameOver);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec2;
    use towerline_core::{Command, EntityId, ImageHandle, MonsterKind};

    use super::*;
    use crate::{
        apply,
        pieces::{Payload, Projectile},
        query,
        test_support::FixedAssets,
        WorldConfig,
    };

    #[test]
    fn a_faulty_piece_is_removed_and_the_rest_keep_acting() {
        let mut world = World::new(WorldConfig::default(), Arc::new(FixedAssets)).expect("world");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnMonster {
                kind: MonsterKind::Basic,
                level: 0,
                boss: false,
                position: Vec2::new(10.0, 310.0),
            },
            &mut events,
        );
        let wall = EntityId::new(1);
        let shot = world.ids.allocate();
        world.population.insert(Piece::Projectile(Projectile::new(
            shot,
            Vec2::new(100.0, 100.0),
            wall,
            (Vec2::new(10.0, 10.0), Vec2::ZERO),
            Payload {
                damage: 5,
                splash: 0.0,
                effect: None,
            },
            ImageHandle::PLACEHOLDER,
        )));
        let before = query::monsters(&world)[0].position;

        events.clear();
        world.tick(Duration::from_millis(10), &mut events);

        assert!(matches!(
            events.first(),
            Some(Event::EntityFaulted { entity, .. }) if *entity == shot
        ));
        assert!(world.population.get(shot).is_none());
        assert!(world.population.get(wall).is_some());
        assert_ne!(query::monsters(&world)[0].position, before);
        assert_eq!(events.last(), Some(&Event::TimeAdvanced { dt: Duration::from_millis(10) }));
        assert_eq!(query::tick_index(&world), 1);
    }
}
