use glam::Vec2;
use towerline_core::{EntityId, ImageHandle, StatusEffect};

use super::{ensure_finite, Behavior, BehaviorError, Piece, TickContext};
use crate::vision::{Sight, VisionCone};

/// Pixels travelled per tick.
const SPEED: f32 = 8.0;
/// A target closer than this is hit.
const HIT_RADIUS: f32 = 10.0;
/// How many travel-times ahead the aim point is projected.
const LEAD_FACTOR: f32 = 2.0;

/// What a projectile delivers on impact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Payload {
    pub(crate) damage: u32,
    pub(crate) splash: f32,
    pub(crate) effect: Option<StatusEffect>,
}

/// Homing shot fired by a tower.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    id: EntityId,
    position: Vec2,
    facing: Vec2,
    target: EntityId,
    payload: Payload,
    alive: bool,
    image: ImageHandle,
}

impl Projectile {
    pub(crate) fn new(
        id: EntityId,
        origin: Vec2,
        target: EntityId,
        target_motion: (Vec2, Vec2),
        payload: Payload,
        image: ImageHandle,
    ) -> Self {
        let (target_position, target_velocity) = target_motion;
        let facing = (lead(origin, target_position, target_velocity) - origin)
            .try_normalize()
            .unwrap_or(Vec2::X);
        Self {
            id,
            position: origin,
            facing,
            target,
            payload,
            alive: true,
            image,
        }
    }

    pub(crate) const fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) const fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) const fn facing(&self) -> Vec2 {
        self.facing
    }

    pub(crate) const fn image(&self) -> ImageHandle {
        self.image
    }

    pub(crate) fn mark_dead(&mut self) {
        self.alive = false;
    }

    fn blast(&self) -> Option<Sight> {
        (self.payload.splash > 0.0).then(|| Sight {
            origin: self.position,
            facing: None,
            cone: VisionCone::circle(self.payload.splash),
        })
    }

    fn hit(&mut self, ctx: &mut TickContext<'_>) {
        self.alive = false;
        let Payload { damage, effect, .. } = self.payload;
        match self.blast() {
            Some(blast) => {
                for monster in ctx.population.monsters_in_mut(&blast) {
                    monster.strike(damage, effect, &mut *ctx.economy);
                }
            }
            None => {
                if let Some(monster) = ctx
                    .population
                    .get_mut(self.target)
                    .and_then(Piece::as_monster_mut)
                {
                    monster.strike(damage, effect, &mut *ctx.economy);
                }
            }
        }
    }
}

/// Point the target will be at after `LEAD_FACTOR` times the time the shot
/// needs to cover the current distance.
fn lead(from: Vec2, target: Vec2, velocity: Vec2) -> Vec2 {
    let ticks = from.distance(target) / SPEED * LEAD_FACTOR;
    target + velocity * ticks
}

impl Behavior for Projectile {
    fn advance(&mut self, ctx: &mut TickContext<'_>) -> Result<(), BehaviorError> {
        let Some(piece) = ctx.population.get(self.target) else {
            self.alive = false;
            return Ok(());
        };
        let Some(target) = piece.as_monster() else {
            return Err(BehaviorError::TargetNotMonster {
                target: self.target,
            });
        };
        let target_position = target.position();
        let target_alive = target.is_alive();
        let distance = self.position.distance(target_position);

        let aim = lead(self.position, target_position, target.velocity());
        if let Some(direction) = (aim - self.position).try_normalize() {
            self.facing = direction;
        }
        self.position += self.facing * SPEED;
        ensure_finite("projectile", self.position)?;

        if distance <= HIT_RADIUS || !target_alive {
            self.hit(ctx);
        }
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn vision(&self) -> Option<Sight> {
        self.blast()
    }
}
