use std::f32::consts::PI;

use glam::Vec2;
use towerline_core::{Economy, EntityId, ImageHandle, MonsterKind, StatusEffect};
use towerline_pathfinding::Path;

use super::{ensure_finite, Behavior, BehaviorError, MonsterView, TickContext};
use crate::{
    effects::EffectSet,
    templates::{monster_animation, MonsterSpec, MonsterTemplate, Site},
    vision::{Sight, VisionCone},
};

/// A waypoint counts as reached once the monster is this close to it.
const WAYPOINT_RADIUS: f32 = 6.0;
const VISION_HALF_ANGLE: f32 = 25.0 * PI / 180.0;
const VISION_RADIUS: f32 = 50.0;

/// How a monster's life ended; settled exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Settlement {
    /// Killed by towers; the reward was credited.
    Killed { reward: u32 },
    /// Walked out through the exit; a life was spent.
    Leaked,
}

#[derive(Clone, Debug)]
pub(crate) struct Monster {
    id: EntityId,
    kind: MonsterKind,
    position: Vec2,
    facing: Vec2,
    path: Path,
    stranded: bool,
    speed: f32,
    max_speed: f32,
    health: i64,
    max_health: u32,
    reward: u32,
    immune: bool,
    effects: EffectSet,
    settlement: Option<Settlement>,
    alive: bool,
    born: u64,
    image: ImageHandle,
}

impl Monster {
    pub(crate) fn new(site: Site, template: &MonsterTemplate, spec: MonsterSpec) -> Self {
        let max_health = template.scaled_health(spec.level, spec.boss);
        let facing = spec
            .path
            .next_waypoint()
            .and_then(|waypoint| (waypoint - site.position).try_normalize())
            .unwrap_or(Vec2::X);
        Self {
            id: site.id,
            kind: template.kind,
            position: site.position,
            facing,
            path: spec.path,
            stranded: spec.stranded,
            speed: template.speed,
            max_speed: template.speed,
            health: i64::from(max_health),
            max_health,
            reward: MonsterTemplate::reward(spec.level, spec.boss),
            immune: template.immune,
            effects: EffectSet::default(),
            settlement: None,
            alive: true,
            born: spec.born,
            image: site.image,
        }
    }

    pub(crate) const fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) const fn kind(&self) -> MonsterKind {
        self.kind
    }

    pub(crate) const fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) const fn facing(&self) -> Vec2 {
        self.facing
    }

    pub(crate) fn velocity(&self) -> Vec2 {
        self.facing * self.speed
    }

    pub(crate) const fn health(&self) -> i64 {
        self.health
    }

    pub(crate) const fn max_health(&self) -> u32 {
        self.max_health
    }

    pub(crate) const fn image(&self) -> ImageHandle {
        self.image
    }

    pub(crate) const fn settlement(&self) -> Option<Settlement> {
        self.settlement
    }

    pub(crate) fn mark_dead(&mut self) {
        self.alive = false;
    }

    /// Replaces the route; returns `true` when the monster just became
    /// stranded.
    pub(crate) fn reroute(&mut self, path: Path) -> bool {
        let was_stranded = self.stranded;
        self.stranded = path.is_exhausted();
        self.path = path;
        self.stranded && !was_stranded
    }

    /// Applies a hit: attaches the payload effect, then removes health.
    pub(crate) fn strike(&mut self, damage: u32, effect: Option<StatusEffect>, economy: &mut dyn Economy) {
        if !self.alive {
            return;
        }
        if let Some(effect) = effect {
            let _ = self.attach_effect(effect);
        }
        self.health -= i64::from(damage);
        if self.health <= 0 {
            let _ = self.settle(
                Settlement::Killed {
                    reward: self.reward,
                },
                economy,
            );
        }
    }

    pub(crate) fn attach_effect(&mut self, effect: StatusEffect) -> bool {
        !self.immune && self.effects.attach(effect)
    }

    /// Records how the monster's life ended and credits or charges the
    /// player. Only the first settlement counts.
    pub(crate) fn settle(&mut self, settlement: Settlement, economy: &mut dyn Economy) -> bool {
        if self.settlement.is_some() {
            return false;
        }
        match settlement {
            Settlement::Killed { reward } => economy.add_gold(reward),
            Settlement::Leaked => economy.spend_life(),
        }
        self.settlement = Some(settlement);
        self.alive = false;
        true
    }

    pub(crate) fn view(&self) -> MonsterView {
        MonsterView {
            id: self.id,
            kind: self.kind,
            position: self.position,
            facing: self.facing,
            speed: self.speed,
            max_speed: self.max_speed,
            health: self.health,
            max_health: self.max_health,
            reward: self.reward,
            waypoints_left: self.path.remaining(),
            stranded: self.stranded,
            effects: self.effects.len(),
            alive: self.alive,
        }
    }

    fn walk(&mut self, waypoint: Vec2, bounds: Vec2) {
        if let Some(direction) = (waypoint - self.position).try_normalize() {
            self.facing = direction;
        }
        self.position = (self.position + self.facing * self.speed).clamp(Vec2::ZERO, bounds);
        if self.position.distance(waypoint) < WAYPOINT_RADIUS {
            let _ = self.path.pop_waypoint();
        }
    }
}

impl Behavior for Monster {
    fn advance(&mut self, ctx: &mut TickContext<'_>) -> Result<(), BehaviorError> {
        match self.path.next_waypoint() {
            Some(waypoint) => self.walk(waypoint, ctx.bounds),
            None if !self.stranded => {
                let _ = self.settle(Settlement::Leaked, &mut *ctx.economy);
                return Ok(());
            }
            None => {}
        }

        if !self.immune {
            self.effects.apply(ctx.now, self.max_speed, &mut self.speed);
        }
        let age = ctx.tick.saturating_sub(self.born);
        self.image = ctx.assets.animation_frame(monster_animation(self.kind), age);

        ensure_finite("monster", self.position)
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn vision(&self) -> Option<Sight> {
        Some(Sight {
            origin: self.position,
            facing: Some(self.facing),
            cone: VisionCone::new(VISION_HALF_ANGLE, VISION_RADIUS),
        })
    }
}
