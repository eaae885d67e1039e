use std::time::Duration;

use glam::Vec2;
use towerline_core::{EntityId, Event, ImageHandle, ModifierKind, TileCoord, TowerKind, TowerModifier};

use super::{Behavior, BehaviorError, Payload, Piece, Projectile, TickContext, TowerView};
use crate::{
    templates::{Site, TowerTemplate},
    vision::{Sight, VisionCone},
};

/// Stationary shooter.
#[derive(Clone, Debug)]
pub(crate) struct Tower {
    id: EntityId,
    kind: TowerKind,
    tile: TileCoord,
    position: Vec2,
    base: TowerTemplate,
    range: f32,
    fire_rate: Duration,
    damage: u32,
    modifiers: Vec<TowerModifier>,
    target: Option<EntityId>,
    last_fired: Option<Duration>,
    alive: bool,
    image: ImageHandle,
}

impl Tower {
    pub(crate) fn new(site: Site, template: &TowerTemplate) -> Self {
        Self {
            id: site.id,
            kind: template.kind,
            tile: site.tile,
            position: site.position,
            base: *template,
            range: template.range,
            fire_rate: template.fire_rate,
            damage: template.damage,
            modifiers: Vec::new(),
            target: None,
            last_fired: None,
            alive: true,
            image: site.image,
        }
    }

    pub(crate) const fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) const fn kind(&self) -> TowerKind {
        self.kind
    }

    pub(crate) const fn tile(&self) -> TileCoord {
        self.tile
    }

    pub(crate) const fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) const fn image(&self) -> ImageHandle {
        self.image
    }

    pub(crate) fn mark_dead(&mut self) {
        self.alive = false;
    }

    /// Accepts a modifier unless one from the same source is already applied.
    pub(crate) fn add_modifier(&mut self, modifier: TowerModifier) -> bool {
        if self.modifiers.iter().any(|held| held.source() == modifier.source()) {
            return false;
        }
        self.modifiers.push(modifier);
        self.recompute();
        true
    }

    /// Drops every modifier granted by `source`.
    pub(crate) fn revoke_modifiers(&mut self, source: EntityId) -> bool {
        let before = self.modifiers.len();
        self.modifiers.retain(|held| held.source() != source);
        let changed = self.modifiers.len() != before;
        if changed {
            self.recompute();
        }
        changed
    }

    /// Moves to the next tier; held modifiers apply to the new stats.
    pub(crate) fn upgrade(&mut self, template: &TowerTemplate, image: ImageHandle) {
        self.kind = template.kind;
        self.base = *template;
        self.image = image;
        self.recompute();
    }

    pub(crate) fn view(&self) -> TowerView {
        TowerView {
            id: self.id,
            kind: self.kind,
            tile: self.tile,
            range: self.range,
            damage: self.damage,
            fire_rate: self.fire_rate,
            target: self.target,
            modifiers: self.modifiers.clone(),
            grants: None,
        }
    }

    fn recompute(&mut self) {
        self.range = self.base.range;
        self.fire_rate = self.base.fire_rate;
        self.damage = self.base.damage;
        for modifier in &self.modifiers {
            let percent = modifier.kind().percent();
            match modifier.kind() {
                ModifierKind::Damage => self.damage = self.damage * percent / 100,
                ModifierKind::FireRate => self.fire_rate = self.fire_rate * percent / 100,
                ModifierKind::Range => self.range = self.range * percent as f32 / 100.0,
            }
        }
    }

    fn sight(&self) -> Sight {
        Sight {
            origin: self.position,
            facing: None,
            cone: VisionCone::circle(self.range),
        }
    }

    fn ready(&self, now: Duration) -> bool {
        self.last_fired
            .map_or(true, |last| now.saturating_sub(last) >= self.fire_rate)
    }

    fn payload(&self) -> Payload {
        Payload {
            damage: self.damage,
            splash: self.base.splash,
            effect: self.base.effect,
        }
    }

    fn fire(&mut self, target: EntityId, motion: (Vec2, Vec2), ctx: &mut TickContext<'_>) {
        let id = ctx.ids.allocate();
        let projectile = Projectile::new(
            id,
            self.position,
            target,
            motion,
            self.payload(),
            ctx.templates.projectile_image(),
        );
        ctx.spawned.push(Piece::Projectile(projectile));
        ctx.events.push(Event::ProjectileFired {
            projectile: id,
            tower: self.id,
            target,
        });
        self.last_fired = Some(ctx.now);
    }
}

impl Behavior for Tower {
    fn advance(&mut self, ctx: &mut TickContext<'_>) -> Result<(), BehaviorError> {
        let sight = self.sight();
        if let Some(target) = self.target {
            let tracked = ctx
                .population
                .monster(target)
                .filter(|monster| monster.is_alive() && sight.sees(monster.position()))
                .map(|monster| (monster.position(), monster.velocity()));
            if let Some(motion) = tracked {
                if self.ready(ctx.now) {
                    self.fire(target, motion, ctx);
                }
                return Ok(());
            }
            self.target = None;
        }

        self.target = ctx.population.nearest_monster(&sight);
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn vision(&self) -> Option<Sight> {
        Some(self.sight())
    }
}

/// Support tower improving its neighbours.
#[derive(Clone, Debug)]
pub(crate) struct BuffTower {
    id: EntityId,
    kind: TowerKind,
    tile: TileCoord,
    position: Vec2,
    range: f32,
    grants: ModifierKind,
    alive: bool,
    image: ImageHandle,
}

impl BuffTower {
    pub(crate) fn new(site: Site, template: &TowerTemplate, grants: ModifierKind) -> Self {
        Self {
            id: site.id,
            kind: template.kind,
            tile: site.tile,
            position: site.position,
            range: template.range,
            grants,
            alive: true,
            image: site.image,
        }
    }

    pub(crate) const fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) const fn kind(&self) -> TowerKind {
        self.kind
    }

    pub(crate) const fn tile(&self) -> TileCoord {
        self.tile
    }

    pub(crate) const fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) const fn image(&self) -> ImageHandle {
        self.image
    }

    pub(crate) fn mark_dead(&mut self) {
        self.alive = false;
    }

    pub(crate) fn view(&self) -> TowerView {
        TowerView {
            id: self.id,
            kind: self.kind,
            tile: self.tile,
            range: self.range,
            damage: 0,
            fire_rate: Duration::ZERO,
            target: None,
            modifiers: Vec::new(),
            grants: Some(self.grants),
        }
    }

    fn sight(&self) -> Sight {
        Sight {
            origin: self.position,
            facing: None,
            cone: VisionCone::circle(self.range),
        }
    }
}

impl Behavior for BuffTower {
    fn advance(&mut self, ctx: &mut TickContext<'_>) -> Result<(), BehaviorError> {
        let modifier = TowerModifier::new(self.id, self.grants);
        for tower in ctx.population.towers_in_mut(&self.sight()) {
            let _ = tower.add_modifier(modifier);
        }
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.alive
    }

    fn vision(&self) -> Option<Sight> {
        Some(self.sight())
    }
}
