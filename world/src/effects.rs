use std::time::Duration;

use towerline_core::{EffectKind, StatusEffect};

#[derive(Clone, Copy, Debug)]
struct ActiveEffect {
    effect: StatusEffect,
    first_applied: Option<Duration>,
}

/// Timed status effects attached to a monster, at most one per kind.
#[derive(Clone, Debug, Default)]
pub(crate) struct EffectSet {
    active: Vec<ActiveEffect>,
}

impl EffectSet {
    /// Attaches a copy of the effect unless one of the same kind is active.
    pub(crate) fn attach(&mut self, effect: StatusEffect) -> bool {
        if self.active.iter().any(|active| active.effect.kind() == effect.kind()) {
            return false;
        }
        self.active.push(ActiveEffect {
            effect,
            first_applied: None,
        });
        true
    }

    /// Applies every effect to `speed` at simulated time `now`.
    ///
    /// An effect starts its timer the first time it is applied. Once the
    /// elapsed time exceeds its duration the speed returns to `max_speed` and
    /// the effect is dropped.
    pub(crate) fn apply(&mut self, now: Duration, max_speed: f32, speed: &mut f32) {
        self.active.retain_mut(|active| {
            let started = *active.first_applied.get_or_insert(now);
            if now.saturating_sub(started) > active.effect.duration() {
                *speed = max_speed;
                return false;
            }
            match active.effect.kind() {
                EffectKind::Slow => {
                    let kept = 100u32.saturating_sub(active.effect.intensity());
                    *speed = max_speed * kept as f32 / 100.0;
                }
            }
            true
        });
    }

    pub(crate) fn len(&self) -> usize {
        self.active.len()
    }
}
