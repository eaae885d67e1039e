//! Headless presenter that reports frames through `tracing`.

use anyhow::Result;
use towerline_rendering::{Layer, Presenter, Scene, TowerInteractionFeedback};
use tracing::{info, warn};

/// Logs a summary every `interval` frames and every new rejection.
#[derive(Debug)]
pub(crate) struct LogPresenter {
    interval: u64,
    frames: u64,
    last_feedback: Option<TowerInteractionFeedback>,
}

impl LogPresenter {
    pub(crate) fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            frames: 0,
            last_feedback: None,
        }
    }

    pub(crate) const fn frames(&self) -> u64 {
        self.frames
    }
}

impl Presenter for LogPresenter {
    fn present_frame(&mut self, scene: &Scene) -> Result<()> {
        if scene.tower_feedback.is_some() && scene.tower_feedback != self.last_feedback {
            warn!(feedback = ?scene.tower_feedback, tick = scene.hud.tick, "tower_action_rejected");
        }
        self.last_feedback = scene.tower_feedback;

        if self.frames % self.interval == 0 {
            info!(
                tick = scene.hud.tick,
                gold = scene.hud.gold,
                lives = scene.hud.lives,
                wave = ?scene.hud.wave_level,
                monsters = scene.count(Layer::Monsters),
                towers = scene.count(Layer::Towers),
                projectiles = scene.count(Layer::Projectiles),
                "frame"
            );
        }
        self.frames = self.frames.saturating_add(1);
        Ok(())
    }
}
