#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system that walks a wave schedule and emits monster
//! spawn commands.
//!
//! The system is driven once per tick with the simulated clock. It never
//! touches the world directly; the orchestrator applies the emitted commands.

mod campaign;

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use towerline_core::{Command, MonsterKind};
use tracing::debug;

pub use campaign::campaign;

/// Time a finished wave waits, counted from its start, before the next one
/// begins.
pub const DEFAULT_INTER_WAVE_DELAY: Duration = Duration::from_secs(20);

/// Describes a single wave of monsters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveDirective {
    /// Template every monster of the wave is built from.
    pub monster: MonsterKind,
    /// Total number of monsters released by the wave.
    pub count: u32,
    /// Monsters released together whenever the spawn interval elapses.
    pub batch_size: u32,
    /// Minimum simulated time between two batches.
    pub spawn_interval: Duration,
    /// Indicates whether the monsters receive boss scaling.
    pub boss: bool,
    /// Difficulty level used to scale health and reward.
    pub level: u32,
}

impl WaveDirective {
    /// A wave that releases nothing and only gives the player time to build.
    #[must_use]
    pub const fn rest(level: u32) -> Self {
        Self {
            monster: MonsterKind::Basic,
            count: 0,
            batch_size: 0,
            spawn_interval: Duration::ZERO,
            boss: false,
            level,
        }
    }
}

/// Errors raised while assembling a wave schedule.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The schedule contains no waves at all.
    #[error("a wave schedule needs at least one wave")]
    Empty,
    /// A wave with monsters would release them in batches of zero.
    #[error("wave {level} has monsters but a batch size of zero")]
    ZeroBatch {
        /// Level of the offending wave.
        level: u32,
    },
}

/// Ordered list of waves played one after another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveSchedule {
    waves: Vec<WaveDirective>,
}

impl WaveSchedule {
    /// Validates the waves and orders them by level.
    pub fn new(mut waves: Vec<WaveDirective>) -> Result<Self, ScheduleError> {
        if waves.is_empty() {
            return Err(ScheduleError::Empty);
        }
        if let Some(wave) = waves.iter().find(|wave| wave.count > 0 && wave.batch_size == 0) {
            return Err(ScheduleError::ZeroBatch { level: wave.level });
        }
        waves.sort_by_key(|wave| wave.level);
        Ok(Self { waves })
    }

    /// Number of waves in the schedule.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Reports whether the schedule holds no waves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Wave stored at `index`.
    #[must_use]
    pub fn wave(&self, index: usize) -> Option<&WaveDirective> {
        self.waves.get(index)
    }

    /// Iterates the waves in play order.
    pub fn iter(&self) -> impl Iterator<Item = &WaveDirective> {
        self.waves.iter()
    }
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    inter_wave_delay: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration with the default inter-wave delay.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            inter_wave_delay: DEFAULT_INTER_WAVE_DELAY,
            rng_seed,
        }
    }

    /// Overrides the delay between the start of a finished wave and the next.
    #[must_use]
    pub const fn with_inter_wave_delay(mut self, delay: Duration) -> Self {
        self.inter_wave_delay = delay;
        self
    }

    /// Delay between the start of a finished wave and the next.
    #[must_use]
    pub const fn inter_wave_delay(&self) -> Duration {
        self.inter_wave_delay
    }

    /// Seed of the lane offset generator.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

/// Pure system that deterministically releases the scheduled waves.
#[derive(Debug)]
pub struct Spawning {
    schedule: WaveSchedule,
    inter_wave_delay: Duration,
    rng: ChaCha8Rng,
    current: Option<usize>,
    remaining: u32,
    last_spawn: Option<Duration>,
    wave_started: Duration,
}

impl Spawning {
    /// Creates a spawning system that will play `schedule` from its first wave.
    #[must_use]
    pub fn new(schedule: WaveSchedule, config: Config) -> Self {
        Self {
            schedule,
            inter_wave_delay: config.inter_wave_delay,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            current: None,
            remaining: 0,
            last_spawn: None,
            wave_started: Duration::ZERO,
        }
    }

    /// Wave currently being played, `None` before the first tick.
    #[must_use]
    pub fn current_wave(&self) -> Option<&WaveDirective> {
        self.current.and_then(|index| self.schedule.wave(index))
    }

    /// Monsters of the current wave still waiting to be released.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Reports whether the final wave is active and fully released.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0 && self.current.is_some_and(|index| index + 1 >= self.schedule.len())
    }

    /// Emits the commands due at simulated time `now`.
    ///
    /// `lane_band` is the `(top, height)` pixel band of the entry lane; every
    /// monster enters at `x = 0` with a seeded random offset inside it.
    pub fn handle(&mut self, now: Duration, lane_band: (f32, f32), out: &mut Vec<Command>) {
        let index = match self.current {
            Some(index) => index,
            None => {
                self.start(0, now, out);
                0
            }
        };
        let Some(&wave) = self.schedule.wave(index) else {
            return;
        };

        self.release(&wave, now, lane_band, out);

        let waited = now.saturating_sub(self.wave_started);
        if self.remaining == 0 && waited >= self.inter_wave_delay && index + 1 < self.schedule.len() {
            self.start(index + 1, now, out);
        }
    }

    fn start(&mut self, index: usize, now: Duration, out: &mut Vec<Command>) {
        let Some(wave) = self.schedule.wave(index) else {
            return;
        };
        self.current = Some(index);
        self.remaining = wave.count;
        self.last_spawn = None;
        self.wave_started = now;
        debug!(wave = index, level = wave.level, count = wave.count, "wave_scheduled");
        out.push(Command::AnnounceWave {
            level: wave.level,
            boss: wave.boss,
        });
    }

    fn release(&mut self, wave: &WaveDirective, now: Duration, lane_band: (f32, f32), out: &mut Vec<Command>) {
        if self.remaining == 0 {
            return;
        }
        if let Some(last) = self.last_spawn {
            if now.saturating_sub(last) <= wave.spawn_interval {
                return;
            }
        }

        let batch = wave.batch_size.min(self.remaining);
        for _ in 0..batch {
            let position = Vec2::new(0.0, self.lane_offset(lane_band));
            out.push(Command::SpawnMonster {
                kind: wave.monster,
                level: wave.level,
                boss: wave.boss,
                position,
            });
        }
        self.remaining -= batch;
        self.last_spawn = Some(now);
        debug!(level = wave.level, batch, remaining = self.remaining, "wave_batch_released");
    }

    fn lane_offset(&mut self, (top, height): (f32, f32)) -> f32 {
        if height > 0.0 {
            top + self.rng.gen_range(0.0..height)
        } else {
            top
        }
    }
}
