//! TOML configuration of a headless run.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use towerline_core::Intent;
use towerline_scheduler::SchedulerConfig;
use towerline_system_spawning::{Config as SpawningConfig, DEFAULT_INTER_WAVE_DELAY};
use towerline_world::WorldConfig;

/// Whole configuration file; every section and field is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) map: MapSection,
    pub(crate) player: PlayerSection,
    pub(crate) scheduler: SchedulerSection,
    pub(crate) waves: WavesSection,
    pub(crate) script: Vec<ScriptEntry>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MapSection {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) tile_size: f32,
    pub(crate) lane_top: u32,
    pub(crate) lane_rows: u32,
    pub(crate) corner_cutting: bool,
}

impl Default for MapSection {
    fn default() -> Self {
        let world = WorldConfig::new();
        Self {
            columns: world.columns(),
            rows: world.rows(),
            tile_size: world.tile_size(),
            lane_top: world.lane_top(),
            lane_rows: world.lane_rows(),
            corner_cutting: world.corner_cutting(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlayerSection {
    pub(crate) gold: u32,
    pub(crate) lives: u32,
}

impl Default for PlayerSection {
    fn default() -> Self {
        let world = WorldConfig::new();
        Self {
            gold: world.gold(),
            lives: world.lives(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SchedulerSection {
    pub(crate) ups: u32,
    pub(crate) max_frame_skips: u32,
    pub(crate) no_delays_per_yield: u32,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        let scheduler = SchedulerConfig::default();
        Self {
            ups: scheduler.updates_per_second(),
            max_frame_skips: scheduler.max_frame_skips(),
            no_delays_per_yield: scheduler.no_delays_per_yield(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WavesSection {
    pub(crate) inter_wave_delay_secs: f64,
    pub(crate) seed: u64,
}

impl Default for WavesSection {
    fn default() -> Self {
        Self {
            inter_wave_delay_secs: DEFAULT_INTER_WAVE_DELAY.as_secs_f64(),
            seed: 0x7077_e41e,
        }
    }
}

/// Intent fed to the input thread once the simulation reaches `tick`.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptEntry {
    pub(crate) tick: u64,
    pub(crate) intent: Intent,
}

impl GameConfig {
    /// Reads and parses a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(text)?;
        config.script.sort_by_key(|entry| entry.tick);
        Ok(config)
    }

    pub(crate) fn world_config(&self) -> WorldConfig {
        let MapSection {
            columns,
            rows,
            tile_size,
            lane_top,
            lane_rows,
            corner_cutting,
        } = self.map;
        WorldConfig::new()
            .with_grid(columns, rows, tile_size)
            .with_lane(lane_top, lane_rows)
            .with_purse(self.player.gold, self.player.lives)
            .with_corner_cutting(corner_cutting)
    }

    pub(crate) fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::new(
            self.scheduler.ups,
            self.scheduler.max_frame_skips,
            self.scheduler.no_delays_per_yield,
        )
    }

    pub(crate) fn spawning_config(&self) -> Result<SpawningConfig> {
        let delay = Duration::try_from_secs_f64(self.waves.inter_wave_delay_secs)
            .context("waves.inter_wave_delay_secs must be a non-negative number of seconds")?;
        Ok(SpawningConfig::new(self.waves.seed).with_inter_wave_delay(delay))
    }
}
