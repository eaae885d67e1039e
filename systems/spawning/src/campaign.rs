use std::time::Duration;

use towerline_core::MonsterKind::{self, Basic, Fast, Immune};

use crate::{WaveDirective, WaveSchedule};

const fn wave(count: u32, monster: MonsterKind, level: u32, interval_ms: u64, batch_size: u32) -> WaveDirective {
    WaveDirective {
        monster,
        count,
        batch_size,
        spawn_interval: Duration::from_millis(interval_ms),
        boss: false,
        level,
    }
}

const fn boss(count: u32, monster: MonsterKind, level: u32, interval_ms: u64) -> WaveDirective {
    WaveDirective {
        boss: true,
        ..wave(count, monster, level, interval_ms, 1)
    }
}

const CAMPAIGN: [WaveDirective; 31] = [
    WaveDirective::rest(0),
    wave(5, Basic, 1, 500, 1),
    wave(5, Fast, 2, 500, 1),
    wave(10, Basic, 3, 500, 5),
    wave(5, Fast, 4, 1000, 1),
    wave(15, Immune, 5, 1000, 1),
    wave(5, Fast, 6, 10, 1),
    wave(20, Basic, 7, 500, 1),
    wave(5, Basic, 8, 1000, 1),
    wave(25, Fast, 9, 500, 1),
    boss(5, Basic, 10, 1000),
    wave(30, Fast, 11, 500, 1),
    wave(10, Immune, 12, 500, 1),
    wave(35, Basic, 13, 500, 5),
    wave(10, Fast, 14, 1000, 1),
    wave(40, Immune, 15, 1000, 1),
    wave(10, Fast, 16, 10, 1),
    wave(45, Basic, 17, 500, 1),
    wave(10, Basic, 18, 1000, 1),
    wave(60, Immune, 19, 500, 1),
    wave(65, Fast, 20, 1000, 1),
    wave(65, Fast, 21, 500, 1),
    wave(70, Immune, 22, 500, 1),
    wave(70, Basic, 23, 500, 5),
    wave(75, Fast, 24, 500, 1),
    wave(75, Immune, 25, 500, 1),
    wave(80, Fast, 26, 10, 1),
    wave(80, Basic, 27, 500, 1),
    wave(85, Fast, 28, 500, 1),
    wave(85, Fast, 29, 500, 1),
    boss(90, Immune, 30, 1000),
];

/// The stock campaign: a quiet opening wave followed by thirty levels of
/// growing difficulty, with boss waves at levels 10 and 30.
#[must_use]
pub fn campaign() -> WaveSchedule {
    WaveSchedule {
        waves: CAMPAIGN.to_vec(),
    }
}
