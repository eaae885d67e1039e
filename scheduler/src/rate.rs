use std::time::Duration;

const WINDOW: Duration = Duration::from_secs(1);

/// Achieved loop rates over the last measurement window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rates {
    /// Logic updates per second, catch-up updates included.
    pub updates_per_second: f32,
    /// Rendered frames per second.
    pub frames_per_second: f32,
}

/// Counts logic updates and frames and reports their rate once per second.
#[derive(Clone, Debug, Default)]
pub struct RateMeter {
    window_start: Option<Duration>,
    updates: u32,
    frames: u32,
}

impl RateMeter {
    /// Records one loop iteration that ran `updates` logic updates and one
    /// frame, returning the rates once a full window has elapsed.
    pub fn record(&mut self, now: Duration, updates: u32) -> Option<Rates> {
        let start = *self.window_start.get_or_insert(now);
        self.updates = self.updates.saturating_add(updates);
        self.frames = self.frames.saturating_add(1);

        let elapsed = now.saturating_sub(start);
        if elapsed < WINDOW {
            return None;
        }

        let seconds = elapsed.as_secs_f32();
        let rates = Rates {
            updates_per_second: self.updates as f32 / seconds,
            frames_per_second: self.frames as f32 / seconds,
        };
        self.window_start = Some(now);
        self.updates = 0;
        self.frames = 0;
        Some(rates)
    }
}
