use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
    thread,
    time::{Duration, Instant},
};

const SLEEP_HISTORY: usize = 256;

/// Time source and blocking primitives used by the scheduler.
pub trait Clock {
    /// Monotonic time elapsed since the clock was created.
    fn now(&self) -> Duration;

    /// Blocks the calling thread for roughly `duration`.
    fn sleep(&mut self, duration: Duration);

    /// Offers the processor to other runnable threads.
    fn yield_now(&mut self);
}

/// Wall clock backed by [`Instant`] and the operating system scheduler.
///
/// Sleep resolution is platform dependent; the scheduler measures the actual
/// sleep and compensates on the next iteration.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose epoch is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }

    fn yield_now(&mut self) {
        thread::yield_now();
    }
}

#[derive(Debug, Default)]
struct ManualState {
    now: Duration,
    oversleep: Duration,
    sleeps: VecDeque<Duration>,
    yields: u64,
}

/// Deterministic clock that only moves when told to.
///
/// Clones share the same timeline, so loop callbacks can advance the clock to
/// simulate slow work while the scheduler reads it. Sleeping advances the
/// clock by the requested duration plus the configured oversleep.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    /// Creates a clock at time zero that sleeps exactly as requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock whose every sleep overshoots by `oversleep`.
    #[must_use]
    pub fn with_oversleep(oversleep: Duration) -> Self {
        let clock = Self::new();
        clock.with_state(|state| state.oversleep = oversleep);
        clock
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: Duration) {
        self.with_state(|state| state.now = state.now.saturating_add(duration));
    }

    /// Most recent sleep requests, oldest first.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.with_state(|state| state.sleeps.iter().copied().collect())
    }

    /// Number of cooperative yields performed.
    #[must_use]
    pub fn yields(&self) -> u64 {
        self.with_state(|state| state.yields)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut ManualState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.with_state(|state| state.now)
    }

    fn sleep(&mut self, duration: Duration) {
        self.with_state(|state| {
            state.now = state
                .now
                .saturating_add(duration)
                .saturating_add(state.oversleep);
            if state.sleeps.len() == SLEEP_HISTORY {
                let _ = state.sleeps.pop_front();
            }
            state.sleeps.push_back(duration);
        });
    }

    fn yield_now(&mut self) {
        self.with_state(|state| state.yields = state.yields.saturating_add(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let mut other = clock.clone();
        clock.advance(Duration::from_millis(5));
        other.sleep(Duration::from_millis(10));
        assert_eq!(clock.now(), Duration::from_millis(15));
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(10)]);
    }

    #[test]
    fn oversleep_is_added_to_every_sleep() {
        let mut clock = ManualClock::with_oversleep(Duration::from_micros(300));
        clock.sleep(Duration::from_millis(1));
        clock.yield_now();
        assert_eq!(clock.now(), Duration::from_micros(1_300));
        assert_eq!(clock.yields(), 1);
    }

    #[test]
    fn sleep_history_is_bounded() {
        let mut clock = ManualClock::new();
        for _ in 0..(SLEEP_HISTORY + 10) {
            clock.sleep(Duration::from_nanos(1));
        }
        assert_eq!(clock.sleeps().len(), SLEEP_HISTORY);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
