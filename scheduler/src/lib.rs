#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-timestep scheduler driving Towerline's logic, render and present steps.
//!
//! The scheduler runs logic updates at a fixed rate regardless of how long
//! rendering takes. Overruns accumulate as excess time that is paid back with
//! up to `max_frame_skips` logic-only catch-up updates per iteration; sleep
//! imprecision is measured and subtracted from the next iteration's budget;
//! and an overloaded loop yields the processor every `no_delays_per_yield`
//! iterations that could not afford to sleep.

mod clock;
mod rate;

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use thiserror::Error;
use tracing::{debug, info, warn};

pub use clock::{Clock, ManualClock, SystemClock};
pub use rate::{RateMeter, Rates};

/// Highest accepted update rate; faster requests are clamped.
pub const MAX_UPDATES_PER_SECOND: u32 = 1_000;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Rates and thresholds that govern the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    updates_per_second: u32,
    max_frame_skips: u32,
    no_delays_per_yield: u32,
}

impl SchedulerConfig {
    /// Creates a configuration with explicit values.
    #[must_use]
    pub const fn new(updates_per_second: u32, max_frame_skips: u32, no_delays_per_yield: u32) -> Self {
        Self {
            updates_per_second,
            max_frame_skips,
            no_delays_per_yield,
        }
    }

    /// Desired logic updates per second.
    #[must_use]
    pub const fn updates_per_second(&self) -> u32 {
        self.updates_per_second
    }

    /// Maximum catch-up updates run in a single iteration.
    #[must_use]
    pub const fn max_frame_skips(&self) -> u32 {
        self.max_frame_skips
    }

    /// Consecutive sleepless iterations after which the loop yields.
    #[must_use]
    pub const fn no_delays_per_yield(&self) -> u32 {
        self.no_delays_per_yield
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(80, 5, 16)
    }
}

/// Loop phase in which a callback failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopStage {
    /// One-off initialisation before the first iteration.
    Setup,
    /// Logic update, regular or catch-up.
    Logic,
    /// Frame production.
    Render,
    /// Frame presentation.
    Present,
    /// One-off cleanup after the last iteration.
    Teardown,
}

impl fmt::Display for LoopStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::Logic => "logic",
            Self::Render => "render",
            Self::Present => "present",
            Self::Teardown => "teardown",
        };
        f.write_str(name)
    }
}

/// Errors raised by the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The configuration cannot drive a loop.
    #[error("invalid scheduler configuration: {0}")]
    InvalidConfiguration(String),
    /// A callback failed; the loop stopped after running teardown.
    #[error("{stage} step failed")]
    Fault {
        /// Phase that failed.
        stage: LoopStage,
        /// Error returned by the callback.
        #[source]
        source: anyhow::Error,
    },
}

/// Callbacks invoked by the scheduler.
pub trait LoopSteps {
    /// Runs once before the first iteration.
    fn setup(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Advances the simulation by exactly one tick.
    fn process_logic(&mut self) -> anyhow::Result<()>;

    /// Produces a frame from the post-tick state.
    fn render(&mut self) -> anyhow::Result<()>;

    /// Presents the produced frame.
    fn present(&mut self) -> anyhow::Result<()>;

    /// Runs once after the last iteration, also when a callback failed.
    fn teardown(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Cloneable cooperative stop signal.
///
/// Stopping takes effect at the top of the next iteration.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Creates a handle in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the loop to stop.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Reports whether a stop was requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Counters collected over one run of the loop.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LoopReport {
    /// Completed iterations, each with one regular update, render and present.
    pub iterations: u64,
    /// Logic updates performed, catch-up updates included.
    pub logic_updates: u64,
    /// Catch-up updates performed.
    pub catch_up_updates: u64,
    /// Largest number of catch-up updates run in one iteration.
    pub max_catch_up_in_iteration: u32,
    /// Cooperative yields performed.
    pub yields: u64,
    /// Rates measured over the last complete one second window.
    pub last_rates: Option<Rates>,
}

/// Fixed-timestep loop over a [`Clock`].
#[derive(Debug)]
pub struct Scheduler<C: Clock> {
    config: SchedulerConfig,
    period_ns: i64,
    clock: C,
    stop: StopHandle,
    rates: RateMeter,
}

impl<C: Clock> Scheduler<C> {
    /// Validates the configuration and creates a scheduler.
    ///
    /// Update rates above [`MAX_UPDATES_PER_SECOND`] are clamped.
    pub fn new(config: SchedulerConfig, clock: C) -> Result<Self, SchedulerError> {
        if config.updates_per_second == 0 {
            return Err(SchedulerError::InvalidConfiguration(
                "updates_per_second must be at least 1".to_owned(),
            ));
        }
        if config.no_delays_per_yield == 0 {
            return Err(SchedulerError::InvalidConfiguration(
                "no_delays_per_yield must be at least 1".to_owned(),
            ));
        }

        let mut config = config;
        if config.updates_per_second > MAX_UPDATES_PER_SECOND {
            warn!(
                requested = config.updates_per_second,
                applied = MAX_UPDATES_PER_SECOND,
                "ups_clamped"
            );
            config.updates_per_second = MAX_UPDATES_PER_SECOND;
        }

        Ok(Self {
            period_ns: NANOS_PER_SECOND / i64::from(config.updates_per_second),
            config,
            clock,
            stop: StopHandle::new(),
            rates: RateMeter::default(),
        })
    }

    /// Effective configuration after clamping.
    #[must_use]
    pub const fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// Duration of one logic tick.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_nanos(u64::try_from(self.period_ns).unwrap_or_default())
    }

    /// Handle that stops the loop from callbacks or other threads.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Runs the loop until stopped or until a callback fails.
    ///
    /// `setup` runs once before the first iteration and `teardown` once on
    /// exit, also after a failure. The first failure is returned; a teardown
    /// failure that follows another failure is only logged.
    pub fn run<S: LoopSteps + ?Sized>(&mut self, steps: &mut S) -> Result<LoopReport, SchedulerError> {
        info!(
            ups = self.config.updates_per_second,
            max_frame_skips = self.config.max_frame_skips,
            no_delays_per_yield = self.config.no_delays_per_yield,
            period_ns = self.period_ns,
            "loop_config"
        );

        let mut report = LoopReport::default();
        let outcome = match steps.setup() {
            Ok(()) => self.iterate(steps, &mut report),
            Err(source) => Err(SchedulerError::Fault {
                stage: LoopStage::Setup,
                source,
            }),
        };
        let teardown = steps.teardown().map_err(|source| SchedulerError::Fault {
            stage: LoopStage::Teardown,
            source,
        });

        match (outcome, teardown) {
            (Err(error), Err(teardown_error)) => {
                warn!(error = %teardown_error, "teardown_failed_after_fault");
                Err(error)
            }
            (Err(error), Ok(())) | (Ok(()), Err(error)) => Err(error),
            (Ok(()), Ok(())) => {
                info!(
                    iterations = report.iterations,
                    logic_updates = report.logic_updates,
                    catch_up_updates = report.catch_up_updates,
                    yields = report.yields,
                    "loop_finished"
                );
                Ok(report)
            }
        }
    }

    fn iterate<S: LoopSteps + ?Sized>(
        &mut self,
        steps: &mut S,
        report: &mut LoopReport,
    ) -> Result<(), SchedulerError> {
        let period = self.period_ns;
        let mut excess: i64 = 0;
        let mut oversleep: i64 = 0;
        let mut no_delays: u32 = 0;

        while !self.stop.is_stopped() {
            let before = self.clock.now();

            let mut skips: u32 = 0;
            while excess > period && skips < self.config.max_frame_skips {
                excess -= period;
                steps.process_logic().map_err(fault(LoopStage::Logic))?;
                skips += 1;
            }

            steps.process_logic().map_err(fault(LoopStage::Logic))?;
            steps.render().map_err(fault(LoopStage::Render))?;
            steps.present().map_err(fault(LoopStage::Present))?;

            report.iterations = report.iterations.saturating_add(1);
            report.logic_updates = report.logic_updates.saturating_add(u64::from(skips) + 1);
            report.catch_up_updates = report.catch_up_updates.saturating_add(u64::from(skips));
            report.max_catch_up_in_iteration = report.max_catch_up_in_iteration.max(skips);

            let after = self.clock.now();
            if let Some(rates) = self.rates.record(after, skips + 1) {
                debug!(
                    ups = rates.updates_per_second,
                    fps = rates.frames_per_second,
                    "loop_rate"
                );
                report.last_rates = Some(rates);
            }

            let sleep_time = period - nanos(after.saturating_sub(before)) - oversleep;
            if sleep_time >= 0 {
                no_delays = 0;
                let requested = Duration::from_nanos(u64::try_from(sleep_time).unwrap_or_default());
                let sleep_start = self.clock.now();
                self.clock.sleep(requested);
                let slept = nanos(self.clock.now().saturating_sub(sleep_start));
                oversleep = slept - sleep_time;
            } else {
                excess = excess.saturating_sub(sleep_time);
                oversleep = 0;
                no_delays += 1;
                if no_delays >= self.config.no_delays_per_yield {
                    self.clock.yield_now();
                    report.yields = report.yields.saturating_add(1);
                    no_delays = 0;
                }
            }
        }

        Ok(())
    }
}

fn fault(stage: LoopStage) -> impl FnOnce(anyhow::Error) -> SchedulerError {
    move |source| SchedulerError::Fault { stage, source }
}

fn nanos(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX)
}
