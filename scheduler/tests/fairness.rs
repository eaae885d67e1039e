use std::{thread, time::Duration};

use anyhow::bail;
use towerline_scheduler::{
    LoopStage, LoopSteps, ManualClock, Scheduler, SchedulerConfig, SchedulerError, StopHandle,
    SystemClock,
};

/// Steps whose every logic update costs a fixed amount of manual-clock time.
struct SlowSteps {
    clock: ManualClock,
    logic_cost: Duration,
    iterations_wanted: u64,
    frames: u64,
    logic_updates: u64,
    logic_since_frame: u32,
    max_logic_between_frames: u32,
    setups: u32,
    teardowns: u32,
    fail_on_logic: Option<u64>,
    stop: StopHandle,
}

impl SlowSteps {
    fn new(clock: ManualClock, logic_cost: Duration, iterations_wanted: u64, stop: StopHandle) -> Self {
        Self {
            clock,
            logic_cost,
            iterations_wanted,
            frames: 0,
            logic_updates: 0,
            logic_since_frame: 0,
            max_logic_between_frames: 0,
            setups: 0,
            teardowns: 0,
            fail_on_logic: None,
            stop,
        }
    }
}

impl LoopSteps for SlowSteps {
    fn setup(&mut self) -> anyhow::Result<()> {
        self.setups += 1;
        Ok(())
    }

    fn process_logic(&mut self) -> anyhow::Result<()> {
        self.logic_updates += 1;
        self.logic_since_frame += 1;
        if self.fail_on_logic == Some(self.logic_updates) {
            bail!("logic update {} exploded", self.logic_updates);
        }
        self.clock.advance(self.logic_cost);
        Ok(())
    }

    fn render(&mut self) -> anyhow::Result<()> {
        self.frames += 1;
        self.max_logic_between_frames = self.max_logic_between_frames.max(self.logic_since_frame);
        self.logic_since_frame = 0;
        Ok(())
    }

    fn present(&mut self) -> anyhow::Result<()> {
        if self.frames >= self.iterations_wanted {
            self.stop.stop();
        }
        Ok(())
    }

    fn teardown(&mut self) -> anyhow::Result<()> {
        self.teardowns += 1;
        Ok(())
    }
}

#[test]
fn overloaded_loop_stays_within_catch_up_bounds() {
    const ITERATIONS: u64 = 200;
    const MAX_SKIPS: u32 = 5;

    let clock = ManualClock::new();
    let config = SchedulerConfig::new(50, MAX_SKIPS, 16);
    let mut scheduler = Scheduler::new(config, clock.clone()).expect("scheduler");
    let period = scheduler.period();
    let mut steps = SlowSteps::new(clock, period * 3, ITERATIONS, scheduler.stop_handle());

    let report = scheduler.run(&mut steps).expect("run");

    assert_eq!(report.iterations, ITERATIONS);
    assert_eq!(report.logic_updates, steps.logic_updates);
    assert!(report.logic_updates >= ITERATIONS);
    assert!(report.logic_updates <= ITERATIONS + ITERATIONS * u64::from(MAX_SKIPS));
    assert!(report.max_catch_up_in_iteration <= MAX_SKIPS);
    assert!(steps.max_logic_between_frames <= MAX_SKIPS + 1);
    assert!(report.catch_up_updates > 0, "excess should trigger catch-up updates");
}

#[test]
fn sleepless_iterations_yield_periodically() {
    let clock = ManualClock::new();
    let config = SchedulerConfig::new(100, 0, 4);
    let mut scheduler = Scheduler::new(config, clock.clone()).expect("scheduler");
    let period = scheduler.period();
    let mut steps = SlowSteps::new(clock.clone(), period * 2, 20, scheduler.stop_handle());

    let report = scheduler.run(&mut steps).expect("run");

    assert_eq!(report.catch_up_updates, 0, "no skips allowed");
    assert_eq!(report.yields, 5);
    assert_eq!(clock.yields(), 5);
    assert!(clock.sleeps().is_empty());
}

#[test]
fn lifecycle_callbacks_run_exactly_once() {
    let clock = ManualClock::new();
    let mut scheduler = Scheduler::new(SchedulerConfig::default(), clock.clone()).expect("scheduler");
    let mut steps = SlowSteps::new(clock, Duration::ZERO, 7, scheduler.stop_handle());

    let report = scheduler.run(&mut steps).expect("run");

    assert_eq!(report.iterations, 7);
    assert_eq!((steps.setups, steps.teardowns), (1, 1));
}

#[test]
fn logic_failure_stops_the_loop_and_still_tears_down() {
    let clock = ManualClock::new();
    let mut scheduler = Scheduler::new(SchedulerConfig::default(), clock.clone()).expect("scheduler");
    let mut steps = SlowSteps::new(clock, Duration::ZERO, 100, scheduler.stop_handle());
    steps.fail_on_logic = Some(3);

    let error = scheduler.run(&mut steps).expect_err("logic failure");

    match error {
        SchedulerError::Fault { stage, source } => {
            assert_eq!(stage, LoopStage::Logic);
            assert!(source.to_string().contains("logic update 3"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(steps.logic_updates, 3, "failed update is not retried");
    assert_eq!(steps.frames, 2);
    assert_eq!(steps.teardowns, 1);
}

struct FailingSetup {
    teardowns: u32,
    updates: u32,
}

impl LoopSteps for FailingSetup {
    fn setup(&mut self) -> anyhow::Result<()> {
        bail!("no assets")
    }

    fn process_logic(&mut self) -> anyhow::Result<()> {
        self.updates += 1;
        Ok(())
    }

    fn render(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn present(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn teardown(&mut self) -> anyhow::Result<()> {
        self.teardowns += 1;
        Ok(())
    }
}

#[test]
fn setup_failure_skips_iterations_but_runs_teardown() {
    let mut scheduler = Scheduler::new(SchedulerConfig::default(), ManualClock::new()).expect("scheduler");
    let mut steps = FailingSetup {
        teardowns: 0,
        updates: 0,
    };

    let error = scheduler.run(&mut steps).expect_err("setup failure");

    assert!(matches!(
        error,
        SchedulerError::Fault {
            stage: LoopStage::Setup,
            ..
        }
    ));
    assert_eq!(steps.updates, 0);
    assert_eq!(steps.teardowns, 1);
}

struct Counting {
    updates: u64,
}

impl LoopSteps for Counting {
    fn process_logic(&mut self) -> anyhow::Result<()> {
        self.updates += 1;
        Ok(())
    }

    fn render(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn present(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[test]
fn stop_from_another_thread_ends_a_real_time_loop() {
    let mut scheduler =
        Scheduler::new(SchedulerConfig::new(200, 5, 16), SystemClock::new()).expect("scheduler");
    let stop = scheduler.stop_handle();
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        stop.stop();
    });

    let mut steps = Counting { updates: 0 };
    let report = scheduler.run(&mut steps).expect("run");
    stopper.join().expect("stopper thread");

    assert!(report.iterations > 0);
    assert_eq!(report.logic_updates, steps.updates);
}
