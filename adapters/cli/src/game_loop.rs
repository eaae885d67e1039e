//! Loop callbacks tying the simulation to the scheduler.

use std::sync::Arc;

use anyhow::Result;
use towerline_core::Economy;
use towerline_rendering::{Presenter, Scene};
use towerline_scheduler::{LoopSteps, StopHandle};
use towerline_simulation::Simulation;
use towerline_world::query;
use tracing::info;

use crate::{presenter::LogPresenter, scene, script::TickBeacon};

pub(crate) struct GameLoop {
    simulation: Simulation,
    presenter: LogPresenter,
    stop: StopHandle,
    beacon: Arc<TickBeacon>,
    tick_limit: Option<u64>,
    scene: Option<Scene>,
}

impl GameLoop {
    pub(crate) fn new(
        simulation: Simulation,
        presenter: LogPresenter,
        stop: StopHandle,
        beacon: Arc<TickBeacon>,
        tick_limit: Option<u64>,
    ) -> Self {
        Self {
            simulation,
            presenter,
            stop,
            beacon,
            tick_limit,
            scene: None,
        }
    }

    fn limit_reached(&self) -> bool {
        self.tick_limit
            .is_some_and(|limit| query::tick_index(self.simulation.world()) >= limit)
    }
}

impl LoopSteps for GameLoop {
    fn setup(&mut self) -> Result<()> {
        let world = self.simulation.world();
        info!(
            columns = query::config(world).columns(),
            rows = query::config(world).rows(),
            gold = query::player(world).gold(),
            lives = query::player(world).lives(),
            tick_ms = self.simulation.tick_length().as_secs_f64() * 1_000.0,
            tick_limit = ?self.tick_limit,
            "game_started"
        );
        Ok(())
    }

    fn process_logic(&mut self) -> Result<()> {
        if self.limit_reached() || self.simulation.is_game_over() {
            self.stop.stop();
            return Ok(());
        }

        self.beacon
            .sync(query::tick_index(self.simulation.world()));
        let _ = self.simulation.step();

        if self.limit_reached() || self.simulation.is_game_over() {
            self.stop.stop();
        }
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        self.scene = Some(scene::capture(
            self.simulation.world(),
            self.simulation.last_events(),
        )?);
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        match &self.scene {
            Some(scene) => self.presenter.present_frame(scene),
            None => Ok(()),
        }
    }

    fn teardown(&mut self) -> Result<()> {
        self.beacon.close();
        let world = self.simulation.world();
        let paths = query::path_cache(world);
        info!(
            ticks = query::tick_index(world),
            frames = self.presenter.frames(),
            wave = ?query::wave(world).map(|wave| wave.level),
            waves_exhausted = self.simulation.spawning().is_exhausted(),
            gold = query::player(world).gold(),
            lives = query::player(world).lives(),
            game_over = self.simulation.is_game_over(),
            path_hits = paths.hits(),
            path_misses = paths.misses(),
            "game_finished"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use towerline_rendering::AssetCatalog;
    use towerline_scheduler::{ManualClock, Scheduler, SchedulerConfig};
    use towerline_system_builder::intent_channel;
    use towerline_system_spawning::{campaign, Config, Spawning};
    use towerline_world::{World, WorldConfig};

    use super::*;

    #[test]
    fn loop_stops_at_the_tick_limit() {
        let mut scheduler = Scheduler::new(SchedulerConfig::default(), ManualClock::new()).expect("scheduler");
        let world = World::new(WorldConfig::default(), Arc::new(AssetCatalog::new())).expect("world");
        let (_sender, queue) = intent_channel();
        let simulation = Simulation::new(
            world,
            Spawning::new(campaign(), Config::new(3)),
            queue,
            scheduler.period(),
        );
        let mut game = GameLoop::new(
            simulation,
            LogPresenter::new(100),
            scheduler.stop_handle(),
            Arc::new(TickBeacon::default()),
            Some(40),
        );

        let report = scheduler.run(&mut game).expect("run");

        assert_eq!(query::tick_index(game.simulation.world()), 40);
        assert_eq!(query::now(game.simulation.world()), Duration::from_millis(500));
        assert_eq!(report.iterations, 40);
        assert_eq!(game.presenter.frames(), 40);
    }
}
