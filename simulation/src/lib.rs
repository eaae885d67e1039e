#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Orchestrates one Towerline tick over the world and its systems.
//!
//! A step drains the intents queued by the input thread, lets the spawning
//! system release monsters and finally runs the world's AI and reap passes.
//! Once the world reports game over further steps do nothing.

use std::time::Duration;

use towerline_core::{Command, Event};
use towerline_system_builder::{Builder, IntentQueue};
use towerline_system_spawning::Spawning;
use towerline_world::{self as world, query, World};
use tracing::trace;

/// World plus the systems that feed it commands.
pub struct Simulation {
    world: World,
    spawning: Spawning,
    builder: Builder,
    intents: IntentQueue,
    tick_length: Duration,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates a simulation that advances the clock by `tick_length` per step.
    #[must_use]
    pub fn new(world: World, spawning: Spawning, intents: IntentQueue, tick_length: Duration) -> Self {
        Self {
            world,
            spawning,
            builder: Builder::new(),
            intents,
            tick_length,
            events: Vec::new(),
        }
    }

    /// Runs one tick and returns the events it produced.
    pub fn step(&mut self) -> &[Event] {
        let previous = std::mem::take(&mut self.events);
        if query::is_game_over(&self.world) {
            return &self.events;
        }

        let intents = self.intents.drain();
        let intent_count = intents.len();
        for intent in intents {
            let mut commands = Vec::new();
            self.builder
                .handle(&previous, intent, query::selected(&self.world), &mut commands);
            self.apply_all(commands);
        }

        let mut commands = Vec::new();
        self.spawning.handle(
            query::now(&self.world),
            query::layout(&self.world).lane_band(),
            &mut commands,
        );
        self.apply_all(commands);

        world::apply(
            &mut self.world,
            Command::Tick {
                dt: self.tick_length,
            },
            &mut self.events,
        );
        trace!(
            tick = query::tick_index(&self.world),
            intents = intent_count,
            events = self.events.len(),
            "step_completed"
        );
        &self.events
    }

    fn apply_all(&mut self, commands: Vec<Command>) {
        for command in commands {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    /// Events produced by the most recent step.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.events
    }

    /// Read-only access to the world for queries and rendering.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the wave progress.
    #[must_use]
    pub fn spawning(&self) -> &Spawning {
        &self.spawning
    }

    /// Simulated time covered by one step.
    #[must_use]
    pub const fn tick_length(&self) -> Duration {
        self.tick_length
    }

    /// Reports whether the player ran out of lives.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        query::is_game_over(&self.world)
    }
}
