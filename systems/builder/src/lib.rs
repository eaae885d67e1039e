#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Builder system that carries player intents from the input thread to the
//! logic thread and translates them into world commands.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use thiserror::Error;
use towerline_core::{Command, EntityId, Event, Intent};
use tracing::debug;

/// Reports that the logic side of the queue is gone.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("intent queue closed, dropped {0:?}")]
pub struct QueueClosed(pub Intent);

/// Cloneable handle used by input threads to submit intents.
#[derive(Clone, Debug)]
pub struct IntentSender {
    sender: Sender<Intent>,
}

impl IntentSender {
    /// Queues an intent for the next tick.
    pub fn send(&self, intent: Intent) -> Result<(), QueueClosed> {
        self.sender.send(intent).map_err(|error| QueueClosed(error.0))
    }
}

/// Receiving end drained by the logic thread at the start of every tick.
#[derive(Debug)]
pub struct IntentQueue {
    receiver: Receiver<Intent>,
}

impl IntentQueue {
    /// Takes every intent queued since the last drain without blocking.
    #[must_use]
    pub fn drain(&self) -> Vec<Intent> {
        let mut intents = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(intent) => intents.push(intent),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        intents
    }
}

/// Creates a connected sender/queue pair.
#[must_use]
pub fn intent_channel() -> (IntentSender, IntentQueue) {
    let (sender, receiver) = mpsc::channel();
    (IntentSender { sender }, IntentQueue { receiver })
}

/// Pure system translating intents into commands.
#[derive(Debug, Default, Clone)]
pub struct Builder {
    game_over: bool,
}

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self { game_over: false }
    }

    /// Consumes world events and one intent to emit builder commands.
    ///
    /// `selected` should mirror the world's `query::selected` at the moment
    /// the intent is translated, so that a selection made earlier in the same
    /// drain is honoured.
    pub fn handle(
        &mut self,
        events: &[Event],
        intent: Intent,
        selected: Option<EntityId>,
        out: &mut Vec<Command>,
    ) {
        if events.iter().any(|event| matches!(event, Event::GameOver)) {
            self.game_over = true;
        }
        if self.game_over {
            debug!(?intent, "intent_after_game_over");
            return;
        }

        match intent {
            Intent::PlaceTower { kind, tile } => out.push(Command::PlaceTower { kind, tile }),
            Intent::SelectTower { tile } => out.push(Command::SelectTower { tile }),
            Intent::SellSelected => match selected {
                Some(tower) => out.push(Command::SellTower { tower }),
                None => debug!("sell_without_selection"),
            },
            Intent::UpgradeSelected => match selected {
                Some(tower) => out.push(Command::UpgradeTower { tower }),
                None => debug!("upgrade_without_selection"),
            },
        }
    }
}
