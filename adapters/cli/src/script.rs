//! Input thread replaying scripted intents in lockstep with the logic loop.
//!
//! Before running a tick the loop publishes how many ticks completed and waits
//! until the input thread has queued every intent due by then. An entry with
//! `tick = n` is therefore applied at the start of tick `n + 1`, however the
//! two threads are scheduled.

use std::{
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    thread::{self, JoinHandle},
};

use anyhow::{Context, Result};
use towerline_system_builder::IntentSender;
use tracing::{debug, warn};

use crate::config::ScriptEntry;

#[derive(Debug, Default)]
struct Progress {
    published: u64,
    acknowledged: Option<u64>,
    finished: bool,
    closed: bool,
}

/// Rendezvous between the logic loop and the input thread.
#[derive(Debug, Default)]
pub(crate) struct TickBeacon {
    progress: Mutex<Progress>,
    changed: Condvar,
}

impl TickBeacon {
    /// Publishes the completed tick count and blocks until every intent due
    /// by then was queued, or the input thread has nothing left to send.
    pub(crate) fn sync(&self, completed: u64) {
        let mut progress = self.lock();
        progress.published = completed;
        self.changed.notify_all();
        let _progress = self
            .changed
            .wait_while(progress, |progress| {
                !progress.finished
                    && !progress.closed
                    && progress.acknowledged.map_or(true, |tick| tick < completed)
            })
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Releases the input thread; no further ticks will be published.
    pub(crate) fn close(&self) {
        self.lock().closed = true;
        self.changed.notify_all();
    }

    /// Waits for a tick count newer than `seen`; `None` once closed.
    fn wait_beyond(&self, seen: Option<u64>) -> Option<u64> {
        let progress = self
            .changed
            .wait_while(self.lock(), |progress| {
                !progress.closed && seen.is_some_and(|seen| progress.published <= seen)
            })
            .unwrap_or_else(PoisonError::into_inner);
        (!progress.closed).then_some(progress.published)
    }

    fn acknowledge(&self, tick: u64) {
        self.lock().acknowledged = Some(tick);
        self.changed.notify_all();
    }

    fn finish(&self) {
        self.lock().finished = true;
        self.changed.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Starts the input thread replaying `entries`, which must be sorted by tick.
pub(crate) fn spawn_script(
    entries: Vec<ScriptEntry>,
    sender: IntentSender,
    beacon: Arc<TickBeacon>,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("input".to_owned())
        .spawn(move || {
            replay(entries, &sender, &beacon);
            beacon.finish();
        })
        .context("failed to start the input thread")
}

fn replay(entries: Vec<ScriptEntry>, sender: &IntentSender, beacon: &TickBeacon) {
    let mut pending = entries.into_iter().peekable();
    let mut seen = None;
    while pending.peek().is_some() {
        let Some(tick) = beacon.wait_beyond(seen) else {
            debug!(left = pending.count(), "script_abandoned");
            return;
        };
        while let Some(entry) = pending.next_if(|entry| entry.tick <= tick) {
            if let Err(error) = sender.send(entry.intent) {
                warn!(%error, "script_stopped");
                return;
            }
            debug!(tick = entry.tick, intent = ?entry.intent, "script_intent_sent");
        }
        beacon.acknowledge(tick);
        seen = Some(tick);
    }
}
