use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    command::{Command, Control},
    decoder::SequenceCounter,
    watch::WatchedPaths,
};

/// State shared between the producer loop and the control loop.
///
/// A single lock serializes every command against every batch of events:
/// the producer keeps it for the whole buffer returned by one read, so the
/// watched paths can't change halfway through a batch.
#[derive(Debug, Clone, Default)]
pub struct MonitorContext {
    inner: Arc<Mutex<MonitorState>>,
}

#[derive(Debug, Default)]
pub struct MonitorState {
    watched: WatchedPaths,
    sequence: SequenceCounter,
}

impl MonitorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the shared state. A panic of the other loop while holding the
    /// lock leaves the state consistent, so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, MonitorState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a command under the lock.
    pub fn apply(&self, command: &Command) -> Control {
        self.lock().apply(command)
    }

    /// Parse and run a control channel line. Unrecognized lines are ignored.
    pub fn apply_line(&self, line: &[u8]) -> Control {
        log::debug!("processing command \"{}\"", line.escape_ascii());
        match Command::parse(line) {
            Some(command) => self.apply(&command),
            None => {
                log::debug!("ignoring unknown command \"{}\"", line.escape_ascii());
                Control::Continue
            }
        }
    }
}

impl MonitorState {
    pub fn watched(&self) -> &WatchedPaths {
        &self.watched
    }

    /// Borrow the watched paths and the counter at the same time, as
    /// needed to decode and filter one batch.
    pub fn split(&mut self) -> (&WatchedPaths, &mut SequenceCounter) {
        (&self.watched, &mut self.sequence)
    }

    pub fn apply(&mut self, command: &Command) -> Control {
        match command {
            Command::Add(path) => {
                self.watched.add(path);
            }
            Command::Remove(path) => {
                self.watched.remove(path);
            }
            Command::Clear => self.watched.clear(),
            Command::Die => {
                log::debug!("terminating");
                return Control::Terminate;
            }
        }
        log::debug!("watched paths: {:?}", self.watched.snapshot());
        Control::Continue
    }
}
