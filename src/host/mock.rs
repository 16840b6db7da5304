// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! A host that doesn't play anything. Emitters record what they were asked to
//! do and time only moves when the clock is advanced.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use super::Emitter as _;
use super::{EmitterRef, EmitterSettings, HostError, Position, Task};

/// A mock emitter.
pub struct Emitter {
    id: u64,
    position: Option<Position>,
    settings: Mutex<Option<EmitterSettings>>,
    plays: Mutex<Vec<Duration>>,
    released: AtomicBool,
}

impl Emitter {
    /// Creates a standalone mock emitter, as a caller-owned emitter would be.
    pub fn new(id: u64, position: Option<Position>) -> Emitter {
        Emitter {
            id,
            position,
            settings: Mutex::new(None),
            plays: Mutex::new(Vec::new()),
            released: AtomicBool::new(false),
        }
    }

    /// The position the emitter was created at.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// The settings most recently configured on the emitter.
    pub fn settings(&self) -> Option<EmitterSettings> {
        self.settings.lock().clone()
    }

    /// The delays of every play call, in order.
    pub fn plays(&self) -> Vec<Duration> {
        self.plays.lock().clone()
    }

    /// Returns true once the factory has released this emitter.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Relaxed)
    }
}

impl super::Emitter for Emitter {
    fn id(&self) -> u64 {
        self.id
    }

    fn configure(&self, settings: &EmitterSettings) -> Result<(), HostError> {
        *self.settings.lock() = Some(settings.clone());
        Ok(())
    }

    fn play(&self, delay: Duration) -> Result<(), HostError> {
        if self.settings.lock().is_none() {
            return Err(HostError::Emitter {
                id: self.id,
                reason: "no clip configured".to_string(),
            });
        }
        self.plays.lock().push(delay);
        Ok(())
    }
}

impl fmt::Display for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Emitter #{} (Mock)", self.id)
    }
}

/// A mock emitter factory that keeps every emitter it created.
#[derive(Default)]
pub struct EmitterFactory {
    next_id: AtomicU64,
    created: Mutex<Vec<Arc<Emitter>>>,
    released: Mutex<Vec<u64>>,
    fail_creation: AtomicBool,
}

impl EmitterFactory {
    /// Creates a new mock factory.
    pub fn new() -> EmitterFactory {
        EmitterFactory::default()
    }

    /// Every emitter created so far, in creation order.
    pub fn created(&self) -> Vec<Arc<Emitter>> {
        self.created.lock().clone()
    }

    /// The IDs of every released emitter, in release order.
    pub fn released(&self) -> Vec<u64> {
        self.released.lock().clone()
    }

    /// Makes subsequent create calls fail.
    pub fn fail_creation(&self, fail: bool) {
        self.fail_creation.store(fail, Ordering::Relaxed);
    }
}

impl super::EmitterFactory for EmitterFactory {
    fn create(&self, position: Option<Position>) -> Result<EmitterRef, HostError> {
        if self.fail_creation.load(Ordering::Relaxed) {
            return Err(HostError::Create("mock factory told to fail".to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let emitter = Arc::new(Emitter::new(id, position));
        self.created.lock().push(emitter.clone());
        Ok(emitter)
    }

    fn release(&self, emitter: EmitterRef) {
        let id = emitter.id();
        if let Some(created) = self.created.lock().iter().find(|e| e.id == id) {
            created.released.store(true, Ordering::Relaxed);
        }
        self.released.lock().push(id);
    }
}

/// A clock that only moves when told to.
#[derive(Default)]
pub struct Clock {
    now: Mutex<Duration>,
}

impl Clock {
    /// Creates a clock at time zero.
    pub fn new() -> Clock {
        Clock::default()
    }

    fn advance(&self, by: Duration) -> Duration {
        let mut now = self.now.lock();
        *now += by;
        *now
    }
}

impl super::Clock for Clock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}

/// A scheduler driven by a mock clock. Tasks run from [`Scheduler::advance`]
/// once their due time is reached, earliest first.
pub struct Scheduler {
    clock: Arc<Clock>,
    /// Pending tasks keyed by (due time, submission order).
    tasks: Mutex<BTreeMap<(Duration, u64), Task>>,
    next_seq: AtomicU64,
}

impl Scheduler {
    /// Creates a scheduler that reads time from the given clock.
    pub fn new(clock: Arc<Clock>) -> Scheduler {
        Scheduler {
            clock,
            tasks: Mutex::new(BTreeMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    /// The due times of every pending task, earliest first.
    pub fn due_times(&self) -> Vec<Duration> {
        self.tasks.lock().keys().map(|(due, _)| *due).collect()
    }

    /// Moves the clock forward and runs every task that has become due.
    pub fn advance(&self, by: Duration) {
        let now = self.clock.advance(by);
        loop {
            // Take one task at a time so tasks may schedule more work.
            let next = {
                let mut tasks = self.tasks.lock();
                match tasks.keys().next().copied() {
                    Some(key) if key.0 <= now => tasks.remove(&key),
                    _ => None,
                }
            };

            match next {
                Some(task) => task(),
                None => break,
            }
        }
    }
}

impl super::Scheduler for Scheduler {
    fn schedule(&self, after: Duration, task: Task) {
        let due = super::Clock::now(self.clock.as_ref()).saturating_add(after);
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        debug!(due_ms = due.as_millis(), "Task scheduled (mock)");
        self.tasks.lock().insert((due, seq), task);
    }

    fn flush(&self) {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        for (_, task) in tasks {
            task();
        }
    }

    fn pending(&self) -> usize {
        self.tasks.lock().len()
    }
}

/// A fully mocked host, with typed handles to its parts for inspection.
pub struct MockHost {
    pub factory: Arc<EmitterFactory>,
    pub scheduler: Arc<Scheduler>,
    pub clock: Arc<Clock>,
}

impl MockHost {
    /// Creates a new mock host at time zero.
    pub fn new() -> MockHost {
        let clock = Arc::new(Clock::new());
        MockHost {
            factory: Arc::new(EmitterFactory::new()),
            scheduler: Arc::new(Scheduler::new(clock.clone())),
            clock,
        }
    }

    /// The host services backed by this mock.
    pub fn host(&self) -> super::Host {
        super::Host::new(
            self.factory.clone(),
            self.scheduler.clone(),
            self.clock.clone(),
        )
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}
