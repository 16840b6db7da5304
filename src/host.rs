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

//! The seams between the dispatcher and whatever actually renders audio.
//!
//! A host provides emitters (created and released through an [`EmitterFactory`]),
//! a [`Scheduler`] for deferred work and a [`Clock`].

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::clip::ClipRef;

pub mod log;
pub mod mock;
pub mod thread;

/// Errors reported by a host while acquiring or driving an emitter.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HostError {
    #[error("unable to create emitter: {0}")]
    Create(String),

    #[error("emitter {id} failed: {reason}")]
    Emitter { id: u64, reason: String },
}

/// A point in space an emitter can be placed at.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    /// Creates a new position.
    pub fn new(x: f32, y: f32, z: f32) -> Position {
        Position { x, y, z }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl FromStr for Position {
    type Err = String;

    /// Parses a position in the form `x,y,z`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(format!("malformed position '{}', expected x,y,z", s));
        }

        let mut coords = [0.0f32; 3];
        for (coord, part) in coords.iter_mut().zip(parts) {
            *coord = part
                .parse()
                .map_err(|e| format!("malformed coordinate '{}': {}", part, e))?;
        }
        Ok(Position::new(coords[0], coords[1], coords[2]))
    }
}

/// Everything an emitter needs to know before it is triggered.
#[derive(Debug, Clone)]
pub struct EmitterSettings {
    /// The clip to play.
    pub clip: ClipRef,
    /// Volume scalar, 1.0 is unchanged.
    pub volume: f32,
    /// Pitch scalar, 1.0 is unchanged.
    pub pitch: f32,
    /// Where in the clip playback starts.
    pub offset: Duration,
}

/// A playback target that renders one clip at a time.
pub trait Emitter: Any + fmt::Display + Send + Sync {
    /// A host-unique identifier for this emitter.
    fn id(&self) -> u64;

    /// Loads the clip and playback parameters into the emitter.
    fn configure(&self, settings: &EmitterSettings) -> Result<(), HostError>;

    /// Starts playback of the configured clip once `delay` has elapsed.
    fn play(&self, delay: Duration) -> Result<(), HostError>;
}

/// A shared handle to an emitter.
pub type EmitterRef = Arc<dyn Emitter>;

/// Creates and disposes of transient emitters.
pub trait EmitterFactory: Send + Sync {
    /// Creates a new emitter, optionally placed at a position.
    fn create(&self, position: Option<Position>) -> Result<EmitterRef, HostError>;

    /// Disposes of an emitter previously returned by [`EmitterFactory::create`].
    fn release(&self, emitter: EmitterRef);
}

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs work after a delay without blocking the caller.
pub trait Scheduler: Send + Sync {
    /// Runs `task` once `after` has elapsed.
    fn schedule(&self, after: Duration, task: Task);

    /// Runs every pending task immediately.
    fn flush(&self);

    /// The number of tasks that have not run yet.
    fn pending(&self) -> usize;
}

/// The host's notion of time.
pub trait Clock: Send + Sync {
    /// Time elapsed since the host started.
    fn now(&self) -> Duration;
}

/// A clock backed by the system's monotonic clock.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Creates a clock that starts counting now.
    pub fn new() -> SystemClock {
        SystemClock {
            start: Instant::now(),
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
        self.start.elapsed()
    }
}

/// The set of host services the dispatcher runs against.
#[derive(Clone)]
pub struct Host {
    pub factory: Arc<dyn EmitterFactory>,
    pub scheduler: Arc<dyn Scheduler>,
    pub clock: Arc<dyn Clock>,
}

impl Host {
    /// Creates a host from its parts.
    pub fn new(
        factory: Arc<dyn EmitterFactory>,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
    ) -> Host {
        Host {
            factory,
            scheduler,
            clock,
        }
    }

    /// A host that logs emitter activity instead of rendering audio, with a
    /// real-time scheduler.
    pub fn dry_run() -> Host {
        Host::new(
            Arc::new(log::EmitterFactory::new()),
            Arc::new(thread::ThreadScheduler::new()),
            Arc::new(SystemClock::new()),
        )
    }
}
