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

//! A dry-run host. Emitters log what they would play instead of rendering audio.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{info, span, Level};

use super::Emitter as _;
use super::{EmitterRef, EmitterSettings, HostError, Position};

/// An emitter that logs playback.
pub struct Emitter {
    id: u64,
    position: Option<Position>,
    settings: Mutex<Option<EmitterSettings>>,
}

impl Emitter {
    /// Creates a new logging emitter.
    pub fn new(id: u64, position: Option<Position>) -> Emitter {
        Emitter {
            id,
            position,
            settings: Mutex::new(None),
        }
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
        let span = span!(Level::INFO, "play clip (dry run)");
        let _enter = span.enter();

        let settings = self.settings.lock();
        let settings = settings.as_ref().ok_or_else(|| HostError::Emitter {
            id: self.id,
            reason: "no clip configured".to_string(),
        })?;

        info!(
            emitter = self.id,
            clip = settings.clip.name(),
            path = ?settings.clip.path(),
            duration = settings.clip.duration_string(),
            volume = settings.volume,
            pitch = settings.pitch,
            offset = ?settings.offset,
            delay = ?delay,
            position = ?self.position,
            "Playing clip."
        );
        Ok(())
    }
}

impl fmt::Display for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "Emitter #{} at {} (Dry run)", self.id, position),
            None => write!(f, "Emitter #{} (Dry run)", self.id),
        }
    }
}

/// Creates logging emitters.
#[derive(Default)]
pub struct EmitterFactory {
    next_id: AtomicU64,
}

impl EmitterFactory {
    /// Creates a new factory.
    pub fn new() -> EmitterFactory {
        EmitterFactory::default()
    }
}

impl super::EmitterFactory for EmitterFactory {
    fn create(&self, position: Option<Position>) -> Result<EmitterRef, HostError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let emitter = Arc::new(Emitter::new(id, position));
        info!(emitter = %emitter, "Emitter created.");
        Ok(emitter)
    }

    fn release(&self, emitter: EmitterRef) {
        info!(emitter = emitter.id(), "Emitter released.");
    }
}
