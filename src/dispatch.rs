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

//! Resolves playback requests against the registry and hands them to the host.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, span, warn, Level};

use crate::clip::ClipRef;
use crate::host::{
    Clock, Emitter as _, EmitterFactory, EmitterRef, EmitterSettings, Host, HostError, Scheduler,
};
use crate::registry::SoundRegistry;

mod request;

pub use request::{ClipSelector, PlaybackRequest, Target, DEFAULT_PITCH, DEFAULT_VOLUME};

/// Why a playback request was abandoned.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("could not find clip '{0}', make sure it is scanned and the name is correct (names are case sensitive)")]
    ClipNotFound(String),

    #[error("no clips are registered, cannot pick a random clip")]
    EmptyLibrary,

    #[error(transparent)]
    Host(#[from] HostError),
}

/// The outcome of a dispatched request.
#[derive(Clone)]
pub struct Playback {
    /// The clip that is playing.
    pub clip: ClipRef,
    /// The emitter it plays from.
    pub emitter: EmitterRef,
    /// Host time at which playback starts.
    pub starts_at: Duration,
    /// Host time at which the emitter is released, if the dispatcher owns it.
    pub release_at: Option<Duration>,
}

impl std::fmt::Debug for Playback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playback")
            .field("clip", &self.clip.name())
            .field("emitter", &self.emitter.id())
            .field("starts_at", &self.starts_at)
            .field("release_at", &self.release_at)
            .finish()
    }
}

/// Fire-and-forget playback against a host.
pub struct Dispatcher {
    factory: Arc<dyn EmitterFactory>,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    /// Creates a dispatcher running against the given host.
    pub fn new(host: Host) -> Dispatcher {
        Dispatcher {
            factory: host.factory,
            scheduler: host.scheduler,
            clock: host.clock,
        }
    }

    /// Gets the host's scheduler.
    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    /// Dispatches a request, picking random clips with the thread RNG.
    pub fn dispatch(
        &self,
        registry: &SoundRegistry,
        request: &PlaybackRequest,
    ) -> Result<Playback, PlaybackError> {
        self.dispatch_with(registry, request, &mut rand::thread_rng())
    }

    /// Dispatches a request, picking random clips with the given RNG.
    ///
    /// Nothing is created or played if the clip can't be resolved. Emitters the
    /// dispatcher creates are released once the clip has finished playing.
    pub fn dispatch_with<R: Rng + ?Sized>(
        &self,
        registry: &SoundRegistry,
        request: &PlaybackRequest,
        rng: &mut R,
    ) -> Result<Playback, PlaybackError> {
        let span = span!(Level::DEBUG, "dispatch");
        let _enter = span.enter();

        let clip = match self.resolve(registry, request.clip(), rng) {
            Ok(clip) => clip,
            Err(e) => {
                warn!(err = %e, "Not playing clip");
                return Err(e);
            }
        };

        let (emitter, owned) = match self.acquire(request.target()) {
            Ok(acquired) => acquired,
            Err(e) => {
                warn!(err = %e, clip = clip.name(), "Unable to acquire emitter");
                return Err(e.into());
            }
        };

        let settings = EmitterSettings {
            clip: clip.clone(),
            volume: request.volume(),
            pitch: request.pitch(),
            offset: request.offset(),
        };
        let delay = request.delay();

        if let Err(e) = emitter
            .configure(&settings)
            .and_then(|_| emitter.play(delay))
        {
            warn!(err = %e, clip = clip.name(), "Emitter failed to play clip");
            if owned {
                self.factory.release(emitter);
            }
            return Err(e.into());
        }

        let now = self.clock.now();
        let release_at = if owned {
            let lifetime = delay.saturating_add(clip.playback_time(settings.offset, settings.pitch));
            let factory = self.factory.clone();
            let released = emitter.clone();
            self.scheduler
                .schedule(lifetime, Box::new(move || factory.release(released)));
            Some(now.saturating_add(lifetime))
        } else {
            None
        };

        debug!(
            clip = clip.name(),
            emitter = emitter.id(),
            volume = settings.volume,
            pitch = settings.pitch,
            offset = ?settings.offset,
            delay = ?delay,
            owned,
            "Clip dispatched"
        );

        Ok(Playback {
            clip,
            emitter,
            starts_at: now.saturating_add(delay),
            release_at,
        })
    }

    /// Returns the emitter to play from and whether the dispatcher owns it.
    fn acquire(&self, target: &Target) -> Result<(EmitterRef, bool), HostError> {
        match target {
            Target::Default => Ok((self.factory.create(None)?, true)),
            Target::Position(position) => Ok((self.factory.create(Some(*position))?, true)),
            Target::Emitter(emitter) => Ok((emitter.clone(), false)),
        }
    }

    fn resolve<R: Rng + ?Sized>(
        &self,
        registry: &SoundRegistry,
        selector: &ClipSelector,
        rng: &mut R,
    ) -> Result<ClipRef, PlaybackError> {
        match selector {
            ClipSelector::Named(name) => registry
                .get(name)
                .ok_or_else(|| PlaybackError::ClipNotFound(name.clone())),
            ClipSelector::Random => registry
                .pick_random_with(rng)
                .map_err(|_| PlaybackError::EmptyLibrary),
        }
    }
}
