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

use std::fmt;
use std::time::Duration;

use crate::host::{EmitterRef, Position};

/// Default volume scalar.
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Default pitch scalar.
pub const DEFAULT_PITCH: f32 = 1.0;

/// Which clip a request plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipSelector {
    /// The clip registered under this exact name.
    Named(String),
    /// Any registered clip, picked uniformly at random.
    Random,
}

/// Where a request plays from.
#[derive(Clone, Default)]
pub enum Target {
    /// A freshly created default emitter.
    #[default]
    Default,
    /// A freshly created emitter placed at a position.
    Position(Position),
    /// An emitter owned by the caller. It is never released by the dispatcher.
    Emitter(EmitterRef),
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Default => write!(f, "Default"),
            Target::Position(position) => write!(f, "Position{}", position),
            Target::Emitter(emitter) => write!(f, "Emitter({})", emitter),
        }
    }
}

/// A single request to play a clip.
#[derive(Debug, Clone)]
pub struct PlaybackRequest {
    clip: ClipSelector,
    target: Target,
    offset: Option<Duration>,
    delay: Option<Duration>,
    volume: f32,
    pitch: f32,
}

impl PlaybackRequest {
    /// A request for the clip with the given name.
    pub fn named(name: &str) -> PlaybackRequest {
        PlaybackRequest::new(ClipSelector::Named(name.to_string()))
    }

    /// A request for a random clip.
    pub fn random() -> PlaybackRequest {
        PlaybackRequest::new(ClipSelector::Random)
    }

    fn new(clip: ClipSelector) -> PlaybackRequest {
        PlaybackRequest {
            clip,
            target: Target::Default,
            offset: None,
            delay: None,
            volume: DEFAULT_VOLUME,
            pitch: DEFAULT_PITCH,
        }
    }

    /// Plays from a new emitter placed at the given position.
    pub fn at(mut self, position: Position) -> Self {
        self.target = Target::Position(position);
        self
    }

    /// Plays from a caller-owned emitter.
    pub fn on(mut self, emitter: EmitterRef) -> Self {
        self.target = Target::Emitter(emitter);
        self
    }

    /// Starts playback this far into the clip.
    pub fn from_time(mut self, offset: Duration) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Waits this long before starting playback.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the volume scalar.
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Sets the pitch scalar.
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    /// Gets the clip selector.
    pub fn clip(&self) -> &ClipSelector {
        &self.clip
    }

    /// Gets the target.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Gets the start offset, zero if unset.
    pub fn offset(&self) -> Duration {
        self.offset.unwrap_or_default()
    }

    /// Gets the delay, zero if unset.
    pub fn delay(&self) -> Duration {
        self.delay.unwrap_or_default()
    }

    /// Gets the volume scalar.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Gets the pitch scalar.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = PlaybackRequest::named("Jump");
        assert_eq!(request.clip(), &ClipSelector::Named("Jump".to_string()));
        assert!(matches!(request.target(), Target::Default));
        assert_eq!(request.offset(), Duration::ZERO);
        assert_eq!(request.delay(), Duration::ZERO);
        assert_eq!(request.volume(), 1.0);
        assert_eq!(request.pitch(), 1.0);
    }

    #[test]
    fn test_builder() {
        let request = PlaybackRequest::random()
            .at(Position::new(1.0, 0.0, -1.0))
            .from_time(Duration::from_millis(250))
            .with_delay(Duration::from_secs(1))
            .with_volume(0.5)
            .with_pitch(1.5);

        assert_eq!(request.clip(), &ClipSelector::Random);
        assert!(matches!(
            request.target(),
            Target::Position(p) if *p == Position::new(1.0, 0.0, -1.0)
        ));
        assert_eq!(request.offset(), Duration::from_millis(250));
        assert_eq!(request.delay(), Duration::from_secs(1));
        assert_eq!(request.volume(), 0.5);
        assert_eq!(request.pitch(), 1.5);
    }
}
