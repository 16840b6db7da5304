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
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// A shared, immutable handle to a registered clip.
pub type ClipRef = Arc<Clip>;

/// An audio clip known to the library.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// The display name of the clip. Lookups against it are case sensitive.
    name: String,
    /// The audio file backing the clip.
    path: PathBuf,
    /// How long the clip takes to play at a pitch of 1.0.
    duration: Duration,
}

impl Clip {
    /// Creates a new clip.
    pub fn new(name: &str, path: &Path, duration: Duration) -> Clip {
        Clip {
            name: name.to_string(),
            path: path.to_path_buf(),
            duration,
        }
    }

    /// Creates a new shared clip handle.
    pub fn shared(name: &str, path: &Path, duration: Duration) -> ClipRef {
        Arc::new(Clip::new(name, path, duration))
    }

    /// Gets the name of the clip.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the path to the clip's audio file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the duration of the clip.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// How long playback takes when started at `offset` with the given pitch.
    ///
    /// A pitch of zero is treated as 1.0. Negative pitches play backwards at the
    /// same rate as their absolute value.
    pub fn playback_time(&self, offset: Duration, pitch: f32) -> Duration {
        let remaining = self.duration.saturating_sub(offset);
        let rate = match pitch.abs() {
            rate if rate > f32::EPSILON && rate.is_finite() => f64::from(rate),
            _ => 1.0,
        };
        Duration::try_from_secs_f64(remaining.as_secs_f64() / rate).unwrap_or(Duration::MAX)
    }

    /// Returns the duration string in minutes, seconds and milliseconds.
    pub fn duration_string(&self) -> String {
        let millis = self.duration.as_millis();
        format!(
            "{}:{:02}.{:03}",
            millis / 60_000,
            (millis / 1000) % 60,
            millis % 1000
        )
    }
}

impl fmt::Display for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.name,
            self.duration_string(),
            self.path.display()
        )
    }
}
