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

//! A library of named sound clips scanned from disk, and a fire-and-forget
//! dispatcher that plays them through a host's emitters.

pub mod clip;
pub mod config;
pub mod dispatch;
pub mod host;
pub mod library;
pub mod manager;
pub mod registry;
#[cfg(test)]
mod testutil;

pub use clip::{Clip, ClipRef};
pub use dispatch::{Playback, PlaybackError, PlaybackRequest};
pub use host::{Host, Position};
pub use manager::AudioManager;
pub use registry::{RegistryError, SoundRegistry};
