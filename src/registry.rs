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

//! The name to clip mapping that backs playback lookups.

use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, info};

use crate::clip::ClipRef;

/// Errors raised by the sound registry.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("mismatched library input: {names} names but {resources} clips")]
    Configuration { names: usize, resources: usize },

    #[error("the sound library is empty")]
    EmptyLibrary,
}

/// Maps clip names to clips.
///
/// The mapping is only ever replaced wholesale through [`SoundRegistry::rebuild`].
#[derive(Default)]
pub struct SoundRegistry {
    /// Clips by name.
    clips: HashMap<String, ClipRef>,
    /// Distinct names in order of first appearance, for reproducible random picks.
    order: Vec<String>,
}

impl SoundRegistry {
    /// Creates an empty registry.
    pub fn new() -> SoundRegistry {
        SoundRegistry::default()
    }

    /// Replaces the registry contents with the given aligned names and clips.
    ///
    /// A repeated name keeps the clip from its last occurrence. If the two
    /// sequences differ in length the registry is left untouched.
    pub fn rebuild(&mut self, names: &[String], clips: &[ClipRef]) -> Result<(), RegistryError> {
        if names.len() != clips.len() {
            return Err(RegistryError::Configuration {
                names: names.len(),
                resources: clips.len(),
            });
        }

        self.clips.clear();
        self.order.clear();
        for (name, clip) in names.iter().zip(clips.iter()) {
            if self.clips.insert(name.clone(), clip.clone()).is_some() {
                debug!(name, "Duplicate clip name, keeping the later clip");
            } else {
                self.order.push(name.clone());
            }
        }

        info!(clips = self.clips.len(), "Sound library rebuilt");
        Ok(())
    }

    /// Removes every clip from the registry.
    pub fn clear(&mut self) {
        self.clips.clear();
        self.order.clear();
    }

    /// Returns the number of distinct registered names.
    pub fn count(&self) -> usize {
        self.clips.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Looks up a clip by its exact, case sensitive name.
    pub fn get(&self, name: &str) -> Option<ClipRef> {
        self.clips.get(name).cloned()
    }

    /// Returns true if a clip with this exact name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    /// Registered names in order of first appearance.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Picks a registered clip uniformly at random.
    pub fn pick_random(&self) -> Result<ClipRef, RegistryError> {
        self.pick_random_with(&mut rand::thread_rng())
    }

    /// Picks a registered clip uniformly at random using the given RNG.
    pub fn pick_random_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ClipRef, RegistryError> {
        if self.order.is_empty() {
            return Err(RegistryError::EmptyLibrary);
        }

        let name = &self.order[rng.gen_range(0..self.order.len())];
        self.get(name).ok_or(RegistryError::EmptyLibrary)
    }
}

impl std::fmt::Debug for SoundRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundRegistry")
            .field("clips", &self.order)
            .finish()
    }
}
