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

use std::fs;
use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ConfigError;

/// A YAML representation of a scanned sound library: the directories it was
/// scanned from and the aligned clip names and files found there.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct LibraryFile {
    /// The directories scanned, relative to the audio root. An empty string is
    /// the audio root itself.
    #[serde(default)]
    directories: Vec<String>,
    /// Whether a scan has populated this library.
    #[serde(default)]
    populated: bool,
    /// Clip display names, aligned with `clip_files`.
    #[serde(default)]
    clip_names: Vec<String>,
    /// Clip audio files, relative to the audio root unless absolute.
    #[serde(default)]
    clip_files: Vec<String>,
}

impl LibraryFile {
    /// Creates a new library file.
    pub fn new(
        directories: Vec<String>,
        populated: bool,
        clip_names: Vec<String>,
        clip_files: Vec<String>,
    ) -> LibraryFile {
        LibraryFile {
            directories,
            populated,
            clip_names,
            clip_files,
        }
    }

    /// Deserializes a library file from the given path.
    pub fn deserialize(path: &Path) -> Result<LibraryFile, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<LibraryFile>()?)
    }

    /// Serializes the library file and writes it to the given path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let serialized = serde_yml::to_string(self)?;
        fs::write(path, serialized)?;
        info!(
            path = ?path,
            clips = self.clip_names.len(),
            "Library file saved"
        );
        Ok(())
    }

    /// Gets the scanned directories.
    pub fn directories(&self) -> &[String] {
        &self.directories
    }

    /// Returns true if a scan has populated the library.
    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Gets the clip names.
    pub fn clip_names(&self) -> &[String] {
        &self.clip_names
    }

    /// Gets the clip files as written in the library.
    pub fn clip_files(&self) -> &[String] {
        &self.clip_files
    }

    /// Resolves a clip file against the audio root.
    pub fn resolve_file(file: &str, audio_root: &Path) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            audio_root.join(path)
        }
    }
}
