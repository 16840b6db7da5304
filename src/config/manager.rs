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

use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::Deserialize;

use super::error::ConfigError;

/// The configuration for the audio manager.
#[derive(Deserialize, Clone, Debug)]
pub struct ManagerConfig {
    /// The root directory audio is scanned from.
    audio_root: String,
    /// The library file to read and write.
    library: String,
    /// The directories to scan, relative to the audio root. An empty string
    /// scans the audio root itself.
    #[serde(default = "default_directories")]
    directories: Vec<String>,
    /// The directory relative paths are resolved against. Set to the config
    /// file's directory on load.
    #[serde(skip)]
    base_path: PathBuf,
}

fn default_directories() -> Vec<String> {
    vec![String::new()]
}

impl ManagerConfig {
    /// Deserializes a manager configuration from the given path.
    pub fn deserialize(path: &Path) -> Result<ManagerConfig, ConfigError> {
        let mut config = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<ManagerConfig>()?;
        config.base_path = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// The audio root, resolved against the config file's directory.
    pub fn audio_root(&self) -> PathBuf {
        self.base_path.join(&self.audio_root)
    }

    /// The library file path, resolved against the config file's directory.
    pub fn library(&self) -> PathBuf {
        self.base_path.join(&self.library)
    }

    /// Gets the directories to scan.
    pub fn directories(&self) -> &[String] {
        &self.directories
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_deserialize() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipbank.yaml");
        fs::write(
            &path,
            "audio_root: audio\nlibrary: library.yaml\ndirectories:\n  - sfx\n  - ui\n",
        )
        .unwrap();

        let config = ManagerConfig::deserialize(&path).unwrap();
        assert_eq!(config.audio_root(), dir.path().join("audio"));
        assert_eq!(config.library(), dir.path().join("library.yaml"));
        assert_eq!(config.directories(), &["sfx".to_string(), "ui".to_string()]);
    }

    #[test]
    fn test_default_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipbank.yaml");
        fs::write(&path, "audio_root: /srv/audio\nlibrary: library.yaml\n").unwrap();

        let config = ManagerConfig::deserialize(&path).unwrap();
        // Absolute paths are kept as they are.
        assert_eq!(config.audio_root(), PathBuf::from("/srv/audio"));
        assert_eq!(config.directories(), &[String::new()]);
    }

    #[test]
    fn test_missing_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipbank.yaml");
        fs::write(&path, "audio_root: audio\n").unwrap();

        assert!(matches!(
            ManagerConfig::deserialize(&path),
            Err(ConfigError::Load(_))
        ));
    }
}
