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

//! Building sound libraries from directories on disk and turning library files
//! back into clips.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::clip::{Clip, ClipRef};
use crate::config::LibraryFile;
use crate::registry::RegistryError;

mod probe;
mod scanner;
pub mod verify;

pub use probe::{probe_duration, ProbeError};
pub use scanner::{scan, ScanResult};

/// Errors raised while building or loading a library.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to load clip {path}: {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: ProbeError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A library entry and the result of probing its file.
#[derive(Debug)]
pub struct ProbedClip {
    pub name: String,
    pub path: PathBuf,
    pub duration: Result<Duration, ProbeError>,
}

/// Scans the given directories and returns a populated library file.
pub fn build(audio_root: &Path, directories: &[String]) -> Result<LibraryFile, LibraryError> {
    let result = scan(audio_root, directories)?;
    Ok(LibraryFile::new(
        directories.to_vec(),
        true,
        result.names,
        result.files,
    ))
}

/// Probes every clip in the library file. Probe failures are reported per clip.
pub fn probe_clips(
    library: &LibraryFile,
    audio_root: &Path,
) -> Result<Vec<ProbedClip>, LibraryError> {
    check_aligned(library)?;

    Ok(library
        .clip_names()
        .iter()
        .zip(library.clip_files())
        .map(|(name, file)| {
            let path = LibraryFile::resolve_file(file, audio_root);
            let duration = probe_duration(&path);
            ProbedClip {
                name: name.clone(),
                path,
                duration,
            }
        })
        .collect())
}

/// Loads every clip in the library file, returning the aligned names and clips
/// ready for [`crate::registry::SoundRegistry::rebuild`].
pub fn load_clips(
    library: &LibraryFile,
    audio_root: &Path,
) -> Result<(Vec<String>, Vec<ClipRef>), LibraryError> {
    if !library.is_populated() {
        warn!("Library has not been scanned yet");
    }

    let mut names = Vec::with_capacity(library.clip_names().len());
    let mut clips = Vec::with_capacity(library.clip_names().len());
    for probed in probe_clips(library, audio_root)? {
        let duration = probed.duration.map_err(|source| LibraryError::Probe {
            path: probed.path.clone(),
            source,
        })?;
        clips.push(Clip::shared(&probed.name, &probed.path, duration));
        names.push(probed.name);
    }

    info!(clips = clips.len(), "Clips loaded");
    Ok((names, clips))
}

fn check_aligned(library: &LibraryFile) -> Result<(), RegistryError> {
    if library.clip_names().len() != library.clip_files().len() {
        return Err(RegistryError::Configuration {
            names: library.clip_names().len(),
            resources: library.clip_files().len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{close_to, write_audio_root};

    #[test]
    fn test_build_and_load() {
        let dir = tempfile::tempdir().unwrap();
        write_audio_root(dir.path()).unwrap();

        let library = build(dir.path(), &["".to_string(), "sfx".to_string()]).unwrap();
        assert!(library.is_populated());
        assert_eq!(library.directories(), &["".to_string(), "sfx".to_string()]);
        assert_eq!(library.clip_names(), &["Explosion", "Coin", "Jump"]);

        let (names, clips) = load_clips(&library, dir.path()).unwrap();
        assert_eq!(names, vec!["Explosion", "Coin", "Jump"]);
        assert_eq!(clips[0].name(), "Explosion");
        assert_eq!(clips[0].path(), dir.path().join("Explosion.wav"));
        assert!(close_to(clips[0].duration(), Duration::from_secs(2)));
        assert!(close_to(clips[1].duration(), Duration::from_millis(250)));
        assert!(close_to(clips[2].duration(), Duration::from_millis(500)));
    }

    #[test]
    fn test_load_misaligned_library() {
        let library = LibraryFile::new(
            vec![],
            true,
            vec!["Jump".to_string(), "Coin".to_string()],
            vec!["sfx/Jump.wav".to_string()],
        );

        let result = load_clips(&library, Path::new("/nowhere"));
        assert!(matches!(
            result,
            Err(LibraryError::Registry(RegistryError::Configuration {
                names: 2,
                resources: 1
            }))
        ));
    }

    #[test]
    fn test_load_missing_clip_file() {
        let dir = tempfile::tempdir().unwrap();
        write_audio_root(dir.path()).unwrap();

        let library = LibraryFile::new(
            vec!["sfx".to_string()],
            true,
            vec!["Jump".to_string(), "Gone".to_string()],
            vec!["sfx/Jump.wav".to_string(), "sfx/Gone.wav".to_string()],
        );

        let probed = probe_clips(&library, dir.path()).unwrap();
        assert!(probed[0].duration.is_ok());
        assert!(probed[1].duration.is_err());

        match load_clips(&library, dir.path()) {
            Err(LibraryError::Probe { path, .. }) => {
                assert_eq!(path, dir.path().join("sfx/Gone.wav"))
            }
            other => panic!("expected probe error, got {:?}", other.map(|(names, _)| names)),
        }
    }
}
