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

use tracing::{debug, info, warn};

use super::probe::probe_duration;
use super::LibraryError;

/// The clips found by scanning a set of directories.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScanResult {
    /// Clip names, aligned with `files`.
    pub names: Vec<String>,
    /// Clip files relative to the audio root, aligned with `names`.
    pub files: Vec<String>,
    /// Configured directories that don't exist.
    pub missing: Vec<PathBuf>,
    /// Files that were found but aren't playable audio.
    pub skipped: Vec<PathBuf>,
}

/// Scans each directory under `audio_root` for playable audio files.
///
/// Directories are not scanned recursively. An empty directory string scans the
/// audio root itself. Within a directory files are taken in file name order.
pub fn scan(audio_root: &Path, directories: &[String]) -> Result<ScanResult, LibraryError> {
    let mut result = ScanResult::default();

    for directory in directories {
        let path = if directory.is_empty() {
            audio_root.to_path_buf()
        } else {
            audio_root.join(directory)
        };

        if !path.is_dir() {
            warn!(path = ?path, "Path does not exist, check the directory is spelled correctly");
            result.missing.push(path);
            continue;
        }

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(&path)? {
            let entry_path = entry?.path();
            if entry_path.is_file() {
                files.push(entry_path);
            }
        }
        files.sort();

        for file in files {
            if let Err(e) = probe_duration(&file) {
                debug!(path = ?file, err = %e, "Skipping file that isn't audio");
                result.skipped.push(file);
                continue;
            }

            // Names and files are stored as text, so lossy paths would never resolve.
            let relative = file.strip_prefix(audio_root).unwrap_or(&file);
            let (Some(name), Some(relative)) = (
                file.file_stem().and_then(|stem| stem.to_str()),
                relative.to_str(),
            ) else {
                warn!(path = ?file, "Skipping file whose name isn't valid UTF-8");
                result.skipped.push(file);
                continue;
            };

            result.names.push(name.to_string());
            result.files.push(relative.to_string());
        }
    }

    if result.names.is_empty() {
        warn!(root = ?audio_root, "No audio files found in the scanned directories");
    } else {
        info!(
            clips = result.names.len(),
            missing = result.missing.len(),
            skipped = result.skipped.len(),
            "Scan complete"
        );
    }

    Ok(result)
}
