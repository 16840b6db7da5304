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

//! The runtime audio manager: owns the registry and the active library, and
//! exposes every play variant against a host.

use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::clip::ClipRef;
use crate::config::LibraryFile;
use crate::dispatch::{Dispatcher, Playback, PlaybackError, PlaybackRequest};
use crate::host::{EmitterRef, Host, Position, Scheduler as _};
use crate::library::{self, LibraryError};
use crate::registry::{RegistryError, SoundRegistry};

/// The library the registry was last built from.
struct ActiveLibrary {
    file: LibraryFile,
    audio_root: PathBuf,
}

/// Plays named clips from a scanned library.
pub struct AudioManager {
    registry: RwLock<SoundRegistry>,
    dispatcher: Dispatcher,
    library: RwLock<Option<ActiveLibrary>>,
    rng: Mutex<StdRng>,
}

impl AudioManager {
    /// Creates a manager with an empty library running against the given host.
    pub fn new(host: Host) -> AudioManager {
        AudioManager::with_rng(host, StdRng::from_entropy())
    }

    /// Creates a manager that picks random clips with the given RNG.
    pub fn with_rng(host: Host, rng: StdRng) -> AudioManager {
        AudioManager {
            registry: RwLock::new(SoundRegistry::new()),
            dispatcher: Dispatcher::new(host),
            library: RwLock::new(None),
            rng: Mutex::new(rng),
        }
    }

    /// Loads the library's clips and builds the registry from them.
    pub fn init(&self, file: LibraryFile, audio_root: &Path) -> Result<(), LibraryError> {
        let (names, clips) = library::load_clips(&file, audio_root)?;
        self.registry.write().rebuild(&names, &clips)?;
        *self.library.write() = Some(ActiveLibrary {
            file,
            audio_root: audio_root.to_path_buf(),
        });

        if self.registry.read().is_empty() {
            warn!(root = ?audio_root, "Library has no clips, nothing can be played");
        }
        info!(clips = self.clip_count(), root = ?audio_root, "Audio manager initialized");
        Ok(())
    }

    /// Releases every emitter still waiting on the scheduler and empties the
    /// registry.
    pub fn shutdown(&self) {
        let pending = self.pending();
        self.dispatcher.scheduler().flush();
        self.registry.write().clear();
        info!(released = pending, "Audio manager shut down");
    }

    /// Rebuilds the registry directly from aligned names and clips supplied by
    /// the caller.
    pub fn rebuild(&self, names: &[String], clips: &[ClipRef]) -> Result<(), RegistryError> {
        self.registry.write().rebuild(names, clips)
    }

    /// Swaps in a different library file and rebuilds from it, keeping the
    /// current audio root.
    pub fn change_library(&self, file: LibraryFile) -> Result<(), LibraryError> {
        let audio_root = self
            .library
            .read()
            .as_ref()
            .map(|active| active.audio_root.clone())
            .unwrap_or_default();
        self.init(file, &audio_root)
    }

    /// Gets a copy of the library file currently in use.
    pub fn library(&self) -> Option<LibraryFile> {
        self.library.read().as_ref().map(|active| active.file.clone())
    }

    /// Rebuilds the registry from the current library file.
    pub fn update_library(&self) -> Result<(), LibraryError> {
        let active = self
            .library
            .read()
            .as_ref()
            .map(|active| (active.file.clone(), active.audio_root.clone()));
        match active {
            Some((file, audio_root)) => self.init(file, &audio_root),
            None => {
                warn!("No library to update from");
                self.registry.write().clear();
                Ok(())
            }
        }
    }

    /// Returns the number of emitters still waiting to be released.
    pub fn pending(&self) -> usize {
        self.dispatcher.scheduler().pending()
    }

    /// Returns the number of clips available.
    pub fn clip_count(&self) -> usize {
        self.registry.read().count()
    }

    /// Returns the names of every clip available.
    pub fn clip_names(&self) -> Vec<String> {
        self.registry.read().names().to_vec()
    }

    /// Picks a clip at random.
    pub fn random_clip(&self) -> Result<ClipRef, RegistryError> {
        self.registry.read().pick_random_with(&mut *self.rng.lock())
    }

    /// Dispatches an arbitrary playback request.
    pub fn dispatch(&self, request: &PlaybackRequest) -> Result<Playback, PlaybackError> {
        let registry = self.registry.read();
        self.dispatcher
            .dispatch_with(&registry, request, &mut *self.rng.lock())
    }

    /// Plays a clip from a new default emitter.
    pub fn play(&self, name: &str, volume: f32, pitch: f32) -> Result<Playback, PlaybackError> {
        self.dispatch(&request(name, volume, pitch))
    }

    /// Plays a clip from a caller-owned emitter.
    pub fn play_on(
        &self,
        name: &str,
        emitter: EmitterRef,
        volume: f32,
        pitch: f32,
    ) -> Result<Playback, PlaybackError> {
        self.dispatch(&request(name, volume, pitch).on(emitter))
    }

    /// Plays a clip from a new emitter at a position.
    pub fn play_at(
        &self,
        name: &str,
        position: Position,
        volume: f32,
        pitch: f32,
    ) -> Result<Playback, PlaybackError> {
        self.dispatch(&request(name, volume, pitch).at(position))
    }

    /// Plays a clip starting `time` into it.
    pub fn play_from_time(
        &self,
        name: &str,
        time: Duration,
        volume: f32,
        pitch: f32,
    ) -> Result<Playback, PlaybackError> {
        self.dispatch(&request(name, volume, pitch).from_time(time))
    }

    /// Plays a clip starting `time` into it on a caller-owned emitter.
    pub fn play_from_time_on(
        &self,
        name: &str,
        time: Duration,
        emitter: EmitterRef,
        volume: f32,
        pitch: f32,
    ) -> Result<Playback, PlaybackError> {
        self.dispatch(&request(name, volume, pitch).from_time(time).on(emitter))
    }

    /// Plays a clip starting `time` into it from a new emitter at a position.
    pub fn play_from_time_at(
        &self,
        name: &str,
        time: Duration,
        position: Position,
        volume: f32,
        pitch: f32,
    ) -> Result<Playback, PlaybackError> {
        self.dispatch(&request(name, volume, pitch).from_time(time).at(position))
    }

    /// Plays a clip once `delay` has elapsed.
    pub fn play_with_delay(
        &self,
        name: &str,
        delay: Duration,
        volume: f32,
        pitch: f32,
    ) -> Result<Playback, PlaybackError> {
        self.dispatch(&request(name, volume, pitch).with_delay(delay))
    }

    /// Plays a clip on a caller-owned emitter once `delay` has elapsed.
    pub fn play_with_delay_on(
        &self,
        name: &str,
        delay: Duration,
        emitter: EmitterRef,
        volume: f32,
        pitch: f32,
    ) -> Result<Playback, PlaybackError> {
        self.dispatch(&request(name, volume, pitch).with_delay(delay).on(emitter))
    }

    /// Plays a clip from a new emitter at a position once `delay` has elapsed.
    pub fn play_with_delay_at(
        &self,
        name: &str,
        delay: Duration,
        position: Position,
        volume: f32,
        pitch: f32,
    ) -> Result<Playback, PlaybackError> {
        self.dispatch(&request(name, volume, pitch).with_delay(delay).at(position))
    }

    /// Plays a random clip.
    pub fn play_random(&self, volume: f32, pitch: f32) -> Result<Playback, PlaybackError> {
        self.dispatch(&random_request(volume, pitch))
    }

    /// Plays a random clip starting `time` into it.
    pub fn play_random_from_time(
        &self,
        time: Duration,
        volume: f32,
        pitch: f32,
    ) -> Result<Playback, PlaybackError> {
        self.dispatch(&random_request(volume, pitch).from_time(time))
    }

    /// Plays a random clip once `delay` has elapsed.
    pub fn play_random_with_delay(
        &self,
        delay: Duration,
        volume: f32,
        pitch: f32,
    ) -> Result<Playback, PlaybackError> {
        self.dispatch(&random_request(volume, pitch).with_delay(delay))
    }
}

fn request(name: &str, volume: f32, pitch: f32) -> PlaybackRequest {
    PlaybackRequest::named(name)
        .with_volume(volume)
        .with_pitch(pitch)
}

fn random_request(volume: f32, pitch: f32) -> PlaybackRequest {
    PlaybackRequest::random()
        .with_volume(volume)
        .with_pitch(pitch)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dispatch::{DEFAULT_PITCH, DEFAULT_VOLUME};
    use crate::host::mock::{self, MockHost};
    use crate::host::thread::ThreadScheduler;
    use crate::host::{Emitter as _, Scheduler as _, SystemClock};
    use crate::testutil::{close_to, eventually, write_audio_root};

    fn manager(mock: &MockHost) -> (AudioManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        write_audio_root(dir.path()).unwrap();
        let library = library::build(dir.path(), &["".to_string(), "sfx".to_string()]).unwrap();

        let manager = AudioManager::with_rng(mock.host(), StdRng::seed_from_u64(11));
        manager.init(library, dir.path()).unwrap();
        (manager, dir)
    }

    #[test]
    fn test_init() {
        let mock = MockHost::new();
        let (manager, _dir) = manager(&mock);

        assert_eq!(manager.clip_count(), 3);
        assert_eq!(manager.clip_names(), vec!["Explosion", "Coin", "Jump"]);
        assert!(manager.library().unwrap().is_populated());
    }

    #[test]
    fn test_play_variants() {
        let mock = MockHost::new();
        let (manager, _dir) = manager(&mock);
        let own: Arc<mock::Emitter> = Arc::new(mock::Emitter::new(500, None));
        let here = Position::new(1.0, 2.0, 3.0);
        let short = Duration::from_millis(100);

        manager.play("Jump", DEFAULT_VOLUME, DEFAULT_PITCH).unwrap();
        manager.play_on("Jump", own.clone(), 0.5, 1.0).unwrap();
        manager.play_at("Jump", here, 1.0, 1.0).unwrap();
        manager.play_from_time("Jump", short, 1.0, 1.0).unwrap();
        manager
            .play_from_time_on("Jump", short, own.clone(), 1.0, 1.0)
            .unwrap();
        manager.play_from_time_at("Jump", short, here, 1.0, 1.0).unwrap();
        manager.play_with_delay("Jump", short, 1.0, 1.0).unwrap();
        manager
            .play_with_delay_on("Jump", short, own.clone(), 1.0, 1.0)
            .unwrap();
        manager.play_with_delay_at("Jump", short, here, 1.0, 1.0).unwrap();

        // Six variants create their own emitter, three use the caller's.
        let created = mock.factory.created();
        assert_eq!(created.len(), 6);
        assert_eq!(own.plays(), vec![Duration::ZERO, Duration::ZERO, short]);
        assert_eq!(
            created
                .iter()
                .filter(|e| e.position() == Some(here))
                .count(),
            3
        );
        assert_eq!(mock.scheduler.pending(), 6);

        // Everything has finished by the time the longest variant is done.
        mock.scheduler.advance(Duration::from_millis(700));
        assert!(created.iter().all(|e| e.is_released()));
        assert!(!mock.factory.released().contains(&own.id()));
    }

    #[test]
    fn test_play_missing_clip() {
        let mock = MockHost::new();
        let (manager, _dir) = manager(&mock);

        assert_eq!(
            manager.play("jump", 1.0, 1.0).unwrap_err(),
            PlaybackError::ClipNotFound("jump".to_string())
        );
        assert!(mock.factory.created().is_empty());
    }

    #[test]
    fn test_play_random_variants() {
        let mock = MockHost::new();
        let (manager, _dir) = manager(&mock);

        let playback = manager.play_random(1.0, 1.0).unwrap();
        assert!(manager.clip_names().contains(&playback.clip.name().to_string()));

        let playback = manager
            .play_random_from_time(Duration::from_millis(50), 1.0, 1.0)
            .unwrap();
        let settings = mock.factory.created()[1].settings().unwrap();
        assert_eq!(settings.offset, Duration::from_millis(50));
        assert_eq!(settings.clip.name(), playback.clip.name());

        let playback = manager
            .play_random_with_delay(Duration::from_secs(1), 1.0, 1.0)
            .unwrap();
        assert_eq!(playback.starts_at, Duration::from_secs(1));
        let release_at = playback.release_at.unwrap();
        assert!(close_to(
            release_at,
            Duration::from_secs(1) + playback.clip.duration()
        ));

        assert!(manager.random_clip().is_ok());
    }

    #[test]
    fn test_init_library_without_clips() {
        let mock = MockHost::new();
        let dir = tempfile::tempdir().unwrap();
        let manager = AudioManager::new(mock.host());

        let library = library::build(dir.path(), &["".to_string()]).unwrap();
        manager.init(library, dir.path()).unwrap();
        assert_eq!(manager.clip_count(), 0);
        assert!(manager.library().unwrap().is_populated());
    }

    #[test]
    fn test_random_on_empty_manager() {
        let mock = MockHost::new();
        let manager = AudioManager::new(mock.host());

        assert_eq!(manager.clip_count(), 0);
        assert_eq!(
            manager.random_clip().unwrap_err(),
            RegistryError::EmptyLibrary
        );
        assert_eq!(
            manager.play_random(1.0, 1.0).unwrap_err(),
            PlaybackError::EmptyLibrary
        );
        assert!(mock.factory.created().is_empty());
    }

    #[test]
    fn test_change_and_update_library() {
        let mock = MockHost::new();
        let (manager, dir) = manager(&mock);

        let ui = library::build(dir.path(), &["ui".to_string()]).unwrap();
        manager.change_library(ui.clone()).unwrap();
        assert_eq!(manager.clip_names(), vec!["Click"]);
        assert_eq!(manager.library(), Some(ui));

        // A new file on disk only shows up after a rescan, not an update.
        crate::testutil::write_wav(
            &dir.path().join("ui").join("Hover.wav"),
            8000,
            Duration::from_millis(100),
        )
        .unwrap();
        manager.update_library().unwrap();
        assert_eq!(manager.clip_count(), 1);

        manager
            .change_library(library::build(dir.path(), &["ui".to_string()]).unwrap())
            .unwrap();
        assert_eq!(manager.clip_names(), vec!["Click", "Hover"]);
    }

    #[test]
    fn test_failed_change_keeps_library() {
        let mock = MockHost::new();
        let (manager, _dir) = manager(&mock);

        let broken = LibraryFile::new(
            vec![],
            true,
            vec!["A".to_string()],
            vec!["missing.wav".to_string()],
        );
        assert!(manager.change_library(broken).is_err());
        assert_eq!(manager.clip_count(), 3);
    }

    #[test]
    fn test_shutdown_releases_pending_emitters() {
        let mock = MockHost::new();
        let (manager, _dir) = manager(&mock);

        manager.play("Explosion", 1.0, 1.0).unwrap();
        manager
            .play_with_delay("Jump", Duration::from_secs(30), 1.0, 1.0)
            .unwrap();
        assert_eq!(manager.pending(), 2);

        manager.shutdown();
        assert_eq!(mock.scheduler.pending(), 0);
        assert_eq!(mock.factory.released().len(), 2);
        assert_eq!(manager.clip_count(), 0);
    }

    #[test]
    fn test_shutdown_with_thread_scheduler() {
        let mock = MockHost::new();
        let dir = tempfile::tempdir().unwrap();
        write_audio_root(dir.path()).unwrap();
        let host = Host::new(
            mock.factory.clone(),
            Arc::new(ThreadScheduler::new()),
            Arc::new(SystemClock::new()),
        );
        let manager = AudioManager::new(host);
        let library = library::build(dir.path(), &["ui".to_string(), "sfx".to_string()]).unwrap();
        manager.init(library, dir.path()).unwrap();

        // Click is 100ms long and is released in real time.
        manager.play("Click", 1.0, 1.0).unwrap();
        eventually(|| manager.pending() == 0, "Click was never released");
        assert_eq!(mock.factory.released(), vec![mock.factory.created()[0].id()]);

        manager
            .play_with_delay("Jump", Duration::from_secs(30), 1.0, 1.0)
            .unwrap();
        manager
            .play_with_delay_at("Coin", Duration::MAX, Position::new(0.0, 0.0, 1.0), 1.0, 1.0)
            .unwrap();
        assert_eq!(manager.pending(), 2);

        manager.shutdown();
        assert_eq!(manager.pending(), 0);
        assert_eq!(mock.factory.created().len(), 3);
        assert!(mock.factory.created().iter().all(|e| e.is_released()));
        assert_eq!(manager.clip_count(), 0);
    }

    #[test]
    fn test_rebuild_from_caller() {
        let mock = MockHost::new();
        let manager = AudioManager::new(mock.host());
        let clip = crate::clip::Clip::shared("Beep", Path::new("beep.wav"), Duration::from_secs(1));

        assert!(manager
            .rebuild(&["Beep".to_string(), "Boop".to_string()], &[clip.clone()])
            .is_err());
        manager.rebuild(&["Beep".to_string()], &[clip]).unwrap();
        assert!(manager.play("Beep", 1.0, 1.0).is_ok());
    }
}
