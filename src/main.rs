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

use std::error::Error;
use std::path::Path;
use std::thread;
use std::time::Duration;

use clap::{crate_version, Parser, Subcommand};
use duration_string::DurationString;
use tracing::info;

use clipbank::config::{LibraryFile, ManagerConfig};
use clipbank::dispatch::{PlaybackRequest, DEFAULT_PITCH, DEFAULT_VOLUME};
use clipbank::library::{self, verify};
use clipbank::{AudioManager, Host, Position};

/// How often the play command checks whether playback has finished.
const PLAYBACK_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A named sound clip library and player."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scans the configured directories and writes the library file.
    Scan {
        /// The path to the clipbank config.
        config_path: String,
    },
    /// Lists the clips in the library file along with their durations.
    Clips {
        /// The path to the clipbank config.
        config_path: String,
    },
    /// Verifies that every clip in the library file can be loaded.
    Verify {
        /// The path to the clipbank config.
        config_path: String,
    },
    /// Plays a clip from the library. Emitters log instead of rendering audio.
    Play {
        /// The path to the clipbank config.
        config_path: String,
        /// The name of the clip to play.
        #[arg(required_unless_present = "random")]
        clip_name: Option<String>,
        /// Plays a random clip instead of a named one.
        #[arg[short, long]]
        random: bool,
        /// How long to wait before playing, e.g. 250ms.
        #[arg[short, long]]
        delay: Option<String>,
        /// How far into the clip to start, e.g. 1s.
        #[arg[short, long]]
        offset: Option<String>,
        /// The volume scalar.
        #[arg[short, long, default_value_t = DEFAULT_VOLUME]]
        volume: f32,
        /// The pitch scalar.
        #[arg[short, long, default_value_t = DEFAULT_PITCH]]
        pitch: f32,
        /// Where to place the emitter. Should be in the form x,y,z.
        #[arg[long]]
        position: Option<Position>,
    },
}

fn parse_duration(duration: Option<String>) -> Result<Duration, Box<dyn Error>> {
    match duration {
        Some(duration) => Ok(DurationString::from_string(duration)?.into()),
        None => Ok(Duration::ZERO),
    }
}

fn load_library(config: &ManagerConfig) -> Result<LibraryFile, Box<dyn Error>> {
    let path = config.library();
    if !path.exists() {
        return Err(format!(
            "library file {} does not exist, run scan first",
            path.display()
        )
        .into());
    }
    Ok(LibraryFile::deserialize(&path)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { config_path } => {
            let config = ManagerConfig::deserialize(Path::new(&config_path))?;
            let library = library::build(&config.audio_root(), config.directories())?;
            library.save(&config.library())?;

            println!("Clips (count: {}):", library.clip_names().len());
            for (name, file) in library.clip_names().iter().zip(library.clip_files()) {
                println!("- {} ({})", name, file);
            }
        }
        Commands::Clips { config_path } => {
            let config = ManagerConfig::deserialize(Path::new(&config_path))?;
            let library = load_library(&config)?;
            let (_, clips) = library::load_clips(&library, &config.audio_root())?;

            if clips.is_empty() {
                println!("No clips found in {}.", config.library().display());
                return Ok(());
            }

            println!("Clips (count: {}):", clips.len());
            for clip in clips {
                println!("- {}", clip);
            }
        }
        Commands::Verify { config_path } => {
            let config = ManagerConfig::deserialize(Path::new(&config_path))?;
            let library = load_library(&config)?;
            let report = verify::verify(&library, &config.audio_root());
            verify::print_report(&report, &library);

            if report.has_errors() {
                return Err("library verification failed".into());
            }
        }
        Commands::Play {
            config_path,
            clip_name,
            random,
            delay,
            offset,
            volume,
            pitch,
            position,
        } => {
            let config = ManagerConfig::deserialize(Path::new(&config_path))?;
            let library = load_library(&config)?;

            let manager = AudioManager::new(Host::dry_run());
            manager.init(library, &config.audio_root())?;

            let mut request = match (random, clip_name) {
                (false, Some(clip_name)) => PlaybackRequest::named(&clip_name),
                _ => PlaybackRequest::random(),
            }
            .from_time(parse_duration(offset)?)
            .with_delay(parse_duration(delay)?)
            .with_volume(volume)
            .with_pitch(pitch);
            if let Some(position) = position {
                request = request.at(position);
            }

            let playback = manager.dispatch(&request)?;
            info!(clip = playback.clip.name(), "Waiting for playback to finish");

            while manager.pending() > 0 {
                thread::sleep(PLAYBACK_POLL_INTERVAL);
            }
            manager.shutdown();
        }
    }

    Ok(())
}
