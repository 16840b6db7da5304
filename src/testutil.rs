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

//! Helpers shared by tests: WAV fixtures and small sound libraries on disk.

use std::error::Error;
use std::f32::consts::PI;
use std::fs::{self, File};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use hound::{SampleFormat, WavSpec, WavWriter};

/// Writes a mono 16-bit sine wave of the given duration to `path`.
pub fn write_wav(path: &Path, sample_rate: u32, duration: Duration) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = WavWriter::new(
        File::create(path)?,
        WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        },
    )?;

    let frames = (duration.as_secs_f64() * sample_rate as f64).round() as u64;
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let sample = (2.0 * PI * 440.0 * t).sin() * 0.25;
        writer.write_sample((sample * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Lays out a small audio root:
///
/// ```text
/// Explosion.wav   (2s)
/// sfx/Jump.wav    (500ms)
/// sfx/Coin.wav    (250ms)
/// sfx/readme.txt
/// ui/Click.wav    (100ms)
/// ```
pub fn write_audio_root(root: &Path) -> Result<(), Box<dyn Error>> {
    write_wav(&root.join("Explosion.wav"), 8000, Duration::from_secs(2))?;
    write_wav(&root.join("sfx").join("Jump.wav"), 8000, Duration::from_millis(500))?;
    write_wav(&root.join("sfx").join("Coin.wav"), 8000, Duration::from_millis(250))?;
    fs::write(root.join("sfx").join("readme.txt"), "not audio")?;
    write_wav(&root.join("ui").join("Click.wav"), 8000, Duration::from_millis(100))?;
    Ok(())
}

/// Returns true if two durations are within a millisecond of each other.
pub fn close_to(actual: Duration, expected: Duration) -> bool {
    (actual.as_secs_f64() - expected.as_secs_f64()).abs() < 0.001
}

/// Wait for the given predicate to return true or fail.
pub fn eventually<F>(predicate: F, error_msg: &str)
where
    F: Fn() -> bool,
{
    let start = Instant::now();
    let mut tick = Duration::from_millis(5);
    let timeout = Duration::from_secs(10);
    let max_tick = Duration::from_millis(100);

    loop {
        if predicate() {
            return;
        }
        if start.elapsed() > timeout {
            panic!("{}", error_msg);
        }

        thread::sleep(tick);
        tick = std::cmp::min(tick * 2, max_tick);
    }
}
