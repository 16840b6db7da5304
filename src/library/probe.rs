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

//! Reads clip durations from audio containers without decoding them.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;
use symphonia::default::get_probe;

/// Error types for probing audio files.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio file error: {0}")]
    Format(#[from] SymphoniaError),

    #[error("No audio track found")]
    NoAudioTrack,

    #[error("Sample rate not specified")]
    UnknownSampleRate,
}

/// Returns the playback duration of the audio file at the given path.
///
/// Uses the frame count from the container header when there is one, and
/// otherwise sums packet durations across the file.
pub fn probe_duration(path: &Path) -> Result<Duration, ProbeError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Create a hint to help the format registry guess the format
    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let probed = get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(ProbeError::NoAudioTrack)?;
    let track_id = track.id;
    let time_base = track.codec_params.time_base;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(ProbeError::UnknownSampleRate)?;

    if let Some(n_frames) = track.codec_params.n_frames {
        return Ok(to_duration(n_frames, time_base, sample_rate));
    }

    let mut frames = 0u64;
    loop {
        match format_reader.next_packet() {
            Ok(packet) if packet.track_id() == track_id => frames += packet.dur(),
            Ok(_) => {}
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(to_duration(frames, time_base, sample_rate))
}

fn to_duration(timestamp: u64, time_base: Option<TimeBase>, sample_rate: u32) -> Duration {
    match time_base {
        Some(time_base) => {
            let time = time_base.calc_time(timestamp);
            Duration::from_secs(time.seconds) + Duration::from_secs_f64(time.frac)
        }
        None => Duration::from_secs_f64(timestamp as f64 / sample_rate as f64),
    }
}
