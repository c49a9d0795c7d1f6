//! WAV access through `hound`: header metadata for timing, and mono samples
//! for callers that run their own [`EmissionProvider`](crate::pipeline::traits::EmissionProvider).

use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::error::AlignmentError;
use crate::types::AudioInfo;

/// Reads the sample rate and per-channel length from a WAV header.
pub fn read_wav_info(path: &Path) -> Result<AudioInfo, AlignmentError> {
    let reader = WavReader::open(path).map_err(|e| AlignmentError::wav("open WAV file", e))?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return Err(AlignmentError::invalid_input(format!(
            "{} declares a zero sample rate",
            path.display()
        )));
    }
    Ok(AudioInfo {
        num_samples: u64::from(reader.duration()),
        sample_rate_hz: spec.sample_rate,
    })
}

/// Loads a WAV file as mono `f32` samples in [-1, 1], averaging channels.
pub fn read_wav_mono(path: &Path) -> Result<(Vec<f32>, u32), AlignmentError> {
    let mut reader =
        WavReader::open(path).map_err(|e| AlignmentError::wav("open WAV file", e))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<hound::Result<_>>()
            .map_err(|e| AlignmentError::wav("read WAV samples", e))?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<hound::Result<_>>()
                .map_err(|e| AlignmentError::wav("read WAV samples", e))?
        }
    };

    let channels = usize::from(spec.channels.max(1));
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };
    Ok((samples, spec.sample_rate))
}
