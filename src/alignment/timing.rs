use std::fmt;

use crate::error::AlignmentError;
use crate::types::{AudioInfo, TimedWord, WordSegment};

/// ASS event timestamp, `H:MM:SS.CC`, held as whole centiseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AssTimestamp {
    centis: u64,
}

impl AssTimestamp {
    pub fn from_centis(centis: u64) -> Self {
        Self { centis }
    }

    /// Truncates to the centisecond using integer arithmetic.
    pub fn from_samples(sample: u64, sample_rate_hz: u32) -> Self {
        if sample_rate_hz == 0 {
            return Self { centis: 0 };
        }
        let centis = sample as u128 * 100 / sample_rate_hz as u128;
        Self {
            centis: centis as u64,
        }
    }

    /// Truncates to the centisecond. The value is first snapped to the
    /// microsecond so binary noise (0.29 stored as 0.28999...) does not drop
    /// a whole centisecond. Negative and NaN inputs clamp to zero.
    pub fn from_seconds(seconds: f64) -> Self {
        let micros = (seconds * 1_000_000.0).round();
        let micros = if micros.is_finite() && micros > 0.0 {
            micros as u64
        } else {
            0
        };
        Self {
            centis: micros / 10_000,
        }
    }

    pub fn centis(self) -> u64 {
        self.centis
    }
}

impl fmt::Display for AssTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.centis / 360_000;
        let minutes = self.centis / 6_000 % 60;
        let seconds = self.centis / 100 % 60;
        let centis = self.centis % 100;
        write!(f, "{hours}:{minutes:02}:{seconds:02}.{centis:02}")
    }
}

pub fn format_timestamp(seconds: f64) -> String {
    AssTimestamp::from_seconds(seconds).to_string()
}

impl TimedWord {
    pub fn start_secs(&self) -> f64 {
        self.start_sample as f64 / self.sample_rate_hz as f64
    }

    pub fn end_secs(&self) -> f64 {
        self.end_sample as f64 / self.sample_rate_hz as f64
    }

    pub fn start_timestamp(&self) -> AssTimestamp {
        AssTimestamp::from_samples(self.start_sample, self.sample_rate_hz)
    }

    pub fn end_timestamp(&self) -> AssTimestamp {
        AssTimestamp::from_samples(self.end_sample, self.sample_rate_hz)
    }
}

/// Frame index to the sample it starts at, truncated to a whole sample.
#[inline]
pub fn frame_to_sample(frame: usize, samples_per_frame: f64) -> u64 {
    (samples_per_frame * frame as f64) as u64
}

/// Places word segments on the audio timeline.
///
/// Each emission frame covers `num_samples / num_frames` samples of audio.
pub fn words_to_timed(
    words: &[WordSegment],
    num_frames: usize,
    audio: AudioInfo,
) -> Result<Vec<TimedWord>, AlignmentError> {
    if num_frames == 0 {
        return Err(AlignmentError::invalid_input(
            "cannot convert frames to time without any frames",
        ));
    }
    if audio.sample_rate_hz == 0 {
        return Err(AlignmentError::invalid_input("audio sample rate is zero"));
    }
    let ratio = audio.num_samples as f64 / num_frames as f64;

    Ok(words
        .iter()
        .map(|word| TimedWord {
            text: word.label.clone(),
            start_sample: frame_to_sample(word.start, ratio),
            end_sample: frame_to_sample(word.end, ratio),
            sample_rate_hz: audio.sample_rate_hz,
        })
        .collect())
}
