use crate::error::AlignmentError;

/// Per-frame log-probabilities over the label vocabulary, frame 0 earliest.
///
/// Stored row-major in one contiguous buffer so a frame is a single slice.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionMatrix {
    num_frames: usize,
    num_classes: usize,
    data: Vec<f32>,
}

impl EmissionMatrix {
    pub fn new(num_frames: usize, num_classes: usize, data: Vec<f32>) -> Result<Self, AlignmentError> {
        if num_frames == 0 {
            return Err(AlignmentError::invalid_input("emission matrix has no frames"));
        }
        if num_classes == 0 {
            return Err(AlignmentError::invalid_input("emission matrix has no classes"));
        }
        if data.len() != num_frames * num_classes {
            return Err(AlignmentError::invalid_input(format!(
                "emission buffer holds {} values, expected {num_frames}x{num_classes}",
                data.len()
            )));
        }
        Ok(Self {
            num_frames,
            num_classes,
            data,
        })
    }

    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, AlignmentError> {
        let num_frames = rows.len();
        let num_classes = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((t, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != num_classes)
        {
            return Err(AlignmentError::invalid_input(format!(
                "emission frame {t} has {} classes, frame 0 has {num_classes}",
                row.len()
            )));
        }
        let data = rows.into_iter().flatten().collect();
        Self::new(num_frames, num_classes, data)
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    #[inline]
    pub fn row(&self, frame: usize) -> &[f32] {
        let start = frame * self.num_classes;
        &self.data[start..start + self.num_classes]
    }

    #[inline]
    pub fn get(&self, frame: usize, class: usize) -> f32 {
        self.data[frame * self.num_classes + class]
    }
}

/// Length and sample rate of the audio an emission matrix was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
    pub num_samples: u64,
    pub sample_rate_hz: u32,
}

#[derive(Debug, Clone)]
pub struct AlignmentInput {
    pub sample_rate_hz: u32,
    pub samples: Vec<f32>,
    pub transcript: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSequence {
    pub tokens: Vec<usize>,
    /// Transcript character each token was produced from, parallel to `tokens`.
    pub chars: Vec<char>,
}

impl TokenSequence {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// One frame of the recovered alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub token_index: usize,
    pub time_index: usize,
    /// Probability (not log) of the emission consumed at this frame.
    pub score: f32,
}

/// Frame interval is [start, end), start inclusive/end exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharSegment {
    pub label: char,
    pub start: usize,
    pub end: usize,
    pub score: f32,
}

impl CharSegment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Frame interval is [start, end), start inclusive/end exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct WordSegment {
    pub label: String,
    pub start: usize,
    pub end: usize,
    /// Segment-length-weighted mean of the member character scores.
    pub score: f32,
}

/// A word placed on the audio timeline, in whole samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedWord {
    pub text: String,
    pub start_sample: u64,
    pub end_sample: u64,
    pub sample_rate_hz: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentOutput {
    pub segments: Vec<CharSegment>,
    pub words: Vec<WordSegment>,
    pub timed_words: Vec<TimedWord>,
    /// Path runs dropped because their token index was out of range.
    pub skipped_runs: usize,
}
