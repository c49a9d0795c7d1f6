use crate::alignment::tokenization::{TokenizerOptions, Vocabulary};
use crate::alignment::trellis::Trellis;
use crate::error::AlignmentError;
use crate::types::{CharSegment, EmissionMatrix, PathPoint, TokenSequence, WordSegment};

pub trait Tokenizer: Send + Sync {
    fn tokenize(
        &self,
        transcript: &str,
        vocab: &Vocabulary,
        options: &TokenizerOptions,
    ) -> Result<TokenSequence, AlignmentError>;
}

pub trait SequenceAligner: Send + Sync {
    /// Writes one path point per emission frame into `path`, reusing
    /// `trellis` as scratch space.
    fn align_path(
        &self,
        emissions: &EmissionMatrix,
        tokens: &[usize],
        blank_id: usize,
        trellis: &mut Trellis,
        path: &mut Vec<PathPoint>,
    ) -> Result<(), AlignmentError>;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupedWords {
    pub segments: Vec<CharSegment>,
    pub words: Vec<WordSegment>,
    pub skipped_runs: usize,
}

pub trait WordGrouper: Send + Sync {
    fn group_words(
        &self,
        path: &[PathPoint],
        token_sequence: &TokenSequence,
        separator: char,
    ) -> GroupedWords;
}

/// Acoustic model producing log-probability emissions from raw audio.
///
/// Takes `&mut self`: model instances are usually not re-entrant, so a
/// shared instance has to sit behind a `Mutex` (or each worker loads its own).
pub trait EmissionProvider: Send {
    fn infer(
        &mut self,
        samples: &[f32],
        sample_rate_hz: u32,
    ) -> Result<EmissionMatrix, AlignmentError>;

    fn label(&self) -> String;
}
