use crate::alignment::backtrack::backtrack_into;
use crate::alignment::grouping::merge_words;
use crate::alignment::segments::merge_repeats;
use crate::alignment::tokenization::{build_token_sequence, TokenizerOptions, Vocabulary};
use crate::alignment::trellis::Trellis;
use crate::error::AlignmentError;
use crate::pipeline::traits::{GroupedWords, SequenceAligner, Tokenizer, WordGrouper};
use crate::types::{EmissionMatrix, PathPoint, TokenSequence};

pub struct LookupTokenizer;

impl Tokenizer for LookupTokenizer {
    fn tokenize(
        &self,
        transcript: &str,
        vocab: &Vocabulary,
        options: &TokenizerOptions,
    ) -> Result<TokenSequence, AlignmentError> {
        build_token_sequence(transcript, vocab, options)
    }
}

pub struct TrellisSequenceAligner;

impl SequenceAligner for TrellisSequenceAligner {
    fn align_path(
        &self,
        emissions: &EmissionMatrix,
        tokens: &[usize],
        blank_id: usize,
        trellis: &mut Trellis,
        path: &mut Vec<PathPoint>,
    ) -> Result<(), AlignmentError> {
        trellis.rebuild(emissions, tokens, blank_id)?;
        backtrack_into(trellis, emissions, tokens, blank_id, path)
    }
}

pub struct SeparatorWordGrouper;

impl WordGrouper for SeparatorWordGrouper {
    fn group_words(
        &self,
        path: &[PathPoint],
        token_sequence: &TokenSequence,
        separator: char,
    ) -> GroupedWords {
        let merged = merge_repeats(path, token_sequence);
        let words = merge_words(&merged.segments, separator);
        GroupedWords {
            segments: merged.segments,
            words,
            skipped_runs: merged.skipped_runs,
        }
    }
}
