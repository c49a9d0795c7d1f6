use crate::alignment::timing::words_to_timed;
use crate::alignment::tokenization::{
    format_transcript, source_position, TokenizerOptions, Vocabulary,
};
use crate::error::AlignmentError;
use crate::pipeline::traits::{EmissionProvider, SequenceAligner, Tokenizer, WordGrouper};
use crate::pipeline::workspace::AlignmentWorkspace;
use crate::types::{AlignmentInput, AlignmentOutput, AudioInfo, EmissionMatrix, TokenSequence};

pub struct ForcedAligner {
    vocab: Vocabulary,
    tokenizer_options: TokenizerOptions,
    tokenizer: Box<dyn Tokenizer>,
    sequence_aligner: Box<dyn SequenceAligner>,
    word_grouper: Box<dyn WordGrouper>,
}

pub(crate) struct ForcedAlignerParts {
    pub vocab: Vocabulary,
    pub tokenizer_options: TokenizerOptions,
    pub tokenizer: Box<dyn Tokenizer>,
    pub sequence_aligner: Box<dyn SequenceAligner>,
    pub word_grouper: Box<dyn WordGrouper>,
}

impl ForcedAligner {
    pub(crate) fn from_parts(parts: ForcedAlignerParts) -> Self {
        Self {
            vocab: parts.vocab,
            tokenizer_options: parts.tokenizer_options,
            tokenizer: parts.tokenizer,
            sequence_aligner: parts.sequence_aligner,
            word_grouper: parts.word_grouper,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn blank_id(&self) -> usize {
        self.tokenizer_options.blank_id
    }

    pub fn separator(&self) -> char {
        self.tokenizer_options.separator
    }

    /// Wraps the transcript words in separators and maps them to labels.
    ///
    /// An `UnknownCharacter` position is the character index in `transcript`.
    pub fn tokenize(&self, transcript: &str) -> Result<TokenSequence, AlignmentError> {
        let formatted = format_transcript(transcript, self.separator());
        self.tokenizer
            .tokenize(&formatted, &self.vocab, &self.tokenizer_options)
            .map_err(|err| match err {
                AlignmentError::UnknownCharacter { ch, position } => {
                    AlignmentError::UnknownCharacter {
                        ch,
                        position: source_position(transcript, position).unwrap_or(position),
                    }
                }
                other => other,
            })
    }

    /// Runs the acoustic model on raw audio, then aligns its emissions.
    pub fn align(
        &self,
        provider: &mut dyn EmissionProvider,
        input: &AlignmentInput,
    ) -> Result<AlignmentOutput, AlignmentError> {
        if input.samples.is_empty() {
            return Err(AlignmentError::invalid_input("audio has no samples"));
        }
        let emissions = provider.infer(&input.samples, input.sample_rate_hz)?;
        tracing::debug!(
            provider = %provider.label(),
            frames = emissions.num_frames(),
            classes = emissions.num_classes(),
            "aligner: emissions computed"
        );
        let audio = AudioInfo {
            num_samples: input.samples.len() as u64,
            sample_rate_hz: input.sample_rate_hz,
        };
        self.align_emissions(&emissions, &input.transcript, audio)
    }

    pub fn align_emissions(
        &self,
        emissions: &EmissionMatrix,
        transcript: &str,
        audio: AudioInfo,
    ) -> Result<AlignmentOutput, AlignmentError> {
        let mut workspace = AlignmentWorkspace::default();
        self.align_with_workspace(&mut workspace, emissions, transcript, audio)
    }

    /// Same as [`ForcedAligner::align_emissions`], reusing the buffers of
    /// `workspace` for the trellis and the path.
    pub fn align_with_workspace(
        &self,
        workspace: &mut AlignmentWorkspace,
        emissions: &EmissionMatrix,
        transcript: &str,
        audio: AudioInfo,
    ) -> Result<AlignmentOutput, AlignmentError> {
        if emissions.num_classes() != self.vocab.len() {
            return Err(AlignmentError::invalid_input(format!(
                "emission has {} classes, vocabulary has {} labels",
                emissions.num_classes(),
                self.vocab.len()
            )));
        }
        if audio.sample_rate_hz == 0 {
            return Err(AlignmentError::invalid_input("audio sample rate is zero"));
        }

        let token_sequence = self.tokenize(transcript)?;
        let frames = emissions.num_frames();
        if token_sequence.len() > frames {
            return Err(AlignmentError::Infeasible {
                tokens: token_sequence.len(),
                frames,
            });
        }

        self.sequence_aligner.align_path(
            emissions,
            &token_sequence.tokens,
            self.blank_id(),
            &mut workspace.trellis,
            &mut workspace.path,
        )?;
        let grouped = self
            .word_grouper
            .group_words(&workspace.path, &token_sequence, self.separator());
        let timed_words = words_to_timed(&grouped.words, frames, audio)?;

        tracing::debug!(
            frames,
            tokens = token_sequence.len(),
            segments = grouped.segments.len(),
            words = grouped.words.len(),
            skipped_runs = grouped.skipped_runs,
            "aligner: alignment complete"
        );

        Ok(AlignmentOutput {
            segments: grouped.segments,
            words: grouped.words,
            timed_words,
            skipped_runs: grouped.skipped_runs,
        })
    }
}
