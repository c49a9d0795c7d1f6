use std::path::Path;

use crate::alignment::tokenization::{TokenizerOptions, Vocabulary};
use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::pipeline::defaults::{LookupTokenizer, SeparatorWordGrouper, TrellisSequenceAligner};
use crate::pipeline::runtime::{ForcedAligner, ForcedAlignerParts};
use crate::pipeline::traits::{SequenceAligner, Tokenizer, WordGrouper};

pub struct ForcedAlignerBuilder {
    config: AlignerConfig,
    vocab: Option<Vocabulary>,
    tokenizer: Option<Box<dyn Tokenizer>>,
    sequence_aligner: Option<Box<dyn SequenceAligner>>,
    word_grouper: Option<Box<dyn WordGrouper>>,
}

impl ForcedAlignerBuilder {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            vocab: None,
            tokenizer: None,
            sequence_aligner: None,
            word_grouper: None,
        }
    }

    /// Uses `vocab` instead of reading `AlignerConfig::vocab_path`.
    pub fn with_vocabulary(mut self, vocab: Vocabulary) -> Self {
        self.vocab = Some(vocab);
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn with_sequence_aligner(mut self, sequence_aligner: Box<dyn SequenceAligner>) -> Self {
        self.sequence_aligner = Some(sequence_aligner);
        self
    }

    pub fn with_word_grouper(mut self, word_grouper: Box<dyn WordGrouper>) -> Self {
        self.word_grouper = Some(word_grouper);
        self
    }

    pub fn build(self) -> Result<ForcedAligner, AlignmentError> {
        let vocab = match self.vocab {
            Some(vocab) => vocab,
            None => {
                if self.config.vocab_path.is_empty() {
                    return Err(AlignmentError::invalid_input(
                        "no vocabulary supplied and vocab_path is empty",
                    ));
                }
                Vocabulary::load(Path::new(&self.config.vocab_path))?
            }
        };
        if vocab.is_empty() {
            return Err(AlignmentError::invalid_input("vocabulary has no labels"));
        }

        let tokenizer_options = TokenizerOptions::from(&self.config);
        if tokenizer_options.blank_id >= vocab.len() {
            return Err(AlignmentError::invalid_input(format!(
                "blank index {} is outside the {}-label vocabulary",
                tokenizer_options.blank_id,
                vocab.len()
            )));
        }

        match vocab.index_of(tokenizer_options.separator) {
            Some(separator_id) => tracing::debug!(
                labels = vocab.len(),
                blank_id = tokenizer_options.blank_id,
                separator_id,
                "builder: vocabulary ready"
            ),
            None => tracing::debug!(
                labels = vocab.len(),
                blank_id = tokenizer_options.blank_id,
                separator = %tokenizer_options.separator,
                "builder: separator has no label, word boundaries align as blank"
            ),
        }

        Ok(ForcedAligner::from_parts(ForcedAlignerParts {
            vocab,
            tokenizer_options,
            tokenizer: self.tokenizer.unwrap_or_else(|| Box::new(LookupTokenizer)),
            sequence_aligner: self
                .sequence_aligner
                .unwrap_or_else(|| Box::new(TrellisSequenceAligner)),
            word_grouper: self
                .word_grouper
                .unwrap_or_else(|| Box::new(SeparatorWordGrouper)),
        }))
    }
}
