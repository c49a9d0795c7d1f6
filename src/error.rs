use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("WAV error while {context}: {source}")]
    Wav {
        context: &'static str,
        #[source]
        source: hound::Error,
    },
    #[error("transcript produced no tokens")]
    EmptyTranscript,
    #[error("transcript character {ch:?} at position {position} is not in the vocabulary")]
    UnknownCharacter {
        ch: char,
        /// Character index in the caller's transcript, before case folding.
        position: usize,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("alignment infeasible: {tokens} tokens cannot fit in {frames} frames")]
    Infeasible { tokens: usize, frames: usize },
    #[error("alignment invariant broken: {message}")]
    Internal { message: String },
}

impl AlignmentError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn wav(context: &'static str, source: hound::Error) -> Self {
        Self::Wav { context, source }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Errors caused by the transcript or emission data rather than the
    /// aligner itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyTranscript | Self::UnknownCharacter { .. } | Self::InvalidInput { .. }
        )
    }

    /// Well-formed inputs whose transcript needs more frames than the audio has.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible { .. })
    }

    /// Input and infeasibility errors, both raised before the trellis is built.
    pub fn is_rejected_before_alignment(&self) -> bool {
        self.is_input_error() || self.is_infeasible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_classified() {
        assert!(AlignmentError::EmptyTranscript.is_input_error());
        assert!(AlignmentError::UnknownCharacter { ch: 'x', position: 3 }.is_input_error());
        assert!(AlignmentError::invalid_input("ragged rows").is_input_error());
        assert!(!AlignmentError::internal("ran out of frames").is_input_error());
    }

    #[test]
    fn infeasible_is_not_an_input_error() {
        let err = AlignmentError::Infeasible {
            tokens: 10,
            frames: 4,
        };
        assert!(!err.is_input_error());
        assert!(err.is_infeasible());
        assert!(err.is_rejected_before_alignment());
        assert!(AlignmentError::EmptyTranscript.is_rejected_before_alignment());
        assert!(!AlignmentError::EmptyTranscript.is_infeasible());
        assert!(!AlignmentError::internal("ran out of frames").is_rejected_before_alignment());
    }

    #[test]
    fn messages_name_the_offending_values() {
        let err = AlignmentError::Infeasible {
            tokens: 10,
            frames: 4,
        };
        assert_eq!(
            err.to_string(),
            "alignment infeasible: 10 tokens cannot fit in 4 frames"
        );
        let err = AlignmentError::UnknownCharacter { ch: 'é', position: 2 };
        assert!(err.to_string().contains("'é'"));
    }
}
