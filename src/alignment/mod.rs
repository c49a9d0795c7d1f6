//! Forced alignment of a token sequence against an emission matrix.
//!
//! Stages run in order: [`tokenization`] builds the token sequence,
//! [`trellis`] fills the dynamic-programming scores, [`backtrack`] recovers
//! one token per frame, [`segments`] collapses the path into character runs,
//! [`grouping`] joins characters into words and [`timing`] places the words
//! on the audio timeline.

pub mod backtrack;
pub mod grouping;
pub mod segments;
pub mod timing;
pub mod tokenization;
pub mod trellis;

pub use backtrack::{backtrack, backtrack_into};
pub use grouping::merge_words;
pub use segments::{merge_repeats, MergedSegments};
pub use timing::{format_timestamp, frame_to_sample, words_to_timed, AssTimestamp};
pub use tokenization::{
    build_token_sequence, format_transcript, source_position, TokenizerOptions, Vocabulary,
};
pub use trellis::Trellis;
