use crate::types::{CharSegment, PathPoint, TokenSequence};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedSegments {
    pub segments: Vec<CharSegment>,
    /// Runs dropped because their token index was past the token sequence.
    pub skipped_runs: usize,
}

/// Collapses runs of path points that share a token index into character
/// segments labelled with the transcript character of that token.
pub fn merge_repeats(path: &[PathPoint], token_sequence: &TokenSequence) -> MergedSegments {
    let mut merged = MergedSegments::default();

    for run in path.chunk_by(|a, b| a.token_index == b.token_index) {
        let first = run[0];
        let last = run[run.len() - 1];
        let Some(&label) = token_sequence.chars.get(first.token_index) else {
            tracing::warn!(
                token_index = first.token_index,
                token_count = token_sequence.len(),
                start_frame = first.time_index,
                "segments: token index out of range, skipping run"
            );
            merged.skipped_runs += 1;
            continue;
        };
        let score = run.iter().map(|p| p.score as f64).sum::<f64>() / run.len() as f64;
        merged.segments.push(CharSegment {
            label,
            start: first.time_index,
            end: last.time_index + 1,
            score: score as f32,
        });
    }

    merged
}
