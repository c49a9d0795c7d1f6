use crate::types::{CharSegment, WordSegment};

/// Groups character segments into words, splitting on `separator`.
///
/// Consecutive separators produce no word. A word spans from its first
/// segment's start to its last segment's end; its score is the segment
/// scores weighted by segment length in frames.
pub fn merge_words(segments: &[CharSegment], separator: char) -> Vec<WordSegment> {
    segments
        .split(|seg| seg.label == separator)
        .filter_map(close_word)
        .collect()
}

fn close_word(run: &[CharSegment]) -> Option<WordSegment> {
    let (first, last) = (run.first()?, run.last()?);
    let label: String = run.iter().map(|seg| seg.label).collect();
    let total_frames: usize = run.iter().map(CharSegment::len).sum();
    let score = if total_frames == 0 {
        0.0
    } else {
        let weighted: f64 = run
            .iter()
            .map(|seg| seg.score as f64 * seg.len() as f64)
            .sum();
        (weighted / total_frames as f64) as f32
    };
    Some(WordSegment {
        label,
        start: first.start,
        end: last.end,
        score,
    })
}
