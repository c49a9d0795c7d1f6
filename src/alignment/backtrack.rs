use crate::alignment::trellis::Trellis;
use crate::error::AlignmentError;
use crate::types::{EmissionMatrix, PathPoint};

pub fn backtrack(
    trellis: &Trellis,
    emissions: &EmissionMatrix,
    tokens: &[usize],
    blank_id: usize,
) -> Result<Vec<PathPoint>, AlignmentError> {
    let mut path = Vec::with_capacity(emissions.num_frames());
    backtrack_into(trellis, emissions, tokens, blank_id, &mut path)?;
    Ok(path)
}

/// Walks the trellis from (F-1, N-1) back to frame 0, writing one point per
/// frame into `path` in chronological order.
///
/// Frame `t` is assigned to token `j` and the step moves to `j - 1` only when
/// advancing scores strictly higher than staying. Exact ties stay on the
/// current token, which places boundaries as late as the scores allow. Once
/// token 0 is reached the remaining frames are padded onto it with the
/// blank probability.
pub fn backtrack_into(
    trellis: &Trellis,
    emissions: &EmissionMatrix,
    tokens: &[usize],
    blank_id: usize,
    path: &mut Vec<PathPoint>,
) -> Result<(), AlignmentError> {
    let f = emissions.num_frames();
    let n = tokens.len();
    if trellis.num_frames() != f || trellis.num_tokens() != n || n == 0 {
        return Err(AlignmentError::internal(format!(
            "trellis is {}x{}, inputs are {f}x{n}",
            trellis.num_frames(),
            trellis.num_tokens()
        )));
    }

    path.clear();
    path.reserve(f);

    let mut t = f - 1;
    let mut j = n - 1;
    while t > 0 && j > 0 {
        let row = emissions.row(t);
        let p_stay = row[blank_id];
        let p_change = row[tokens[j]];
        let stayed = trellis.get(t - 1, j) + p_stay;
        let changed = trellis.get(t - 1, j - 1) + p_change;

        if changed > stayed {
            path.push(point(j, t, p_change));
            j -= 1;
        } else {
            path.push(point(j, t, p_stay));
        }
        t -= 1;
    }

    if j > 0 {
        return Err(AlignmentError::internal(format!(
            "backtracking reached frame 0 with {j} of {n} tokens unresolved"
        )));
    }

    loop {
        path.push(point(0, t, emissions.get(t, blank_id)));
        if t == 0 {
            break;
        }
        t -= 1;
    }

    path.reverse();
    Ok(())
}

#[inline]
fn point(token_index: usize, time_index: usize, log_prob: f32) -> PathPoint {
    PathPoint {
        token_index,
        time_index,
        score: log_prob.exp(),
    }
}
