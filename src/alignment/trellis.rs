use crate::error::AlignmentError;
use crate::types::EmissionMatrix;

/// Cumulative log-likelihood scores over (frame, token position).
///
/// Entry (t, j) is the best score of having aligned the first `j + 1` tokens
/// using frames `0..=t`. Unreachable states hold negative infinity. The
/// buffer is kept between [`Trellis::rebuild`] calls so batches can reuse it.
#[derive(Debug, Clone, Default)]
pub struct Trellis {
    num_frames: usize,
    num_tokens: usize,
    scores: Vec<f32>,
}

impl Trellis {
    pub fn with_capacity(max_frames: usize, max_tokens: usize) -> Self {
        Self {
            num_frames: 0,
            num_tokens: 0,
            scores: Vec::with_capacity(max_frames * max_tokens),
        }
    }

    pub fn build(
        emissions: &EmissionMatrix,
        tokens: &[usize],
        blank_id: usize,
    ) -> Result<Self, AlignmentError> {
        let mut trellis = Self::default();
        trellis.rebuild(emissions, tokens, blank_id)?;
        Ok(trellis)
    }

    /// Recomputes the trellis in place for a new emission matrix and token
    /// sequence.
    ///
    /// Column 0 accumulates the blank score of every frame after frame 0;
    /// each later cell takes the better of staying on token `j` (consuming
    /// the blank emission of the entered frame) or advancing from `j - 1`
    /// (consuming the entered frame's emission for `token[j]`).
    pub fn rebuild(
        &mut self,
        emissions: &EmissionMatrix,
        tokens: &[usize],
        blank_id: usize,
    ) -> Result<(), AlignmentError> {
        check_alignment_inputs(emissions, tokens, blank_id)?;

        let f = emissions.num_frames();
        let n = tokens.len();
        self.num_frames = f;
        self.num_tokens = n;
        self.scores.clear();
        self.scores.resize(f * n, f32::NEG_INFINITY);

        self.scores[0] = 0.0;
        for t in 1..f {
            self.scores[t * n] = self.scores[(t - 1) * n] + emissions.get(t, blank_id);
        }

        for t in 0..f - 1 {
            let entered = emissions.row(t + 1);
            let stay_emit = entered[blank_id];
            let (head, tail) = self.scores.split_at_mut((t + 1) * n);
            let prev = &head[t * n..];
            let next = &mut tail[..n];
            // Token j cannot be reached before frame j.
            let last_reachable = (t + 1).min(n - 1);
            for j in 1..=last_reachable {
                let stay = prev[j] + stay_emit;
                let advance = prev[j - 1] + entered[tokens[j]];
                next[j] = stay.max(advance);
            }
        }

        tracing::debug!(
            frames = f,
            tokens = n,
            final_score = self.final_score(),
            "trellis: built"
        );
        Ok(())
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn num_tokens(&self) -> usize {
        self.num_tokens
    }

    #[inline]
    pub fn get(&self, frame: usize, token: usize) -> f32 {
        self.scores[frame * self.num_tokens + token]
    }

    pub fn row(&self, frame: usize) -> &[f32] {
        let start = frame * self.num_tokens;
        &self.scores[start..start + self.num_tokens]
    }

    /// Score of the complete alignment, trellis(F-1, N-1).
    pub fn final_score(&self) -> f32 {
        if self.scores.is_empty() {
            return f32::NEG_INFINITY;
        }
        self.get(self.num_frames - 1, self.num_tokens - 1)
    }

    pub fn capacity(&self) -> usize {
        self.scores.capacity()
    }
}

/// Rejects inputs the dynamic program cannot handle, before any allocation.
pub(crate) fn check_alignment_inputs(
    emissions: &EmissionMatrix,
    tokens: &[usize],
    blank_id: usize,
) -> Result<(), AlignmentError> {
    if tokens.is_empty() {
        return Err(AlignmentError::EmptyTranscript);
    }
    let frames = emissions.num_frames();
    if tokens.len() > frames {
        return Err(AlignmentError::Infeasible {
            tokens: tokens.len(),
            frames,
        });
    }
    let classes = emissions.num_classes();
    if blank_id >= classes {
        return Err(AlignmentError::invalid_input(format!(
            "blank index {blank_id} is outside the {classes} emission classes"
        )));
    }
    if let Some((pos, &token)) = tokens.iter().enumerate().find(|&(_, &t)| t >= classes) {
        return Err(AlignmentError::invalid_input(format!(
            "token {pos} has label index {token}, emission has {classes} classes"
        )));
    }
    Ok(())
}
