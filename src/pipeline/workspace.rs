use crate::alignment::trellis::Trellis;
use crate::types::PathPoint;

/// Scratch buffers reused across alignments.
///
/// Size it for the largest (frames, tokens) pair of a batch; alignments
/// that fit do not reallocate.
#[derive(Debug, Default)]
pub struct AlignmentWorkspace {
    pub(crate) trellis: Trellis,
    pub(crate) path: Vec<PathPoint>,
}

impl AlignmentWorkspace {
    pub fn with_capacity(max_frames: usize, max_tokens: usize) -> Self {
        Self {
            trellis: Trellis::with_capacity(max_frames, max_tokens),
            path: Vec::with_capacity(max_frames),
        }
    }

    /// Trellis of the most recent alignment.
    pub fn trellis(&self) -> &Trellis {
        &self.trellis
    }

    /// Path of the most recent alignment.
    pub fn path(&self) -> &[PathPoint] {
        &self.path
    }

    pub fn trellis_capacity(&self) -> usize {
        self.trellis.capacity()
    }

    pub fn path_capacity(&self) -> usize {
        self.path.capacity()
    }
}
