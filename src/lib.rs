pub mod alignment;
pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod subtitles;
pub mod types;

pub use config::{AlignerConfig, AssStyle, CaseFolding, SubtitleConfig, UnknownCharPolicy};
pub use error::AlignmentError;
pub use pipeline::batch::{discover_jobs, run_job, AudioOverrides, JobReport, SubtitleJob};
pub use pipeline::builder::ForcedAlignerBuilder;
pub use pipeline::emission_file::EmissionFile;
pub use pipeline::runtime::ForcedAligner;
pub use pipeline::traits::{EmissionProvider, SequenceAligner, Tokenizer, WordGrouper};
pub use pipeline::workspace::AlignmentWorkspace;
pub use subtitles::{render_ass, write_ass};
pub use types::{
    AlignmentInput, AlignmentOutput, AudioInfo, CharSegment, EmissionMatrix, PathPoint,
    TimedWord, TokenSequence, WordSegment,
};
