//! Subtitle documents built from timed words.

pub mod ass;

pub use ass::{render_ass, subtitle_path, write_ass};
