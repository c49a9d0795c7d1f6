use std::path::Path;

use serde::Deserialize;

use crate::error::AlignmentError;

/// What the tokenizer does with a transcript character missing from the
/// vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCharPolicy {
    /// Substitute the blank index and log a warning.
    #[default]
    Blank,
    /// Drop the character and log a warning.
    Skip,
    /// Fail with `AlignmentError::UnknownCharacter`.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseFolding {
    /// Fold the transcript to the case of a single-case vocabulary.
    #[default]
    Auto,
    Preserve,
}

#[derive(Debug, Clone)]
pub struct AlignerConfig {
    pub vocab_path: String,
    pub blank_id: usize,
    pub separator: char,
    pub unknown_chars: UnknownCharPolicy,
    pub case_folding: CaseFolding,
}

impl AlignerConfig {
    pub const DEFAULT_BLANK_ID: usize = 0;
    pub const DEFAULT_SEPARATOR: char = '|';
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            vocab_path: String::new(),
            blank_id: Self::DEFAULT_BLANK_ID,
            separator: Self::DEFAULT_SEPARATOR,
            unknown_chars: UnknownCharPolicy::default(),
            case_folding: CaseFolding::default(),
        }
    }
}

/// Header and style fields of generated `.ass` files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubtitleConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_play_res_x")]
    pub play_res_x: u32,
    #[serde(default = "default_play_res_y")]
    pub play_res_y: u32,
    #[serde(default = "default_true")]
    pub scaled_border_and_shadow: bool,
    #[serde(default = "default_ycbcr_matrix")]
    pub ycbcr_matrix: String,
    #[serde(default = "default_true")]
    pub write_bom: bool,
    #[serde(default)]
    pub style: AssStyle,
}

fn default_title() -> String {
    "Default ASS file".to_string()
}
fn default_play_res_x() -> u32 {
    1080
}
fn default_play_res_y() -> u32 {
    1920
}
fn default_ycbcr_matrix() -> String {
    "TV.709".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            play_res_x: default_play_res_x(),
            play_res_y: default_play_res_y(),
            scaled_border_and_shadow: true,
            ycbcr_matrix: default_ycbcr_matrix(),
            write_bom: true,
            style: AssStyle::default(),
        }
    }
}

impl SubtitleConfig {
    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read subtitle config", e))?;
        serde_json::from_str(&data).map_err(|e| AlignmentError::json("parse subtitle config", e))
    }
}

/// The single `Default` style line. Colours use the ASS `&HAABBGGRR` notation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssStyle {
    pub font_name: String,
    pub font_size: u32,
    pub primary_colour: String,
    pub secondary_colour: String,
    pub outline_colour: String,
    pub back_colour: String,
    pub bold: i32,
    pub italic: i32,
    pub underline: i32,
    pub strike_out: i32,
    pub scale_x: u32,
    pub scale_y: u32,
    pub spacing: i32,
    pub angle: i32,
    pub border_style: u32,
    pub outline: u32,
    pub shadow: u32,
    /// Numpad-style anchor; 5 is middle-center.
    pub alignment: u32,
    pub margin_l: u32,
    pub margin_r: u32,
    pub margin_v: u32,
    pub encoding: u32,
}

impl Default for AssStyle {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            font_size: 144,
            primary_colour: "&H00FFFFFF".to_string(),
            secondary_colour: "&H000000FF".to_string(),
            outline_colour: "&H00000000".to_string(),
            back_colour: "&H00000000".to_string(),
            bold: 0,
            italic: 0,
            underline: 0,
            strike_out: 0,
            scale_x: 100,
            scale_y: 100,
            spacing: 0,
            angle: 0,
            border_style: 1,
            outline: 3,
            shadow: 3,
            alignment: 5,
            margin_l: 10,
            margin_r: 10,
            margin_v: 10,
            encoding: 1,
        }
    }
}
