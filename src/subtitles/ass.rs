use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::config::{AssStyle, SubtitleConfig};
use crate::error::AlignmentError;
use crate::types::TimedWord;

const UTF8_BOM: &str = "\u{feff}";

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Renders an ASS document with one `Dialogue` event per word.
///
/// Word text is trimmed; the byte-order mark is added by [`write_ass`], not here.
pub fn render_ass(words: &[TimedWord], config: &SubtitleConfig) -> String {
    let mut out = String::with_capacity(1024 + words.len() * 64);

    // Writing into a String cannot fail.
    let _ = writeln!(out, "[Script Info]");
    let _ = writeln!(out, "; Script generated by subalign");
    let _ = writeln!(out, "Title: {}", config.title);
    let _ = writeln!(out, "ScriptType: v4.00+");
    let _ = writeln!(out, "PlayResX: {}", config.play_res_x);
    let _ = writeln!(out, "PlayResY: {}", config.play_res_y);
    let _ = writeln!(
        out,
        "ScaledBorderAndShadow: {}",
        if config.scaled_border_and_shadow { "yes" } else { "no" }
    );
    let _ = writeln!(out, "YCbCr Matrix: {}", config.ycbcr_matrix);
    out.push('\n');

    let _ = writeln!(out, "[V4+ Styles]");
    let _ = writeln!(out, "{STYLE_FORMAT}");
    let _ = writeln!(out, "{}", style_line(&config.style));
    out.push('\n');

    let _ = writeln!(out, "[Events]");
    let _ = writeln!(out, "{EVENT_FORMAT}");
    for word in words {
        let _ = writeln!(
            out,
            "Dialogue: 0,{},{},Default,,0,0,0,,{}",
            word.start_timestamp(),
            word.end_timestamp(),
            word.text.trim()
        );
    }
    out
}

fn style_line(style: &AssStyle) -> String {
    format!(
        "Style: Default,{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        style.font_name,
        style.font_size,
        style.primary_colour,
        style.secondary_colour,
        style.outline_colour,
        style.back_colour,
        style.bold,
        style.italic,
        style.underline,
        style.strike_out,
        style.scale_x,
        style.scale_y,
        style.spacing,
        style.angle,
        style.border_style,
        style.outline,
        style.shadow,
        style.alignment,
        style.margin_l,
        style.margin_r,
        style.margin_v,
        style.encoding,
    )
}

/// `<out_dir>/<id>.ass`
pub fn subtitle_path(out_dir: &Path, id: &str) -> PathBuf {
    out_dir.join(format!("{id}.ass"))
}

/// Writes the rendered document to `path`, creating its parent directory.
pub fn write_ass(
    path: &Path,
    words: &[TimedWord],
    config: &SubtitleConfig,
) -> Result<(), AlignmentError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AlignmentError::io("create subtitle directory", e))?;
    }
    let body = render_ass(words, config);
    let contents = if config.write_bom {
        let mut with_bom = String::with_capacity(UTF8_BOM.len() + body.len());
        with_bom.push_str(UTF8_BOM);
        with_bom.push_str(&body);
        with_bom
    } else {
        body
    };
    std::fs::write(path, contents).map_err(|e| AlignmentError::io("write subtitle file", e))?;
    tracing::debug!(path = %path.display(), events = words.len(), "subtitles: wrote ASS file");
    Ok(())
}
