//! One subtitle file per (emission file, transcript) pair.

use std::path::{Path, PathBuf};

use crate::audio::read_wav_info;
use crate::config::SubtitleConfig;
use crate::error::AlignmentError;
use crate::pipeline::emission_file::EmissionFile;
use crate::pipeline::runtime::ForcedAligner;
use crate::pipeline::workspace::AlignmentWorkspace;
use crate::subtitles::{subtitle_path, write_ass};
use crate::types::AudioInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleJob {
    pub id: String,
    pub emissions: PathBuf,
    pub transcript: PathBuf,
    pub audio: Option<PathBuf>,
}

impl SubtitleJob {
    /// Job for explicit paths, named after the audio file, or the emission
    /// file when there is no audio.
    pub fn from_paths(
        emissions: PathBuf,
        transcript: PathBuf,
        audio: Option<PathBuf>,
    ) -> Result<Self, AlignmentError> {
        let id = audio
            .as_deref()
            .unwrap_or(emissions.as_path())
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                AlignmentError::invalid_input(format!(
                    "cannot derive a subtitle name from {}",
                    emissions.display()
                ))
            })?;
        Ok(Self {
            id,
            emissions,
            transcript,
            audio,
        })
    }
}

/// Audio metadata used when neither a WAV header nor the emission file
/// provides it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioOverrides {
    pub sample_rate_hz: Option<u32>,
    pub num_samples: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub id: String,
    pub output: PathBuf,
    pub words: usize,
    pub skipped_runs: usize,
}

/// Finds every `<id>.json` in `dir` that has a sibling `<id>.txt`, sorted by id.
///
/// A sibling `<id>.wav` is attached when present. Emission files without a
/// transcript are logged and ignored.
pub fn discover_jobs(dir: &Path) -> Result<Vec<SubtitleJob>, AlignmentError> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| AlignmentError::io("read input directory", e))?;

    let mut jobs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AlignmentError::io("read input directory entry", e))?;
        let path = entry.path();
        if !path.is_file() || !has_extension(&path, "json") {
            continue;
        }
        let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        let transcript = path.with_extension("txt");
        if !transcript.is_file() {
            tracing::warn!(id = %id, "batch: emission file has no transcript, skipping");
            continue;
        }
        let wav = path.with_extension("wav");
        jobs.push(SubtitleJob {
            id,
            emissions: path,
            transcript,
            audio: wav.is_file().then_some(wav),
        });
    }
    jobs.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(jobs)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// WAV header first, then the emission file's own fields, then `overrides`.
pub fn resolve_audio_info(
    wav: Option<&Path>,
    file: &EmissionFile,
    overrides: AudioOverrides,
) -> Result<AudioInfo, AlignmentError> {
    if let Some(wav) = wav {
        return read_wav_info(wav);
    }
    let sample_rate_hz = file
        .sample_rate_hz
        .or(overrides.sample_rate_hz)
        .ok_or_else(|| AlignmentError::invalid_input("audio sample rate is unknown"))?;
    let num_samples = file
        .num_samples
        .or(overrides.num_samples)
        .ok_or_else(|| AlignmentError::invalid_input("audio length in samples is unknown"))?;
    Ok(AudioInfo {
        num_samples,
        sample_rate_hz,
    })
}

/// Aligns one job and writes `<out_dir>/<id>.ass`.
pub fn run_job(
    aligner: &ForcedAligner,
    workspace: &mut AlignmentWorkspace,
    job: &SubtitleJob,
    out_dir: &Path,
    subtitle_config: &SubtitleConfig,
    overrides: AudioOverrides,
) -> Result<JobReport, AlignmentError> {
    let file = EmissionFile::load(&job.emissions)?;
    file.check_labels(aligner.vocabulary())?;
    let audio = resolve_audio_info(job.audio.as_deref(), &file, overrides)?;
    let emissions = file.into_matrix()?;
    let transcript = std::fs::read_to_string(&job.transcript)
        .map_err(|e| AlignmentError::io("read transcript", e))?;

    let output = aligner.align_with_workspace(workspace, &emissions, &transcript, audio)?;
    let path = subtitle_path(out_dir, &job.id);
    write_ass(&path, &output.timed_words, subtitle_config)?;

    tracing::info!(
        id = %job.id,
        words = output.timed_words.len(),
        path = %path.display(),
        "batch: subtitles written"
    );
    Ok(JobReport {
        id: job.id.clone(),
        output: path,
        words: output.timed_words.len(),
        skipped_runs: output.skipped_runs,
    })
}
