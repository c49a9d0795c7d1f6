use std::path::{Path, PathBuf};

use serde_json::json;
use subalign::pipeline::batch::run_job;
use subalign::{
    discover_jobs, AlignerConfig, AlignmentError, AlignmentWorkspace, AudioOverrides,
    ForcedAligner, ForcedAlignerBuilder, SubtitleConfig, UnknownCharPolicy,
};

const LOW: f32 = -8.0;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn write_vocab(dir: &Path) -> PathBuf {
    let path = dir.join("vocab.json");
    std::fs::write(&path, r#"{"<pad>": 0, "|": 1, "H": 2, "I": 3}"#).expect("write vocab");
    path
}

fn aligner_for(vocab: &Path, unknown_chars: UnknownCharPolicy) -> ForcedAligner {
    ForcedAlignerBuilder::new(AlignerConfig {
        vocab_path: vocab.to_string_lossy().to_string(),
        unknown_chars,
        ..AlignerConfig::default()
    })
    .build()
    .expect("aligner builds")
}

/// `| H H I I |` with a clear best frame for every boundary.
fn hi_log_probs() -> Vec<Vec<f32>> {
    let peaks: [(usize, f32); 6] = [
        (1, -0.05),
        (2, -0.05),
        (2, -0.5),
        (3, -0.05),
        (3, -0.5),
        (1, -0.05),
    ];
    peaks
        .iter()
        .map(|&(class, value)| {
            let mut row = vec![LOW; 4];
            row[class] = value;
            row
        })
        .collect()
}

fn write_job(dir: &Path, id: &str, transcript: &str, with_metadata: bool) {
    let body = if with_metadata {
        json!({
            "log_probs": hi_log_probs(),
            "sample_rate_hz": 100,
            "num_samples": 600,
            "labels": ["<pad>", "|", "H", "I"],
        })
    } else {
        json!({ "log_probs": hi_log_probs() })
    };
    std::fs::write(dir.join(format!("{id}.json")), body.to_string()).expect("write emissions");
    std::fs::write(dir.join(format!("{id}.txt")), transcript).expect("write transcript");
}

fn read_subtitles(path: &Path) -> String {
    let bytes = std::fs::read(path).expect("read subtitles");
    assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF], "missing byte-order mark");
    String::from_utf8(bytes[3..].to_vec()).expect("subtitles are UTF-8")
}

#[test]
fn batch_writes_one_ass_file_per_job() {
    let input = scratch_dir("subalign_it_batch_input");
    let out = scratch_dir("subalign_it_batch_out");
    let vocab = write_vocab(&input);
    write_job(&input, "clip", "hi\n", true);

    // vocab.json has no transcript sibling, so only the clip is a job.
    let jobs = discover_jobs(&input).unwrap();
    assert_eq!(jobs.len(), 1);

    let aligner = aligner_for(&vocab, UnknownCharPolicy::Blank);
    let mut workspace = AlignmentWorkspace::default();
    let report = run_job(
        &aligner,
        &mut workspace,
        &jobs[0],
        &out,
        &SubtitleConfig::default(),
        AudioOverrides::default(),
    )
    .unwrap();
    assert_eq!(report.output, out.join("clip.ass"));
    assert_eq!(report.words, 1);

    let text = read_subtitles(&report.output);
    assert!(text.contains("[Script Info]"));
    assert!(text.contains("[V4+ Styles]"));
    assert!(text.contains("[Events]"));
    let dialogues: Vec<&str> = text.lines().filter(|l| l.starts_with("Dialogue:")).collect();
    assert_eq!(
        dialogues,
        vec!["Dialogue: 0,0:00:01.00,0:00:05.00,Default,,0,0,0,,HI"]
    );

    let _ = std::fs::remove_dir_all(&input);
    let _ = std::fs::remove_dir_all(&out);
}

#[test]
fn overrides_fill_missing_audio_metadata() {
    let input = scratch_dir("subalign_it_overrides_input");
    let out = scratch_dir("subalign_it_overrides_out");
    let vocab = write_vocab(&input);
    write_job(&input, "bare", "hi", false);
    let jobs = discover_jobs(&input).unwrap();
    let aligner = aligner_for(&vocab, UnknownCharPolicy::Blank);
    let mut workspace = AlignmentWorkspace::default();

    let err = run_job(
        &aligner,
        &mut workspace,
        &jobs[0],
        &out,
        &SubtitleConfig::default(),
        AudioOverrides::default(),
    )
    .unwrap_err();
    assert!(err.is_input_error());

    let overrides = AudioOverrides {
        sample_rate_hz: Some(200),
        num_samples: Some(1_200),
    };
    let report = run_job(
        &aligner,
        &mut workspace,
        &jobs[0],
        &out,
        &SubtitleConfig::default(),
        overrides,
    )
    .unwrap();
    let text = read_subtitles(&report.output);
    assert!(text.contains("Dialogue: 0,0:00:01.00,0:00:05.00,Default,,0,0,0,,HI"));

    let _ = std::fs::remove_dir_all(&input);
    let _ = std::fs::remove_dir_all(&out);
}

#[test]
fn wav_header_takes_priority_over_emission_metadata() {
    let input = scratch_dir("subalign_it_wav_input");
    let out = scratch_dir("subalign_it_wav_out");
    let vocab = write_vocab(&input);
    write_job(&input, "voiced", "hi", true);

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 1_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(input.join("voiced.wav"), spec).unwrap();
    for _ in 0..6_000 {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();

    let jobs = discover_jobs(&input).unwrap();
    assert!(jobs[0].audio.is_some());
    let aligner = aligner_for(&vocab, UnknownCharPolicy::Blank);
    let mut workspace = AlignmentWorkspace::default();
    let report = run_job(
        &aligner,
        &mut workspace,
        &jobs[0],
        &out,
        &SubtitleConfig::default(),
        AudioOverrides::default(),
    )
    .unwrap();

    // 6 frames over 6 s of audio: same boundaries, one second per frame.
    let text = read_subtitles(&report.output);
    assert!(text.contains("Dialogue: 0,0:00:01.00,0:00:05.00,Default,,0,0,0,,HI"));

    let _ = std::fs::remove_dir_all(&input);
    let _ = std::fs::remove_dir_all(&out);
}

#[test]
fn rejected_characters_fail_the_job_without_output() {
    let input = scratch_dir("subalign_it_reject_input");
    let out = scratch_dir("subalign_it_reject_out");
    let vocab = write_vocab(&input);
    write_job(&input, "odd", "h!", true);
    let jobs = discover_jobs(&input).unwrap();
    let aligner = aligner_for(&vocab, UnknownCharPolicy::Reject);
    let mut workspace = AlignmentWorkspace::default();

    let err = run_job(
        &aligner,
        &mut workspace,
        &jobs[0],
        &out,
        &SubtitleConfig::default(),
        AudioOverrides::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        AlignmentError::UnknownCharacter { ch: '!', position: 1 }
    ));
    assert!(!out.join("odd.ass").exists());

    let _ = std::fs::remove_dir_all(&input);
    let _ = std::fs::remove_dir_all(&out);
}

#[test]
fn label_mismatch_between_emissions_and_vocabulary_fails() {
    let input = scratch_dir("subalign_it_labels_input");
    let out = scratch_dir("subalign_it_labels_out");
    let vocab = input.join("vocab.json");
    std::fs::write(&vocab, r#"["<pad>", "|", "H", "J"]"#).unwrap();
    write_job(&input, "clip", "hi", true);
    let jobs = discover_jobs(&input).unwrap();
    let aligner = aligner_for(&vocab, UnknownCharPolicy::Blank);
    let mut workspace = AlignmentWorkspace::default();

    let err = run_job(
        &aligner,
        &mut workspace,
        &jobs[0],
        &out,
        &SubtitleConfig::default(),
        AudioOverrides::default(),
    )
    .unwrap_err();
    assert!(matches!(err, AlignmentError::InvalidInput { .. }));

    let _ = std::fs::remove_dir_all(&input);
    let _ = std::fs::remove_dir_all(&out);
}
