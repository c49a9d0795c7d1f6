use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use subalign::pipeline::batch::run_job;
use subalign::{
    discover_jobs, AlignerConfig, AlignmentWorkspace, AudioOverrides, CaseFolding, ForcedAligner,
    ForcedAlignerBuilder, SubtitleConfig, SubtitleJob, UnknownCharPolicy,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "subalign")]
#[command(about = "Align transcripts to CTC emissions and write word-level ASS subtitles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Align one transcript and write `<id>.ass`.
    Align(AlignArgs),
    /// Align every `<id>.json` + `<id>.txt` pair in a directory.
    Batch(BatchArgs),
}

#[derive(Debug, Args)]
struct CommonArgs {
    #[arg(long, env = "SUBALIGN_VOCAB")]
    vocab: PathBuf,
    #[arg(long, env = "SUBALIGN_OUT", default_value = "subtitles")]
    out: PathBuf,
    #[arg(long, env = "SUBALIGN_SEPARATOR", default_value_t = AlignerConfig::DEFAULT_SEPARATOR)]
    separator: char,
    #[arg(long, env = "SUBALIGN_BLANK_ID", default_value_t = AlignerConfig::DEFAULT_BLANK_ID)]
    blank_id: usize,
    #[arg(
        long,
        env = "SUBALIGN_UNKNOWN_CHARS",
        value_enum,
        default_value_t = UnknownCharsChoice::Blank
    )]
    unknown_chars: UnknownCharsChoice,
    #[arg(long, env = "SUBALIGN_CASE", value_enum, default_value_t = CaseChoice::Auto)]
    case: CaseChoice,
    #[arg(long, env = "SUBALIGN_SUBTITLE_CONFIG")]
    subtitle_config: Option<PathBuf>,
    /// Sample rate used when neither a WAV file nor the emission file gives one.
    #[arg(long, env = "SUBALIGN_SAMPLE_RATE")]
    sample_rate: Option<u32>,
    /// Audio length in samples, same fallback rules as `--sample-rate`.
    #[arg(long, env = "SUBALIGN_NUM_SAMPLES")]
    num_samples: Option<u64>,
}

#[derive(Debug, Args)]
struct AlignArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long)]
    emissions: PathBuf,
    #[arg(long)]
    transcript: PathBuf,
    #[arg(long)]
    audio: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct BatchArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, env = "SUBALIGN_INPUT")]
    input: PathBuf,
    /// Stop at the first failing job instead of logging and skipping it.
    #[arg(long, default_value_t = false)]
    fail_fast: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum UnknownCharsChoice {
    Blank,
    Skip,
    Reject,
}

impl UnknownCharsChoice {
    fn policy(self) -> UnknownCharPolicy {
        match self {
            Self::Blank => UnknownCharPolicy::Blank,
            Self::Skip => UnknownCharPolicy::Skip,
            Self::Reject => UnknownCharPolicy::Reject,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CaseChoice {
    Auto,
    Preserve,
}

impl CaseChoice {
    fn folding(self) -> CaseFolding {
        match self {
            Self::Auto => CaseFolding::Auto,
            Self::Preserve => CaseFolding::Preserve,
        }
    }
}

struct Session {
    aligner: ForcedAligner,
    subtitle_config: SubtitleConfig,
    overrides: AudioOverrides,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    match cli.command {
        Command::Align(args) => run_align(args),
        Command::Batch(args) => run_batch(args),
    }
}

fn open_session(common: &CommonArgs) -> Result<Session, String> {
    let config = AlignerConfig {
        vocab_path: common.vocab.to_string_lossy().to_string(),
        blank_id: common.blank_id,
        separator: common.separator,
        unknown_chars: common.unknown_chars.policy(),
        case_folding: common.case.folding(),
    };
    let aligner = ForcedAlignerBuilder::new(config)
        .build()
        .map_err(|err| format!("failed to load vocabulary '{}': {err}", common.vocab.display()))?;

    let subtitle_config = match common.subtitle_config.as_deref() {
        Some(path) => SubtitleConfig::load(path)
            .map_err(|err| format!("failed to load subtitle config '{}': {err}", path.display()))?,
        None => SubtitleConfig::default(),
    };

    Ok(Session {
        aligner,
        subtitle_config,
        overrides: AudioOverrides {
            sample_rate_hz: common.sample_rate,
            num_samples: common.num_samples,
        },
    })
}

fn run_align(args: AlignArgs) -> Result<(), String> {
    let session = open_session(&args.common)?;
    let job = SubtitleJob::from_paths(args.emissions, args.transcript, args.audio)
        .map_err(|err| err.to_string())?;
    let mut workspace = AlignmentWorkspace::default();

    let report = run_job(
        &session.aligner,
        &mut workspace,
        &job,
        &args.common.out,
        &session.subtitle_config,
        session.overrides,
    )
    .map_err(|err| format!("{}: {err}", job.id))?;
    println!("{}", report.output.display());
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<(), String> {
    require_dir(&args.input)?;
    let session = open_session(&args.common)?;
    let jobs = discover_jobs(&args.input).map_err(|err| err.to_string())?;
    if jobs.is_empty() {
        return Err(format!(
            "no <id>.json + <id>.txt pairs found in '{}'",
            args.input.display()
        ));
    }

    let started = Instant::now();
    let progress = ProgressBar::new(jobs.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );

    let mut workspace = AlignmentWorkspace::default();
    let mut written = 0usize;
    let mut failed = 0usize;
    for job in &jobs {
        progress.set_message(job.id.clone());
        match run_job(
            &session.aligner,
            &mut workspace,
            job,
            &args.common.out,
            &session.subtitle_config,
            session.overrides,
        ) {
            Ok(report) => {
                written += 1;
                if report.skipped_runs > 0 {
                    tracing::warn!(
                        id = %report.id,
                        skipped_runs = report.skipped_runs,
                        "path runs outside the token sequence were dropped"
                    );
                }
            }
            Err(err) if args.fail_fast => {
                progress.abandon_with_message(format!("{} failed", job.id));
                return Err(format!("{}: {err}", job.id));
            }
            Err(err) => {
                failed += 1;
                progress.suspend(|| {
                    tracing::error!(
                        id = %job.id,
                        input_error = err.is_input_error(),
                        infeasible = err.is_infeasible(),
                        "{err}"
                    );
                });
            }
        }
        progress.inc(1);
    }
    progress.finish_with_message("done");

    tracing::info!(
        written,
        failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        out = %args.common.out.display(),
        "batch complete"
    );
    if written == 0 {
        return Err(format!("all {failed} jobs failed"));
    }
    Ok(())
}

fn require_dir(path: &Path) -> Result<(), String> {
    if path.is_dir() {
        return Ok(());
    }
    Err(format!("input directory does not exist: {}", path.display()))
}
