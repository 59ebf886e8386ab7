use clap::{Parser, Subcommand};
use cli::{SpinnerJob, load_frames};
use color_eyre::eyre::Result;
use spinner::{FrameSet, Pipeline, SpinnerSettings, layout_spinner};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Vectorize the input frames and lay them out in one run
    Build {
        /// Path to the TOML or JSON job file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Vectorize the input frames and cache them for later layouts
    Vectorize {
        #[arg(short, long)]
        config: PathBuf,
        /// Where to write the vectorized frames
        #[arg(short, long)]
        frames: PathBuf,
    },
    /// Lay out previously vectorized frames without converting them again
    Layout {
        #[arg(short, long)]
        config: PathBuf,
        /// Frames written by `vectorize`
        #[arg(short, long)]
        frames: PathBuf,
    },
    /// Print the JSON schema of the job settings
    Schema,
    /// Write a job file with default settings
    Template {
        /// Output path; .toml or .json
        output: PathBuf,
        #[arg(long, default_value = "frames")]
        input: String,
        #[arg(long, default_value = "spinner.json")]
        design: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Build { config } => {
            let job = SpinnerJob::from_file(config)?;
            let frames = vectorize(&job)?;
            write_design(&job, FrameSet::new(frames))?;
        }
        Commands::Vectorize { config, frames } => {
            let job = SpinnerJob::from_file(config)?;
            let set = FrameSet::new(vectorize(&job)?);
            set.save_json(frames)?;
            info!("Saved {} vectorized frames to {:?}", set.frames.len(), frames);
        }
        Commands::Layout { config, frames } => {
            let job = SpinnerJob::from_file(config)?;
            write_design(&job, FrameSet::from_json_file(frames)?)?;
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&SpinnerSettings::schema())?);
        }
        Commands::Template { output, input, design } => {
            write_template(output, input, design)?;
        }
    }

    Ok(())
}

fn vectorize(job: &SpinnerJob) -> Result<Vec<spinner::Frame>> {
    let buffers = load_frames(&job.input)?;
    info!("Loaded {} frames from {}", buffers.len(), job.input);

    let pipeline = Pipeline::from_options(&job.vectorize)?;
    info!("{} mode: {}", job.vectorize.mode, job.vectorize.mode.description());
    info!("{}", pipeline.info());

    let started = Instant::now();
    let frames = pipeline.process_frames(
        &buffers,
        |progress| {
            info!(
                "Vectorized frame {}/{} ({:.0}%)",
                progress.completed,
                progress.total,
                progress.fraction() * 100.0
            )
        },
        &AtomicBool::new(false),
    )?;

    let empty = frames.iter().filter(|f| f.is_empty()).count();
    if empty > 0 {
        warn!("{empty} frames produced no outlines; check the threshold or detail level");
    }
    info!("Vectorized {} frames in {:.2?}", frames.len(), started.elapsed());
    Ok(frames)
}

fn write_design(job: &SpinnerJob, set: FrameSet) -> Result<()> {
    let design = layout_spinner(&set.frames, &job.layout)?;
    if design.outline_style != job.layout.outline_style {
        warn!(
            "{} outline needs at least 3 slots, drew {} instead",
            job.layout.outline_style, design.outline_style
        );
    }

    if let Some(parent) = Path::new(&job.output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    design.save_json(&job.output)?;

    info!(
        "Placed {} frames on a spinner of diameter {} -> {}",
        design.frames.len(),
        design.size,
        job.output
    );
    Ok(())
}

fn write_template(output: &Path, input: &str, design: &str) -> Result<()> {
    let job = SpinnerJob::new(input, design);
    job.to_file(output)?;
    info!("Template job written to {:?}", output);
    Ok(())
}
