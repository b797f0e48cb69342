//! Kinetic CLI
//!
//! Replays a motion scene without a renderer and prints what the host would
//! read each frame.

mod scene;
mod simulate;

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use scene::Scene;
use simulate::{EffectValue, FrameReport, Simulation};

#[derive(Parser)]
#[command(name = "kinetic")]
#[command(author, version, about = "Headless driver for Kinetic motion scenes")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scene and print per-frame effect output
    Simulate {
        /// Scene file (scene.toml)
        scene: PathBuf,

        /// Frames per simulated second
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Override the scene's duration (seconds)
        #[arg(long)]
        duration: Option<f64>,

        /// Print every Nth frame
        #[arg(long, default_value = "1")]
        every: u64,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Validate a scene file
    Check {
        /// Scene file (scene.toml)
        scene: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Aligned text, one row per frame
    Table,
    /// One JSON object per frame
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Simulate {
            scene,
            fps,
            duration,
            every,
            format,
        } => cmd_simulate(&scene, fps, duration, every, format),
        Commands::Check { scene } => cmd_check(&scene),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn cmd_simulate(
    path: &Path,
    fps: f64,
    duration: Option<f64>,
    every: u64,
    format: OutputFormat,
) -> Result<()> {
    let mut scene = Scene::load(path)?;
    if let Some(duration) = duration {
        scene.duration = duration;
        scene.validate().context("Invalid --duration")?;
    }
    let every = every.max(1);

    let mut simulation = Simulation::new(&scene)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    simulation.run(fps, |report| {
        if report.frame % every != 0 {
            return Ok(());
        }
        match format {
            OutputFormat::Table => write_row(&mut out, report)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut out, report).context("Failed to encode frame")?;
                writeln!(out)?;
            }
        }
        Ok(())
    })?;

    out.flush()?;
    Ok(())
}

fn write_row(out: &mut impl Write, report: &FrameReport<'_>) -> Result<()> {
    write!(
        out,
        "{:>6} {:>8.3}s  ptr({:>7.1},{:>7.1})",
        report.frame, report.time, report.pointer.x, report.pointer.y
    )?;
    for sample in &report.effects {
        let value = match sample.value {
            EffectValue::Spring { value } | EffectValue::Loop { value } => format!("{value:.2}"),
            EffectValue::Offset { x, y } => format!("({x:.2}, {y:.2})"),
            EffectValue::Reveal { phase, pose } => format!(
                "{:?} o={:.2} t=({:.1}, {:.1}) s={:.2}",
                phase, pose.opacity, pose.translate_x, pose.translate_y, pose.scale
            ),
            EffectValue::Counter { displayed } => displayed.to_string(),
        };
        write!(out, "  {}={}", sample.name, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let scene = Scene::load(path)?;
    // Building the effects catches anything validation alone can't
    Simulation::new(&scene)?;

    tracing::info!(
        "{}: {} effects, {} pointer waypoints, {} scroll events over {}s",
        path.display(),
        scene.effects.len(),
        scene.pointer.len(),
        scene.scroll.len(),
        scene.duration
    );
    println!("ok");
    Ok(())
}
