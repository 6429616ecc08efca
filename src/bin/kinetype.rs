use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "kinetype", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene script to numbered PNG frames.
    Render(RenderArgs),
    /// Parse and validate a scene script without rendering.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Directory receiving `frame_00000.png`, `frame_00001.png`, ...
    #[arg(long)]
    out_dir: PathBuf,

    /// Number of frames to render at the script's frame rate.
    #[arg(long, default_value_t = 60)]
    frames: u64,

    /// Override the script's font with this `.ttf`/`.otf` file.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input scene script JSON.
    #[arg(long)]
    script: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn script_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let script = kinetype::SceneScript::from_path(&args.script)?;
    eprintln!(
        "ok: {} boxes, {} chains, {}x{} @ {} fps",
        script.boxes.len(),
        script.chains.len(),
        script.canvas.width,
        script.canvas.height,
        script.scheduler.target_frame_rate
    );
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut script = kinetype::SceneScript::from_path(&args.script)?;
    if let Some(font) = args.font {
        // Resolved against the cwd, not the script's directory.
        let font = std::path::absolute(&font)
            .with_context(|| format!("resolve font path '{}'", font.display()))?;
        script.font = kinetype::FontSource::File(font);
    }

    let glyphs = script.load_glyphs(script_dir(&args.script))?;
    let surface = kinetype::CpuSurface::new(script.canvas.width, script.canvas.height)?;
    let mut scene = script.build(surface, glyphs)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let step_ms = scene.scheduler.interval_ms();
    let out_dir = args.out_dir.clone();
    let summary =
        kinetype::run_synthetic_with(&mut scene.scheduler, args.frames, step_ms, |i, surface| {
            surface.save_png(&out_dir.join(format!("frame_{i:05}.png")))
        })?;

    eprintln!(
        "wrote {} frames to {}",
        summary.painted,
        args.out_dir.display()
    );
    Ok(())
}
