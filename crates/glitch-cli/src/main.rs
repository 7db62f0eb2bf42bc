use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glam::Vec2;
use glitch_core::{
    ChromaticOffset, GlitchConfig, GlitchEffect, GlitchIntensity, GlitchMode, GlitchUniforms,
    MemoryTextures, StdRandom,
};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs the glitch controller headless and prints per-frame uniforms", long_about = None)]
struct Cli {
    /// JSON file with glitch configuration (defaults are used when omitted)
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Activation mode
    #[arg(long, value_enum, default_value_t = ModeArg::Sporadic)]
    mode: ModeArg,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Frames per second of the simulated host loop
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Drive a chromatic aberration offset and include it in the output
    #[arg(long)]
    chromatic: bool,

    /// Write the generated perturbation map to a PNG file
    #[arg(long, value_name = "PNG")]
    export_map: Option<PathBuf>,

    /// Only print the summary, not the per-frame records
    #[arg(long)]
    quiet: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum ModeArg {
    Disabled,
    Sporadic,
    ConstantMild,
    ConstantWild,
}

impl From<ModeArg> for GlitchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Disabled => GlitchMode::Disabled,
            ModeArg::Sporadic => GlitchMode::Sporadic,
            ModeArg::ConstantMild => GlitchMode::ConstantMild,
            ModeArg::ConstantWild => GlitchMode::ConstantWild,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

/// One NDJSON line on stdout.
#[derive(Serialize)]
struct FrameRecord<'a> {
    frame: u32,
    time: f32,
    intensity: Option<GlitchIntensity>,
    uniforms: &'a GlitchUniforms,
    #[serde(skip_serializing_if = "Option::is_none")]
    chromatic_offset: Option<Vec2>,
}

#[derive(Default)]
struct Summary {
    active: u32,
    strong: u32,
    activations: u32,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(cli.log_level).into())
        .from_env_lossy();

    let subscriber_builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match cli.log_format {
        LogFormat::Json => subscriber_builder.json().init(),
        LogFormat::Pretty => subscriber_builder.pretty().init(),
    }

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => GlitchConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GlitchConfig::default(),
    };
    let fps = cli.fps.max(1);

    let (random, mut textures) = match cli.seed {
        Some(seed) => (StdRandom::seeded(seed), MemoryTextures::seeded(seed)),
        None => (StdRandom::from_entropy(), MemoryTextures::new()),
    };

    let mut builder = GlitchEffect::builder(config).random_source(Box::new(random));
    let offset = cli.chromatic.then(ChromaticOffset::new);
    if let Some(offset) = &offset {
        builder = builder.chromatic_offset(offset.clone());
    }
    let mut effect = builder
        .build(&mut textures)
        .context("failed to create glitch effect")?;
    effect.set_mode(cli.mode.into());

    info!(mode = %effect.mode(), frames = cli.frames, fps, "starting simulation");

    if let Some(path) = &cli.export_map {
        if let Err(e) = export_map(&effect, &textures, path) {
            effect.dispose(&mut textures);
            return Err(e);
        }
        info!("Perturbation map written to {:?}", path);
    }

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = run_frames(cli, effect, &mut textures, offset.as_ref(), &mut out)?;

    info!(
        active_frames = summary.active,
        strong_frames = summary.strong,
        activations = summary.activations,
        "simulation complete"
    );
    Ok(())
}

/// Drives the effect for `cli.frames` frames and disposes it, even when
/// writing a record fails (e.g. stdout closed by `| head`).
fn run_frames(
    cli: &Cli,
    mut effect: GlitchEffect,
    textures: &mut MemoryTextures,
    offset: Option<&ChromaticOffset>,
    out: &mut impl Write,
) -> Result<Summary> {
    let result = write_frames(cli, &mut effect, offset, out);
    effect.dispose(textures);
    result
}

fn write_frames(
    cli: &Cli,
    effect: &mut GlitchEffect,
    offset: Option<&ChromaticOffset>,
    out: &mut impl Write,
) -> Result<Summary> {
    let delta = 1.0 / cli.fps.max(1) as f32;
    let mut summary = Summary::default();
    let mut was_active = false;

    for frame in 0..cli.frames {
        effect.update(delta);

        if effect.is_active() {
            summary.active += 1;
            if !was_active {
                summary.activations += 1;
            }
        }
        if effect.intensity() == Some(GlitchIntensity::Strong) {
            summary.strong += 1;
        }
        was_active = effect.is_active();

        if !cli.quiet {
            let record = FrameRecord {
                frame,
                time: (frame + 1) as f32 * delta,
                intensity: effect.intensity(),
                uniforms: effect.uniforms(),
                chromatic_offset: offset.map(|o| o.get()),
            };
            serde_json::to_writer(&mut *out, &record).context("failed to write frame record")?;
            writeln!(out).context("failed to write frame record")?;
        }
    }
    out.flush().context("failed to flush frame records")?;
    Ok(summary)
}

fn export_map(effect: &GlitchEffect, textures: &MemoryTextures, path: &Path) -> Result<()> {
    let handle = effect
        .perturbation_map()
        .context("effect has no perturbation map")?;
    let data = textures
        .get(handle)
        .with_context(|| format!("{handle} is not a CPU texture"))?;
    let image = image::RgbaImage::from_raw(data.width, data.height, data.pixels.clone())
        .context("texture size does not match its pixel buffer")?;
    image
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
