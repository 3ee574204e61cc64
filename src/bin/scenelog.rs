use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use scenelog::{
    AudioBackend, BackendFactory, CpuSurface, FfmpegAudio, FfmpegSink, FfmpegSinkOpts, FrameLoop,
    FrameSink, PngSequenceSink, Rng64, Show, ShowConfig, SilentAudio, create_show, is_tool_on_path,
    locate,
};

#[derive(Parser, Debug)]
#[command(name = "scenelog", version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    cmd: Option<Command>,

    /// Options for the default `run` command.
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Regenerate the scene log and play the show (default).
    Run(RunArgs),
    /// Regenerate the scene log only.
    Write,
    /// Report which scenes the current scene log contains.
    Inspect,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Show config JSON. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for scene creation and admission draws (wall clock when omitted).
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Write every frame as a PNG into this directory.
    #[arg(long, conflicts_with = "mp4")]
    frames_dir: Option<PathBuf>,

    /// Encode frames into an MP4 (requires `ffmpeg` on PATH).
    #[arg(long)]
    mp4: Option<PathBuf>,

    /// Play scenes without sound.
    #[arg(long)]
    mute: bool,

    /// Render as fast as possible instead of pacing to the frame rate.
    #[arg(long)]
    no_realtime: bool,

    /// Stop after this many frames even if the show is not over.
    #[arg(long)]
    max_frames: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.common.verbose);

    let cfg = load_config(&cli.common)?;
    let mut rng = cli.common.seed.map(Rng64::new).unwrap_or_else(Rng64::from_time);

    match cli.cmd {
        None => cmd_run(&cfg, &mut rng, cli.run),
        Some(Command::Run(args)) => cmd_run(&cfg, &mut rng, args),
        Some(Command::Write) => cmd_write(&cfg, &mut rng),
        Some(Command::Inspect) => cmd_inspect(&cfg),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(common: &CommonArgs) -> anyhow::Result<ShowConfig> {
    match &common.config {
        Some(path) => ShowConfig::load(path)
            .with_context(|| format!("load show config '{}'", path.display())),
        None => {
            let cfg = ShowConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }
}

fn cmd_write(cfg: &ShowConfig, rng: &mut Rng64) -> anyhow::Result<()> {
    let created = create_show(cfg, rng).context("write scene log")?;
    println!(
        "{}: snowfall={} fireworks={}",
        cfg.log_path.display(),
        created.snowfall,
        created.fireworks
    );
    Ok(())
}

fn cmd_inspect(cfg: &ShowConfig) -> anyhow::Result<()> {
    for (name, scene) in [
        ("snowfall", &cfg.scenes.snowfall),
        ("fireworks", &cfg.scenes.fireworks),
    ] {
        let marker = scene.marker()?;
        match locate(&cfg.log_path, &marker) {
            Ok(found) => println!(
                "{name}: marker '{marker}' at offset {}, audio {} bytes",
                found.marker_offset,
                found.audio.len()
            ),
            Err(e) if e.is_not_found() => println!("{name}: not present"),
            Err(e) => {
                return Err(e).with_context(|| format!("inspect '{}'", cfg.log_path.display()));
            }
        }
    }
    Ok(())
}

fn cmd_run(cfg: &ShowConfig, rng: &mut Rng64, args: RunArgs) -> anyhow::Result<()> {
    create_show(cfg, rng).context("write scene log")?;

    let audio = audio_backend(args.mute);
    let mut surface = CpuSurface::new(cfg.canvas.width, cfg.canvas.height)?;
    if let Some(font) = cfg.read_font()? {
        surface = surface.with_font(font, cfg.font_size_px)?;
    }

    let mut sink: Option<Box<dyn FrameSink>> = match (&args.frames_dir, &args.mp4) {
        (Some(dir), _) => Some(Box::new(PngSequenceSink::new(dir))),
        (None, Some(out)) => Some(Box::new(FfmpegSink::new(FfmpegSinkOpts::new(out)))),
        (None, None) => None,
    };

    let mut show = Show::from_config(cfg, audio, rng)?;
    let frame_loop = FrameLoop::new(cfg.canvas.clone())?
        .realtime(!args.no_realtime)
        .max_frames(args.max_frames);

    let stats = frame_loop.run(
        &mut surface,
        sink.as_deref_mut(),
        |s| s.invert_y(),
        |s, _| show.draw_frame(s),
    )?;
    show.shutdown();

    eprintln!(
        "played {} frames in {:.2}s{}",
        stats.frames,
        stats.elapsed.as_secs_f64(),
        if stats.hit_frame_limit {
            " (frame limit reached)"
        } else {
            ""
        }
    );
    Ok(())
}

fn audio_backend(mute: bool) -> BackendFactory {
    if mute {
        return SilentAudio::factory();
    }
    if !is_tool_on_path("ffplay") {
        tracing::warn!("ffplay not found on PATH, playing without sound");
        return SilentAudio::factory();
    }
    Arc::new(|| Box::new(FfmpegAudio::new()) as Box<dyn AudioBackend>)
}
