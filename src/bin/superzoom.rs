use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use superzoom::prefs::store::{is_muted, set_muted};
use superzoom::{
    AnimationController, CanvasDimensions, ExternalPlayerTrack, FfmpegSink, FfmpegSinkOpts,
    FixedStepScheduler, FocusPoint, FrameRenderer, GifSink, GifSinkOpts, ImageAsset,
    JsonPreferences, RealtimeScheduler, RunOutcome, ShareLink, SourceLoader,
    Surface, SuperzoomConfig, TickOutcome, VideoFormat, drive, load_with_fallback, record,
};

#[derive(Parser, Debug)]
#[command(name = "superzoom", version)]
struct Cli {
    /// Engine config JSON (defaults apply to every missing field).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preferences JSON file (defaults to the platform config dir).
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame of the animation as a PNG.
    Frame(FrameArgs),
    /// Record one run as a looping GIF.
    Gif(GifArgs),
    /// Record one run as a video (requires `ffmpeg` on PATH).
    Video(VideoArgs),
    /// Timing and audio preview: runs the loop at real-time pace with the soundtrack.
    ///
    /// Frames are rendered off-screen and never shown or written; use `frame`, `gif`
    /// or `video` to look at the output.
    Preview(PreviewArgs),
    /// Print a share link for an image URL and focus point.
    Share(ShareArgs),
    /// Decode a share link.
    Open(OpenArgs),
    /// Show or change the persisted mute flag.
    Mute(MuteArgs),
}

#[derive(Parser, Debug)]
struct SourceArgs {
    /// Image path or http(s) URL.
    #[arg(long)]
    image: String,

    /// Focus point as `<x>x<y>` fractions of the image, e.g. `0.4x0.35`.
    #[arg(long, value_parser = parse_focus, default_value = "0.5x0.5")]
    focus: FocusPoint,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    src: SourceArgs,

    /// Elapsed time into the run, in milliseconds.
    #[arg(long, default_value_t = 0.0)]
    at_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct GifArgs {
    #[command(flatten)]
    src: SourceArgs,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Webm,
    Mp4,
}

#[derive(Parser, Debug)]
struct VideoArgs {
    #[command(flatten)]
    src: SourceArgs,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Container format.
    #[arg(long, value_enum, default_value_t = FormatArg::Webm)]
    format: FormatArg,

    /// Soundtrack muxed into the video.
    #[arg(long)]
    audio: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    src: SourceArgs,

    /// Stop after this many loops (0 plays forever).
    #[arg(long, default_value_t = 1)]
    loops: u64,

    /// Soundtrack played while unmuted.
    #[arg(long)]
    audio: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ShareArgs {
    #[command(flatten)]
    src: SourceArgs,

    /// Emit the `/i/<x>x<y>/<url>` path form instead of the query form.
    #[arg(long, default_value_t = false)]
    path_form: bool,
}

#[derive(Parser, Debug)]
struct OpenArgs {
    /// Share link (query or path form).
    #[arg(long)]
    link: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Parser, Debug)]
struct MuteArgs {
    /// New state; prints the current state when omitted.
    #[arg(value_enum)]
    state: Option<Switch>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let cfg = match cli.config.as_deref() {
        Some(p) => SuperzoomConfig::from_path(p)?,
        None => SuperzoomConfig::default(),
    };
    match cli.cmd {
        Command::Frame(args) => cmd_frame(&cfg, args),
        Command::Gif(args) => cmd_gif(&cfg, args),
        Command::Video(args) => cmd_video(&cfg, args),
        Command::Preview(args) => cmd_preview(&cfg, cli.prefs.as_deref(), args),
        Command::Share(args) => cmd_share(&cfg, args),
        Command::Open(args) => cmd_open(args),
        Command::Mute(args) => cmd_mute(cli.prefs.as_deref(), args),
    }
}

fn parse_focus(s: &str) -> Result<FocusPoint, String> {
    let (x, y) = s
        .split_once('x')
        .ok_or_else(|| format!("expected <x>x<y>, got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y '{y}': {e}"))?;
    let focus = FocusPoint::new(x, y);
    if !focus.is_finite() {
        return Err("focus must be finite".to_string());
    }
    Ok(focus)
}

fn load_image(cfg: &SuperzoomConfig, src: &str) -> anyhow::Result<ImageAsset> {
    let loader = SourceLoader::new()?;
    let image = load_with_fallback(&loader, src, cfg.proxy_prefix.as_deref())
        .with_context(|| format!("load image '{src}'"))?;
    Ok(image)
}

fn build_controller(cfg: &SuperzoomConfig, image: ImageAsset) -> anyhow::Result<AnimationController> {
    let dims = CanvasDimensions::fit(image.width, image.height, cfg.max_width)?;
    let mut controller = AnimationController::new(image, dims, cfg.curve.clone())?
        .with_render_settings(cfg.render_settings());
    if let Some(overlay) = cfg.text_overlay()? {
        controller = controller.with_overlay(overlay);
    }
    Ok(controller)
}

fn open_prefs(path: Option<&Path>) -> anyhow::Result<JsonPreferences> {
    Ok(match path {
        Some(p) => JsonPreferences::open(p),
        None => JsonPreferences::open_default()?,
    })
}

fn cmd_frame(cfg: &SuperzoomConfig, args: FrameArgs) -> anyhow::Result<()> {
    let asset = load_image(cfg, &args.src.image)?;
    let dims = CanvasDimensions::fit(asset.width, asset.height, cfg.max_width)?;
    let overlay = cfg.text_overlay()?;
    let state = cfg.curve.value_at(args.at_ms);

    let mut surface = Surface::new(dims)?;
    let mut renderer = FrameRenderer::new(cfg.render_settings());
    renderer.render(&mut surface, &asset, args.src.focus, &state, overlay.as_ref())?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    surface
        .snapshot()
        .to_rgba_image()?
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_gif(cfg: &SuperzoomConfig, args: GifArgs) -> anyhow::Result<()> {
    let image = load_image(cfg, &args.src.image)?;
    let mut controller = build_controller(cfg, image)?;

    let mut opts = GifSinkOpts::new(&args.out_dir);
    opts.export_name = cfg.export_name.clone();
    opts.sample_hz = cfg.gif_sample_hz;
    let mut sink = GifSink::new(opts)?;

    let mut scheduler = FixedStepScheduler::from_fps(cfg.fps()?);
    let artifact = record(&mut controller, &mut scheduler, &mut sink, args.src.focus)?;
    eprintln!(
        "wrote {} ({} frames)",
        artifact.path.unwrap_or_default().display(),
        artifact.frame_count
    );
    Ok(())
}

fn cmd_video(cfg: &SuperzoomConfig, args: VideoArgs) -> anyhow::Result<()> {
    let image = load_image(cfg, &args.src.image)?;
    let mut controller = build_controller(cfg, image)?;

    let format = match args.format {
        FormatArg::Webm => VideoFormat::WebM,
        FormatArg::Mp4 => VideoFormat::Mp4,
    };
    let mut opts = FfmpegSinkOpts::in_dir(&args.out_dir, &cfg.export_name, format);
    opts.fps = cfg.video_fps;
    opts.bg_rgba = cfg.background;
    opts.audio_path = args.audio;
    let mut sink = FfmpegSink::new(opts)?;

    let mut scheduler = FixedStepScheduler::from_fps(cfg.fps()?);
    let artifact = record(&mut controller, &mut scheduler, &mut sink, args.src.focus)?;
    eprintln!(
        "wrote {} ({} frames, {})",
        artifact.path.unwrap_or_default().display(),
        artifact.frame_count,
        artifact.mime
    );
    Ok(())
}

fn cmd_preview(
    cfg: &SuperzoomConfig,
    prefs_path: Option<&Path>,
    args: PreviewArgs,
) -> anyhow::Result<()> {
    let muted = is_muted(&open_prefs(prefs_path)?);
    let image = load_image(cfg, &args.src.image)?;
    let mut controller = build_controller(cfg, image)?;
    if let Some(audio) = args.audio {
        controller = controller.with_audio(Box::new(ExternalPlayerTrack::new(audio)));
    }
    controller.set_muted(muted);

    let mut scheduler = RealtimeScheduler::new(cfg.fps()?);
    let total_ms = controller.curve().total_duration_ms();
    let handle = controller.run_loop(args.src.focus);
    let mut reported = 0;
    let out = drive(&mut controller, &mut scheduler, |c, _| {
        let loops = c.completed_loops();
        if loops > reported {
            reported = loops;
            eprintln!("loop {loops} done ({total_ms:.0}ms)");
        }
        if args.loops > 0 && loops >= args.loops {
            c.cancel();
        }
    });

    match (out, handle.wait()?) {
        (TickOutcome::Cancelled, RunOutcome::Cancelled) => {
            eprintln!("preview finished after {reported} loop(s)");
            Ok(())
        }
        (out, outcome) => anyhow::bail!("preview stopped unexpectedly: {out:?} / {outcome:?}"),
    }
}

fn cmd_share(cfg: &SuperzoomConfig, args: ShareArgs) -> anyhow::Result<()> {
    let link = ShareLink::new(args.src.focus.rounded(), args.src.image);
    if args.path_form {
        println!("{}", link.encode_path(&cfg.share_base));
    } else {
        println!("{}", link.encode(&cfg.share_base));
    }
    Ok(())
}

fn cmd_open(args: OpenArgs) -> anyhow::Result<()> {
    let link = if !args.link.contains('?') && args.link.contains("/i/") {
        ShareLink::decode_path(&args.link)
    } else {
        ShareLink::decode(&args.link)
    };
    println!("{}", serde_json::to_string_pretty(&link)?);
    Ok(())
}

fn cmd_mute(prefs_path: Option<&Path>, args: MuteArgs) -> anyhow::Result<()> {
    let mut prefs = open_prefs(prefs_path)?;
    if let Some(state) = args.state {
        set_muted(&mut prefs, matches!(state, Switch::On))?;
    }
    let muted = is_muted(&prefs);
    println!("{}", if muted { "muted" } else { "unmuted" });
    tracing::debug!(path = %prefs.path().display(), muted, "mute preference");
    Ok(())
}
