use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::gif::file_name_of;
use crate::encode::sink::{ExportArtifact, RecordingSink, SamplingClock, SinkConfig, export_file_name};
use crate::foundation::error::{SuperzoomError, SuperzoomResult};
use crate::render::surface::Surface;

/// Container/codec pair chosen by the output extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoFormat {
    /// VP9 video with Opus audio in WebM.
    WebM,
    /// H.264 video with AAC audio in MP4.
    Mp4,
}

impl VideoFormat {
    /// Pick the format from a path's extension (`.mp4` or anything else as WebM).
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("mp4") | Some("m4v") | Some("mov") => Self::Mp4,
            _ => Self::WebM,
        }
    }

    /// Native file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::WebM => "webm",
            Self::Mp4 => "mp4",
        }
    }

    /// MIME type of the container.
    pub fn mime(self) -> &'static str {
        match self {
            Self::WebM => "video/webm",
            Self::Mp4 => "video/mp4",
        }
    }

    fn codec_args(self) -> &'static [&'static str] {
        match self {
            Self::WebM => &["-c:v", "libvpx-vp9", "-pix_fmt", "yuv420p", "-b:v", "0", "-crf", "32"],
            Self::Mp4 => &["-c:v", "libx264", "-pix_fmt", "yuv420p", "-movflags", "+faststart"],
        }
    }

    fn audio_codec(self) -> &'static str {
        match self {
            Self::WebM => "libopus",
            Self::Mp4 => "aac",
        }
    }
}

/// Options for [`FfmpegSink`] output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output file path; its extension selects the format.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Output frame rate; the surface is sampled at this rate.
    pub fps: f64,
    /// Soundtrack muxed alongside the frames, trimmed to the video length.
    pub audio_path: Option<PathBuf>,
}

impl FfmpegSinkOpts {
    /// Create options for `out_path` at 30 fps without audio.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
            fps: 30.0,
            audio_path: None,
        }
    }

    /// `<out_dir>/<export_name>.<ext>` for `format`.
    pub fn in_dir(out_dir: &Path, export_name: &str, format: VideoFormat) -> Self {
        Self::new(out_dir.join(export_file_name(export_name, format.extension())))
    }
}

/// Sink that spawns the system `ffmpeg` and streams sampled frames to stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    format: VideoFormat,
    clock: SamplingClock,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    frame_count: usize,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> SuperzoomResult<Self> {
        let clock = SamplingClock::new(opts.fps)?;
        Ok(Self {
            format: VideoFormat::from_path(&opts.out_path),
            opts,
            clock,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            frame_count: 0,
        })
    }

    /// Output format selected from the path.
    pub fn format(&self) -> VideoFormat {
        self.format
    }

    fn write_frame(&mut self) -> SuperzoomResult<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SuperzoomError::recording("ffmpeg sink is already finalized"));
        };
        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            SuperzoomError::recording(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        self.frame_count += 1;
        Ok(())
    }
}

impl RecordingSink for FfmpegSink {
    fn supports_capture(&self) -> bool {
        is_ffmpeg_on_path()
    }

    fn begin(&mut self, cfg: SinkConfig) -> SuperzoomResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SuperzoomError::recording(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if let Some(audio) = self.opts.audio_path.as_ref()
            && !audio.is_file()
        {
            return Err(SuperzoomError::recording(format!(
                "audio file '{}' does not exist",
                audio.display()
            )));
        }

        ensure_parent_dir(&self.opts.out_path)
            .map_err(|e| SuperzoomError::recording(format!("{e}")))?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(SuperzoomError::recording(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(SuperzoomError::recording(
                "ffmpeg is required for video export, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        // Input: raw RGBA8 frames, flattened before writing (see `sample`).
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format_rate(self.opts.fps),
            "-i",
            "pipe:0",
        ]);

        if let Some(audio) = self.opts.audio_path.as_ref() {
            cmd.arg("-i")
                .arg(audio)
                .args(["-map", "0:v:0", "-map", "1:a:0"]);
        } else {
            cmd.arg("-an");
        }
        if let Some(filter) = even_pad_filter(cfg.width, cfg.height) {
            cmd.args(["-vf", filter]);
        }
        cmd.args(self.format.codec_args());
        if self.opts.audio_path.is_some() {
            cmd.args(["-c:a", self.format.audio_codec(), "-shortest"]);
        }
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            SuperzoomError::recording(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SuperzoomError::recording("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SuperzoomError::recording("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            path = %self.opts.out_path.display(),
            format = ?self.format,
            fps = self.opts.fps,
            "ffmpeg recording started"
        );
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.clock.reset();
        self.frame_count = 0;
        Ok(())
    }

    fn sample(&mut self, elapsed_ms: f64, surface: &Surface) -> SuperzoomResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| SuperzoomError::recording("ffmpeg sink not started"))?;
        let dims = surface.dimensions();
        if dims.width != cfg.width || dims.height != cfg.height {
            return Err(SuperzoomError::recording(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                dims.width, dims.height, cfg.width, cfg.height
            )));
        }

        let due = self.clock.take_due(elapsed_ms).len();
        if due == 0 {
            return Ok(());
        }

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, surface.pixels(), self.opts.bg_rgba)?;
        for _ in 0..due {
            self.write_frame()?;
        }
        Ok(())
    }

    fn stop(&mut self) -> SuperzoomResult<ExportArtifact> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| SuperzoomError::recording("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            SuperzoomError::recording(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| SuperzoomError::recording("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| SuperzoomError::recording(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        self.cfg = None;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(SuperzoomError::recording(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::info!(
            path = %self.opts.out_path.display(),
            frames = self.frame_count,
            "video written"
        );
        Ok(ExportArtifact {
            path: Some(self.opts.out_path.clone()),
            file_name: file_name_of(&self.opts.out_path),
            mime: self.format.mime(),
            frame_count: self.frame_count,
        })
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// yuv420p needs even sides; odd frames get one black row or column appended.
fn even_pad_filter(width: u32, height: u32) -> Option<&'static str> {
    (!width.is_multiple_of(2) || !height.is_multiple_of(2))
        .then_some("pad=ceil(iw/2)*2:ceil(ih/2)*2")
}

fn format_rate(fps: f64) -> String {
    if fps.fract() == 0.0 {
        format!("{}", fps as u64)
    } else {
        format!("{fps}")
    }
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> SuperzoomResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(SuperzoomError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        d[0] = (s[0] as u16 + mul_div255(bg_r, inv)).min(255) as u8;
        d[1] = (s[1] as u16 + mul_div255(bg_g, inv)).min(255) as u8;
        d[2] = (s[2] as u16 + mul_div255(bg_b, inv)).min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    let t = x as u32 * y as u32 + 128;
    ((t + (t >> 8)) >> 8) as u16
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> SuperzoomResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
