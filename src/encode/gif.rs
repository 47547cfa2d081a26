use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::sink::{ExportArtifact, RecordingSink, SamplingClock, SinkConfig, export_file_name};
use crate::foundation::error::{SuperzoomError, SuperzoomResult};
use crate::render::surface::Surface;

/// Default image-sequence sampling rate.
pub const DEFAULT_GIF_SAMPLE_HZ: f64 = 20.0;

/// Options for [`GifSink`].
#[derive(Clone, Debug)]
pub struct GifSinkOpts {
    /// Directory the GIF is written into.
    pub out_dir: PathBuf,
    /// Export name without extension.
    pub export_name: String,
    /// Frames sampled per second.
    pub sample_hz: f64,
    /// Quantizer speed, 1 (best) to 30 (fastest).
    pub speed: i32,
}

impl GifSinkOpts {
    /// Write `<out_dir>/superzoom.gif` at 20 Hz.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            export_name: "superzoom".to_string(),
            sample_hz: DEFAULT_GIF_SAMPLE_HZ,
            speed: 10,
        }
    }

    /// Output path derived from the export name.
    pub fn out_path(&self) -> PathBuf {
        self.out_dir
            .join(export_file_name(&self.export_name, "gif"))
    }
}

/// Looping animated GIF assembled from fixed-rate samples of the surface.
pub struct GifSink {
    opts: GifSinkOpts,
    clock: SamplingClock,
    encoder: Option<GifEncoder<BufWriter<ErrorLatch<File>>>>,
    write_error: Arc<OnceLock<String>>,
    frame_count: usize,
}

impl std::fmt::Debug for GifSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifSink")
            .field("opts", &self.opts)
            .field("clock", &self.clock)
            .field("started", &self.encoder.is_some())
            .field("frame_count", &self.frame_count)
            .finish()
    }
}

impl GifSink {
    /// Create a GIF sink. Fails on a non-positive sample rate.
    pub fn new(opts: GifSinkOpts) -> SuperzoomResult<Self> {
        let clock = SamplingClock::new(opts.sample_hz)?;
        Ok(Self {
            opts,
            clock,
            encoder: None,
            write_error: Arc::new(OnceLock::new()),
            frame_count: 0,
        })
    }

    fn frame_delay(&self) -> Delay {
        // Exact rational delay so 20 Hz becomes 50ms per frame.
        Delay::from_numer_denom_ms(1000, self.opts.sample_hz.round().max(1.0) as u32)
    }
}

impl RecordingSink for GifSink {
    fn supports_capture(&self) -> bool {
        true
    }

    fn begin(&mut self, cfg: SinkConfig) -> SuperzoomResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(SuperzoomError::recording(
                "gif sink width/height must be non-zero",
            ));
        }
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(SuperzoomError::recording("gif frames are limited to 65535px"));
        }
        let path = self.opts.out_path();
        ensure_parent_dir(&path)
            .map_err(|e| SuperzoomError::recording(format!("{e}")))?;
        let file = File::create(&path).map_err(|e| {
            SuperzoomError::recording(format!("failed to create '{}': {e}", path.display()))
        })?;

        self.write_error = Arc::new(OnceLock::new());
        let file = ErrorLatch::new(file, Arc::clone(&self.write_error));
        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), self.opts.speed.clamp(1, 30));
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| SuperzoomError::recording(format!("gif header failed: {e}")))?;

        self.clock.reset();
        self.encoder = Some(encoder);
        self.frame_count = 0;
        tracing::debug!(path = %path.display(), hz = self.clock.hz(), "gif recording started");
        Ok(())
    }

    fn sample(&mut self, elapsed_ms: f64, surface: &Surface) -> SuperzoomResult<()> {
        if self.encoder.is_none() {
            return Err(SuperzoomError::recording("gif sink not started"));
        }
        let due = self.clock.take_due(elapsed_ms).len();
        if due == 0 {
            return Ok(());
        }
        let rgba = surface.snapshot().to_rgba_image()?;
        let delay = self.frame_delay();
        let Some(encoder) = self.encoder.as_mut() else {
            return Err(SuperzoomError::recording("gif sink not started"));
        };
        for _ in 0..due {
            encoder
                .encode_frame(Frame::from_parts(rgba.clone(), 0, 0, delay))
                .map_err(|e| SuperzoomError::recording(format!("gif frame encode failed: {e}")))?;
            self.frame_count += 1;
        }
        Ok(())
    }

    fn stop(&mut self) -> SuperzoomResult<ExportArtifact> {
        let encoder = self
            .encoder
            .take()
            .ok_or_else(|| SuperzoomError::recording("gif sink not started"))?;
        if self.frame_count == 0 {
            return Err(SuperzoomError::recording("no frames were sampled"));
        }
        // The trailer and the final flush happen on drop; the latch keeps their errors.
        drop(encoder);
        if let Some(e) = self.write_error.get() {
            return Err(SuperzoomError::recording(format!("gif write failed: {e}")));
        }
        let path = self.opts.out_path();
        tracing::info!(path = %path.display(), frames = self.frame_count, "gif written");
        Ok(ExportArtifact {
            file_name: file_name_of(&path),
            path: Some(path),
            mime: "image/gif",
            frame_count: self.frame_count,
        })
    }
}

/// Writer that remembers its first IO error, including errors raised while dropping.
struct ErrorLatch<W> {
    inner: W,
    error: Arc<OnceLock<String>>,
}

impl<W: Write> ErrorLatch<W> {
    fn new(inner: W, error: Arc<OnceLock<String>>) -> Self {
        Self { inner, error }
    }

    fn latch<T>(&self, res: std::io::Result<T>) -> std::io::Result<T> {
        if let Err(e) = &res {
            let _ = self.error.set(e.to_string());
        }
        res
    }
}

impl<W: Write> Write for ErrorLatch<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let res = self.inner.write(buf);
        self.latch(res)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let res = self.inner.flush();
        self.latch(res)
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
