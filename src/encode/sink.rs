use std::path::PathBuf;

use crate::foundation::error::{SuperzoomError, SuperzoomResult};
use crate::render::surface::{FrameRGBA, Surface};

/// Configuration provided to a [`RecordingSink`] before a recorded run starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SinkConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Declared length of the recorded run in milliseconds.
    pub duration_ms: f64,
}

/// The downloadable result of a recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Where the artifact was written, if it lives on disk.
    pub path: Option<PathBuf>,
    /// Deterministic file name: export name plus the sink's native extension.
    pub file_name: String,
    /// MIME type of the artifact.
    pub mime: &'static str,
    /// Number of sampled frames.
    pub frame_count: usize,
}

/// Build `"<name>.<ext>"`, falling back to `superzoom` for an empty name.
pub fn export_file_name(name: &str, ext: &str) -> String {
    let name = name.trim();
    let name = if name.is_empty() { "superzoom" } else { name };
    format!("{name}.{ext}")
}

/// External consumer sampling the drawing surface while a run is in progress.
///
/// Ordering contract: `begin`, then `sample` with non-decreasing `elapsed_ms`, then `stop`.
/// Every failure is a [`SuperzoomError::Recording`].
pub trait RecordingSink {
    /// Whether this sink can capture frames in the current environment.
    fn supports_capture(&self) -> bool;
    /// Called once before the run starts.
    fn begin(&mut self, cfg: SinkConfig) -> SuperzoomResult<()>;
    /// Called after each painted frame with the run's elapsed time.
    fn sample(&mut self, elapsed_ms: f64, surface: &Surface) -> SuperzoomResult<()>;
    /// Finish and assemble the artifact.
    fn stop(&mut self) -> SuperzoomResult<ExportArtifact>;
}

/// Fixed-rate sample times `k * 1000 / hz` mapped onto irregular ticks.
///
/// A tick that covers several sample times yields all of them, so the sampled stream keeps
/// real-time pacing even when ticks are slower than the sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingClock {
    hz: f64,
    next_k: u64,
}

impl SamplingClock {
    /// Clock sampling `hz` times per second.
    pub fn new(hz: f64) -> SuperzoomResult<Self> {
        if !hz.is_finite() || hz <= 0.0 {
            return Err(SuperzoomError::recording("sample rate must be finite and > 0"));
        }
        Ok(Self { hz, next_k: 0 })
    }

    /// Samples per second.
    pub fn hz(&self) -> f64 {
        self.hz
    }

    /// Spacing between samples in milliseconds.
    pub fn interval_ms(&self) -> f64 {
        1000.0 / self.hz
    }

    /// Timestamp of sample `k`.
    pub fn sample_time_ms(&self, k: u64) -> f64 {
        k as f64 * 1000.0 / self.hz
    }

    /// Consume and return every sample time `<= elapsed_ms` not yet emitted.
    pub fn take_due(&mut self, elapsed_ms: f64) -> Vec<f64> {
        let mut due = Vec::new();
        // Tolerate float noise from accumulated scheduler steps.
        while self.sample_time_ms(self.next_k) <= elapsed_ms + 1e-6 {
            due.push(self.sample_time_ms(self.next_k));
            self.next_k += 1;
        }
        due
    }

    /// Samples emitted so far.
    pub fn emitted(&self) -> u64 {
        self.next_k
    }

    /// Restart from sample `0`.
    pub fn reset(&mut self) {
        self.next_k = 0;
    }
}

/// In-memory sink for tests and debugging.
///
/// Without a sample rate it keeps one frame per tick.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    clock: Option<SamplingClock>,
    frames: Vec<(f64, FrameRGBA)>,
}

impl InMemorySink {
    /// Create a sink keeping every tick.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink sampling at `hz`.
    pub fn with_rate(hz: f64) -> SuperzoomResult<Self> {
        Ok(Self {
            clock: Some(SamplingClock::new(hz)?),
            ..Self::default()
        })
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured `(time_ms, frame)` pairs.
    pub fn frames(&self) -> &[(f64, FrameRGBA)] {
        &self.frames
    }
}

impl RecordingSink for InMemorySink {
    fn supports_capture(&self) -> bool {
        true
    }

    fn begin(&mut self, cfg: SinkConfig) -> SuperzoomResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        if let Some(clock) = self.clock.as_mut() {
            clock.reset();
        }
        Ok(())
    }

    fn sample(&mut self, elapsed_ms: f64, surface: &Surface) -> SuperzoomResult<()> {
        if self.cfg.is_none() {
            return Err(SuperzoomError::recording("in-memory sink not started"));
        }
        match self.clock.as_mut() {
            Some(clock) => {
                for t in clock.take_due(elapsed_ms) {
                    self.frames.push((t, surface.snapshot()));
                }
            }
            None => self.frames.push((elapsed_ms, surface.snapshot())),
        }
        Ok(())
    }

    fn stop(&mut self) -> SuperzoomResult<ExportArtifact> {
        self.cfg
            .take()
            .ok_or_else(|| SuperzoomError::recording("in-memory sink not started"))?;
        Ok(ExportArtifact {
            path: None,
            file_name: export_file_name("superzoom", "raw"),
            mime: "application/octet-stream",
            frame_count: self.frames.len(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
