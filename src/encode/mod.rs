//! Recording sinks.
//!
//! Sinks sample the controller's surface at their own fixed rate while a run is in progress and
//! assemble one export artifact when stopped.

/// `ffmpeg`-based video sink (WebM or MP4 via system `ffmpeg`).
pub mod ffmpeg;
/// Animated GIF sink.
pub mod gif;
/// Run-and-record driver.
pub mod record;
/// Sink trait, sampling clock and the in-memory sink.
pub mod sink;
