use std::time::{Duration, Instant};

use crate::foundation::core::Fps;

/// Host frame callback abstraction.
///
/// Each call blocks until the next frame is due and returns its timestamp in milliseconds.
/// Timestamps are monotonically non-decreasing.
pub trait FrameScheduler {
    /// Wait for the next frame and return its timestamp (ms).
    fn next_frame(&mut self) -> f64;
}

/// Virtual clock advancing by a fixed quantum per frame. Never sleeps.
#[derive(Clone, Debug)]
pub struct FixedStepScheduler {
    now_ms: f64,
    step_ms: f64,
}

impl FixedStepScheduler {
    /// Start at `0` and advance by `step_ms` per frame.
    pub fn new(step_ms: f64) -> Self {
        Self {
            now_ms: 0.0,
            step_ms: if step_ms.is_finite() && step_ms > 0.0 {
                step_ms
            } else {
                1.0
            },
        }
    }

    /// Step at the frame duration of `fps`.
    pub fn from_fps(fps: Fps) -> Self {
        Self::new(fps.frame_duration_ms())
    }

    /// Quantum between frames in milliseconds.
    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }
}

impl FrameScheduler for FixedStepScheduler {
    fn next_frame(&mut self) -> f64 {
        let now = self.now_ms;
        self.now_ms += self.step_ms;
        now
    }
}

/// Wall-clock scheduler paced at a target frame rate.
///
/// Frames that fall behind are not replayed: the next deadline is moved past `now`.
#[derive(Debug)]
pub struct RealtimeScheduler {
    origin: Instant,
    frame: Duration,
    next_deadline: Option<Instant>,
}

impl RealtimeScheduler {
    /// Pace frames at `fps`.
    pub fn new(fps: Fps) -> Self {
        Self {
            origin: Instant::now(),
            frame: Duration::from_secs_f64(fps.frame_duration_ms() / 1000.0),
            next_deadline: None,
        }
    }
}

impl FrameScheduler for RealtimeScheduler {
    fn next_frame(&mut self) -> f64 {
        let now = Instant::now();
        let deadline = *self.next_deadline.get_or_insert(now);
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        let mut next = deadline + self.frame;
        let after = Instant::now();
        while next <= after {
            next += self.frame;
        }
        self.next_deadline = Some(next);
        after.duration_since(self.origin).as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/scheduler.rs"]
mod tests;
