use std::f64::consts::FRAC_PI_6;

use crate::animation::ease::Ease;
use crate::animation::geometry::{SLICE_COUNT, bezier, time_slice};
use crate::foundation::core::Point;
use crate::foundation::error::{SuperzoomError, SuperzoomResult};

/// Scalar values driven by an animation curve and read by the frame renderer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnimationState {
    /// Rotation around the focus point, in radians.
    pub rotation: f64,
    /// Uniform zoom factor around the focus point.
    pub scale: f64,
    /// Horizontal text center as a fraction of the surface width.
    pub text_x: f64,
    /// Vertical text center as a fraction of the surface height.
    pub text_y: f64,
    /// Text size multiplier applied to the base font size.
    pub text_size: f64,
}

impl AnimationState {
    /// Values every run starts from: no zoom, no rotation, text parked below the frame.
    pub const INITIAL: Self = Self {
        rotation: 0.0,
        scale: 1.0,
        text_x: 0.5,
        text_y: 1.15,
        text_size: 0.0,
    };

    /// The unanimated state (identity transform, no text).
    pub fn identity() -> Self {
        Self::INITIAL
    }
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Per-segment target values. Properties left as `None` hold their previous value.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PropertyTargets {
    /// Target zoom factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Target rotation in radians.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Target normalized text x.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_x: Option<f64>,
    /// Target normalized text y.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_y: Option<f64>,
    /// Target text size multiplier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_size: Option<f64>,
}

impl PropertyTargets {
    fn values(&self) -> [Option<f64>; 5] {
        [
            self.scale,
            self.rotation,
            self.text_x,
            self.text_y,
            self.text_size,
        ]
    }

    /// Interpolate from `from` toward these targets with eased progress `te`.
    pub fn tween(&self, from: &AnimationState, te: f64) -> AnimationState {
        fn lerp(a: f64, target: Option<f64>, t: f64) -> f64 {
            match target {
                Some(b) => a + (b - a) * t,
                None => a,
            }
        }

        AnimationState {
            rotation: lerp(from.rotation, self.rotation, te),
            scale: lerp(from.scale, self.scale, te),
            text_x: lerp(from.text_x, self.text_x, te),
            text_y: lerp(from.text_y, self.text_y, te),
            text_size: lerp(from.text_size, self.text_size, te),
        }
    }

    /// Jump straight to the targets.
    pub fn settle(&self, from: &AnimationState) -> AnimationState {
        AnimationState {
            rotation: self.rotation.unwrap_or(from.rotation),
            scale: self.scale.unwrap_or(from.scale),
            text_x: self.text_x.unwrap_or(from.text_x),
            text_y: self.text_y.unwrap_or(from.text_y),
            text_size: self.text_size.unwrap_or(from.text_size),
        }
    }
}

/// One tween of a keyframe curve.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeyframeSegment {
    /// Values reached at the end of the segment.
    #[serde(flatten)]
    pub targets: PropertyTargets,
    /// Tween length in milliseconds.
    pub duration_ms: f64,
    /// Hold time before the tween starts, in milliseconds.
    #[serde(default)]
    pub delay_ms: f64,
    /// Easing override; the curve easing is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ease: Option<Ease>,
}

impl KeyframeSegment {
    /// Segment without delay using the curve easing.
    pub fn new(targets: PropertyTargets, duration_ms: f64) -> Self {
        Self {
            targets,
            duration_ms,
            delay_ms: 0.0,
            ease: None,
        }
    }

    /// Set the start delay.
    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Set an easing override.
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }

    fn span_ms(&self) -> f64 {
        self.delay_ms + self.duration_ms
    }
}

/// Sequential keyframe curve: each segment starts once the previous one has finished.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeyframeCurve {
    /// Segments in playback order.
    pub segments: Vec<KeyframeSegment>,
    /// Easing used by segments without an override.
    #[serde(default)]
    pub ease: Ease,
    /// State at elapsed time zero.
    #[serde(default)]
    pub initial: AnimationState,
}

impl KeyframeCurve {
    /// Build a curve starting from [`AnimationState::INITIAL`].
    pub fn new(segments: Vec<KeyframeSegment>, ease: Ease) -> Self {
        Self {
            segments,
            ease,
            initial: AnimationState::INITIAL,
        }
    }

    /// Sum of all segment delays and durations.
    pub fn total_duration_ms(&self) -> f64 {
        self.segments.iter().map(KeyframeSegment::span_ms).sum()
    }

    /// Interpolate the state at `elapsed_ms`. Past the end the final values hold exactly.
    pub fn value_at(&self, elapsed_ms: f64) -> AnimationState {
        let elapsed = elapsed_ms.max(0.0);
        let mut from = self.initial;
        let mut cursor = 0.0;
        for seg in &self.segments {
            let start = cursor + seg.delay_ms;
            let end = start + seg.duration_ms;
            if elapsed < start {
                return from;
            }
            if elapsed < end && seg.duration_ms > 0.0 {
                let t = (elapsed - start) / seg.duration_ms;
                let te = seg.ease.unwrap_or(self.ease).apply(t);
                return seg.targets.tween(&from, te);
            }
            from = seg.targets.settle(&from);
            cursor = end;
        }
        from
    }

    /// Validate segment timing and target values.
    pub fn validate(&self) -> SuperzoomResult<()> {
        if self.segments.is_empty() {
            return Err(SuperzoomError::animation(
                "keyframe curve must have at least one segment",
            ));
        }
        if !self.ease.is_valid() {
            return Err(SuperzoomError::animation("curve easing must be finite"));
        }
        for (i, seg) in self.segments.iter().enumerate() {
            if !(seg.duration_ms.is_finite() && seg.duration_ms >= 0.0) {
                return Err(SuperzoomError::animation(format!(
                    "segment {i}: duration_ms must be finite and >= 0"
                )));
            }
            if !(seg.delay_ms.is_finite() && seg.delay_ms >= 0.0) {
                return Err(SuperzoomError::animation(format!(
                    "segment {i}: delay_ms must be finite and >= 0"
                )));
            }
            if seg.targets.values().iter().flatten().any(|v| !v.is_finite()) {
                return Err(SuperzoomError::animation(format!(
                    "segment {i}: target values must be finite"
                )));
            }
            if seg.ease.is_some_and(|e| !e.is_valid()) {
                return Err(SuperzoomError::animation(format!(
                    "segment {i}: easing must be finite"
                )));
            }
        }
        Ok(())
    }
}

/// Frame-counted zoom built from three staggered, additive Bezier evaluations.
///
/// Each third of the frame range contributes `gain * bezier(progress).y` to a running scale
/// total starting at `1`. Rotation stays at zero and no text is shown.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ThreePhaseZoom {
    /// Frames in the whole zoom.
    pub total_frames: u64,
    /// Length of one frame in milliseconds.
    pub frame_ms: f64,
    /// Scale added by each completed phase.
    pub gain: f64,
    /// First Bezier control point (endpoints are `(0,0)` and `(1,1)`).
    pub c1: Point,
    /// Second Bezier control point.
    pub c2: Point,
}

impl Default for ThreePhaseZoom {
    fn default() -> Self {
        Self {
            total_frames: 180,
            frame_ms: 1000.0 / 60.0,
            gain: 2.0 / 3.0,
            c1: Point::new(1.06, 0.74),
            c2: Point::new(1.0, 1.0),
        }
    }
}

impl ThreePhaseZoom {
    /// Total run length in milliseconds.
    pub fn total_duration_ms(&self) -> f64 {
        self.total_frames as f64 * self.frame_ms
    }

    /// Frame counter reached at `elapsed_ms`, capped at `total_frames`.
    pub fn frame_at(&self, elapsed_ms: f64) -> u64 {
        // Tolerate float error when `elapsed_ms` was computed as `n * frame_ms`.
        let f = (elapsed_ms.max(0.0) / self.frame_ms + 1e-9).floor();
        (f as u64).min(self.total_frames)
    }

    /// Composite state at `elapsed_ms`.
    pub fn value_at(&self, elapsed_ms: f64) -> AnimationState {
        let frame = self.frame_at(elapsed_ms);
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(1.0, 1.0);
        let added: f64 = (0..SLICE_COUNT)
            .map(|i| {
                let t = time_slice(i, frame, self.total_frames);
                bezier(t, p0, self.c1, self.c2, p1).y
            })
            .sum();
        AnimationState {
            scale: 1.0 + self.gain * added,
            ..AnimationState::INITIAL
        }
    }

    /// Validate frame timing and gain.
    pub fn validate(&self) -> SuperzoomResult<()> {
        if self.total_frames == 0 {
            return Err(SuperzoomError::animation("total_frames must be > 0"));
        }
        if !(self.frame_ms.is_finite() && self.frame_ms > 0.0) {
            return Err(SuperzoomError::animation(
                "frame_ms must be finite and > 0",
            ));
        }
        let finite_points = [self.c1, self.c2]
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite());
        if !self.gain.is_finite() || !finite_points {
            return Err(SuperzoomError::animation(
                "gain and control points must be finite",
            ));
        }
        Ok(())
    }
}

/// The animation design driving a controller: one interpolation interface over swappable curves.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveProfile {
    /// Keyframe-sequence curve with elastic easing and text overlay.
    Keyframes(KeyframeCurve),
    /// Additive three-phase Bezier zoom.
    ThreePhaseZoom(ThreePhaseZoom),
}

impl Default for CurveProfile {
    fn default() -> Self {
        Self::classic()
    }
}

impl CurveProfile {
    /// The default superzoom: three elastic punches in, then a long hold.
    pub fn classic() -> Self {
        let seg = |scale: f64, rotation: f64| PropertyTargets {
            scale: Some(scale),
            rotation: Some(rotation),
            ..PropertyTargets::default()
        };
        let first = PropertyTargets {
            text_y: Some(0.85),
            text_size: Some(1.0),
            ..seg(1.5, FRAC_PI_6)
        };
        Self::Keyframes(KeyframeCurve::new(
            vec![
                KeyframeSegment::new(first, 400.0).with_delay(100.0),
                KeyframeSegment::new(seg(2.0, -FRAC_PI_6), 400.0),
                KeyframeSegment::new(seg(3.0, FRAC_PI_6), 600.0),
                KeyframeSegment::new(
                    PropertyTargets {
                        scale: Some(3.0),
                        ..PropertyTargets::default()
                    },
                    2000.0,
                ),
            ],
            Ease::out_elastic(),
        ))
    }

    /// The frame-counted alternative profile.
    pub fn three_phase() -> Self {
        Self::ThreePhaseZoom(ThreePhaseZoom::default())
    }

    /// Interpolated state at `elapsed_ms` since run start.
    pub fn value_at(&self, elapsed_ms: f64) -> AnimationState {
        match self {
            Self::Keyframes(c) => c.value_at(elapsed_ms),
            Self::ThreePhaseZoom(z) => z.value_at(elapsed_ms),
        }
    }

    /// Declared run length in milliseconds.
    pub fn total_duration_ms(&self) -> f64 {
        match self {
            Self::Keyframes(c) => c.total_duration_ms(),
            Self::ThreePhaseZoom(z) => z.total_duration_ms(),
        }
    }

    /// Validate the underlying curve.
    pub fn validate(&self) -> SuperzoomResult<()> {
        match self {
            Self::Keyframes(c) => c.validate(),
            Self::ThreePhaseZoom(z) => z.validate(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/curve.rs"]
mod tests;
