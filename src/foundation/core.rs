use crate::foundation::error::{SuperzoomError, SuperzoomResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Round to two decimal places, the precision used for share links and pointer picks.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Normalized zoom/rotation center relative to the displayed image box.
///
/// `(0, 0)` is the top-left corner and `(1, 1)` the bottom-right. Values outside `[0, 1]` are
/// kept as-is: they describe a focus outside the visible frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FocusPoint {
    /// Horizontal fraction of the image width.
    pub x: f64,
    /// Vertical fraction of the image height.
    pub y: f64,
}

impl Default for FocusPoint {
    fn default() -> Self {
        Self::center()
    }
}

impl FocusPoint {
    /// Create a focus point without clamping.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The image center `(0.5, 0.5)`.
    pub fn center() -> Self {
        Self { x: 0.5, y: 0.5 }
    }

    /// Build a focus point from a pointer position inside a displayed box of `box_w x box_h`.
    ///
    /// The result is rounded to two decimals and is not clamped.
    pub fn from_pointer(px: f64, py: f64, box_w: f64, box_h: f64) -> SuperzoomResult<Self> {
        if !(box_w.is_finite() && box_h.is_finite()) || box_w <= 0.0 || box_h <= 0.0 {
            return Err(SuperzoomError::validation(
                "pointer box width/height must be finite and > 0",
            ));
        }
        if !(px.is_finite() && py.is_finite()) {
            return Err(SuperzoomError::validation(
                "pointer coordinates must be finite",
            ));
        }
        Ok(Self {
            x: round2(px / box_w),
            y: round2(py / box_h),
        })
    }

    /// Return this focus point rounded to two decimals.
    pub fn rounded(self) -> Self {
        Self {
            x: round2(self.x),
            y: round2(self.y),
        }
    }

    /// Return `true` when both coordinates lie in `[0, 1]`.
    pub fn is_inside_frame(self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }

    /// Both coordinates are finite numbers.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Scale into surface pixel units.
    pub fn to_pixels(self, dims: CanvasDimensions) -> Vec2 {
        Vec2::new(
            f64::from(dims.width) * self.x,
            f64::from(dims.height) * self.y,
        )
    }
}

/// Pixel size of the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CanvasDimensions {
    /// Create validated dimensions (both sides non-zero).
    pub fn new(width: u32, height: u32) -> SuperzoomResult<Self> {
        if width == 0 || height == 0 {
            return Err(SuperzoomError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        Ok(Self { width, height })
    }

    /// Derive surface dimensions from an image's intrinsic size.
    ///
    /// Without `max_width` the surface matches the image. With it, wider images are scaled
    /// down so the aspect ratio is preserved (height rounded, at least 1px).
    pub fn fit(image_w: u32, image_h: u32, max_width: Option<u32>) -> SuperzoomResult<Self> {
        if image_w == 0 || image_h == 0 {
            return Err(SuperzoomError::validation(
                "image width/height must be non-zero",
            ));
        }
        let width = match max_width {
            Some(0) => {
                return Err(SuperzoomError::validation("max_width must be > 0"));
            }
            Some(m) => image_w.min(m),
            None => image_w,
        };
        if width == image_w {
            return Ok(Self {
                width: image_w,
                height: image_h,
            });
        }
        let height = (f64::from(image_h) * f64::from(width) / f64::from(image_w))
            .round()
            .max(1.0) as u32;
        Ok(Self { width, height })
    }

    /// Width divided by height.
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Full-surface rectangle in pixel units.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> SuperzoomResult<Self> {
        if den == 0 {
            return Err(SuperzoomError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(SuperzoomError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in milliseconds.
    pub fn frame_duration_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
