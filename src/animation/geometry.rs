use crate::foundation::core::Point;

/// Evaluate a cubic Bezier at parametric position `t`.
///
/// Uses the Bernstein weights `(1-t)^3, 3t(1-t)^2, 3t^2(1-t), t^3` directly so that `t = 0`
/// returns `p0` and `t = 1` returns `p1` exactly.
pub fn bezier(t: f64, p0: Point, c1: Point, c2: Point, p1: Point) -> Point {
    let u = 1.0 - t;
    let w0 = u * u * u;
    let w1 = 3.0 * t * u * u;
    let w2 = 3.0 * t * t * u;
    let w3 = t * t * t;
    Point::new(
        w0 * p0.x + w1 * c1.x + w2 * c2.x + w3 * p1.x,
        w0 * p0.y + w1 * c1.y + w2 * c2.y + w3 * p1.y,
    )
}

/// Number of equal slices the frame range is split into by [`time_slice`].
pub const SLICE_COUNT: u64 = 3;

/// Map a frame counter into progress within one of three equal slices of `total_frames`.
///
/// Frames before the slice's window yield `0`, frames after it yield `1`.
pub fn time_slice(slice_index: u64, current_frame: u64, total_frames: u64) -> f64 {
    if total_frames == 0 {
        return 1.0;
    }
    let len = total_frames as f64 / SLICE_COUNT as f64;
    let start = slice_index as f64 * len;
    ((current_frame as f64 - start) / len).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/geometry.rs"]
mod tests;
