//! Frame rendering: the drawing surface, the zoom/rotate transform, and the caption overlay.

/// One-frame painter over `vello_cpu`.
pub mod renderer;
/// Drawing surface and sampled frames.
pub mod surface;
/// Caption overlay and text layout.
pub mod text;
