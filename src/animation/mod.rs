//! Animation math: Bezier/time-slice helpers, easing, and the curve interpreter.

/// Keyframe and three-phase curves producing [`curve::AnimationState`].
pub mod curve;
/// Easing functions.
pub mod ease;
/// Pure geometry helpers used to build eased curves.
pub mod geometry;
