//! Tick-driven playback.
//!
//! A [`controller::AnimationController`] owns the surface and paints one frame per host tick.
//! Ticks come from a [`scheduler::FrameScheduler`]; [`controller::drive`] is the host loop.

/// Soundtrack lifecycle.
pub mod audio;
/// Run state machine and completion handles.
pub mod controller;
/// Frame timing sources.
pub mod scheduler;
