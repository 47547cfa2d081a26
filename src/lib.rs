//! Superzoom is a focus-point zoom animation engine.
//!
//! Given an image and a focus point, a controller plays a short dramatic zoom-and-rotate
//! animation around that point on a CPU drawing surface, optionally captioned, and recording
//! sinks turn a run into a GIF or a video:
//!
//! - Load an [`ImageAsset`] (with one proxy fallback for remote sources)
//! - Create an [`AnimationController`] over a [`CurveProfile`]
//! - Drive it with a [`FrameScheduler`], or [`record`] it into a [`RecordingSink`]
//! - Share the view as a [`ShareLink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Curves, easing and Bezier helpers.
pub mod animation;
/// Image decoding and loading.
pub mod assets;
/// JSON engine configuration.
pub mod config;
/// Recording sinks.
pub mod encode;
/// Core value types and the error taxonomy.
pub mod foundation;
/// Scheduling and the animation controller.
pub mod player;
/// Persisted preferences.
pub mod prefs;
/// Frame rendering.
pub mod render;
/// Share links.
pub mod share;

pub use crate::animation::curve::{
    AnimationState, CurveProfile, KeyframeCurve, KeyframeSegment, PropertyTargets, ThreePhaseZoom,
};
pub use crate::animation::ease::Ease;
pub use crate::assets::loader::{ImageLoader, SourceLoader, load_with_fallback};
pub use crate::assets::raster::ImageAsset;
pub use crate::config::{OverlayConfig, SuperzoomConfig};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoFormat};
pub use crate::encode::gif::{GifSink, GifSinkOpts};
pub use crate::encode::record::record;
pub use crate::encode::sink::{ExportArtifact, InMemorySink, RecordingSink, SamplingClock, SinkConfig};
pub use crate::foundation::core::{Affine, CanvasDimensions, FocusPoint, Fps, Point, Vec2};
pub use crate::foundation::error::{SuperzoomError, SuperzoomResult};
pub use crate::player::audio::{AudioTrack, ExternalPlayerTrack};
pub use crate::player::controller::{
    AnimationController, RunHandle, RunOutcome, TickOutcome, drive, play_once,
};
pub use crate::player::scheduler::{FixedStepScheduler, FrameScheduler, RealtimeScheduler};
pub use crate::prefs::store::{JsonPreferences, MemoryPreferences, PreferenceStore};
pub use crate::render::renderer::{FrameRenderer, RenderSettings, focus_transform};
pub use crate::render::surface::{FrameRGBA, Surface};
pub use crate::render::text::TextOverlay;
pub use crate::share::link::ShareLink;
