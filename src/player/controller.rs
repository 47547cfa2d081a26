use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::animation::curve::{AnimationState, CurveProfile};
use crate::assets::raster::ImageAsset;
use crate::foundation::core::{CanvasDimensions, FocusPoint};
use crate::foundation::error::{SuperzoomError, SuperzoomResult};
use crate::player::audio::AudioTrack;
use crate::player::scheduler::FrameScheduler;
use crate::render::renderer::{FrameRenderer, RenderSettings};
use crate::render::surface::Surface;
use crate::render::text::TextOverlay;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The curve reached its declared duration.
    Completed,
    /// The run was cancelled, superseded, or its controller was dropped.
    Cancelled,
}

/// Result of a single [`AnimationController::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No run is active; nothing was painted.
    Idle,
    /// A frame was painted and the run continues.
    Continue,
    /// The final frame was painted and the run resolved as completed.
    Completed,
    /// The run was cancelled since the previous tick; nothing was painted.
    Cancelled,
    /// The run failed (detached surface or render error) and resolved with that error.
    Failed,
}

impl TickOutcome {
    /// `true` for outcomes after which no further ticks are needed.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Completion signal for one run.
///
/// Always resolves: a cancelled, superseded, or orphaned run reads as [`RunOutcome::Cancelled`].
#[derive(Debug)]
pub struct RunHandle {
    rx: Receiver<SuperzoomResult<RunOutcome>>,
    settled: Option<SuperzoomResult<RunOutcome>>,
}

impl RunHandle {
    fn new() -> (Sender<SuperzoomResult<RunOutcome>>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx, settled: None })
    }

    /// Non-blocking check. Returns the outcome once the run has resolved.
    pub fn try_outcome(&mut self) -> Option<&SuperzoomResult<RunOutcome>> {
        if self.settled.is_none() {
            self.settled = match self.rx.try_recv() {
                Ok(r) => Some(r),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(Ok(RunOutcome::Cancelled)),
            };
        }
        self.settled.as_ref()
    }

    /// Whether the run has resolved.
    pub fn is_settled(&mut self) -> bool {
        self.try_outcome().is_some()
    }

    /// Block until the run resolves.
    ///
    /// The controller must be ticked elsewhere (or already finished) for this to return.
    pub fn wait(self) -> SuperzoomResult<RunOutcome> {
        if let Some(r) = self.settled {
            return r;
        }
        self.rx.recv().unwrap_or(Ok(RunOutcome::Cancelled))
    }
}

struct ActiveRun {
    focus: FocusPoint,
    looping: bool,
    origin_ms: Option<f64>,
    tx: Sender<SuperzoomResult<RunOutcome>>,
}

impl ActiveRun {
    fn resolve(self, result: SuperzoomResult<RunOutcome>) {
        // A dropped handle just means nobody is listening.
        let _ = self.tx.send(result);
    }
}

/// Owns the drawing surface and drives one superzoom run at a time.
///
/// `idle -> running` on [`start`](Self::start) or [`run_loop`](Self::run_loop); back to idle on
/// completion, cancellation, or a render failure. Ticks are fed by the host (see [`drive`]).
pub struct AnimationController {
    surface: Option<Surface>,
    dims: CanvasDimensions,
    image: ImageAsset,
    renderer: FrameRenderer,
    curve: CurveProfile,
    overlay: Option<TextOverlay>,
    audio: Option<Box<dyn AudioTrack>>,
    muted: bool,
    state: AnimationState,
    elapsed_ms: f64,
    completed_loops: u64,
    run: Option<ActiveRun>,
    cancel_pending: bool,
}

impl std::fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationController")
            .field("dims", &self.dims)
            .field("running", &self.run.is_some())
            .field("state", &self.state)
            .field("elapsed_ms", &self.elapsed_ms)
            .finish_non_exhaustive()
    }
}

impl AnimationController {
    /// Create a controller with a fresh surface of `dims`, painting `image` along `curve`.
    pub fn new(
        image: ImageAsset,
        dims: CanvasDimensions,
        curve: CurveProfile,
    ) -> SuperzoomResult<Self> {
        curve.validate()?;
        Ok(Self {
            surface: Some(Surface::new(dims)?),
            dims,
            image,
            renderer: FrameRenderer::new(RenderSettings::default()),
            curve,
            overlay: None,
            audio: None,
            muted: true,
            state: AnimationState::INITIAL,
            elapsed_ms: 0.0,
            completed_loops: 0,
            run: None,
            cancel_pending: false,
        })
    }

    /// Replace renderer settings (background color).
    pub fn with_render_settings(mut self, settings: RenderSettings) -> Self {
        self.renderer = FrameRenderer::new(settings);
        self
    }

    /// Draw `overlay` on every frame whose `text_size` is positive.
    pub fn with_overlay(mut self, overlay: TextOverlay) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Attach a soundtrack. It only plays while unmuted.
    pub fn with_audio(mut self, audio: Box<dyn AudioTrack>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Set the mute flag. Unmuting does not start audio mid-run.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted && let Some(audio) = self.audio.as_mut() {
            audio.pause();
        }
    }

    /// Current mute flag (defaults to `true`).
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// The drawing surface, or `None` while detached.
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Surface size fixed at construction.
    pub fn dimensions(&self) -> CanvasDimensions {
        self.dims
    }

    /// The curve driving each run.
    pub fn curve(&self) -> &CurveProfile {
        &self.curve
    }

    /// State painted by the most recent tick.
    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Elapsed time of the most recent tick, relative to the current iteration's start.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Number of loop iterations finished by the current loop run.
    pub fn completed_loops(&self) -> u64 {
        self.completed_loops
    }

    /// Focus of the active run.
    pub fn focus(&self) -> Option<FocusPoint> {
        self.run.as_ref().map(|r| r.focus)
    }

    /// Whether a run is active.
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Begin a single run toward `focus`, cancelling any active run first.
    pub fn start(&mut self, focus: FocusPoint) -> RunHandle {
        self.begin(focus, false)
    }

    /// Begin a run that restarts on every natural completion until cancelled.
    pub fn run_loop(&mut self, focus: FocusPoint) -> RunHandle {
        self.begin(focus, true)
    }

    /// Stop the active run. Idempotent; a no-op while idle.
    pub fn cancel(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };
        tracing::debug!(focus = ?run.focus, elapsed_ms = self.elapsed_ms, "run cancelled");
        self.pause_audio();
        self.cancel_pending = true;
        run.resolve(Ok(RunOutcome::Cancelled));
    }

    /// Advance the active run to host timestamp `now_ms` and paint one frame.
    ///
    /// The first tick of a run (and of each loop iteration) defines its time origin.
    pub fn tick(&mut self, now_ms: f64) -> TickOutcome {
        if std::mem::take(&mut self.cancel_pending) {
            return TickOutcome::Cancelled;
        }
        let Some(run) = self.run.as_mut() else {
            return TickOutcome::Idle;
        };
        let restarting = run.origin_ms.is_none();
        let origin = *run.origin_ms.get_or_insert(now_ms);
        let focus = run.focus;
        let looping = run.looping;
        if restarting && looping && self.completed_loops > 0 {
            self.play_audio();
        }

        let total = self.curve.total_duration_ms();
        let elapsed = (now_ms - origin).max(0.0);
        let state = self.curve.value_at(elapsed.min(total));

        if let Err(e) = self.paint(focus, &state) {
            if matches!(e, SuperzoomError::RenderTargetUnavailable(_)) {
                tracing::warn!(error = %e, "surface detached mid-run, stopping");
            } else {
                tracing::error!(error = %e, "frame render failed, stopping run");
            }
            self.fail(e);
            return TickOutcome::Failed;
        }
        self.state = state;
        self.elapsed_ms = elapsed;

        if elapsed < total {
            return TickOutcome::Continue;
        }
        if looping {
            self.completed_loops += 1;
            if let Some(run) = self.run.as_mut() {
                run.origin_ms = None;
            }
            return TickOutcome::Continue;
        }

        self.pause_audio();
        if let Some(run) = self.run.take() {
            tracing::debug!(focus = ?run.focus, elapsed_ms = elapsed, "run completed");
            run.resolve(Ok(RunOutcome::Completed));
        }
        TickOutcome::Completed
    }

    /// Paint the unanimated image. Refused while a run is active.
    pub fn draw_static(&mut self) -> SuperzoomResult<()> {
        if self.run.is_some() {
            return Err(SuperzoomError::validation(
                "cannot draw a static frame while a run is active",
            ));
        }
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| SuperzoomError::render_target("surface is detached"))?;
        self.renderer.render_static(surface, &self.image)?;
        self.state = AnimationState::identity();
        self.elapsed_ms = 0.0;
        Ok(())
    }

    /// Detach the surface (the view went away). An active run fails on its next tick.
    pub fn take_surface(&mut self) -> Option<Surface> {
        self.surface.take()
    }

    /// Re-attach a surface. Its dimensions must match the controller's.
    pub fn attach_surface(&mut self, surface: Surface) -> SuperzoomResult<()> {
        if surface.dimensions() != self.dims {
            return Err(SuperzoomError::validation(format!(
                "surface is {}x{}, controller expects {}x{}",
                surface.dimensions().width,
                surface.dimensions().height,
                self.dims.width,
                self.dims.height
            )));
        }
        self.surface = Some(surface);
        Ok(())
    }

    fn begin(&mut self, focus: FocusPoint, looping: bool) -> RunHandle {
        self.cancel();
        self.cancel_pending = false;
        let (tx, handle) = RunHandle::new();
        if !focus.is_finite() {
            let _ = tx.send(Err(SuperzoomError::validation(
                "focus point must be finite",
            )));
            return handle;
        }
        tracing::debug!(?focus, looping, "run started");
        self.completed_loops = 0;
        self.elapsed_ms = 0.0;
        self.run = Some(ActiveRun {
            focus,
            looping,
            origin_ms: None,
            tx,
        });
        self.play_audio();
        handle
    }

    fn paint(&mut self, focus: FocusPoint, state: &AnimationState) -> SuperzoomResult<()> {
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| SuperzoomError::render_target("surface is detached"))?;
        self.renderer
            .render(surface, &self.image, focus, state, self.overlay.as_ref())
    }

    fn fail(&mut self, e: SuperzoomError) {
        self.pause_audio();
        if let Some(run) = self.run.take() {
            run.resolve(Err(e));
        }
    }

    fn play_audio(&mut self) {
        if self.muted {
            return;
        }
        if let Some(audio) = self.audio.as_mut()
            && let Err(e) = audio.play_from_start()
        {
            tracing::warn!(error = %e, "audio playback failed, continuing silently");
        }
    }

    fn pause_audio(&mut self) {
        if let Some(audio) = self.audio.as_mut() {
            audio.pause();
        }
    }
}

impl Drop for AnimationController {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Host loop: pull timestamps from `scheduler` and tick until the active run ends.
///
/// `on_frame` runs after every painted frame and may cancel the run. Returns the terminal
/// outcome (`Idle` if no run was active).
pub fn drive<F>(
    controller: &mut AnimationController,
    scheduler: &mut dyn FrameScheduler,
    mut on_frame: F,
) -> TickOutcome
where
    F: FnMut(&mut AnimationController, TickOutcome),
{
    loop {
        let now = scheduler.next_frame();
        let out = controller.tick(now);
        if matches!(out, TickOutcome::Continue | TickOutcome::Completed) {
            on_frame(controller, out);
        }
        if out.is_terminal() {
            return out;
        }
    }
}

/// Run the animation once toward `focus` and wait for it to resolve.
#[tracing::instrument(skip(controller, scheduler))]
pub fn play_once(
    controller: &mut AnimationController,
    scheduler: &mut dyn FrameScheduler,
    focus: FocusPoint,
) -> SuperzoomResult<RunOutcome> {
    let handle = controller.start(focus);
    drive(controller, scheduler, |_, _| {});
    handle.wait()
}

#[cfg(test)]
#[path = "../../tests/unit/player/controller.rs"]
mod tests;
