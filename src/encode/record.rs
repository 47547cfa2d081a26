use crate::encode::sink::{ExportArtifact, RecordingSink, SinkConfig};
use crate::foundation::core::FocusPoint;
use crate::foundation::error::{SuperzoomError, SuperzoomResult};
use crate::player::controller::{AnimationController, RunOutcome, drive};
use crate::player::scheduler::FrameScheduler;

/// Record one fresh run toward `focus` into `sink`.
///
/// Any active run is cancelled first. The sink samples the surface after every painted frame.
/// A sink failure never interrupts the run: it is logged, sampling stops, and the error is
/// returned once the run has completed.
#[tracing::instrument(skip(controller, scheduler, sink))]
pub fn record(
    controller: &mut AnimationController,
    scheduler: &mut dyn FrameScheduler,
    sink: &mut dyn RecordingSink,
    focus: FocusPoint,
) -> SuperzoomResult<ExportArtifact> {
    if !sink.supports_capture() {
        return Err(SuperzoomError::recording(
            "recording sink cannot capture in this environment",
        ));
    }
    controller.cancel();
    let dims = controller
        .surface()
        .ok_or_else(|| SuperzoomError::render_target("surface is detached"))?
        .dimensions();
    sink.begin(SinkConfig {
        width: dims.width,
        height: dims.height,
        duration_ms: controller.curve().total_duration_ms(),
    })?;

    let handle = controller.start(focus);
    let mut sink_error: Option<SuperzoomError> = None;
    drive(controller, scheduler, |c, _| {
        if sink_error.is_some() {
            return;
        }
        let Some(surface) = c.surface() else {
            return;
        };
        if let Err(e) = sink.sample(c.elapsed_ms(), surface) {
            tracing::error!(error = %e, "recording sink failed, run continues unrecorded");
            sink_error = Some(e);
        }
    });

    let outcome = handle.wait();
    let artifact = sink.stop();
    if let Some(e) = sink_error {
        return Err(e);
    }
    match outcome? {
        RunOutcome::Completed => artifact,
        RunOutcome::Cancelled => Err(SuperzoomError::recording(
            "run was cancelled before the recording finished",
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/record.rs"]
mod tests;
