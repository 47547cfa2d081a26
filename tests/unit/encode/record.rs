use super::*;
use crate::animation::curve::{CurveProfile, KeyframeCurve, KeyframeSegment, PropertyTargets};
use crate::animation::ease::Ease;
use crate::assets::raster::ImageAsset;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::CanvasDimensions;
use crate::player::controller::TickOutcome;
use crate::player::scheduler::FixedStepScheduler;
use crate::render::surface::Surface;

fn controller() -> AnimationController {
    let image = ImageAsset::from_rgba8(
        2,
        2,
        vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ],
    )
    .unwrap();
    let curve = CurveProfile::Keyframes(KeyframeCurve::new(
        vec![KeyframeSegment::new(
            PropertyTargets {
                scale: Some(3.0),
                rotation: Some(0.5),
                ..PropertyTargets::default()
            },
            300.0,
        )],
        Ease::Linear,
    ));
    AnimationController::new(image, CanvasDimensions::new(24, 18).unwrap(), curve).unwrap()
}

/// Fails on the `fail_at`-th sample and counts every call.
struct FlakySink {
    fail_at: usize,
    samples: usize,
    stopped: bool,
}

impl RecordingSink for FlakySink {
    fn supports_capture(&self) -> bool {
        true
    }

    fn begin(&mut self, _cfg: SinkConfig) -> SuperzoomResult<()> {
        Ok(())
    }

    fn sample(&mut self, _elapsed_ms: f64, _surface: &Surface) -> SuperzoomResult<()> {
        self.samples += 1;
        if self.samples == self.fail_at {
            return Err(SuperzoomError::recording("disk full"));
        }
        Ok(())
    }

    fn stop(&mut self) -> SuperzoomResult<ExportArtifact> {
        self.stopped = true;
        Err(SuperzoomError::recording("nothing to stop"))
    }
}

struct NoCapture;

impl RecordingSink for NoCapture {
    fn supports_capture(&self) -> bool {
        false
    }
    fn begin(&mut self, _cfg: SinkConfig) -> SuperzoomResult<()> {
        unreachable!()
    }
    fn sample(&mut self, _elapsed_ms: f64, _surface: &Surface) -> SuperzoomResult<()> {
        unreachable!()
    }
    fn stop(&mut self) -> SuperzoomResult<ExportArtifact> {
        unreachable!()
    }
}

#[test]
fn records_a_full_run_at_the_sink_rate() {
    let mut c = controller();
    let mut sink = InMemorySink::with_rate(20.0).unwrap();
    let art = record(
        &mut c,
        &mut FixedStepScheduler::new(1000.0 / 60.0),
        &mut sink,
        FocusPoint::new(0.4, 0.4),
    )
    .unwrap();
    // Samples at 0, 50, ..., 300ms.
    assert_eq!(art.frame_count, 7);
    assert_eq!(art.path, None);
    let times: Vec<f64> = sink.frames().iter().map(|(t, _)| *t).collect();
    assert_eq!(times, vec![0.0, 50.0, 100.0, 150.0, 200.0, 250.0, 300.0]);
    assert!(!c.is_running());
    assert_eq!(c.state().scale, 3.0);
}

#[test]
fn two_sinks_see_identical_frames() {
    let focus = FocusPoint::new(0.4, 0.4);
    let mut a = InMemorySink::with_rate(20.0).unwrap();
    let mut b = InMemorySink::with_rate(20.0).unwrap();
    record(&mut controller(), &mut FixedStepScheduler::new(1000.0 / 60.0), &mut a, focus).unwrap();
    // A different tick rate still yields the same sample count and the same held endpoints.
    record(&mut controller(), &mut FixedStepScheduler::new(10.0), &mut b, focus).unwrap();
    assert_eq!(a.frames().len(), b.frames().len());
    assert_eq!(a.frames()[0], b.frames()[0]);
    assert_eq!(a.frames().last(), b.frames().last());
}

#[test]
fn sink_failure_does_not_interrupt_the_run() {
    let mut c = controller();
    let mut sink = FlakySink {
        fail_at: 3,
        samples: 0,
        stopped: false,
    };
    let err = record(&mut c, &mut FixedStepScheduler::new(1000.0 / 60.0), &mut sink, FocusPoint::center())
        .unwrap_err();
    assert!(err.to_string().contains("disk full"));
    assert_eq!(sink.samples, 3);
    assert!(sink.stopped);
    // The run still reached its final frame.
    assert_eq!(c.state().scale, 3.0);
    assert_eq!(c.tick(0.0), TickOutcome::Idle);
}

#[test]
fn sink_without_capture_is_refused() {
    let mut c = controller();
    let err = record(&mut c, &mut FixedStepScheduler::new(16.0), &mut NoCapture, FocusPoint::center())
        .unwrap_err();
    assert!(matches!(err, SuperzoomError::Recording(_)));
}

#[test]
fn recording_cancels_the_previous_run() {
    let mut c = controller();
    let first = c.run_loop(FocusPoint::new(0.1, 0.9));
    c.tick(0.0);
    let mut sink = InMemorySink::new();
    record(&mut c, &mut FixedStepScheduler::new(50.0), &mut sink, FocusPoint::center()).unwrap();
    assert_eq!(first.wait().unwrap(), RunOutcome::Cancelled);
    assert_eq!(sink.frames().len(), 7);
}
