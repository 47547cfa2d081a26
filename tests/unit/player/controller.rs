use std::cell::Cell;
use std::f64::consts::FRAC_PI_6;
use std::rc::Rc;

use super::*;
use crate::animation::curve::{KeyframeCurve, KeyframeSegment, PropertyTargets};
use crate::animation::ease::Ease;
use crate::player::scheduler::FixedStepScheduler;

const FRAME_MS: f64 = 1000.0 / 60.0;

fn checker(w: u32, h: u32) -> ImageAsset {
    let mut px = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let on = (x + y) % 2 == 0;
            px.extend_from_slice(if on {
                &[240, 30, 30, 255]
            } else {
                &[20, 20, 200, 255]
            });
        }
    }
    ImageAsset::from_rgba8(w, h, px).unwrap()
}

fn three_step() -> CurveProfile {
    let t = |scale: f64, rotation: f64| PropertyTargets {
        scale: Some(scale),
        rotation: Some(rotation),
        ..PropertyTargets::default()
    };
    CurveProfile::Keyframes(KeyframeCurve::new(
        vec![
            KeyframeSegment::new(t(1.5, FRAC_PI_6), 400.0),
            KeyframeSegment::new(t(2.0, -FRAC_PI_6), 400.0),
            KeyframeSegment::new(t(3.0, 0.0), 700.0),
        ],
        Ease::out_elastic(),
    ))
}

fn short_curve() -> CurveProfile {
    CurveProfile::Keyframes(KeyframeCurve::new(
        vec![KeyframeSegment::new(
            PropertyTargets {
                scale: Some(2.0),
                ..PropertyTargets::default()
            },
            100.0,
        )],
        Ease::Linear,
    ))
}

fn controller(w: u32, h: u32, curve: CurveProfile) -> AnimationController {
    AnimationController::new(checker(8, 6), CanvasDimensions::new(w, h).unwrap(), curve).unwrap()
}

#[derive(Default)]
struct AudioLog {
    plays: Cell<u32>,
    pauses: Cell<u32>,
}

struct LoggedTrack {
    log: Rc<AudioLog>,
    fail: bool,
}

impl AudioTrack for LoggedTrack {
    fn play_from_start(&mut self) -> SuperzoomResult<()> {
        self.log.plays.set(self.log.plays.get() + 1);
        if self.fail {
            Err(SuperzoomError::playback("autoplay blocked"))
        } else {
            Ok(())
        }
    }

    fn pause(&mut self) {
        self.log.pauses.set(self.log.pauses.get() + 1);
    }
}

#[test]
fn cancel_before_start_is_noop() {
    let mut c = controller(16, 12, short_curve());
    c.cancel();
    assert!(!c.is_running());
    assert_eq!(c.tick(0.0), TickOutcome::Idle);
}

#[test]
fn cancel_twice_equals_once() {
    let mut c = controller(16, 12, short_curve());
    let mut h = c.start(FocusPoint::center());
    assert_eq!(c.tick(0.0), TickOutcome::Continue);
    c.cancel();
    c.cancel();
    assert!(matches!(h.try_outcome(), Some(Ok(RunOutcome::Cancelled))));
    assert_eq!(c.tick(16.0), TickOutcome::Cancelled);
    assert_eq!(c.tick(32.0), TickOutcome::Idle);
}

#[test]
fn run_handle_is_pending_until_resolved() {
    let mut c = controller(16, 12, short_curve());
    let mut h = c.start(FocusPoint::center());
    assert!(!h.is_settled());
    c.tick(0.0);
    assert!(!h.is_settled());
    assert_eq!(c.tick(100.0), TickOutcome::Completed);
    assert!(matches!(h.try_outcome(), Some(Ok(RunOutcome::Completed))));
    // Settled outcome is sticky.
    assert!(matches!(h.try_outcome(), Some(Ok(RunOutcome::Completed))));
    assert_eq!(h.wait().unwrap(), RunOutcome::Completed);
}

#[test]
fn start_while_running_supersedes_previous_run() {
    let fp1 = FocusPoint::new(0.1, 0.1);
    let fp2 = FocusPoint::new(0.9, 0.8);

    let mut c = controller(16, 12, short_curve());
    let mut first = c.start(fp1);
    c.tick(0.0);
    c.tick(50.0);
    let second = c.start(fp2);
    assert!(matches!(first.try_outcome(), Some(Ok(RunOutcome::Cancelled))));
    assert_eq!(c.focus(), Some(fp2));

    // The new run starts its own clock: its first frame matches a fresh run at fp2.
    assert_eq!(c.tick(60.0), TickOutcome::Continue);
    let mut fresh = controller(16, 12, short_curve());
    fresh.start(fp2);
    fresh.tick(0.0);
    assert_eq!(
        c.surface().unwrap().pixels(),
        fresh.surface().unwrap().pixels()
    );

    assert_eq!(c.tick(160.0), TickOutcome::Completed);
    assert_eq!(second.wait().unwrap(), RunOutcome::Completed);
}

#[test]
fn runs_are_replayable_bit_for_bit() {
    let focus = FocusPoint::new(0.4, 0.4);
    let capture = || {
        let mut c = controller(40, 30, three_step());
        let mut frames = Vec::new();
        let handle = c.start(focus);
        drive(&mut c, &mut FixedStepScheduler::new(FRAME_MS * 4.0), |c, _| {
            frames.push((c.elapsed_ms(), c.surface().unwrap().snapshot()));
        });
        assert_eq!(handle.wait().unwrap(), RunOutcome::Completed);
        frames
    };
    let a = capture();
    let b = capture();
    assert!(a.len() > 10);
    assert_eq!(a, b);
}

#[test]
fn end_to_end_run_resolves_at_declared_duration() {
    let image = checker(800, 600);
    let dims = CanvasDimensions::fit(image.width, image.height, None).unwrap();
    let mut c = AnimationController::new(image, dims, three_step()).unwrap();
    assert_eq!(c.curve().total_duration_ms(), 1500.0);

    let mut sched = FixedStepScheduler::new(FRAME_MS);
    let outcome = play_once(&mut c, &mut sched, FocusPoint::center()).unwrap();
    assert_eq!(outcome, RunOutcome::Completed);

    assert!(c.elapsed_ms() >= 1500.0);
    assert!(c.elapsed_ms() < 1500.0 + FRAME_MS + 1e-6);
    assert_eq!(c.state().scale, 3.0);
    assert_eq!(c.state().rotation, 0.0);
    assert!(!c.is_running());
    assert_eq!(c.tick(sched.next_frame()), TickOutcome::Idle);
}

#[test]
fn detached_surface_fails_run_without_panicking() {
    let mut c = controller(16, 12, short_curve());
    let handle = c.start(FocusPoint::center());
    assert_eq!(c.tick(0.0), TickOutcome::Continue);
    let surface = c.take_surface().unwrap();
    assert_eq!(c.tick(16.0), TickOutcome::Failed);
    assert!(!c.is_running());
    assert!(matches!(
        handle.wait(),
        Err(SuperzoomError::RenderTargetUnavailable(_))
    ));
    assert_eq!(c.tick(32.0), TickOutcome::Idle);

    c.attach_surface(surface).unwrap();
    c.draw_static().unwrap();
}

#[test]
fn attach_rejects_mismatched_surface() {
    let mut c = controller(16, 12, short_curve());
    let other = Surface::new(CanvasDimensions::new(8, 8).unwrap()).unwrap();
    assert!(c.attach_surface(other).is_err());
}

#[test]
fn static_frame_is_refused_during_a_run() {
    let mut c = controller(16, 12, short_curve());
    c.draw_static().unwrap();
    let _h = c.start(FocusPoint::center());
    assert!(c.draw_static().is_err());
    c.cancel();
    c.draw_static().unwrap();
}

#[test]
fn non_finite_focus_rejects_run() {
    let mut c = controller(16, 12, short_curve());
    let h = c.start(FocusPoint::new(f64::NAN, 0.5));
    assert!(!c.is_running());
    assert!(matches!(h.wait(), Err(SuperzoomError::Validation(_))));
}

#[test]
fn dropping_controller_resolves_cancelled() {
    let mut c = controller(16, 12, short_curve());
    let h = c.start(FocusPoint::center());
    c.tick(0.0);
    drop(c);
    assert_eq!(h.wait().unwrap(), RunOutcome::Cancelled);
}

#[test]
fn audio_failure_does_not_stop_the_run() {
    let log = Rc::new(AudioLog::default());
    let mut c = controller(16, 12, short_curve()).with_audio(Box::new(LoggedTrack {
        log: log.clone(),
        fail: true,
    }));
    c.set_muted(false);
    let outcome = play_once(&mut c, &mut FixedStepScheduler::new(FRAME_MS), FocusPoint::center());
    assert_eq!(outcome.unwrap(), RunOutcome::Completed);
    assert_eq!(log.plays.get(), 1);
    assert!(log.pauses.get() >= 1);
}

#[test]
fn muted_audio_never_plays() {
    let log = Rc::new(AudioLog::default());
    let mut c = controller(16, 12, short_curve()).with_audio(Box::new(LoggedTrack {
        log: log.clone(),
        fail: false,
    }));
    assert!(c.is_muted());
    play_once(&mut c, &mut FixedStepScheduler::new(FRAME_MS), FocusPoint::center()).unwrap();
    assert_eq!(log.plays.get(), 0);
}

#[test]
fn loop_restarts_until_cancelled() {
    let log = Rc::new(AudioLog::default());
    let mut c = controller(16, 12, short_curve()).with_audio(Box::new(LoggedTrack {
        log: log.clone(),
        fail: false,
    }));
    c.set_muted(false);
    let handle = c.run_loop(FocusPoint::new(0.3, 0.6));
    let mut restarts = 0;
    let out = drive(&mut c, &mut FixedStepScheduler::new(FRAME_MS), |c, _| {
        if c.elapsed_ms() == 0.0 {
            restarts += 1;
        }
        if c.completed_loops() == 2 {
            c.cancel();
        }
    });
    assert_eq!(out, TickOutcome::Cancelled);
    assert_eq!(restarts, 2);
    assert_eq!(log.plays.get(), 2);
    assert_eq!(handle.wait().unwrap(), RunOutcome::Cancelled);
}
