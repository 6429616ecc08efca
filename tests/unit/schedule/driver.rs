use std::{cell::RefCell, rc::Rc};

use super::*;
use crate::{
    render::record::RecordingSurface,
    schedule::scheduler::{Renderer, SchedulerConfig},
};

fn scheduler(rate: u32) -> FrameScheduler<RecordingSurface> {
    FrameScheduler::new(
        RecordingSurface::new(16, 16),
        SchedulerConfig {
            target_frame_rate: rate,
            ..SchedulerConfig::default()
        },
    )
    .unwrap()
}

#[test]
fn synthetic_run_paints_every_interval() {
    let mut s = scheduler(60);
    let summary = run_synthetic(&mut s, 60, 1000.0 / 60.0).unwrap();
    assert_eq!(summary.ticks, 60);
    assert_eq!(summary.painted, 60);
    assert_eq!(s.frame_count(), 60);
}

#[test]
fn faster_ticks_than_frame_rate_skip_frames() {
    let mut s = scheduler(30);
    let summary = run_synthetic(&mut s, 60, 1000.0 / 60.0).unwrap();
    assert_eq!(summary.painted, 30);
}

#[test]
fn on_paint_sees_each_frame_index() {
    let mut s = scheduler(10);
    let mut seen = Vec::new();
    run_synthetic_with(&mut s, 5, 100.0, |i, surface| {
        seen.push((i, surface.save_depth()));
        Ok(())
    })
    .unwrap();
    assert_eq!(seen, [(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
}

#[test]
fn run_ends_early_when_a_renderer_stops_the_loop() {
    let calls = Rc::new(RefCell::new(0));
    let mut s = scheduler(10);
    {
        let calls = calls.clone();
        s.register(Renderer::callback(move |p| {
            *calls.borrow_mut() += 1;
            if p.frame_count == 3 {
                p.handle.stop();
            }
            Ok(())
        }));
    }
    let summary = run_synthetic(&mut s, 10, 100.0).unwrap();
    assert_eq!(*calls.borrow(), 3);
    assert_eq!(summary.painted, 3);
    assert_eq!(summary.ticks, 4);
}

#[test]
fn renderer_failure_surfaces_as_an_error() {
    let mut s = scheduler(10);
    s.register(Renderer::callback(|_| {
        Err(KinetypeError::render("broken"))
    }));
    let err = run_synthetic(&mut s, 3, 100.0).unwrap_err();
    assert!(matches!(err, KinetypeError::Render(_)));
    assert!(!s.is_running());
}

#[test]
fn non_positive_step_is_rejected() {
    let mut s = scheduler(10);
    assert!(matches!(
        run_synthetic(&mut s, 3, 0.0),
        Err(KinetypeError::Config(_))
    ));
}

#[test]
fn realtime_run_paints_and_respects_duration() {
    let mut s = scheduler(30);
    let summary = run_realtime(&mut s, Duration::from_millis(200)).unwrap();
    assert!(summary.painted >= 1);
    assert!(summary.painted <= 8);
}
