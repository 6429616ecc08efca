use std::cell::RefCell;

use super::*;
use crate::render::record::{DrawCommand, RecordingSurface};
use crate::schedule::queue::StepStatus;

fn scheduler(rate: u32) -> FrameScheduler<RecordingSurface> {
    FrameScheduler::new(
        RecordingSurface::new(64, 32),
        SchedulerConfig {
            target_frame_rate: rate,
            ..SchedulerConfig::default()
        },
    )
    .unwrap()
}

fn log_callback(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Renderer {
    let log = log.clone();
    Renderer::callback(move |_| {
        log.borrow_mut().push(name);
        Ok(())
    })
}

#[test]
fn interval_follows_frame_rate() {
    let mut s = scheduler(30);
    assert_eq!(s.frame_rate(), 30);
    assert!((s.interval_ms() - 1000.0 / 30.0).abs() < 1e-12);

    assert_eq!(s.set_frame_rate(50), 50);
    assert_eq!(s.interval_ms(), 20.0);

    // Zero only queries.
    assert_eq!(s.set_frame_rate(0), 50);
    assert_eq!(s.interval_ms(), 20.0);
}

#[test]
fn default_config_is_thirty_fps() {
    let s = FrameScheduler::new(RecordingSurface::new(1, 1), SchedulerConfig::default()).unwrap();
    assert_eq!(s.frame_rate(), 30);
    assert!(!s.is_running());
}

#[test]
fn invalid_configuration_is_rejected_at_construction() {
    let zero_rate = SchedulerConfig {
        target_frame_rate: 0,
        ..SchedulerConfig::default()
    };
    assert!(matches!(
        FrameScheduler::new(RecordingSurface::new(4, 4), zero_rate),
        Err(KinetypeError::Config(_))
    ));
    assert!(matches!(
        FrameScheduler::new(RecordingSurface::new(0, 4), SchedulerConfig::default()),
        Err(KinetypeError::Config(_))
    ));
    let webgl = SchedulerConfig {
        webgl: true,
        ..SchedulerConfig::default()
    };
    assert!(matches!(
        FrameScheduler::new(RecordingSurface::new(4, 4), webgl),
        Err(KinetypeError::Config(_))
    ));
}

#[test]
fn config_deserializes_with_defaults() {
    let cfg: SchedulerConfig =
        serde_json::from_str(r#"{ "background_color": [0, 0, 0, 255] }"#).unwrap();
    assert_eq!(cfg.background_color, Rgba8::BLACK);
    assert_eq!(cfg.target_frame_rate, 30);
    assert!(!cfg.webgl);
}

#[test]
fn tick_before_start_is_stopped() {
    let mut s = scheduler(10);
    assert_eq!(s.tick(1000.0), TickOutcome::Stopped);
}

#[test]
fn flat_renderers_run_before_queues() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut s = scheduler(10);

    let queue = RenderQueue::new();
    {
        let log = log.clone();
        queue.push(move |_| {
            log.borrow_mut().push("queue");
            Ok(StepStatus::Running)
        });
    }
    s.register(queue);
    s.register(log_callback(&log, "first"));
    s.register(log_callback(&log, "second"));

    s.start(0.0);
    assert_eq!(s.tick(100.0), TickOutcome::Painted { frame_count: 1 });
    assert_eq!(*log.borrow(), vec!["first", "second", "queue"]);
}

#[test]
fn background_is_filled_before_renderers() {
    let mut s = scheduler(10);
    s.set_background_color(Rgba8::new(1, 2, 3, 255));
    s.register(Renderer::callback(|p| {
        p.surface.set_fill(Rgba8::WHITE);
        Ok(())
    }));
    s.start(0.0);
    s.tick(100.0);

    let cmds = s.surface().commands();
    assert_eq!(
        &cmds[..4],
        &[
            DrawCommand::BeginFrame,
            DrawCommand::Save,
            DrawCommand::SetFill(Rgba8::new(1, 2, 3, 255)),
            DrawCommand::FillRect {
                rect: Rect::new(0.0, 0.0, 64.0, 32.0),
                color: Rgba8::new(1, 2, 3, 255),
            },
        ]
    );
    assert_eq!(cmds.last(), Some(&DrawCommand::EndFrame));
    assert_eq!(s.surface().save_depth(), 0);
}

#[test]
fn renderer_state_does_not_leak_into_the_next() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut s = scheduler(10);
    s.set_background_color(Rgba8::BLACK);
    s.register(Renderer::callback(|p| {
        p.surface.set_fill(Rgba8::WHITE);
        Ok(())
    }));
    {
        let seen = seen.clone();
        s.register(Renderer::callback(move |p| {
            p.surface.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
            seen.borrow_mut().push(p.surface.size());
            Ok(())
        }));
    }
    s.start(0.0);
    s.tick(100.0);

    let last_fill = s
        .surface()
        .commands()
        .iter()
        .rev()
        .find_map(|c| match c {
            DrawCommand::FillRect { color, .. } => Some(*color),
            _ => None,
        });
    assert_eq!(last_fill, Some(Rgba8::BLACK));
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn payload_carries_timing() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut s = scheduler(20);
    {
        let seen = seen.clone();
        s.register(Renderer::callback(move |p| {
            seen.borrow_mut()
                .push((p.delta, p.frame_count, p.handle.frame_rate()));
            Ok(())
        }));
    }
    s.start(1000.0);
    assert_eq!(s.tick(1030.0), TickOutcome::Idle);
    assert_eq!(s.tick(1050.0), TickOutcome::Painted { frame_count: 1 });
    assert_eq!(s.tick(1100.0), TickOutcome::Painted { frame_count: 2 });

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert!((seen[0].0 - 0.05).abs() < 1e-12);
    assert_eq!(seen[1].1, 2);
    assert_eq!(seen[1].2, 20);
}

#[test]
fn failing_renderer_stops_the_scheduler() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut s = scheduler(10);
    s.register(log_callback(&log, "before"));
    let bad = s.register(Renderer::callback(|p| {
        p.surface.save();
        Err(KinetypeError::render("boom"))
    }));
    s.register(log_callback(&log, "after"));

    s.start(0.0);
    assert_eq!(s.tick(100.0), TickOutcome::Failed { renderer: bad });
    assert!(!s.is_running());
    assert_eq!(*log.borrow(), vec!["before"]);
    assert_eq!(s.tick(200.0), TickOutcome::Stopped);

    let cmds = s.surface().commands();
    assert_eq!(cmds.last(), Some(&DrawCommand::AbortFrame));
    assert!(!cmds.contains(&DrawCommand::EndFrame));
    assert_eq!(s.surface().save_depth(), 0);
}

#[test]
fn renderer_can_stop_the_loop_through_the_handle() {
    let mut s = scheduler(10);
    s.register(Renderer::callback(|p| {
        p.handle.stop();
        Ok(())
    }));
    s.start(0.0);
    assert_eq!(s.tick(100.0), TickOutcome::Painted { frame_count: 1 });
    assert_eq!(s.tick(200.0), TickOutcome::Stopped);
    // stop is idempotent
    s.stop();
    s.stop();
    assert!(!s.is_running());
}

#[test]
fn unregister_removes_renderer() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut s = scheduler(10);
    let a = s.register(log_callback(&log, "a"));
    s.register(log_callback(&log, "b"));
    let q = s.register(RenderQueue::new());
    assert_eq!(s.renderer_count(), 3);

    assert!(matches!(s.unregister(a), Some(Renderer::Callback(_))));
    assert!(matches!(s.unregister(q), Some(Renderer::Queue(_))));
    assert!(s.unregister(a).is_none());

    s.start(0.0);
    s.tick(100.0);
    assert_eq!(*log.borrow(), vec!["b"]);
}

#[test]
fn inactivity_gap_resets_frame_count() {
    let mut s = scheduler(10);
    s.start(0.0);
    s.tick(100.0);
    s.tick(200.0);
    assert_eq!(s.frame_count(), 2);

    assert_eq!(s.tick(5000.0), TickOutcome::Reset);
    assert_eq!(s.frame_count(), 0);
    assert_eq!(s.tick(5100.0), TickOutcome::Painted { frame_count: 1 });
}
