use super::*;
use crate::{
    foundation::core::{BezPath, Point, Rect},
    render::record::RecordingSurface,
    text::glyphs::GlyphSource,
};

struct Mono;

impl GlyphSource for Mono {
    fn outline(&self, text: &str, baseline: Point, _: f64) -> KinetypeResult<BezPath> {
        let mut p = BezPath::new();
        p.move_to(baseline);
        p.line_to((baseline.x + text.len() as f64, baseline.y));
        p.close_path();
        Ok(p)
    }

    fn bounding_box(&self, text: &str, _: f64) -> KinetypeResult<Rect> {
        Ok(Rect::new(0.0, -10.0, text.len() as f64, 2.0))
    }

    fn advance_width(&self, text: &str, _: f64) -> KinetypeResult<f64> {
        Ok(text.len() as f64)
    }
}

fn shared_box() -> SharedTextBox {
    TextBox::new(Rc::new(Mono), "Hi").unwrap().into_shared()
}

fn font_size(b: &SharedTextBox) -> f64 {
    b.borrow().style().font_size
}

fn render(queue: &RenderQueue, surface: &mut RecordingSurface, delta: f64) {
    let mut payload = TickPayload::detached(surface, delta);
    queue.render(&mut payload).unwrap();
}

fn grow_then_shrink(b: &SharedTextBox) -> AnimationChain {
    AnimationChain::new(b)
        .then(StylePatch::default().font_size(60.0), 0.2, Ease::Linear)
        .then(StylePatch::default().font_size(30.0), 0.2, Ease::Linear)
}

#[test]
fn empty_chain_is_rejected() {
    let q = RenderQueue::new();
    let err = AnimationChain::new(&shared_box()).start(&q).unwrap_err();
    assert!(matches!(err, KinetypeError::Config(_)));
    assert!(q.is_empty());
}

#[test]
fn bad_duration_in_a_later_stage_fails_up_front() {
    let b = shared_box();
    let q = RenderQueue::new();
    let err = AnimationChain::new(&b)
        .then(StylePatch::default().font_size(60.0), 1.0, Ease::Linear)
        .then(StylePatch::default().font_size(10.0), 0.0, Ease::Linear)
        .start(&q)
        .unwrap_err();
    assert!(matches!(err, KinetypeError::Config(_)));
    assert!(q.is_empty());
}

#[test]
fn stages_run_back_to_back_from_where_the_last_ended() {
    let b = shared_box();
    let q = RenderQueue::new();
    let finished = Rc::new(Cell::new(0));
    {
        let finished = finished.clone();
        grow_then_shrink(&b)
            .on_finish(move || finished.set(finished.get() + 1))
            .start(&q)
            .unwrap();
    }
    let mut s = RecordingSurface::new(320, 200);

    render(&q, &mut s, 0.1);
    assert!((font_size(&b) - 54.0).abs() < 1e-9);
    render(&q, &mut s, 0.1);
    assert_eq!(font_size(&b), 60.0);
    // The second stage is queued but not yet stepped.
    assert_eq!(q.len(), 1);

    render(&q, &mut s, 0.1);
    assert!((font_size(&b) - 45.0).abs() < 1e-9);
    render(&q, &mut s, 0.1);
    assert_eq!(font_size(&b), 30.0);
    assert_eq!(finished.get(), 1);
    assert!(q.is_empty());
}

#[test]
fn repeat_times_replays_the_whole_chain() {
    let b = shared_box();
    let q = RenderQueue::new();
    let finished = Rc::new(Cell::new(false));
    {
        let finished = finished.clone();
        grow_then_shrink(&b)
            .repeat(Repeat::Times(1))
            .on_finish(move || finished.set(true))
            .start(&q)
            .unwrap();
    }
    let mut s = RecordingSurface::new(320, 200);

    for _ in 0..4 {
        render(&q, &mut s, 0.1);
    }
    assert!(!finished.get());
    assert_eq!(font_size(&b), 30.0);

    render(&q, &mut s, 0.1);
    render(&q, &mut s, 0.1);
    assert_eq!(font_size(&b), 60.0);

    render(&q, &mut s, 0.1);
    render(&q, &mut s, 0.1);
    assert!(finished.get());
    assert!(q.is_empty());
}

#[test]
fn repeat_forever_never_drains() {
    let b = shared_box();
    let q = RenderQueue::new();
    grow_then_shrink(&b)
        .repeat(Repeat::Forever)
        .start(&q)
        .unwrap();
    let mut s = RecordingSurface::new(320, 200);
    for _ in 0..41 {
        render(&q, &mut s, 0.1);
    }
    assert_eq!(q.len(), 1);
}

#[test]
fn hold_keeps_painting_the_final_state() {
    let b = shared_box();
    let q = RenderQueue::new();
    AnimationChain::new(&b)
        .then(StylePatch::default().font_size(20.0), 0.1, Ease::Linear)
        .hold(true)
        .start(&q)
        .unwrap();
    let mut s = RecordingSurface::new(320, 200);

    render(&q, &mut s, 0.1);
    assert_eq!(q.len(), 1);
    s.take_commands();

    render(&q, &mut s, 0.1);
    render(&q, &mut s, 0.1);
    assert_eq!(s.filled_paths().count(), 2);
    assert_eq!(font_size(&b), 20.0);
}

#[test]
fn stages_deserialize_with_defaults() {
    let stage: ChainStage = serde_json::from_str(r#"{ "to": { "font_size": 12.0 } }"#).unwrap();
    assert_eq!(stage.duration, 1.5);
    assert_eq!(stage.ease, Ease::InQuad);
    assert_eq!(stage.to.font_size, Some(12.0));
}
