use super::*;
use crate::{
    foundation::core::{BezPath, Rect},
    foundation::error::{KinetypeError, KinetypeResult},
};

/// Every character (space included) advances one unit regardless of size.
struct Mono;

impl GlyphSource for Mono {
    fn outline(&self, text: &str, baseline: Point, _font_size: f64) -> KinetypeResult<BezPath> {
        let w = text.chars().count() as f64;
        let mut p = BezPath::new();
        p.move_to(baseline);
        p.line_to((baseline.x + w, baseline.y));
        p.close_path();
        Ok(p)
    }

    fn bounding_box(&self, text: &str, _font_size: f64) -> KinetypeResult<Rect> {
        Ok(Rect::new(0.0, -10.0, text.chars().count() as f64, 2.0))
    }

    fn advance_width(&self, text: &str, _font_size: f64) -> KinetypeResult<f64> {
        Ok(text.chars().count() as f64)
    }
}

struct Broken;

impl GlyphSource for Broken {
    fn outline(&self, _: &str, _: Point, _: f64) -> KinetypeResult<BezPath> {
        Err(KinetypeError::layout("no font"))
    }

    fn bounding_box(&self, _: &str, _: f64) -> KinetypeResult<Rect> {
        Err(KinetypeError::layout("no font"))
    }

    fn advance_width(&self, _: &str, _: f64) -> KinetypeResult<f64> {
        Err(KinetypeError::layout("no font"))
    }
}

fn texts(chunks: &[LayoutChunk]) -> Vec<&str> {
    chunks.iter().map(|c| c.text.as_str()).collect()
}

fn style_with(bounds: Bounds, h: HAlign, v: VAlign) -> TextStyle {
    TextStyle {
        bounds,
        h_align: h,
        v_align: v,
        ..TextStyle::default()
    }
}

fn stats_10_2(chunks: usize) -> TextStats {
    TextStats {
        text_height: 10.0,
        offset_bottom: 2.0,
        advance_width: 0.0,
        total_height: chunks as f64 * 12.0,
    }
}

fn chunk(index: usize, text: &str) -> LayoutChunk {
    LayoutChunk {
        index,
        text: text.to_string(),
        width: text.chars().count() as f64,
        position: Point::ZERO,
    }
}

#[test]
fn boundary_width_is_rejected() {
    // "aa bb" measures exactly 5, which is not strictly narrower than 5.
    assert_eq!(Mono.advance_width("aa bb", 1.0).unwrap(), 5.0);
    let chunks = wrap_text(&Mono, "aa bb cc", 1.0, 5.0).unwrap();
    assert_eq!(texts(&chunks), ["aa", "bb", "cc"]);
    assert!(chunks.iter().all(|c| c.width == 2.0));
}

#[test]
fn wider_box_accepts_words_while_strictly_narrower() {
    let chunks = wrap_text(&Mono, "aa bb cc", 1.0, 6.0).unwrap();
    assert_eq!(texts(&chunks), ["aa bb", "cc"]);
    assert_eq!(chunks[0].width, 5.0);
    assert_eq!(chunks[1].width, 2.0);
    assert_eq!(
        chunks.iter().map(|c| c.index).collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[test]
fn empty_text_is_one_empty_chunk() {
    let chunks = wrap_text(&Mono, "", 1.0, 10.0).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "");
    assert_eq!(chunks[0].width, 0.0);
    assert_eq!(chunks[0].index, 1);
}

#[test]
fn over_wide_word_is_never_split() {
    let chunks = wrap_text(&Mono, "supercalifragilistic x", 1.0, 5.0).unwrap();
    assert_eq!(texts(&chunks), ["supercalifragilistic", "x"]);
    assert_eq!(chunks[0].width, 20.0);
    assert_eq!(chunks[1].width, 1.0);
}

#[test]
fn whitespace_runs_collapse() {
    let chunks = wrap_text(&Mono, "  a \n\t b  ", 1.0, 100.0).unwrap();
    assert_eq!(texts(&chunks), ["a b"]);
    assert_eq!(chunks[0].width, 3.0);
}

#[test]
fn measurement_failures_propagate() {
    assert!(matches!(
        wrap_text(&Broken, "a b", 1.0, 10.0),
        Err(KinetypeError::Layout(_))
    ));
}

#[test]
fn bottom_anchors_last_row_on_box_bottom() {
    let bounds = Bounds::new(Point::new(0.0, 100.0), 80.0, 50.0);
    let mut chunks = vec![chunk(1, "hi")];
    position_chunks(
        &mut chunks,
        &stats_10_2(1),
        &style_with(bounds, HAlign::Left, VAlign::Bottom),
    );
    assert_eq!(chunks[0].position.y, 100.0 - 12.0);
}

#[test]
fn top_shifts_block_by_free_height() {
    let bounds = Bounds::new(Point::new(0.0, 100.0), 80.0, 50.0);
    let mut chunks = vec![chunk(1, "hi")];
    position_chunks(
        &mut chunks,
        &stats_10_2(1),
        &style_with(bounds, HAlign::Left, VAlign::Top),
    );
    assert_eq!(chunks[0].position.y, 100.0 - (50.0 - 12.0) - 12.0);
}

#[test]
fn center_shifts_block_by_half_free_height() {
    let bounds = Bounds::new(Point::new(0.0, 100.0), 80.0, 50.0);
    let mut chunks = vec![chunk(1, "hi")];
    position_chunks(
        &mut chunks,
        &stats_10_2(1),
        &style_with(bounds, HAlign::Left, VAlign::Center),
    );
    assert_eq!(chunks[0].position.y, 100.0 - (25.0 - 6.0) - 12.0);
}

#[test]
fn rows_stack_upwards_in_wrap_order() {
    let bounds = Bounds::new(Point::new(0.0, 100.0), 80.0, 50.0);
    let mut chunks = vec![chunk(1, "one"), chunk(2, "two")];
    position_chunks(
        &mut chunks,
        &stats_10_2(2),
        &style_with(bounds, HAlign::Left, VAlign::Bottom),
    );
    assert_eq!(chunks[0].position.y, 76.0);
    assert_eq!(chunks[1].position.y, 88.0);

    let layout = TextLayout {
        stats: stats_10_2(2),
        chunks,
    };
    // Last baseline lands on y1 - offset_bottom.
    assert_eq!(layout.baseline(&layout.chunks[1], 1.0).y, 98.0);
}

#[test]
fn horizontal_alignment_is_per_line() {
    let bounds = Bounds::new(Point::new(10.0, 100.0), 20.0, 50.0);
    let mut chunks = vec![chunk(1, "ab"), chunk(2, "abcd")];

    position_chunks(
        &mut chunks,
        &stats_10_2(2),
        &style_with(bounds, HAlign::Left, VAlign::Top),
    );
    assert_eq!(chunks[0].position.x, 10.0);
    assert_eq!(chunks[1].position.x, 10.0);

    position_chunks(
        &mut chunks,
        &stats_10_2(2),
        &style_with(bounds, HAlign::Right, VAlign::Top),
    );
    assert_eq!(chunks[0].position.x, 28.0);
    assert_eq!(chunks[1].position.x, 26.0);

    position_chunks(
        &mut chunks,
        &stats_10_2(2),
        &style_with(bounds, HAlign::Center, VAlign::Top),
    );
    assert_eq!(chunks[0].position.x, 19.0);
    assert_eq!(chunks[1].position.x, 18.0);
}

#[test]
fn build_measures_stats_with_chunks() {
    let style = TextStyle {
        bounds: Bounds::new(Point::new(0.0, 100.0), 6.0, 50.0),
        ..TextStyle::default()
    };
    let layout = TextLayout::build(&Mono, "aa bb cc", &style).unwrap();
    assert_eq!(texts(&layout.chunks), ["aa bb", "cc"]);
    assert_eq!(layout.stats.text_height, 10.0);
    assert_eq!(layout.stats.offset_bottom, 2.0);
    assert_eq!(layout.stats.advance_width, 8.0);
    assert_eq!(layout.stats.total_height, 24.0);
    // Top alignment: block of 24 flush with the box top at y = 50.
    assert_eq!(layout.chunks[0].position.y, 50.0);
    assert_eq!(layout.chunks[1].position.y, 62.0);
}
