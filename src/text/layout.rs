use crate::{
    foundation::core::{Bounds, Point},
    foundation::error::KinetypeResult,
    text::glyphs::GlyphSource,
    text::style::{HAlign, TextStyle, VAlign},
};

/// Measurement cache rebuilt together with the chunk list.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextStats {
    /// Ink height above the baseline for the whole text on one line.
    pub text_height: f64,
    /// Distance from the baseline down to the lowest ink.
    pub offset_bottom: f64,
    /// Advance of the whole text on one line.
    pub advance_width: f64,
    /// Chunk count times the unscaled row pitch.
    pub total_height: f64,
}

impl TextStats {
    /// Vertical distance between consecutive rows.
    pub fn row_pitch(&self, line_height: f64) -> f64 {
        (self.text_height + self.offset_bottom) * line_height
    }
}

/// One wrapped line.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutChunk {
    /// 1-based, top to bottom in wrap order.
    pub index: usize,
    pub text: String,
    pub width: f64,
    /// Top-left of the row.
    pub position: Point,
}

/// Wrapped chunks plus the stats they were measured with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLayout {
    pub stats: TextStats,
    pub chunks: Vec<LayoutChunk>,
}

impl TextLayout {
    /// Measure and wrap `text` for `style`; positions are computed as well.
    pub fn build(glyphs: &dyn GlyphSource, text: &str, style: &TextStyle) -> KinetypeResult<Self> {
        let font_size = style.font_size;
        let bbox = glyphs.bounding_box(text, font_size)?;
        let chunks = wrap_text(glyphs, text, font_size, style.bounds.width)?;
        let text_height = (-bbox.y0).max(0.0);
        let offset_bottom = bbox.y1.max(0.0);
        let stats = TextStats {
            text_height,
            offset_bottom,
            advance_width: glyphs.advance_width(text, font_size)?,
            total_height: chunks.len() as f64 * (text_height + offset_bottom),
        };

        let mut layout = Self { stats, chunks };
        layout.reposition(style);
        Ok(layout)
    }

    /// Recompute draw positions from alignment and bounds without re-wrapping.
    pub fn reposition(&mut self, style: &TextStyle) {
        position_chunks(&mut self.chunks, &self.stats, style);
    }

    /// Baseline origin handed to the glyph source for `chunk`.
    pub fn baseline(&self, chunk: &LayoutChunk, line_height: f64) -> Point {
        Point::new(
            chunk.position.x,
            chunk.position.y + self.stats.row_pitch(line_height) - self.stats.offset_bottom,
        )
    }
}

/// Greedy line fill.
///
/// A word joins the running line only while the measured line stays strictly
/// narrower than `max_width`. Words are never split, so an over-wide word becomes
/// its own overflowing line. Empty input yields a single empty chunk.
pub fn wrap_text(
    glyphs: &dyn GlyphSource,
    text: &str,
    font_size: f64,
    max_width: f64,
) -> KinetypeResult<Vec<LayoutChunk>> {
    let mut words = text.split_whitespace();
    let mut chunks = Vec::new();
    let mut current = words.next().unwrap_or_default().to_string();
    let mut current_width: Option<f64> = None;

    for word in words {
        let candidate = format!("{current} {word}");
        let width = glyphs.advance_width(&candidate, font_size)?;
        if width < max_width {
            current = candidate;
            current_width = Some(width);
            continue;
        }

        let width = match current_width {
            Some(w) => w,
            None => glyphs.advance_width(&current, font_size)?,
        };
        chunks.push(LayoutChunk {
            index: chunks.len() + 1,
            text: std::mem::replace(&mut current, word.to_string()),
            width,
            position: Point::ZERO,
        });
        current_width = None;
    }

    let width = match current_width {
        Some(w) => w,
        None => glyphs.advance_width(&current, font_size)?,
    };
    chunks.push(LayoutChunk {
        index: chunks.len() + 1,
        text: current,
        width,
        position: Point::ZERO,
    });
    Ok(chunks)
}

/// Place every chunk according to the style's alignment and bounds.
///
/// Rows stack upwards from the box's bottom edge (`y1`) with a pitch of
/// `(text_height + offset_bottom) * line_height`; `Top` and `Center` shift the
/// whole block up by `height - total` and `height / 2 - total / 2`.
/// Horizontal alignment is applied to each line on its own width.
pub fn position_chunks(chunks: &mut [LayoutChunk], stats: &TextStats, style: &TextStyle) {
    let Bounds {
        origin,
        width,
        height,
    } = style.bounds;
    let pitch = stats.row_pitch(style.line_height);
    let total = stats.total_height * style.line_height;
    let shift = match style.v_align {
        VAlign::Bottom => 0.0,
        VAlign::Top => height - total,
        VAlign::Center => height / 2.0 - total / 2.0,
    };

    let n = chunks.len();
    for (i, chunk) in chunks.iter_mut().enumerate() {
        let rows_from_bottom = (n - i) as f64;
        let x = match style.h_align {
            HAlign::Left => origin.x,
            HAlign::Right => origin.x + (width - chunk.width),
            HAlign::Center => origin.x + (width - chunk.width) / 2.0,
        };
        let y = origin.y - shift - rows_from_bottom * pitch;
        chunk.position = Point::new(x, y);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
