use crate::{
    foundation::core::{BezPath, Point, Rect},
    foundation::error::KinetypeResult,
};

/// Font/glyph-outline provider consumed by the layout engine.
///
/// Implementations must be deterministic: identical inputs give identical outputs,
/// otherwise wrap decisions flicker between frames.
pub trait GlyphSource {
    /// Fillable outline of `text` with its baseline starting at `baseline`.
    fn outline(&self, text: &str, baseline: Point, font_size: f64) -> KinetypeResult<BezPath>;

    /// Ink bounds of `text` laid out at the origin. `y0` is negative above the
    /// baseline, `y1` positive below it.
    fn bounding_box(&self, text: &str, font_size: f64) -> KinetypeResult<Rect>;

    /// Horizontal advance of `text`, including interior spaces.
    fn advance_width(&self, text: &str, font_size: f64) -> KinetypeResult<f64>;
}
