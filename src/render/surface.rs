use crate::{
    foundation::core::{BezPath, Rect, Rgba8},
    foundation::error::{KinetypeError, KinetypeResult},
};

/// Immediate-mode 2D drawing surface.
///
/// Mirrors a canvas-style context: paint state (fill, stroke, clip) is scoped by
/// `save`/`restore` pairs and every call is synchronous.
pub trait Surface {
    /// Pixel size as `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Called before the first draw call of a painted tick.
    fn begin_frame(&mut self) {}

    /// Called after the last renderer of a painted tick.
    fn end_frame(&mut self) -> KinetypeResult<()> {
        Ok(())
    }

    /// Called instead of `end_frame` when a painted tick fails. The last
    /// finished frame must stay intact.
    fn abort_frame(&mut self) {}

    /// Initialize a secondary 3D context for post-processing passes.
    fn enable_3d(&mut self) -> KinetypeResult<()> {
        Err(KinetypeError::config(
            "surface does not provide a secondary 3D context",
        ))
    }

    fn save(&mut self);

    fn restore(&mut self);

    /// Intersect the current clip with `path`.
    fn clip(&mut self, path: &BezPath);

    fn set_fill(&mut self, color: Rgba8);

    fn set_stroke(&mut self, color: Rgba8, line_width: f64);

    fn fill_rect(&mut self, rect: Rect);

    fn fill_path(&mut self, path: &BezPath);

    fn stroke_path(&mut self, path: &BezPath);
}
