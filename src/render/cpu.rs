use std::path::Path;

use anyhow::Context as _;

use crate::{
    foundation::core::{BezPath, Point, Rect, Rgba8},
    foundation::error::{KinetypeError, KinetypeResult},
    render::surface::Surface,
};

#[derive(Clone, Copy, Debug)]
struct PaintState {
    fill: Rgba8,
    stroke: Rgba8,
    line_width: f64,
    clip_layers: usize,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            fill: Rgba8::BLACK,
            stroke: Rgba8::BLACK,
            line_width: 1.0,
            clip_layers: 0,
        }
    }
}

/// Raster surface backed by `vello_cpu`.
///
/// Draw calls accumulate in a render context for the current frame; `end_frame`
/// rasterizes them into the pixmap, which then holds premultiplied RGBA8 pixels.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    state: PaintState,
    stack: Vec<PaintState>,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("save_depth", &self.stack.len())
            .finish()
    }
}

impl CpuSurface {
    pub fn new(width: u32, height: u32) -> KinetypeResult<Self> {
        if width == 0 || height == 0 {
            return Err(KinetypeError::config("surface size must be non-zero"));
        }
        let w: u16 = width
            .try_into()
            .map_err(|_| KinetypeError::config("surface width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| KinetypeError::config("surface height exceeds u16"))?;
        Ok(Self {
            width: w,
            height: h,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
            state: PaintState::default(),
            stack: Vec::new(),
        })
    }

    /// Premultiplied RGBA8 pixels of the last finished frame.
    pub fn premultiplied_rgba8(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Straight-alpha RGBA8 pixels of the last finished frame.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = self.pixmap.data_as_u8_slice().to_vec();
        unpremultiply_in_place(&mut out);
        out
    }

    pub fn save_png(&self, path: &Path) -> KinetypeResult<()> {
        let img = image::RgbaImage::from_raw(
            u32::from(self.width),
            u32::from(self.height),
            self.to_rgba8(),
        )
        .ok_or_else(|| KinetypeError::render("pixmap size does not match surface size"))?;
        img.save(path)
            .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }

    fn pop_clips(&mut self, n: usize) {
        for _ in 0..n {
            self.ctx.pop_layer();
        }
    }
}

impl Surface for CpuSurface {
    fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn begin_frame(&mut self) {
        self.ctx = vello_cpu::RenderContext::new(self.width, self.height);
        self.state = PaintState::default();
        self.stack.clear();
    }

    fn end_frame(&mut self) -> KinetypeResult<()> {
        // Close clip layers left open by unbalanced saves.
        let mut open = self.state.clip_layers;
        open += self.stack.iter().map(|s| s.clip_layers).sum::<usize>();
        if open > 0 {
            tracing::warn!(open, "closing clip layers left open at end of frame");
            self.pop_clips(open);
        }
        self.state = PaintState::default();
        self.stack.clear();

        // The previous frame stays visible until the new one is fully rasterized.
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        self.pixmap = pixmap;
        Ok(())
    }

    fn abort_frame(&mut self) {
        tracing::debug!("discarding partially painted frame");
        self.ctx = vello_cpu::RenderContext::new(self.width, self.height);
        self.state = PaintState::default();
        self.stack.clear();
    }

    fn save(&mut self) {
        self.stack.push(self.state);
        self.state.clip_layers = 0;
    }

    fn restore(&mut self) {
        let Some(prev) = self.stack.pop() else {
            tracing::warn!("restore without matching save");
            return;
        };
        self.pop_clips(self.state.clip_layers);
        self.state = prev;
    }

    fn clip(&mut self, path: &BezPath) {
        self.ctx.push_clip_layer(&bezpath_to_cpu(path));
        self.state.clip_layers += 1;
    }

    fn set_fill(&mut self, color: Rgba8) {
        self.state.fill = color;
    }

    fn set_stroke(&mut self, color: Rgba8, line_width: f64) {
        self.state.stroke = color;
        self.state.line_width = line_width;
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.ctx.set_paint(color_to_cpu(self.state.fill));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            rect.x0, rect.y0, rect.x1, rect.y1,
        ));
    }

    fn fill_path(&mut self, path: &BezPath) {
        self.ctx.set_paint(color_to_cpu(self.state.fill));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    fn stroke_path(&mut self, path: &BezPath) {
        self.ctx.set_paint(color_to_cpu(self.state.stroke));
        self.ctx
            .set_stroke(vello_cpu::kurbo::Stroke::new(self.state.line_width));
        self.ctx.stroke_path(&bezpath_to_cpu(path));
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
