use crate::{
    foundation::core::{BezPath, Rect, Rgba8},
    foundation::error::KinetypeResult,
    render::surface::Surface,
};

/// One recorded surface call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    BeginFrame,
    EndFrame,
    AbortFrame,
    Save,
    Restore,
    Clip(BezPath),
    SetFill(Rgba8),
    SetStroke { color: Rgba8, line_width: f64 },
    FillRect { rect: Rect, color: Rgba8 },
    FillPath { path: BezPath, color: Rgba8 },
    StrokePath { path: BezPath, color: Rgba8 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PaintState {
    fill: Rgba8,
    stroke: Rgba8,
    line_width: f64,
    clip_depth: usize,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            fill: Rgba8::BLACK,
            stroke: Rgba8::BLACK,
            line_width: 1.0,
            clip_depth: 0,
        }
    }
}

/// Headless surface that records a display list instead of rasterizing.
///
/// Fill and stroke commands carry the color that was active when they were
/// issued, so the list can be replayed or inspected without tracking state.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
    state: PaintState,
    stack: Vec<PaintState>,
    unbalanced_restores: usize,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            state: PaintState::default(),
            stack: Vec::new(),
            unbalanced_restores: 0,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of `save` calls not yet matched by a `restore`.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// `restore` calls issued with nothing saved.
    pub fn unbalanced_restores(&self) -> usize {
        self.unbalanced_restores
    }

    pub fn clip_depth(&self) -> usize {
        self.state.clip_depth
    }

    pub fn fill_color(&self) -> Rgba8 {
        self.state.fill
    }

    /// Recorded glyph and shape fills, in paint order.
    pub fn filled_paths(&self) -> impl Iterator<Item = (&BezPath, Rgba8)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillPath { path, color } => Some((path, *color)),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn begin_frame(&mut self) {
        self.commands.push(DrawCommand::BeginFrame);
    }

    fn end_frame(&mut self) -> KinetypeResult<()> {
        self.commands.push(DrawCommand::EndFrame);
        Ok(())
    }

    fn abort_frame(&mut self) {
        self.commands.push(DrawCommand::AbortFrame);
    }

    fn save(&mut self) {
        self.stack.push(self.state);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        match self.stack.pop() {
            Some(s) => self.state = s,
            None => self.unbalanced_restores += 1,
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn clip(&mut self, path: &BezPath) {
        self.state.clip_depth += 1;
        self.commands.push(DrawCommand::Clip(path.clone()));
    }

    fn set_fill(&mut self, color: Rgba8) {
        self.state.fill = color;
        self.commands.push(DrawCommand::SetFill(color));
    }

    fn set_stroke(&mut self, color: Rgba8, line_width: f64) {
        self.state.stroke = color;
        self.state.line_width = line_width;
        self.commands
            .push(DrawCommand::SetStroke { color, line_width });
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color: self.state.fill,
        });
    }

    fn fill_path(&mut self, path: &BezPath) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            color: self.state.fill,
        });
    }

    fn stroke_path(&mut self, path: &BezPath) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            color: self.state.stroke,
        });
    }
}
