//! Kinetype drives animated, styled text layouts on a 2D drawing surface at a
//! controlled frame rate.
//!
//! # Pieces
//!
//! 1. **Schedule**: [`FrameScheduler`] turns platform frame callbacks into a stable
//!    fixed-step tick signal (with an inactivity reset) and dispatches a
//!    [`TickPayload`] to registered [`Renderer`]s.
//! 2. **Queue**: [`RenderQueue`] chains self-terminating render steps with
//!    completion callbacks, one visit per packet per tick.
//! 3. **Text**: [`TextBox`] wraps text greedily into its box width, aligns each
//!    line, and paints clipped glyph outlines from a [`GlyphSource`].
//! 4. **Animation**: [`PropertyAnimator`] eases a box's style towards a
//!    [`StylePatch`]; [`AnimationChain`] sequences several of them.
//!
//! Drawing goes through the [`Surface`] trait. [`CpuSurface`] rasterizes with
//! `vello_cpu`; [`RecordingSurface`] records a display list for headless use.
//!
//! Everything is single-threaded: shared state uses `Rc`/`RefCell` and no
//! handle is `Send`.
#![forbid(unsafe_code)]

mod animation;
mod foundation;
mod render;
mod schedule;
mod script;
mod text;

pub use animation::animator::PropertyAnimator;
pub use animation::chain::{AnimationChain, ChainStage, Repeat};
pub use animation::ease::Ease;
pub use animation::lerp::Lerp;
pub use foundation::core::{BezPath, Bounds, Point, Rect, Rgba8};
pub use foundation::error::{KinetypeError, KinetypeResult};
pub use render::cpu::CpuSurface;
pub use render::record::{DrawCommand, RecordingSurface};
pub use render::surface::Surface;
pub use schedule::clock::{ClockTick, FrameClock, FrameTiming, INACTIVITY_THRESHOLD_MS};
pub use schedule::driver::{
    DISPLAY_REFRESH_MS, RunSummary, run_realtime, run_synthetic, run_synthetic_with,
};
pub use schedule::queue::{OnDone, RenderQueue, RenderStep, StepStatus, WeakRenderQueue};
pub use schedule::scheduler::{
    DEFAULT_FRAME_RATE, FrameScheduler, LoopHandle, RenderCallback, Renderer, RendererId,
    SchedulerConfig, TickOutcome, TickPayload,
};
pub use script::{BoxSpec, Canvas, ChainSpec, FontSource, Scene, SceneScript};
pub use text::glyphs::GlyphSource;
pub use text::layout::{LayoutChunk, TextLayout, TextStats, position_chunks, wrap_text};
pub use text::style::{HAlign, StyleChange, StylePatch, TextStyle, VAlign};
pub use text::svg_font::SvgGlyphs;
pub use text::text_box::{SharedTextBox, TextBox};
