use std::{cell::Cell, rc::Rc};

use crate::{
    foundation::core::{Rect, Rgba8},
    foundation::error::{KinetypeError, KinetypeResult},
    render::surface::Surface,
    schedule::clock::{ClockTick, FrameClock},
    schedule::queue::RenderQueue,
    text::text_box::SharedTextBox,
};

pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Recognized scheduler options.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Filled over the whole surface before any renderer runs.
    pub background_color: Rgba8,
    pub target_frame_rate: u32,
    /// Also initialize the surface's secondary 3D context.
    pub webgl: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            background_color: Rgba8::WHITE,
            target_frame_rate: DEFAULT_FRAME_RATE,
            webgl: false,
        }
    }
}

#[derive(Debug)]
struct LoopState {
    running: Cell<bool>,
    frame_rate: Cell<u32>,
    interval_ms: Cell<f64>,
}

/// Shared view of a scheduler's run state, handed to renderers in the payload.
///
/// Frame rate and interval are always updated together.
#[derive(Clone, Debug)]
pub struct LoopHandle {
    state: Rc<LoopState>,
}

impl LoopHandle {
    fn new(frame_rate: u32) -> Self {
        let handle = Self {
            state: Rc::new(LoopState {
                running: Cell::new(false),
                frame_rate: Cell::new(0),
                interval_ms: Cell::new(0.0),
            }),
        };
        handle.set_frame_rate(frame_rate);
        handle
    }

    /// Halt further painting. Idempotent.
    pub fn stop(&self) {
        self.state.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    pub fn frame_rate(&self) -> u32 {
        self.state.frame_rate.get()
    }

    pub fn interval_ms(&self) -> f64 {
        self.state.interval_ms.get()
    }

    /// Set the target rate and return the rate now in effect. Zero only queries.
    pub fn set_frame_rate(&self, rate: u32) -> u32 {
        if rate == 0 {
            return self.frame_rate();
        }
        if rate != self.frame_rate() {
            tracing::debug!(rate, "frame rate changed");
        }
        self.state.frame_rate.set(rate);
        self.state.interval_ms.set(1000.0 / f64::from(rate));
        rate
    }

    fn set_running(&self, running: bool) {
        self.state.running.set(running);
    }
}

/// Per-tick data shared by every renderer invoked during one painting tick.
pub struct TickPayload<'a> {
    pub surface: &'a mut dyn Surface,
    /// Seconds since the previous painting tick.
    pub delta: f64,
    /// Frames painted since the last (re)start, including this one.
    pub frame_count: u64,
    pub start_time_ms: f64,
    pub fps: f64,
    pub background: Rgba8,
    pub handle: LoopHandle,
}

impl<'a> TickPayload<'a> {
    /// Payload outside of a scheduler, with a stopped handle at the default rate.
    pub fn detached(surface: &'a mut dyn Surface, delta: f64) -> Self {
        Self {
            surface,
            delta,
            frame_count: 0,
            start_time_ms: 0.0,
            fps: 0.0,
            background: Rgba8::TRANSPARENT,
            handle: LoopHandle::new(DEFAULT_FRAME_RATE),
        }
    }
}

impl std::fmt::Debug for TickPayload<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickPayload")
            .field("delta", &self.delta)
            .field("frame_count", &self.frame_count)
            .field("start_time_ms", &self.start_time_ms)
            .field("fps", &self.fps)
            .field("background", &self.background)
            .finish_non_exhaustive()
    }
}

pub type RenderCallback = Box<dyn FnMut(&mut TickPayload<'_>) -> KinetypeResult<()>>;

/// Anything the scheduler can paint.
pub enum Renderer {
    Callback(RenderCallback),
    TextBox(SharedTextBox),
    Queue(RenderQueue),
}

impl Renderer {
    pub fn callback<F>(f: F) -> Self
    where
        F: FnMut(&mut TickPayload<'_>) -> KinetypeResult<()> + 'static,
    {
        Self::Callback(Box::new(f))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Callback(_) => "callback",
            Self::TextBox(_) => "text_box",
            Self::Queue(_) => "queue",
        }
    }

    fn paint(&mut self, payload: &mut TickPayload<'_>) -> KinetypeResult<()> {
        match self {
            Self::Callback(f) => f(payload),
            Self::TextBox(b) => b.borrow_mut().paint(&mut *payload.surface),
            Self::Queue(q) => q.render(payload),
        }
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Renderer::Callback"),
            Self::TextBox(b) => f.debug_tuple("Renderer::TextBox").field(b).finish(),
            Self::Queue(q) => f.debug_tuple("Renderer::Queue").field(q).finish(),
        }
    }
}

impl From<RenderQueue> for Renderer {
    fn from(q: RenderQueue) -> Self {
        Self::Queue(q)
    }
}

impl From<SharedTextBox> for Renderer {
    fn from(b: SharedTextBox) -> Self {
        Self::TextBox(b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RendererId(u64);

impl std::fmt::Display for RendererId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "renderer#{}", self.0)
    }
}

/// Result of one [`FrameScheduler::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// The scheduler is not running.
    Stopped,
    /// Less than one frame interval has elapsed.
    Idle,
    /// Resumed after an inactivity gap; counters were reset and nothing painted.
    Reset,
    Painted { frame_count: u64 },
    /// A renderer failed; the error was logged, the partial frame discarded and
    /// the scheduler stopped itself.
    Failed { renderer: RendererId },
    /// The surface could not finish the frame; the scheduler stopped itself.
    SurfaceFailed,
}

/// Frame-paced dispatcher owning the drawing surface.
///
/// Flat renderers (callbacks and text boxes) run before queues, each group in
/// registration order. Every renderer runs inside its own save/restore pair.
pub struct FrameScheduler<S: Surface> {
    surface: S,
    clock: FrameClock,
    handle: LoopHandle,
    background: Rgba8,
    flat: Vec<(RendererId, Renderer)>,
    queues: Vec<(RendererId, Renderer)>,
    next_id: u64,
}

impl<S: Surface> std::fmt::Debug for FrameScheduler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("handle", &self.handle)
            .field("clock", &self.clock)
            .field("background", &self.background)
            .field("flat", &self.flat.len())
            .field("queues", &self.queues.len())
            .finish()
    }
}

impl<S: Surface> FrameScheduler<S> {
    pub fn new(mut surface: S, config: SchedulerConfig) -> KinetypeResult<Self> {
        let (w, h) = surface.size();
        if w == 0 || h == 0 {
            return Err(KinetypeError::config(format!(
                "drawing surface has invalid size {w}x{h}"
            )));
        }
        if config.target_frame_rate == 0 {
            return Err(KinetypeError::config("target frame rate must be positive"));
        }
        if config.webgl {
            surface.enable_3d()?;
        }

        Ok(Self {
            surface,
            clock: FrameClock::new(),
            handle: LoopHandle::new(config.target_frame_rate),
            background: config.background_color,
            flat: Vec::new(),
            queues: Vec::new(),
            next_id: 0,
        })
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    pub fn frame_rate(&self) -> u32 {
        self.handle.frame_rate()
    }

    pub fn interval_ms(&self) -> f64 {
        self.handle.interval_ms()
    }

    pub fn frame_count(&self) -> u64 {
        self.clock.frame_count()
    }

    pub fn set_frame_rate(&mut self, rate: u32) -> u32 {
        self.handle.set_frame_rate(rate)
    }

    pub fn background_color(&self) -> Rgba8 {
        self.background
    }

    pub fn set_background_color(&mut self, color: Rgba8) {
        self.background = color;
    }

    pub fn register(&mut self, renderer: impl Into<Renderer>) -> RendererId {
        let renderer = renderer.into();
        let id = RendererId(self.next_id);
        self.next_id += 1;
        tracing::debug!(renderer = %id, kind = renderer.kind(), "registered renderer");
        match renderer {
            Renderer::Queue(_) => self.queues.push((id, renderer)),
            _ => self.flat.push((id, renderer)),
        }
        id
    }

    pub fn unregister(&mut self, id: RendererId) -> Option<Renderer> {
        for list in [&mut self.flat, &mut self.queues] {
            if let Some(pos) = list.iter().position(|(rid, _)| *rid == id) {
                return Some(list.remove(pos).1);
            }
        }
        None
    }

    pub fn renderer_count(&self) -> usize {
        self.flat.len() + self.queues.len()
    }

    /// Begin ticking with `now_ms` as the time base.
    pub fn start(&mut self, now_ms: f64) {
        self.clock.start(now_ms);
        self.handle.set_running(true);
        tracing::debug!(
            rate = self.handle.frame_rate(),
            interval_ms = self.handle.interval_ms(),
            "scheduler started"
        );
    }

    pub fn stop(&mut self) {
        self.handle.stop();
    }

    /// One platform frame callback at wall-clock time `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> TickOutcome {
        if !self.handle.is_running() {
            return TickOutcome::Stopped;
        }

        let timing = match self.clock.advance(now_ms, self.handle.interval_ms()) {
            ClockTick::Idle => return TickOutcome::Idle,
            ClockTick::Reset { gap_ms } => {
                tracing::debug!(gap_ms, "inactivity gap, frame counters reset");
                return TickOutcome::Reset;
            }
            ClockTick::Paint(t) => t,
        };

        let Self {
            surface,
            handle,
            background,
            flat,
            queues,
            ..
        } = self;

        surface.begin_frame();
        surface.save();
        let (w, h) = surface.size();
        surface.set_fill(*background);
        surface.fill_rect(Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));

        let mut payload = TickPayload {
            surface: &mut *surface,
            delta: timing.delta_ms / 1000.0,
            frame_count: timing.frame_count,
            start_time_ms: timing.start_time_ms,
            fps: timing.fps,
            background: *background,
            handle: handle.clone(),
        };

        let mut failed = None;
        for (id, renderer) in flat.iter_mut().chain(queues.iter_mut()) {
            payload.surface.save();
            let res = renderer.paint(&mut payload);
            payload.surface.restore();
            if let Err(err) = res {
                tracing::error!(
                    renderer = %id,
                    kind = renderer.kind(),
                    error = %err,
                    "renderer failed; stopping scheduler"
                );
                failed = Some(*id);
                break;
            }
        }
        drop(payload);

        surface.restore();
        if let Some(renderer) = failed {
            surface.abort_frame();
            handle.stop();
            return TickOutcome::Failed { renderer };
        }
        if let Err(err) = surface.end_frame() {
            tracing::error!(error = %err, "surface failed to finish frame; stopping scheduler");
            handle.stop();
            return TickOutcome::SurfaceFailed;
        }

        TickOutcome::Painted {
            frame_count: timing.frame_count,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
