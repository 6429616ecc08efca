/// Gap after which a tick is treated as a resume from background.
pub const INACTIVITY_THRESHOLD_MS: f64 = 300.0;

const PAINT_EPSILON_MS: f64 = 1e-6;

/// Timing of one painting tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTiming {
    /// Whole frame intervals consumed by this tick, in milliseconds.
    pub delta_ms: f64,
    /// Frames painted since the last (re)start, including this one.
    pub frame_count: u64,
    pub start_time_ms: f64,
    pub fps: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClockTick {
    /// Less than one frame interval has accumulated.
    Idle,
    /// The gap exceeded [`INACTIVITY_THRESHOLD_MS`]; counters were reset.
    Reset { gap_ms: f64 },
    Paint(FrameTiming),
}

/// Fixed-step frame accounting.
///
/// Whole intervals are consumed on a painting tick and the remainder is carried
/// into the next one, so pacing does not drift over long runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameClock {
    last_tick_ms: Option<f64>,
    start_time_ms: f64,
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now_ms: f64) {
        self.last_tick_ms = Some(now_ms);
        self.start_time_ms = now_ms;
        self.frame_count = 0;
    }

    pub fn is_started(&self) -> bool {
        self.last_tick_ms.is_some()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn start_time_ms(&self) -> f64 {
        self.start_time_ms
    }

    pub fn advance(&mut self, now_ms: f64, interval_ms: f64) -> ClockTick {
        let Some(last) = self.last_tick_ms else {
            self.start(now_ms);
            return ClockTick::Idle;
        };

        let delta = now_ms - last;
        if delta > INACTIVITY_THRESHOLD_MS {
            self.start(now_ms);
            return ClockTick::Reset { gap_ms: delta };
        }
        if delta + PAINT_EPSILON_MS < interval_ms {
            return ClockTick::Idle;
        }

        let frames = ((delta + PAINT_EPSILON_MS) / interval_ms).floor().max(1.0);
        let consumed = frames * interval_ms;
        let remainder = (delta - consumed).max(0.0);
        self.last_tick_ms = Some(now_ms - remainder);
        self.frame_count += 1;

        let since_start = now_ms - self.start_time_ms;
        let fps = if since_start > 0.0 {
            1000.0 / (since_start / self.frame_count as f64)
        } else {
            0.0
        };

        ClockTick::Paint(FrameTiming {
            delta_ms: consumed,
            frame_count: self.frame_count,
            start_time_ms: self.start_time_ms,
            fps,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/clock.rs"]
mod tests;
