use std::time::{Duration, Instant};

use crate::{
    foundation::error::{KinetypeError, KinetypeResult},
    render::surface::Surface,
    schedule::scheduler::{FrameScheduler, TickOutcome},
};

/// Cadence of the simulated platform frame callback in [`run_realtime`].
pub const DISPLAY_REFRESH_MS: f64 = 1000.0 / 60.0;

/// Counters from one driver run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub painted: u64,
    pub resets: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: TickOutcome) -> KinetypeResult<bool> {
        self.ticks += 1;
        match outcome {
            TickOutcome::Painted { .. } => self.painted += 1,
            TickOutcome::Reset => self.resets += 1,
            TickOutcome::Idle => {}
            TickOutcome::Stopped => return Ok(false),
            TickOutcome::Failed { renderer } => {
                return Err(KinetypeError::render(format!(
                    "{renderer} failed; scheduler stopped"
                )));
            }
            TickOutcome::SurfaceFailed => {
                return Err(KinetypeError::render(
                    "surface failed to finish a frame; scheduler stopped",
                ));
            }
        }
        Ok(true)
    }
}

/// Feed `ticks` synthetic timestamps `k * step_ms` (k = 1..=ticks).
///
/// Starts the scheduler at time 0 if it is not running yet.
pub fn run_synthetic<S: Surface>(
    scheduler: &mut FrameScheduler<S>,
    ticks: u64,
    step_ms: f64,
) -> KinetypeResult<RunSummary> {
    run_synthetic_with(scheduler, ticks, step_ms, |_, _| Ok(()))
}

/// Like [`run_synthetic`], calling `on_paint(frame_index, surface)` after each
/// painted frame. `frame_index` counts painted frames from zero.
pub fn run_synthetic_with<S, F>(
    scheduler: &mut FrameScheduler<S>,
    ticks: u64,
    step_ms: f64,
    mut on_paint: F,
) -> KinetypeResult<RunSummary>
where
    S: Surface,
    F: FnMut(u64, &S) -> KinetypeResult<()>,
{
    if !(step_ms.is_finite() && step_ms > 0.0) {
        return Err(KinetypeError::config(format!(
            "synthetic tick step must be positive, got {step_ms}"
        )));
    }
    if !scheduler.is_running() {
        scheduler.start(0.0);
    }

    let mut summary = RunSummary::default();
    for k in 1..=ticks {
        let outcome = scheduler.tick(k as f64 * step_ms);
        let painted = matches!(outcome, TickOutcome::Painted { .. });
        if !summary.record(outcome)? {
            break;
        }
        if painted {
            on_paint(summary.painted - 1, scheduler.surface())?;
        }
    }
    Ok(summary)
}

/// Drive the scheduler against the wall clock for `duration`, or until it stops.
pub fn run_realtime<S: Surface>(
    scheduler: &mut FrameScheduler<S>,
    duration: Duration,
) -> KinetypeResult<RunSummary> {
    let origin = Instant::now();
    let now_ms = || origin.elapsed().as_secs_f64() * 1000.0;
    if !scheduler.is_running() {
        scheduler.start(now_ms());
    }

    let frame = Duration::from_secs_f64(DISPLAY_REFRESH_MS / 1000.0);
    let mut summary = RunSummary::default();
    while origin.elapsed() < duration {
        std::thread::sleep(frame);
        if !summary.record(scheduler.tick(now_ms()))? {
            break;
        }
    }
    tracing::debug!(
        ticks = summary.ticks,
        painted = summary.painted,
        resets = summary.resets,
        "realtime run finished"
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/driver.rs"]
mod tests;
