use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::{
    animation::ease::Ease,
    animation::lerp::Lerp,
    foundation::error::{KinetypeError, KinetypeResult},
    schedule::queue::{RenderStep, StepStatus},
    schedule::scheduler::TickPayload,
    text::style::StylePatch,
    text::text_box::{SharedTextBox, TextBox},
};

const FINISH_EPSILON: f64 = 1e-9;

/// Eases a text box's style from its current values towards `to`.
///
/// The origin is a value snapshot taken at construction, restricted to the
/// fields `to` sets. Numeric, point and color fields are eased every tick;
/// alignment and the outline flag switch when the animation completes.
#[derive(Debug)]
pub struct PropertyAnimator {
    target: Weak<RefCell<TextBox>>,
    from: StylePatch,
    to: StylePatch,
    duration: f64,
    elapsed: f64,
    ease: Ease,
    paint_target: bool,
    finished: bool,
}

impl PropertyAnimator {
    pub const DEFAULT_DURATION: f64 = 1.5;

    pub fn new(target: &SharedTextBox, to: StylePatch) -> KinetypeResult<Self> {
        Self::with_timing(target, to, Self::DEFAULT_DURATION, Ease::default())
    }

    pub fn with_timing(
        target: &SharedTextBox,
        to: StylePatch,
        duration: f64,
        ease: Ease,
    ) -> KinetypeResult<Self> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(KinetypeError::config(format!(
                "animation duration must be positive, got {duration}"
            )));
        }
        let from = to.snapshot_of(target.borrow().style());
        Ok(Self {
            target: Rc::downgrade(target),
            from,
            to,
            duration,
            elapsed: 0.0,
            ease,
            paint_target: true,
            finished: false,
        })
    }

    /// Leave painting to another renderer; the animator only mutates the style.
    pub fn without_paint(mut self) -> Self {
        self.paint_target = false;
        self
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn ease(&self) -> Ease {
        self.ease
    }

    pub fn origin(&self) -> &StylePatch {
        &self.from
    }

    pub fn destination(&self) -> &StylePatch {
        &self.to
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Eased values at `elapsed` seconds. Discrete fields keep their origin value.
    pub fn sample(&self, elapsed: f64) -> StylePatch {
        fn eased<T: Lerp>(
            ease: Ease,
            elapsed: f64,
            from: Option<T>,
            to: Option<T>,
            duration: f64,
        ) -> Option<T> {
            match (from, to) {
                (Some(a), Some(b)) => Some(T::eased(ease, elapsed, a, b, duration)),
                _ => to,
            }
        }

        let (e, t, d) = (self.ease, elapsed, self.duration);
        let (from, to) = (&self.from, &self.to);
        StylePatch {
            font_size: eased(e, t, from.font_size, to.font_size, d),
            line_height: eased(e, t, from.line_height, to.line_height, d),
            origin: eased(e, t, from.origin, to.origin, d),
            width: eased(e, t, from.width, to.width, d),
            height: eased(e, t, from.height, to.height, d),
            background: eased(e, t, from.background, to.background, d),
            foreground: eased(e, t, from.foreground, to.foreground, d),
            h_align: from.h_align,
            v_align: from.v_align,
            outline: from.outline,
        }
    }

    /// Advance by the payload's delta and apply the new values to the target.
    ///
    /// Reports [`StepStatus::Finished`] exactly once, on the tick that reaches
    /// the duration, after applying the destination values verbatim.
    pub fn step(&mut self, payload: &mut TickPayload<'_>) -> KinetypeResult<StepStatus> {
        if self.finished {
            return Err(KinetypeError::animation(
                "animator stepped after it finished",
            ));
        }
        let Some(target) = self.target.upgrade() else {
            tracing::debug!("animation target dropped; finishing early");
            self.finished = true;
            return Ok(StepStatus::Finished);
        };

        self.elapsed += payload.delta.max(0.0);
        let done = self.elapsed >= self.duration - FINISH_EPSILON;
        let patch = if done {
            self.to.clone()
        } else {
            self.sample(self.elapsed)
        };

        let mut text_box = target.borrow_mut();
        text_box.apply(&patch)?;
        if self.paint_target {
            text_box.paint(&mut *payload.surface)?;
        }

        if done {
            self.finished = true;
            Ok(StepStatus::Finished)
        } else {
            Ok(StepStatus::Running)
        }
    }

    pub fn into_step(mut self) -> RenderStep {
        Box::new(move |payload| self.step(payload))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/animator.rs"]
mod tests;
