use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use crate::{
    animation::animator::PropertyAnimator,
    animation::ease::Ease,
    foundation::error::{KinetypeError, KinetypeResult},
    schedule::queue::{RenderQueue, StepStatus, WeakRenderQueue},
    schedule::scheduler::TickPayload,
    text::style::StylePatch,
    text::text_box::{SharedTextBox, TextBox},
};

fn default_duration() -> f64 {
    PropertyAnimator::DEFAULT_DURATION
}

/// One leg of a chain: ease towards `to` over `duration` seconds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainStage {
    pub to: StylePatch,
    #[serde(default = "default_duration")]
    pub duration: f64,
    #[serde(default)]
    pub ease: Ease,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Repeat {
    #[default]
    Once,
    /// Play the whole chain this many extra times.
    Times(u32),
    Forever,
}

/// Sequential animations on one text box, played through a [`RenderQueue`].
///
/// Each stage's completion callback pushes the next stage, so a stage's origin
/// is captured when it starts, i.e. where the previous stage ended.
pub struct AnimationChain {
    target: SharedTextBox,
    stages: Vec<ChainStage>,
    repeat: Repeat,
    hold: bool,
    on_finish: Option<Box<dyn FnOnce()>>,
}

impl std::fmt::Debug for AnimationChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationChain")
            .field("stages", &self.stages)
            .field("repeat", &self.repeat)
            .field("hold", &self.hold)
            .field("on_finish", &self.on_finish.is_some())
            .finish()
    }
}

struct ChainRun {
    target: Weak<RefCell<TextBox>>,
    queue: WeakRenderQueue,
    stages: Vec<ChainStage>,
    repeat: Repeat,
    plays_left: Cell<u32>,
    hold: bool,
    on_finish: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl AnimationChain {
    pub fn new(target: &SharedTextBox) -> Self {
        Self {
            target: target.clone(),
            stages: Vec::new(),
            repeat: Repeat::Once,
            hold: false,
            on_finish: None,
        }
    }

    pub fn then(mut self, to: StylePatch, duration: f64, ease: Ease) -> Self {
        self.stages.push(ChainStage { to, duration, ease });
        self
    }

    pub fn stage(mut self, stage: ChainStage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// After the last stage, keep painting the box in its final state.
    pub fn hold(mut self, hold: bool) -> Self {
        self.hold = hold;
        self
    }

    pub fn on_finish(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_finish = Some(Box::new(f));
        self
    }

    pub fn stages(&self) -> &[ChainStage] {
        &self.stages
    }

    /// Validate every stage and push the first one into `queue`.
    pub fn start(self, queue: &RenderQueue) -> KinetypeResult<()> {
        if self.stages.is_empty() {
            return Err(KinetypeError::config("animation chain has no stages"));
        }
        for (i, s) in self.stages.iter().enumerate() {
            if !(s.duration.is_finite() && s.duration > 0.0) {
                return Err(KinetypeError::config(format!(
                    "chain stage {i}: duration must be positive, got {}",
                    s.duration
                )));
            }
        }

        let first = PropertyAnimator::with_timing(
            &self.target,
            self.stages[0].to.clone(),
            self.stages[0].duration,
            self.stages[0].ease,
        )?;
        let run = Rc::new(ChainRun {
            target: Rc::downgrade(&self.target),
            queue: queue.downgrade(),
            plays_left: Cell::new(match self.repeat {
                Repeat::Times(n) => n,
                Repeat::Once | Repeat::Forever => 0,
            }),
            stages: self.stages,
            repeat: self.repeat,
            hold: self.hold,
            on_finish: RefCell::new(self.on_finish),
        });
        tracing::debug!(stages = run.stages.len(), repeat = ?run.repeat, "animation chain started");
        push_animator(&run, queue, first, 0);
        Ok(())
    }
}

fn push_animator(run: &Rc<ChainRun>, queue: &RenderQueue, anim: PropertyAnimator, index: usize) {
    let next = run.clone();
    queue.push_boxed(anim.into_step(), Box::new(move || advance(&next, index + 1)));
}

fn advance(run: &Rc<ChainRun>, next: usize) {
    let Some(queue) = run.queue.upgrade() else {
        return;
    };

    let next = if next < run.stages.len() {
        next
    } else {
        match run.repeat {
            Repeat::Forever => 0,
            Repeat::Times(_) if run.plays_left.get() > 0 => {
                run.plays_left.set(run.plays_left.get() - 1);
                0
            }
            _ => {
                finish(run, &queue);
                return;
            }
        }
    };

    let Some(target) = run.target.upgrade() else {
        return;
    };
    let stage = &run.stages[next];
    match PropertyAnimator::with_timing(&target, stage.to.clone(), stage.duration, stage.ease) {
        Ok(anim) => push_animator(run, &queue, anim, next),
        Err(err) => tracing::error!(stage = next, error = %err, "chain stage rejected"),
    }
}

fn finish(run: &ChainRun, queue: &RenderQueue) {
    let on_finish = run.on_finish.borrow_mut().take();
    if let Some(f) = on_finish {
        f();
    }
    if run.hold {
        let target = run.target.clone();
        queue.push(move |payload: &mut TickPayload<'_>| match target.upgrade() {
            Some(b) => {
                b.borrow_mut().paint(&mut *payload.surface)?;
                Ok(StepStatus::Running)
            }
            None => Ok(StepStatus::Finished),
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/chain.rs"]
mod tests;
