use std::{
    cell::RefCell,
    collections::VecDeque,
    rc::{Rc, Weak},
};

use crate::{foundation::error::KinetypeResult, schedule::scheduler::TickPayload};

/// Continuation flag returned by a render step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    Running,
    Finished,
}

impl From<bool> for StepStatus {
    /// `true` keeps the step running.
    fn from(running: bool) -> Self {
        if running {
            Self::Running
        } else {
            Self::Finished
        }
    }
}

pub type RenderStep = Box<dyn FnMut(&mut TickPayload<'_>) -> KinetypeResult<StepStatus>>;
pub type OnDone = Box<dyn FnOnce()>;

struct Packet {
    step: RenderStep,
    on_done: OnDone,
}

/// Ordered list of render steps, each paired with a completion callback.
///
/// Cloning yields another handle to the same packets, which is how completion
/// callbacks push the next stage of a chain.
#[derive(Clone, Default)]
pub struct RenderQueue {
    packets: Rc<RefCell<VecDeque<Packet>>>,
}

/// Non-owning handle, for callbacks stored inside the queue itself.
#[derive(Clone, Default)]
pub struct WeakRenderQueue {
    packets: Weak<RefCell<VecDeque<Packet>>>,
}

impl std::fmt::Debug for RenderQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderQueue")
            .field("len", &self.len())
            .finish()
    }
}

impl std::fmt::Debug for WeakRenderQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakRenderQueue")
            .field("alive", &(self.packets.strong_count() > 0))
            .finish()
    }
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<F>(&self, step: F)
    where
        F: FnMut(&mut TickPayload<'_>) -> KinetypeResult<StepStatus> + 'static,
    {
        self.push_boxed(Box::new(step), Box::new(|| {}));
    }

    pub fn push_with<F, D>(&self, step: F, on_done: D)
    where
        F: FnMut(&mut TickPayload<'_>) -> KinetypeResult<StepStatus> + 'static,
        D: FnOnce() + 'static,
    {
        self.push_boxed(Box::new(step), Box::new(on_done));
    }

    pub fn push_boxed(&self, step: RenderStep, on_done: OnDone) {
        self.packets
            .borrow_mut()
            .push_back(Packet { step, on_done });
    }

    pub fn len(&self) -> usize {
        self.packets.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.borrow().is_empty()
    }

    pub fn downgrade(&self) -> WeakRenderQueue {
        WeakRenderQueue {
            packets: Rc::downgrade(&self.packets),
        }
    }

    /// Run every packet present at the start of the call once, in push order.
    ///
    /// Finished packets are dropped after their completion callback runs.
    /// Packets pushed while rendering wait for the next call and stay behind the
    /// survivors of this one. If a step fails, the failing packet is dropped
    /// without its callback and the unvisited packets are kept.
    pub fn render(&self, payload: &mut TickPayload<'_>) -> KinetypeResult<()> {
        let mut pending = std::mem::take(&mut *self.packets.borrow_mut());
        let mut survivors = VecDeque::with_capacity(pending.len());

        let mut result = Ok(());
        while let Some(mut packet) = pending.pop_front() {
            match (packet.step)(payload) {
                Ok(StepStatus::Running) => survivors.push_back(packet),
                Ok(StepStatus::Finished) => (packet.on_done)(),
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }

        survivors.append(&mut pending);
        let mut packets = self.packets.borrow_mut();
        survivors.append(&mut packets);
        *packets = survivors;
        result
    }
}

impl WeakRenderQueue {
    pub fn upgrade(&self) -> Option<RenderQueue> {
        self.packets.upgrade().map(|packets| RenderQueue { packets })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/queue.rs"]
mod tests;
