use std::time::Duration;

use blockfield_common::{BlockPos, BlockType, VisualHandle};

use crate::scene::Scene;
use crate::scheduler::{Scheduler, TimerId, TimerKind};

/// What a decay/growth check did to the block's pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Scheduled(TimerId),
    Cancelled(TimerId),
    /// The condition matches the current pending state; nothing to do.
    Unchanged,
    /// The check does not apply to this block type (or there is no block).
    NotApplicable,
}

/// One placed voxel.
///
/// The position never changes after creation. A block owns its visual and at
/// most one pending timer: a decay timer while it is grass, a growth timer
/// while it is dirt.
#[derive(Debug)]
pub struct Block {
    block_type: BlockType,
    position: BlockPos,
    decay_timer: Option<TimerId>,
    growth_timer: Option<TimerId>,
    visual: VisualHandle,
}

impl Block {
    pub(crate) fn new(block_type: BlockType, position: BlockPos, visual: VisualHandle) -> Self {
        Self {
            block_type,
            position,
            decay_timer: None,
            growth_timer: None,
            visual,
        }
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn position(&self) -> BlockPos {
        self.position
    }

    pub fn visual(&self) -> VisualHandle {
        self.visual
    }

    pub fn decay_timer(&self) -> Option<TimerId> {
        self.decay_timer
    }

    pub fn growth_timer(&self) -> Option<TimerId> {
        self.growth_timer
    }

    /// The pending timer, if any, with its kind.
    pub fn pending_timer(&self) -> Option<(TimerKind, TimerId)> {
        self.decay_timer
            .map(|id| (TimerKind::Decay, id))
            .or(self.growth_timer.map(|id| (TimerKind::Growth, id)))
    }

    /// Grass decay: keep a decay timer pending exactly while the slot above is
    /// occupied. No-op for anything but grass.
    pub fn check_decay(
        &mut self,
        covered: bool,
        scheduler: &mut Scheduler,
        delay: Duration,
    ) -> CheckOutcome {
        if self.block_type != BlockType::Grass {
            return CheckOutcome::NotApplicable;
        }
        sync_timer(
            &mut self.decay_timer,
            covered,
            scheduler,
            delay,
            TimerKind::Decay,
            self.position,
        )
    }

    /// Dirt growth: keep a growth timer pending exactly while the slot above
    /// is empty. No-op for anything but dirt.
    pub fn check_growth(
        &mut self,
        covered: bool,
        scheduler: &mut Scheduler,
        delay: Duration,
    ) -> CheckOutcome {
        if self.block_type != BlockType::Dirt {
            return CheckOutcome::NotApplicable;
        }
        sync_timer(
            &mut self.growth_timer,
            !covered,
            scheduler,
            delay,
            TimerKind::Growth,
            self.position,
        )
    }

    /// Forget a timer that has just fired. Returns false if `id` is not the
    /// timer this block is waiting on.
    pub(crate) fn clear_fired(&mut self, kind: TimerKind, id: TimerId) -> bool {
        let slot = match kind {
            TimerKind::Decay => &mut self.decay_timer,
            TimerKind::Growth => &mut self.growth_timer,
        };
        if *slot == Some(id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// Cancel any pending timer and release the visual. Consumes the block so
    /// nothing can reschedule against it afterwards.
    pub fn dispose<S: Scene + ?Sized>(self, scheduler: &mut Scheduler, scene: &mut S) {
        for id in [self.decay_timer, self.growth_timer].into_iter().flatten() {
            scheduler.cancel(id);
        }
        scene.destroy_visual(self.visual);
    }
}

fn sync_timer(
    slot: &mut Option<TimerId>,
    wanted: bool,
    scheduler: &mut Scheduler,
    delay: Duration,
    kind: TimerKind,
    position: BlockPos,
) -> CheckOutcome {
    match (wanted, *slot) {
        (true, None) => {
            let id = scheduler.schedule(delay, kind, position);
            *slot = Some(id);
            CheckOutcome::Scheduled(id)
        }
        (false, Some(id)) => {
            scheduler.cancel(id);
            *slot = None;
            CheckOutcome::Cancelled(id)
        }
        _ => CheckOutcome::Unchanged,
    }
}
