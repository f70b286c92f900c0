//! Single-slot cancellable deferred transition.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::policy::DeferredEffect;

/// Generation id of a scheduled action. Ids are never reused within a
/// slot, so a stale id can always be told apart from the armed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(u64);

impl ActionId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// A transition waiting for its delay to elapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledAction {
    pub id: ActionId,
    pub delay: Duration,
    pub effect: DeferredEffect,
}

/// Holds at most one scheduled action.
#[derive(Debug, Default)]
pub struct DeferredSlot {
    generation: u64,
    armed: Option<ScheduledAction>,
}

impl DeferredSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `effect`, replacing whatever was armed.
    pub fn arm(&mut self, delay: Duration, effect: DeferredEffect) -> ScheduledAction {
        self.generation += 1;
        let action = ScheduledAction {
            id: ActionId(self.generation),
            delay,
            effect,
        };
        self.armed = Some(action.clone());
        action
    }

    /// Drop the armed action. Returns whether one was armed.
    pub fn cancel(&mut self) -> bool {
        self.armed.take().is_some()
    }

    /// Disarm and return the effect if `id` is the armed action.
    pub fn take_if_current(&mut self, id: ActionId) -> Option<DeferredEffect> {
        match &self.armed {
            Some(action) if action.id == id => self.armed.take().map(|a| a.effect),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&ScheduledAction> {
        self.armed.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Direction;

    #[test]
    fn arm_replaces_previous_action() {
        let mut slot = DeferredSlot::new();
        let first = slot.arm(Duration::from_millis(1500), DeferredEffect::ScaleTo(2));
        let second = slot.arm(Duration::from_millis(1500), DeferredEffect::ScaleTo(4));

        assert_ne!(first.id, second.id);
        assert_eq!(slot.take_if_current(first.id), None);
        assert_eq!(slot.take_if_current(second.id), Some(DeferredEffect::ScaleTo(4)));
        assert!(slot.pending().is_none());
    }

    #[test]
    fn cancel_invalidates_armed_id() {
        let mut slot = DeferredSlot::new();
        let action = slot.arm(Duration::from_secs(1), DeferredEffect::Step(Direction::Up));

        assert!(slot.cancel());
        assert!(!slot.cancel());
        assert_eq!(slot.take_if_current(action.id), None);
    }

    #[test]
    fn ids_are_not_reused_after_cancel() {
        let mut slot = DeferredSlot::new();
        let a = slot.arm(Duration::from_secs(1), DeferredEffect::ScaleTo(1));
        slot.cancel();
        let b = slot.arm(Duration::from_secs(1), DeferredEffect::ScaleTo(1));

        assert!(b.id.get() > a.id.get());
        assert_eq!(slot.take_if_current(a.id), None);
    }

    #[test]
    fn completed_action_cannot_fire_twice() {
        let mut slot = DeferredSlot::new();
        let action = slot.arm(Duration::from_secs(1), DeferredEffect::ScaleTo(3));

        assert!(slot.take_if_current(action.id).is_some());
        assert!(slot.take_if_current(action.id).is_none());
    }
}
