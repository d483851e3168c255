use crate::clock::Millis;

/// What a pending timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// End of the foreperiod: show the stimulus.
    Reveal,
    /// End of the response window: the round times out.
    Expire,
    /// End of the feedback pause: start the next round.
    NextRound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    deadline: Millis,
    kind: TimerKind,
}

/// A single cancellable timer. Arming replaces whatever was pending.
#[derive(Debug, Default)]
pub struct TimerSlot {
    pending: Option<Pending>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, deadline: Millis, kind: TimerKind) {
        if let Some(previous) = self.pending.replace(Pending { deadline, kind }) {
            log::trace!("timer {:?} replaced by {:?}", previous.kind, kind);
        }
    }

    /// Cancel whatever is pending. Returns true if something was cancelled.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.pending.map(|p| p.deadline)
    }

    /// Take the pending timer if it is due at `now` (inclusive).
    /// Returns the kind and the scheduled deadline.
    pub fn fire(&mut self, now: Millis) -> Option<(TimerKind, Millis)> {
        match self.pending {
            Some(p) if now >= p.deadline => {
                self.pending = None;
                Some((p.kind, p.deadline))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_at_deadline_inclusive() {
        let mut slot = TimerSlot::new();
        slot.arm(100, TimerKind::Expire);
        assert_eq!(slot.fire(99), None);
        assert_eq!(slot.fire(100), Some((TimerKind::Expire, 100)));
        assert_eq!(slot.fire(200), None);
    }

    #[test]
    fn rearming_replaces_pending() {
        let mut slot = TimerSlot::new();
        slot.arm(100, TimerKind::Reveal);
        slot.arm(300, TimerKind::Expire);
        assert_eq!(slot.fire(150), None);
        assert_eq!(slot.deadline(), Some(300));
        assert_eq!(slot.fire(300), Some((TimerKind::Expire, 300)));
    }

    #[test]
    fn cancel_clears_pending() {
        let mut slot = TimerSlot::new();
        slot.arm(10, TimerKind::NextRound);
        assert!(slot.cancel());
        assert!(!slot.cancel());
        assert_eq!(slot.fire(1_000), None);
        assert_eq!(slot.deadline(), None);
    }
}
