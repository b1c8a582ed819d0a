//! Deferred state transitions
//!
//! Reloads and respawns complete some time after the event that caused them.
//! They are stored here as plain data keyed by connection id and handed back
//! to the game state once due. Timers belong to the player that scheduled
//! them: releasing or replacing that player cancels them, and the game state
//! looks the connection up again before applying anything.

use shared::WeaponId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Reload { client_id: u32, weapon: WeaponId },
    Respawn { client_id: u32 },
}

impl TimerEvent {
    pub fn client_id(&self) -> u32 {
        match self {
            TimerEvent::Reload { client_id, .. } | TimerEvent::Respawn { client_id } => *client_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    due_at: u64,
    event: TimerEvent,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_at: u64, event: TimerEvent) {
        self.pending.push(Scheduled { due_at, event });
    }

    /// Removes and returns every event due at or before `now`, earliest first
    pub fn take_due(&mut self, now: u64) -> Vec<TimerEvent> {
        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|scheduled| {
            if scheduled.due_at <= now {
                due.push(*scheduled);
                false
            } else {
                true
            }
        });

        // Stable sort keeps scheduling order for equal deadlines
        due.sort_by_key(|scheduled| scheduled.due_at);
        due.into_iter().map(|scheduled| scheduled.event).collect()
    }

    /// Drops every pending event of `client_id`. Returns how many were dropped.
    pub fn cancel(&mut self, client_id: u32) -> usize {
        let before = self.pending.len();
        self.pending
            .retain(|scheduled| scheduled.event.client_id() != client_id);
        before - self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
