//! Per-player single-flight reopen timers.
//!
//! Each player has at most one armed timer. Arming again replaces the old
//! timer, which then never fires. Timers count down in host ticks and fire
//! once, after which the entry is gone.

use std::collections::HashMap;

use tracing::debug;

struct ArmedReopen<A> {
    remaining_ticks: u64,
    action: A,
}

/// Delayed actions keyed by player name.
pub struct ReopenScheduler<A> {
    armed: HashMap<String, ArmedReopen<A>>,
}

impl<A> Default for ReopenScheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> ReopenScheduler<A> {
    pub fn new() -> Self {
        Self {
            armed: HashMap::new(),
        }
    }

    /// Arm a timer for `user`, cancelling any armed one first.
    ///
    /// Returns the action that was cancelled, if any.
    pub fn arm(&mut self, user: &str, delay_ticks: u64, action: A) -> Option<A> {
        let previous = self.cancel_all(user);
        debug!("Reopen armed for {user} in {delay_ticks} ticks");
        self.armed.insert(
            user.to_string(),
            ArmedReopen {
                remaining_ticks: delay_ticks,
                action,
            },
        );
        previous
    }

    /// Cancel the armed timer for `user`. No-op when idle.
    pub fn cancel_all(&mut self, user: &str) -> Option<A> {
        let cancelled = self.armed.remove(user).map(|a| a.action);
        if cancelled.is_some() {
            debug!("Reopen cancelled for {user}");
        }
        cancelled
    }

    pub fn is_armed(&self, user: &str) -> bool {
        self.armed.contains_key(user)
    }

    pub fn remaining_ticks(&self, user: &str) -> Option<u64> {
        self.armed.get(user).map(|a| a.remaining_ticks)
    }

    /// Number of players with an armed timer.
    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }

    /// Advance one tick. Returns the actions that fired; their entries are
    /// removed.
    pub fn tick(&mut self) -> Vec<(String, A)> {
        let mut due = Vec::new();
        for (user, armed) in &mut self.armed {
            if armed.remaining_ticks > 0 {
                armed.remaining_ticks -= 1;
            }
            if armed.remaining_ticks == 0 {
                due.push(user.clone());
            }
        }

        let mut fired = Vec::with_capacity(due.len());
        for user in due {
            if let Some(armed) = self.armed.remove(&user) {
                debug!("Reopen fired for {user}");
                fired.push((user, armed.action));
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_delay() {
        let mut sched = ReopenScheduler::new();
        sched.arm("Alice", 3, "reopen");

        assert!(sched.tick().is_empty());
        assert!(sched.tick().is_empty());
        assert_eq!(sched.remaining_ticks("Alice"), Some(1));

        let fired = sched.tick();
        assert_eq!(fired, vec![("Alice".to_string(), "reopen")]);
        assert!(!sched.is_armed("Alice"));
        assert!(sched.tick().is_empty());
    }

    #[test]
    fn rearming_replaces_the_first_timer() {
        let mut sched = ReopenScheduler::new();
        assert_eq!(sched.arm("Alice", 2, 1), None);
        assert_eq!(sched.arm("Alice", 5, 2), Some(1));
        assert_eq!(sched.len(), 1);

        let mut fired = Vec::new();
        for tick in 1..=10 {
            for (_, action) in sched.tick() {
                fired.push((tick, action));
            }
        }
        assert_eq!(fired, vec![(5, 2)]);
    }

    #[test]
    fn cancel_is_a_no_op_when_idle() {
        let mut sched: ReopenScheduler<u32> = ReopenScheduler::new();
        assert_eq!(sched.cancel_all("Alice"), None);
        sched.arm("Alice", 1, 7);
        assert_eq!(sched.cancel_all("Alice"), Some(7));
        assert!(sched.tick().is_empty());
        assert!(sched.is_empty());
    }

    #[test]
    fn players_are_independent() {
        let mut sched = ReopenScheduler::new();
        sched.arm("Alice", 1, 'a');
        sched.arm("Bob", 2, 'b');
        sched.cancel_all("Alice");

        assert!(sched.tick().is_empty());
        assert_eq!(sched.tick(), vec![("Bob".to_string(), 'b')]);
    }

    #[test]
    fn zero_delay_fires_on_next_tick() {
        let mut sched = ReopenScheduler::new();
        sched.arm("Alice", 0, ());
        assert_eq!(sched.tick().len(), 1);
    }
}
