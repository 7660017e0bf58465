//! Tick gate - fixed-cadence evaluation points
//!
//! The gate fires at most once per poll. When the host stalls for several
//! intervals the missed ticks collapse into a single tick and the cadence
//! restarts from the current time.

use std::time::Duration;

use studylens_core::Timestamp;

/// Default cadence of status evaluation
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Decides when a tick is due
#[derive(Clone, Debug)]
pub struct TickGate {
    interval: Duration,
    next_due: Option<Timestamp>,
    fired: u64,
    collapsed: u64,
}

impl TickGate {
    pub fn new(interval: Duration) -> Self {
        TickGate {
            interval,
            next_due: None,
            fired: 0,
            collapsed: 0,
        }
    }

    /// Arm the gate; the first tick is due one interval after `now`
    pub fn arm(&mut self, now: Timestamp) {
        self.next_due = Some(now + self.interval);
    }

    /// Disarm the gate; polls return None until re-armed
    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns `Some(now)` if a tick is due
    pub fn poll(&mut self, now: Timestamp) -> Option<Timestamp> {
        let due = self.next_due?;
        if now < due {
            return None;
        }

        let interval_ms = self.interval.as_millis().max(1) as i64;
        let missed = now.millis_since(due) / interval_ms;
        self.collapsed += missed as u64;

        // No backfill: next tick is one interval after this one
        let next = if missed == 0 { due + self.interval } else { now + self.interval };
        self.next_due = Some(next);
        self.fired += 1;
        Some(now)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Ticks fired so far
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Ticks skipped because the host polled late
    pub fn collapsed(&self) -> u64 {
        self.collapsed
    }
}

impl Default for TickGate {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unarmed_gate_never_fires() {
        let mut gate = TickGate::default();
        assert_eq!(gate.poll(Timestamp::from_millis(10_000)), None);
    }

    #[test]
    fn test_fires_on_cadence() {
        let mut gate = TickGate::default();
        gate.arm(Timestamp::ZERO);

        assert_eq!(gate.poll(Timestamp::from_millis(999)), None);
        assert_eq!(
            gate.poll(Timestamp::from_millis(1_000)),
            Some(Timestamp::from_millis(1_000))
        );
        assert_eq!(gate.poll(Timestamp::from_millis(1_500)), None);
        assert!(gate.poll(Timestamp::from_millis(2_000)).is_some());
        assert_eq!(gate.fired(), 2);
    }

    #[test]
    fn test_missed_ticks_collapse() {
        let mut gate = TickGate::default();
        gate.arm(Timestamp::ZERO);

        // Host stalled for five intervals
        assert!(gate.poll(Timestamp::from_millis(5_200)).is_some());
        assert_eq!(gate.poll(Timestamp::from_millis(5_300)), None);
        assert_eq!(gate.fired(), 1);
        assert_eq!(gate.collapsed(), 4);

        // Cadence restarts from the late tick
        assert_eq!(gate.poll(Timestamp::from_millis(6_100)), None);
        assert!(gate.poll(Timestamp::from_millis(6_200)).is_some());
    }

    #[test]
    fn test_disarm() {
        let mut gate = TickGate::default();
        gate.arm(Timestamp::ZERO);
        gate.disarm();

        assert!(!gate.is_armed());
        assert_eq!(gate.poll(Timestamp::from_millis(3_000)), None);
    }

    proptest! {
        #[test]
        fn prop_never_fires_ahead_of_cadence(polls in proptest::collection::vec(0i64..20_000, 1..50)) {
            let mut sorted = polls.clone();
            sorted.sort_unstable();

            let mut gate = TickGate::default();
            gate.arm(Timestamp::ZERO);

            for t in sorted {
                gate.poll(Timestamp::from_millis(t));
                prop_assert!(gate.fired() as i64 <= t / 1_000);
            }
        }
    }
}
