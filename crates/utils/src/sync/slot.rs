//! Single-holder slot with a bounded polling wait
//!
//! Unlike a mutex, a waiter never blocks past its poll ceiling: once the
//! attempts run out it is told so via [`Acquisition::FailOpen`] and decides
//! for itself whether to proceed without exclusivity.

use exambox_core::{DEFAULT_MAX_WAIT_ATTEMPTS, DEFAULT_POLL_INTERVAL};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// How often and how many times to poll a busy slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between two polls
    pub interval: Duration,
    /// Number of sleeps before giving up
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_WAIT_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Longest time a waiter can spend polling
    pub fn ceiling(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

/// Process-wide "in progress since T" flag
#[derive(Debug, Default)]
pub struct ExclusiveSlot {
    held_since: Mutex<Option<Instant>>,
}

/// Outcome of a bounded acquisition
#[derive(Debug)]
pub enum Acquisition<'a> {
    /// The caller owns the slot until the guard drops
    Held(SlotGuard<'a>),
    /// The ceiling was reached while another holder kept the slot
    FailOpen {
        attempts: u32,
        held_since: Option<Instant>,
    },
}

impl Acquisition<'_> {
    pub fn is_held(&self) -> bool {
        matches!(self, Acquisition::Held(_))
    }
}

/// Releases the slot on drop, including on error paths and unwinding
#[derive(Debug)]
pub struct SlotGuard<'a> {
    slot: &'a ExclusiveSlot,
    acquired_at: Instant,
}

impl SlotGuard<'_> {
    pub fn acquired_at(&self) -> Instant {
        self.acquired_at
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        *self.slot.held_since.lock() = None;
    }
}

impl ExclusiveSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the slot if it is free, without waiting
    pub fn try_acquire(&self) -> Option<SlotGuard<'_>> {
        let mut held_since = self.held_since.lock();
        if held_since.is_some() {
            return None;
        }

        let now = Instant::now();
        *held_since = Some(now);
        Some(SlotGuard {
            slot: self,
            acquired_at: now,
        })
    }

    /// Poll the slot until it frees up or the policy's attempts are spent
    pub fn acquire_bounded(&self, policy: PollPolicy) -> Acquisition<'_> {
        let mut attempts = 0;
        loop {
            if let Some(guard) = self.try_acquire() {
                return Acquisition::Held(guard);
            }

            if attempts >= policy.max_attempts {
                return Acquisition::FailOpen {
                    attempts,
                    held_since: self.held_since(),
                };
            }

            std::thread::sleep(policy.interval);
            attempts += 1;
            tracing::debug!(
                attempt = attempts,
                max_attempts = policy.max_attempts,
                "waiting for exclusive slot to be released"
            );
        }
    }

    /// When the current holder acquired the slot, if held
    pub fn held_since(&self) -> Option<Instant> {
        *self.held_since.lock()
    }

    pub fn is_held(&self) -> bool {
        self.held_since.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    fn fast_policy(max_attempts: u32) -> PollPolicy {
        PollPolicy::new(Duration::from_millis(1), max_attempts)
    }

    #[test]
    fn test_slot_exclusive() {
        let slot = ExclusiveSlot::new();

        let guard = slot.try_acquire().expect("free slot should be acquired");
        assert!(slot.is_held());
        assert!(slot.try_acquire().is_none());

        drop(guard);
        assert!(!slot.is_held());
        assert!(slot.try_acquire().is_some());
    }

    #[test]
    fn test_held_since_matches_guard() {
        let slot = ExclusiveSlot::new();
        let guard = slot.try_acquire().unwrap();
        assert_eq!(slot.held_since(), Some(guard.acquired_at()));
    }

    #[test]
    fn test_bounded_acquire_on_free_slot_does_not_wait() {
        let slot = ExclusiveSlot::new();
        let start = Instant::now();
        let acquisition = slot.acquire_bounded(PollPolicy::new(Duration::from_secs(10), 5));
        assert!(acquisition.is_held());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_bounded_acquire_fails_open_after_ceiling() {
        let slot = ExclusiveSlot::new();
        let holder = slot.try_acquire().unwrap();

        match slot.acquire_bounded(fast_policy(3)) {
            Acquisition::FailOpen {
                attempts,
                held_since,
            } => {
                assert_eq!(attempts, 3);
                assert_eq!(held_since, Some(holder.acquired_at()));
            }
            Acquisition::Held(_) => panic!("slot was held by another guard"),
        }

        // Failing open never steals the holder's slot
        assert!(slot.is_held());
        drop(holder);
        assert!(!slot.is_held());
    }

    #[test]
    fn test_zero_attempts_fails_open_immediately() {
        let slot = ExclusiveSlot::new();
        let _holder = slot.try_acquire().unwrap();
        let acquisition = slot.acquire_bounded(PollPolicy::new(Duration::from_secs(10), 0));
        assert!(!acquisition.is_held());
    }

    #[test]
    fn test_waiter_acquires_after_release() {
        let slot = Arc::new(ExclusiveSlot::new());
        let released = Arc::new(AtomicBool::new(false));

        let guard = slot.try_acquire().unwrap();
        let waiter = {
            let slot = Arc::clone(&slot);
            let released = Arc::clone(&released);
            std::thread::spawn(move || {
                let acquisition = slot.acquire_bounded(fast_policy(5_000));
                assert!(released.load(Ordering::SeqCst));
                acquisition.is_held()
            })
        };

        std::thread::sleep(Duration::from_millis(20));
        released.store(true, Ordering::SeqCst);
        drop(guard);

        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_guard_released_on_panic() {
        let slot = Arc::new(ExclusiveSlot::new());
        let slot_clone = Arc::clone(&slot);
        let result = std::thread::spawn(move || {
            let _guard = slot_clone.try_acquire().unwrap();
            panic!("holder panicked");
        })
        .join();

        assert!(result.is_err());
        assert!(!slot.is_held());
    }

    #[test]
    fn test_concurrent_holders_never_overlap() {
        let slot = Arc::new(ExclusiveSlot::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let slot = Arc::clone(&slot);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                std::thread::spawn(move || {
                    if let Acquisition::Held(_guard) = slot.acquire_bounded(fast_policy(10_000)) {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(2));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_policy_ceiling() {
        assert_eq!(PollPolicy::default().ceiling(), Duration::from_secs(120));
    }
}
