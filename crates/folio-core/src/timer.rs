#![forbid(unsafe_code)]

//! Host-driven timers.
//!
//! Controllers never sleep. Every delay is an entry in a [`TimerQueue`];
//! the host asks for [`TimerQueue::next_deadline`], waits that long with
//! whatever primitive it has (`setTimeout` in the browser, nothing at all in
//! tests), then pops due keys with [`TimerQueue::pop_due`].
//!
//! # Invariants
//!
//! - **One entry per key**: arming a key that is already pending replaces
//!   its deadline, so a debounce re-armed on every event keeps only the
//!   latest one.
//! - **Ordered firing**: due entries pop in deadline order; ties pop in the
//!   order they were armed.
//! - **Drift-free repeats**: a repeating entry re-arms relative to its
//!   scheduled deadline, not to the time it was popped.
//! - **No catch-up**: periods missed while the host was stalled are
//!   skipped; a late pop fires once and the next deadline lies after `now`.
//! - **Idempotent cancel**: cancelling an absent key is a no-op.

use core::fmt;
use core::time::Duration;

/// Every timer the page can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Debounced resize handling.
    ResizeDebounce,
    /// Re-opens the scroll animation-frame gate.
    ScrollGate,
    /// Carousel stability poll.
    CarouselWatchdog,
    /// Carousel grace period before autoplay resumes.
    CarouselGrace,
    /// Repeating promo schedule.
    PromoInterval,
    /// Auto-dismiss of a visible promo.
    PromoAutoDismiss,
    /// Visual-feedback delay between a promo click and opening its link.
    PromoOpenLink,
    /// End of the promo fade-out transition.
    PromoFadeOut,
}

/// Smallest period a repeating timer may have.
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
struct TimerEntry<K> {
    key: K,
    deadline: Duration,
    period: Option<Duration>,
    seq: u64,
}

/// Cancellable one-shot and repeating timers keyed by `K`.
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    entries: Vec<TimerEntry<K>>,
    seq: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            seq: 0,
        }
    }
}

impl<K: Copy + Eq + fmt::Debug> TimerQueue<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a one-shot timer firing `delay` after `now`, replacing any
    /// pending entry for `key`.
    pub fn arm(&mut self, key: K, now: Duration, delay: Duration) {
        self.insert(key, now.saturating_add(delay), None);
    }

    /// Arm a repeating timer whose first firing is `period` after `now`.
    pub fn arm_repeating(&mut self, key: K, now: Duration, period: Duration) {
        let period = period.max(MIN_PERIOD);
        self.insert(key, now.saturating_add(period), Some(period));
    }

    /// Cancel `key`. Returns whether anything was pending.
    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.key != key);
        before != self.entries.len()
    }

    #[must_use]
    pub fn is_armed(&self, key: K) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    #[must_use]
    pub fn deadline(&self, key: K) -> Option<Duration> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.deadline)
    }

    /// Earliest pending deadline, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|entry| entry.deadline).min()
    }

    /// Pop the earliest entry due at `now`.
    ///
    /// Repeating entries are re-armed on their period grid at the first
    /// deadline after `now` before being returned.
    pub fn pop_due(&mut self, now: Duration) -> Option<K> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.deadline <= now)
            .min_by_key(|(_, entry)| (entry.deadline, entry.seq))
            .map(|(idx, _)| idx)?;

        let entry = self.entries.swap_remove(idx);
        if let Some(period) = entry.period {
            let next = next_on_grid(entry.deadline, period, now);
            self.insert(entry.key, next, Some(period));
        }
        Some(entry.key)
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: K, deadline: Duration, period: Option<Duration>) {
        self.entries.retain(|entry| entry.key != key);
        self.seq += 1;
        self.entries.push(TimerEntry {
            key,
            deadline,
            period,
            seq: self.seq,
        });
    }
}

/// First `deadline + k * period` (k >= 1) strictly after `now`.
fn next_on_grid(deadline: Duration, period: Duration, now: Duration) -> Duration {
    let period_ns = period.as_nanos().max(1);
    let missed = now.saturating_sub(deadline).as_nanos() / period_ns;
    let step = period_ns.saturating_mul(missed + 1);
    deadline.saturating_add(Duration::from_nanos(u64::try_from(step).unwrap_or(u64::MAX)))
}

// ---------------------------------------------------------------------------
// Animation-frame gate
// ---------------------------------------------------------------------------

/// Rate limiter for scroll-driven animation frames.
///
/// The first scroll event closes the gate and requests a frame; further
/// scroll events only record the latest offset until the reopen timer
/// fires.
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    closed: bool,
}

impl FrameGate {
    /// Try to pass the gate. Returns `true` if the caller should request a
    /// frame (and arm the reopen timer).
    pub fn try_pass(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        true
    }

    pub fn reopen(&mut self) {
        self.closed = false;
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
