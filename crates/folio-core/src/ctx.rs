#![forbid(unsafe_code)]

//! Per-callback context handed to timer-driven controllers.

use core::time::Duration;

use crate::effect::Effect;
use crate::timer::{TimerKey, TimerQueue};

/// Current time, the shared timer queue and the effect buffer.
///
/// One `Ctx` lives for exactly one event or timer callback, so everything
/// a controller does through it is sequential with respect to other
/// callbacks.
#[derive(Debug)]
pub struct Ctx<'a> {
    pub now: Duration,
    pub timers: &'a mut TimerQueue<TimerKey>,
    pub effects: &'a mut Vec<Effect>,
}

impl<'a> Ctx<'a> {
    pub fn new(
        now: Duration,
        timers: &'a mut TimerQueue<TimerKey>,
        effects: &'a mut Vec<Effect>,
    ) -> Self {
        Self {
            now,
            timers,
            effects,
        }
    }

    #[inline]
    pub fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    #[inline]
    pub fn arm(&mut self, key: TimerKey, delay: Duration) {
        self.timers.arm(key, self.now, delay);
    }

    #[inline]
    pub fn arm_repeating(&mut self, key: TimerKey, period: Duration) {
        self.timers.arm_repeating(key, self.now, period);
    }

    #[inline]
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        self.timers.cancel(key)
    }
}
