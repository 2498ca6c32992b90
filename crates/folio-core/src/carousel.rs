#![forbid(unsafe_code)]

//! Auto-scrolling image carousel with manual override.
//!
//! Autoplay is a CSS animation on the track; the controller only pauses it
//! (the `paused` class) while the user drives the container, and resumes it
//! once the scroll offset has stopped changing.
//!
//! ```text
//!            input                 watchdog: offset unchanged
//! Autoplay ─────────▶ UserScrolling ─────────────────────────▶ Settling
//!    ▲                    ▲                                      │  │
//!    │                    └────────────── input ─────────────────┘  │
//!    └──────────────────────────── grace expired ───────────────────┘
//! ```
//!
//! # Invariants
//!
//! - `paused` is present on the track whenever the phase is not Autoplay.
//! - Autoplay resumes no sooner than one poll plus one grace period after
//!   the last input, and no sooner than one grace period after the offset
//!   last changed.
//! - The container offset never stays at or beyond one image-set width:
//!   crossing it wraps back by exactly one set.

use crate::config::CarouselConfig;
use crate::ctx::Ctx;
use crate::effect::{Effect, Target};
use crate::error::FolioError;
use crate::event::{CarouselMetrics, Dispatch, Key};
use crate::layout::PageLayout;
use crate::timer::TimerKey;

pub const PAUSED_CLASS: &str = "paused";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselPhase {
    /// CSS animation running.
    Autoplay,
    /// Paused; the watchdog samples the offset every poll.
    UserScrolling,
    /// Offset stable; waiting out the grace period.
    Settling,
}

#[derive(Debug, Clone)]
pub struct Carousel {
    config: CarouselConfig,
    phase: CarouselPhase,
    offset: f64,
    last_sample: f64,
}

impl Carousel {
    pub fn attach(
        layout: &PageLayout,
        config: &CarouselConfig,
        effects: &mut Vec<Effect>,
    ) -> Result<Self, FolioError> {
        if !layout.carousel {
            return Err(FolioError::MissingElement(".scrolling-container"));
        }
        if !layout.carousel_track {
            return Err(FolioError::MissingElement(".scrolling-images"));
        }
        effects.push(Effect::remove_class(Target::CarouselTrack, PAUSED_CLASS));
        effects.push(Effect::attribute(Target::Carousel, "tabindex", "0"));
        Ok(Self {
            config: config.clone(),
            phase: CarouselPhase::Autoplay,
            offset: 0.0,
            last_sample: 0.0,
        })
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> CarouselPhase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    // -- inputs ---------------------------------------------------------------

    /// Container scrolled to `offset`.
    pub fn on_scroll(&mut self, offset: f64, metrics: Option<CarouselMetrics>, ctx: &mut Ctx<'_>) {
        self.offset = match metrics.and_then(|m| m.set_width()) {
            Some(set) if offset >= set => {
                ctx.emit(Effect::SetScrollLeft {
                    target: Target::Carousel,
                    offset: offset - set,
                });
                offset - set
            }
            _ => offset,
        };
        if self.phase != CarouselPhase::UserScrolling {
            self.pause(ctx);
        }
    }

    /// Touch start or move on the container.
    pub fn on_touch(&mut self, ctx: &mut Ctx<'_>) {
        self.pause(ctx);
    }

    /// Vertical wheel motion is redirected into horizontal scrolling.
    pub fn on_wheel(&mut self, delta_y: f64, ctx: &mut Ctx<'_>) -> Dispatch {
        if delta_y == 0.0 || delta_y.is_nan() {
            return Dispatch::PASS;
        }
        ctx.emit(Effect::ScrollBy {
            target: Target::Carousel,
            dx: delta_y,
        });
        self.pause(ctx);
        Dispatch::CONSUMED
    }

    /// Arrow keys pressed while the container has focus.
    pub fn on_key(&mut self, key: Key, ctx: &mut Ctx<'_>) -> Dispatch {
        let dx = match key {
            Key::ArrowLeft => -self.config.key_step_px,
            Key::ArrowRight => self.config.key_step_px,
            _ => return Dispatch::PASS,
        };
        ctx.emit(Effect::ScrollBy {
            target: Target::Carousel,
            dx,
        });
        self.pause(ctx);
        Dispatch::CONSUMED
    }

    // -- timers ---------------------------------------------------------------

    pub fn on_watchdog(&mut self, ctx: &mut Ctx<'_>) {
        if self.phase != CarouselPhase::UserScrolling {
            ctx.cancel(TimerKey::CarouselWatchdog);
            return;
        }
        if self.offset == self.last_sample {
            ctx.cancel(TimerKey::CarouselWatchdog);
            ctx.arm(TimerKey::CarouselGrace, self.config.grace());
            self.set_phase(CarouselPhase::Settling);
        } else {
            self.last_sample = self.offset;
        }
    }

    pub fn on_grace(&mut self, ctx: &mut Ctx<'_>) {
        if self.phase != CarouselPhase::Settling {
            return;
        }
        ctx.emit(Effect::remove_class(Target::CarouselTrack, PAUSED_CLASS));
        self.set_phase(CarouselPhase::Autoplay);
    }

    fn pause(&mut self, ctx: &mut Ctx<'_>) {
        if self.phase == CarouselPhase::Autoplay {
            ctx.emit(Effect::add_class(Target::CarouselTrack, PAUSED_CLASS));
        }
        self.set_phase(CarouselPhase::UserScrolling);
        ctx.cancel(TimerKey::CarouselGrace);
        self.last_sample = self.offset;
        ctx.arm_repeating(TimerKey::CarouselWatchdog, self.config.poll());
    }

    fn set_phase(&mut self, phase: CarouselPhase) {
        if self.phase != phase {
            tracing::debug!(from = ?self.phase, to = ?phase, offset = self.offset, "carousel phase");
            self.phase = phase;
        }
    }
}
