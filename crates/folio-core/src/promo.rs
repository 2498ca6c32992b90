#![forbid(unsafe_code)]

//! Flying promo banner.
//!
//! A repeating timer offers the banner every interval. A showing slides in
//! from alternating sides (the first from the right) and auto-dismisses
//! after a few seconds. Clicking it opens one of the configured links,
//! picked uniformly at random, after a short visual-feedback delay.
//!
//! ```text
//!        interval                 click                 link opened
//! Idle ───────────▶ Active ──────────────▶ Clicked ────────────────┐
//!  ▲                  │ timeout / Escape / narrow resize           │
//!  │                  ▼                                            │
//!  └──── fade done ── Dismissing ◀─────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! - A showing starts only from Idle, so the banner is never shown while
//!   Active or Clicked.
//! - Nothing is shown while the viewport is at or below the tablet
//!   breakpoint.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{Breakpoints, PromoConfig};
use crate::ctx::Ctx;
use crate::effect::{Effect, Target};
use crate::error::FolioError;
use crate::event::Dispatch;
use crate::layout::PageLayout;
use crate::timer::TimerKey;
use crate::viewport::Viewport;

const ACTIVE: &str = "active";
const CLICKED: &str = "clicked";
const INTERACTIVE: &str = "interactive";
const FROM_LEFT: &str = "from-left";

const FADE_TRANSITION: &str = "opacity 1s ease-out, transform 1s ease-out";
const FADE_TRANSFORM: &str = "translateY(-50%) scale(0.8)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoPhase {
    Idle,
    Active,
    Clicked,
    Dismissing,
}

/// Side of the viewport a showing enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySide {
    Right,
    Left,
}

impl EntrySide {
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromoScheduler {
    config: PromoConfig,
    breakpoints: Breakpoints,
    phase: PromoPhase,
    next_side: EntrySide,
    pending_link: Option<String>,
    /// Viewport currently permits showings.
    allowed: bool,
    /// Hidden by a narrow viewport (as opposed to between showings).
    hidden: bool,
    rng: SmallRng,
}

impl PromoScheduler {
    /// Attach and start the repeating schedule.
    pub fn attach(
        layout: &PageLayout,
        config: &PromoConfig,
        breakpoints: &Breakpoints,
        viewport: Viewport,
        seed: u64,
        ctx: &mut Ctx<'_>,
    ) -> Result<Self, FolioError> {
        if !layout.promo {
            return Err(FolioError::MissingElement("#flyingPromo"));
        }
        let allowed = viewport.allows_promo(breakpoints);
        if !allowed {
            tracing::debug!(width = viewport.width, "promo disabled for narrow viewport");
            ctx.emit(Effect::style(Target::Promo, "display", "none"));
        }
        ctx.arm_repeating(TimerKey::PromoInterval, config.interval());
        Ok(Self {
            config: config.clone(),
            breakpoints: breakpoints.clone(),
            phase: PromoPhase::Idle,
            next_side: EntrySide::Right,
            pending_link: None,
            allowed,
            hidden: !allowed,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> PromoPhase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn next_side(&self) -> EntrySide {
        self.next_side
    }

    // -- schedule -------------------------------------------------------------

    /// Repeating schedule tick.
    pub fn on_interval(&mut self, ctx: &mut Ctx<'_>) {
        if !self.show(ctx) {
            tracing::debug!(phase = ?self.phase, allowed = self.allowed, "promo showing skipped");
        }
    }

    /// Start a showing. Returns `false` when not Idle or the viewport is
    /// too narrow.
    pub fn show(&mut self, ctx: &mut Ctx<'_>) -> bool {
        if self.phase != PromoPhase::Idle || !self.allowed {
            return false;
        }
        let side = self.next_side;
        ctx.emit(Effect::remove_class(Target::Promo, CLICKED));
        ctx.emit(Effect::remove_class(Target::Promo, INTERACTIVE));
        ctx.emit(Effect::remove_class(Target::Promo, FROM_LEFT));
        ctx.emit(Effect::clear_style(Target::Promo, "transition"));
        ctx.emit(Effect::clear_style(Target::Promo, "opacity"));
        ctx.emit(Effect::style(Target::Promo, "display", "block"));
        if side == EntrySide::Left {
            ctx.emit(Effect::add_class(Target::Promo, FROM_LEFT));
        }
        ctx.emit(Effect::add_class(Target::Promo, ACTIVE));
        self.next_side = side.flip();
        self.hidden = false;
        ctx.arm(TimerKey::PromoAutoDismiss, self.config.visible());
        self.set_phase(PromoPhase::Active);
        tracing::debug!(side = ?side, "promo shown");
        true
    }

    pub fn on_auto_dismiss(&mut self, ctx: &mut Ctx<'_>) {
        if self.phase == PromoPhase::Active {
            self.dismiss(ctx);
        }
    }

    // -- user input -----------------------------------------------------------

    /// Clicks on the banner never reach the rest of the page.
    pub fn on_click(&mut self, ctx: &mut Ctx<'_>) -> Dispatch {
        if self.phase != PromoPhase::Active {
            return Dispatch::CONSUMED;
        }
        ctx.cancel(TimerKey::PromoAutoDismiss);
        let link = self.pick_link();
        tracing::debug!(link = ?link, "promo clicked");
        self.pending_link = link;
        ctx.emit(Effect::remove_class(Target::Promo, ACTIVE));
        ctx.emit(Effect::remove_class(Target::Promo, FROM_LEFT));
        ctx.emit(Effect::add_class(Target::Promo, CLICKED));
        ctx.arm(TimerKey::PromoOpenLink, self.config.click_delay());
        self.set_phase(PromoPhase::Clicked);
        Dispatch::CONSUMED
    }

    pub fn on_open_link(&mut self, ctx: &mut Ctx<'_>) {
        if let Some(link) = self.pending_link.take() {
            ctx.emit(Effect::OpenUrl(link));
        }
        if self.phase == PromoPhase::Clicked {
            self.dismiss(ctx);
        }
    }

    /// Escape dismisses a showing that has not been clicked.
    pub fn on_escape(&mut self, ctx: &mut Ctx<'_>) -> bool {
        if self.phase != PromoPhase::Active {
            return false;
        }
        ctx.cancel(TimerKey::PromoAutoDismiss);
        self.dismiss(ctx);
        true
    }

    /// Raw (undebounced) viewport change.
    pub fn on_viewport(&mut self, viewport: Viewport, ctx: &mut Ctx<'_>) {
        self.allowed = viewport.allows_promo(&self.breakpoints);
        if !self.allowed {
            if matches!(self.phase, PromoPhase::Active | PromoPhase::Clicked) {
                ctx.cancel(TimerKey::PromoAutoDismiss);
                self.dismiss(ctx);
            }
            if !self.hidden {
                tracing::debug!(width = viewport.width, "promo hidden for narrow viewport");
            }
            ctx.emit(Effect::style(Target::Promo, "display", "none"));
            self.hidden = true;
        } else if self.hidden {
            ctx.emit(Effect::style(Target::Promo, "display", "block"));
            ctx.emit(Effect::style(Target::Promo, "opacity", "0"));
            self.hidden = false;
        }
    }

    // -- dismissal ------------------------------------------------------------

    fn dismiss(&mut self, ctx: &mut Ctx<'_>) {
        ctx.emit(Effect::remove_class(Target::Promo, ACTIVE));
        ctx.emit(Effect::remove_class(Target::Promo, FROM_LEFT));
        ctx.emit(Effect::style(Target::Promo, "transition", FADE_TRANSITION));
        ctx.emit(Effect::style(Target::Promo, "opacity", "0"));
        ctx.emit(Effect::style(Target::Promo, "transform", FADE_TRANSFORM));
        ctx.arm(TimerKey::PromoFadeOut, self.config.fade());
        self.set_phase(PromoPhase::Dismissing);
    }

    pub fn on_fade_out(&mut self, ctx: &mut Ctx<'_>) {
        if self.phase != PromoPhase::Dismissing {
            return;
        }
        ctx.emit(Effect::style(Target::Promo, "display", "none"));
        ctx.emit(Effect::clear_style(Target::Promo, "transition"));
        ctx.emit(Effect::clear_style(Target::Promo, "opacity"));
        ctx.emit(Effect::clear_style(Target::Promo, "transform"));
        self.set_phase(PromoPhase::Idle);
    }

    fn pick_link(&mut self) -> Option<String> {
        if self.config.links.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..self.config.links.len());
        self.config.links.get(index).cloned()
    }

    fn set_phase(&mut self, phase: PromoPhase) {
        if self.phase != phase {
            tracing::debug!(from = ?self.phase, to = ?phase, "promo phase");
            self.phase = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::*;
    use crate::timer::TimerQueue;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    struct Harness {
        promo: PromoScheduler,
        timers: TimerQueue<TimerKey>,
        effects: Vec<Effect>,
    }

    impl Harness {
        fn new(width: f64) -> Self {
            let mut timers = TimerQueue::new();
            let mut effects = Vec::new();
            let promo = PromoScheduler::attach(
                &PageLayout::reference_page(),
                &PromoConfig::default(),
                &Breakpoints::default(),
                Viewport::new(width, 900.0),
                7,
                &mut Ctx::new(ms(0), &mut timers, &mut effects),
            )
            .unwrap();
            Self {
                promo,
                timers,
                effects,
            }
        }

        fn ctx(&mut self, now: u64) -> (Ctx<'_>, &mut PromoScheduler) {
            (
                Ctx::new(ms(now), &mut self.timers, &mut self.effects),
                &mut self.promo,
            )
        }

        fn advance(&mut self, now: u64) {
            while let Some(at) = self.timers.next_deadline().filter(|d| *d <= ms(now)) {
                let Some(key) = self.timers.pop_due(at) else {
                    break;
                };
                let mut ctx = Ctx::new(at, &mut self.timers, &mut self.effects);
                match key {
                    TimerKey::PromoInterval => self.promo.on_interval(&mut ctx),
                    TimerKey::PromoAutoDismiss => self.promo.on_auto_dismiss(&mut ctx),
                    TimerKey::PromoOpenLink => self.promo.on_open_link(&mut ctx),
                    TimerKey::PromoFadeOut => self.promo.on_fade_out(&mut ctx),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn first_showing_after_interval_from_the_right() {
        let mut h = Harness::new(1200.0);
        h.advance(299_999);
        assert_eq!(h.promo.phase(), PromoPhase::Idle);
        h.advance(300_000);
        assert_eq!(h.promo.phase(), PromoPhase::Active);
        assert!(!h.effects.contains(&Effect::add_class(Target::Promo, FROM_LEFT)));
        assert_eq!(h.promo.next_side(), EntrySide::Left);
    }

    #[test]
    fn auto_dismiss_then_idle() {
        let mut h = Harness::new(1200.0);
        h.advance(300_000);
        h.advance(305_000);
        assert_eq!(h.promo.phase(), PromoPhase::Dismissing);
        h.advance(306_000);
        assert_eq!(h.promo.phase(), PromoPhase::Idle);
        assert!(h.effects.contains(&Effect::style(Target::Promo, "display", "none")));
    }

    #[test]
    fn sides_alternate() {
        let mut h = Harness::new(1200.0);
        h.advance(310_000);
        h.effects.clear();
        h.advance(600_000);
        assert_eq!(h.promo.phase(), PromoPhase::Active);
        assert!(h.effects.contains(&Effect::add_class(Target::Promo, FROM_LEFT)));
    }

    #[test]
    fn click_opens_one_link_then_dismisses() {
        let mut h = Harness::new(1200.0);
        h.advance(300_000);
        let (mut ctx, promo) = h.ctx(301_000);
        assert_eq!(promo.on_click(&mut ctx), Dispatch::CONSUMED);
        assert_eq!(h.promo.phase(), PromoPhase::Clicked);
        assert!(!h.timers.is_armed(TimerKey::PromoAutoDismiss));

        h.advance(301_300);
        let opened: Vec<_> = h
            .effects
            .iter()
            .filter_map(|e| match e {
                Effect::OpenUrl(url) => Some(url.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(opened.len(), 1);
        assert!(PromoConfig::default().links.contains(&opened[0]));
        assert_eq!(h.promo.phase(), PromoPhase::Dismissing);
        h.advance(302_300);
        assert_eq!(h.promo.phase(), PromoPhase::Idle);
    }

    #[test]
    fn clicks_outside_active_are_swallowed_without_effects() {
        let mut h = Harness::new(1200.0);
        h.effects.clear();
        let (mut ctx, promo) = h.ctx(10);
        assert_eq!(promo.on_click(&mut ctx), Dispatch::CONSUMED);
        assert!(h.effects.is_empty());
    }

    #[test]
    fn escape_only_while_active() {
        let mut h = Harness::new(1200.0);
        let (mut ctx, promo) = h.ctx(0);
        assert!(!promo.on_escape(&mut ctx));
        h.advance(300_000);
        let (mut ctx, promo) = h.ctx(300_500);
        assert!(promo.on_escape(&mut ctx));
        assert_eq!(h.promo.phase(), PromoPhase::Dismissing);
        h.advance(301_500);
        assert_eq!(h.promo.phase(), PromoPhase::Idle);
    }

    #[test]
    fn narrow_viewport_never_shows() {
        let mut h = Harness::new(768.0);
        assert_eq!(
            h.effects,
            vec![Effect::style(Target::Promo, "display", "none")]
        );
        h.advance(900_000);
        assert_eq!(h.promo.phase(), PromoPhase::Idle);
    }

    #[test]
    fn shrinking_while_active_forces_dismiss_and_hides() {
        let mut h = Harness::new(1200.0);
        h.advance(300_000);
        h.effects.clear();
        let (mut ctx, promo) = h.ctx(301_000);
        promo.on_viewport(Viewport::new(600.0, 900.0), &mut ctx);
        assert_eq!(h.promo.phase(), PromoPhase::Dismissing);
        assert_eq!(
            h.effects.last(),
            Some(&Effect::style(Target::Promo, "display", "none"))
        );

        h.advance(302_000);
        assert_eq!(h.promo.phase(), PromoPhase::Idle);
        h.effects.clear();
        let (mut ctx, promo) = h.ctx(303_000);
        promo.on_viewport(Viewport::new(1300.0, 900.0), &mut ctx);
        assert_eq!(
            h.effects,
            vec![
                Effect::style(Target::Promo, "display", "block"),
                Effect::style(Target::Promo, "opacity", "0"),
            ]
        );
    }

    #[test]
    fn link_choice_is_deterministic_per_seed() {
        let pick = |seed| {
            let mut timers = TimerQueue::new();
            let mut effects = Vec::new();
            let mut promo = PromoScheduler::attach(
                &PageLayout::reference_page(),
                &PromoConfig::default(),
                &Breakpoints::default(),
                Viewport::new(1200.0, 900.0),
                seed,
                &mut Ctx::new(ms(0), &mut timers, &mut effects),
            )
            .unwrap();
            promo.pick_link()
        };
        assert_eq!(pick(42), pick(42));
        assert!(pick(1).is_some());
    }
}
