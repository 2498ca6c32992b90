#![forbid(unsafe_code)]

//! The page aggregate.
//!
//! [`Page`] owns one instance of every controller that could attach, the
//! shared timer queue, the scroll frame gate and the effect buffer. It is
//! the only type the host talks to:
//!
//! ```ignore
//! let mut page = Page::new(config, layout, init, now)?;
//! let dispatch = page.handle(PageEvent::Scroll { y: 120.0 }, now);
//! for effect in page.take_effects() { host.apply(effect); }
//! if let Some(deadline) = page.next_deadline() { host.wake_at(deadline); }
//! ```
//!
//! # Isolation
//!
//! A controller whose elements are missing is logged and skipped; every
//! other controller keeps working.
//!
//! # Timer semantics
//!
//! [`Page::tick`] fires due timers in deadline order and runs each callback
//! at its scheduled deadline, so follow-up timers armed from a callback are
//! anchored to the schedule rather than to how late the host woke up.

use core::time::Duration;

use crate::carousel::Carousel;
use crate::config::PageConfig;
use crate::ctx::Ctx;
use crate::effect::{Effect, Target};
use crate::error::FolioError;
use crate::event::{Containment, Dispatch, Key, PageEvent};
use crate::layout::PageLayout;
use crate::modal::ImagePopup;
use crate::navigate::Navigator;
use crate::parallax::{HeaderParallax, tilt_degrees};
use crate::player::MusicPlayer;
use crate::promo::PromoScheduler;
use crate::responsive::{ResponsiveCoordinator, render_chrome};
use crate::reveal::RevealAnimator;
use crate::settings::SettingsMenu;
use crate::timer::{FrameGate, TimerKey, TimerQueue};
use crate::touch::TouchAdapter;
use crate::viewport::{Viewport, ViewportClass};

/// Host measurements taken at load time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageInit {
    pub viewport: Viewport,
    pub scroll_y: f64,
    /// Seed for the promo link picker.
    pub seed: u64,
}

impl PageInit {
    #[must_use]
    pub const fn new(viewport: Viewport, scroll_y: f64, seed: u64) -> Self {
        Self {
            viewport,
            scroll_y,
            seed,
        }
    }
}

fn attached<T>(controller: &'static str, result: Result<T, FolioError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(controller, error = %err, "controller not attached");
            None
        }
    }
}

#[derive(Debug)]
pub struct Page {
    config: PageConfig,
    layout: PageLayout,
    timers: TimerQueue<TimerKey>,
    effects: Vec<Effect>,
    frame_gate: FrameGate,
    scroll_y: f64,
    /// Offset the last rendered frame was computed from.
    framed_y: f64,
    frame_requested: bool,
    now: Duration,
    unloaded: bool,

    responsive: ResponsiveCoordinator,
    touch: TouchAdapter,
    reveal: Option<RevealAnimator>,
    navigator: Option<Navigator>,
    image_popup: Option<ImagePopup>,
    settings: Option<SettingsMenu>,
    parallax: Option<HeaderParallax>,
    player: Option<MusicPlayer>,
    carousel: Option<Carousel>,
    promo: Option<PromoScheduler>,
}

impl Page {
    /// Attach every controller the layout supports and render the initial
    /// state. Only an invalid configuration is an error.
    pub fn new(
        config: PageConfig,
        layout: PageLayout,
        init: PageInit,
        now: Duration,
    ) -> Result<Self, FolioError> {
        config.validate()?;

        let viewport = init.viewport;
        let class = viewport.classify(&config.breakpoints);
        let mut timers = TimerQueue::new();
        let mut effects = Vec::new();

        let reveal = attached(
            "reveal",
            RevealAnimator::attach(&layout, class, &config.reveal, &mut effects),
        );
        let navigator = attached(
            "navigate",
            Navigator::attach(&layout, &config.collectables_anchor),
        );
        let image_popup = attached("image_popup", ImagePopup::attach(&layout));
        let settings = attached(
            "settings",
            SettingsMenu::attach(&layout, class.is_narrow(), &mut effects),
        );
        let parallax = attached(
            "parallax",
            HeaderParallax::attach(
                &layout,
                class,
                viewport.height,
                init.scroll_y,
                &config.parallax,
                &mut effects,
            ),
        );
        let player = attached(
            "player",
            MusicPlayer::attach(&layout, &config.player, &mut effects),
        );
        let responsive =
            ResponsiveCoordinator::new(&config.responsive, &config.breakpoints, viewport);
        let touch = TouchAdapter::new(class);
        let carousel = attached(
            "carousel",
            Carousel::attach(&layout, &config.carousel, &mut effects),
        );
        let promo = attached(
            "promo",
            PromoScheduler::attach(
                &layout,
                &config.promo,
                &config.breakpoints,
                viewport,
                init.seed,
                &mut Ctx::new(now, &mut timers, &mut effects),
            ),
        );

        let mut page = Self {
            config,
            layout,
            timers,
            effects,
            frame_gate: FrameGate::default(),
            scroll_y: init.scroll_y,
            framed_y: init.scroll_y,
            frame_requested: false,
            now,
            unloaded: false,
            responsive,
            touch,
            reveal,
            navigator,
            image_popup,
            settings,
            parallax,
            player,
            carousel,
            promo,
        };
        page.render_viewport_chrome(class);

        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            class = ?class,
            controllers = page.attached_count(),
            "page attached"
        );
        Ok(page)
    }

    // -- host interface -------------------------------------------------------

    /// Handle one host event at time `now`. Timers due at or before `now`
    /// fire first.
    pub fn handle(&mut self, event: PageEvent, now: Duration) -> Dispatch {
        if self.unloaded {
            return Dispatch::PASS;
        }
        self.tick(now);

        match event {
            PageEvent::Scroll { y } => self.on_scroll(y, now),
            PageEvent::AnimationFrame { tilt } => {
                self.frame_requested = false;
                self.framed_y = self.scroll_y;
                if let Some(parallax) = self.parallax.as_mut() {
                    parallax.on_frame(self.scroll_y, &mut self.effects);
                }
                if let (Some(rect), true) = (tilt, self.layout.tilt_image) {
                    let height = self.responsive.viewport().height;
                    let degrees = tilt_degrees(rect, height, &self.config.parallax);
                    self.effects.push(Effect::style(
                        Target::TiltImage,
                        "transform",
                        format!("rotateY({degrees}deg)"),
                    ));
                }
                Dispatch::PASS
            }
            PageEvent::Resize { width, height } => {
                let viewport = Viewport::new(width, height);
                let mut ctx = Ctx::new(now, &mut self.timers, &mut self.effects);
                self.responsive.on_resize(viewport, &mut ctx);
                if let Some(promo) = self.promo.as_mut() {
                    promo.on_viewport(viewport, &mut ctx);
                }
                Dispatch::PASS
            }
            PageEvent::Click { target, within } => self.on_click(target, within, now),
            PageEvent::AnchorClick { href } => match &self.navigator {
                Some(navigator) => navigator.on_anchor_click(&href, &mut self.effects),
                None => Dispatch::PASS,
            },
            PageEvent::Key { key, in_carousel } => self.on_key(key, in_carousel, now),
            PageEvent::AnimationToggle { enabled } => {
                let narrow = self.viewport_class().is_narrow();
                if let Some(settings) = self.settings.as_mut() {
                    settings.set_animations_enabled(enabled, narrow, &mut self.effects);
                }
                Dispatch::PASS
            }
            PageEvent::VolumeInput { value } => {
                if let Some(player) = self.player.as_mut() {
                    player.set_volume(value, &mut self.effects);
                }
                Dispatch::PASS
            }
            PageEvent::CarouselScroll { offset, metrics } => {
                let mut ctx = Ctx::new(now, &mut self.timers, &mut self.effects);
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.on_scroll(offset, metrics, &mut ctx);
                }
                Dispatch::PASS
            }
            PageEvent::CarouselTouch => {
                let mut ctx = Ctx::new(now, &mut self.timers, &mut self.effects);
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.on_touch(&mut ctx);
                }
                Dispatch::PASS
            }
            PageEvent::CarouselWheel { delta_y } => {
                let mut ctx = Ctx::new(now, &mut self.timers, &mut self.effects);
                match self.carousel.as_mut() {
                    Some(carousel) => carousel.on_wheel(delta_y, &mut ctx),
                    None => Dispatch::PASS,
                }
            }
            PageEvent::TouchStart { target } => {
                self.touch.on_touch_start(target, &mut self.effects);
                Dispatch::PASS
            }
            PageEvent::TouchEnd { target, button } => {
                self.touch.on_touch_end(target, button, &mut self.effects)
            }
            PageEvent::TouchCancel { target } => {
                self.touch.on_touch_cancel(target, &mut self.effects);
                Dispatch::PASS
            }
            PageEvent::Intersection {
                target,
                intersecting,
            } => {
                if let Some(reveal) = self.reveal.as_mut() {
                    reveal.on_intersection(target, intersecting, &mut self.effects);
                }
                Dispatch::PASS
            }
            PageEvent::PlaybackStarted { token } => {
                if let Some(player) = self.player.as_mut() {
                    player.on_playback_started(token);
                }
                Dispatch::PASS
            }
            PageEvent::PlaybackFailed { token, reason } => {
                if let Some(player) = self.player.as_mut() {
                    player.on_playback_failed(token, &reason);
                }
                Dispatch::PASS
            }
            PageEvent::PlaybackEnded { token } => {
                if let Some(player) = self.player.as_mut() {
                    player.on_playback_ended(token, &mut self.effects);
                }
                Dispatch::PASS
            }
            PageEvent::Unload => {
                self.teardown();
                Dispatch::PASS
            }
        }
    }

    /// Fire every timer due at or before `now`, each at its own deadline.
    /// A repeating timer fires at most once per tick however late it is.
    pub fn tick(&mut self, now: Duration) {
        if self.unloaded {
            return;
        }
        while let Some(at) = self.timers.next_deadline().filter(|d| *d <= now) {
            let Some(key) = self.timers.pop_due(now) else {
                break;
            };
            self.fire(key, at);
        }
        self.now = self.now.max(now);
    }

    /// When the host should call [`Page::tick`] next.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.unloaded {
            return None;
        }
        self.timers.next_deadline()
    }

    /// Drain the effects produced since the last call.
    #[must_use]
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Cancel every timer and release the audio resource. Further events
    /// are ignored.
    pub fn teardown(&mut self) {
        if self.unloaded {
            return;
        }
        self.timers.clear();
        if let Some(player) = self.player.as_mut() {
            player.release(&mut self.effects);
        }
        self.unloaded = true;
        tracing::info!("page torn down");
    }

    // -- accessors ------------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub fn is_unloaded(&self) -> bool {
        self.unloaded
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.responsive.viewport()
    }

    #[must_use]
    pub fn viewport_class(&self) -> ViewportClass {
        self.responsive.class()
    }

    #[must_use]
    pub fn timers(&self) -> &TimerQueue<TimerKey> {
        &self.timers
    }

    #[must_use]
    pub fn reveal(&self) -> Option<&RevealAnimator> {
        self.reveal.as_ref()
    }

    #[must_use]
    pub fn image_popup(&self) -> Option<&ImagePopup> {
        self.image_popup.as_ref()
    }

    #[must_use]
    pub fn settings(&self) -> Option<&SettingsMenu> {
        self.settings.as_ref()
    }

    #[must_use]
    pub fn parallax(&self) -> Option<&HeaderParallax> {
        self.parallax.as_ref()
    }

    #[must_use]
    pub fn player(&self) -> Option<&MusicPlayer> {
        self.player.as_ref()
    }

    #[must_use]
    pub fn touch(&self) -> &TouchAdapter {
        &self.touch
    }

    #[must_use]
    pub fn carousel(&self) -> Option<&Carousel> {
        self.carousel.as_ref()
    }

    #[must_use]
    pub fn promo(&self) -> Option<&PromoScheduler> {
        self.promo.as_ref()
    }

    fn attached_count(&self) -> usize {
        [
            self.reveal.is_some(),
            self.navigator.is_some(),
            self.image_popup.is_some(),
            self.settings.is_some(),
            self.parallax.is_some(),
            self.player.is_some(),
            self.carousel.is_some(),
            self.promo.is_some(),
        ]
        .into_iter()
        .filter(|attached| *attached)
        .count()
    }

    // -- routing --------------------------------------------------------------

    fn on_scroll(&mut self, y: f64, now: Duration) -> Dispatch {
        self.scroll_y = y;
        if self.parallax.is_none() && !self.layout.tilt_image {
            return Dispatch::PASS;
        }
        if self.frame_gate.try_pass() {
            self.request_frame(now);
        }
        Dispatch::PASS
    }

    fn request_frame(&mut self, now: Duration) {
        let narrow = self.viewport_class().is_narrow();
        self.effects.push(Effect::RequestFrame);
        self.frame_requested = true;
        self.timers
            .arm(TimerKey::ScrollGate, now, self.config.parallax.frame_gate(narrow));
    }

    /// Trailing edge of the scroll throttle: an offset that arrived after
    /// the last frame rendered still gets a frame of its own.
    fn reopen_frame_gate(&mut self, at: Duration) {
        self.frame_gate.reopen();
        let stale = self.scroll_y != self.framed_y;
        if stale && !self.frame_requested && self.frame_gate.try_pass() {
            self.request_frame(at);
        }
    }

    fn on_click(
        &mut self,
        target: Option<Target>,
        within: Containment,
        now: Duration,
    ) -> Dispatch {
        let mut dispatch = Dispatch::PASS;
        // Controls that stop propagation never reach the outside-click check.
        let mut stopped = false;

        match target {
            Some(Target::SettingsToggle) => {
                if let Some(settings) = self.settings.as_mut() {
                    settings.on_toggle_click(&mut self.effects);
                }
                stopped = true;
            }
            Some(Target::Promo) => {
                let mut ctx = Ctx::new(now, &mut self.timers, &mut self.effects);
                if let Some(promo) = self.promo.as_mut() {
                    dispatch = promo.on_click(&mut ctx);
                }
                stopped = true;
            }
            Some(
                Target::MusicToggle
                | Target::MusicPopupClose
                | Target::SongButton(_)
                | Target::PlayPauseButton
                | Target::VolumeButton,
            ) => {
                if let Some(player) = self.player.as_mut() {
                    player.on_click(target, &mut self.effects);
                }
                dispatch = Dispatch::CONSUMED;
                stopped = true;
            }
            Some(Target::MusicPopup) => {
                if let Some(player) = self.player.as_mut() {
                    player.on_click(target, &mut self.effects);
                }
            }
            Some(Target::ImageTrigger(_) | Target::ImagePopupClose | Target::ImagePopup) => {
                if let Some(popup) = self.image_popup.as_mut() {
                    popup.on_click(target, &mut self.effects);
                }
            }
            Some(Target::CarouselImage(_)) => {
                if let Some(navigator) = &self.navigator {
                    navigator.on_carousel_image_click(&mut self.effects);
                }
            }
            _ => {}
        }

        if !stopped {
            if let Some(settings) = self.settings.as_mut() {
                settings.on_document_click(within, &mut self.effects);
            }
        }
        dispatch
    }

    fn on_key(&mut self, key: Key, in_carousel: bool, now: Duration) -> Dispatch {
        match key {
            Key::Escape => {
                let mut ctx = Ctx::new(now, &mut self.timers, &mut self.effects);
                if let Some(promo) = self.promo.as_mut() {
                    promo.on_escape(&mut ctx);
                }
                if let Some(popup) = self.image_popup.as_mut() {
                    popup.on_escape(&mut self.effects);
                }
                if let Some(settings) = self.settings.as_mut() {
                    settings.on_escape(&mut self.effects);
                }
                if let Some(player) = self.player.as_mut() {
                    player.on_escape(&mut self.effects);
                }
                Dispatch::PASS
            }
            Key::ArrowLeft | Key::ArrowRight if in_carousel => {
                let mut ctx = Ctx::new(now, &mut self.timers, &mut self.effects);
                match self.carousel.as_mut() {
                    Some(carousel) => carousel.on_key(key, &mut ctx),
                    None => Dispatch::PASS,
                }
            }
            _ => Dispatch::PASS,
        }
    }

    // -- timers ---------------------------------------------------------------

    fn fire(&mut self, key: TimerKey, at: Duration) {
        match key {
            TimerKey::ResizeDebounce => {
                let viewport = self.responsive.on_debounce();
                self.apply_viewport(viewport);
            }
            TimerKey::ScrollGate => self.reopen_frame_gate(at),
            TimerKey::CarouselWatchdog | TimerKey::CarouselGrace => {
                let mut ctx = Ctx::new(at, &mut self.timers, &mut self.effects);
                if let Some(carousel) = self.carousel.as_mut() {
                    if key == TimerKey::CarouselWatchdog {
                        carousel.on_watchdog(&mut ctx);
                    } else {
                        carousel.on_grace(&mut ctx);
                    }
                }
            }
            TimerKey::PromoInterval
            | TimerKey::PromoAutoDismiss
            | TimerKey::PromoOpenLink
            | TimerKey::PromoFadeOut => {
                let mut ctx = Ctx::new(at, &mut self.timers, &mut self.effects);
                let Some(promo) = self.promo.as_mut() else {
                    return;
                };
                match key {
                    TimerKey::PromoInterval => promo.on_interval(&mut ctx),
                    TimerKey::PromoAutoDismiss => promo.on_auto_dismiss(&mut ctx),
                    TimerKey::PromoOpenLink => promo.on_open_link(&mut ctx),
                    _ => promo.on_fade_out(&mut ctx),
                }
            }
        }
    }

    /// Reconfigure every viewport-dependent controller in one pass.
    fn apply_viewport(&mut self, viewport: Viewport) {
        let class = viewport.classify(&self.config.breakpoints);
        if let Some(parallax) = self.parallax.as_mut() {
            parallax.reconfigure(class, viewport.height, &mut self.effects);
        }
        if let Some(reveal) = self.reveal.as_mut() {
            reveal.reconfigure(class, &mut self.effects);
        }
        self.touch.reconfigure(class);
        self.render_viewport_chrome(class);
    }

    fn render_viewport_chrome(&mut self, class: ViewportClass) {
        if let Some(settings) = &self.settings {
            settings.reconfigure(class.is_narrow(), &mut self.effects);
        }
        render_chrome(
            class,
            self.layout.music_popup_content,
            self.layout.nav,
            &mut self.effects,
        );
    }
}
