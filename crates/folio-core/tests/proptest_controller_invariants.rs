//! Property-based invariant tests for the page controllers.
//!
//! Verifies:
//! 1.  Reveal watcher: width <= 420 → (0.05, -20px), otherwise (0.1, -50px)
//! 2.  Parallax: nav offset is 0 at y = 0 for every viewport
//! 3.  Parallax: wide nav offset stays within [-25, 10]
//! 4.  Parallax: narrow nav offset is exactly 0 or -10
//! 5.  Parallax: subtitle opacity stays within [0, 1]
//! 6.  Carousel: autoplay never resumes < 1000ms after the last raw input
//! 7.  Carousel: autoplay never resumes < 500ms after the offset last changed
//! 8.  Carousel: wrap reduces the offset by exactly one set width
//! 9.  Promo: a showing only starts from Idle
//! 10. Promo: Escape while Active reaches Idle within 1s
//! 11. Player: at most one audio resource is live after any interaction sequence
//! 12. Player: mute then unmute restores the exact pre-mute volume
//! 13. Player: slider and icon always match the effective volume
//! 14. Timers: due keys pop in non-decreasing deadline order
//! 15. Timers: a late repeating timer fires once and re-arms on its grid after `now`

use core::time::Duration;

use folio_core::carousel::CarouselPhase;
use folio_core::config::{Breakpoints, ParallaxConfig, PlayerConfig, RevealConfig};
use folio_core::event::{CarouselMetrics, Containment, Key};
use folio_core::parallax::{ParallaxFrame, ScrollDirection};
use folio_core::player::{MusicPlayer, VolumeIcon};
use folio_core::promo::PromoPhase;
use folio_core::reveal::WatcherConfig;
use folio_core::timer::{TimerKey, TimerQueue};
use folio_core::{
    AudioCommand, Effect, Page, PageConfig, PageEvent, PageInit, PageLayout, Target, Viewport,
    ViewportClass,
};
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn arb_width() -> impl Strategy<Value = f64> {
    prop_oneof![
        (200u32..=420).prop_map(f64::from),
        (421u32..=768).prop_map(f64::from),
        (769u32..=2560).prop_map(f64::from),
    ]
}

fn arb_direction() -> impl Strategy<Value = ScrollDirection> {
    prop_oneof![Just(ScrollDirection::Up), Just(ScrollDirection::Down)]
}

fn arb_class() -> impl Strategy<Value = ViewportClass> {
    prop_oneof![
        Just(ViewportClass::Narrow),
        Just(ViewportClass::Tablet),
        Just(ViewportClass::Wide),
    ]
}

#[derive(Debug, Clone)]
enum CarouselInput {
    Touch,
    Wheel(f64),
    Key(Key),
    Scroll(f64),
    Idle,
}

fn arb_carousel_input() -> impl Strategy<Value = CarouselInput> {
    prop_oneof![
        Just(CarouselInput::Touch),
        (-300i32..=300).prop_map(|d| CarouselInput::Wheel(f64::from(d))),
        prop_oneof![Just(Key::ArrowLeft), Just(Key::ArrowRight)].prop_map(CarouselInput::Key),
        (0u32..=1000).prop_map(|o| CarouselInput::Scroll(f64::from(o))),
        Just(CarouselInput::Idle),
    ]
}

/// An event plus the gap (ms) since the previous one.
fn arb_carousel_session() -> impl Strategy<Value = Vec<(u64, CarouselInput)>> {
    prop::collection::vec((0u64..=1500, arb_carousel_input()), 1..40)
}

#[derive(Debug, Clone)]
enum PromoInput {
    Click,
    Escape,
    Resize(f64),
    Wait(u64),
}

fn arb_promo_input() -> impl Strategy<Value = PromoInput> {
    prop_oneof![
        Just(PromoInput::Click),
        Just(PromoInput::Escape),
        arb_width().prop_map(PromoInput::Resize),
        (0u64..=400_000).prop_map(PromoInput::Wait),
    ]
}

#[derive(Debug, Clone)]
enum PlayerInput {
    Song(usize),
    PlayPause,
    Mute,
    Volume(f64),
    Close,
}

fn arb_player_input() -> impl Strategy<Value = PlayerInput> {
    prop_oneof![
        (0usize..9).prop_map(PlayerInput::Song),
        Just(PlayerInput::PlayPause),
        Just(PlayerInput::Mute),
        (-20i32..=120).prop_map(|v| PlayerInput::Volume(f64::from(v))),
        Just(PlayerInput::Close),
    ]
}

fn page(width: f64, seed: u64) -> Page {
    Page::new(
        PageConfig::default(),
        PageLayout::reference_page(),
        PageInit::new(Viewport::new(width, 900.0), 0.0, seed),
        Duration::ZERO,
    )
    .expect("default config is valid")
}

/// Fire timers one deadline at a time up to `until`, calling `observe`
/// after each.
fn run_timers(page: &mut Page, until: Duration, mut observe: impl FnMut(&mut Page, Duration)) {
    while let Some(deadline) = page.next_deadline().filter(|d| *d <= until) {
        page.tick(deadline);
        observe(page, deadline);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Reveal watcher thresholds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reveal_watcher_tracks_breakpoint(width in arb_width()) {
        let class = Viewport::new(width, 800.0).classify(&Breakpoints::default());
        let watcher = WatcherConfig::for_class(class, &RevealConfig::default());
        if width <= 420.0 {
            prop_assert_eq!(watcher.threshold, 0.05);
            prop_assert_eq!(watcher.root_margin.as_str(), "0px 0px -20px 0px");
        } else {
            prop_assert_eq!(watcher.threshold, 0.1);
            prop_assert_eq!(watcher.root_margin.as_str(), "0px 0px -50px 0px");
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2-5. Parallax bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn nav_offset_is_zero_at_top(class in arb_class(), dir in arb_direction(), h in 0u32..=2000) {
        let frame = ParallaxFrame::compute(&ParallaxConfig::default(), class, f64::from(h), 0.0, dir);
        prop_assert_eq!(frame.nav_offset, 0.0);
    }

    #[test]
    fn wide_nav_offset_bounded(y in 0.0f64..100_000.0, dir in arb_direction()) {
        let frame = ParallaxFrame::compute(&ParallaxConfig::default(), ViewportClass::Wide, 900.0, y, dir);
        prop_assert!((-25.0..=10.0).contains(&frame.nav_offset), "nav {} at y {}", frame.nav_offset, y);
    }

    #[test]
    fn narrow_nav_offset_is_binary(y in 0.0f64..100_000.0, dir in arb_direction()) {
        let frame = ParallaxFrame::compute(&ParallaxConfig::default(), ViewportClass::Narrow, 700.0, y, dir);
        prop_assert!(frame.nav_offset == 0.0 || frame.nav_offset == -10.0);
    }

    #[test]
    fn subtitle_opacity_bounded(
        class in arb_class(),
        y in -500.0f64..100_000.0,
        h in 0u32..=3000,
        dir in arb_direction(),
    ) {
        let frame = ParallaxFrame::compute(&ParallaxConfig::default(), class, f64::from(h), y, dir);
        prop_assert!((0.0..=1.0).contains(&frame.subtitle_opacity));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6-7. Carousel resume timing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn carousel_resume_respects_quiet_periods(session in arb_carousel_session()) {
        let mut page = page(1200.0, 0);
        let mut now = Duration::ZERO;
        let mut last_input: Option<Duration> = None;
        let mut last_change: Option<Duration> = None;
        let mut violations = Vec::new();

        for (gap, input) in session {
            now += ms(gap);
            let mut previous = page.carousel().map(|c| c.phase());
            run_timers(&mut page, now, |page, at| {
                let phase = page.carousel().map(|c| c.phase());
                if previous != Some(CarouselPhase::Autoplay) && phase == Some(CarouselPhase::Autoplay) {
                    if let Some(t) = last_input {
                        if at < t + ms(1000) {
                            violations.push(format!("resumed at {at:?}, input at {t:?}"));
                        }
                    }
                    if let Some(t) = last_change {
                        if at < t + ms(500) {
                            violations.push(format!("resumed at {at:?}, change at {t:?}"));
                        }
                    }
                }
                previous = phase;
            });

            let event = match input {
                CarouselInput::Touch => {
                    last_input = Some(now);
                    PageEvent::CarouselTouch
                }
                CarouselInput::Wheel(delta_y) => {
                    if delta_y != 0.0 {
                        last_input = Some(now);
                    }
                    PageEvent::CarouselWheel { delta_y }
                }
                CarouselInput::Key(key) => {
                    last_input = Some(now);
                    PageEvent::Key { key, in_carousel: true }
                }
                CarouselInput::Scroll(offset) => {
                    if page.carousel().map(|c| c.offset()) != Some(offset) {
                        last_change = Some(now);
                    }
                    PageEvent::CarouselScroll { offset, metrics: None }
                }
                CarouselInput::Idle => continue,
            };
            page.handle(event, now);
        }
        prop_assert!(violations.is_empty(), "{:?}", violations);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Carousel wraparound
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn wrap_subtracts_one_set(
        width in 1u32..=600,
        gap in 0u32..=60,
        half in 1usize..=12,
        extra in 0u32..=2000,
    ) {
        let metrics = CarouselMetrics {
            image_width: f64::from(width),
            gap: f64::from(gap),
            image_count: half * 2,
        };
        let set = metrics.set_width().expect("laid out");
        let offset = set + f64::from(extra);

        let mut page = page(1200.0, 0);
        let _ = page.take_effects();
        page.handle(PageEvent::CarouselScroll { offset, metrics: Some(metrics) }, ms(10));
        let wrapped: Vec<_> = page
            .take_effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::SetScrollLeft { offset, .. } => Some(offset),
                _ => None,
            })
            .collect();
        prop_assert_eq!(wrapped, vec![offset - set]);

        page.handle(PageEvent::CarouselScroll { offset: set - 1.0, metrics: Some(metrics) }, ms(20));
        let wrapped_again = page.take_effects().iter().any(|e| matches!(e, Effect::SetScrollLeft { .. }));
        prop_assert!(!wrapped_again);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 9. Promo showings start only from Idle
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn promo_shows_only_from_idle(
        seed in any::<u64>(),
        inputs in prop::collection::vec(arb_promo_input(), 1..30),
    ) {
        let mut page = page(1200.0, seed);
        let _ = page.take_effects();
        let shown = Effect::add_class(Target::Promo, "active");
        let mut now = Duration::ZERO;

        for input in inputs {
            let event = match input {
                PromoInput::Click => PageEvent::Click { target: Some(Target::Promo), within: Containment::empty() },
                PromoInput::Escape => PageEvent::Key { key: Key::Escape, in_carousel: false },
                PromoInput::Resize(width) => PageEvent::Resize { width, height: 900.0 },
                PromoInput::Wait(gap) => {
                    now += ms(gap);
                    let mut before = page.promo().map(|p| p.phase());
                    let mut bad = None;
                    run_timers(&mut page, now, |page, at| {
                        if page.take_effects().contains(&shown) && before != Some(PromoPhase::Idle) {
                            bad = Some(at);
                        }
                        before = page.promo().map(|p| p.phase());
                    });
                    prop_assert!(bad.is_none(), "shown from {:?} at {:?}", before, bad);
                    continue;
                }
            };
            let before = page.promo().map(|p| p.phase());
            page.handle(event, now);
            if page.take_effects().contains(&shown) {
                prop_assert_eq!(before, Some(PromoPhase::Idle));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 10. Escape while Active reaches Idle within 1s
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn escape_dismisses_within_one_second(delay in 0u64..5000, seed in any::<u64>()) {
        let mut page = page(1440.0, seed);
        page.tick(ms(300_000));
        prop_assert_eq!(page.promo().map(|p| p.phase()), Some(PromoPhase::Active));

        let pressed = ms(300_000 + delay);
        page.handle(PageEvent::Key { key: Key::Escape, in_carousel: false }, pressed);
        page.tick(pressed + ms(1000));
        prop_assert_eq!(page.promo().map(|p| p.phase()), Some(PromoPhase::Idle));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 11-13. Player resource and volume invariants
// ═════════════════════════════════════════════════════════════════════════

fn last_slider(effects: &[Effect]) -> Option<f64> {
    effects.iter().rev().find_map(|e| match e {
        Effect::SetValue { target: Target::VolumeSlider, value } => Some(*value),
        _ => None,
    })
}

fn last_icon(effects: &[Effect]) -> Option<String> {
    effects.iter().rev().find_map(|e| match e {
        Effect::SetText { target: Target::VolumeButton, text } => Some(text.clone()),
        _ => None,
    })
}

proptest! {
    #[test]
    fn player_keeps_single_resource_and_consistent_volume(
        inputs in prop::collection::vec(arb_player_input(), 1..40),
    ) {
        let mut effects = Vec::new();
        let mut player = MusicPlayer::attach(
            &PageLayout::reference_page(),
            &PlayerConfig::default(),
            &mut effects,
        ).expect("reference page attaches");
        let mut live = 0i64;

        for input in inputs {
            effects.clear();
            match input {
                PlayerInput::Song(i) => { player.on_click(Some(Target::SongButton(i)), &mut effects); }
                PlayerInput::PlayPause => player.toggle_play_pause(&mut effects),
                PlayerInput::Mute => player.toggle_mute(&mut effects),
                PlayerInput::Volume(v) => player.set_volume(v, &mut effects),
                PlayerInput::Close => { player.close_popup(&mut effects); }
            }
            for effect in &effects {
                match effect {
                    Effect::Audio(AudioCommand::Load { .. }) => live += 1,
                    Effect::Audio(AudioCommand::Release(_)) => live -= 1,
                    _ => {}
                }
            }
            prop_assert!((0..=1).contains(&live), "live resources: {}", live);

            if let Some(slider) = last_slider(&effects) {
                prop_assert_eq!(slider, player.effective_volume() * 100.0);
            }
            if let Some(icon) = last_icon(&effects) {
                prop_assert_eq!(icon.as_str(), VolumeIcon::for_volume(player.effective_volume()).glyph());
            }
            prop_assert_eq!(player.volume_icon(), VolumeIcon::for_volume(player.effective_volume()));
        }
    }

    #[test]
    fn mute_round_trip_is_exact(value in 0.0f64..=100.0, loaded in any::<bool>()) {
        let mut effects = Vec::new();
        let mut player = MusicPlayer::attach(
            &PageLayout::reference_page(),
            &PlayerConfig::default(),
            &mut effects,
        ).expect("reference page attaches");
        if loaded {
            player.toggle_play_pause(&mut effects);
        }
        player.set_volume(value, &mut effects);
        let before = player.volume();

        player.toggle_mute(&mut effects);
        prop_assert_eq!(player.effective_volume(), 0.0);
        player.toggle_mute(&mut effects);
        prop_assert_eq!(player.volume(), before);
        prop_assert_eq!(player.effective_volume(), before);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 14. Timer ordering
// ═════════════════════════════════════════════════════════════════════════

fn arb_timer_key() -> impl Strategy<Value = TimerKey> {
    prop_oneof![
        Just(TimerKey::ResizeDebounce),
        Just(TimerKey::ScrollGate),
        Just(TimerKey::CarouselWatchdog),
        Just(TimerKey::CarouselGrace),
        Just(TimerKey::PromoInterval),
        Just(TimerKey::PromoAutoDismiss),
        Just(TimerKey::PromoOpenLink),
        Just(TimerKey::PromoFadeOut),
    ]
}

proptest! {
    #[test]
    fn timers_pop_in_deadline_order(
        arms in prop::collection::vec((arb_timer_key(), 0u64..1000, 0u64..5000), 1..20),
    ) {
        let mut timers = TimerQueue::new();
        for (key, at, delay) in &arms {
            timers.arm(*key, ms(*at), ms(*delay));
        }
        let mut last = Duration::ZERO;
        let horizon = ms(10_000);
        while let Some(deadline) = timers.next_deadline().filter(|d| *d <= horizon) {
            prop_assert!(deadline >= last);
            let key = timers.pop_due(deadline);
            prop_assert!(key.is_some());
            last = deadline;
        }
        prop_assert!(timers.is_empty());
    }

    #[test]
    fn late_repeating_timer_fires_once(
        period in 1u64..10_000,
        lateness in 0u64..1_000_000,
    ) {
        let mut timers = TimerQueue::new();
        timers.arm_repeating(TimerKey::PromoInterval, Duration::ZERO, ms(period));
        let now = ms(period + lateness);

        prop_assert_eq!(timers.pop_due(now), Some(TimerKey::PromoInterval));
        prop_assert_eq!(timers.pop_due(now), None);

        let next = timers.deadline(TimerKey::PromoInterval).map(|d| d.as_millis());
        let next = next.unwrap_or_default();
        prop_assert!(next > now.as_millis());
        prop_assert!(next - now.as_millis() <= u128::from(period));
        prop_assert_eq!(next % u128::from(period), 0);
    }
}
