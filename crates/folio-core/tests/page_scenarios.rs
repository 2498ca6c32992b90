//! End-to-end page sessions driven through the host interface.
//!
//! Each scenario builds a [`Page`] over the reference layout, feeds it the
//! events a browser would deliver and checks the effects the host would
//! apply.

use core::time::Duration;

use folio_core::catalog;
use folio_core::event::{Containment, Key};
use folio_core::player::Transport;
use folio_core::promo::PromoPhase;
use folio_core::{
    AudioCommand, AudioToken, Effect, Page, PageConfig, PageEvent, PageInit, PageLayout, Target,
    Viewport, ViewportClass,
};
use pretty_assertions::assert_eq;

const MINUTE: u64 = 60_000;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn open_page(width: f64, seed: u64) -> Page {
    Page::new(
        PageConfig::default(),
        PageLayout::reference_page(),
        PageInit::new(Viewport::new(width, 900.0), 0.0, seed),
        Duration::ZERO,
    )
    .expect("default config is valid")
}

fn opened_urls(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::OpenUrl(url) => Some(url.clone()),
            _ => None,
        })
        .collect()
}

fn click(target: Target) -> PageEvent {
    PageEvent::Click {
        target: Some(target),
        within: Containment::empty(),
    }
}

// ---------------------------------------------------------------------------

#[test]
fn promo_click_through_on_desktop() {
    let mut page = open_page(1200.0, 7);
    let _ = page.take_effects();

    page.tick(ms(5 * MINUTE));
    let shown = page.take_effects();
    assert!(shown.contains(&Effect::add_class(Target::Promo, "active")));
    assert!(!shown.contains(&Effect::add_class(Target::Promo, "from-left")));
    assert_eq!(page.promo().map(|p| p.phase()), Some(PromoPhase::Active));

    let dispatch = page.handle(click(Target::Promo), ms(5 * MINUTE + 1_000));
    assert!(dispatch.prevent_default);
    assert!(page
        .take_effects()
        .contains(&Effect::add_class(Target::Promo, "clicked")));

    page.tick(ms(5 * MINUTE + 1_300));
    let urls = opened_urls(&page.take_effects());
    assert_eq!(urls.len(), 1);
    assert!(PageConfig::default().promo.links.contains(&urls[0]));

    page.tick(ms(5 * MINUTE + 2_300));
    assert!(page
        .take_effects()
        .contains(&Effect::style(Target::Promo, "display", "none")));
    assert_eq!(page.promo().map(|p| p.phase()), Some(PromoPhase::Idle));

    // The next showing enters from the other side.
    page.tick(ms(10 * MINUTE));
    assert!(page
        .take_effects()
        .contains(&Effect::add_class(Target::Promo, "from-left")));
}

#[test]
fn unclicked_promo_dismisses_itself() {
    let mut page = open_page(1440.0, 3);
    page.tick(ms(5 * MINUTE));
    page.tick(ms(5 * MINUTE + 5_000));
    assert_eq!(page.promo().map(|p| p.phase()), Some(PromoPhase::Dismissing));
    page.tick(ms(5 * MINUTE + 6_000));
    assert_eq!(page.promo().map(|p| p.phase()), Some(PromoPhase::Idle));
    assert!(opened_urls(&page.take_effects()).is_empty());
}

fn showings(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| **e == Effect::add_class(Target::Promo, "active"))
        .count()
}

#[test]
fn stalled_host_gets_one_promo_not_a_backlog() {
    let mut page = open_page(1200.0, 5);
    let _ = page.take_effects();

    // An hour with no timer callbacks, then a single late tick.
    page.tick(ms(60 * MINUTE));
    assert_eq!(showings(&page.take_effects()), 1);
    assert_eq!(page.promo().map(|p| p.phase()), Some(PromoPhase::Idle));

    // The schedule resumes on its five-minute grid.
    page.tick(ms(65 * MINUTE - 1));
    assert_eq!(showings(&page.take_effects()), 0);
    page.tick(ms(65 * MINUTE));
    assert_eq!(showings(&page.take_effects()), 1);
}

#[test]
fn promo_link_choice_is_roughly_uniform() {
    let links = PageConfig::default().promo.links;
    let mut counts = vec![0usize; links.len()];

    for seed in 0..300 {
        let mut page = open_page(1200.0, seed);
        page.tick(ms(5 * MINUTE));
        page.handle(click(Target::Promo), ms(5 * MINUTE + 10));
        page.tick(ms(5 * MINUTE + 400));
        for url in opened_urls(&page.take_effects()) {
            let index = links.iter().position(|l| *l == url).expect("configured link");
            counts[index] += 1;
        }
    }

    assert_eq!(counts.iter().sum::<usize>(), 300);
    for count in counts {
        assert!(count >= 60, "skewed link choice: {count}");
    }
}

#[test]
fn narrow_page_never_shows_promo() {
    let mut page = open_page(400.0, 1);
    assert!(page
        .take_effects()
        .contains(&Effect::style(Target::Promo, "display", "none")));

    page.tick(ms(20 * MINUTE));
    let effects = page.take_effects();
    assert!(!effects.contains(&Effect::add_class(Target::Promo, "active")));
    assert_eq!(page.promo().map(|p| p.phase()), Some(PromoPhase::Idle));
}

#[test]
fn shrinking_during_click_still_opens_link() {
    let mut page = open_page(1200.0, 11);
    page.tick(ms(5 * MINUTE));
    page.handle(click(Target::Promo), ms(5 * MINUTE + 100));
    page.handle(
        PageEvent::Resize {
            width: 600.0,
            height: 900.0,
        },
        ms(5 * MINUTE + 150),
    );
    let effects = page.take_effects();
    assert!(effects.contains(&Effect::style(Target::Promo, "display", "none")));
    assert_eq!(page.promo().map(|p| p.phase()), Some(PromoPhase::Dismissing));

    page.tick(ms(5 * MINUTE + 400));
    assert_eq!(opened_urls(&page.take_effects()).len(), 1);
}

// ---------------------------------------------------------------------------

#[test]
fn retro_wave_session() {
    let mut page = open_page(1200.0, 0);
    let _ = page.take_effects();
    let track = catalog::find("retro-wave").expect("retro-wave is in the catalog");
    let index = page
        .layout()
        .song_button_index("retro-wave")
        .expect("reference page has a retro-wave button");

    let dispatch = page.handle(click(Target::MusicToggle), ms(1_000));
    assert!(dispatch.prevent_default);
    assert!(page.player().is_some_and(|p| p.is_open()));
    let _ = page.take_effects();

    page.handle(
        PageEvent::Click {
            target: Some(Target::SongButton(index)),
            within: Containment::MUSIC_POPUP,
        },
        ms(2_000),
    );
    let effects = page.take_effects();
    assert!(effects.contains(&Effect::text(Target::SongTitle, track.title)));
    assert!(effects.contains(&Effect::text(Target::Genre, track.genre)));
    assert!(effects.contains(&Effect::attribute(Target::AlbumCover, "src", track.cover)));
    assert!(effects.contains(&Effect::add_class(Target::SongButton(index), "active")));

    let audio: Vec<_> = effects
        .iter()
        .filter_map(|e| match e {
            Effect::Audio(command) => Some(command.clone()),
            _ => None,
        })
        .collect();
    let volume = page.player().map_or(0.0, |p| p.effective_volume());
    assert_eq!(
        audio,
        vec![
            AudioCommand::Load {
                token: AudioToken(1),
                src: track.source,
                volume,
            },
            AudioCommand::Play(AudioToken(1)),
        ]
    );
    assert!(effects.contains(&Effect::text(Target::PlayPauseButton, "⏸")));

    // The file is missing: the player keeps presenting the track.
    page.handle(
        PageEvent::PlaybackFailed {
            token: AudioToken(1),
            reason: "NotSupportedError".to_string(),
        },
        ms(2_100),
    );
    assert_eq!(page.player().map(|p| p.transport()), Some(Transport::Playing));
    assert_eq!(page.player().map(|p| p.current_track().id), Some("retro-wave"));

    page.handle(PageEvent::Key { key: Key::Escape, in_carousel: false }, ms(3_000));
    let effects = page.take_effects();
    assert!(effects.contains(&Effect::Audio(AudioCommand::Stop(AudioToken(1)))));
    assert!(page.player().is_some_and(|p| !p.is_open()));
    assert_eq!(page.player().map(|p| p.transport()), Some(Transport::Stopped));
}

#[test]
fn unload_releases_audio_and_stops_timers() {
    let mut page = open_page(1200.0, 0);
    page.handle(click(Target::PlayPauseButton), ms(500));
    let _ = page.take_effects();

    page.handle(PageEvent::Unload, ms(600));
    let effects = page.take_effects();
    assert!(effects.contains(&Effect::Audio(AudioCommand::Release(AudioToken(1)))));
    assert_eq!(page.next_deadline(), None);

    page.tick(ms(10 * MINUTE));
    assert!(page.take_effects().is_empty());
}

// ---------------------------------------------------------------------------

/// A short recorded session in the host's JSON event format.
const RECORDED_SESSION: &str = r#"
{"type":"scroll","y":0.0}
{"type":"animation_frame"}
{"type":"scroll","y":240.0}
{"type":"animation_frame"}
{"type":"resize","width":390.0,"height":844.0}
{"type":"key","key":"escape"}
{"type":"scroll","y":40.0}
{"type":"animation_frame"}
"#;

#[test]
fn recorded_session_replays_to_narrow_layout() {
    let mut page = open_page(1280.0, 0);
    let _ = page.take_effects();

    let events: Vec<PageEvent> = RECORDED_SESSION
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| PageEvent::from_json_str(line).expect("recorded event parses"))
        .collect();
    assert_eq!(events.len(), 8);

    // 40ms apart, like a fast scroll; the resize settles after the debounce.
    let mut now = Duration::ZERO;
    for event in events {
        now += ms(40);
        page.handle(event, now);
    }
    page.tick(now + ms(1_000));

    assert_eq!(page.viewport_class(), ViewportClass::Narrow);
    let effects = page.take_effects();
    assert!(effects.contains(&Effect::style(Target::FloatingLayer, "display", "none")));
    assert!(effects.contains(&Effect::ConfigureReveal {
        threshold: 0.05,
        root_margin: "0px 0px -20px 0px".to_string(),
    }));
    assert!(effects.contains(&Effect::style(Target::Nav, "transform", "translateY(-10px)")));
}
