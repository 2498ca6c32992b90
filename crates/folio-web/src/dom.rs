#![forbid(unsafe_code)]

//! Markup contract: where every [`Target`] lives in the page.
//!
//! Pure data so it compiles (and is tested) on native targets. The wasm host
//! resolves these queries once at startup.

use folio_core::Target;

/// How to find an element (or element family) in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// `document.getElementById`.
    Id(&'static str),
    /// First match of `document.querySelector`.
    Selector(&'static str),
    /// Each id in order, skipping missing ones.
    Ids(&'static [&'static str]),
    /// Every match of `document.querySelectorAll`, in document order.
    All(&'static str),
}

/// Elements a touch-end activates directly.
pub const BUTTONS: &str = "button, .song-btn";
/// Same-page navigation links.
pub const NAV_ANCHORS: &str = "nav a[href^=\"#\"]";
/// Attribute carrying a song button's track id.
pub const SONG_ATTRIBUTE: &str = "data-song";

/// Indexed element families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Sections,
    Cards,
    Headings,
    ImageTriggers,
    FloatingImages,
    SongButtons,
    CarouselImages,
    /// Matches of [`BUTTONS`] not already registered under another target.
    Buttons,
}

impl Family {
    pub const ALL: [Self; 8] = [
        Self::Sections,
        Self::Cards,
        Self::Headings,
        Self::ImageTriggers,
        Self::FloatingImages,
        Self::SongButtons,
        Self::CarouselImages,
        Self::Buttons,
    ];

    #[must_use]
    pub const fn query(self) -> Query {
        match self {
            Self::Sections => Query::All("section"),
            Self::Cards => Query::All(".product-card, .product-card1"),
            Self::Headings => Query::All("h2"),
            Self::ImageTriggers => Query::Ids(&["sword1", "sword2"]),
            Self::FloatingImages => Query::All(".flying-elements img"),
            Self::SongButtons => Query::All(".song-btn"),
            Self::CarouselImages => Query::All(".scrolling-container .scroll-img"),
            Self::Buttons => Query::All(BUTTONS),
        }
    }

    #[must_use]
    pub const fn target(self, index: usize) -> Target {
        match self {
            Self::Sections => Target::Section(index),
            Self::Cards => Target::Card(index),
            Self::Headings => Target::Heading(index),
            Self::ImageTriggers => Target::ImageTrigger(index),
            Self::FloatingImages => Target::FloatingImage(index),
            Self::SongButtons => Target::SongButton(index),
            Self::CarouselImages => Target::CarouselImage(index),
            Self::Buttons => Target::Button(index),
        }
    }

    /// Family of an indexed target.
    #[must_use]
    pub const fn of(target: Target) -> Option<(Self, usize)> {
        match target {
            Target::Section(i) => Some((Self::Sections, i)),
            Target::Card(i) => Some((Self::Cards, i)),
            Target::Heading(i) => Some((Self::Headings, i)),
            Target::ImageTrigger(i) => Some((Self::ImageTriggers, i)),
            Target::FloatingImage(i) => Some((Self::FloatingImages, i)),
            Target::SongButton(i) => Some((Self::SongButtons, i)),
            Target::CarouselImage(i) => Some((Self::CarouselImages, i)),
            Target::Button(i) => Some((Self::Buttons, i)),
            _ => None,
        }
    }
}

/// Every non-indexed target except `Body`.
pub const SINGLES: [Target; 24] = [
    Target::Nav,
    Target::Subtitle,
    Target::TiltImage,
    Target::ImagePopup,
    Target::ImagePopupClose,
    Target::SettingsToggle,
    Target::SettingsMenu,
    Target::AnimationToggle,
    Target::FloatingLayer,
    Target::MusicToggle,
    Target::MusicPopup,
    Target::MusicPopupContent,
    Target::MusicPopupClose,
    Target::PlayPauseButton,
    Target::VolumeButton,
    Target::VolumeSlider,
    Target::Genre,
    Target::SongTitle,
    Target::Description,
    Target::DescriptionDupe,
    Target::AlbumCover,
    Target::Carousel,
    Target::CarouselTrack,
    Target::Promo,
];

/// Query for a non-indexed target. `None` for `Body` and indexed targets.
#[must_use]
pub const fn single(target: Target) -> Option<Query> {
    let query = match target {
        Target::Nav => Query::Selector("nav"),
        Target::Subtitle => Query::Selector(".subTitle"),
        Target::TiltImage => Query::Selector(".tilt-img"),
        Target::ImagePopup => Query::Id("swordPopup"),
        Target::ImagePopupClose => Query::Id("closePopup"),
        Target::SettingsToggle => Query::Id("settingsMenuToggle"),
        Target::SettingsMenu => Query::Id("settingsMenu"),
        Target::AnimationToggle => Query::Id("animationToggle"),
        Target::FloatingLayer => Query::Selector(".flying-elements"),
        Target::MusicToggle => Query::Id("musicMenuToggle"),
        Target::MusicPopup => Query::Id("musicPopup"),
        Target::MusicPopupContent => Query::Selector("#musicPopup .music-popup-content"),
        Target::MusicPopupClose => Query::Id("closeMusicPopup"),
        Target::PlayPauseButton => Query::Id("playPauseBtn"),
        Target::VolumeButton => Query::Id("volumeBtn"),
        Target::VolumeSlider => Query::Id("volumeSlider"),
        Target::Genre => Query::Id("currentGenre"),
        Target::SongTitle => Query::Id("currentSongTitle"),
        Target::Description => Query::Id("radioDescription"),
        Target::DescriptionDupe => Query::Id("radioDescriptionDupe"),
        Target::AlbumCover => Query::Id("currentAlbumCover"),
        Target::Carousel => Query::Selector(".scrolling-container"),
        Target::CarouselTrack => Query::Selector(".scrolling-images"),
        Target::Promo => Query::Id("flyingPromo"),
        _ => return None,
    };
    Some(query)
}

/// Leading number of a CSS pixel value (`"120px"` → 120). `None` for
/// keywords such as `normal` or `auto`.
#[must_use]
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
        .map_or(value.len(), |(i, _)| i);
    value[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Anchor id of a same-page link (`"#about"` → `about`).
#[must_use]
pub fn anchor_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}
