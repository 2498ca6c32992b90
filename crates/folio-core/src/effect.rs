#![forbid(unsafe_code)]

//! Host-applied instructions emitted by the controllers.
//!
//! Controllers never touch the DOM. They push [`Effect`] values naming a
//! [`Target`]; the host resolves the target to an element and applies the
//! change. Indexed targets (`Section(i)`, `SongButton(i)`, ...) refer to the
//! i-th element of that family in document order, matching the counts the
//! host reported in [`PageLayout`](crate::layout::PageLayout).

use serde::{Deserialize, Serialize};

/// An element (or element family member) the page knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum Target {
    Body,
    Nav,
    Subtitle,
    TiltImage,
    Section(usize),
    Card(usize),
    Heading(usize),
    ImageTrigger(usize),
    ImagePopup,
    ImagePopupClose,
    SettingsToggle,
    SettingsMenu,
    AnimationToggle,
    FloatingLayer,
    FloatingImage(usize),
    MusicToggle,
    MusicPopup,
    MusicPopupContent,
    MusicPopupClose,
    SongButton(usize),
    PlayPauseButton,
    VolumeButton,
    VolumeSlider,
    Genre,
    SongTitle,
    Description,
    DescriptionDupe,
    AlbumCover,
    Carousel,
    CarouselTrack,
    CarouselImage(usize),
    Promo,
    /// A button with no other role on the page, in document order.
    Button(usize),
}

/// Handle to one host-owned audio resource.
///
/// Tokens are never reused within a page session, so events for a released
/// resource can be recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioToken(pub u64);

/// Instructions for the host's audio resources.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    /// Create a resource bound to `src` at `volume` (0..=1).
    Load {
        token: AudioToken,
        src: &'static str,
        volume: f64,
    },
    /// Start or resume playback. The host reports the outcome with
    /// `PlaybackStarted` / `PlaybackFailed`.
    Play(AudioToken),
    Pause(AudioToken),
    /// Pause and rewind to the start.
    Stop(AudioToken),
    /// Drop the resource; no further events are expected for it.
    Release(AudioToken),
    SetVolume { token: AudioToken, volume: f64 },
}

/// A single change the host applies to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AddClass {
        target: Target,
        class: &'static str,
    },
    RemoveClass {
        target: Target,
        class: &'static str,
    },
    SetStyle {
        target: Target,
        property: &'static str,
        value: String,
    },
    ClearStyle {
        target: Target,
        property: &'static str,
    },
    SetText {
        target: Target,
        text: String,
    },
    SetAttribute {
        target: Target,
        name: &'static str,
        value: String,
    },
    /// Set the value of a range input.
    SetValue {
        target: Target,
        value: f64,
    },
    /// Lock (`overflow: hidden`) or restore page scrolling.
    LockScroll(bool),
    /// (Re)create the reveal intersection watcher over every tagged element.
    ConfigureReveal {
        threshold: f64,
        root_margin: String,
    },
    /// Smoothly scroll the element with this id to the top of the viewport.
    ScrollIntoView {
        anchor: String,
    },
    ScrollBy {
        target: Target,
        dx: f64,
    },
    SetScrollLeft {
        target: Target,
        offset: f64,
    },
    /// Ask for one animation frame (answered with `PageEvent::AnimationFrame`).
    RequestFrame,
    /// Synthesize a click on the target.
    Activate(Target),
    /// Open a URL in a new browsing context.
    OpenUrl(String),
    Audio(AudioCommand),
}

impl Effect {
    #[must_use]
    pub fn add_class(target: Target, class: &'static str) -> Self {
        Self::AddClass { target, class }
    }

    #[must_use]
    pub fn remove_class(target: Target, class: &'static str) -> Self {
        Self::RemoveClass { target, class }
    }

    #[must_use]
    pub fn style(target: Target, property: &'static str, value: impl Into<String>) -> Self {
        Self::SetStyle {
            target,
            property,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn clear_style(target: Target, property: &'static str) -> Self {
        Self::ClearStyle { target, property }
    }

    #[must_use]
    pub fn text(target: Target, text: impl Into<String>) -> Self {
        Self::SetText {
            target,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn attribute(target: Target, name: &'static str, value: impl Into<String>) -> Self {
        Self::SetAttribute {
            target,
            name,
            value: value.into(),
        }
    }

    /// The target this effect writes to, if it addresses a single element.
    #[must_use]
    pub fn target(&self) -> Option<Target> {
        match self {
            Self::AddClass { target, .. }
            | Self::RemoveClass { target, .. }
            | Self::SetStyle { target, .. }
            | Self::ClearStyle { target, .. }
            | Self::SetText { target, .. }
            | Self::SetAttribute { target, .. }
            | Self::SetValue { target, .. }
            | Self::ScrollBy { target, .. }
            | Self::SetScrollLeft { target, .. } => Some(*target),
            Self::Activate(target) => Some(*target),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_json_shape() {
        assert_eq!(
            serde_json::to_string(&Target::SongButton(3)).unwrap(),
            r#"{"kind":"song_button","index":3}"#
        );
        assert_eq!(
            serde_json::from_str::<Target>(r#"{"kind":"promo"}"#).unwrap(),
            Target::Promo
        );
    }

    #[test]
    fn effect_target_lookup() {
        assert_eq!(
            Effect::add_class(Target::Promo, "active").target(),
            Some(Target::Promo)
        );
        assert_eq!(Effect::LockScroll(true).target(), None);
    }
}
