#![forbid(unsafe_code)]

//! Host-to-page event schema.
//!
//! The web host converts DOM events into [`PageEvent`]s. The schema is
//! JSON-friendly (`{"type": "scroll", "y": 120.0}`) so a recorded session
//! can be replayed against a [`Page`](crate::page::Page) in tests.
//!
//! The host does the hit-testing the core cannot: it reports the nearest
//! known [`Target`] of a click and which containers the click landed
//! inside ([`Containment`]).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::effect::{AudioToken, Target};

bitflags! {
    /// Containers a click landed inside (for outside-click dismissal).
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Containment: u8 {
        const SETTINGS_MENU   = 0b0001;
        const SETTINGS_TOGGLE = 0b0010;
        const IMAGE_POPUP     = 0b0100;
        const MUSIC_POPUP     = 0b1000;
    }
}

/// Normalized keyboard key. Only the keys the page reacts to are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    #[serde(other)]
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Self::Escape,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            _ => Self::Other,
        }
    }
}

/// Measured carousel layout, read by the host from computed styles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarouselMetrics {
    pub image_width: f64,
    pub gap: f64,
    /// Total image count, including the duplicated second set.
    pub image_count: usize,
}

impl CarouselMetrics {
    /// Width of one (non-duplicated) image set. `None` until the images have
    /// been laid out with a positive width.
    #[must_use]
    pub fn set_width(&self) -> Option<f64> {
        if self.image_width.is_nan() || self.image_width <= 0.0 || self.image_count < 2 {
            return None;
        }
        let gap = if self.gap.is_finite() { self.gap.max(0.0) } else { 0.0 };
        let width = (self.image_width + gap) * (self.image_count as f64 / 2.0);
        (width > 0.0 && width.is_finite()).then_some(width)
    }
}

/// Vertical placement of an element relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub top: f64,
    pub height: f64,
}

/// Everything the host can tell the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    /// Window scrolled to vertical offset `y`.
    Scroll { y: f64 },
    /// An animation frame requested via `Effect::RequestFrame`.
    AnimationFrame {
        #[serde(default)]
        tilt: Option<ElementRect>,
    },
    Resize { width: f64, height: f64 },
    Click {
        #[serde(default)]
        target: Option<Target>,
        #[serde(default)]
        within: Containment,
    },
    /// Activation of a same-page navigation link.
    AnchorClick { href: String },
    Key {
        key: Key,
        /// Whether focus was inside the carousel container.
        #[serde(default)]
        in_carousel: bool,
    },
    /// The "animations enabled" checkbox changed.
    AnimationToggle { enabled: bool },
    /// Volume slider moved (0..=100).
    VolumeInput { value: f64 },
    CarouselScroll {
        offset: f64,
        #[serde(default)]
        metrics: Option<CarouselMetrics>,
    },
    /// Touch start or move on the carousel container.
    CarouselTouch,
    CarouselWheel { delta_y: f64 },
    TouchStart { target: Target },
    TouchEnd {
        target: Target,
        /// Whether the touched element is a button.
        #[serde(default)]
        button: bool,
    },
    TouchCancel { target: Target },
    Intersection { target: Target, intersecting: bool },
    PlaybackStarted { token: AudioToken },
    PlaybackFailed { token: AudioToken, reason: String },
    PlaybackEnded { token: AudioToken },
    /// The page is being torn down.
    Unload,
}

impl PageEvent {
    #[must_use]
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// What the host should do with the originating DOM event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Call `preventDefault()` on the DOM event.
    pub prevent_default: bool,
}

impl Dispatch {
    pub const PASS: Self = Self {
        prevent_default: false,
    };
    pub const CONSUMED: Self = Self {
        prevent_default: true,
    };

    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            prevent_default: self.prevent_default || other.prevent_default,
        }
    }
}
