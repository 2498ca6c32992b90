#![forbid(unsafe_code)]

//! Host-reported page structure.
//!
//! The host queries the markup once at startup and reports which elements
//! exist. Controllers attach only when everything they need is present.

use serde::{Deserialize, Serialize};

use crate::catalog::CATALOG;

/// Presence and counts of every element family the controllers use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub sections: usize,
    pub cards: usize,
    pub headings: usize,
    /// Ids of in-page anchor targets (without the leading `#`).
    pub anchors: Vec<String>,

    pub image_triggers: usize,
    pub image_popup: bool,
    pub image_popup_close: bool,

    pub settings_menu: bool,
    pub settings_toggle: bool,
    pub animation_toggle: bool,
    pub floating_layer: bool,
    pub floating_images: usize,

    pub music_toggle: bool,
    pub music_popup: bool,
    pub music_popup_close: bool,
    pub music_popup_content: bool,
    /// `data-song` id of every song button, in document order.
    pub song_buttons: Vec<String>,
    pub play_pause_button: bool,
    pub volume_button: bool,
    pub volume_slider: bool,
    pub album_cover: bool,

    pub subtitle: bool,
    pub nav: bool,
    pub tilt_image: bool,

    pub carousel: bool,
    pub carousel_track: bool,
    pub carousel_images: usize,

    pub promo: bool,
}

impl PageLayout {
    /// Layout of the reference page markup: every element present.
    #[must_use]
    pub fn reference_page() -> Self {
        Self {
            sections: 6,
            cards: 8,
            headings: 5,
            anchors: ["home", "about", "collectables", "music", "contact"]
                .into_iter()
                .map(String::from)
                .collect(),
            image_triggers: 2,
            image_popup: true,
            image_popup_close: true,
            settings_menu: true,
            settings_toggle: true,
            animation_toggle: true,
            floating_layer: true,
            floating_images: 4,
            music_toggle: true,
            music_popup: true,
            music_popup_close: true,
            music_popup_content: true,
            song_buttons: CATALOG.iter().map(|track| track.id.to_string()).collect(),
            play_pause_button: true,
            volume_button: true,
            volume_slider: true,
            album_cover: true,
            subtitle: true,
            nav: true,
            tilt_image: true,
            carousel: true,
            carousel_track: true,
            carousel_images: 12,
            promo: true,
        }
    }

    /// Index of the song button bound to `track_id`.
    #[must_use]
    pub fn song_button_index(&self, track_id: &str) -> Option<usize> {
        self.song_buttons.iter().position(|id| id == track_id)
    }
}
