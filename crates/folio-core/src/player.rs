#![forbid(unsafe_code)]

//! Music player popup.
//!
//! The player owns at most one host audio resource, identified by an
//! [`AudioToken`]. Selecting a track stops and releases the previous
//! resource before loading the next one, and host playback events carrying
//! any other token are dropped.
//!
//! # Invariants
//!
//! - At most one resource is live; [`MusicPlayer::active_token`] names it.
//! - The remembered volume survives a mute/unmute round trip exactly.
//! - The slider value and the volume icon always reflect the effective
//!   volume (0 while muted).
//!
//! # Demo mode
//!
//! The transport display switches to "playing" as soon as playback is
//! attempted. A host-reported failure (file missing, autoplay blocked) is
//! logged and the display stays as it is.

use crate::catalog::{self, Track};
use crate::config::PlayerConfig;
use crate::effect::{AudioCommand, AudioToken, Effect, Target};
use crate::error::FolioError;
use crate::layout::PageLayout;
use crate::modal::{ACTIVE_CLASS, Modal};

const PLAY_GLYPH: &str = "▶";
const PAUSE_GLYPH: &str = "⏸";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stopped,
    Playing,
    Paused,
}

/// Volume button icon tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeIcon {
    Muted,
    Low,
    High,
}

impl VolumeIcon {
    /// Tier for an effective volume in `[0, 1]`.
    #[must_use]
    pub fn for_volume(volume: f64) -> Self {
        if volume <= 0.0 {
            Self::Muted
        } else if volume < 0.5 {
            Self::Low
        } else {
            Self::High
        }
    }

    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Muted => "🔇",
            Self::Low => "🔉",
            Self::High => "🔊",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MusicPlayer {
    popup: Modal,
    song_buttons: Vec<String>,
    current: &'static Track,
    transport: Transport,
    muted: bool,
    volume: f64,
    active: Option<AudioToken>,
    next_token: u64,
}

impl MusicPlayer {
    /// Attach and render the initial controls and track display.
    pub fn attach(
        layout: &PageLayout,
        config: &PlayerConfig,
        effects: &mut Vec<Effect>,
    ) -> Result<Self, FolioError> {
        if !layout.music_toggle {
            return Err(FolioError::MissingElement("#musicMenuToggle"));
        }
        if !layout.music_popup {
            return Err(FolioError::MissingElement("#musicPopup"));
        }
        if !layout.music_popup_close {
            return Err(FolioError::MissingElement("#closeMusicPopup"));
        }
        let current = catalog::find(&config.initial_track)
            .ok_or_else(|| FolioError::UnknownTrack(config.initial_track.clone()))?;

        let player = Self {
            popup: Modal::popup(Target::MusicPopup),
            song_buttons: layout.song_buttons.clone(),
            current,
            transport: Transport::Stopped,
            muted: false,
            volume: config.initial_volume.clamp(0.0, 1.0),
            active: None,
            next_token: 1,
        };
        player.render_volume(effects);
        effects.push(Effect::text(Target::PlayPauseButton, PLAY_GLYPH));
        player.render_track(effects);
        Ok(player)
    }

    // -- accessors ------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.popup.is_open()
    }

    #[inline]
    #[must_use]
    pub fn transport(&self) -> Transport {
        self.transport
    }

    #[inline]
    #[must_use]
    pub fn current_track(&self) -> &'static Track {
        self.current
    }

    #[inline]
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Remembered volume in `[0, 1]`, independent of mute.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Volume actually applied to the resource.
    #[must_use]
    pub fn effective_volume(&self) -> f64 {
        if self.muted { 0.0 } else { self.volume }
    }

    #[must_use]
    pub fn volume_icon(&self) -> VolumeIcon {
        VolumeIcon::for_volume(self.effective_volume())
    }

    #[inline]
    #[must_use]
    pub fn active_token(&self) -> Option<AudioToken> {
        self.active
    }

    // -- popup ----------------------------------------------------------------

    /// Show the popup and the current track without starting playback.
    pub fn open_popup(&mut self, effects: &mut Vec<Effect>) {
        if self.popup.open(effects) {
            self.render_track(effects);
        }
    }

    /// Hide the popup and stop (pause and rewind) the active resource.
    pub fn close_popup(&mut self, effects: &mut Vec<Effect>) -> bool {
        let closed = self.popup.close(effects);
        if let Some(token) = self.active {
            effects.push(Effect::Audio(AudioCommand::Stop(token)));
            self.set_transport(Transport::Stopped, effects);
        }
        closed
    }

    pub fn on_escape(&mut self, effects: &mut Vec<Effect>) -> bool {
        self.is_open() && self.close_popup(effects)
    }

    /// Route a click. Returns whether the click belonged to the player.
    pub fn on_click(&mut self, target: Option<Target>, effects: &mut Vec<Effect>) -> bool {
        match target {
            Some(Target::MusicToggle) => self.open_popup(effects),
            Some(Target::MusicPopupClose) => {
                self.close_popup(effects);
            }
            Some(Target::SongButton(index)) => {
                let Some(id) = self.song_buttons.get(index).cloned() else {
                    return true;
                };
                if let Err(err) = self.select_track(&id, effects) {
                    tracing::warn!(error = %err, "song button ignored");
                }
            }
            Some(Target::PlayPauseButton) => self.toggle_play_pause(effects),
            Some(Target::VolumeButton) => self.toggle_mute(effects),
            Some(Target::MusicPopup) if self.is_open() => {
                self.close_popup(effects);
            }
            _ => return false,
        }
        true
    }

    // -- transport ------------------------------------------------------------

    /// Switch to `id` and attempt to play it.
    pub fn select_track(&mut self, id: &str, effects: &mut Vec<Effect>) -> Result<(), FolioError> {
        let track = catalog::find(id).ok_or_else(|| FolioError::UnknownTrack(id.to_string()))?;

        if let Some(old) = self.active.take() {
            effects.push(Effect::Audio(AudioCommand::Stop(old)));
            effects.push(Effect::Audio(AudioCommand::Release(old)));
        }

        self.current = track;
        self.render_track(effects);

        let token = AudioToken(self.next_token);
        self.next_token += 1;
        self.active = Some(token);
        effects.push(Effect::Audio(AudioCommand::Load {
            token,
            src: track.source,
            volume: self.effective_volume(),
        }));
        effects.push(Effect::Audio(AudioCommand::Play(token)));
        self.set_transport(Transport::Playing, effects);

        tracing::debug!(track = %track.id, token = token.0, "track selected");
        Ok(())
    }

    pub fn toggle_play_pause(&mut self, effects: &mut Vec<Effect>) {
        let Some(token) = self.active else {
            let id = self.current.id;
            if let Err(err) = self.select_track(id, effects) {
                tracing::warn!(error = %err, "cannot start current track");
            }
            return;
        };
        if self.transport == Transport::Playing {
            effects.push(Effect::Audio(AudioCommand::Pause(token)));
            self.set_transport(Transport::Paused, effects);
        } else {
            effects.push(Effect::Audio(AudioCommand::Play(token)));
            self.set_transport(Transport::Playing, effects);
        }
    }

    // -- volume ---------------------------------------------------------------

    /// Swap between the remembered volume and silence.
    ///
    /// Works without a loaded resource; the next load picks up the state.
    pub fn toggle_mute(&mut self, effects: &mut Vec<Effect>) {
        self.muted = !self.muted;
        tracing::debug!(muted = self.muted, volume = self.volume, "mute toggled");
        self.apply_volume(effects);
    }

    /// Slider input in `[0, 100]` (clamped).
    pub fn set_volume(&mut self, value: f64, effects: &mut Vec<Effect>) {
        let value = if value.is_nan() { 0.0 } else { value };
        self.volume = (value / 100.0).clamp(0.0, 1.0);
        self.apply_volume(effects);
    }

    fn apply_volume(&self, effects: &mut Vec<Effect>) {
        if let Some(token) = self.active {
            effects.push(Effect::Audio(AudioCommand::SetVolume {
                token,
                volume: self.effective_volume(),
            }));
        }
        self.render_volume(effects);
    }

    // -- host playback reports ------------------------------------------------

    pub fn on_playback_started(&mut self, token: AudioToken) {
        if self.active == Some(token) {
            tracing::debug!(track = %self.current.id, "playback started");
        }
    }

    pub fn on_playback_failed(&mut self, token: AudioToken, reason: &str) {
        if self.active != Some(token) {
            return;
        }
        let err = FolioError::Playback {
            token,
            reason: reason.to_string(),
        };
        tracing::warn!(track = %self.current.id, error = %err, "continuing in demo mode");
    }

    pub fn on_playback_ended(&mut self, token: AudioToken, effects: &mut Vec<Effect>) {
        if self.active != Some(token) {
            return;
        }
        tracing::debug!(track = %self.current.id, "playback ended");
        self.set_transport(Transport::Stopped, effects);
    }

    /// Drop the active resource (page teardown).
    pub fn release(&mut self, effects: &mut Vec<Effect>) {
        if let Some(token) = self.active.take() {
            effects.push(Effect::Audio(AudioCommand::Stop(token)));
            effects.push(Effect::Audio(AudioCommand::Release(token)));
        }
        self.transport = Transport::Stopped;
    }

    // -- rendering ------------------------------------------------------------

    fn set_transport(&mut self, transport: Transport, effects: &mut Vec<Effect>) {
        self.transport = transport;
        let glyph = if transport == Transport::Playing {
            PAUSE_GLYPH
        } else {
            PLAY_GLYPH
        };
        effects.push(Effect::text(Target::PlayPauseButton, glyph));
    }

    fn render_volume(&self, effects: &mut Vec<Effect>) {
        effects.push(Effect::SetValue {
            target: Target::VolumeSlider,
            value: self.effective_volume() * 100.0,
        });
        effects.push(Effect::text(Target::VolumeButton, self.volume_icon().glyph()));
    }

    fn render_track(&self, effects: &mut Vec<Effect>) {
        let track = self.current;
        effects.push(Effect::attribute(Target::AlbumCover, "src", track.cover));
        effects.push(Effect::attribute(Target::AlbumCover, "alt", track.cover));
        effects.push(Effect::text(Target::Genre, track.genre));
        effects.push(Effect::text(Target::SongTitle, track.title));
        effects.push(Effect::text(Target::Description, track.description));
        effects.push(Effect::text(Target::DescriptionDupe, track.description));
        for (i, id) in self.song_buttons.iter().enumerate() {
            let target = Target::SongButton(i);
            effects.push(if id == track.id {
                Effect::add_class(target, ACTIVE_CLASS)
            } else {
                Effect::remove_class(target, ACTIVE_CLASS)
            });
        }
    }
}
