#![forbid(unsafe_code)]

//! Settings menu and the decorative floating layer it controls.
//!
//! The menu is a class-presented [`Modal`] that also closes on clicks
//! outside both the menu and its toggle. It owns one setting, "animations
//! enabled", which shows or hides the floating layer and sets the
//! animation play state of the layer and of every floating image
//! individually.

use crate::effect::{Effect, Target};
use crate::error::FolioError;
use crate::event::Containment;
use crate::layout::PageLayout;
use crate::modal::Modal;

/// Show or hide the floating layer and set its animation play state.
pub fn render_floating_layer(
    visible: bool,
    running: bool,
    images: usize,
    effects: &mut Vec<Effect>,
) {
    effects.push(Effect::style(
        Target::FloatingLayer,
        "display",
        if visible { "block" } else { "none" },
    ));
    let state = if running { "running" } else { "paused" };
    effects.push(Effect::style(Target::FloatingLayer, "animation-play-state", state));
    for i in 0..images {
        effects.push(Effect::style(
            Target::FloatingImage(i),
            "animation-play-state",
            state,
        ));
    }
}

#[derive(Debug, Clone)]
pub struct SettingsMenu {
    menu: Modal,
    animations_enabled: bool,
    floating_images: usize,
}

impl SettingsMenu {
    /// Attach and apply the initial "animations enabled" state.
    pub fn attach(
        layout: &PageLayout,
        narrow: bool,
        effects: &mut Vec<Effect>,
    ) -> Result<Self, FolioError> {
        if !layout.settings_menu {
            return Err(FolioError::MissingElement("#settingsMenu"));
        }
        if !layout.settings_toggle {
            return Err(FolioError::MissingElement("#settingsMenuToggle"));
        }
        if !layout.animation_toggle {
            return Err(FolioError::MissingElement("#animationToggle"));
        }
        if !layout.floating_layer {
            return Err(FolioError::MissingElement(".flying-elements"));
        }

        let mut menu = Self {
            menu: Modal::menu(Target::SettingsMenu),
            animations_enabled: true,
            floating_images: layout.floating_images,
        };
        effects.push(Effect::attribute(Target::AnimationToggle, "checked", "checked"));
        menu.set_animations_enabled(true, narrow, effects);
        Ok(menu)
    }

    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.menu.is_open()
    }

    #[inline]
    #[must_use]
    pub fn animations_enabled(&self) -> bool {
        self.animations_enabled
    }

    pub fn on_toggle_click(&mut self, effects: &mut Vec<Effect>) {
        self.menu.toggle(effects);
    }

    /// Close on a click outside both the menu and its toggle.
    pub fn on_document_click(&mut self, within: Containment, effects: &mut Vec<Effect>) -> bool {
        if within.intersects(Containment::SETTINGS_MENU | Containment::SETTINGS_TOGGLE) {
            return false;
        }
        self.menu.close(effects)
    }

    pub fn on_escape(&mut self, effects: &mut Vec<Effect>) -> bool {
        self.menu.on_escape(effects)
    }

    pub fn set_animations_enabled(&mut self, enabled: bool, narrow: bool, effects: &mut Vec<Effect>) {
        self.animations_enabled = enabled;
        tracing::debug!(enabled, "floating animations toggled");
        render_floating_layer(enabled && !narrow, enabled, self.floating_images, effects);
    }

    /// Re-render the floating layer for a new viewport class.
    pub fn reconfigure(&self, narrow: bool, effects: &mut Vec<Effect>) {
        let enabled = self.animations_enabled;
        render_floating_layer(enabled && !narrow, enabled, self.floating_images, effects);
    }
}
