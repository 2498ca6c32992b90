#![forbid(unsafe_code)]

//! Modal popup pattern and the image popup built on it.
//!
//! A [`Modal`] is a panel that can be opened and closed. Full-screen popups
//! are shown with `display: block` and lock page scrolling while open;
//! class-presented panels (the settings menu) toggle an `active` class.
//! Opening an open modal or closing a closed one emits nothing.

use crate::effect::{Effect, Target};
use crate::error::FolioError;
use crate::layout::PageLayout;

pub const ACTIVE_CLASS: &str = "active";

/// How a modal's open state is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// `display: block` / `display: none`.
    Display,
    /// Toggle the `active` class.
    ActiveClass,
}

#[derive(Debug, Clone)]
pub struct Modal {
    panel: Target,
    presentation: Presentation,
    locks_scroll: bool,
    open: bool,
}

impl Modal {
    /// Full-screen popup: display-toggled, locks page scrolling.
    #[must_use]
    pub const fn popup(panel: Target) -> Self {
        Self {
            panel,
            presentation: Presentation::Display,
            locks_scroll: true,
            open: false,
        }
    }

    /// Dropdown-style panel: class-toggled, page keeps scrolling.
    #[must_use]
    pub const fn menu(panel: Target) -> Self {
        Self {
            panel,
            presentation: Presentation::ActiveClass,
            locks_scroll: false,
            open: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    #[inline]
    #[must_use]
    pub const fn panel(&self) -> Target {
        self.panel
    }

    /// Returns whether the modal changed state.
    pub fn open(&mut self, effects: &mut Vec<Effect>) -> bool {
        if self.open {
            return false;
        }
        self.open = true;
        self.render(effects);
        true
    }

    /// Returns whether the modal changed state.
    pub fn close(&mut self, effects: &mut Vec<Effect>) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        self.render(effects);
        true
    }

    pub fn toggle(&mut self, effects: &mut Vec<Effect>) {
        if self.open {
            self.close(effects);
        } else {
            self.open(effects);
        }
    }

    /// Close when the click landed on the backdrop itself.
    pub fn on_backdrop_click(&mut self, target: Option<Target>, effects: &mut Vec<Effect>) -> bool {
        target == Some(self.panel) && self.close(effects)
    }

    /// Escape closes the modal only while it is open.
    pub fn on_escape(&mut self, effects: &mut Vec<Effect>) -> bool {
        self.close(effects)
    }

    fn render(&self, effects: &mut Vec<Effect>) {
        match self.presentation {
            Presentation::Display => {
                let display = if self.open { "block" } else { "none" };
                effects.push(Effect::style(self.panel, "display", display));
            }
            Presentation::ActiveClass => {
                effects.push(if self.open {
                    Effect::add_class(self.panel, ACTIVE_CLASS)
                } else {
                    Effect::remove_class(self.panel, ACTIVE_CLASS)
                });
            }
        }
        if self.locks_scroll {
            effects.push(Effect::LockScroll(self.open));
        }
    }
}

// ---------------------------------------------------------------------------
// Image popup
// ---------------------------------------------------------------------------

/// Static image popup opened by either of its trigger images.
#[derive(Debug, Clone)]
pub struct ImagePopup {
    modal: Modal,
}

impl ImagePopup {
    pub fn attach(layout: &PageLayout) -> Result<Self, FolioError> {
        if !layout.image_popup {
            return Err(FolioError::MissingElement("#swordPopup"));
        }
        Ok(Self {
            modal: Modal::popup(Target::ImagePopup),
        })
    }

    /// Route a click. Returns whether the click belonged to this popup.
    pub fn on_click(&mut self, target: Option<Target>, effects: &mut Vec<Effect>) -> bool {
        match target {
            Some(Target::ImageTrigger(_)) => {
                self.modal.open(effects);
                true
            }
            Some(Target::ImagePopupClose) => {
                self.modal.close(effects);
                true
            }
            other => self.modal.on_backdrop_click(other, effects),
        }
    }

    pub fn on_escape(&mut self, effects: &mut Vec<Effect>) -> bool {
        self.modal.on_escape(effects)
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.modal.is_open()
    }
}
