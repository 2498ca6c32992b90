#![forbid(unsafe_code)]

//! Debounced viewport tracking.
//!
//! Raw resize events only record the latest viewport and re-arm the
//! debounce timer; the coordinator hands the settled viewport back when the
//! timer fires. The page then reconfigures every viewport-dependent
//! controller inside that single callback.

use crate::config::{Breakpoints, ResponsiveConfig};
use crate::ctx::Ctx;
use crate::effect::{Effect, Target};
use crate::timer::TimerKey;
use crate::viewport::{Viewport, ViewportClass};

#[derive(Debug, Clone)]
pub struct ResponsiveCoordinator {
    config: ResponsiveConfig,
    breakpoints: Breakpoints,
    applied: Viewport,
    pending: Option<Viewport>,
}

impl ResponsiveCoordinator {
    #[must_use]
    pub fn new(config: &ResponsiveConfig, breakpoints: &Breakpoints, viewport: Viewport) -> Self {
        Self {
            config: config.clone(),
            breakpoints: breakpoints.clone(),
            applied: viewport,
            pending: None,
        }
    }

    /// Record a raw resize and (re)start the debounce.
    pub fn on_resize(&mut self, viewport: Viewport, ctx: &mut Ctx<'_>) {
        self.pending = Some(viewport);
        ctx.arm(TimerKey::ResizeDebounce, self.config.debounce());
    }

    /// Debounce expiry. Returns the viewport to apply.
    pub fn on_debounce(&mut self) -> Viewport {
        if let Some(viewport) = self.pending.take() {
            self.applied = viewport;
        }
        tracing::debug!(
            width = self.applied.width,
            height = self.applied.height,
            class = ?self.class(),
            "viewport settled"
        );
        self.applied
    }

    /// The last settled viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.applied
    }

    #[must_use]
    pub fn class(&self) -> ViewportClass {
        self.applied.classify(&self.breakpoints)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Narrow-only layout adjustments that have no controller of their own.
///
/// `music_content` and `nav` say whether those elements exist.
pub fn render_chrome(
    class: ViewportClass,
    music_content: bool,
    nav: bool,
    effects: &mut Vec<Effect>,
) {
    if music_content {
        effects.push(if class.is_narrow() {
            Effect::style(Target::MusicPopupContent, "border-radius", "0")
        } else {
            Effect::clear_style(Target::MusicPopupContent, "border-radius")
        });
    }
    if nav && class.is_narrow() {
        effects.push(Effect::style(Target::Nav, "transform", "translateY(0px)"));
    }
}
