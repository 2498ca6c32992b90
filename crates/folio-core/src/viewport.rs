#![forbid(unsafe_code)]

//! Viewport geometry and breakpoint classification.

use serde::{Deserialize, Serialize};

use crate::config::Breakpoints;

/// Inner size of the browser window in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Classify this viewport against the configured breakpoints.
    ///
    /// Both breakpoints are inclusive upper bounds: a width of exactly
    /// `narrow` is [`ViewportClass::Narrow`].
    #[must_use]
    pub fn classify(&self, breakpoints: &Breakpoints) -> ViewportClass {
        if self.width <= breakpoints.narrow {
            ViewportClass::Narrow
        } else if self.width <= breakpoints.tablet {
            ViewportClass::Tablet
        } else {
            ViewportClass::Wide
        }
    }

    /// Whether the flying promo may appear at this width.
    #[must_use]
    pub fn allows_promo(&self, breakpoints: &Breakpoints) -> bool {
        self.width > breakpoints.tablet
    }
}

/// Breakpoint bucket a viewport falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportClass {
    /// Phone-sized, `width <= narrow`.
    Narrow,
    /// `narrow < width <= tablet`.
    Tablet,
    /// Everything wider.
    Wide,
}

impl ViewportClass {
    #[inline]
    #[must_use]
    pub const fn is_narrow(self) -> bool {
        matches!(self, Self::Narrow)
    }
}
