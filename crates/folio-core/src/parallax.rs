#![forbid(unsafe_code)]

//! Header parallax and the scroll-linked tilt image.
//!
//! Each frame maps the scroll offset to three header values:
//!
//! - subtitle opacity, fading linearly to 0 over a fraction of the viewport
//!   height (0.2 on narrow viewports, 0.3 otherwise);
//! - subtitle upward translation proportional to the offset;
//! - nav translation. Wide: a small downward buffer inside a 50px dead
//!   zone (snapping home when scrolling up near the top), then a capped
//!   upward lift. Narrow: a flat lift past 30px.
//!
//! # Invariants
//!
//! - Nav translation is 0 at offset 0.
//! - Wide nav translation stays within `[-nav_lift_max_px, nav_buffer_max_px]`.
//! - Narrow nav translation is either 0 or `-narrow_nav_lift_px`.
//! - Subtitle opacity stays within `[0, 1]`.

use crate::config::ParallaxConfig;
use crate::effect::{Effect, Target};
use crate::error::FolioError;
use crate::event::ElementRect;
use crate::layout::PageLayout;
use crate::viewport::ViewportClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Header values for one scroll offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxFrame {
    pub direction: ScrollDirection,
    pub subtitle_opacity: f64,
    /// Upward subtitle shift in px (rendered as `translateY(-shift)`).
    pub subtitle_shift: f64,
    /// Signed nav translation in px.
    pub nav_offset: f64,
}

impl ParallaxFrame {
    /// Pure mapping from scroll state to header values.
    #[must_use]
    pub fn compute(
        config: &ParallaxConfig,
        class: ViewportClass,
        viewport_height: f64,
        y: f64,
        direction: ScrollDirection,
    ) -> Self {
        let narrow = class.is_narrow();
        let y = y.max(0.0);

        let fraction = if narrow {
            config.narrow_fade_fraction
        } else {
            config.wide_fade_fraction
        };
        let fade_distance = viewport_height * fraction;
        let subtitle_opacity = if fade_distance > 0.0 {
            (1.0 - y / fade_distance).clamp(0.0, 1.0)
        } else if y > 0.0 {
            0.0
        } else {
            1.0
        };

        let rate = if narrow {
            config.narrow_subtitle_rate
        } else {
            config.wide_subtitle_rate
        };

        let nav_offset = if narrow {
            if y > config.narrow_nav_threshold_px {
                -config.narrow_nav_lift_px
            } else {
                0.0
            }
        } else if y <= config.nav_dead_zone_px {
            if direction == ScrollDirection::Up && y < config.nav_top_snap_px {
                0.0
            } else {
                (y * config.nav_buffer_rate).min(config.nav_buffer_max_px)
            }
        } else {
            -(y * config.nav_lift_rate).min(config.nav_lift_max_px)
        };

        Self {
            direction,
            subtitle_opacity,
            subtitle_shift: y * rate,
            nav_offset,
        }
    }
}

/// Rotation of the tilt image for its current rect, in degrees.
#[must_use]
pub fn tilt_degrees(rect: ElementRect, viewport_height: f64, config: &ParallaxConfig) -> f64 {
    if config.tilt_divisor == 0.0 {
        return 0.0;
    }
    let offset = rect.top + rect.height / 2.0 - viewport_height / 2.0;
    (offset / config.tilt_divisor).clamp(-config.tilt_max_deg, config.tilt_max_deg)
}

/// Owns the scroll history the parallax frames depend on.
#[derive(Debug, Clone)]
pub struct HeaderParallax {
    config: ParallaxConfig,
    class: ViewportClass,
    viewport_height: f64,
    last_y: f64,
    last_frame: Option<ParallaxFrame>,
}

impl HeaderParallax {
    /// Attach and render the initial state for offset `y`.
    pub fn attach(
        layout: &PageLayout,
        class: ViewportClass,
        viewport_height: f64,
        y: f64,
        config: &ParallaxConfig,
        effects: &mut Vec<Effect>,
    ) -> Result<Self, FolioError> {
        if !layout.subtitle {
            return Err(FolioError::MissingElement(".subTitle"));
        }
        if !layout.nav {
            return Err(FolioError::MissingElement("nav"));
        }
        let mut parallax = Self {
            config: config.clone(),
            class,
            viewport_height,
            last_y: 0.0,
            last_frame: None,
        };
        parallax.on_frame(y, effects);
        Ok(parallax)
    }

    /// Swap thresholds for a new viewport and re-render from a fresh scroll
    /// history, as a newly created controller would.
    pub fn reconfigure(
        &mut self,
        class: ViewportClass,
        viewport_height: f64,
        effects: &mut Vec<Effect>,
    ) {
        self.class = class;
        self.viewport_height = viewport_height;
        let y = self.last_y;
        self.last_y = 0.0;
        self.on_frame(y, effects);
    }

    /// Render the header for scroll offset `y`.
    pub fn on_frame(&mut self, y: f64, effects: &mut Vec<Effect>) -> ParallaxFrame {
        let direction = if y > self.last_y {
            ScrollDirection::Down
        } else {
            ScrollDirection::Up
        };
        self.last_y = y;

        let frame =
            ParallaxFrame::compute(&self.config, self.class, self.viewport_height, y, direction);
        tracing::trace!(
            y,
            opacity = frame.subtitle_opacity,
            nav = frame.nav_offset,
            "parallax frame"
        );

        effects.push(Effect::style(
            Target::Subtitle,
            "opacity",
            frame.subtitle_opacity.to_string(),
        ));
        effects.push(Effect::style(
            Target::Subtitle,
            "transform",
            format!("translateY(-{}px)", frame.subtitle_shift),
        ));
        effects.push(Effect::style(
            Target::Nav,
            "transform",
            format!("translateY({}px)", frame.nav_offset),
        ));
        self.last_frame = Some(frame);
        frame
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<ParallaxFrame> {
        self.last_frame
    }

    #[must_use]
    pub fn class(&self) -> ViewportClass {
        self.class
    }
}
