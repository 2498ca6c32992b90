#![forbid(unsafe_code)]

//! Page configuration.
//!
//! Every section deserializes with `#[serde(default)]`, so a host may pass
//! a partial JSON object and only override what it cares about:
//!
//! ```ignore
//! let config = PageConfig::from_json_str(r#"{"promo": {"interval_ms": 60000}}"#)?;
//! ```
//!
//! Millisecond fields are plain `u64`s with [`Duration`] accessors.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::error::FolioError;

/// Top-level configuration for a [`Page`](crate::page::Page).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub breakpoints: Breakpoints,
    pub reveal: RevealConfig,
    pub parallax: ParallaxConfig,
    pub carousel: CarouselConfig,
    pub promo: PromoConfig,
    pub player: PlayerConfig,
    pub responsive: ResponsiveConfig,
    /// Anchor id carousel image clicks scroll to.
    pub collectables_anchor: String,
    /// Maximum log level the web host installs (`trace` .. `error`).
    pub log_level: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            breakpoints: Breakpoints::default(),
            reveal: RevealConfig::default(),
            parallax: ParallaxConfig::default(),
            carousel: CarouselConfig::default(),
            promo: PromoConfig::default(),
            player: PlayerConfig::default(),
            responsive: ResponsiveConfig::default(),
            collectables_anchor: "collectables".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl PageConfig {
    /// Parse a (possibly partial) JSON configuration and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, FolioError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| FolioError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the controllers cannot honor.
    pub fn validate(&self) -> Result<(), FolioError> {
        let bp = &self.breakpoints;
        if !(bp.narrow > 0.0 && bp.narrow < bp.tablet) {
            return Err(FolioError::InvalidConfig(format!(
                "breakpoints must satisfy 0 < narrow < tablet (got {} / {})",
                bp.narrow, bp.tablet
            )));
        }
        if self.carousel.poll_ms == 0 {
            return Err(FolioError::InvalidConfig(
                "carousel.poll_ms must be positive".into(),
            ));
        }
        if self.promo.interval_ms == 0 {
            return Err(FolioError::InvalidConfig(
                "promo.interval_ms must be positive".into(),
            ));
        }
        if self.promo.links.is_empty() {
            return Err(FolioError::InvalidConfig(
                "promo.links must name at least one destination".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.player.initial_volume) {
            return Err(FolioError::InvalidConfig(format!(
                "player.initial_volume must be within [0, 1] (got {})",
                self.player.initial_volume
            )));
        }
        if catalog::find(&self.player.initial_track).is_none() {
            return Err(FolioError::UnknownTrack(self.player.initial_track.clone()));
        }
        Ok(())
    }
}

/// Width breakpoints in CSS pixels (inclusive upper bounds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    pub narrow: f64,
    pub tablet: f64,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            narrow: 420.0,
            tablet: 768.0,
        }
    }
}

/// Intersection watcher tuning, per viewport class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub narrow_threshold: f64,
    /// Bottom root margin on narrow viewports (negative shrinks the root).
    pub narrow_margin_px: f64,
    pub wide_threshold: f64,
    pub wide_margin_px: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            narrow_threshold: 0.05,
            narrow_margin_px: -20.0,
            wide_threshold: 0.1,
            wide_margin_px: -50.0,
        }
    }
}

/// Header parallax and tilt tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    /// Fraction of viewport height over which the subtitle fades (narrow).
    pub narrow_fade_fraction: f64,
    pub wide_fade_fraction: f64,
    /// Subtitle translation per scrolled pixel.
    pub narrow_subtitle_rate: f64,
    pub wide_subtitle_rate: f64,
    /// Offset up to which the nav sits in its dead zone.
    pub nav_dead_zone_px: f64,
    /// Scrolling up within this distance of the top snaps the nav home.
    pub nav_top_snap_px: f64,
    pub nav_buffer_rate: f64,
    pub nav_buffer_max_px: f64,
    pub nav_lift_rate: f64,
    pub nav_lift_max_px: f64,
    pub narrow_nav_threshold_px: f64,
    pub narrow_nav_lift_px: f64,
    pub tilt_divisor: f64,
    pub tilt_max_deg: f64,
    /// Minimum spacing between animation frames requested by scrolling.
    pub wide_frame_gate_ms: u64,
    pub narrow_frame_gate_ms: u64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            narrow_fade_fraction: 0.2,
            wide_fade_fraction: 0.3,
            narrow_subtitle_rate: 0.1,
            wide_subtitle_rate: 0.3,
            nav_dead_zone_px: 50.0,
            nav_top_snap_px: 20.0,
            nav_buffer_rate: 0.2,
            nav_buffer_max_px: 10.0,
            nav_lift_rate: 0.4,
            nav_lift_max_px: 25.0,
            narrow_nav_threshold_px: 30.0,
            narrow_nav_lift_px: 10.0,
            tilt_divisor: 15.0,
            tilt_max_deg: 15.0,
            wide_frame_gate_ms: 8,
            narrow_frame_gate_ms: 16,
        }
    }
}

impl ParallaxConfig {
    #[must_use]
    pub fn frame_gate(&self, narrow: bool) -> Duration {
        Duration::from_millis(if narrow {
            self.narrow_frame_gate_ms
        } else {
            self.wide_frame_gate_ms
        })
    }
}

/// Carousel watchdog timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub poll_ms: u64,
    pub grace_ms: u64,
    /// Arrow-key scroll step.
    pub key_step_px: f64,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            poll_ms: 500,
            grace_ms: 500,
            key_step_px: 50.0,
        }
    }
}

impl CarouselConfig {
    #[must_use]
    pub const fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    #[must_use]
    pub const fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

/// Flying promo schedule and destinations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromoConfig {
    pub interval_ms: u64,
    pub visible_ms: u64,
    pub click_delay_ms: u64,
    pub fade_ms: u64,
    pub links: Vec<String>,
}

impl Default for PromoConfig {
    fn default() -> Self {
        Self {
            interval_ms: 300_000,
            visible_ms: 5_000,
            click_delay_ms: 300,
            fade_ms: 1_000,
            links: vec![
                "https://www.podowski.net/".to_string(),
                "https://theprophitt.bandcamp.com/".to_string(),
                "https://www.youtube.com/@powdowski".to_string(),
            ],
        }
    }
}

impl PromoConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    #[must_use]
    pub const fn visible(&self) -> Duration {
        Duration::from_millis(self.visible_ms)
    }

    #[must_use]
    pub const fn click_delay(&self) -> Duration {
        Duration::from_millis(self.click_delay_ms)
    }

    #[must_use]
    pub const fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub initial_volume: f64,
    pub initial_track: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_volume: 0.5,
            initial_track: "cyber-dreams".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsiveConfig {
    pub debounce_ms: u64,
}

impl Default for ResponsiveConfig {
    fn default() -> Self {
        Self { debounce_ms: 250 }
    }
}

impl ResponsiveConfig {
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
