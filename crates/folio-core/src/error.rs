#![forbid(unsafe_code)]

//! Error type shared by every controller.
//!
//! None of these errors is fatal to the page. A controller that fails to
//! attach is skipped, and playback failures are logged while the UI carries
//! on in demo mode.

use crate::effect::AudioToken;

/// Errors surfaced by page controllers.
#[derive(Debug, Clone, PartialEq)]
pub enum FolioError {
    /// An element a controller needs is absent from the page.
    MissingElement(&'static str),
    /// A song button references an id that is not in the catalog.
    UnknownTrack(String),
    /// Configuration failed to parse or is internally inconsistent.
    InvalidConfig(String),
    /// The host could not load or start an audio resource.
    Playback {
        /// Resource the failure belongs to.
        token: AudioToken,
        /// Host-provided reason (DOM exception name, media error code, ...).
        reason: String,
    },
}

impl core::fmt::Display for FolioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingElement(what) => write!(f, "missing element: {what}"),
            Self::UnknownTrack(id) => write!(f, "unknown track: {id}"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Playback { token, reason } => {
                write!(f, "playback failed for resource {}: {reason}", token.0)
            }
        }
    }
}

impl std::error::Error for FolioError {}
