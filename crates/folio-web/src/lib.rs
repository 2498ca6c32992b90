#![forbid(unsafe_code)]

//! WASM host for the folio portfolio page.
//!
//! Resolves the page markup, turns DOM events into
//! [`PageEvent`](folio_core::PageEvent)s for a [`folio_core::Page`] and applies
//! the [`Effect`](folio_core::Effect)s it emits through `web-sys`. From
//! JavaScript:
//!
//! ```js
//! import init, { FolioPage } from "./pkg/folio_web.js";
//! await init();
//! const page = new FolioPage({ log_level: "debug" });
//! ```

pub mod dom;
pub mod logging;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::FolioPage;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct FolioPage;

#[cfg(not(target_arch = "wasm32"))]
impl FolioPage {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}
