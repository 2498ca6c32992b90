#![forbid(unsafe_code)]

//! Deterministic interaction controllers for the folio portfolio page.
//!
//! Every piece of page behavior (reveal animations, header parallax, modal
//! popups, the music player, the carousel, the flying promo) is an owned
//! state machine. The embedding host:
//!
//! 1. builds a [`Page`](page::Page) from a [`PageConfig`](config::PageConfig)
//!    and the [`PageLayout`](layout::PageLayout) it discovered,
//! 2. pushes [`PageEvent`](event::PageEvent)s stamped with a monotonic time,
//! 3. calls [`Page::tick`](page::Page::tick) once
//!    [`Page::next_deadline`](page::Page::next_deadline) elapses, and
//! 4. applies the drained [`Effect`](effect::Effect)s to the DOM.
//!
//! The crate never blocks, spawns threads or reads a wall clock, so it runs
//! unchanged on `wasm32-unknown-unknown` and under simulated time in tests.

pub mod carousel;
pub mod catalog;
pub mod config;
pub mod ctx;
pub mod effect;
pub mod error;
pub mod event;
pub mod layout;
pub mod modal;
pub mod navigate;
pub mod page;
pub mod parallax;
pub mod player;
pub mod promo;
pub mod responsive;
pub mod reveal;
pub mod settings;
pub mod timer;
pub mod touch;
pub mod viewport;

pub use config::PageConfig;
pub use effect::{AudioCommand, AudioToken, Effect, Target};
pub use error::FolioError;
pub use event::{Dispatch, PageEvent};
pub use layout::PageLayout;
pub use page::{Page, PageInit};
pub use viewport::{Viewport, ViewportClass};
