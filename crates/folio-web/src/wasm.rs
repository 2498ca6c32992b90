#![forbid(unsafe_code)]

//! Browser binding for [`Page`].
//!
//! One [`Host`] per page. It owns the resolved elements, every registered
//! listener, the audio resources keyed by [`AudioToken`], the intersection
//! observer, the single animation-frame callback and the single `setTimeout`
//! that pumps the page's timer queue.
//!
//! Invariants:
//! - The `Page` borrow is released before any effect is applied, so effects
//!   that synchronously re-enter (`Activate`, audio failures) can dispatch.
//! - At most one timeout is pending; it always targets the page's current
//!   `next_deadline`.
//! - Closures hold only `Weak<Host>`; dropping `FolioPage` frees everything.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use folio_core::event::{CarouselMetrics, Containment, ElementRect, Key};
use folio_core::touch;
use folio_core::{
    AudioCommand, AudioToken, Dispatch, Effect, Page, PageConfig, PageEvent, PageInit, PageLayout,
    Target, Viewport,
};
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlAudioElement, HtmlElement,
    HtmlInputElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    KeyboardEvent, Node, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, WheelEvent,
    Window,
};
use web_time::Instant;

use crate::dom::{self, Family, Query};
use crate::logging;

/// The portfolio page's interaction layer, bound to the current document.
#[wasm_bindgen]
pub struct FolioPage {
    host: Option<Rc<Host>>,
}

#[wasm_bindgen]
impl FolioPage {
    /// Attach to the current document. `options` is an optional plain object
    /// matching `PageConfig` (missing fields take their defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<JsValue>) -> Result<FolioPage, JsValue> {
        let config = parse_options(options)?;
        logging::init(&config.log_level);

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let elements = Elements::discover(&document);
        let layout = elements.layout(&document, &config.collectables_anchor);
        let init = PageInit::new(
            viewport_of(&window),
            window.scroll_y().unwrap_or(0.0),
            random_seed(),
        );
        let origin = Instant::now();
        let page = Page::new(config, layout, init, Duration::ZERO)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let host = Rc::new(Host {
            window,
            document,
            elements,
            page: RefCell::new(page),
            origin,
            audio: RefCell::new(HashMap::new()),
            observer: RefCell::new(None),
            retired_observer: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            pump: RefCell::new(None),
            frame: RefCell::new(None),
            timeout: Cell::new(None),
            frame_pending: Cell::new(false),
        });
        host.install_callbacks();
        host.bind_events();
        host.flush();
        Ok(Self { host: Some(host) })
    }

    /// Feed one JSON-encoded `PageEvent` (recorded-session replay).
    /// Returns whether the event's default action would be prevented.
    #[wasm_bindgen(js_name = dispatchJson)]
    pub fn dispatch_json(&self, json: &str) -> Result<bool, JsValue> {
        let event =
            PageEvent::from_json_str(json).map_err(|err| JsValue::from_str(&err.to_string()))?;
        Ok(self
            .host
            .as_ref()
            .is_some_and(|host| host.dispatch(event).prevent_default))
    }

    /// Tear the page down: stop audio, cancel timers, detach every listener.
    pub fn destroy(&mut self) {
        if let Some(host) = self.host.take() {
            host.teardown();
        }
    }
}

fn parse_options(options: Option<JsValue>) -> Result<PageConfig, JsValue> {
    let Some(options) = options.filter(|o| !o.is_undefined() && !o.is_null()) else {
        return Ok(PageConfig::default());
    };
    let json: String = js_sys::JSON::stringify(&options)?.into();
    PageConfig::from_json_str(&json).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn viewport_of(window: &Window) -> Viewport {
    let dimension = |value: Result<JsValue, JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    };
    Viewport::new(dimension(window.inner_width()), dimension(window.inner_height()))
}

fn random_seed() -> u64 {
    // 53 random bits is all Math.random offers.
    (js_sys::Math::random() * 9_007_199_254_740_992.0) as u64
}

fn describe(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{err:?}")
}

// ---------------------------------------------------------------------------
// Element registry
// ---------------------------------------------------------------------------

/// Every element the page can target, resolved once at startup.
struct Elements {
    by_target: HashMap<Target, Element>,
    counts: HashMap<Family, usize>,
    nav_anchors: Vec<Element>,
}

impl Elements {
    fn discover(document: &Document) -> Self {
        let mut by_target = HashMap::new();
        let mut counts = HashMap::new();

        if let Some(body) = document.body() {
            by_target.insert(Target::Body, Element::from(body));
        }
        for target in dom::SINGLES {
            let found = dom::single(target)
                .and_then(|query| resolve(document, query).into_iter().next());
            if let Some(element) = found {
                by_target.insert(target, element);
            }
        }
        for family in Family::ALL {
            let mut found = resolve(document, family.query());
            if family == Family::Buttons {
                found.retain(|element| !by_target.values().any(|known| known == element));
            }
            counts.insert(family, found.len());
            for (index, element) in found.into_iter().enumerate() {
                by_target.insert(family.target(index), element);
            }
        }
        let nav_anchors = resolve(document, Query::All(dom::NAV_ANCHORS));

        tracing::debug!(
            elements = by_target.len(),
            anchors = nav_anchors.len(),
            "page elements resolved"
        );
        Self {
            by_target,
            counts,
            nav_anchors,
        }
    }

    fn get(&self, target: Target) -> Option<&Element> {
        self.by_target.get(&target)
    }

    fn has(&self, target: Target) -> bool {
        self.by_target.contains_key(&target)
    }

    fn count(&self, family: Family) -> usize {
        self.counts.get(&family).copied().unwrap_or(0)
    }

    /// Registered target of exactly this element (never `Body`).
    fn target_of(&self, element: &Element) -> Option<Target> {
        self.by_target
            .iter()
            .find(|(target, candidate)| **target != Target::Body && *candidate == element)
            .map(|(target, _)| *target)
    }

    fn contains(&self, target: Target, node: Option<&Node>) -> bool {
        node.is_some_and(|node| self.get(target).is_some_and(|el| el.contains(Some(node))))
    }

    /// Nearest registered target of a click plus the containers it landed in.
    ///
    /// A popup backdrop only counts when it is the clicked element itself;
    /// a click on unregistered popup content has no target.
    fn hit(&self, node: Option<Node>) -> (Option<Target>, Containment) {
        let mut within = Containment::empty();
        for (flag, container) in [
            (Containment::SETTINGS_MENU, Target::SettingsMenu),
            (Containment::SETTINGS_TOGGLE, Target::SettingsToggle),
            (Containment::IMAGE_POPUP, Target::ImagePopup),
            (Containment::MUSIC_POPUP, Target::MusicPopup),
        ] {
            if self.contains(container, node.as_ref()) {
                within |= flag;
            }
        }

        let origin = node.and_then(|n| match n.dyn_into::<Element>() {
            Ok(element) => Some(element),
            Err(n) => n.parent_element(),
        });
        let mut current = origin.clone();
        while let Some(element) = current {
            if let Some(target) = self.target_of(&element) {
                let backdrop = matches!(target, Target::ImagePopup | Target::MusicPopup);
                if backdrop && origin.as_ref() != Some(&element) {
                    return (None, within);
                }
                return (Some(target), within);
            }
            current = element.parent_element();
        }
        (None, within)
    }

    fn layout(&self, document: &Document, collectables: &str) -> PageLayout {
        let mut anchors: Vec<String> = self
            .nav_anchors
            .iter()
            .filter_map(|a| a.get_attribute("href"))
            .filter_map(|href| dom::anchor_id(&href).map(str::to_string))
            .filter(|id| document.get_element_by_id(id).is_some())
            .collect();
        if document.get_element_by_id(collectables).is_some()
            && !anchors.iter().any(|a| a == collectables)
        {
            anchors.push(collectables.to_string());
        }

        let song_buttons = (0..self.count(Family::SongButtons))
            .map(|i| {
                self.get(Target::SongButton(i))
                    .and_then(|el| el.get_attribute(dom::SONG_ATTRIBUTE))
                    .unwrap_or_default()
            })
            .collect();

        PageLayout {
            sections: self.count(Family::Sections),
            cards: self.count(Family::Cards),
            headings: self.count(Family::Headings),
            anchors,
            image_triggers: self.count(Family::ImageTriggers),
            image_popup: self.has(Target::ImagePopup),
            image_popup_close: self.has(Target::ImagePopupClose),
            settings_menu: self.has(Target::SettingsMenu),
            settings_toggle: self.has(Target::SettingsToggle),
            animation_toggle: self.has(Target::AnimationToggle),
            floating_layer: self.has(Target::FloatingLayer),
            floating_images: self.count(Family::FloatingImages),
            music_toggle: self.has(Target::MusicToggle),
            music_popup: self.has(Target::MusicPopup),
            music_popup_close: self.has(Target::MusicPopupClose),
            music_popup_content: self.has(Target::MusicPopupContent),
            song_buttons,
            play_pause_button: self.has(Target::PlayPauseButton),
            volume_button: self.has(Target::VolumeButton),
            volume_slider: self.has(Target::VolumeSlider),
            album_cover: self.has(Target::AlbumCover),
            subtitle: self.has(Target::Subtitle),
            nav: self.has(Target::Nav),
            tilt_image: self.has(Target::TiltImage),
            carousel: self.has(Target::Carousel),
            carousel_track: self.has(Target::CarouselTrack),
            carousel_images: self.count(Family::CarouselImages),
            promo: self.has(Target::Promo),
        }
    }
}

fn resolve(document: &Document, query: Query) -> Vec<Element> {
    match query {
        Query::Id(id) => document.get_element_by_id(id).into_iter().collect(),
        Query::Selector(selector) => document
            .query_selector(selector)
            .ok()
            .flatten()
            .into_iter()
            .collect(),
        Query::Ids(ids) => ids
            .iter()
            .filter_map(|id| document.get_element_by_id(id))
            .collect(),
        Query::All(selector) => match document.query_selector_all(selector) {
            Ok(list) => (0..list.length())
                .filter_map(|i| list.get(i))
                .filter_map(|node| node.dyn_into::<Element>().ok())
                .collect(),
            Err(err) => {
                tracing::warn!(selector, error = %describe(&err), "query failed");
                Vec::new()
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// A registered DOM listener; detached explicitly so no callback outlives
/// its closure.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn detach(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

struct AudioSlot {
    element: HtmlAudioElement,
    listeners: Vec<Listener>,
}

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

struct Host {
    window: Window,
    document: Document,
    elements: Elements,
    page: RefCell<Page>,
    origin: Instant,
    audio: RefCell<HashMap<AudioToken, AudioSlot>>,
    observer: RefCell<Option<(IntersectionObserver, ObserverCallback)>>,
    /// The previous observer's callback, kept alive in case the swap happens
    /// inside it.
    retired_observer: RefCell<Option<ObserverCallback>>,
    listeners: RefCell<Vec<Listener>>,
    pump: RefCell<Option<Closure<dyn FnMut()>>>,
    frame: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    timeout: Cell<Option<i32>>,
    frame_pending: Cell<bool>,
}

impl Host {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    // -- page driving -------------------------------------------------------

    fn dispatch(self: &Rc<Self>, event: PageEvent) -> Dispatch {
        let now = self.now();
        let (dispatch, effects) = {
            let mut page = self.page.borrow_mut();
            let dispatch = page.handle(event, now);
            (dispatch, page.take_effects())
        };
        self.apply_all(effects);
        self.reschedule();
        dispatch
    }

    fn flush(self: &Rc<Self>) {
        let effects = self.page.borrow_mut().take_effects();
        self.apply_all(effects);
        self.reschedule();
    }

    fn on_pump(self: &Rc<Self>) {
        self.timeout.set(None);
        let now = self.now();
        let effects = {
            let mut page = self.page.borrow_mut();
            page.tick(now);
            page.take_effects()
        };
        self.apply_all(effects);
        self.reschedule();
    }

    /// Point the single timeout at the page's next deadline.
    fn reschedule(&self) {
        if let Some(handle) = self.timeout.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        let Some(deadline) = self.page.borrow().next_deadline() else {
            return;
        };
        let delay = deadline.saturating_sub(self.now());
        let delay_ms = i32::try_from(delay.as_micros().div_ceil(1000)).unwrap_or(i32::MAX);
        let pump = self.pump.borrow();
        let Some(callback) = pump.as_ref() else {
            return;
        };
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay_ms,
            ) {
            Ok(handle) => self.timeout.set(Some(handle)),
            Err(err) => tracing::warn!(error = %describe(&err), "cannot schedule timer pump"),
        }
    }

    fn request_frame(&self) {
        if self.frame_pending.replace(true) {
            return;
        }
        let frame = self.frame.borrow();
        let Some(callback) = frame.as_ref() else {
            return;
        };
        if let Err(err) = self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            self.frame_pending.set(false);
            tracing::warn!(error = %describe(&err), "animation frame refused");
        }
    }

    fn on_frame(self: &Rc<Self>) {
        self.frame_pending.set(false);
        let tilt = self.elements.get(Target::TiltImage).map(|el| {
            let rect = el.get_bounding_client_rect();
            ElementRect {
                top: rect.top(),
                height: rect.height(),
            }
        });
        self.dispatch(PageEvent::AnimationFrame { tilt });
    }

    fn teardown(self: &Rc<Self>) {
        self.dispatch(PageEvent::Unload);
        for listener in self.listeners.borrow_mut().drain(..) {
            listener.detach();
        }
        for (_, slot) in self.audio.borrow_mut().drain() {
            release(&slot);
        }
        if let Some((observer, _)) = self.observer.borrow_mut().take() {
            observer.disconnect();
        }
        if let Some(handle) = self.timeout.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        tracing::info!("page host torn down");
    }

    // -- callbacks ----------------------------------------------------------

    fn install_callbacks(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        *self.pump.borrow_mut() = Some(Closure::<dyn FnMut()>::new(move || {
            if let Some(host) = weak.upgrade() {
                host.on_pump();
            }
        }));
        let weak = Rc::downgrade(self);
        *self.frame.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |_: f64| {
            if let Some(host) = weak.upgrade() {
                host.on_frame();
            }
        }));
    }

    fn listener(
        self: &Rc<Self>,
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl Fn(&Rc<Host>, Event) + 'static,
    ) -> Option<Listener> {
        let weak = Rc::downgrade(self);
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(host) = weak.upgrade() {
                handler(&host, event);
            }
        });
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        match target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        ) {
            Ok(()) => Some(Listener {
                target: target.clone(),
                kind,
                callback,
            }),
            Err(err) => {
                tracing::warn!(kind, error = %describe(&err), "listener not attached");
                None
            }
        }
    }

    fn listen(
        self: &Rc<Self>,
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl Fn(&Rc<Host>, Event) + 'static,
    ) {
        if let Some(listener) = self.listener(target, kind, passive, handler) {
            self.listeners.borrow_mut().push(listener);
        }
    }

    fn bind_events(self: &Rc<Self>) {
        let window: &EventTarget = self.window.as_ref();
        let document: &EventTarget = self.document.as_ref();

        self.listen(window, "scroll", true, |host, _| {
            let y = host.window.scroll_y().unwrap_or(0.0);
            host.dispatch(PageEvent::Scroll { y });
        });
        self.listen(window, "resize", true, |host, _| {
            let viewport = viewport_of(&host.window);
            host.dispatch(PageEvent::Resize {
                width: viewport.width,
                height: viewport.height,
            });
        });
        self.listen(window, "pagehide", true, |host, _| {
            host.dispatch(PageEvent::Unload);
        });

        self.listen(document, "click", false, |host, event| {
            let node = event.target().and_then(|t| t.dyn_into::<Node>().ok());
            let (target, within) = host.elements.hit(node);
            if host.dispatch(PageEvent::Click { target, within }).prevent_default {
                event.prevent_default();
            }
        });
        self.listen(document, "keydown", false, |host, event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                return;
            };
            let node = event.target().and_then(|t| t.dyn_into::<Node>().ok());
            let in_carousel = host.elements.contains(Target::Carousel, node.as_ref());
            let key = Key::from_dom(&key);
            if host.dispatch(PageEvent::Key { key, in_carousel }).prevent_default {
                event.prevent_default();
            }
        });

        for anchor in &self.elements.nav_anchors {
            let link = anchor.clone();
            self.listen(anchor.as_ref(), "click", false, move |host, event| {
                let Some(href) = link.get_attribute("href") else {
                    return;
                };
                if host.dispatch(PageEvent::AnchorClick { href }).prevent_default {
                    event.prevent_default();
                }
            });
        }

        self.bind_controls();
        self.bind_carousel();
        self.bind_touch();
    }

    fn bind_controls(self: &Rc<Self>) {
        if let Some(toggle) = self.elements.get(Target::AnimationToggle) {
            self.listen(toggle.as_ref(), "change", true, |host, event| {
                let enabled = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    .is_some_and(|input| input.checked());
                host.dispatch(PageEvent::AnimationToggle { enabled });
            });
        }
        if let Some(slider) = self.elements.get(Target::VolumeSlider) {
            self.listen(slider.as_ref(), "input", true, |host, event| {
                let Some(input) = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                else {
                    return;
                };
                host.dispatch(PageEvent::VolumeInput {
                    value: input.value_as_number(),
                });
            });
        }
    }

    fn bind_carousel(self: &Rc<Self>) {
        let Some(container) = self.elements.get(Target::Carousel) else {
            return;
        };
        let target: &EventTarget = container.as_ref();

        self.listen(target, "scroll", true, |host, _| {
            let offset = host.scroll_left(Target::Carousel);
            let metrics = host.carousel_metrics();
            host.dispatch(PageEvent::CarouselScroll { offset, metrics });
        });
        for kind in ["touchstart", "touchmove"] {
            self.listen(target, kind, true, |host, _| {
                host.dispatch(PageEvent::CarouselTouch);
            });
        }
        self.listen(target, "wheel", false, |host, event| {
            let Some(delta_y) = event.dyn_ref::<WheelEvent>().map(WheelEvent::delta_y) else {
                return;
            };
            if host.dispatch(PageEvent::CarouselWheel { delta_y }).prevent_default {
                event.prevent_default();
            }
        });
    }

    /// Press feedback on interactive targets; touch-end activation on every
    /// element matching [`dom::BUTTONS`].
    fn bind_touch(self: &Rc<Self>) {
        let bound: Vec<(Target, Element, bool)> = self
            .elements
            .by_target
            .iter()
            .filter(|(target, _)| **target != Target::Body)
            .filter_map(|(target, element)| {
                let button = element.matches(dom::BUTTONS).unwrap_or(false);
                (button || touch::is_interactive(*target))
                    .then(|| (*target, element.clone(), button))
            })
            .collect();
        tracing::debug!(elements = bound.len(), "touch listeners bound");

        for (target, element, button) in bound {
            let events: &EventTarget = element.as_ref();
            if touch::is_interactive(target) {
                self.listen(events, "touchstart", true, move |host, _| {
                    host.dispatch(PageEvent::TouchStart { target });
                });
                self.listen(events, "touchcancel", true, move |host, _| {
                    host.dispatch(PageEvent::TouchCancel { target });
                });
            }
            self.listen(events, "touchend", false, move |host, event| {
                if host.dispatch(PageEvent::TouchEnd { target, button }).prevent_default {
                    event.prevent_default();
                }
            });
        }
    }

    // -- measurements -------------------------------------------------------

    fn scroll_left(&self, target: Target) -> f64 {
        self.elements
            .get(target)
            .and_then(|el| Reflect::get(el, &JsValue::from_str("scrollLeft")).ok())
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn computed_px(&self, element: &Element, property: &str) -> Option<f64> {
        let style = self.window.get_computed_style(element).ok().flatten()?;
        dom::parse_px(&style.get_property_value(property).ok()?)
    }

    fn carousel_metrics(&self) -> Option<CarouselMetrics> {
        let image = self.elements.get(Target::CarouselImage(0))?;
        let track = self.elements.get(Target::CarouselTrack)?;
        Some(CarouselMetrics {
            image_width: self.computed_px(image, "width")?,
            gap: self.computed_px(track, "column-gap").unwrap_or(0.0),
            image_count: self.elements.count(Family::CarouselImages),
        })
    }

    // -- effects ------------------------------------------------------------

    fn apply_all(self: &Rc<Self>, effects: Vec<Effect>) {
        for effect in effects {
            self.apply(effect);
        }
    }

    fn element(&self, target: Target) -> Option<&Element> {
        let element = self.elements.get(target);
        if element.is_none() {
            tracing::trace!(element = ?target, "effect target not on page");
        }
        element
    }

    fn html(&self, target: Target) -> Option<&HtmlElement> {
        self.element(target)
            .and_then(|el| el.dyn_ref::<HtmlElement>())
    }

    fn apply(self: &Rc<Self>, effect: Effect) {
        let result = match effect {
            Effect::AddClass { target, class } => self
                .element(target)
                .map_or(Ok(()), |el| el.class_list().add_1(class)),
            Effect::RemoveClass { target, class } => self
                .element(target)
                .map_or(Ok(()), |el| el.class_list().remove_1(class)),
            Effect::SetStyle {
                target,
                property,
                value,
            } => self
                .html(target)
                .map_or(Ok(()), |el| el.style().set_property(property, &value)),
            Effect::ClearStyle { target, property } => self
                .html(target)
                .map_or(Ok(()), |el| el.style().remove_property(property).map(drop)),
            Effect::SetText { target, text } => {
                if let Some(el) = self.element(target) {
                    el.set_text_content(Some(&text));
                }
                Ok(())
            }
            Effect::SetAttribute {
                target,
                name,
                value,
            } => self
                .element(target)
                .map_or(Ok(()), |el| el.set_attribute(name, &value)),
            Effect::SetValue { target, value } => {
                if let Some(input) = self
                    .element(target)
                    .and_then(|el| el.dyn_ref::<HtmlInputElement>())
                {
                    input.set_value(&value.to_string());
                }
                Ok(())
            }
            Effect::LockScroll(lock) => self.html(Target::Body).map_or(Ok(()), |body| {
                body.style()
                    .set_property("overflow", if lock { "hidden" } else { "auto" })
            }),
            Effect::ConfigureReveal {
                threshold,
                root_margin,
            } => {
                self.configure_reveal(threshold, &root_margin);
                Ok(())
            }
            Effect::ScrollIntoView { anchor } => {
                if let Some(section) = self.document.get_element_by_id(&anchor) {
                    let options = ScrollIntoViewOptions::new();
                    options.set_behavior(ScrollBehavior::Smooth);
                    options.set_block(ScrollLogicalPosition::Start);
                    section.scroll_into_view_with_scroll_into_view_options(&options);
                }
                Ok(())
            }
            Effect::ScrollBy { target, dx } => {
                if let Some(el) = self.element(target) {
                    el.scroll_by_with_x_and_y(dx, 0.0);
                }
                Ok(())
            }
            Effect::SetScrollLeft { target, offset } => self.element(target).map_or(Ok(()), |el| {
                Reflect::set(el, &JsValue::from_str("scrollLeft"), &JsValue::from_f64(offset))
                    .map(drop)
            }),
            Effect::RequestFrame => {
                self.request_frame();
                Ok(())
            }
            Effect::Activate(target) => {
                if let Some(el) = self.html(target) {
                    el.click();
                }
                Ok(())
            }
            Effect::OpenUrl(url) => self
                .window
                .open_with_url_and_target(&url, "_blank")
                .map(drop),
            Effect::Audio(command) => {
                self.audio_command(command);
                Ok(())
            }
        };
        if let Err(err) = result {
            tracing::warn!(error = %describe(&err), "effect failed");
        }
    }

    fn configure_reveal(self: &Rc<Self>, threshold: f64, root_margin: &str) {
        if let Some((observer, callback)) = self.observer.borrow_mut().take() {
            observer.disconnect();
            *self.retired_observer.borrow_mut() = Some(callback);
        }

        let weak = Rc::downgrade(self);
        let callback: ObserverCallback =
            Closure::new(move |entries: Array, _observer: IntersectionObserver| {
                let Some(host) = weak.upgrade() else {
                    return;
                };
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    if let Some(target) = host.elements.target_of(&entry.target()) {
                        host.dispatch(PageEvent::Intersection {
                            target,
                            intersecting: entry.is_intersecting(),
                        });
                    }
                }
            });

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(threshold));
        init.set_root_margin(root_margin);
        let callback_fn: &Function = callback.as_ref().unchecked_ref();
        match IntersectionObserver::new_with_options(callback_fn, &init) {
            Ok(observer) => {
                for family in [Family::Sections, Family::Cards, Family::Headings] {
                    for i in 0..self.elements.count(family) {
                        if let Some(el) = self.elements.get(family.target(i)) {
                            observer.observe(el);
                        }
                    }
                }
                tracing::debug!(threshold, root_margin, "reveal observer configured");
                *self.observer.borrow_mut() = Some((observer, callback));
            }
            Err(err) => tracing::warn!(error = %describe(&err), "reveal observer unavailable"),
        }
    }

    // -- audio --------------------------------------------------------------

    fn audio_command(self: &Rc<Self>, command: AudioCommand) {
        match command {
            AudioCommand::Load { token, src, volume } => match HtmlAudioElement::new_with_src(src) {
                Ok(element) => {
                    element.set_volume(volume);
                    let events: &EventTarget = element.as_ref();
                    let listeners = [
                        self.listener(events, "ended", true, move |host, _| {
                            host.dispatch(PageEvent::PlaybackEnded { token });
                        }),
                        self.listener(events, "error", true, move |host, _| {
                            host.dispatch(PageEvent::PlaybackFailed {
                                token,
                                reason: "media error".to_string(),
                            });
                        }),
                    ]
                    .into_iter()
                    .flatten()
                    .collect();
                    self.audio
                        .borrow_mut()
                        .insert(token, AudioSlot { element, listeners });
                }
                Err(err) => {
                    self.dispatch(PageEvent::PlaybackFailed {
                        token,
                        reason: describe(&err),
                    });
                }
            },
            AudioCommand::Play(token) => {
                let Some(started) = self.audio.borrow().get(&token).map(|s| s.element.play()) else {
                    return;
                };
                match started {
                    Ok(promise) => {
                        let weak = Rc::downgrade(self);
                        spawn_local(async move {
                            let outcome = JsFuture::from(promise).await;
                            let Some(host) = weak.upgrade() else {
                                return;
                            };
                            let event = match outcome {
                                Ok(_) => PageEvent::PlaybackStarted { token },
                                Err(err) => PageEvent::PlaybackFailed {
                                    token,
                                    reason: describe(&err),
                                },
                            };
                            host.dispatch(event);
                        });
                    }
                    Err(err) => {
                        self.dispatch(PageEvent::PlaybackFailed {
                            token,
                            reason: describe(&err),
                        });
                    }
                }
            }
            AudioCommand::Pause(token) => {
                if let Some(slot) = self.audio.borrow().get(&token) {
                    let _ = slot.element.pause();
                }
            }
            AudioCommand::Stop(token) => {
                if let Some(slot) = self.audio.borrow().get(&token) {
                    let _ = slot.element.pause();
                    slot.element.set_current_time(0.0);
                }
            }
            AudioCommand::Release(token) => {
                let slot = self.audio.borrow_mut().remove(&token);
                if let Some(slot) = slot {
                    release(&slot);
                }
            }
            AudioCommand::SetVolume { token, volume } => {
                if let Some(slot) = self.audio.borrow().get(&token) {
                    slot.element.set_volume(volume);
                }
            }
        }
    }
}

fn release(slot: &AudioSlot) {
    for listener in &slot.listeners {
        listener.detach();
    }
    let _ = slot.element.pause();
    let _ = slot.element.remove_attribute("src");
}
