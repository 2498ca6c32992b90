#![forbid(unsafe_code)]

//! Bidirectional scroll-reveal animations.
//!
//! At attach time every section but the first, every card and every
//! heading is tagged with an animation class. The host watches the tagged
//! elements with an intersection observer configured by
//! [`Effect::ConfigureReveal`] and reports crossings; the animator toggles
//! the `visible` class both ways, so the animation replays on every entry.

use crate::config::RevealConfig;
use crate::effect::{Effect, Target};
use crate::error::FolioError;
use crate::layout::PageLayout;
use crate::viewport::ViewportClass;

pub const VISIBLE_CLASS: &str = "visible";

/// Animation a tagged element plays when it becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevealClass {
    FadeIn,
    SlideInLeft,
    SlideInRight,
    ScaleIn,
}

impl RevealClass {
    #[must_use]
    pub const fn as_class(self) -> &'static str {
        match self {
            Self::FadeIn => "fade-in",
            Self::SlideInLeft => "slide-in-left",
            Self::SlideInRight => "slide-in-right",
            Self::ScaleIn => "scale-in",
        }
    }
}

/// Intersection watcher parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherConfig {
    pub threshold: f64,
    /// CSS margin string (`top right bottom left`).
    pub root_margin: String,
}

impl WatcherConfig {
    #[must_use]
    pub fn for_class(class: ViewportClass, config: &RevealConfig) -> Self {
        let (threshold, bottom) = if class.is_narrow() {
            (config.narrow_threshold, config.narrow_margin_px)
        } else {
            (config.wide_threshold, config.wide_margin_px)
        };
        Self {
            threshold,
            root_margin: format!("0px 0px {bottom}px 0px"),
        }
    }

    fn effect(&self) -> Effect {
        Effect::ConfigureReveal {
            threshold: self.threshold,
            root_margin: self.root_margin.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct AnimatedElement {
    target: Target,
    class: RevealClass,
    visible: bool,
}

/// Owns the tagged elements and their visibility.
#[derive(Debug, Clone)]
pub struct RevealAnimator {
    config: RevealConfig,
    elements: Vec<AnimatedElement>,
    watcher: WatcherConfig,
}

impl RevealAnimator {
    /// Tag the page's sections, cards and headings and configure the watcher.
    pub fn attach(
        layout: &PageLayout,
        class: ViewportClass,
        config: &RevealConfig,
        effects: &mut Vec<Effect>,
    ) -> Result<Self, FolioError> {
        let sections = (1..layout.sections).map(|i| (Target::Section(i), RevealClass::FadeIn));
        let cards = (0..layout.cards).map(|i| {
            let class = if i % 2 == 0 {
                RevealClass::SlideInLeft
            } else {
                RevealClass::SlideInRight
            };
            (Target::Card(i), class)
        });
        let headings = (0..layout.headings).map(|i| (Target::Heading(i), RevealClass::ScaleIn));

        let elements: Vec<_> = sections
            .chain(cards)
            .chain(headings)
            .map(|(target, class)| AnimatedElement {
                target,
                class,
                visible: false,
            })
            .collect();
        if elements.is_empty() {
            return Err(FolioError::MissingElement("reveal elements"));
        }

        for element in &elements {
            effects.push(Effect::add_class(element.target, element.class.as_class()));
        }

        let watcher = WatcherConfig::for_class(class, config);
        effects.push(watcher.effect());

        Ok(Self {
            config: config.clone(),
            elements,
            watcher,
        })
    }

    /// Re-create the watcher for a new viewport class.
    pub fn reconfigure(&mut self, class: ViewportClass, effects: &mut Vec<Effect>) {
        self.watcher = WatcherConfig::for_class(class, &self.config);
        effects.push(self.watcher.effect());
    }

    /// Apply an intersection change reported by the host.
    pub fn on_intersection(
        &mut self,
        target: Target,
        intersecting: bool,
        effects: &mut Vec<Effect>,
    ) {
        let Some(element) = self.elements.iter_mut().find(|e| e.target == target) else {
            return;
        };
        if element.visible == intersecting {
            return;
        }
        element.visible = intersecting;
        effects.push(if intersecting {
            Effect::add_class(target, VISIBLE_CLASS)
        } else {
            Effect::remove_class(target, VISIBLE_CLASS)
        });
    }

    #[must_use]
    pub fn watcher(&self) -> &WatcherConfig {
        &self.watcher
    }

    #[must_use]
    pub fn is_visible(&self, target: Target) -> Option<bool> {
        self.elements
            .iter()
            .find(|e| e.target == target)
            .map(|e| e.visible)
    }

    #[must_use]
    pub fn class_of(&self, target: Target) -> Option<RevealClass> {
        self.elements
            .iter()
            .find(|e| e.target == target)
            .map(|e| e.class)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
