#![forbid(unsafe_code)]

//! Smooth scrolling for same-page links.

use crate::effect::Effect;
use crate::error::FolioError;
use crate::event::Dispatch;
use crate::layout::PageLayout;

/// Resolves `#id` links against the anchors the host reported.
#[derive(Debug, Clone)]
pub struct Navigator {
    anchors: Vec<String>,
    collectables: Option<String>,
}

impl Navigator {
    pub fn attach(layout: &PageLayout, collectables_anchor: &str) -> Result<Self, FolioError> {
        if layout.anchors.is_empty() {
            return Err(FolioError::MissingElement("in-page anchors"));
        }
        let collectables = layout
            .anchors
            .iter()
            .any(|a| a == collectables_anchor)
            .then(|| collectables_anchor.to_string());
        Ok(Self {
            anchors: layout.anchors.clone(),
            collectables,
        })
    }

    /// Handle activation of a link with the given `href`.
    ///
    /// Unresolvable targets fall through to the browser untouched.
    pub fn on_anchor_click(&self, href: &str, effects: &mut Vec<Effect>) -> Dispatch {
        let Some(anchor) = self.resolve(href) else {
            return Dispatch::PASS;
        };
        effects.push(Effect::ScrollIntoView {
            anchor: anchor.to_string(),
        });
        Dispatch::CONSUMED
    }

    /// Carousel images lead to the collectables section.
    pub fn on_carousel_image_click(&self, effects: &mut Vec<Effect>) {
        if let Some(anchor) = &self.collectables {
            effects.push(Effect::ScrollIntoView {
                anchor: anchor.clone(),
            });
        }
    }

    fn resolve<'a>(&'a self, href: &str) -> Option<&'a str> {
        let id = href.strip_prefix('#')?;
        self.anchors
            .iter()
            .find(|anchor| anchor.as_str() == id)
            .map(String::as_str)
    }
}
