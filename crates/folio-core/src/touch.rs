#![forbid(unsafe_code)]

//! Press feedback and fast-tap activation on narrow viewports.

use crate::effect::{Effect, Target};
use crate::event::Dispatch;
use crate::viewport::ViewportClass;

const PRESS_TRANSITION: &str = "transform 0.1s ease";
const RELEASE_TRANSITION: &str = "transform 0.3s ease";

/// Whether `target` gets press feedback (cards, song buttons, setting toggles).
#[must_use]
pub const fn is_interactive(target: Target) -> bool {
    matches!(
        target,
        Target::Card(_) | Target::SongButton(_) | Target::AnimationToggle
    )
}

#[derive(Debug, Clone)]
pub struct TouchAdapter {
    active: bool,
}

impl TouchAdapter {
    #[must_use]
    pub fn new(class: ViewportClass) -> Self {
        Self {
            active: class.is_narrow(),
        }
    }

    pub fn reconfigure(&mut self, class: ViewportClass) {
        self.active = class.is_narrow();
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn on_touch_start(&self, target: Target, effects: &mut Vec<Effect>) {
        if !self.active || !is_interactive(target) {
            return;
        }
        effects.push(Effect::style(target, "transform", "scale(0.98)"));
        effects.push(Effect::style(target, "transition", PRESS_TRANSITION));
    }

    /// Release feedback; a touch ending on a button is turned into an
    /// immediate synthesized click.
    pub fn on_touch_end(&self, target: Target, button: bool, effects: &mut Vec<Effect>) -> Dispatch {
        if !self.active {
            return Dispatch::PASS;
        }
        self.release(target, effects);
        if button {
            effects.push(Effect::Activate(target));
            return Dispatch::CONSUMED;
        }
        Dispatch::PASS
    }

    pub fn on_touch_cancel(&self, target: Target, effects: &mut Vec<Effect>) {
        if self.active {
            self.release(target, effects);
        }
    }

    fn release(&self, target: Target, effects: &mut Vec<Effect>) {
        if is_interactive(target) {
            effects.push(Effect::clear_style(target, "transform"));
            effects.push(Effect::style(target, "transition", RELEASE_TRANSITION));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_off_narrow() {
        let adapter = TouchAdapter::new(ViewportClass::Tablet);
        let mut effects = Vec::new();
        adapter.on_touch_start(Target::Card(0), &mut effects);
        assert_eq!(
            adapter.on_touch_end(Target::SongButton(0), true, &mut effects),
            Dispatch::PASS
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn press_and_release_feedback() {
        let adapter = TouchAdapter::new(ViewportClass::Narrow);
        let mut effects = Vec::new();
        adapter.on_touch_start(Target::Card(2), &mut effects);
        adapter.on_touch_cancel(Target::Card(2), &mut effects);
        assert_eq!(
            effects,
            vec![
                Effect::style(Target::Card(2), "transform", "scale(0.98)"),
                Effect::style(Target::Card(2), "transition", "transform 0.1s ease"),
                Effect::clear_style(Target::Card(2), "transform"),
                Effect::style(Target::Card(2), "transition", "transform 0.3s ease"),
            ]
        );
    }

    #[test]
    fn button_touch_end_activates_immediately() {
        let adapter = TouchAdapter::new(ViewportClass::Narrow);
        let mut effects = Vec::new();
        let dispatch = adapter.on_touch_end(Target::SongButton(5), true, &mut effects);
        assert_eq!(dispatch, Dispatch::CONSUMED);
        assert_eq!(effects.last(), Some(&Effect::Activate(Target::SongButton(5))));

        effects.clear();
        let dispatch = adapter.on_touch_end(Target::PlayPauseButton, true, &mut effects);
        assert_eq!(dispatch, Dispatch::CONSUMED);
        assert_eq!(effects, vec![Effect::Activate(Target::PlayPauseButton)]);
    }

    #[test]
    fn plain_button_activates_without_press_feedback() {
        let adapter = TouchAdapter::new(ViewportClass::Narrow);
        let mut effects = Vec::new();
        adapter.on_touch_start(Target::Button(0), &mut effects);
        assert!(effects.is_empty());

        let dispatch = adapter.on_touch_end(Target::Button(0), true, &mut effects);
        assert_eq!(dispatch, Dispatch::CONSUMED);
        assert_eq!(effects, vec![Effect::Activate(Target::Button(0))]);
    }

    #[test]
    fn reconfigure_follows_viewport() {
        let mut adapter = TouchAdapter::new(ViewportClass::Wide);
        adapter.reconfigure(ViewportClass::Narrow);
        assert!(adapter.is_active());
        adapter.reconfigure(ViewportClass::Tablet);
        assert!(!adapter.is_active());
    }
}
