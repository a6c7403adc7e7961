//! Keyboard bindings for the windowed host.
//!
//! The native window has no buttons, so each activation event is bound to a
//! key instead.

use std::collections::HashMap;

use swatch_engine::input::Key;

use crate::palette::ColorEvent;

/// What a bound key does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Fire the activation event with this id.
    Activate(String),
    /// Close the window.
    Quit,
}

impl From<ColorEvent> for KeyAction {
    fn from(event: ColorEvent) -> Self {
        KeyAction::Activate(event.id().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Key, KeyAction>,
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Adds or replaces the binding for `key`.
    pub fn bind(&mut self, key: Key, action: impl Into<KeyAction>) {
        self.map.insert(key, action.into());
    }

    pub fn unbind(&mut self, key: Key) -> Option<KeyAction> {
        self.map.remove(&key)
    }

    pub fn action_for(&self, key: Key) -> Option<&KeyAction> {
        self.map.get(&key)
    }
}

impl Default for KeyBindings {
    /// `1`/`2`/`3` pick the palette colors, `R` and `0` reset, `Escape` quits.
    fn default() -> Self {
        let mut keys = Self::empty();
        keys.bind(Key::Digit1, ColorEvent::Color1);
        keys.bind(Key::Digit2, ColorEvent::Color2);
        keys.bind(Key::Digit3, ColorEvent::Color3);
        keys.bind(Key::R, ColorEvent::Reset);
        keys.bind(Key::Digit0, ColorEvent::Reset);
        keys.bind(Key::Escape, KeyAction::Quit);
        keys
    }
}
