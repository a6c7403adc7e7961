use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, Modifiers};

/// Current input state for the window.
///
/// Per-frame transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Whether the window is focused.
    pub focused: bool,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies an input event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // On focus loss, release everything so no key stays stuck.
                    self.keys_down.clear();
                }
            }

            InputEvent::Key { key, state, modifiers, .. } => {
                self.modifiers = *modifiers;

                match state {
                    KeyState::Pressed => {
                        if self.keys_down.insert(*key) {
                            frame.keys_pressed.insert(*key);
                        }
                    }
                    KeyState::Released => {
                        if self.keys_down.remove(key) {
                            frame.keys_released.insert(*key);
                        }
                    }
                }
            }
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key, state, modifiers: Modifiers::default(), repeat: false }
    }

    #[test]
    fn press_and_release_are_tracked() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::Digit2, KeyState::Pressed));
        assert!(state.key_down(Key::Digit2));
        assert!(frame.keys_pressed.contains(&Key::Digit2));

        state.apply_event(&mut frame, key(Key::Digit2, KeyState::Released));
        assert!(!state.key_down(Key::Digit2));
        assert!(frame.keys_released.contains(&Key::Digit2));
        assert_eq!(frame.events.len(), 2);
    }

    #[test]
    fn held_key_is_pressed_once() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::R, KeyState::Pressed));
        frame.clear();
        state.apply_event(&mut frame, key(Key::R, KeyState::Pressed));
        assert!(frame.keys_pressed.is_empty());
    }

    #[test]
    fn focus_loss_releases_keys() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, key(Key::Digit1, KeyState::Pressed));
        state.apply_event(&mut frame, InputEvent::Focused(false));
        assert!(state.keys_down.is_empty());
        assert!(!state.focused);
    }

    #[test]
    fn pressed_key_ignores_repeats_and_releases() {
        let repeat = InputEvent::Key {
            key: Key::Digit3,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            repeat: true,
        };
        assert_eq!(repeat.pressed_key(), None);
        assert_eq!(key(Key::Digit3, KeyState::Released).pressed_key(), None);
        assert_eq!(key(Key::Digit3, KeyState::Pressed).pressed_key(), Some(Key::Digit3));
    }
}
