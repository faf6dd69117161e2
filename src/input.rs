use std::collections::HashSet;

use parking_lot::RwLock;

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
}

/// Friendly names for the non-character keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Space,
    Escape,
    LeftShift,
    RightShift,
}

/// Polled keyboard snapshot shared between the event loop and the frame
/// tick. Interior-mutable so the window event handler can record presses
/// through a shared reference; never touched off the event-loop thread.
#[derive(Debug, Default)]
pub struct InputState {
    keys: RwLock<HashSet<KeyCode>>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&self, key: KeyCode) {
        self.keys.write().insert(key);
    }

    pub fn set_key_up(&self, key: KeyCode) {
        self.keys.write().remove(&key);
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.read().contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_press_and_release() {
        let state = InputState::new();
        assert!(!state.is_key_down(KeyCode::Character('W')));
        state.set_key_down(KeyCode::Character('W'));
        assert!(state.is_key_down(KeyCode::Character('W')));
        state.set_key_up(KeyCode::Character('W'));
        assert!(!state.is_key_down(KeyCode::Character('W')));
    }

    #[test]
    fn keys_are_independent() {
        let state = InputState::new();
        state.set_key_down(KeyCode::Named(NamedKey::Space));
        state.set_key_down(KeyCode::Character('D'));
        state.set_key_up(KeyCode::Character('D'));
        assert!(state.is_key_down(KeyCode::Named(NamedKey::Space)));
        assert!(!state.is_key_down(KeyCode::Character('D')));
    }

    #[test]
    fn releasing_an_unpressed_key_is_harmless() {
        let state = InputState::new();
        state.set_key_up(KeyCode::Named(NamedKey::LeftShift));
        assert!(!state.is_key_down(KeyCode::Named(NamedKey::LeftShift)));
    }
}
