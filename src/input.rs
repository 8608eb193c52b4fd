//! Per-frame keyboard state.
//!
//! Keys are identified by raw physical key codes (USB HID usage ids, the
//! values SDL reports as scancodes). Each frame the window feeds the key
//! transitions it saw into [`Input::update`]; keys with no event that frame
//! still advance, so `Pressed` lasts exactly one frame and `Released` too.

use std::collections::HashMap;

/// Raw physical key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode(pub i32);

impl KeyCode {
    pub const ESCAPE: Self = Self(41);
    pub const SPACE: Self = Self(44);
}

/// Lifecycle of a key across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    /// Up, and was up last frame.
    #[default]
    Idle,
    /// Went down this frame.
    Pressed,
    /// Held since an earlier frame.
    Repeated,
    /// Went up this frame.
    Released,
}

impl KeyState {
    pub fn on_key_down(self) -> Self {
        match self {
            KeyState::Idle | KeyState::Released => KeyState::Pressed,
            KeyState::Pressed | KeyState::Repeated => KeyState::Repeated,
        }
    }

    pub fn on_key_up(self) -> Self {
        match self {
            KeyState::Pressed | KeyState::Repeated => KeyState::Released,
            KeyState::Idle | KeyState::Released => KeyState::Idle,
        }
    }

    /// Transition for a frame without events for this key.
    pub fn advance(self) -> Self {
        match self {
            KeyState::Released => KeyState::Idle,
            KeyState::Pressed => KeyState::Repeated,
            other => other,
        }
    }

    pub fn is_down(self) -> bool {
        matches!(self, KeyState::Pressed | KeyState::Repeated)
    }
}

/// A key going down or up, as reported by the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(KeyCode),
    Up(KeyCode),
}

impl KeyEvent {
    pub fn key(self) -> KeyCode {
        match self {
            KeyEvent::Down(key) | KeyEvent::Up(key) => key,
        }
    }
}

/// Snapshot of every key seen so far. Unknown keys read as [`KeyState::Idle`].
#[derive(Debug, Clone, Default)]
pub struct Input {
    keys: HashMap<KeyCode, KeyState>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one frame's events in order, then advances untouched keys.
    pub fn update<I: IntoIterator<Item = KeyEvent>>(&mut self, events: I) {
        let mut touched = Vec::new();
        for event in events {
            let key = event.key();
            let state = self.keys.entry(key).or_default();
            *state = match event {
                KeyEvent::Down(_) => state.on_key_down(),
                KeyEvent::Up(_) => state.on_key_up(),
            };
            touched.push(key);
        }

        for (key, state) in self.keys.iter_mut() {
            if !touched.contains(key) {
                *state = state.advance();
            }
        }
    }

    pub fn state(&self, key: KeyCode) -> KeyState {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    /// True only on the frame the key went down.
    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.state(key) == KeyState::Pressed
    }

    pub fn is_down(&self, key: KeyCode) -> bool {
        self.state(key).is_down()
    }
}

impl std::ops::Index<KeyCode> for Input {
    type Output = KeyState;

    fn index(&self, key: KeyCode) -> &KeyState {
        const IDLE: KeyState = KeyState::Idle;
        self.keys.get(&key).unwrap_or(&IDLE)
    }
}
