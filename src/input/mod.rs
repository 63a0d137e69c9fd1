use std::collections::HashSet;

pub use winit::keyboard::KeyCode;

use crate::error::{RuntimeError, RuntimeResult};

mod keys;

pub use keys::{KEY_NAMES, key_code};

/// Raw input state for a single frame, owned by the scheduler.
///
/// The interpreter only ever reads it; updates happen between steps.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pub keys_held: HashSet<KeyCode>,
    /// Pointer position in screen pixels (top-left origin).
    pub mouse_pos: [f32; 2],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: KeyCode) {
        self.keys_held.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    pub fn release_all(&mut self) {
        self.keys_held.clear();
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn any_key_held(&self) -> bool {
        !self.keys_held.is_empty()
    }
}

/// Resolve a Scratch key name ("space", "up arrow", "a", "?") to its key code.
///
/// Names missing from the table are an error rather than a silent no-op.
pub fn lookup_key(name: &str) -> RuntimeResult<KeyCode> {
    key_code(name).ok_or_else(|| RuntimeError::UnknownKey(name.to_string()))
}
