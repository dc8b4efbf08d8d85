/// Held state of a single lane key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    /// Whether the key is currently held down.
    pub pressed: bool,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the key was already held (key repeat).
    pub fn on_press(&mut self) -> bool {
        !std::mem::replace(&mut self.pressed, true)
    }

    /// Returns false when the key was not held.
    pub fn on_release(&mut self) -> bool {
        std::mem::replace(&mut self.pressed, false)
    }
}
