//! Keyboard input as the game sees it
//!
//! The engine never looks at raw key codes. The front-end translates them into
//! [`Key`]s, keeps a [`KeySnapshot`] of what is held this tick, and forwards
//! discrete [`InputEvent`]s to the active mode.
//!
//! Menus want one action per key press, not one per tick the key is held. They
//! use an [`InputLatch`]: it fires once, then stays closed until every watched
//! key has been released.

/// Logical keys the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Talk, select, advance dialogue (space)
    Confirm,
    /// Open the player menu (return)
    Menu,
    /// Close menus (escape / backspace)
    Cancel,
    Quit,
}

impl Key {
    pub const ARROWS: [Key; 4] = [Key::Up, Key::Down, Key::Left, Key::Right];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Discrete input delivered to a mode's event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Window closed
    Quit,
}

/// Which keys are held down right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySnapshot {
    held: u16,
}

impl KeySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot with the given keys held, handy in tests.
    pub fn with(keys: &[Key]) -> Self {
        let mut snapshot = Self::new();
        for key in keys {
            snapshot.press(*key);
        }
        snapshot
    }

    pub fn press(&mut self, key: Key) {
        self.held |= key.bit();
    }

    pub fn release(&mut self, key: Key) {
        self.held &= !key.bit();
    }

    pub fn clear(&mut self) {
        self.held = 0;
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held & key.bit() != 0
    }

    pub fn any_held(&self, keys: &[Key]) -> bool {
        keys.iter().any(|key| self.is_held(*key))
    }

    /// Fold a key event into the snapshot.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(key) => self.press(key),
            InputEvent::KeyUp(key) => self.release(key),
            InputEvent::Quit => {}
        }
    }
}

/// Edge trigger for held-key snapshots.
///
/// Starts closed so that the key press which opened a screen does not also
/// act inside it.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputLatch {
    armed: bool,
}

impl InputLatch {
    pub fn new() -> Self {
        InputLatch { armed: false }
    }

    pub fn armed() -> Self {
        InputLatch { armed: true }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// True exactly once per press of `key`.
    pub fn pressed(&mut self, keys: &KeySnapshot, key: Key) -> bool {
        if self.armed && keys.is_held(key) {
            self.armed = false;
            true
        } else {
            false
        }
    }

    /// Re-arm once none of `watched` is held.
    pub fn release(&mut self, keys: &KeySnapshot, watched: &[Key]) {
        if !keys.any_held(watched) {
            self.armed = true;
        }
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

#[cfg(feature = "sdl")]
pub use self::sdl::InputSystem;

#[cfg(feature = "sdl")]
mod sdl {
    use super::{InputEvent, Key};
    use sdl2::EventPump;
    use sdl2::event::Event;
    use sdl2::keyboard::Keycode;

    /// Translates SDL events into [`InputEvent`]s.
    pub struct InputSystem;

    impl InputSystem {
        pub fn new() -> Self {
            InputSystem
        }

        /// Drain the SDL queue for this frame.
        pub fn poll_events(&self, event_pump: &mut EventPump) -> Vec<InputEvent> {
            let mut events = Vec::new();

            for event in event_pump.poll_iter() {
                match event {
                    Event::Quit { .. } => events.push(InputEvent::Quit),
                    Event::KeyDown {
                        keycode: Some(code),
                        repeat: false,
                        ..
                    } => {
                        if let Some(key) = map_keycode(code) {
                            events.push(InputEvent::KeyDown(key));
                        }
                    }
                    Event::KeyUp {
                        keycode: Some(code),
                        ..
                    } => {
                        if let Some(key) = map_keycode(code) {
                            events.push(InputEvent::KeyUp(key));
                        }
                    }
                    _ => {}
                }
            }

            events
        }
    }

    fn map_keycode(code: Keycode) -> Option<Key> {
        match code {
            Keycode::Up | Keycode::W => Some(Key::Up),
            Keycode::Down | Keycode::S => Some(Key::Down),
            Keycode::Left | Keycode::A => Some(Key::Left),
            Keycode::Right | Keycode::D => Some(Key::Right),
            Keycode::Space => Some(Key::Confirm),
            Keycode::Return | Keycode::KpEnter => Some(Key::Menu),
            Keycode::Escape | Keycode::Backspace => Some(Key::Cancel),
            Keycode::Q => Some(Key::Quit),
            _ => None,
        }
    }
}
