use std::collections::HashMap;

use geometry::{Extent, Point};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use smallvec::SmallVec;

/// A keyboard key, identified by its Windows virtual-key code.
///
/// Both back-ends translate their native key codes into this code space, so a
/// `Key` compares equal across platforms. Codes outside the built-in table are
/// interned on first sight with the name `Unknown_XX`; equality is always by
/// code.
#[derive(Clone, Copy)]
pub struct Key {
    code: u16,
    name: &'static str,
}

impl Key {
    const fn named(code: u16, name: &'static str) -> Self {
        Self { code, name }
    }

    pub const BACKSPACE: Self = Self::named(0x08, "Backspace");
    pub const TAB: Self = Self::named(0x09, "Tab");
    pub const ENTER: Self = Self::named(0x0D, "Enter");
    pub const SHIFT: Self = Self::named(0x10, "Shift");
    pub const CONTROL: Self = Self::named(0x11, "Control");
    pub const ALT: Self = Self::named(0x12, "Alt");
    pub const PAUSE: Self = Self::named(0x13, "Pause");
    pub const CAPS_LOCK: Self = Self::named(0x14, "CapsLock");
    pub const ESCAPE: Self = Self::named(0x1B, "Escape");
    pub const SPACE: Self = Self::named(0x20, "Space");

    pub const PAGE_UP: Self = Self::named(0x21, "PageUp");
    pub const PAGE_DOWN: Self = Self::named(0x22, "PageDown");
    pub const END: Self = Self::named(0x23, "End");
    pub const HOME: Self = Self::named(0x24, "Home");
    pub const LEFT: Self = Self::named(0x25, "Left");
    pub const UP: Self = Self::named(0x26, "Up");
    pub const RIGHT: Self = Self::named(0x27, "Right");
    pub const DOWN: Self = Self::named(0x28, "Down");
    pub const PRINT_SCREEN: Self = Self::named(0x2C, "PrintScreen");
    pub const INSERT: Self = Self::named(0x2D, "Insert");
    pub const DELETE: Self = Self::named(0x2E, "Delete");

    pub const D0: Self = Self::named(0x30, "0");
    pub const D1: Self = Self::named(0x31, "1");
    pub const D2: Self = Self::named(0x32, "2");
    pub const D3: Self = Self::named(0x33, "3");
    pub const D4: Self = Self::named(0x34, "4");
    pub const D5: Self = Self::named(0x35, "5");
    pub const D6: Self = Self::named(0x36, "6");
    pub const D7: Self = Self::named(0x37, "7");
    pub const D8: Self = Self::named(0x38, "8");
    pub const D9: Self = Self::named(0x39, "9");

    pub const A: Self = Self::named(0x41, "A");
    pub const B: Self = Self::named(0x42, "B");
    pub const C: Self = Self::named(0x43, "C");
    pub const D: Self = Self::named(0x44, "D");
    pub const E: Self = Self::named(0x45, "E");
    pub const F: Self = Self::named(0x46, "F");
    pub const G: Self = Self::named(0x47, "G");
    pub const H: Self = Self::named(0x48, "H");
    pub const I: Self = Self::named(0x49, "I");
    pub const J: Self = Self::named(0x4A, "J");
    pub const K: Self = Self::named(0x4B, "K");
    pub const L: Self = Self::named(0x4C, "L");
    pub const M: Self = Self::named(0x4D, "M");
    pub const N: Self = Self::named(0x4E, "N");
    pub const O: Self = Self::named(0x4F, "O");
    pub const P: Self = Self::named(0x50, "P");
    pub const Q: Self = Self::named(0x51, "Q");
    pub const R: Self = Self::named(0x52, "R");
    pub const S: Self = Self::named(0x53, "S");
    pub const T: Self = Self::named(0x54, "T");
    pub const U: Self = Self::named(0x55, "U");
    pub const V: Self = Self::named(0x56, "V");
    pub const W: Self = Self::named(0x57, "W");
    pub const X: Self = Self::named(0x58, "X");
    pub const Y: Self = Self::named(0x59, "Y");
    pub const Z: Self = Self::named(0x5A, "Z");

    pub const LEFT_SUPER: Self = Self::named(0x5B, "LeftSuper");
    pub const RIGHT_SUPER: Self = Self::named(0x5C, "RightSuper");
    pub const MENU: Self = Self::named(0x5D, "Menu");

    pub const NUMPAD0: Self = Self::named(0x60, "NumPad0");
    pub const NUMPAD1: Self = Self::named(0x61, "NumPad1");
    pub const NUMPAD2: Self = Self::named(0x62, "NumPad2");
    pub const NUMPAD3: Self = Self::named(0x63, "NumPad3");
    pub const NUMPAD4: Self = Self::named(0x64, "NumPad4");
    pub const NUMPAD5: Self = Self::named(0x65, "NumPad5");
    pub const NUMPAD6: Self = Self::named(0x66, "NumPad6");
    pub const NUMPAD7: Self = Self::named(0x67, "NumPad7");
    pub const NUMPAD8: Self = Self::named(0x68, "NumPad8");
    pub const NUMPAD9: Self = Self::named(0x69, "NumPad9");
    pub const NUMPAD_MULTIPLY: Self = Self::named(0x6A, "Multiply");
    pub const NUMPAD_ADD: Self = Self::named(0x6B, "Add");
    pub const NUMPAD_SUBTRACT: Self = Self::named(0x6D, "Subtract");
    pub const NUMPAD_DECIMAL: Self = Self::named(0x6E, "Decimal");
    pub const NUMPAD_DIVIDE: Self = Self::named(0x6F, "Divide");

    pub const F1: Self = Self::named(0x70, "F1");
    pub const F2: Self = Self::named(0x71, "F2");
    pub const F3: Self = Self::named(0x72, "F3");
    pub const F4: Self = Self::named(0x73, "F4");
    pub const F5: Self = Self::named(0x74, "F5");
    pub const F6: Self = Self::named(0x75, "F6");
    pub const F7: Self = Self::named(0x76, "F7");
    pub const F8: Self = Self::named(0x77, "F8");
    pub const F9: Self = Self::named(0x78, "F9");
    pub const F10: Self = Self::named(0x79, "F10");
    pub const F11: Self = Self::named(0x7A, "F11");
    pub const F12: Self = Self::named(0x7B, "F12");

    pub const NUM_LOCK: Self = Self::named(0x90, "NumLock");
    pub const SCROLL_LOCK: Self = Self::named(0x91, "ScrollLock");

    /// The ';:' key on a US keyboard.
    pub const SEMICOLON: Self = Self::named(0xBA, "Semicolon");
    /// The '=+' key.
    pub const EQUALS: Self = Self::named(0xBB, "Equals");
    /// The ',<' key.
    pub const COMMA: Self = Self::named(0xBC, "Comma");
    /// The '-_' key.
    pub const MINUS: Self = Self::named(0xBD, "Minus");
    /// The '.>' key.
    pub const PERIOD: Self = Self::named(0xBE, "Period");
    /// The '/?' key on a US keyboard.
    pub const SLASH: Self = Self::named(0xBF, "Slash");
    /// The '`~' key on a US keyboard.
    pub const GRAVE: Self = Self::named(0xC0, "Grave");
    /// The '[{' key on a US keyboard.
    pub const LEFT_BRACKET: Self = Self::named(0xDB, "LeftBracket");
    /// The '\\|' key on a US keyboard.
    pub const BACKSLASH: Self = Self::named(0xDC, "Backslash");
    /// The ']}' key on a US keyboard.
    pub const RIGHT_BRACKET: Self = Self::named(0xDD, "RightBracket");
    /// The quote key on a US keyboard.
    pub const APOSTROPHE: Self = Self::named(0xDE, "Apostrophe");

    /// Looks up the key for a virtual-key code. Codes without a name are
    /// interned as `Unknown_XX`, so the same code always yields an equal key
    /// with the same name.
    pub fn from_code(code: u16) -> Self {
        if let Some(Some(key)) = KEY_TABLE.get(code as usize) {
            return *key;
        }

        let mut unknown = UNKNOWN_KEYS.lock();
        let name: &'static str = *unknown
            .entry(code)
            .or_insert_with(|| &*Box::leak(format!("Unknown_{code:X}").into_boxed_str()));

        Self { code, name }
    }

    #[must_use]
    pub fn code(self) -> u16 {
        self.code
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.name
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Key({}, {:#04x})", self.name, self.code)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

static UNKNOWN_KEYS: Lazy<Mutex<HashMap<u16, &'static str>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

const KNOWN_KEYS: &[Key] = &[
    Key::BACKSPACE,
    Key::TAB,
    Key::ENTER,
    Key::SHIFT,
    Key::CONTROL,
    Key::ALT,
    Key::PAUSE,
    Key::CAPS_LOCK,
    Key::ESCAPE,
    Key::SPACE,
    Key::PAGE_UP,
    Key::PAGE_DOWN,
    Key::END,
    Key::HOME,
    Key::LEFT,
    Key::UP,
    Key::RIGHT,
    Key::DOWN,
    Key::PRINT_SCREEN,
    Key::INSERT,
    Key::DELETE,
    Key::D0,
    Key::D1,
    Key::D2,
    Key::D3,
    Key::D4,
    Key::D5,
    Key::D6,
    Key::D7,
    Key::D8,
    Key::D9,
    Key::A,
    Key::B,
    Key::C,
    Key::D,
    Key::E,
    Key::F,
    Key::G,
    Key::H,
    Key::I,
    Key::J,
    Key::K,
    Key::L,
    Key::M,
    Key::N,
    Key::O,
    Key::P,
    Key::Q,
    Key::R,
    Key::S,
    Key::T,
    Key::U,
    Key::V,
    Key::W,
    Key::X,
    Key::Y,
    Key::Z,
    Key::LEFT_SUPER,
    Key::RIGHT_SUPER,
    Key::MENU,
    Key::NUMPAD0,
    Key::NUMPAD1,
    Key::NUMPAD2,
    Key::NUMPAD3,
    Key::NUMPAD4,
    Key::NUMPAD5,
    Key::NUMPAD6,
    Key::NUMPAD7,
    Key::NUMPAD8,
    Key::NUMPAD9,
    Key::NUMPAD_MULTIPLY,
    Key::NUMPAD_ADD,
    Key::NUMPAD_SUBTRACT,
    Key::NUMPAD_DECIMAL,
    Key::NUMPAD_DIVIDE,
    Key::F1,
    Key::F2,
    Key::F3,
    Key::F4,
    Key::F5,
    Key::F6,
    Key::F7,
    Key::F8,
    Key::F9,
    Key::F10,
    Key::F11,
    Key::F12,
    Key::NUM_LOCK,
    Key::SCROLL_LOCK,
    Key::SEMICOLON,
    Key::EQUALS,
    Key::COMMA,
    Key::MINUS,
    Key::PERIOD,
    Key::SLASH,
    Key::GRAVE,
    Key::LEFT_BRACKET,
    Key::BACKSLASH,
    Key::RIGHT_BRACKET,
    Key::APOSTROPHE,
];

const KEY_TABLE: [Option<Key>; 256] = {
    let mut table = [None; 256];

    let mut i = 0;
    while i < KNOWN_KEYS.len() {
        table[KNOWN_KEYS[i].code as usize] = Some(KNOWN_KEYS[i]);
        i += 1;
    }

    table
};

/// The location and amount of one mouse wheel step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wheel {
    pub at: Point,
    /// Positive away from the user. One notch is 120.
    pub delta: i32,
}

/// A platform-independent input or window event, produced by a back-end from
/// its native messages and consumed by
/// [`WindowCore::dispatch`](crate::WindowCore::dispatch).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Resized(Extent),
    KeyDown(Key),
    KeyUp(Key),
    /// A typed character. Backspace arrives as `'\u{8}'`.
    Char(char),
    MouseMove(Point),
    MouseDown(Point),
    MouseUp(Point),
    MouseWheel(Wheel),
    /// The window lost keyboard focus.
    FocusLost,
    Tick,
    /// The user asked to close the window (close button, Alt-F4, the window
    /// manager's delete protocol).
    CloseRequested,
}

/// The keys currently held down, in the order they were pressed.
#[derive(Clone, Debug, Default)]
pub struct KeySet {
    keys: SmallVec<[Key; 8]>,
}

impl KeySet {
    /// Records `key` as held. Returns false if it was already held, which is
    /// how auto-repeat is recognized.
    pub fn press(&mut self, key: Key) -> bool {
        if self.keys.contains(&key) {
            false
        } else {
            self.keys.push(key);
            true
        }
    }

    /// Returns false if `key` was not held.
    pub fn release(&mut self, key: Key) -> bool {
        if let Some(index) = self.keys.iter().position(|k| *k == key) {
            self.keys.remove(index);
            true
        } else {
            false
        }
    }

    /// Releases every key, returning them in the order they were pressed.
    pub fn drain(&mut self) -> SmallVec<[Key; 8]> {
        std::mem::take(&mut self.keys)
    }

    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Key] {
        &self.keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookup() {
        assert_eq!(Key::from_code(0x41), Key::A);
        assert_eq!(Key::from_code(0x41).name(), "A");
        assert_eq!(Key::from_code(0x0D).name(), "Enter");
        assert_eq!(Key::from_code(0x7B), Key::F12);
        assert!(KNOWN_KEYS.len() >= 90);

        for key in KNOWN_KEYS {
            assert_eq!(Key::from_code(key.code()).name(), key.name());
        }
    }

    #[test]
    fn unknown_codes_are_interned() {
        let a = Key::from_code(0xE7);
        let b = Key::from_code(0xE7);

        assert_eq!(a, b);
        assert_eq!(a.name(), "Unknown_E7");
        assert!(std::ptr::eq(a.name(), b.name()));

        assert_eq!(Key::from_code(0x1234).name(), "Unknown_1234");
    }

    #[test]
    fn key_set() {
        let mut keys = KeySet::default();

        assert!(keys.press(Key::A));
        assert!(!keys.press(Key::A));
        assert!(keys.press(Key::SHIFT));
        assert_eq!(keys.as_slice(), &[Key::A, Key::SHIFT]);

        assert!(keys.release(Key::A));
        assert!(!keys.release(Key::A));

        assert!(keys.press(Key::Z));
        assert_eq!(keys.drain().as_slice(), &[Key::SHIFT, Key::Z]);
        assert!(keys.is_empty());
    }
}
