//! Keyboard-layout tables.
//!
//! A [`KeyMap`] is pure data keyed by physical (DOM-style) key codes. It can
//! be built in code, as [`KeyMap::us`] does, or deserialized from JSON so a
//! host can swap layouts without touching the encoder.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Physical key codes used by the built-in tables.
pub mod codes {
    pub const BACKSPACE: u16 = 8;
    pub const TAB: u16 = 9;
    pub const ENTER: u16 = 13;
    pub const ESCAPE: u16 = 27;
    pub const SPACE: u16 = 32;
    pub const PAGE_UP: u16 = 33;
    pub const PAGE_DOWN: u16 = 34;
    pub const END: u16 = 35;
    pub const HOME: u16 = 36;
    pub const LEFT: u16 = 37;
    pub const UP: u16 = 38;
    pub const RIGHT: u16 = 39;
    pub const DOWN: u16 = 40;
    pub const INSERT: u16 = 45;
    pub const DELETE: u16 = 46;
    pub const DIGIT_0: u16 = 48;
    pub const KEY_A: u16 = 65;
    pub const KEY_Z: u16 = 90;
    pub const NUMPAD_0: u16 = 96;
    pub const F1: u16 = 112;
}

/// What a key in the direct table produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Fixed bytes.
    Text(String),
    /// Arrow key: `ESC O x` in application cursor-key mode, `ESC [ x` otherwise.
    Cursor(char),
    /// Keypad key: `numeric` in numeric keypad mode, `ESC O application`
    /// in application keypad mode.
    Keypad { numeric: char, application: char },
}

/// Tables for one keyboard layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMap {
    /// Key code -> C0 byte, used while Ctrl is held.
    pub control: HashMap<u16, u8>,
    /// Navigation, editing and function keys.
    pub direct: HashMap<u16, KeyAction>,
    /// Characters produced with Shift held.
    pub shifted: HashMap<u16, char>,
    /// Characters produced with AltGr held.
    pub alt_graphic: HashMap<u16, char>,
    /// Characters produced with no modifier.
    pub printable: HashMap<u16, char>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::us()
    }
}

impl KeyMap {
    /// Tables with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            control: HashMap::new(),
            direct: HashMap::new(),
            shifted: HashMap::new(),
            alt_graphic: HashMap::new(),
            printable: HashMap::new(),
        }
    }

    /// US layout.
    #[must_use]
    pub fn us() -> Self {
        use codes::*;
        let mut map = Self::empty();

        for (offset, code) in (KEY_A..=KEY_Z).enumerate() {
            let lower = char::from(b'a' + offset as u8);
            map.control.insert(code, offset as u8 + 1);
            map.printable.insert(code, lower);
            map.shifted.insert(code, lower.to_ascii_uppercase());
        }
        map.control.insert(SPACE, 0x00);
        map.control.insert(219, 0x1b);
        map.control.insert(220, 0x1c);
        map.control.insert(221, 0x1d);

        for (offset, shifted) in ")!@#$%^&*(".chars().enumerate() {
            let code = DIGIT_0 + offset as u16;
            map.printable.insert(code, char::from(b'0' + offset as u8));
            map.shifted.insert(code, shifted);
        }

        let punctuation: [(u16, char, char); 11] = [
            (186, ';', ':'),
            (187, '=', '+'),
            (188, ',', '<'),
            (189, '-', '_'),
            (190, '.', '>'),
            (191, '/', '?'),
            (192, '`', '~'),
            (219, '[', '{'),
            (220, '\\', '|'),
            (221, ']', '}'),
            (222, '\'', '"'),
        ];
        for (code, plain, shifted) in punctuation {
            map.printable.insert(code, plain);
            map.shifted.insert(code, shifted);
        }

        let text = |s: &str| KeyAction::Text(s.to_owned());
        map.direct.insert(BACKSPACE, text("\x7f"));
        map.direct.insert(TAB, text("\t"));
        map.direct.insert(ENTER, text("\n"));
        map.direct.insert(ESCAPE, text("\x1b"));
        map.direct.insert(SPACE, text(" "));
        map.direct.insert(PAGE_UP, text("\x1b[5~"));
        map.direct.insert(PAGE_DOWN, text("\x1b[6~"));
        map.direct.insert(END, text("\x1b[4~"));
        map.direct.insert(HOME, text("\x1b[1~"));
        map.direct.insert(INSERT, text("\x1b[2~"));
        map.direct.insert(DELETE, text("\x1b[3~"));
        map.direct.insert(LEFT, KeyAction::Cursor('D'));
        map.direct.insert(UP, KeyAction::Cursor('A'));
        map.direct.insert(RIGHT, KeyAction::Cursor('C'));
        map.direct.insert(DOWN, KeyAction::Cursor('B'));

        let function_keys = [
            "\x1bOP", "\x1bOQ", "\x1bOR", "\x1bOS", "\x1b[15~", "\x1b[17~", "\x1b[18~",
            "\x1b[19~", "\x1b[20~", "\x1b[21~", "\x1b[23~", "\x1b[24~",
        ];
        for (offset, seq) in function_keys.into_iter().enumerate() {
            map.direct.insert(F1 + offset as u16, text(seq));
        }

        for digit in 0..10u8 {
            map.direct.insert(
                NUMPAD_0 + u16::from(digit),
                KeyAction::Keypad {
                    numeric: char::from(b'0' + digit),
                    application: char::from(b'p' + digit),
                },
            );
        }
        let keypad_ops = [
            (106, '*', 'j'),
            (107, '+', 'k'),
            (109, '-', 'm'),
            (110, '.', 'n'),
            (111, '/', 'o'),
        ];
        for (code, numeric, application) in keypad_ops {
            map.direct
                .insert(code, KeyAction::Keypad { numeric, application });
        }

        map.alt_graphic.extend([
            (49, '|'),
            (50, '@'),
            (51, '#'),
            (52, '~'),
            (55, '{'),
            (57, '['),
            (48, ']'),
        ]);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn us_letters_and_digits() {
        let map = KeyMap::us();
        assert_eq!(map.printable.get(&codes::KEY_A), Some(&'a'));
        assert_eq!(map.shifted.get(&codes::KEY_Z), Some(&'Z'));
        assert_eq!(map.control.get(&codes::KEY_A), Some(&0x01));
        assert_eq!(map.control.get(&codes::KEY_Z), Some(&0x1a));
        assert_eq!(map.printable.get(&(codes::DIGIT_0 + 7)), Some(&'7'));
        assert_eq!(map.shifted.get(&(codes::DIGIT_0 + 1)), Some(&'!'));
        assert_eq!(map.shifted.get(&codes::DIGIT_0), Some(&')'));
    }

    #[test]
    fn us_function_keys() {
        let map = KeyMap::us();
        assert_eq!(
            map.direct.get(&codes::F1),
            Some(&KeyAction::Text("\x1bOP".into()))
        );
        assert_eq!(
            map.direct.get(&(codes::F1 + 11)),
            Some(&KeyAction::Text("\x1b[24~".into()))
        );
    }

    #[test]
    fn empty_map_has_no_entries() {
        let map = KeyMap::empty();
        assert!(map.direct.is_empty() && map.printable.is_empty());
    }
}
