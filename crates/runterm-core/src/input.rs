//! Input encoder: logical key events to the bytes sent to the remote process.
//!
//! Lookup order for a key event:
//!
//! 1. Ctrl held and the key is in the control table: that C0 byte.
//! 2. The key is in the direct table (navigation, function, editing keys):
//!    its sequence, with arrows following the cursor-key mode and keypad keys
//!    following the keypad mode.
//! 3. AltGr held and the key is in the AltGr table: that character.
//! 4. Shift held and the key is in the shifted table: that character.
//! 5. The unmodified printable character for the key.
//!
//! A key that maps to nothing encodes to an empty vector, so no transport
//! traffic is generated for it. Alt prefixes the result with `ESC`.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::keymap::{KeyAction, KeyMap};
use crate::modes::Modes;

bitflags! {
    /// Modifier keys held during a key event.
    ///
    /// Encoded as a compact `u8` bitset in JSON (`mods`).
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT       = 0b0001;
        const ALT         = 0b0010;
        const CTRL        = 0b0100;
        const ALT_GRAPHIC = 0b1000;
    }
}

/// A key press: physical key code plus modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub code: u16,
    #[serde(default, with = "mods_bits")]
    pub mods: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self {
            code,
            mods: Modifiers::empty(),
        }
    }

    #[must_use]
    pub const fn with_mods(mut self, mods: Modifiers) -> Self {
        self.mods = mods;
        self
    }
}

mod mods_bits {
    use super::Modifiers;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(mods: &Modifiers, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(mods.bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Modifiers, D::Error> {
        u8::deserialize(deserializer).map(Modifiers::from_bits_truncate)
    }
}

/// Encode a key event for the current modes.
#[must_use]
pub fn encode_key(event: &KeyEvent, modes: Modes, keymap: &KeyMap) -> Vec<u8> {
    let body = encode_unprefixed(event, modes, keymap);
    if body.is_empty() || !event.mods.contains(Modifiers::ALT) {
        return body;
    }
    let mut out = Vec::with_capacity(body.len() + 1);
    out.push(0x1b);
    out.extend_from_slice(&body);
    out
}

fn encode_unprefixed(event: &KeyEvent, modes: Modes, keymap: &KeyMap) -> Vec<u8> {
    let mods = event.mods;
    if mods.contains(Modifiers::CTRL)
        && let Some(&byte) = keymap.control.get(&event.code)
    {
        return vec![byte];
    }
    if let Some(action) = keymap.direct.get(&event.code) {
        return encode_action(action, modes);
    }
    if mods.contains(Modifiers::ALT_GRAPHIC)
        && let Some(&ch) = keymap.alt_graphic.get(&event.code)
    {
        return char_bytes(ch);
    }
    if mods.contains(Modifiers::SHIFT)
        && let Some(&ch) = keymap.shifted.get(&event.code)
    {
        return char_bytes(ch);
    }
    keymap
        .printable
        .get(&event.code)
        .map_or_else(Vec::new, |&ch| char_bytes(ch))
}

fn encode_action(action: &KeyAction, modes: Modes) -> Vec<u8> {
    match action {
        KeyAction::Text(text) => text.as_bytes().to_vec(),
        KeyAction::Cursor(final_byte) => {
            let intro = if modes.cursor_keys_application() {
                b'O'
            } else {
                b'['
            };
            let mut out = vec![0x1b, intro];
            out.extend_from_slice(&char_bytes(*final_byte));
            out
        }
        KeyAction::Keypad {
            numeric,
            application,
        } => {
            if modes.keypad_application() {
                let mut out = vec![0x1b, b'O'];
                out.extend_from_slice(&char_bytes(*application));
                out
            } else {
                char_bytes(*numeric)
            }
        }
    }
}

fn char_bytes(ch: char) -> Vec<u8> {
    let mut buf = [0u8; 4];
    ch.encode_utf8(&mut buf).as_bytes().to_vec()
}

/// Encode pasted text, wrapping it in bracketed-paste markers when the remote
/// side asked for them.
#[must_use]
pub fn encode_paste_text(text: &str, bracketed_paste: bool) -> Vec<u8> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(text.len() + 12);
    if bracketed_paste {
        out.extend_from_slice(b"\x1b[200~");
    }
    out.extend_from_slice(text.as_bytes());
    if bracketed_paste {
        out.extend_from_slice(b"\x1b[201~");
    }
    out
}
