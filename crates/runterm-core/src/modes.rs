//! Terminal mode flags.
//!
//! Pure state toggled by `CSI Pm h` / `CSI Pm l`, by `ESC =` / `ESC >` and by
//! the keypad CSI finals. The parser never reads these; the terminal and the
//! input encoder do.

use bitflags::bitflags;

bitflags! {
    /// Two-valued terminal modes. A clear bit is the "off" value of the mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modes: u16 {
        /// Mode 4: insert (clear = overwrite).
        const INSERT = 1 << 0;
        /// Mode 7: autowrap. Stored and reported only; writes never wrap.
        const AUTOWRAP = 1 << 1;
        /// Mode 25: cursor visible.
        const CURSOR_VISIBLE = 1 << 2;
        /// `ESC =`: application keypad (clear = numeric).
        const KEYPAD_APPLICATION = 1 << 3;
        /// Mode 1: application cursor keys (clear = normal).
        const CURSOR_KEYS_APPLICATION = 1 << 4;
        /// Mode 12 set: local echo (clear = remote echo).
        const LOCAL_ECHO = 1 << 5;
        /// Mode 1000: mouse reporting.
        const MOUSE_REPORTING = 1 << 6;
        /// Mode 2004: bracketed paste.
        const BRACKETED_PASTE = 1 << 7;
    }
}

impl Modes {
    /// Power-on modes: autowrap on, cursor visible, overwrite, numeric keypad.
    #[must_use]
    pub fn initial(cursor_keys_application: bool, local_echo: bool) -> Self {
        let mut modes = Self::AUTOWRAP | Self::CURSOR_VISIBLE;
        modes.set(Self::CURSOR_KEYS_APPLICATION, cursor_keys_application);
        modes.set(Self::LOCAL_ECHO, local_echo);
        modes
    }

    #[must_use]
    pub fn insert_mode(&self) -> bool {
        self.contains(Self::INSERT)
    }

    #[must_use]
    pub fn autowrap(&self) -> bool {
        self.contains(Self::AUTOWRAP)
    }

    #[must_use]
    pub fn cursor_visible(&self) -> bool {
        self.contains(Self::CURSOR_VISIBLE)
    }

    #[must_use]
    pub fn keypad_application(&self) -> bool {
        self.contains(Self::KEYPAD_APPLICATION)
    }

    #[must_use]
    pub fn cursor_keys_application(&self) -> bool {
        self.contains(Self::CURSOR_KEYS_APPLICATION)
    }

    #[must_use]
    pub fn local_echo(&self) -> bool {
        self.contains(Self::LOCAL_ECHO)
    }

    #[must_use]
    pub fn mouse_reporting(&self) -> bool {
        self.contains(Self::MOUSE_REPORTING)
    }

    #[must_use]
    pub fn bracketed_paste(&self) -> bool {
        self.contains(Self::BRACKETED_PASTE)
    }
}
