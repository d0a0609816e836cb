//! Run style: colours, attribute flags, and SGR application.
//!
//! A [`Style`] is a plain value. Reverse video is not kept as a rendering
//! hint alone: applying it computes swapped colours and stores them, so a
//! renderer only ever needs `fg`, `bg` and the remaining attribute flags.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::tables::{self, SgrEntry};

bitflags! {
    /// Text attribute flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attrs: u8 {
        const BRIGHT    = 1 << 0;
        const DIM       = 1 << 1;
        const UNDERLINE = 1 << 2;
        const BLINK     = 1 << 3;
        /// Colours have been swapped by SGR 7.
        const REVERSE   = 1 << 4;
        const HIDDEN    = 1 << 5;
    }
}

/// The eight named terminal colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    const ALL: [Self; 8] = [
        Self::Black,
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
        Self::White,
    ];

    /// Colour for an ANSI index `0..=7`.
    #[must_use]
    pub fn from_index(index: u16) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Lower-case colour name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
        }
    }
}

/// Style of one run: foreground, background and attributes.
///
/// Two styles are equal iff all three fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attrs: Attrs,
}

impl Style {
    /// The default style: no colours, no attributes.
    pub const DEFAULT: Self = Self {
        fg: None,
        bg: None,
        attrs: Attrs::empty(),
    };

    /// Reset to the default style (SGR 0).
    pub fn reset(&mut self) {
        *self = Self::DEFAULT;
    }

    #[must_use]
    pub fn with_fg(mut self, fg: Color) -> Self {
        self.fg = Some(fg);
        self
    }

    #[must_use]
    pub fn with_bg(mut self, bg: Color) -> Self {
        self.bg = Some(bg);
        self
    }

    #[must_use]
    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        self.attrs |= attrs;
        self
    }

    #[must_use]
    pub fn is_reversed(&self) -> bool {
        self.attrs.contains(Attrs::REVERSE)
    }

    /// Apply an SGR parameter list.
    ///
    /// An empty list behaves like `0`. Parameters are applied left to right;
    /// unrecognized values are skipped and returned so the caller can report
    /// them.
    pub fn apply_sgr(&mut self, params: &[u16]) -> Vec<u16> {
        if params.is_empty() {
            self.reset();
            return Vec::new();
        }
        let mut unknown = Vec::new();
        for &code in params {
            match tables::sgr_entry(code) {
                Some(entry) => self.apply_entry(entry),
                None => unknown.push(code),
            }
        }
        unknown
    }

    fn apply_entry(&mut self, entry: SgrEntry) {
        match entry {
            SgrEntry::Reset => self.reset(),
            SgrEntry::Attribute(attrs) => self.attrs |= attrs,
            SgrEntry::Reverse => self.reverse(),
            SgrEntry::ReverseOff => self.reverse_off(),
            SgrEntry::Foreground(fg) => self.fg = fg,
            SgrEntry::Background(bg) => self.bg = bg,
        }
    }

    /// Swap colours, substituting white for a missing foreground (as the new
    /// background) and black for a missing background (as the new foreground).
    /// A style that is already reversed is left alone.
    fn reverse(&mut self) {
        if self.is_reversed() {
            return;
        }
        let fg = self.fg;
        let bg = self.bg;
        self.bg = Some(fg.unwrap_or(Color::White));
        self.fg = Some(bg.unwrap_or(Color::Black));
        self.attrs.insert(Attrs::REVERSE);
    }

    /// Plain swap back. Substituted defaults are not remembered, so a reversed
    /// default style comes back as explicit white on black.
    fn reverse_off(&mut self) {
        if !self.is_reversed() {
            return;
        }
        core::mem::swap(&mut self.fg, &mut self.bg);
        self.attrs.remove(Attrs::REVERSE);
    }
}
