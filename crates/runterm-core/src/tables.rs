//! Entity tables: pure data mapping wire codes to typed meanings.
//!
//! Every lookup returns a [`Lookup`] so callers can tell a recognized code
//! apart from one that is deliberately ignored and from one that is unknown
//! (and therefore worth a diagnostic).

use crate::modes::Modes;
use crate::style::{Attrs, Color};

/// Result of looking up a code in one of the tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The code is recognized.
    Known(T),
    /// The code is on the ignore list and is dropped silently.
    Ignored,
    /// The code is not in any table.
    Unknown,
}

impl<T> Lookup<T> {
    /// The recognized value, if any.
    #[must_use]
    pub fn known(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Ignored | Self::Unknown => None,
        }
    }
}

// ── SGR ─────────────────────────────────────────────────────────────

/// Meaning of one SGR parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgrEntry {
    /// `0` (or empty): reset colours and attributes.
    Reset,
    /// Add an attribute to the set.
    Attribute(Attrs),
    /// `7`: reverse video (computed colour swap).
    Reverse,
    /// `27`: undo reverse video.
    ReverseOff,
    /// `30..=37`, `39`: foreground colour (`None` = default).
    Foreground(Option<Color>),
    /// `40..=47`, `49`: background colour (`None` = default).
    Background(Option<Color>),
}

/// Look up an SGR parameter.
#[must_use]
pub fn sgr_entry(code: u16) -> Option<SgrEntry> {
    let entry = match code {
        0 => SgrEntry::Reset,
        1 => SgrEntry::Attribute(Attrs::BRIGHT),
        2 => SgrEntry::Attribute(Attrs::DIM),
        3 | 4 => SgrEntry::Attribute(Attrs::UNDERLINE),
        5 => SgrEntry::Attribute(Attrs::BLINK),
        7 => SgrEntry::Reverse,
        8 => SgrEntry::Attribute(Attrs::HIDDEN),
        27 => SgrEntry::ReverseOff,
        30..=37 => SgrEntry::Foreground(Color::from_index(code - 30)),
        39 => SgrEntry::Foreground(None),
        40..=47 => SgrEntry::Background(Color::from_index(code - 40)),
        49 => SgrEntry::Background(None),
        _ => return None,
    };
    Some(entry)
}

// ── CSI ─────────────────────────────────────────────────────────────

/// Handler selected by a CSI final byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsiFunction {
    /// `m`
    SelectGraphicRendition,
    /// `H`, `f`
    CursorPosition,
    /// `P`
    DeleteChars,
    /// `X`
    EraseChars,
    /// `K`
    EraseInLine,
    /// `J`
    EraseInDisplay,
    /// `@`
    InsertBlanks,
    /// `A`, `S`
    CursorUp,
    /// `B`, `T`
    CursorDown,
    /// `C`
    CursorRight,
    /// `D`
    CursorLeft,
    /// `E`
    NextLine,
    /// `F`
    PreviousLine,
    /// `d`
    RowAbsolute,
    /// `G`, `` ` ``, `'`
    ColumnAbsolute,
    /// `l`
    ResetMode,
    /// `h`
    SetMode,
    /// `>`
    KeypadNumeric,
    /// `=`
    KeypadApplication,
}

/// CSI final bytes dropped without a diagnostic.
pub const CSI_IGNORED: &[char] = &['r', 't', 'c', 'n', 'q'];

/// Look up the handler for a CSI final byte.
#[must_use]
pub fn csi_function(final_byte: char) -> Lookup<CsiFunction> {
    use CsiFunction as F;
    let function = match final_byte {
        'm' => F::SelectGraphicRendition,
        'H' | 'f' => F::CursorPosition,
        'P' => F::DeleteChars,
        'X' => F::EraseChars,
        'K' => F::EraseInLine,
        'J' => F::EraseInDisplay,
        '@' => F::InsertBlanks,
        'A' | 'S' => F::CursorUp,
        'B' | 'T' => F::CursorDown,
        'C' => F::CursorRight,
        'D' => F::CursorLeft,
        'E' => F::NextLine,
        'F' => F::PreviousLine,
        'd' => F::RowAbsolute,
        'G' | '`' | '\'' => F::ColumnAbsolute,
        'l' => F::ResetMode,
        'h' => F::SetMode,
        '>' => F::KeypadNumeric,
        '=' => F::KeypadApplication,
        other if CSI_IGNORED.contains(&other) => return Lookup::Ignored,
        _ => return Lookup::Unknown,
    };
    Lookup::Known(function)
}

// ── OSC ─────────────────────────────────────────────────────────────

/// Handler selected by an OSC prefix (the text before the first `;`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscFunction {
    /// `0`, `1`, `2`: the rest of the string up to BEL/ST is the title.
    Title,
    /// `oterm`: the next field (up to `;`) is the stream read position.
    ReadPosition,
    /// `url`: the next field (up to `;`) is the session URL.
    Url,
}

/// OSC prefixes dropped without a diagnostic.
pub const OSC_IGNORED: &[&str] = &["7", "8", "10", "11", "52", "133"];

/// Look up the handler for an OSC prefix.
#[must_use]
pub fn osc_function(prefix: &str) -> Lookup<OscFunction> {
    match prefix {
        "0" | "1" | "2" => Lookup::Known(OscFunction::Title),
        "oterm" => Lookup::Known(OscFunction::ReadPosition),
        "url" => Lookup::Known(OscFunction::Url),
        other if OSC_IGNORED.contains(&other) => Lookup::Ignored,
        _ => Lookup::Unknown,
    }
}

// ── Modes ───────────────────────────────────────────────────────────

/// Effect of a mode code in a set (`h`) or reset (`l`) list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEffect {
    /// Toggle a mode flag: set for `h`, cleared for `l`.
    Flag(Modes),
    /// `1049`: clear the whole screen on both set and reset.
    ClearScreen,
}

/// Mode codes dropped without a diagnostic.
pub const MODE_IGNORED: &[u16] = &[3, 5, 6, 8, 9, 1002, 1003, 1005, 1006, 1015, 1034, 1047, 1048];

/// Look up a mode code (the leading `?` already stripped).
#[must_use]
pub fn mode_effect(code: u16) -> Lookup<ModeEffect> {
    let effect = match code {
        1 => ModeEffect::Flag(Modes::CURSOR_KEYS_APPLICATION),
        4 => ModeEffect::Flag(Modes::INSERT),
        7 => ModeEffect::Flag(Modes::AUTOWRAP),
        12 => ModeEffect::Flag(Modes::LOCAL_ECHO),
        25 => ModeEffect::Flag(Modes::CURSOR_VISIBLE),
        1000 => ModeEffect::Flag(Modes::MOUSE_REPORTING),
        2004 => ModeEffect::Flag(Modes::BRACKETED_PASTE),
        1049 => ModeEffect::ClearScreen,
        other if MODE_IGNORED.contains(&other) => return Lookup::Ignored,
        _ => return Lookup::Unknown,
    };
    Lookup::Known(effect)
}
