//! Escape-sequence parser.
//!
//! A deterministic state machine that turns the raw output byte stream of the
//! remote process into [`Action`]s for the terminal. Bytes are first assembled
//! into characters (UTF-8 sequences may be split across `feed` calls), then
//! classified:
//!
//! - printable characters accumulate into a pending run of glyphs, emitted as
//!   one [`Action::Text`] when a control character arrives or the chunk ends
//! - C0 controls (`\n`, `\r`, `\t`, BEL, BS) become dedicated actions
//! - `ESC [` params final: CSI, dispatched through [`tables::csi_function`]
//! - `ESC ]` prefix `;` ...: OSC, dispatched through [`tables::osc_function`]
//! - a few ESC-level sequences (keypad modes, full reset, charset selection)
//!
//! The parser never fails. Unknown sequences come out as
//! [`Action::Diagnostic`] and parsing resumes at the next character.

use crate::diagnostics::{Diagnostic, SequenceKind};
use crate::glyph::Glyph;
use crate::screen::Direction;
use crate::tables::{self, CsiFunction, Lookup, OscFunction};

/// Default cap on accumulated sequence bytes before the sequence is dropped.
pub const DEFAULT_MAX_SEQUENCE_LEN: usize = 256;

/// Parser output actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A run of printable glyphs, in order.
    Text(Vec<Glyph>),
    /// `\n` (also VT and FF).
    LineFeed,
    /// `\r`.
    CarriageReturn,
    /// `\t`.
    Tab,
    /// `\x08`.
    Backspace,
    /// `\x07`.
    Bell,
    /// `CSI ... m`. An empty list means reset.
    Sgr(Vec<u16>),
    /// `CSI row ; col H` (1-based, zero raised to 1).
    CursorPosition { row: usize, col: usize },
    /// Relative move (`A`/`S`, `B`/`T`, `C`, `D`).
    CursorMove { direction: Direction, count: usize },
    /// `CSI n E`: down `n` rows, column 1.
    NextLine(usize),
    /// `CSI n F`: up `n` rows, column 1.
    PreviousLine(usize),
    /// `CSI n d`.
    RowAbsolute(usize),
    /// `CSI n G` (also `` ` `` and `'`).
    ColumnAbsolute(usize),
    /// `CSI n K`.
    EraseInLine(u16),
    /// `CSI n J`.
    EraseInDisplay(u16),
    /// `CSI n X`.
    EraseChars(usize),
    /// `CSI n P`.
    DeleteChars(usize),
    /// `CSI n @`.
    InsertBlanks(usize),
    /// `CSI ? codes h`.
    SetModes(Vec<u16>),
    /// `CSI ? codes l`.
    ResetModes(Vec<u16>),
    /// `ESC =` or `CSI =`.
    KeypadApplication,
    /// `ESC >` or `CSI >`.
    KeypadNumeric,
    /// `ESC c`.
    FullReset,
    /// OSC 0/1/2.
    SetTitle(String),
    /// Read-position extension.
    SetReadPosition(u64),
    /// URL extension.
    SetUrl(String),
    /// Something was unknown or malformed.
    Diagnostic(Diagnostic),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringKind {
    Title,
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    /// After `ESC (` or `ESC )`: the designator is consumed.
    Charset,
    Csi,
    /// An overlong CSI: swallow until its final byte.
    CsiDiscard,
    /// Collecting an OSC prefix up to `;`.
    Osc,
    /// Collecting an OSC string up to BEL or ST.
    OscString(StringKind),
    /// Saw ESC inside an OSC string.
    OscStringEsc(StringKind),
    /// Collecting an extension field up to `;`. `None` discards it.
    Extension(Option<OscFunction>),
}

/// Incremental UTF-8 assembly. Malformed sequences are dropped.
#[derive(Debug, Clone, Default)]
struct Utf8Decoder {
    buf: [u8; 4],
    len: u8,
    remaining: u8,
}

impl Utf8Decoder {
    fn push(&mut self, b: u8) -> Option<char> {
        if self.remaining > 0 {
            if (0x80..=0xBF).contains(&b) {
                if let Some(slot) = self.buf.get_mut(usize::from(self.len)) {
                    *slot = b;
                }
                self.len += 1;
                self.remaining -= 1;
                if self.remaining > 0 {
                    return None;
                }
                let len = usize::from(self.len).min(self.buf.len());
                self.len = 0;
                return core::str::from_utf8(&self.buf[..len])
                    .ok()
                    .and_then(|s| s.chars().next());
            }
            // Not a continuation byte: drop the partial character and treat
            // `b` as the start of a new one.
            self.len = 0;
            self.remaining = 0;
        }
        match b {
            0x00..=0x7F => Some(char::from(b)),
            0xC2..=0xDF => self.start(b, 1),
            0xE0..=0xEF => self.start(b, 2),
            0xF0..=0xF4 => self.start(b, 3),
            // Stray continuation bytes, overlong leads, out-of-range leads.
            _ => None,
        }
    }

    fn start(&mut self, b: u8, remaining: u8) -> Option<char> {
        self.buf[0] = b;
        self.len = 1;
        self.remaining = remaining;
        None
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Escape-sequence parser state.
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    buf: String,
    pending: Vec<Glyph>,
    utf8: Utf8Decoder,
    max_len: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a parser in the ground state.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_sequence_len(DEFAULT_MAX_SEQUENCE_LEN)
    }

    /// Create a parser that drops CSI/OSC sequences longer than `max_len`.
    #[must_use]
    pub fn with_max_sequence_len(max_len: usize) -> Self {
        Self {
            state: State::Ground,
            buf: String::new(),
            pending: Vec::new(),
            utf8: Utf8Decoder::default(),
            max_len: max_len.max(1),
        }
    }

    /// Whether the parser is between sequences.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.state == State::Ground
    }

    /// Forget any partial sequence or character.
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.buf.clear();
        self.pending.clear();
        self.utf8.reset();
    }

    /// Feed one transport payload and return the resulting actions.
    ///
    /// Sequence state persists across calls, so splitting a stream at any
    /// byte boundary yields the same screen. Pending text is flushed at the
    /// end of every call.
    #[must_use]
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Action> {
        let mut out = Vec::new();
        for &b in bytes {
            if let Some(ch) = self.utf8.push(b) {
                self.advance(ch, &mut out);
            }
        }
        self.flush_text(&mut out);
        out
    }

    fn advance(&mut self, ch: char, out: &mut Vec<Action>) {
        match self.state {
            State::Ground => self.ground(ch, out),
            State::Escape => self.escape(ch, out),
            // The designator is dropped; an ESC here starts a new sequence.
            State::Charset if ch == '\x1b' => self.state = State::Escape,
            State::Charset => self.state = State::Ground,
            State::Csi => self.csi(ch, out),
            State::CsiDiscard => self.csi_discard(ch),
            State::Osc => self.osc(ch, out),
            State::OscString(kind) => self.osc_string(kind, ch, out),
            State::OscStringEsc(kind) => {
                self.finish_string(kind, out);
                self.state = State::Ground;
                if ch != '\\' {
                    self.escape(ch, out);
                }
            }
            State::Extension(function) => self.extension(function, ch, out),
        }
    }

    fn ground(&mut self, ch: char, out: &mut Vec<Action>) {
        match ch {
            '\n' | '\x0b' | '\x0c' => self.control(Action::LineFeed, out),
            '\r' => self.control(Action::CarriageReturn, out),
            '\t' => self.control(Action::Tab, out),
            '\x07' => self.control(Action::Bell, out),
            '\x08' => self.control(Action::Backspace, out),
            '\x1b' => {
                self.flush_text(out);
                self.state = State::Escape;
            }
            // Remaining C0 controls, DEL and C1 controls are dropped.
            c if c.is_control() => {}
            c => self.pending.push(Glyph::from_char(c)),
        }
    }

    fn control(&mut self, action: Action, out: &mut Vec<Action>) {
        self.flush_text(out);
        out.push(action);
    }

    fn flush_text(&mut self, out: &mut Vec<Action>) {
        if !self.pending.is_empty() {
            out.push(Action::Text(core::mem::take(&mut self.pending)));
        }
    }

    fn escape(&mut self, ch: char, out: &mut Vec<Action>) {
        self.state = State::Ground;
        match ch {
            '[' => {
                self.buf.clear();
                self.state = State::Csi;
            }
            ']' => {
                self.buf.clear();
                self.state = State::Osc;
            }
            '(' | ')' => self.state = State::Charset,
            '=' => out.push(Action::KeypadApplication),
            '>' => out.push(Action::KeypadNumeric),
            'c' => out.push(Action::FullReset),
            '\x1b' => self.state = State::Escape,
            // String terminator outside a string.
            '\\' => {}
            other => {
                crate::debug!(escape = ?other, "dropping unsupported ESC sequence");
            }
        }
    }

    // ── CSI ─────────────────────────────────────────────────────────

    fn csi(&mut self, ch: char, out: &mut Vec<Action>) {
        match ch {
            '0'..='9' | ';' | '?' => {
                if self.buf.len() >= self.max_len {
                    out.push(Action::Diagnostic(Diagnostic::Overlong {
                        kind: SequenceKind::Csi,
                        len: self.buf.len(),
                    }));
                    self.buf.clear();
                    self.state = State::CsiDiscard;
                } else {
                    self.buf.push(ch);
                }
            }
            '\x1b' => {
                crate::debug!(params = %self.buf, "CSI interrupted by ESC");
                self.buf.clear();
                self.state = State::Escape;
            }
            final_byte => {
                self.state = State::Ground;
                let params = core::mem::take(&mut self.buf);
                self.dispatch_csi(&params, final_byte, out);
            }
        }
    }

    fn csi_discard(&mut self, ch: char) {
        match ch {
            '0'..='9' | ';' | '?' => {}
            '\x1b' => self.state = State::Escape,
            _ => self.state = State::Ground,
        }
    }

    fn dispatch_csi(&mut self, params: &str, final_byte: char, out: &mut Vec<Action>) {
        match tables::csi_function(final_byte) {
            Lookup::Known(function) => out.push(csi_action(function, params)),
            Lookup::Ignored => {
                crate::trace!(params, final_byte = ?final_byte, "ignored CSI");
            }
            Lookup::Unknown => {
                crate::debug!(params, final_byte = ?final_byte, "unknown CSI");
                out.push(Action::Diagnostic(Diagnostic::UnknownCsi {
                    params: params.to_owned(),
                    final_byte,
                }));
            }
        }
    }

    // ── OSC ─────────────────────────────────────────────────────────

    fn osc(&mut self, ch: char, out: &mut Vec<Action>) {
        match ch {
            ';' => {
                let prefix = core::mem::take(&mut self.buf);
                self.begin_osc_body(&prefix, out);
            }
            '\x07' | '\x1b' => {
                // Terminated before any body.
                let prefix = core::mem::take(&mut self.buf);
                if tables::osc_function(&prefix) == Lookup::Unknown {
                    out.push(Action::Diagnostic(Diagnostic::UnknownOsc { prefix }));
                }
                self.state = if ch == '\x1b' {
                    State::Escape
                } else {
                    State::Ground
                };
            }
            c => {
                if self.buf.len() >= self.max_len {
                    out.push(Action::Diagnostic(Diagnostic::Overlong {
                        kind: SequenceKind::Osc,
                        len: self.buf.len(),
                    }));
                    self.buf.clear();
                    self.state = State::OscString(StringKind::Discard);
                } else {
                    self.buf.push(c);
                }
            }
        }
    }

    fn begin_osc_body(&mut self, prefix: &str, out: &mut Vec<Action>) {
        self.state = match tables::osc_function(prefix) {
            Lookup::Known(OscFunction::Title) => State::OscString(StringKind::Title),
            Lookup::Known(function) => State::Extension(Some(function)),
            Lookup::Ignored => {
                crate::trace!(prefix, "ignored OSC");
                State::OscString(StringKind::Discard)
            }
            Lookup::Unknown => {
                crate::debug!(prefix, "unknown OSC");
                out.push(Action::Diagnostic(Diagnostic::UnknownOsc {
                    prefix: prefix.to_owned(),
                }));
                State::OscString(StringKind::Discard)
            }
        };
    }

    fn osc_string(&mut self, kind: StringKind, ch: char, out: &mut Vec<Action>) {
        match ch {
            '\x07' => {
                self.finish_string(kind, out);
                self.state = State::Ground;
            }
            '\x1b' => self.state = State::OscStringEsc(kind),
            c => {
                if kind != StringKind::Title {
                    return;
                }
                if self.buf.len() >= self.max_len {
                    out.push(Action::Diagnostic(Diagnostic::Overlong {
                        kind: SequenceKind::Title,
                        len: self.buf.len(),
                    }));
                    self.buf.clear();
                    self.state = State::OscString(StringKind::Discard);
                } else {
                    self.buf.push(c);
                }
            }
        }
    }

    fn finish_string(&mut self, kind: StringKind, out: &mut Vec<Action>) {
        let text = core::mem::take(&mut self.buf);
        if kind == StringKind::Title {
            out.push(Action::SetTitle(text));
        }
    }

    fn extension(&mut self, function: Option<OscFunction>, ch: char, out: &mut Vec<Action>) {
        match ch {
            ';' | '\x07' => {
                self.state = State::Ground;
                let value = core::mem::take(&mut self.buf);
                if let Some(function) = function {
                    out.push(extension_action(function, value));
                }
            }
            '\x1b' => {
                self.buf.clear();
                self.state = State::Escape;
            }
            c => {
                if function.is_none() {
                    return;
                }
                if self.buf.len() >= self.max_len {
                    out.push(Action::Diagnostic(Diagnostic::Overlong {
                        kind: SequenceKind::Extension,
                        len: self.buf.len(),
                    }));
                    self.buf.clear();
                    self.state = State::Extension(None);
                } else {
                    self.buf.push(c);
                }
            }
        }
    }
}

/// Parse `;`-separated numeric parameters. Empty or non-numeric fields are
/// `None`; values above `u16::MAX` saturate. A leading `?` is ignored.
fn parse_params(params: &str) -> Vec<Option<u16>> {
    params
        .split(';')
        .map(|field| {
            let digits = field.trim_start_matches('?');
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            Some(
                digits
                    .parse::<u64>()
                    .map_or(u16::MAX, |v| u16::try_from(v).unwrap_or(u16::MAX)),
            )
        })
        .collect()
}

fn csi_action(function: CsiFunction, params: &str) -> Action {
    use CsiFunction as F;
    let values = parse_params(params);
    let first = values.first().copied().flatten();
    let count = usize::from(first.unwrap_or(1).max(1));
    let modes = || values.iter().flatten().copied().collect::<Vec<_>>();
    let moved = |direction| Action::CursorMove { direction, count };
    match function {
        F::SelectGraphicRendition => {
            if params.is_empty() {
                Action::Sgr(Vec::new())
            } else {
                Action::Sgr(values.iter().map(|v| v.unwrap_or(0)).collect())
            }
        }
        F::CursorPosition => {
            let col = values.get(1).copied().flatten().unwrap_or(1).max(1);
            Action::CursorPosition {
                row: count,
                col: usize::from(col),
            }
        }
        F::DeleteChars => Action::DeleteChars(count),
        F::EraseChars => Action::EraseChars(count),
        F::EraseInLine => Action::EraseInLine(first.unwrap_or(0)),
        F::EraseInDisplay => Action::EraseInDisplay(first.unwrap_or(0)),
        F::InsertBlanks => Action::InsertBlanks(count),
        F::CursorUp => moved(Direction::Up),
        F::CursorDown => moved(Direction::Down),
        F::CursorRight => moved(Direction::Right),
        F::CursorLeft => moved(Direction::Left),
        F::NextLine => Action::NextLine(count),
        F::PreviousLine => Action::PreviousLine(count),
        F::RowAbsolute => Action::RowAbsolute(count),
        F::ColumnAbsolute => Action::ColumnAbsolute(count),
        F::SetMode => Action::SetModes(modes()),
        F::ResetMode => Action::ResetModes(modes()),
        F::KeypadNumeric => Action::KeypadNumeric,
        F::KeypadApplication => Action::KeypadApplication,
    }
}

fn extension_action(function: OscFunction, value: String) -> Action {
    match function {
        OscFunction::ReadPosition => match value.trim().parse::<u64>() {
            Ok(position) => Action::SetReadPosition(position),
            Err(_) => Action::Diagnostic(Diagnostic::InvalidReadPosition { value }),
        },
        OscFunction::Url => Action::SetUrl(value),
        OscFunction::Title => Action::SetTitle(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::glyphs_of;

    fn parse(input: &[u8]) -> Vec<Action> {
        Parser::new().feed(input)
    }

    fn text(s: &str) -> Action {
        Action::Text(glyphs_of(s))
    }

    // ── Ground ──────────────────────────────────────────────────────

    #[test]
    fn printable_text_is_one_action() {
        assert_eq!(parse(b"hello world"), vec![text("hello world")]);
    }

    #[test]
    fn controls_split_text() {
        assert_eq!(
            parse(b"ab\r\ncd\x07\x08\tz"),
            vec![
                text("ab"),
                Action::CarriageReturn,
                Action::LineFeed,
                text("cd"),
                Action::Bell,
                Action::Backspace,
                Action::Tab,
                text("z"),
            ]
        );
    }

    #[test]
    fn other_controls_are_dropped() {
        assert_eq!(parse(b"a\x00\x01\x7fb"), vec![text("ab")]);
    }

    #[test]
    fn utf8_split_across_feeds() {
        let mut parser = Parser::new();
        let bytes = "é中".as_bytes();
        let mut actions = parser.feed(&bytes[..1]);
        actions.extend(parser.feed(&bytes[1..3]));
        actions.extend(parser.feed(&bytes[3..]));
        assert_eq!(actions, vec![text("é"), text("中")]);
    }

    #[test]
    fn invalid_utf8_is_dropped() {
        assert_eq!(parse(&[b'a', 0xFF, 0xC3, b'b']), vec![text("ab")]);
    }

    // ── ESC ─────────────────────────────────────────────────────────

    #[test]
    fn esc_level_sequences() {
        assert_eq!(
            parse(b"\x1b=\x1b>\x1bc"),
            vec![
                Action::KeypadApplication,
                Action::KeypadNumeric,
                Action::FullReset
            ]
        );
    }

    #[test]
    fn charset_designation_consumed() {
        assert_eq!(parse(b"\x1b(Bx\x1b)0y"), vec![text("x"), text("y")]);
    }

    #[test]
    fn escape_after_charset_intro_starts_new_sequence() {
        assert_eq!(
            parse(b"\x1b(\x1b[2Jz"),
            vec![Action::EraseInDisplay(2), text("z")]
        );
    }

    #[test]
    fn unknown_escape_dropped_silently() {
        assert_eq!(parse(b"\x1b7ok"), vec![text("ok")]);
    }

    // ── CSI ─────────────────────────────────────────────────────────

    #[test]
    fn sgr_params() {
        assert_eq!(
            parse(b"\x1b[1;31m\x1b[m\x1b[;4m"),
            vec![
                Action::Sgr(vec![1, 31]),
                Action::Sgr(vec![]),
                Action::Sgr(vec![0, 4]),
            ]
        );
    }

    #[test]
    fn cursor_position_defaults() {
        assert_eq!(
            parse(b"\x1b[H\x1b[5;10H\x1b[0;0f"),
            vec![
                Action::CursorPosition { row: 1, col: 1 },
                Action::CursorPosition { row: 5, col: 10 },
                Action::CursorPosition { row: 1, col: 1 },
            ]
        );
    }

    #[test]
    fn relative_moves_and_aliases() {
        assert_eq!(
            parse(b"\x1b[3A\x1b[S\x1b[2T\x1b[C\x1b[4D"),
            vec![
                Action::CursorMove { direction: Direction::Up, count: 3 },
                Action::CursorMove { direction: Direction::Up, count: 1 },
                Action::CursorMove { direction: Direction::Down, count: 2 },
                Action::CursorMove { direction: Direction::Right, count: 1 },
                Action::CursorMove { direction: Direction::Left, count: 4 },
            ]
        );
    }

    #[test]
    fn private_modes() {
        assert_eq!(
            parse(b"\x1b[?1;1049h\x1b[4l"),
            vec![Action::SetModes(vec![1, 1049]), Action::ResetModes(vec![4])]
        );
    }

    #[test]
    fn erase_and_edit() {
        assert_eq!(
            parse(b"\x1b[K\x1b[1K\x1b[2J\x1b[3X\x1b[P\x1b[2@"),
            vec![
                Action::EraseInLine(0),
                Action::EraseInLine(1),
                Action::EraseInDisplay(2),
                Action::EraseChars(3),
                Action::DeleteChars(1),
                Action::InsertBlanks(2),
            ]
        );
    }

    #[test]
    fn unknown_csi_reports_and_continues() {
        assert_eq!(
            parse(b"\x1b[5Zok"),
            vec![
                Action::Diagnostic(Diagnostic::UnknownCsi {
                    params: "5".into(),
                    final_byte: 'Z'
                }),
                text("ok"),
            ]
        );
    }

    #[test]
    fn ignored_csi_is_silent() {
        assert_eq!(parse(b"\x1b[1;24r\x1b[6nx"), vec![text("x")]);
    }

    #[test]
    fn esc_inside_csi_restarts() {
        assert_eq!(parse(b"\x1b[12\x1b[2J"), vec![Action::EraseInDisplay(2)]);
    }

    #[test]
    fn overlong_csi_is_dropped_through_final() {
        let mut parser = Parser::with_max_sequence_len(4);
        let actions = parser.feed(b"\x1b[1;2;3;4;5mok");
        assert_eq!(
            actions,
            vec![
                Action::Diagnostic(Diagnostic::Overlong {
                    kind: SequenceKind::Csi,
                    len: 4
                }),
                text("ok"),
            ]
        );
        assert!(parser.is_ground());
    }

    #[test]
    fn huge_parameter_saturates() {
        assert_eq!(
            parse(b"\x1b[99999999999C"),
            vec![Action::CursorMove {
                direction: Direction::Right,
                count: usize::from(u16::MAX)
            }]
        );
    }

    #[test]
    fn csi_split_across_feeds() {
        let mut parser = Parser::new();
        let mut actions = parser.feed(b"\x1b[3");
        assert!(actions.is_empty());
        actions.extend(parser.feed(b"1mX"));
        assert_eq!(actions, vec![Action::Sgr(vec![31]), text("X")]);
    }

    // ── OSC ─────────────────────────────────────────────────────────

    #[test]
    fn title_terminated_by_bel_or_st() {
        assert_eq!(
            parse(b"\x1b]0;hello\x07\x1b]2;world\x1b\\"),
            vec![
                Action::SetTitle("hello".into()),
                Action::SetTitle("world".into()),
            ]
        );
    }

    #[test]
    fn title_interrupted_by_escape_sequence() {
        assert_eq!(
            parse(b"\x1b]0;t\x1b[2J"),
            vec![Action::SetTitle("t".into()), Action::EraseInDisplay(2)]
        );
    }

    #[test]
    fn read_position_and_url_extensions() {
        assert_eq!(
            parse(b"\x1b]oterm;1234;\x1b]url;http://host/x;after"),
            vec![
                Action::SetReadPosition(1234),
                Action::SetUrl("http://host/x".into()),
                text("after"),
            ]
        );
    }

    #[test]
    fn invalid_read_position() {
        assert_eq!(
            parse(b"\x1b]oterm;abc;"),
            vec![Action::Diagnostic(Diagnostic::InvalidReadPosition {
                value: "abc".into()
            })]
        );
    }

    #[test]
    fn unknown_osc_discards_body() {
        assert_eq!(
            parse(b"\x1b]777;notify;x\x07ok"),
            vec![
                Action::Diagnostic(Diagnostic::UnknownOsc {
                    prefix: "777".into()
                }),
                text("ok"),
            ]
        );
    }

    #[test]
    fn ignored_osc_discards_silently() {
        assert_eq!(
            parse(b"\x1b]8;;http://x\x1b\\link\x1b]8;;\x1b\\"),
            vec![text("link")]
        );
    }
}
