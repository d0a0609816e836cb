//! Terminal session object: the single owner of all terminal state.
//!
//! [`Terminal`] composes the parser, the screen buffer, the mode flags and the
//! current style (the "pen"). One `feed` call is one atomic transition; hosts
//! running on several threads guard the whole `Terminal` as one critical
//! section per call.

use crate::diagnostics::Diagnostic;
use crate::glyph::Glyph;
use crate::input::{self, KeyEvent};
use crate::keymap::KeyMap;
use crate::modes::Modes;
use crate::parser::{Action, DEFAULT_MAX_SEQUENCE_LEN, Parser};
use crate::render::{RenderEvent, RenderSink};
use crate::screen::{DEFAULT_MAX_COLS, DEFAULT_MAX_ROWS, Screen};
use crate::style::Style;
use crate::tables::{self, Lookup, ModeEffect};

/// Configuration for [`Terminal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalConfig {
    /// Start in application cursor-key mode.
    pub cursor_keys_application: bool,
    /// Start with local echo on.
    pub local_echo: bool,
    /// Longest CSI/OSC sequence accepted before it is dropped.
    pub max_sequence_len: usize,
    /// Rows cursor movement and line feeds may create.
    pub max_rows: usize,
    /// Furthest column cursor movement may reach.
    pub max_cols: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            cursor_keys_application: true,
            local_echo: false,
            max_sequence_len: DEFAULT_MAX_SEQUENCE_LEN,
            max_rows: DEFAULT_MAX_ROWS,
            max_cols: DEFAULT_MAX_COLS,
        }
    }
}

impl TerminalConfig {
    #[must_use]
    pub fn with_cursor_keys_application(mut self, enabled: bool) -> Self {
        self.cursor_keys_application = enabled;
        self
    }

    #[must_use]
    pub fn with_local_echo(mut self, enabled: bool) -> Self {
        self.local_echo = enabled;
        self
    }

    #[must_use]
    pub fn with_max_sequence_len(mut self, len: usize) -> Self {
        self.max_sequence_len = len;
        self
    }

    #[must_use]
    pub fn with_limits(mut self, max_rows: usize, max_cols: usize) -> Self {
        self.max_rows = max_rows;
        self.max_cols = max_cols;
        self
    }

    fn initial_modes(&self) -> Modes {
        Modes::initial(self.cursor_keys_application, self.local_echo)
    }
}

/// A terminal session.
#[derive(Debug, Clone)]
pub struct Terminal {
    config: TerminalConfig,
    parser: Parser,
    screen: Screen,
    modes: Modes,
    pen: Style,
    keymap: KeyMap,
    title: Option<String>,
    url: Option<String>,
    read_position: Option<u64>,
    title_report: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal {
    /// Create a terminal with default configuration and the US key map.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TerminalConfig::default())
    }

    #[must_use]
    pub fn with_config(config: TerminalConfig) -> Self {
        Self {
            parser: Parser::with_max_sequence_len(config.max_sequence_len),
            screen: Screen::with_limits(config.max_rows, config.max_cols),
            modes: config.initial_modes(),
            pen: Style::DEFAULT,
            keymap: KeyMap::us(),
            title: None,
            url: None,
            read_position: None,
            title_report: None,
            diagnostics: Vec::new(),
            config,
        }
    }

    /// Replace the keyboard layout.
    #[must_use]
    pub fn with_keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    #[must_use]
    pub fn modes(&self) -> Modes {
        self.modes
    }

    /// Style applied to the next write.
    #[must_use]
    pub fn pen(&self) -> Style {
        self.pen
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Last stream position announced by the remote side.
    #[must_use]
    pub fn read_position(&self) -> Option<u64> {
        self.read_position
    }

    #[must_use]
    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    #[must_use]
    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    // ── Feeding ─────────────────────────────────────────────────────

    /// Feed one payload of remote output.
    ///
    /// Never fails: unknown or malformed sequences become diagnostics.
    /// Returns the number of parser actions applied.
    pub fn feed(&mut self, bytes: &[u8]) -> usize {
        let actions = self.parser.feed(bytes);
        let count = actions.len();
        for action in actions {
            self.apply_action(action);
        }
        count
    }

    /// Convenience wrapper around [`Terminal::feed`].
    pub fn feed_str(&mut self, text: &str) -> usize {
        self.feed(text.as_bytes())
    }

    /// Apply one parsed action.
    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::Text(glyphs) => self.write(&glyphs),
            Action::LineFeed => {
                let moved = self.screen.new_line();
                self.check_limit(moved);
            }
            Action::CarriageReturn => self.screen.carriage_return(),
            Action::Backspace => self.screen.backspace(),
            Action::Tab => {
                let cursor = self.screen.cursor();
                let blanks = vec![Glyph::Blank; cursor.next_tab_stop() - cursor.col];
                self.write(&blanks);
            }
            Action::Bell => self.screen.push_event(RenderEvent::Bell),
            Action::Sgr(params) => {
                for code in self.pen.apply_sgr(&params) {
                    self.report(Diagnostic::UnknownSgr { code });
                }
            }
            Action::CursorPosition { row, col } => {
                let within = self.screen.set_cursor(row, col);
                self.check_limit(within);
            }
            Action::CursorMove { direction, count } => {
                let within = self.screen.move_cursor(direction, count);
                self.check_limit(within);
            }
            Action::NextLine(count) => {
                let row = self.screen.cursor().row.saturating_add(count);
                let within = self.screen.set_cursor(row, 1);
                self.check_limit(within);
            }
            Action::PreviousLine(count) => {
                let row = self.screen.cursor().row.saturating_sub(count);
                self.screen.set_cursor(row, 1);
            }
            Action::RowAbsolute(row) => {
                let within = self.screen.set_row(row);
                self.check_limit(within);
            }
            Action::ColumnAbsolute(col) => {
                let within = self.screen.set_col(col);
                self.check_limit(within);
            }
            Action::EraseInLine(mode) => {
                if !self.screen.erase_in_line(mode) {
                    self.report(Diagnostic::UnknownEraseMode { mode });
                }
            }
            Action::EraseInDisplay(mode) => {
                if !self.screen.clear(mode) {
                    self.report(Diagnostic::UnknownClearMode { mode });
                }
            }
            Action::EraseChars(count) => self.screen.erase_chars(count),
            Action::DeleteChars(count) => self.screen.delete_chars(count),
            Action::InsertBlanks(count) => {
                let within = self.screen.insert_blanks(count);
                self.check_limit(within);
            }
            Action::SetModes(codes) => self.apply_modes(&codes, true),
            Action::ResetModes(codes) => self.apply_modes(&codes, false),
            Action::KeypadApplication => self.modes.insert(Modes::KEYPAD_APPLICATION),
            Action::KeypadNumeric => self.modes.remove(Modes::KEYPAD_APPLICATION),
            Action::FullReset => self.reset(),
            Action::SetTitle(title) => {
                self.screen.push_event(RenderEvent::TitleChanged(title.clone()));
                self.title_report = Some(title.clone());
                self.title = Some(title);
            }
            Action::SetReadPosition(position) => {
                crate::trace!(position, "read position");
                self.read_position = Some(position);
            }
            Action::SetUrl(url) => {
                self.screen.push_event(RenderEvent::UrlChanged(url.clone()));
                self.url = Some(url);
            }
            Action::Diagnostic(diagnostic) => self.report(diagnostic),
        }
    }

    fn write(&mut self, glyphs: &[Glyph]) {
        self.screen.write(glyphs, self.pen, self.modes.insert_mode());
    }

    fn apply_modes(&mut self, codes: &[u16], set: bool) {
        for &code in codes {
            match tables::mode_effect(code) {
                Lookup::Known(ModeEffect::Flag(flag)) => self.set_mode(flag, set),
                Lookup::Known(ModeEffect::ClearScreen) => {
                    self.screen.clear(2);
                }
                Lookup::Ignored => {
                    crate::trace!(code, set, "ignored mode");
                }
                Lookup::Unknown => self.report(Diagnostic::UnknownMode { code, set }),
            }
        }
    }

    fn set_mode(&mut self, flag: Modes, set: bool) {
        if self.modes.contains(flag) == set {
            return;
        }
        crate::debug!(mode = ?flag, set, "mode change");
        self.modes.set(flag, set);
        if flag == Modes::CURSOR_VISIBLE {
            self.screen.push_event(RenderEvent::CursorVisibility(set));
        } else if flag == Modes::LOCAL_ECHO {
            let message = if set { "Local echo" } else { "Remote echo" };
            self.report(Diagnostic::Status(message.to_owned()));
        }
    }

    fn check_limit(&mut self, within: bool) {
        if !within {
            self.report(Diagnostic::ScreenLimit {
                max_rows: self.screen.max_rows(),
                max_cols: self.screen.max_cols(),
            });
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        crate::debug!(%diagnostic, "terminal diagnostic");
        self.diagnostics.push(diagnostic);
    }

    /// Restore the initial screen, cursor, style and modes. Title, URL and
    /// read position are kept since they describe the session, not the screen.
    pub fn reset(&mut self) {
        crate::info!("full terminal reset");
        self.parser.reset();
        self.screen.clear(2);
        self.modes = self.config.initial_modes();
        self.pen = Style::DEFAULT;
        self.screen.push_event(RenderEvent::CursorVisibility(true));
    }

    // ── Draining ────────────────────────────────────────────────────

    /// Take all queued diagnostics.
    pub fn drain_diagnostics(&mut self) -> Vec<Diagnostic> {
        core::mem::take(&mut self.diagnostics)
    }

    /// Record a diagnostic from outside the parser (session status etc.).
    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.report(diagnostic);
    }

    /// Take all queued render events.
    pub fn drain_events(&mut self) -> Vec<RenderEvent> {
        self.screen.take_events()
    }

    /// Drop queued render events, e.g. before a full redraw.
    pub fn discard_events(&mut self) {
        self.screen.discard_events();
    }

    /// Deliver all queued render events to `sink`.
    pub fn render_to<S: RenderSink + ?Sized>(&mut self, sink: &mut S) {
        for event in self.screen.take_events() {
            sink.apply(&event, &self.screen);
        }
    }

    /// Title set since the last call, for forwarding to the transport.
    pub fn take_title_report(&mut self) -> Option<String> {
        self.title_report.take()
    }

    // ── Input ───────────────────────────────────────────────────────

    /// Bytes to send for a key press in the current modes.
    #[must_use]
    pub fn encode_key(&self, event: &KeyEvent) -> Vec<u8> {
        input::encode_key(event, self.modes, &self.keymap)
    }

    /// Bytes to send for pasted text in the current modes.
    #[must_use]
    pub fn encode_paste(&self, text: &str) -> Vec<u8> {
        input::encode_paste_text(text, self.modes.bracketed_paste())
    }
}
