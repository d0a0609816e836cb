//! Non-fatal diagnostics.
//!
//! Nothing inside the parser or the screen buffer is an error in the `Result`
//! sense: unknown or malformed input is reported here and processing carries
//! on with the next character. Hosts drain these and show them as short-lived
//! messages.

use core::fmt;

/// Kind of string sequence that exceeded the accumulation limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Csi,
    Osc,
    Title,
    Extension,
}

impl SequenceKind {
    const fn name(self) -> &'static str {
        match self {
            Self::Csi => "CSI",
            Self::Osc => "OSC",
            Self::Title => "title",
            Self::Extension => "extension",
        }
    }
}

/// A human-readable, fire-and-forget report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// CSI final byte not in any table.
    UnknownCsi { params: String, final_byte: char },
    /// OSC prefix not in any table.
    UnknownOsc { prefix: String },
    /// Mode code not in the set/reset tables.
    UnknownMode { code: u16, set: bool },
    /// SGR parameter not in the colour/attribute tables.
    UnknownSgr { code: u16 },
    /// `CSI n J` with an unsupported `n`.
    UnknownClearMode { mode: u16 },
    /// `CSI n K` with an unsupported `n`.
    UnknownEraseMode { mode: u16 },
    /// A sequence grew past the configured limit and was dropped.
    Overlong { kind: SequenceKind, len: usize },
    /// A cursor move or blank insertion was cut short at the screen limits.
    ScreenLimit { max_rows: usize, max_cols: usize },
    /// The read-position extension carried a non-numeric value.
    InvalidReadPosition { value: String },
    /// Informational status (geometry changes, echo changes, ...).
    Status(String),
    /// The session can no longer make progress.
    SessionEnded { reason: String },
}

impl Diagnostic {
    /// Whether this diagnostic marks the end of the session.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SessionEnded { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCsi { params, final_byte } => {
                write!(f, "unknown escape code ESC[{params}{}", final_byte.escape_debug())
            }
            Self::UnknownOsc { prefix } => write!(f, "unknown OSC code {prefix:?}"),
            Self::UnknownMode { code, set } => {
                let which = if *set { "high" } else { "low" };
                write!(f, "unknown {which} mode {code}")
            }
            Self::UnknownSgr { code } => write!(f, "unknown color code {code}"),
            Self::UnknownClearMode { mode } => write!(f, "unknown clear screen mode {mode}"),
            Self::UnknownEraseMode { mode } => write!(f, "unknown erase line mode {mode}"),
            Self::Overlong { kind, len } => {
                write!(f, "{} sequence dropped after {len} bytes", kind.name())
            }
            Self::ScreenLimit { max_rows, max_cols } => {
                write!(f, "screen limit reached ({max_rows} rows, {max_cols} columns)")
            }
            Self::InvalidReadPosition { value } => {
                write!(f, "invalid read position {value:?}")
            }
            Self::Status(message) => f.write_str(message),
            Self::SessionEnded { reason } => f.write_str(reason),
        }
    }
}
