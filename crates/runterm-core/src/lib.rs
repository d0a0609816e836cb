#![forbid(unsafe_code)]

//! Host-agnostic terminal model.
//!
//! `runterm-core` turns the raw output of a remote shell into an in-memory
//! screen and turns local key presses into the bytes to send back. It never
//! performs I/O: a host feeds it payloads, reads the screen or drains render
//! events, and ships encoded keys over whatever transport it likes.
//!
//! # Primary responsibilities
//!
//! - **Screen**: rows of styled runs, with overwrite/insert, erase, delete and
//!   lazy row creation.
//! - **Parser**: escape-sequence state machine producing typed actions.
//! - **Modes / Cursor / Style**: the state consulted while writing.
//! - **Input**: key-event to byte-sequence encoding from swappable key maps.
//! - **Terminal**: the single owner composing all of the above.
//!
//! # Design principles
//!
//! - **No I/O**: all types are pure data + logic.
//! - **Deterministic**: identical byte streams produce identical screens,
//!   however the stream is split into chunks.
//! - **Never fails on input**: unknown sequences become [`Diagnostic`]s.

pub mod cursor;
pub mod diagnostics;
pub mod glyph;
pub mod input;
pub mod keymap;
pub mod logging;
pub mod modes;
pub mod parser;
pub mod render;
pub mod screen;
pub mod style;
pub mod tables;
pub mod terminal;

#[cfg(feature = "tracing")]
pub use logging::{debug, info, trace, warn};

pub use cursor::Cursor;
pub use diagnostics::{Diagnostic, SequenceKind};
pub use glyph::Glyph;
pub use input::{KeyEvent, Modifiers, encode_key, encode_paste_text};
pub use keymap::{KeyAction, KeyMap};
pub use modes::Modes;
pub use parser::{Action, Parser};
pub use render::{RenderEvent, RenderSink};
pub use screen::{Direction, Row, Run, Screen};
pub use style::{Attrs, Color, Style};
pub use terminal::{Terminal, TerminalConfig};
