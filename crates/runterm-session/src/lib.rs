#![forbid(unsafe_code)]

//! Session driver for `runterm`.
//!
//! `runterm-core` knows nothing about where bytes come from. This crate
//! connects a [`Terminal`](runterm_core::Terminal) to a remote process:
//!
//! - [`driver`]: sans-I/O poll/send state machine with adaptive backoff and
//!   coalesced key sends, driven by an explicit clock.
//! - [`transport`]: the [`ByteSource`]/[`ByteSink`] seams plus in-memory
//!   implementations for replays and tests.
//! - [`pty`]: a local child process on a pseudo-terminal.
//! - [`runner`]: blocking and threaded loops executing driver commands.
//! - [`geometry`] and [`config`]: grid sizing and scheduling policy.

pub mod config;
pub mod driver;
pub mod geometry;
pub mod pty;
pub mod runner;
pub mod transport;

pub use config::{ConfigError, SessionConfig};
pub use driver::{Command, PROGRAM_EXITED, SessionDriver, SessionStatus};
pub use geometry::{GridSize, PixelGeometry};
pub use pty::{PtyConfig, PtySink, PtySource};
pub use runner::{HostInput, LogObserver, SessionHandle, SessionObserver, run_blocking, spawn};
pub use transport::{ByteSink, ByteSource, Fetched, RecordingSink, ReplaySource, TransportError};
