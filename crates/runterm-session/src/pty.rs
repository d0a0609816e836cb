//! PTY-backed transport: the remote process is a local child on a
//! pseudo-terminal.
//!
//! A reader thread drains the PTY master into a channel. [`PtySource::fetch`]
//! waits up to the read window for the first payload and then collects
//! whatever else is already queued, so one fetch returns one burst of output.

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::time::Duration;

use portable_pty::{CommandBuilder, MasterPty, PtySize};

use crate::geometry::GridSize;
use crate::transport::{ByteSink, ByteSource, Fetched, TransportError};

/// What to run and how to size it.
#[derive(Debug, Clone)]
pub struct PtyConfig {
    pub program: String,
    pub args: Vec<String>,
    /// TERM to set in the child.
    pub term: Option<String>,
    /// Extra environment variables for the child.
    pub env: Vec<(String, String)>,
    pub size: GridSize,
    /// How long a fetch waits for the first byte before reporting idle.
    pub read_window: Duration,
}

impl Default for PtyConfig {
    fn default() -> Self {
        Self {
            program: default_shell(),
            args: Vec::new(),
            term: Some("xterm".to_string()),
            env: Vec::new(),
            size: GridSize::default(),
            read_window: Duration::from_millis(500),
        }
    }
}

fn default_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
}

impl PtyConfig {
    /// Run `program` with `args` instead of the login shell.
    #[must_use]
    pub fn command<I, A>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: GridSize) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_read_window(mut self, window: Duration) -> Self {
        self.read_window = window;
        self
    }
}

#[derive(Debug)]
enum ReaderMsg {
    Data(Vec<u8>),
    Eof,
    Err(io::Error),
}

/// Output side of a PTY session.
#[derive(Debug)]
pub struct PtySource {
    rx: Receiver<ReaderMsg>,
    read_window: Duration,
    eof: bool,
}

/// Input side of a PTY session. Dropping it kills the child.
pub struct PtySink {
    writer: Box<dyn Write + Send>,
    master: Box<dyn MasterPty + Send>,
    child: Box<dyn portable_pty::Child + Send + Sync>,
}

impl fmt::Debug for PtySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PtySink")
            .field("child_pid", &self.child.process_id())
            .finish()
    }
}

/// Spawn `config.program` on a new PTY.
pub fn spawn(config: PtyConfig) -> io::Result<(PtySource, PtySink)> {
    let mut cmd = CommandBuilder::new(&config.program);
    cmd.args(&config.args);
    if let Some(term) = &config.term {
        cmd.env("TERM", term);
    }
    for (key, value) in &config.env {
        cmd.env(key, value);
    }

    let pty_system = portable_pty::native_pty_system();
    let pair = pty_system
        .openpty(pty_size(config.size))
        .map_err(portable_pty_error)?;

    let child = pair.slave.spawn_command(cmd).map_err(portable_pty_error)?;
    let mut reader = pair.master.try_clone_reader().map_err(portable_pty_error)?;
    let writer = pair.master.take_writer().map_err(portable_pty_error)?;

    tracing::info!(
        program = %config.program,
        pid = ?child.process_id(),
        rows = config.size.rows,
        cols = config.size.cols,
        "pty child spawned"
    );

    let (tx, rx) = mpsc::channel::<ReaderMsg>();
    thread::Builder::new()
        .name("runterm-pty-reader".to_string())
        .spawn(move || {
            let mut buf = [0u8; 8192];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => {
                        let _ = tx.send(ReaderMsg::Eof);
                        break;
                    }
                    Ok(n) => {
                        if tx.send(ReaderMsg::Data(buf[..n].to_vec())).is_err() {
                            break;
                        }
                    }
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                    Err(err) => {
                        let _ = tx.send(ReaderMsg::Err(err));
                        break;
                    }
                }
            }
        })?;

    let source = PtySource {
        rx,
        read_window: config.read_window,
        eof: false,
    };
    let sink = PtySink {
        writer,
        master: pair.master,
        child,
    };
    Ok((source, sink))
}

fn pty_size(size: GridSize) -> PtySize {
    PtySize {
        rows: size.rows,
        cols: size.cols,
        pixel_width: 0,
        pixel_height: 0,
    }
}

fn portable_pty_error<E: fmt::Display>(err: E) -> io::Error {
    io::Error::other(err.to_string())
}

impl PtySource {
    fn absorb(&mut self, msg: ReaderMsg, out: &mut Vec<u8>) -> Result<(), TransportError> {
        match msg {
            ReaderMsg::Data(bytes) => out.extend_from_slice(&bytes),
            ReaderMsg::Eof => self.eof = true,
            // An error after data still delivers the data; the next fetch ends.
            ReaderMsg::Err(err) if !out.is_empty() => {
                tracing::debug!(%err, "pty read error after data");
                self.eof = true;
            }
            ReaderMsg::Err(err) => return Err(TransportError::Io(err)),
        }
        Ok(())
    }
}

impl ByteSource for PtySource {
    fn fetch(&mut self, _position: Option<u64>) -> Result<Fetched, TransportError> {
        if self.eof {
            return Ok(Fetched::Ended);
        }

        let mut out = Vec::new();
        match self.rx.recv_timeout(self.read_window) {
            Ok(msg) => self.absorb(msg, &mut out)?,
            Err(RecvTimeoutError::Timeout) => return Ok(Fetched::Idle),
            Err(RecvTimeoutError::Disconnected) => self.eof = true,
        }

        while !self.eof {
            match self.rx.try_recv() {
                Ok(msg) => self.absorb(msg, &mut out)?,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.eof = true,
            }
        }

        if out.is_empty() {
            return Ok(if self.eof { Fetched::Ended } else { Fetched::Idle });
        }
        tracing::trace!(bytes = out.len(), "pty output");
        Ok(Fetched::Data(out))
    }
}

impl ByteSink for PtySink {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        Ok(())
    }

    fn resize(&mut self, size: GridSize) -> Result<(), TransportError> {
        tracing::debug!(rows = size.rows, cols = size.cols, "pty resize");
        self.master
            .resize(pty_size(size))
            .map_err(|err| TransportError::Rejected(err.to_string()))
    }
}

impl PtySink {
    #[must_use]
    pub fn child_pid(&self) -> Option<u32> {
        self.child.process_id()
    }

    /// Whether the child is still running.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }
}

impl Drop for PtySink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
        let _ = self.child.kill();
    }
}
