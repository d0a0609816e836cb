//! Blocking runners that execute [`SessionDriver`] commands against real
//! transports.
//!
//! - [`run_blocking`] runs everything on the calling thread. It takes no host
//!   input, which suits replays and scripted tests.
//! - [`spawn`] runs the session on its own thread with one worker per
//!   transport direction, so a slow fetch never delays a key send. Host input
//!   arrives through the returned [`SessionHandle`].

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use runterm_core::{Diagnostic, KeyEvent, RenderEvent, RenderSink, Screen};

use crate::driver::{Command, SessionDriver, SessionStatus};
use crate::geometry::{GridSize, PixelGeometry};
use crate::transport::{ByteSink, ByteSource, Fetched, TransportError};

/// Receives everything a session produces for the user.
pub trait SessionObserver {
    fn render(&mut self, event: &RenderEvent, screen: &Screen);

    /// Short-lived status and error messages. Logged by default.
    fn diagnostic(&mut self, diagnostic: &Diagnostic) {
        log_diagnostic(diagnostic);
    }
}

/// Observer that only logs diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SessionObserver for LogObserver {
    fn render(&mut self, _event: &RenderEvent, _screen: &Screen) {}
}

struct RenderAdapter<'a, O: ?Sized>(&'a mut O);

impl<O: SessionObserver + ?Sized> RenderSink for RenderAdapter<'_, O> {
    fn apply(&mut self, event: &RenderEvent, screen: &Screen) {
        self.0.render(event, screen);
    }
}

fn log_diagnostic(diagnostic: &Diagnostic) {
    match diagnostic {
        Diagnostic::SessionEnded { .. } => tracing::warn!(%diagnostic, "session diagnostic"),
        Diagnostic::Status(_) => tracing::info!(%diagnostic, "session status"),
        _ => tracing::debug!(%diagnostic, "terminal diagnostic"),
    }
}

fn publish<O: SessionObserver + ?Sized>(driver: &mut SessionDriver, observer: &mut O) {
    let terminal = driver.terminal_mut();
    for diagnostic in terminal.drain_diagnostics() {
        observer.diagnostic(&diagnostic);
    }
    terminal.render_to(&mut RenderAdapter(observer));
}

fn fire_and_forget(what: &str, result: Result<(), TransportError>) {
    if let Err(err) = result {
        tracing::warn!(%err, "{what} failed");
    }
}

// ── Single-threaded ─────────────────────────────────────────────────────

/// Drive a session on the current thread until the stream ends or fails.
///
/// Fetches block the thread; idle periods sleep until the next deadline.
pub fn run_blocking<S, K, O>(
    driver: &mut SessionDriver,
    source: &mut S,
    sink: &mut K,
    observer: &mut O,
) -> SessionStatus
where
    S: ByteSource + ?Sized,
    K: ByteSink + ?Sized,
    O: SessionObserver + ?Sized,
{
    let clock = Instant::now();
    driver.start(clock.elapsed());

    loop {
        while let Some(command) = driver.poll_command() {
            match command {
                Command::Fetch { position, initial } => {
                    let result = if initial {
                        source.fetch_initial()
                    } else {
                        source.fetch(position)
                    };
                    driver.on_fetch(result, clock.elapsed());
                }
                Command::Send(bytes) => {
                    let result = sink.send(&bytes);
                    driver.on_send(result, clock.elapsed());
                }
                Command::Resize(size) => fire_and_forget("resize", sink.resize(size)),
                Command::ReportTitle(title) => {
                    fire_and_forget("title report", sink.report_title(&title));
                }
            }
        }
        publish(driver, observer);

        if driver.status() != SessionStatus::Running {
            return driver.status();
        }
        let Some(deadline) = driver.next_deadline() else {
            return driver.status();
        };
        let now = clock.elapsed();
        if deadline > now {
            thread::sleep(deadline - now);
        }
        driver.poll(clock.elapsed());
    }
}

// ── Threaded ────────────────────────────────────────────────────────────

/// Input from the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum HostInput {
    Key(KeyEvent),
    Paste(String),
    Geometry(PixelGeometry),
    Shutdown,
}

enum LoopEvent {
    Host(HostInput),
    Fetched(Result<Fetched, TransportError>),
    Sent(Result<(), TransportError>),
}

struct FetchRequest {
    position: Option<u64>,
    initial: bool,
}

enum SinkRequest {
    Send(Vec<u8>),
    Resize(GridSize),
    ReportTitle(String),
}

/// Host side of a spawned session.
#[derive(Debug)]
pub struct SessionHandle {
    tx: Sender<LoopEvent>,
    thread: JoinHandle<SessionDriver>,
}

impl SessionHandle {
    /// Queue host input. Returns `false` once the session thread is gone.
    pub fn input(&self, input: HostInput) -> bool {
        self.tx.send(LoopEvent::Host(input)).is_ok()
    }

    pub fn key(&self, event: KeyEvent) -> bool {
        self.input(HostInput::Key(event))
    }

    pub fn paste(&self, text: impl Into<String>) -> bool {
        self.input(HostInput::Paste(text.into()))
    }

    pub fn geometry(&self, geometry: PixelGeometry) -> bool {
        self.input(HostInput::Geometry(geometry))
    }

    /// Ask the session to stop and wait for it, returning the final state.
    pub fn shutdown(self) -> thread::Result<SessionDriver> {
        let _ = self.tx.send(LoopEvent::Host(HostInput::Shutdown));
        self.thread.join()
    }

    /// Wait for the session to end on its own.
    pub fn join(self) -> thread::Result<SessionDriver> {
        self.thread.join()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Run a session on a background thread.
///
/// The source and sink each get a worker thread. A worker blocked in a
/// transport call exits after that call returns.
pub fn spawn<S, K, O>(
    driver: SessionDriver,
    source: S,
    sink: K,
    observer: O,
) -> io::Result<SessionHandle>
where
    S: ByteSource + Send + 'static,
    K: ByteSink + Send + 'static,
    O: SessionObserver + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<LoopEvent>();
    let fetch_tx = spawn_fetch_worker(source, tx.clone())?;
    let sink_tx = spawn_sink_worker(sink, tx.clone())?;

    let thread = thread::Builder::new()
        .name("runterm-session".to_string())
        .spawn(move || session_loop(driver, observer, rx, fetch_tx, sink_tx))?;

    Ok(SessionHandle { tx, thread })
}

fn spawn_fetch_worker<S>(mut source: S, events: Sender<LoopEvent>) -> io::Result<Sender<FetchRequest>>
where
    S: ByteSource + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<FetchRequest>();
    thread::Builder::new()
        .name("runterm-fetch".to_string())
        .spawn(move || {
            for request in rx {
                let result = if request.initial {
                    source.fetch_initial()
                } else {
                    source.fetch(request.position)
                };
                if events.send(LoopEvent::Fetched(result)).is_err() {
                    break;
                }
            }
        })?;
    Ok(tx)
}

fn spawn_sink_worker<K>(mut sink: K, events: Sender<LoopEvent>) -> io::Result<Sender<SinkRequest>>
where
    K: ByteSink + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<SinkRequest>();
    thread::Builder::new()
        .name("runterm-send".to_string())
        .spawn(move || {
            for request in rx {
                match request {
                    SinkRequest::Send(bytes) => {
                        if events.send(LoopEvent::Sent(sink.send(&bytes))).is_err() {
                            break;
                        }
                    }
                    SinkRequest::Resize(size) => fire_and_forget("resize", sink.resize(size)),
                    SinkRequest::ReportTitle(title) => {
                        fire_and_forget("title report", sink.report_title(&title));
                    }
                }
            }
        })?;
    Ok(tx)
}

fn session_loop<O: SessionObserver>(
    mut driver: SessionDriver,
    mut observer: O,
    rx: Receiver<LoopEvent>,
    fetch_tx: Sender<FetchRequest>,
    sink_tx: Sender<SinkRequest>,
) -> SessionDriver {
    let clock = Instant::now();
    driver.start(clock.elapsed());

    loop {
        while let Some(command) = driver.poll_command() {
            dispatch(&mut driver, command, &fetch_tx, &sink_tx, clock.elapsed());
        }
        publish(&mut driver, &mut observer);

        if driver.status() == SessionStatus::Failed {
            break;
        }

        let event = match driver.next_deadline() {
            Some(deadline) => {
                let wait = deadline.saturating_sub(clock.elapsed());
                match rx.recv_timeout(wait.max(Duration::from_millis(1))) {
                    Ok(event) => Some(event),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match rx.recv() {
                Ok(event) => Some(event),
                Err(_) => break,
            },
        };

        let now = clock.elapsed();
        match event {
            Some(LoopEvent::Host(HostInput::Shutdown)) => {
                tracing::info!("session shutdown requested");
                break;
            }
            Some(LoopEvent::Host(HostInput::Key(key))) => {
                driver.key(&key, now);
            }
            Some(LoopEvent::Host(HostInput::Paste(text))) => driver.paste(&text, now),
            Some(LoopEvent::Host(HostInput::Geometry(geometry))) => {
                driver.geometry(geometry);
            }
            Some(LoopEvent::Fetched(result)) => driver.on_fetch(result, now),
            Some(LoopEvent::Sent(result)) => driver.on_send(result, now),
            None => {}
        }
        driver.poll(clock.elapsed());
    }

    publish(&mut driver, &mut observer);
    driver
}

fn dispatch(
    driver: &mut SessionDriver,
    command: Command,
    fetch_tx: &Sender<FetchRequest>,
    sink_tx: &Sender<SinkRequest>,
    now: Duration,
) {
    match command {
        Command::Fetch { position, initial } => {
            if fetch_tx.send(FetchRequest { position, initial }).is_err() {
                driver.on_fetch(Err(TransportError::Closed), now);
            }
        }
        Command::Send(bytes) => {
            if sink_tx.send(SinkRequest::Send(bytes)).is_err() {
                driver.on_send(Err(TransportError::Closed), now);
            }
        }
        Command::Resize(size) => {
            let _ = sink_tx.send(SinkRequest::Resize(size));
        }
        Command::ReportTitle(title) => {
            let _ = sink_tx.send(SinkRequest::ReportTitle(title));
        }
    }
}
