//! Sans-I/O session driver.
//!
//! [`SessionDriver`] owns a [`Terminal`] and decides *when* to talk to the
//! transport; it never talks to it itself. The host feeds it completions and
//! the current time, and executes the [`Command`]s it emits:
//!
//! ```text
//!   start(now) ─► Fetch ─► on_fetch(Data)  ─► feed terminal ─► Fetch (immediately)
//!                          on_fetch(Idle)  ─► wait interval, interval *= backoff
//!                          on_fetch(Ended) ─► Failed + "Program exited."
//!   key(now)   ─► Send ─► on_send(Ok) ─► Send(keys typed meanwhile, coalesced)
//! ```
//!
//! # Invariants
//!
//! - At most one fetch and at most one send are outstanding.
//! - Keys typed while a send is outstanding are concatenated and flushed as a
//!   single follow-up send.
//! - Data resets the poll interval to the base; idle fetches back it off
//!   geometrically up to the maximum.
//! - Typing arms a boost timer that restarts polling at the base interval;
//!   starting any fetch cancels it.
//! - A transport failure or the end of the stream is terminal: the driver
//!   reports [`Diagnostic::SessionEnded`] and emits nothing afterwards.

use std::collections::VecDeque;
use std::time::Duration;

use runterm_core::{Diagnostic, KeyEvent, Terminal};

use crate::config::SessionConfig;
use crate::geometry::{GridSize, PixelGeometry};
use crate::transport::{Fetched, TransportError};

/// Message shown when the remote stream ends.
pub const PROGRAM_EXITED: &str = "Program exited.";

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    NotStarted,
    Running,
    Failed,
}

/// Transport work requested by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch output; `initial` asks for the buffered history instead.
    Fetch { position: Option<u64>, initial: bool },
    /// Send key bytes. Completion must be reported through
    /// [`SessionDriver::on_send`].
    Send(Vec<u8>),
    /// Announce new grid dimensions. Fire-and-forget.
    Resize(GridSize),
    /// Forward a title change. Fire-and-forget.
    ReportTitle(String),
}

/// Poll/send state machine for one session.
#[derive(Debug)]
pub struct SessionDriver {
    config: SessionConfig,
    terminal: Terminal,
    status: SessionStatus,
    fetch_in_flight: bool,
    send_in_flight: bool,
    pending_send: Vec<u8>,
    interval: Duration,
    next_fetch_at: Option<Duration>,
    boost_at: Option<Duration>,
    grid: Option<GridSize>,
    commands: VecDeque<Command>,
}

impl SessionDriver {
    /// Create a driver. Out-of-range poll settings are logged and the poll
    /// interval is kept within `[poll_base, poll_max]` regardless.
    #[must_use]
    pub fn new(config: SessionConfig, terminal: Terminal) -> Self {
        if let Err(err) = config.validate() {
            tracing::warn!(%err, "session config out of range");
        }
        Self {
            interval: config.poll_base,
            config,
            terminal,
            status: SessionStatus::NotStarted,
            fetch_in_flight: false,
            send_in_flight: false,
            pending_send: Vec::new(),
            next_fetch_at: None,
            boost_at: None,
            grid: None,
            commands: VecDeque::new(),
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal {
        &mut self.terminal
    }

    #[must_use]
    pub fn into_terminal(self) -> Terminal {
        self.terminal
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current poll interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn grid(&self) -> Option<GridSize> {
        self.grid
    }

    #[must_use]
    pub fn is_fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    #[must_use]
    pub fn is_send_in_flight(&self) -> bool {
        self.send_in_flight
    }

    /// Key bytes waiting for the outstanding send to complete.
    #[must_use]
    pub fn pending_send(&self) -> &[u8] {
        &self.pending_send
    }

    /// Next command to execute, if any.
    pub fn poll_command(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    pub fn drain_commands(&mut self) -> Vec<Command> {
        self.commands.drain(..).collect()
    }

    /// Earliest time at which [`poll`](Self::poll) has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.status != SessionStatus::Running || self.fetch_in_flight {
            return None;
        }
        match (self.next_fetch_at, self.boost_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Begin polling: the backlog fetch first when configured.
    pub fn start(&mut self, _now: Duration) {
        if self.status != SessionStatus::NotStarted {
            return;
        }
        tracing::info!(
            backlog = self.config.initial_backlog,
            base_ms = self.config.poll_base.as_millis() as u64,
            "session started"
        );
        self.status = SessionStatus::Running;
        self.terminal
            .push_diagnostic(Diagnostic::Status("Ready".to_string()));
        self.begin_fetch(self.config.initial_backlog);
    }

    /// Fire expired timers.
    pub fn poll(&mut self, now: Duration) {
        if self.status != SessionStatus::Running || self.fetch_in_flight {
            return;
        }
        if self.boost_at.is_some_and(|at| at <= now) {
            tracing::trace!("poll boost fired");
            self.interval = self.config.poll_base;
            self.begin_fetch(false);
        } else if self.next_fetch_at.is_some_and(|at| at <= now) {
            self.begin_fetch(false);
        }
    }

    fn begin_fetch(&mut self, initial: bool) {
        self.fetch_in_flight = true;
        self.next_fetch_at = None;
        self.boost_at = None;
        self.commands.push_back(Command::Fetch {
            position: self.terminal.read_position(),
            initial,
        });
    }

    fn fail(&mut self, reason: String) {
        tracing::warn!(%reason, "session ended");
        self.status = SessionStatus::Failed;
        self.fetch_in_flight = false;
        self.send_in_flight = false;
        self.pending_send.clear();
        self.next_fetch_at = None;
        self.boost_at = None;
        self.commands.clear();
        self.terminal
            .push_diagnostic(Diagnostic::SessionEnded { reason });
    }

    // ── Completions ─────────────────────────────────────────────────

    /// Report the result of the outstanding fetch.
    pub fn on_fetch(&mut self, result: Result<Fetched, TransportError>, now: Duration) {
        if self.status != SessionStatus::Running {
            return;
        }
        if !self.fetch_in_flight {
            tracing::debug!("fetch completion without an outstanding fetch");
            return;
        }
        self.fetch_in_flight = false;
        match result {
            Ok(Fetched::Data(bytes)) => {
                tracing::debug!(bytes = bytes.len(), "output received");
                self.terminal.feed(&bytes);
                self.forward_title();
                self.interval = self.config.poll_base;
                self.begin_fetch(false);
            }
            Ok(Fetched::Idle) => {
                self.next_fetch_at = Some(now.saturating_add(self.interval));
                self.interval = self.backed_off();
                tracing::trace!(
                    interval_ms = self.interval.as_millis() as u64,
                    "idle fetch, backing off"
                );
            }
            Ok(Fetched::Ended) => self.fail(PROGRAM_EXITED.to_string()),
            Err(err) => self.fail(format!("{PROGRAM_EXITED} ({err})")),
        }
    }

    /// Next poll interval after an idle fetch. A backoff factor that cannot
    /// be applied (NaN, negative, overflowing) jumps straight to `poll_max`.
    fn backed_off(&self) -> Duration {
        let SessionConfig {
            poll_base,
            poll_max,
            poll_backoff,
            ..
        } = self.config;
        Duration::try_from_secs_f64(self.interval.as_secs_f64() * poll_backoff)
            .unwrap_or(poll_max)
            .min(poll_max)
            .max(poll_base)
    }

    /// Report the result of the outstanding send. Sends issued before
    /// [`start`](Self::start) complete here too.
    pub fn on_send(&mut self, result: Result<(), TransportError>, _now: Duration) {
        if self.status == SessionStatus::Failed {
            return;
        }
        if !self.send_in_flight {
            tracing::debug!("send completion without an outstanding send");
            return;
        }
        self.send_in_flight = false;
        match result {
            Ok(()) => self.flush_send(),
            Err(err) => self.fail(format!("{PROGRAM_EXITED} ({err})")),
        }
    }

    // ── Host input ──────────────────────────────────────────────────

    /// Encode and queue a key press. Returns `false` for unmapped keys.
    pub fn key(&mut self, event: &KeyEvent, now: Duration) -> bool {
        let bytes = self.terminal.encode_key(event);
        if bytes.is_empty() {
            return false;
        }
        self.send_bytes(&bytes, now);
        true
    }

    /// Encode and queue pasted text.
    pub fn paste(&mut self, text: &str, now: Duration) {
        let bytes = self.terminal.encode_paste(text);
        if !bytes.is_empty() {
            self.send_bytes(&bytes, now);
        }
    }

    /// Queue raw bytes for the remote process.
    pub fn send_bytes(&mut self, bytes: &[u8], now: Duration) {
        if self.status == SessionStatus::Failed {
            tracing::debug!(bytes = bytes.len(), "dropping input after session end");
            return;
        }
        if self.terminal.modes().local_echo() {
            self.terminal.feed(bytes);
            self.forward_title();
        }
        self.pending_send.extend_from_slice(bytes);
        if self.status == SessionStatus::Running && !self.fetch_in_flight {
            self.boost_at = Some(now + self.config.poll_base);
        }
        if !self.send_in_flight {
            self.flush_send();
        }
    }

    fn flush_send(&mut self) {
        if self.pending_send.is_empty() {
            return;
        }
        self.send_in_flight = true;
        let bytes = std::mem::take(&mut self.pending_send);
        tracing::trace!(bytes = bytes.len(), "sending input");
        self.commands.push_back(Command::Send(bytes));
    }

    /// Recompute the grid from new measurements; announces real changes.
    pub fn geometry(&mut self, geometry: PixelGeometry) -> Option<GridSize> {
        if self.status == SessionStatus::Failed {
            return None;
        }
        let size = geometry.grid_size(self.config.reserved_rows, self.config.reserved_cols)?;
        if self.grid == Some(size) {
            return None;
        }
        self.grid = Some(size);
        tracing::info!(rows = size.rows, cols = size.cols, "geometry changed");
        self.terminal
            .push_diagnostic(Diagnostic::Status(size.announcement()));
        self.commands.push_back(Command::Resize(size));
        Some(size)
    }

    fn forward_title(&mut self) {
        if let Some(title) = self.terminal.take_title_report() {
            self.commands.push_back(Command::ReportTitle(title));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runterm_core::keymap::codes;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn driver() -> SessionDriver {
        SessionDriver::new(SessionConfig::default(), Terminal::new())
    }

    fn started() -> SessionDriver {
        let mut d = driver();
        d.start(ms(0));
        assert_eq!(
            d.drain_commands(),
            vec![Command::Fetch {
                position: None,
                initial: true
            }]
        );
        d
    }

    // ── Polling ─────────────────────────────────────────────────────

    #[test]
    fn start_is_once() {
        let mut d = started();
        d.start(ms(1));
        assert!(d.drain_commands().is_empty());
        assert_eq!(d.status(), SessionStatus::Running);
    }

    #[test]
    fn start_without_backlog_fetches_normally() {
        let config = SessionConfig::default().with_initial_backlog(false);
        let mut d = SessionDriver::new(config, Terminal::new());
        d.start(ms(0));
        assert_eq!(
            d.poll_command(),
            Some(Command::Fetch {
                position: None,
                initial: false
            })
        );
    }

    #[test]
    fn data_feeds_and_refetches_immediately() {
        let mut d = started();
        d.on_fetch(Ok(Fetched::Data(b"hi".to_vec())), ms(5));
        assert_eq!(d.terminal().screen().text(), "hi");
        assert!(d.is_fetch_in_flight());
        assert_eq!(
            d.drain_commands(),
            vec![Command::Fetch {
                position: None,
                initial: false
            }]
        );
    }

    #[test]
    fn idle_backs_off_and_caps() {
        let mut d = started();
        let mut now = ms(0);
        let mut waits = Vec::new();
        for _ in 0..7 {
            d.on_fetch(Ok(Fetched::Idle), now);
            let deadline = d.next_deadline().expect("deadline after idle");
            waits.push(deadline - now);
            now = deadline;
            d.poll(now);
            assert_eq!(d.drain_commands().len(), 1);
        }
        assert_eq!(waits[0], ms(50));
        assert_eq!(waits[1], ms(125));
        assert_eq!(waits[2], ms(312) + Duration::from_micros(500));
        assert_eq!(*waits.last().unwrap(), ms(2000));
    }

    #[test]
    fn unusable_backoff_does_not_panic() {
        for backoff in [f64::NAN, -1.0, f64::INFINITY, 0.5] {
            let config = SessionConfig::default().with_poll_backoff(backoff);
            let mut d = SessionDriver::new(config, Terminal::new());
            d.start(ms(0));
            d.drain_commands();
            d.on_fetch(Ok(Fetched::Idle), ms(0));
            assert!(d.interval() >= ms(50) && d.interval() <= ms(2000));
            assert_eq!(d.next_deadline(), Some(ms(50)));
        }
    }

    #[test]
    fn huge_poll_max_saturates() {
        let config = SessionConfig::default().with_poll_max(Duration::MAX);
        let mut d = SessionDriver::new(config, Terminal::new());
        d.start(ms(0));
        d.drain_commands();
        let mut now = ms(0);
        for _ in 0..200 {
            d.on_fetch(Ok(Fetched::Idle), now);
            now = d.next_deadline().expect("deadline after idle");
            d.poll(now);
            d.drain_commands();
        }
        assert!(d.interval() >= ms(50));
    }

    #[test]
    fn data_resets_interval() {
        let mut d = started();
        d.on_fetch(Ok(Fetched::Idle), ms(0));
        d.poll(ms(50));
        d.on_fetch(Ok(Fetched::Idle), ms(60));
        assert!(d.interval() > ms(50));
        d.poll(ms(500));
        d.on_fetch(Ok(Fetched::Data(b"x".to_vec())), ms(510));
        assert_eq!(d.interval(), ms(50));
    }

    #[test]
    fn poll_before_deadline_does_nothing() {
        let mut d = started();
        d.on_fetch(Ok(Fetched::Idle), ms(0));
        d.poll(ms(49));
        assert!(d.drain_commands().is_empty());
        d.poll(ms(50));
        assert_eq!(d.drain_commands().len(), 1);
    }

    #[test]
    fn no_second_fetch_while_one_is_outstanding() {
        let mut d = started();
        d.poll(ms(10_000));
        assert!(d.drain_commands().is_empty());
        assert_eq!(d.next_deadline(), None);
    }

    #[test]
    fn read_position_is_used_for_fetches() {
        let mut d = started();
        d.on_fetch(Ok(Fetched::Data(b"\x1b]oterm;1234;".to_vec())), ms(1));
        assert_eq!(
            d.poll_command(),
            Some(Command::Fetch {
                position: Some(1234),
                initial: false
            })
        );
    }

    // ── Sending ─────────────────────────────────────────────────────

    #[test]
    fn keys_during_send_are_coalesced() {
        let mut d = started();
        assert!(d.key(&KeyEvent::new(codes::KEY_A), ms(1)));
        assert_eq!(d.drain_commands(), vec![Command::Send(b"a".to_vec())]);

        assert!(d.key(&KeyEvent::new(codes::KEY_A + 1), ms(2)));
        assert!(d.key(&KeyEvent::new(codes::ENTER), ms(3)));
        assert!(d.drain_commands().is_empty());
        assert_eq!(d.pending_send(), b"b\n");

        d.on_send(Ok(()), ms(4));
        assert_eq!(d.drain_commands(), vec![Command::Send(b"b\n".to_vec())]);

        d.on_send(Ok(()), ms(5));
        assert!(d.drain_commands().is_empty());
        assert!(!d.is_send_in_flight());
    }

    #[test]
    fn send_before_start_completes() {
        let mut d = driver();
        assert!(d.key(&KeyEvent::new(codes::KEY_A), ms(0)));
        assert_eq!(d.drain_commands(), vec![Command::Send(b"a".to_vec())]);
        d.on_send(Ok(()), ms(1));
        assert!(!d.is_send_in_flight());

        d.start(ms(2));
        d.drain_commands();
        assert!(d.key(&KeyEvent::new(codes::KEY_A + 1), ms(3)));
        assert_eq!(d.drain_commands(), vec![Command::Send(b"b".to_vec())]);
        assert!(d.pending_send().is_empty());
    }

    #[test]
    fn keys_queued_behind_an_early_send_flush_after_it() {
        let mut d = driver();
        d.key(&KeyEvent::new(codes::KEY_A), ms(0));
        d.key(&KeyEvent::new(codes::KEY_A + 1), ms(0));
        assert_eq!(d.drain_commands(), vec![Command::Send(b"a".to_vec())]);
        d.start(ms(1));
        d.drain_commands();
        d.on_send(Ok(()), ms(2));
        assert_eq!(d.drain_commands(), vec![Command::Send(b"b".to_vec())]);
    }

    #[test]
    fn stray_send_completion_is_ignored() {
        let mut d = started();
        d.on_send(Ok(()), ms(1));
        assert!(d.drain_commands().is_empty());
        assert!(!d.is_send_in_flight());
        assert_eq!(d.status(), SessionStatus::Running);
    }

    #[test]
    fn unmapped_key_sends_nothing() {
        let mut d = started();
        assert!(!d.key(&KeyEvent::new(999), ms(1)));
        assert!(d.drain_commands().is_empty());
    }

    #[test]
    fn paste_is_bracketed_when_requested() {
        let mut d = started();
        d.on_fetch(Ok(Fetched::Data(b"\x1b[?2004h".to_vec())), ms(1));
        d.drain_commands();
        d.paste("ls", ms(2));
        assert_eq!(
            d.drain_commands(),
            vec![Command::Send(b"\x1b[200~ls\x1b[201~".to_vec())]
        );
    }

    #[test]
    fn local_echo_feeds_the_screen() {
        let config = runterm_core::TerminalConfig::default().with_local_echo(true);
        let mut d = SessionDriver::new(SessionConfig::default(), Terminal::with_config(config));
        d.start(ms(0));
        d.key(&KeyEvent::new(codes::KEY_A), ms(1));
        assert_eq!(d.terminal().screen().text(), "a");
    }

    #[test]
    fn typing_arms_boost_and_fetch_cancels_it() {
        let mut d = started();
        d.on_fetch(Ok(Fetched::Idle), ms(0));
        for _ in 0..3 {
            let at = d.next_deadline().expect("scheduled");
            d.poll(at);
            d.on_fetch(Ok(Fetched::Idle), at);
        }
        d.drain_commands();
        let slow = d.next_deadline().expect("scheduled");

        d.key(&KeyEvent::new(codes::KEY_A), ms(500));
        let boosted = d.next_deadline().expect("boost");
        assert!(boosted < slow);
        assert_eq!(boosted, ms(550));

        d.poll(boosted);
        assert_eq!(d.interval(), ms(50));
        let commands = d.drain_commands();
        assert!(commands.contains(&Command::Fetch {
            position: None,
            initial: false
        }));
        assert_eq!(d.next_deadline(), None);
    }

    // ── Termination ─────────────────────────────────────────────────

    #[test]
    fn end_of_stream_fails_session() {
        let mut d = started();
        d.key(&KeyEvent::new(codes::KEY_A), ms(1));
        d.key(&KeyEvent::new(codes::KEY_A), ms(2));
        d.on_fetch(Ok(Fetched::Ended), ms(3));
        assert_eq!(d.status(), SessionStatus::Failed);
        assert!(d.drain_commands().is_empty());
        assert!(d.pending_send().is_empty());

        let diagnostics = d.terminal_mut().drain_diagnostics();
        assert_eq!(
            diagnostics.last(),
            Some(&Diagnostic::SessionEnded {
                reason: PROGRAM_EXITED.to_string()
            })
        );
    }

    #[test]
    fn transport_error_fails_session() {
        let mut d = started();
        d.key(&KeyEvent::new(codes::KEY_A), ms(1));
        d.drain_commands();
        d.on_send(Err(TransportError::Closed), ms(2));
        assert_eq!(d.status(), SessionStatus::Failed);
        assert!(
            d.terminal_mut()
                .drain_diagnostics()
                .iter()
                .any(Diagnostic::is_terminal)
        );
    }

    #[test]
    fn nothing_happens_after_failure() {
        let mut d = started();
        d.on_fetch(Ok(Fetched::Ended), ms(1));
        d.key(&KeyEvent::new(codes::KEY_A), ms(2));
        d.on_fetch(Ok(Fetched::Data(b"late".to_vec())), ms(3));
        d.poll(ms(10_000));
        assert!(d.geometry(PixelGeometry::new(800.0, 480.0, 10.0, 20.0)).is_none());
        assert!(d.drain_commands().is_empty());
        assert_eq!(d.terminal().screen().text(), "");
    }

    // ── Side channels ───────────────────────────────────────────────

    #[test]
    fn geometry_change_is_announced_once() {
        let config = SessionConfig::default().with_reserved(5, 3);
        let mut d = SessionDriver::new(config, Terminal::new());
        let geometry = PixelGeometry::new(800.0, 480.0, 10.0, 20.0);
        assert_eq!(d.geometry(geometry), Some(GridSize::new(19, 77)));
        assert_eq!(d.geometry(geometry), None);
        assert_eq!(
            d.drain_commands(),
            vec![Command::Resize(GridSize::new(19, 77))]
        );
        assert!(d.terminal_mut().drain_diagnostics().contains(&Diagnostic::Status(
            "New geometry is 19 rows, 77 columns.".to_string()
        )));
    }

    #[test]
    fn title_is_forwarded() {
        let mut d = started();
        d.on_fetch(Ok(Fetched::Data(b"\x1b]0;build\x07".to_vec())), ms(1));
        let commands = d.drain_commands();
        assert!(commands.contains(&Command::ReportTitle("build".to_string())));
    }
}
