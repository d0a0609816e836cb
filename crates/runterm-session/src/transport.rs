//! Transport seams between a session and the remote process.
//!
//! A [`ByteSource`] yields the remote process output; a [`ByteSink`] carries
//! key bytes and side-channel messages (resize, title) back. Both are
//! blocking; the runner decides which thread calls them.

use std::fmt;
use std::io;

use crate::geometry::GridSize;

/// Outcome of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// New output bytes (never empty).
    Data(Vec<u8>),
    /// Nothing arrived within the transport's wait window.
    Idle,
    /// The stream is over; no further fetches will succeed.
    Ended,
}

impl Fetched {
    /// Wrap `bytes`, mapping an empty payload to [`Fetched::Idle`].
    #[must_use]
    pub fn data(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            Self::Idle
        } else {
            Self::Data(bytes)
        }
    }
}

/// A transport failure. Any error ends the session.
#[derive(Debug)]
pub enum TransportError {
    Io(io::Error),
    Closed,
    Rejected(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "transport I/O error: {err}"),
            Self::Closed => write!(f, "transport closed"),
            Self::Rejected(reason) => write!(f, "transport rejected request: {reason}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Remote output, fetched one payload at a time.
pub trait ByteSource {
    /// Fetch the buffered history once at session start.
    fn fetch_initial(&mut self) -> Result<Fetched, TransportError> {
        self.fetch(None)
    }

    /// Fetch new output, resuming from `position` when the stream reported one.
    fn fetch(&mut self, position: Option<u64>) -> Result<Fetched, TransportError>;
}

/// Outbound channel to the remote process.
pub trait ByteSink {
    /// Deliver key bytes.
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Announce new grid dimensions.
    fn resize(&mut self, size: GridSize) -> Result<(), TransportError>;

    /// Forward a title set by the remote program.
    fn report_title(&mut self, _title: &str) -> Result<(), TransportError> {
        Ok(())
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Box<T> {
    fn fetch_initial(&mut self) -> Result<Fetched, TransportError> {
        (**self).fetch_initial()
    }

    fn fetch(&mut self, position: Option<u64>) -> Result<Fetched, TransportError> {
        (**self).fetch(position)
    }
}

impl<T: ByteSink + ?Sized> ByteSink for Box<T> {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).send(bytes)
    }

    fn resize(&mut self, size: GridSize) -> Result<(), TransportError> {
        (**self).resize(size)
    }

    fn report_title(&mut self, title: &str) -> Result<(), TransportError> {
        (**self).report_title(title)
    }
}

/// Replays a captured byte stream in fixed-size payloads, then ends.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    bytes: Vec<u8>,
    offset: usize,
    chunk: usize,
}

impl ReplaySource {
    /// `chunk == 0` delivers the whole capture as one payload.
    #[must_use]
    pub fn new(bytes: Vec<u8>, chunk: usize) -> Self {
        let chunk = if chunk == 0 { bytes.len().max(1) } else { chunk };
        Self {
            bytes,
            offset: 0,
            chunk,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }
}

impl ByteSource for ReplaySource {
    fn fetch_initial(&mut self) -> Result<Fetched, TransportError> {
        Ok(Fetched::Idle)
    }

    fn fetch(&mut self, _position: Option<u64>) -> Result<Fetched, TransportError> {
        if self.offset >= self.bytes.len() {
            return Ok(Fetched::Ended);
        }
        let end = (self.offset + self.chunk).min(self.bytes.len());
        let payload = self.bytes[self.offset..end].to_vec();
        self.offset = end;
        Ok(Fetched::Data(payload))
    }
}

/// Sink that records everything it is given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    pub sent: Vec<Vec<u8>>,
    pub resizes: Vec<GridSize>,
    pub titles: Vec<String>,
}

impl ByteSink for RecordingSink {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.sent.push(bytes.to_vec());
        Ok(())
    }

    fn resize(&mut self, size: GridSize) -> Result<(), TransportError> {
        self.resizes.push(size);
        Ok(())
    }

    fn report_title(&mut self, title: &str) -> Result<(), TransportError> {
        self.titles.push(title.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_idle() {
        assert_eq!(Fetched::data(Vec::new()), Fetched::Idle);
        assert_eq!(Fetched::data(b"x".to_vec()), Fetched::Data(b"x".to_vec()));
    }

    #[test]
    fn replay_chunks_then_ends() {
        let mut source = ReplaySource::new(b"hello".to_vec(), 2);
        assert_eq!(source.fetch_initial().unwrap(), Fetched::Idle);
        assert_eq!(source.fetch(None).unwrap(), Fetched::Data(b"he".to_vec()));
        assert_eq!(source.fetch(None).unwrap(), Fetched::Data(b"ll".to_vec()));
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.fetch(None).unwrap(), Fetched::Data(b"o".to_vec()));
        assert_eq!(source.fetch(None).unwrap(), Fetched::Ended);
    }

    #[test]
    fn replay_whole_capture() {
        let mut source = ReplaySource::new(b"abc".to_vec(), 0);
        assert_eq!(source.fetch(Some(9)).unwrap(), Fetched::Data(b"abc".to_vec()));
        assert_eq!(source.fetch(None).unwrap(), Fetched::Ended);
    }

    #[test]
    fn error_display() {
        assert_eq!(TransportError::Closed.to_string(), "transport closed");
        let io = TransportError::from(io::Error::other("boom"));
        assert!(io.to_string().contains("boom"));
        assert!(std::error::Error::source(&io).is_some());
    }

    #[test]
    fn boxed_sink_forwards() {
        let mut sink: Box<RecordingSink> = Box::default();
        sink.send(b"ls").unwrap();
        ByteSink::report_title(&mut sink, "t").unwrap();
        assert_eq!(sink.sent, vec![b"ls".to_vec()]);
        assert_eq!(sink.titles, vec!["t".to_string()]);
    }
}
