//! Byte stream to the Darwin platform.
//!
//! A [`Connection`] is exclusively owned by the client. Every read is bounded
//! by the connection's current read timeout and by the caller's remaining
//! budget, so no await in this module can block indefinitely.

// ============================================================================
// Imports
// ============================================================================

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::{Error, Result};

// ============================================================================
// ReadOutcome
// ============================================================================

/// Result of one bounded read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes were appended to the buffer.
    Data(usize),
    /// The peer closed the stream.
    Closed,
    /// Nothing arrived before the wait elapsed.
    Idle,
}

// ============================================================================
// Connection
// ============================================================================

/// Exclusively owned byte stream plus its read deadline.
///
/// Generic over the stream so the framer can be exercised over in-memory
/// pipes; the client always uses [`TcpStream`].
#[derive(Debug)]
pub struct Connection<S = TcpStream> {
    /// Underlying stream.
    stream: S,
    /// Maximum bytes per read.
    buffer_size: usize,
    /// Wait applied to each individual read.
    read_timeout: Duration,
}

impl Connection<TcpStream> {
    /// Opens a TCP connection to `host:port`.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if connect exceeds `connect_timeout`
    /// - [`Error::Connection`] if the platform refuses the connection
    pub async fn open(
        host: &str,
        port: u16,
        connect_timeout: Duration,
        buffer_size: usize,
        read_timeout: Duration,
    ) -> Result<Self> {
        let stream = timeout(connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| Error::connection_timeout(connect_timeout.as_millis() as u64))?
            .map_err(|e| Error::connection(format!("{host}:{port}: {e}")))?;

        // Commands are tiny; do not let Nagle hold them back.
        stream.set_nodelay(true)?;

        debug!(host, port, "TCP connection established");

        Ok(Self::new(stream, buffer_size, read_timeout))
    }

    /// Returns the remote address.
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an already connected stream.
    #[must_use]
    pub fn new(stream: S, buffer_size: usize, read_timeout: Duration) -> Self {
        Self {
            stream,
            buffer_size: buffer_size.max(1),
            read_timeout,
        }
    }

    /// Returns the per-read wait.
    #[inline]
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Sets the per-read wait.
    #[inline]
    pub fn set_read_timeout(&mut self, read_timeout: Duration) {
        self.read_timeout = read_timeout;
    }

    /// Returns the maximum bytes per read.
    #[inline]
    #[must_use]
    pub const fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Writes all bytes and flushes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the write fails.
    pub async fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads once into `buffer`, waiting at most `min(read_timeout, limit)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the read fails.
    pub async fn read_into(&mut self, buffer: &mut Vec<u8>, limit: Duration) -> Result<ReadOutcome> {
        let wait = self.read_timeout.min(limit);
        if wait.is_zero() {
            return Ok(ReadOutcome::Idle);
        }

        let mut chunk = vec![0u8; self.buffer_size];
        match timeout(wait, self.stream.read(&mut chunk)).await {
            Ok(Ok(0)) => Ok(ReadOutcome::Closed),
            Ok(Ok(n)) => {
                buffer.extend_from_slice(&chunk[..n]);
                trace!(bytes = n, "Read chunk");
                Ok(ReadOutcome::Data(n))
            }
            Ok(Err(e)) => Err(Error::Io(e)),
            Err(_) => Ok(ReadOutcome::Idle),
        }
    }

    /// Reads whatever the peer sends within `deadline`.
    ///
    /// Stops early when the peer closes, when a read sits idle, or when
    /// `done` accepts the text accumulated so far. Silence is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a read fails.
    pub async fn drain<F>(&mut self, deadline: Duration, done: F) -> Result<Vec<u8>>
    where
        F: Fn(&str) -> bool,
    {
        let started = Instant::now();
        let mut buffer = Vec::new();

        loop {
            let remaining = deadline.saturating_sub(started.elapsed());
            match self.read_into(&mut buffer, remaining).await? {
                ReadOutcome::Data(_) => {
                    if done(&String::from_utf8_lossy(&buffer)) {
                        break;
                    }
                }
                ReadOutcome::Closed | ReadOutcome::Idle => break,
            }
        }

        Ok(buffer)
    }
}

// ============================================================================
// Tests
// ============================================================================
