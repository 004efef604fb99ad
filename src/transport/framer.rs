//! Command framer.
//!
//! Sends one command and accumulates bytes until the reply is confidently
//! identified or the deadline elapses. The platform guarantees nothing
//! beyond newlines, so completion is decided by the per-command predicate in
//! [`ExpectedReply`].
//!
//! # Accumulation Loop
//!
//! Reading stops at the first of:
//!
//! - the overall deadline (longer for the status probe)
//! - a newline-terminated line carrying the expected marker, or any error marker
//! - the peer closing the stream after some bytes arrived
//! - a per-read sub-timeout of silence after some bytes arrived
//!
//! On a marker match one more short read absorbs trailing bytes the platform
//! is still flushing.

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::protocol::ExpectedReply;

use super::connection::{Connection, ReadOutcome};

// ============================================================================
// FrameDeadlines
// ============================================================================

/// Deadlines applied to one request/reply cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDeadlines {
    /// Overall deadline for ordinary commands.
    pub command: Duration,
    /// Overall deadline for the status probe.
    pub status_probe: Duration,
    /// Wait applied to each individual read.
    pub read_poll: Duration,
    /// Wait for trailing bytes after a marker match.
    pub trailing: Duration,
}

impl Default for FrameDeadlines {
    fn default() -> Self {
        Self {
            command: Duration::from_secs(2),
            status_probe: Duration::from_secs(3),
            read_poll: Duration::from_secs(1),
            trailing: Duration::from_millis(200),
        }
    }
}

// ============================================================================
// Framer
// ============================================================================

/// Writes commands and accumulates their replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct Framer {
    deadlines: FrameDeadlines,
}

impl Framer {
    /// Creates a framer with the given deadlines.
    #[inline]
    #[must_use]
    pub const fn new(deadlines: FrameDeadlines) -> Self {
        Self { deadlines }
    }

    /// Returns the configured deadlines.
    #[inline]
    #[must_use]
    pub const fn deadlines(&self) -> &FrameDeadlines {
        &self.deadlines
    }

    /// Normalizes a command to end with exactly one `\n`.
    #[must_use]
    pub fn normalize(command: &str) -> String {
        let mut wire = command.trim_end_matches(['\r', '\n']).to_string();
        wire.push('\n');
        wire
    }

    /// Sends `command` and returns the full accumulated reply text.
    ///
    /// The text is not yet reduced to a single line; callers feed it to the
    /// status demultiplexer first and then apply
    /// [`ExpectedReply::select_line`].
    ///
    /// # Errors
    ///
    /// - [`Error::NoResponse`] if no byte arrived before the deadline
    /// - [`Error::ConnectionClosed`] if the peer closed without replying
    /// - [`Error::Io`] if the write or a read fails
    pub async fn exchange<S>(&self, connection: &mut Connection<S>, command: &str) -> Result<String>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let wire = Self::normalize(command);
        let name = wire.trim_end();
        let expected = ExpectedReply::for_command(name);

        debug!(command = name, "Sending command");
        connection.write_all(wire.as_bytes()).await?;

        let deadline = if expected.is_status_probe() {
            self.deadlines.status_probe
        } else {
            self.deadlines.command
        };

        let previous_timeout = connection.read_timeout();
        connection.set_read_timeout(self.deadlines.read_poll);
        let outcome = self.accumulate(connection, &expected, deadline).await;
        connection.set_read_timeout(previous_timeout);
        let buffer = outcome?;

        if buffer.is_empty() {
            return Err(Error::no_response(name, deadline.as_millis() as u64));
        }

        let text = String::from_utf8_lossy(&buffer).into_owned();
        trace!(command = name, response = %text.trim(), "Received response");
        Ok(text)
    }

    /// Runs the accumulation loop for one command.
    async fn accumulate<S>(
        &self,
        connection: &mut Connection<S>,
        expected: &ExpectedReply,
        deadline: Duration,
    ) -> Result<Vec<u8>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let started = Instant::now();
        let mut buffer = Vec::new();

        loop {
            let remaining = deadline.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                break;
            }

            match connection.read_into(&mut buffer, remaining).await? {
                ReadOutcome::Data(_) => {
                    if expected.is_complete(&String::from_utf8_lossy(&buffer)) {
                        self.absorb_trailing(connection, &mut buffer).await;
                        break;
                    }
                }
                ReadOutcome::Closed => {
                    if buffer.is_empty() {
                        return Err(Error::ConnectionClosed);
                    }
                    break;
                }
                ReadOutcome::Idle => {
                    if !buffer.is_empty() {
                        break;
                    }
                }
            }
        }

        Ok(buffer)
    }

    /// One short read for bytes still being flushed after a match.
    async fn absorb_trailing<S>(&self, connection: &mut Connection<S>, buffer: &mut Vec<u8>)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        match connection.read_into(buffer, self.deadlines.trailing).await {
            Ok(ReadOutcome::Data(n)) => trace!(bytes = n, "Absorbed trailing bytes"),
            Ok(_) => {}
            Err(e) => debug!(error = %e, "Trailing read failed"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, duplex};

    fn fast_deadlines() -> FrameDeadlines {
        FrameDeadlines {
            command: Duration::from_millis(300),
            status_probe: Duration::from_millis(400),
            read_poll: Duration::from_millis(150),
            trailing: Duration::from_millis(30),
        }
    }

    fn pipe() -> (Connection<DuplexStream>, DuplexStream) {
        let (client, server) = duplex(4096);
        (Connection::new(client, 4096, Duration::from_secs(5)), server)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(Framer::normalize("INFOSTOCKS"), "INFOSTOCKS\n");
        assert_eq!(Framer::normalize("INFOSTOCKS\n"), "INFOSTOCKS\n");
        assert_eq!(Framer::normalize("INFOSTOCKS\r\n\n"), "INFOSTOCKS\n");
    }

    #[tokio::test]
    async fn test_command_written_once_terminated() {
        let (mut conn, server) = pipe();
        let framer = Framer::new(fast_deadlines());

        let platform = tokio::spawn(async move {
            let mut reader = BufReader::new(server);
            let mut line = String::new();
            reader.read_line(&mut line).await.expect("read");
            reader
                .get_mut()
                .write_all(b"INFOACCOUNT;10:00:00;A1;100;0;0;100;REAL\n")
                .await
                .expect("write");
            (line, reader)
        });

        let text = framer.exchange(&mut conn, "INFOACCOUNT").await.expect("exchange");
        let (line, _reader) = platform.await.expect("join");
        assert_eq!(line, "INFOACCOUNT\n");
        assert!(text.starts_with("INFOACCOUNT;"));
    }

    #[tokio::test]
    async fn test_error_marker_short_circuits() {
        let (mut conn, mut server) = pipe();
        server.write_all(b"ERR;N/A;1019\n").await.expect("write");
        let framer = Framer::new(FrameDeadlines {
            command: Duration::from_secs(5),
            read_poll: Duration::from_secs(5),
            ..fast_deadlines()
        });

        let started = Instant::now();
        let text = framer.exchange(&mut conn, "ORDERLIST").await.expect("exchange");
        assert_eq!(text, "ERR;N/A;1019\n");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_split_reply_is_joined() {
        let (mut conn, mut server) = pipe();
        let framer = Framer::new(fast_deadlines());

        let platform = tokio::spawn(async move {
            server.write_all(b"STOCK;ENI;10:00:00;").await.expect("write");
            tokio::time::sleep(Duration::from_millis(40)).await;
            server.write_all(b"10;0;0;12.5;3.1\n").await.expect("write");
            server
        });

        let text = framer.exchange(&mut conn, "INFOSTOCKS").await.expect("exchange");
        let _server = platform.await.expect("join");
        assert_eq!(text, "STOCK;ENI;10:00:00;10;0;0;12.5;3.1\n");
    }

    #[tokio::test]
    async fn test_waits_past_unrelated_chatter() {
        let (mut conn, mut server) = pipe();
        let framer = Framer::new(fast_deadlines());

        let platform = tokio::spawn(async move {
            server
                .write_all(b"DARWIN_STATUS;CONN_OK;TRUE;x\n")
                .await
                .expect("write");
            tokio::time::sleep(Duration::from_millis(50)).await;
            server
                .write_all(b"ORDER;ENI;10:00:00;ORD1;BUY;12.5;0;10;SENT\n")
                .await
                .expect("write");
            server
        });

        let text = framer.exchange(&mut conn, "ORDERLIST").await.expect("exchange");
        let _server = platform.await.expect("join");
        assert!(text.contains("DARWIN_STATUS"));
        assert!(text.contains("ORDER;ENI"));
    }

    #[tokio::test]
    async fn test_no_response_after_deadline() {
        let (mut conn, _server) = pipe();
        let framer = Framer::new(fast_deadlines());

        let result = framer.exchange(&mut conn, "ORDERLIST").await;
        assert!(matches!(
            result,
            Err(Error::NoResponse { timeout_ms: 300, .. })
        ));
    }

    #[tokio::test]
    async fn test_closed_without_reply() {
        let (mut conn, server) = pipe();
        let framer = Framer::new(fast_deadlines());

        let platform = tokio::spawn(async move {
            let mut reader = BufReader::new(server);
            let mut line = String::new();
            reader.read_line(&mut line).await.expect("read");
        });

        let result = framer.exchange(&mut conn, "INFOSTOCKS").await;
        platform.await.expect("join");
        assert!(matches!(result, Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_read_timeout_restored() {
        let (mut conn, mut server) = pipe();
        server.write_all(b"ERR;N/A;1018\n").await.expect("write");
        let framer = Framer::new(fast_deadlines());

        framer.exchange(&mut conn, "INFOSTOCKS").await.expect("exchange");
        assert_eq!(conn.read_timeout(), Duration::from_secs(5));
    }
}
