//! Directa session manager.
//!
//! The [`DirectaClient`] owns the TCP session, runs every request/reply
//! cycle through the framer and offers every inbound blob to the status
//! demultiplexer before anything else looks at it.
//!
//! # Example
//!
//! ```no_run
//! use directa_session::DirectaClient;
//!
//! # async fn example() -> directa_session::Result<()> {
//! let mut client = DirectaClient::builder().build()?;
//! client.connect().await?;
//!
//! let line = client.send("INFOACCOUNT").await?;
//! println!("{line}");
//! println!("{:?}", client.health().metrics());
//!
//! client.disconnect();
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::sleep;
use tracing::{Instrument, Span, debug, error, info, info_span, warn};

use crate::error::{Error, Result};
use crate::health::{ConnectionMetrics, HealthMonitor, HealthTracker, StatusDemultiplexer};
use crate::parser::{DarwinStatus, Parsed, StatusParser};
use crate::protocol::{ConnectionStatus, ExpectedReply, STATUS_MARKER, STATUS_PROBE};
use crate::transport::{Connection, Framer};

use super::builder::ClientBuilder;
use super::config::ClientConfig;

// ============================================================================
// Reprobe
// ============================================================================

/// Whether ingesting a blob may trigger the stale-status re-probe.
///
/// The re-probe's own reply is ingested with [`Reprobe::Suppressed`], so
/// it can never trigger another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reprobe {
    /// Re-probe when the socket is up but the platform is not `CONN_OK`.
    Allowed,
    /// Never re-probe.
    Suppressed,
}

// ============================================================================
// DirectaClient
// ============================================================================

/// Client for the Darwin trading API.
///
/// All I/O methods take `&mut self`: there is at most one command in
/// flight per client.
pub struct DirectaClient {
    /// Immutable configuration.
    config: ClientConfig,
    /// Request/reply cycle.
    framer: Framer,
    /// Status extraction and arbitration.
    demux: StatusDemultiplexer,
    /// Open session, `None` while disconnected.
    connection: Option<Connection>,
    /// Health state, shared with [`HealthMonitor`] handles.
    health: Arc<Mutex<HealthTracker>>,
    /// Span every operation runs in.
    span: Span,
}

// ============================================================================
// DirectaClient - Display
// ============================================================================

impl fmt::Debug for DirectaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectaClient")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("socket_connected", &self.is_socket_connected())
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// DirectaClient - Construction
// ============================================================================

impl DirectaClient {
    /// Creates a configuration builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a disconnected client. Use [`ClientBuilder::build`].
    pub(crate) fn new(config: ClientConfig, status_parser: Arc<dyn StatusParser>) -> Self {
        let span = info_span!("directa_session", host = %config.host, port = config.port);

        Self {
            framer: Framer::new(config.timeouts.frame()),
            demux: StatusDemultiplexer::new(status_parser),
            connection: None,
            health: Arc::new(Mutex::new(HealthTracker::new())),
            span,
            config,
        }
    }
}

// ============================================================================
// DirectaClient - Accessors
// ============================================================================

impl DirectaClient {
    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the span operations run in.
    #[inline]
    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// `true` while a TCP session is held.
    #[inline]
    #[must_use]
    pub fn is_socket_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Current platform status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.health.lock().status()
    }

    /// `true` while the platform reports `CONN_OK`.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.health.lock().is_connected()
    }

    /// Computes a metrics snapshot.
    #[must_use]
    pub fn metrics(&self) -> ConnectionMetrics {
        self.health.lock().metrics()
    }

    /// Returns a read handle over the health state.
    #[must_use]
    pub fn health(&self) -> HealthMonitor {
        HealthMonitor::new(Arc::clone(&self.health))
    }
}

// ============================================================================
// DirectaClient - Lifecycle
// ============================================================================

impl DirectaClient {
    /// Opens the TCP session.
    ///
    /// Drains the platform greeting through the status demultiplexer, then
    /// probes the status explicitly if the greeting carried none. A failed
    /// probe does not fail the connect.
    ///
    /// An already open session is closed first.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the platform refuses the connection
    /// - [`Error::ConnectionTimeout`] if the connect does not complete in time
    pub async fn connect(&mut self) -> Result<()> {
        let span = self.span.clone();
        self.connect_inner().instrument(span).await
    }

    async fn connect_inner(&mut self) -> Result<()> {
        if self.connection.is_some() {
            debug!("Replacing open session");
            self.disconnect();
        }

        let attempt = self.health.lock().begin_attempt();
        let host = self.config.host.clone();
        let port = self.config.port;
        let timeouts = self.config.timeouts;

        let opened = Connection::open(
            &host,
            port,
            timeouts.connect,
            self.config.buffer_size,
            timeouts.initial_drain,
        )
        .await;

        let mut connection = match opened {
            Ok(connection) => connection,
            Err(e) => {
                error!(attempt, error = %e, "Error connecting to Trading API");
                self.health
                    .lock()
                    .record_connect_failure(e.to_string(), format!("Failed to connect to {host}:{port}"));
                return Err(e);
            }
        };

        self.health
            .lock()
            .record_connect(format!("Connected to {host}:{port}"));
        info!(attempt, "Connected to Directa Trading API");

        sleep(timeouts.quiescence).await;
        let greeting = match connection.drain(timeouts.initial_drain, greeting_complete).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!(error = %e, "Error processing initial data");
                String::new()
            }
        };
        connection.set_read_timeout(timeouts.command);
        self.connection = Some(connection);

        let observed = if greeting.is_empty() {
            None
        } else {
            debug!(data = %greeting.trim(), "Initial data received on connect");
            self.ingest(&greeting).await
        };

        let needs_probe = observed.is_none()
            || matches!(
                self.status(),
                ConnectionStatus::Unknown | ConnectionStatus::Disconnected
            );
        if needs_probe {
            let reply = self.refresh_status_inner().await;
            if reply.contains("CONN_OK") && self.health.lock().set_status(ConnectionStatus::ConnOk) {
                info!("Connection status updated to CONN_OK from explicit check");
            }
        }

        Ok(())
    }

    /// Closes the TCP session and forces `DISCONNECTED`.
    ///
    /// No-op when no session is held. The disconnect is always logged as an
    /// attempt record, but a status already `DISCONNECTED` adds no
    /// transition.
    pub fn disconnect(&mut self) {
        let _entered = self.span.enter();

        if let Some(connection) = self.connection.take() {
            drop(connection);
            self.health.lock().record_disconnect();
            info!("Disconnected from Directa Trading API");
        }
    }
}

// ============================================================================
// DirectaClient - Exchange
// ============================================================================

impl DirectaClient {
    /// Sends a raw command and returns the reply line answering it.
    ///
    /// The whole reply is offered to the status demultiplexer first.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if no session is open
    /// - [`Error::NoResponse`] if nothing arrived before the deadline
    /// - [`Error::ConnectionClosed`] if the platform closed without replying
    /// - [`Error::Io`] if the write or a read fails
    pub async fn send(&mut self, command: &str) -> Result<String> {
        let span = self.span.clone();
        self.send_inner(command).instrument(span).await
    }

    async fn send_inner(&mut self, command: &str) -> Result<String> {
        let text = self.exchange_inner(command).await?;
        Ok(ExpectedReply::for_command(command.trim())
            .select_line(&text)
            .to_string())
    }

    /// Sends a raw command and returns the whole reply text.
    ///
    /// Used for multi-line replies such as position and order lists. The
    /// text has already been offered to the status demultiplexer.
    ///
    /// # Errors
    ///
    /// Same as [`DirectaClient::send`].
    pub async fn exchange(&mut self, command: &str) -> Result<String> {
        let span = self.span.clone();
        self.exchange_inner(command).instrument(span).await
    }

    async fn exchange_inner(&mut self, command: &str) -> Result<String> {
        let text = self.transact(command).await?;
        self.ingest(&text).await;
        Ok(text)
    }

    /// One framed exchange with no status handling.
    async fn transact(&mut self, command: &str) -> Result<String> {
        let connection = self.connection.as_mut().ok_or(Error::NotConnected)?;
        self.framer.exchange(connection, command).await
    }

    /// Offers `text` to the status demultiplexer.
    ///
    /// Returns `true` when a status line was seen, the session is open, the
    /// resolved status is not `CONN_OK` and `reprobe` allows a re-probe.
    pub fn observe(&self, text: &str, reprobe: Reprobe) -> bool {
        self.observe_status(text)
            .is_some_and(|status| self.wants_reprobe(status, reprobe))
    }

    fn observe_status(&self, text: &str) -> Option<ConnectionStatus> {
        let mut health = self.health.lock();
        self.demux.ingest(text, &mut health)
    }

    fn wants_reprobe(&self, status: ConnectionStatus, reprobe: Reprobe) -> bool {
        reprobe == Reprobe::Allowed
            && self.connection.is_some()
            && status != ConnectionStatus::ConnOk
    }

    /// Offers passively read `text` to the status demultiplexer.
    ///
    /// When the platform reports anything but `CONN_OK` on an open session,
    /// probes once more to rule out a stale announcement.
    ///
    /// Returns `None` when `text` held no status line, otherwise the status
    /// after any re-probe.
    pub async fn ingest(&mut self, text: &str) -> Option<ConnectionStatus> {
        let status = self.observe_status(text)?;
        if self.wants_reprobe(status, Reprobe::Allowed) {
            self.reprobe().await;
        }
        Some(self.status())
    }

    async fn reprobe(&mut self) {
        debug!("Socket connected but Darwin reports not connected; checking again");

        match self.transact(STATUS_PROBE).await {
            Ok(reply) => {
                self.observe(&reply, Reprobe::Suppressed);
                if reply.contains("CONN_OK") && self.health.lock().set_status(ConnectionStatus::ConnOk) {
                    info!("Manual status check found CONN_OK");
                }
            }
            Err(e) => warn!(error = %e, "Manual status check failed"),
        }
    }
}

// ============================================================================
// DirectaClient - Status Probe
// ============================================================================

impl DirectaClient {
    /// Probes the platform status.
    ///
    /// Never fails: a failed probe forces `CONN_ERROR` and returns the
    /// synthesized `DARWIN_STATUS;CONN_ERROR;ERROR;<error>` line.
    pub async fn refresh_status(&mut self) -> String {
        let span = self.span.clone();
        self.refresh_status_inner().instrument(span).await
    }

    async fn refresh_status_inner(&mut self) -> String {
        match self.probe().await {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, "Error getting Darwin status");
                self.synthesize_failure(&e)
            }
        }
    }

    /// Probes the platform status and parses the reply.
    ///
    /// With `retry` set, a failed probe is retried once after the
    /// configured pause. The live metrics snapshot is attached to the
    /// parsed status.
    pub async fn probe_darwin_status(&mut self, retry: bool) -> Parsed<DarwinStatus> {
        let span = self.span.clone();
        self.probe_darwin_status_inner(retry).instrument(span).await
    }

    async fn probe_darwin_status_inner(&mut self, retry: bool) -> Parsed<DarwinStatus> {
        let reply = match self.probe().await {
            Ok(line) => line,
            Err(first) if retry => {
                warn!(error = %first, "First Darwin status check failed, retrying");
                sleep(self.config.timeouts.retry_pause).await;
                match self.probe().await {
                    Ok(line) => line,
                    Err(e) => {
                        error!(error = %e, "Darwin status check failed after retry");
                        self.synthesize_failure(&e)
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "Darwin status check failed");
                self.synthesize_failure(&e)
            }
        };

        let metrics = self.metrics();
        self.demux.parser().parse(&reply, Some(&metrics))
    }

    /// Sends one status probe and returns its status line.
    async fn probe(&mut self) -> Result<String> {
        self.health.lock().mark_status_check();
        self.send_inner(STATUS_PROBE).await
    }

    fn synthesize_failure(&self, error: &Error) -> String {
        self.health.lock().set_status(ConnectionStatus::ConnError);
        format!("{STATUS_MARKER};CONN_ERROR;ERROR;{error}")
    }
}

/// `true` once a newline-terminated line carries a status announcement.
fn greeting_complete(text: &str) -> bool {
    text.rfind('\n')
        .is_some_and(|end| text[..end].contains(STATUS_MARKER))
}

// ============================================================================
// Tests
// ============================================================================
