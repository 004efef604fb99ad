//! Session engine tests against a scripted platform on a local socket.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use directa_session::{
    ConnectionStatus, DirectaClient, Error, OrderRequest, Side, Timeouts,
    health::AttemptKind,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

// ============================================================================
// Scripted Platform
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Accepts connections, writes `greeting` on each, then answers each
/// command line with whatever `respond` returns (`None` stays silent).
async fn spawn_platform<F>(greeting: &'static str, respond: F) -> u16
where
    F: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let respond = Arc::clone(&respond);
            tokio::spawn(async move {
                let (read, mut write) = stream.into_split();

                if !greeting.is_empty() {
                    write.write_all(greeting.as_bytes()).await.expect("greeting");
                }

                let mut lines = BufReader::new(read).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if let Some(reply) = respond(&line) {
                        if write.write_all(reply.as_bytes()).await.is_err() {
                            break;
                        }
                    }
                }
            });
        }
    });

    port
}

/// Wraps `respond` so every `DARWINSTATUS` received bumps `checks`.
fn counting<F>(
    checks: &Arc<AtomicUsize>,
    respond: F,
) -> impl Fn(&str) -> Option<String> + Send + Sync + 'static
where
    F: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    let checks = Arc::clone(checks);
    move |command| {
        if command == "DARWINSTATUS" {
            checks.fetch_add(1, Ordering::SeqCst);
        }
        respond(command)
    }
}

fn fast_timeouts() -> Timeouts {
    Timeouts {
        connect: Duration::from_secs(1),
        quiescence: Duration::from_millis(10),
        initial_drain: Duration::from_millis(300),
        command: Duration::from_millis(300),
        status_probe: Duration::from_millis(300),
        read_poll: Duration::from_millis(100),
        trailing: Duration::from_millis(20),
        retry_pause: Duration::from_millis(10),
    }
}

fn client(port: u16) -> DirectaClient {
    DirectaClient::builder()
        .port(port)
        .timeouts(fast_timeouts())
        .build()
        .expect("client")
}

fn status_only(command: &str) -> Option<String> {
    (command == "DARWINSTATUS").then(|| "DARWIN_STATUS;CONN_OK;TRUE;Release 2.5.1\n".to_string())
}

const READY: &str = "DARWIN_STATUS;CONN_OK;TRUE;ready\n";

// ============================================================================
// Connect
// ============================================================================

#[tokio::test]
async fn test_connect_probes_when_greeting_is_silent() {
    init_tracing();
    let port = spawn_platform("", status_only).await;
    let mut client = client(port);

    client.connect().await.expect("connect");

    assert_eq!(client.status(), ConnectionStatus::ConnOk);
    assert!(client.is_connected());
    assert!(client.is_socket_connected());

    let health = client.health();
    let attempts = health.attempts();
    assert_eq!(attempts.len(), 1);
    assert!(attempts[0].success);
    assert_eq!(attempts[0].kind, AttemptKind::Connect);
    assert!(health.last_status_line().is_some_and(|line| line.contains("CONN_OK")));

    let metrics = client.metrics();
    assert!(metrics.currently_connected);
    assert_eq!(metrics.connection_attempts, 1);
    assert_eq!(metrics.successful_connections, 1);
    assert!(metrics.last_status_check.is_some());
}

#[tokio::test]
async fn test_connect_uses_greeting_status() {
    init_tracing();
    let port = spawn_platform(READY, |_| None).await;
    let mut client = client(port);

    client.connect().await.expect("connect");

    assert_eq!(client.status(), ConnectionStatus::ConnOk);
    assert_eq!(client.health().transitions().len(), 1);
    assert!(client.metrics().last_status_check.is_none());
}

#[tokio::test]
async fn test_connection_refused_is_recorded() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);

    let mut client = client(port);
    let err = client.connect().await.unwrap_err();
    assert!(err.is_connection_error());
    assert!(!client.is_socket_connected());

    let attempts = client.health().attempts();
    assert_eq!(attempts.len(), 1);
    assert!(!attempts[0].success);
    assert!(attempts[0].error.is_some());
    assert_eq!(client.metrics().failed_connections, 1);
}

#[tokio::test]
async fn test_unavailable_greeting_is_reprobed() {
    init_tracing();
    let port = spawn_platform("DARWIN_STATUS;CONN_UNAVAILABLE;FALSE;starting\n", status_only).await;
    let mut client = client(port);

    client.connect().await.expect("connect");

    assert_eq!(client.status(), ConnectionStatus::ConnOk);
    let transitions = client.health().transitions();
    assert_eq!(transitions.len(), 2);
    assert_eq!(transitions[0].new, ConnectionStatus::ConnUnavailable);
    assert_eq!(transitions[1].previous, ConnectionStatus::ConnUnavailable);
    assert_eq!(transitions[1].new, ConnectionStatus::ConnOk);
    assert!(transitions[0].is_closed());
}

#[tokio::test]
async fn test_reconnect_checks_status_again() {
    init_tracing();
    let checks = Arc::new(AtomicUsize::new(0));
    let port = spawn_platform("", counting(&checks, status_only)).await;
    let mut client = client(port);

    client.connect().await.expect("first connect");
    assert_eq!(client.status(), ConnectionStatus::ConnOk);
    client.disconnect();
    assert_eq!(client.status(), ConnectionStatus::Disconnected);

    client.connect().await.expect("second connect");

    assert_eq!(client.status(), ConnectionStatus::ConnOk);
    assert!(client.is_socket_connected());
    assert_eq!(checks.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_silent_status_check_does_not_fail_connect() {
    init_tracing();
    let checks = Arc::new(AtomicUsize::new(0));
    let port = spawn_platform("", counting(&checks, |_| None)).await;
    let mut client = client(port);

    client.connect().await.expect("connect succeeds");

    assert!(client.is_socket_connected());
    assert_eq!(client.status(), ConnectionStatus::ConnError);
    assert_eq!(checks.load(Ordering::SeqCst), 1);
    assert!(client.metrics().last_status_check.is_some());
}

#[tokio::test]
async fn test_recheck_runs_once_when_still_unavailable() {
    init_tracing();
    let checks = Arc::new(AtomicUsize::new(0));
    let port = spawn_platform(
        "DARWIN_STATUS;CONN_UNAVAILABLE;FALSE;starting\n",
        counting(&checks, |command| {
            (command == "DARWINSTATUS")
                .then(|| "DARWIN_STATUS;CONN_UNAVAILABLE;FALSE;still starting\n".to_string())
        }),
    )
    .await;
    let mut client = client(port);

    client.connect().await.expect("connect");

    assert_eq!(client.status(), ConnectionStatus::ConnUnavailable);
    assert_eq!(checks.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Status Check
// ============================================================================

#[tokio::test]
async fn test_explicit_status_check_retries_once() {
    init_tracing();
    let checks = Arc::new(AtomicUsize::new(0));
    let port = spawn_platform(READY, counting(&checks, |_| None)).await;
    let mut client = client(port);
    client.connect().await.expect("connect");
    assert_eq!(checks.load(Ordering::SeqCst), 0);

    let parsed = client.probe_darwin_status(true).await;

    assert_eq!(checks.load(Ordering::SeqCst), 2);
    let data = parsed.data.expect("synthesized status");
    assert_eq!(data.connection_status, "CONN_ERROR");
    assert!(data.connection_metrics.is_some());
    assert_eq!(client.status(), ConnectionStatus::ConnError);
}

#[tokio::test]
async fn test_explicit_status_check_without_retry() {
    init_tracing();
    let checks = Arc::new(AtomicUsize::new(0));
    let port = spawn_platform(READY, counting(&checks, |_| None)).await;
    let mut client = client(port);
    client.connect().await.expect("connect");

    let parsed = client.probe_darwin_status(false).await;

    assert_eq!(checks.load(Ordering::SeqCst), 1);
    assert!(parsed.success);
}

#[tokio::test]
async fn test_explicit_status_check_recovers_on_retry() {
    init_tracing();
    let checks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&checks);
    let port = spawn_platform(READY, move |command| {
        if command != "DARWINSTATUS" {
            return None;
        }
        let seen = counter.fetch_add(1, Ordering::SeqCst);
        (seen > 0).then(|| "DARWIN_STATUS;CONN_OK;TRUE;back\n".to_string())
    })
    .await;
    let mut client = client(port);
    client.connect().await.expect("connect");

    let data = client.probe_darwin_status(true).await.data.expect("status");

    assert_eq!(checks.load(Ordering::SeqCst), 2);
    assert_eq!(data.connection_status, "CONN_OK");
    assert!(data.is_connected);
    assert_eq!(client.status(), ConnectionStatus::ConnOk);
}

// ============================================================================
// Exchange
// ============================================================================

#[tokio::test]
async fn test_silent_command_times_out() {
    init_tracing();
    let port = spawn_platform(READY, |_| None).await;
    let mut client = client(port);
    client.connect().await.expect("connect");
    let before = client.health().transitions().len();

    let err = client.send("INFOACCOUNT").await.unwrap_err();

    assert!(matches!(err, Error::NoResponse { .. }));
    assert!(err.is_timeout());
    assert_eq!(client.health().transitions().len(), before);
    assert_eq!(client.status(), ConnectionStatus::ConnOk);
}

#[tokio::test]
async fn test_selects_marker_line_over_trailing_blank() {
    init_tracing();
    let port = spawn_platform(READY, |command| {
        (command == "ORDERLIST")
            .then(|| "ORDER;ENI;10:00:00;ORD1;BUY;12.5;0;10;PENDING\n\n".to_string())
    })
    .await;
    let mut client = client(port);
    client.connect().await.expect("connect");

    let line = client.send("ORDERLIST").await.expect("reply");
    assert_eq!(line, "ORDER;ENI;10:00:00;ORD1;BUY;12.5;0;10;PENDING");
}

#[tokio::test]
async fn test_status_lines_resolve_by_priority() {
    init_tracing();
    let port = spawn_platform("", |command| {
        (command == "DARWINSTATUS").then(|| {
            "DARWIN_STATUS;CONN_UNAVAILABLE;FALSE;a\nDARWIN_STATUS;CONN_OK;TRUE;b\n".to_string()
        })
    })
    .await;
    let mut client = client(port);

    client.connect().await.expect("connect");
    assert_eq!(client.status(), ConnectionStatus::ConnOk);
}

#[tokio::test]
async fn test_unsolicited_status_inside_reply() -> anyhow::Result<()> {
    init_tracing();
    let port = spawn_platform(READY, |command| {
        (command == "INFOSTOCKS").then(|| {
            "DARWIN_STATUS;CONN_ERROR;FALSE;lost\nSTOCK;ENI;10:00:00;10;0;0;12.5;1.2\n".to_string()
        })
    })
    .await;
    let mut client = client(port);
    client.connect().await?;

    let positions = client.portfolio().await?.into_result()?;
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].symbol, "ENI");
    assert_eq!(client.status(), ConnectionStatus::ConnError);
    Ok(())
}

// ============================================================================
// Orders
// ============================================================================

fn order_id_of(command: &str) -> String {
    command
        .split_once(' ')
        .map(|(_, args)| args.split(',').next().unwrap_or_default().to_string())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_auto_confirm_answers_tradconfirm() -> anyhow::Result<()> {
    init_tracing();
    let port = spawn_platform(READY, |command| {
        let id = order_id_of(command);
        if command.starts_with("ACQAZ") {
            Some(format!("TRADCONFIRM;ENI;{id};WAIT;BUY;10;12.5;0;0;10;REF1;{command}\n"))
        } else if command.starts_with("CONFORD") {
            Some(format!("TRADOK;ENI;{id};SENT;BUY;10;12.5;0;0;10;REF1;{command}\n"))
        } else {
            None
        }
    })
    .await;

    let mut client = DirectaClient::builder()
        .port(port)
        .timeouts(fast_timeouts())
        .auto_confirm(true)
        .build()?;
    client.connect().await?;

    let ack = client
        .place_order(&OrderRequest::limit("ENI", Side::Buy, 10, 12.5))
        .await?
        .into_result()?;

    assert_eq!(ack.status_code, "SENT");
    assert!(!ack.confirmation_required);
    assert!(ack.command.starts_with("CONFORD"));
    Ok(())
}

#[tokio::test]
async fn test_platform_error_stays_in_envelope() {
    init_tracing();
    let port = spawn_platform(READY, |command| {
        command.starts_with("REVORD").then(|| "ERR;N/A;1020\n".to_string())
    })
    .await;
    let mut client = client(port);
    client.connect().await.expect("connect");

    let reply = client
        .cancel_order(&directa_session::OrderId::new("ORD404"))
        .await
        .expect("transport ok");
    assert!(!reply.success);
    assert_eq!(reply.error_code.as_deref(), Some("1020"));
}

// ============================================================================
// Disconnect
// ============================================================================

#[tokio::test]
async fn test_disconnect_forces_disconnected() {
    init_tracing();
    let port = spawn_platform(READY, |_| None).await;
    let mut client = client(port);
    client.connect().await.expect("connect");

    client.disconnect();

    assert_eq!(client.status(), ConnectionStatus::Disconnected);
    assert!(!client.is_socket_connected());
    let attempts = client.health().attempts();
    assert_eq!(attempts.last().map(|a| a.kind), Some(AttemptKind::Disconnect));
    assert_eq!(client.metrics().successful_connections, 1);

    let err = client.send("INFOACCOUNT").await.unwrap_err();
    assert!(matches!(err, Error::NotConnected));
}

#[tokio::test]
async fn test_scoped_session_disconnects_on_drop() {
    init_tracing();
    let port = spawn_platform(READY, |_| None).await;
    let mut client = client(port);

    {
        let session = client.session().await.expect("session");
        assert!(session.is_connected());
    }

    assert_eq!(client.status(), ConnectionStatus::Disconnected);
    assert!(!client.is_socket_connected());
}
