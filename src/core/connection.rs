//! Per-connection handler
//! Drives one accepted connection through its lifecycle: handshake and
//! registration, the active read loop, and teardown with a leave notice.
//! A dedicated writer task drains the session's outbound channel to the
//! socket, decoupling broadcast delivery from the recipient's write speed.

use std::sync::Arc;

use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify};

use crate::constants::NAME_TAKEN_LINE;
use crate::core::registry::{RegisterOutcome, Session};
use crate::core::router::{Disposition, MessageRouter};

/// Why an active session left its read loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    ExitCommand,
    EndOfStream,
    StreamFailure,
    ServerShutdown,
}

/// Handle one accepted connection for its whole lifetime.
pub async fn handle_client(stream: TcpStream, router: MessageRouter) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let (read_half, write_half) = stream.into_split();
    let (tx, rx) = mpsc::unbounded_channel::<String>();

    // Writer task: the only place this connection's socket is written. Ends
    // when the channel is dropped or the socket breaks.
    let writer = tokio::spawn(write_outbound(write_half, rx));

    let mut lines = BufReader::new(read_half).lines();

    // Connecting: the first line is the proposed display name.
    let name = match lines.next_line().await {
        Ok(Some(line)) => line.trim().to_string(),
        Ok(None) | Err(_) => {
            info!("Connection from {} closed before registration", peer);
            drop(tx);
            let _ = writer.await;
            return;
        }
    };

    let closer = Arc::new(Notify::new());
    let session = Session::new(name.clone(), tx.clone(), closer.clone());

    // The local session handle is dropped right after registration: the
    // writer task only terminates once every sender is gone, so the handler
    // must not keep one alive beyond the scope that needs it.
    let outcome = router.register(&session);
    drop(session);
    match outcome {
        Ok(RegisterOutcome::Accepted) => {
            info!("Client {} registered from {}", name, peer);
        }
        Ok(RegisterOutcome::Conflict) => {
            info!("Rejected duplicate name {} from {}", name, peer);
            let _ = tx.send(NAME_TAKEN_LINE.to_string());
            drop(tx);
            let _ = writer.await;
            return;
        }
        Err(e) => {
            error!("Failed to register client {}: {}", name, e);
            drop(tx);
            let _ = writer.await;
            return;
        }
    }

    // Active: read lines until the client exits, the stream ends, or the
    // server shuts the session down.
    let reason = loop {
        tokio::select! {
            _ = closer.notified() => break DisconnectReason::ServerShutdown,
            read = lines.next_line() => match read {
                Ok(Some(line)) => match router.route(&name, &line) {
                    Ok(Disposition::Continue) => {}
                    Ok(Disposition::Disconnect) => break DisconnectReason::ExitCommand,
                    Err(e) => {
                        error!("Routing failure for {}: {}", name, e);
                        break DisconnectReason::StreamFailure;
                    }
                },
                Ok(None) => break DisconnectReason::EndOfStream,
                Err(e) => {
                    warn!("Read error for {}: {}", name, e);
                    break DisconnectReason::StreamFailure;
                }
            },
        }
    };

    // Closing: remove the session and tell everyone left. On server shutdown
    // the registry is already drained, so unregister is a no-op there.
    if let Err(e) = router.unregister_and_announce(&name) {
        error!("Failed to unregister {}: {}", name, e);
    }

    drop(tx);
    let _ = writer.await;
    info!("Client {} disconnected ({:?})", name, reason);
}

async fn write_outbound(mut writer: OwnedWriteHalf, mut rx: mpsc::UnboundedReceiver<String>) {
    while let Some(line) = rx.recv().await {
        if writer.write_all(line.as_bytes()).await.is_err()
            || writer.write_all(b"\n").await.is_err()
        {
            break;
        }
        if writer.flush().await.is_err() {
            break;
        }
    }
    let _ = writer.shutdown().await;
}
