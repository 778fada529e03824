//! Connection - Handles an individual gateway connection.
//!
//! ```text
//!   socket ──▶ FramedRead<LinesCodec> ──▶ JSON InboundMessage ──▶ Dispatcher::spawn
//!                                                                   │ (one task each)
//!   socket ◀── FramedWrite<LinesCodec> ◀── writer task ◀── mpsc ◀───┘ GatewayResponder
//! ```
//!
//! The read loop never waits on a dispatch. The writer task ends once the
//! socket has closed and every in-flight dispatch has dropped its sender.

use super::responder::{GatewayResponder, Outbound};
use blep_dispatch::{Dispatcher, InboundMessage, Prefix, Registry};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, info, instrument, warn};

/// Longest accepted inbound line, in bytes.
const MAX_LINE_LENGTH: usize = 16 * 1024;

/// Replies buffered per connection before dispatches start waiting.
const OUTBOUND_QUEUE: usize = 64;

/// A gateway connection handler.
pub struct Connection {
    id: u64,
    addr: SocketAddr,
    stream: TcpStream,
    registry: Arc<Registry>,
    prefix: Prefix,
}

impl Connection {
    /// Create a new connection handler.
    pub fn new(
        id: u64,
        stream: TcpStream,
        addr: SocketAddr,
        registry: Arc<Registry>,
        prefix: Prefix,
    ) -> Self {
        Self {
            id,
            addr,
            stream,
            registry,
            prefix,
        }
    }

    /// Run the connection until the peer disconnects.
    #[instrument(skip(self), fields(id = self.id, addr = %self.addr), name = "connection")]
    pub async fn run(self) -> anyhow::Result<()> {
        info!("Gateway client connected");

        let (read_half, write_half) = self.stream.into_split();
        let codec = LinesCodec::new_with_max_length(MAX_LINE_LENGTH);
        let mut reader = FramedRead::new(read_half, codec);
        let mut writer = FramedWrite::new(write_half, LinesCodec::new());

        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<Outbound>(OUTBOUND_QUEUE);
        let writer_task = tokio::spawn(async move {
            while let Some(outbound) = outgoing_rx.recv().await {
                let line = serde_json::to_string(&outbound)?;
                writer.send(line).await?;
            }
            Ok::<_, anyhow::Error>(())
        });

        let dispatcher = Dispatcher::new(
            self.registry,
            self.prefix,
            Arc::new(GatewayResponder::new(outgoing_tx)),
        );

        let mut received = 0u64;
        while let Some(line) = reader.next().await {
            let line = match line {
                Ok(line) => line,
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    warn!(max = MAX_LINE_LENGTH, "Inbound line too long, skipped");
                    continue;
                }
                Err(LinesCodecError::Io(e)) => {
                    warn!(error = %e, "Read error");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<InboundMessage>(&line) {
                Ok(message) => {
                    received += 1;
                    debug!(
                        channel = %message.channel_id,
                        author = %message.author_id,
                        "Received message"
                    );
                    // Detached; replies flow back through the responder.
                    drop(dispatcher.spawn(message));
                }
                Err(e) => warn!(error = %e, "Malformed inbound line, skipped"),
            }
        }

        drop(dispatcher);
        writer_task.await??;
        info!(received, "Gateway client disconnected");
        Ok(())
    }
}
