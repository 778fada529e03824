//! Gateway - TCP listener that accepts transport connections.
//!
//! The Gateway binds a socket and spawns a Connection task for each
//! incoming client.

use crate::network::Connection;
use blep_dispatch::{Prefix, Registry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    registry: Arc<Registry>,
    prefix: Prefix,
}

impl Gateway {
    /// Bind the gateway to `addr`.
    pub async fn bind(
        addr: SocketAddr,
        registry: Arc<Registry>,
        prefix: Prefix,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "Gateway listener bound");
        Ok(Self {
            listener,
            registry,
            prefix,
        })
    }

    /// Run the gateway, accepting connections forever.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        let mut next_id = 0u64;
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    next_id += 1;
                    let id = next_id;
                    let connection = Connection::new(
                        id,
                        stream,
                        addr,
                        Arc::clone(&self.registry),
                        self.prefix.clone(),
                    );

                    tokio::spawn(async move {
                        if let Err(e) = connection.run().await {
                            error!(id, %addr, error = %e, "Gateway connection error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept gateway connection");
                }
            }
        }
    }
}
