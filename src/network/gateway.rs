//! Gateway - TCP listener that accepts incoming connections.
//!
//! Binds the configured address and spawns a [`Connection`] task per
//! client. Ctrl-C stops the accept loop; in-flight connections finish on
//! their own.

use super::{Connection, Shared};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    shared: Arc<Shared>,
}

impl Gateway {
    /// Bind the gateway to the configured address.
    pub async fn bind(shared: Arc<Shared>) -> anyhow::Result<Self> {
        // The address was validated at config load.
        let addr: SocketAddr = shared.config.server.listen.parse()?;
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "Listener bound");
        Ok(Self { listener, shared })
    }

    /// Run the accept loop until a shutdown signal arrives.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            tokio::select! {
                result = self.listener.accept() => match result {
                    Ok((stream, addr)) => {
                        let connection = Connection::new(Arc::clone(&self.shared), stream, addr);
                        tokio::spawn(async move {
                            connection.run().await;
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "Accept failed");
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }
        Ok(())
    }
}
