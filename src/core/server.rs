//! Listener and server lifecycle
//! Accepts connections, spawns one handler task per connection, and on
//! shutdown drains the registry so every pending read unblocks and every
//! connection is released exactly once.

use std::future::Future;
use std::net::SocketAddr;

use log::{error, info};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::core::connection::handle_client;
use crate::core::registry::{create_registry, lock_registry, Registry};
use crate::core::router::MessageRouter;
use crate::error::Result;

pub struct RelayServer {
    listener: TcpListener,
    registry: Registry,
    router: MessageRouter,
}

impl RelayServer {
    /// Bind the listening socket and set up the shared registry and router.
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.addr()).await?;
        let registry = create_registry();
        let router = MessageRouter::new(registry.clone(), config.banned_words.clone());
        Ok(Self {
            listener,
            registry,
            router,
        })
    }

    /// The actual bound address; useful when the configured port is 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Accept connections until `shutdown` resolves, then drain the registry
    /// and close every remaining session.
    pub async fn run_until<F: Future<Output = ()>>(self, shutdown: F) {
        tokio::pin!(shutdown);
        info!("Accepting connections on {:?}", self.listener.local_addr());

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Stop requested");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        info!("A new client has connected from {}", addr);
                        tokio::spawn(handle_client(stream, self.router.clone()));
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                },
            }
        }

        self.shutdown_all();
    }

    // Drain the registry atomically, then close each session outside the
    // lock. Each handler wakes from its read, finds the registry empty, and
    // releases its own stream.
    fn shutdown_all(&self) {
        let sessions = match lock_registry(&self.registry) {
            Ok(mut guard) => guard.shutdown_all(),
            Err(e) => {
                error!("Failed to lock registry for shutdown: {}", e);
                return;
            }
        };
        info!("Closing {} open sessions", sessions.len());
        for session in sessions {
            session.close();
        }
    }
}
