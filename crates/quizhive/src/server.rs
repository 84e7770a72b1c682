//! `QuizServer` builder and accept loop.
//!
//! This is the entry point for running a Quizhive server. It ties the
//! layers together: transport → protocol → room registry.

use std::sync::Arc;

use quizhive_protocol::{Codec, JsonCodec};
use quizhive_room::{RoomConfig, RoomRegistry};
use quizhive_store::QuestionStore;
use quizhive_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::gateway::handle_connection;
use crate::QuizError;

/// Shared server state passed to each connection gateway task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registry sits behind a `Mutex`; gateways hold the lock only long
/// enough to look up or create a room handle, never across a room
/// operation.
pub(crate) struct ServerState<S: QuestionStore, C: Codec> {
    pub(crate) registry: Mutex<RoomRegistry<S>>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Quizhive server.
///
/// # Example
///
/// ```rust,ignore
/// use quizhive::prelude::*;
///
/// let server = QuizServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(store)
///     .await?;
/// server.run().await
/// ```
pub struct QuizServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl QuizServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the game configuration applied to every room.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Builds and starts the server over the given question store.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport` as defaults.
    pub async fn build<S: QuestionStore>(
        self,
        store: S,
    ) -> Result<QuizServer<S, JsonCodec>, QuizError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: Mutex::new(RoomRegistry::new(
                store,
                self.room_config,
            )),
            codec: JsonCodec,
        });

        Ok(QuizServer { transport, state })
    }
}

impl Default for QuizServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Quizhive server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct QuizServer<S: QuestionStore, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<S, C>>,
}

impl<S, C> QuizServer<S, C>
where
    S: QuestionStore,
    C: Codec,
{
    /// Creates a new builder.
    pub fn builder() -> QuizServerBuilder {
        QuizServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a gateway task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), QuizError> {
        tracing::info!("Quizhive server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
