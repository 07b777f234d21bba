//! `GambitServer` builder, accept loop and room reaper.
//!
//! This is the entry point for running a Gambit server. It ties the layers
//! together: transport → protocol → rooms.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gambit_protocol::{Codec, JsonCodec};
use gambit_room::{RoomConfig, RoomService};
use gambit_rules::RulesEngine;
use gambit_transport::{Transport, WebSocketTransport};
use tokio::time::MissedTickBehavior;

use crate::handler::handle_connection;
use crate::{GambitError, ServerConfig};

/// Shared state passed to each connection handler task.
pub(crate) struct ServerState<E: RulesEngine, C: Codec> {
    pub(crate) rooms: Arc<RoomService<E>>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Option<Duration>,
    pub(crate) handshake_timeout: Duration,
}

/// Builder for configuring and starting a Gambit server.
///
/// # Example
///
/// ```rust,no_run
/// use gambit::prelude::*;
///
/// # async fn start() -> Result<(), GambitError> {
/// let server = GambitServerBuilder::new()
///     .bind("127.0.0.1:3000")
///     .build::<ChessEngine>()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct GambitServerBuilder {
    config: ServerConfig,
}

impl GambitServerBuilder {
    /// Creates a builder with [`ServerConfig::default`].
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    /// Starts from a complete configuration, e.g. one read from the
    /// environment.
    pub fn from_config(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Closes connections that stay silent for `timeout`.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = Some(timeout);
        self
    }

    /// Drops sockets that haven't finished the WebSocket upgrade within
    /// `timeout`.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    /// Sets how often abandoned rooms are looked for.
    pub fn reap_interval(mut self, interval: Duration) -> Self {
        self.config.reap_interval = interval;
        self
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.rooms = config;
        self
    }

    /// Validates the configuration and binds the listener.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build<E: RulesEngine>(
        self,
    ) -> Result<GambitServer<E, JsonCodec>, GambitError> {
        self.config.validate()?;
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: Arc::new(RoomService::new(self.config.rooms)),
            codec: JsonCodec,
            idle_timeout: self.config.idle_timeout,
            handshake_timeout: self.config.handshake_timeout,
        });

        Ok(GambitServer {
            transport,
            state,
            reap_interval: self.config.reap_interval,
        })
    }
}

impl Default for GambitServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Gambit server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GambitServer<E: RulesEngine, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<E, C>>,
    reap_interval: Duration,
}

impl<E, C> GambitServer<E, C>
where
    E: RulesEngine,
    C: Codec,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle on the room service, usable after `run` has taken the
    /// server.
    pub fn rooms(&self) -> Arc<RoomService<E>> {
        Arc::clone(&self.state.rooms)
    }

    /// Runs the accept loop, plus the reaper when reaping is configured.
    ///
    /// Spawns one handler task per accepted socket; the WebSocket upgrade
    /// runs inside that task. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), GambitError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Gambit server running");

        if let Some(grace) = self.state.rooms.config().abandon_grace {
            tracing::info!(?grace, every = ?self.reap_interval, "room reaper enabled");
            tokio::spawn(reap_loop(self.rooms(), self.reap_interval));
        }

        loop {
            match self.transport.accept().await {
                Ok(handshake) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(handshake, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
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

async fn reap_loop<E: RulesEngine>(rooms: Arc<RoomService<E>>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let evicted = rooms.reap_abandoned().await;
        if evicted > 0 {
            tracing::debug!(evicted, "reaper pass");
        }
    }
}
