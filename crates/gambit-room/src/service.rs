//! The room service: both registries plus the peer directory.
//!
//! Every operation a connection can trigger is a method on [`RoomService`],
//! split by concern across `lifecycle`, `relay` and `disconnect`. The
//! server shares one service behind an `Arc`; there is no global state.

use std::time::Instant;

use gambit_protocol::{Fen, RoomKey, Side};
use gambit_rules::RulesEngine;
use gambit_session::{Connection, Outbound, PeerDirectory};
use gambit_transport::ConnectionId;
use tokio::sync::RwLock;

use crate::audio::AudioRoom;
use crate::game::GameRoom;
use crate::registry::Registry;
use crate::{RoomConfig, RoomError, RoomState};

/// A point-in-time copy of one game room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub white: Option<ConnectionId>,
    pub black: Option<ConnectionId>,
    pub position: Fen,
    pub turn: Side,
    pub state: RoomState,
}

/// Owns every room and every outbound channel.
///
/// Lock order, when more than one is held: registry map, then a game room,
/// then an audio room, then the peer directory.
pub struct RoomService<E: RulesEngine> {
    pub(crate) games: Registry<GameRoom<E>>,
    pub(crate) audio: Registry<AudioRoom>,
    pub(crate) peers: RwLock<PeerDirectory>,
    pub(crate) config: RoomConfig,
}

impl<E: RulesEngine> RoomService<E> {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            games: Registry::new(),
            audio: Registry::new(),
            peers: RwLock::new(PeerDirectory::new()),
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Registers a new connection and hands back its context together with
    /// the channel its handler drains.
    ///
    /// # Errors
    /// Returns [`RoomError::Session`] if `id` is already registered.
    pub async fn connect(&self, id: ConnectionId) -> Result<(Connection, Outbound), RoomError> {
        let outbound = self.peers.write().await.register(id)?;
        Ok((Connection::new(id), outbound))
    }

    /// Number of live connections.
    pub async fn connection_count(&self) -> usize {
        self.peers.read().await.len()
    }

    pub async fn game_room_count(&self) -> usize {
        self.games.len().await
    }

    pub async fn audio_room_count(&self) -> usize {
        self.audio.len().await
    }

    /// Copies out a game room's seats and position, if the room exists.
    pub async fn game_snapshot(&self, room: &RoomKey) -> Option<GameSnapshot> {
        let handle = self.games.get(room).await?;
        let game = handle.lock().await;
        Some(GameSnapshot {
            white: game.occupant(Side::White),
            black: game.occupant(Side::Black),
            position: game.position(),
            turn: game.turn(),
            state: game.state(),
        })
    }

    /// Participants of an audio room in arrival order, if the room exists.
    pub async fn audio_participants(&self, room: &RoomKey) -> Option<Vec<ConnectionId>> {
        let handle = self.audio.get(room).await?;
        let audio = handle.lock().await;
        Some(audio.participants().to_vec())
    }

    /// Evicts rooms that have been empty for longer than
    /// [`RoomConfig::abandon_grace`]. Returns how many were evicted.
    ///
    /// Does nothing when no grace is configured.
    pub async fn reap_abandoned(&self) -> usize {
        self.reap_abandoned_at(Instant::now()).await
    }

    /// [`reap_abandoned`](Self::reap_abandoned) with an explicit clock.
    pub async fn reap_abandoned_at(&self, now: Instant) -> usize {
        let Some(grace) = self.config.abandon_grace else {
            return 0;
        };

        let games = self
            .games
            .evict_where(|game| {
                game.state()
                    .abandoned_for(now)
                    .is_some_and(|idle| idle >= grace)
            })
            .await;
        let audio = self
            .audio
            .evict_where(|room| room.idle_for(now).is_some_and(|idle| idle >= grace))
            .await;

        for room in &games {
            tracing::info!(%room, "abandoned game room evicted");
        }
        for room in &audio {
            tracing::info!(%room, "empty audio room evicted");
        }
        games.len() + audio.len()
    }
}
