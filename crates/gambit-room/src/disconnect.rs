//! Teardown of a connection across every room it joined.

use std::time::Instant;

use gambit_protocol::ServerEvent;
use gambit_rules::RulesEngine;
use gambit_session::{Connection, Membership, Recipient, RoomKind};

use crate::RoomService;

impl<E: RulesEngine> RoomService<E> {
    /// Removes `conn` from every room it joined and drops its channel.
    ///
    /// Game rooms lose the seat and the remaining occupant gets
    /// `opponent-left`. Audio rooms drop the participant and the rest get
    /// `audio-peer-left`. Rooms themselves stay addressable.
    ///
    /// Consumes the connection, so this can only happen once per
    /// connection.
    pub async fn disconnect(&self, conn: Connection) {
        let id = conn.id();
        for Membership { kind, room } in conn.into_memberships() {
            match kind {
                RoomKind::Game => {
                    let Some(handle) = self.games.get(&room).await else {
                        tracing::debug!(%room, conn = %id, "game room already gone");
                        continue;
                    };
                    let mut game = handle.lock().await;
                    let Some(side) = game.vacate(id, Instant::now()) else {
                        continue;
                    };
                    let occupants = game.occupants();
                    self.peers.read().await.dispatch(
                        occupants,
                        Recipient::All,
                        &ServerEvent::OpponentLeft,
                    );
                    tracing::info!(%room, conn = %id, %side, state = %game.state(), "seat vacated");
                }
                RoomKind::Audio => {
                    let Some(handle) = self.audio.get(&room).await else {
                        tracing::debug!(%room, conn = %id, "audio room already gone");
                        continue;
                    };
                    let mut audio = handle.lock().await;
                    if !audio.leave(id, Instant::now()) {
                        continue;
                    }
                    self.peers.read().await.dispatch(
                        audio.participants().iter().copied(),
                        Recipient::All,
                        &ServerEvent::AudioPeerLeft,
                    );
                    tracing::info!(
                        %room,
                        conn = %id,
                        participants = audio.len(),
                        "audio participant left"
                    );
                }
            }
        }

        if let Err(err) = self.peers.write().await.unregister(id) {
            tracing::warn!(conn = %id, %err, "disconnect for unregistered connection");
        }
    }
}
