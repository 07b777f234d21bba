//! Joining rooms and handing out fresh room codes.

use std::time::Instant;

use gambit_protocol::{RoomKey, ServerEvent, Side};
use gambit_rules::RulesEngine;
use gambit_session::{Connection, Recipient, RoomKind};
use rand::Rng;

use crate::audio::{AudioJoin, AudioRoom};
use crate::game::{GameRoom, Seating};
use crate::{RoomError, RoomService};

const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CODE_LEN: usize = 6;

impl<E: RulesEngine> RoomService<E> {
    /// Seats `conn` in a game room, creating the room on first join.
    ///
    /// The requester gets its seat and the current position. When this
    /// join fills the second seat, both occupants then get `both-joined`
    /// followed by the position again. A connection that already holds a
    /// seat is just re-sent its seat and the position.
    ///
    /// # Errors
    /// Returns [`RoomError::RoomFull`] when both seats belong to others;
    /// `room-full` has already been sent to the requester.
    pub async fn join_game_room(
        &self,
        conn: &mut Connection,
        room: RoomKey,
    ) -> Result<Side, RoomError> {
        let id = conn.id();
        let (mut game, created) = self
            .games
            .lock_or_create(&room, || GameRoom::new(room.clone()))
            .await;
        if created {
            tracing::info!(%room, "game room created");
        }

        let peers = self.peers.read().await;
        let seating = match game.take_seat(id) {
            Ok(seating) => seating,
            Err(err) => {
                peers.send_to(id, ServerEvent::RoomFull);
                return Err(err);
            }
        };
        let side = seating.side();
        conn.join(RoomKind::Game, room.clone());

        peers.send_to(id, ServerEvent::PlayerColor(side));
        peers.send_to(id, ServerEvent::BoardState(game.position()));

        if seating.is_new() {
            tracing::info!(%room, conn = %id, %side, "seat taken");
            if game.is_full() {
                let occupants = game.occupants();
                peers.dispatch(
                    occupants.iter().copied(),
                    Recipient::All,
                    &ServerEvent::BothJoined,
                );
                peers.dispatch(
                    occupants.iter().copied(),
                    Recipient::All,
                    &ServerEvent::BoardState(game.position()),
                );
                tracing::info!(%room, "both seats filled");
            }
        }
        Ok(side)
    }

    /// Adds `conn` to an audio room, creating the room on first join.
    ///
    /// A sole participant gets `audio-room-created`. A later one gets
    /// `audio-room-joined` and everyone already there gets
    /// `audio-peer-joined`. Re-joining changes nothing and sends nothing.
    ///
    /// # Errors
    /// Returns [`RoomError::AudioRoomFull`] at capacity;
    /// `audio-room-full` has already been sent to the requester.
    pub async fn audio_join(
        &self,
        conn: &mut Connection,
        room: RoomKey,
    ) -> Result<AudioJoin, RoomError> {
        let id = conn.id();
        let (mut audio, _) = self
            .audio
            .lock_or_create(&room, || AudioRoom::new(room.clone(), Instant::now()))
            .await;

        let peers = self.peers.read().await;
        let joined = match audio.join(id, self.config.audio_capacity) {
            Ok(joined) => joined,
            Err(err) => {
                peers.send_to(id, ServerEvent::AudioRoomFull);
                return Err(err);
            }
        };
        conn.join(RoomKind::Audio, room.clone());

        match joined {
            AudioJoin::Created => {
                peers.send_to(id, ServerEvent::AudioRoomCreated);
            }
            AudioJoin::Joined => {
                peers.send_to(id, ServerEvent::AudioRoomJoined);
                peers.dispatch(
                    audio.participants().iter().copied(),
                    Recipient::AllExcept(id),
                    &ServerEvent::AudioPeerJoined,
                );
            }
            AudioJoin::AlreadyJoined => {}
        }
        tracing::info!(%room, conn = %id, participants = audio.len(), "audio join");
        Ok(joined)
    }

    /// Picks a code no room is using yet and sends it to `conn` as
    /// `room-code`.
    ///
    /// The code isn't reserved; whoever joins it first creates the room.
    pub async fn new_room_code(&self, conn: &Connection) -> RoomKey {
        loop {
            let Ok(code) = RoomKey::new(&random_code()) else {
                continue;
            };
            if self.games.contains(&code).await || self.audio.contains(&code).await {
                continue;
            }
            self.peers
                .read()
                .await
                .send_to(conn.id(), ServerEvent::RoomCode(code.clone()));
            return code;
        }
    }
}

fn random_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect()
}
