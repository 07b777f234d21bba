//! Move relay, display names, chat and audio signaling.

use gambit_protocol::{MoveOutcome, MoveRequest, RoomKey, ServerEvent};
use gambit_rules::{Candidate, RulesEngine};
use gambit_session::{Connection, Recipient, RoomKind};
use gambit_transport::ConnectionId;
use serde_json::Value;

use crate::{RoomError, RoomService};

/// An audio negotiation message. The payload is forwarded untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Offer(Value),
    Answer(Value),
    Ice(Value),
}

impl Signal {
    fn into_event(self) -> ServerEvent {
        match self {
            Self::Offer(offer) => ServerEvent::AudioOffer(offer),
            Self::Answer(answer) => ServerEvent::AudioAnswer(answer),
            Self::Ice(candidate) => ServerEvent::AudioIce(candidate),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::Ice(_) => "ice",
        }
    }
}

impl<E: RulesEngine> RoomService<E> {
    /// Plays a move for the seat `conn` holds.
    ///
    /// The room stays locked from the turn check through both broadcasts:
    /// the opponent gets `opponent-move`, then every occupant, the mover
    /// included, gets the new position as `board-state`.
    ///
    /// # Errors
    /// `NotFound`, `NotSeated`, `NotYourTurn` or `Rules`. Nothing is sent
    /// and the position is unchanged.
    pub async fn submit_move(
        &self,
        conn: &Connection,
        room: &RoomKey,
        request: &MoveRequest,
    ) -> Result<MoveOutcome, RoomError> {
        let handle = self
            .games
            .get(room)
            .await
            .ok_or_else(|| RoomError::NotFound(room.clone()))?;
        let mut game = handle.lock().await;

        let candidate = Candidate::from_request(request, self.config.default_promotion);
        let outcome = game.play(conn.id(), &candidate)?;

        let occupants = game.occupants();
        let peers = self.peers.read().await;
        peers.dispatch(
            occupants.iter().copied(),
            Recipient::AllExcept(conn.id()),
            &ServerEvent::OpponentMove(outcome.clone()),
        );
        peers.dispatch(
            occupants.iter().copied(),
            Recipient::All,
            &ServerEvent::BoardState(outcome.after.clone()),
        );
        tracing::debug!(%room, conn = %conn.id(), san = %outcome.san, "move accepted");
        Ok(outcome)
    }

    /// Broadcasts a display name as `OpponentName` to every member of the
    /// room, sender included.
    ///
    /// # Errors
    /// Returns [`RoomError::NotMember`] if `conn` hasn't joined the room.
    pub async fn announce_name(
        &self,
        conn: &Connection,
        room: &RoomKey,
        name: String,
    ) -> Result<usize, RoomError> {
        self.require_member(conn, room)?;
        let members = self.members_of(room).await;
        let sent = self.peers.read().await.dispatch(
            members,
            Recipient::All,
            &ServerEvent::OpponentName { name },
        );
        Ok(sent)
    }

    /// Forwards chat text to every other member of the room, game seats and
    /// audio participants alike. Returns how many received it.
    ///
    /// # Errors
    /// Returns [`RoomError::NotMember`] if `conn` hasn't joined the room.
    pub async fn chat(
        &self,
        conn: &Connection,
        room: &RoomKey,
        message: String,
    ) -> Result<usize, RoomError> {
        self.require_member(conn, room)?;
        let members = self.members_of(room).await;
        let sent = self.peers.read().await.dispatch(
            members,
            Recipient::AllExcept(conn.id()),
            &ServerEvent::ReceiveMessage(message),
        );
        Ok(sent)
    }

    /// Forwards an offer, answer or ICE candidate to the other audio
    /// participants. Returns how many received it.
    ///
    /// # Errors
    /// `NotFound` if there's no such audio room, `NotMember` if `conn`
    /// isn't one of its participants.
    pub async fn relay_signal(
        &self,
        conn: &Connection,
        room: &RoomKey,
        signal: Signal,
    ) -> Result<usize, RoomError> {
        let handle = self
            .audio
            .get(room)
            .await
            .ok_or_else(|| RoomError::NotFound(room.clone()))?;
        let audio = handle.lock().await;
        if !audio.contains(conn.id()) {
            return Err(RoomError::NotMember {
                conn: conn.id(),
                room: room.clone(),
            });
        }

        let kind = signal.name();
        let sent = self.peers.read().await.dispatch(
            audio.participants().iter().copied(),
            Recipient::AllExcept(conn.id()),
            &signal.into_event(),
        );
        tracing::debug!(%room, conn = %conn.id(), kind, sent, "audio signal relayed");
        Ok(sent)
    }

    fn require_member(&self, conn: &Connection, room: &RoomKey) -> Result<(), RoomError> {
        if conn.is_member(RoomKind::Game, room) || conn.is_member(RoomKind::Audio, room) {
            Ok(())
        } else {
            Err(RoomError::NotMember {
                conn: conn.id(),
                room: room.clone(),
            })
        }
    }

    /// Everyone in either room under `key`: seats first, then audio
    /// participants not already seated.
    async fn members_of(&self, key: &RoomKey) -> Vec<ConnectionId> {
        let mut members = Vec::new();
        if let Some(handle) = self.games.get(key).await {
            members.extend(handle.lock().await.occupants());
        }
        if let Some(handle) = self.audio.get(key).await {
            for id in handle.lock().await.participants() {
                if !members.contains(id) {
                    members.push(*id);
                }
            }
        }
        members
    }
}
