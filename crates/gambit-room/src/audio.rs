//! An audio room: an ordered, capped list of participants.

use std::time::{Duration, Instant};

use gambit_protocol::RoomKey;
use gambit_transport::ConnectionId;

use crate::RoomError;

/// The result of a successful [`AudioRoom::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioJoin {
    /// The joiner is the only participant.
    Created,
    /// The joiner found others already there.
    Joined,
    /// The joiner was already in the list; nothing changed.
    AlreadyJoined,
}

#[derive(Debug)]
pub struct AudioRoom {
    key: RoomKey,
    participants: Vec<ConnectionId>,
    empty_since: Option<Instant>,
}

impl AudioRoom {
    pub fn new(key: RoomKey, now: Instant) -> Self {
        Self {
            key,
            participants: Vec::new(),
            empty_since: Some(now),
        }
    }

    /// Participants in arrival order.
    pub fn participants(&self) -> &[ConnectionId] {
        &self.participants
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.participants.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Appends `id` if there's room.
    ///
    /// # Errors
    /// Returns [`RoomError::AudioRoomFull`] at `capacity`; the list is
    /// left as it was.
    pub fn join(&mut self, id: ConnectionId, capacity: usize) -> Result<AudioJoin, RoomError> {
        if self.contains(id) {
            return Ok(AudioJoin::AlreadyJoined);
        }
        if self.participants.len() >= capacity {
            return Err(RoomError::AudioRoomFull(self.key.clone()));
        }
        self.participants.push(id);
        self.empty_since = None;
        if self.participants.len() == 1 {
            Ok(AudioJoin::Created)
        } else {
            Ok(AudioJoin::Joined)
        }
    }

    /// Removes `id`. Returns whether it was present.
    pub fn leave(&mut self, id: ConnectionId, now: Instant) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| *p != id);
        let removed = self.participants.len() != before;
        if removed && self.participants.is_empty() {
            self.empty_since = Some(now);
        }
        removed
    }

    /// How long the room has had no participants, or `None` if it has some.
    pub fn idle_for(&self, now: Instant) -> Option<Duration> {
        self.empty_since
            .map(|since| now.saturating_duration_since(since))
    }
}
