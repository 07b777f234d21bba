//! Per-connection handler: event routing and outbound delivery.
//!
//! Each accepted socket gets its own Tokio task running this handler. The
//! task first finishes the WebSocket upgrade under a deadline, then owns
//! the connection's [`Connection`] context and loops over three things at
//! once:
//!   1. inbound frames → decode → one room-service operation
//!   2. its outbound channel → encode → send
//!   3. the idle deadline, if one is configured
//!
//! Whatever ends the loop, the drop guard runs the disconnect path.

use std::sync::Arc;
use std::time::Duration;

use gambit_protocol::{ClientEvent, Codec};
use gambit_room::{RoomError, Signal};
use gambit_rules::RulesEngine;
use gambit_session::Connection;
use gambit_transport::{Connection as _, Handshake, TransportError, WebSocketHandshake};
use tokio::time::Instant;

use crate::GambitError;
use crate::server::ServerState;

/// Drop guard that tears the connection out of its rooms when the handler
/// exits.
///
/// This covers panics and early returns too. `Drop` is synchronous, so the
/// async disconnect runs as a fire-and-forget task.
struct DisconnectGuard<E: RulesEngine, C: Codec> {
    conn: Connection,
    state: Arc<ServerState<E, C>>,
}

impl<E: RulesEngine, C: Codec> Drop for DisconnectGuard<E, C> {
    fn drop(&mut self) {
        let id = self.conn.id();
        let conn = std::mem::replace(&mut self.conn, Connection::new(id));
        let rooms = Arc::clone(&self.state.rooms);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    rooms.disconnect(conn).await;
                    tracing::info!(conn_id = %id, "client disconnected");
                });
            }
            Err(_) => tracing::warn!(conn_id = %id, "no runtime left to run disconnect"),
        }
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<E, C>(
    handshake: WebSocketHandshake,
    state: Arc<ServerState<E, C>>,
) -> Result<(), GambitError>
where
    E: RulesEngine,
    C: Codec,
{
    let conn_id = handshake.id();
    let peer = handshake.peer_addr();
    let conn = match tokio::time::timeout(state.handshake_timeout, handshake.complete()).await {
        Ok(upgraded) => upgraded?,
        Err(_) => {
            tracing::debug!(%conn_id, %peer, "WebSocket upgrade timed out");
            return Err(TransportError::HandshakeTimedOut(state.handshake_timeout).into());
        }
    };

    let (context, mut outbound) = state.rooms.connect(conn_id).await?;
    tracing::info!(%conn_id, "client connected");

    let mut guard = DisconnectGuard {
        conn: context,
        state: Arc::clone(&state),
    };
    let mut deadline = next_deadline(state.idle_timeout);

    loop {
        tokio::select! {
            event = outbound.recv() => {
                let Some(event) = event else {
                    tracing::warn!(%conn_id, "outbound channel closed");
                    break;
                };
                let bytes = state.codec.encode(&event)?;
                conn.send(&bytes).await?;
            }

            frame = conn.recv() => {
                let data = match frame {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::debug!(%conn_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break;
                    }
                };
                deadline = next_deadline(state.idle_timeout);

                let event: ClientEvent = match state.codec.decode(&data) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "failed to decode event");
                        continue;
                    }
                };

                if let Err(e) = dispatch(&state, &mut guard.conn, event).await {
                    tracing::debug!(%conn_id, error = %e, "event dropped");
                }
            }

            () = idle(deadline) => {
                tracing::info!(%conn_id, "connection timed out");
                if let Err(e) = conn.close().await {
                    tracing::debug!(%conn_id, error = %e, "close failed");
                }
                break;
            }
        }
    }

    // guard drops here → disconnect fires.
    Ok(())
}

/// Routes one client event to the room service.
///
/// Failures here are the silent drops of the protocol: the service has
/// already sent whatever the client should see.
async fn dispatch<E, C>(
    state: &ServerState<E, C>,
    conn: &mut Connection,
    event: ClientEvent,
) -> Result<(), RoomError>
where
    E: RulesEngine,
    C: Codec,
{
    let rooms = &state.rooms;
    match event {
        ClientEvent::JoinRoom(room) => {
            rooms.join_game_room(conn, room).await?;
        }
        ClientEvent::PlayerName { room_id, name } => {
            rooms.announce_name(conn, &room_id, name).await?;
        }
        ClientEvent::Move { room_id, request } => {
            rooms.submit_move(conn, &room_id, &request).await?;
        }
        ClientEvent::SendMessage { room_id, message } => {
            rooms.chat(conn, &room_id, message).await?;
        }
        ClientEvent::AudioJoin(room) => {
            rooms.audio_join(conn, room).await?;
        }
        ClientEvent::AudioOffer { room_id, offer } => {
            rooms.relay_signal(conn, &room_id, Signal::Offer(offer)).await?;
        }
        ClientEvent::AudioAnswer { room_id, answer } => {
            rooms.relay_signal(conn, &room_id, Signal::Answer(answer)).await?;
        }
        ClientEvent::AudioIce { room_id, candidate } => {
            rooms.relay_signal(conn, &room_id, Signal::Ice(candidate)).await?;
        }
        ClientEvent::NewRoom => {
            rooms.new_room_code(conn).await;
        }
    }
    Ok(())
}

fn next_deadline(timeout: Option<Duration>) -> Option<Instant> {
    timeout.map(|t| Instant::now() + t)
}

/// Resolves at `deadline`, or never without one.
async fn idle(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
