//! Per-connection gateway: decodes requests, routes them to rooms, and
//! relays room broadcasts back out.
//!
//! Each accepted connection gets its own Tokio task running this
//! gateway. The task owns both directions of the socket:
//!
//!   - inbound: receive frames, decode [`ClientRequest`], dispatch to
//!     the room layer, send the per-request ack
//!   - outbound: drain the broadcast channel the room actor fans into,
//!     encode each [`ServerMessage`], send it
//!
//! Acks always precede the broadcasts a request caused: dispatch sends
//! the ack directly before the loop returns to draining the broadcast
//! channel.

use std::sync::Arc;

use quizhive_protocol::{ClientRequest, Codec, RoomId, ServerMessage};
use quizhive_room::{RoomError, RoomHandle};
use quizhive_store::QuestionStore;
use quizhive_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::QuizError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S, C>>,
) -> Result<(), QuizError>
where
    S: QuestionStore,
    C: Codec,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // The room actor fans broadcasts into this channel; the select loop
    // below drains it onto the socket.
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    let mut gateway = Gateway {
        conn,
        conn_id,
        state,
        outbound_tx,
        joined_room: None,
    };

    let result = gateway.run(&mut outbound_rx).await;
    // Whatever ended the loop, the player must leave the room.
    gateway.leave_current_room().await;
    result
}

struct Gateway<S: QuestionStore, C: Codec> {
    conn: WebSocketConnection,
    conn_id: ConnectionId,
    state: Arc<ServerState<S, C>>,
    outbound_tx: mpsc::UnboundedSender<ServerMessage>,
    /// The room this connection currently has a player in, if any.
    /// One room per connection: joining another room leaves this one.
    joined_room: Option<RoomId>,
}

impl<S: QuestionStore, C: Codec> Gateway<S, C> {
    /// The connection's main loop: relay broadcasts out, dispatch
    /// requests in, until the socket closes or a send fails.
    async fn run(
        &mut self,
        outbound_rx: &mut mpsc::UnboundedReceiver<ServerMessage>,
    ) -> Result<(), QuizError> {
        loop {
            tokio::select! {
                maybe_msg = outbound_rx.recv() => {
                    // `self` holds a sender, so the channel never closes
                    // from under us.
                    if let Some(msg) = maybe_msg {
                        self.send(&msg).await?;
                    }
                }
                incoming = self.conn.recv() => {
                    match incoming {
                        Ok(Some(data)) => self.dispatch(&data).await?,
                        Ok(None) => {
                            tracing::info!(
                                conn_id = %self.conn_id,
                                "connection closed cleanly"
                            );
                            return Ok(());
                        }
                        Err(e) => {
                            tracing::debug!(
                                conn_id = %self.conn_id,
                                error = %e,
                                "recv error"
                            );
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Decodes one frame and routes the request.
    async fn dispatch(&mut self, data: &[u8]) -> Result<(), QuizError> {
        let request: ClientRequest = match self.state.codec.decode(data) {
            Ok(req) => req,
            Err(e) => {
                tracing::debug!(
                    conn_id = %self.conn_id,
                    error = %e,
                    "failed to decode request"
                );
                return self
                    .send_error(400, &format!("invalid request: {e}"))
                    .await;
            }
        };

        match request {
            ClientRequest::CreateGame {
                display_name,
                color,
            } => self.handle_create(&display_name, &color).await,
            ClientRequest::JoinGame {
                room_id,
                display_name,
                color,
            } => self.handle_join(room_id, &display_name, &color).await,
            ClientRequest::SubmitAnswer {
                room_id,
                player_id,
                answer,
            } => {
                let handle = match self.lookup(&room_id).await {
                    Ok(handle) => handle,
                    Err(e) => return self.send_room_error(&e).await,
                };
                match handle.submit_answer(player_id, answer).await {
                    Ok(reply) => {
                        self.send(&ServerMessage::AnswerResult {
                            correct: reply.correct,
                            game_ended: reply.game_ended,
                        })
                        .await
                    }
                    Err(e) => self.send_room_error(&e).await,
                }
            }
            ClientRequest::PlayAgain { room_id } => {
                let handle = match self.lookup(&room_id).await {
                    Ok(handle) => handle,
                    Err(e) => return self.send_room_error(&e).await,
                };
                match handle.play_again().await {
                    Ok(question) => {
                        self.send(&ServerMessage::QuestionReset {
                            question,
                        })
                        .await
                    }
                    Err(e) => self.send_room_error(&e).await,
                }
            }
        }
    }

    async fn handle_create(
        &mut self,
        display_name: &str,
        color: &str,
    ) -> Result<(), QuizError> {
        self.leave_current_room().await;

        let created = {
            let mut registry = self.state.registry.lock().await;
            registry.create().await
        };
        let handle = match created {
            Ok(handle) => handle,
            Err(e) => return self.send_room_error(&e).await,
        };

        match handle
            .join(
                self.conn_id,
                display_name,
                color,
                self.outbound_tx.clone(),
            )
            .await
        {
            Ok(reply) => {
                let room_id = handle.room_id().clone();
                self.joined_room = Some(room_id.clone());
                self.send(&ServerMessage::GameCreated {
                    room_id,
                    player: reply.player,
                    question: reply.question,
                })
                .await
            }
            Err(e) => self.send_room_error(&e).await,
        }
    }

    async fn handle_join(
        &mut self,
        room_id: RoomId,
        display_name: &str,
        color: &str,
    ) -> Result<(), QuizError> {
        if self.joined_room.as_ref() != Some(&room_id) {
            self.leave_current_room().await;
        }

        let found = {
            let mut registry = self.state.registry.lock().await;
            registry.get_or_create(&room_id).await
        };
        let handle = match found {
            Ok(handle) => handle,
            Err(e) => return self.send_room_error(&e).await,
        };

        match handle
            .join(
                self.conn_id,
                display_name,
                color,
                self.outbound_tx.clone(),
            )
            .await
        {
            Ok(reply) => {
                self.joined_room = Some(room_id);
                self.send(&ServerMessage::Joined {
                    player: reply.player,
                    question: reply.question,
                })
                .await
            }
            Err(e) => self.send_room_error(&e).await,
        }
    }

    /// Looks a room up without creating it. The lock is held only for
    /// the map lookup; room operations run on the cloned handle.
    async fn lookup(
        &self,
        room_id: &RoomId,
    ) -> Result<RoomHandle, RoomError> {
        let registry = self.state.registry.lock().await;
        registry.get(room_id)
    }

    /// Detaches from the current room, destroying it if this was the
    /// last player. The registry lock is held across both steps so a
    /// concurrent `get_or_create` cannot grab a handle to a room that is
    /// about to be shut down.
    async fn leave_current_room(&mut self) {
        let Some(room_id) = self.joined_room.take() else {
            return;
        };

        let mut registry = self.state.registry.lock().await;
        let Ok(handle) = registry.get(&room_id) else {
            return;
        };
        match handle.disconnect(self.conn_id).await {
            Ok(reply) if reply.now_empty => {
                registry.remove(&room_id).await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(
                    conn_id = %self.conn_id,
                    %room_id,
                    error = %e,
                    "disconnect failed"
                );
            }
        }
    }

    /// Encodes and sends one message on the socket.
    async fn send(&self, msg: &ServerMessage) -> Result<(), QuizError> {
        let bytes = self.state.codec.encode(msg)?;
        self.conn.send(&bytes).await.map_err(QuizError::Transport)
    }

    async fn send_error(
        &self,
        code: u16,
        message: &str,
    ) -> Result<(), QuizError> {
        self.send(&ServerMessage::Error {
            code,
            message: message.to_string(),
        })
        .await
    }

    async fn send_room_error(
        &self,
        err: &RoomError,
    ) -> Result<(), QuizError> {
        self.send_error(room_error_code(err), &err.to_string()).await
    }
}

/// Maps room failures onto the HTTP-flavored codes in the wire error.
fn room_error_code(err: &RoomError) -> u16 {
    match err {
        RoomError::NotFound(_) | RoomError::PlayerNotFound(..) => 404,
        RoomError::GameOver(_) => 409,
        RoomError::QuestionBank(_) | RoomError::Unavailable(_) => 503,
    }
}
