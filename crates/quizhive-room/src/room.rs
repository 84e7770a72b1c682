//! Room actor: an isolated Tokio task that owns one [`GameRoom`].
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. Commands are processed one at a time, which
//! is the entire concurrency story for game state: two simultaneous
//! answers to the same question are simply handled in arrival order.

use std::collections::HashMap;

use quizhive_protocol::{
    PlayerId, PlayerInfo, QuestionView, RoomId, ServerMessage,
};
use quizhive_store::QuestionStore;
use quizhive_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::{
    AnswerOutcome, DisconnectOutcome, GameRoom, JoinOutcome, RoomError,
};

/// Default command-channel capacity for a room actor.
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Channel sender for delivering broadcasts to one connection.
pub type RoomSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in each variant is a reply channel — the caller
/// sends a command and awaits the response on it.
pub(crate) enum RoomCommand {
    /// Attach a connection as a player (new or rejoining).
    Join {
        conn_id: ConnectionId,
        name: String,
        color: String,
        sender: RoomSender,
        reply: oneshot::Sender<JoinReply>,
    },

    /// Grade an answer from a player.
    SubmitAnswer {
        player_id: PlayerId,
        answer: i64,
        reply: oneshot::Sender<Result<AnswerReply, RoomError>>,
    },

    /// Reset the game for another run.
    PlayAgain {
        reply: oneshot::Sender<Result<QuestionView, RoomError>>,
    },

    /// Detach a connection, removing the player it owns.
    Disconnect {
        conn_id: ConnectionId,
        reply: oneshot::Sender<DisconnectReply>,
    },

    /// Shut down the room.
    Shutdown,
}

/// Reply to a join: what the joining client needs for its ack.
#[derive(Debug, Clone)]
pub struct JoinReply {
    /// The joining (or reattached) player.
    pub player: PlayerInfo,
    /// The room's current question.
    pub question: QuestionView,
    /// `true` if this reattached an existing player.
    pub rejoined: bool,
}

/// Reply to a graded answer.
#[derive(Debug, Clone, Copy)]
pub struct AnswerReply {
    /// Whether the answer was correct.
    pub correct: bool,
    /// Whether the submission ended the game.
    pub game_ended: bool,
}

/// Reply to a disconnect.
#[derive(Debug, Clone, Copy)]
pub struct DisconnectReply {
    /// The player the connection owned, if any.
    pub removed: Option<PlayerId>,
    /// `true` when the room just emptied; the registry destroys it.
    pub now_empty: bool,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone — it's just an `mpsc::Sender` wrapper. The
/// `RoomRegistry` holds one of these per room.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's id.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Attaches a connection as a player, registering its outbound
    /// channel for broadcasts.
    pub async fn join(
        &self,
        conn_id: ConnectionId,
        name: impl Into<String>,
        color: impl Into<String>,
        sender: RoomSender,
    ) -> Result<JoinReply, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                conn_id,
                name: name.into(),
                color: color.into(),
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Submits an answer for grading.
    pub async fn submit_answer(
        &self,
        player_id: PlayerId,
        answer: i64,
    ) -> Result<AnswerReply, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::SubmitAnswer {
                player_id,
                answer,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    /// Resets the game for another run.
    pub async fn play_again(&self) -> Result<QuestionView, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::PlayAgain { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    /// Detaches a connection from the room.
    pub async fn disconnect(
        &self,
        conn_id: ConnectionId,
    ) -> Result<DisconnectReply, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Disconnect {
                conn_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor<S> {
    game: GameRoom,
    store: S,
    /// Per-connection outbound channels for broadcasts.
    senders: HashMap<ConnectionId, RoomSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl<S: QuestionStore> RoomActor<S> {
    /// Runs the actor loop, processing commands until shutdown.
    ///
    /// An empty room is NOT a reason to stop: the registry owns room
    /// lifetime and sends `Shutdown` when it removes the entry. Stopping
    /// on our own would race a client joining through a handle the
    /// registry already gave out.
    async fn run(mut self) {
        tracing::info!(room_id = %self.game.id(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    conn_id,
                    name,
                    color,
                    sender,
                    reply,
                } => {
                    self.senders.insert(conn_id, sender);
                    let JoinOutcome {
                        player,
                        question,
                        rejoined,
                        broadcasts,
                    } = self.game.join(conn_id, &name, &color);
                    let _ = reply.send(JoinReply {
                        player,
                        question,
                        rejoined,
                    });
                    self.broadcast(broadcasts);
                }
                RoomCommand::SubmitAnswer {
                    player_id,
                    answer,
                    reply,
                } => {
                    let result = self
                        .game
                        .submit_answer(&self.store, player_id, answer)
                        .await;
                    match result {
                        Ok(AnswerOutcome {
                            correct,
                            game_ended,
                            broadcasts,
                        }) => {
                            let _ = reply.send(Ok(AnswerReply {
                                correct,
                                game_ended,
                            }));
                            self.broadcast(broadcasts);
                        }
                        Err(err) => {
                            let _ = reply.send(Err(err));
                        }
                    }
                }
                RoomCommand::PlayAgain { reply } => {
                    match self.game.play_again(&self.store).await {
                        Ok((question, broadcasts)) => {
                            let _ = reply.send(Ok(question));
                            self.broadcast(broadcasts);
                        }
                        Err(err) => {
                            let _ = reply.send(Err(err));
                        }
                    }
                }
                RoomCommand::Disconnect { conn_id, reply } => {
                    self.senders.remove(&conn_id);
                    let DisconnectOutcome {
                        removed,
                        now_empty,
                        broadcasts,
                    } = self.game.disconnect(conn_id);
                    let _ = reply.send(DisconnectReply {
                        removed,
                        now_empty,
                    });
                    self.broadcast(broadcasts);
                }
                RoomCommand::Shutdown => {
                    tracing::info!(
                        room_id = %self.game.id(),
                        "room shutting down"
                    );
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.game.id(), "room actor stopped");
    }

    /// Fans messages out to every registered connection. Closed channels
    /// are silently dropped — the connection's own disconnect will clean
    /// up its entry.
    fn broadcast(&self, msgs: Vec<ServerMessage>) {
        for msg in msgs {
            for sender in self.senders.values() {
                let _ = sender.send(msg.clone());
            }
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate
/// with it.
///
/// `channel_size` controls backpressure — if the command channel fills
/// up, senders wait.
pub fn spawn_room<S: QuestionStore>(
    game: GameRoom,
    store: S,
    channel_size: usize,
) -> RoomHandle {
    let room_id = game.id().clone();
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        game,
        store,
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use quizhive_store::{MemoryQuestionStore, Question};
    use crate::RoomConfig;

    fn spawn_test_room() -> RoomHandle {
        let store = MemoryQuestionStore::with_questions([Question::new(
            "What is 2 + 2?",
            4,
        )]);
        let game = GameRoom::new(
            RoomId::new("abc"),
            Question::new("What is 2 + 2?", 4),
            RoomConfig::default(),
        );
        spawn_room(game, store, DEFAULT_CHANNEL_SIZE)
    }

    #[tokio::test]
    async fn test_join_replies_with_player_and_question() {
        let handle = spawn_test_room();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let reply = handle
            .join(ConnectionId::new(1), "alice", "red", tx)
            .await
            .unwrap();

        assert_eq!(reply.player.name, "alice");
        assert!(!reply.rejoined);
        assert_eq!(reply.question.text, "What is 2 + 2?");

        // The joiner also receives the player-list broadcast.
        let msg = rx.recv().await.unwrap();
        assert!(matches!(msg, ServerMessage::PlayerList { .. }));
    }

    #[tokio::test]
    async fn test_answer_broadcasts_reach_every_connection() {
        let handle = spawn_test_room();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        let alice = handle
            .join(ConnectionId::new(1), "alice", "red", tx_a)
            .await
            .unwrap();
        handle
            .join(ConnectionId::new(2), "bob", "blue", tx_b)
            .await
            .unwrap();
        // Drain join-time player lists.
        rx_a.recv().await.unwrap();
        rx_a.recv().await.unwrap();
        rx_b.recv().await.unwrap();

        let reply = handle
            .submit_answer(alice.player.id, 4)
            .await
            .unwrap();
        assert!(reply.correct);

        for rx in [&mut rx_a, &mut rx_b] {
            let first = rx.recv().await.unwrap();
            assert!(matches!(first, ServerMessage::NewQuestion { .. }));
            let second = rx.recv().await.unwrap();
            assert!(matches!(second, ServerMessage::PlayerList { .. }));
        }
    }

    #[tokio::test]
    async fn test_commands_after_shutdown_report_unavailable() {
        let handle = spawn_test_room();
        handle.shutdown().await.unwrap();
        // Give the actor a chance to drain and drop its receiver.
        tokio::task::yield_now().await;

        let result = handle.play_again().await;
        assert!(matches!(result, Err(RoomError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_disconnect_reports_empty_room() {
        let handle = spawn_test_room();
        let (tx, _rx) = mpsc::unbounded_channel();
        handle
            .join(ConnectionId::new(1), "alice", "red", tx)
            .await
            .unwrap();

        let reply = handle.disconnect(ConnectionId::new(1)).await.unwrap();

        assert!(reply.removed.is_some());
        assert!(reply.now_empty);
    }
}
