//! The trivia state machine: players, rounds, scoring, and question
//! value escalation.
//!
//! [`GameRoom`] is plain state — it knows nothing about tasks, channels,
//! or sockets. Every operation mutates the room and returns the
//! broadcasts the caller must fan out. The actor in [`crate::room`]
//! wraps it and provides the serialization guarantee; keeping the rules
//! here makes them directly unit-testable.
//!
//! The one subtlety is atomicity against the question bank: when an
//! operation needs a fresh question, the draw happens *before* any
//! state is touched. A failed draw therefore fails the request and
//! leaves the room exactly as it was.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use quizhive_protocol::{
    PlayerId, PlayerInfo, QuestionView, RoomId, RoundOutcome,
    ServerMessage,
};
use quizhive_store::{Question, QuestionStore};
use quizhive_transport::ConnectionId;

use crate::{GamePhase, RoomConfig, RoomError};

/// Counter for assigning player IDs at join time.
static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

/// A player in a room.
///
/// Identity is the display name: re-joining with a name already present
/// reattaches to this record rather than creating a second one, which is
/// what keeps a score alive across a page reload.
#[derive(Debug, Clone)]
pub struct Player {
    /// Assigned at join, stable until the player leaves the room.
    pub id: PlayerId,
    /// Display name chosen by the client.
    pub name: String,
    /// Display color chosen by the client.
    pub color: String,
    /// Running score. Only an explicit reset lowers it.
    pub score: u32,
    /// Standing in the current round; cleared whenever a round resolves.
    pub outcome: RoundOutcome,
}

impl Player {
    fn info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
            color: self.color.clone(),
            score: self.score,
            outcome: self.outcome,
        }
    }
}

/// Result of a `join`.
#[derive(Debug)]
pub struct JoinOutcome {
    /// The joining (or reattached) player.
    pub player: PlayerInfo,
    /// The room's current question.
    pub question: QuestionView,
    /// `true` if this was a reattach to an existing player.
    pub rejoined: bool,
    /// Messages to broadcast to the whole room.
    pub broadcasts: Vec<ServerMessage>,
}

/// Result of a `submit_answer`.
#[derive(Debug)]
pub struct AnswerOutcome {
    /// Whether the submitted answer was correct.
    pub correct: bool,
    /// Whether this submission ended the game.
    pub game_ended: bool,
    /// Messages to broadcast to the whole room.
    pub broadcasts: Vec<ServerMessage>,
}

/// Result of a `disconnect`.
#[derive(Debug)]
pub struct DisconnectOutcome {
    /// The player this connection owned, if any.
    pub removed: Option<PlayerId>,
    /// `true` when the room just went from non-empty to empty; the
    /// registry destroys the room on this signal.
    pub now_empty: bool,
    /// Messages to broadcast to the whole room.
    pub broadcasts: Vec<ServerMessage>,
}

/// The authoritative state of one game room.
pub struct GameRoom {
    id: RoomId,
    phase: GamePhase,
    /// Players in join order. Order is only used for deterministic
    /// snapshots and the leaderboard tiebreak.
    players: Vec<Player>,
    /// Which player each live connection controls. Transient connection
    /// ids come and go; the player records above outlive them.
    owners: HashMap<ConnectionId, PlayerId>,
    current_question: Question,
    rounds_completed: u32,
    config: RoomConfig,
}

impl GameRoom {
    /// Creates an active, empty room holding an already-drawn question.
    pub fn new(
        id: RoomId,
        initial_question: Question,
        config: RoomConfig,
    ) -> Self {
        Self {
            id,
            phase: GamePhase::Active,
            players: Vec::new(),
            owners: HashMap::new(),
            current_question: initial_question,
            rounds_completed: 0,
            config,
        }
    }

    /// Returns the room's id.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Returns the current lifecycle phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Returns the number of resolved rounds this game.
    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    /// Returns the players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Returns the current question as shown to clients.
    pub fn question_view(&self) -> QuestionView {
        QuestionView {
            text: self.current_question.text.clone(),
            value: self.current_question.value,
        }
    }

    /// Adds a player, or reattaches a connection to an existing player
    /// with the same display name.
    ///
    /// A reattach rebinds connection ownership and leaves the score
    /// untouched; the previous connection (if any) no longer controls
    /// the player, so its eventual disconnect removes nobody.
    pub fn join(
        &mut self,
        conn_id: ConnectionId,
        name: &str,
        color: &str,
    ) -> JoinOutcome {
        if let Some(existing) =
            self.players.iter().find(|p| p.name == name)
        {
            let player = existing.info();
            self.owners.retain(|_, owner| *owner != player.id);
            self.owners.insert(conn_id, player.id);
            tracing::info!(
                room_id = %self.id,
                player_id = %player.id,
                %conn_id,
                "player reattached"
            );
            return JoinOutcome {
                question: self.question_view(),
                rejoined: true,
                broadcasts: vec![self.player_list()],
                player,
            };
        }

        let player = Player {
            id: PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.to_string(),
            color: color.to_string(),
            score: 0,
            outcome: RoundOutcome::Unanswered,
        };
        let info = player.info();
        self.owners.insert(conn_id, player.id);
        self.players.push(player);
        tracing::info!(
            room_id = %self.id,
            player_id = %info.id,
            players = self.players.len(),
            "player joined"
        );

        JoinOutcome {
            player: info,
            question: self.question_view(),
            rejoined: false,
            broadcasts: vec![self.player_list()],
        }
    }

    /// Grades an answer against the current question.
    ///
    /// Correct: the player earns the question's current value and the
    /// round resolves. Wrong: the player is marked incorrect and the
    /// question's value climbs; the round resolves only once every
    /// player has guessed wrong. Resolution advances the round counter,
    /// clears every outcome, and either ends the game at the threshold
    /// or draws the next question.
    pub async fn submit_answer<S: QuestionStore>(
        &mut self,
        store: &S,
        player_id: PlayerId,
        answer: i64,
    ) -> Result<AnswerOutcome, RoomError> {
        if !self.phase.is_accepting_answers() {
            return Err(RoomError::GameOver(self.id.clone()));
        }
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| {
                RoomError::PlayerNotFound(player_id, self.id.clone())
            })?;

        let correct = answer == self.current_question.answer;
        // A wrong answer resolves the round only if everyone else has
        // already missed — the escape hatch that keeps an unanswerable
        // question from stalling the game forever.
        let resolves = correct
            || self.players.iter().all(|p| {
                p.id == player_id || p.outcome == RoundOutcome::Incorrect
            });
        let ends = resolves
            && self.rounds_completed + 1 >= self.config.rounds_per_game;

        // Draw before mutating: if the bank is empty the request fails
        // here and the room is untouched.
        let next_question = if resolves && !ends {
            Some(store.sample().await?)
        } else {
            None
        };

        let mut broadcasts = Vec::new();
        if correct {
            let reward = self.current_question.value;
            let player = &mut self.players[idx];
            player.score += reward;
            player.outcome = RoundOutcome::Correct;
            tracing::debug!(
                room_id = %self.id,
                %player_id,
                reward,
                score = player.score,
                "correct answer"
            );
        } else {
            self.players[idx].outcome = RoundOutcome::Incorrect;
            self.current_question.value +=
                self.config.wrong_answer_increment;
            tracing::debug!(
                room_id = %self.id,
                %player_id,
                value = self.current_question.value,
                "wrong answer, question value escalated"
            );
        }

        if resolves {
            self.rounds_completed += 1;
            self.clear_outcomes();
            match next_question {
                Some(question) => {
                    self.current_question = question;
                    broadcasts.push(ServerMessage::NewQuestion {
                        question: self.question_view(),
                    });
                }
                None => {
                    self.phase = GamePhase::Ended;
                    tracing::info!(
                        room_id = %self.id,
                        rounds = self.rounds_completed,
                        "game ended"
                    );
                    broadcasts.push(ServerMessage::GameEnded {
                        players: self.leaderboard(),
                    });
                }
            }
        }
        broadcasts.push(self.player_list());

        Ok(AnswerOutcome {
            correct,
            game_ended: ends,
            broadcasts,
        })
    }

    /// Starts the game over: scores and round counter to zero, outcomes
    /// cleared, a fresh question drawn.
    ///
    /// Valid from `Ended`; tolerated from `Active` as a plain reset.
    pub async fn play_again<S: QuestionStore>(
        &mut self,
        store: &S,
    ) -> Result<(QuestionView, Vec<ServerMessage>), RoomError> {
        let question = store.sample().await?;

        self.rounds_completed = 0;
        for player in &mut self.players {
            player.score = 0;
            player.outcome = RoundOutcome::Unanswered;
        }
        self.current_question = question;
        self.phase = GamePhase::Active;
        tracing::info!(room_id = %self.id, "game reset");

        let view = self.question_view();
        let broadcasts = vec![
            ServerMessage::NewQuestion {
                question: view.clone(),
            },
            self.player_list(),
        ];
        Ok((view, broadcasts))
    }

    /// Removes the player owned by a departing connection.
    ///
    /// Connections that own no player (a stale socket after a rejoin)
    /// remove nobody.
    pub fn disconnect(&mut self, conn_id: ConnectionId) -> DisconnectOutcome {
        let removed = self.owners.remove(&conn_id);
        let mut broadcasts = Vec::new();

        if let Some(player_id) = removed {
            self.players.retain(|p| p.id != player_id);
            tracing::info!(
                room_id = %self.id,
                %player_id,
                players = self.players.len(),
                "player left"
            );
            broadcasts.push(self.player_list());
        }

        DisconnectOutcome {
            removed,
            now_empty: removed.is_some() && self.players.is_empty(),
            broadcasts,
        }
    }

    /// The player-list broadcast, in join order.
    fn player_list(&self) -> ServerMessage {
        ServerMessage::PlayerList {
            players: self.players.iter().map(Player::info).collect(),
        }
    }

    /// Final standings: score descending. The sort is stable, so equal
    /// scores keep join order.
    fn leaderboard(&self) -> Vec<PlayerInfo> {
        let mut players: Vec<PlayerInfo> =
            self.players.iter().map(Player::info).collect();
        players.sort_by(|a, b| b.score.cmp(&a.score));
        players
    }

    fn clear_outcomes(&mut self) {
        for player in &mut self.players {
            player.outcome = RoundOutcome::Unanswered;
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
