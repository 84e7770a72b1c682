//! Message types for Quizhive's wire format.
//!
//! Every type here gets serialized to JSON, sent over the player's
//! channel, and deserialized on the other side. Requests carry the room
//! id explicitly so the server can route them without per-connection
//! protocol state; server messages are a single enum covering both the
//! unicast acknowledgments and the room-wide broadcasts.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player within the server process.
///
/// Newtype wrapper over `u64` so a player id can't be confused with any
/// other numeric value in a signature. `#[serde(transparent)]` makes it
/// serialize as the bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// An opaque identifier for a game room.
///
/// Unlike [`PlayerId`], room ids are strings: clients may supply their
/// own when joining, and server-generated ids are short base-36
/// fragments. The server never inspects the contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Creates a room id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// A player's standing in the current round, as seen by the whole room.
///
/// `Correct` is only ever observable transiently: a correct answer
/// resolves the round, and resolution clears every outcome back to
/// `Unanswered`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
pub enum RoundOutcome {
    /// No answer submitted against the current question yet.
    #[default]
    Unanswered,
    /// Answered the current question correctly.
    Correct,
    /// Guessed wrong on the current question.
    Incorrect,
}

/// A player snapshot as broadcast in `PlayerList` and `GameEnded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    /// The player's id, assigned at join time.
    pub id: PlayerId,
    /// Display name chosen by the client.
    pub name: String,
    /// Display color chosen by the client.
    pub color: String,
    /// Running score for the current game.
    pub score: u32,
    /// Standing in the current round.
    pub outcome: RoundOutcome,
}

/// The active question as shown to clients.
///
/// Deliberately omits the correct answer — grading happens server-side.
/// `value` is the reward for answering correctly *right now*; it climbs
/// as wrong guesses accumulate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    /// The question text.
    pub text: String,
    /// Points awarded for a correct answer at this moment.
    pub value: u32,
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Requests a client can send.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{ "type": "SubmitAnswer", "room_id": "abc", "player_id": 3, "answer": 4 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientRequest {
    /// Create a fresh room with a generated id and join it.
    CreateGame { display_name: String, color: String },

    /// Join the room with the given id, creating it if it doesn't exist.
    /// Re-joining with a display name already present in the room
    /// reattaches to that player instead of creating a duplicate.
    JoinGame {
        room_id: RoomId,
        display_name: String,
        color: String,
    },

    /// Submit an answer to the room's current question.
    SubmitAnswer {
        room_id: RoomId,
        player_id: PlayerId,
        answer: i64,
    },

    /// After a game has ended, reset scores and start over.
    PlayAgain { room_id: RoomId },
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Everything the server sends.
///
/// The first five variants are unicast acknowledgments to the requester;
/// the rest are room-wide broadcasts. Clients tell them apart by the
/// `type` tag alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    // -- Acknowledgments --
    /// Ack for `CreateGame`: the new room's id, the caller's player, and
    /// the first question.
    GameCreated {
        room_id: RoomId,
        player: PlayerInfo,
        question: QuestionView,
    },

    /// Ack for `JoinGame`.
    Joined {
        player: PlayerInfo,
        question: QuestionView,
    },

    /// Ack for `SubmitAnswer`. `game_ended` is `true` when this answer
    /// resolved the final round.
    AnswerResult { correct: bool, game_ended: bool },

    /// Ack for `PlayAgain`: the freshly drawn question.
    QuestionReset { question: QuestionView },

    /// A failed request. `code` follows HTTP conventions (404 not found,
    /// 409 wrong state, 503 question bank empty). Never broadcast.
    Error { code: u16, message: String },

    // -- Broadcasts --
    /// The room's player list, in join order. Re-sent after every
    /// membership or score change.
    PlayerList { players: Vec<PlayerInfo> },

    /// A new round has started with this question.
    NewQuestion { question: QuestionView },

    /// The game is over. `players` is the leaderboard: score descending,
    /// ties broken by join order.
    GameEnded { players: Vec<PlayerInfo> },
}

// =========================================================================
// Tests
// =========================================================================
