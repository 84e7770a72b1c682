//! Error types for the room layer.

use quizhive_protocol::{PlayerId, RoomId};
use quizhive_store::StoreError;

/// Errors that can occur during room operations.
///
/// All of these are request-local: they surface to the requester's
/// acknowledgment and never corrupt or tear down the room.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The player is not in this room.
    #[error("player {0} not in room {1}")]
    PlayerNotFound(PlayerId, RoomId),

    /// The game has ended; no more answers are accepted until a
    /// `play_again`.
    #[error("game in room {0} is over")]
    GameOver(RoomId),

    /// The question bank could not supply a question. The room stays in
    /// its prior state so the request can be retried once questions
    /// exist.
    #[error(transparent)]
    QuestionBank(#[from] StoreError),

    /// The room's command channel is closed or full.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
