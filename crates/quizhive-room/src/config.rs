//! Room configuration and the game lifecycle state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration for a game room.
///
/// The defaults are the game as designed; the fields exist so tests can
/// shorten games and so a deployment can tune the pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Rounds per game. Reaching this count ends the game.
    pub rounds_per_game: u32,

    /// How much a question's value climbs per wrong answer against it.
    pub wrong_answer_increment: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            rounds_per_game: 10,
            wrong_answer_increment: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// GamePhase
// ---------------------------------------------------------------------------

/// The lifecycle state of a game room.
///
/// ```text
/// Active ──(round threshold reached)──→ Ended
///    ↑                                    │
///    └────────────(play again)────────────┘
/// ```
///
/// - **Active**: accepting joins and answers, rounds advancing.
/// - **Ended**: the round threshold was reached. Answers are rejected;
///   joins are still accepted (a reload on the results screen must be
///   able to reattach), and `play_again` returns the room to Active
///   with scores and the round counter reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Active,
    Ended,
}

impl GamePhase {
    /// Returns `true` if answers are being graded.
    pub fn is_accepting_answers(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` if the game has ended.
    pub fn is_over(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}
