//! # Quizhive
//!
//! Room-based multiplayer trivia server.
//!
//! Quizhive is server-authoritative: clients send answers, the server
//! grades them against a question bank it never reveals, and every
//! state change is broadcast to the whole room. Rooms are isolated
//! actors, so one stuck room never slows another.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quizhive::prelude::*;
//!
//! # async fn run() -> Result<(), QuizError> {
//! let store = MemoryQuestionStore::new();
//! seed_math_questions(&store, 100).await?;
//!
//! let server = QuizServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(store)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod gateway;
mod server;

pub use error::QuizError;
pub use server::{QuizServer, QuizServerBuilder};

/// Everything a server binary typically needs.
pub mod prelude {
    pub use crate::{QuizError, QuizServer, QuizServerBuilder};
    pub use quizhive_protocol::{
        ClientRequest, PlayerId, PlayerInfo, QuestionView, RoomId,
        RoundOutcome, ServerMessage,
    };
    pub use quizhive_room::{GamePhase, RoomConfig};
    pub use quizhive_store::{
        generate_math_question, seed_math_questions, MemoryQuestionStore,
        Question, QuestionStore, StoreError,
    };
}
