//! Question bank contract for Quizhive.
//!
//! The game core doesn't own question persistence — it consumes the
//! [`QuestionStore`] trait. Rooms call [`QuestionStore::sample`] to draw
//! a uniformly random question at round boundaries; an empty bank
//! surfaces as [`StoreError::Empty`], which the core treats as a failed
//! request rather than a room fault.
//!
//! [`MemoryQuestionStore`] is the shipped implementation: an in-process
//! bank suitable for a single-server deployment, tests, and the demo
//! binary. A database-backed store plugs in by implementing the trait.

mod memory;

pub use memory::{
    MemoryQuestionStore, generate_math_question, seed_math_questions,
};

use serde::{Deserialize, Serialize};

/// A stored question: text, the correct (integer) answer, and the base
/// point value a fresh draw starts at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// The question text shown to players.
    pub text: String,
    /// The correct answer. Grading is an exact integer comparison.
    pub answer: i64,
    /// Base point value. Defaults to 1 when not specified.
    pub value: u32,
}

impl Question {
    /// Creates a question with the default base value of 1.
    pub fn new(text: impl Into<String>, answer: i64) -> Self {
        Self {
            text: text.into(),
            answer,
            value: 1,
        }
    }

    /// Creates a question with an explicit base value.
    pub fn with_value(
        text: impl Into<String>,
        answer: i64,
        value: u32,
    ) -> Self {
        Self {
            text: text.into(),
            answer,
            value,
        }
    }
}

/// Errors the question bank can report.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The bank holds no questions. Recoverable: add questions and retry.
    #[error("question bank is empty")]
    Empty,

    /// The backing store failed.
    #[error("question store unavailable: {0}")]
    Unavailable(String),
}

/// The question bank the game core draws from.
///
/// `Send + Sync + Clone + 'static` because every room actor holds its
/// own handle to the store for the lifetime of the room. Implementations
/// are expected to be cheap to clone (shared state behind an `Arc`).
pub trait QuestionStore: Send + Sync + Clone + 'static {
    /// Draws one question, uniformly at random over the whole bank.
    ///
    /// # Errors
    /// [`StoreError::Empty`] when no questions exist.
    fn sample(
        &self,
    ) -> impl Future<Output = Result<Question, StoreError>> + Send;

    /// Adds a question to the bank.
    fn add(
        &self,
        question: Question,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Returns the number of questions in the bank.
    fn count(&self) -> impl Future<Output = Result<usize, StoreError>> + Send;
}
