//! A trivia server seeded with generated arithmetic questions.
//!
//! Run it, then point any WebSocket client at the bind address:
//!
//! ```text
//! QUIZHIVE_ADDR=0.0.0.0:8080 cargo run -p math-quiz
//! ```

use quizhive::prelude::*;

const QUESTION_COUNT: usize = 100;

#[tokio::main]
async fn main() -> Result<(), QuizError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let store = MemoryQuestionStore::new();
    seed_math_questions(&store, QUESTION_COUNT).await?;

    let addr = std::env::var("QUIZHIVE_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    let server = QuizServerBuilder::new().bind(&addr).build(store).await?;
    tracing::info!(
        addr = %server.local_addr().map(|a| a.to_string()).unwrap_or(addr),
        "math quiz server listening"
    );

    server.run().await
}
