//! Game room core for Quizhive.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! authoritative game state: the player list, the current question, and
//! the round counter. All mutation goes through the room's mailbox, so
//! operations on one room are serialized while independent rooms run
//! fully in parallel.
//!
//! # Key types
//!
//! - [`GameRoom`] — the trivia state machine itself
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomRegistry`] — creates rooms on first join, destroys them when
//!   they empty
//! - [`RoomConfig`] / [`GamePhase`] — game constants and lifecycle
//! - [`RoomError`] — what room operations can fail with

mod config;
mod error;
mod game;
mod registry;
mod room;

pub use config::{GamePhase, RoomConfig};
pub use error::RoomError;
pub use game::{
    AnswerOutcome, DisconnectOutcome, GameRoom, JoinOutcome, Player,
};
pub use registry::RoomRegistry;
pub use room::{
    AnswerReply, DisconnectReply, JoinReply, RoomHandle, RoomSender,
    spawn_room, DEFAULT_CHANNEL_SIZE,
};
