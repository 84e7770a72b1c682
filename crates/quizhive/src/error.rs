//! Unified error type for the Quizhive server.

use quizhive_protocol::ProtocolError;
use quizhive_room::RoomError;
use quizhive_store::StoreError;
use quizhive_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `quizhive` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A question-bank error (empty, unavailable).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A room-level error (not found, game over, unavailable).
    #[error(transparent)]
    Room(#[from] RoomError),
}
