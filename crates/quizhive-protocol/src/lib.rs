//! Wire protocol for Quizhive.
//!
//! This crate defines the messages that clients and the server exchange:
//!
//! - **Types** ([`ClientRequest`], [`ServerMessage`], [`PlayerInfo`],
//!   [`QuestionView`], the id newtypes) — the structures that travel on
//!   the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding
//!   or decoding.
//!
//! The protocol layer sits between the transport (raw bytes) and the
//! game core (rooms, players). It knows nothing about connections or
//! room state — only how messages are shaped.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientRequest, PlayerId, PlayerInfo, QuestionView, RoomId,
    RoundOutcome, ServerMessage,
};
