//! Room registry: creates, tracks, and destroys rooms.

use std::collections::HashMap;

use quizhive_protocol::RoomId;
use quizhive_store::QuestionStore;
use rand::Rng;

use crate::room::{spawn_room, DEFAULT_CHANNEL_SIZE};
use crate::{GameRoom, RoomConfig, RoomError, RoomHandle};

/// Alphabet for generated room ids: lowercase base-36.
const ROOM_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of generated room ids. Short enough to read over a shoulder,
/// long enough that collisions among live rooms are rare — and the
/// registry retries on collision anyway.
const ROOM_ID_LEN: usize = 6;

/// Tracks every live room and owns their lifetimes.
///
/// The registry is the only component that creates or destroys room
/// actors. It is the entry point for room operations from the gateway.
pub struct RoomRegistry<S: QuestionStore> {
    /// Live rooms, keyed by room id.
    rooms: HashMap<RoomId, RoomHandle>,
    store: S,
    config: RoomConfig,
}

impl<S: QuestionStore> RoomRegistry<S> {
    /// Creates an empty registry over the given question bank.
    pub fn new(store: S, config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            store,
            config,
        }
    }

    /// Creates a room with a freshly generated id.
    ///
    /// The initial question is drawn before the room is inserted, so an
    /// unavailable question bank never leaves behind a half-made room.
    pub async fn create(&mut self) -> Result<RoomHandle, RoomError> {
        let mut room_id = generate_room_id();
        while self.rooms.contains_key(&room_id) {
            room_id = generate_room_id();
        }
        self.insert_room(room_id).await
    }

    /// Returns the room with the given id, creating it if absent.
    ///
    /// Joining an unknown id creates the room rather than failing, which
    /// lets players share an id out of band before anyone connects.
    pub async fn get_or_create(
        &mut self,
        room_id: &RoomId,
    ) -> Result<RoomHandle, RoomError> {
        if let Some(handle) = self.rooms.get(room_id) {
            return Ok(handle.clone());
        }
        self.insert_room(room_id.clone()).await
    }

    /// Returns the room with the given id, or `NotFound`.
    pub fn get(&self, room_id: &RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    /// Shuts down a room and forgets it. Missing ids are a no-op: the
    /// room may already have been destroyed by a concurrent disconnect.
    pub async fn remove(&mut self, room_id: &RoomId) {
        if let Some(handle) = self.rooms.remove(room_id) {
            let _ = handle.shutdown().await;
            tracing::info!(%room_id, "room destroyed");
        }
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Returns whether a room with this id exists.
    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    async fn insert_room(
        &mut self,
        room_id: RoomId,
    ) -> Result<RoomHandle, RoomError> {
        let question = self.store.sample().await?;
        let game =
            GameRoom::new(room_id.clone(), question, self.config.clone());
        let handle =
            spawn_room(game, self.store.clone(), DEFAULT_CHANNEL_SIZE);
        self.rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, rooms = self.rooms.len(), "room created");
        Ok(handle)
    }
}

/// Generates a short random room id.
fn generate_room_id() -> RoomId {
    let mut rng = rand::rng();
    let id: String = (0..ROOM_ID_LEN)
        .map(|_| {
            let idx = rng.random_range(0..ROOM_ID_ALPHABET.len());
            ROOM_ID_ALPHABET[idx] as char
        })
        .collect();
    RoomId::new(id)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use quizhive_store::{MemoryQuestionStore, Question};

    fn stocked_store() -> MemoryQuestionStore {
        MemoryQuestionStore::with_questions([Question::new(
            "What is 2 + 2?",
            4,
        )])
    }

    #[tokio::test]
    async fn test_create_assigns_distinct_ids() {
        let mut registry =
            RoomRegistry::new(stocked_store(), RoomConfig::default());

        let a = registry.create().await.unwrap();
        let b = registry.create().await.unwrap();

        assert_ne!(a.room_id(), b.room_id());
        assert_eq!(registry.room_count(), 2);
        assert!(registry.contains(a.room_id()));
    }

    #[tokio::test]
    async fn test_create_with_empty_bank_leaves_no_room_behind() {
        let mut registry = RoomRegistry::new(
            MemoryQuestionStore::new(),
            RoomConfig::default(),
        );

        let result = registry.create().await;

        assert!(matches!(result, Err(RoomError::QuestionBank(_))));
        assert_eq!(registry.room_count(), 0);
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_room_for_same_id() {
        let mut registry =
            RoomRegistry::new(stocked_store(), RoomConfig::default());
        let room_id = RoomId::new("shared");

        let first = registry.get_or_create(&room_id).await.unwrap();
        let second = registry.get_or_create(&room_id).await.unwrap();

        assert_eq!(first.room_id(), second.room_id());
        assert_eq!(registry.room_count(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_room_is_not_found() {
        let registry =
            RoomRegistry::new(stocked_store(), RoomConfig::default());

        let result = registry.get(&RoomId::new("nope"));

        assert!(matches!(result, Err(RoomError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_shuts_room_down() {
        let mut registry =
            RoomRegistry::new(stocked_store(), RoomConfig::default());
        let handle = registry.create().await.unwrap();
        let room_id = handle.room_id().clone();

        registry.remove(&room_id).await;
        tokio::task::yield_now().await;

        assert!(!registry.contains(&room_id));
        assert!(registry.get(&room_id).is_err());
        // The actor is gone; the stale handle reports unavailable.
        assert!(matches!(
            handle.play_again().await,
            Err(RoomError::Unavailable(_))
        ));
        // Removing again is harmless.
        registry.remove(&room_id).await;
    }

    #[test]
    fn test_generated_ids_use_the_short_alphabet() {
        for _ in 0..100 {
            let id = generate_room_id();
            assert_eq!(id.as_str().len(), ROOM_ID_LEN);
            assert!(id
                .as_str()
                .bytes()
                .all(|b| ROOM_ID_ALPHABET.contains(&b)));
        }
    }
}
