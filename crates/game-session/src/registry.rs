//! In-memory registry of live games.
//!
//! Each game is wrapped in its own mutex: at most one mutating command is
//! in flight per game, so two near-simultaneous submissions can never both
//! succeed against a stale board. Different games share nothing and proceed
//! in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::game::GamePlay;

pub type GameId = i64;

#[derive(Debug, Default)]
pub struct GameRegistry {
    games: RwLock<HashMap<GameId, Arc<Mutex<GamePlay>>>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a game under `id`, replacing any previous one.
    pub fn insert(&self, id: GameId, game: GamePlay) {
        let mut games = self
            .games
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        games.insert(id, Arc::new(Mutex::new(game)));
    }

    pub fn remove(&self, id: GameId) {
        let mut games = self
            .games
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        games.remove(&id);
    }

    pub fn contains(&self, id: GameId) -> bool {
        self.games
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.games
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` with exclusive access to the game, or `None` for an unknown
    /// id. The map lock is dropped before the game lock is taken, so a slow
    /// command on one game never blocks commands on another.
    pub fn with_game<T>(&self, id: GameId, f: impl FnOnce(&mut GamePlay) -> T) -> Option<T> {
        let game = {
            let games = self
                .games
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            games.get(&id).cloned()
        }?;
        let mut guard = game.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Some(f(&mut guard))
    }
}
