use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::board::models::BoardState;

/// Outcome of the most recent bulk load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    NotLoaded,
    Loaded,
    Failed {
        message: String,
    },
}

/// Single source of truth for the board.
///
/// Readers get an `Arc` snapshot; the only write is a whole-board swap.
#[derive(Debug, Default)]
pub struct BoardStore {
    state: RwLock<Arc<BoardState>>,
    load_status: RwLock<LoadStatus>,
}

impl BoardStore {
    pub fn new(initial: BoardState) -> Self {
        Self {
            state: RwLock::new(Arc::new(initial)),
            load_status: RwLock::new(LoadStatus::NotLoaded),
        }
    }

    pub fn get_state(&self) -> Arc<BoardState> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace_state(&self, next: impl Into<Arc<BoardState>>) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next.into();
    }

    pub fn load_status(&self) -> LoadStatus {
        self.load_status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_load_status(&self, status: LoadStatus) {
        *self
            .load_status
            .write()
            .unwrap_or_else(PoisonError::into_inner) = status;
    }
}
