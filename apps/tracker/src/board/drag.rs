//! Turns a finished drag gesture into a move mutation.
//!
//! `DragEnd` is plain data so any front end (pointer drag, keyboard reorder)
//! can produce it.

use serde::{Deserialize, Serialize};

use crate::board::models::BoardPosition;
use crate::board::mutation::Mutation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    pub card_id: String,
    pub source: BoardPosition,
    /// `None` when the card was dropped outside any column.
    #[serde(default)]
    pub destination: Option<BoardPosition>,
}

impl DragEnd {
    pub fn into_mutation(self) -> Option<Mutation> {
        on_drag_end(self.source, self.destination, &self.card_id)
    }
}

pub fn on_drag_end(
    source: BoardPosition,
    destination: Option<BoardPosition>,
    card_id: &str,
) -> Option<Mutation> {
    let destination = destination?;
    if destination == source {
        return None;
    }

    Some(Mutation::MoveCard {
        card_id: card_id.to_string(),
        source,
        destination,
    })
}
