use thiserror::Error;

use crate::board::models::{BoardPosition, ColumnId};
use crate::jobs_client::ApiError;

/// A mutation that cannot be applied to the current board.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardError {
    #[error("Card {0} is not on the board")]
    CardNotFound(String),

    #[error("Card {0} is already on the board")]
    DuplicateCard(String),

    #[error("Card {card_id} is not at {expected}")]
    PositionMismatch {
        card_id: String,
        expected: BoardPosition,
    },

    #[error("Index {index} is out of range for column {column} ({len} cards)")]
    IndexOutOfRange {
        column: ColumnId,
        index: usize,
        len: usize,
    },

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),
}

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("Invalid mutation: {0}")]
    Invalid(#[from] BoardError),

    #[error("Backend rejected {operation}: {source}")]
    Backend {
        operation: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("Mutation task did not finish: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}
