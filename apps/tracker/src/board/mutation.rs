//! Board mutations and the pure state transitions behind them.
//!
//! `Mutation::apply_to` never touches the store or the network: it returns
//! the next board plus the single backend call that confirms it, or `None`
//! when the mutation would not change anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::board::error::BoardError;
use crate::board::models::{BoardPosition, BoardState, ColumnId, JobCard};
use crate::board::status::{is_wishlist_column, to_status};
use crate::jobs_client::{ApiError, JobStatusApi};
use crate::models::job::{DocumentRef, Status};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    #[default]
    NotInterested,
    Unwishlisted,
}

/// Editable card fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<DocumentRef>>,
}

impl CardPatch {
    fn apply(&self, card: &mut JobCard) {
        if let Some(title) = &self.title {
            card.title = title.clone();
        }
        if let Some(location) = &self.location {
            card.location = location.clone();
        }
        if let Some(notes) = &self.notes {
            card.notes = notes.clone();
        }
        if let Some(documents) = &self.documents {
            card.documents = documents.clone();
        }
    }

    /// Status metadata carrying the patched fields.
    fn metadata(&self) -> Value {
        let mut map = Map::new();
        if let Some(title) = &self.title {
            map.insert("title".to_string(), json!(title));
        }
        if let Some(location) = &self.location {
            map.insert("location".to_string(), json!(location));
        }
        if let Some(notes) = &self.notes {
            map.insert("notes".to_string(), json!(notes));
        }
        if let Some(documents) = &self.documents {
            let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
            map.insert("documents".to_string(), json!(ids));
        }
        Value::Object(map)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    MoveCard {
        card_id: String,
        source: BoardPosition,
        destination: BoardPosition,
    },
    AddCard {
        column: ColumnId,
        #[serde(default)]
        index: Option<usize>,
        card: JobCard,
    },
    UpdateCard {
        card_id: String,
        patch: CardPatch,
    },
    DeleteCard {
        card_id: String,
        #[serde(default)]
        reason: RemovalReason,
    },
}

/// The backend request that confirms a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    SetStatus {
        job_id: String,
        status: Status,
        metadata: Option<Value>,
    },
    AddToWishlist {
        job_id: String,
    },
    RemoveFromWishlist {
        job_id: String,
    },
    MarkNotInterested {
        job_id: String,
    },
}

impl BackendCall {
    pub async fn send(&self, api: &dyn JobStatusApi) -> Result<(), ApiError> {
        match self {
            BackendCall::SetStatus {
                job_id,
                status,
                metadata,
            } => api.set_job_status(job_id, status, metadata.as_ref()).await,
            BackendCall::AddToWishlist { job_id } => api.add_to_wishlist(job_id).await,
            BackendCall::RemoveFromWishlist { job_id } => api.remove_from_wishlist(job_id).await,
            BackendCall::MarkNotInterested { job_id } => api.mark_not_interested(job_id).await,
        }
    }
}

/// Result of applying a mutation to a board.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: BoardState,
    pub call: BackendCall,
}

impl Mutation {
    /// Short operation label, used in logs and error contexts.
    pub fn operation(&self) -> &'static str {
        match self {
            Mutation::MoveCard { .. } => "move_card",
            Mutation::AddCard { .. } => "add_card",
            Mutation::UpdateCard { .. } => "update_card",
            Mutation::DeleteCard { .. } => "delete_card",
        }
    }

    pub fn card_id(&self) -> &str {
        match self {
            Mutation::MoveCard { card_id, .. }
            | Mutation::UpdateCard { card_id, .. }
            | Mutation::DeleteCard { card_id, .. } => card_id,
            Mutation::AddCard { card, .. } => &card.id,
        }
    }

    /// Computes the board after this mutation. `Ok(None)` means no-op.
    pub fn apply_to(
        &self,
        state: &BoardState,
        now: DateTime<Utc>,
    ) -> Result<Option<Transition>, BoardError> {
        match self {
            Mutation::MoveCard {
                card_id,
                source,
                destination,
            } => move_card(state, card_id, *source, *destination, now),
            Mutation::AddCard {
                column,
                index,
                card,
            } => add_card(state, *column, *index, card).map(Some),
            Mutation::UpdateCard { card_id, patch } => update_card(state, card_id, patch),
            Mutation::DeleteCard { card_id, reason } => {
                delete_card(state, card_id, *reason).map(Some)
            }
        }
    }
}

fn move_card(
    state: &BoardState,
    card_id: &str,
    source: BoardPosition,
    destination: BoardPosition,
    now: DateTime<Utc>,
) -> Result<Option<Transition>, BoardError> {
    if source == destination {
        return Ok(None);
    }

    let at_source = state
        .column(source.column)
        .cards
        .get(source.index)
        .is_some_and(|c| c.id == card_id);
    if !at_source {
        return Err(if state.contains(card_id) {
            BoardError::PositionMismatch {
                card_id: card_id.to_string(),
                expected: source,
            }
        } else {
            BoardError::CardNotFound(card_id.to_string())
        });
    }

    let mut next = state.clone();
    let mut card = next.column_mut(source.column).cards.remove(source.index);
    card.wishlisted = is_wishlist_column(destination.column);

    let target = &mut next.column_mut(destination.column).cards;
    let index = destination.index.min(target.len());
    target.insert(index, card);

    // A clamped drop can land the card back on its own slot.
    if next == *state {
        return Ok(None);
    }

    let metadata = (destination.column == ColumnId::Applied && source.column != ColumnId::Applied)
        .then(|| json!({ "applied_at": now.to_rfc3339() }));

    Ok(Some(Transition {
        next,
        call: BackendCall::SetStatus {
            job_id: card_id.to_string(),
            status: to_status(destination.column),
            metadata,
        },
    }))
}

fn add_card(
    state: &BoardState,
    column: ColumnId,
    index: Option<usize>,
    card: &JobCard,
) -> Result<Transition, BoardError> {
    if state.contains(&card.id) {
        return Err(BoardError::DuplicateCard(card.id.clone()));
    }

    let len = state.column(column).cards.len();
    let index = match index {
        Some(i) if i > len => {
            return Err(BoardError::IndexOutOfRange {
                column,
                index: i,
                len,
            })
        }
        Some(i) => i,
        None => len,
    };

    let mut card = card.clone();
    card.wishlisted = is_wishlist_column(column);
    card.not_interested = false;

    let mut next = state.clone();
    next.column_mut(column).cards.insert(index, card.clone());

    let call = if card.wishlisted {
        BackendCall::AddToWishlist { job_id: card.id }
    } else {
        BackendCall::SetStatus {
            job_id: card.id,
            status: to_status(column),
            metadata: None,
        }
    };

    Ok(Transition { next, call })
}

fn update_card(
    state: &BoardState,
    card_id: &str,
    patch: &CardPatch,
) -> Result<Option<Transition>, BoardError> {
    let pos = state
        .locate(card_id)
        .ok_or_else(|| BoardError::CardNotFound(card_id.to_string()))?;

    let mut next = state.clone();
    let card = &mut next.column_mut(pos.column).cards[pos.index];
    patch.apply(card);

    if next == *state {
        return Ok(None);
    }

    Ok(Some(Transition {
        next,
        call: BackendCall::SetStatus {
            job_id: card_id.to_string(),
            status: to_status(pos.column),
            metadata: Some(patch.metadata()),
        },
    }))
}

fn delete_card(
    state: &BoardState,
    card_id: &str,
    reason: RemovalReason,
) -> Result<Transition, BoardError> {
    let pos = state
        .locate(card_id)
        .ok_or_else(|| BoardError::CardNotFound(card_id.to_string()))?;

    let mut next = state.clone();
    next.column_mut(pos.column).cards.remove(pos.index);

    let job_id = card_id.to_string();
    let call = match reason {
        RemovalReason::NotInterested => BackendCall::MarkNotInterested { job_id },
        RemovalReason::Unwishlisted => BackendCall::RemoveFromWishlist { job_id },
    };

    Ok(Transition { next, call })
}
