use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::board::drag::DragEnd;
use crate::board::engine::MutationOutcome;
use crate::board::filter::{parse_filters, SortOrder};
use crate::board::models::{ColumnId, JobCard};
use crate::board::mutation::{CardPatch, Mutation, RemovalReason};
use crate::board::service::BoardView;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    #[serde(default)]
    pub q: Option<String>,
    /// Comma-separated filter tags, e.g. `remote,full_time`.
    #[serde(default)]
    pub filters: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub cards: usize,
    #[serde(flatten)]
    pub view: BoardView,
}

#[derive(Debug, Deserialize)]
pub struct AddCardRequest {
    pub column: ColumnId,
    #[serde(default)]
    pub index: Option<usize>,
    pub card: JobCard,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteCardQuery {
    #[serde(default)]
    pub reason: RemovalReason,
}

/// GET /api/v1/board
pub async fn handle_get_board(
    State(state): State<AppState>,
    Query(params): Query<BoardQuery>,
) -> Result<Json<BoardView>, AppError> {
    let filters = parse_filters(params.filters.as_deref().unwrap_or_default())?;
    let order: SortOrder = params.sort.as_deref().unwrap_or_default().parse()?;
    let query = params.q.as_deref().unwrap_or_default();
    Ok(Json(state.board.view(query, &filters, order)))
}

/// POST /api/v1/board/refresh
pub async fn handle_refresh(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, AppError> {
    let cards = state.board.refresh().await?;
    Ok(Json(RefreshResponse {
        cards,
        view: state.board.full_view(),
    }))
}

/// POST /api/v1/board/drag
pub async fn handle_drag(
    State(state): State<AppState>,
    Json(drag): Json<DragEnd>,
) -> Result<Response, AppError> {
    let outcome = state.board.drag(drag).await?;
    Ok(mutation_response(&state, outcome, StatusCode::OK))
}

/// POST /api/v1/board/cards
pub async fn handle_add_card(
    State(state): State<AppState>,
    Json(req): Json<AddCardRequest>,
) -> Result<Response, AppError> {
    if req.card.id.trim().is_empty() {
        return Err(AppError::Validation("Card id must not be empty".to_string()));
    }
    let outcome = state
        .board
        .apply(Mutation::AddCard {
            column: req.column,
            index: req.index,
            card: req.card,
        })
        .await?;
    Ok(mutation_response(&state, outcome, StatusCode::CREATED))
}

/// PATCH /api/v1/board/cards/:id
pub async fn handle_update_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
    Json(patch): Json<CardPatch>,
) -> Result<Response, AppError> {
    let outcome = state
        .board
        .apply(Mutation::UpdateCard { card_id, patch })
        .await?;
    Ok(mutation_response(&state, outcome, StatusCode::OK))
}

/// DELETE /api/v1/board/cards/:id
pub async fn handle_delete_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
    Query(params): Query<DeleteCardQuery>,
) -> Result<Response, AppError> {
    let outcome = state
        .board
        .apply(Mutation::DeleteCard {
            card_id,
            reason: params.reason,
        })
        .await?;
    Ok(mutation_response(&state, outcome, StatusCode::OK))
}

/// Confirmed mutations return the whole board; no-ops return 204.
fn mutation_response(state: &AppState, outcome: MutationOutcome, applied: StatusCode) -> Response {
    match outcome {
        MutationOutcome::Applied => (applied, Json(state.board.full_view())).into_response(),
        MutationOutcome::Unchanged => StatusCode::NO_CONTENT.into_response(),
    }
}
