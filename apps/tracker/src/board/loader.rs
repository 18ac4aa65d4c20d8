use std::sync::Arc;

use tracing::{info, warn};

use crate::board::engine::ERROR_CONTEXT_PREFIX;
use crate::board::models::{BoardState, JobCard};
use crate::board::status::{is_wishlist_column, to_column};
use crate::board::store::{BoardStore, LoadStatus};
use crate::jobs_client::{ApiError, JobStatusApi};
use crate::models::job::{JobStatusRecord, Status};
use crate::reporter::ErrorReporter;

/// Upper bound on pages per load, in case the backend ignores `offset`.
const MAX_PAGES: u32 = 1_000;

/// Pulls every status record, one page at a time, until a short page.
pub async fn fetch_all(
    api: &dyn JobStatusApi,
    page_size: u32,
) -> Result<Vec<JobStatusRecord>, ApiError> {
    let limit = page_size.max(1);
    let mut records = Vec::new();

    for page in 0..MAX_PAGES {
        let Some(offset) = page_offset(page, limit) else {
            warn!("Stopped paging job statuses: offset past u32 range at page {page}");
            return Ok(records);
        };
        let batch = api.fetch_page(limit, offset).await?;
        let done = batch.len() < limit as usize;
        records.extend(batch);
        if done {
            return Ok(records);
        }
    }

    warn!("Stopped paging job statuses after {MAX_PAGES} pages");
    Ok(records)
}

fn page_offset(page: u32, limit: u32) -> Option<u32> {
    page.checked_mul(limit)
}

/// Places each record in its column. Dismissed jobs are left off the board;
/// repeated ids keep their first occurrence.
pub fn build_board(records: &[JobStatusRecord]) -> BoardState {
    let mut board = BoardState::empty();

    for record in records {
        if record.status == Status::NotInterested {
            continue;
        }
        if board.contains(&record.job.id) {
            warn!("Duplicate job {} in status listing, keeping first", record.job.id);
            continue;
        }

        let column = to_column(&record.status);
        let mut card = JobCard::from_record(&record.job);
        card.wishlisted = is_wishlist_column(column);
        board.column_mut(column).cards.push(card);
    }

    board
}

/// Initial bulk load and its retry.
pub struct BoardLoader {
    api: Arc<dyn JobStatusApi>,
    reporter: Arc<dyn ErrorReporter>,
    page_size: u32,
}

impl BoardLoader {
    pub fn new(
        api: Arc<dyn JobStatusApi>,
        reporter: Arc<dyn ErrorReporter>,
        page_size: u32,
    ) -> Self {
        Self {
            api,
            reporter,
            page_size,
        }
    }

    /// Replaces the store contents with a fresh board. On failure the store
    /// is left with an empty board and a `Failed` status; calling `load`
    /// again is the retry.
    pub async fn load(&self, store: &BoardStore) -> Result<usize, ApiError> {
        match fetch_all(self.api.as_ref(), self.page_size).await {
            Ok(records) => {
                let board = build_board(&records);
                let cards = board.card_count();
                store.replace_state(board);
                store.set_load_status(LoadStatus::Loaded);
                info!("Loaded {cards} job cards from {} status records", records.len());
                Ok(cards)
            }
            Err(e) => {
                store.replace_state(BoardState::empty());
                store.set_load_status(LoadStatus::Failed {
                    message: e.to_string(),
                });
                self.reporter
                    .report(&format!("{ERROR_CONTEXT_PREFIX}.load"), &e);
                Err(e)
            }
        }
    }
}
