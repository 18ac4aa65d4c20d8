//! Optimistic mutation engine.
//!
//! Flow per mutation:
//! 1. Snapshot the current board.
//! 2. Compute the next board and publish it immediately.
//! 3. Send the one backend call that confirms it.
//! 4. On failure, restore the snapshot, report, and return the error.
//!
//! Mutations run one at a time through `lane`: a mutation only snapshots
//! once the previous one has settled, so a rollback can never discard a
//! later optimistic change.
//!
//! Steps 3 and 4 run on a spawned task that owns the lane guard. Dropping
//! the caller's future (a client disconnect) does not cut the mutation short:
//! the call still confirms or rolls back, and the lane stays held until then.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::board::error::MutationError;
use crate::board::models::BoardState;
use crate::board::mutation::Mutation;
use crate::board::store::BoardStore;
use crate::jobs_client::{ApiError, JobStatusApi};
use crate::reporter::ErrorReporter;

pub const ERROR_CONTEXT_PREFIX: &str = "job_tracker";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The board changed and the backend confirmed it.
    Applied,
    /// Nothing to do; no backend call was made.
    Unchanged,
}

pub struct MutationEngine {
    store: Arc<BoardStore>,
    api: Arc<dyn JobStatusApi>,
    reporter: Arc<dyn ErrorReporter>,
    lane: Arc<Mutex<()>>,
}

impl MutationEngine {
    pub fn new(
        store: Arc<BoardStore>,
        api: Arc<dyn JobStatusApi>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            store,
            api,
            reporter,
            lane: Arc::new(Mutex::new(())),
        }
    }

    /// Waits for in-flight mutations to settle and blocks new ones while held.
    pub(crate) async fn exclusive(&self) -> MutexGuard<'_, ()> {
        self.lane.lock().await
    }

    pub async fn apply_mutation(&self, mutation: Mutation) -> Result<MutationOutcome, MutationError> {
        let lane = self.lane.clone().lock_owned().await;

        let mutation_id = Uuid::new_v4();
        let operation = mutation.operation();
        let previous = self.store.get_state();

        let transition = match mutation.apply_to(&previous, Utc::now()) {
            Ok(Some(transition)) => transition,
            Ok(None) => {
                debug!(%mutation_id, operation, card_id = mutation.card_id(), "no-op mutation skipped");
                return Ok(MutationOutcome::Unchanged);
            }
            Err(e) => {
                warn!(%mutation_id, operation, "rejected mutation: {e}");
                return Err(MutationError::Invalid(e));
            }
        };

        self.store.replace_state(transition.next);
        debug!(%mutation_id, operation, card_id = mutation.card_id(), "optimistic state published");

        let pending = Pending {
            store: self.store.clone(),
            reporter: self.reporter.clone(),
            previous,
            mutation_id,
            operation,
            card_id: mutation.card_id().to_string(),
        };
        let api = self.api.clone();
        let call = transition.call;

        let settled = tokio::spawn(async move {
            let _lane = lane;
            let result = call.send(api.as_ref()).await;
            pending.settle(result)
        });

        settled.await?
    }
}

/// An optimistic change waiting on its backend call.
struct Pending {
    store: Arc<BoardStore>,
    reporter: Arc<dyn ErrorReporter>,
    previous: Arc<BoardState>,
    mutation_id: Uuid,
    operation: &'static str,
    card_id: String,
}

impl Pending {
    fn settle(self, result: Result<(), ApiError>) -> Result<MutationOutcome, MutationError> {
        let Pending {
            store,
            reporter,
            previous,
            mutation_id,
            operation,
            card_id,
        } = self;

        match result {
            Ok(()) => {
                info!(%mutation_id, operation, card_id = %card_id, "mutation confirmed");
                Ok(MutationOutcome::Applied)
            }
            Err(source) => {
                store.replace_state(previous);
                let err = MutationError::Backend { operation, source };
                reporter.report(&format!("{ERROR_CONTEXT_PREFIX}.{operation}"), &err);
                Err(err)
            }
        }
    }
}
