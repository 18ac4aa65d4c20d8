use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::board::drag::DragEnd;
use crate::board::engine::{MutationEngine, MutationOutcome};
use crate::board::error::MutationError;
use crate::board::filter::{project_sorted, FilterTag, SortOrder};
use crate::board::loader::BoardLoader;
use crate::board::models::BoardState;
use crate::board::mutation::Mutation;
use crate::board::store::{BoardStore, LoadStatus};
use crate::jobs_client::{ApiError, JobStatusApi};
use crate::reporter::ErrorReporter;

/// Board as served to clients: load status plus the (possibly projected) columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub load_status: LoadStatus,
    #[serde(flatten)]
    pub board: BoardState,
}

/// Owns the board store and wires it to the engine and loader.
pub struct BoardService {
    store: Arc<BoardStore>,
    engine: MutationEngine,
    loader: BoardLoader,
}

impl BoardService {
    pub fn new(
        api: Arc<dyn JobStatusApi>,
        reporter: Arc<dyn ErrorReporter>,
        page_size: u32,
    ) -> Self {
        let store = Arc::new(BoardStore::default());
        Self {
            engine: MutationEngine::new(store.clone(), api.clone(), reporter.clone()),
            loader: BoardLoader::new(api, reporter, page_size),
            store,
        }
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn view(&self, query: &str, filters: &BTreeSet<FilterTag>, order: SortOrder) -> BoardView {
        let state = self.store.get_state();
        BoardView {
            load_status: self.store.load_status(),
            board: project_sorted(&state, query, filters, order),
        }
    }

    pub fn full_view(&self) -> BoardView {
        BoardView {
            load_status: self.store.load_status(),
            board: self.store.get_state().as_ref().clone(),
        }
    }

    /// Reloads from the backend once in-flight mutations have settled.
    pub async fn refresh(&self) -> Result<usize, ApiError> {
        let _lane = self.engine.exclusive().await;
        self.loader.load(&self.store).await
    }

    pub async fn apply(&self, mutation: Mutation) -> Result<MutationOutcome, MutationError> {
        self.engine.apply_mutation(mutation).await
    }

    pub async fn drag(&self, drag: DragEnd) -> Result<MutationOutcome, MutationError> {
        match drag.into_mutation() {
            Some(mutation) => self.apply(mutation).await,
            None => Ok(MutationOutcome::Unchanged),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::models::fixtures::ids;
    use crate::board::models::{BoardPosition, ColumnId};
    use crate::jobs_client::scripted::ScriptedApi;
    use crate::models::job::{JobRecord, JobStatusRecord, Status};
    use crate::reporter::recording::RecordingReporter;

    fn record(id: &str, title: &str, status: Status) -> JobStatusRecord {
        JobStatusRecord {
            job: JobRecord {
                id: id.to_string(),
                title: title.to_string(),
                company: None,
                location: None,
                description: None,
                salary_range: None,
                job_type: None,
                experience_level: None,
                match_score: None,
                notes: None,
                documents: vec![],
            },
            status,
        }
    }

    #[tokio::test]
    async fn test_drag_cancel_reports_unchanged() {
        let api = Arc::new(ScriptedApi::new().with_records(vec![record(
            "42",
            "Backend Engineer",
            Status::Wishlist,
        )]));
        let service = BoardService::new(api.clone(), Arc::new(RecordingReporter::default()), 10);
        service.refresh().await.unwrap();

        let outcome = service
            .drag(DragEnd {
                card_id: "42".to_string(),
                source: BoardPosition::new(ColumnId::Shortlist, 0),
                destination: None,
            })
            .await
            .unwrap();

        assert_eq!(outcome, MutationOutcome::Unchanged);
        assert!(api.write_calls().is_empty());
        assert_eq!(ids(&service.store().get_state(), ColumnId::Shortlist), vec!["42"]);
    }

    #[tokio::test]
    async fn test_view_projects_without_touching_store() {
        let api = Arc::new(ScriptedApi::new().with_records(vec![
            record("1", "Backend Engineer", Status::Applied),
            record("2", "Designer", Status::Applied),
        ]));
        let service = BoardService::new(api, Arc::new(RecordingReporter::default()), 10);
        service.refresh().await.unwrap();

        let view = service.view("backend", &BTreeSet::new(), SortOrder::Board);

        assert_eq!(view.load_status, LoadStatus::Loaded);
        assert_eq!(ids(&view.board, ColumnId::Applied), vec!["1"]);
        assert_eq!(service.store().get_state().card_count(), 2);
    }

    #[test]
    fn test_board_view_json_shape() {
        let service = BoardService::new(
            Arc::new(ScriptedApi::new()),
            Arc::new(RecordingReporter::default()),
            10,
        );
        let json = serde_json::to_value(service.full_view()).unwrap();

        assert_eq!(json["load_status"]["state"], "not_loaded");
        assert_eq!(json["columns"].as_array().unwrap().len(), 5);
        assert_eq!(json["columns"][1]["id"], "auto_apply");
        assert_eq!(json["columns"][1]["title"], "Auto Apply");
    }
}
