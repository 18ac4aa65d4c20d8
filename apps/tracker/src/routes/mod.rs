pub mod health;

use anyhow::{Context, Result};
use axum::{
    http::HeaderValue,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::board::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/board", get(handlers::handle_get_board))
        .route("/api/v1/board/refresh", post(handlers::handle_refresh))
        .route("/api/v1/board/drag", post(handlers::handle_drag))
        .route("/api/v1/board/cards", post(handlers::handle_add_card))
        .route(
            "/api/v1/board/cards/:id",
            patch(handlers::handle_update_card).delete(handlers::handle_delete_card),
        )
        .with_state(state)
}

/// CORS for the board UI. No configured origins means any origin.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let allowed = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::board::service::BoardService;
    use crate::jobs_client::scripted::{ApiCall, ScriptedApi};
    use crate::models::job::{JobRecord, JobStatusRecord, Status};
    use crate::reporter::recording::RecordingReporter;

    fn record(id: &str, title: &str, location: &str, status: Status) -> JobStatusRecord {
        JobStatusRecord {
            job: JobRecord {
                id: id.to_string(),
                title: title.to_string(),
                company: Some("Acme".to_string()),
                location: Some(location.to_string()),
                description: None,
                salary_range: Some("$150k-$180k".to_string()),
                job_type: Some("Full-time".to_string()),
                experience_level: None,
                match_score: Some(88.0),
                notes: None,
                documents: vec![],
            },
            status,
        }
    }

    async fn app(api: Arc<ScriptedApi>) -> (Router, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::default());
        let board = Arc::new(BoardService::new(api, reporter.clone(), 25));
        board.refresh().await.unwrap();
        (build_router(AppState { board }), reporter)
    }

    fn seeded_api() -> Arc<ScriptedApi> {
        Arc::new(ScriptedApi::new().with_records(vec![
            record("42", "Backend Engineer", "Remote", Status::Wishlist),
            record("7", "Data Engineer", "Austin, TX", Status::Applied),
        ]))
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn column_ids(board: &Value, column: usize) -> Vec<String> {
        board["columns"][column]["cards"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_cors_layer_validates_origins() {
        assert!(cors_layer(&[]).is_ok());
        assert!(cors_layer(&["http://localhost:5173".to_string()]).is_ok());
        let err = cors_layer(&["http://bad\norigin".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Invalid CORS origin"));
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app(Arc::new(ScriptedApi::new())).await;
        let (status, body) = send(&router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_get_board_with_search_and_filters() {
        let (router, _) = app(seeded_api()).await;

        let (status, body) = send(&router, Method::GET, "/api/v1/board", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["load_status"]["state"], "loaded");
        assert_eq!(column_ids(&body, 0), vec!["42"]);
        assert_eq!(column_ids(&body, 2), vec!["7"]);

        let (_, remote) = send(&router, Method::GET, "/api/v1/board?filters=remote", None).await;
        assert_eq!(column_ids(&remote, 0), vec!["42"]);
        assert!(column_ids(&remote, 2).is_empty());

        let (_, searched) = send(&router, Method::GET, "/api/v1/board?q=data", None).await;
        assert!(column_ids(&searched, 0).is_empty());
        assert_eq!(column_ids(&searched, 2), vec!["7"]);
    }

    #[tokio::test]
    async fn test_unknown_filter_is_rejected() {
        let (router, _) = app(seeded_api()).await;
        let (status, body) =
            send(&router, Method::GET, "/api/v1/board?filters=remote,teleport", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_drag_moves_card_and_calls_backend_once() {
        let api = seeded_api();
        let (router, _) = app(api.clone()).await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/board/drag",
            Some(json!({
                "card_id": "42",
                "source": {"column": "shortlist", "index": 0},
                "destination": {"column": "interview", "index": 0}
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(column_ids(&body, 0).is_empty());
        assert_eq!(column_ids(&body, 3), vec!["42"]);
        assert_eq!(
            api.write_calls(),
            vec![ApiCall::SetStatus {
                job_id: "42".to_string(),
                status: Status::Interviewing,
                metadata: None,
            }]
        );
    }

    #[tokio::test]
    async fn test_failed_drag_returns_bad_gateway_and_board_is_unchanged() {
        let api = seeded_api();
        let (router, reporter) = app(api.clone()).await;
        let (_, before) = send(&router, Method::GET, "/api/v1/board", None).await;
        api.set_failing(true);

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/board/drag",
            Some(json!({
                "card_id": "42",
                "source": {"column": "shortlist", "index": 0},
                "destination": {"column": "interview", "index": 0}
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "BACKEND_ERROR");
        let (_, after) = send(&router, Method::GET, "/api/v1/board", None).await;
        assert_eq!(before, after);
        assert_eq!(reporter.reports()[0].0, "job_tracker.move_card");
    }

    #[tokio::test]
    async fn test_noop_drag_returns_no_content() {
        let api = seeded_api();
        let (router, _) = app(api.clone()).await;

        let (status, _) = send(
            &router,
            Method::POST,
            "/api/v1/board/drag",
            Some(json!({
                "card_id": "7",
                "source": {"column": "applied", "index": 0},
                "destination": {"column": "applied", "index": 0}
            })),
        )
        .await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(api.write_calls().is_empty());
    }

    #[tokio::test]
    async fn test_card_lifecycle_endpoints() {
        let api = seeded_api();
        let (router, _) = app(api.clone()).await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/v1/board/cards",
            Some(json!({
                "column": "auto_apply",
                "card": {"id": "99", "title": "Platform Engineer", "location": "Hybrid"}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(column_ids(&body, 1), vec!["99"]);

        let (status, body) = send(
            &router,
            Method::PATCH,
            "/api/v1/board/cards/99",
            Some(json!({"notes": "Apply before Friday"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["columns"][1]["cards"][0]["notes"], "Apply before Friday");

        let (status, body) = send(
            &router,
            Method::DELETE,
            "/api/v1/board/cards/99?reason=unwishlisted",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(column_ids(&body, 1).is_empty());

        assert_eq!(
            api.write_calls(),
            vec![
                ApiCall::AddToWishlist("99".to_string()),
                ApiCall::SetStatus {
                    job_id: "99".to_string(),
                    status: Status::Wishlist,
                    metadata: Some(json!({"notes": "Apply before Friday"})),
                },
                ApiCall::RemoveFromWishlist("99".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_add_and_unknown_card() {
        let (router, _) = app(seeded_api()).await;

        let (status, _) = send(
            &router,
            Method::POST,
            "/api/v1/board/cards",
            Some(json!({"column": "applied", "card": {"id": "42", "title": "Dup"}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            send(&router, Method::DELETE, "/api/v1/board/cards/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_empty_board_with_failed_status() {
        let api = seeded_api();
        let (router, _) = app(api.clone()).await;
        api.set_fetch_failing(true);

        let (status, _) = send(&router, Method::POST, "/api/v1/board/refresh", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (_, body) = send(&router, Method::GET, "/api/v1/board", None).await;
        assert_eq!(body["load_status"]["state"], "failed");
        assert!(column_ids(&body, 0).is_empty());

        api.set_fetch_failing(false);
        let (status, body) = send(&router, Method::POST, "/api/v1/board/refresh", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cards"], 2);
    }
}
