//! In-memory `JobStatusApi` for tests: records every call and plays back
//! scripted outcomes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Semaphore;

use super::{ApiError, JobStatusApi};
use crate::models::job::{JobStatusRecord, Status};

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    FetchPage { limit: u32, offset: u32 },
    SetStatus {
        job_id: String,
        status: Status,
        metadata: Option<Value>,
    },
    AddToWishlist(String),
    RemoveFromWishlist(String),
    MarkNotInterested(String),
}

#[derive(Default)]
pub struct ScriptedApi {
    records: Vec<JobStatusRecord>,
    calls: Mutex<Vec<ApiCall>>,
    outcomes: Mutex<VecDeque<bool>>,
    fail_writes: AtomicBool,
    fail_fetch: AtomicBool,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, records: Vec<JobStatusRecord>) -> Self {
        self.records = records;
        self
    }

    /// Per-call results for writes, consumed in order; `true` is success.
    pub fn with_outcomes(self, outcomes: impl IntoIterator<Item = bool>) -> Self {
        self.outcomes.lock().unwrap().extend(outcomes);
        self
    }

    /// Writes block until the semaphore hands out a permit.
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    pub fn set_fetch_failing(&self, failing: bool) {
        self.fail_fetch.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn write_calls(&self) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, ApiCall::FetchPage { .. }))
            .collect()
    }

    async fn write(&self, call: ApiCall) -> Result<(), ApiError> {
        let ok = {
            self.calls.lock().unwrap().push(call);
            let scripted = self.outcomes.lock().unwrap().pop_front();
            scripted.unwrap_or(!self.fail_writes.load(Ordering::SeqCst))
        };

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        if ok {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: 500,
                message: "scripted failure".to_string(),
            })
        }
    }
}

#[async_trait]
impl JobStatusApi for ScriptedApi {
    async fn fetch_page(&self, limit: u32, offset: u32) -> Result<Vec<JobStatusRecord>, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(ApiCall::FetchPage { limit, offset });

        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 503,
                message: "jobs backend unavailable".to_string(),
            });
        }

        Ok(self
            .records
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn set_job_status(
        &self,
        job_id: &str,
        status: &Status,
        metadata: Option<&Value>,
    ) -> Result<(), ApiError> {
        self.write(ApiCall::SetStatus {
            job_id: job_id.to_string(),
            status: status.clone(),
            metadata: metadata.cloned(),
        })
        .await
    }

    async fn add_to_wishlist(&self, job_id: &str) -> Result<(), ApiError> {
        self.write(ApiCall::AddToWishlist(job_id.to_string())).await
    }

    async fn remove_from_wishlist(&self, job_id: &str) -> Result<(), ApiError> {
        self.write(ApiCall::RemoveFromWishlist(job_id.to_string()))
            .await
    }

    async fn mark_not_interested(&self, job_id: &str) -> Result<(), ApiError> {
        self.write(ApiCall::MarkNotInterested(job_id.to_string()))
            .await
    }
}
