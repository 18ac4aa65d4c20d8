/// Jobs API client. The only path from this service to the jobs backend.
///
/// The board never talks HTTP directly: it depends on the `JobStatusApi`
/// trait, and `HttpJobStatusApi` is the production implementation.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::job::{JobStatusRecord, Status};

#[cfg(test)]
pub mod scripted;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Jobs API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Could not decode jobs API response: {0}")]
    Decode(String),

    #[error("Invalid jobs API base URL '{0}'")]
    InvalidBaseUrl(String),
}

/// Operations the board needs from the jobs backend.
///
/// Callers treat any `Ok` as success, whatever the backend put in the body.
#[async_trait]
pub trait JobStatusApi: Send + Sync {
    async fn fetch_page(&self, limit: u32, offset: u32) -> Result<Vec<JobStatusRecord>, ApiError>;

    async fn set_job_status(
        &self,
        job_id: &str,
        status: &Status,
        metadata: Option<&Value>,
    ) -> Result<(), ApiError>;

    async fn add_to_wishlist(&self, job_id: &str) -> Result<(), ApiError>;

    async fn remove_from_wishlist(&self, job_id: &str) -> Result<(), ApiError>;

    async fn mark_not_interested(&self, job_id: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Serialize)]
struct SetStatusRequest<'a> {
    status: &'a Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: ErrorMessage },
    Flat(ErrorMessage),
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    #[serde(alias = "detail")]
    message: String,
}

/// reqwest-backed client for the jobs backend.
#[derive(Clone)]
pub struct HttpJobStatusApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpJobStatusApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| ApiError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url,
            token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        build_endpoint(&self.base_url, segments)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Jobs API returned {}: {}", status, body);
        Err(ApiError::Status {
            status: status.as_u16(),
            message: extract_error_message(&body),
        })
    }
}

#[async_trait]
impl JobStatusApi for HttpJobStatusApi {
    async fn fetch_page(&self, limit: u32, offset: u32) -> Result<Vec<JobStatusRecord>, ApiError> {
        let url = self.endpoint(&["jobs", "status"])?;
        let response = self
            .send(
                self.client
                    .get(url)
                    .query(&[("limit", limit), ("offset", offset)]),
            )
            .await?;

        let body = response.text().await?;
        let records: Vec<JobStatusRecord> =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;

        debug!("Fetched {} job status records (offset {offset})", records.len());
        Ok(records)
    }

    async fn set_job_status(
        &self,
        job_id: &str,
        status: &Status,
        metadata: Option<&Value>,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["jobs", job_id, "status"])?;
        self.send(
            self.client
                .put(url)
                .json(&SetStatusRequest { status, metadata }),
        )
        .await?;
        debug!("Set job {job_id} status to {status}");
        Ok(())
    }

    async fn add_to_wishlist(&self, job_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["jobs", job_id, "wishlist"])?;
        self.send(self.client.post(url)).await?;
        Ok(())
    }

    async fn remove_from_wishlist(&self, job_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["jobs", job_id, "wishlist"])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn mark_not_interested(&self, job_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["jobs", job_id, "not-interested"])?;
        self.send(self.client.post(url)).await?;
        Ok(())
    }
}

/// Appends path segments to the base URL, percent-encoding each one.
fn build_endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Pulls a human-readable message out of an error body, falling back to the raw text.
fn extract_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Nested { error }) => error.message,
        Ok(ErrorBody::Flat(e)) => e.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
