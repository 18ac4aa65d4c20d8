use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Application status as tracked by the jobs backend.
///
/// The backend enum is wider than the board: several values share a column.
/// Values this service does not know are kept verbatim in `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Viewed,
    Wishlist,
    Applied,
    Interviewing,
    Offered,
    Rejected,
    NotInterested,
    Unknown(String),
}

impl Status {
    /// Parses a wire value. Matching is trimmed and case-insensitive.
    pub fn parse(raw: &str) -> Status {
        match raw.trim().to_ascii_lowercase().as_str() {
            "viewed" => Status::Viewed,
            "wishlist" => Status::Wishlist,
            "applied" => Status::Applied,
            "interviewing" => Status::Interviewing,
            "offered" => Status::Offered,
            "rejected" => Status::Rejected,
            "not_interested" => Status::NotInterested,
            _ => Status::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Viewed => "viewed",
            Status::Wishlist => "wishlist",
            Status::Applied => "applied",
            Status::Interviewing => "interviewing",
            Status::Offered => "offered",
            Status::Rejected => "rejected",
            Status::NotInterested => "not_interested",
            Status::Unknown(raw) => raw,
        }
    }
}

impl From<String> for Status {
    fn from(raw: String) -> Self {
        Status::parse(&raw)
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    CoverLetter,
    #[default]
    #[serde(other)]
    Other,
}

/// Reference to a document attached to a job (tailored resume, cover letter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: DocumentKind,
}

/// A job as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub salary_range: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub match_score: Option<f32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
}

/// One element of the bulk status listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusRecord {
    pub job: JobRecord,
    pub status: Status,
}

/// Job ids come back as strings from some endpoints and as integers from others.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
