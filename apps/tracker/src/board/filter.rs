//! Search and filter projection over a board snapshot.
//!
//! Projections are pure: they read a board and build a new one, keeping every
//! column even when it ends up empty.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::models::{BoardState, JobCard};

pub const HIGH_MATCH_THRESHOLD: f32 = 80.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("Unknown filter '{0}'")]
    UnknownFilter(String),

    #[error("Unknown sort order '{0}'")]
    UnknownSort(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterTag {
    Remote,
    Hybrid,
    OnSite,
    FullTime,
    PartTime,
    Contract,
    Internship,
    EntryLevel,
    MidLevel,
    SeniorLevel,
    HighMatch,
}

impl FilterTag {
    pub const ALL: [FilterTag; 11] = [
        FilterTag::Remote,
        FilterTag::Hybrid,
        FilterTag::OnSite,
        FilterTag::FullTime,
        FilterTag::PartTime,
        FilterTag::Contract,
        FilterTag::Internship,
        FilterTag::EntryLevel,
        FilterTag::MidLevel,
        FilterTag::SeniorLevel,
        FilterTag::HighMatch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterTag::Remote => "remote",
            FilterTag::Hybrid => "hybrid",
            FilterTag::OnSite => "on_site",
            FilterTag::FullTime => "full_time",
            FilterTag::PartTime => "part_time",
            FilterTag::Contract => "contract",
            FilterTag::Internship => "internship",
            FilterTag::EntryLevel => "entry_level",
            FilterTag::MidLevel => "mid_level",
            FilterTag::SeniorLevel => "senior_level",
            FilterTag::HighMatch => "high_match",
        }
    }

    pub fn matches(self, card: &JobCard) -> bool {
        let location = normalize(&card.location);
        let job_type = normalize(card.meta.job_type.as_deref().unwrap_or_default());
        let level = normalize(card.meta.experience_level.as_deref().unwrap_or_default());

        match self {
            FilterTag::Remote => location.contains("remote"),
            FilterTag::Hybrid => location.contains("hybrid"),
            FilterTag::OnSite => location.contains("on site") || location.contains("onsite"),
            FilterTag::FullTime => job_type.contains("full time"),
            FilterTag::PartTime => job_type.contains("part time"),
            FilterTag::Contract => job_type.contains("contract"),
            FilterTag::Internship => job_type.contains("intern"),
            FilterTag::EntryLevel => level.contains("entry"),
            FilterTag::MidLevel => level.contains("mid"),
            FilterTag::SeniorLevel => level.contains("senior"),
            FilterTag::HighMatch => card
                .meta
                .match_score
                .is_some_and(|s| s >= HIGH_MATCH_THRESHOLD),
        }
    }
}

impl FromStr for FilterTag {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        FilterTag::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| ProjectionError::UnknownFilter(s.trim().to_string()))
    }
}

/// Parses a comma-separated filter list; blank entries are ignored.
pub fn parse_filters(raw: &str) -> Result<BTreeSet<FilterTag>, ProjectionError> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Keep the board's own order.
    #[default]
    Board,
    /// Highest match score first, unscored cards last.
    MatchScore,
    Title,
    Company,
}

impl FromStr for SortOrder {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "" | "board" => Ok(SortOrder::Board),
            "match_score" | "score" => Ok(SortOrder::MatchScore),
            "title" => Ok(SortOrder::Title),
            "company" => Ok(SortOrder::Company),
            _ => Err(ProjectionError::UnknownSort(s.trim().to_string())),
        }
    }
}

/// Cards matching `query` and every tag in `filters`.
pub fn project(state: &BoardState, query: &str, filters: &BTreeSet<FilterTag>) -> BoardState {
    let needle = query.trim().to_lowercase();
    state.retain_cards(|card| {
        matches_query(card, &needle) && filters.iter().all(|tag| tag.matches(card))
    })
}

/// `project` followed by a stable per-column sort.
pub fn project_sorted(
    state: &BoardState,
    query: &str,
    filters: &BTreeSet<FilterTag>,
    order: SortOrder,
) -> BoardState {
    let mut projected = project(state, query, filters);
    if order != SortOrder::Board {
        for column in projected.columns_mut() {
            column.cards.sort_by(|a, b| compare(order, a, b));
        }
    }
    projected
}

fn matches_query(card: &JobCard, needle: &str) -> bool {
    needle.is_empty()
        || card.title.to_lowercase().contains(needle)
        || card.location.to_lowercase().contains(needle)
        || card.notes.to_lowercase().contains(needle)
}

fn compare(order: SortOrder, a: &JobCard, b: &JobCard) -> Ordering {
    match order {
        SortOrder::Board => Ordering::Equal,
        SortOrder::MatchScore => match (a.meta.match_score, b.meta.match_score) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortOrder::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortOrder::Company => {
            let key = |c: &JobCard| c.meta.company.as_deref().map(str::to_lowercase);
            match (key(a), key(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['-', '_'], " ")
}
