#![allow(dead_code)]

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::error::BoardError;
use crate::models::job::{DocumentRef, JobRecord};

/// Fixed pipeline stages of the board, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnId {
    Shortlist,
    AutoApply,
    Applied,
    Interview,
    Rejected,
}

impl ColumnId {
    pub const ALL: [ColumnId; 5] = [
        ColumnId::Shortlist,
        ColumnId::AutoApply,
        ColumnId::Applied,
        ColumnId::Interview,
        ColumnId::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnId::Shortlist => "shortlist",
            ColumnId::AutoApply => "auto_apply",
            ColumnId::Applied => "applied",
            ColumnId::Interview => "interview",
            ColumnId::Rejected => "rejected",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ColumnId::Shortlist => "Shortlist",
            ColumnId::AutoApply => "Auto Apply",
            ColumnId::Applied => "Applied",
            ColumnId::Interview => "Interview",
            ColumnId::Rejected => "Rejected",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnId {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        ColumnId::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| BoardError::UnknownColumn(s.to_string()))
    }
}

/// Job metadata shown on a card and used by filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobMeta {
    pub company: Option<String>,
    pub salary_range: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub match_score: Option<f32>,
}

/// One job application on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCard {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    #[serde(default)]
    pub meta: JobMeta,
    #[serde(default)]
    pub wishlisted: bool,
    #[serde(default)]
    pub not_interested: bool,
}

impl JobCard {
    pub fn from_record(job: &JobRecord) -> Self {
        JobCard {
            id: job.id.clone(),
            title: job.title.clone(),
            location: job.location.clone().unwrap_or_default(),
            notes: job.notes.clone().unwrap_or_default(),
            documents: job.documents.clone(),
            meta: JobMeta {
                company: job.company.clone(),
                salary_range: job.salary_range.clone(),
                job_type: job.job_type.clone(),
                experience_level: job.experience_level.clone(),
                match_score: job.match_score,
            },
            wishlisted: false,
            not_interested: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub cards: Vec<JobCard>,
}

impl Column {
    fn empty(id: ColumnId) -> Self {
        Column {
            id,
            title: id.title().to_string(),
            cards: Vec::new(),
        }
    }
}

/// A slot on the board: column plus index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardPosition {
    pub column: ColumnId,
    pub index: usize,
}

impl BoardPosition {
    pub fn new(column: ColumnId, index: usize) -> Self {
        Self { column, index }
    }
}

impl fmt::Display for BoardPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.column, self.index)
    }
}

/// Snapshot of the whole board.
///
/// Always carries every column of `ColumnId::ALL`, in order. Values are
/// treated as immutable once published to the store; mutations clone and
/// build a new board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardState {
    columns: Vec<Column>,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoardState {
    pub fn empty() -> Self {
        BoardState {
            columns: ColumnId::ALL.into_iter().map(Column::empty).collect(),
        }
    }

    /// Builds a board from `(column, cards)` pairs, rejecting duplicate ids.
    pub fn from_cards<I>(cards: I) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = (ColumnId, JobCard)>,
    {
        let mut board = Self::empty();
        for (column, card) in cards {
            if board.contains(&card.id) {
                return Err(BoardError::DuplicateCard(card.id));
            }
            board.column_mut(column).cards.push(card);
        }
        Ok(board)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: ColumnId) -> &Column {
        &self.columns[id.slot()]
    }

    pub(crate) fn column_mut(&mut self, id: ColumnId) -> &mut Column {
        &mut self.columns[id.slot()]
    }

    pub(crate) fn columns_mut(&mut self) -> impl Iterator<Item = &mut Column> {
        self.columns.iter_mut()
    }

    pub fn locate(&self, card_id: &str) -> Option<BoardPosition> {
        self.columns.iter().find_map(|column| {
            column
                .cards
                .iter()
                .position(|c| c.id == card_id)
                .map(|index| BoardPosition::new(column.id, index))
        })
    }

    pub fn card(&self, card_id: &str) -> Option<&JobCard> {
        self.locate(card_id)
            .map(|pos| &self.column(pos.column).cards[pos.index])
    }

    pub fn contains(&self, card_id: &str) -> bool {
        self.locate(card_id).is_some()
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum()
    }

    /// Checks that no card id appears more than once across the board.
    pub fn validate(&self) -> Result<(), BoardError> {
        let mut seen = HashSet::new();
        for card in self.columns.iter().flat_map(|c| c.cards.iter()) {
            if !seen.insert(card.id.as_str()) {
                return Err(BoardError::DuplicateCard(card.id.clone()));
            }
        }
        Ok(())
    }

    /// Keeps only the cards matching `keep`, column structure intact.
    pub(crate) fn retain_cards<F>(&self, mut keep: F) -> BoardState
    where
        F: FnMut(&JobCard) -> bool,
    {
        BoardState {
            columns: self
                .columns
                .iter()
                .map(|column| Column {
                    id: column.id,
                    title: column.title.clone(),
                    cards: column.cards.iter().filter(|c| keep(c)).cloned().collect(),
                })
                .collect(),
        }
    }
}
