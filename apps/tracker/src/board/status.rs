#![allow(dead_code)]

//! Mapping between backend statuses and board columns.
//!
//! Both directions are total. Reads fall back to `DEFAULT_COLUMN`; writes are
//! lossy, with shortlist and auto-apply both persisted as `wishlist`.

use crate::board::models::ColumnId;
use crate::models::job::Status;

pub const DEFAULT_COLUMN: ColumnId = ColumnId::Shortlist;

pub fn to_column(status: &Status) -> ColumnId {
    match status {
        Status::Viewed | Status::Wishlist => ColumnId::Shortlist,
        Status::Applied => ColumnId::Applied,
        Status::Interviewing | Status::Offered => ColumnId::Interview,
        Status::Rejected => ColumnId::Rejected,
        Status::NotInterested | Status::Unknown(_) => DEFAULT_COLUMN,
    }
}

pub fn to_status(column: ColumnId) -> Status {
    match column {
        ColumnId::Shortlist | ColumnId::AutoApply => Status::Wishlist,
        ColumnId::Applied => Status::Applied,
        ColumnId::Interview => Status::Interviewing,
        ColumnId::Rejected => Status::Rejected,
    }
}

/// Maps a raw wire string straight to a column.
pub fn column_for_raw(raw: &str) -> ColumnId {
    to_column(&Status::parse(raw))
}

/// Whether cards in `column` count as wishlisted on the backend.
pub fn is_wishlist_column(column: ColumnId) -> bool {
    to_status(column) == Status::Wishlist
}
