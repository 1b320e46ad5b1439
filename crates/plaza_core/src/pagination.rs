/*
 * SPDX-FileCopyrightText: 2026 RedHunt07 - FEDI3 Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Keyset pagination shared by every list stream.
//!
//! Rows are totally ordered by `(created_at, id)`. The id breaks ties between
//! rows sharing a timestamp, so the boundary predicate is the lexicographic
//! comparison on the pair and adjacent pages never overlap or skip rows.

use chrono::{DateTime, Utc};

use crate::cursor::{decode_cursor, Cursor};
use crate::error::CoreResult;

/// Fixed page sizes; clients cannot choose their own.
pub const FEED_PAGE_LIMIT: usize = 20;
pub const CONVERSATIONS_PAGE_LIMIT: usize = 20;
pub const COMMENTS_PAGE_LIMIT: usize = 50;
pub const MESSAGES_PAGE_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Newest first: feed, conversations, messages.
    Descending,
    /// Oldest first: comments.
    Ascending,
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn next_token(&self) -> String {
        crate::cursor::encode_cursor(self.next.as_ref())
    }
}

/// One page request: ordering, fixed page size and the decoded boundary.
#[derive(Debug, Clone, Copy)]
pub struct Keyset {
    direction: Direction,
    limit: usize,
    boundary: Option<Cursor>,
}

impl Keyset {
    pub fn new(direction: Direction, limit: usize, boundary: Option<Cursor>) -> Self {
        // An id of 0 never names a row, so it carries no boundary.
        let boundary = boundary.filter(|c| c.id != 0);
        Self {
            direction,
            limit: limit.max(1),
            boundary,
        }
    }

    pub fn from_token(direction: Direction, limit: usize, token: &str) -> CoreResult<Self> {
        Ok(Self::new(direction, limit, decode_cursor(token)?))
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn boundary(&self) -> Option<&Cursor> {
        self.boundary.as_ref()
    }

    /// Whether a row at `(time, id)` lies strictly past the boundary.
    pub fn admits(&self, time: DateTime<Utc>, id: u64) -> bool {
        let Some(b) = self.boundary else { return true };
        match self.direction {
            Direction::Descending => time < b.time || (time == b.time && id < b.id),
            Direction::Ascending => time > b.time || (time == b.time && id > b.id),
        }
    }

    /// SQL form of [`Keyset::admits`] over nanosecond time and integer id
    /// columns, with its three positional values. `None` on the first page.
    pub fn sql_filter(&self, time_col: &str, id_col: &str) -> Option<(String, [i64; 3])> {
        let b = self.boundary?;
        let op = match self.direction {
            Direction::Descending => "<",
            Direction::Ascending => ">",
        };
        let ns = b.time.timestamp_nanos_opt().unwrap_or(i64::MAX);
        // Row ids never exceed i64::MAX, so clamping keeps the comparison exact.
        let id = i64::try_from(b.id).unwrap_or(i64::MAX);
        Some((
            format!("({time_col} {op} ? OR ({time_col} = ? AND {id_col} {op} ?))"),
            [ns, ns, id],
        ))
    }

    pub fn sql_order(&self, time_col: &str, id_col: &str) -> String {
        let dir = match self.direction {
            Direction::Descending => "DESC",
            Direction::Ascending => "ASC",
        };
        format!("{time_col} {dir}, {id_col} {dir}")
    }

    /// Wraps rows the store already filtered, ordered and limited.
    pub fn finish<T>(&self, items: Vec<T>, key: impl Fn(&T) -> (DateTime<Utc>, u64)) -> Page<T> {
        let next = if items.len() == self.limit {
            items.last().map(|last| {
                let (time, id) = key(last);
                Cursor::new(time, id)
            })
        } else {
            None
        };
        Page { items, next }
    }

    /// In-memory pagination over rows already sorted in this keyset's direction.
    pub fn paginate<T>(
        &self,
        rows: impl IntoIterator<Item = T>,
        key: impl Fn(&T) -> (DateTime<Utc>, u64),
    ) -> Page<T> {
        let items = rows
            .into_iter()
            .filter(|row| {
                let (time, id) = key(row);
                self.admits(time, id)
            })
            .take(self.limit)
            .collect();
        self.finish(items, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        at: DateTime<Utc>,
        id: u64,
    }

    fn key(r: &Row) -> (DateTime<Utc>, u64) {
        (r.at, r.id)
    }

    /// Ten rows sharing only three distinct timestamps.
    fn rows_desc() -> Vec<Row> {
        let mut rows: Vec<Row> = (1..=10u64)
            .map(|id| Row {
                at: Utc.timestamp_nanos(1_700_000_000_000_000_000 + ((id as i64 - 1) / 4)),
                id,
            })
            .collect();
        rows.sort_by(|a, b| (b.at, b.id).cmp(&(a.at, a.id)));
        rows
    }

    #[test]
    fn descending_pages_are_strictly_ordered_and_disjoint() {
        let rows = rows_desc();
        let first = Keyset::new(Direction::Descending, 4, None).paginate(rows.clone(), key);
        assert_eq!(first.items.len(), 4);
        for pair in first.items.windows(2) {
            assert!((pair[0].at, pair[0].id) > (pair[1].at, pair[1].id));
        }

        let mut seen: Vec<u64> = first.items.iter().map(|r| r.id).collect();
        let mut next = first.next;
        while let Some(cursor) = next {
            let page = Keyset::new(Direction::Descending, 4, Some(cursor)).paginate(rows.clone(), key);
            for r in &page.items {
                assert!(!seen.contains(&r.id), "row {} returned twice", r.id);
                seen.push(r.id);
            }
            next = page.next;
        }
        let expected: Vec<u64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn ascending_boundary_inverts_the_comparison() {
        let mut rows = rows_desc();
        rows.reverse();
        let ks = Keyset::new(Direction::Ascending, 3, None);
        let page = ks.paginate(rows.clone(), key);
        assert_eq!(page.items.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        let page = Keyset::new(Direction::Ascending, 3, page.next).paginate(rows, key);
        assert_eq!(page.items.iter().map(|r| r.id).collect::<Vec<_>>(), vec![4, 5, 6]);
    }

    #[test]
    fn next_cursor_only_when_page_is_full() {
        let rows = rows_desc();
        let full = Keyset::new(Direction::Descending, 10, None).paginate(rows.clone(), key);
        assert_eq!(full.items.len(), 10);
        assert!(full.next.is_some());

        let short = Keyset::new(Direction::Descending, 11, None).paginate(rows, key);
        assert_eq!(short.items.len(), 10);
        assert!(short.next.is_none());
        assert_eq!(short.next_token(), "");
    }

    #[test]
    fn next_cursor_points_at_last_item() {
        let rows = rows_desc();
        let page = Keyset::new(Direction::Descending, 3, None).paginate(rows, key);
        let last = page.items.last().unwrap();
        assert_eq!(page.next, Some(Cursor::new(last.at, last.id)));
    }

    #[test]
    fn zero_id_boundary_means_first_page() {
        let at = Utc.timestamp_nanos(1);
        let ks = Keyset::new(Direction::Descending, 5, Some(Cursor::new(at, 0)));
        assert!(ks.boundary().is_none());
        assert!(ks.sql_filter("t", "id").is_none());
    }

    #[test]
    fn sql_filter_matches_in_memory_predicate() {
        let at = Utc.timestamp_nanos(1_700_000_000_000_000_123);
        let ks = Keyset::new(Direction::Descending, 5, Some(Cursor::new(at, 9)));
        let (sql, vals) = ks.sql_filter("p.created_at_ns", "p.id").unwrap();
        assert_eq!(sql, "(p.created_at_ns < ? OR (p.created_at_ns = ? AND p.id < ?))");
        assert_eq!(vals, [1_700_000_000_000_000_123, 1_700_000_000_000_000_123, 9]);
        assert_eq!(ks.sql_order("p.created_at_ns", "p.id"), "p.created_at_ns DESC, p.id DESC");

        let asc = Keyset::new(Direction::Ascending, 5, Some(Cursor::new(at, 9)));
        let (sql, _) = asc.sql_filter("created_at_ns", "id").unwrap();
        assert_eq!(sql, "(created_at_ns > ? OR (created_at_ns = ? AND id > ?))");
    }

    #[test]
    fn sql_filter_clamps_ids_beyond_i64() {
        let at = Utc.timestamp_nanos(1_000);
        let ks = Keyset::new(Direction::Descending, 5, Some(Cursor::new(at, u64::MAX)));
        let (_, vals) = ks.sql_filter("t", "id").unwrap();
        assert_eq!(vals, [1_000, 1_000, i64::MAX]);
        assert!(ks.admits(at, 1));
        assert!(!Keyset::new(Direction::Ascending, 5, Some(Cursor::new(at, u64::MAX))).admits(at, 1));
    }

    #[test]
    fn malformed_token_is_an_error_not_a_first_page() {
        assert!(Keyset::from_token(Direction::Descending, 20, "%%%").is_err());
        let ks = Keyset::from_token(Direction::Descending, 20, "").unwrap();
        assert!(ks.boundary().is_none());
    }
}
