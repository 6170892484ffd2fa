//! Pagination envelope and the clamping policy shared by every store.
//!
//! A caller asks for `count` records starting at `offset`. Both are
//! optional: the defaults are "everything" and `0`. Out-of-range values are
//! clamped rather than rejected so a page request can never fail.

use serde::Serialize;

/// A window into an ordered result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage<T> {
    /// Size of the whole matching set, ignoring pagination.
    pub total_result_count: i64,
    /// Offset actually applied after clamping.
    pub result_offset: i64,
    /// Number of records in `results`.
    pub result_count: i64,
    pub results: Vec<T>,
}

impl<T> ResultPage<T> {
    /// Build a page from a window that has already been fetched.
    pub fn new(total: i64, window: PageWindow, results: Vec<T>) -> Self {
        Self {
            total_result_count: total,
            result_offset: window.offset,
            result_count: results.len() as i64,
            results,
        }
    }

    /// Slice a fully materialized, already-ordered result set.
    pub fn from_slice(all: Vec<T>, count: Option<i64>, offset: Option<i64>) -> Self {
        let total = all.len() as i64;
        let window = PageWindow::clamp(total, count, offset);
        let results = all
            .into_iter()
            .skip(window.offset as usize)
            .take(window.count as usize)
            .collect();
        Self::new(total, window, results)
    }

    /// Transform every record while keeping the pagination metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ResultPage<U> {
        ResultPage {
            total_result_count: self.total_result_count,
            result_offset: self.result_offset,
            result_count: self.result_count,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// A clamped `[offset, offset + count)` window over `total` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: i64,
    pub count: i64,
}

impl PageWindow {
    /// Clamp a requested window against the size of the matching set.
    ///
    /// - `offset` is clamped to `[0, total]`; absent or negative means `0`.
    /// - `count` is clamped so `offset + count <= total`; absent or negative
    ///   means "all remaining".
    pub fn clamp(total: i64, count: Option<i64>, offset: Option<i64>) -> Self {
        let total = total.max(0);
        let offset = offset.unwrap_or(0).clamp(0, total);
        let remaining = total - offset;
        let count = match count {
            Some(c) if c >= 0 => c.min(remaining),
            _ => remaining,
        };
        Self { offset, count }
    }
}
