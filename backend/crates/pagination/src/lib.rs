//! Offset/limit pagination primitives shared by the collection endpoints.
//!
//! Collection endpoints accept an optional `skip` (rows to pass over) and an
//! optional `limit` (maximum rows to return). [`PageRequest`] holds the
//! validated pair and hands out the representations the adapters need:
//! `i64` for SQL `OFFSET`/`LIMIT` clauses and `usize` for slicing in-memory
//! collections.

use thiserror::Error;

/// Number of rows skipped when the caller does not supply `skip`.
pub const DEFAULT_SKIP: i64 = 0;

/// Number of rows returned when the caller does not supply `limit`.
pub const DEFAULT_LIMIT: i64 = 100;

/// Rejections raised while building a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageError {
    /// `skip` was below zero.
    #[error("skip must not be negative (got {value})")]
    NegativeSkip {
        /// Value supplied by the caller.
        value: i64,
    },
    /// `limit` was below zero.
    #[error("limit must not be negative (got {value})")]
    NegativeLimit {
        /// Value supplied by the caller.
        value: i64,
    },
}

impl PageError {
    /// Name of the query parameter that failed validation.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NegativeSkip { .. } => "skip",
            Self::NegativeLimit { .. } => "limit",
        }
    }
}

/// Validated offset/limit window over an ordered collection.
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let page = PageRequest::new(Some(20), None).expect("valid window");
/// assert_eq!(page.skip(), 20);
/// assert_eq!(page.limit(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    skip: i64,
    limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            skip: DEFAULT_SKIP,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a window from optional caller input, applying the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] when either value is negative.
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Result<Self, PageError> {
        let skip_rows = skip.unwrap_or(DEFAULT_SKIP);
        let max_rows = limit.unwrap_or(DEFAULT_LIMIT);
        if skip_rows < 0 {
            return Err(PageError::NegativeSkip { value: skip_rows });
        }
        if max_rows < 0 {
            return Err(PageError::NegativeLimit { value: max_rows });
        }
        Ok(Self {
            skip: skip_rows,
            limit: max_rows,
        })
    }

    /// Rows to pass over before the window starts.
    #[must_use]
    pub const fn skip(&self) -> i64 {
        self.skip
    }

    /// Maximum rows in the window.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.limit
    }

    /// Apply the window to an iterator, for adapters that page in memory.
    pub fn apply<I>(&self, items: I) -> impl Iterator<Item = I::Item>
    where
        I: IntoIterator,
    {
        // Windows past usize::MAX cannot be materialised in memory anyway.
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(limit)
    }
}
