//! Paging intent shared by every list query.
//!
//! A [`Pagination`] serves two kinds of backends. Offset backends read
//! `page`/`limit` through [`Pagination::offset`] and [`Pagination::sort_to_int`].
//! Cursor backends read the opaque `page_state` through
//! [`Pagination::sort_to_bool`]. A single backend never mixes the two.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

pub const ASC: &str = "asc";
pub const DESC: &str = "desc";

const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 100;
const DEFAULT_ORDER_BY: &str = ASC;

/// Errors raised while building a [`Pagination`] from raw input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("invalid limit: {0}")]
    InvalidLimit(String),

    #[error("invalid page: {0}")]
    InvalidPage(String),

    #[error("invalid page state: {0}")]
    InvalidPageState(String),
}

/// Page state in either of its two representations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState<'a> {
    /// Base64 text as it travels on the wire
    Encoded(&'a str),
    /// Raw cursor bytes as issued by a backend
    Raw(Vec<u8>),
}

/// Paging parameters: page, limit, sort direction and cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PaginationWire")]
pub struct Pagination {
    /// 1-based page number, 0 when unset
    pub page: u64,
    /// Items per page
    pub limit: u64,
    /// `asc` or `desc`
    pub order_by: String,
    /// Base64 cursor text
    #[serde(skip_serializing_if = "String::is_empty")]
    pub page_state: String,
    /// Decoded cursor bytes
    #[serde(skip)]
    pub page_state_bytes: Vec<u8>,
}

#[derive(Deserialize)]
struct PaginationWire {
    #[serde(default)]
    page: u64,
    #[serde(default)]
    limit: u64,
    #[serde(default)]
    order_by: String,
    #[serde(default)]
    page_state: String,
}

impl TryFrom<PaginationWire> for Pagination {
    type Error = PaginationError;

    fn try_from(wire: PaginationWire) -> Result<Self, Self::Error> {
        let mut pagination = Pagination::new(wire.limit, &wire.page_state, &wire.order_by)?;
        pagination.page = wire.page;
        Ok(pagination)
    }
}

impl Pagination {
    /// Defaults (limit 10, ascending) overridden by any non-empty argument.
    pub fn new(limit: u64, page_state: &str, order_by: &str) -> Result<Self, PaginationError> {
        let mut pagination = Pagination {
            limit: DEFAULT_LIMIT,
            order_by: DEFAULT_ORDER_BY.to_string(),
            ..Default::default()
        };

        if limit > 0 {
            pagination.limit = limit;
        }

        if !order_by.is_empty() {
            pagination.order_by = order_by.to_string();
        }

        if !page_state.is_empty() {
            pagination.set_page_state(PageState::Encoded(page_state))?;
        }

        Ok(pagination)
    }

    /// Parse query-style values.
    ///
    /// `order_by` is taken verbatim; its allowed values are checked by
    /// [`Validate`] at the service boundary.
    pub fn parse(values: &HashMap<String, String>) -> Result<Self, PaginationError> {
        let mut pagination = Pagination::new(0, "", "")?;

        if let Some(raw) = non_empty(values, "limit") {
            pagination.limit = parse_unsigned(raw).map_err(PaginationError::InvalidLimit)?;
        }

        if let Some(raw) = non_empty(values, "order_by") {
            pagination.order_by = raw.to_string();
        }

        if let Some(raw) = non_empty(values, "page_state") {
            pagination.set_page_state(PageState::Encoded(raw))?;
        }

        if let Some(raw) = non_empty(values, "page") {
            pagination.page = parse_unsigned(raw).map_err(PaginationError::InvalidPage)?;
        }

        Ok(pagination)
    }

    /// Number of items to skip. An unset page counts as page 1.
    pub fn offset(&self) -> u64 {
        (self.page.max(1) - 1).saturating_mul(self.limit)
    }

    /// Limit with the default substituted for an unset value.
    pub fn effective_limit(&self) -> u64 {
        if self.limit == 0 {
            DEFAULT_LIMIT
        } else {
            self.limit
        }
    }

    /// Sort direction for backends that take `1`/`-1`.
    pub fn sort_to_int(&self) -> i32 {
        if self.order_by == DESC { -1 } else { 1 }
    }

    /// Sort direction for backends that take an "ascending" flag.
    pub fn sort_to_bool(&self) -> bool {
        self.order_by != DESC
    }

    /// Store the cursor, keeping the text and byte forms in sync.
    pub fn set_page_state(&mut self, state: PageState<'_>) -> Result<(), PaginationError> {
        match state {
            PageState::Raw(bytes) => {
                self.page_state = STANDARD.encode(&bytes);
                self.page_state_bytes = bytes;
            }
            PageState::Encoded(text) => {
                let bytes = STANDARD
                    .decode(text)
                    .map_err(|e| PaginationError::InvalidPageState(e.to_string()))?;
                self.page_state = text.to_string();
                self.page_state_bytes = bytes;
            }
        }
        Ok(())
    }
}

impl Validate for Pagination {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.limit > MAX_LIMIT {
            errors.add(
                "limit",
                ValidationError::new("range")
                    .with_message(format!("limit must be between 1 and {MAX_LIMIT}").into()),
            );
        }

        if !self.order_by.is_empty() && self.order_by != ASC && self.order_by != DESC {
            errors.add(
                "order_by",
                ValidationError::new("one_of")
                    .with_message(format!("order_by must be one of: {ASC}, {DESC}").into()),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn non_empty<'a>(values: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    values
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Plain decimal digits only; `u64::from_str` alone would also take a `+` sign.
fn parse_unsigned(raw: &str) -> Result<u64, String> {
    if raw.starts_with('+') {
        return Err(format!("unexpected sign in {raw:?}"));
    }
    raw.parse::<u64>().map_err(|e| e.to_string())
}
