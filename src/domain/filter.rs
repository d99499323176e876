//! Filter criteria for ledger queries.

use crate::domain::error::LedgerError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A 1-indexed page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u32,
    page_size: u32,
}

impl Page {
    pub fn new(page: u32, page_size: u32) -> Result<Self, LedgerError> {
        if page < 1 {
            return Err(LedgerError::invalid_parameter(
                "page",
                "must be greater than or equal to 1",
            ));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(LedgerError::invalid_parameter(
                "page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// Rows skipped before this page. Cannot overflow: both factors fit in u32.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeFilter {
    pub account_id: i64,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub symbol: Option<String>,
    pub page: Page,
}

impl TradeFilter {
    pub fn for_account(account_id: i64) -> Self {
        Self {
            account_id,
            start_time: None,
            end_time: None,
            symbol: None,
            page: Page::default(),
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_start(mut self, start_time: impl Into<String>) -> Self {
        self.start_time = Some(start_time.into());
        self
    }

    pub fn with_end(mut self, end_time: impl Into<String>) -> Self {
        self.end_time = Some(end_time.into());
        self
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionFilter {
    pub account_id: i64,
    pub symbol: Option<String>,
}

impl PositionFilter {
    pub fn for_account(account_id: i64) -> Self {
        Self {
            account_id,
            symbol: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

/// Checks that a time bound looks like ISO-8601 and hands back the raw string.
///
/// The value is bound into the query as given; comparison against `ts` is
/// lexical, so callers are expected to use one UTC format consistently.
pub fn validate_time_bound(name: &str, value: &str) -> Result<String, LedgerError> {
    let accepted = DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();

    if accepted {
        Ok(value.to_string())
    } else {
        Err(LedgerError::invalid_parameter(
            name,
            format!("{value:?} is not an ISO-8601 timestamp"),
        ))
    }
}
