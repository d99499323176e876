//! Query-string parameters and their coercion into ledger filters.
//!
//! Every field arrives as an optional raw string so missing or malformed values
//! become a 422 with a field-specific message instead of the extractor's 400.

use serde::Deserialize;

use crate::domain::error::LedgerError;
use crate::domain::filter::{
    validate_time_bound, Page, PositionFilter, TradeFilter, DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};

#[derive(Debug, Default, Deserialize)]
pub struct TradesParams {
    pub account_id: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub symbol: Option<String>,
    pub page_size: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PositionsParams {
    pub account_id: Option<String>,
    pub symbol: Option<String>,
}

impl TradesParams {
    pub fn into_filter(self) -> Result<TradeFilter, LedgerError> {
        let account_id = required_account(self.account_id)?;
        let page_size = optional_u32("page_size", self.page_size, DEFAULT_PAGE_SIZE)?;
        let page = optional_u32("page", self.page, DEFAULT_PAGE)?;

        let mut filter = TradeFilter::for_account(account_id).with_page(Page::new(page, page_size)?);
        if let Some(start) = present(self.start_time) {
            filter = filter.with_start(validate_time_bound("start_time", &start)?);
        }
        if let Some(end) = present(self.end_time) {
            filter = filter.with_end(validate_time_bound("end_time", &end)?);
        }
        if let Some(symbol) = present(self.symbol) {
            filter = filter.with_symbol(symbol);
        }
        Ok(filter)
    }
}

impl PositionsParams {
    pub fn into_filter(self) -> Result<PositionFilter, LedgerError> {
        let mut filter = PositionFilter::for_account(required_account(self.account_id)?);
        if let Some(symbol) = present(self.symbol) {
            filter = filter.with_symbol(symbol);
        }
        Ok(filter)
    }
}

/// Empty strings count as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn required_account(value: Option<String>) -> Result<i64, LedgerError> {
    let raw = present(value)
        .ok_or_else(|| LedgerError::invalid_parameter("account_id", "field required"))?;
    raw.trim()
        .parse()
        .map_err(|_| LedgerError::invalid_parameter("account_id", format!("{raw:?} is not an integer")))
}

fn optional_u32(name: &str, value: Option<String>, default: u32) -> Result<u32, LedgerError> {
    match present(value) {
        None => Ok(default),
        Some(raw) => {
            let parsed: i64 = raw
                .trim()
                .parse()
                .map_err(|_| LedgerError::invalid_parameter(name, format!("{raw:?} is not an integer")))?;
            u32::try_from(parsed).map_err(|_| {
                LedgerError::invalid_parameter(name, format!("{parsed} is out of range"))
            })
        }
    }
}
