//! Net position aggregation.

use crate::domain::error::LedgerError;
use crate::domain::trade::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Net signed quantity held in one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub net_position: Decimal,
}

/// One trade's contribution to a position, as fetched from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionLeg {
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
}

/// Nets legs into one position per stored symbol, ordered by symbol byte-wise.
///
/// Symbols are grouped exactly as stored; "BTC/USD" and "btc/usd" are distinct
/// groups. Only symbols that have at least one leg appear.
pub fn net_positions<I>(legs: I) -> Result<Vec<Position>, LedgerError>
where
    I: IntoIterator<Item = PositionLeg>,
{
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for leg in legs {
        let delta = leg.side.signed(leg.quantity);
        let total = totals.entry(leg.symbol).or_insert(Decimal::ZERO);
        *total = total
            .checked_add(delta)
            .ok_or_else(|| LedgerError::DatabaseQuery {
                reason: "net position overflowed decimal range".to_string(),
            })?;
    }

    Ok(totals
        .into_iter()
        .map(|(symbol, net_position)| Position {
            symbol,
            net_position: net_position.normalize(),
        })
        .collect())
}
