//! Trade records as stored in the ledger.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }

    /// Sign applied to a quantity when netting positions.
    pub fn signed(&self, quantity: Decimal) -> Decimal {
        match self {
            Side::Buy => quantity,
            Side::Sell => -quantity,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trade side {0:?}")]
pub struct UnknownSide(pub String);

impl FromStr for Side {
    type Err = UnknownSide;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("BUY") {
            Ok(Side::Buy)
        } else if s.eq_ignore_ascii_case("SELL") {
            Ok(Side::Sell)
        } else {
            Err(UnknownSide(s.to_string()))
        }
    }
}

/// A single executed trade. `ts` is kept exactly as stored (ISO-8601 UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: i64,
    pub account_id: i64,
    pub symbol: String,
    pub side: Side,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub quantity: Decimal,
    pub ts: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parses_case_insensitively() {
        assert_eq!("BUY".parse::<Side>(), Ok(Side::Buy));
        assert_eq!("sell".parse::<Side>(), Ok(Side::Sell));
        assert_eq!("Buy".parse::<Side>(), Ok(Side::Buy));
    }

    #[test]
    fn side_rejects_unknown_values() {
        assert_eq!(
            "HOLD".parse::<Side>(),
            Err(UnknownSide("HOLD".to_string()))
        );
        assert!("".parse::<Side>().is_err());
    }

    #[test]
    fn sell_negates_quantity() {
        let qty = Decimal::new(25, 1);
        assert_eq!(Side::Buy.signed(qty), qty);
        assert_eq!(Side::Sell.signed(qty), -qty);
    }

    #[test]
    fn trade_serializes_with_uppercase_side_and_numeric_amounts() {
        let trade = Trade {
            trade_id: 7,
            account_id: 1,
            symbol: "BTC/USD".into(),
            side: Side::Sell,
            price: Decimal::new(6500050, 2),
            quantity: Decimal::new(15, 1),
            ts: "2024-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&trade).unwrap();
        assert_eq!(
            json,
            r#"{"trade_id":7,"account_id":1,"symbol":"BTC/USD","side":"SELL","price":65000.50,"quantity":1.5,"ts":"2024-01-01T00:00:00Z"}"#
        );
    }
}
