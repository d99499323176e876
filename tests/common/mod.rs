#![allow(dead_code)]

use rust_decimal::Decimal;
use std::str::FromStr;
use tradebook::adapters::sqlite_adapter::SqliteAdapter;
use tradebook::domain::error::LedgerError;
use tradebook::domain::filter::{PositionFilter, TradeFilter};
use tradebook::domain::position::Position;
pub use tradebook::domain::trade::{Side, Trade};
use tradebook::ports::ledger_port::LedgerPort;

/// Ledger whose every call fails the way an unreachable store would.
pub struct FailingLedger {
    pub reason: String,
}

impl FailingLedger {
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

impl LedgerPort for FailingLedger {
    fn list_trades(&self, _filter: &TradeFilter) -> Result<Vec<Trade>, LedgerError> {
        Err(LedgerError::Database {
            reason: self.reason.clone(),
        })
    }

    fn list_positions(&self, _filter: &PositionFilter) -> Result<Vec<Position>, LedgerError> {
        Err(LedgerError::Database {
            reason: self.reason.clone(),
        })
    }
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub fn make_trade(
    trade_id: i64,
    account_id: i64,
    symbol: &str,
    side: Side,
    quantity: &str,
    ts: &str,
) -> Trade {
    Trade {
        trade_id,
        account_id,
        symbol: symbol.to_string(),
        side,
        price: dec("100.25"),
        quantity: dec(quantity),
        ts: ts.to_string(),
    }
}

/// Two accounts, three symbols, one timestamp tie (ids 3 and 4).
pub fn sample_trades() -> Vec<Trade> {
    vec![
        make_trade(1, 1, "BTC/USD", Side::Buy, "5", "2024-01-01T09:00:00Z"),
        make_trade(2, 1, "BTC/USD", Side::Buy, "3", "2024-01-02T09:00:00Z"),
        make_trade(4, 1, "ETH/USD", Side::Buy, "10", "2024-01-03T09:00:00Z"),
        make_trade(3, 1, "BTC/USD", Side::Sell, "2", "2024-01-03T09:00:00Z"),
        make_trade(5, 1, "ETH/USD", Side::Sell, "2.5", "2024-01-04T09:00:00Z"),
        make_trade(6, 1, "SOL/USD", Side::Buy, "0.1", "2024-01-05T09:00:00Z"),
        make_trade(7, 1, "SOL/USD", Side::Buy, "0.2", "2024-01-06T09:00:00Z"),
        make_trade(8, 1, "SOL/USD", Side::Sell, "0.3", "2024-01-07T09:00:00Z"),
        make_trade(9, 2, "BTC/USD", Side::Buy, "1", "2024-01-01T10:00:00Z"),
        make_trade(10, 2, "ETH/USD", Side::Sell, "4", "2024-01-02T10:00:00Z"),
    ]
}

pub fn seeded_sqlite(trades: &[Trade]) -> SqliteAdapter {
    let adapter = SqliteAdapter::in_memory().unwrap();
    adapter.initialize_schema().unwrap();
    adapter.insert_trades(trades).unwrap();
    adapter
}
