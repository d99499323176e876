//! SQLite ledger adapter.

use crate::domain::config_validation::{pool_size, Backend};
use crate::domain::error::LedgerError;
use crate::domain::filter::{PositionFilter, TradeFilter};
use crate::domain::position::{net_positions, Position, PositionLeg};
use crate::domain::query::{position_legs_query, trades_query, Placeholder, SqlValue};
use crate::domain::trade::{Side, Trade};
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::{Type, Value, ValueRef};
use rusqlite::{params, params_from_iter, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, LedgerError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| LedgerError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = pool_size(config, Backend::Sqlite)?;

        Self::open(db_path, pool_size)
    }

    pub fn open<P: AsRef<Path>>(path: P, pool_size: u32) -> Result<Self, LedgerError> {
        if pool_size == 0 {
            return Err(LedgerError::ConfigInvalid {
                section: "sqlite".into(),
                key: "pool_size".into(),
                reason: "pool_size must be at least 1".into(),
            });
        }
        let manager = SqliteConnectionManager::file(path.as_ref());
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| LedgerError::Database {
                reason: e.to_string(),
            })?;

        tracing::info!(path = %path.as_ref().display(), pool_size, "opened sqlite ledger");
        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, LedgerError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| LedgerError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    /// Creates the `trades` table for local and test databases.
    ///
    /// Amounts are TEXT so decimal strings survive without REAL coercion.
    pub fn initialize_schema(&self) -> Result<(), LedgerError> {
        let conn = self.connection()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS trades (
                trade_id INTEGER PRIMARY KEY,
                account_id INTEGER NOT NULL,
                symbol TEXT NOT NULL,
                side TEXT NOT NULL,
                price TEXT NOT NULL,
                quantity TEXT NOT NULL,
                ts TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_trades_account_ts ON trades(account_id, ts);",
        )
        .map_err(|e: rusqlite::Error| LedgerError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    pub fn insert_trades(&self, trades: &[Trade]) -> Result<(), LedgerError> {
        let mut conn = self.connection()?;

        let tx =
            conn.transaction()
                .map_err(|e: rusqlite::Error| LedgerError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        for trade in trades {
            tx.execute(
                "INSERT INTO trades (trade_id, account_id, symbol, side, price, quantity, ts)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    trade.trade_id,
                    trade.account_id,
                    trade.symbol,
                    trade.side.as_str(),
                    trade.price.to_string(),
                    trade.quantity.to_string(),
                    trade.ts
                ],
            )
            .map_err(|e: rusqlite::Error| LedgerError::DatabaseQuery {
                reason: e.to_string(),
            })?;
        }

        tx.commit()
            .map_err(|e: rusqlite::Error| LedgerError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(())
    }

    fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, LedgerError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| LedgerError::Database {
                reason: e.to_string(),
            })
    }

    fn query<T, F>(&self, sql: &str, params: Vec<SqlValue>, map: F) -> Result<Vec<T>, LedgerError>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.connection()?;
        tracing::debug!(sql, params = ?params, "sqlite query");

        let mut stmt =
            conn.prepare(sql)
                .map_err(|e: rusqlite::Error| LedgerError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let values = params.into_iter().map(|p| match p {
            SqlValue::Integer(i) => Value::Integer(i),
            SqlValue::Text(s) => Value::Text(s),
        });

        let rows = stmt
            .query_map(params_from_iter(values), map)
            .map_err(|e: rusqlite::Error| LedgerError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(
                row.map_err(|e: rusqlite::Error| LedgerError::DatabaseQuery {
                    reason: e.to_string(),
                })?,
            );
        }

        Ok(out)
    }
}

impl LedgerPort for SqliteAdapter {
    fn list_trades(&self, filter: &TradeFilter) -> Result<Vec<Trade>, LedgerError> {
        let built = trades_query(filter).build(Placeholder::Numbered);

        self.query(&built.sql, built.params, |row| {
            Ok(Trade {
                trade_id: row.get(0)?,
                account_id: row.get(1)?,
                symbol: row.get(2)?,
                side: side_column(row, 3)?,
                price: decimal_column(row, 4)?,
                quantity: decimal_column(row, 5)?,
                ts: row.get(6)?,
            })
        })
    }

    fn list_positions(&self, filter: &PositionFilter) -> Result<Vec<Position>, LedgerError> {
        let built = position_legs_query(filter).build(Placeholder::Numbered);

        let legs = self.query(&built.sql, built.params, |row| {
            Ok(PositionLeg {
                symbol: row.get(0)?,
                side: side_column(row, 1)?,
                quantity: decimal_column(row, 2)?,
            })
        })?;

        net_positions(legs)
    }
}

fn side_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Side> {
    let raw: String = row.get(idx)?;
    raw.parse::<Side>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Reads an amount stored as INTEGER, REAL or TEXT into an exact decimal.
///
/// REAL values go through their shortest round-trip text form, so a stored
/// 0.1 becomes exactly 0.1.
fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    match row.get_ref(idx)? {
        ValueRef::Integer(i) => Ok(Decimal::from(i)),
        ValueRef::Real(f) => parse_decimal(&f.to_string())
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Real, Box::new(e))),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })?;
            parse_decimal(text.trim()).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
            })
        }
        ValueRef::Null => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "amount".to_string(),
            Type::Null,
        )),
        ValueRef::Blob(_) => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "amount".to_string(),
            Type::Blob,
        )),
    }
}

fn parse_decimal(text: &str) -> Result<Decimal, rust_decimal::Error> {
    Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text))
}
