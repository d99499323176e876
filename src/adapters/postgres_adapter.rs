//! PostgreSQL ledger adapter.
//!
//! Expects `price` and `quantity` as NUMERIC and `ts` as TEXT holding ISO-8601 UTC.
//! `trade_id` and `account_id` may be INTEGER or BIGINT.

use crate::domain::config_validation::{pool_size, Backend};
use crate::domain::error::LedgerError;
use crate::domain::filter::{PositionFilter, TradeFilter};
use crate::domain::position::{net_positions, Position, PositionLeg};
use crate::domain::query::{position_legs_query, trades_query, Placeholder, SqlValue};
use crate::domain::trade::{Side, Trade};
use crate::ports::config_port::ConfigPort;
use crate::ports::ledger_port::LedgerPort;
use postgres::types::ToSql;
use postgres::{NoTls, Row};
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;

pub struct PostgresAdapter {
    pool: Pool<PostgresConnectionManager<NoTls>>,
}

impl PostgresAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, LedgerError> {
        let connection_string = config
            .get_string("postgres", "connection_string")
            .ok_or_else(|| LedgerError::ConfigMissing {
                section: "postgres".into(),
                key: "connection_string".into(),
            })?;

        let pg_config: postgres::Config =
            connection_string
                .parse()
                .map_err(|e: postgres::Error| LedgerError::ConfigInvalid {
                    section: "postgres".into(),
                    key: "connection_string".into(),
                    reason: e.to_string(),
                })?;

        let pool_size = pool_size(config, Backend::Postgres)?;
        let manager = PostgresConnectionManager::new(pg_config, NoTls);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| LedgerError::Database {
                reason: e.to_string(),
            })?;

        tracing::info!(pool_size, "opened postgres ledger");
        Ok(Self { pool })
    }

    fn query(&self, sql: &str, params: Vec<SqlValue>) -> Result<Vec<Row>, LedgerError> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| LedgerError::Database {
                reason: e.to_string(),
            })?;
        tracing::debug!(sql, params = ?params, "postgres query");

        let boxed: Vec<Box<dyn ToSql + Sync>> = params
            .into_iter()
            .map(|p| -> Box<dyn ToSql + Sync> {
                match p {
                    SqlValue::Integer(i) => Box::new(i),
                    SqlValue::Text(s) => Box::new(s),
                }
            })
            .collect();
        let refs: Vec<&(dyn ToSql + Sync)> = boxed.iter().map(|b| b.as_ref()).collect();

        conn.query(sql, &refs)
            .map_err(|e| LedgerError::DatabaseQuery {
                reason: e.to_string(),
            })
    }
}

impl LedgerPort for PostgresAdapter {
    fn list_trades(&self, filter: &TradeFilter) -> Result<Vec<Trade>, LedgerError> {
        let built = trades_query(filter).build(Placeholder::Dollar);
        let rows = self.query(&built.sql, built.params)?;

        rows.iter()
            .map(|row| -> Result<Trade, LedgerError> {
                Ok(Trade {
                    trade_id: id_column(row, 0)?,
                    account_id: id_column(row, 1)?,
                    symbol: row.try_get(2).map_err(row_error)?,
                    side: parse_side(row.try_get(3).map_err(row_error)?)?,
                    price: row.try_get(4).map_err(row_error)?,
                    quantity: row.try_get(5).map_err(row_error)?,
                    ts: row.try_get(6).map_err(row_error)?,
                })
            })
            .collect()
    }

    fn list_positions(&self, filter: &PositionFilter) -> Result<Vec<Position>, LedgerError> {
        let built = position_legs_query(filter).build(Placeholder::Dollar);
        let rows = self.query(&built.sql, built.params)?;

        let legs = rows
            .iter()
            .map(|row| -> Result<PositionLeg, LedgerError> {
                Ok(PositionLeg {
                    symbol: row.try_get(0).map_err(row_error)?,
                    side: parse_side(row.try_get(1).map_err(row_error)?)?,
                    quantity: row.try_get(2).map_err(row_error)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        net_positions(legs)
    }
}

fn parse_side(raw: &str) -> Result<Side, LedgerError> {
    raw.parse().map_err(|e: crate::domain::trade::UnknownSide| {
        LedgerError::DatabaseQuery {
            reason: e.to_string(),
        }
    })
}

/// INTEGER columns come back as i32, BIGINT as i64.
fn id_column(row: &Row, idx: usize) -> Result<i64, LedgerError> {
    match row.try_get::<_, i64>(idx) {
        Ok(value) => Ok(value),
        Err(_) => row.try_get::<_, i32>(idx).map(i64::from).map_err(row_error),
    }
}

fn row_error(e: postgres::Error) -> LedgerError {
    LedgerError::DatabaseQuery {
        reason: e.to_string(),
    }
}
