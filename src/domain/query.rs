//! Parameterized SELECT builder shared by the storage adapters.
//!
//! Identifiers are `&'static str` chosen by this crate; every caller-supplied
//! value goes through a bound parameter.

use crate::domain::filter::{PositionFilter, TradeFilter};

pub const TRADES_TABLE: &str = "trades";

pub const TRADE_COLUMNS: &[&str] = &[
    "trade_id",
    "account_id",
    "symbol",
    "side",
    "price",
    "quantity",
    "ts",
];

pub const LEG_COLUMNS: &[&str] = &["symbol", "side", "quantity"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?1, ?2, ...` (SQLite)
    Numbered,
    /// `$1, $2, ...` (PostgreSQL). Integers are cast to BIGINT so an i64
    /// binds against INTEGER and BIGINT columns alike.
    Dollar,
}

impl Placeholder {
    fn render(&self, index: usize, value: &SqlValue) -> String {
        match (self, value) {
            (Placeholder::Numbered, _) => format!("?{index}"),
            (Placeholder::Dollar, SqlValue::Integer(_)) => format!("${index}::BIGINT"),
            (Placeholder::Dollar, SqlValue::Text(_)) => format!("${index}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Eq(&'static str, SqlValue),
    Gte(&'static str, SqlValue),
    Lte(&'static str, SqlValue),
    /// Case-insensitive equality via `UPPER()` on both sides.
    EqIgnoreCase(&'static str, String),
}

impl Condition {
    fn render(&self, placeholder: Placeholder, index: usize) -> (String, SqlValue) {
        let value = match self {
            Condition::Eq(_, value) | Condition::Gte(_, value) | Condition::Lte(_, value) => {
                value.clone()
            }
            Condition::EqIgnoreCase(_, value) => SqlValue::Text(value.clone()),
        };
        let param = placeholder.render(index, &value);
        let clause = match self {
            Condition::Eq(column, _) => format!("{column} = {param}"),
            Condition::Gte(column, _) => format!("{column} >= {param}"),
            Condition::Lte(column, _) => format!("{column} <= {param}"),
            Condition::EqIgnoreCase(column, _) => format!("UPPER({column}) = UPPER({param})"),
        };
        (clause, value)
    }
}

/// A rendered statement with its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

#[derive(Debug, Clone)]
pub struct SelectQuery {
    table: &'static str,
    columns: &'static [&'static str],
    conditions: Vec<Condition>,
    order_by: Vec<&'static str>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectQuery {
    pub fn select(table: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            table,
            columns,
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn filter_opt(self, condition: Option<Condition>) -> Self {
        match condition {
            Some(c) => self.filter(c),
            None => self,
        }
    }

    /// Appends an ascending sort key.
    pub fn order_by(mut self, column: &'static str) -> Self {
        self.order_by.push(column);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn build(&self, placeholder: Placeholder) -> BuiltQuery {
        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.table);
        let mut params = Vec::new();

        if !self.conditions.is_empty() {
            let clauses: Vec<String> = self
                .conditions
                .iter()
                .map(|condition| {
                    let (clause, value) = condition.render(placeholder, params.len() + 1);
                    params.push(value);
                    clause
                })
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if !self.order_by.is_empty() {
            let keys: Vec<String> = self
                .order_by
                .iter()
                .map(|column| format!("{column} ASC"))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }

        if let Some(limit) = self.limit {
            let value = SqlValue::Integer(limit);
            sql.push_str(&format!(" LIMIT {}", placeholder.render(params.len() + 1, &value)));
            params.push(value);
        }

        if let Some(offset) = self.offset {
            let value = SqlValue::Integer(offset);
            sql.push_str(&format!(" OFFSET {}", placeholder.render(params.len() + 1, &value)));
            params.push(value);
        }

        BuiltQuery { sql, params }
    }
}

/// Page of trades for one account, ordered by `ts` then `trade_id`.
pub fn trades_query(filter: &TradeFilter) -> SelectQuery {
    SelectQuery::select(TRADES_TABLE, TRADE_COLUMNS)
        .filter(Condition::Eq("account_id", SqlValue::Integer(filter.account_id)))
        .filter_opt(
            filter
                .start_time
                .as_ref()
                .map(|start| Condition::Gte("ts", SqlValue::Text(start.clone()))),
        )
        .filter_opt(
            filter
                .end_time
                .as_ref()
                .map(|end| Condition::Lte("ts", SqlValue::Text(end.clone()))),
        )
        .filter_opt(symbol_condition(filter.symbol.as_deref()))
        .order_by("ts")
        .order_by("trade_id")
        .limit(filter.page.limit())
        .offset(filter.page.offset())
}

/// Every (symbol, side, quantity) leg for one account; netted in the domain.
pub fn position_legs_query(filter: &PositionFilter) -> SelectQuery {
    SelectQuery::select(TRADES_TABLE, LEG_COLUMNS)
        .filter(Condition::Eq("account_id", SqlValue::Integer(filter.account_id)))
        .filter_opt(symbol_condition(filter.symbol.as_deref()))
        .order_by("symbol")
}

fn symbol_condition(symbol: Option<&str>) -> Option<Condition> {
    symbol.map(|s| Condition::EqIgnoreCase("symbol", s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::Page;

    #[test]
    fn bare_select() {
        let built = SelectQuery::select("trades", LEG_COLUMNS).build(Placeholder::Numbered);
        assert_eq!(built.sql, "SELECT symbol, side, quantity FROM trades");
        assert!(built.params.is_empty());
    }

    #[test]
    fn account_only_trades_query() {
        let built = trades_query(&TradeFilter::for_account(1)).build(Placeholder::Numbered);
        assert_eq!(
            built.sql,
            "SELECT trade_id, account_id, symbol, side, price, quantity, ts FROM trades \
             WHERE account_id = ?1 ORDER BY ts ASC, trade_id ASC LIMIT ?2 OFFSET ?3"
        );
        assert_eq!(
            built.params,
            vec![
                SqlValue::Integer(1),
                SqlValue::Integer(20),
                SqlValue::Integer(0)
            ]
        );
    }

    #[test]
    fn every_trade_filter_becomes_a_parameter() {
        let filter = TradeFilter::for_account(42)
            .with_start("2024-01-01T00:00:00Z")
            .with_end("2024-01-31T23:59:59Z")
            .with_symbol("btc/usd")
            .with_page(Page::new(3, 10).unwrap());
        let built = trades_query(&filter).build(Placeholder::Numbered);

        assert_eq!(
            built.sql,
            "SELECT trade_id, account_id, symbol, side, price, quantity, ts FROM trades \
             WHERE account_id = ?1 AND ts >= ?2 AND ts <= ?3 AND UPPER(symbol) = UPPER(?4) \
             ORDER BY ts ASC, trade_id ASC LIMIT ?5 OFFSET ?6"
        );
        assert_eq!(
            built.params,
            vec![
                SqlValue::Integer(42),
                SqlValue::Text("2024-01-01T00:00:00Z".into()),
                SqlValue::Text("2024-01-31T23:59:59Z".into()),
                SqlValue::Text("btc/usd".into()),
                SqlValue::Integer(10),
                SqlValue::Integer(20),
            ]
        );
    }

    #[test]
    fn end_without_start_keeps_numbering_dense() {
        let filter = TradeFilter::for_account(1).with_end("2024-01-31");
        let built = trades_query(&filter).build(Placeholder::Dollar);
        assert!(built.sql.contains("WHERE account_id = $1::BIGINT AND ts <= $2 ORDER BY"));
        assert!(built.sql.ends_with("LIMIT $3::BIGINT OFFSET $4::BIGINT"));
        assert_eq!(built.params.len(), 4);
    }

    #[test]
    fn numbered_placeholders_carry_no_casts() {
        let built = trades_query(&TradeFilter::for_account(1)).build(Placeholder::Numbered);
        assert!(!built.sql.contains("::"));
    }

    #[test]
    fn position_legs_query_has_no_pagination() {
        let filter = PositionFilter::for_account(5).with_symbol("ETH/USD");
        let built = position_legs_query(&filter).build(Placeholder::Dollar);
        assert_eq!(
            built.sql,
            "SELECT symbol, side, quantity FROM trades \
             WHERE account_id = $1::BIGINT AND UPPER(symbol) = UPPER($2) ORDER BY symbol ASC"
        );
        assert_eq!(
            built.params,
            vec![SqlValue::Integer(5), SqlValue::Text("ETH/USD".into())]
        );
    }

    #[test]
    fn hostile_symbol_stays_a_parameter() {
        let filter = PositionFilter::for_account(1).with_symbol("X'); DROP TABLE trades; --");
        let built = position_legs_query(&filter).build(Placeholder::Numbered);
        assert!(!built.sql.contains("DROP"));
        assert_eq!(
            built.params[1],
            SqlValue::Text("X'); DROP TABLE trades; --".into())
        );
    }
}
