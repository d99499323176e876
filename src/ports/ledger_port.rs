//! Ledger data access port trait.

use crate::domain::error::LedgerError;
use crate::domain::filter::{PositionFilter, TradeFilter};
use crate::domain::position::Position;
use crate::domain::trade::Trade;

/// Read-only access to the trade ledger.
///
/// Each call is a single stateless read: it either returns the complete,
/// possibly empty, result or fails as a whole.
pub trait LedgerPort {
    /// One page of trades for an account, ordered by `ts` then `trade_id`.
    fn list_trades(&self, filter: &TradeFilter) -> Result<Vec<Trade>, LedgerError>;

    /// Net position per symbol held by an account, ordered by symbol.
    fn list_positions(&self, filter: &PositionFilter) -> Result<Vec<Position>, LedgerError>;
}
