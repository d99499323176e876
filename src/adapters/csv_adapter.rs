//! CSV rendering of ledger results for the CLI.

use crate::domain::error::LedgerError;
use crate::domain::position::Position;
use crate::domain::trade::Trade;
use std::io::Write;

const TRADE_HEADER: [&str; 7] = [
    "trade_id",
    "account_id",
    "symbol",
    "side",
    "price",
    "quantity",
    "ts",
];

const POSITION_HEADER: [&str; 2] = ["symbol", "net_position"];

pub fn write_trades<W: Write>(out: W, trades: &[Trade]) -> Result<(), LedgerError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(TRADE_HEADER).map_err(csv_error)?;
    for trade in trades {
        wtr.write_record([
            trade.trade_id.to_string(),
            trade.account_id.to_string(),
            trade.symbol.clone(),
            trade.side.to_string(),
            trade.price.to_string(),
            trade.quantity.to_string(),
            trade.ts.clone(),
        ])
        .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_positions<W: Write>(out: W, positions: &[Position]) -> Result<(), LedgerError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(POSITION_HEADER).map_err(csv_error)?;
    for position in positions {
        wtr.write_record([position.symbol.clone(), position.net_position.to_string()])
            .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

fn csv_error(e: csv::Error) -> LedgerError {
    LedgerError::Io(std::io::Error::other(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::Side;
    use rust_decimal::Decimal;

    #[test]
    fn writes_trades_with_header() {
        let trades = vec![Trade {
            trade_id: 1,
            account_id: 3,
            symbol: "BTC/USD".into(),
            side: Side::Buy,
            price: Decimal::new(4210025, 2),
            quantity: Decimal::new(5, 1),
            ts: "2024-03-01T10:00:00Z".into(),
        }];
        let mut buf = Vec::new();
        write_trades(&mut buf, &trades).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "trade_id,account_id,symbol,side,price,quantity,ts\n\
             1,3,BTC/USD,BUY,42100.25,0.5,2024-03-01T10:00:00Z\n"
        );
    }

    #[test]
    fn writes_header_for_empty_positions() {
        let mut buf = Vec::new();
        write_positions(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "symbol,net_position\n");
    }

    #[test]
    fn writes_negative_positions() {
        let positions = vec![Position {
            symbol: "ETH/USD".into(),
            net_position: Decimal::new(-175, 2),
        }];
        let mut buf = Vec::new();
        write_positions(&mut buf, &positions).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "symbol,net_position\nETH/USD,-1.75\n"
        );
    }
}
