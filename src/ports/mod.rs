//! Port traits.

pub mod config_port;
pub mod ledger_port;
