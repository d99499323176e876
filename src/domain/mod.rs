//! Core domain types and logic.

pub mod config_validation;
pub mod error;
pub mod filter;
pub mod position;
pub mod query;
pub mod trade;
