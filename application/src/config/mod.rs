//! Application-level configuration.
//!
//! - [`LedgerParams`] — retry policy of the vote ledger

pub mod ledger_params;

pub use ledger_params::LedgerParams;
