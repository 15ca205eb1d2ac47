pub mod catalog;
pub mod db_utils;
pub mod initialize;
pub mod ledger;
pub mod log;
pub mod migrate;
pub mod pool;
pub mod reports;
pub mod stats;
