pub mod banked;
pub mod billing;
pub mod calendar;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod log;
pub mod punch;
pub mod reports;
pub mod timesheet;
