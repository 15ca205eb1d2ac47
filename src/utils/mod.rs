pub mod colors;
pub mod date;
pub mod decimal;
pub mod formatting;
pub mod path;
pub mod table;
pub mod time;

pub use formatting::{fmt2, round2};
