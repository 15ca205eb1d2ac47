// src/export/model.rs

use serde::Serialize;

/// A report that can be rendered as a flat table (terminal, CSV, XLSX)
/// and serialized as structured JSON.
pub trait Tabular: Serialize {
    fn title(&self) -> String;

    fn headers(&self) -> Vec<&'static str>;

    /// One row per record, cells already formatted (2 decimals for numbers).
    fn rows(&self) -> Vec<Vec<String>>;
}
