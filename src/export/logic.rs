// src/export/logic.rs

use crate::errors::{AppError, AppResult};
use crate::export::fs_utils::prepare_report_file;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::xlsx::export_xlsx;
use crate::export::{ExportFormat, Tabular};
use crate::ui::messages::{header, warning};
use crate::utils::table::Table;
use std::path::Path;

/// High-level output of a computed report.
pub struct ExportLogic;

impl ExportLogic {
    /// Render `report` in `format`.
    ///
    /// - `table`: aligned text on stdout, or `--file` when given
    /// - `csv` | `json` | `xlsx`: written to `file` (required)
    pub fn export<T: Tabular>(
        report: &T,
        format: ExportFormat,
        file: Option<&str>,
        force: bool,
    ) -> AppResult<()> {
        let write: fn(&T, &Path) -> AppResult<()> = match format {
            ExportFormat::Table => return Self::print_table(report),
            ExportFormat::Csv => export_csv::<T>,
            ExportFormat::Json => export_json::<T>,
            ExportFormat::Xlsx => export_xlsx::<T>,
        };

        let file = file.ok_or_else(|| {
            AppError::validation(format!("--file is required for {} output", format.as_str()))
        })?;
        let path = Path::new(file);

        prepare_report_file(path, force)?;

        if report.rows().is_empty() {
            warning("No rows for the selected filters.");
        }

        write(report, path)
    }

    fn print_table<T: Tabular>(report: &T) -> AppResult<()> {
        header(report.title());

        let rows = report.rows();
        if rows.is_empty() {
            warning("No rows for the selected filters.");
            return Ok(());
        }

        let mut table = Table::new(report.headers());
        for row in rows {
            table.add_row(row);
        }
        print!("{}", table.render());
        Ok(())
    }
}
