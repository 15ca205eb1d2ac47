use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, warning};
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

/// Make `path` ready to receive a report file.
///
/// Missing parent directories are created. An existing file is replaced
/// only with `--force` or after an interactive yes; without a terminal to ask
/// on, the export is refused.
pub(crate) fn prepare_report_file(path: &Path, force: bool) -> AppResult<()> {
    if path.is_dir() {
        return Err(AppError::validation(format!(
            "'{}' is a directory, not a report file",
            path.display()
        )));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    if !path.exists() || force {
        return Ok(());
    }

    if !io::stdin().is_terminal() {
        return Err(AppError::validation(format!(
            "report file '{}' already exists; pass --force to replace it",
            path.display()
        )));
    }

    warning(format!("Report file '{}' already exists.", path.display()));
    print!("Replace it? [y/N]: ");
    io::stdout().flush().ok();

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    if matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
        info("Previous report file will be replaced.");
        Ok(())
    } else {
        Err(AppError::Export("report not written: existing file kept".into()))
    }
}
