use crate::config::Config;
use crate::config::migrate::{fill_missing_keys, missing_keys};
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    pub fn print(cfg: &Config) -> AppResult<()> {
        let yaml = serde_yaml::to_string(cfg).map_err(|e| AppError::Config(e.to_string()))?;
        println!("📄 Current configuration:\n");
        println!("{}", yaml);
        Ok(())
    }

    /// Report keys the config file on disk does not carry yet.
    pub fn check() -> AppResult<Vec<String>> {
        let path = Config::config_file();
        if !path.exists() {
            warning(format!("No config file at {}", path.display()));
            return Ok(Vec::new());
        }
        let missing = missing_keys(&path)?;
        if missing.is_empty() {
            success("Configuration file is up to date.");
        } else {
            warning(format!("Missing keys: {}", missing.join(", ")));
        }
        Ok(missing)
    }

    /// Write defaults for missing keys and record it in the audit log.
    pub fn migrate(cfg: &Config) -> AppResult<()> {
        let path = Config::config_file();
        if !path.exists() {
            warning(format!("No config file at {}", path.display()));
            return Ok(());
        }
        let pool = DbPool::open(cfg)?;
        init_db(&pool.conn)?;
        fill_missing_keys(&pool.conn, &path, cfg)?;
        Ok(())
    }

    pub fn edit(editor: &Option<String>) -> AppResult<()> {
        let path = Config::config_file();

        let default_editor = std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| {
                if cfg!(target_os = "windows") {
                    "notepad".to_string()
                } else {
                    "nano".to_string()
                }
            });
        let editor_to_use = editor.clone().unwrap_or_else(|| default_editor.clone());

        match Command::new(&editor_to_use).arg(&path).status() {
            Ok(s) if s.success() => {
                success(format!(
                    "Configuration file edited successfully using '{}'",
                    editor_to_use
                ));
                Ok(())
            }
            _ => {
                warning(format!(
                    "Editor '{}' not available, falling back to '{}'",
                    editor_to_use, default_editor
                ));
                let status = Command::new(&default_editor)
                    .arg(&path)
                    .status()
                    .map_err(|e| AppError::Config(e.to_string()))?;
                if status.success() {
                    success(format!(
                        "Configuration file edited successfully using fallback '{}'",
                        default_editor
                    ));
                    Ok(())
                } else {
                    Err(AppError::Config(format!(
                        "failed to edit configuration file using '{}'",
                        default_editor
                    )))
                }
            }
        }
    }
}
