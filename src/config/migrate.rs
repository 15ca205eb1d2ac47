use super::{Config, KNOWN_KEYS};
use crate::db::log::ttlog;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use rusqlite::Connection;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

const VERSION: &str = "config_fill_missing_keys";

fn read_mapping(path: &Path) -> AppResult<Mapping> {
    let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
    let yaml: Value = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

    match yaml {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(AppError::Config(format!(
            "{}: top-level YAML value must be a mapping",
            path.display()
        ))),
    }
}

/// Keys a config file lacks compared to the current schema.
pub fn missing_keys(path: &Path) -> AppResult<Vec<String>> {
    let map = read_mapping(path)?;
    Ok(KNOWN_KEYS
        .iter()
        .filter(|k| !map.contains_key(Value::String((*k).to_string())))
        .map(|k| (*k).to_string())
        .collect())
}

/// Fill missing keys with their defaults (taken from `current`, i.e. the
/// effective config after serde defaults) and record the run in the `log` table.
///
/// Returns the keys that were added.
pub fn fill_missing_keys(conn: &Connection, path: &Path, current: &Config) -> AppResult<Vec<String>> {
    let missing = missing_keys(path)?;
    if missing.is_empty() {
        info("Configuration file already up to date.");
        return Ok(missing);
    }

    let mut map = read_mapping(path)?;
    let defaults = serde_yaml::to_value(current)
        .map_err(|e| AppError::Config(format!("YAML serialization error: {e}")))?;

    for key in &missing {
        let k = Value::String(key.clone());
        let v = defaults.get(key.as_str()).cloned().unwrap_or(Value::Null);
        map.insert(k, v);
    }

    let serialized = serde_yaml::to_string(&Value::Mapping(map))
        .map_err(|e| AppError::Config(format!("YAML serialization error: {e}")))?;
    fs::write(path, serialized).map_err(|_| AppError::ConfigSave)?;

    ttlog(
        conn,
        "migration_applied",
        VERSION,
        &format!("Added config keys: {}", missing.join(", ")),
    )?;

    success(format!("Configuration migrated: added {}", missing.join(", ")));
    Ok(missing)
}
