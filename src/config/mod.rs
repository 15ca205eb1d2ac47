use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

pub mod migrate;

/// Business rules and runtime knobs, persisted as YAML.
///
/// Every field has a serde default so that older config files keep loading;
/// `config --migrate` writes the missing keys back to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_daily_manual_cap")]
    pub daily_manual_cap_hours: Decimal,
    #[serde(default = "default_max_entry_hours")]
    pub max_entry_hours: Decimal,
    #[serde(default = "default_expected_daily_hours")]
    pub expected_daily_hours: Decimal,
    #[serde(default = "default_weeks_per_month")]
    pub weeks_per_month: Decimal,
    #[serde(default = "default_enforce_punch_sequence")]
    pub enforce_punch_sequence: bool,
    #[serde(default)]
    pub banked_hours_min: Option<Decimal>,
    #[serde(default)]
    pub banked_hours_max: Option<Decimal>,
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
    #[serde(default = "default_report_max_rows")]
    pub report_max_rows: usize,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_daily_manual_cap() -> Decimal {
    Decimal::from(12)
}
fn default_max_entry_hours() -> Decimal {
    Decimal::from(24)
}
fn default_expected_daily_hours() -> Decimal {
    Decimal::from(8)
}
fn default_weeks_per_month() -> Decimal {
    Decimal::new(433, 2)
}
fn default_enforce_punch_sequence() -> bool {
    true
}
fn default_report_max_rows() -> usize {
    50_000
}
fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// Keys every current config file carries.
pub const KNOWN_KEYS: &[&str] = &[
    "database",
    "daily_manual_cap_hours",
    "max_entry_hours",
    "expected_daily_hours",
    "weeks_per_month",
    "enforce_punch_sequence",
    "banked_hours_min",
    "banked_hours_max",
    "holidays",
    "report_max_rows",
    "busy_timeout_ms",
];

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file().to_string_lossy().to_string())
    }
}

impl Config {
    pub fn with_database(database: String) -> Self {
        Self {
            database,
            daily_manual_cap_hours: default_daily_manual_cap(),
            max_entry_hours: default_max_entry_hours(),
            expected_daily_hours: default_expected_daily_hours(),
            weeks_per_month: default_weeks_per_month(),
            enforce_punch_sequence: default_enforce_punch_sequence(),
            banked_hours_min: None,
            banked_hours_max: None,
            holidays: Vec::new(),
            report_max_rows: default_report_max_rows(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }

    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if let Ok(dir) = env::var("RTIMEBILL_HOME") {
            return PathBuf::from(dir);
        }
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rtimebill")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".rtimebill")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rtimebill.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rtimebill.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
            serde_yaml::from_str(&content)
                .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
        } else {
            Ok(Config::default())
        }
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> io::Result<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = if let Some(name) = custom_name {
            let p = crate::utils::path::expand_tilde(&name);
            if p.is_absolute() { p } else { dir.join(p) }
        } else {
            dir.join("rtimebill.sqlite")
        };

        let config = Config::with_database(db_path.to_string_lossy().to_string());

        // Write config file
        if !is_test {
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| io::Error::other(format!("YAML serialization error: {e}")))?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        // Create empty DB file if not exists
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(config)
    }
}
