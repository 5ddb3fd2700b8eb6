use crate::core::engine::EvaluationPolicy;
use crate::errors::{AppError, AppResult};
use crate::utils::time::{TimeZoneSetting, WindowClock};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

pub mod migrate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ledger / schedule database (devices, windows, shifts, transactions).
    pub database: String,
    /// Access-control database holding the attendance shards.
    pub attendance_database: String,
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
    #[serde(default = "default_entry_tolerance_minutes")]
    pub entry_tolerance_minutes: i64,
    #[serde(default = "default_stale_entry_hours")]
    pub stale_entry_hours: i64,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_window_clock")]
    pub window_clock: String,
    #[serde(default)]
    pub persist_snapshot: bool,
}

fn default_table_prefix() -> String {
    "t_lg".to_string()
}
fn default_poll_interval_ms() -> u64 {
    2000
}
fn default_query_timeout_secs() -> u64 {
    5
}
fn default_entry_tolerance_minutes() -> i64 {
    60
}
fn default_stale_entry_hours() -> i64 {
    24
}
fn default_time_zone() -> String {
    "local".to_string()
}
fn default_window_clock() -> String {
    "now".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            attendance_database: Self::attendance_file().to_string_lossy().to_string(),
            table_prefix: default_table_prefix(),
            poll_interval_ms: default_poll_interval_ms(),
            query_timeout_secs: default_query_timeout_secs(),
            entry_tolerance_minutes: default_entry_tolerance_minutes(),
            stale_entry_hours: default_stale_entry_hours(),
            time_zone: default_time_zone(),
            window_clock: default_window_clock(),
            persist_snapshot: false,
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if let Ok(custom) = std::env::var("MEALGATE_HOME") {
            return PathBuf::from(custom);
        }

        if cfg!(target_os = "windows") {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("mealgate")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".mealgate")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("mealgate.conf")
    }

    /// Return the full path of the ledger database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("mealgate.sqlite")
    }

    /// Default location of the attendance database
    pub fn attendance_file() -> PathBuf {
        Self::config_dir().join("attendance.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
            let cfg: Config = serde_yaml::from_str(&content)?;
            Ok(cfg)
        } else {
            Ok(Config::default())
        }
    }

    /// Check every value that cannot be validated by serde alone.
    /// Called once at startup; a failure here is the only condition that stops the poller.
    pub fn validate(&self) -> AppResult<()> {
        self.zone()?;
        self.clock_policy()?;

        if self.table_prefix.is_empty()
            || !self
                .table_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::Config(format!(
                "table_prefix must be non-empty and contain only [A-Za-z0-9_], got '{}'",
                self.table_prefix
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(AppError::Config("poll_interval_ms must be > 0".into()));
        }
        if self.entry_tolerance_minutes < 0 {
            return Err(AppError::Config(
                "entry_tolerance_minutes must not be negative".into(),
            ));
        }
        if self.stale_entry_hours <= 0 {
            return Err(AppError::Config("stale_entry_hours must be > 0".into()));
        }
        Ok(())
    }

    pub fn zone(&self) -> AppResult<TimeZoneSetting> {
        TimeZoneSetting::parse(&self.time_zone)
            .ok_or_else(|| AppError::Config(format!("invalid time_zone '{}'", self.time_zone)))
    }

    pub fn clock_policy(&self) -> AppResult<WindowClock> {
        WindowClock::parse(&self.window_clock).ok_or_else(|| {
            AppError::Config(format!(
                "invalid window_clock '{}' (expected 'now' or 'event')",
                self.window_clock
            ))
        })
    }

    pub fn query_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.query_timeout_secs)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }

    pub fn evaluation_policy(&self) -> AppResult<EvaluationPolicy> {
        Ok(EvaluationPolicy {
            window_clock: self.clock_policy()?,
            entry_tolerance: Duration::minutes(self.entry_tolerance_minutes),
            stale_after: Duration::hours(self.stale_entry_hours),
        })
    }

    /// Initialize configuration and database files
    pub fn init_all(
        custom_db: Option<String>,
        custom_attendance: Option<String>,
        is_test: bool,
    ) -> AppResult<Config> {
        let dir = Self::config_dir();
        if !is_test {
            fs::create_dir_all(&dir)?;
        }

        let mut config = if is_test {
            Config::default()
        } else {
            Self::load()?
        };

        if let Some(name) = custom_db {
            let p = std::path::Path::new(&name);
            config.database = if p.is_absolute() {
                p.to_string_lossy().to_string()
            } else {
                dir.join(p).to_string_lossy().to_string()
            };
        }

        if let Some(att) = custom_attendance {
            config.attendance_database = att;
        }

        if !is_test {
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if let Some(parent) = std::path::Path::new(&config.database).parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        if !std::path::Path::new(&config.database).exists() {
            fs::File::create(&config.database).map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("cannot create database {}: {}", config.database, e),
                )
            })?;
        }

        Ok(config)
    }
}
