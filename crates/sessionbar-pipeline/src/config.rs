//! Pipeline configuration.

use serde::{Deserialize, Serialize};
use sessionbar_aggregate::{CalendarError, SessionCalendar, SessionSchedule};
use sessionbar_format::OutputFormat;
use sessionbar_parse::ValidationMode;
use sessionbar_sink::SqliteStore;
use sessionbar_types::Interval;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config '{path}': {source}")]
    Read {
        /// The config file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for this schema.
    #[error("Failed to parse config '{path}': {source}")]
    Parse {
        /// The config file path.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The interval does not divide an hour.
    #[error("Interval of {0} minutes does not divide 60")]
    InvalidInterval(u32),

    /// The session schedule is invalid.
    #[error("Invalid schedule: {0}")]
    Calendar(#[from] CalendarError),

    /// Parallelism must be at least one file.
    #[error("parallel_files must be at least 1")]
    ZeroParallelism,

    /// The input extension is empty.
    #[error("Input extension must not be empty")]
    EmptyExtension,
}

/// Top-level configuration for a batch run.
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the one-minute source files.
    pub input_dir: PathBuf,
    /// Extension of source files, without the dot.
    pub extension: String,
    /// How malformed records are handled.
    pub validation: ValidationMode,
    /// Maximum number of files processed at once.
    pub parallel_files: usize,
    /// Session schedule.
    pub schedule: ScheduleConfig,
    /// Snapshot file output.
    pub snapshot: SnapshotConfig,
    /// Document store output.
    pub store: StoreConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("1m"),
            extension: "csv".to_string(),
            validation: ValidationMode::default(),
            parallel_files: default_parallelism(),
            schedule: ScheduleConfig::default(),
            snapshot: SnapshotConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

/// Session schedule configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Session open times as `HH:MM`, strictly increasing.
    pub session_opens: Vec<String>,
    /// Bar length in minutes.
    pub interval_minutes: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let schedule = SessionSchedule::commodity_futures();
        Self {
            session_opens: schedule
                .opens()
                .iter()
                .map(|t| t.format("%H:%M").to_string())
                .collect(),
            interval_minutes: schedule.interval().minutes(),
        }
    }
}

impl ScheduleConfig {
    /// Returns the configured interval.
    ///
    /// # Errors
    ///
    /// Returns an error if the interval does not divide 60.
    pub fn interval(&self) -> Result<Interval, ConfigError> {
        Interval::new(self.interval_minutes).ok_or(ConfigError::InvalidInterval(self.interval_minutes))
    }

    /// Builds the validated session schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the interval or any session open is invalid.
    pub fn to_schedule(&self) -> Result<SessionSchedule, ConfigError> {
        Ok(SessionSchedule::parse(self.session_opens.as_slice(), self.interval()?)?)
    }

    /// Builds the session calendar.
    ///
    /// # Errors
    ///
    /// Returns an error if the schedule is invalid or ambiguous.
    pub fn to_calendar(&self) -> Result<SessionCalendar, ConfigError> {
        Ok(SessionCalendar::new(&self.to_schedule()?)?)
    }
}

/// Snapshot file configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Whether snapshot files are written.
    pub enabled: bool,
    /// Output directory.
    pub dir: PathBuf,
    /// Output format.
    pub format: OutputFormat,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("15m"),
            format: OutputFormat::Json,
        }
    }
}

/// Document store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Whether bars are appended to the store.
    pub enabled: bool,
    /// Database path; the platform data directory is used when unset.
    pub path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl StoreConfig {
    /// Returns the effective database path.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(SqliteStore::default_path)
    }
}

impl PipelineConfig {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks that the configuration can drive a run.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallel_files == 0 {
            return Err(ConfigError::ZeroParallelism);
        }
        if self.extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::EmptyExtension);
        }
        self.schedule.to_calendar()?;
        Ok(())
    }
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.schedule.session_opens, vec!["09:00", "10:30", "13:30", "21:00"]);
        assert_eq!(config.schedule.interval_minutes, 15);
        assert!(config.snapshot.enabled);
        assert!(config.store.enabled);
        assert!(config.store.path.is_none());
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.extension, "csv");
        assert_eq!(config.validation, ValidationMode::Lenient);
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{
            "input_dir": "data/1m",
            "validation": "strict",
            "schedule": { "interval_minutes": 30 },
            "snapshot": { "format": "csv" },
            "store": { "enabled": true, "path": "bars.db" }
        }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.input_dir, PathBuf::from("data/1m"));
        assert_eq!(config.validation, ValidationMode::Strict);
        assert_eq!(config.schedule.interval().unwrap().minutes(), 30);
        assert_eq!(config.schedule.session_opens.len(), 4);
        assert_eq!(config.snapshot.format, OutputFormat::Csv);
        assert_eq!(config.store.resolved_path(), PathBuf::from("bars.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = PipelineConfig::default();
        config.parallel_files = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroParallelism)));

        let mut config = PipelineConfig::default();
        config.schedule.interval_minutes = 7;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidInterval(7))));

        let mut config = PipelineConfig::default();
        config.schedule.session_opens = vec!["10:30".into(), "09:00".into()];
        assert!(matches!(config.validate(), Err(ConfigError::Calendar(_))));

        let mut config = PipelineConfig::default();
        config.extension = ".".into();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyExtension)));
    }

    #[test]
    fn test_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sessionbar.json");
        std::fs::write(&path, r#"{"extension": "txt"}"#).unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.extension, "txt");

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(PipelineConfig::load(&path), Err(ConfigError::Parse { .. })));

        assert!(matches!(
            PipelineConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
    }
}
