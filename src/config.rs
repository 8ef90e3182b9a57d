//! Configuration file support
//!
//! Settings are read from a TOML file. Every section is optional; anything
//! left out keeps its default value.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::attendance::{CsvMode, UploadOptions, REQUIRED_COLUMNS};
use crate::payroll::{PayrollRules, RulesError};

/// Errors that can occur when loading or parsing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid payroll rules: {0}")]
    Rules(#[from] RulesError),
}

/// The configuration file `hrdesk config` prints; equal to `AppConfig::default()`
pub const DEFAULT_CONFIG: &str = r#"
[api]
base_url = "http://localhost:8000/api"
# timeout_secs = 30

[session]
path = ".hrdesk/session.json"

[attendance]
# "naive" splits on every comma, "quoted" understands double-quoted fields
mode = "naive"
required_columns = ["Employee ID", "Sign In", "Sign Out"]

[payroll.pf]
employee_rate = 12.0
employer_rate = 12.0
wage_ceiling = 15000.0
cap_at_ceiling = true

[payroll.esic]
employee_rate = 0.75
employer_rate = 3.25
gross_threshold = 21000.0

[payroll.split]
basic_percent = 50.0
hra_percent_of_basic = 40.0

[logging]
filter = "hrdesk=info"
"#;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// No timeout unless set
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".hrdesk/session.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AttendanceConfig {
    pub mode: CsvMode,
    pub required_columns: Vec<String>,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            mode: CsvMode::Naive,
            required_columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive; `RUST_LOG` takes precedence
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "hrdesk=info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub attendance: AttendanceConfig,
    #[serde(default)]
    pub payroll: PayrollRules,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.payroll.validate()?;
        Ok(config)
    }

    /// Set the backend base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api.base_url = url.into();
        self
    }

    /// Set where the session is stored
    pub fn with_session_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.session.path = path.into();
        self
    }

    /// Set the CSV upload mode
    pub fn with_csv_mode(mut self, mode: CsvMode) -> Self {
        self.attendance.mode = mode;
        self
    }

    pub fn api_timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }

    pub fn upload_options(&self) -> UploadOptions {
        UploadOptions::default()
            .with_mode(self.attendance.mode)
            .with_required_columns(self.attendance.required_columns.iter().cloned())
    }
}
