//! Pipeline configuration file support.
//!
//! Settings are read from a TOML file and may be overridden from the
//! environment.
//!
//! # Environment Variables
//! - `PROGRAM_LATEX_ENGINE`: markup compiler executable (default: `platex`)
//! - `PROGRAM_PDF_CONVERTER`: DVI to PDF converter executable (default: `dvipdfmx`)
//! - `PROGRAM_COMPILE_TIMEOUT_SECS`: compiler time budget in seconds (default: 30)
//! - `PROGRAM_PRESENTATION_MINUTES`: default slot length (default: 15)

use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ProgramError, ProgramResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramConfig {
    #[serde(default)]
    pub compiler: CompilerSettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
}

/// External document compiler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerSettings {
    #[serde(default = "default_engine")]
    pub engine: String,
    #[serde(default = "default_engine_args")]
    pub engine_args: Vec<String>,
    #[serde(default = "default_converter")]
    pub converter: String,
    #[serde(default)]
    pub converter_args: Vec<String>,
    /// Budget shared by every compiler stage of one invocation.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Base name of the scratch files (`<job_name>.tex`, `.dvi`, `.pdf`).
    #[serde(default = "default_job_name")]
    pub job_name: String,
}

/// Scheduling defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    #[serde(default = "default_presentation_minutes")]
    pub default_presentation_minutes: u32,
}

fn default_engine() -> String {
    "platex".to_string()
}

fn default_engine_args() -> Vec<String> {
    vec!["-interaction=nonstopmode".to_string()]
}

fn default_converter() -> String {
    "dvipdfmx".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_job_name() -> String {
    "program".to_string()
}

fn default_presentation_minutes() -> u32 {
    15
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            engine_args: default_engine_args(),
            converter: default_converter(),
            converter_args: Vec::new(),
            timeout_secs: default_timeout_secs(),
            job_name: default_job_name(),
        }
    }
}

impl CompilerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            default_presentation_minutes: default_presentation_minutes(),
        }
    }
}

impl ProgramConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(ProgramConfig)` if the file was read, parsed and validated
    /// * `Err(ProgramError::Configuration)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> ProgramResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ProgramError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> ProgramResult<Self> {
        let config: ProgramConfig = toml::from_str(content).map_err(|e| {
            ProgramError::configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `program.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> ProgramResult<Self> {
        let search_paths = [
            PathBuf::from("program.toml"),
            PathBuf::from("backend/program.toml"),
            PathBuf::from("../program.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ProgramError::configuration("No program.toml found in standard locations"))
    }

    /// Configuration from the default location when present, built-in defaults
    /// otherwise, with environment overrides applied on top.
    pub fn load() -> ProgramResult<Self> {
        let config = match Self::from_default_location() {
            Ok(config) => config,
            Err(ProgramError::Configuration { message })
                if message.starts_with("No program.toml") =>
            {
                debug!("{}; using built-in defaults", message);
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides()
    }

    /// Apply `PROGRAM_*` environment overrides.
    pub fn apply_env_overrides(mut self) -> ProgramResult<Self> {
        if let Ok(engine) = env::var("PROGRAM_LATEX_ENGINE") {
            self.compiler.engine = engine;
        }
        if let Ok(converter) = env::var("PROGRAM_PDF_CONVERTER") {
            self.compiler.converter = converter;
        }
        if let Ok(raw) = env::var("PROGRAM_COMPILE_TIMEOUT_SECS") {
            self.compiler.timeout_secs = raw.parse().map_err(|_| {
                ProgramError::configuration(format!(
                    "PROGRAM_COMPILE_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?;
        }
        if let Ok(raw) = env::var("PROGRAM_PRESENTATION_MINUTES") {
            self.schedule.default_presentation_minutes = raw.parse().map_err(|_| {
                ProgramError::configuration(format!(
                    "PROGRAM_PRESENTATION_MINUTES must be a whole number of minutes, got '{}'",
                    raw
                ))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> ProgramResult<()> {
        if self.compiler.engine.trim().is_empty() {
            return Err(ProgramError::configuration("compiler.engine must not be empty"));
        }
        if self.compiler.converter.trim().is_empty() {
            return Err(ProgramError::configuration("compiler.converter must not be empty"));
        }
        if self.compiler.timeout_secs == 0 {
            return Err(ProgramError::configuration("compiler.timeout_secs must be positive"));
        }
        if self.compiler.job_name.is_empty() || self.compiler.job_name.contains(['/', '\\']) {
            return Err(ProgramError::configuration("compiler.job_name must be a plain file stem"));
        }
        if self.schedule.default_presentation_minutes == 0 {
            return Err(ProgramError::configuration(
                "schedule.default_presentation_minutes must be positive",
            ));
        }
        Ok(())
    }
}
